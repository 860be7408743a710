#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! K-Means hotspot detection over incident coordinates.
//!
//! Coordinates are standardized per axis (zero mean, unit variance)
//! before clustering so latitude/longitude scale differences don't bias
//! the partition; centroids are reported back in the original coordinate
//! space. Clustering uses a caller-supplied seed, so results are
//! reproducible across runs for the same input and cluster count.

use std::collections::{BTreeMap, HashSet};

use chrono::Weekday;
use crime_pulse_analytics::aggregate::first_mode;
use crime_pulse_incident_models::IncidentRecord;
use linfa::DatasetBase;
use linfa::traits::{Fit, Predict};
use linfa_clustering::KMeans;
use ndarray::{Array1, Array2, ArrayView1};
use rand_xoshiro::Xoshiro256Plus;
use rand_xoshiro::rand_core::SeedableRng;
use serde::{Deserialize, Serialize};

/// Errors that can occur during hotspot detection.
#[derive(Debug, thiserror::Error)]
pub enum HotspotError {
    /// No coordinates (or records) were supplied.
    #[error("No coordinates to cluster")]
    EmptyDataset,

    /// The requested cluster count is zero or exceeds the number of
    /// distinct coordinate points.
    #[error(
        "Invalid cluster count {requested}: must be between 1 and the number of distinct points ({distinct})"
    )]
    InvalidClusterCount {
        /// The cluster count that was requested.
        requested: usize,
        /// How many distinct coordinate points the input contains.
        distinct: usize,
    },

    /// The underlying K-Means fit failed.
    #[error("Clustering failed: {message}")]
    Fit {
        /// Message from the clustering library.
        message: String,
    },

    /// A cluster assignment was produced from a different record set than
    /// the one being tagged.
    #[error("Assignment covers {assignments} records but {records} were given")]
    AssignmentMismatch {
        /// Number of records handed to the tagging pass.
        records: usize,
        /// Number of assignments in the clustering result.
        assignments: usize,
    },
}

/// A hotspot center in original latitude/longitude space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Centroid {
    /// Latitude of the cluster center.
    pub latitude: f64,
    /// Longitude of the cluster center.
    pub longitude: f64,
}

/// Result of a clustering run: per-point cluster indices aligned with the
/// input order, plus one centroid per cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotspotAssignment {
    assignments: Vec<u32>,
    centroids: Vec<Centroid>,
}

impl HotspotAssignment {
    /// Cluster index per input point, in input order.
    #[must_use]
    pub fn assignments(&self) -> &[u32] {
        &self.assignments
    }

    /// Cluster centers in original coordinate space, indexed by cluster.
    #[must_use]
    pub fn centroids(&self) -> &[Centroid] {
        &self.centroids
    }

    /// Number of clusters.
    #[must_use]
    pub fn cluster_count(&self) -> usize {
        self.centroids.len()
    }

    /// One-time tagging pass: writes each record's cluster index.
    ///
    /// # Errors
    ///
    /// Returns [`HotspotError::AssignmentMismatch`] if `records` is not
    /// the collection this assignment was computed from.
    pub fn tag(&self, records: &mut [IncidentRecord]) -> Result<(), HotspotError> {
        if records.len() != self.assignments.len() {
            return Err(HotspotError::AssignmentMismatch {
                records: records.len(),
                assignments: self.assignments.len(),
            });
        }
        for (record, &cluster) in records.iter_mut().zip(&self.assignments) {
            record.cluster = Some(cluster);
        }
        Ok(())
    }
}

/// Per-cluster pattern summary, computed from tagged records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotspotProfile {
    /// Cluster index this profile describes.
    pub cluster: u32,
    /// Incidents assigned to the cluster.
    pub total_incidents: u64,
    /// Most frequent primary type (first-encountered wins ties).
    pub dominant_type: String,
    /// Most frequent hour of day.
    pub peak_hour: u32,
    /// Most frequent day of week.
    pub peak_weekday: Weekday,
}

/// Per-axis standardization: zero mean, unit variance. A zero-variance
/// axis is left unscaled to avoid dividing by zero.
struct AxisScale {
    mean: f64,
    std_dev: f64,
}

impl AxisScale {
    fn fit(values: ArrayView1<'_, f64>) -> Self {
        let mean = values.mean().unwrap_or(0.0);
        #[allow(clippy::cast_precision_loss)]
        let variance =
            values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
        let std_dev = variance.sqrt();
        Self {
            mean,
            std_dev: if std_dev > 0.0 { std_dev } else { 1.0 },
        }
    }

    const fn apply(&self, value: f64) -> f64 {
        (value - self.mean) / self.std_dev
    }

    const fn invert(&self, value: f64) -> f64 {
        value * self.std_dev + self.mean
    }
}

/// Partitions incident coordinates into `clusters` geographic hotspots.
///
/// The returned assignment is aligned with the input order. The same
/// input, cluster count, and seed always produce the same partition.
///
/// # Errors
///
/// Returns [`HotspotError::EmptyDataset`] for empty input,
/// [`HotspotError::InvalidClusterCount`] if `clusters` is zero or exceeds
/// the number of distinct points, and [`HotspotError::Fit`] if the
/// underlying K-Means fit fails.
pub fn detect_hotspots(
    coordinates: &[(f64, f64)],
    clusters: usize,
    seed: u64,
) -> Result<HotspotAssignment, HotspotError> {
    if coordinates.is_empty() {
        return Err(HotspotError::EmptyDataset);
    }

    let distinct: HashSet<(u64, u64)> = coordinates
        .iter()
        .map(|&(lat, lon)| (lat.to_bits(), lon.to_bits()))
        .collect();
    if clusters == 0 || clusters > distinct.len() {
        return Err(HotspotError::InvalidClusterCount {
            requested: clusters,
            distinct: distinct.len(),
        });
    }

    let mut data = Array2::<f64>::zeros((coordinates.len(), 2));
    for (i, &(lat, lon)) in coordinates.iter().enumerate() {
        data[[i, 0]] = lat;
        data[[i, 1]] = lon;
    }

    let lat_scale = AxisScale::fit(data.column(0));
    let lon_scale = AxisScale::fit(data.column(1));
    let mut scaled = data;
    for mut row in scaled.rows_mut() {
        row[0] = lat_scale.apply(row[0]);
        row[1] = lon_scale.apply(row[1]);
    }

    let rng = Xoshiro256Plus::seed_from_u64(seed);
    let dataset = DatasetBase::from(scaled.clone());
    let model = KMeans::params_with_rng(clusters, rng)
        .fit(&dataset)
        .map_err(|e| HotspotError::Fit {
            message: e.to_string(),
        })?;

    let labels: Array1<usize> = model.predict(&scaled);
    #[allow(clippy::cast_possible_truncation)]
    let assignments: Vec<u32> = labels.iter().map(|&label| label as u32).collect();

    let centroids = model
        .centroids()
        .rows()
        .into_iter()
        .map(|row| Centroid {
            latitude: lat_scale.invert(row[0]),
            longitude: lon_scale.invert(row[1]),
        })
        .collect();

    log::debug!(
        "Clustered {} points into {clusters} hotspots (seed {seed})",
        coordinates.len()
    );

    Ok(HotspotAssignment {
        assignments,
        centroids,
    })
}

/// Summarizes incident patterns within each hotspot by re-aggregating the
/// tagged records grouped by cluster index. Untagged records are skipped.
///
/// # Errors
///
/// Returns [`HotspotError::EmptyDataset`] if `records` is empty or none
/// of them carry a cluster tag.
pub fn hotspot_profiles(records: &[IncidentRecord]) -> Result<Vec<HotspotProfile>, HotspotError> {
    let mut by_cluster: BTreeMap<u32, Vec<&IncidentRecord>> = BTreeMap::new();
    for record in records {
        if let Some(cluster) = record.cluster {
            by_cluster.entry(cluster).or_default().push(record);
        }
    }
    if by_cluster.is_empty() {
        return Err(HotspotError::EmptyDataset);
    }

    Ok(by_cluster
        .into_iter()
        .map(|(cluster, members)| HotspotProfile {
            cluster,
            total_incidents: members.len() as u64,
            dominant_type: first_mode(members.iter().map(|r| r.primary_type.as_str()))
                .unwrap_or_default()
                .to_string(),
            peak_hour: first_mode(members.iter().map(|r| r.hour)).unwrap_or_default(),
            peak_weekday: first_mode(members.iter().map(|r| r.day_of_week))
                .unwrap_or(Weekday::Mon),
        })
        .collect())
}
