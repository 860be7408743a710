#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Core incident record types shared across the crime-pulse toolkit.
//!
//! An [`IncidentRecord`] is one reported event, created once at load time
//! from a source CSV row and immutable afterward except for the one-time
//! cluster tag assigned during hotspot detection. Temporal features
//! (hour, weekday, month) are derived from the timestamp at construction.

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

/// A fixed latitude/longitude rectangle used to discard implausible
/// coordinates at load time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    /// Southern edge (inclusive).
    pub min_latitude: f64,
    /// Northern edge (inclusive).
    pub max_latitude: f64,
    /// Western edge (inclusive).
    pub min_longitude: f64,
    /// Eastern edge (inclusive).
    pub max_longitude: f64,
}

impl BoundingBox {
    /// The City of Chicago bounding box used as the default filter.
    pub const CHICAGO: Self = Self {
        min_latitude: 41.6,
        max_latitude: 42.0,
        min_longitude: -87.9,
        max_longitude: -87.5,
    };

    /// Returns `true` if the point lies inside the box (edges inclusive).
    #[must_use]
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        latitude >= self.min_latitude
            && latitude <= self.max_latitude
            && longitude >= self.min_longitude
            && longitude <= self.max_longitude
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::CHICAGO
    }
}

/// A crime incident record with derived temporal features.
///
/// Records are only constructed from rows that passed timestamp and
/// coordinate validation, so every field here is known-good.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentRecord {
    /// When the incident occurred (local time, as reported).
    pub occurred_at: NaiveDateTime,
    /// Top-level offense category (e.g., "THEFT").
    pub primary_type: String,
    /// Free-text offense description.
    pub description: String,
    /// Latitude (WGS84), inside the configured bounding box.
    pub latitude: f64,
    /// Longitude (WGS84), inside the configured bounding box.
    pub longitude: f64,
    /// Reporting year, used for dataset partitioning.
    pub year: i32,
    /// Hour of day, 0-23. Derived from `occurred_at`.
    pub hour: u32,
    /// Day of week. Derived from `occurred_at`.
    pub day_of_week: Weekday,
    /// Month, 1-12. Derived from `occurred_at`.
    pub month: u32,
    /// Hotspot cluster index, assigned once during hotspot detection.
    pub cluster: Option<u32>,
}

impl IncidentRecord {
    /// Creates a record from validated fields, deriving the temporal
    /// features from the timestamp.
    #[must_use]
    pub fn new(
        occurred_at: NaiveDateTime,
        primary_type: String,
        description: String,
        latitude: f64,
        longitude: f64,
        year: i32,
    ) -> Self {
        Self {
            occurred_at,
            primary_type,
            description,
            latitude,
            longitude,
            year,
            hour: occurred_at.hour(),
            day_of_week: occurred_at.weekday(),
            month: occurred_at.month(),
            cluster: None,
        }
    }

    /// The record's coordinates as a `(latitude, longitude)` pair.
    #[must_use]
    pub const fn coordinates(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn timestamp(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
    }

    #[test]
    fn derives_temporal_features() {
        let record = IncidentRecord::new(
            timestamp(2023, 1, 1, 8, 0),
            "THEFT".to_string(),
            "OVER $500".to_string(),
            41.88,
            -87.62,
            2023,
        );
        assert_eq!(record.hour, 8);
        assert_eq!(record.day_of_week, Weekday::Sun);
        assert_eq!(record.month, 1);
        assert_eq!(record.cluster, None);
    }

    #[test]
    fn derives_evening_hour() {
        let record = IncidentRecord::new(
            timestamp(2023, 1, 2, 21, 30),
            "BATTERY".to_string(),
            "SIMPLE".to_string(),
            41.90,
            -87.65,
            2023,
        );
        assert_eq!(record.hour, 21);
        assert_eq!(record.day_of_week, Weekday::Mon);
    }

    #[test]
    fn derivation_is_deterministic() {
        let a = IncidentRecord::new(
            timestamp(2024, 12, 31, 23, 59),
            "ASSAULT".to_string(),
            "AGGRAVATED".to_string(),
            41.7,
            -87.7,
            2024,
        );
        let b = a.clone();
        assert_eq!(a.hour, b.hour);
        assert_eq!(a.day_of_week, b.day_of_week);
        assert_eq!(a.month, b.month);
    }

    #[test]
    fn chicago_box_contains_downtown() {
        assert!(BoundingBox::CHICAGO.contains(41.8781, -87.6298));
    }

    #[test]
    fn chicago_box_rejects_out_of_range() {
        // New York
        assert!(!BoundingBox::CHICAGO.contains(40.7128, -74.0060));
        // Just north of the box
        assert!(!BoundingBox::CHICAGO.contains(42.01, -87.6));
    }

    #[test]
    fn box_edges_are_inclusive() {
        assert!(BoundingBox::CHICAGO.contains(41.6, -87.9));
        assert!(BoundingBox::CHICAGO.contains(42.0, -87.5));
    }
}
