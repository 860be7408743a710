#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CSV loading and filtering for the crime-pulse toolkit.
//!
//! Turns a raw incident CSV into a validated, in-memory [`Dataset`].
//! Rows with unparseable timestamps or missing/out-of-bounds coordinates
//! are silently dropped (lossy by design, counts reported in the
//! [`LoadSummary`]), and two memory-bounding policies apply: only the
//! trailing [`AnalysisConfig::max_rows`] data rows of the file are
//! sampled, and only the most recent year of records is kept.

pub mod config;

use std::collections::VecDeque;
use std::io;
use std::path::Path;

use chrono::NaiveDateTime;
use crime_pulse_incident_models::{BoundingBox, IncidentRecord};

pub use crate::config::AnalysisConfig;

/// Timestamp format used by the Chicago crime export,
/// e.g. `01/02/2023 09:15:00 PM`.
pub const DATE_FORMAT: &str = "%m/%d/%Y %I:%M:%S %p";

/// Column headers every source file must carry. Extra columns are ignored.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "Date",
    "Primary Type",
    "Description",
    "Latitude",
    "Longitude",
    "Year",
];

/// Errors that can occur while loading a dataset.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// I/O error (file open/read).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed CSV input.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration file parse error.
    #[error("Config parse error: {0}")]
    Config(#[from] toml::de::Error),

    /// A required column is absent from the header row.
    #[error("Missing required column: {name}")]
    MissingColumn {
        /// The absent column's header name.
        name: &'static str,
    },

    /// No records survived filtering.
    #[error("No usable records after filtering (read {rows_read} rows)")]
    Empty {
        /// Total data rows read from the source.
        rows_read: u64,
    },
}

/// Per-reason drop counts and sampling figures from a load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Total data rows read from the source.
    pub rows_read: u64,
    /// Rows inside the trailing sample window.
    pub rows_sampled: u64,
    /// Rows dropped for an unparseable timestamp.
    pub dropped_timestamp: u64,
    /// Rows dropped for missing or unparseable coordinates.
    pub dropped_coordinates: u64,
    /// Rows dropped for coordinates outside the bounding box.
    pub dropped_out_of_bounds: u64,
    /// Valid records discarded because they belong to earlier years.
    pub dropped_prior_years: u64,
}

/// Why a sampled row was excluded from the dataset.
enum DropReason {
    Timestamp,
    Coordinates,
    OutOfBounds,
}

/// Header positions of the required columns.
struct ColumnIndices {
    date: usize,
    primary_type: usize,
    description: usize,
    latitude: usize,
    longitude: usize,
    year: usize,
}

impl ColumnIndices {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, DatasetError> {
        let find = |name: &'static str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or(DatasetError::MissingColumn { name })
        };
        Ok(Self {
            date: find("Date")?,
            primary_type: find("Primary Type")?,
            description: find("Description")?,
            latitude: find("Latitude")?,
            longitude: find("Longitude")?,
            year: find("Year")?,
        })
    }
}

/// The loaded, filtered in-memory record collection for a single year.
///
/// This is the explicit context every analysis operates on; nothing in the
/// pipeline keeps ambient state beyond it.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<IncidentRecord>,
    year: i32,
    summary: LoadSummary,
}

impl Dataset {
    /// Loads a dataset from a CSV file on disk.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] if the file is unreadable, a required
    /// column is missing, or no records survive filtering.
    pub fn from_csv_path(path: &Path, config: &AnalysisConfig) -> Result<Self, DatasetError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(io::BufReader::new(file), config)
    }

    /// Loads a dataset from any CSV byte source.
    ///
    /// Only the trailing [`AnalysisConfig::max_rows`] data rows are
    /// sampled (bounded memory for very large exports), and only records
    /// from the most recent year present are kept. Rows that fail
    /// timestamp or coordinate validation are silently excluded.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] if the source is unreadable, a required
    /// column is missing, or no records survive filtering.
    pub fn from_reader<R: io::Read>(
        reader: R,
        config: &AnalysisConfig,
    ) -> Result<Self, DatasetError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let columns = ColumnIndices::from_headers(&headers)?;

        let mut summary = LoadSummary::default();

        // Trailing sample window: keep only the newest max_rows raw rows
        // while streaming, so the full file is never resident.
        let mut window: VecDeque<csv::StringRecord> = VecDeque::with_capacity(config.max_rows);
        for row in csv_reader.records() {
            let row = row?;
            summary.rows_read += 1;
            if window.len() == config.max_rows {
                window.pop_front();
            }
            window.push_back(row);
        }
        summary.rows_sampled = window.len() as u64;

        let mut records = Vec::with_capacity(window.len());
        for row in &window {
            match parse_row(row, &columns, &config.bounding_box) {
                Ok(record) => records.push(record),
                Err(DropReason::Timestamp) => summary.dropped_timestamp += 1,
                Err(DropReason::Coordinates) => summary.dropped_coordinates += 1,
                Err(DropReason::OutOfBounds) => summary.dropped_out_of_bounds += 1,
            }
        }

        let Some(year) = records.iter().map(|r| r.year).max() else {
            return Err(DatasetError::Empty {
                rows_read: summary.rows_read,
            });
        };

        let valid = records.len() as u64;
        records.retain(|r| r.year == year);
        summary.dropped_prior_years = valid - records.len() as u64;

        log::info!(
            "Loaded {} incidents for {year} ({} rows read, {} sampled, dropped: {} timestamp, {} coordinates, {} out-of-bounds, {} prior years)",
            records.len(),
            summary.rows_read,
            summary.rows_sampled,
            summary.dropped_timestamp,
            summary.dropped_coordinates,
            summary.dropped_out_of_bounds,
            summary.dropped_prior_years,
        );

        Ok(Self {
            records,
            year,
            summary,
        })
    }

    /// The filtered records, in source order.
    #[must_use]
    pub fn records(&self) -> &[IncidentRecord] {
        &self.records
    }

    /// Mutable access for the one-time cluster tagging pass.
    #[must_use]
    pub fn records_mut(&mut self) -> &mut [IncidentRecord] {
        &mut self.records
    }

    /// The year all records belong to.
    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// Number of records in the dataset. Always non-zero.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always `false`: loading fails with [`DatasetError::Empty`] rather
    /// than producing an empty dataset.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sampling and drop counts from the load.
    #[must_use]
    pub const fn summary(&self) -> &LoadSummary {
        &self.summary
    }
}

/// Parses one sampled row, or reports why it was dropped.
fn parse_row(
    row: &csv::StringRecord,
    columns: &ColumnIndices,
    bounding_box: &BoundingBox,
) -> Result<IncidentRecord, DropReason> {
    let occurred_at = row
        .get(columns.date)
        .and_then(|s| NaiveDateTime::parse_from_str(s.trim(), DATE_FORMAT).ok())
        .ok_or(DropReason::Timestamp)?;

    let (latitude, longitude) = parse_coordinates(
        row.get(columns.latitude),
        row.get(columns.longitude),
    )
    .ok_or(DropReason::Coordinates)?;

    if !bounding_box.contains(latitude, longitude) {
        return Err(DropReason::OutOfBounds);
    }

    // The Year column is redundant with Date; fall back to the timestamp
    // when it is missing or unparseable rather than dropping the row.
    let year = row
        .get(columns.year)
        .and_then(|s| s.trim().parse::<i32>().ok())
        .unwrap_or_else(|| chrono::Datelike::year(&occurred_at));

    let primary_type = row
        .get(columns.primary_type)
        .unwrap_or_default()
        .trim()
        .to_string();
    let description = row
        .get(columns.description)
        .unwrap_or_default()
        .trim()
        .to_string();

    Ok(IncidentRecord::new(
        occurred_at,
        primary_type,
        description,
        latitude,
        longitude,
        year,
    ))
}

/// Parses lat/lng from optional CSV fields. Returns `None` if either is
/// missing, empty, or unparseable.
fn parse_coordinates(lat: Option<&str>, lng: Option<&str>) -> Option<(f64, f64)> {
    let latitude = lat?.trim().parse::<f64>().ok()?;
    let longitude = lng?.trim().parse::<f64>().ok()?;
    Some((latitude, longitude))
}

#[cfg(test)]
mod tests {
    use chrono::Weekday;

    use super::*;

    const HEADER: &str = "ID,Date,Primary Type,Description,Latitude,Longitude,Year";

    fn load(csv: &str) -> Result<Dataset, DatasetError> {
        Dataset::from_reader(csv.as_bytes(), &AnalysisConfig::default())
    }

    #[test]
    fn loads_valid_rows() {
        let data = format!(
            "{HEADER}\n\
             1,01/01/2023 08:00:00 AM,THEFT,OVER $500,41.88,-87.62,2023\n\
             2,01/02/2023 09:00:00 PM,BATTERY,SIMPLE,41.90,-87.65,2023\n"
        );
        let dataset = load(&data).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.year(), 2023);

        let hours: Vec<u32> = dataset.records().iter().map(|r| r.hour).collect();
        assert_eq!(hours, vec![8, 21]);

        let weekdays: Vec<Weekday> = dataset.records().iter().map(|r| r.day_of_week).collect();
        assert_eq!(weekdays, vec![Weekday::Sun, Weekday::Mon]);
    }

    #[test]
    fn drops_unparseable_timestamps() {
        let data = format!(
            "{HEADER}\n\
             1,not-a-date,THEFT,OVER $500,41.88,-87.62,2023\n\
             2,01/02/2023 09:00:00 PM,BATTERY,SIMPLE,41.90,-87.65,2023\n"
        );
        let dataset = load(&data).unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.summary().dropped_timestamp, 1);
    }

    #[test]
    fn drops_missing_and_out_of_bounds_coordinates() {
        let data = format!(
            "{HEADER}\n\
             1,01/01/2023 08:00:00 AM,THEFT,OVER $500,,,2023\n\
             2,01/01/2023 09:00:00 AM,THEFT,OVER $500,40.71,-74.00,2023\n\
             3,01/02/2023 09:00:00 PM,BATTERY,SIMPLE,41.90,-87.65,2023\n"
        );
        let dataset = load(&data).unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.summary().dropped_coordinates, 1);
        assert_eq!(dataset.summary().dropped_out_of_bounds, 1);
    }

    #[test]
    fn missing_column_is_a_schema_error() {
        let data = "ID,Primary Type,Description,Latitude,Longitude,Year\n\
                    1,THEFT,OVER $500,41.88,-87.62,2023\n";
        let err = load(data).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::MissingColumn { name: "Date" }
        ));
    }

    #[test]
    fn extra_columns_are_ignored() {
        let data = "Case Number,Date,Primary Type,Description,Arrest,Latitude,Longitude,Year,Ward\n\
                    HX1,01/01/2023 08:00:00 AM,THEFT,OVER $500,true,41.88,-87.62,2023,12\n";
        let dataset = load(data).unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.records()[0].primary_type, "THEFT");
    }

    #[test]
    fn all_rows_filtered_is_an_empty_error() {
        let data = format!(
            "{HEADER}\n\
             1,bogus,THEFT,OVER $500,41.88,-87.62,2023\n"
        );
        let err = load(&data).unwrap_err();
        assert!(matches!(err, DatasetError::Empty { rows_read: 1 }));
    }

    #[test]
    fn trailing_window_keeps_newest_rows() {
        let data = format!(
            "{HEADER}\n\
             1,01/01/2023 01:00:00 AM,THEFT,A,41.88,-87.62,2023\n\
             2,01/02/2023 02:00:00 AM,THEFT,B,41.88,-87.62,2023\n\
             3,01/03/2023 03:00:00 AM,THEFT,C,41.88,-87.62,2023\n"
        );
        let config = AnalysisConfig {
            max_rows: 2,
            ..AnalysisConfig::default()
        };
        let dataset = Dataset::from_reader(data.as_bytes(), &config).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.summary().rows_read, 3);
        assert_eq!(dataset.summary().rows_sampled, 2);
        let descriptions: Vec<&str> = dataset
            .records()
            .iter()
            .map(|r| r.description.as_str())
            .collect();
        assert_eq!(descriptions, vec!["B", "C"]);
    }

    #[test]
    fn keeps_only_the_most_recent_year() {
        let data = format!(
            "{HEADER}\n\
             1,06/15/2022 08:00:00 AM,THEFT,A,41.88,-87.62,2022\n\
             2,01/02/2023 09:00:00 PM,BATTERY,B,41.90,-87.65,2023\n\
             3,03/04/2023 10:00:00 AM,ASSAULT,C,41.85,-87.70,2023\n"
        );
        let dataset = load(&data).unwrap();
        assert_eq!(dataset.year(), 2023);
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.summary().dropped_prior_years, 1);
    }

    #[test]
    fn year_falls_back_to_timestamp() {
        let data = format!(
            "{HEADER}\n\
             1,01/01/2023 08:00:00 AM,THEFT,A,41.88,-87.62,\n"
        );
        let dataset = load(&data).unwrap();
        assert_eq!(dataset.records()[0].year, 2023);
    }
}
