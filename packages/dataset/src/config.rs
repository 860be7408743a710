//! Analysis configuration.
//!
//! The dataset-truncation window, coordinate bounding box, and clustering
//! seed were fixed constants in early versions; they are configuration now,
//! with the original Chicago values as defaults.

use std::path::{Path, PathBuf};

use crime_pulse_incident_models::BoundingBox;
use serde::{Deserialize, Serialize};

use crate::DatasetError;

/// Default path the CLI looks for when no `--data` flag is given.
pub const DEFAULT_DATA_PATH: &str = "data/chicago_crime_data.csv";

/// Default trailing-rows window applied when loading large files.
pub const DEFAULT_MAX_ROWS: usize = 50_000;

/// Default random seed for hotspot clustering.
pub const DEFAULT_CLUSTER_SEED: u64 = 42;

/// Tunable parameters for loading and analyzing a crime dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisConfig {
    /// Path to the incident CSV file.
    pub data_path: PathBuf,
    /// Maximum number of trailing data rows to keep when loading.
    pub max_rows: usize,
    /// Coordinate filter applied to every row.
    pub bounding_box: BoundingBox,
    /// Random seed for reproducible hotspot clustering.
    pub cluster_seed: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            max_rows: DEFAULT_MAX_ROWS,
            bounding_box: BoundingBox::CHICAGO,
            cluster_seed: DEFAULT_CLUSTER_SEED,
        }
    }
}

impl AnalysisConfig {
    /// Loads configuration from a TOML file.
    ///
    /// Missing fields fall back to the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] if the file cannot be read or parsed.
    pub fn from_toml_path(path: &Path) -> Result<Self, DatasetError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }
}
