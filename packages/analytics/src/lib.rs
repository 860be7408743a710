#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! In-memory aggregation engine for crime incident records.
//!
//! Every operation runs over the full loaded record collection and fails
//! fast with [`AnalyticsError::EmptyDataset`] when handed an empty one;
//! nothing here panics on user data.

pub mod aggregate;

use thiserror::Error;

/// Errors that can occur during aggregation.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// The record collection is empty; there is nothing to aggregate.
    #[error("Dataset is empty: nothing to aggregate")]
    EmptyDataset,
}
