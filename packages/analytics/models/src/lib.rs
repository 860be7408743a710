#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Aggregation result types shared between the analytics engine, the
//! hotspot profiler, and the CLI presentation layer.

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Canonical weekday axis ordering: Monday first, independent of locale.
pub const WEEKDAY_ORDER: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Full English weekday name for axis labels (chrono's `Display` renders
/// the abbreviated form).
#[must_use]
pub const fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Grouping axes supported by the aggregator.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum GroupKey {
    /// Offense category (e.g., "THEFT").
    PrimaryType,
    /// Hour of day, 0-23.
    Hour,
    /// Day of week, Monday-first.
    Weekday,
    /// Month, 1-12.
    Month,
    /// Reporting year.
    Year,
    /// Hotspot cluster index. Untagged records are skipped.
    Cluster,
}

/// One labeled count along a grouping axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountBucket {
    /// Axis value rendered as a label (hour number, weekday name, ...).
    pub label: String,
    /// Number of incidents with that value.
    pub count: u64,
}

impl CountBucket {
    /// Creates a bucket from any displayable axis value.
    pub fn new(label: impl ToString, count: u64) -> Self {
        Self {
            label: label.to_string(),
            count,
        }
    }
}

/// Headline statistics for the overview analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewStats {
    /// Total incidents in the dataset.
    pub total_incidents: u64,
    /// Number of distinct primary types.
    pub unique_primary_types: u64,
    /// Most frequent primary type (first-encountered wins ties).
    pub most_common_primary_type: String,
    /// Counts per hour of day, ascending, present hours only.
    pub by_hour: Vec<CountBucket>,
    /// Counts per weekday, Monday→Sunday, all seven days.
    pub by_weekday: Vec<CountBucket>,
    /// Counts per month, ascending, present months only.
    pub by_month: Vec<CountBucket>,
}

/// One point on the year × month trend line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTrendPoint {
    /// Calendar year.
    pub year: i32,
    /// Month, 1-12.
    pub month: u32,
    /// Incidents in that month.
    pub count: u64,
}

/// Weekday × hour cross-tabulation for heatmap-style summaries.
///
/// Rows are weekdays in [`WEEKDAY_ORDER`]; columns are hours 0-23.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekdayHourMatrix {
    /// `counts[weekday][hour]`, Monday-first.
    pub counts: [[u64; 24]; 7],
}

impl WeekdayHourMatrix {
    /// Count for a given weekday and hour.
    #[must_use]
    pub fn get(&self, weekday: Weekday, hour: u32) -> u64 {
        self.counts[weekday.num_days_from_monday() as usize][hour as usize]
    }
}

/// Incident count for one calendar date. Input to the forecaster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyCount {
    /// Calendar date.
    pub date: NaiveDate,
    /// Incidents on that date.
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekday_order_starts_monday_ends_sunday() {
        assert_eq!(WEEKDAY_ORDER[0], Weekday::Mon);
        assert_eq!(WEEKDAY_ORDER[6], Weekday::Sun);
    }

    #[test]
    fn group_key_round_trips_through_strings() {
        let key: GroupKey = "PRIMARY_TYPE".parse().unwrap();
        assert_eq!(key, GroupKey::PrimaryType);
        assert_eq!(GroupKey::Weekday.to_string(), "WEEKDAY");
    }

    #[test]
    fn matrix_lookup_uses_monday_first_rows() {
        let mut counts = [[0_u64; 24]; 7];
        counts[0][8] = 3;
        counts[6][23] = 1;
        let matrix = WeekdayHourMatrix { counts };
        assert_eq!(matrix.get(Weekday::Mon, 8), 3);
        assert_eq!(matrix.get(Weekday::Sun, 23), 1);
    }
}
