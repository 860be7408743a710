//! Grouped counts, cross-tabulations, and headline statistics.
//!
//! The "most common value" helpers resolve ties by keeping the
//! first-encountered value in record order. That tie-break is documented
//! behavior, not an accident: callers accept it as non-deterministic
//! under equal counts across differently-ordered inputs.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use crime_pulse_analytics_models::{
    CountBucket, DailyCount, GroupKey, MonthlyTrendPoint, OverviewStats, WEEKDAY_ORDER,
    WeekdayHourMatrix, weekday_name,
};
use crime_pulse_incident_models::IncidentRecord;

use crate::AnalyticsError;

/// Counts records along a single grouping axis.
///
/// Temporal and cluster axes are ordered ascending; the weekday axis is
/// always Monday→Sunday with all seven days present (zero counts
/// included); primary types are ordered by descending count.
/// [`GroupKey::Cluster`] skips records that were never tagged.
///
/// # Errors
///
/// Returns [`AnalyticsError::EmptyDataset`] if `records` is empty.
pub fn count_by(
    records: &[IncidentRecord],
    key: GroupKey,
) -> Result<Vec<CountBucket>, AnalyticsError> {
    ensure_non_empty(records)?;

    let buckets = match key {
        GroupKey::PrimaryType => {
            let mut counts: HashMap<&str, u64> = HashMap::new();
            for record in records {
                *counts.entry(record.primary_type.as_str()).or_default() += 1;
            }
            let mut buckets: Vec<CountBucket> = counts
                .into_iter()
                .map(|(label, count)| CountBucket::new(label, count))
                .collect();
            buckets.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
            buckets
        }
        GroupKey::Hour => ascending_counts(records.iter().map(|r| r.hour)),
        GroupKey::Weekday => {
            let mut counts = [0_u64; 7];
            for record in records {
                counts[record.day_of_week.num_days_from_monday() as usize] += 1;
            }
            WEEKDAY_ORDER
                .iter()
                .map(|&day| {
                    CountBucket::new(
                        weekday_name(day),
                        counts[day.num_days_from_monday() as usize],
                    )
                })
                .collect()
        }
        GroupKey::Month => ascending_counts(records.iter().map(|r| r.month)),
        GroupKey::Year => ascending_counts(records.iter().map(|r| r.year)),
        GroupKey::Cluster => ascending_counts(records.iter().filter_map(|r| r.cluster)),
    };

    Ok(buckets)
}

/// Headline statistics for the overview analysis.
///
/// # Errors
///
/// Returns [`AnalyticsError::EmptyDataset`] if `records` is empty.
pub fn overview_stats(records: &[IncidentRecord]) -> Result<OverviewStats, AnalyticsError> {
    ensure_non_empty(records)?;

    let most_common = first_mode(records.iter().map(|r| r.primary_type.as_str()))
        .unwrap_or_default()
        .to_string();
    let unique: std::collections::HashSet<&str> =
        records.iter().map(|r| r.primary_type.as_str()).collect();

    Ok(OverviewStats {
        total_incidents: records.len() as u64,
        unique_primary_types: unique.len() as u64,
        most_common_primary_type: most_common,
        by_hour: count_by(records, GroupKey::Hour)?,
        by_weekday: count_by(records, GroupKey::Weekday)?,
        by_month: count_by(records, GroupKey::Month)?,
    })
}

/// Two-level year × month counts for trend lines, ordered chronologically.
///
/// # Errors
///
/// Returns [`AnalyticsError::EmptyDataset`] if `records` is empty.
pub fn monthly_trend(records: &[IncidentRecord]) -> Result<Vec<MonthlyTrendPoint>, AnalyticsError> {
    ensure_non_empty(records)?;

    let mut counts: BTreeMap<(i32, u32), u64> = BTreeMap::new();
    for record in records {
        *counts.entry((record.year, record.month)).or_default() += 1;
    }

    Ok(counts
        .into_iter()
        .map(|((year, month), count)| MonthlyTrendPoint { year, month, count })
        .collect())
}

/// Weekday × hour cross-tabulation for heatmap-style summaries.
///
/// # Errors
///
/// Returns [`AnalyticsError::EmptyDataset`] if `records` is empty.
pub fn weekday_hour_matrix(records: &[IncidentRecord]) -> Result<WeekdayHourMatrix, AnalyticsError> {
    ensure_non_empty(records)?;

    let mut counts = [[0_u64; 24]; 7];
    for record in records {
        counts[record.day_of_week.num_days_from_monday() as usize][record.hour as usize] += 1;
    }

    Ok(WeekdayHourMatrix { counts })
}

/// Incident counts per calendar date, ascending. Input to the forecaster.
///
/// Dates with no incidents are absent here; the forecaster fills calendar
/// gaps itself.
///
/// # Errors
///
/// Returns [`AnalyticsError::EmptyDataset`] if `records` is empty.
pub fn daily_counts(records: &[IncidentRecord]) -> Result<Vec<DailyCount>, AnalyticsError> {
    ensure_non_empty(records)?;

    let mut counts: BTreeMap<chrono::NaiveDate, u64> = BTreeMap::new();
    for record in records {
        *counts.entry(record.occurred_at.date()).or_default() += 1;
    }

    Ok(counts
        .into_iter()
        .map(|(date, count)| DailyCount { date, count })
        .collect())
}

/// The most frequent value in iteration order; ties keep the value
/// encountered first.
pub fn first_mode<T, I>(values: I) -> Option<T>
where
    T: Eq + Hash,
    I: IntoIterator<Item = T>,
{
    let mut counts: HashMap<T, (u64, usize)> = HashMap::new();
    for (index, value) in values.into_iter().enumerate() {
        counts.entry(value).or_insert((0, index)).0 += 1;
    }
    counts
        .into_iter()
        .max_by(|(_, (count_a, index_a)), (_, (count_b, index_b))| {
            count_a.cmp(count_b).then(index_b.cmp(index_a))
        })
        .map(|(value, _)| value)
}

fn ascending_counts<T, I>(values: I) -> Vec<CountBucket>
where
    T: Ord + ToString,
    I: IntoIterator<Item = T>,
{
    let mut counts: BTreeMap<T, u64> = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(value, count)| CountBucket::new(value, count))
        .collect()
}

const fn ensure_non_empty(records: &[IncidentRecord]) -> Result<(), AnalyticsError> {
    if records.is_empty() {
        return Err(AnalyticsError::EmptyDataset);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn record(date: (i32, u32, u32), hour: u32, primary_type: &str) -> IncidentRecord {
        let occurred_at = NaiveDate::from_ymd_opt(date.0, date.1, date.2)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap();
        IncidentRecord::new(
            occurred_at,
            primary_type.to_string(),
            String::new(),
            41.88,
            -87.62,
            date.0,
        )
    }

    #[test]
    fn weekday_axis_is_monday_first_regardless_of_input_order() {
        // Sunday before Monday in input order
        let records = vec![
            record((2023, 1, 1), 8, "THEFT"),
            record((2023, 1, 2), 21, "BATTERY"),
        ];
        let buckets = count_by(&records, GroupKey::Weekday).unwrap();
        let labels: Vec<&str> = buckets.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "Monday",
                "Tuesday",
                "Wednesday",
                "Thursday",
                "Friday",
                "Saturday",
                "Sunday"
            ]
        );
        assert_eq!(buckets[0].count, 1);
        assert_eq!(buckets[6].count, 1);
        assert_eq!(buckets[1].count, 0);
    }

    #[test]
    fn hour_axis_is_ascending_and_present_only() {
        let records = vec![
            record((2023, 1, 1), 21, "THEFT"),
            record((2023, 1, 1), 8, "THEFT"),
            record((2023, 1, 2), 8, "THEFT"),
        ];
        let buckets = count_by(&records, GroupKey::Hour).unwrap();
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].label, "8");
        assert_eq!(buckets[0].count, 2);
        assert_eq!(buckets[1].label, "21");
    }

    #[test]
    fn primary_types_are_ordered_by_descending_count() {
        let records = vec![
            record((2023, 1, 1), 8, "BATTERY"),
            record((2023, 1, 2), 9, "THEFT"),
            record((2023, 1, 3), 10, "THEFT"),
        ];
        let buckets = count_by(&records, GroupKey::PrimaryType).unwrap();
        assert_eq!(buckets[0].label, "THEFT");
        assert_eq!(buckets[0].count, 2);
        assert_eq!(buckets[1].label, "BATTERY");
    }

    #[test]
    fn cluster_axis_skips_untagged_records() {
        let mut tagged = record((2023, 1, 1), 8, "THEFT");
        tagged.cluster = Some(2);
        let records = vec![tagged, record((2023, 1, 2), 9, "THEFT")];
        let buckets = count_by(&records, GroupKey::Cluster).unwrap();
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].label, "2");
        assert_eq!(buckets[0].count, 1);
    }

    #[test]
    fn first_mode_resolves_ties_by_first_encountered() {
        assert_eq!(first_mode(["b", "a", "a", "b"]), Some("b"));
        assert_eq!(first_mode(["a", "b", "b"]), Some("b"));
        assert_eq!(first_mode(Vec::<&str>::new()), None);
    }

    #[test]
    fn overview_counts_unique_types_and_mode() {
        let records = vec![
            record((2023, 1, 1), 8, "THEFT"),
            record((2023, 1, 2), 9, "THEFT"),
            record((2023, 1, 3), 10, "BATTERY"),
        ];
        let stats = overview_stats(&records).unwrap();
        assert_eq!(stats.total_incidents, 3);
        assert_eq!(stats.unique_primary_types, 2);
        assert_eq!(stats.most_common_primary_type, "THEFT");
        assert_eq!(stats.by_weekday.len(), 7);
    }

    #[test]
    fn daily_counts_match_calendar_dates() {
        let records = vec![
            record((2023, 1, 1), 8, "THEFT"),
            record((2023, 1, 2), 21, "BATTERY"),
            record((2023, 1, 2), 22, "BATTERY"),
        ];
        let counts = daily_counts(&records).unwrap();
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0].date, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        assert_eq!(counts[0].count, 1);
        assert_eq!(counts[1].count, 2);
    }

    #[test]
    fn monthly_trend_is_chronological() {
        let records = vec![
            record((2023, 2, 1), 8, "THEFT"),
            record((2023, 1, 15), 9, "THEFT"),
            record((2022, 12, 31), 10, "THEFT"),
        ];
        let trend = monthly_trend(&records).unwrap();
        assert_eq!(
            trend
                .iter()
                .map(|p| (p.year, p.month))
                .collect::<Vec<_>>(),
            vec![(2022, 12), (2023, 1), (2023, 2)]
        );
    }

    #[test]
    fn matrix_counts_land_in_the_right_cell() {
        let records = vec![
            record((2023, 1, 2), 8, "THEFT"), // Monday 08
            record((2023, 1, 2), 8, "THEFT"),
            record((2023, 1, 1), 23, "BATTERY"), // Sunday 23
        ];
        let matrix = weekday_hour_matrix(&records).unwrap();
        assert_eq!(matrix.get(chrono::Weekday::Mon, 8), 2);
        assert_eq!(matrix.get(chrono::Weekday::Sun, 23), 1);
        assert_eq!(matrix.get(chrono::Weekday::Tue, 8), 0);
    }

    #[test]
    fn empty_collection_is_rejected() {
        let records: Vec<IncidentRecord> = Vec::new();
        assert!(matches!(
            count_by(&records, GroupKey::Hour),
            Err(AnalyticsError::EmptyDataset)
        ));
        assert!(matches!(
            daily_counts(&records),
            Err(AnalyticsError::EmptyDataset)
        ));
    }
}
