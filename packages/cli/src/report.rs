//! Plain-text table rendering for analysis results.
//!
//! The presentation boundary is deliberately thin: every function takes
//! the typed result structures and prints labeled, aligned counts.

use crime_pulse_analytics_models::{
    CountBucket, MonthlyTrendPoint, OverviewStats, WEEKDAY_ORDER, WeekdayHourMatrix, weekday_name,
};
use crime_pulse_forecast::ForecastSeries;
use crime_pulse_hotspot::{Centroid, HotspotProfile};

/// Widest label in a bucket list, for column alignment.
fn label_width(buckets: &[CountBucket]) -> usize {
    buckets.iter().map(|b| b.label.len()).max().unwrap_or(0)
}

fn print_buckets(title: &str, buckets: &[CountBucket]) {
    println!("{title}");
    let width = label_width(buckets);
    for bucket in buckets {
        println!("  {:width$}  {}", bucket.label, bucket.count);
    }
    println!();
}

pub fn print_overview(stats: &OverviewStats, by_type: &[CountBucket]) {
    println!("Crime Overview");
    println!("  Total incidents      {}", stats.total_incidents);
    println!("  Unique crime types   {}", stats.unique_primary_types);
    println!("  Most common crime    {}", stats.most_common_primary_type);
    println!();

    print_buckets("Incidents by type", by_type);
    print_buckets("Incidents by hour", &stats.by_hour);
    print_buckets("Incidents by weekday", &stats.by_weekday);
}

pub fn print_monthly_trend(trend: &[MonthlyTrendPoint]) {
    println!("Monthly trend");
    for point in trend {
        println!("  {}-{:02}  {}", point.year, point.month, point.count);
    }
    println!();
}

pub fn print_weekday_hour_matrix(matrix: &WeekdayHourMatrix) {
    println!("Incidents by weekday and hour");
    print!("  {:9}", "");
    for hour in 0..24 {
        print!("{hour:>5}");
    }
    println!();
    for day in WEEKDAY_ORDER {
        print!("  {:9}", weekday_name(day));
        for hour in 0..24 {
            print!("{:>5}", matrix.get(day, hour));
        }
        println!();
    }
    println!();
}

pub fn print_hotspots(centroids: &[Centroid], profiles: &[HotspotProfile]) {
    println!("Detected {} hotspots", centroids.len());
    for profile in profiles {
        let index = profile.cluster as usize;
        let location = centroids.get(index).map_or_else(
            || "unknown".to_string(),
            |c| format!("{:.4}, {:.4}", c.latitude, c.longitude),
        );
        println!(
            "  Hotspot {}  center ({location})  incidents {}  dominant {}  peak hour {}  peak day {}",
            profile.cluster + 1,
            profile.total_incidents,
            profile.dominant_type,
            profile.peak_hour,
            weekday_name(profile.peak_weekday),
        );
    }
    println!();
}

pub fn print_forecast(forecast: &ForecastSeries) {
    println!(
        "Forecast: {} history days fitted, {} days ahead ({}% interval)",
        forecast.history_days,
        forecast.horizon_days,
        (forecast.confidence * 100.0).round()
    );
    for point in &forecast.points[forecast.history_days..] {
        println!(
            "  {}  {:7.1}  [{:.1} .. {:.1}]",
            point.date, point.point, point.lower, point.upper
        );
    }
    println!();
}
