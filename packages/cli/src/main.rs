#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the crime-pulse analysis pipeline.
//!
//! Each subcommand runs one analysis over the loaded dataset; with no
//! subcommand an interactive selector loops until the user quits.
//! Loading errors halt with a visible message, while per-analysis errors
//! are reported and leave the interactive session usable.

mod report;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use crime_pulse_analytics::aggregate;
use crime_pulse_analytics_models::GroupKey;
use crime_pulse_dataset::{AnalysisConfig, Dataset};
use crime_pulse_forecast::DEFAULT_CONFIDENCE_LEVEL;
use dialoguer::{Input, Select};

#[derive(Parser)]
#[command(name = "crime_pulse", about = "Crime dataset exploration toolkit")]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to the incident CSV (overrides the configured path).
    #[arg(long)]
    data: Option<PathBuf>,

    /// Emit machine-readable JSON instead of text tables.
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Headline statistics and distributions
    Overview,
    /// Temporal patterns: monthly trend and weekday/hour cross-tab
    Temporal,
    /// Geographic hotspot clustering
    Hotspots {
        /// Number of hotspots to detect
        #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(5..=20))]
        clusters: u32,
    },
    /// Daily incident forecast
    Forecast {
        /// Days to forecast past the last observed date
        #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u32).range(7..=90))]
        horizon: u32,
    },
}

/// Analysis modes offered by the interactive selector.
enum AnalysisMode {
    Overview,
    Hotspots,
    Temporal,
    Forecast,
    Quit,
}

impl AnalysisMode {
    const ALL: &[Self] = &[
        Self::Overview,
        Self::Hotspots,
        Self::Temporal,
        Self::Forecast,
        Self::Quit,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Overview => "Overview",
            Self::Hotspots => "Hotspot analysis",
            Self::Temporal => "Temporal analysis",
            Self::Forecast => "Forecasting",
            Self::Quit => "Quit",
        }
    }
}

fn main() -> ExitCode {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(error) => {
            log::error!("Failed to load configuration: {error}");
            return ExitCode::FAILURE;
        }
    };

    let data_path = cli.data.clone().unwrap_or_else(|| config.data_path.clone());
    let mut dataset = match Dataset::from_csv_path(&data_path, &config) {
        Ok(dataset) => dataset,
        Err(error) => {
            log::error!("Failed to load {}: {error}", data_path.display());
            return ExitCode::FAILURE;
        }
    };
    println!(
        "Loaded {} incidents for {} from {}",
        dataset.len(),
        dataset.year(),
        data_path.display()
    );

    match cli.command {
        Some(command) => {
            let result = match command {
                Commands::Overview => run_overview(&dataset, cli.json),
                Commands::Temporal => run_temporal(&dataset, cli.json),
                Commands::Hotspots { clusters } => {
                    run_hotspots(&mut dataset, clusters as usize, &config, cli.json)
                }
                Commands::Forecast { horizon } => {
                    run_forecast(&dataset, horizon as usize, cli.json)
                }
            };
            match result {
                Ok(()) => ExitCode::SUCCESS,
                Err(error) => {
                    log::error!("Analysis failed: {error}");
                    ExitCode::FAILURE
                }
            }
        }
        None => interactive(&mut dataset, &config, cli.json),
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<AnalysisConfig, BoxError> {
    path.map_or_else(
        || Ok(AnalysisConfig::default()),
        |path| Ok(AnalysisConfig::from_toml_path(path)?),
    )
}

type BoxError = Box<dyn std::error::Error>;

/// Interactive mode: keep offering analyses until the user quits. A
/// failed analysis is reported and the selector comes back.
fn interactive(dataset: &mut Dataset, config: &AnalysisConfig, json: bool) -> ExitCode {
    let labels: Vec<&str> = AnalysisMode::ALL.iter().map(AnalysisMode::label).collect();

    loop {
        let selection = Select::new()
            .with_prompt("Select analysis type")
            .items(&labels)
            .default(0)
            .interact();

        let mode = match selection {
            Ok(index) => &AnalysisMode::ALL[index],
            Err(error) => {
                log::error!("Prompt failed: {error}");
                return ExitCode::FAILURE;
            }
        };

        let result = match mode {
            AnalysisMode::Overview => run_overview(dataset, json),
            AnalysisMode::Temporal => run_temporal(dataset, json),
            AnalysisMode::Hotspots => prompt_clusters()
                .and_then(|clusters| run_hotspots(dataset, clusters, config, json)),
            AnalysisMode::Forecast => {
                prompt_horizon().and_then(|horizon| run_forecast(dataset, horizon, json))
            }
            AnalysisMode::Quit => return ExitCode::SUCCESS,
        };

        if let Err(error) = result {
            log::error!("Analysis failed: {error}");
        }
        println!();
    }
}

fn prompt_clusters() -> Result<usize, BoxError> {
    let clusters: usize = Input::new()
        .with_prompt("Number of hotspots (5-20)")
        .default(10)
        .interact_text()?;
    Ok(clusters.clamp(5, 20))
}

fn prompt_horizon() -> Result<usize, BoxError> {
    let horizon: usize = Input::new()
        .with_prompt("Forecast period in days (7-90)")
        .default(30)
        .interact_text()?;
    Ok(horizon.clamp(7, 90))
}

fn run_overview(dataset: &Dataset, json: bool) -> Result<(), BoxError> {
    let stats = aggregate::overview_stats(dataset.records())?;
    let by_type = aggregate::count_by(dataset.records(), GroupKey::PrimaryType)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        report::print_overview(&stats, &by_type);
    }
    Ok(())
}

fn run_temporal(dataset: &Dataset, json: bool) -> Result<(), BoxError> {
    let trend = aggregate::monthly_trend(dataset.records())?;
    let matrix = aggregate::weekday_hour_matrix(dataset.records())?;
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "monthlyTrend": trend,
                "weekdayHourMatrix": matrix,
            }))?
        );
    } else {
        report::print_monthly_trend(&trend);
        report::print_weekday_hour_matrix(&matrix);
    }
    Ok(())
}

fn run_hotspots(
    dataset: &mut Dataset,
    clusters: usize,
    config: &AnalysisConfig,
    json: bool,
) -> Result<(), BoxError> {
    let coordinates: Vec<(f64, f64)> = dataset
        .records()
        .iter()
        .map(|record| record.coordinates())
        .collect();

    let assignment =
        crime_pulse_hotspot::detect_hotspots(&coordinates, clusters, config.cluster_seed)?;
    assignment.tag(dataset.records_mut())?;
    let profiles = crime_pulse_hotspot::hotspot_profiles(dataset.records())?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "centroids": assignment.centroids(),
                "profiles": profiles,
            }))?
        );
    } else {
        report::print_hotspots(assignment.centroids(), &profiles);
    }
    Ok(())
}

fn run_forecast(dataset: &Dataset, horizon: usize, json: bool) -> Result<(), BoxError> {
    let daily = aggregate::daily_counts(dataset.records())?;
    let forecast = crime_pulse_forecast::forecast_daily(&daily, horizon, DEFAULT_CONFIDENCE_LEVEL)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&forecast)?);
    } else {
        report::print_forecast(&forecast);
    }
    Ok(())
}
