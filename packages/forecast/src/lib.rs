#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Seasonal forecasting of daily incident counts.
//!
//! Fits an additive seasonal decomposition (MSTL with weekly and, given
//! enough history, yearly periods) with an `AutoETS` trend model and
//! produces point plus interval predictions covering the historical span
//! and a future horizon. Series shorter than two full weeks fall back to
//! a non-seasonal `AutoETS` fit.
//!
//! The underlying fitting procedure uses numerical optimization with no
//! bit-exact reproducibility guarantee across library versions; tests
//! assert structure and tolerances, never exact values.

use augurs::ets::AutoETS;
use augurs::forecaster::Forecaster;
use augurs::mstl::MSTLModel;
use chrono::{Duration, NaiveDate};
use crime_pulse_analytics_models::DailyCount;
use serde::{Deserialize, Serialize};

/// Weekly seasonal period for a daily series.
pub const WEEKLY_PERIOD: usize = 7;

/// Yearly seasonal period for a daily series.
pub const YEARLY_PERIOD: usize = 365;

/// Minimum filled-series length for weekly seasonal decomposition
/// (two full weeks).
const MIN_WEEKLY_POINTS: usize = 2 * WEEKLY_PERIOD;

/// Minimum filled-series length for an additional yearly component
/// (two full years).
const MIN_YEARLY_POINTS: usize = 2 * YEARLY_PERIOD;

/// Default confidence level for prediction intervals.
pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;

/// Errors that can occur during forecasting.
#[derive(Debug, thiserror::Error)]
pub enum ForecastError {
    /// The requested horizon is zero.
    #[error("Invalid forecast horizon {requested}: must be at least 1 day")]
    InvalidHorizon {
        /// The horizon that was requested.
        requested: usize,
    },

    /// The history is too short to fit anything.
    #[error("Insufficient history: need at least 2 distinct dates, got {distinct}")]
    InsufficientData {
        /// Distinct calendar dates present in the input.
        distinct: usize,
    },

    /// The underlying fitting or prediction procedure failed.
    #[error("Forecast model failed: {message}")]
    Fit {
        /// Message from the forecasting library.
        message: String,
    },

    /// Accuracy evaluation was given mismatched or empty series.
    #[error("Accuracy inputs differ in length: {actual} actual vs {predicted} predicted")]
    LengthMismatch {
        /// Length of the actual series.
        actual: usize,
        /// Length of the predicted series.
        predicted: usize,
    },
}

/// One dated prediction with interval bounds (`lower <= point <= upper`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPoint {
    /// Calendar date of the prediction.
    pub date: NaiveDate,
    /// Point estimate of the incident count.
    pub point: f64,
    /// Lower interval bound.
    pub lower: f64,
    /// Upper interval bound.
    pub upper: f64,
}

/// Predictions covering the historical fit range plus the future horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastSeries {
    /// Predictions in date order: history first, then the horizon.
    pub points: Vec<ForecastPoint>,
    /// Number of historical (in-sample) days covered.
    pub history_days: usize,
    /// Number of future days covered.
    pub horizon_days: usize,
    /// Confidence level of the interval bounds.
    pub confidence: f64,
    /// Whether a seasonal decomposition was used (vs plain trend).
    pub seasonal: bool,
}

/// Forecast evaluation metrics, recovered alongside a holdout comparison.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccuracyMetrics {
    /// Mean absolute error.
    pub mae: f64,
    /// Root mean squared error.
    pub rmse: f64,
}

/// Fits the seasonal model to a daily count series and predicts
/// `horizon_days` past the last observed date.
///
/// Calendar gaps between the first and last date are filled with zero
/// counts before fitting: a day with no incidents is a zero observation,
/// not missing data. The result covers the full historical span
/// (in-sample predictions) plus the horizon, every point carrying
/// interval bounds at `confidence`, clamped so counts never go negative.
///
/// # Errors
///
/// Returns [`ForecastError::InvalidHorizon`] for a zero horizon,
/// [`ForecastError::InsufficientData`] for fewer than two distinct dates,
/// and [`ForecastError::Fit`] if the underlying procedure fails.
pub fn forecast_daily(
    series: &[DailyCount],
    horizon_days: usize,
    confidence: f64,
) -> Result<ForecastSeries, ForecastError> {
    if horizon_days == 0 {
        return Err(ForecastError::InvalidHorizon {
            requested: horizon_days,
        });
    }

    let (start_date, values) = fill_calendar_gaps(series)?;

    let seasonal = values.len() >= MIN_WEEKLY_POINTS;
    let (in_sample, future) = if seasonal {
        let mut periods = vec![WEEKLY_PERIOD];
        if values.len() >= MIN_YEARLY_POINTS {
            periods.push(YEARLY_PERIOD);
        }
        fit_mstl(&values, periods, horizon_days, confidence)?
    } else {
        fit_ets(&values, horizon_days, confidence)?
    };

    log::debug!(
        "Forecast over {} history days + {horizon_days} horizon (seasonal: {seasonal})",
        values.len()
    );

    let mut points = Vec::with_capacity(values.len() + horizon_days);
    points.extend(dated_points(&in_sample, start_date, 0));
    #[allow(clippy::cast_possible_wrap)]
    points.extend(dated_points(&future, start_date, values.len() as i64));

    Ok(ForecastSeries {
        points,
        history_days: values.len(),
        horizon_days,
        confidence,
        seasonal,
    })
}

/// Mean absolute error and root mean squared error between an actual and
/// a predicted series.
///
/// # Errors
///
/// Returns [`ForecastError::LengthMismatch`] if the series are empty or
/// differ in length.
pub fn accuracy(actual: &[f64], predicted: &[f64]) -> Result<AccuracyMetrics, ForecastError> {
    if actual.is_empty() || actual.len() != predicted.len() {
        return Err(ForecastError::LengthMismatch {
            actual: actual.len(),
            predicted: predicted.len(),
        });
    }

    #[allow(clippy::cast_precision_loss)]
    let n = actual.len() as f64;
    let mae = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs())
        .sum::<f64>()
        / n;
    let rmse = (actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum::<f64>()
        / n)
        .sqrt();

    Ok(AccuracyMetrics { mae, rmse })
}

/// Sorts the series, merges duplicate dates, and fills calendar gaps with
/// zero counts. Returns the first date and the filled value sequence.
fn fill_calendar_gaps(series: &[DailyCount]) -> Result<(NaiveDate, Vec<f64>), ForecastError> {
    let mut sorted: Vec<DailyCount> = series.to_vec();
    sorted.sort_by_key(|d| d.date);
    sorted.dedup_by(|next, kept| {
        if next.date == kept.date {
            kept.count += next.count;
            true
        } else {
            false
        }
    });

    let (Some(first), Some(last)) = (sorted.first(), sorted.last()) else {
        return Err(ForecastError::InsufficientData { distinct: 0 });
    };
    if sorted.len() < 2 {
        return Err(ForecastError::InsufficientData {
            distinct: sorted.len(),
        });
    }

    let start_date = first.date;
    let span = (last.date - start_date).num_days() + 1;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let mut values = vec![0.0_f64; span as usize];
    for observation in &sorted {
        let offset = (observation.date - start_date).num_days();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
        {
            values[offset as usize] = observation.count as f64;
        }
    }

    Ok((start_date, values))
}

/// MSTL seasonal decomposition with an `AutoETS` trend model.
fn fit_mstl(
    values: &[f64],
    periods: Vec<usize>,
    horizon: usize,
    confidence: f64,
) -> Result<(augurs::Forecast, augurs::Forecast), ForecastError> {
    let trend = AutoETS::non_seasonal().into_trend_model();
    let mut forecaster = Forecaster::new(MSTLModel::new(periods, trend));
    forecaster.fit(values).map_err(fit_error)?;
    let in_sample = forecaster.predict_in_sample(confidence).map_err(fit_error)?;
    let future = forecaster.predict(horizon, confidence).map_err(fit_error)?;
    Ok((in_sample, future))
}

/// Plain non-seasonal `AutoETS`, for series under two full weeks.
fn fit_ets(
    values: &[f64],
    horizon: usize,
    confidence: f64,
) -> Result<(augurs::Forecast, augurs::Forecast), ForecastError> {
    let mut forecaster = Forecaster::new(AutoETS::non_seasonal());
    forecaster.fit(values).map_err(fit_error)?;
    let in_sample = forecaster.predict_in_sample(confidence).map_err(fit_error)?;
    let future = forecaster.predict(horizon, confidence).map_err(fit_error)?;
    Ok((in_sample, future))
}

fn fit_error(error: impl std::fmt::Display) -> ForecastError {
    ForecastError::Fit {
        message: error.to_string(),
    }
}

/// Converts a raw library forecast into dated points starting
/// `day_offset` days after `start_date`, clamping counts at zero while
/// preserving `lower <= point <= upper`.
fn dated_points(
    forecast: &augurs::Forecast,
    start_date: NaiveDate,
    day_offset: i64,
) -> Vec<ForecastPoint> {
    let (lower, upper) = forecast.intervals.as_ref().map_or_else(
        || {
            // No intervals from the model: degrade to the point estimate.
            (forecast.point.clone(), forecast.point.clone())
        },
        |intervals| (intervals.lower.clone(), intervals.upper.clone()),
    );

    forecast
        .point
        .iter()
        .zip(lower)
        .zip(upper)
        .enumerate()
        .map(|(i, ((&p, l), u))| {
            let point = p.max(0.0);
            #[allow(clippy::cast_possible_wrap)]
            let date = start_date + Duration::days(day_offset + i as i64);
            ForecastPoint {
                date,
                point,
                lower: l.max(0.0).min(point),
                upper: u.max(point),
            }
        })
        .collect()
}
