//! Encounter volume forecast
//!
//! A deliberately simple seasonal-naive projection: each future day is the
//! mean of the same weekday over the last four weeks, with a band of 1.5
//! standard deviations of the window. No I/O; the only failure is a series
//! date that is not `YYYY-MM-DD`, which the aggregator never produces.

use crate::domain::snapshot::{DailyCount, ForecastPoint, ForecastSnapshot};
use crate::domain::{Result, TallyError};
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

/// Identifier written to `method`
pub const FORECAST_METHOD: &str = "weekday-average-std-bounds";

/// Days of history the forecast is computed from
pub const HISTORY_WINDOW_DAYS: usize = 28;

/// Days projected after the last history date
pub const FORECAST_HORIZON_DAYS: i64 = 14;

/// Width of the band in standard deviations on each side
pub const BAND_WIDTH: f64 = 1.5;

/// Builds the forecast from a daily series
///
/// The series is expected ascending by date; it is re-sorted here. An
/// empty series yields empty `history` and `forecast`.
///
/// # Errors
///
/// Returns [`TallyError::ContractViolation`] if a date is not `YYYY-MM-DD`.
///
/// # Examples
///
/// ```
/// use tally::core::forecast::build_forecast;
/// use tally::domain::DailyCount;
///
/// let series: Vec<DailyCount> = (1..=7)
///     .map(|d| DailyCount::new(format!("2024-01-{d:02}"), 10))
///     .collect();
/// let forecast = build_forecast(&series, chrono::Utc::now()).unwrap();
/// assert_eq!(forecast.forecast.len(), 14);
/// assert_eq!(forecast.forecast[0].predicted_value, 10);
/// ```
pub fn build_forecast(
    series: &[DailyCount],
    generated_at: DateTime<Utc>,
) -> Result<ForecastSnapshot> {
    let mut sorted = series.to_vec();
    sorted.sort_by(|a, b| a.date.cmp(&b.date));
    let history = sorted.split_off(sorted.len().saturating_sub(HISTORY_WINDOW_DAYS));

    let days = history
        .iter()
        .map(|entry| parse_day(&entry.date).map(|day| (day, entry.count)))
        .collect::<Result<Vec<_>>>()?;

    let averages = weekday_averages(&days);
    let std = sample_std_dev(&days.iter().map(|(_, count)| *count as f64).collect::<Vec<_>>());

    let forecast = match days.last() {
        Some((last_day, _)) => (1..=FORECAST_HORIZON_DAYS)
            .map(|offset| {
                let day = *last_day + Duration::days(offset);
                project(day, averages[weekday_index(day)], std)
            })
            .collect(),
        None => Vec::new(),
    };

    tracing::debug!(
        history_days = history.len(),
        std_dev = std,
        points = forecast.len(),
        "Forecast built"
    );

    Ok(ForecastSnapshot {
        generated_at,
        method: FORECAST_METHOD.to_string(),
        history,
        forecast,
    })
}

/// Mean count per weekday (index 0 = Sunday); 0 for unobserved weekdays
pub fn weekday_averages(days: &[(NaiveDate, u64)]) -> [f64; 7] {
    let mut totals = [0f64; 7];
    let mut observed = [0u32; 7];
    for (day, count) in days {
        let idx = weekday_index(*day);
        totals[idx] += *count as f64;
        observed[idx] += 1;
    }

    let mut averages = [0f64; 7];
    for idx in 0..7 {
        if observed[idx] > 0 {
            averages[idx] = totals[idx] / f64::from(observed[idx]);
        }
    }
    averages
}

/// Sample standard deviation (n−1 divisor); 0 for fewer than 2 values
pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt()
}

fn project(day: NaiveDate, weekday_average: f64, std: f64) -> ForecastPoint {
    let predicted = weekday_average.round();
    // Flat or single-point windows still get a non-degenerate band
    let spread = if std > 0.0 {
        std
    } else {
        weekday_average.sqrt() + 1.0
    };

    let lower = (predicted - BAND_WIDTH * spread).round().max(0.0);
    let upper = (predicted + BAND_WIDTH * spread).round();

    ForecastPoint {
        date: day.format("%Y-%m-%d").to_string(),
        predicted_value: predicted as i64,
        lower_bound: lower as i64,
        upper_bound: upper as i64,
    }
}

fn weekday_index(day: NaiveDate) -> usize {
    day.weekday().num_days_from_sunday() as usize
}

fn parse_day(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| {
        TallyError::ContractViolation(format!("series date '{raw}' is not YYYY-MM-DD: {e}"))
    })
}
