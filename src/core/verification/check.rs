//! Structural checks on written artifacts
//!
//! Reads `metrics.json` and `forecast.json` back as plain JSON and reports
//! every violated invariant instead of stopping at the first.

use super::checksum::content_digest;
use super::report::{ArtifactReport, KpiSummary};
use crate::core::aggregate::TOP_CONDITIONS_LIMIT;
use crate::core::forecast::FORECAST_HORIZON_DAYS;
use crate::domain::{Result, TallyError};
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

const TOP_LEVEL_KEYS: &[&str] = &[
    "generated_at",
    "kpis",
    "series",
    "breakdowns",
    "top_conditions",
    "notes",
];

const KPI_KEYS: &[&str] = &["total_encounters", "avg_los_days", "revisit_rate_30d"];

/// Checks the artifacts in `derived_dir`
///
/// # Errors
///
/// Returns [`TallyError::NotFound`] if either file is missing and
/// [`TallyError::Serialization`] if either is not valid JSON. Everything else
/// lands in the report's error list.
pub fn verify_artifacts(
    derived_dir: impl AsRef<Path>,
    metrics_file: &str,
    forecast_file: &str,
) -> Result<ArtifactReport> {
    let derived_dir = derived_dir.as_ref();
    let mut report = ArtifactReport::new(
        derived_dir.join(metrics_file),
        derived_dir.join(forecast_file),
    );

    tracing::info!(derived_dir = %derived_dir.display(), "Checking artifacts");

    let metrics = read_json(&report.metrics_path)?;
    let forecast = read_json(&report.forecast_path)?;

    check_metrics(&metrics, &mut report);
    check_forecast(&forecast, &mut report);
    report.content_digest = content_digest(&metrics, &forecast)?;

    if report.is_success() {
        tracing::info!(digest = %report.content_digest, "Artifact check passed");
    } else {
        tracing::warn!(errors = report.errors.len(), "Artifact check failed");
    }

    Ok(report)
}

fn read_json(path: &Path) -> Result<Value> {
    let raw = fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => TallyError::NotFound(path.display().to_string()),
        _ => TallyError::Io(format!("Failed to read {}: {}", path.display(), e)),
    })?;
    serde_json::from_str(&raw).map_err(|e| {
        TallyError::Serialization(format!("{} is not valid JSON: {}", path.display(), e))
    })
}

fn check_metrics(metrics: &Value, report: &mut ArtifactReport) {
    for key in TOP_LEVEL_KEYS {
        if metrics.get(key).is_none() {
            report.record_error(format!("Missing key: {key}"));
        }
    }

    let kpis = metrics.get("kpis");
    for key in KPI_KEYS {
        if kpis.and_then(|k| k.get(key)).is_none() {
            report.record_error(format!("Missing KPI: {key}"));
        }
    }

    let total = kpis
        .and_then(|k| k.get("total_encounters"))
        .and_then(Value::as_u64)
        .unwrap_or(0);
    let days = array_at(metrics, &["series", "encounters_by_day"]);
    let classes = array_at(metrics, &["breakdowns", "encounters_by_class"]);
    let conditions = array_at(metrics, &["top_conditions"]);

    if total > 0 {
        if days.is_empty() {
            report.record_error("Series: encounters_by_day is empty");
        }
        if classes.is_empty() {
            report.record_error("Breakdowns: encounters_by_class is empty");
        }
        if conditions.is_empty() {
            report.record_error("Top conditions array is empty");
        }
    }

    check_days(days, report);
    check_ranked("encounters_by_class", classes, "class", report);
    check_ranked("top_conditions", conditions, "code", report);
    if conditions.len() > TOP_CONDITIONS_LIMIT {
        report.record_error(format!(
            "top_conditions has {} entries, limit is {}",
            conditions.len(),
            TOP_CONDITIONS_LIMIT
        ));
    }

    if kpis.is_some() {
        report.kpis = Some(KpiSummary {
            total_encounters: total,
            avg_los_days: kpis.and_then(|k| k.get("avg_los_days")).and_then(Value::as_f64),
            revisit_rate_30d: kpis
                .and_then(|k| k.get("revisit_rate_30d"))
                .and_then(Value::as_f64),
            days_in_series: days.len(),
            classes: classes
                .iter()
                .filter_map(|c| Some((str_at(c, "class")?.to_string(), c.get("count")?.as_u64()?)))
                .collect(),
            top_condition: conditions
                .first()
                .and_then(|c| str_at(c, "display"))
                .map(str::to_string),
        });
    }
}

fn check_days(days: &[Value], report: &mut ArtifactReport) {
    let mut previous: Option<&str> = None;
    for (i, day) in days.iter().enumerate() {
        let Some(date) = str_at(day, "date") else {
            report.record_error(format!("encounters_by_day[{i}] has no date"));
            continue;
        };
        if let Some(prev) = previous {
            if date <= prev {
                report.record_error(format!(
                    "encounters_by_day is not strictly ascending at {i} ({prev} then {date})"
                ));
            }
        }
        previous = Some(date);
    }
}

/// Entries must be sorted by count descending, then key ascending, with unique keys
fn check_ranked(name: &str, entries: &[Value], key_field: &str, report: &mut ArtifactReport) {
    let mut seen = HashSet::new();
    let mut previous: Option<(u64, &str)> = None;

    for (i, entry) in entries.iter().enumerate() {
        let (Some(key), Some(count)) = (
            str_at(entry, key_field),
            entry.get("count").and_then(Value::as_u64),
        ) else {
            report.record_error(format!("{name}[{i}] lacks {key_field} or count"));
            continue;
        };

        if !seen.insert(key) {
            report.record_error(format!("{name} repeats {key_field} '{key}'"));
        }
        if let Some((prev_count, prev_key)) = previous {
            if count > prev_count || (count == prev_count && key <= prev_key) {
                report.record_error(format!("{name} is out of order at {i} ('{key}')"));
            }
        }
        previous = Some((count, key));
    }
}

fn check_forecast(forecast: &Value, report: &mut ArtifactReport) {
    let Some(points) = forecast.get("forecast").and_then(Value::as_array) else {
        report.record_error("forecast is missing or not an array");
        return;
    };
    report.forecast_points = points.len();

    let has_history = forecast
        .get("history")
        .and_then(Value::as_array)
        .is_some_and(|h| !h.is_empty());
    if has_history && points.len() as i64 != FORECAST_HORIZON_DAYS {
        report.record_error(format!(
            "Forecast should have exactly {} rows, got {}",
            FORECAST_HORIZON_DAYS,
            points.len()
        ));
    }

    for (i, point) in points.iter().enumerate() {
        let (Some(yhat), Some(lower), Some(upper)) = (
            point.get("yhat").and_then(Value::as_f64),
            point.get("lower").and_then(Value::as_f64),
            point.get("upper").and_then(Value::as_f64),
        ) else {
            report.record_error(format!("Forecast row {i} has invalid number types"));
            continue;
        };
        if !(lower <= yhat && yhat <= upper) {
            report.record_error(format!("Forecast row {i} violates lower <= yhat <= upper"));
        }
        if lower < 0.0 {
            report.record_error(format!("Forecast row {i} has a negative lower bound"));
        }
    }
}

fn array_at<'a>(value: &'a Value, path: &[&str]) -> &'a [Value] {
    path.iter()
        .try_fold(value, |v, key| v.get(key))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn str_at<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str)
}
