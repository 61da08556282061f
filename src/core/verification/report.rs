//! Artifact check report structures

use crate::domain::labels::encounter_class_info;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Headline figures read back from the metrics artifact
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KpiSummary {
    pub total_encounters: u64,
    pub avg_los_days: Option<f64>,
    pub revisit_rate_30d: Option<f64>,
    pub days_in_series: usize,

    /// `(class code, count)` in artifact order
    pub classes: Vec<(String, u64)>,

    /// Display of the most frequent condition
    pub top_condition: Option<String>,
}

/// Result of checking one pair of artifacts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactReport {
    /// When the check was performed
    pub checked_at: DateTime<Utc>,

    pub metrics_path: PathBuf,
    pub forecast_path: PathBuf,

    /// Every problem found, in check order
    pub errors: Vec<String>,

    /// Present when the metrics artifact had readable KPIs
    pub kpis: Option<KpiSummary>,

    /// Forecast rows found
    pub forecast_points: usize,

    /// SHA-256 over both artifacts minus their timestamps
    pub content_digest: String,
}

impl ArtifactReport {
    /// Create an empty report for the given artifact paths
    pub fn new(metrics_path: PathBuf, forecast_path: PathBuf) -> Self {
        Self {
            checked_at: Utc::now(),
            metrics_path,
            forecast_path,
            errors: Vec::new(),
            kpis: None,
            forecast_points: 0,
            content_digest: String::new(),
        }
    }

    /// Record a failed check
    pub fn record_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Check if every check passed
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Format the report as a human-readable string
    pub fn format_summary(&self) -> String {
        let mut summary = String::new();
        if self.is_success() {
            summary.push_str("✅ Artifacts are valid\n");
        } else {
            summary.push_str(&format!(
                "❌ Artifact check failed with {} error(s):\n",
                self.errors.len()
            ));
            for error in &self.errors {
                summary.push_str(&format!("  - {error}\n"));
            }
        }

        summary.push_str(&format!("  Metrics: {}\n", self.metrics_path.display()));
        summary.push_str(&format!("  Forecast: {}\n", self.forecast_path.display()));

        if let Some(kpis) = &self.kpis {
            summary.push_str("\n📊 Summary\n");
            summary.push_str(&format!("  Total encounters: {}\n", kpis.total_encounters));
            summary.push_str(&format!(
                "  Avg LOS (days): {}\n",
                display_optional(kpis.avg_los_days)
            ));
            summary.push_str(&format!(
                "  Revisit rate (30d): {}\n",
                display_optional(kpis.revisit_rate_30d)
            ));
            summary.push_str(&format!("  Days in series: {}\n", kpis.days_in_series));
            summary.push_str(&format!(
                "  Top condition: {}\n",
                kpis.top_condition.as_deref().unwrap_or("N/A")
            ));

            if !kpis.classes.is_empty() {
                summary.push_str("\n  Encounters by class:\n");
                for (code, count) in &kpis.classes {
                    let info = encounter_class_info(code);
                    summary.push_str(&format!(
                        "    {} {} ({}): {}\n",
                        info.marker, info.label, code, count
                    ));
                }
            }
        }

        summary.push_str(&format!("\n  Forecast rows: {}\n", self.forecast_points));
        if !self.content_digest.is_empty() {
            summary.push_str(&format!("  Content digest: {}\n", self.content_digest));
        }

        summary
    }
}

fn display_optional(value: Option<f64>) -> String {
    value.map_or_else(|| "null".to_string(), |v| v.to_string())
}
