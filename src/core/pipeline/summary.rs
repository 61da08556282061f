//! Run summary and reporting

use super::artifacts::ArtifactPaths;
use std::time::Duration;

/// Summary of one pipeline run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Encounter files discovered
    pub encounter_files: usize,

    /// Condition files discovered
    pub condition_files: usize,

    /// Encounter records read
    pub total_encounters: u64,

    /// Condition records read
    pub condition_records: u64,

    /// Condition records without a usable first coding
    pub conditions_skipped: u64,

    /// Distinct days in the daily series
    pub days_in_series: usize,

    /// Data-quality notes recorded
    pub notes: usize,

    /// Forecast points produced
    pub forecast_points: usize,

    /// Wall-clock duration of the run
    pub duration: Duration,

    /// Whether writing was skipped
    pub dry_run: bool,

    /// Written artifacts, `None` on a dry run
    pub artifacts: Option<ArtifactPaths>,
}

impl RunSummary {
    /// Create a new empty run summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Share of encounters that landed in the daily series, as a percentage
    pub fn dated_share(&self) -> f64 {
        if self.total_encounters == 0 {
            return 100.0;
        }
        let dated = self.total_encounters.saturating_sub(self.notes as u64);
        (dated as f64 / self.total_encounters as f64) * 100.0
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            encounter_files = self.encounter_files,
            condition_files = self.condition_files,
            total_encounters = self.total_encounters,
            condition_records = self.condition_records,
            days_in_series = self.days_in_series,
            forecast_points = self.forecast_points,
            duration_ms = self.duration.as_millis() as u64,
            dated_share = format!("{:.2}%", self.dated_share()),
            dry_run = self.dry_run,
            "Pipeline completed"
        );

        if self.notes > 0 {
            tracing::warn!(
                notes = self.notes,
                "Some encounters lacked a usable start date and were left out of the series"
            );
        }
        if self.conditions_skipped > 0 {
            tracing::debug!(
                skipped = self.conditions_skipped,
                "Condition records without code or display were skipped"
            );
        }
    }
}
