//! Pipeline coordinator - main orchestrator for a derive run
//!
//! Discovery → per-file scans → ordered merge → metrics → forecast → write.
//! Files are scanned on the blocking pool, up to `max_parallel_files` at a
//! time, and partial results are merged strictly in discovery order. Output
//! and the reported error (first failing file in discovery order) therefore do
//! not depend on worker timing.

use super::artifacts::write_artifacts;
use super::summary::RunSummary;
use crate::adapters::ndjson::find_ndjson_files;
use crate::config::TallyConfig;
use crate::core::aggregate::{build_snapshot, scan_file, ConditionTally, EncounterTally, ResourceTally};
use crate::core::forecast::build_forecast;
use crate::domain::{ForecastSnapshot, MetricsSnapshot, Result, TallyError};
use chrono::Utc;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::path::PathBuf;
use std::time::Instant;

/// Everything one run produced
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub metrics: MetricsSnapshot,
    pub forecast: ForecastSnapshot,
    pub summary: RunSummary,
}

/// Pipeline coordinator
pub struct PipelineCoordinator {
    config: TallyConfig,
}

impl PipelineCoordinator {
    /// Create a new pipeline coordinator
    pub fn new(config: TallyConfig) -> Self {
        Self { config }
    }

    /// Configuration this coordinator runs with
    pub fn config(&self) -> &TallyConfig {
        &self.config
    }

    /// Execute one full run
    ///
    /// Either both artifacts are written (unless `dry_run`) or the run fails
    /// and nothing is written.
    ///
    /// # Errors
    ///
    /// - [`TallyError::NotFound`] if the data directory is missing
    /// - [`TallyError::MalformedRecord`] for the first bad line in discovery order
    /// - [`TallyError::Io`] on filesystem failures
    pub async fn execute(&self) -> Result<PipelineRun> {
        let start_time = Instant::now();
        let generated_at = Utc::now();
        let input = &self.config.input;
        let parallel = self.config.pipeline.max_parallel_files;

        tracing::info!(
            data_dir = %input.data_dir.display(),
            max_parallel_files = parallel,
            "Starting pipeline run"
        );

        let encounter_files = find_ndjson_files(&input.data_dir, &input.encounter_prefix)?;
        let condition_files = find_ndjson_files(&input.data_dir, &input.condition_prefix)?;

        for (prefix, files) in [
            (&input.encounter_prefix, &encounter_files),
            (&input.condition_prefix, &condition_files),
        ] {
            if files.is_empty() {
                tracing::warn!(
                    prefix = %prefix,
                    data_dir = %input.data_dir.display(),
                    "No input files found for resource type"
                );
            }
        }

        let encounters: EncounterTally = scan_parallel(&encounter_files, parallel).await?;
        let conditions: ConditionTally = scan_parallel(&condition_files, parallel).await?;

        let mut summary = RunSummary::new();
        summary.encounter_files = encounter_files.len();
        summary.condition_files = condition_files.len();
        summary.condition_records = conditions.records;
        summary.conditions_skipped = conditions.skipped;

        let metrics = build_snapshot(encounters, conditions, generated_at);
        let forecast = build_forecast(&metrics.series.encounters_by_day, generated_at)?;

        summary.total_encounters = metrics.kpis.total_encounters;
        summary.days_in_series = metrics.series.encounters_by_day.len();
        summary.notes = metrics.notes.len();
        summary.forecast_points = forecast.forecast.len();
        summary.dry_run = self.config.application.dry_run;

        if summary.dry_run {
            tracing::info!("Dry run: artifacts not written");
        } else {
            summary.artifacts = Some(write_artifacts(&self.config.output, &metrics, &forecast)?);
        }

        let summary = summary.with_duration(start_time.elapsed());
        summary.log_summary();

        Ok(PipelineRun {
            metrics,
            forecast,
            summary,
        })
    }
}

/// Scans files concurrently and merges the partial results in slice order
///
/// At most `max_parallel` scans run at once. The first error in slice order
/// ends the reduction.
pub async fn scan_parallel<T: ResourceTally>(paths: &[PathBuf], max_parallel: usize) -> Result<T> {
    stream::iter(paths.to_vec())
        .map(|path| async move {
            match tokio::task::spawn_blocking(move || scan_file::<T>(&path)).await {
                Ok(result) => result,
                Err(e) => Err(TallyError::Io(format!("File scan task failed: {e}"))),
            }
        })
        .buffered(max_parallel.max(1))
        .try_fold(T::default(), |acc, part| async move { Ok(acc.merge(part)) })
        .await
}
