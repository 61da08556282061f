//! Derive command implementation
//!
//! This module implements the `derive` command, which scans the raw NDJSON
//! export and writes the metrics and forecast artifacts.

use super::exit_code_for;
use crate::config::{load_config_or_default, TallyConfig};
use crate::core::pipeline::PipelineCoordinator;
use crate::log_error_with_context;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the derive command
#[derive(Args, Debug, Default)]
pub struct DeriveArgs {
    /// Override the raw NDJSON directory
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Override the artifact output directory
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Compute everything without writing artifacts
    #[arg(long)]
    pub dry_run: bool,

    /// Files scanned concurrently (1 = sequential)
    #[arg(long, value_name = "N")]
    pub parallel: Option<usize>,
}

impl DeriveArgs {
    /// Apply CLI overrides on top of the loaded configuration
    pub fn apply_overrides(&self, config: &mut TallyConfig) {
        if let Some(dir) = &self.data_dir {
            tracing::info!(data_dir = %dir.display(), "Overriding data directory from CLI");
            config.input.data_dir = dir.clone();
        }
        if let Some(dir) = &self.out_dir {
            tracing::info!(out_dir = %dir.display(), "Overriding output directory from CLI");
            config.output.derived_dir = dir.clone();
        }
        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }
        if let Some(parallel) = self.parallel {
            config.pipeline.max_parallel_files = parallel;
        }
    }

    /// Execute the derive command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Starting derive command");

        let mut config = match load_config_or_default(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        self.apply_overrides(&mut config);

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        if config.application.dry_run {
            println!("🔍 DRY RUN MODE - No artifacts will be written");
            println!();
        }

        println!("🚀 Deriving from {}", config.input.data_dir.display());
        println!();

        let run = match PipelineCoordinator::new(config).execute().await {
            Ok(run) => run,
            Err(e) => {
                log_error_with_context!(&e, "Derive failed");
                eprintln!("Derive failed: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        let summary = &run.summary;
        let kpis = &run.metrics.kpis;
        println!("📊 Derive Summary:");
        println!(
            "  Files: {} encounter, {} condition",
            summary.encounter_files, summary.condition_files
        );
        println!("  Total Encounters: {}", kpis.total_encounters);
        println!("  Condition Records: {}", summary.condition_records);
        println!("  Days in Series: {}", summary.days_in_series);
        println!("  Notes: {}", summary.notes);
        println!("  Forecast Rows: {}", summary.forecast_points);
        println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
        println!();

        match &summary.artifacts {
            Some(paths) => {
                println!("✅ Wrote {}", paths.metrics.display());
                println!("✅ Wrote {}", paths.forecast.display());
            }
            None => println!("✅ Dry run completed"),
        }

        Ok(0)
    }
}
