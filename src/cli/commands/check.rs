//! Check command implementation
//!
//! Reads the written artifacts back and reports any structural problem.

use crate::config::load_config_or_default;
use crate::core::verification::verify_artifacts;
use crate::domain::TallyError;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the check command
#[derive(Args, Debug, Default)]
pub struct CheckArgs {
    /// Override the artifact directory
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,
}

impl CheckArgs {
    /// Execute the check command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let mut config = match load_config_or_default(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };
        if let Some(dir) = &self.out_dir {
            config.output.derived_dir = dir.clone();
        }

        let output = &config.output;
        let report = match verify_artifacts(
            &output.derived_dir,
            &output.metrics_file,
            &output.forecast_file,
        ) {
            Ok(report) => report,
            Err(e @ (TallyError::NotFound(_) | TallyError::Serialization(_))) => {
                println!("❌ {e}");
                return Ok(1);
            }
            Err(e) => {
                eprintln!("Check failed: {e}");
                return Ok(5);
            }
        };

        print!("{}", report.format_summary());
        Ok(if report.is_success() { 0 } else { 1 })
    }
}
