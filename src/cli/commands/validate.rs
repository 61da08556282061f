//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Tally configuration file.

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates after applying overrides
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Dry Run: {}", config.application.dry_run);
        println!("  Data Directory: {}", config.input.data_dir.display());
        println!(
            "  Prefixes: {} / {}",
            config.input.encounter_prefix, config.input.condition_prefix
        );
        println!("  Metrics Artifact: {}", config.output.metrics_path().display());
        println!("  Forecast Artifact: {}", config.output.forecast_path().display());
        println!("  Parallel Files: {}", config.pipeline.max_parallel_files);
        println!(
            "  File Logging: {}",
            if config.logging.local_enabled {
                format!("{} ({})", config.logging.local_path, config.logging.local_rotation)
            } else {
                "disabled".to_string()
            }
        );
        println!();
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_validate_rejects_bad_parallelism() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tally.toml");
        fs::write(&path, "[pipeline]\nmax_parallel_files = 0\n").unwrap();

        let code = ValidateArgs {}
            .execute(path.to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, 2);
    }

    #[tokio::test]
    async fn test_validate_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.toml");
        let code = ValidateArgs {}
            .execute(path.to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, 2);
    }
}
