//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "tally.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Tally configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        match fs::write(&self.output, Self::default_config()) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Point input.data_dir at your FHIR NDJSON export");
                println!("  2. Validate configuration: tally validate-config");
                println!("  3. Build artifacts: tally derive");
                println!("  4. Check artifacts: tally check");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }

    /// Commented default configuration
    pub fn default_config() -> &'static str {
        r#"# Tally Configuration File
# FHIR encounter metrics and forecast builder
#
# Any key can be overridden with TALLY_<SECTION>_<KEY>,
# e.g. TALLY_INPUT_DATA_DIR=/mnt/export

[application]
log_level = "info"          # trace | debug | info | warn | error
dry_run = false             # compute but do not write artifacts

[input]
data_dir = "data/raw/fhir"  # searched recursively for *.ndjson
encounter_prefix = "Encounter"
condition_prefix = "Condition"

[output]
derived_dir = "data/derived"
metrics_file = "metrics.json"
forecast_file = "forecast.json"
pretty = true

[pipeline]
max_parallel_files = 4      # 1..=64, 1 = sequential

[logging]
local_enabled = false
local_path = "logs"
local_rotation = "daily"    # daily | hourly
"#
    }
}
