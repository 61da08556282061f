//! Configuration schema types
//!
//! Every section has defaults, so an empty file (or no file at all) yields a
//! working configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main Tally configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TallyConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Raw input location
    #[serde(default)]
    pub input: InputConfig,

    /// Derived artifact location
    #[serde(default)]
    pub output: OutputConfig,

    /// Scan tuning
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TallyConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.input.validate()?;
        self.output.validate()?;
        self.pipeline.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Compute everything but do not write artifacts
    #[serde(default)]
    pub dry_run: bool,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

/// Raw NDJSON input configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    /// Root of the NDJSON export, searched recursively
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// File-name prefix of encounter files
    #[serde(default = "default_encounter_prefix")]
    pub encounter_prefix: String,

    /// File-name prefix of condition files
    #[serde(default = "default_condition_prefix")]
    pub condition_prefix: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            encounter_prefix: default_encounter_prefix(),
            condition_prefix: default_condition_prefix(),
        }
    }
}

impl InputConfig {
    fn validate(&self) -> Result<(), String> {
        if self.data_dir.as_os_str().is_empty() {
            return Err("input.data_dir cannot be empty".to_string());
        }
        if self.encounter_prefix.is_empty() {
            return Err("input.encounter_prefix cannot be empty".to_string());
        }
        if self.condition_prefix.is_empty() {
            return Err("input.condition_prefix cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Derived artifact configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory the artifacts are written to (created if missing)
    #[serde(default = "default_derived_dir")]
    pub derived_dir: PathBuf,

    /// Metrics artifact file name
    #[serde(default = "default_metrics_file")]
    pub metrics_file: String,

    /// Forecast artifact file name
    #[serde(default = "default_forecast_file")]
    pub forecast_file: String,

    /// Pretty-print JSON
    #[serde(default = "default_true")]
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            derived_dir: default_derived_dir(),
            metrics_file: default_metrics_file(),
            forecast_file: default_forecast_file(),
            pretty: true,
        }
    }
}

impl OutputConfig {
    /// Full path of the metrics artifact
    pub fn metrics_path(&self) -> PathBuf {
        self.derived_dir.join(&self.metrics_file)
    }

    /// Full path of the forecast artifact
    pub fn forecast_path(&self) -> PathBuf {
        self.derived_dir.join(&self.forecast_file)
    }

    fn validate(&self) -> Result<(), String> {
        if self.derived_dir.as_os_str().is_empty() {
            return Err("output.derived_dir cannot be empty".to_string());
        }
        for (key, name) in [
            ("output.metrics_file", &self.metrics_file),
            ("output.forecast_file", &self.forecast_file),
        ] {
            if name.is_empty() {
                return Err(format!("{key} cannot be empty"));
            }
            if name.contains('/') || name.contains('\\') {
                return Err(format!("{key} must be a file name, got '{name}'"));
            }
        }
        if self.metrics_file == self.forecast_file {
            return Err("output.metrics_file and output.forecast_file must differ".to_string());
        }
        Ok(())
    }
}

/// Scan configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Files scanned concurrently (1 = strictly sequential)
    #[serde(default = "default_max_parallel_files")]
    pub max_parallel_files: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_parallel_files: default_max_parallel_files(),
        }
    }
}

impl PipelineConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_parallel_files == 0 || self.max_parallel_files > 64 {
            return Err(format!(
                "pipeline.max_parallel_files must be between 1 and 64, got {}",
                self.max_parallel_files
            ));
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }
        if self.local_enabled && self.local_path.is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data/raw/fhir")
}

fn default_encounter_prefix() -> String {
    "Encounter".to_string()
}

fn default_condition_prefix() -> String {
    "Condition".to_string()
}

fn default_derived_dir() -> PathBuf {
    PathBuf::from("data/derived")
}

fn default_metrics_file() -> String {
    "metrics.json".to_string()
}

fn default_forecast_file() -> String {
    "forecast.json".to_string()
}

fn default_max_parallel_files() -> usize {
    4
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
