//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::TallyConfig;
use crate::domain::errors::TallyError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into TallyConfig
/// 4. Applies environment variable overrides (TALLY_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use tally::config::loader::load_config;
///
/// let config = load_config("tally.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<TallyConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(TallyError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        TallyError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: TallyConfig = toml::from_str(&contents)
        .map_err(|e| TallyError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    finish(&mut config)?;
    Ok(config)
}

/// Loads `path` if it exists, otherwise starts from defaults
///
/// Environment overrides and validation apply in both cases.
pub fn load_config_or_default(path: impl AsRef<Path>) -> Result<TallyConfig> {
    let path = path.as_ref();
    if path.exists() {
        return load_config(path);
    }

    tracing::info!(
        config_path = %path.display(),
        "Configuration file not found, using defaults"
    );
    let mut config = TallyConfig::default();
    finish(&mut config)?;
    Ok(config)
}

fn finish(config: &mut TallyConfig) -> Result<()> {
    apply_env_overrides(config)?;
    config.validate().map_err(|e| {
        TallyError::Configuration(format!("Configuration validation failed: {}", e))
    })
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| TallyError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(TallyError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using TALLY_* prefix
///
/// Environment variables follow the pattern: TALLY_<SECTION>_<KEY>
/// For example: TALLY_INPUT_DATA_DIR, TALLY_PIPELINE_MAX_PARALLEL_FILES
fn apply_env_overrides(config: &mut TallyConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("TALLY_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("TALLY_APPLICATION_DRY_RUN") {
        config.application.dry_run = val.parse().unwrap_or(false);
    }

    // Input overrides
    if let Ok(val) = std::env::var("TALLY_INPUT_DATA_DIR") {
        config.input.data_dir = PathBuf::from(val);
    }
    if let Ok(val) = std::env::var("TALLY_INPUT_ENCOUNTER_PREFIX") {
        config.input.encounter_prefix = val;
    }
    if let Ok(val) = std::env::var("TALLY_INPUT_CONDITION_PREFIX") {
        config.input.condition_prefix = val;
    }

    // Output overrides
    if let Ok(val) = std::env::var("TALLY_OUTPUT_DERIVED_DIR") {
        config.output.derived_dir = PathBuf::from(val);
    }
    if let Ok(val) = std::env::var("TALLY_OUTPUT_PRETTY") {
        config.output.pretty = val.parse().unwrap_or(true);
    }

    // Pipeline overrides
    if let Ok(val) = std::env::var("TALLY_PIPELINE_MAX_PARALLEL_FILES") {
        let parallel = val.parse().map_err(|_| {
            TallyError::Configuration(format!(
                "TALLY_PIPELINE_MAX_PARALLEL_FILES must be a positive integer, got '{val}'"
            ))
        })?;
        config.pipeline.max_parallel_files = parallel;
    }

    // Logging overrides
    if let Ok(val) = std::env::var("TALLY_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("TALLY_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}
