//! Configuration management for Tally.
//!
//! This module provides TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! Tally uses an optional TOML configuration file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `TALLY_<SECTION>_<KEY>` environment overrides
//! - Defaults for every setting
//! - Validation on load
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level and dry-run switch
//! - [`InputConfig`] - Where the raw NDJSON export lives and how files are named
//! - [`OutputConfig`] - Where the derived artifacts are written
//! - [`PipelineConfig`] - Scan parallelism
//! - [`LoggingConfig`] - Optional JSON file logging
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [input]
//! data_dir = "${FHIR_EXPORT_DIR}"
//!
//! [output]
//! derived_dir = "data/derived"
//!
//! [pipeline]
//! max_parallel_files = 8
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use tally::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("tally.toml")?;
//! println!("Reading from {}", config.input.data_dir.display());
//! # Ok(())
//! # }
//! ```

pub mod loader;
pub mod schema;

// Re-export commonly used types
pub use loader::{load_config, load_config_or_default};
pub use schema::{
    ApplicationConfig, InputConfig, LoggingConfig, OutputConfig, PipelineConfig, TallyConfig,
};
