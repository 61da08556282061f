//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Console output filtered by level or `RUST_LOG`
//! - Optional JSON-formatted file logs with rotation
//! - Macros for the recurring pipeline events
//!
//! # Example
//!
//! ```no_run
//! use tally::logging::init_logging;
//! use tally::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Pipeline started");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};

/// Log the start of a file scan
///
/// # Example
///
/// ```no_run
/// use tally::log_scan_start;
///
/// log_scan_start!("Encounter", "data/raw/fhir/Encounter.000.ndjson");
/// ```
#[macro_export]
macro_rules! log_scan_start {
    ($resource:expr, $path:expr) => {
        tracing::debug!(
            resource = $resource,
            path = %$path,
            "Scanning file"
        );
    };
}

/// Log the completion of a file scan
///
/// # Example
///
/// ```no_run
/// use tally::log_scan_complete;
/// use std::time::Duration;
///
/// log_scan_complete!("Condition", "Condition.000.ndjson", 1200u64, Duration::from_millis(35));
/// ```
#[macro_export]
macro_rules! log_scan_complete {
    ($resource:expr, $path:expr, $records:expr, $duration:expr) => {
        tracing::info!(
            resource = $resource,
            path = %$path,
            records = $records,
            duration_ms = $duration.as_millis() as u64,
            "Scanned file"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use tally::log_error_with_context;
/// use tally::domain::TallyError;
///
/// let error = TallyError::NotFound("data/raw/fhir".to_string());
/// log_error_with_context!(&error, "Pipeline aborted");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
