//! Domain error types
//!
//! This module defines the error hierarchy for Tally. Input problems are split
//! into "structurally invalid" (fatal, surfaced here) and "missing but
//! well-formed" (tolerated and recorded as snapshot notes, never an error).

use thiserror::Error;

/// Longest line excerpt carried by [`TallyError::MalformedRecord`]
pub const SNIPPET_MAX_CHARS: usize = 80;

/// Main Tally error type
///
/// This is the primary error type used throughout the application.
#[derive(Debug, Error)]
pub enum TallyError {
    /// A required file or directory does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// A non-blank input line could not be parsed as a JSON object
    #[error("Malformed record at {path}:{line}: {message} (line starts with `{snippet}`)")]
    MalformedRecord {
        /// File the line was read from
        path: String,
        /// 1-based raw line number, blank lines included
        line: usize,
        /// Truncated excerpt of the offending line
        snippet: String,
        /// Parser message
        message: String,
    },

    /// Filesystem access failure
    #[error("I/O error: {0}")]
    Io(String),

    /// An internal invariant was broken (e.g. a series date not in `YYYY-MM-DD`)
    #[error("Contract violation: {0}")]
    ContractViolation(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),
}

impl TallyError {
    /// Builds a [`TallyError::MalformedRecord`], truncating the raw line to a
    /// short excerpt.
    pub fn malformed(
        path: impl Into<String>,
        line: usize,
        raw: &str,
        message: impl Into<String>,
    ) -> Self {
        TallyError::MalformedRecord {
            path: path.into(),
            line,
            snippet: snippet(raw),
            message: message.into(),
        }
    }

    /// True for errors caused by the input data rather than the environment
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            TallyError::NotFound(_) | TallyError::MalformedRecord { .. }
        )
    }
}

fn snippet(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.chars().count() <= SNIPPET_MAX_CHARS {
        return trimmed.to_string();
    }
    let mut cut: String = trimmed.chars().take(SNIPPET_MAX_CHARS).collect();
    cut.push_str("...");
    cut
}

// Conversion from std::io::Error
impl From<std::io::Error> for TallyError {
    fn from(err: std::io::Error) -> Self {
        TallyError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for TallyError {
    fn from(err: serde_json::Error) -> Self {
        TallyError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for TallyError {
    fn from(err: toml::de::Error) -> Self {
        TallyError::Configuration(format!("TOML parse error: {err}"))
    }
}
