//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod check;
pub mod derive;
pub mod init;
pub mod inspect;
pub mod validate;

use crate::domain::TallyError;

/// Exit code for a failed pipeline or inspection
pub(crate) fn exit_code_for(error: &TallyError) -> i32 {
    match error {
        TallyError::Configuration(_) => 2,
        e if e.is_input_error() => 3,
        _ => 5,
    }
}
