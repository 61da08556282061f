//! Artifact verification
//!
//! Reads written artifacts back, checks their structural invariants and
//! computes a content digest for comparing runs.

pub mod check;
pub mod checksum;
pub mod report;

pub use check::verify_artifacts;
pub use checksum::{calculate_checksum, content_digest};
pub use report::{ArtifactReport, KpiSummary};
