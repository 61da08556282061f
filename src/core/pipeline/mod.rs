//! Pipeline orchestration
//!
//! This module runs the full derive workflow:
//! - [`coordinator`] - discovery, scanning, merging, forecasting
//! - [`artifacts`] - atomic writing of the two output documents
//! - [`summary`] - run statistics and reporting

pub mod artifacts;
pub mod coordinator;
pub mod summary;

pub use artifacts::{write_artifacts, ArtifactPaths};
pub use coordinator::{scan_parallel, PipelineCoordinator, PipelineRun};
pub use summary::RunSummary;
