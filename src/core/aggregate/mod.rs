//! Metrics aggregation
//!
//! This module computes the metrics snapshot from encounter and condition
//! files:
//! - [`accumulator`] - per-stream partial aggregates with an associative merge
//! - [`metrics`] - KPIs, sorting and truncation on the merged result
//!
//! Files are scanned one forward pass each; raw records are narrowed and
//! dropped immediately. The first malformed line aborts the whole aggregation.

pub mod accumulator;
pub mod metrics;

pub use accumulator::{ConditionTally, EncounterTally, ResourceTally};
pub use metrics::{build_snapshot, REVISIT_WINDOW_DAYS, TOP_CONDITIONS_LIMIT};

use crate::adapters::ndjson::NdjsonReader;
use crate::domain::{MetricsSnapshot, Result};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Scans one file into a fresh accumulator
///
/// # Errors
///
/// Propagates [`crate::domain::TallyError::NotFound`],
/// [`crate::domain::TallyError::MalformedRecord`] and I/O errors from the reader.
pub fn scan_file<T: ResourceTally>(path: &Path) -> Result<T> {
    crate::log_scan_start!(T::RESOURCE, path.display());
    let started = Instant::now();

    let mut tally = T::default();
    for record in NdjsonReader::open(path)? {
        tally.observe_json(&record?);
    }

    crate::log_scan_complete!(
        T::RESOURCE,
        path.display(),
        tally.records_seen(),
        started.elapsed()
    );
    Ok(tally)
}

/// Scans files in order and merges them left to right
pub fn scan_files<T: ResourceTally>(paths: &[PathBuf]) -> Result<T> {
    paths
        .iter()
        .try_fold(T::default(), |acc, path| Ok(acc.merge(scan_file::<T>(path)?)))
}

/// Sequential aggregation over discovered files
///
/// Encounter files are read in slice order, then condition files. An empty
/// slice contributes nothing.
///
/// # Examples
///
/// ```no_run
/// use tally::adapters::ndjson::find_ndjson_files;
/// use tally::core::aggregate::aggregate;
///
/// # fn example() -> tally::domain::Result<()> {
/// let encounters = find_ndjson_files("data/raw/fhir", "Encounter")?;
/// let conditions = find_ndjson_files("data/raw/fhir", "Condition")?;
/// let snapshot = aggregate(&encounters, &conditions, chrono::Utc::now())?;
/// println!("{} encounters", snapshot.kpis.total_encounters);
/// # Ok(())
/// # }
/// ```
pub fn aggregate(
    encounter_files: &[PathBuf],
    condition_files: &[PathBuf],
    generated_at: DateTime<Utc>,
) -> Result<MetricsSnapshot> {
    let encounters = scan_files::<EncounterTally>(encounter_files)?;
    let conditions = scan_files::<ConditionTally>(condition_files)?;
    Ok(build_snapshot(encounters, conditions, generated_at))
}
