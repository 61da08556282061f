//! Input file discovery
//!
//! Resource type is encoded in the file name (`Encounter.000.ndjson`,
//! `Condition-part2.ndjson`, ...). Discovery walks the whole tree and returns
//! matches ordered by full path so every run processes files in the same order
//! on every platform.

use crate::domain::{Result, TallyError};
use std::ffi::OsStr;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File extension of line-delimited JSON exports
pub const NDJSON_EXTENSION: &str = ".ndjson";

/// Finds NDJSON files for one resource type
///
/// Returns every regular file under `root` (recursively) whose file name
/// starts with `prefix` and ends with [`NDJSON_EXTENSION`], sorted by full path
/// string. An empty result is not an error. Symlinked directories are not
/// followed.
///
/// # Errors
///
/// Returns [`TallyError::NotFound`] if `root` does not exist or is not a
/// directory, and [`TallyError::Io`] if a directory cannot be listed.
///
/// # Examples
///
/// ```no_run
/// use tally::adapters::ndjson::find_ndjson_files;
///
/// let files = find_ndjson_files("data/raw/fhir", "Encounter").unwrap();
/// for file in &files {
///     println!("{}", file.display());
/// }
/// ```
pub fn find_ndjson_files(root: impl AsRef<Path>, prefix: &str) -> Result<Vec<PathBuf>> {
    let root = root.as_ref();
    let metadata = fs::metadata(root).map_err(|e| match e.kind() {
        ErrorKind::NotFound => TallyError::NotFound(format!("Data directory {}", root.display())),
        _ => TallyError::Io(format!("Failed to access {}: {}", root.display(), e)),
    })?;
    if !metadata.is_dir() {
        return Err(TallyError::NotFound(format!(
            "Data directory {} is not a directory",
            root.display()
        )));
    }

    let mut matches = Vec::new();

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(|e| {
            let at = e.path().unwrap_or(root);
            TallyError::Io(format!("Failed to list {}: {}", at.display(), e))
        })?;
        let path = entry.path();
        let is_file = entry.file_type().is_file() || (entry.path_is_symlink() && path.is_file());

        if is_file && is_resource_file(path, prefix) {
            matches.push(entry.into_path());
        }
    }

    matches.sort_by(|a, b| a.to_string_lossy().cmp(&b.to_string_lossy()));

    tracing::debug!(
        root = %root.display(),
        prefix = prefix,
        files = matches.len(),
        "Discovered NDJSON files"
    );

    Ok(matches)
}

fn is_resource_file(path: &Path, prefix: &str) -> bool {
    path.file_name()
        .and_then(OsStr::to_str)
        .is_some_and(|name| name.starts_with(prefix) && name.ends_with(NDJSON_EXTENSION))
}
