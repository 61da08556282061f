//! Artifact persistence
//!
//! Both documents are serialized before anything touches disk, staged as
//! hidden temp files next to their targets, then renamed into place. Readers
//! never observe a partially written artifact. The previous `metrics.json` is
//! kept as a hidden backup until the forecast is in place, so a failed commit
//! leaves the previous pair untouched.

use crate::config::OutputConfig;
use crate::domain::{ForecastSnapshot, MetricsSnapshot, Result, TallyError};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Where a run's artifacts were written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub metrics: PathBuf,
    pub forecast: PathBuf,
}

/// Writes both artifacts into `output.derived_dir`
///
/// # Errors
///
/// Returns [`TallyError::Serialization`] if either document cannot be
/// serialized (nothing is written) and [`TallyError::Io`] on filesystem
/// failure. On failure staged temp files are removed and the previous
/// artifacts are left as they were.
pub fn write_artifacts(
    output: &OutputConfig,
    metrics: &MetricsSnapshot,
    forecast: &ForecastSnapshot,
) -> Result<ArtifactPaths> {
    let metrics_json = to_json(metrics, output.pretty)?;
    let forecast_json = to_json(forecast, output.pretty)?;

    fs::create_dir_all(&output.derived_dir).map_err(|e| {
        TallyError::Io(format!(
            "Failed to create output directory {}: {}",
            output.derived_dir.display(),
            e
        ))
    })?;

    let paths = ArtifactPaths {
        metrics: output.metrics_path(),
        forecast: output.forecast_path(),
    };

    let metrics_tmp = stage(&paths.metrics, &metrics_json)?;
    let forecast_tmp = match stage(&paths.forecast, &forecast_json) {
        Ok(tmp) => tmp,
        Err(e) => {
            let _ = fs::remove_file(&metrics_tmp);
            return Err(e);
        }
    };

    let backup = match back_up(&paths.metrics) {
        Ok(backup) => backup,
        Err(e) => {
            let _ = fs::remove_file(&metrics_tmp);
            let _ = fs::remove_file(&forecast_tmp);
            return Err(e);
        }
    };

    if let Err(e) = commit(&metrics_tmp, &paths.metrics) {
        let _ = fs::remove_file(&forecast_tmp);
        discard(backup);
        return Err(e);
    }

    if let Err(e) = commit(&forecast_tmp, &paths.forecast) {
        restore(backup, &paths.metrics);
        return Err(e);
    }

    discard(backup);

    tracing::info!(
        metrics = %paths.metrics.display(),
        forecast = %paths.forecast.display(),
        "Artifacts written"
    );

    Ok(paths)
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let mut json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    json.push('\n');
    Ok(json)
}

fn temp_path(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    target.with_file_name(format!(".{name}.tmp"))
}

fn backup_path(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    target.with_file_name(format!(".{name}.bak"))
}

/// Links the current artifact to a hidden backup; `None` if there is none
fn back_up(target: &Path) -> Result<Option<PathBuf>> {
    if !target.is_file() {
        return Ok(None);
    }
    let backup = backup_path(target);
    let _ = fs::remove_file(&backup);
    fs::hard_link(target, &backup)
        .or_else(|_| fs::copy(target, &backup).map(|_| ()))
        .map_err(|e| TallyError::Io(format!("Failed to back up {}: {}", target.display(), e)))?;
    Ok(Some(backup))
}

/// Puts the previous artifact back, or removes the new one if there was none
fn restore(backup: Option<PathBuf>, target: &Path) {
    let restored = match backup {
        Some(backup) => fs::rename(&backup, target),
        None => fs::remove_file(target),
    };
    if let Err(e) = restored {
        tracing::error!(
            target = %target.display(),
            error = %e,
            "Failed to restore previous artifact"
        );
    }
}

fn discard(backup: Option<PathBuf>) {
    if let Some(backup) = backup {
        let _ = fs::remove_file(backup);
    }
}

fn stage(target: &Path, contents: &str) -> Result<PathBuf> {
    let tmp = temp_path(target);
    fs::write(&tmp, contents)
        .map_err(|e| TallyError::Io(format!("Failed to write {}: {}", tmp.display(), e)))?;
    Ok(tmp)
}

fn commit(tmp: &Path, target: &Path) -> Result<()> {
    fs::rename(tmp, target).map_err(|e| {
        let _ = fs::remove_file(tmp);
        TallyError::Io(format!(
            "Failed to move {} into place at {}: {}",
            tmp.display(),
            target.display(),
            e
        ))
    })
}
