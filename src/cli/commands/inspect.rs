//! Inspect command implementation
//!
//! Prints the first records of one NDJSON file and its record count.

use super::exit_code_for;
use crate::adapters::ndjson::{count_ndjson_lines, NdjsonReader};
use crate::domain::Result;
use clap::Args;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Arguments for the inspect command
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// NDJSON file to read
    pub file: PathBuf,

    /// Records to print
    #[arg(short = 'n', long, default_value_t = 5)]
    pub limit: usize,
}

/// One printed line of an inspection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordPreview {
    pub resource_type: String,
    pub id: String,
}

impl RecordPreview {
    fn from_json(value: &Value) -> Self {
        let field = |name: &str| {
            value
                .get(name)
                .and_then(Value::as_str)
                .unwrap_or("?")
                .to_string()
        };
        Self {
            resource_type: field("resourceType"),
            id: field("id"),
        }
    }
}

/// First `limit` records of `file` plus its total record count
pub fn preview(file: &Path, limit: usize) -> Result<(Vec<RecordPreview>, usize)> {
    let records = NdjsonReader::open(file)?
        .take(limit)
        .map(|record| record.map(|v| RecordPreview::from_json(&v)))
        .collect::<Result<Vec<_>>>()?;
    let total = count_ndjson_lines(file)?;
    Ok((records, total))
}

impl InspectArgs {
    /// Execute the inspect command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(file = %self.file.display(), limit = self.limit, "Inspecting file");

        let (records, total) = match preview(&self.file, self.limit) {
            Ok(result) => result,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(exit_code_for(&e));
            }
        };

        println!("📄 {}", self.file.display());
        for (i, record) in records.iter().enumerate() {
            println!("  {}. {} {}", i + 1, record.resource_type, record.id);
        }
        println!();
        println!("  Records: {total}");
        Ok(0)
    }
}
