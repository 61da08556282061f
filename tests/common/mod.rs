//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::fs;
use std::path::Path;
use tally::config::TallyConfig;

pub fn write_lines(path: &Path, lines: &[&str]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, lines.join("\n")).unwrap();
}

/// Five encounters, one without a period, plus four condition records
///
/// Expected results:
/// - total 5, one note, days 2024-01-01:2, 2024-01-15:1, 2024-03-01:1
/// - classes AMB 2, EMER 2, IMP 1
/// - avg LOS 0.75 days, revisit rate 0.5
/// - conditions 44054006 "Diabetes" x2, 38341003 "Hypertension" x1
pub fn write_dataset(data_dir: &Path) {
    write_lines(
        &data_dir.join("Encounter.000.ndjson"),
        &[
            r#"{"resourceType":"Encounter","id":"e1","class":{"code":"AMB"},"period":{"start":"2024-01-01T08:00:00Z","end":"2024-01-02T08:00:00Z"},"subject":{"reference":"Patient/p1"}}"#,
            "",
            r#"{"resourceType":"Encounter","id":"e2","class":{"code":"AMB"},"period":{"start":"2024-01-15T08:00:00Z","end":"2024-01-15T20:00:00Z"},"subject":{"reference":"Patient/p1"}}"#,
        ],
    );
    write_lines(
        &data_dir.join("nested/Encounter.001.ndjson"),
        &[
            r#"{"resourceType":"Encounter","id":"e3","class":{"code":"EMER"},"period":{"start":"2024-01-01T10:00:00Z"},"subject":{"reference":"Patient/p2"}}"#,
            r#"{"resourceType":"Encounter","id":"e4","class":{"code":"EMER"},"period":{"start":"2024-03-01T10:00:00Z","end":"2024-02-28T10:00:00Z"},"subject":{"reference":"Patient/p2"}}"#,
            r#"{"resourceType":"Encounter","id":"e5","class":{"code":"IMP"},"subject":{"reference":"Patient/p3"}}"#,
        ],
    );
    write_lines(
        &data_dir.join("Condition.000.ndjson"),
        &[
            r#"{"resourceType":"Condition","code":{"coding":[{"code":"44054006","display":"Diabetes"}]}}"#,
            r#"{"resourceType":"Condition","code":{"coding":[{"code":"38341003","display":"Hypertension"}]}}"#,
            r#"{"resourceType":"Condition","code":{"coding":[{"code":"44054006","display":"Type 2 diabetes"}]}}"#,
            r#"{"resourceType":"Condition","code":{"coding":[]}}"#,
        ],
    );
    // Not an NDJSON file, must be ignored
    write_lines(&data_dir.join("Encounter.notes.txt"), &["{bad"]);
}

pub fn config_for(data_dir: &Path, derived_dir: &Path) -> TallyConfig {
    let mut config = TallyConfig::default();
    config.input.data_dir = data_dir.to_path_buf();
    config.output.derived_dir = derived_dir.to_path_buf();
    config
}
