//! End-to-end tests for the derive pipeline

mod common;

use chrono::Utc;
use common::{config_for, write_dataset, write_lines};
use std::fs;
use std::path::PathBuf;
use tally::core::aggregate::{aggregate, build_snapshot, ConditionTally, EncounterTally};
use tally::core::pipeline::{scan_parallel, PipelineCoordinator};
use tally::core::verification::verify_artifacts;
use tally::domain::{ClassBreakdown, DailyCount, ForecastSnapshot, MetricsSnapshot, TallyError};
use tempfile::TempDir;

#[tokio::test]
async fn test_derive_produces_expected_metrics() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("raw");
    let derived = dir.path().join("derived");
    write_dataset(&data);

    let run = PipelineCoordinator::new(config_for(&data, &derived))
        .execute()
        .await
        .unwrap();
    let metrics = &run.metrics;

    assert_eq!(metrics.kpis.total_encounters, 5);
    assert_eq!(metrics.kpis.avg_length_of_stay_days, Some(0.75));
    assert_eq!(metrics.kpis.revisit_rate_30_day, Some(0.5));
    assert_eq!(
        metrics.series.encounters_by_day,
        vec![
            DailyCount::new("2024-01-01", 2),
            DailyCount::new("2024-01-15", 1),
            DailyCount::new("2024-03-01", 1),
        ]
    );
    assert_eq!(
        metrics.breakdowns.encounters_by_class,
        vec![
            ClassBreakdown { class_code: "AMB".into(), count: 2 },
            ClassBreakdown { class_code: "EMER".into(), count: 2 },
            ClassBreakdown { class_code: "IMP".into(), count: 1 },
        ]
    );
    assert_eq!(metrics.top_conditions.len(), 2);
    assert_eq!(metrics.top_conditions[0].code, "44054006");
    assert_eq!(metrics.top_conditions[0].display, "Diabetes");
    assert_eq!(metrics.top_conditions[0].count, 2);
    assert_eq!(metrics.notes.len(), 1);
    assert!(metrics.notes[0].contains("e5"));

    // Every dated encounter lands in the series; the rest are noted
    let dated: u64 = metrics.series.encounters_by_day.iter().map(|d| d.count).sum();
    assert_eq!(dated + metrics.notes.len() as u64, metrics.kpis.total_encounters);

    assert_eq!(run.forecast.history.len(), 3);
    assert_eq!(run.forecast.forecast.len(), 14);
    assert_eq!(run.forecast.forecast[0].date, "2024-03-02");

    assert_eq!(run.summary.encounter_files, 2);
    assert_eq!(run.summary.condition_files, 1);
    assert_eq!(run.summary.conditions_skipped, 1);
}

#[tokio::test]
async fn test_written_artifacts_pass_check() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("raw");
    let derived = dir.path().join("derived");
    write_dataset(&data);

    let run = PipelineCoordinator::new(config_for(&data, &derived))
        .execute()
        .await
        .unwrap();
    let paths = run.summary.artifacts.unwrap();

    let metrics: MetricsSnapshot =
        serde_json::from_str(&fs::read_to_string(&paths.metrics).unwrap()).unwrap();
    let forecast: ForecastSnapshot =
        serde_json::from_str(&fs::read_to_string(&paths.forecast).unwrap()).unwrap();
    assert_eq!(metrics.kpis, run.metrics.kpis);
    assert_eq!(forecast.forecast, run.forecast.forecast);

    let report = verify_artifacts(&derived, "metrics.json", "forecast.json").unwrap();
    assert!(report.is_success(), "{:?}", report.errors);
    assert_eq!(report.kpis.unwrap().total_encounters, 5);
}

#[tokio::test]
async fn test_rerun_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("raw");
    let derived = dir.path().join("derived");
    write_dataset(&data);
    let coordinator = PipelineCoordinator::new(config_for(&data, &derived));

    coordinator.execute().await.unwrap();
    let first = verify_artifacts(&derived, "metrics.json", "forecast.json").unwrap();
    coordinator.execute().await.unwrap();
    let second = verify_artifacts(&derived, "metrics.json", "forecast.json").unwrap();

    assert_eq!(first.content_digest, second.content_digest);
}

#[tokio::test]
async fn test_parallelism_does_not_change_output() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("raw");
    write_dataset(&data);

    let mut digests = Vec::new();
    for parallel in [1, 2, 8] {
        let derived = dir.path().join(format!("derived-{parallel}"));
        let mut config = config_for(&data, &derived);
        config.pipeline.max_parallel_files = parallel;
        PipelineCoordinator::new(config).execute().await.unwrap();
        digests.push(
            verify_artifacts(&derived, "metrics.json", "forecast.json")
                .unwrap()
                .content_digest,
        );
    }

    assert!(digests.windows(2).all(|pair| pair[0] == pair[1]));
}

#[tokio::test]
async fn test_malformed_line_aborts_without_touching_artifacts() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("raw");
    let derived = dir.path().join("derived");
    write_dataset(&data);
    let config = config_for(&data, &derived);

    // A good run first, so there are previous artifacts to protect
    PipelineCoordinator::new(config.clone()).execute().await.unwrap();
    let before = fs::read_to_string(derived.join("metrics.json")).unwrap();

    write_lines(
        &data.join("Encounter.002.ndjson"),
        &[
            r#"{"resourceType":"Encounter","id":"e9"}"#,
            "   ",
            "{bad json",
        ],
    );

    let err = PipelineCoordinator::new(config).execute().await.unwrap_err();
    match err {
        TallyError::MalformedRecord { path, line, snippet, .. } => {
            assert!(path.ends_with("Encounter.002.ndjson"));
            assert_eq!(line, 3);
            assert_eq!(snippet, "{bad json");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert_eq!(fs::read_to_string(derived.join("metrics.json")).unwrap(), before);
}

#[tokio::test]
async fn test_first_failing_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("raw");
    write_lines(&data.join("a/Encounter.ndjson"), &["{}", "not json"]);
    write_lines(&data.join("b/Encounter.ndjson"), &["nope"]);

    for parallel in [1, 4] {
        let mut config = config_for(&data, &dir.path().join("derived"));
        config.pipeline.max_parallel_files = parallel;
        let err = PipelineCoordinator::new(config).execute().await.unwrap_err();
        match err {
            TallyError::MalformedRecord { path, line, .. } => {
                assert!(path.contains("/a/"), "got {path}");
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_dry_run_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("raw");
    let derived = dir.path().join("derived");
    write_dataset(&data);
    let mut config = config_for(&data, &derived);
    config.application.dry_run = true;

    let run = PipelineCoordinator::new(config).execute().await.unwrap();

    assert!(run.summary.dry_run);
    assert!(run.summary.artifacts.is_none());
    assert_eq!(run.metrics.kpis.total_encounters, 5);
    assert!(!derived.exists());
}

#[tokio::test]
async fn test_empty_data_dir_yields_empty_artifacts() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("raw");
    fs::create_dir_all(&data).unwrap();
    let derived = dir.path().join("derived");

    let run = PipelineCoordinator::new(config_for(&data, &derived))
        .execute()
        .await
        .unwrap();

    assert_eq!(run.metrics.kpis.total_encounters, 0);
    assert_eq!(run.metrics.kpis.avg_length_of_stay_days, None);
    assert_eq!(run.metrics.kpis.revisit_rate_30_day, None);
    assert!(run.metrics.notes.is_empty());
    assert!(run.forecast.history.is_empty());
    assert!(run.forecast.forecast.is_empty());
    assert!(derived.join("metrics.json").exists());
}

#[tokio::test]
async fn test_missing_data_dir_is_not_found() {
    let dir = TempDir::new().unwrap();
    let config = config_for(&dir.path().join("absent"), &dir.path().join("derived"));

    let err = PipelineCoordinator::new(config).execute().await.unwrap_err();
    assert!(matches!(err, TallyError::NotFound(_)));
    assert!(!dir.path().join("derived").exists());
}

/// Three encounter files, each with one undated encounter, and two condition files
fn write_shuffled_dataset(data: &std::path::Path) -> (Vec<PathBuf>, Vec<PathBuf>) {
    let encounters = vec![
        data.join("Encounter.000.ndjson"),
        data.join("Encounter.001.ndjson"),
        data.join("Encounter.002.ndjson"),
    ];
    write_lines(
        &encounters[0],
        &[
            r#"{"id":"a1","class":{"code":"AMB"},"period":{"start":"2024-01-01T08:00:00Z","end":"2024-01-01T20:00:00Z"},"subject":{"reference":"Patient/p1"}}"#,
            r#"{"id":"x","class":{"code":"AMB"},"subject":{"reference":"Patient/p9"}}"#,
        ],
    );
    write_lines(
        &encounters[1],
        &[
            r#"{"id":"b1","class":{"code":"EMER"},"period":{"start":"2024-01-10T08:00:00Z","end":"2024-01-12T08:00:00Z"},"subject":{"reference":"Patient/p1"}}"#,
            r#"{"id":"y","class":{"code":"EMER"},"period":{"start":"not-a-date"}}"#,
        ],
    );
    write_lines(
        &encounters[2],
        &[
            r#"{"id":"c1","class":{"code":"IMP"},"period":{"start":"2024-03-01T08:00:00Z"},"subject":{"reference":"Patient/p2"}}"#,
            r#"{"id":"w","class":{"code":"IMP"}}"#,
        ],
    );

    let conditions = vec![data.join("Condition.000.ndjson"), data.join("Condition.001.ndjson")];
    write_lines(
        &conditions[0],
        &[
            r#"{"code":{"coding":[{"code":"44054006","display":"Diabetes"}]}}"#,
            r#"{"code":{"coding":[{"code":"38341003","display":"Hypertension"}]}}"#,
        ],
    );
    write_lines(
        &conditions[1],
        &[
            r#"{"code":{"coding":[{"code":"38341003","display":"Hypertension"}]}}"#,
            r#"{"code":{"coding":[{"code":"195967001","display":"Asthma"}]}}"#,
        ],
    );

    (encounters, conditions)
}

#[test]
fn test_reordering_files_does_not_change_metrics() {
    let dir = TempDir::new().unwrap();
    let (mut encounters, mut conditions) = write_shuffled_dataset(dir.path());
    let generated_at = Utc::now();

    let forward = aggregate(&encounters, &conditions, generated_at).unwrap();
    encounters.reverse();
    conditions.reverse();
    let reversed = aggregate(&encounters, &conditions, generated_at).unwrap();

    assert_eq!(forward.kpis, reversed.kpis);
    assert_eq!(forward.series, reversed.series);
    assert_eq!(forward.breakdowns, reversed.breakdowns);
    assert_eq!(forward.top_conditions, reversed.top_conditions);
    assert_eq!(forward.notes, reversed.notes);
    assert_eq!(forward, reversed);
    assert_eq!(forward.notes.len(), 3);
}

#[tokio::test]
async fn test_reordering_files_does_not_change_parallel_scan() {
    let dir = TempDir::new().unwrap();
    let (mut encounters, _) = write_shuffled_dataset(dir.path());
    let generated_at = Utc::now();

    let forward: EncounterTally = scan_parallel(&encounters, 3).await.unwrap();
    encounters.reverse();
    let reversed: EncounterTally = scan_parallel(&encounters, 3).await.unwrap();

    let forward = build_snapshot(forward, ConditionTally::default(), generated_at);
    let reversed = build_snapshot(reversed, ConditionTally::default(), generated_at);
    assert_eq!(forward, reversed);
}

#[tokio::test]
async fn test_bad_file_is_reported_first_or_last() {
    let dir = TempDir::new().unwrap();
    let (mut encounters, conditions) = write_shuffled_dataset(dir.path());
    let bad = dir.path().join("Encounter.bad.ndjson");
    write_lines(&bad, &[r#"{"id":"ok"}"#, r#"{"id":"ok2"}"#, "{truncated"]);

    let check = |err: TallyError| match err {
        TallyError::MalformedRecord { path, line, .. } => {
            assert!(path.ends_with("Encounter.bad.ndjson"), "got {path}");
            assert_eq!(line, 3);
        }
        other => panic!("unexpected error: {other:?}"),
    };

    encounters.insert(0, bad.clone());
    check(aggregate(&encounters, &conditions, Utc::now()).unwrap_err());
    check(scan_parallel::<EncounterTally>(&encounters, 4).await.unwrap_err());

    encounters.remove(0);
    encounters.push(bad);
    check(aggregate(&encounters, &conditions, Utc::now()).unwrap_err());
    check(scan_parallel::<EncounterTally>(&encounters, 4).await.unwrap_err());
}
