//! Integration tests for parallel batch scoring and configuration files

use chrono::{Duration, NaiveDate};
use std::fs;
use tempfile::tempdir;
use vitalrs::batch::{BatchConfig, BatchScorer, SubjectDay};
use vitalrs::config::{AppConfig, RecoverySource};
use vitalrs::models::MetricSnapshot;
use vitalrs::{FactorKind, IntelligenceEngine, VitalRsError};

fn subject_day(subject: &str, offset: i64) -> SubjectDay {
    let date = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
    let history = (1..=6)
        .map(|d| {
            MetricSnapshot::new(subject, "fitbit", date - Duration::days(d))
                .with_hrv(50.0 + d as f64, None)
                .with_steps(7000 + (offset as u32) * 10)
        })
        .collect();

    SubjectDay::new(
        MetricSnapshot::new(subject, "fitbit", date)
            .with_hrv(45.0 + offset as f64, Some(55.0))
            .with_resting_heart_rate(58.0)
            .with_sleep(420, 80, 95, Some(88.0))
            .with_steps(8000)
            .with_calories_burned(2300.0),
    )
    .with_history(history)
}

#[test]
fn test_parallel_batch_matches_sequential() {
    let requests: Vec<SubjectDay> = (0..50)
        .map(|i| subject_day(&format!("subject-{:02}", i), i))
        .collect();
    let engine = IntelligenceEngine::new();

    let scorer = BatchScorer::with_config(
        engine.clone(),
        BatchConfig {
            num_threads: Some(4),
            show_progress: false,
        },
    );
    let summary = scorer.score(&requests).unwrap();

    assert_eq!(summary.total, 50);
    assert!(summary.is_fully_successful());

    for (request, item) in requests.iter().zip(&summary.items) {
        assert_eq!(item.subject_id, request.snapshot.subject_id);
        let report = item.result.as_ref().unwrap();
        let sequential = engine.generate_report(&request.snapshot, &request.history);
        assert!(report.scores_equal(&sequential));
        assert_eq!(report.trends.window_size, 7);
    }
}

#[test]
fn test_invalid_requests_are_collected_not_fatal() {
    let mut requests = vec![subject_day("a", 1), subject_day("b", 2)];
    requests[1].snapshot.subject_id = "   ".to_string();

    let summary = BatchScorer::new(IntelligenceEngine::new())
        .score(&requests)
        .unwrap();

    assert_eq!(summary.successful, 1);
    assert_eq!(summary.failed, 1);
    assert!(matches!(
        summary.items[1].result,
        Err(VitalRsError::Validation(_))
    ));
    assert!(summary.to_string_pretty().contains("Failed: 1"));
}

#[test]
fn test_batch_input_file_round_trip() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("batch.json");

    let requests = vec![subject_day("a", 0), subject_day("b", 3)];
    fs::write(&path, serde_json::to_string(&requests).unwrap()).unwrap();

    let loaded: Vec<SubjectDay> = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(loaded, requests);
}

#[test]
fn test_config_file_drives_engine() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
[engine]
performance_recovery = "prior_day"

[engine.weights.recovery]
hrv = 0.5
resting_heart_rate = 0.5
sleep_duration = 0.0
sleep_quality = 0.0
breathing_rate = 0.0
spo2 = 0.0

[logging]
level = "debug"
format = "json"
"#,
    )
    .unwrap();

    let config = AppConfig::load_from_file(&path).unwrap();
    assert_eq!(config.engine.performance_recovery, RecoverySource::PriorDay);
    assert_eq!(config.engine.weights.recovery.hrv, 0.5);

    let engine = IntelligenceEngine::try_with_config(config.engine).unwrap();
    let request = subject_day("a", 0);
    let report = engine.generate_report(&request.snapshot, &request.history);

    // Prior day's recovery (from history) feeds performance
    let prior = report
        .performance
        .factor(FactorKind::PriorRecovery)
        .expect("history contains the prior day");
    assert!(prior.score > 0.0);

    // Zero-weight factors are computed but contribute nothing
    let sleep = report.recovery.factor(FactorKind::SleepDuration).unwrap();
    assert_eq!(sleep.effective_weight, 0.0);
}

#[test]
fn test_default_config_round_trip() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("vitalrs").join("config.toml");

    AppConfig::default().save_to_file(&path).unwrap();
    let loaded = AppConfig::load_from_file(&path).unwrap();
    assert_eq!(loaded, AppConfig::default());
}
