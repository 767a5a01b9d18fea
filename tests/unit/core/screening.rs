//! Unit tests for the screening service over on-disk histories

use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use chrono::{Days, NaiveDate};
use hotstocks::config::ScreeningConfig;
use hotstocks::core::{ScreeningError, ScreeningService};
use hotstocks::models::{Classification, FailureReason, Universe};
use hotstocks::services::{CsvDirectoryProvider, HistoryRange, PriceHistoryProvider};

fn write_rising(dir: &Path, symbol: &str) {
    let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let mut csv = String::from("date,close\n");
    for i in 0..30u64 {
        let date = start.checked_add_days(Days::new(i)).unwrap();
        writeln!(csv, "{},{}", date, 100 + i).unwrap();
    }
    fs::write(dir.join(format!("{}.csv", symbol)), csv).unwrap();
}

fn service(dir: &Path) -> ScreeningService {
    write_rising(dir, "GOOD");
    fs::write(
        dir.join("BAD.csv"),
        "date,close\n2024-01-02,1.0\n2024-01-02,2.0\n",
    )
    .unwrap();

    let universe: Universe = [
        ("GOOD".to_string(), "Good Co".to_string()),
        ("BAD".to_string(), "Bad Co".to_string()),
    ]
    .into_iter()
    .collect();
    let provider: Arc<dyn PriceHistoryProvider> = Arc::new(CsvDirectoryProvider::new(dir));
    ScreeningService::new(Arc::new(universe), provider)
}

#[tokio::test]
async fn test_malformed_history_does_not_abort_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let service = service(dir.path());

    let result = service
        .run(ScreeningConfig::default(), HistoryRange::OneYear)
        .await
        .unwrap();

    assert_eq!(result.len(), 2);
    assert_eq!(result.classification("GOOD"), Some(Classification::Overbought));
    assert!(result.hot_set.contains("GOOD"));

    let bad = result.outcome("BAD").unwrap();
    assert_eq!(bad.classification, Classification::Undetermined);
    match &bad.failure {
        Some(FailureReason::Provider { message }) => {
            assert!(message.contains("dates must be strictly increasing"))
        }
        other => panic!("expected a provider failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_largest_period_leaves_every_symbol_undetermined() {
    let dir = tempfile::tempdir().unwrap();
    let service = service(dir.path());

    let result = service
        .run(ScreeningConfig::new(usize::MAX, 30.0, 70.0), HistoryRange::OneYear)
        .await
        .unwrap();

    assert_eq!(result.count(Classification::Undetermined), 2);
    assert!(result.hot_set.is_empty());
    assert_eq!(
        result.outcome("GOOD").unwrap().failure,
        Some(FailureReason::InsufficientData {
            required: usize::MAX,
            available: 30
        })
    );
}

#[tokio::test]
async fn test_symbol_report_carries_provider_reason() {
    let dir = tempfile::tempdir().unwrap();
    let service = service(dir.path());

    let report = service
        .symbol_report("bad", ScreeningConfig::default(), HistoryRange::OneYear)
        .await
        .unwrap();

    assert_eq!(report.outcome.symbol, "BAD");
    assert_eq!(report.outcome.classification, Classification::Undetermined);
    assert!(matches!(
        report.outcome.failure,
        Some(FailureReason::Provider { .. })
    ));
}

#[tokio::test]
async fn test_missing_directory_fails_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let universe = Universe::from_symbols(["GOOD"]);
    let provider: Arc<dyn PriceHistoryProvider> =
        Arc::new(CsvDirectoryProvider::new(dir.path().join("nowhere")));
    let service = ScreeningService::new(Arc::new(universe), provider);

    let result = service
        .run(ScreeningConfig::default(), HistoryRange::OneYear)
        .await;

    assert!(matches!(result, Err(ScreeningError::Provider(_))));
}
