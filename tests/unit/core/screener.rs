//! Unit tests for the batch screener

use std::collections::{BTreeSet, HashMap};

use chrono::{Days, NaiveDate};
use hotstocks::config::{ConfigError, ScreeningConfig};
use hotstocks::core::BatchScreener;
use hotstocks::models::{Classification, FailureReason, PriceSeries, Universe};

fn series(symbol: &str, closes: &[f64]) -> PriceSeries {
    let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    PriceSeries::from_pairs(
        symbol,
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| (start.checked_add_days(Days::new(i as u64)).unwrap(), c)),
    )
    .unwrap()
}

fn rising(symbol: &str) -> PriceSeries {
    series(symbol, &(0..30).map(|i| 100.0 + i as f64).collect::<Vec<_>>())
}

fn falling(symbol: &str) -> PriceSeries {
    series(symbol, &(0..30).map(|i| 200.0 - i as f64).collect::<Vec<_>>())
}

fn alternating(symbol: &str) -> PriceSeries {
    series(
        symbol,
        &(0..30).map(|i| 100.0 + (i % 2) as f64).collect::<Vec<_>>(),
    )
}

fn universe(entries: &[(&str, &str)]) -> Universe {
    entries
        .iter()
        .map(|(s, n)| (s.to_string(), n.to_string()))
        .collect()
}

fn prices(list: Vec<PriceSeries>) -> HashMap<String, PriceSeries> {
    list.into_iter()
        .map(|s| (s.symbol().to_string(), s))
        .collect()
}

fn screener() -> BatchScreener {
    BatchScreener::new(ScreeningConfig::default()).unwrap()
}

#[test]
fn test_every_symbol_has_an_outcome() {
    let universe = universe(&[
        ("RISE", "Rising Co"),
        ("FALL", "Falling Co"),
        ("ALT", "Alternating Co"),
        ("FLAT", "Flat Co"),
        ("SHORT", "Short Co"),
    ]);
    let prices = prices(vec![
        rising("RISE"),
        falling("FALL"),
        alternating("ALT"),
        series("FLAT", &[10.0; 30]),
        series("SHORT", &[10.0, 11.0, 12.0]),
    ]);

    let result = screener().screen(&universe, &prices);

    assert_eq!(result.len(), 5);
    assert_eq!(result.classification("RISE"), Some(Classification::Overbought));
    assert_eq!(result.classification("FALL"), Some(Classification::Oversold));
    assert_eq!(result.classification("ALT"), Some(Classification::Neutral));
    assert_eq!(result.classification("FLAT"), Some(Classification::Neutral));

    let short = result.outcome("SHORT").unwrap();
    assert_eq!(short.classification, Classification::Undetermined);
    assert_eq!(
        short.failure,
        Some(FailureReason::InsufficientData {
            required: 15,
            available: 3
        })
    );
    assert!(short.oscillator.is_none());
}

#[test]
fn test_hot_set_holds_oversold_and_overbought() {
    let universe = universe(&[("RISE", "R"), ("FALL", "F"), ("ALT", "A")]);
    let prices = prices(vec![rising("RISE"), falling("FALL"), alternating("ALT")]);

    let result = screener().screen(&universe, &prices);

    let expected: BTreeSet<String> = ["FALL", "RISE"].iter().map(|s| s.to_string()).collect();
    assert_eq!(result.hot_set, expected);
    assert!(result.has_hot_symbols());
    let hot: Vec<&str> = result.hot_outcomes().map(|o| o.symbol.as_str()).collect();
    assert_eq!(hot, vec!["FALL", "RISE"]);
}

#[test]
fn test_missing_symbol_is_undetermined() {
    let universe = universe(&[("RISE", "R"), ("GHOST", "Ghost Co")]);
    let prices = prices(vec![rising("RISE")]);

    let result = screener().screen(&universe, &prices);

    let ghost = result.outcome("GHOST").unwrap();
    assert_eq!(ghost.classification, Classification::Undetermined);
    assert_eq!(ghost.failure, Some(FailureReason::MissingSymbol));
    assert_eq!(ghost.display_name, "Ghost Co");
    assert!(!result.hot_set.contains("GHOST"));
}

#[test]
fn test_empty_hot_set_with_screened_symbols() {
    let universe = universe(&[("ALT", "A"), ("FLAT", "F")]);
    let prices = prices(vec![alternating("ALT"), series("FLAT", &[5.0; 20])]);

    let result = screener().screen(&universe, &prices);

    assert_eq!(result.len(), 2);
    assert!(result.hot_set.is_empty());
    assert!(!result.has_hot_symbols());
    assert_eq!(result.count(Classification::Neutral), 2);
}

#[test]
fn test_invalid_configuration_rejected_up_front() {
    assert_eq!(
        BatchScreener::new(ScreeningConfig::new(0, 30.0, 70.0)).unwrap_err(),
        ConfigError::InvalidPeriod(0)
    );
    assert!(matches!(
        BatchScreener::new(ScreeningConfig::new(14, 80.0, 20.0)),
        Err(ConfigError::InvertedThresholds { .. })
    ));
    assert!(matches!(
        BatchScreener::new(ScreeningConfig::new(14, f64::NAN, 70.0)),
        Err(ConfigError::InvalidThreshold { .. })
    ));
}

#[test]
fn test_extra_prices_are_ignored() {
    let universe = universe(&[("RISE", "R")]);
    let prices = prices(vec![rising("RISE"), falling("OTHER")]);

    let result = screener().screen(&universe, &prices);

    assert_eq!(result.len(), 1);
    assert!(result.outcome("OTHER").is_none());
}

#[test]
fn test_screen_series_uses_supplied_symbols() {
    let prices = prices(vec![rising("AAA"), alternating("BBB")]);

    let result = screener().screen_series(&prices);

    assert_eq!(result.len(), 2);
    assert_eq!(result.outcome("AAA").unwrap().display_name, "AAA");
    assert_eq!(result.hot_set.len(), 1);
}

#[test]
fn test_custom_period_changes_warmup() {
    let screener = BatchScreener::new(ScreeningConfig::new(5, 30.0, 70.0)).unwrap();
    let universe = universe(&[("SHORT", "S")]);
    let prices = prices(vec![series("SHORT", &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0])]);

    let result = screener.screen(&universe, &prices);

    let outcome = result.outcome("SHORT").unwrap();
    assert_eq!(outcome.classification, Classification::Overbought);
    assert_eq!(outcome.latest_value, Some(100.0));
    assert_eq!(outcome.oscillator.as_ref().unwrap().warmup_len(), 5);
}

#[test]
fn test_latest_reading_and_date() {
    let universe = universe(&[("ALT", "A")]);
    let prices = prices(vec![alternating("ALT")]);

    let result = screener().screen(&universe, &prices);

    let outcome = result.outcome("ALT").unwrap();
    assert_eq!(outcome.latest_date, NaiveDate::from_ymd_opt(2024, 1, 31));
    let value = outcome.latest_value.unwrap();
    assert!(value > 30.0 && value < 70.0);
    assert_eq!(result.config, ScreeningConfig::default());
}

#[test]
fn test_deterministic_across_runs() {
    let universe = universe(&[
        ("RISE", "R"),
        ("FALL", "F"),
        ("ALT", "A"),
        ("SHORT", "S"),
        ("GHOST", "G"),
    ]);
    let prices = prices(vec![
        rising("RISE"),
        falling("FALL"),
        alternating("ALT"),
        series("SHORT", &[1.0, 2.0]),
    ]);

    let screener = screener();
    let first = screener.screen(&universe, &prices);
    let second = screener.screen(&universe, &prices);

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_largest_period_screens_without_panicking() {
    let screener = BatchScreener::new(ScreeningConfig::new(usize::MAX, 30.0, 70.0)).unwrap();
    let prices = prices(vec![rising("RISE"), falling("FALL")]);

    let result = screener.screen_series(&prices);

    assert_eq!(result.len(), 2);
    assert!(result.hot_set.is_empty());
    for outcome in result.outcomes.values() {
        assert_eq!(outcome.classification, Classification::Undetermined);
        assert_eq!(
            outcome.failure,
            Some(FailureReason::InsufficientData {
                required: usize::MAX,
                available: 30
            })
        );
    }
}

#[test]
fn test_provider_failures_are_recorded_with_reason() {
    let universe = universe(&[("RISE", "R"), ("BAD", "Bad Data Co"), ("GHOST", "G")]);
    let prices = prices(vec![rising("RISE")]);
    let failures: HashMap<String, String> = [(
        "BAD".to_string(),
        "BAD: dates must be strictly increasing (index 1)".to_string(),
    )]
    .into_iter()
    .collect();

    let result = screener().screen_with_failures(&universe, &prices, &failures);

    assert_eq!(result.len(), 3);
    assert_eq!(result.classification("RISE"), Some(Classification::Overbought));
    let bad = result.outcome("BAD").unwrap();
    assert_eq!(bad.classification, Classification::Undetermined);
    assert_eq!(bad.display_name, "Bad Data Co");
    assert_eq!(
        bad.failure,
        Some(FailureReason::Provider {
            message: "BAD: dates must be strictly increasing (index 1)".to_string()
        })
    );
    assert_eq!(
        result.outcome("GHOST").unwrap().failure,
        Some(FailureReason::MissingSymbol)
    );
}

#[test]
fn test_delivered_history_wins_over_stale_failure() {
    let universe = universe(&[("RISE", "R")]);
    let prices = prices(vec![rising("RISE")]);
    let failures: HashMap<String, String> =
        [("RISE".to_string(), "timeout".to_string())].into_iter().collect();

    let result = screener().screen_with_failures(&universe, &prices, &failures);

    assert_eq!(result.classification("RISE"), Some(Classification::Overbought));
    assert!(result.outcome("RISE").unwrap().failure.is_none());
}
