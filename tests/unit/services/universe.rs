//! Unit tests for constituents table loading

use std::io::Write;

use hotstocks::models::normalize_symbol;
use hotstocks::services::universe::{NAME_COLUMN, SYMBOL_COLUMN};
use hotstocks::services::{load_universe, read_universe_csv, ProviderError};

#[test]
fn test_read_name_column() {
    let csv = "Symbol,Name,Sector\nAAPL,Apple Inc.,Technology\nMSFT,Microsoft,Technology\n";
    let universe = read_universe_csv(csv.as_bytes(), SYMBOL_COLUMN, NAME_COLUMN).unwrap();

    assert_eq!(universe.len(), 2);
    assert_eq!(universe.display_name("AAPL"), "Apple Inc.");
    assert_eq!(universe.symbols(), vec!["AAPL", "MSFT"]);
}

#[test]
fn test_read_security_column() {
    let csv = "Symbol,Security,GICS Sector\n\
               BRK.B,Berkshire Hathaway,Financials\n\
               BF.B,Brown-Forman,Consumer Staples\n";
    let universe = read_universe_csv(csv.as_bytes(), SYMBOL_COLUMN, "Security").unwrap();

    assert!(universe.contains("BRK-B"));
    assert!(universe.contains("BF-B"));
    assert!(!universe.contains("BRK.B"));
    assert_eq!(universe.display_name("BRK-B"), "Berkshire Hathaway");
}

#[test]
fn test_blank_symbols_skipped_and_blank_names_fall_back() {
    let csv = "Symbol,Name\n  aapl ,Apple\n,Nameless\nXOM,\n";
    let universe = read_universe_csv(csv.as_bytes(), SYMBOL_COLUMN, NAME_COLUMN).unwrap();

    assert_eq!(universe.symbols(), vec!["AAPL", "XOM"]);
    assert_eq!(universe.display_name("XOM"), "XOM");
}

#[test]
fn test_missing_column() {
    let csv = "Ticker,Name\nAAPL,Apple\n";
    let err = read_universe_csv(csv.as_bytes(), SYMBOL_COLUMN, NAME_COLUMN).unwrap_err();
    assert!(matches!(err, ProviderError::MissingColumn(c) if c == "Symbol"));

    let csv = "Symbol,Name\nAAPL,Apple\n";
    let err = read_universe_csv(csv.as_bytes(), SYMBOL_COLUMN, "Security").unwrap_err();
    assert!(matches!(err, ProviderError::MissingColumn(c) if c == "Security"));
}

#[test]
fn test_normalize_symbol() {
    assert_eq!(normalize_symbol("brk.b"), "BRK-B");
    assert_eq!(normalize_symbol(" aapl\n"), "AAPL");
    assert_eq!(normalize_symbol("BRK-B"), "BRK-B");
}

#[test]
fn test_load_universe_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "Symbol,Name").unwrap();
    writeln!(file, "NVDA,NVIDIA").unwrap();
    file.flush().unwrap();

    let universe = load_universe(file.path(), SYMBOL_COLUMN, NAME_COLUMN).unwrap();
    assert_eq!(universe.display_name("NVDA"), "NVIDIA");
}

#[test]
fn test_load_universe_missing_file() {
    let err = load_universe("/nonexistent/universe.csv", SYMBOL_COLUMN, NAME_COLUMN).unwrap_err();
    assert!(matches!(err, ProviderError::Io(_)));
}
