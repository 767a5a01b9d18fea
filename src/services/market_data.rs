//! Price history provider interface and the in-memory implementation.

use std::collections::HashMap;
use std::ops::Index;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::series::{PriceSeries, SeriesError};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{symbol}: unexpected HTTP status {status}")]
    Status { symbol: String, status: u16 },

    #[error("{symbol}: malformed response: {message}")]
    Payload { symbol: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid price series: {0}")]
    Series(#[from] SeriesError),

    #[error("column '{0}' not found in constituents table")]
    MissingColumn(String),

    #[error("unknown history range '{0}' (expected ytd, 1mo, 3mo, 6mo, 1y or 2y)")]
    InvalidRange(String),
}

impl ProviderError {
    /// Transport failures, throttling and server errors are worth retrying
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            ProviderError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Span of daily history requested from a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HistoryRange {
    #[default]
    #[serde(rename = "ytd")]
    YearToDate,
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[serde(rename = "6mo")]
    SixMonths,
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "2y")]
    TwoYears,
}

impl HistoryRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryRange::YearToDate => "ytd",
            HistoryRange::OneMonth => "1mo",
            HistoryRange::ThreeMonths => "3mo",
            HistoryRange::SixMonths => "6mo",
            HistoryRange::OneYear => "1y",
            HistoryRange::TwoYears => "2y",
        }
    }

    /// First date covered by this range when it ends on `end`
    pub fn start_for(&self, end: NaiveDate) -> NaiveDate {
        let months = match self {
            HistoryRange::YearToDate => {
                return NaiveDate::from_ymd_opt(end.year(), 1, 1).unwrap_or(end);
            }
            HistoryRange::OneMonth => 1,
            HistoryRange::ThreeMonths => 3,
            HistoryRange::SixMonths => 6,
            HistoryRange::OneYear => 12,
            HistoryRange::TwoYears => 24,
        };
        end.checked_sub_months(Months::new(months))
            .unwrap_or(NaiveDate::MIN)
    }

    /// Trim a stored history to this range, anchored on its last close
    pub fn apply(&self, series: &PriceSeries) -> PriceSeries {
        match series.last_date() {
            Some(end) => series.since(self.start_for(end)),
            None => series.clone(),
        }
    }
}

impl FromStr for HistoryRange {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ytd" => Ok(HistoryRange::YearToDate),
            "1mo" => Ok(HistoryRange::OneMonth),
            "3mo" => Ok(HistoryRange::ThreeMonths),
            "6mo" => Ok(HistoryRange::SixMonths),
            "1y" => Ok(HistoryRange::OneYear),
            "2y" => Ok(HistoryRange::TwoYears),
            other => Err(ProviderError::InvalidRange(other.to_string())),
        }
    }
}

impl std::fmt::Display for HistoryRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Histories returned by a provider, with the reason for every requested
/// symbol it could not deliver.
///
/// A symbol found in neither map was not returned at all (for example, the
/// provider does not know it).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceHistories {
    pub series: HashMap<String, PriceSeries>,
    pub failures: HashMap<String, String>,
}

impl PriceHistories {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, series: PriceSeries) {
        self.series.insert(series.symbol().to_string(), series);
    }

    /// Record that `symbol` failed with `reason`
    pub fn fail(&mut self, symbol: impl Into<String>, reason: impl Into<String>) {
        self.failures.insert(symbol.into(), reason.into());
    }

    pub fn get(&self, symbol: &str) -> Option<&PriceSeries> {
        self.series.get(symbol)
    }

    pub fn failure(&self, symbol: &str) -> Option<&str> {
        self.failures.get(symbol).map(String::as_str)
    }

    pub fn contains_key(&self, symbol: &str) -> bool {
        self.series.contains_key(symbol)
    }

    /// Number of delivered histories
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

impl From<HashMap<String, PriceSeries>> for PriceHistories {
    fn from(series: HashMap<String, PriceSeries>) -> Self {
        Self {
            series,
            failures: HashMap::new(),
        }
    }
}

impl Index<&str> for PriceHistories {
    type Output = PriceSeries;

    fn index(&self, symbol: &str) -> &PriceSeries {
        &self.series[symbol]
    }
}

/// Source of daily close histories.
///
/// A defect in one symbol's data is reported in
/// [`PriceHistories::failures`]; `Err` is reserved for failures of the
/// source as a whole.
#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    async fn fetch_history(
        &self,
        symbols: &[String],
        range: HistoryRange,
    ) -> Result<PriceHistories, ProviderError>;
}

/// Provider over preloaded histories
#[derive(Debug, Clone, Default)]
pub struct InMemoryPriceProvider {
    series: HashMap<String, PriceSeries>,
}

impl InMemoryPriceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(mut self, series: PriceSeries) -> Self {
        self.insert(series);
        self
    }

    pub fn insert(&mut self, series: PriceSeries) {
        self.series.insert(series.symbol().to_string(), series);
    }
}

impl FromIterator<PriceSeries> for InMemoryPriceProvider {
    fn from_iter<T: IntoIterator<Item = PriceSeries>>(iter: T) -> Self {
        Self {
            series: iter
                .into_iter()
                .map(|s| (s.symbol().to_string(), s))
                .collect(),
        }
    }
}

#[async_trait]
impl PriceHistoryProvider for InMemoryPriceProvider {
    async fn fetch_history(
        &self,
        symbols: &[String],
        range: HistoryRange,
    ) -> Result<PriceHistories, ProviderError> {
        let mut histories = PriceHistories::new();
        for series in symbols.iter().filter_map(|s| self.series.get(s)) {
            histories.insert(range.apply(series));
        }
        Ok(histories)
    }
}
