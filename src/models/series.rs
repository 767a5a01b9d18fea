//! Price and oscillator series value types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejections raised while building a [`PriceSeries`]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("{symbol}: dates must be strictly increasing (index {index})")]
    NonIncreasingDates { symbol: String, index: usize },

    #[error("{symbol}: close price at index {index} is not finite")]
    NonFinitePrice { symbol: String, index: usize },
}

/// One daily close
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Ordered close history of a single symbol.
///
/// Dates are strictly increasing; calendar gaps are kept as they are.
/// The series is immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    symbol: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, points: Vec<PricePoint>) -> Result<Self, SeriesError> {
        let symbol = symbol.into();

        for (index, point) in points.iter().enumerate() {
            if !point.close.is_finite() {
                return Err(SeriesError::NonFinitePrice { symbol, index });
            }
            if index > 0 && points[index - 1].date >= point.date {
                return Err(SeriesError::NonIncreasingDates { symbol, index });
            }
        }

        Ok(Self { symbol, points })
    }

    /// Build a series from `(date, close)` pairs
    pub fn from_pairs<I>(symbol: impl Into<String>, pairs: I) -> Result<Self, SeriesError>
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        let points = pairs
            .into_iter()
            .map(|(date, close)| PricePoint::new(date, close))
            .collect();
        Self::new(symbol, points)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Closes dated on or after `start`
    pub fn since(&self, start: NaiveDate) -> PriceSeries {
        Self {
            symbol: self.symbol.clone(),
            points: self
                .points
                .iter()
                .filter(|p| p.date >= start)
                .copied()
                .collect(),
        }
    }
}

/// One RSI reading; `value` is `None` inside the warm-up
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OscillatorPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

/// RSI series aligned one-to-one with the dates of its price series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OscillatorSeries {
    pub symbol: String,
    pub period: usize,
    pub points: Vec<OscillatorPoint>,
}

impl OscillatorSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> Vec<Option<f64>> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Most recent defined reading with its date
    pub fn latest(&self) -> Option<OscillatorPoint> {
        self.points.iter().rev().find(|p| p.value.is_some()).copied()
    }

    pub fn latest_value(&self) -> Option<f64> {
        self.latest().and_then(|p| p.value)
    }

    /// Number of leading undefined readings
    pub fn warmup_len(&self) -> usize {
        self.points.iter().take_while(|p| p.value.is_none()).count()
    }
}
