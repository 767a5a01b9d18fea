//! Chart endpoint response shapes

use chrono::DateTime;
use serde::Deserialize;

use crate::models::series::{PricePoint, PriceSeries};
use crate::services::market_data::ProviderError;

#[derive(Debug, Deserialize)]
pub struct ChartResponse {
    pub chart: Chart,
}

#[derive(Debug, Deserialize)]
pub struct Chart {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
pub struct ChartError {
    pub code: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct ChartResult {
    pub meta: ChartMeta,
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: Indicators,
}

#[derive(Debug, Deserialize)]
pub struct ChartMeta {
    pub symbol: String,
    /// Exchange offset from UTC, in seconds
    #[serde(default)]
    pub gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<Quote>,
    #[serde(default)]
    pub adjclose: Vec<AdjClose>,
}

#[derive(Debug, Deserialize)]
pub struct Quote {
    #[serde(default)]
    pub close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
pub struct AdjClose {
    #[serde(default)]
    pub adjclose: Vec<Option<f64>>,
}

impl ChartResult {
    /// Daily adjusted closes (raw closes when Yahoo sends no adjusted column).
    ///
    /// Rows with a null close are dropped. When two rows fall on the same
    /// exchange date, the later one wins.
    pub fn into_series(self, symbol: &str) -> Result<PriceSeries, ProviderError> {
        let closes = match self.indicators.adjclose.into_iter().next() {
            Some(adj) if !adj.adjclose.is_empty() => adj.adjclose,
            _ => self
                .indicators
                .quote
                .into_iter()
                .next()
                .map(|q| q.close)
                .unwrap_or_default(),
        };

        if closes.len() != self.timestamp.len() {
            return Err(ProviderError::Payload {
                symbol: symbol.to_string(),
                message: format!(
                    "{} timestamps but {} closes",
                    self.timestamp.len(),
                    closes.len()
                ),
            });
        }

        let mut points: Vec<PricePoint> = Vec::with_capacity(closes.len());
        for (ts, close) in self.timestamp.iter().zip(closes) {
            let Some(close) = close.filter(|c| c.is_finite()) else {
                continue;
            };
            let date = DateTime::from_timestamp(ts + self.meta.gmtoffset, 0)
                .ok_or_else(|| ProviderError::Payload {
                    symbol: symbol.to_string(),
                    message: format!("timestamp {} out of range", ts),
                })?
                .date_naive();

            if let Some(last) = points.last_mut() {
                if last.date == date {
                    last.close = close;
                    continue;
                }
                if last.date > date {
                    continue;
                }
            }
            points.push(PricePoint::new(date, close));
        }

        Ok(PriceSeries::new(symbol, points)?)
    }
}
