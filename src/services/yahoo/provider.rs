//! Yahoo chart API implementation of [`PriceHistoryProvider`]

use std::time::Duration;

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use futures_util::stream::{self, StreamExt};
use reqwest::StatusCode;
use tracing::{debug, info, warn};

use crate::config;
use crate::models::series::PriceSeries;
use crate::services::market_data::{
    HistoryRange, PriceHistories, PriceHistoryProvider, ProviderError,
};

use super::messages::ChartResponse;

const USER_AGENT: &str = "Mozilla/5.0 (compatible; hotstocks/0.1)";
const DEFAULT_MAX_RETRIES: usize = 3;

pub struct YahooChartProvider {
    client: reqwest::Client,
    base_url: String,
    concurrency: usize,
    max_retries: usize,
}

impl YahooChartProvider {
    /// Provider configured from `YAHOO_BASE_URL` and `FETCH_CONCURRENCY`
    pub fn new() -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(Self::with_client(config::get_yahoo_base_url(), client))
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            concurrency: config::get_fetch_concurrency(),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// One chart request. `Ok(None)` means Yahoo does not know the symbol.
    async fn fetch_chart(
        &self,
        symbol: &str,
        range: HistoryRange,
    ) -> Result<Option<PriceSeries>, ProviderError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("range", range.as_str()),
                ("interval", "1d"),
                ("includeAdjustedClose", "true"),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(ProviderError::Status {
                symbol: symbol.to_string(),
                status: status.as_u16(),
            });
        }

        let body: ChartResponse = response.json().await?;
        if let Some(error) = body.chart.error {
            return Err(ProviderError::Payload {
                symbol: symbol.to_string(),
                message: format!("{}: {}", error.code, error.description),
            });
        }

        match body.chart.result.and_then(|r| r.into_iter().next()) {
            Some(result) => result.into_series(symbol).map(Some),
            None => Ok(None),
        }
    }

    async fn fetch_with_retry(
        &self,
        symbol: &str,
        range: HistoryRange,
    ) -> Result<Option<PriceSeries>, ProviderError> {
        let backoff = ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(200))
            .with_max_delay(Duration::from_secs(5))
            .with_max_times(self.max_retries);

        (|| async { self.fetch_chart(symbol, range).await })
            .retry(backoff)
            .when(|e: &ProviderError| e.is_retryable())
            .notify(|e: &ProviderError, delay: Duration| {
                debug!(
                    symbol = %symbol,
                    error = %e,
                    delay_ms = delay.as_millis() as u64,
                    "YahooChartProvider: retrying {} in {:?}",
                    symbol,
                    delay
                );
            })
            .await
    }
}

#[async_trait]
impl PriceHistoryProvider for YahooChartProvider {
    /// Fetch every symbol with at most `concurrency` requests in flight.
    ///
    /// Symbols Yahoo does not know are left out. Symbols that keep failing
    /// after retries are recorded with their error.
    async fn fetch_history(
        &self,
        symbols: &[String],
        range: HistoryRange,
    ) -> Result<PriceHistories, ProviderError> {
        info!(
            symbols = symbols.len(),
            range = %range,
            concurrency = self.concurrency,
            "YahooChartProvider: fetching {} histories ({})",
            symbols.len(),
            range
        );

        let results: Vec<(String, Result<Option<PriceSeries>, ProviderError>)> =
            stream::iter(symbols.iter().cloned())
                .map(|symbol| async move {
                    let result = self.fetch_with_retry(&symbol, range).await;
                    (symbol, result)
                })
                .buffer_unordered(self.concurrency)
                .collect()
                .await;

        let mut histories = PriceHistories::new();
        for (symbol, result) in results {
            match result {
                Ok(Some(series)) => histories.insert(series),
                Ok(None) => {
                    warn!(symbol = %symbol, "YahooChartProvider: no chart data for {}", symbol);
                }
                Err(e) => {
                    warn!(
                        symbol = %symbol,
                        error = %e,
                        "YahooChartProvider: giving up on {}",
                        symbol
                    );
                    histories.fail(symbol, e.to_string());
                }
            }
        }

        info!(
            requested = symbols.len(),
            fetched = histories.len(),
            failed = histories.failures.len(),
            "YahooChartProvider: fetched {} of {} histories",
            histories.len(),
            symbols.len()
        );
        Ok(histories)
    }
}
