//! Screening service: universe + price provider + batch screener

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{ConfigError, ScreeningConfig};
use crate::core::screener::BatchScreener;
use crate::metrics::Metrics;
use crate::models::screening::{ScreeningResult, SymbolOutcome};
use crate::models::series::PriceSeries;
use crate::models::universe::{normalize_symbol, Universe};
use crate::services::market_data::{HistoryRange, PriceHistoryProvider, ProviderError};
use crate::signals::classifier::Thresholds;

#[derive(Debug, Error)]
pub enum ScreeningError {
    #[error("invalid screening configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("price history unavailable: {0}")]
    Provider(#[from] ProviderError),

    #[error("symbol '{0}' is not part of the universe")]
    UnknownSymbol(String),

    #[error("screening task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Single-symbol view: the RSI series with the bands it is judged against
#[derive(Debug, Clone, Serialize)]
pub struct SymbolReport {
    #[serde(flatten)]
    pub outcome: SymbolOutcome,
    pub period: usize,
    pub thresholds: Thresholds,
    pub range: HistoryRange,
}

impl SymbolReport {
    pub fn title(&self) -> String {
        format!("Daily RSI for {}", self.outcome.display_name)
    }
}

pub struct ScreeningService {
    universe: Arc<Universe>,
    provider: Arc<dyn PriceHistoryProvider>,
    defaults: ScreeningConfig,
    metrics: Option<Arc<Metrics>>,
}

impl ScreeningService {
    pub fn new(universe: Arc<Universe>, provider: Arc<dyn PriceHistoryProvider>) -> Self {
        Self {
            universe,
            provider,
            defaults: ScreeningConfig::default(),
            metrics: None,
        }
    }

    pub fn with_defaults(mut self, defaults: ScreeningConfig) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    pub fn defaults(&self) -> ScreeningConfig {
        self.defaults
    }

    /// Screen the whole universe.
    ///
    /// The configuration is validated before any price is requested.
    pub async fn run(
        &self,
        config: ScreeningConfig,
        range: HistoryRange,
    ) -> Result<ScreeningResult, ScreeningError> {
        let screener = BatchScreener::new(config)?;
        let start = Instant::now();

        let histories = self
            .provider
            .fetch_history(&self.universe.symbols(), range)
            .await?;
        debug!(
            requested = self.universe.len(),
            received = histories.len(),
            failed = histories.failures.len(),
            "ScreeningService: received {} of {} histories",
            histories.len(),
            self.universe.len()
        );

        let universe = self.universe.clone();
        let result = tokio::task::spawn_blocking(move || {
            screener.screen_with_failures(&universe, &histories.series, &histories.failures)
        })
        .await?;

        self.record(&result, start);
        Ok(result)
    }

    /// Screen caller-supplied histories, labelled from the universe when known
    pub async fn screen_prices(
        &self,
        config: ScreeningConfig,
        prices: HashMap<String, PriceSeries>,
    ) -> Result<ScreeningResult, ScreeningError> {
        let screener = BatchScreener::new(config)?;
        let start = Instant::now();

        let universe: Universe = prices
            .keys()
            .map(|symbol| (symbol.clone(), self.universe.display_name(symbol)))
            .collect();
        let result =
            tokio::task::spawn_blocking(move || screener.screen(&universe, &prices)).await?;

        self.record(&result, start);
        Ok(result)
    }

    /// RSI development of a single universe member
    pub async fn symbol_report(
        &self,
        symbol: &str,
        config: ScreeningConfig,
        range: HistoryRange,
    ) -> Result<SymbolReport, ScreeningError> {
        let screener = BatchScreener::new(config)?;
        let symbol = normalize_symbol(symbol);
        if !self.universe.contains(&symbol) {
            return Err(ScreeningError::UnknownSymbol(symbol));
        }

        let histories = self
            .provider
            .fetch_history(std::slice::from_ref(&symbol), range)
            .await?;
        let outcome = screener.screen_symbol(
            &symbol,
            self.universe.display_name(&symbol),
            histories.get(&symbol),
            histories.failure(&symbol),
        );

        info!(
            symbol = %symbol,
            classification = %outcome.classification,
            latest = ?outcome.latest_value,
            "ScreeningService: {} is {}",
            symbol,
            outcome.classification
        );

        Ok(SymbolReport {
            outcome,
            period: config.period,
            thresholds: screener.classifier().thresholds(),
            range,
        })
    }

    fn record(&self, result: &ScreeningResult, start: Instant) {
        if let Some(ref metrics) = self.metrics {
            metrics.record_screening(result, start.elapsed().as_secs_f64());
        }
    }
}
