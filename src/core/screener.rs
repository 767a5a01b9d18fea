//! Batch RSI screening across a universe

use std::collections::{BTreeMap, HashMap};

use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::{ConfigError, ScreeningConfig};
use crate::indicators::{compute_rsi_with, WilderSmoother};
use crate::models::screening::{Classification, FailureReason, ScreeningResult, SymbolOutcome};
use crate::models::series::PriceSeries;
use crate::models::universe::Universe;
use crate::signals::classifier::HotStockClassifier;

/// Runs the RSI pipeline independently for every symbol of a universe.
///
/// Configuration is validated once at construction; after that, screening
/// never fails. Symbols without usable history come back as undetermined
/// outcomes carrying a [`FailureReason`].
#[derive(Debug, Clone)]
pub struct BatchScreener {
    config: ScreeningConfig,
    smoother: WilderSmoother,
    classifier: HotStockClassifier,
}

impl BatchScreener {
    pub fn new(config: ScreeningConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let smoother = WilderSmoother::new(config.period)
            .map_err(|_| ConfigError::InvalidPeriod(config.period))?;

        Ok(Self {
            config,
            smoother,
            classifier: HotStockClassifier::from_validated(&config),
        })
    }

    pub fn config(&self) -> &ScreeningConfig {
        &self.config
    }

    pub fn classifier(&self) -> &HotStockClassifier {
        &self.classifier
    }

    /// Screen one symbol.
    ///
    /// `series` is `None` when the provider delivered nothing; `provider_failure`
    /// then carries the provider's reason, if it gave one.
    pub fn screen_symbol(
        &self,
        symbol: &str,
        display_name: String,
        series: Option<&PriceSeries>,
        provider_failure: Option<&str>,
    ) -> SymbolOutcome {
        let Some(series) = series else {
            let reason = match provider_failure {
                Some(message) => FailureReason::Provider {
                    message: message.to_string(),
                },
                None => FailureReason::MissingSymbol,
            };
            debug!(symbol = %symbol, reason = %reason, "Screener: no history for {}", symbol);
            return SymbolOutcome::failed(symbol.to_string(), display_name, reason);
        };

        match compute_rsi_with(series, &self.smoother) {
            Ok(oscillator) => {
                let classification = self.classifier.classify(&oscillator);
                SymbolOutcome::scored(display_name, oscillator, classification)
            }
            Err(short) => {
                debug!(
                    symbol = %symbol,
                    required = short.required,
                    available = short.available,
                    "Screener: not enough closes for {} ({} < {})",
                    symbol,
                    short.available,
                    short.required
                );
                SymbolOutcome::failed(symbol.to_string(), display_name, short.into())
            }
        }
    }

    /// Screen every symbol of `universe` against the fetched `prices`.
    ///
    /// Symbols are processed in parallel; results are merged into the
    /// aggregate by a single writer once all of them are done. Entries of
    /// `prices` outside the universe are ignored.
    pub fn screen(
        &self,
        universe: &Universe,
        prices: &HashMap<String, PriceSeries>,
    ) -> ScreeningResult {
        self.screen_with_failures(universe, prices, &HashMap::new())
    }

    /// [`screen`](Self::screen), recording `failures` (symbol to provider
    /// reason) for symbols absent from `prices`
    pub fn screen_with_failures(
        &self,
        universe: &Universe,
        prices: &HashMap<String, PriceSeries>,
        failures: &HashMap<String, String>,
    ) -> ScreeningResult {
        let requested: Vec<(&String, &String)> = universe.iter().collect();

        let outcomes: Vec<SymbolOutcome> = requested
            .par_iter()
            .map(|(symbol, name)| {
                self.screen_symbol(
                    symbol,
                    (*name).clone(),
                    prices.get(symbol.as_str()),
                    failures.get(symbol.as_str()).map(String::as_str),
                )
            })
            .collect();

        let outcomes: BTreeMap<String, SymbolOutcome> = outcomes
            .into_iter()
            .map(|outcome| (outcome.symbol.clone(), outcome))
            .collect();

        let result = ScreeningResult::new(self.config, outcomes);
        info!(
            symbols = result.len(),
            hot = result.hot_set.len(),
            undetermined = result.count(Classification::Undetermined),
            period = self.config.period,
            "Screener: screened {} symbols, {} hot",
            result.len(),
            result.hot_set.len()
        );
        result
    }

    /// Screen exactly the symbols present in `prices`
    pub fn screen_series(&self, prices: &HashMap<String, PriceSeries>) -> ScreeningResult {
        let universe = Universe::from_symbols(prices.keys().cloned());
        self.screen(&universe, prices)
    }
}
