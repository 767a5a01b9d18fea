use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::ScreeningConfig;
use crate::indicators::error::InsufficientData;
use crate::models::series::OscillatorSeries;

/// Momentum bucket of a symbol's latest RSI reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Oversold,
    Overbought,
    Neutral,
    Undetermined,
}

impl Classification {
    /// Oversold and overbought symbols make up the hot set
    pub fn is_hot(&self) -> bool {
        matches!(self, Classification::Oversold | Classification::Overbought)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Oversold => "oversold",
            Classification::Overbought => "overbought",
            Classification::Neutral => "neutral",
            Classification::Undetermined => "undetermined",
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a symbol could not be scored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureReason {
    /// Not present in the price provider's response
    MissingSymbol,
    /// Present, but too short for the configured period
    InsufficientData { required: usize, available: usize },
    /// The provider could not deliver a usable history for this symbol
    Provider { message: String },
}

impl From<InsufficientData> for FailureReason {
    fn from(e: InsufficientData) -> Self {
        FailureReason::InsufficientData {
            required: e.required,
            available: e.available,
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::MissingSymbol => f.write_str("no price history returned"),
            FailureReason::InsufficientData {
                required,
                available,
            } => write!(
                f,
                "insufficient history: {} closes available, {} required",
                available, required
            ),
            FailureReason::Provider { message } => write!(f, "provider error: {}", message),
        }
    }
}

/// Result of screening one symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolOutcome {
    pub symbol: String,
    pub display_name: String,
    pub classification: Classification,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oscillator: Option<OscillatorSeries>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureReason>,
}

impl SymbolOutcome {
    pub fn scored(
        display_name: String,
        oscillator: OscillatorSeries,
        classification: Classification,
    ) -> Self {
        let latest = oscillator.latest();
        Self {
            symbol: oscillator.symbol.clone(),
            display_name,
            classification,
            latest_value: latest.and_then(|p| p.value),
            latest_date: latest.map(|p| p.date),
            oscillator: Some(oscillator),
            failure: None,
        }
    }

    pub fn failed(symbol: String, display_name: String, reason: FailureReason) -> Self {
        Self {
            symbol,
            display_name,
            classification: Classification::Undetermined,
            latest_value: None,
            latest_date: None,
            oscillator: None,
            failure: Some(reason),
        }
    }

    pub fn is_hot(&self) -> bool {
        self.classification.is_hot()
    }
}

/// Aggregate outcome of one screening run.
///
/// Every requested symbol has exactly one entry in `outcomes`, so an empty
/// `hot_set` always means "nothing is hot", never "nothing was screened".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningResult {
    pub config: ScreeningConfig,
    pub outcomes: BTreeMap<String, SymbolOutcome>,
    pub hot_set: BTreeSet<String>,
}

impl ScreeningResult {
    pub fn new(config: ScreeningConfig, outcomes: BTreeMap<String, SymbolOutcome>) -> Self {
        let hot_set = outcomes
            .values()
            .filter(|o| o.is_hot())
            .map(|o| o.symbol.clone())
            .collect();

        Self {
            config,
            outcomes,
            hot_set,
        }
    }

    pub fn outcome(&self, symbol: &str) -> Option<&SymbolOutcome> {
        self.outcomes.get(symbol)
    }

    pub fn classification(&self, symbol: &str) -> Option<Classification> {
        self.outcomes.get(symbol).map(|o| o.classification)
    }

    pub fn has_hot_symbols(&self) -> bool {
        !self.hot_set.is_empty()
    }

    /// Outcomes of the hot set in symbol order
    pub fn hot_outcomes(&self) -> impl Iterator<Item = &SymbolOutcome> {
        self.outcomes.values().filter(|o| o.is_hot())
    }

    pub fn with_classification(
        &self,
        classification: Classification,
    ) -> impl Iterator<Item = &SymbolOutcome> {
        self.outcomes
            .values()
            .filter(move |o| o.classification == classification)
    }

    pub fn count(&self, classification: Classification) -> usize {
        self.with_classification(classification).count()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}
