//! Oversold / overbought classification of an RSI series

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, ScreeningConfig, DEFAULT_OVERBOUGHT, DEFAULT_OVERSOLD};
use crate::models::screening::Classification;
use crate::models::series::OscillatorSeries;

/// Exclusive RSI bounds: a reading equal to either threshold is neutral
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub oversold: f64,
    pub overbought: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            oversold: DEFAULT_OVERSOLD,
            overbought: DEFAULT_OVERBOUGHT,
        }
    }
}

impl From<&ScreeningConfig> for Thresholds {
    fn from(config: &ScreeningConfig) -> Self {
        Self {
            oversold: config.oversold,
            overbought: config.overbought,
        }
    }
}

/// Classifies symbols by their latest RSI reading
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HotStockClassifier {
    thresholds: Thresholds,
}

impl HotStockClassifier {
    pub fn new(oversold: f64, overbought: f64) -> Result<Self, ConfigError> {
        let config = ScreeningConfig {
            oversold,
            overbought,
            ..ScreeningConfig::default()
        };
        config.validate()?;
        Ok(Self {
            thresholds: Thresholds::from(&config),
        })
    }

    pub(crate) fn from_validated(config: &ScreeningConfig) -> Self {
        Self {
            thresholds: Thresholds::from(config),
        }
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    pub fn classify_value(&self, value: Option<f64>) -> Classification {
        match value {
            None => Classification::Undetermined,
            Some(v) if v < self.thresholds.oversold => Classification::Oversold,
            Some(v) if v > self.thresholds.overbought => Classification::Overbought,
            Some(_) => Classification::Neutral,
        }
    }

    /// Classify by the most recent defined reading only
    pub fn classify(&self, series: &OscillatorSeries) -> Classification {
        self.classify_value(series.latest_value())
    }
}
