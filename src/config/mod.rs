//! Environment and screening configuration

use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_RSI_PERIOD: usize = 14;
pub const DEFAULT_OVERSOLD: f64 = 30.0;
pub const DEFAULT_OVERBOUGHT: f64 = 70.0;

const DEFAULT_YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";
const DEFAULT_FETCH_CONCURRENCY: usize = 8;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("RSI period must be at least 1, got {0}")]
    InvalidPeriod(usize),

    #[error("{name} threshold must be a finite value within [0, 100], got {value}")]
    InvalidThreshold { name: &'static str, value: f64 },

    #[error("oversold threshold ({oversold}) must be below overbought threshold ({overbought})")]
    InvertedThresholds { oversold: f64, overbought: f64 },

    #[error("environment variable {key} has an invalid value '{value}'")]
    InvalidEnv { key: &'static str, value: String },
}

/// Parameters of one screening run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreeningConfig {
    pub period: usize,
    pub oversold: f64,
    pub overbought: f64,
}

impl Default for ScreeningConfig {
    fn default() -> Self {
        Self {
            period: DEFAULT_RSI_PERIOD,
            oversold: DEFAULT_OVERSOLD,
            overbought: DEFAULT_OVERBOUGHT,
        }
    }
}

impl ScreeningConfig {
    pub fn new(period: usize, oversold: f64, overbought: f64) -> Self {
        Self {
            period,
            oversold,
            overbought,
        }
    }

    /// Read `RSI_PERIOD`, `RSI_OVERSOLD` and `RSI_OVERBOUGHT`, falling back
    /// to the defaults for unset variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// [`from_env`](Self::from_env) over an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            period: parse_var(&lookup, "RSI_PERIOD")?.unwrap_or(defaults.period),
            oversold: parse_var(&lookup, "RSI_OVERSOLD")?.unwrap_or(defaults.oversold),
            overbought: parse_var(&lookup, "RSI_OVERBOUGHT")?.unwrap_or(defaults.overbought),
        };
        config.validate()?;
        Ok(config)
    }

    /// Apply per-run overrides on top of this configuration
    pub fn with_overrides(
        self,
        period: Option<usize>,
        oversold: Option<f64>,
        overbought: Option<f64>,
    ) -> Self {
        Self {
            period: period.unwrap_or(self.period),
            oversold: oversold.unwrap_or(self.oversold),
            overbought: overbought.unwrap_or(self.overbought),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.period == 0 {
            return Err(ConfigError::InvalidPeriod(self.period));
        }
        check_threshold("oversold", self.oversold)?;
        check_threshold("overbought", self.overbought)?;
        if self.oversold >= self.overbought {
            return Err(ConfigError::InvertedThresholds {
                oversold: self.oversold,
                overbought: self.overbought,
            });
        }
        Ok(())
    }
}

fn check_threshold(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidThreshold { name, value })
    }
}

fn parse_var<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv { key, value: raw }),
        None => Ok(None),
    }
}

/// Deployment environment (`APP_ENV`), `sandbox` when unset
pub fn get_environment() -> String {
    env::var("APP_ENV").unwrap_or_else(|_| "sandbox".to_string())
}

pub fn get_yahoo_base_url() -> String {
    env::var("YAHOO_BASE_URL").unwrap_or_else(|_| DEFAULT_YAHOO_BASE_URL.to_string())
}

/// Upper bound on concurrent price-history requests
pub fn get_fetch_concurrency() -> usize {
    env::var("FETCH_CONCURRENCY")
        .ok()
        .and_then(|c| c.parse().ok())
        .filter(|c: &usize| *c > 0)
        .unwrap_or(DEFAULT_FETCH_CONCURRENCY)
}

/// Constituents table loaded by the API server
pub fn get_universe_path() -> String {
    env::var("UNIVERSE_PATH").unwrap_or_else(|_| "universe.csv".to_string())
}

/// Label column of the constituents table (`Name` for the S&P 100,
/// `Security` for the S&P 500 listing)
pub fn get_universe_name_column() -> String {
    env::var("UNIVERSE_NAME_COLUMN").unwrap_or_else(|_| "Name".to_string())
}

/// Optional directory of `<SYMBOL>.csv` close histories; Yahoo is used when unset
pub fn get_prices_dir() -> Option<String> {
    env::var("PRICES_DIR").ok().filter(|p| !p.is_empty())
}
