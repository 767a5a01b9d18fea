//! RSI screening engine for equity universes.
//!
//! The engine turns daily close histories into Wilder RSI series and
//! classifies each symbol as oversold, overbought, neutral or undetermined.
//! Data acquisition, export and the HTTP surface live around it.

pub mod config;
pub mod core;
pub mod export;
pub mod indicators;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod signals;
