//! Yahoo Finance chart API price provider

pub mod messages;
pub mod provider;

pub use provider::YahooChartProvider;
