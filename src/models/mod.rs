//! Shared data models spanning the engine layers.

pub mod screening;
pub mod series;
pub mod universe;

pub use screening::{Classification, FailureReason, ScreeningResult, SymbolOutcome};
pub use series::{OscillatorPoint, OscillatorSeries, PricePoint, PriceSeries, SeriesError};
pub use universe::{normalize_symbol, Universe};
