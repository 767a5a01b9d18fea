//! Core application primitives (engines, orchestrators)

pub mod http;
pub mod screener;
pub mod screening;

pub use screener::BatchScreener;
pub use screening::{ScreeningError, ScreeningService, SymbolReport};
