//! Collaborators around the screening engine: reference data and price
//! history sources.

pub mod csv_dir;
pub mod market_data;
pub mod universe;
pub mod yahoo;

pub use csv_dir::CsvDirectoryProvider;
pub use market_data::{
    HistoryRange, InMemoryPriceProvider, PriceHistories, PriceHistoryProvider, ProviderError,
};
pub use universe::{load_universe, read_universe_csv};
pub use yahoo::YahooChartProvider;
