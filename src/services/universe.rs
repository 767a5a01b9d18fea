//! Constituents table loading

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::info;

use crate::models::universe::{normalize_symbol, Universe};
use crate::services::market_data::ProviderError;

pub const SYMBOL_COLUMN: &str = "Symbol";
pub const NAME_COLUMN: &str = "Name";

/// Read a constituents table, keeping the symbol and label columns.
///
/// Index tables label companies differently (`Name`, `Security`), so the
/// label column is chosen by the caller. Symbols are normalized for the
/// price provider and rows without a symbol are skipped.
pub fn read_universe_csv<R: Read>(
    reader: R,
    symbol_column: &str,
    name_column: &str,
) -> Result<Universe, ProviderError> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers = reader.headers()?.clone();

    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| ProviderError::MissingColumn(name.to_string()))
    };
    let symbol_idx = column(symbol_column)?;
    let name_idx = column(name_column)?;

    let mut universe = Universe::new();
    for record in reader.records() {
        let record = record?;
        let symbol = normalize_symbol(record.get(symbol_idx).unwrap_or_default());
        if symbol.is_empty() {
            continue;
        }
        let name = record.get(name_idx).unwrap_or_default().trim();
        let name = if name.is_empty() { symbol.as_str() } else { name };
        universe.insert(symbol.clone(), name.to_string());
    }

    Ok(universe)
}

pub fn load_universe(
    path: impl AsRef<Path>,
    symbol_column: &str,
    name_column: &str,
) -> Result<Universe, ProviderError> {
    let path = path.as_ref();
    let universe = read_universe_csv(File::open(path)?, symbol_column, name_column)?;
    info!(
        path = %path.display(),
        symbols = universe.len(),
        "Loaded universe of {} symbols",
        universe.len()
    );
    Ok(universe)
}
