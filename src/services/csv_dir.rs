//! Price histories read from a directory of per-symbol CSV files

use std::io::Read;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::models::series::{PricePoint, PriceSeries};
use crate::services::market_data::{
    HistoryRange, PriceHistories, PriceHistoryProvider, ProviderError,
};

#[derive(Debug, Deserialize)]
struct CloseRow {
    date: NaiveDate,
    close: f64,
}

/// Reads `<dir>/<SYMBOL>.csv` files with a `date,close` header
#[derive(Debug, Clone)]
pub struct CsvDirectoryProvider {
    dir: PathBuf,
}

impl CsvDirectoryProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", symbol))
    }
}

/// Parse one `date,close` history
pub fn read_close_csv<R: Read>(symbol: &str, reader: R) -> Result<PriceSeries, ProviderError> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut points = Vec::new();
    for row in reader.deserialize() {
        let row: CloseRow = row?;
        points.push(PricePoint::new(row.date, row.close));
    }
    Ok(PriceSeries::new(symbol, points)?)
}

#[async_trait]
impl PriceHistoryProvider for CsvDirectoryProvider {
    /// A symbol without a file is omitted. An unreadable or malformed file
    /// is recorded as that symbol's failure; only a missing directory
    /// fails the whole request.
    async fn fetch_history(
        &self,
        symbols: &[String],
        range: HistoryRange,
    ) -> Result<PriceHistories, ProviderError> {
        let metadata = tokio::fs::metadata(&self.dir).await?;
        if !metadata.is_dir() {
            return Err(ProviderError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} is not a directory", self.dir.display()),
            )));
        }

        let mut histories = PriceHistories::new();
        for symbol in symbols {
            let path = self.path_for(symbol);
            let loaded = match tokio::fs::read(&path).await {
                Ok(contents) => read_close_csv(symbol, contents.as_slice()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    debug!(
                        symbol = %symbol,
                        path = %path.display(),
                        "CsvDirectoryProvider: no file for {}",
                        symbol
                    );
                    continue;
                }
                Err(e) => Err(e.into()),
            };

            match loaded {
                Ok(series) => histories.insert(range.apply(&series)),
                Err(e) => {
                    warn!(
                        symbol = %symbol,
                        path = %path.display(),
                        error = %e,
                        "CsvDirectoryProvider: skipping unusable history for {}",
                        symbol
                    );
                    histories.fail(symbol.clone(), e.to_string());
                }
            }
        }

        debug!(
            requested = symbols.len(),
            loaded = histories.len(),
            failed = histories.failures.len(),
            dir = %self.dir.display(),
            "CsvDirectoryProvider: loaded {} of {} histories",
            histories.len(),
            symbols.len()
        );
        Ok(histories)
    }
}
