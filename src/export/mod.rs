//! CSV exports for download and offline analysis

use std::io::Write;

use thiserror::Error;

use crate::models::screening::ScreeningResult;
use crate::models::series::OscillatorSeries;
use crate::models::universe::Universe;
use crate::signals::classifier::Thresholds;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Constituents table as `Symbol,Name`
pub fn write_universe_csv<W: Write>(universe: &Universe, writer: W) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(["Symbol", "Name"])?;
    for (symbol, name) in universe.iter() {
        writer.write_record([symbol.as_str(), name.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

/// One row per screened symbol, in symbol order
pub fn write_screening_csv<W: Write>(
    result: &ScreeningResult,
    writer: W,
) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record([
        "symbol",
        "name",
        "classification",
        "latest_rsi",
        "last_date",
        "reason",
    ])?;

    for outcome in result.outcomes.values() {
        writer.write_record([
            outcome.symbol.clone(),
            outcome.display_name.clone(),
            outcome.classification.to_string(),
            outcome
                .latest_value
                .map(|v| format!("{:.4}", v))
                .unwrap_or_default(),
            outcome
                .latest_date
                .map(|d| d.to_string())
                .unwrap_or_default(),
            outcome
                .failure
                .as_ref()
                .map(|f| f.to_string())
                .unwrap_or_default(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Chart data for one symbol: the RSI line plus the two band lines.
/// Warm-up rows keep their date with an empty `rsi` cell.
pub fn write_oscillator_csv<W: Write>(
    series: &OscillatorSeries,
    thresholds: Thresholds,
    writer: W,
) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(["date", "rsi", "oversold", "overbought"])?;

    let oversold = thresholds.oversold.to_string();
    let overbought = thresholds.overbought.to_string();
    for point in &series.points {
        writer.write_record([
            point.date.to_string(),
            point.value.map(|v| format!("{:.4}", v)).unwrap_or_default(),
            oversold.clone(),
            overbought.clone(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
