//! RSI (Relative Strength Index) indicator

use crate::indicators::error::{IndicatorError, InsufficientData};
use crate::indicators::momentum::diff::diff_and_split;
use crate::indicators::smoothing::WilderSmoother;
use crate::models::series::{OscillatorPoint, OscillatorSeries, PriceSeries};

/// RSI reading from one pair of smoothed averages
///
/// RSI = 100 - (100 / (1 + RS))
/// RS = Average Gain / Average Loss
///
/// A flat market (both averages zero) reads 50, no losses reads 100 and
/// no gains reads 0.
pub fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return if avg_gain == 0.0 { 50.0 } else { 100.0 };
    }
    if avg_gain == 0.0 {
        return 0.0;
    }

    let rs = avg_gain / avg_loss;
    (100.0 - (100.0 / (1.0 + rs))).clamp(0.0, 100.0)
}

/// Combine aligned average-gain and average-loss series.
///
/// An index is defined only where both averages are.
pub fn rsi_series(avg_gains: &[Option<f64>], avg_losses: &[Option<f64>]) -> Vec<Option<f64>> {
    avg_gains
        .iter()
        .zip(avg_losses)
        .map(|(gain, loss)| match (gain, loss) {
            (Some(g), Some(l)) => Some(rsi_from_averages(*g, *l)),
            _ => None,
        })
        .collect()
}

/// Full RSI pipeline for one symbol.
///
/// The result has one point per close: the first `period` points are
/// undefined and index `period` holds the first reading. Histories with
/// fewer than `period + 1` closes are rejected.
pub fn compute_rsi(
    series: &PriceSeries,
    period: usize,
) -> Result<OscillatorSeries, IndicatorError> {
    let smoother = WilderSmoother::new(period)?;
    Ok(compute_rsi_with(series, &smoother)?)
}

/// [`compute_rsi`] with a prebuilt smoother.
///
/// Only a too-short history can fail here; the smoother already holds a
/// valid period.
pub fn compute_rsi_with(
    series: &PriceSeries,
    smoother: &WilderSmoother,
) -> Result<OscillatorSeries, InsufficientData> {
    let period = smoother.period();
    // A saturated requirement is still longer than any real series
    let required = period.saturating_add(1);
    if series.len() < required {
        return Err(InsufficientData {
            required,
            available: series.len(),
        });
    }

    let split = diff_and_split(series)?;
    let avg_gains = smoother.smooth(&split.gains);
    let avg_losses = smoother.smooth(&split.losses);
    let values = rsi_series(&avg_gains, &avg_losses);

    // The first close has no change, so it leads the step-aligned values
    let points = series
        .points()
        .iter()
        .zip(std::iter::once(None).chain(values))
        .map(|(price, value)| OscillatorPoint {
            date: price.date,
            value,
        })
        .collect();

    Ok(OscillatorSeries {
        symbol: series.symbol().to_string(),
        period,
        points,
    })
}
