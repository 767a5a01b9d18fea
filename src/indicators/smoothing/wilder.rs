//! Wilder smoothing (exponential average with alpha = 1/N)

use crate::indicators::error::IndicatorError;

/// Wilder's moving average.
///
/// The first output is defined at observation `period - 1` and is seeded
/// with the arithmetic mean of the first `period` observations. Every later
/// output follows `avg[t] = avg[t-1] + (x[t] - avg[t-1]) / period`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WilderSmoother {
    period: usize,
}

impl WilderSmoother {
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        if period == 0 {
            return Err(IndicatorError::InvalidPeriod(period));
        }
        Ok(Self { period })
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn alpha(&self) -> f64 {
        1.0 / self.period as f64
    }

    /// Smooth `values`, returning one entry per input with `None` for the
    /// warm-up. Fewer than `period` inputs yields only `None`s.
    pub fn smooth(&self, values: &[f64]) -> Vec<Option<f64>> {
        let mut out = vec![None; values.len()];
        if values.len() < self.period {
            return out;
        }

        let alpha = self.alpha();
        let seed = values[..self.period].iter().sum::<f64>() / self.period as f64;
        out[self.period - 1] = Some(seed);

        let mut avg = seed;
        for (i, &x) in values.iter().enumerate().skip(self.period) {
            avg += alpha * (x - avg);
            out[i] = Some(avg);
        }

        out
    }
}
