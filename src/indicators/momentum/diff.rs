//! Close-to-close differencing into gain and loss magnitudes

use chrono::NaiveDate;

use crate::indicators::error::InsufficientData;
use crate::models::series::PriceSeries;

/// Gain and loss magnitudes for each step of a price series.
///
/// Indexed by the trailing date of each step, so the three vectors are one
/// shorter than the source series. Both magnitudes are non-negative and at
/// most one of them is nonzero per step.
#[derive(Debug, Clone, PartialEq)]
pub struct GainLoss {
    pub dates: Vec<NaiveDate>,
    pub gains: Vec<f64>,
    pub losses: Vec<f64>,
}

impl GainLoss {
    pub fn len(&self) -> usize {
        self.gains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gains.is_empty()
    }
}

/// Split consecutive close changes into gains and losses
pub fn diff_and_split(series: &PriceSeries) -> Result<GainLoss, InsufficientData> {
    let points = series.points();
    if points.len() < 2 {
        return Err(InsufficientData {
            required: 2,
            available: points.len(),
        });
    }

    let steps = points.len() - 1;
    let mut dates = Vec::with_capacity(steps);
    let mut gains = Vec::with_capacity(steps);
    let mut losses = Vec::with_capacity(steps);

    for pair in points.windows(2) {
        let change = pair[1].close - pair[0].close;
        dates.push(pair[1].date);
        if change > 0.0 {
            gains.push(change);
            losses.push(0.0);
        } else if change < 0.0 {
            gains.push(0.0);
            losses.push(-change);
        } else {
            gains.push(0.0);
            losses.push(0.0);
        }
    }

    Ok(GainLoss {
        dates,
        gains,
        losses,
    })
}
