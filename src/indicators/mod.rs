//! Indicator computations over close-price histories

pub mod error;
pub mod momentum;
pub mod smoothing;

pub use error::{IndicatorError, InsufficientData};
pub use momentum::{
    compute_rsi, compute_rsi_with, diff_and_split, rsi_from_averages, rsi_series, GainLoss,
};
pub use smoothing::WilderSmoother;
