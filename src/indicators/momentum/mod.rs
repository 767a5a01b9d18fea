pub mod diff;
pub mod rsi;

pub use diff::{diff_and_split, GainLoss};
pub use rsi::{compute_rsi, compute_rsi_with, rsi_from_averages, rsi_series};
