use thiserror::Error;

/// A series too short for the requested computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("insufficient data: {available} points available, {required} required")]
pub struct InsufficientData {
    pub required: usize,
    pub available: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndicatorError {
    #[error(transparent)]
    InsufficientData(#[from] InsufficientData),

    #[error("smoothing period must be at least 1, got {0}")]
    InvalidPeriod(usize),
}
