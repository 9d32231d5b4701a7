//! Trend forecaster: fit a linear trend over period-indexed observations and
//! project the next period.

pub mod trend;

pub use trend::*;
