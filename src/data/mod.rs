//! Data preparation: monthly bucketing for the trend and the demo dataset.

pub mod period;
pub mod sample;

pub use period::{monthly_observations, MonthlySeries};
pub use sample::demo_csv;
