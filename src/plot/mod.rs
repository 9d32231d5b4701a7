//! Terminal rendering of chart data.

pub mod ascii;

pub use ascii::{render_chart, render_dashboard};
