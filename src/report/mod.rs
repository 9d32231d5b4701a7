//! Reporting utilities: formatted terminal output for a dashboard pass.

pub mod format;

pub use format::*;
