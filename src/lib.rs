//! `sales-dash` library crate.
//!
//! The binary (`sdash`) is a thin wrapper around this library so that:
//!
//! - core logic (ingest, charts, forecasting) is testable without spawning processes
//! - the CLI report and the TUI share one pipeline

pub mod app;
pub mod charts;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod forecast;
pub mod io;
pub mod logging;
pub mod math;
pub mod plot;
pub mod report;
pub mod tui;
