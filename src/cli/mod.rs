//! Command-line parsing for the retail sales dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the ingest/charting/forecasting code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::data::sample;
use crate::domain::{Delimiter, Profile};

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "sdash", version, about = "Retail sales CSV dashboard with a monthly trend forecast")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Preview the data, draw the profile's charts, and print the forecast.
    Dashboard(DashboardArgs),
    /// Print the forecast summary only (useful for scripting).
    Forecast(DashboardArgs),
    /// Print the data preview and ingest diagnostics only.
    Preview(DashboardArgs),
    /// Launch the interactive TUI.
    ///
    /// This uses the same underlying pass as `sdash dashboard`, but renders
    /// results in a terminal UI using Ratatui.
    Tui(DashboardArgs),
}

/// Options shared by every subcommand.
#[derive(Debug, Parser, Clone)]
pub struct DashboardArgs {
    /// Sales CSV to load. Without it (and without `--demo`) a picker lists CSVs
    /// under the current directory.
    #[arg(short = 'f', long, value_name = "CSV")]
    pub file: Option<PathBuf>,

    /// Use seeded synthetic transactions instead of a file.
    #[arg(long, conflicts_with = "file")]
    pub demo: bool,

    /// Months of demo data.
    #[arg(long, default_value_t = sample::DEFAULT_MONTHS)]
    pub demo_months: usize,

    /// Demo transactions per month.
    #[arg(long, default_value_t = sample::DEFAULT_ROWS_PER_MONTH)]
    pub demo_rows: usize,

    /// Random seed for the demo data.
    #[arg(long, default_value_t = sample::DEFAULT_SEED)]
    pub seed: u64,

    /// Column-name conventions of the dataset.
    #[arg(long, value_enum, env = "SDASH_PROFILE", default_value_t = Profile::Zara)]
    pub profile: Profile,

    /// Field delimiter (`auto` sniffs the header line).
    #[arg(long, value_enum, default_value_t = Delimiter::Auto)]
    pub delimiter: Delimiter,

    /// Date column for the monthly trend (overrides the profile).
    #[arg(long = "date-col", env = "SDASH_DATE_COL")]
    pub date_col: Option<String>,

    /// Metric column for the monthly trend (overrides the profile).
    #[arg(long = "value-col", env = "SDASH_VALUE_COL")]
    pub value_col: Option<String>,

    /// Rows shown in the data preview.
    #[arg(long, default_value_t = 5)]
    pub rows: usize,

    /// Categories shown in top-N bar charts.
    #[arg(long, default_value_t = 10)]
    pub top: usize,

    /// Histogram bins.
    #[arg(long, default_value_t = 20)]
    pub bins: usize,

    /// Skip the terminal charts.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 72)]
    pub width: usize,

    /// Line chart height (rows).
    #[arg(long, default_value_t = 16)]
    pub height: usize,

    /// Export the fitted monthly series and forecast to CSV.
    #[arg(long = "export-forecast", value_name = "CSV")]
    pub export_forecast: Option<PathBuf>,

    /// Export the forecast report to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,

    /// Write log lines to this file (the TUI otherwise runs with logging off).
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}
