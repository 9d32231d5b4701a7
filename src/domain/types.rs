//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during a dashboard pass
//! - exported to JSON/CSV
//! - shown by both the plain-text report and the TUI

use std::fmt;
use std::path::PathBuf;

use chrono::{Datelike, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::domain::Profile;

/// One aggregated period of the metric being forecast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Zero-based ordinal of the period within the series.
    pub period_index: u32,
    pub value: f64,
}

impl Observation {
    pub fn new(period_index: u32, value: f64) -> Self {
        Self { period_index, value }
    }
}

/// Ordinary-least-squares trend line plus goodness-of-fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendFit {
    pub slope: f64,
    pub intercept: f64,
    /// Period indices the line was fitted on (same order as `fitted`).
    pub period_indices: Vec<u32>,
    /// Fitted value for every input period.
    pub fitted: Vec<f64>,
    /// Mean absolute error.
    pub mae: f64,
    /// Root-mean-squared error.
    pub rmse: f64,
    /// Coefficient of determination.
    pub r_squared: f64,
}

impl TrendFit {
    /// The period right after the last fitted one.
    pub fn next_period_index(&self) -> i64 {
        self.period_indices
            .iter()
            .copied()
            .max()
            .map(|p| i64::from(p) + 1)
            .unwrap_or(0)
    }

    /// Projection for [`TrendFit::next_period_index`].
    pub fn next_period_forecast(&self) -> f64 {
        crate::forecast::forecast(self, self.next_period_index())
    }
}

/// A calendar month (the bucket used for trend observations).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    /// 1..=12
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Field delimiter of the uploaded CSV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Delimiter {
    /// Sniff the header line: the more frequent of `;` and `,` wins.
    Auto,
    Comma,
    Semicolon,
}

impl Delimiter {
    pub fn byte(self) -> Option<u8> {
        match self {
            Delimiter::Auto => None,
            Delimiter::Comma => Some(b','),
            Delimiter::Semicolon => Some(b';'),
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Delimiter::Auto => "auto",
            Delimiter::Comma => "','",
            Delimiter::Semicolon => "';'",
        }
    }
}

/// Where the rows of a pass come from.
#[derive(Debug, Clone, PartialEq)]
pub enum InputSource {
    /// A user-supplied CSV file.
    File(PathBuf),
    /// Seeded synthetic transactions (no upload needed).
    Demo {
        months: usize,
        rows_per_month: usize,
        seed: u64,
    },
}

impl InputSource {
    pub fn label(&self) -> String {
        match self {
            InputSource::File(path) => path.display().to_string(),
            InputSource::Demo { seed, .. } => format!("demo (seed {seed})"),
        }
    }
}

/// A full pass's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus `.env` defaults).
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub input: InputSource,
    pub profile: Profile,
    pub delimiter: Delimiter,

    /// Overrides the profile's date column for the trend.
    pub date_column: Option<String>,
    /// Overrides the profile's metric column for the trend.
    pub value_column: Option<String>,

    pub preview_rows: usize,
    pub top_n: usize,
    pub bins: usize,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_forecast: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
}

impl DashboardConfig {
    /// Defaults matching the CLI defaults, for a given input.
    pub fn with_input(input: InputSource) -> Self {
        Self {
            input,
            profile: Profile::Zara,
            delimiter: Delimiter::Auto,
            date_column: None,
            value_column: None,
            preview_rows: 5,
            top_n: 10,
            bins: 20,
            plot: true,
            plot_width: 72,
            plot_height: 16,
            export_forecast: None,
            export_json: None,
        }
    }
}

/// Portable summary of a forecast (JSON export).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastReport {
    pub tool: String,
    pub source: String,
    pub profile: Profile,
    pub date_column: String,
    pub value_column: String,
    pub periods: Vec<PeriodValue>,
    pub slope: f64,
    pub intercept: f64,
    pub mae: f64,
    pub rmse: f64,
    pub r_squared: f64,
    pub next_period: YearMonth,
    pub next_value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodValue {
    pub period: YearMonth,
    pub period_index: u32,
    pub value: f64,
    pub fitted: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_month_rolls_over_december() {
        let dec = YearMonth::new(2024, 12).unwrap();
        assert_eq!(dec.next(), YearMonth::new(2025, 1).unwrap());
        assert_eq!(dec.to_string(), "2024-12");
        assert!(YearMonth::new(2024, 13).is_none());
    }

    #[test]
    fn next_period_index_uses_max_plus_one() {
        let fit = TrendFit {
            slope: 2.0,
            intercept: 1.0,
            period_indices: vec![0, 1, 2, 3],
            fitted: vec![1.0, 3.0, 5.0, 7.0],
            mae: 0.0,
            rmse: 0.0,
            r_squared: 1.0,
        };
        assert_eq!(fit.next_period_index(), 4);
        assert!((fit.next_period_forecast() - 9.0).abs() < 1e-12);
    }
}
