//! Shared "dashboard pass" logic used by both CLI and TUI front-ends.
//!
//! One pass is: ingest -> render context -> monthly series -> trend fit ->
//! charts. The CLI and the TUI only differ in how they present a
//! `DashboardRun`; neither keeps anything from one pass to the next.

use tracing::{debug, info};

use crate::app::context::RenderContext;
use crate::charts::{build_dashboard, Chart};
use crate::data::{monthly_observations, MonthlySeries};
use crate::domain::{DashboardConfig, ForecastReport, PeriodValue, TrendFit, YearMonth};
use crate::error::{AppError, ForecastError};
use crate::io::ingest::{load_dataset, IngestedData};

/// Projected value for the month after the last observed one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NextPeriod {
    pub period: YearMonth,
    pub value: f64,
}

/// All computed outputs of a single pass.
#[derive(Debug, Clone)]
pub struct DashboardRun {
    pub ingest: IngestedData,
    pub charts: Vec<Chart>,
    /// `None` when the trend columns are absent.
    pub series: Option<MonthlySeries>,
    pub fit: Option<TrendFit>,
    pub next: Option<NextPeriod>,
    /// Why no forecast was produced, in user-facing words.
    pub forecast_warning: Option<String>,
    pub forecast_error: Option<ForecastError>,
    /// Skipped charts, missing optional columns, forecast problems.
    pub warnings: Vec<String>,
}

impl DashboardRun {
    /// The forecast, or the reason there is none as an `AppError` (exit 3).
    pub fn require_forecast(&self) -> Result<(&TrendFit, NextPeriod), AppError> {
        if let Some(err) = &self.forecast_error {
            return Err(err.clone().into());
        }
        match (&self.fit, self.next) {
            (Some(fit), Some(next)) => Ok((fit, next)),
            _ => Err(AppError::new(
                3,
                self.forecast_warning
                    .clone()
                    .unwrap_or_else(|| "No forecast available for this dataset.".to_string()),
            )),
        }
    }
}

/// Execute a full pass for `config`.
pub fn run_dashboard(config: &DashboardConfig) -> Result<DashboardRun, AppError> {
    let ingest = load_dataset(config)?;
    Ok(run_with_ingest(config, ingest))
}

/// Execute a pass on already-ingested data.
pub fn run_with_ingest(config: &DashboardConfig, ingest: IngestedData) -> DashboardRun {
    let mut ctx = RenderContext::new(&ingest, config);

    for m in &ctx.dataset().missing {
        ctx.warn(format!("Optional column {m} not found in the header."));
    }
    let errors = ctx.dataset().row_errors.len();
    if errors > 0 {
        ctx.warn(format!("{errors} cell(s) could not be parsed and were left empty."));
    }

    let series = monthly_series(&mut ctx);

    let mut forecast_error = None;
    let mut forecast_warning = None;
    let fit = match &series {
        Some(series) => match crate::forecast::fit(&series.observations) {
            Ok(fit) => Some(fit),
            Err(err) => {
                let message = format!("Forecast unavailable: {err}.");
                ctx.warn(message.clone());
                forecast_warning = Some(message);
                forecast_error = Some(err);
                None
            }
        },
        None => {
            let trend = &ingest.trend;
            let message = format!(
                "Forecast skipped: trend columns `{}`/`{}` not found.",
                trend.date_column, trend.value_column
            );
            ctx.warn(message.clone());
            forecast_warning = Some(message);
            None
        }
    };

    let next = match (&series, &fit) {
        (Some(series), Some(fit)) => series.next_period().map(|period| NextPeriod {
            period,
            value: fit.next_period_forecast(),
        }),
        _ => None,
    };
    if let Some(next) = next {
        info!(period = %next.period, value = next.value, "next-period forecast");
    }

    let charts = build_dashboard(&mut ctx, series.as_ref(), fit.as_ref());
    debug!(charts = charts.len(), warnings = ctx.warnings().len(), "dashboard built");
    let warnings = ctx.into_warnings();

    DashboardRun {
        ingest,
        charts,
        series,
        fit,
        next,
        forecast_warning,
        forecast_error,
        warnings,
    }
}

/// Monthly totals of the trend metric, when both trend columns resolved.
fn monthly_series(ctx: &mut RenderContext<'_>) -> Option<MonthlySeries> {
    let ingest = ctx.ingest;
    let trend = &ingest.trend;
    let dates = ctx.dataset().dates(&trend.date_column)?;
    let values = ctx.dataset().numeric(&trend.value_column)?;

    let series = monthly_observations(dates, values);
    if series.dropped_rows > 0 {
        ctx.warn(format!(
            "{} row(s) without a usable `{}` or `{}` were left out of the monthly trend.",
            series.dropped_rows, trend.date_column, trend.value_column
        ));
    }
    Some(series)
}

/// Portable forecast summary for JSON export.
pub fn forecast_report(run: &DashboardRun) -> Result<ForecastReport, AppError> {
    let (fit, next) = run.require_forecast()?;
    let series = run
        .series
        .as_ref()
        .ok_or_else(|| AppError::new(4, "Forecast exists without a monthly series."))?;

    let periods = series
        .periods
        .iter()
        .zip(series.observations.iter())
        .zip(fit.fitted.iter())
        .map(|((period, obs), fitted)| PeriodValue {
            period: *period,
            period_index: obs.period_index,
            value: obs.value,
            fitted: *fitted,
        })
        .collect();

    Ok(ForecastReport {
        tool: "sdash".to_string(),
        source: run.ingest.source.clone(),
        profile: run.ingest.profile,
        date_column: run.ingest.trend.date_column.clone(),
        value_column: run.ingest.trend.value_column.clone(),
        periods,
        slope: fit.slope,
        intercept: fit.intercept,
        mae: fit.mae,
        rmse: fit.rmse,
        r_squared: fit.r_squared,
        next_period: next.period,
        next_value: next.value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Delimiter, InputSource, Profile};
    use crate::io::ingest::parse_csv_text;

    fn run_text(profile: Profile, text: &str) -> DashboardRun {
        let config = DashboardConfig {
            profile,
            ..DashboardConfig::with_input(InputSource::File("inline.csv".into()))
        };
        let trend = profile.trend_source(None, None);
        let dataset = parse_csv_text(text, Delimiter::Auto, &profile.schema(&trend)).unwrap();
        let ingest = IngestedData {
            dataset,
            source: "inline".into(),
            profile,
            trend,
        };
        run_with_ingest(&config, ingest)
    }

    #[test]
    fn monthly_pass_forecasts_next_month() {
        let run = run_text(Profile::Monthly, "month,value\n2024-01,10\n2024-02,20\n2024-03,30\n");
        let next = run.next.unwrap();
        assert_eq!(next.period.to_string(), "2024-04");
        assert!((next.value - 40.0).abs() < 1e-9);
        assert!(run.forecast_warning.is_none());

        let report = forecast_report(&run).unwrap();
        assert_eq!(report.periods.len(), 3);
        assert_eq!(report.value_column, "value");
        assert!((report.r_squared - 1.0).abs() < 1e-12);
    }

    #[test]
    fn single_month_downgrades_to_warning() {
        let run = run_text(Profile::Monthly, "month,value\n2024-01,10\n2024-01,5\n");
        assert!(run.fit.is_none());
        assert!(run.forecast_warning.as_deref().unwrap().contains("Insufficient data"));
        assert!(run.warnings.iter().any(|w| w.contains("Insufficient data")));
        assert_eq!(run.require_forecast().unwrap_err().exit_code(), 3);
        // The monthly line is still drawn without a trend.
        assert!(run.charts.iter().any(|c| c.title == "Monthly value"));
    }

    #[test]
    fn zara_without_dates_skips_forecast() {
        let run = run_text(Profile::Zara, "Product Category;price\nJACKETS;10\nSHOES;20\n");
        assert!(run.series.is_none());
        assert!(run.forecast_warning.as_deref().unwrap().contains("scraped_at"));
        assert!(run.forecast_error.is_none());
        assert!(forecast_report(&run).is_err());
    }
}
