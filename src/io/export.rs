//! Export the monthly trend and its forecast.
//!
//! - CSV: one row per observed month plus a final `forecast` row, easy to
//!   consume in spreadsheets
//! - JSON: the portable `ForecastReport` (schema in `domain::types`)

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::ForecastReport;
use crate::error::AppError;

/// Write the fitted monthly series and next-period projection as CSV.
pub fn write_forecast_csv(path: &Path, report: &ForecastReport) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_forecast_rows(&mut file, report)
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV '{}': {e}", path.display())))
}

fn write_forecast_rows(out: &mut impl Write, report: &ForecastReport) -> std::io::Result<()> {
    writeln!(out, "period,period_index,value,fitted,residual")?;
    for p in &report.periods {
        writeln!(
            out,
            "{},{},{:.4},{:.4},{:.4}",
            p.period,
            p.period_index,
            p.value,
            p.fitted,
            p.value - p.fitted
        )?;
    }

    // Forecast row: no observed value, so no residual either.
    let next_index = report.periods.iter().map(|p| p.period_index + 1).max().unwrap_or(0);
    writeln!(out, "{},{},,{:.4},", report.next_period, next_index, report.next_value)?;
    Ok(())
}

/// Write the forecast report as pretty JSON.
pub fn write_forecast_json(path: &Path, report: &ForecastReport) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create forecast JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, report)
        .map_err(|e| AppError::new(2, format!("Failed to write forecast JSON: {e}")))?;
    Ok(())
}
