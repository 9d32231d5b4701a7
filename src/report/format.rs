//! Formatted terminal output: run summary, data preview, diagnostics, forecast.
//!
//! We keep formatting code in one place so:
//! - the ingest/charting/fitting code stays clean and testable
//! - output changes are localized

use crate::app::pipeline::DashboardRun;
use crate::domain::DashboardConfig;
use crate::io::ingest::Dataset;

/// Widest a preview column may get before cells are truncated.
const PREVIEW_COL_MAX: usize = 18;
/// Row errors listed individually before the rest are summarized.
const ROW_ERRORS_SHOWN: usize = 10;

/// Format the run header (input, profile, row counts, trend columns).
pub fn format_run_summary(run: &DashboardRun, config: &DashboardConfig) -> String {
    let ds = &run.ingest.dataset;
    let mut out = String::new();

    out.push_str("=== sdash - Retail Sales Dashboard ===\n");
    out.push_str(&format!("Source: {}\n", run.ingest.source));
    out.push_str(&format!(
        "Profile: {} | delimiter: {}\n",
        run.ingest.profile.display_name(),
        ds.delimiter.display_name()
    ));
    out.push_str(&format!(
        "Rows: {} read, {} kept | columns: {}\n",
        ds.rows_read,
        ds.len(),
        ds.headers.len()
    ));
    out.push_str(&format!(
        "Trend: `{}` by month of `{}`\n",
        run.ingest.trend.value_column, run.ingest.trend.date_column
    ));
    if let Some(series) = &run.series {
        if let (Some(first), Some(last)) = (series.periods.first(), series.last_period()) {
            out.push_str(&format!("Months: {} ({first} .. {last})\n", series.len()));
        }
    }
    out.push_str(&format!("Charts: {} (top {}, {} bins)\n", run.charts.len(), config.top_n, config.bins));

    out
}

/// Format the first `rows` rows of the raw data as a table.
pub fn format_preview(ds: &Dataset, rows: usize) -> String {
    let shown: Vec<&Vec<String>> = ds.rows.iter().take(rows).collect();

    let widths: Vec<usize> = ds
        .headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            shown
                .iter()
                .filter_map(|r| r.get(i))
                .map(|c| c.chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0)
                .min(PREVIEW_COL_MAX)
        })
        .collect();

    let line = |cells: Vec<String>| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(widths.iter())
            .map(|(c, w)| format!("{:<w$}", truncate(c, *w), w = *w))
            .collect();
        let mut s = padded.join(" | ").trim_end().to_string();
        s.push('\n');
        s
    };

    let mut out = format!("Preview ({} of {} rows):\n", shown.len(), ds.len());
    out.push_str(&line(ds.headers.clone()));
    out.push_str(&line(widths.iter().map(|w| "-".repeat(*w)).collect()));
    for row in shown {
        let cells = (0..widths.len())
            .map(|i| row.get(i).cloned().unwrap_or_default())
            .collect();
        out.push_str(&line(cells));
    }
    out
}

/// Missing optional columns and unparsable cells.
pub fn format_diagnostics(ds: &Dataset) -> String {
    let mut out = String::new();

    if ds.missing.is_empty() && ds.row_errors.is_empty() {
        out.push_str("Diagnostics: all profile columns found, no unparsable cells.\n");
        return out;
    }

    if !ds.missing.is_empty() {
        let names: Vec<String> = ds.missing.iter().map(|m| m.to_string()).collect();
        out.push_str(&format!("Missing optional columns: {}\n", names.join(", ")));
    }

    if !ds.row_errors.is_empty() {
        out.push_str(&format!("Unparsable cells: {}\n", ds.row_errors.len()));
        for e in ds.row_errors.iter().take(ROW_ERRORS_SHOWN) {
            match &e.column {
                Some(col) => out.push_str(&format!("  line {} [{col}]: {}\n", e.line, e.message)),
                None => out.push_str(&format!("  line {}: {}\n", e.line, e.message)),
            }
        }
        if ds.row_errors.len() > ROW_ERRORS_SHOWN {
            out.push_str(&format!("  ... and {} more\n", ds.row_errors.len() - ROW_ERRORS_SHOWN));
        }
    }

    out
}

pub fn format_warnings(warnings: &[String]) -> String {
    if warnings.is_empty() {
        return String::new();
    }
    let mut out = String::from("Warnings:\n");
    for w in warnings {
        out.push_str(&format!("- {w}\n"));
    }
    out
}

/// Next-period projection plus fit quality, or why there is none.
pub fn format_forecast(run: &DashboardRun) -> String {
    let mut out = String::from("Forecast:\n");

    match (&run.fit, run.next) {
        (Some(fit), Some(next)) => {
            out.push_str(&format!(
                "- next period {}: {}\n",
                next.period,
                fmt_value(next.value)
            ));
            out.push_str(&format!(
                "- trend: {} per month (intercept {})\n",
                fmt_value(fit.slope),
                fmt_value(fit.intercept)
            ));
            out.push_str(&format!(
                "- MAE={} RMSE={} R²={:.4}\n",
                fmt_value(fit.mae),
                fmt_value(fit.rmse),
                fit.r_squared
            ));
            out.push_str(&format!("- fitted on {} month(s)\n", fit.fitted.len()));
        }
        _ => {
            let reason = run
                .forecast_warning
                .as_deref()
                .unwrap_or("Forecast unavailable.");
            out.push_str(&format!("- {reason}\n"));
        }
    }

    out
}

/// Two decimals with `,` thousands grouping.
pub fn fmt_value(v: f64) -> String {
    if !v.is_finite() {
        return v.to_string();
    }
    let raw = format!("{:.2}", v.abs());
    let (int, frac) = raw.split_once('.').unwrap_or((raw.as_str(), "00"));

    let mut grouped = String::new();
    for (i, ch) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if v < 0.0 && raw != "0.00" { "-" } else { "" };
    format!("{sign}{grouped}.{frac}")
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Delimiter, Profile};
    use crate::io::ingest::parse_csv_text;

    fn monthly(text: &str) -> Dataset {
        let trend = Profile::Monthly.trend_source(None, None);
        parse_csv_text(text, Delimiter::Auto, &Profile::Monthly.schema(&trend)).unwrap()
    }

    #[test]
    fn truncate_marks_cut_cells() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Front of Store", 8), "Front o.");
        assert_eq!(truncate("Front of Store", 8).chars().count(), 8);
    }

    #[test]
    fn fmt_value_groups_thousands() {
        assert_eq!(fmt_value(1234567.891), "1,234,567.89");
        assert_eq!(fmt_value(-1500.0), "-1,500.00");
        assert_eq!(fmt_value(12.5), "12.50");
        assert_eq!(fmt_value(-0.001), "0.00");
    }

    #[test]
    fn preview_shows_requested_rows_only() {
        let ds = monthly("month,value\n2024-01,10\n2024-02,20\n2024-03,30\n");
        let out = format_preview(&ds, 2);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Preview (2 of 3 rows):");
        assert_eq!(lines[1], "month   | value");
        assert_eq!(lines[2], "------- | -----");
        assert_eq!(lines[3], "2024-01 | 10");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn diagnostics_list_row_errors_with_lines() {
        let ds = monthly("month,value\n2024-01,x\n");
        let out = format_diagnostics(&ds);
        assert!(out.contains("Unparsable cells: 1"));
        assert!(out.contains("line 2 [value]: Invalid number 'x'"));
    }
}
