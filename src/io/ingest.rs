//! CSV ingest and schema validation.
//!
//! This module turns an uploaded sales CSV into a typed `Dataset`:
//!
//! - **Delimiter**: `,` or `;` (sniffed from the header line unless forced)
//! - **Schema**: resolved once against the header; missing required columns
//!   fail the pass with exit code 2, missing optional columns are recorded as
//!   diagnostics and surface later as warnings + skipped charts
//! - **Row-level validation**: unparsable cells become `None` and are reported
//!   with their line number, the row itself is kept for the preview
//! - **Separation of concerns**: no charting or fitting logic here

use std::collections::HashMap;

use chrono::NaiveDate;
use clap::ValueEnum;
use csv::StringRecord;
use tracing::{debug, info};

use crate::domain::{
    normalize_column_name, ColumnDiagnostic, ColumnRole, DashboardConfig, Delimiter, InputSource, Profile,
    ResolvedColumn, Schema, TrendSource,
};
use crate::error::AppError;

/// Appended to every user-facing parse failure.
pub const FORMAT_HINT: &str =
    "Expected a comma- or semicolon-separated CSV with a header row and the columns of the selected profile.";

/// A row-level problem encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub column: Option<String>,
    pub message: String,
}

/// Typed values of one schema column, one entry per data row.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Category(Vec<Option<String>>),
    Numeric(Vec<Option<f64>>),
    Date(Vec<Option<NaiveDate>>),
}

/// A parsed upload: raw cells for the preview plus typed schema columns.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Delimiter actually used (never `Auto`).
    pub delimiter: Delimiter,
    /// Records read, including ones rejected by the CSV reader.
    pub rows_read: usize,
    /// Optional schema columns with no match in the header.
    pub missing: Vec<ColumnDiagnostic>,
    pub row_errors: Vec<RowError>,
    columns: Vec<(String, Column)>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        let wanted = normalize_column_name(name);
        self.columns
            .iter()
            .find(|(n, _)| normalize_column_name(n) == wanted)
            .map(|(_, c)| c)
    }

    pub fn category(&self, name: &str) -> Option<&[Option<String>]> {
        match self.column(name)? {
            Column::Category(v) => Some(v),
            _ => None,
        }
    }

    pub fn numeric(&self, name: &str) -> Option<&[Option<f64>]> {
        match self.column(name)? {
            Column::Numeric(v) => Some(v),
            _ => None,
        }
    }

    pub fn dates(&self, name: &str) -> Option<&[Option<NaiveDate>]> {
        match self.column(name)? {
            Column::Date(v) => Some(v),
            _ => None,
        }
    }

    /// All resolved numeric columns, in schema order.
    pub fn numeric_columns(&self) -> Vec<(&str, &[Option<f64>])> {
        self.columns
            .iter()
            .filter_map(|(name, col)| match col {
                Column::Numeric(v) => Some((name.as_str(), v.as_slice())),
                _ => None,
            })
            .collect()
    }
}

/// Ingest output: dataset + the conventions it was read with.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub dataset: Dataset,
    /// Human-readable origin (file path or demo seed).
    pub source: String,
    pub profile: Profile,
    pub trend: TrendSource,
}

/// Read the configured input and validate it against the profile schema.
pub fn load_dataset(config: &DashboardConfig) -> Result<IngestedData, AppError> {
    let text = match &config.input {
        InputSource::File(path) => {
            let bytes = std::fs::read(path).map_err(|e| {
                AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display()))
            })?;
            String::from_utf8_lossy(&bytes).into_owned()
        }
        InputSource::Demo {
            months,
            rows_per_month,
            seed,
        } => crate::data::sample::demo_csv(*months, *rows_per_month, *seed)?,
    };

    let trend = config
        .profile
        .trend_source(config.date_column.as_deref(), config.value_column.as_deref());
    let schema = config.profile.schema(&trend);
    let dataset = parse_csv_text(&text, config.delimiter, &schema)?;

    info!(
        source = %config.input.label(),
        rows = dataset.len(),
        delimiter = dataset.delimiter.display_name(),
        "loaded dataset"
    );

    Ok(IngestedData {
        dataset,
        source: config.input.label(),
        profile: config.profile,
        trend,
    })
}

/// Parse CSV text against a schema.
pub fn parse_csv_text(text: &str, delimiter: Delimiter, schema: &Schema) -> Result<Dataset, AppError> {
    if text.trim().is_empty() {
        return Err(AppError::new(2, format!("The CSV file is empty. {FORMAT_HINT}")));
    }

    let delimiter = match delimiter {
        Delimiter::Auto => sniff_delimiter(text),
        forced => forced,
    };
    let delim_byte = delimiter.byte().unwrap_or(b',');
    debug!(delimiter = delimiter.display_name(), "reading CSV");

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delim_byte)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let header_record = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}. {FORMAT_HINT}")))?
        .clone();
    let headers: Vec<String> = header_record
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let header_map = build_header_map(&header_record);
    let resolution = schema.resolve(&header_map);

    let missing_required = resolution.missing_required();
    if !missing_required.is_empty() {
        let names: Vec<String> = missing_required.iter().map(|m| m.to_string()).collect();
        let mut message = format!("Missing required column(s): {}.", names.join(", "));
        if let Some(other) = other_delimiter_hint(&headers, delimiter) {
            let flag = other
                .to_possible_value()
                .map(|v| v.get_name().to_string())
                .unwrap_or_default();
            message.push_str(&format!(
                " The header has a single column; the file looks {}-separated (try `--delimiter {flag}`).",
                other.display_name(),
            ));
        }
        message.push(' ');
        message.push_str(FORMAT_HINT);
        return Err(AppError::new(2, message));
    }

    for m in &resolution.missing {
        debug!(column = %m.name, role = m.role.label(), "optional column not found");
    }

    let mut columns: Vec<(String, Column)> = resolution
        .resolved
        .iter()
        .map(|c| (c.name.clone(), empty_column(c.role)))
        .collect();

    let mut rows = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2 because:
        // - records() starts at line 1 after headers
        // - CSV is 1-based line numbers
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    column: None,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        for (resolved, (_, column)) in resolution.resolved.iter().zip(columns.iter_mut()) {
            if let Err(message) = push_cell(column, &record, resolved, delim_byte) {
                row_errors.push(RowError {
                    line,
                    column: Some(resolved.name.clone()),
                    message,
                });
            }
        }
        rows.push(record.iter().map(str::to_string).collect());
    }

    if rows.is_empty() {
        return Err(AppError::new(
            2,
            format!("The CSV has a header but no readable data rows. {FORMAT_HINT}"),
        ));
    }
    if !row_errors.is_empty() {
        debug!(count = row_errors.len(), "rows with unparsable cells");
    }

    Ok(Dataset {
        headers,
        rows,
        delimiter,
        rows_read,
        missing: resolution.missing,
        row_errors,
        columns,
    })
}

/// Pick `;` when it occurs more often than `,` in the header line.
pub fn sniff_delimiter(text: &str) -> Delimiter {
    let header = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    let semicolons = header.matches(';').count();
    let commas = header.matches(',').count();
    if semicolons > commas {
        Delimiter::Semicolon
    } else {
        Delimiter::Comma
    }
}

fn other_delimiter_hint(headers: &[String], used: Delimiter) -> Option<Delimiter> {
    let [only] = headers else { return None };
    match used {
        Delimiter::Comma if only.contains(';') => Some(Delimiter::Semicolon),
        Delimiter::Semicolon if only.contains(',') => Some(Delimiter::Comma),
        _ => None,
    }
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (idx, name) in headers.iter().enumerate() {
        // First occurrence wins for duplicated headers.
        map.entry(normalize_column_name(name)).or_insert(idx);
    }
    map
}

fn empty_column(role: ColumnRole) -> Column {
    match role {
        ColumnRole::Category => Column::Category(Vec::new()),
        ColumnRole::Numeric => Column::Numeric(Vec::new()),
        ColumnRole::Date => Column::Date(Vec::new()),
    }
}

/// Append one cell to a typed column. The column always grows by one entry so
/// typed columns stay aligned with `Dataset::rows`.
fn push_cell(column: &mut Column, record: &StringRecord, resolved: &ResolvedColumn, delimiter: u8) -> Result<(), String> {
    let cell = record.get(resolved.index).map(str::trim).filter(|s| !s.is_empty());

    match column {
        Column::Category(values) => {
            values.push(cell.map(str::to_string));
            Ok(())
        }
        Column::Numeric(values) => {
            let parsed = cell.map(|s| parse_number(s, delimiter).ok_or(s));
            match parsed {
                Some(Ok(v)) => {
                    values.push(Some(v));
                    Ok(())
                }
                Some(Err(raw)) => {
                    values.push(None);
                    Err(format!("Invalid number '{raw}' in `{}`.", resolved.name))
                }
                None => {
                    values.push(None);
                    Ok(())
                }
            }
        }
        Column::Date(values) => match cell {
            Some(s) => match parse_date(s) {
                Ok(d) => {
                    values.push(Some(d));
                    Ok(())
                }
                Err(e) => {
                    values.push(None);
                    Err(e)
                }
            },
            None => {
                values.push(None);
                Ok(())
            }
        },
    }
}

/// Parse a numeric cell.
///
/// Accepts plain numbers, `,` thousands separators (`1,234.5`, `1,234,567`), and a
/// single decimal comma (`1234,5`, `1.234,50`) when the file itself is
/// `;`-separated. Anything else with mixed separators is rejected.
pub fn parse_number(s: &str, delimiter: u8) -> Option<f64> {
    let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    let commas = compact.matches(',').count();
    let last_comma = compact.rfind(',');
    let last_dot = compact.rfind('.');

    let normalized = match (last_comma, last_dot) {
        (None, _) => compact,
        // Decimal comma after `.` thousands groups.
        (Some(c), Some(d)) if c > d => {
            if delimiter != b';' || commas > 1 {
                return None;
            }
            compact.replace('.', "").replace(',', ".")
        }
        (Some(_), Some(_)) => compact.replace(',', ""),
        (Some(_), None) if commas > 1 || delimiter != b';' => compact.replace(',', ""),
        (Some(_), None) => compact.replace(',', "."),
    };

    let v = normalized.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

/// Parse a date cell.
///
/// We recommend ISO dates (`YYYY-MM-DD`), but sales exports often use
/// `DD/MM/YYYY`, carry a time component, or (for pre-aggregated data) only name
/// the month. Month-only values map to the first day of the month.
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    const FMTS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];
    let s = s.trim();

    let date_part = s.split([' ', 'T']).next().unwrap_or(s);
    for candidate in [s, date_part] {
        for fmt in FMTS {
            if let Ok(d) = NaiveDate::parse_from_str(candidate, fmt) {
                return Ok(d);
            }
        }
    }

    // Month-only forms: `2024-03`, `2024/03`, `Mar 2024`, `March 2024`.
    for (candidate, fmt) in [
        (format!("{s}-01"), "%Y-%m-%d"),
        (format!("{s}/01"), "%Y/%m/%d"),
        (format!("1 {s}"), "%d %B %Y"),
    ] {
        if let Ok(d) = NaiveDate::parse_from_str(&candidate, fmt) {
            return Ok(d);
        }
    }

    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, DD/MM/YYYY, DD-MM-YYYY, YYYY/MM/DD, YYYY-MM, Mon YYYY."
    ))
}
