//! Declarative column schema.
//!
//! Every dataset profile is described once as a list of `ColumnSpec`s (name,
//! semantic role, required or optional, aliases). Ingest resolves the whole
//! schema against the CSV header in one step and produces either resolved
//! column indices or a list of missing-column diagnostics. Downstream code asks
//! the typed dataset for a column by name instead of probing headers itself.

use std::collections::HashMap;
use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Semantic role of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnRole {
    Category,
    Numeric,
    Date,
}

impl ColumnRole {
    pub fn label(self) -> &'static str {
        match self {
            ColumnRole::Category => "category",
            ColumnRole::Numeric => "numeric",
            ColumnRole::Date => "date",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    /// Canonical name; also the key the dataset stores the column under.
    pub name: String,
    pub role: ColumnRole,
    pub required: bool,
    pub aliases: Vec<String>,
}

impl ColumnSpec {
    pub fn required(name: &str, role: ColumnRole) -> Self {
        Self {
            name: name.to_string(),
            role,
            required: true,
            aliases: Vec::new(),
        }
    }

    pub fn optional(name: &str, role: ColumnRole) -> Self {
        Self {
            required: false,
            ..Self::required(name, role)
        }
    }

    pub fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases = aliases.iter().map(|a| a.to_string()).collect();
        self
    }

    fn matches(&self, normalized: &str) -> bool {
        normalize_column_name(&self.name) == normalized
            || self
                .aliases
                .iter()
                .any(|a| normalize_column_name(a) == normalized)
    }
}

/// Normalize a header or schema name for comparison.
///
/// Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
/// first header. Case is ignored and `_`, `-` and runs of whitespace are all
/// treated as a single space, so `Sales Volume` matches `sales_volume`.
pub fn normalize_column_name(name: &str) -> String {
    let name = name.trim().trim_start_matches('\u{feff}').trim();
    name.split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedColumn {
    pub name: String,
    pub role: ColumnRole,
    /// Index of the column in the CSV record.
    pub index: usize,
}

/// A schema column that has no match in the CSV header.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDiagnostic {
    pub name: String,
    pub role: ColumnRole,
    pub required: bool,
}

impl fmt::Display for ColumnDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` ({})", self.name, self.role.label())
    }
}

#[derive(Debug, Clone, Default)]
pub struct SchemaResolution {
    pub resolved: Vec<ResolvedColumn>,
    pub missing: Vec<ColumnDiagnostic>,
}

impl SchemaResolution {
    pub fn missing_required(&self) -> Vec<&ColumnDiagnostic> {
        self.missing.iter().filter(|m| m.required).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    pub columns: Vec<ColumnSpec>,
}

impl Schema {
    /// Add a column, merging with an existing spec of the same name.
    ///
    /// A merged column is required if either side requires it.
    pub fn insert(&mut self, spec: ColumnSpec) {
        let wanted = normalize_column_name(&spec.name);
        if let Some(existing) = self
            .columns
            .iter_mut()
            .find(|c| normalize_column_name(&c.name) == wanted)
        {
            existing.required |= spec.required;
            existing.role = spec.role;
            for alias in spec.aliases {
                if !existing.aliases.contains(&alias) {
                    existing.aliases.push(alias);
                }
            }
            return;
        }
        self.columns.push(spec);
    }

    /// Resolve every column against a normalized header map.
    pub fn resolve(&self, header_map: &HashMap<String, usize>) -> SchemaResolution {
        let mut out = SchemaResolution::default();
        for spec in &self.columns {
            let index = header_map
                .iter()
                .filter(|(header, _)| spec.matches(header))
                .map(|(_, &idx)| idx)
                .min();
            match index {
                Some(index) => out.resolved.push(ResolvedColumn {
                    name: spec.name.clone(),
                    role: spec.role,
                    index,
                }),
                None => out.missing.push(ColumnDiagnostic {
                    name: spec.name.clone(),
                    role: spec.role,
                    required: spec.required,
                }),
            }
        }
        out
    }
}

/// Which date/metric columns feed the monthly trend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendSource {
    pub date_column: String,
    pub value_column: String,
}

/// Named column-name conventions for the supported dataset layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Fashion retail export (`;`-separated): category, promotion, section,
    /// position, price, sales volume.
    Zara,
    /// Transaction log with Indonesian column names (`tanggal`, `pendapatan`)
    /// or their English equivalents.
    Revenue,
    /// Pre-aggregated `month`/`value` rows.
    Monthly,
}

impl Profile {
    pub fn display_name(self) -> &'static str {
        match self {
            Profile::Zara => "zara",
            Profile::Revenue => "revenue",
            Profile::Monthly => "monthly",
        }
    }

    /// Whether a missing trend column fails ingest (vs. skipping the forecast).
    pub fn trend_required(self) -> bool {
        !matches!(self, Profile::Zara)
    }

    /// Trend columns for this profile, with optional per-run overrides.
    pub fn trend_source(self, date_override: Option<&str>, value_override: Option<&str>) -> TrendSource {
        let (date, value) = self.default_trend_columns();
        TrendSource {
            date_column: date_override.map(str::to_string).unwrap_or(date.name),
            value_column: value_override.map(str::to_string).unwrap_or(value.name),
        }
    }

    /// The full schema: chart columns plus the trend columns.
    ///
    /// An overridden trend column replaces the default one (aliases included),
    /// so a renamed metric does not leave the default name required.
    pub fn schema(self, trend: &TrendSource) -> Schema {
        let mut schema = Schema {
            columns: self.chart_columns(),
        };
        let (date, value) = self.default_trend_columns();
        let required = self.trend_required();

        for (default, wanted) in [(date, &trend.date_column), (value, &trend.value_column)] {
            let spec = if normalize_column_name(&default.name) == normalize_column_name(wanted) {
                default
            } else {
                ColumnSpec::optional(wanted, default.role)
            };
            schema.insert(ColumnSpec { required, ..spec });
        }
        schema
    }

    fn chart_columns(self) -> Vec<ColumnSpec> {
        use ColumnRole::*;
        match self {
            Profile::Zara => vec![
                ColumnSpec::optional("Product Category", Category).with_aliases(&["category"]),
                ColumnSpec::optional("Promotion", Category),
                ColumnSpec::optional("section", Category),
                ColumnSpec::optional("Product Position", Category).with_aliases(&["position"]),
                ColumnSpec::optional("price", Numeric),
                ColumnSpec::optional("Sales Volume", Numeric),
            ],
            Profile::Revenue => vec![
                ColumnSpec::optional("kategori", Category).with_aliases(&["category", "product category"]),
                ColumnSpec::optional("jumlah", Numeric).with_aliases(&["quantity", "qty"]),
                ColumnSpec::optional("harga", Numeric).with_aliases(&["price"]),
            ],
            Profile::Monthly => Vec::new(),
        }
    }

    fn default_trend_columns(self) -> (ColumnSpec, ColumnSpec) {
        use ColumnRole::*;
        match self {
            Profile::Zara => (
                ColumnSpec::optional("scraped_at", Date).with_aliases(&["date", "order date"]),
                ColumnSpec::optional("Sales Volume", Numeric),
            ),
            Profile::Revenue => (
                ColumnSpec::required("tanggal", Date)
                    .with_aliases(&["date", "order date", "tanggal transaksi"]),
                ColumnSpec::required("pendapatan", Numeric)
                    .with_aliases(&["revenue", "total", "sales", "total penjualan"]),
            ),
            Profile::Monthly => (
                ColumnSpec::required("month", Date).with_aliases(&["bulan", "period"]),
                ColumnSpec::required("value", Numeric)
                    .with_aliases(&["revenue", "pendapatan", "sales"]),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column<'a>(schema: &'a Schema, name: &str) -> Option<&'a ColumnSpec> {
        let wanted = normalize_column_name(name);
        schema.columns.iter().find(|c| normalize_column_name(&c.name) == wanted)
    }

    fn header_map(names: &[&str]) -> HashMap<String, usize> {
        names
            .iter()
            .enumerate()
            .map(|(i, n)| (normalize_column_name(n), i))
            .collect()
    }

    #[test]
    fn normalize_handles_bom_case_and_separators() {
        assert_eq!(normalize_column_name("\u{feff}Sales_Volume "), "sales volume");
        assert_eq!(normalize_column_name("Product   Category"), "product category");
    }

    #[test]
    fn revenue_profile_resolves_english_aliases() {
        let trend = Profile::Revenue.trend_source(None, None);
        let schema = Profile::Revenue.schema(&trend);
        let res = schema.resolve(&header_map(&["Date", "Revenue", "Category"]));

        assert!(res.missing_required().is_empty());
        let date = res.resolved.iter().find(|c| c.name == "tanggal").unwrap();
        assert_eq!(date.index, 0);
        let missing: Vec<_> = res.missing.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(missing, vec!["jumlah", "harga"]);
    }

    #[test]
    fn zara_trend_value_is_merged_with_chart_column() {
        let trend = Profile::Zara.trend_source(None, None);
        let schema = Profile::Zara.schema(&trend);
        let n = schema
            .columns
            .iter()
            .filter(|c| normalize_column_name(&c.name) == "sales volume")
            .count();
        assert_eq!(n, 1);
        assert!(!column(&schema, "Sales Volume").unwrap().required);
    }

    #[test]
    fn override_replaces_default_trend_column() {
        let trend = Profile::Monthly.trend_source(None, Some("omzet"));
        let schema = Profile::Monthly.schema(&trend);
        assert!(column(&schema, "value").is_none());
        let spec = column(&schema, "omzet").unwrap();
        assert!(spec.required);
        assert_eq!(spec.role, ColumnRole::Numeric);
    }

    #[test]
    fn missing_required_columns_are_reported() {
        let trend = Profile::Monthly.trend_source(None, None);
        let res = Profile::Monthly.schema(&trend).resolve(&header_map(&["bulan"]));
        let missing = res.missing_required();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].to_string(), "`value` (numeric)");
    }
}
