//! Canned charts.
//!
//! Chart builders compute chart *data* only (counts, shares, bins, quartiles,
//! correlations, monthly series). Drawing is left to the front-ends:
//! `plot::ascii` for the terminal report and `tui` for the interactive view.
//!
//! Each profile declares its fixed set of charts as a list of `ChartRequest`s;
//! `build_dashboard` walks that list with the pass's `RenderContext`. A chart
//! whose column is missing is skipped with an explicit warning.

use nalgebra::DMatrix;
use serde::Serialize;

use crate::app::context::RenderContext;
use crate::data::MonthlySeries;
use crate::domain::{Profile, TrendFit, TrendSource};

pub mod builders;

pub use builders::*;

#[derive(Debug, Clone)]
pub struct Chart {
    pub title: String,
    pub body: ChartBody,
}

#[derive(Debug, Clone)]
pub enum ChartBody {
    /// Labelled bars (counts or group means), in display order.
    Bars { bars: Vec<(String, f64)>, value_label: String },
    Pie(Vec<Share>),
    Histogram(Histogram),
    Box(BoxSummary),
    Heatmap(CorrelationMatrix),
    Line(LineChart),
}

impl ChartBody {
    pub fn kind_label(&self) -> &'static str {
        match self {
            ChartBody::Bars { .. } => "bar",
            ChartBody::Pie(_) => "pie",
            ChartBody::Histogram(_) => "histogram",
            ChartBody::Box(_) => "box",
            ChartBody::Heatmap(_) => "heatmap",
            ChartBody::Line(_) => "line",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Share {
    pub label: String,
    pub count: usize,
    /// Percentage of all non-empty cells (shares sum to 100).
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    /// `counts.len() + 1` bin edges, ascending.
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxSummary {
    pub n: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    /// Most extreme values still inside the 1.5·IQR fences.
    pub lower_whisker: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    /// Pearson r; NaN where undefined.
    pub values: DMatrix<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    /// Fitted trend per period, when a fit succeeded.
    pub trend: Option<Vec<f64>>,
    /// Label and value of the projected next period.
    pub forecast: Option<(String, f64)>,
}

/// One entry of a profile's canned chart set.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartRequest {
    TopCounts { column: String, title: String },
    Shares { column: String, title: String },
    Histogram { column: String, title: String },
    BoxPlot { column: String, title: String },
    GroupMean { group: String, value: String, title: String },
    Correlation { title: String },
    MonthlyTrend { title: String },
}

/// The fixed chart set for a profile.
pub fn requests_for(profile: Profile, trend: &TrendSource) -> Vec<ChartRequest> {
    use ChartRequest::*;
    let s = |v: &str| v.to_string();
    let value = &trend.value_column;

    match profile {
        Profile::Zara => vec![
            TopCounts { column: s("Product Category"), title: s("Top product categories") },
            Shares { column: s("Promotion"), title: s("Promotion share") },
            TopCounts { column: s("section"), title: s("Buyers by section") },
            Histogram { column: s("price"), title: s("Price distribution") },
            GroupMean {
                group: s("Product Position"),
                value: s("Sales Volume"),
                title: s("Average sales volume by product position"),
            },
            BoxPlot { column: s("price"), title: s("Price spread") },
            Correlation { title: s("Correlation of numeric columns") },
            MonthlyTrend { title: format!("Monthly {value}") },
        ],
        Profile::Revenue => vec![
            TopCounts { column: s("kategori"), title: s("Transactions by category") },
            Shares { column: s("kategori"), title: s("Category share") },
            Histogram { column: value.clone(), title: format!("{value} distribution") },
            BoxPlot { column: value.clone(), title: format!("{value} spread") },
            Correlation { title: s("Correlation of numeric columns") },
            MonthlyTrend { title: format!("Monthly {value}") },
        ],
        Profile::Monthly => vec![
            Histogram { column: value.clone(), title: format!("Distribution of monthly {value}") },
            BoxPlot { column: value.clone(), title: format!("Monthly {value} spread") },
            MonthlyTrend { title: format!("Monthly {value}") },
        ],
    }
}

/// Build every chart of the active profile.
pub fn build_dashboard(
    ctx: &mut RenderContext<'_>,
    series: Option<&MonthlySeries>,
    fit: Option<&TrendFit>,
) -> Vec<Chart> {
    let requests = requests_for(ctx.ingest.profile, &ctx.ingest.trend);
    let top_n = ctx.config.top_n;
    let bins = ctx.config.bins;

    requests
        .into_iter()
        .filter_map(|request| match request {
            ChartRequest::TopCounts { column, title } => bar_top_counts(ctx, &column, &title, top_n),
            ChartRequest::Shares { column, title } => pie_shares(ctx, &column, &title),
            ChartRequest::Histogram { column, title } => histogram(ctx, &column, &title, bins),
            ChartRequest::BoxPlot { column, title } => box_summary(ctx, &column, &title),
            ChartRequest::GroupMean { group, value, title } => mean_by_group(ctx, &group, &value, &title),
            ChartRequest::Correlation { title } => heatmap_correlation(ctx, &title),
            ChartRequest::MonthlyTrend { title } => match series {
                Some(series) => line_monthly(ctx, series, fit, &title),
                None => {
                    ctx.warn(format!("Skipped chart \"{title}\": no monthly series available."));
                    None
                }
            },
        })
        .collect()
}
