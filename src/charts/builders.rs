use std::collections::{BTreeMap, HashMap};

use crate::app::context::RenderContext;
use crate::charts::{BoxSummary, Chart, ChartBody, CorrelationMatrix, Histogram, LineChart, Share};
use crate::data::MonthlySeries;
use crate::domain::TrendFit;
use crate::math::stats::{correlation_matrix, mean, quantile_sorted};

/// Whisker reach in interquartile ranges.
const WHISKER_IQR: f64 = 1.5;

/// Most frequent categories, highest count first.
pub fn bar_top_counts(ctx: &mut RenderContext<'_>, column: &str, title: &str, top_n: usize) -> Option<Chart> {
    let values = ctx.category_for(column, title)?;
    let mut counts = count_categories(values);
    if counts.is_empty() {
        ctx.warn(no_values(title, column));
        return None;
    }
    counts.truncate(top_n.max(1));

    Some(Chart {
        title: title.to_string(),
        body: ChartBody::Bars {
            bars: counts.into_iter().map(|(label, n)| (label, n as f64)).collect(),
            value_label: "count".to_string(),
        },
    })
}

pub fn pie_shares(ctx: &mut RenderContext<'_>, column: &str, title: &str) -> Option<Chart> {
    let values = ctx.category_for(column, title)?;
    let counts = count_categories(values);
    let total: usize = counts.iter().map(|(_, n)| n).sum();
    if total == 0 {
        ctx.warn(no_values(title, column));
        return None;
    }

    let shares = counts
        .into_iter()
        .map(|(label, count)| Share {
            label,
            count,
            percent: 100.0 * count as f64 / total as f64,
        })
        .collect();

    Some(Chart {
        title: title.to_string(),
        body: ChartBody::Pie(shares),
    })
}

pub fn histogram(ctx: &mut RenderContext<'_>, column: &str, title: &str, bins: usize) -> Option<Chart> {
    let values = ctx.numeric_for(column, title)?;
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    let Some(hist) = histogram_bins(&present, bins) else {
        ctx.warn(no_values(title, column));
        return None;
    };

    Some(Chart {
        title: title.to_string(),
        body: ChartBody::Histogram(hist),
    })
}

pub fn box_summary(ctx: &mut RenderContext<'_>, column: &str, title: &str) -> Option<Chart> {
    let values = ctx.numeric_for(column, title)?;
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    let Some(summary) = summarize_box(&present) else {
        ctx.warn(no_values(title, column));
        return None;
    };

    Some(Chart {
        title: title.to_string(),
        body: ChartBody::Box(summary),
    })
}

/// Mean of `value` per distinct `group`, groups in label order.
pub fn mean_by_group(ctx: &mut RenderContext<'_>, group: &str, value: &str, title: &str) -> Option<Chart> {
    let groups = ctx.category_for(group, title)?;
    let values = ctx.numeric_for(value, title)?;

    let mut acc: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for (g, v) in groups.iter().zip(values.iter()) {
        if let (Some(g), Some(v)) = (g, v) {
            acc.entry(g.as_str()).or_default().push(*v);
        }
    }
    if acc.is_empty() {
        ctx.warn(format!(
            "Skipped chart \"{title}\": no rows with both `{group}` and `{value}`."
        ));
        return None;
    }

    let bars = acc
        .into_iter()
        .filter_map(|(label, group)| Some((label.to_string(), mean(&group)?)))
        .collect();

    Some(Chart {
        title: title.to_string(),
        body: ChartBody::Bars {
            bars,
            value_label: format!("mean {value}"),
        },
    })
}

/// Correlation between every resolved numeric column.
pub fn heatmap_correlation(ctx: &mut RenderContext<'_>, title: &str) -> Option<Chart> {
    let numeric = ctx.dataset().numeric_columns();
    if numeric.len() < 2 {
        ctx.warn(format!(
            "Skipped chart \"{title}\": needs at least two numeric columns, found {}.",
            numeric.len()
        ));
        return None;
    }

    let labels = numeric.iter().map(|(name, _)| name.to_string()).collect();
    let columns: Vec<&[Option<f64>]> = numeric.iter().map(|(_, v)| *v).collect();

    Some(Chart {
        title: title.to_string(),
        body: ChartBody::Heatmap(CorrelationMatrix {
            labels,
            values: correlation_matrix(&columns),
        }),
    })
}

/// Monthly totals, with the fitted line and the next-period point when a fit exists.
pub fn line_monthly(
    ctx: &mut RenderContext<'_>,
    series: &MonthlySeries,
    fit: Option<&TrendFit>,
    title: &str,
) -> Option<Chart> {
    if series.is_empty() {
        ctx.warn(format!("Skipped chart \"{title}\": no dated rows with a value."));
        return None;
    }

    let forecast = match (fit, series.next_period()) {
        (Some(fit), Some(next)) => Some((next.to_string(), fit.next_period_forecast())),
        _ => None,
    };

    Some(Chart {
        title: title.to_string(),
        body: ChartBody::Line(LineChart {
            labels: series.periods.iter().map(ToString::to_string).collect(),
            values: series.observations.iter().map(|o| o.value).collect(),
            trend: fit.map(|f| f.fitted.clone()),
            forecast,
        }),
    })
}

/// Count non-empty cells per label; descending count, ties by label.
pub fn count_categories(values: &[Option<String>]) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for v in values.iter().flatten() {
        *counts.entry(v.as_str()).or_insert(0) += 1;
    }
    let mut out: Vec<(String, usize)> = counts.into_iter().map(|(k, n)| (k.to_string(), n)).collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    out
}

/// Equal-width bins over `[min, max]`. A constant column lands in one bin.
pub fn histogram_bins(values: &[f64], bins: usize) -> Option<Histogram> {
    let (min, max) = min_max(values)?;

    if max <= min {
        return Some(Histogram {
            edges: vec![min - 0.5, max + 0.5],
            counts: vec![values.len()],
        });
    }

    let bins = bins.max(1);
    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for v in values {
        let idx = (((v - min) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }
    let edges = (0..=bins).map(|i| min + width * i as f64).collect();

    Some(Histogram { edges, counts })
}

pub fn summarize_box(values: &[f64]) -> Option<BoxSummary> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    let q1 = quantile_sorted(&sorted, 0.25)?;
    let median = quantile_sorted(&sorted, 0.5)?;
    let q3 = quantile_sorted(&sorted, 0.75)?;
    let iqr = q3 - q1;
    let lo_fence = q1 - WHISKER_IQR * iqr;
    let hi_fence = q3 + WHISKER_IQR * iqr;

    let inside = || sorted.iter().copied().filter(|v| (lo_fence..=hi_fence).contains(v));
    let lower_whisker = inside().next().unwrap_or(q1);
    let upper_whisker = inside().last().unwrap_or(q3);
    let outliers = sorted
        .iter()
        .copied()
        .filter(|v| !(lo_fence..=hi_fence).contains(v))
        .collect();

    Some(BoxSummary {
        n: sorted.len(),
        min: sorted[0],
        q1,
        median,
        q3,
        max: sorted[sorted.len() - 1],
        lower_whisker,
        upper_whisker,
        outliers,
    })
}

fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

fn no_values(chart: &str, column: &str) -> String {
    format!("Skipped chart \"{chart}\": column `{column}` has no values.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::build_dashboard;
    use crate::data::monthly_observations;
    use crate::domain::{DashboardConfig, Delimiter, InputSource, Profile};
    use crate::io::ingest::{parse_csv_text, IngestedData};

    fn ingest(profile: Profile, text: &str) -> IngestedData {
        let trend = profile.trend_source(None, None);
        let dataset = parse_csv_text(text, Delimiter::Auto, &profile.schema(&trend)).unwrap();
        IngestedData {
            dataset,
            source: "test".into(),
            profile,
            trend,
        }
    }

    fn config(profile: Profile) -> DashboardConfig {
        DashboardConfig {
            profile,
            ..DashboardConfig::with_input(InputSource::File("test.csv".into()))
        }
    }

    fn s(v: &str) -> Option<String> {
        Some(v.to_string())
    }

    #[test]
    fn counts_break_ties_by_label() {
        let values = [s("b"), s("a"), None, s("b"), s("c"), s("a")];
        assert_eq!(
            count_categories(&values),
            vec![("a".to_string(), 2), ("b".to_string(), 2), ("c".to_string(), 1)]
        );
    }

    #[test]
    fn histogram_puts_max_in_last_bin() {
        let hist = histogram_bins(&[0.0, 1.0, 2.0, 3.0, 4.0], 4).unwrap();
        assert_eq!(hist.edges, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(hist.counts, vec![1, 1, 1, 2]);
        assert_eq!(hist.counts.iter().sum::<usize>(), 5);
    }

    #[test]
    fn constant_histogram_is_a_single_bin() {
        let hist = histogram_bins(&[7.0, 7.0, 7.0], 10).unwrap();
        assert_eq!(hist.counts, vec![3]);
        assert_eq!(hist.edges, vec![6.5, 7.5]);
        assert!(histogram_bins(&[], 10).is_none());
    }

    #[test]
    fn box_summary_flags_outliers_outside_fences() {
        let b = summarize_box(&[1.0, 2.0, 3.0, 4.0, 5.0, 100.0]).unwrap();
        assert_eq!(b.n, 6);
        assert_eq!(b.min, 1.0);
        assert_eq!(b.max, 100.0);
        assert!((b.median - 3.5).abs() < 1e-12);
        assert_eq!(b.outliers, vec![100.0]);
        assert_eq!(b.upper_whisker, 5.0);
        assert_eq!(b.lower_whisker, 1.0);
    }

    #[test]
    fn shares_sum_to_one_hundred() {
        let data = ingest(Profile::Zara, "Promotion;price\nYes;1\nNo;2\nNo;3\n;4\n");
        let cfg = config(Profile::Zara);
        let mut ctx = RenderContext::new(&data, &cfg);
        let chart = pie_shares(&mut ctx, "Promotion", "Promotion share").unwrap();
        let ChartBody::Pie(shares) = chart.body else { panic!("expected pie") };
        assert_eq!(shares[0].label, "No");
        assert_eq!(shares[0].count, 2);
        let total: f64 = shares.iter().map(|s| s.percent).sum();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn group_means_are_sorted_by_label() {
        let text = "Product Position;Sales Volume\nFront;10\nAisle;4\nFront;20\nAisle;\nAisle;6\n";
        let data = ingest(Profile::Zara, text);
        let cfg = config(Profile::Zara);
        let mut ctx = RenderContext::new(&data, &cfg);
        let chart = mean_by_group(&mut ctx, "Product Position", "Sales Volume", "avg").unwrap();
        let ChartBody::Bars { bars, .. } = chart.body else { panic!("expected bars") };
        assert_eq!(bars, vec![("Aisle".to_string(), 5.0), ("Front".to_string(), 15.0)]);
    }

    #[test]
    fn zara_dashboard_skips_missing_columns_with_warnings() {
        let text = "Product Category;price;Sales Volume;date\n\
                    JACKETS;10;100;2024-01-05\n\
                    SHOES;20;150;2024-02-05\n\
                    JACKETS;30;200;2024-03-05\n";
        let data = ingest(Profile::Zara, text);
        let cfg = config(Profile::Zara);
        let mut ctx = RenderContext::new(&data, &cfg);

        let ds = ctx.dataset();
        let series = monthly_observations(ds.dates("scraped_at").unwrap(), ds.numeric("Sales Volume").unwrap());
        let fit = crate::forecast::fit(&series.observations).unwrap();
        let charts = build_dashboard(&mut ctx, Some(&series), Some(&fit));

        let titles: Vec<&str> = charts.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Top product categories",
                "Price distribution",
                "Price spread",
                "Correlation of numeric columns",
                "Monthly Sales Volume",
            ]
        );
        // Promotion, section and Product Position are absent.
        assert_eq!(ctx.warnings().len(), 3);

        let ChartBody::Line(line) = &charts[4].body else { panic!("expected line") };
        assert_eq!(line.labels, vec!["2024-01", "2024-02", "2024-03"]);
        let (label, value) = line.forecast.clone().unwrap();
        assert_eq!(label, "2024-04");
        assert!((value - 250.0).abs() < 1e-9);
    }

    #[test]
    fn correlation_needs_two_numeric_columns() {
        let data = ingest(Profile::Monthly, "month,value\n2024-01,1\n2024-02,2\n");
        let cfg = config(Profile::Monthly);
        let mut ctx = RenderContext::new(&data, &cfg);
        assert!(heatmap_correlation(&mut ctx, "corr").is_none());
        assert!(ctx.warnings()[0].contains("two numeric columns"));
    }
}
