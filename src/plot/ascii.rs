//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Line chart elements:
//! - observed monthly totals: `o`
//! - fitted trend: `-` line (dotted `.` when no fit is available)
//! - next-period forecast: `F`

use crate::charts::{BoxSummary, Chart, ChartBody, CorrelationMatrix, Histogram, LineChart, Share};
use crate::report::format::truncate;

const LABEL_MAX: usize = 16;
/// Shading for |r| in the correlation heatmap, weakest first.
const SHADES: [char; 5] = [' ', '.', ':', '+', '#'];

/// Render every chart, one block per chart.
pub fn render_dashboard(charts: &[Chart], width: usize, height: usize) -> String {
    charts
        .iter()
        .map(|c| render_chart(c, width, height))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_chart(chart: &Chart, width: usize, height: usize) -> String {
    let mut out = format!("== {} ({}) ==\n", chart.title, chart.body.kind_label());
    let body = match &chart.body {
        ChartBody::Bars { bars, value_label } => {
            let rows: Vec<(String, f64, String)> =
                bars.iter().map(|(l, v)| (l.clone(), *v, fmt_num(*v))).collect();
            let mut s = render_bars(&rows, width);
            s.push_str(&format!("({value_label})\n"));
            s
        }
        ChartBody::Pie(shares) => render_shares(shares, width),
        ChartBody::Histogram(h) => render_histogram(h, width),
        ChartBody::Box(b) => render_box(b, width),
        ChartBody::Heatmap(m) => render_heatmap(m),
        ChartBody::Line(l) => render_line(l, width, height),
    };
    out.push_str(&body);
    out
}

/// Horizontal bars scaled to the largest magnitude.
fn render_bars(rows: &[(String, f64, String)], width: usize) -> String {
    let label_w = rows
        .iter()
        .map(|(l, _, _)| l.chars().count())
        .max()
        .unwrap_or(0)
        .min(LABEL_MAX);
    let value_w = rows.iter().map(|(_, _, v)| v.chars().count()).max().unwrap_or(0);
    let bar_w = width.saturating_sub(label_w + value_w + 3).max(10);
    let max = rows.iter().map(|(_, v, _)| *v).fold(0.0_f64, f64::max);

    let mut out = String::new();
    for (label, v, text) in rows {
        let len = if max > 0.0 && *v > 0.0 {
            ((v / max) * bar_w as f64).round() as usize
        } else {
            0
        };
        out.push_str(&format!(
            "{:<label_w$} |{} {text}\n",
            truncate(label, label_w),
            "#".repeat(len),
        ));
    }
    out
}

fn render_shares(shares: &[Share], width: usize) -> String {
    let rows: Vec<(String, f64, String)> = shares
        .iter()
        .map(|s| (s.label.clone(), s.percent, format!("{:.1}% ({})", s.percent, s.count)))
        .collect();
    render_bars(&rows, width)
}

fn render_histogram(h: &Histogram, width: usize) -> String {
    let rows: Vec<(String, f64, String)> = h
        .counts
        .iter()
        .zip(h.edges.windows(2))
        .map(|(n, e)| (format!("{:.2}..{:.2}", e[0], e[1]), *n as f64, n.to_string()))
        .collect();
    render_bars(&rows, width.max(LABEL_MAX + 20))
}

/// One-line box plot: `-` whiskers, `[` `]` quartiles, `|` median, `o` outliers.
fn render_box(b: &BoxSummary, width: usize) -> String {
    let width = width.max(10);
    let mut line = vec![' '; width];
    let (lo, hi) = if b.max > b.min { (b.min, b.max) } else { (b.min - 0.5, b.max + 0.5) };
    let x = |v: f64| map_x(v, lo, hi, width);

    for cell in &mut line[x(b.lower_whisker)..=x(b.upper_whisker)] {
        *cell = '-';
    }
    for cell in &mut line[x(b.q1)..=x(b.q3)] {
        *cell = '=';
    }
    line[x(b.q1)] = '[';
    line[x(b.q3)] = ']';
    line[x(b.median)] = '|';
    for o in &b.outliers {
        line[x(*o)] = 'o';
    }

    let mut out: String = line.into_iter().collect();
    out.push('\n');
    out.push_str(&format!(
        "min={} q1={} median={} q3={} max={} (n={}, outliers={})\n",
        fmt_num(b.min),
        fmt_num(b.q1),
        fmt_num(b.median),
        fmt_num(b.q3),
        fmt_num(b.max),
        b.n,
        b.outliers.len()
    ));
    out
}

fn render_heatmap(m: &CorrelationMatrix) -> String {
    let label_w = m.labels.iter().map(|l| l.chars().count()).max().unwrap_or(0).min(LABEL_MAX);
    let mut out = format!("{:<label_w$}", "");
    for (j, _) in m.labels.iter().enumerate() {
        out.push_str(&format!(" {:>7}", format!("[{j}]")));
    }
    out.push('\n');

    for (i, label) in m.labels.iter().enumerate() {
        out.push_str(&format!("{:<label_w$}", truncate(label, label_w)));
        for j in 0..m.labels.len() {
            let r = m.values[(i, j)];
            if r.is_finite() {
                let shade = SHADES[((r.abs() * (SHADES.len() - 1) as f64).round() as usize).min(SHADES.len() - 1)];
                out.push_str(&format!(" {r:>6.2}{shade}"));
            } else {
                out.push_str(&format!(" {:>7}", "n/a"));
            }
        }
        out.push_str(&format!("  [{i}]\n"));
    }
    out
}

fn render_line(chart: &LineChart, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let n_obs = chart.values.len();
    let n_total = n_obs + usize::from(chart.forecast.is_some());
    let x_max = (n_total.saturating_sub(1)).max(1) as f64;

    let mut ys: Vec<f64> = chart.values.clone();
    if let Some(trend) = &chart.trend {
        ys.extend(trend.iter().copied());
    }
    if let Some((_, v)) = &chart.forecast {
        ys.push(*v);
    }
    let (y_min, y_max) = y_range(&ys).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];
    let point = |i: usize, v: f64| (map_x(i as f64, 0.0, x_max, width), map_y(v, y_min, y_max, height));

    // Lines first so points can overlay.
    match &chart.trend {
        Some(trend) => {
            let mut path: Vec<(usize, usize)> = trend.iter().enumerate().map(|(i, v)| point(i, *v)).collect();
            if let Some((_, v)) = &chart.forecast {
                path.push(point(n_obs, *v));
            }
            draw_path(&mut grid, &path, '-');
        }
        None => {
            let path: Vec<(usize, usize)> = chart.values.iter().enumerate().map(|(i, v)| point(i, *v)).collect();
            draw_path(&mut grid, &path, '.');
        }
    }

    for (i, v) in chart.values.iter().enumerate() {
        let (x, y) = point(i, *v);
        grid[y][x] = 'o';
    }
    if let Some((_, v)) = &chart.forecast {
        let (x, y) = point(n_obs, *v);
        grid[y][x] = 'F';
    }

    let first = chart.labels.first().map(String::as_str).unwrap_or("-");
    let last = chart
        .forecast
        .as_ref()
        .map(|(l, _)| l.as_str())
        .or_else(|| chart.labels.last().map(String::as_str))
        .unwrap_or("-");

    let mut out = String::new();
    out.push_str(&format!("Plot: periods=[{first}, {last}] | y=[{y_min:.2}, {y_max:.2}]\n"));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

fn fmt_num(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v:.0}")
    } else {
        format!("{v:.2}")
    }
}

fn y_range(ys: &[f64]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &y in ys {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }

    if !(min_y.is_finite() && max_y.is_finite()) {
        return None;
    }
    if max_y > min_y {
        Some((min_y, max_y))
    } else {
        Some((min_y - 0.5, max_y + 0.5))
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_path(grid: &mut [Vec<char>], path: &[(usize, usize)], ch: char) {
    let mut prev = None;
    for &(x, y) in path {
        match prev {
            Some((x0, y0)) => draw_line(grid, x0, y0, x, y, ch),
            None => grid[y][x] = ch,
        }
        prev = Some((x, y));
    }
}

/// Integer line drawing (Bresenham).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let (mut x, mut y) = (x0 as isize, y0 as isize);
    let (x1, y1) = (x1 as isize, y1 as isize);

    let dx = (x1 - x).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let dy = -(y1 - y).abs();
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        let in_bounds = y >= 0 && (y as usize) < grid.len() && x >= 0 && (x as usize) < grid[0].len();
        if in_bounds && grid[y as usize][x as usize] == ' ' {
            grid[y as usize][x as usize] = ch;
        }

        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}
