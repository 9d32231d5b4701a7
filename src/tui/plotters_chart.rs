//! Plotters-powered monthly trend chart widget for Ratatui.
//!
//! Plotters gives nicer axes and tick labels than Ratatui's built-in `Chart`
//! widget. Its output lands in the Ratatui buffer through
//! `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// A render-only trend chart; all series and bounds are computed by the caller.
pub struct TrendChart<'a> {
    /// Observed monthly totals at `(period index, value)`.
    pub observed: &'a [(f64, f64)],
    /// Fitted line, extended to the forecast period. Empty without a fit.
    pub trend: &'a [(f64, f64)],
    pub forecast: Option<(f64, f64)>,
    /// Month label per period index (the forecast month included).
    pub labels: &'a [String],
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub y_label: &'a str,
}

impl TrendChart<'_> {
    fn label_at(&self, x: f64) -> String {
        let idx = x.round();
        if (x - idx).abs() > 0.25 || idx < 0.0 {
            return String::new();
        }
        self.labels.get(idx as usize).cloned().unwrap_or_default()
    }
}

impl Widget for TrendChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to lay out a chart this small.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 8)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            // Mesh lines are noise at terminal resolution.
            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc("month")
                .y_desc(self.y_label)
                .x_labels(6)
                .y_labels(5)
                .x_label_formatter(&|v| self.label_at(*v))
                .y_label_formatter(&|v| format!("{v:.0}"))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            let observed_color = WHITE;
            let trend_color = RGBColor(0, 255, 255); // cyan
            let forecast_color = RGBColor(255, 215, 0); // amber

            chart.draw_series(LineSeries::new(self.observed.iter().copied(), &observed_color))?;
            if !self.trend.is_empty() {
                chart.draw_series(LineSeries::new(self.trend.iter().copied(), &trend_color))?;
            }

            // `Circle` radii are mis-scaled by the ratatui backend; pixels render cleanly.
            chart.draw_series(self.observed.iter().map(|&(x, y)| Pixel::new((x, y), observed_color)))?;
            if let Some((x, y)) = self.forecast {
                chart.draw_series(std::iter::once(Pixel::new((x, y), forecast_color)))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}
