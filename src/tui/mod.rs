//! Ratatui-based terminal UI.
//!
//! Three tabs over the current pass: a data preview with diagnostics, the
//! profile's charts, and the monthly trend with its forecast. `o` opens a CSV
//! picker; every load is a fresh pass. Failures land in the status line and the
//! UI stays interactive.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs},
    Terminal,
};
use tracing::info;

use crate::app::pipeline::{run_dashboard, DashboardRun};
use crate::charts::ChartBody;
use crate::cli::picker::{discover_csv_files, pretty_path};
use crate::data::sample;
use crate::domain::{DashboardConfig, InputSource, Profile};
use crate::error::AppError;

mod plotters_chart;

use plotters_chart::TrendChart;

/// Start the TUI. Without an initial input the picker opens first.
pub fn run(config: DashboardConfig, open_picker: bool) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(config);
    if open_picker {
        app.open_picker();
    } else {
        app.load();
    }
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Preview,
    Charts,
    Forecast,
}

impl Tab {
    const ALL: [Tab; 3] = [Tab::Preview, Tab::Charts, Tab::Forecast];

    fn title(self) -> &'static str {
        match self {
            Tab::Preview => "Preview",
            Tab::Charts => "Charts",
            Tab::Forecast => "Forecast",
        }
    }

    fn index(self) -> usize {
        Tab::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    fn next(self) -> Self {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    fn prev(self) -> Self {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }
}

struct Picker {
    files: Vec<PathBuf>,
    selected: usize,
}

struct App {
    config: DashboardConfig,
    tab: Tab,
    chart_idx: usize,
    scroll: u16,
    picker: Option<Picker>,
    status: String,
    run: Option<DashboardRun>,
}

impl App {
    fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            tab: Tab::Preview,
            chart_idx: 0,
            scroll: 0,
            picker: None,
            status: String::new(),
            run: None,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => needs_redraw = true,
                _ => {}
            }
        }
        Ok(())
    }

    /// Run a fresh pass for the current config. Errors only reach the status line.
    fn load(&mut self) {
        self.chart_idx = 0;
        self.scroll = 0;
        match run_dashboard(&self.config) {
            Ok(run) => {
                info!(source = %run.ingest.source, "tui pass loaded");
                self.status = format!(
                    "Loaded {} rows from {} ({} warning(s)).",
                    run.ingest.dataset.len(),
                    run.ingest.source,
                    run.warnings.len()
                );
                self.run = Some(run);
            }
            Err(err) => {
                self.status = format!("Error: {err}");
                self.run = None;
            }
        }
    }

    fn open_picker(&mut self) {
        let files = discover_csv_files();
        self.status = if files.is_empty() {
            "No .csv files under the current directory; press d for demo data.".to_string()
        } else {
            format!("{} CSV file(s) found.", files.len())
        };
        self.picker = Some(Picker { files, selected: 0 });
    }

    /// Returns `true` when the app should quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.picker.is_some() {
            self.handle_picker_key(code);
            return false;
        }

        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Tab | KeyCode::Right => self.switch_tab(self.tab.next()),
            KeyCode::BackTab | KeyCode::Left => self.switch_tab(self.tab.prev()),
            KeyCode::Up => match self.tab {
                Tab::Charts => self.chart_idx = self.chart_idx.saturating_sub(1),
                _ => self.scroll = self.scroll.saturating_sub(1),
            },
            KeyCode::Down => match self.tab {
                Tab::Charts => {
                    let n = self.run.as_ref().map(|r| r.charts.len()).unwrap_or(0);
                    if self.chart_idx + 1 < n {
                        self.chart_idx += 1;
                    }
                }
                _ => self.scroll = self.scroll.saturating_add(1),
            },
            KeyCode::Char('o') => self.open_picker(),
            KeyCode::Char('r') => self.load(),
            KeyCode::Char('p') => {
                self.config.profile = next_profile(self.config.profile);
                self.load();
                self.status = format!("profile: {} | {}", self.config.profile.display_name(), self.status);
            }
            _ => {}
        }
        false
    }

    fn handle_picker_key(&mut self, code: KeyCode) {
        let Some(picker) = &mut self.picker else { return };
        match code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.picker = None;
                self.status = "Picker closed.".to_string();
            }
            KeyCode::Up => picker.selected = picker.selected.saturating_sub(1),
            KeyCode::Down => {
                if picker.selected + 1 < picker.files.len() {
                    picker.selected += 1;
                }
            }
            KeyCode::Enter => {
                let Some(path) = picker.files.get(picker.selected).cloned() else { return };
                self.picker = None;
                self.config.input = InputSource::File(path);
                self.load();
            }
            KeyCode::Char('d') => {
                self.picker = None;
                if !matches!(self.config.input, InputSource::Demo { .. }) {
                    self.config.input = InputSource::Demo {
                        months: sample::DEFAULT_MONTHS,
                        rows_per_month: sample::DEFAULT_ROWS_PER_MONTH,
                        seed: sample::DEFAULT_SEED,
                    };
                }
                self.load();
            }
            _ => {}
        }
    }

    fn switch_tab(&mut self, tab: Tab) {
        self.tab = tab;
        self.scroll = 0;
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(frame.area());

        self.draw_header(frame, chunks[0]);
        self.draw_tabs(frame, chunks[1]);
        match self.tab {
            Tab::Preview => self.draw_preview(frame, chunks[2]),
            Tab::Charts => self.draw_charts(frame, chunks[2]),
            Tab::Forecast => self.draw_forecast(frame, chunks[2]),
        }
        self.draw_footer(frame, chunks[3]);

        if self.picker.is_some() {
            self.draw_picker(frame, chunks[2]);
        }
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines = vec![Line::from(vec![
            Span::styled("sdash", Style::default().fg(Color::Cyan)),
            Span::raw(" | retail sales dashboard"),
        ])];

        let summary = match &self.run {
            Some(run) => format!(
                "source: {} | profile: {} | rows: {} | months: {}",
                run.ingest.source,
                run.ingest.profile.display_name(),
                run.ingest.dataset.len(),
                run.series.as_ref().map(|s| s.len()).unwrap_or(0),
            ),
            None => format!(
                "source: {} | profile: {} | no data loaded",
                self.config.input.label(),
                self.config.profile.display_name()
            ),
        };
        lines.push(Line::from(Span::styled(summary, Style::default().fg(Color::Gray))));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_tabs(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let tabs = Tabs::new(Tab::ALL.iter().map(|t| t.title()).collect::<Vec<_>>())
            .select(self.tab.index())
            .block(Block::default().borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
        frame.render_widget(tabs, area);
    }

    fn draw_preview(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Preview").borders(Borders::ALL);
        let Some(run) = &self.run else {
            frame.render_widget(waiting(block), area);
            return;
        };

        let ds = &run.ingest.dataset;
        let mut text = crate::report::format_preview(ds, self.config.preview_rows);
        text.push('\n');
        text.push_str(&crate::report::format_diagnostics(ds));
        let warnings = crate::report::format_warnings(&run.warnings);
        if !warnings.is_empty() {
            text.push('\n');
            text.push_str(&warnings);
        }

        let p = Paragraph::new(text).block(block).scroll((self.scroll, 0));
        frame.render_widget(p, area);
    }

    fn draw_charts(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let Some(run) = &self.run else {
            frame.render_widget(waiting(Block::default().title("Charts").borders(Borders::ALL)), area);
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(34), Constraint::Min(0)])
            .split(area);

        let items: Vec<ListItem> = run.charts.iter().map(|c| ListItem::new(c.title.clone())).collect();
        let list = List::new(items)
            .block(Block::default().title("Charts").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");
        let mut state = ListState::default();
        state.select(Some(self.chart_idx));
        frame.render_stateful_widget(list, chunks[0], &mut state);

        let Some(chart) = run.charts.get(self.chart_idx) else {
            let p = Paragraph::new("No charts for this dataset.")
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(p, chunks[1]);
            return;
        };

        let block = Block::default().title(chart.title.clone()).borders(Borders::ALL);
        let inner = block.inner(chunks[1]);
        frame.render_widget(block, chunks[1]);
        frame.render_widget(Clear, inner);

        match &chart.body {
            ChartBody::Line(_) => self.draw_trend(frame, inner, run),
            _ => {
                let txt = crate::plot::render_chart(chart, inner.width as usize, inner.height as usize);
                // Drop the ASCII title line; the block already carries it.
                let body: String = txt.lines().skip(1).collect::<Vec<_>>().join("\n");
                frame.render_widget(Paragraph::new(body), inner);
            }
        }
    }

    fn draw_forecast(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let Some(run) = &self.run else {
            frame.render_widget(waiting(Block::default().title("Forecast").borders(Borders::ALL)), area);
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(8)])
            .split(area);

        let block = Block::default()
            .title(format!("Monthly {}", run.ingest.trend.value_column))
            .borders(Borders::ALL);
        let inner = block.inner(chunks[0]);
        frame.render_widget(block, chunks[0]);
        frame.render_widget(Clear, inner);
        self.draw_trend(frame, inner, run);

        let summary = crate::report::format_forecast(run);
        let p = Paragraph::new(summary).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, chunks[1]);
    }

    fn draw_trend(&self, frame: &mut ratatui::Frame<'_>, area: Rect, run: &DashboardRun) {
        let Some(series) = trend_series(run) else {
            let msg = run
                .forecast_warning
                .clone()
                .unwrap_or_else(|| "No monthly series.".to_string());
            frame.render_widget(Paragraph::new(msg).style(Style::default().fg(Color::Yellow)), area);
            return;
        };

        let widget = TrendChart {
            observed: &series.observed,
            trend: &series.trend,
            forecast: series.forecast,
            labels: &series.labels,
            x_bounds: series.x_bounds,
            y_bounds: series.y_bounds,
            y_label: &run.ingest.trend.value_column,
        };
        frame.render_widget(widget, area);
    }

    fn draw_picker(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let Some(picker) = &self.picker else { return };

        let rect = centered(area, 70, 70);
        frame.render_widget(Clear, rect);

        let items: Vec<ListItem> = if picker.files.is_empty() {
            vec![ListItem::new("(no .csv files found)")]
        } else {
            picker.files.iter().map(|p| ListItem::new(pretty_path(p))).collect()
        };
        let list = List::new(items)
            .block(
                Block::default()
                    .title("Open CSV (Enter load, d demo, Esc close)")
                    .borders(Borders::ALL),
            )
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");
        let mut state = ListState::default();
        state.select(Some(picker.selected));
        frame.render_stateful_widget(list, rect, &mut state);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "Tab/←/→ tabs  ↑/↓ move  o open  r reload  p profile  q quit";
        let status_style = if self.status.starts_with("Error") {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::Yellow)
        };
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, status_style),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn waiting(block: Block<'_>) -> Paragraph<'_> {
    Paragraph::new("No data loaded. Press o to open a CSV.")
        .style(Style::default().fg(Color::Yellow))
        .block(block)
}

fn centered(area: Rect, pct_x: u16, pct_y: u16) -> Rect {
    let width = area.width * pct_x / 100;
    let height = area.height * pct_y / 100;
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn next_profile(cur: Profile) -> Profile {
    match cur {
        Profile::Zara => Profile::Revenue,
        Profile::Revenue => Profile::Monthly,
        Profile::Monthly => Profile::Zara,
    }
}

/// Series and bounds for the Plotters trend chart.
struct TrendSeries {
    observed: Vec<(f64, f64)>,
    trend: Vec<(f64, f64)>,
    forecast: Option<(f64, f64)>,
    labels: Vec<String>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

fn trend_series(run: &DashboardRun) -> Option<TrendSeries> {
    let series = run.series.as_ref().filter(|s| !s.is_empty())?;

    let observed: Vec<(f64, f64)> = series
        .observations
        .iter()
        .map(|o| (f64::from(o.period_index), o.value))
        .collect();
    let mut labels: Vec<String> = series.periods.iter().map(ToString::to_string).collect();

    let mut trend: Vec<(f64, f64)> = run
        .fit
        .as_ref()
        .map(|fit| {
            fit.period_indices
                .iter()
                .zip(fit.fitted.iter())
                .map(|(i, y)| (f64::from(*i), *y))
                .collect()
        })
        .unwrap_or_default();

    let forecast = match (&run.fit, run.next) {
        (Some(fit), Some(next)) => {
            let point = (fit.next_period_index() as f64, next.value);
            trend.push(point);
            labels.push(next.period.to_string());
            Some(point)
        }
        _ => None,
    };

    let last_x = labels.len().saturating_sub(1) as f64;
    let x_bounds = [-0.5, last_x.max(1.0) + 0.5];

    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(_, y) in observed.iter().chain(trend.iter()) {
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if !y_min.is_finite() || !y_max.is_finite() {
        return None;
    }
    if y_max <= y_min {
        y_min -= 0.5;
        y_max += 0.5;
    }
    let pad = ((y_max - y_min) * 0.05).max(1e-12);

    Some(TrendSeries {
        observed,
        trend,
        forecast,
        labels,
        x_bounds,
        y_bounds: [y_min - pad, y_max + pad],
    })
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    fn demo_config() -> DashboardConfig {
        DashboardConfig::with_input(InputSource::Demo {
            months: 6,
            rows_per_month: 10,
            seed: 3,
        })
    }

    #[test]
    fn tabs_cycle_both_ways() {
        assert_eq!(Tab::Preview.next(), Tab::Charts);
        assert_eq!(Tab::Forecast.next(), Tab::Preview);
        assert_eq!(Tab::Preview.prev(), Tab::Forecast);
    }

    #[test]
    fn failed_load_stays_interactive() {
        let mut app = App::new(DashboardConfig::with_input(InputSource::File(
            "definitely-missing.csv".into(),
        )));
        app.load();
        assert!(app.run.is_none());
        assert!(app.status.starts_with("Error: Failed to open CSV"));
        assert!(!app.handle_key(KeyCode::Tab));
        assert_eq!(app.tab, Tab::Charts);
        assert!(app.handle_key(KeyCode::Char('q')));
    }

    #[test]
    fn demo_load_feeds_trend_series() {
        let mut app = App::new(demo_config());
        app.load();
        let run = app.run.as_ref().unwrap();
        let series = trend_series(run).unwrap();

        assert_eq!(series.observed.len(), 6);
        // Fitted line plus the forecast point.
        assert_eq!(series.trend.len(), 7);
        assert_eq!(series.labels.len(), 7);
        assert_eq!(series.labels[6], "2024-07");
        assert_eq!(series.forecast.unwrap().0, 6.0);
        assert!(series.y_bounds[0] < series.y_bounds[1]);
    }

    #[test]
    fn picker_demo_key_uses_cli_defaults() {
        let mut app = App::new(DashboardConfig::with_input(InputSource::File(
            "definitely-missing.csv".into(),
        )));
        app.picker = Some(Picker { files: Vec::new(), selected: 0 });
        app.handle_picker_key(KeyCode::Char('d'));

        let cli = crate::cli::Cli::try_parse_from(["sdash", "tui", "--demo"]).unwrap();
        let crate::cli::Command::Tui(args) = cli.command else { panic!("expected tui") };
        assert!(app.picker.is_none());
        assert_eq!(
            app.config.input,
            InputSource::Demo {
                months: args.demo_months,
                rows_per_month: args.demo_rows,
                seed: args.seed,
            }
        );
        assert!(app.run.is_some());
    }

    #[test]
    fn chart_selection_is_clamped() {
        let mut app = App::new(demo_config());
        app.load();
        app.switch_tab(Tab::Charts);
        for _ in 0..50 {
            app.handle_key(KeyCode::Down);
        }
        let n = app.run.as_ref().unwrap().charts.len();
        assert_eq!(app.chart_idx, n - 1);
        app.handle_key(KeyCode::Up);
        assert_eq!(app.chart_idx, n - 2);
    }
}
