//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` defaults and parses CLI arguments
//! - sets up logging
//! - resolves the input (file, demo, or picker)
//! - runs one dashboard pass and prints reports/plots
//! - writes optional exports

use clap::Parser;

use crate::cli::picker::{prompt_for_input, validate_csv_path, PickerChoice};
use crate::cli::{Command, DashboardArgs};
use crate::domain::{DashboardConfig, InputSource};
use crate::error::AppError;
use crate::logging::LogTarget;

pub mod context;
pub mod pipeline;

/// Entry point for the `sdash` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    // We want `sdash` and `sdash -f sales.csv` to behave like `sdash tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Dashboard(args) => handle_report(args, OutputMode::Dashboard),
        Command::Forecast(args) => handle_report(args, OutputMode::ForecastOnly),
        Command::Preview(args) => handle_report(args, OutputMode::PreviewOnly),
        Command::Tui(args) => handle_tui(args),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Dashboard,
    ForecastOnly,
    PreviewOnly,
}

fn handle_report(args: DashboardArgs, mode: OutputMode) -> Result<(), AppError> {
    let target = match &args.log_file {
        Some(path) => LogTarget::File(path.clone()),
        None => LogTarget::Stderr,
    };
    crate::logging::init(&target)?;

    let input = resolve_input(&args)?;
    let config = config_from_args(&args, input);
    let run = pipeline::run_dashboard(&config)?;

    match mode {
        OutputMode::Dashboard => {
            println!("{}", crate::report::format_run_summary(&run, &config));
            println!("{}", crate::report::format_preview(&run.ingest.dataset, config.preview_rows));
            println!("{}", crate::report::format_diagnostics(&run.ingest.dataset));
            if config.plot {
                println!(
                    "{}",
                    crate::plot::render_dashboard(&run.charts, config.plot_width, config.plot_height)
                );
            }
            println!("{}", crate::report::format_forecast(&run));
            print!("{}", crate::report::format_warnings(&run.warnings));
        }
        OutputMode::PreviewOnly => {
            println!("{}", crate::report::format_preview(&run.ingest.dataset, config.preview_rows));
            print!("{}", crate::report::format_diagnostics(&run.ingest.dataset));
        }
        OutputMode::ForecastOnly => {
            // Scripting mode: no forecast is a failure, not a warning.
            run.require_forecast()?;
            print!("{}", crate::report::format_forecast(&run));
        }
    }

    // Optional exports.
    if config.export_forecast.is_some() || config.export_json.is_some() {
        let report = pipeline::forecast_report(&run)?;
        if let Some(path) = &config.export_forecast {
            crate::io::export::write_forecast_csv(path, &report)?;
        }
        if let Some(path) = &config.export_json {
            crate::io::export::write_forecast_json(path, &report)?;
        }
    }

    Ok(())
}

fn handle_tui(args: DashboardArgs) -> Result<(), AppError> {
    // The TUI owns the terminal: log to a file or not at all.
    let target = match &args.log_file {
        Some(path) => LogTarget::File(path.clone()),
        None => LogTarget::Off,
    };
    crate::logging::init(&target)?;

    let (input, open_picker) = match (&args.file, args.demo) {
        (Some(path), _) => (InputSource::File(validate_csv_path(path)?), false),
        (None, true) => (demo_input(&args), false),
        (None, false) => (demo_input(&args), true),
    };
    crate::tui::run(config_from_args(&args, input), open_picker)
}

/// File from `-f`, demo data from `--demo`, otherwise ask on the terminal.
fn resolve_input(args: &DashboardArgs) -> Result<InputSource, AppError> {
    if let Some(path) = &args.file {
        return Ok(InputSource::File(validate_csv_path(path)?));
    }
    if args.demo {
        return Ok(demo_input(args));
    }

    match prompt_for_input()? {
        PickerChoice::File(path) => Ok(InputSource::File(path)),
        PickerChoice::Demo => Ok(demo_input(args)),
        PickerChoice::Quit => Err(AppError::new(2, "Canceled.")),
        PickerChoice::Retry(message) => Err(AppError::new(2, message)),
    }
}

fn demo_input(args: &DashboardArgs) -> InputSource {
    InputSource::Demo {
        months: args.demo_months,
        rows_per_month: args.demo_rows,
        seed: args.seed,
    }
}

pub fn config_from_args(args: &DashboardArgs, input: InputSource) -> DashboardConfig {
    DashboardConfig {
        input,
        profile: args.profile,
        delimiter: args.delimiter,
        date_column: args.date_col.clone(),
        value_column: args.value_col.clone(),
        preview_rows: args.rows,
        top_n: args.top,
        bins: args.bins,
        plot: !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_forecast: args.export_forecast.clone(),
        export_json: args.export_json.clone(),
    }
}

/// Rewrite argv so `sdash` defaults to `sdash tui`.
///
/// Rules:
/// - `sdash`                      -> `sdash tui`
/// - `sdash -f sales.csv ...`     -> `sdash tui -f sales.csv ...`
/// - `sdash --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "dashboard" | "forecast" | "preview" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
    }
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_opens_tui() {
        assert_eq!(rewrite_args(argv(&["sdash"])), argv(&["sdash", "tui"]));
        assert_eq!(
            rewrite_args(argv(&["sdash", "-f", "a.csv"])),
            argv(&["sdash", "tui", "-f", "a.csv"])
        );
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        assert_eq!(rewrite_args(argv(&["sdash", "--help"])), argv(&["sdash", "--help"]));
        assert_eq!(
            rewrite_args(argv(&["sdash", "forecast", "--demo"])),
            argv(&["sdash", "forecast", "--demo"])
        );
    }

    #[test]
    fn args_map_onto_config() {
        let cli = crate::cli::Cli::try_parse_from(["sdash", "dashboard", "--demo", "--rows", "3", "--no-plot"]).unwrap();
        let Command::Dashboard(args) = cli.command else { panic!("expected dashboard") };
        let config = config_from_args(&args, demo_input(&args));
        assert_eq!(config.preview_rows, 3);
        assert!(!config.plot);
        assert_eq!(
            config.input,
            InputSource::Demo { months: 18, rows_per_month: 40, seed: 42 }
        );
    }
}
