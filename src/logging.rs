//! Tracing subscriber setup.
//!
//! Reports go to stdout, so log lines go to stderr (or a file while the TUI
//! owns the terminal). `RUST_LOG` overrides the default filter.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::AppError;

pub const DEFAULT_FILTER: &str = "sales_dash=warn";

/// Where log lines go for this process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
    /// No subscriber at all.
    Off,
}

pub fn init(target: &LogTarget) -> Result<(), AppError> {
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());

    let installed = match target {
        LogTarget::Off => return Ok(()),
        LogTarget::Stderr => tracing_subscriber::registry()
            .with(filter())
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init(),
        LogTarget::File(path) => {
            let file = File::create(path)
                .map_err(|e| AppError::new(2, format!("Failed to create log file '{}': {e}", path.display())))?;
            tracing_subscriber::registry()
                .with(filter())
                .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
                .try_init()
        }
    };

    installed.map_err(|e| AppError::new(4, format!("Failed to initialize logging: {e}")))
}
