//! Request-scoped state for a single dashboard pass.
//!
//! One `RenderContext` is created per pass (per uploaded file), handed to the
//! chart builders and the forecast stage, and dropped when the pass ends.
//! Nothing in it outlives the pass and nothing is shared between passes.

use tracing::debug;

use crate::domain::DashboardConfig;
use crate::io::ingest::{Dataset, IngestedData};

pub struct RenderContext<'a> {
    pub ingest: &'a IngestedData,
    pub config: &'a DashboardConfig,
    warnings: Vec<String>,
}

impl<'a> RenderContext<'a> {
    pub fn new(ingest: &'a IngestedData, config: &'a DashboardConfig) -> Self {
        Self {
            ingest,
            config,
            warnings: Vec::new(),
        }
    }

    pub fn dataset(&self) -> &'a Dataset {
        &self.ingest.dataset
    }

    /// Record a user-facing warning; logged at debug level only.
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        debug!("{message}");
        self.warnings.push(message);
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<String> {
        self.warnings
    }

    /// Numeric column for `chart`, or a "skipped" warning when it is absent.
    pub fn numeric_for(&mut self, column: &str, chart: &str) -> Option<&'a [Option<f64>]> {
        let values = self.dataset().numeric(column);
        if values.is_none() {
            self.warn(skipped(chart, column, "numeric"));
        }
        values
    }

    /// Category column for `chart`, or a "skipped" warning when it is absent.
    pub fn category_for(&mut self, column: &str, chart: &str) -> Option<&'a [Option<String>]> {
        let values = self.dataset().category(column);
        if values.is_none() {
            self.warn(skipped(chart, column, "category"));
        }
        values
    }
}

fn skipped(chart: &str, column: &str, role: &str) -> String {
    format!("Skipped chart \"{chart}\": {role} column `{column}` not found.")
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::domain::{Delimiter, InputSource, Profile};
    use crate::io::ingest::parse_csv_text;

    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn zara_ingest() -> IngestedData {
        let trend = Profile::Zara.trend_source(None, None);
        let dataset = parse_csv_text("price;section\n10;MAN\n", Delimiter::Auto, &Profile::Zara.schema(&trend)).unwrap();
        IngestedData {
            dataset,
            source: "test".into(),
            profile: Profile::Zara,
            trend,
        }
    }

    #[test]
    fn missing_columns_produce_skip_warnings() {
        let ingest = zara_ingest();
        let config = DashboardConfig::with_input(InputSource::File("test.csv".into()));
        let mut ctx = RenderContext::new(&ingest, &config);

        assert!(ctx.numeric_for("price", "Price distribution").is_some());
        assert!(ctx.category_for("Promotion", "Promotion share").is_none());
        assert_eq!(ctx.warnings().len(), 1);
        assert!(ctx.warnings()[0].contains("`Promotion`"));
    }

    #[test]
    fn warnings_stay_out_of_the_default_log() {
        let ingest = zara_ingest();
        let config = DashboardConfig::with_input(InputSource::File("test.csv".into()));
        let buf = Arc::new(Mutex::new(Vec::new()));
        let writer = buf.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_writer(move || Capture(writer.clone()))
            .finish();

        let warnings = tracing::subscriber::with_default(subscriber, || {
            let mut ctx = RenderContext::new(&ingest, &config);
            ctx.warn("Skipped chart \"x\": column `y` not found.");
            ctx.into_warnings()
        });

        assert_eq!(warnings.len(), 1);
        assert!(buf.lock().unwrap().is_empty());
    }
}
