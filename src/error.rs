use thiserror::Error;

/// User-facing failure with the process exit code it maps to.
///
/// Exit codes:
/// - `2`: input problems (unreadable/malformed CSV, missing columns, bad paths)
/// - `3`: not enough usable data to produce a result
/// - `4`: internal/terminal failures
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Errors raised by the trend forecaster.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// Fewer observations than a line needs.
    #[error("Insufficient data: need at least {required} periods, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// The observations cannot define a trend line.
    #[error("Degenerate input: {0}")]
    DegenerateInput(String),
}

impl From<ForecastError> for AppError {
    fn from(err: ForecastError) -> Self {
        AppError::new(3, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_data_message() {
        let err = ForecastError::InsufficientData { required: 2, actual: 1 };
        assert_eq!(err.to_string(), "Insufficient data: need at least 2 periods, got 1");
    }

    #[test]
    fn forecast_error_maps_to_exit_code_3() {
        let err: AppError = ForecastError::DegenerateInput("all periods identical".into()).into();
        assert_eq!(err.exit_code(), 3);
        assert_eq!(err.message(), "Degenerate input: all periods identical");
    }
}
