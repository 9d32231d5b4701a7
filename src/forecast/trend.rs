//! Linear trend fit over period-indexed observations.
//!
//! We fit
//!
//! ```text
//! value_i ≈ intercept + slope · period_index_i
//! ```
//!
//! by ordinary least squares in closed form:
//!
//! - `slope = cov(period_index, value) / var(period_index)`
//! - `intercept = mean(value) − slope · mean(period_index)`
//!
//! Series are short (one point per month), so we compute centred sums directly
//! with nalgebra vectors rather than going through a matrix solver.

use nalgebra::DVector;
use tracing::debug;

use crate::domain::{Observation, TrendFit};
use crate::error::ForecastError;

/// A line needs at least two points.
pub const MIN_OBSERVATIONS: usize = 2;

/// Fit a linear trend and report MAE, RMSE and R².
///
/// Fails with `InsufficientData` for fewer than two observations and with
/// `DegenerateInput` when all period indices are equal, a value is not finite,
/// or the value series is constant but the line does not reproduce it.
pub fn fit(observations: &[Observation]) -> Result<TrendFit, ForecastError> {
    let n = observations.len();
    if n < MIN_OBSERVATIONS {
        return Err(ForecastError::InsufficientData {
            required: MIN_OBSERVATIONS,
            actual: n,
        });
    }
    if let Some(bad) = observations.iter().find(|o| !o.value.is_finite()) {
        return Err(ForecastError::DegenerateInput(format!(
            "non-finite value at period {}",
            bad.period_index
        )));
    }

    let x = DVector::from_iterator(n, observations.iter().map(|o| f64::from(o.period_index)));
    let y = DVector::from_iterator(n, observations.iter().map(|o| o.value));

    let x_mean = x.mean();
    // A constant series gets its mean exactly; summing and dividing could be
    // off by an ulp and turn SS_tot = 0 into a tiny positive number.
    let first = y[0];
    let y_mean = if y.iter().all(|&v| v == first) { first } else { y.mean() };

    let dx = x.add_scalar(-x_mean);
    let dy = y.add_scalar(-y_mean);

    let sxx = dx.dot(&dx);
    if sxx <= 0.0 {
        return Err(ForecastError::DegenerateInput(
            "all period indices are identical".to_string(),
        ));
    }

    let slope = dx.dot(&dy) / sxx;
    let intercept = y_mean - slope * x_mean;

    let fitted = x.map(|xi| slope * xi + intercept);
    let residuals = &y - &fitted;

    let ss_res = residuals.dot(&residuals);
    let ss_tot = dy.dot(&dy);
    let mae = residuals.abs().sum() / n as f64;
    let rmse = (ss_res / n as f64).sqrt();

    let r_squared = if ss_tot > 0.0 {
        1.0 - ss_res / ss_tot
    } else if ss_res == 0.0 {
        1.0
    } else {
        return Err(ForecastError::DegenerateInput(
            "constant value series is not reproduced by the fitted line".to_string(),
        ));
    };

    if !(slope.is_finite() && intercept.is_finite()) {
        return Err(ForecastError::DegenerateInput(
            "trend coefficients are not finite".to_string(),
        ));
    }

    debug!(n, slope, intercept, mae, rmse, r_squared, "fitted linear trend");

    Ok(TrendFit {
        slope,
        intercept,
        period_indices: observations.iter().map(|o| o.period_index).collect(),
        fitted: fitted.iter().copied().collect(),
        mae,
        rmse,
        r_squared,
    })
}

/// Evaluate the trend line at any period index (inside or beyond the data).
pub fn forecast(fit: &TrendFit, next_period_index: i64) -> f64 {
    fit.slope * next_period_index as f64 + fit.intercept
}
