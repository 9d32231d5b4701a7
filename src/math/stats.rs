//! Descriptive statistics for chart builders.
//!
//! All helpers take plain slices and return `None` when the statistic is
//! undefined (empty input, zero variance) instead of producing NaN.

use nalgebra::{DMatrix, DVector};

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(DVector::from_column_slice(values).mean())
}

/// Quantile of an ascending-sorted slice with linear interpolation between
/// closest ranks (`q` in `[0, 1]`).
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Pearson correlation of two equally long slices.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let x = DVector::from_column_slice(x);
    let y = DVector::from_column_slice(y);
    let dx = x.add_scalar(-x.mean());
    let dy = y.add_scalar(-y.mean());

    let sxx = dx.dot(&dx);
    let syy = dy.dot(&dy);
    if sxx <= 0.0 || syy <= 0.0 {
        return None;
    }
    Some((dx.dot(&dy) / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

/// Pairwise-complete Pearson correlation matrix.
///
/// For every pair of columns only rows where both values are present are used.
/// Undefined entries (fewer than two shared rows, zero variance) are NaN; the
/// diagonal is 1 for any column with non-zero variance.
pub fn correlation_matrix(columns: &[&[Option<f64>]]) -> DMatrix<f64> {
    let k = columns.len();
    let mut out = DMatrix::from_element(k, k, f64::NAN);
    for i in 0..k {
        for j in i..k {
            let (xs, ys): (Vec<f64>, Vec<f64>) = columns[i]
                .iter()
                .zip(columns[j].iter())
                .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
                .unzip();
            if let Some(r) = pearson(&xs, &ys) {
                out[(i, j)] = r;
                out[(j, i)] = r;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantiles_interpolate_linearly() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile_sorted(&v, 0.0), Some(1.0));
        assert_eq!(quantile_sorted(&v, 1.0), Some(4.0));
        assert!((quantile_sorted(&v, 0.5).unwrap() - 2.5).abs() < 1e-12);
        assert!((quantile_sorted(&v, 0.25).unwrap() - 1.75).abs() < 1e-12);
        assert_eq!(quantile_sorted(&[], 0.5), None);
    }

    #[test]
    fn pearson_detects_perfect_relationships() {
        let x = [1.0, 2.0, 3.0, 4.0];
        assert!((pearson(&x, &[2.0, 4.0, 6.0, 8.0]).unwrap() - 1.0).abs() < 1e-12);
        assert!((pearson(&x, &[8.0, 6.0, 4.0, 2.0]).unwrap() + 1.0).abs() < 1e-12);
        assert_eq!(pearson(&x, &[1.0, 1.0, 1.0, 1.0]), None);
    }

    #[test]
    fn correlation_matrix_uses_pairwise_complete_rows() {
        let a = [Some(1.0), Some(2.0), Some(3.0), None];
        let b = [Some(2.0), Some(4.0), Some(6.0), Some(100.0)];
        let c = [Some(5.0), None, Some(5.0), Some(5.0)];
        let m = correlation_matrix(&[&a, &b, &c]);

        assert!((m[(0, 1)] - 1.0).abs() < 1e-12);
        assert_eq!(m[(0, 1)], m[(1, 0)]);
        assert!((m[(0, 0)] - 1.0).abs() < 1e-12);
        assert!(m[(2, 2)].is_nan());
        assert!(m[(0, 2)].is_nan());
    }

    #[test]
    fn mean_of_empty_is_none() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[1.0, 2.0, 3.0]), Some(2.0));
    }
}
