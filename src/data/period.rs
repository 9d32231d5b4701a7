//! Bucket dated rows into calendar months.
//!
//! The trend forecaster works on period indices, not timestamps. This module
//! sums the metric per `YearMonth`, orders months ascending and numbers them
//! `0..N-1`. Months without any rows are not invented: the index is the ordinal
//! position among months that actually occur in the data.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::{Observation, YearMonth};

/// Monthly aggregate ready for fitting.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MonthlySeries {
    /// Calendar month of each observation (same order).
    pub periods: Vec<YearMonth>,
    pub observations: Vec<Observation>,
    /// Rows skipped because the date or the value was missing.
    pub dropped_rows: usize,
}

impl MonthlySeries {
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn last_period(&self) -> Option<YearMonth> {
        self.periods.last().copied()
    }

    /// Label of the period following the last observed month.
    pub fn next_period(&self) -> Option<YearMonth> {
        self.last_period().map(YearMonth::next)
    }
}

/// Sum `values` per calendar month of `dates`.
///
/// Both slices are aligned row by row; a shorter slice truncates the other.
pub fn monthly_observations(dates: &[Option<NaiveDate>], values: &[Option<f64>]) -> MonthlySeries {
    let mut totals: BTreeMap<YearMonth, f64> = BTreeMap::new();
    let mut dropped_rows = 0usize;

    for (date, value) in dates.iter().zip(values.iter()) {
        match (date, value) {
            (Some(date), Some(value)) if value.is_finite() => {
                *totals.entry(YearMonth::from_date(*date)).or_insert(0.0) += value;
            }
            _ => dropped_rows += 1,
        }
    }
    dropped_rows += dates.len().abs_diff(values.len());

    let (periods, observations) = totals
        .into_iter()
        .enumerate()
        .map(|(idx, (period, total))| (period, Observation::new(idx as u32, total)))
        .unzip();

    MonthlySeries {
        periods,
        observations,
        dropped_rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, day)
    }

    #[test]
    fn sums_per_month_in_calendar_order() {
        let dates = [d(2024, 2, 3), d(2024, 1, 31), d(2024, 2, 20), d(2024, 1, 1)];
        let values = [Some(5.0), Some(1.0), Some(7.0), Some(2.0)];
        let series = monthly_observations(&dates, &values);

        assert_eq!(
            series.periods,
            vec![YearMonth::new(2024, 1).unwrap(), YearMonth::new(2024, 2).unwrap()]
        );
        assert_eq!(
            series.observations,
            vec![Observation::new(0, 3.0), Observation::new(1, 12.0)]
        );
        assert_eq!(series.dropped_rows, 0);
        assert_eq!(series.next_period(), YearMonth::new(2024, 3));
    }

    #[test]
    fn gaps_keep_contiguous_indices() {
        let dates = [d(2023, 11, 1), d(2024, 2, 1)];
        let values = [Some(1.0), Some(2.0)];
        let series = monthly_observations(&dates, &values);
        let idx: Vec<u32> = series.observations.iter().map(|o| o.period_index).collect();
        assert_eq!(idx, vec![0, 1]);
        assert_eq!(series.periods[1], YearMonth::new(2024, 2).unwrap());
    }

    #[test]
    fn incomplete_rows_are_dropped_and_counted() {
        let dates = [d(2024, 1, 1), None, d(2024, 1, 2)];
        let values = [Some(1.0), Some(2.0), None];
        let series = monthly_observations(&dates, &values);
        assert_eq!(series.len(), 1);
        assert_eq!(series.dropped_rows, 2);
    }

    #[test]
    fn year_boundary_is_ordered() {
        let dates = [d(2025, 1, 5), d(2024, 12, 5)];
        let values = [Some(1.0), Some(1.0)];
        let series = monthly_observations(&dates, &values);
        assert_eq!(series.periods[0].to_string(), "2024-12");
        assert_eq!(series.next_period().unwrap().to_string(), "2025-02");
    }
}
