//! Synthetic retail transactions for the no-upload demo.
//!
//! The demo emits the fashion-retail layout (`;`-separated, like the exports
//! the `zara` profile targets) plus a `date` column, and is fed through the same
//! ingest path as an uploaded file. Monthly sales volume follows a linear trend
//! with Gaussian noise so the forecast has something to find.

use chrono::{Duration, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::error::AppError;

const CATEGORIES: [&str; 6] = ["JACKETS", "T-SHIRTS", "SWEATERS", "JEANS", "SHOES", "DRESSES"];
const POSITIONS: [&str; 3] = ["Aisle", "End-cap", "Front of Store"];
const SECTIONS: [&str; 2] = ["MAN", "WOMAN"];

/// Demo size and seed when none are given.
pub const DEFAULT_MONTHS: usize = 18;
pub const DEFAULT_ROWS_PER_MONTH: usize = 40;
pub const DEFAULT_SEED: u64 = 42;

/// First demo month.
const START: (i32, u32) = (2024, 1);

/// Mean sales volume per transaction in the first month and its monthly drift.
const BASE_VOLUME: f64 = 1_200.0;
const VOLUME_TREND: f64 = 45.0;
const VOLUME_NOISE: f64 = 180.0;

pub fn demo_csv(months: usize, rows_per_month: usize, seed: u64) -> Result<String, AppError> {
    if months == 0 || rows_per_month == 0 {
        return Err(AppError::new(2, "Demo data needs at least one month and one row per month."));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let volume_noise = Normal::new(0.0, VOLUME_NOISE)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;
    let price_noise = Normal::new(0.0, 0.15)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let mut writer = csv::WriterBuilder::new().delimiter(b';').from_writer(Vec::new());
    writer
        .write_record([
            "Product ID",
            "date",
            "Product Position",
            "Promotion",
            "Product Category",
            "section",
            "price",
            "Sales Volume",
        ])
        .map_err(|e| AppError::new(4, format!("Failed to write demo header: {e}")))?;

    let mut product_id = 100_000u32;
    for m in 0..months {
        let month_start = month_start(m)?;
        let mean_volume = BASE_VOLUME + VOLUME_TREND * m as f64;

        for _ in 0..rows_per_month {
            product_id += 1;
            let day = rng.gen_range(0..28);
            let date = month_start + Duration::days(day);

            let category_idx = rng.gen_range(0..CATEGORIES.len());
            // Pricier categories sit further down the list.
            let base_price = 19.95 + 10.0 * category_idx as f64;
            let price = (base_price * (1.0 + price_noise.sample(&mut rng))).max(5.0);

            let promoted = rng.gen_bool(0.3);
            let position = POSITIONS[rng.gen_range(0..POSITIONS.len())];
            let position_boost = if position == "End-cap" { 1.08 } else { 1.0 };
            let promo_boost = if promoted { 1.12 } else { 1.0 };
            let volume = ((mean_volume + volume_noise.sample(&mut rng)) * position_boost * promo_boost)
                .round()
                .max(0.0);

            writer
                .write_record([
                    product_id.to_string(),
                    date.format("%Y-%m-%d").to_string(),
                    position.to_string(),
                    if promoted { "Yes" } else { "No" }.to_string(),
                    CATEGORIES[category_idx].to_string(),
                    SECTIONS[rng.gen_range(0..SECTIONS.len())].to_string(),
                    format!("{price:.2}"),
                    format!("{volume:.0}"),
                ])
                .map_err(|e| AppError::new(4, format!("Failed to write demo row: {e}")))?;
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::new(4, format!("Failed to finish demo data: {e}")))?;
    String::from_utf8(bytes).map_err(|e| AppError::new(4, format!("Demo data is not UTF-8: {e}")))
}

fn month_start(offset: usize) -> Result<NaiveDate, AppError> {
    let total = START.0 as i64 * 12 + (START.1 as i64 - 1) + offset as i64;
    let year = i32::try_from(total.div_euclid(12))
        .map_err(|_| AppError::new(2, "Demo month range is out of bounds."))?;
    let month = total.rem_euclid(12) as u32 + 1;
    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| AppError::new(2, "Demo month range is out of bounds."))
}
