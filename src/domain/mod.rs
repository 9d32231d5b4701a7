//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the column schema and dataset profiles (`Schema`, `Profile`)
//! - trend observations and fit outputs (`Observation`, `TrendFit`)
//! - run configuration (`DashboardConfig`) and export records

pub mod schema;
pub mod types;

pub use schema::*;
pub use types::*;
