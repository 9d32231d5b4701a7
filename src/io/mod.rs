//! Input/output helpers.
//!
//! - CSV ingest + schema validation (`ingest`)
//! - forecast exports (CSV/JSON) (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
