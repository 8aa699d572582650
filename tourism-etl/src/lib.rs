//! tourism-etl library - tourism receipts transform and load
//!
//! Linear pipeline, leaf first:
//! - [`loader`]: read the wide receipts CSV and the country metadata CSV
//! - [`clean`]: join on country code, drop aggregate regions, coerce year cells
//! - [`reshape`]: unpivot into one receipt per country-year, derive countries
//! - [`summary`]: latest populated year, top earners, recent global totals
//! - [`report`]: write summary CSVs and render console tables
//! - [`charts`]: bar and line chart PNGs for the report
//! - [`persist`]: batched idempotent upserts into the store
//! - [`query`]: read-back reports against the store
//! - [`pipeline`]: the `report` and `load` runs wired end to end

pub mod charts;
pub mod clean;
pub mod error;
pub mod loader;
pub mod persist;
pub mod pipeline;
pub mod query;
pub mod report;
pub mod reshape;
pub mod summary;

pub use error::{EtlError, Result};
