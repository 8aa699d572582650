//! # Tourism Common Library
//!
//! Shared code for the tourism receipts loader and dashboard API:
//! - Store configuration (location, database name, collection names)
//! - Store schema, indexes and reset
//! - Persisted row models (countries, receipts, yearly totals)
//! - USD to billions scaling

pub mod config;
pub mod db;
pub mod error;
pub mod units;

pub use config::{StoreArgs, StoreConfig};
pub use error::{Error, Result};
