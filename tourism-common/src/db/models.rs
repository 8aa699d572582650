//! Persisted models

use serde::{Deserialize, Serialize};

/// One real country (dimension row), unique by `code`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Country {
    pub code: String,
    pub name: String,
    pub region: String,
    pub income_group: Option<String>,
    pub table_name: Option<String>,
}

/// Receipts of one country for one year, unique by (`code`, `year`)
///
/// Region is denormalized from the country for query convenience.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Receipt {
    pub country: String,
    pub code: String,
    pub region: String,
    pub year: i32,
    /// Raw receipts in USD
    pub receipts_usd: f64,
    /// Receipts in USD billions, rounded to 2 decimals
    pub receipts_usd_billions: f64,
}

/// Total receipts for one year, optionally scoped to a region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearTotal {
    pub year: i32,
    pub total_usd_billions: f64,
    pub region: Option<String>,
}
