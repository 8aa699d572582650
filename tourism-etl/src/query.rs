//! Read-back reports against the store

use crate::Result;
use sqlx::SqlitePool;
use tourism_common::db::{Receipt, YearTotal};
use tourism_common::units::{round2, USD_PER_BILLION};

/// Most recent year with any stored receipt
pub async fn latest_stored_year(pool: &SqlitePool, table: &str) -> Result<Option<i32>> {
    let year: Option<i32> = sqlx::query_scalar(&format!("SELECT MAX(year) FROM {}", table))
        .fetch_one(pool)
        .await?;
    Ok(year)
}

/// Largest stored receipts for one year
pub async fn top_stored(
    pool: &SqlitePool,
    table: &str,
    year: i32,
    limit: i64,
) -> Result<Vec<Receipt>> {
    let rows = sqlx::query_as::<_, Receipt>(&format!(
        "SELECT country, code, region, year, receipts_usd, receipts_usd_billions
         FROM {}
         WHERE year = ?
         ORDER BY receipts_usd DESC, code ASC
         LIMIT ?",
        table
    ))
    .bind(year)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Global totals per year from raw USD, ascending
pub async fn stored_totals(pool: &SqlitePool, table: &str) -> Result<Vec<YearTotal>> {
    let rows: Vec<(i32, f64)> = sqlx::query_as(&format!(
        "SELECT year, SUM(receipts_usd) FROM {} GROUP BY year ORDER BY year",
        table
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(year, total_usd)| YearTotal {
            year,
            total_usd_billions: round2(total_usd / USD_PER_BILLION),
            region: None,
        })
        .collect())
}
