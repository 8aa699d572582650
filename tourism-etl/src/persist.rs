//! Idempotent upsert layer
//!
//! Countries are keyed by `code`, receipts by (`code`, `year`). Every write is
//! an upsert on that natural key, so replaying a load never duplicates rows.
//!
//! Writes go out in batches. Each batch runs in one transaction and every
//! statement in it is independent: a failing row is logged and skipped while
//! the rest of the batch still applies.

use crate::Result;
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments};
use sqlx::SqlitePool;
use tourism_common::db::{Country, Receipt};
use tracing::{debug, info, warn};

/// Rows per bulk batch
pub const DEFAULT_BATCH_SIZE: usize = 2000;

/// Outcome of a bulk upsert
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UpsertSummary {
    /// Rows created or changed; rewriting identical values does not count
    pub written: u64,
    /// Rows whose statement failed
    pub failed: u64,
}

impl UpsertSummary {
    fn merge(&mut self, other: UpsertSummary) {
        self.written += other.written;
        self.failed += other.failed;
    }
}

/// A row that can be upserted on its natural key
trait UpsertRow {
    fn upsert_sql(table: &str) -> String;

    fn bind_values<'q>(
        &'q self,
        query: Query<'q, Sqlite, SqliteArguments<'q>>,
    ) -> Query<'q, Sqlite, SqliteArguments<'q>>;

    /// Natural key, for logs
    fn key(&self) -> String;
}

impl UpsertRow for Country {
    fn upsert_sql(table: &str) -> String {
        format!(
            r#"
            INSERT INTO {table} (code, name, region, income_group, table_name)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(code) DO UPDATE SET
                name = excluded.name,
                region = excluded.region,
                income_group = excluded.income_group,
                table_name = excluded.table_name
            WHERE {table}.name IS NOT excluded.name
               OR {table}.region IS NOT excluded.region
               OR {table}.income_group IS NOT excluded.income_group
               OR {table}.table_name IS NOT excluded.table_name
            "#
        )
    }

    fn bind_values<'q>(
        &'q self,
        query: Query<'q, Sqlite, SqliteArguments<'q>>,
    ) -> Query<'q, Sqlite, SqliteArguments<'q>> {
        query
            .bind(&self.code)
            .bind(&self.name)
            .bind(&self.region)
            .bind(&self.income_group)
            .bind(&self.table_name)
    }

    fn key(&self) -> String {
        self.code.clone()
    }
}

impl UpsertRow for Receipt {
    fn upsert_sql(table: &str) -> String {
        format!(
            r#"
            INSERT INTO {table} (code, year, country, region, receipts_usd, receipts_usd_billions)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(code, year) DO UPDATE SET
                country = excluded.country,
                region = excluded.region,
                receipts_usd = excluded.receipts_usd,
                receipts_usd_billions = excluded.receipts_usd_billions
            WHERE {table}.country IS NOT excluded.country
               OR {table}.region IS NOT excluded.region
               OR {table}.receipts_usd IS NOT excluded.receipts_usd
               OR {table}.receipts_usd_billions IS NOT excluded.receipts_usd_billions
            "#
        )
    }

    fn bind_values<'q>(
        &'q self,
        query: Query<'q, Sqlite, SqliteArguments<'q>>,
    ) -> Query<'q, Sqlite, SqliteArguments<'q>> {
        query
            .bind(&self.code)
            .bind(self.year)
            .bind(&self.country)
            .bind(&self.region)
            .bind(self.receipts_usd)
            .bind(self.receipts_usd_billions)
    }

    fn key(&self) -> String {
        format!("{}/{}", self.code, self.year)
    }
}

/// Upsert countries keyed by code
pub async fn upsert_countries(
    pool: &SqlitePool,
    table: &str,
    countries: &[Country],
    batch_size: usize,
) -> Result<UpsertSummary> {
    let summary = bulk_upsert(pool, table, countries, batch_size).await?;
    info!(
        "Countries upserted/updated: {} ({} failed)",
        summary.written, summary.failed
    );
    Ok(summary)
}

/// Upsert receipts keyed by (code, year)
pub async fn upsert_receipts(
    pool: &SqlitePool,
    table: &str,
    receipts: &[Receipt],
    batch_size: usize,
) -> Result<UpsertSummary> {
    let summary = bulk_upsert(pool, table, receipts, batch_size).await?;
    info!(
        "Receipts upserted/updated: {} ({} failed)",
        summary.written, summary.failed
    );
    Ok(summary)
}

async fn bulk_upsert<T: UpsertRow>(
    pool: &SqlitePool,
    table: &str,
    rows: &[T],
    batch_size: usize,
) -> Result<UpsertSummary> {
    let sql = T::upsert_sql(table);
    let mut total = UpsertSummary::default();

    for (batch_no, batch) in rows.chunks(batch_size.max(1)).enumerate() {
        let mut batch_summary = UpsertSummary::default();
        let mut tx = pool.begin().await?;

        for row in batch {
            match row.bind_values(sqlx::query(&sql)).execute(&mut *tx).await {
                Ok(result) => batch_summary.written += result.rows_affected(),
                Err(e) => {
                    batch_summary.failed += 1;
                    warn!("Upsert into {} failed for {}: {}", table, row.key(), e);
                }
            }
        }

        tx.commit().await?;
        debug!(
            "{} batch {}: {} rows, {} written, {} failed",
            table,
            batch_no + 1,
            batch.len(),
            batch_summary.written,
            batch_summary.failed
        );
        total.merge(batch_summary);
    }

    Ok(total)
}
