//! Store-backed provider
//!
//! Read-only queries over the receipts collection. A receipts table that was
//! never created reads as an empty store.

use async_trait::async_trait;
use sqlx::SqlitePool;
use tourism_common::db::{self, Receipt, YearTotal};
use tourism_common::units::round2;
use tourism_common::StoreConfig;

use super::{DashboardProvider, RegionFilter, ALL_REGIONS};
use crate::error::{ApiError, ApiResult};

const RECEIPT_COLUMNS: &str = "country, code, region, year, receipts_usd, receipts_usd_billions";

/// Queries the persisted receipts
pub struct StoreProvider {
    pool: SqlitePool,
    receipts: String,
}

impl StoreProvider {
    /// Build a lazy read-only pool; nothing is opened until the first request
    pub fn connect(config: &StoreConfig) -> Self {
        tracing::info!(
            "Live mode: {} ({}.{})",
            config.database_path().display(),
            config.db_name,
            config.receipts_collection
        );
        Self::with_pool(db::connect_readonly(config), &config.receipts_collection)
    }

    pub fn with_pool(pool: SqlitePool, receipts_collection: &str) -> Self {
        Self {
            pool,
            receipts: receipts_collection.to_string(),
        }
    }

    async fn receipts_exist(&self) -> ApiResult<bool> {
        let found: Option<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?",
        )
        .bind(&self.receipts)
        .fetch_optional(&self.pool)
        .await?;
        Ok(found.is_some())
    }

    /// Rows for (year, region) ordered by receipts descending
    async fn ranked(&self, year: i32, region: &RegionFilter, limit: i64) -> ApiResult<Vec<Receipt>> {
        if !self.receipts_exist().await? {
            return Ok(Vec::new());
        }

        let rows = match region {
            RegionFilter::All => {
                sqlx::query_as::<_, Receipt>(&format!(
                    "SELECT {RECEIPT_COLUMNS} FROM {}
                     WHERE year = ?
                     ORDER BY receipts_usd DESC, code ASC
                     LIMIT ?",
                    self.receipts
                ))
                .bind(year)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            RegionFilter::Only(name) => {
                sqlx::query_as::<_, Receipt>(&format!(
                    "SELECT {RECEIPT_COLUMNS} FROM {}
                     WHERE year = ? AND region = ?
                     ORDER BY receipts_usd DESC, code ASC
                     LIMIT ?",
                    self.receipts
                ))
                .bind(year)
                .bind(name)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(rows)
    }
}

#[async_trait]
impl DashboardProvider for StoreProvider {
    fn source(&self) -> &'static str {
        "store"
    }

    async fn check(&self) -> ApiResult<()> {
        db::ping(&self.pool).await.map_err(|e| {
            tracing::warn!("Store ping failed: {}", e);
            ApiError::ServiceUnavailable(format!("Database unreachable: {}", e))
        })
    }

    fn reports_latest_year(&self) -> bool {
        true
    }

    async fn latest_year(&self) -> ApiResult<Option<i32>> {
        if !self.receipts_exist().await? {
            return Ok(None);
        }
        let year: Option<i32> =
            sqlx::query_scalar(&format!("SELECT MAX(year) FROM {}", self.receipts))
                .fetch_one(&self.pool)
                .await?;
        Ok(year)
    }

    async fn years(&self) -> ApiResult<Vec<i32>> {
        if !self.receipts_exist().await? {
            return Ok(Vec::new());
        }
        let years: Vec<i32> = sqlx::query_scalar(&format!(
            "SELECT DISTINCT year FROM {} ORDER BY year",
            self.receipts
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(years)
    }

    async fn regions(&self) -> ApiResult<Vec<String>> {
        let mut regions = vec![ALL_REGIONS.to_string()];
        if self.receipts_exist().await? {
            let stored: Vec<String> = sqlx::query_scalar(&format!(
                "SELECT DISTINCT region FROM {} ORDER BY region",
                self.receipts
            ))
            .fetch_all(&self.pool)
            .await?;
            regions.extend(stored.into_iter().filter(|region| region != ALL_REGIONS));
        }
        Ok(regions)
    }

    async fn top_countries(
        &self,
        year: i32,
        region: &RegionFilter,
        limit: i64,
    ) -> ApiResult<Vec<Receipt>> {
        self.ranked(year, region, limit).await
    }

    async fn totals_by_year(&self, region: &RegionFilter) -> ApiResult<Vec<YearTotal>> {
        if !self.receipts_exist().await? {
            return Ok(Vec::new());
        }

        let sums: Vec<(i32, f64)> = match region {
            RegionFilter::All => {
                sqlx::query_as(&format!(
                    "SELECT year, SUM(receipts_usd_billions) FROM {} GROUP BY year ORDER BY year",
                    self.receipts
                ))
                .fetch_all(&self.pool)
                .await?
            }
            RegionFilter::Only(name) => {
                sqlx::query_as(&format!(
                    "SELECT year, SUM(receipts_usd_billions) FROM {}
                     WHERE region = ?
                     GROUP BY year ORDER BY year",
                    self.receipts
                ))
                .bind(name)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(sums
            .into_iter()
            .map(|(year, total)| YearTotal {
                year,
                total_usd_billions: round2(total),
                region: None,
            })
            .collect())
    }

    async fn table_rows(
        &self,
        year: i32,
        region: &RegionFilter,
        cap: i64,
    ) -> ApiResult<Vec<Receipt>> {
        self.ranked(year, region, cap).await
    }
}
