//! Store initialization
//!
//! Two ways in:
//! - [`open_store`]: read-write, creates the database file if needed (loader)
//! - [`connect_readonly`]: lazy read-only pool that never creates anything (API)
//!
//! Both bound connection acquisition so an unreachable store fails promptly.

use crate::config::StoreConfig;
use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Upper bound on waiting for a store connection
pub const STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Open the store read-write, creating directory and database file if missing
pub async fn open_store(config: &StoreConfig) -> Result<SqlitePool> {
    let db_path = config.database_path();
    let newly_created = !db_path.exists();

    std::fs::create_dir_all(&config.root)?;

    let options = SqliteConnectOptions::new()
        .filename(&db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(STORE_TIMEOUT);

    let pool = SqlitePoolOptions::new()
        .max_connections(4)
        .acquire_timeout(STORE_TIMEOUT)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new store: {}", db_path.display());
    } else {
        info!("Opened existing store: {}", db_path.display());
    }

    Ok(pool)
}

/// Read-only pool for the query path
///
/// Connections are opened on first use, so a missing or unreadable store
/// surfaces as an error on the request that needs it, not at startup.
pub fn connect_readonly(config: &StoreConfig) -> SqlitePool {
    let options = SqliteConnectOptions::new()
        .filename(config.database_path())
        .create_if_missing(false)
        .read_only(true)
        .busy_timeout(STORE_TIMEOUT);

    SqlitePoolOptions::new()
        .max_connections(8)
        .acquire_timeout(STORE_TIMEOUT)
        .connect_lazy_with(options)
}

/// Check the store answers a trivial query
pub async fn ping(pool: &SqlitePool) -> Result<()> {
    sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(pool).await?;
    Ok(())
}

/// Drop both collections. Irreversible.
pub async fn reset_store(pool: &SqlitePool, config: &StoreConfig) -> Result<()> {
    for table in [&config.countries_collection, &config.receipts_collection] {
        sqlx::query(&format!("DROP TABLE IF EXISTS {}", table))
            .execute(pool)
            .await?;
        warn!("Dropped {}.{}", config.db_name, table);
    }
    Ok(())
}

/// Create both collections and their indexes (idempotent)
pub async fn ensure_schema(pool: &SqlitePool, config: &StoreConfig) -> Result<()> {
    create_countries_table(pool, &config.countries_collection).await?;
    create_receipts_table(pool, &config.receipts_collection).await?;
    debug!(
        "Schema ready: {}.{}, {}.{}",
        config.db_name, config.countries_collection, config.db_name, config.receipts_collection
    );
    Ok(())
}

async fn create_countries_table(pool: &SqlitePool, table: &str) -> Result<()> {
    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            code TEXT NOT NULL,
            name TEXT NOT NULL,
            region TEXT NOT NULL,
            income_group TEXT,
            table_name TEXT
        )
        "#
    ))
    .execute(pool)
    .await?;

    sqlx::query(&format!(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_{table}_code ON {table}(code)"
    ))
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_receipts_table(pool: &SqlitePool, table: &str) -> Result<()> {
    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            code TEXT NOT NULL,
            year INTEGER NOT NULL,
            country TEXT NOT NULL,
            region TEXT NOT NULL,
            receipts_usd REAL NOT NULL,
            receipts_usd_billions REAL NOT NULL
        )
        "#
    ))
    .execute(pool)
    .await?;

    // Natural key
    sqlx::query(&format!(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_{table}_code_year ON {table}(code, year)"
    ))
    .execute(pool)
    .await?;

    // Query path filters
    sqlx::query(&format!(
        "CREATE INDEX IF NOT EXISTS idx_{table}_year ON {table}(year)"
    ))
    .execute(pool)
    .await?;

    sqlx::query(&format!(
        "CREATE INDEX IF NOT EXISTS idx_{table}_region ON {table}(region)"
    ))
    .execute(pool)
    .await?;

    Ok(())
}
