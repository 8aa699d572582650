//! Integration tests for the upsert layer and the store load

mod common;

use common::*;
use sqlx::SqlitePool;
use tourism_common::db::{ensure_schema, open_store, Country, Receipt};
use tourism_common::StoreConfig;
use tourism_etl::persist::{upsert_countries, upsert_receipts, DEFAULT_BATCH_SIZE};
use tourism_etl::pipeline::{run_load, LoadOptions};
use tourism_etl::query::{latest_stored_year, stored_totals, top_stored};

async fn count(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .unwrap()
}

fn receipt(code: &str, year: i32, usd: f64) -> Receipt {
    Receipt {
        country: format!("Country {}", code),
        code: code.to_string(),
        region: "Europe & Central Asia".to_string(),
        year,
        receipts_usd: usd,
        receipts_usd_billions: tourism_common::units::to_billions(usd),
    }
}

async fn fresh_store() -> (tempfile::TempDir, StoreConfig, SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig::with_defaults(dir.path());
    let pool = open_store(&config).await.unwrap();
    ensure_schema(&pool, &config).await.unwrap();
    (dir, config, pool)
}

#[tokio::test]
async fn test_load_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig::with_defaults(dir.path());

    let first = run_load(&fixture_dir(), &config, &LoadOptions::default())
        .await
        .unwrap();
    assert_eq!(first.countries.written, FIXTURE_COUNTRIES as u64);
    assert_eq!(first.receipts.written, FIXTURE_RECEIPTS as u64);
    assert_eq!(first.receipts.failed, 0);

    let second = run_load(&fixture_dir(), &config, &LoadOptions::default())
        .await
        .unwrap();
    // Same values rewritten: nothing created, nothing changed
    assert_eq!(second.countries.written, 0);
    assert_eq!(second.receipts.written, 0);

    let pool = open_store(&config).await.unwrap();
    assert_eq!(count(&pool, "countries").await, FIXTURE_COUNTRIES as i64);
    assert_eq!(count(&pool, "receipts").await, FIXTURE_RECEIPTS as i64);
}

#[tokio::test]
async fn test_load_reports_latest_stored_top_earners() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig::with_defaults(dir.path());

    let outcome = run_load(&fixture_dir(), &config, &LoadOptions::default())
        .await
        .unwrap();

    assert_eq!(outcome.latest_year, Some(2021));
    let codes: Vec<&str> = outcome.top_earners.iter().map(|r| r.code.as_str()).collect();
    assert_eq!(codes, vec!["USA", "FRA", "ESP", "ITA", "JPN"]);
}

#[tokio::test]
async fn test_load_limit_caps_receipts() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig::with_defaults(dir.path());
    let options = LoadOptions {
        limit: Some(10),
        batch_size: 3,
        ..LoadOptions::default()
    };

    let outcome = run_load(&fixture_dir(), &config, &options).await.unwrap();
    assert_eq!(outcome.receipts.written, 10);
    assert_eq!(outcome.countries.written, FIXTURE_COUNTRIES as u64);

    // Year-major order: the first 10 values are all 2017 and 2018
    let pool = open_store(&config).await.unwrap();
    let max_year: i32 = sqlx::query_scalar("SELECT MAX(year) FROM receipts")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(max_year, 2018);
}

#[tokio::test]
async fn test_reset_rebuilds_collections() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig::with_defaults(dir.path());

    run_load(&fixture_dir(), &config, &LoadOptions::default())
        .await
        .unwrap();

    let pool = open_store(&config).await.unwrap();
    sqlx::query("INSERT INTO receipts (code, year, country, region, receipts_usd, receipts_usd_billions)
                 VALUES ('ZZZ', 1990, 'Stale', 'Nowhere', 1.0, 0.0)")
        .execute(&pool)
        .await
        .unwrap();
    assert_eq!(count(&pool, "receipts").await, FIXTURE_RECEIPTS as i64 + 1);

    let options = LoadOptions {
        reset: true,
        ..LoadOptions::default()
    };
    let outcome = run_load(&fixture_dir(), &config, &options).await.unwrap();

    // After a reset everything is created again
    assert_eq!(outcome.receipts.written, FIXTURE_RECEIPTS as u64);
    assert_eq!(count(&pool, "receipts").await, FIXTURE_RECEIPTS as i64);
}

#[tokio::test]
async fn test_upsert_last_write_wins() {
    let (_dir, config, pool) = fresh_store().await;

    let summary = upsert_receipts(
        &pool,
        &config.receipts_collection,
        &[receipt("FRA", 2019, 63.5e9), receipt("ESP", 2019, 79.7e9)],
        DEFAULT_BATCH_SIZE,
    )
    .await
    .unwrap();
    assert_eq!(summary.written, 2);

    let summary = upsert_receipts(
        &pool,
        &config.receipts_collection,
        &[receipt("FRA", 2019, 64.0e9), receipt("ESP", 2019, 79.7e9)],
        DEFAULT_BATCH_SIZE,
    )
    .await
    .unwrap();
    // Only the changed row counts
    assert_eq!(summary.written, 1);

    let top = top_stored(&pool, &config.receipts_collection, 2019, 5).await.unwrap();
    assert_eq!(top.len(), 2);
    assert_eq!(top[1].code, "FRA");
    assert_eq!(top[1].receipts_usd, 64.0e9);
    assert_eq!(top[1].receipts_usd_billions, 64.0);
}

#[tokio::test]
async fn test_country_upsert_replaces_every_field() {
    let (_dir, config, pool) = fresh_store().await;

    let mut france = Country {
        code: "FRA".into(),
        name: "France".into(),
        region: "Europe & Central Asia".into(),
        income_group: Some("High income".into()),
        table_name: Some("France".into()),
    };
    upsert_countries(&pool, &config.countries_collection, &[france.clone()], 10)
        .await
        .unwrap();

    france.name = "French Republic".into();
    france.income_group = None;
    let summary = upsert_countries(&pool, &config.countries_collection, &[france.clone()], 10)
        .await
        .unwrap();
    assert_eq!(summary.written, 1);

    let stored: Country = sqlx::query_as("SELECT code, name, region, income_group, table_name FROM countries")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(stored, france);
}

#[tokio::test]
async fn test_failed_row_does_not_block_its_batch() {
    let (_dir, config, pool) = fresh_store().await;

    // A trigger makes one specific row fail inside the batch
    sqlx::query(
        "CREATE TRIGGER reject_atl BEFORE INSERT ON receipts
         WHEN NEW.code = 'ATL'
         BEGIN SELECT RAISE(ABORT, 'rejected'); END",
    )
    .execute(&pool)
    .await
    .unwrap();

    let rows = vec![
        receipt("FRA", 2019, 1e9),
        receipt("ATL", 2019, 2e9),
        receipt("ESP", 2019, 3e9),
        receipt("ITA", 2019, 4e9),
    ];
    let summary = upsert_receipts(&pool, &config.receipts_collection, &rows, 2)
        .await
        .unwrap();

    assert_eq!(summary.written, 3);
    assert_eq!(summary.failed, 1);
    assert_eq!(count(&pool, "receipts").await, 3);
}

#[tokio::test]
async fn test_stored_totals_from_raw_receipts() {
    let (_dir, config, pool) = fresh_store().await;
    assert_eq!(latest_stored_year(&pool, &config.receipts_collection).await.unwrap(), None);

    upsert_receipts(
        &pool,
        &config.receipts_collection,
        &[
            receipt("FRA", 2019, 1.004e9),
            receipt("ESP", 2019, 1.004e9),
            receipt("FRA", 2020, 0.5e9),
        ],
        DEFAULT_BATCH_SIZE,
    )
    .await
    .unwrap();

    let totals = stored_totals(&pool, &config.receipts_collection).await.unwrap();
    let pairs: Vec<(i32, f64)> = totals.iter().map(|t| (t.year, t.total_usd_billions)).collect();
    // 2.008 from raw, not 1.0 + 1.0 from rounded billions
    assert_eq!(pairs, vec![(2019, 2.01), (2020, 0.5)]);
    assert_eq!(latest_stored_year(&pool, &config.receipts_collection).await.unwrap(), Some(2020));
}
