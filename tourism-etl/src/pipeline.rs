//! End-to-end runs
//!
//! Sources are loaded and cleaned before the store is touched, so an input
//! error never leaves a half-reset store behind.

use crate::charts::write_charts;
use crate::clean::{clean_and_join, JoinedTable};
use crate::loader::{load_sources, SourcePaths};
use crate::persist::{upsert_countries, upsert_receipts, UpsertSummary, DEFAULT_BATCH_SIZE};
use crate::query::{latest_stored_year, top_stored};
use crate::report::write_summary_files;
use crate::reshape::{to_countries, to_receipts};
use crate::summary::{global_totals, latest_year, top_countries, TopCountry, TOP_COUNTRIES_LIMIT};
use crate::Result;
use std::path::{Path, PathBuf};
use tourism_common::db::{ensure_schema, open_store, reset_store, Receipt, YearTotal};
use tourism_common::StoreConfig;
use tracing::{info, warn};

/// Load and clean both sources from a data directory
pub fn load_joined(data_dir: &Path) -> Result<JoinedTable> {
    let (raw, meta) = load_sources(&SourcePaths::in_dir(data_dir))?;
    Ok(clean_and_join(&raw, &meta))
}

/// Result of a local report run
#[derive(Debug, Clone)]
pub struct ReportOutcome {
    pub latest_year: i32,
    pub top_countries: Vec<TopCountry>,
    pub global_totals: Vec<YearTotal>,
    pub top_countries_path: PathBuf,
    pub global_totals_path: PathBuf,
    pub top_countries_chart: PathBuf,
    pub global_totals_chart: PathBuf,
}

/// Build the summary tables, then write them and their charts to `output_dir`
pub fn run_report(data_dir: &Path, output_dir: &Path) -> Result<ReportOutcome> {
    let joined = load_joined(data_dir)?;

    let year = latest_year(&joined)?;
    info!("Latest year with data: {}", year);

    let top = top_countries(&joined, year, TOP_COUNTRIES_LIMIT);
    let totals = global_totals(&joined, year);
    let (top_path, totals_path) = write_summary_files(output_dir, year, &top, &totals)?;
    let (top_chart, totals_chart) = write_charts(output_dir, year, &top, &totals)?;

    Ok(ReportOutcome {
        latest_year: year,
        top_countries: top,
        global_totals: totals,
        top_countries_path: top_path,
        global_totals_path: totals_path,
        top_countries_chart: top_chart,
        global_totals_chart: totals_chart,
    })
}

/// Options for a store load
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Drop both collections before loading. Irreversible.
    pub reset: bool,
    /// Load only the first N receipts
    pub limit: Option<usize>,
    pub batch_size: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            reset: false,
            limit: None,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// Result of a store load
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub countries: UpsertSummary,
    pub receipts: UpsertSummary,
    /// Latest year present in the store after loading
    pub latest_year: Option<i32>,
    /// Top 5 stored earners for that year
    pub top_earners: Vec<Receipt>,
}

/// Clean, reshape and upsert the sources into the store
pub async fn run_load(
    data_dir: &Path,
    store: &StoreConfig,
    options: &LoadOptions,
) -> Result<LoadOutcome> {
    let joined = load_joined(data_dir)?;
    let countries = to_countries(&joined);
    let mut receipts = to_receipts(&joined);

    if let Some(limit) = options.limit.filter(|&n| n > 0) {
        receipts.truncate(limit);
        info!("Receipts capped at {} rows", limit);
    }

    info!(
        "Prepared {} countries and {} receipts",
        countries.len(),
        receipts.len()
    );

    let pool = open_store(store).await?;

    if options.reset {
        warn!(
            "Resetting {}.{} and {}.{}",
            store.db_name, store.countries_collection, store.db_name, store.receipts_collection
        );
        reset_store(&pool, store).await?;
    }

    ensure_schema(&pool, store).await?;

    let countries_summary = upsert_countries(
        &pool,
        &store.countries_collection,
        &countries,
        options.batch_size,
    )
    .await?;
    let receipts_summary = upsert_receipts(
        &pool,
        &store.receipts_collection,
        &receipts,
        options.batch_size,
    )
    .await?;

    let latest_year = latest_stored_year(&pool, &store.receipts_collection).await?;
    let top_earners = match latest_year {
        Some(year) => {
            top_stored(
                &pool,
                &store.receipts_collection,
                year,
                TOP_COUNTRIES_LIMIT as i64,
            )
            .await?
        }
        None => Vec::new(),
    };

    pool.close().await;

    Ok(LoadOutcome {
        countries: countries_summary,
        receipts: receipts_summary,
        latest_year,
        top_earners,
    })
}
