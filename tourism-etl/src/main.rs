//! tourism-etl - tourism receipts report and store loader
//!
//! Subcommands:
//! - `report`: summary CSVs and charts for the latest year with data
//! - `load`: clean, reshape and upsert both sources into the store
//! - `query`: top earners and global totals read back from the store

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tourism_common::db::{connect_readonly, ping};
use tourism_common::StoreArgs;
use tourism_etl::persist::DEFAULT_BATCH_SIZE;
use tourism_etl::pipeline::{run_load, run_report, LoadOptions};
use tourism_etl::query::{latest_stored_year, stored_totals, top_stored};
use tourism_etl::report::{
    render_earner_lines, render_top_table, render_total_lines, render_totals_table,
};
use tourism_etl::summary::TOP_COUNTRIES_LIMIT;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for tourism-etl
#[derive(Parser, Debug)]
#[command(name = "tourism-etl")]
#[command(about = "Tourism receipts report and store loader")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write top-countries and global-totals CSVs and charts for the latest year with data
    Report {
        #[command(flatten)]
        sources: SourceArgs,

        /// Directory receiving the CSV files
        #[arg(long, env = "TOURISM_OUTPUT_DIR", default_value = "outputs")]
        output_dir: PathBuf,
    },

    /// Load countries and receipts into the store
    Load {
        #[command(flatten)]
        sources: SourceArgs,

        #[command(flatten)]
        store: StoreArgs,

        /// Drop the target collections before loading
        #[arg(long)]
        reset_collections: bool,

        /// Optional cap on number of receipts rows to load
        #[arg(long)]
        limit: Option<usize>,

        /// Rows per bulk batch
        #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
        batch_size: usize,
    },

    /// Print top earners and global totals from the store
    Query {
        #[command(flatten)]
        store: StoreArgs,
    },
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Directory holding travel_items.csv and metadata_country.csv
    #[arg(long, env = "TOURISM_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tourism_etl=info,tourism_common=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Report {
            sources,
            output_dir,
        } => {
            let outcome = run_report(&sources.data_dir, &output_dir)
                .context("Failed to build summary tables")?;

            info!(
                "Wrote {} and {}",
                outcome.top_countries_path.display(),
                outcome.global_totals_path.display()
            );
            info!(
                "Wrote {} and {}",
                outcome.top_countries_chart.display(),
                outcome.global_totals_chart.display()
            );
            println!("\nTop tourism earners (USD billions):");
            println!(
                "{}",
                render_top_table(outcome.latest_year, &outcome.top_countries)
            );
            println!("\nGlobal tourism receipts (USD billions):");
            println!("{}", render_totals_table(&outcome.global_totals));
        }

        Command::Load {
            sources,
            store,
            reset_collections,
            limit,
            batch_size,
        } => {
            let store = store.into_config().context("Invalid store configuration")?;
            let options = LoadOptions {
                reset: reset_collections,
                limit,
                batch_size,
            };

            let outcome = run_load(&sources.data_dir, &store, &options)
                .await
                .context("Load failed")?;

            println!("Countries upserted/updated: {}", outcome.countries.written);
            println!("Receipts upserted/updated: {}", outcome.receipts.written);
            if outcome.countries.failed + outcome.receipts.failed > 0 {
                println!(
                    "Failed rows: {} countries, {} receipts",
                    outcome.countries.failed, outcome.receipts.failed
                );
            }

            if let Some(year) = outcome.latest_year {
                println!("\nTop {} earners for {}:", TOP_COUNTRIES_LIMIT, year);
                println!("{}", render_earner_lines(&outcome.top_earners));
            }
        }

        Command::Query { store } => {
            let store = store.into_config().context("Invalid store configuration")?;
            let pool = connect_readonly(&store);
            ping(&pool).await.context("Store unreachable")?;

            let table = &store.receipts_collection;
            let Some(year) = latest_stored_year(&pool, table).await? else {
                anyhow::bail!("No receipts found. Load data first with `tourism-etl load`.");
            };

            let top = top_stored(&pool, table, year, TOP_COUNTRIES_LIMIT as i64).await?;
            println!("Top {} for {}:", TOP_COUNTRIES_LIMIT, year);
            println!("{}", render_earner_lines(&top));

            println!("\nGlobal totals (billions) by year:");
            println!("{}", render_total_lines(&stored_totals(&pool, table).await?));
        }
    }

    Ok(())
}
