//! Store configuration and location resolution
//!
//! The store is an embedded SQLite database. Its location is given as a
//! directory (or `sqlite://<dir>` URI); the database file inside it is named
//! after the database name, and each "collection" is a table.

use crate::{Error, Result};
use clap::Args;
use std::path::PathBuf;

/// Default database name
pub const DEFAULT_DB_NAME: &str = "tourism";

/// Default table holding one row per country
pub const DEFAULT_COUNTRIES_COLLECTION: &str = "countries";

/// Default table holding one row per country-year
pub const DEFAULT_RECEIPTS_COLLECTION: &str = "receipts";

/// Store options shared by every binary
///
/// Flattened into each binary's `clap` parser so the same flags and
/// environment variables work everywhere.
#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
    /// Store location: a directory or a `sqlite://<dir>` URI
    #[arg(long = "store-uri", env = "TOURISM_STORE_URI")]
    pub store_uri: Option<String>,

    /// Database name (file `<store>/<name>.db`)
    #[arg(long, env = "DB_NAME", default_value = DEFAULT_DB_NAME)]
    pub db_name: String,

    /// Countries collection (table) name
    #[arg(long, env = "COUNTRIES_COLLECTION", default_value = DEFAULT_COUNTRIES_COLLECTION)]
    pub countries_collection: String,

    /// Receipts collection (table) name
    #[arg(long, env = "RECEIPTS_COLLECTION", default_value = DEFAULT_RECEIPTS_COLLECTION)]
    pub receipts_collection: String,
}

impl StoreArgs {
    /// Build the store configuration; the store URI is mandatory here
    pub fn into_config(self) -> Result<StoreConfig> {
        let uri = self
            .store_uri
            .filter(|uri| !uri.trim().is_empty())
            .ok_or_else(|| {
                Error::Config(
                    "TOURISM_STORE_URI is required (set it in the environment or pass --store-uri)"
                        .to_string(),
                )
            })?;

        StoreConfig::new(
            &uri,
            self.db_name,
            self.countries_collection,
            self.receipts_collection,
        )
    }
}

/// Resolved store configuration, built once at startup and passed by reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Directory holding the database file
    pub root: PathBuf,
    pub db_name: String,
    pub countries_collection: String,
    pub receipts_collection: String,
}

impl StoreConfig {
    /// Create and validate a store configuration
    pub fn new(
        uri: &str,
        db_name: impl Into<String>,
        countries_collection: impl Into<String>,
        receipts_collection: impl Into<String>,
    ) -> Result<Self> {
        let config = Self {
            root: parse_store_uri(uri)?,
            db_name: db_name.into(),
            countries_collection: countries_collection.into(),
            receipts_collection: receipts_collection.into(),
        };

        for (label, name) in [
            ("database name", &config.db_name),
            ("countries collection", &config.countries_collection),
            ("receipts collection", &config.receipts_collection),
        ] {
            if !is_valid_identifier(name) {
                return Err(Error::Config(format!("Invalid {}: {:?}", label, name)));
            }
        }

        if config.countries_collection == config.receipts_collection {
            return Err(Error::Config(format!(
                "Countries and receipts collections must differ (both {:?})",
                config.countries_collection
            )));
        }

        Ok(config)
    }

    /// Configuration with default database and collection names
    pub fn with_defaults(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            db_name: DEFAULT_DB_NAME.to_string(),
            countries_collection: DEFAULT_COUNTRIES_COLLECTION.to_string(),
            receipts_collection: DEFAULT_RECEIPTS_COLLECTION.to_string(),
        }
    }

    /// Path of the SQLite database file
    pub fn database_path(&self) -> PathBuf {
        self.root.join(format!("{}.db", self.db_name))
    }
}

/// Turn a store URI into its directory path
///
/// Accepts `sqlite://<dir>` or a bare directory path.
pub fn parse_store_uri(uri: &str) -> Result<PathBuf> {
    let trimmed = uri.trim();
    let path = trimmed.strip_prefix("sqlite://").unwrap_or(trimmed);

    if path.is_empty() {
        return Err(Error::Config(format!("Store URI has no location: {:?}", uri)));
    }

    Ok(PathBuf::from(path))
}

/// Names interpolated into SQL must be plain identifiers
pub fn is_valid_identifier(name: &str) -> bool {
    !name.is_empty()
        && name.len() < 64
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit())
}
