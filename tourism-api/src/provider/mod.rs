//! Dashboard data providers
//!
//! Both data modes satisfy [`DashboardProvider`]. The provider is chosen once
//! at startup and shared by every request.

use async_trait::async_trait;
use std::sync::Arc;
use tourism_common::db::{Receipt, YearTotal};

use crate::config::DataMode;
use crate::error::ApiResult;

pub mod mock;
pub mod store;

pub use mock::MockProvider;
pub use store::StoreProvider;

/// Region value meaning "no restriction"
pub const ALL_REGIONS: &str = "All";

/// Region restriction for top-N, totals and table queries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionFilter {
    All,
    Only(String),
}

impl RegionFilter {
    pub fn parse(region: Option<&str>) -> Self {
        match region {
            None | Some(ALL_REGIONS) => RegionFilter::All,
            Some(name) => RegionFilter::Only(name.to_string()),
        }
    }

    pub fn matches(&self, region: &str) -> bool {
        match self {
            RegionFilter::All => true,
            RegionFilter::Only(name) => name == region,
        }
    }
}

/// Capabilities the dashboard needs from a data source
#[async_trait]
pub trait DashboardProvider: Send + Sync {
    /// Label reported as `source`
    fn source(&self) -> &'static str;

    /// Fail with [`ApiError::ServiceUnavailable`] if the source cannot answer
    async fn check(&self) -> ApiResult<()>;

    /// Whether `/health` reports the latest year
    fn reports_latest_year(&self) -> bool;

    /// Most recent year with data, `None` when empty
    async fn latest_year(&self) -> ApiResult<Option<i32>>;

    /// Every year with data, ascending
    async fn years(&self) -> ApiResult<Vec<i32>>;

    /// Every region, with [`ALL_REGIONS`] first
    async fn regions(&self) -> ApiResult<Vec<String>>;

    /// Largest receipts for (year, region), descending
    async fn top_countries(
        &self,
        year: i32,
        region: &RegionFilter,
        limit: i64,
    ) -> ApiResult<Vec<Receipt>>;

    /// Totals per year in billions for a region, ascending by year
    async fn totals_by_year(&self, region: &RegionFilter) -> ApiResult<Vec<YearTotal>>;

    /// Rows for (year, region), descending by receipts, at most `cap`
    async fn table_rows(&self, year: i32, region: &RegionFilter, cap: i64)
        -> ApiResult<Vec<Receipt>>;
}

/// Shared provider handle
pub type SharedProvider = Arc<dyn DashboardProvider>;

/// Build the provider for the configured mode
pub fn from_mode(mode: &DataMode) -> anyhow::Result<SharedProvider> {
    let provider: SharedProvider = match mode {
        DataMode::Mock { payload_file } => Arc::new(MockProvider::load(payload_file.as_deref())?),
        DataMode::Live(store) => Arc::new(StoreProvider::connect(store)),
    };
    Ok(provider)
}
