//! Dashboard endpoint
//!
//! Resolves year and region against the provider, then gathers the top-N,
//! totals series and table rows in one payload.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tourism_common::db::{Receipt, YearTotal};
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::provider::{DashboardProvider, RegionFilter};
use crate::AppState;

/// Top countries returned when no limit is given
pub const DEFAULT_LIMIT: i64 = 5;

/// Accepted range for `limit`
pub const MIN_LIMIT: i64 = 1;
pub const MAX_LIMIT: i64 = 50;

/// Cap on table rows in one dashboard
pub const TABLE_ROWS_CAP: i64 = 500;

/// Query parameters for GET /dashboard
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub year: Option<i32>,
    pub region: Option<String>,
    pub limit: Option<i64>,
}

/// Dashboard payload
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub source: &'static str,
    pub latest_year: i32,
    pub year: i32,
    pub years: Vec<i32>,
    pub regions: Vec<String>,
    pub top_countries: Vec<Receipt>,
    pub totals_by_year: Vec<YearTotal>,
    pub table_rows: Vec<Receipt>,
}

/// Out-of-range limits are rejected, never clamped
pub fn validate_limit(limit: Option<i64>) -> ApiResult<i64> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT);
    if !(MIN_LIMIT..=MAX_LIMIT).contains(&limit) {
        return Err(ApiError::BadRequest(format!(
            "limit must be between {} and {} (got {})",
            MIN_LIMIT, MAX_LIMIT, limit
        )));
    }
    Ok(limit)
}

/// Requested year, or the latest; must be one of `years`
pub fn resolve_year(requested: Option<i32>, latest: i32, years: &[i32]) -> ApiResult<i32> {
    let target = requested.unwrap_or(latest);
    if !years.contains(&target) {
        return Err(ApiError::BadRequest(format!(
            "Year {} not found in data (available: {:?}).",
            target, years
        )));
    }
    Ok(target)
}

/// Assemble the dashboard from any provider
pub async fn build_dashboard(
    provider: &dyn DashboardProvider,
    query: &DashboardQuery,
) -> ApiResult<DashboardResponse> {
    let limit = validate_limit(query.limit)?;
    provider.check().await?;

    let years = provider.years().await?;
    let Some(&last) = years.last() else {
        return Err(ApiError::NotFound(
            "No receipt data found. Load data with `tourism-etl load`.".to_string(),
        ));
    };
    let latest_year = provider.latest_year().await?.unwrap_or(last);
    let year = resolve_year(query.year, latest_year, &years)?;
    let region = RegionFilter::parse(query.region.as_deref());

    debug!("Dashboard: year={} region={:?} limit={}", year, region, limit);

    let regions = provider.regions().await?;
    let top_countries = provider.top_countries(year, &region, limit).await?;
    let totals_by_year = provider.totals_by_year(&region).await?;
    let table_rows = provider.table_rows(year, &region, TABLE_ROWS_CAP).await?;

    Ok(DashboardResponse {
        source: provider.source(),
        latest_year,
        year,
        years,
        regions,
        top_countries,
        totals_by_year,
        table_rows,
    })
}

/// GET /dashboard?year=&region=&limit=
///
/// Unparseable parameters are reported in the JSON error envelope.
pub async fn get_dashboard(
    State(state): State<AppState>,
    query: Result<Query<DashboardQuery>, QueryRejection>,
) -> ApiResult<Json<DashboardResponse>> {
    let Query(query) = query.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let dashboard = build_dashboard(state.provider.as_ref(), &query).await?;
    Ok(Json(dashboard))
}

/// Build dashboard routes
pub fn dashboard_routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(get_dashboard))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_limit_bounds() {
        assert_eq!(validate_limit(None).unwrap(), DEFAULT_LIMIT);
        assert_eq!(validate_limit(Some(1)).unwrap(), 1);
        assert_eq!(validate_limit(Some(50)).unwrap(), 50);
        assert!(matches!(validate_limit(Some(0)), Err(ApiError::BadRequest(_))));
        assert!(matches!(validate_limit(Some(51)), Err(ApiError::BadRequest(_))));
        assert!(matches!(validate_limit(Some(-3)), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_resolve_year_lists_available_years() {
        let years = [2019, 2020, 2021];
        assert_eq!(resolve_year(None, 2021, &years).unwrap(), 2021);
        assert_eq!(resolve_year(Some(2019), 2021, &years).unwrap(), 2019);

        let message = resolve_year(Some(9999), 2021, &years)
            .unwrap_err()
            .to_string();
        assert!(message.contains("9999"));
        assert!(message.contains("[2019, 2020, 2021]"));
    }
}
