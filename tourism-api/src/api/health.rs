//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::error::ApiResult;
use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub source: &'static str,
    /// Omitted in mock mode, `null` when the store holds no receipts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_year: Option<Option<i32>>,
}

/// GET /health
///
/// Live mode pings the store first; an unreachable store is a 503.
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let provider = state.provider.as_ref();
    provider.check().await?;

    let latest_year = if provider.reports_latest_year() {
        Some(provider.latest_year().await?)
    } else {
        None
    };

    Ok(Json(HealthResponse {
        status: "ok",
        source: provider.source(),
        latest_year,
    }))
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
