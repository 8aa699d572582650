//! tourism-api library - dashboard query service
//!
//! Read path over the persisted receipts (or a static sample payload),
//! exposed as `GET /health` and `GET /dashboard`.

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod config;
pub mod error;
pub mod provider;

pub use error::{ApiError, ApiResult};
use provider::SharedProvider;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Data source chosen at startup
    pub provider: SharedProvider,
}

impl AppState {
    /// Create new application state
    pub fn new(provider: SharedProvider) -> Self {
        Self { provider }
    }
}

/// Build application router
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::dashboard_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
