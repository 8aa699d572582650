//! HTTP API handlers for tourism-api

pub mod dashboard;
pub mod health;

pub use dashboard::{dashboard_routes, get_dashboard};
pub use health::{health_check, health_routes};
