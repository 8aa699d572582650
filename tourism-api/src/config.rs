//! tourism-api configuration
//!
//! Parsed once at startup from flags or environment, then handed to the
//! provider factory and router builder.

use axum::http::HeaderValue;
use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use tourism_common::{Error, Result, StoreArgs, StoreConfig};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

/// Command-line arguments for tourism-api
#[derive(Parser, Debug)]
#[command(name = "tourism-api")]
#[command(about = "Tourism receipts dashboard API")]
#[command(version)]
pub struct ApiArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Serve the bundled sample payload instead of the store ("true" to enable)
    #[arg(long, env = "USE_MOCK_DATA")]
    pub use_mock_data: Option<String>,

    /// Mock payload override
    #[arg(long, env = "MOCK_DATA_FILE")]
    pub mock_data_file: Option<PathBuf>,

    /// Allowed CORS origins, comma separated; `*` allows any
    #[arg(long, env = "ALLOWED_ORIGINS", default_value = "*")]
    pub allowed_origins: String,

    /// Address to bind
    #[arg(long, env = "TOURISM_API_HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "TOURISM_API_PORT", default_value = "8000")]
    pub port: u16,
}

/// Where dashboard data comes from
#[derive(Debug, Clone, PartialEq)]
pub enum DataMode {
    /// Static payload; `None` means the bundled sample
    Mock { payload_file: Option<PathBuf> },
    /// Read-only queries against the store
    Live(StoreConfig),
}

/// Resolved API configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub mode: DataMode,
    pub allowed_origins: Vec<String>,
    pub bind_addr: SocketAddr,
}

impl ApiArgs {
    /// Resolve mode and origins; live mode without a store URI is an error
    pub fn into_config(self) -> Result<ApiConfig> {
        let mock = self
            .use_mock_data
            .as_deref()
            .map(|value| value.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let mode = if mock {
            DataMode::Mock {
                payload_file: self.mock_data_file,
            }
        } else {
            DataMode::Live(self.store.into_config().map_err(|e| match e {
                Error::Config(msg) => {
                    Error::Config(format!("{} (or set USE_MOCK_DATA=true)", msg))
                }
                other => other,
            })?)
        };

        Ok(ApiConfig {
            mode,
            allowed_origins: parse_origins(&self.allowed_origins),
            bind_addr: SocketAddr::new(self.host, self.port),
        })
    }
}

impl ApiConfig {
    /// Label reported as `source`
    pub fn source_label(&self) -> &'static str {
        match self.mode {
            DataMode::Mock { .. } => "mock",
            DataMode::Live(_) => "store",
        }
    }
}

/// Split a comma separated origin list, dropping blanks
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

/// CORS layer for the configured origins
pub fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.is_empty() {
        return Ok(base);
    }
    if origins.iter().any(|origin| origin == "*") {
        return Ok(base.allow_origin(Any));
    }

    let values = origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|_| Error::Config(format!("Invalid CORS origin: {:?}", origin)))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(base.allow_origin(AllowOrigin::list(values)))
}
