//! Common error types for the tourism workspace

use thiserror::Error;

/// Common result type for store and configuration operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the loader and the API
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
