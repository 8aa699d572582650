//! Error types for tourism-etl

use std::path::PathBuf;
use thiserror::Error;

/// Pipeline error type
#[derive(Error, Debug)]
pub enum EtlError {
    /// One or both source files are absent (fatal)
    #[error(
        "Expected source data at {} and {}. Download or copy both files before running.",
        receipts.display(),
        metadata.display()
    )]
    MissingSource { receipts: PathBuf, metadata: PathBuf },

    /// A required column is absent from a source header
    #[error("Missing column {column:?} in {file}")]
    MissingColumn { column: String, file: &'static str },

    /// No year column holds any value, so there is no reference year (fatal)
    #[error("Could not find any year columns with data")]
    NoYearData,

    /// Malformed CSV
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Chart rendering failed
    #[error("Chart error: {0}")]
    Chart(String),

    /// Store query or write errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Store setup errors
    #[error(transparent)]
    Store(#[from] tourism_common::Error),
}

/// Convenience Result type using tourism-etl Error
pub type Result<T> = std::result::Result<T, EtlError>;
