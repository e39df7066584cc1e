//! Error types for dataset loading, configuration and export.
//!
//! The analysis core does not use these: degenerate input there yields
//! empty, zero or absent results instead of errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {0} while fetching dataset")]
    HttpStatus(u16),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid UTF-8 in output: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Item not found: {0}")]
    ItemNotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;
