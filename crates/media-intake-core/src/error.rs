use std::path::PathBuf;
use thiserror::Error;

use crate::validation::ValidationReport;

pub type Result<T> = core::result::Result<T, Error>;

/// Custom error types for the media-intake library
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A configured folder does not exist
    #[error("Directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    /// Invalid configuration error
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// The catalog could not be queried or answered with garbage
    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),

    /// Malformed names and/or unresolved barcodes in the batch
    #[error("{0}")]
    ValidationFailed(ValidationReport),

    /// Nothing to process
    #[error("The source folder is empty: {0}")]
    SourceEmpty(PathBuf),

    /// Names that would be overwritten in the destination
    #[error("The destination folder already contains: {}", .0.join(", "))]
    DestinationNotEmpty(Vec<String>),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            Error::CatalogUnavailable(format!("catalog answered with status {}", status))
        } else if err.is_decode() {
            Error::CatalogUnavailable(format!("unexpected response body: {}", err))
        } else {
            Error::CatalogUnavailable(err.to_string())
        }
    }
}
