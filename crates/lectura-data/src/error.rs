//! Error types for the data adapters.

use lectura_traits::LecturaError;
use thiserror::Error;

/// Errors that can occur while loading external tables.
#[derive(Debug, Error)]
pub enum DataError {
    /// Reading the source failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A delimited file could not be read or a record could not be decoded.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A DataFrame operation failed.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// A required column is absent from a DataFrame.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// A record was readable but semantically wrong.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<DataError> for LecturaError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::Polars(e) => Self::Polars(e),
            DataError::MissingColumn(col) => Self::MissingColumn(col),
            other => Self::InvalidData(other.to_string()),
        }
    }
}
