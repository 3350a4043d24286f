//! Error types for the Lectura backtester.
//!
//! Every fatal condition of a run is represented here. Recoverable conditions
//! (a single company without a price in a single quarter) never become errors;
//! they surface as `None` from a [`PriceResolver`](crate::PriceResolver).

use thiserror::Error;

use crate::{BucketLabel, MetricName, Quarter};

/// The main error type for Lectura operations.
#[derive(Debug, Error)]
pub enum LecturaError {
    /// Invalid run configuration, or a partition that does not match it.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A bucket lost every member while filtering for price coverage.
    #[error("Coverage exhausted: no priced company left in {metric}/{bucket} at {quarter}")]
    CoverageExhausted {
        /// Metric of the emptied cell.
        metric: MetricName,
        /// Bucket of the emptied cell.
        bucket: BucketLabel,
        /// Quarter of the emptied cell.
        quarter: Quarter,
    },

    /// A bucket had no priced member when its value was redistributed.
    #[error("No priced members left in {metric}/{bucket} at {quarter}")]
    NoPricedMembers {
        /// Metric of the track.
        metric: MetricName,
        /// Bucket of the track.
        bucket: BucketLabel,
        /// Quarter being rebalanced.
        quarter: Quarter,
    },

    /// Error due to invalid or malformed data.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A quarter could not be parsed or lies outside the calendar.
    #[error("Invalid quarter: {0}")]
    InvalidQuarter(String),

    /// Error when data is insufficient for the requested operation.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Error when a required column is missing from the data.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// Error from Polars operations.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Generic error for other cases.
    #[error("Error: {0}")]
    Other(String),
}

impl LecturaError {
    /// Shorthand for a [`LecturaError::Configuration`] error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Returns true if the error aborts a run because of missing price coverage.
    pub const fn is_coverage_failure(&self) -> bool {
        matches!(
            self,
            Self::CoverageExhausted { .. } | Self::NoPricedMembers { .. }
        )
    }
}

impl From<String> for LecturaError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for LecturaError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

/// A specialized Result type for Lectura operations.
pub type Result<T> = std::result::Result<T, LecturaError>;
