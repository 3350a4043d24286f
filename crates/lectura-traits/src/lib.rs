#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/lectura/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core definitions for the Lectura filing-change backtester.
//!
//! This crate provides the types shared by the data adapters and the
//! portfolio engine: identifiers, quarters, metrics, bucket labels, holdings,
//! portfolio state, run settings and the price resolution seam.

/// The version of the lectura-traits crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Module declarations
pub mod config;
pub mod error;
pub mod metric;
pub mod quarter;
pub mod resolver;
pub mod types;

// Re-exports
pub use config::{BacktestSettings, DifferentiationMode};
pub use error::{LecturaError, Result};
pub use metric::{BucketLabel, BucketScheme, MetricName};
pub use quarter::{Horizon, Quarter};
pub use resolver::PriceResolver;
pub use types::{
    CE_TO_UNIX_EPOCH_DAYS, CompanyId, Date, Holding, PortfolioState, PriceQuote, ScoreEntry,
    Ticker,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert!(VERSION.contains('.'));
    }
}
