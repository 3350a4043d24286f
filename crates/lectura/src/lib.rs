#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/lectura/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! # lectura
//!
//! Quantile portfolio backtests of regulatory filing-change scores.
//!
//! lectura is an umbrella crate that re-exports all lectura sub-crates for
//! convenience.
//!
//! ## Quick Start
//!
//! ```ignore
//! use lectura::data::{MarketResolver, PriceTable, ScoreBook, TickerLookup};
//! use lectura::portfolio::Backtest;
//! use lectura::{BacktestSettings, Result};
//!
//! # fn main() -> Result<()> {
//! let settings = BacktestSettings::default();
//! let scores = ScoreBook::from_path("data/scores.csv")?;
//! let lookup = TickerLookup::from_path("data/cik_ticker.csv")?;
//! let prices = PriceTable::from_path("data/prices.csv")?;
//! let resolver = MarketResolver::new(lookup, prices, settings.price_search_days);
//!
//! let report = Backtest::new(&settings, &resolver).run(&scores, None)?;
//! for summary in &report.summaries {
//!     println!("{} {}: {:.2}%", summary.metric, summary.bucket, summary.total_return * 100.0);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Organization
//!
//! - [`traits`] - Shared vocabulary ([`Quarter`], [`MetricName`], [`PriceResolver`], ...)
//! - [`data`] - Loaders for scores, prices, tickers and index levels
//! - [`portfolio`] - Bucketing, coverage filtering, simulation and reporting
//!
//! ## Pipeline
//!
//! 1. **Universe**: companies without a ticker or a price series are dropped
//! 2. **Bucketing**: each metric's scores are split into quantiles per quarter
//! 3. **Coverage**: members without a resolvable price are removed
//! 4. **Simulation**: each (metric, bucket) track is rolled forward quarter by
//!    quarter, paying tax at every rebalance
//! 5. **Reporting**: summaries, benchmark comparison and tabular exports

/// Version information for the lectura crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Core Types
// ============================================================================

/// Core definitions shared by every lectura crate.
///
/// - [`Quarter`] and [`Horizon`] - calendar quarters and the simulated span
/// - [`MetricName`], [`BucketScheme`], [`BucketLabel`] - what is ranked and how
/// - [`Holding`], [`PortfolioState`] - per-quarter portfolio contents
/// - [`PriceResolver`] - the seam through which prices are read
/// - [`BacktestSettings`] - immutable run configuration
pub mod traits {
    pub use lectura_traits::*;
}

pub use lectura_traits::{
    BacktestSettings, BucketLabel, BucketScheme, CompanyId, DifferentiationMode, Holding, Horizon,
    LecturaError, MetricName, PortfolioState, PriceResolver, Quarter, Result, ScoreEntry, Ticker,
};

// ============================================================================
// Data
// ============================================================================

/// Input tables and the price resolver.
///
/// All loaders read delimited text; [`data::PriceTable`] can also be built
/// from a polars `DataFrame` with `symbol, date, close, market_cap` columns.
pub mod data {
    pub use lectura_data::*;
}

// ============================================================================
// Portfolio
// ============================================================================

/// Portfolio construction and valuation.
///
/// [`portfolio::Backtest`] chains the whole pipeline; the individual stages
/// ([`portfolio::QuantileBucketer`], [`portfolio::CoverageFilter`],
/// [`portfolio::PortfolioSimulator`]) are usable on their own.
pub mod portfolio {
    pub use lectura_portfolio::*;
}

// ============================================================================
// Prelude
// ============================================================================

/// Prelude module for convenient imports.
///
/// ```ignore
/// use lectura::prelude::*;
/// ```
pub mod prelude {
    pub use crate::traits::*;
    pub use lectura_data::{MarketResolver, PriceTable, ScoreBook, TickerLookup};
    pub use lectura_portfolio::{Backtest, BacktestReport};
}

// ============================================================================
// Tests
// ============================================================================
