//! Portfolio construction and valuation for Lectura.
//!
//! This crate turns per-quarter metric scores into simulated portfolio values:
//! - Quantile bucketing of each metric's scores, quarter by quarter
//! - Coverage filtering of companies without a resolvable price
//! - Rolling simulation of equal-weight and market-cap weighted portfolios
//!   with a tax drag on every rebalance
//! - Benchmark comparison, performance summaries and tabular exports
//!
//! # Example
//!
//! ```rust,ignore
//! use lectura_portfolio::Backtest;
//! use lectura_traits::BacktestSettings;
//!
//! let settings = BacktestSettings::default();
//! let report = Backtest::new(&settings, &resolver).run(&scores, Some(&index))?;
//! for summary in &report.summaries {
//!     println!("{} {}: {:.2}%", summary.metric, summary.bucket, summary.total_return * 100.0);
//! }
//! ```

pub mod benchmark;
pub mod book;
pub mod bucket;
pub mod coverage;
pub mod dump;
pub mod pipeline;
pub mod simulator;
pub mod summary;

// Re-export main types
pub use benchmark::{Benchmark, RelativePerformance, compare_to_benchmark};
pub use book::{BucketBook, CellKey};
pub use bucket::QuantileBucketer;
pub use coverage::{CoverageFilter, CoverageReport};
pub use dump::{ValueRow, values_json, write_buckets, write_values};
pub use pipeline::{Backtest, BacktestReport};
pub use simulator::{PortfolioSimulator, Simulation, SimulatorConfig, Track, TrackStep};
pub use summary::{TrackSummary, summarize};
