//! Data adapters for Lectura.
//!
//! This crate loads the tables the backtester treats as external inputs and
//! turns them into the shapes the portfolio engine expects:
//!
//! - [`TickerLookup`]: CIK to ticker mapping
//! - [`PriceTable`]: per-ticker daily share prices and market caps, from CSV
//!   or from a polars `DataFrame`
//! - [`IndexSeries`]: benchmark index levels
//! - [`ScoreBook`]: per-metric, per-quarter score lists
//! - [`MarketResolver`]: the [`PriceResolver`](lectura_traits::PriceResolver)
//!   backed by the lookup and price tables
//!
//! # Usage
//!
//! ```rust,ignore
//! use lectura_data::{MarketResolver, PriceTable, ScoreBook, TickerLookup, intersect_universe};
//!
//! let mut scores = ScoreBook::from_path("scores.csv")?;
//! let mut lookup = TickerLookup::from_path("cik_ticker.csv")?;
//! let prices = PriceTable::from_path("prices.csv")?;
//!
//! let report = intersect_universe(&mut scores, &mut lookup, &prices);
//! let resolver = MarketResolver::new(lookup, prices, 7);
//! ```

mod error;
mod index;
mod lookup;
mod prices;
mod resolver;
mod scores;
mod universe;

pub use error::DataError;
pub use index::IndexSeries;
pub use lookup::TickerLookup;
pub use prices::{PricePoint, PriceTable, first_within};
pub use resolver::{DEFAULT_SEARCH_DAYS, MarketResolver};
pub use scores::ScoreBook;
pub use universe::{UniverseReport, intersect_universe};
