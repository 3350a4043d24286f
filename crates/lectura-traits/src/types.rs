//! Common types used throughout the Lectura backtester.
//!
//! This module defines the identifiers, per-company records and per-portfolio
//! state that flow between the bucketing, coverage and simulation stages.

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

// Re-export date type from chrono
pub use chrono::NaiveDate as Date;

/// Days between 0001-01-01 (CE) and 1970-01-01, used to decode polars dates.
pub const CE_TO_UNIX_EPOCH_DAYS: i32 = 719_163;

/// Regulatory filer identifier (SEC Central Index Key).
///
/// Stable across quarters; the backtester never interprets its value.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, From, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CompanyId(pub u64);

/// Exchange ticker a company trades under.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Display, From, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Ticker(String);

impl Ticker {
    /// Creates a ticker, trimming surrounding whitespace and upper-casing it.
    pub fn new(symbol: impl AsRef<str>) -> Self {
        Self(symbol.as_ref().trim().to_uppercase())
    }

    /// The ticker as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Ticker {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One company's metric value for one quarter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    /// Filer the score belongs to.
    pub company: CompanyId,
    /// Metric value; higher means the filing changed more.
    pub score: f64,
}

impl ScoreEntry {
    /// Creates a score entry.
    pub const fn new(company: CompanyId, score: f64) -> Self {
        Self { company, score }
    }
}

/// A bucket member's simulation state for one quarter.
///
/// Share counts stay at zero until the simulator allocates the bucket's value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    /// Filer held.
    pub company: CompanyId,
    /// Score that placed the company in its bucket.
    pub score: f64,
    /// Shares under equal-dollar weighting.
    pub shares_unbalanced: f64,
    /// Shares under market-cap weighting.
    pub shares_balanced: f64,
}

impl Holding {
    /// A fresh holding with no shares allocated yet.
    pub const fn new(company: CompanyId, score: f64) -> Self {
        Self {
            company,
            score,
            shares_unbalanced: 0.0,
            shares_balanced: 0.0,
        }
    }
}

impl From<ScoreEntry> for Holding {
    fn from(entry: ScoreEntry) -> Self {
        Self::new(entry.company, entry.score)
    }
}

/// Value of one (metric, bucket) portfolio at one quarter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortfolioState {
    /// Market-cap weighted liquidation value, before tax.
    pub raw_value: f64,
    /// Tax drag applied when the portfolio is rebalanced.
    pub tax_rate: f64,
    /// Value reinvested into the quarter's new membership.
    pub post_tax_value: f64,
    /// Equal-weight liquidation value; informational only.
    pub equal_weight_value: f64,
}

impl PortfolioState {
    /// State of a freshly seeded portfolio. No tax is charged on the initial purchase.
    pub const fn seed(initial_capital: f64, tax_rate: f64) -> Self {
        Self {
            raw_value: initial_capital,
            tax_rate,
            post_tax_value: initial_capital,
            equal_weight_value: initial_capital,
        }
    }

    /// State after liquidating the previous quarter's holdings.
    pub fn rollover(balanced_value: f64, equal_weight_value: f64, tax_rate: f64) -> Self {
        Self {
            raw_value: balanced_value,
            tax_rate,
            post_tax_value: balanced_value * (1.0 - tax_rate),
            equal_weight_value,
        }
    }
}

/// A resolved trading-day quote for a company at a quarter.
///
/// Absence of a quote is expressed as `Option::None` by resolvers, never by a
/// sentinel price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// Trading day the quote was taken from.
    pub date: Date,
    /// Share price on that day.
    pub share_price: f64,
    /// Market capitalization on that day.
    pub market_cap: f64,
}
