//! Rolling portfolio simulation.
//!
//! Every (metric, bucket) pair is an independent track. Along a track the
//! quarters are strictly sequential: the value at quarter `Q` comes from the
//! holdings bought at `Q - 1` marked at `Q`'s prices, then reinvested in `Q`'s
//! membership. Tracks share nothing mutable and run in parallel.

use lectura_traits::{
    BacktestSettings, BucketLabel, Holding, LecturaError, MetricName, PortfolioState,
    PriceQuote, PriceResolver, Quarter, Result,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{BucketBook, CellKey};

/// Simulation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Value every track starts with at the seed quarter
    pub initial_capital: f64,
    /// Tax drag charged on every rollover
    pub tax_rate: f64,
    /// Relative tolerance of the allocation check
    pub tolerance: f64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            initial_capital: 1_000_000.0,
            tax_rate: 0.005,
            tolerance: 1e-4,
        }
    }
}

impl From<&BacktestSettings> for SimulatorConfig {
    fn from(settings: &BacktestSettings) -> Self {
        Self {
            initial_capital: settings.initial_capital,
            tax_rate: settings.tax_rate,
            tolerance: settings.tolerance,
        }
    }
}

/// One quarter of a track: its value and the holdings bought with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackStep {
    /// Quarter of the step
    pub quarter: Quarter,
    /// Portfolio value at the quarter
    pub state: PortfolioState,
    /// Holdings bought at the quarter, share counts populated
    pub holdings: Vec<Holding>,
}

/// The full history of one (metric, bucket) portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Metric the bucket was ranked on
    pub metric: MetricName,
    /// Bucket label
    pub bucket: BucketLabel,
    /// Steps in ascending quarter order
    pub steps: Vec<TrackStep>,
}

impl Track {
    /// Step at `quarter`, if the track covers it.
    pub fn step(&self, quarter: Quarter) -> Option<&TrackStep> {
        self.steps.iter().find(|s| s.quarter == quarter)
    }

    /// Canonical (market-cap weighted, pre-tax) value at each quarter.
    pub fn values(&self) -> Vec<f64> {
        self.steps.iter().map(|s| s.state.raw_value).collect()
    }

    /// Value at the last simulated quarter.
    pub fn final_value(&self) -> Option<f64> {
        self.steps.last().map(|s| s.state.raw_value)
    }
}

/// Result of a simulation run, tracks in metric then label order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Simulation {
    /// Simulated quarters, ascending
    pub quarters: Vec<Quarter>,
    /// One track per (metric, bucket)
    pub tracks: Vec<Track>,
}

impl Simulation {
    /// Track of one (metric, bucket) pair.
    pub fn track(&self, metric: MetricName, bucket: BucketLabel) -> Option<&Track> {
        self.tracks
            .iter()
            .find(|t| t.metric == metric && t.bucket == bucket)
    }

    /// Portfolio state of one cell.
    pub fn state(&self, key: CellKey) -> Option<PortfolioState> {
        self.track(key.metric, key.bucket)?
            .step(key.quarter)
            .map(|s| s.state)
    }
}

/// Quarter-by-quarter portfolio simulator.
#[derive(Debug, Clone, Default)]
pub struct PortfolioSimulator {
    config: SimulatorConfig,
}

impl PortfolioSimulator {
    /// Create a simulator with the given configuration.
    pub const fn new(config: SimulatorConfig) -> Self {
        Self { config }
    }

    /// The simulator configuration.
    pub const fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Simulates every track of `book`.
    ///
    /// The first quarter of the book is the seed quarter.
    ///
    /// # Errors
    ///
    /// Returns [`LecturaError::NoPricedMembers`] when a cell has no priced
    /// member at its quarter, and aborts on the first failing track.
    pub fn run<R>(&self, book: &BucketBook, resolver: &R) -> Result<Simulation>
    where
        R: PriceResolver + ?Sized,
    {
        let tracks = book.tracks();
        info!(
            tracks = tracks.len(),
            quarters = book.quarters().len(),
            "Simulating portfolios"
        );

        let tracks = tracks
            .par_iter()
            .map(|&(metric, bucket)| self.run_track(book, resolver, metric, bucket))
            .collect::<Result<Vec<_>>>()?;

        Ok(Simulation {
            quarters: book.quarters().to_vec(),
            tracks,
        })
    }

    /// Simulates a single (metric, bucket) track.
    pub fn run_track<R>(
        &self,
        book: &BucketBook,
        resolver: &R,
        metric: MetricName,
        bucket: BucketLabel,
    ) -> Result<Track>
    where
        R: PriceResolver + ?Sized,
    {
        let mut steps: Vec<TrackStep> = Vec::with_capacity(book.quarters().len());

        for &quarter in book.quarters() {
            let key = CellKey::new(metric, bucket, quarter);
            let state = match steps.last() {
                None => PortfolioState::seed(self.config.initial_capital, self.config.tax_rate),
                Some(previous) => self.liquidate(key, &previous.holdings, resolver),
            };
            let holdings = self.allocate(key, book.cell(key), state.post_tax_value, resolver)?;
            steps.push(TrackStep {
                quarter,
                state,
                holdings,
            });
        }

        debug!(%metric, %bucket, steps = steps.len(), "Track simulated");
        Ok(Track {
            metric,
            bucket,
            steps,
        })
    }

    /// Marks the previous quarter's holdings at `key.quarter` prices.
    fn liquidate<R>(&self, key: CellKey, previous: &[Holding], resolver: &R) -> PortfolioState
    where
        R: PriceResolver + ?Sized,
    {
        let mut unbalanced_value = 0.0;
        let mut balanced_value = 0.0;
        for holding in previous {
            match resolver.resolve(holding.company, key.quarter) {
                Some(quote) => {
                    unbalanced_value += quote.share_price * holding.shares_unbalanced;
                    balanced_value += quote.share_price * holding.shares_balanced;
                }
                None => {
                    if holding.shares_balanced > 0.0 || holding.shares_unbalanced > 0.0 {
                        warn!(
                            cell = %key,
                            company = %holding.company,
                            "Unresolved price at liquidation, holding valued at 0"
                        );
                    }
                }
            }
        }
        PortfolioState::rollover(balanced_value, unbalanced_value, self.config.tax_rate)
    }

    /// Splits `value` over the cell's members, equal-dollar and by market cap.
    fn allocate<R>(
        &self,
        key: CellKey,
        members: &[Holding],
        value: f64,
        resolver: &R,
    ) -> Result<Vec<Holding>>
    where
        R: PriceResolver + ?Sized,
    {
        let quotes: Vec<Option<PriceQuote>> = members
            .iter()
            .map(|h| resolver.resolve(h.company, key.quarter))
            .collect();

        let priced = quotes.iter().flatten().count();
        if priced == 0 {
            return Err(LecturaError::NoPricedMembers {
                metric: key.metric,
                bucket: key.bucket,
                quarter: key.quarter,
            });
        }
        if priced < members.len() {
            warn!(
                cell = %key,
                unpriced = members.len() - priced,
                "Members without price get no shares"
            );
        }

        let total_market_cap: f64 = quotes.iter().flatten().map(|q| q.market_cap).sum();
        if !(total_market_cap.is_finite() && total_market_cap > 0.0) {
            return Err(LecturaError::InsufficientData(format!(
                "{key}: total market cap of priced members is {total_market_cap}"
            )));
        }

        let per_member = value / priced as f64;
        let holdings: Vec<Holding> = members
            .iter()
            .zip(&quotes)
            .map(|(member, quote)| match quote {
                Some(q) => Holding {
                    shares_unbalanced: per_member / q.share_price,
                    shares_balanced: value * q.market_cap / q.share_price / total_market_cap,
                    ..*member
                },
                None => Holding::new(member.company, member.score),
            })
            .collect();

        let invested: f64 = holdings
            .iter()
            .zip(&quotes)
            .filter_map(|(h, q)| q.map(|q| h.shares_balanced * q.share_price))
            .sum();
        if (invested - value).abs() > self.config.tolerance * value.abs().max(1.0) {
            return Err(LecturaError::InvalidData(format!(
                "{key}: allocated {invested} instead of {value}"
            )));
        }

        Ok(holdings)
    }
}
