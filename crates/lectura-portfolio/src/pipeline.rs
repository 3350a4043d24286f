//! End-to-end backtest: bucketing, coverage, simulation and reporting.

use lectura_data::{IndexSeries, ScoreBook};
use lectura_traits::{BacktestSettings, Horizon, PriceResolver, Result};
use tracing::{info, warn};

use crate::{
    Benchmark, BucketBook, CoverageFilter, CoverageReport, PortfolioSimulator, QuantileBucketer,
    RelativePerformance, Simulation, SimulatorConfig, TrackSummary, compare_to_benchmark,
    summarize,
};

/// Everything a backtest run produces.
#[derive(Debug, Clone)]
pub struct BacktestReport {
    /// Horizon of the run
    pub horizon: Horizon,
    /// Bucket membership before coverage filtering
    pub buckets: BucketBook,
    /// Bucket membership the simulation ran on
    pub covered: BucketBook,
    /// Coverage filtering outcome
    pub coverage: CoverageReport,
    /// Simulated tracks
    pub simulation: Simulation,
    /// Benchmark track, when an index was given
    pub benchmark: Option<Benchmark>,
    /// Per-track performance statistics
    pub summaries: Vec<TrackSummary>,
    /// Per-quarter comparison with the benchmark
    pub relative: Vec<RelativePerformance>,
}

/// Runs a backtest with fixed settings against one price resolver.
#[derive(Debug)]
pub struct Backtest<'a, R: ?Sized> {
    settings: &'a BacktestSettings,
    resolver: &'a R,
}

impl<'a, R: PriceResolver + ?Sized> Backtest<'a, R> {
    /// Create a backtest.
    pub const fn new(settings: &'a BacktestSettings, resolver: &'a R) -> Self {
        Self { settings, resolver }
    }

    /// Buckets every traded metric at every simulated quarter.
    pub fn bucket(&self, scores: &ScoreBook) -> Result<BucketBook> {
        let horizon = self.settings.horizon()?;
        QuantileBucketer::new(self.settings.bucket_scheme).bucket_book(
            scores,
            self.settings.traded_metrics(),
            &horizon,
        )
    }

    /// Runs the full pipeline.
    ///
    /// # Errors
    ///
    /// Fails on invalid settings, on a rejected partition, on coverage
    /// exhaustion or on a cell without priced members. An index missing a
    /// level only drops the benchmark comparison.
    pub fn run(&self, scores: &ScoreBook, index: Option<&IndexSeries>) -> Result<BacktestReport> {
        let buckets = self.bucket(scores)?;
        self.run_bucketed(buckets, index)
    }

    /// Runs everything after bucketing on an existing book.
    pub fn run_bucketed(
        &self,
        buckets: BucketBook,
        index: Option<&IndexSeries>,
    ) -> Result<BacktestReport> {
        self.settings.validate()?;
        let horizon = self.settings.horizon()?;
        info!(
            start = %self.settings.start,
            end = %self.settings.end,
            lag = horizon.lag(),
            seed = %horizon.seed(),
            cells = buckets.len(),
            holdings = buckets.holding_count(),
            "Starting backtest"
        );

        let (covered, coverage) =
            CoverageFilter::new(self.resolver, self.settings.fragile_cell_threshold)
                .filter(buckets.clone())?;
        info!(
            removed = coverage.removed,
            retained = coverage.retained,
            fragile = coverage.fragile_cells.len(),
            "Filtered for price coverage"
        );

        let simulator = PortfolioSimulator::new(SimulatorConfig::from(self.settings));
        let simulation = simulator.run(&covered, self.resolver)?;

        let benchmark = index.and_then(|index| {
            match Benchmark::from_index(
                index,
                horizon.simulated(),
                self.settings.initial_capital,
                self.settings.price_search_days,
            ) {
                Ok(benchmark) => Some(benchmark),
                Err(e) => {
                    warn!(index = index.name(), error = %e, "Skipping benchmark comparison");
                    None
                }
            }
        });

        let summaries = summarize(&simulation, benchmark.as_ref());
        let relative = benchmark
            .as_ref()
            .map(|b| compare_to_benchmark(&simulation, b))
            .unwrap_or_default();

        Ok(BacktestReport {
            horizon,
            buckets,
            covered,
            coverage,
            simulation,
            benchmark,
            summaries,
            relative,
        })
    }
}
