//! Benchmark index track and relative performance.

use lectura_data::IndexSeries;
use lectura_traits::{BucketLabel, LecturaError, MetricName, Quarter, Result};
use serde::{Deserialize, Serialize};

use crate::Simulation;

/// Value of `initial_capital` invested in an index at the seed quarter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Benchmark {
    /// Index name
    pub name: String,
    /// (quarter, value) pairs in ascending quarter order
    pub values: Vec<(Quarter, f64)>,
}

impl Benchmark {
    /// Builds the benchmark track from index levels at each quarter start.
    ///
    /// Levels are looked up with the same forward search as share prices.
    ///
    /// # Errors
    ///
    /// Returns [`LecturaError::InsufficientData`] when the index has no level
    /// near the start of one of the quarters.
    pub fn from_index(
        index: &IndexSeries,
        quarters: &[Quarter],
        initial_capital: f64,
        search_days: u32,
    ) -> Result<Self> {
        let levels = quarters
            .iter()
            .map(|&quarter| {
                index.level_at(quarter, search_days).ok_or_else(|| {
                    LecturaError::InsufficientData(format!(
                        "{} has no level near the start of {quarter}",
                        index.name()
                    ))
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        let Some(&base) = levels.first() else {
            return Err(LecturaError::InsufficientData(
                "benchmark needs at least one quarter".to_string(),
            ));
        };

        let values = quarters
            .iter()
            .zip(levels)
            .map(|(&quarter, level)| (quarter, initial_capital * level / base))
            .collect();

        Ok(Self {
            name: index.name().to_string(),
            values,
        })
    }

    /// Benchmark value at `quarter`.
    pub fn value_at(&self, quarter: Quarter) -> Option<f64> {
        self.values
            .iter()
            .find(|(q, _)| *q == quarter)
            .map(|(_, v)| *v)
    }

    /// Total return over the whole track.
    pub fn total_return(&self) -> f64 {
        match (self.values.first(), self.values.last()) {
            (Some((_, first)), Some((_, last))) => last / first - 1.0,
            _ => f64::NAN,
        }
    }
}

/// A track's value relative to the benchmark at one quarter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelativePerformance {
    /// Metric of the track
    pub metric: MetricName,
    /// Bucket of the track
    pub bucket: BucketLabel,
    /// Quarter compared
    pub quarter: Quarter,
    /// Portfolio value
    pub portfolio_value: f64,
    /// Benchmark value
    pub benchmark_value: f64,
    /// `portfolio_value / benchmark_value - 1`
    pub relative: f64,
}

/// Compares every track with the benchmark, quarter by quarter.
///
/// Quarters the benchmark does not cover are skipped.
pub fn compare_to_benchmark(
    simulation: &Simulation,
    benchmark: &Benchmark,
) -> Vec<RelativePerformance> {
    simulation
        .tracks
        .iter()
        .flat_map(|track| {
            track.steps.iter().filter_map(move |step| {
                let benchmark_value = benchmark.value_at(step.quarter)?;
                let portfolio_value = step.state.raw_value;
                Some(RelativePerformance {
                    metric: track.metric,
                    bucket: track.bucket,
                    quarter: step.quarter,
                    portfolio_value,
                    benchmark_value,
                    relative: portfolio_value / benchmark_value - 1.0,
                })
            })
        })
        .collect()
}
