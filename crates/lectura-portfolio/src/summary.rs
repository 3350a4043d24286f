//! Performance summary of simulated tracks.
//!
//! Returns are quarterly, so annualization uses four periods per year.

use lectura_traits::{BucketLabel, MetricName};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::{Benchmark, Simulation, Track};

/// Rebalancing periods per year.
pub const QUARTERS_PER_YEAR: usize = 4;

/// Performance statistics of one (metric, bucket) track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackSummary {
    /// Metric of the track
    pub metric: MetricName,
    /// Bucket of the track
    pub bucket: BucketLabel,
    /// Value at the last simulated quarter
    pub final_value: f64,
    /// Total return from the seed quarter
    pub total_return: f64,
    /// Annualized return
    pub annualized_return: f64,
    /// Annualized volatility of quarterly returns
    pub annualized_volatility: f64,
    /// Sharpe ratio (annualized, zero risk-free rate)
    pub sharpe_ratio: f64,
    /// Maximum drawdown
    pub max_drawdown: f64,
    /// Total return in excess of the benchmark, when one is given
    pub excess_return: Option<f64>,
}

impl TrackSummary {
    /// Summarizes one track.
    pub fn from_track(track: &Track, benchmark: Option<&Benchmark>) -> Self {
        let values = track.values();
        let returns = period_returns(&values);
        let cumulative: Vec<f64> = match values.first() {
            Some(&base) if base > 0.0 => values.iter().map(|v| v / base - 1.0).collect(),
            _ => Vec::new(),
        };

        let total_return = cumulative.last().copied().unwrap_or(f64::NAN);
        let annualized_return = if returns.is_empty() {
            f64::NAN
        } else {
            let years = returns.len() as f64 / QUARTERS_PER_YEAR as f64;
            (1.0 + total_return).powf(1.0 / years) - 1.0
        };

        Self {
            metric: track.metric,
            bucket: track.bucket,
            final_value: track.final_value().unwrap_or(f64::NAN),
            total_return,
            annualized_return,
            annualized_volatility: annualized_volatility(&returns, QUARTERS_PER_YEAR),
            sharpe_ratio: sharpe_ratio(&returns, QUARTERS_PER_YEAR),
            max_drawdown: max_drawdown(&cumulative),
            excess_return: benchmark.map(|b| total_return - b.total_return()),
        }
    }
}

/// Summarizes every track of a simulation, in track order.
pub fn summarize(simulation: &Simulation, benchmark: Option<&Benchmark>) -> Vec<TrackSummary> {
    simulation
        .tracks
        .iter()
        .map(|track| TrackSummary::from_track(track, benchmark))
        .collect()
}

/// Simple returns between consecutive values.
pub fn period_returns(values: &[f64]) -> Vec<f64> {
    values
        .windows(2)
        .map(|w| if w[0] > 0.0 { w[1] / w[0] - 1.0 } else { f64::NAN })
        .collect()
}

fn finite(returns: &[f64]) -> Array1<f64> {
    returns.iter().copied().filter(|r| r.is_finite()).collect()
}

/// Annualized Sharpe ratio of periodic returns.
pub fn sharpe_ratio(returns: &[f64], periods_per_year: usize) -> f64 {
    let valid = finite(returns);
    if valid.len() < 2 {
        return f64::NAN;
    }
    let mean = valid.mean().unwrap_or(f64::NAN);
    let std = valid.std(1.0);
    if std == 0.0 {
        f64::NAN
    } else {
        mean / std * (periods_per_year as f64).sqrt()
    }
}

/// Annualized volatility of periodic returns.
pub fn annualized_volatility(returns: &[f64], periods_per_year: usize) -> f64 {
    let valid = finite(returns);
    if valid.len() < 2 {
        return f64::NAN;
    }
    valid.std(1.0) * (periods_per_year as f64).sqrt()
}

/// Maximum drawdown of a cumulative return series.
pub fn max_drawdown(cumulative_returns: &[f64]) -> f64 {
    let mut max_dd = 0.0;
    let mut peak = 0.0;

    for &cum_ret in cumulative_returns {
        if cum_ret > peak {
            peak = cum_ret;
        }
        let dd = (peak - cum_ret) / (1.0 + peak);
        if dd > max_dd {
            max_dd = dd;
        }
    }

    max_dd
}
