//! Run configuration.
//!
//! [`BacktestSettings`] is built once at startup (from defaults or a JSON
//! file), validated, and then only ever passed around by reference.

use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::{BucketLabel, BucketScheme, Horizon, LecturaError, MetricName, Quarter, Result};

/// Which pair of filings a text-difference score compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifferentiationMode {
    /// Each filing against the previous quarter's filing.
    Intersection,
    /// Each filing against the filing of the same quarter one year earlier.
    Yearly,
}

impl DifferentiationMode {
    /// Number of leading quarters without a comparable prior filing.
    pub const fn lag(&self) -> usize {
        match self {
            Self::Intersection => 1,
            Self::Yearly => 4,
        }
    }
}

/// Immutable settings of a backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestSettings {
    /// First quarter of the horizon
    pub start: Quarter,
    /// Last quarter of the horizon (included)
    pub end: Quarter,
    /// Quantile scheme, serialized as its bucket count
    #[serde(rename = "bucket_count")]
    pub bucket_scheme: BucketScheme,
    /// Filing comparison mode, which determines the lag
    pub differentiation_mode: DifferentiationMode,
    /// Metrics in order; the last one is reference-only
    pub metrics: Vec<MetricName>,
    /// Value every portfolio starts with
    pub initial_capital: f64,
    /// Tax drag charged at every rebalance
    pub tax_rate: f64,
    /// Calendar days searched forward from a quarter's start for a price
    pub price_search_days: u32,
    /// Cells with at most this many members are reported as fragile
    pub fragile_cell_threshold: usize,
    /// Rounding tolerance for invariant checks
    pub tolerance: f64,
}

impl Default for BacktestSettings {
    fn default() -> Self {
        Self {
            start: Quarter::from_parts(2010, 1),
            end: Quarter::from_parts(2012, 4),
            bucket_scheme: BucketScheme::Quintile,
            differentiation_mode: DifferentiationMode::Intersection,
            metrics: MetricName::ALL.to_vec(),
            initial_capital: 1_000_000.0,
            tax_rate: 0.005,
            price_search_days: 7,
            fragile_cell_threshold: 20,
            tolerance: 1e-4,
        }
    }
}

impl BacktestSettings {
    /// Parses settings from JSON and validates them.
    ///
    /// Missing fields take their default values.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)
            .map_err(|e| LecturaError::configuration(format!("invalid settings: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reads settings from a JSON source and validates them.
    pub fn from_json_reader(reader: impl Read) -> Result<Self> {
        let settings: Self = serde_json::from_reader(reader)
            .map_err(|e| LecturaError::configuration(format!("invalid settings: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Checks the settings for internal consistency.
    pub fn validate(&self) -> Result<()> {
        if self.end < self.start {
            return Err(LecturaError::configuration(format!(
                "end quarter {} precedes start quarter {}",
                self.end, self.start
            )));
        }
        if !(self.initial_capital.is_finite() && self.initial_capital > 0.0) {
            return Err(LecturaError::configuration(
                "initial capital must be positive",
            ));
        }
        if !(0.0..1.0).contains(&self.tax_rate) {
            return Err(LecturaError::configuration(format!(
                "tax rate {} must lie in [0, 1)",
                self.tax_rate
            )));
        }
        if self.price_search_days == 0 {
            return Err(LecturaError::configuration(
                "price search window must cover at least one day",
            ));
        }
        if self.traded_metrics().is_empty() {
            return Err(LecturaError::configuration(
                "at least one metric besides the reference metric is required",
            ));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(LecturaError::configuration("tolerance must be positive"));
        }
        self.horizon().map(|_| ())
    }

    /// Number of leading quarters excluded from the simulation.
    pub const fn lag(&self) -> usize {
        self.differentiation_mode.lag()
    }

    /// The ordered quarter horizon of the run.
    pub fn horizon(&self) -> Result<Horizon> {
        Horizon::new(self.start, self.end, self.lag())
    }

    /// Metrics that get portfolios: every configured metric but the last.
    pub fn traded_metrics(&self) -> &[MetricName] {
        match self.metrics.split_last() {
            Some((_, traded)) => traded,
            None => &[],
        }
    }

    /// The trailing reference-only metric, if any metric is configured.
    pub fn reference_metric(&self) -> Option<MetricName> {
        self.metrics.last().copied()
    }

    /// Bucket labels in ascending score order.
    pub fn bucket_labels(&self) -> Vec<BucketLabel> {
        self.bucket_scheme.labels()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = BacktestSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.lag(), 1);
        assert_eq!(settings.bucket_labels().len(), 5);
        assert_eq!(settings.traded_metrics().len(), 5);
        assert_eq!(
            settings.reference_metric(),
            Some(MetricName::SingLoughranMcDonald)
        );

        let horizon = settings.horizon().unwrap();
        assert_eq!(horizon.len(), 12);
        assert_eq!(horizon.seed().to_string(), "2010Q2");
    }

    #[test]
    fn test_yearly_mode_lag() {
        let settings = BacktestSettings {
            differentiation_mode: DifferentiationMode::Yearly,
            ..Default::default()
        };
        assert_eq!(settings.lag(), 4);
        assert_eq!(settings.horizon().unwrap().seed().to_string(), "2011Q1");
    }

    #[test]
    fn test_from_json_with_defaults() {
        let json = r#"{
            "start": "2011Q1",
            "end": "2011Q4",
            "bucket_count": 10,
            "metrics": ["diff_jaccard", "diff_simple", "sing_LoughranMcDonald"]
        }"#;
        let settings = BacktestSettings::from_json_str(json).unwrap();
        assert_eq!(settings.bucket_scheme, BucketScheme::Decile);
        assert_eq!(
            settings.traded_metrics(),
            &[MetricName::DiffJaccard, MetricName::DiffSimple]
        );
        assert_eq!(settings.initial_capital, 1_000_000.0);
        assert_eq!(settings.price_search_days, 7);
    }

    #[test]
    fn test_unsupported_bucket_count_rejected() {
        let json = r#"{ "bucket_count": 4 }"#;
        let err = BacktestSettings::from_json_str(json).unwrap_err();
        assert!(matches!(err, LecturaError::Configuration(_)));
    }

    #[test]
    fn test_invalid_settings() {
        let reversed = BacktestSettings {
            start: Quarter::new(2012, 1).unwrap(),
            end: Quarter::new(2011, 1).unwrap(),
            ..Default::default()
        };
        assert!(reversed.validate().is_err());

        let taxed_out = BacktestSettings {
            tax_rate: 1.0,
            ..Default::default()
        };
        assert!(taxed_out.validate().is_err());

        let only_reference = BacktestSettings {
            metrics: vec![MetricName::SingLoughranMcDonald],
            ..Default::default()
        };
        assert!(only_reference.validate().is_err());

        let too_short = BacktestSettings {
            end: Quarter::new(2010, 1).unwrap(),
            ..Default::default()
        };
        assert!(too_short.validate().is_err());
    }
}
