//! Scoring metrics and quantile bucket labels.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{LecturaError, Result};

/// Text-difference metric computed between consecutive filings of a company.
///
/// The metric values themselves are produced upstream; the backtester only
/// needs their names to route scores into per-metric portfolios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MetricName {
    /// Jaccard distance between the word sets of two filings.
    #[serde(rename = "diff_jaccard")]
    DiffJaccard,
    /// Cosine distance between term-frequency vectors.
    #[serde(rename = "diff_cosine_tf")]
    DiffCosineTf,
    /// Cosine distance between TF-IDF vectors.
    #[serde(rename = "diff_cosine_tf_idf")]
    DiffCosineTfIdf,
    /// Normalized minimum edit distance.
    #[serde(rename = "diff_minEdit")]
    DiffMinEdit,
    /// Simple line-level difference ratio.
    #[serde(rename = "diff_simple")]
    DiffSimple,
    /// Loughran-McDonald sentiment of a single filing.
    #[serde(rename = "sing_LoughranMcDonald")]
    SingLoughranMcDonald,
}

impl MetricName {
    /// Every metric, in the canonical order. The last one is reference-only.
    pub const ALL: [Self; 6] = [
        Self::DiffJaccard,
        Self::DiffCosineTf,
        Self::DiffCosineTfIdf,
        Self::DiffMinEdit,
        Self::DiffSimple,
        Self::SingLoughranMcDonald,
    ];

    /// Identifier used in score files and dumps.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DiffJaccard => "diff_jaccard",
            Self::DiffCosineTf => "diff_cosine_tf",
            Self::DiffCosineTfIdf => "diff_cosine_tf_idf",
            Self::DiffMinEdit => "diff_minEdit",
            Self::DiffSimple => "diff_simple",
            Self::SingLoughranMcDonald => "sing_LoughranMcDonald",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricName {
    type Err = LecturaError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s.trim())
            .ok_or_else(|| LecturaError::InvalidData(format!("unknown metric '{s}'")))
    }
}

/// Label of one quantile bucket, e.g. `Q1` or `D10`.
///
/// Rank 1 holds the lowest scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BucketLabel {
    prefix: char,
    rank: u8,
}

impl BucketLabel {
    /// Creates a label from its prefix letter and 1-based rank.
    pub const fn new(prefix: char, rank: u8) -> Self {
        Self { prefix, rank }
    }

    /// 1-based position in ascending score order.
    pub const fn rank(&self) -> u8 {
        self.rank
    }
}

impl Ord for BucketLabel {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank
            .cmp(&other.rank)
            .then_with(|| self.prefix.cmp(&other.prefix))
    }
}

impl PartialOrd for BucketLabel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for BucketLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.prefix, self.rank)
    }
}

impl TryFrom<String> for BucketLabel {
    type Error = LecturaError;

    fn try_from(value: String) -> Result<Self> {
        let mut chars = value.chars();
        let prefix = chars
            .next()
            .filter(char::is_ascii_alphabetic)
            .ok_or_else(|| LecturaError::InvalidData(format!("bad bucket label '{value}'")))?;
        let rank: u8 = chars
            .as_str()
            .parse()
            .ok()
            .filter(|r| *r > 0)
            .ok_or_else(|| LecturaError::InvalidData(format!("bad bucket label '{value}'")))?;
        Ok(Self::new(prefix, rank))
    }
}

impl From<BucketLabel> for String {
    fn from(label: BucketLabel) -> Self {
        label.to_string()
    }
}

/// Supported bucketing schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub enum BucketScheme {
    /// Five buckets labelled `Q1..Q5`.
    Quintile,
    /// Ten buckets labelled `D1..D10`.
    Decile,
}

impl BucketScheme {
    /// Maps a bucket count to its scheme.
    ///
    /// # Errors
    ///
    /// Only 5 and 10 buckets are supported; any other count is a configuration error.
    pub fn from_count(count: usize) -> Result<Self> {
        match count {
            5 => Ok(Self::Quintile),
            10 => Ok(Self::Decile),
            other => Err(LecturaError::configuration(format!(
                "bucket count {other} is not supported (use 5 or 10)"
            ))),
        }
    }

    /// Number of buckets.
    pub const fn count(&self) -> usize {
        match self {
            Self::Quintile => 5,
            Self::Decile => 10,
        }
    }

    /// Letter used in the labels of this scheme.
    pub const fn prefix(&self) -> char {
        match self {
            Self::Quintile => 'Q',
            Self::Decile => 'D',
        }
    }

    /// Labels in ascending score order.
    pub fn labels(&self) -> Vec<BucketLabel> {
        (1..=self.count() as u8)
            .map(|rank| BucketLabel::new(self.prefix(), rank))
            .collect()
    }
}

impl TryFrom<usize> for BucketScheme {
    type Error = LecturaError;

    fn try_from(count: usize) -> Result<Self> {
        Self::from_count(count)
    }
}

impl From<BucketScheme> for usize {
    fn from(scheme: BucketScheme) -> Self {
        scheme.count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_round_trip_names() {
        for metric in MetricName::ALL {
            assert_eq!(metric.as_str().parse::<MetricName>().unwrap(), metric);
        }
        assert!("diff_unknown".parse::<MetricName>().is_err());
    }

    #[test]
    fn test_metric_serde_names() {
        let json = serde_json::to_string(&MetricName::DiffMinEdit).unwrap();
        assert_eq!(json, "\"diff_minEdit\"");
    }

    #[test]
    fn test_scheme_labels() {
        let labels = BucketScheme::Quintile.labels();
        let names: Vec<String> = labels.iter().map(ToString::to_string).collect();
        assert_eq!(names, vec!["Q1", "Q2", "Q3", "Q4", "Q5"]);

        let labels = BucketScheme::Decile.labels();
        assert_eq!(labels.len(), 10);
        assert_eq!(labels[9].to_string(), "D10");
        assert!(labels.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_unsupported_bucket_count() {
        assert!(matches!(
            BucketScheme::from_count(7),
            Err(LecturaError::Configuration(_))
        ));
        assert_eq!(BucketScheme::from_count(10).unwrap(), BucketScheme::Decile);
        assert!(serde_json::from_str::<BucketScheme>("3").is_err());
    }

    #[test]
    fn test_label_parse() {
        let label = BucketLabel::try_from("D10".to_string()).unwrap();
        assert_eq!(label.rank(), 10);
        assert!(BucketLabel::try_from("Q0".to_string()).is_err());
        assert!(BucketLabel::try_from("7".to_string()).is_err());
    }
}
