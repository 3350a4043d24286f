//! Tabular exports: bucket membership and portfolio values.
//!
//! Both tables are written as `;`-delimited text with a header row. Row order
//! follows the book and simulation order, so two runs over the same inputs
//! produce identical files.

use std::io::Write;

use lectura_traits::{LecturaError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{BucketBook, Simulation};

/// Delimiter of every exported table.
pub const SEPARATOR: u8 = b';';

/// Bucket membership as a DataFrame with columns
/// `METRIC, QUARTER, BUCKET, CIK, SCORE`.
pub fn bucket_frame(book: &BucketBook) -> PolarsResult<DataFrame> {
    let capacity = book.holding_count();
    let mut metrics = Vec::with_capacity(capacity);
    let mut quarters = Vec::with_capacity(capacity);
    let mut buckets = Vec::with_capacity(capacity);
    let mut ciks = Vec::with_capacity(capacity);
    let mut scores = Vec::with_capacity(capacity);

    for (key, holdings) in book.iter() {
        for holding in holdings {
            metrics.push(key.metric.as_str().to_string());
            quarters.push(key.quarter.to_string());
            buckets.push(key.bucket.to_string());
            ciks.push(holding.company.0);
            scores.push(holding.score);
        }
    }

    df!(
        "METRIC" => metrics,
        "QUARTER" => quarters,
        "BUCKET" => buckets,
        "CIK" => ciks,
        "SCORE" => scores,
    )
}

/// One row of the portfolio value table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueRow {
    /// Metric of the track
    pub metric: String,
    /// Bucket of the track
    pub bucket: String,
    /// Quarter of the step
    pub quarter: String,
    /// Market-cap weighted liquidation value
    pub raw_value: f64,
    /// Tax rate
    pub tax_rate: f64,
    /// Value reinvested at the quarter
    pub post_tax_value: f64,
    /// Equal-weight liquidation value
    pub equal_weight_value: f64,
}

/// Per-(metric, bucket, quarter) portfolio states, in track order.
pub fn value_rows(simulation: &Simulation) -> Vec<ValueRow> {
    simulation
        .tracks
        .iter()
        .flat_map(|track| {
            track.steps.iter().map(move |step| ValueRow {
                metric: track.metric.to_string(),
                bucket: track.bucket.to_string(),
                quarter: step.quarter.to_string(),
                raw_value: step.state.raw_value,
                tax_rate: step.state.tax_rate,
                post_tax_value: step.state.post_tax_value,
                equal_weight_value: step.state.equal_weight_value,
            })
        })
        .collect()
}

/// Portfolio states as a DataFrame.
pub fn value_frame(simulation: &Simulation) -> PolarsResult<DataFrame> {
    let rows = value_rows(simulation);
    df!(
        "METRIC" => rows.iter().map(|r| r.metric.as_str()).collect::<Vec<_>>(),
        "BUCKET" => rows.iter().map(|r| r.bucket.as_str()).collect::<Vec<_>>(),
        "QUARTER" => rows.iter().map(|r| r.quarter.as_str()).collect::<Vec<_>>(),
        "RAW_VALUE" => rows.iter().map(|r| r.raw_value).collect::<Vec<_>>(),
        "TAX_RATE" => rows.iter().map(|r| r.tax_rate).collect::<Vec<_>>(),
        "POST_TAX_VALUE" => rows.iter().map(|r| r.post_tax_value).collect::<Vec<_>>(),
        "EQUAL_WEIGHT_VALUE" => rows.iter().map(|r| r.equal_weight_value).collect::<Vec<_>>(),
    )
}

fn write_frame(df: &mut DataFrame, writer: impl Write) -> Result<()> {
    CsvWriter::new(writer)
        .include_header(true)
        .with_separator(SEPARATOR)
        .finish(df)?;
    Ok(())
}

/// Writes the bucket membership table.
pub fn write_buckets(book: &BucketBook, writer: impl Write) -> Result<()> {
    let mut df = bucket_frame(book)?;
    write_frame(&mut df, writer)
}

/// Writes the portfolio value table.
pub fn write_values(simulation: &Simulation, writer: impl Write) -> Result<()> {
    let mut df = value_frame(simulation)?;
    write_frame(&mut df, writer)
}

/// Portfolio states as pretty-printed JSON.
pub fn values_json(simulation: &Simulation) -> Result<String> {
    serde_json::to_string_pretty(&value_rows(simulation))
        .map_err(|e| LecturaError::Other(format!("failed to serialize values: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CellKey, Track, TrackStep};
    use lectura_traits::{BucketLabel, CompanyId, Holding, MetricName, PortfolioState, Quarter};

    fn book() -> BucketBook {
        let q = Quarter::new(2010, 2).unwrap();
        let labels = vec![BucketLabel::new('Q', 1), BucketLabel::new('Q', 2)];
        let mut book = BucketBook::new(vec![MetricName::DiffJaccard], vec![q], labels.clone());
        book.insert(
            CellKey::new(MetricName::DiffJaccard, labels[1], q),
            vec![Holding::new(CompanyId(7), 0.75)],
        );
        book.insert(
            CellKey::new(MetricName::DiffJaccard, labels[0], q),
            vec![
                Holding::new(CompanyId(2), 0.25),
                Holding::new(CompanyId(3), 0.5),
            ],
        );
        book
    }

    #[test]
    fn test_bucket_frame_order() {
        let df = bucket_frame(&book()).unwrap();
        assert_eq!(df.height(), 3);

        let buckets: Vec<&str> = df
            .column("BUCKET")
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(buckets, vec!["Q1", "Q1", "Q2"]);

        let ciks: Vec<u64> = df
            .column("CIK")
            .unwrap()
            .as_materialized_series()
            .u64()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(ciks, vec![2, 3, 7]);
    }

    #[test]
    fn test_write_buckets_is_semicolon_delimited() {
        let mut out = Vec::new();
        write_buckets(&book(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("METRIC;QUARTER;BUCKET;CIK;SCORE"));
        assert!(lines.next().unwrap().starts_with("diff_jaccard;2010Q2;Q1;2;"));
        assert_eq!(text.lines().count(), 4);
    }

    fn simulation() -> Simulation {
        let q = Quarter::new(2010, 2).unwrap();
        Simulation {
            quarters: vec![q, q.next()],
            tracks: vec![Track {
                metric: MetricName::DiffSimple,
                bucket: BucketLabel::new('D', 10),
                steps: vec![
                    TrackStep {
                        quarter: q,
                        state: PortfolioState::seed(1_000_000.0, 0.005),
                        holdings: Vec::new(),
                    },
                    TrackStep {
                        quarter: q.next(),
                        state: PortfolioState::rollover(1_100_000.0, 1_050_000.0, 0.005),
                        holdings: Vec::new(),
                    },
                ],
            }],
        }
    }

    #[test]
    fn test_write_values() {
        let mut out = Vec::new();
        write_values(&simulation(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let header = text.lines().next().unwrap();
        assert_eq!(
            header,
            "METRIC;BUCKET;QUARTER;RAW_VALUE;TAX_RATE;POST_TAX_VALUE;EQUAL_WEIGHT_VALUE"
        );
        assert!(text.lines().nth(2).unwrap().starts_with("diff_simple;D10;2010Q3;"));
    }

    #[test]
    fn test_values_json() {
        let json = values_json(&simulation()).unwrap();
        let rows: Vec<ValueRow> = serde_json::from_str(&json).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].quarter, "2010Q3");
        assert_eq!(rows[0].post_tax_value, 1_000_000.0);
    }
}
