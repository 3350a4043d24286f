//! Bucket membership across metrics, quarters and labels.
//!
//! The book is the aggregate handed from one stage to the next. Its ordering
//! is explicit: metrics in configured order, quarters ascending, labels in
//! ascending score order. Iteration never depends on hash-map order.

use std::collections::HashMap;
use std::fmt;

use lectura_traits::{BucketLabel, Holding, MetricName, Quarter};
use serde::{Deserialize, Serialize};

/// Address of one (metric, bucket, quarter) cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellKey {
    /// Metric the bucket was ranked on
    pub metric: MetricName,
    /// Bucket label
    pub bucket: BucketLabel,
    /// Quarter of the membership
    pub quarter: Quarter,
}

impl CellKey {
    /// Creates a cell address.
    pub const fn new(metric: MetricName, bucket: BucketLabel, quarter: Quarter) -> Self {
        Self {
            metric,
            bucket,
            quarter,
        }
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.metric, self.bucket, self.quarter)
    }
}

/// Holdings of every (metric, bucket, quarter) cell.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketBook {
    metrics: Vec<MetricName>,
    quarters: Vec<Quarter>,
    labels: Vec<BucketLabel>,
    cells: HashMap<CellKey, Vec<Holding>>,
}

impl BucketBook {
    /// Creates an empty book over the given axes.
    pub fn new(
        metrics: Vec<MetricName>,
        quarters: Vec<Quarter>,
        labels: Vec<BucketLabel>,
    ) -> Self {
        Self {
            metrics,
            quarters,
            labels,
            cells: HashMap::new(),
        }
    }

    /// Metrics, in configured order.
    pub fn metrics(&self) -> &[MetricName] {
        &self.metrics
    }

    /// Quarters, ascending.
    pub fn quarters(&self) -> &[Quarter] {
        &self.quarters
    }

    /// Bucket labels, in ascending score order.
    pub fn labels(&self) -> &[BucketLabel] {
        &self.labels
    }

    /// Sets the holdings of one cell, returning the previous ones.
    pub fn insert(&mut self, key: CellKey, holdings: Vec<Holding>) -> Option<Vec<Holding>> {
        self.cells.insert(key, holdings)
    }

    /// Holdings of one cell; empty when the cell was never filled.
    pub fn cell(&self, key: CellKey) -> &[Holding] {
        self.cells.get(&key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Every cell key in metric, quarter, label order.
    pub fn keys(&self) -> impl Iterator<Item = CellKey> + '_ {
        self.metrics.iter().flat_map(move |&metric| {
            self.quarters.iter().flat_map(move |&quarter| {
                self.labels
                    .iter()
                    .map(move |&bucket| CellKey::new(metric, bucket, quarter))
            })
        })
    }

    /// Every cell with its holdings, in [`keys`](Self::keys) order.
    pub fn iter(&self) -> impl Iterator<Item = (CellKey, &[Holding])> + '_ {
        self.keys().map(move |key| (key, self.cell(key)))
    }

    /// Independent (metric, bucket) tracks, in metric then label order.
    pub fn tracks(&self) -> Vec<(MetricName, BucketLabel)> {
        self.metrics
            .iter()
            .flat_map(|&metric| self.labels.iter().map(move |&bucket| (metric, bucket)))
            .collect()
    }

    /// Total number of holdings across all cells.
    pub fn holding_count(&self) -> usize {
        self.cells.values().map(Vec::len).sum()
    }

    /// Number of cells that were filled.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether no cell was filled.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lectura_traits::{BucketScheme, CompanyId};

    #[test]
    fn test_keys_follow_axis_order() {
        let q1 = Quarter::new(2010, 2).unwrap();
        let q2 = q1.next();
        let book = BucketBook::new(
            vec![MetricName::DiffSimple, MetricName::DiffJaccard],
            vec![q1, q2],
            BucketScheme::Quintile.labels(),
        );

        let keys: Vec<CellKey> = book.keys().collect();
        assert_eq!(keys.len(), 20);
        assert_eq!(keys[0].metric, MetricName::DiffSimple);
        assert_eq!(keys[0].quarter, q1);
        assert_eq!(keys[0].bucket.to_string(), "Q1");
        assert_eq!(keys[4].bucket.to_string(), "Q5");
        assert_eq!(keys[5].quarter, q2);
        assert_eq!(keys[10].metric, MetricName::DiffJaccard);

        let tracks = book.tracks();
        assert_eq!(tracks.len(), 10);
        assert_eq!(tracks[0].0, MetricName::DiffSimple);
        assert_eq!(tracks[9].1.to_string(), "Q5");
    }

    #[test]
    fn test_cell_access() {
        let q = Quarter::new(2010, 2).unwrap();
        let label = BucketLabel::new('Q', 1);
        let mut book = BucketBook::new(vec![MetricName::DiffJaccard], vec![q], vec![label]);
        let key = CellKey::new(MetricName::DiffJaccard, label, q);
        assert!(book.cell(key).is_empty());

        book.insert(key, vec![Holding::new(CompanyId(1), 0.5)]);
        assert_eq!(book.cell(key).len(), 1);
        assert_eq!(book.holding_count(), 1);
        assert_eq!(key.to_string(), "diff_jaccard/Q1/2010Q2");
    }
}
