//! Quantile bucketing of one quarter's scores.
//!
//! Entries are ranked by ascending score, ties going to the entry seen first.
//! Ranks `1..=n` are cut into `q` equal-width intervals over `[1, n]`, closed
//! on the right, and the first interval also holds rank 1. Rank `r` therefore
//! lands in bucket `ceil(q * (r - 1) / (n - 1))`, counted from 1, or bucket 1
//! when `r == 1`. When the cut leaves a bucket empty the partition does not
//! match the scheme and is rejected.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use lectura_data::ScoreBook;
use lectura_traits::{
    BucketLabel, BucketScheme, Holding, Horizon, LecturaError, MetricName, Result, ScoreEntry,
};
use tracing::debug;

use crate::{BucketBook, CellKey};

/// Partitions score lists into equal-population buckets.
#[derive(Debug, Clone, Copy)]
pub struct QuantileBucketer {
    scheme: BucketScheme,
}

impl QuantileBucketer {
    /// Create a bucketer for the given scheme.
    pub const fn new(scheme: BucketScheme) -> Self {
        Self { scheme }
    }

    /// The bucketing scheme.
    pub const fn scheme(&self) -> BucketScheme {
        self.scheme
    }

    /// Splits `entries` into labelled buckets, lowest scores in the first one.
    ///
    /// Members keep their input order inside each bucket, and every holding
    /// starts with zero shares.
    ///
    /// # Errors
    ///
    /// Returns [`LecturaError::InvalidData`] for a non-finite score and
    /// [`LecturaError::Configuration`] when the partition does not produce
    /// exactly as many non-empty buckets as the scheme requires.
    pub fn bucket(&self, entries: &[ScoreEntry]) -> Result<BTreeMap<BucketLabel, Vec<Holding>>> {
        if let Some(bad) = entries.iter().find(|e| !e.score.is_finite()) {
            return Err(LecturaError::InvalidData(format!(
                "score of CIK {} is not finite: {}",
                bad.company, bad.score
            )));
        }

        let assignment = self.assign(entries);
        let labels = self.scheme.labels();
        let mut buckets: BTreeMap<BucketLabel, Vec<Holding>> = BTreeMap::new();
        for (entry, bucket) in entries.iter().zip(assignment) {
            buckets
                .entry(labels[bucket])
                .or_default()
                .push(Holding::from(*entry));
        }

        if buckets.len() != self.scheme.count() {
            return Err(LecturaError::configuration(format!(
                "{} entries produced {} buckets, expected {}",
                entries.len(),
                buckets.len(),
                self.scheme.count()
            )));
        }
        Ok(buckets)
    }

    /// Zero-based bucket index of every entry, in input order.
    fn assign(&self, entries: &[ScoreEntry]) -> Vec<usize> {
        let n = entries.len();
        let q = self.scheme.count();

        // Stable sort keeps first-seen order among equal scores; scores are
        // finite here, and `0.0` and `-0.0` compare equal.
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| {
            entries[a]
                .score
                .partial_cmp(&entries[b].score)
                .unwrap_or(Ordering::Equal)
        });

        let mut assignment = vec![0; n];
        if n < 2 {
            return assignment;
        }
        for (position, &idx) in order.iter().enumerate() {
            // position == rank - 1
            let scaled = q * position;
            let bucket = scaled.div_ceil(n - 1);
            assignment[idx] = bucket.saturating_sub(1);
        }
        assignment
    }

    /// Buckets every traded metric at every simulated quarter of `horizon`.
    ///
    /// # Errors
    ///
    /// Fails on the first cell whose partition is rejected, naming the metric
    /// and quarter.
    pub fn bucket_book(
        &self,
        scores: &ScoreBook,
        metrics: &[MetricName],
        horizon: &Horizon,
    ) -> Result<BucketBook> {
        let quarters = horizon.simulated().to_vec();
        let mut book = BucketBook::new(metrics.to_vec(), quarters.clone(), self.scheme.labels());

        for &metric in metrics {
            for &quarter in &quarters {
                let entries = scores.entries(metric, quarter);
                let buckets = self.bucket(entries).map_err(|e| match e {
                    LecturaError::Configuration(msg) => {
                        LecturaError::configuration(format!("{metric} at {quarter}: {msg}"))
                    }
                    LecturaError::InvalidData(msg) => {
                        LecturaError::InvalidData(format!("{metric} at {quarter}: {msg}"))
                    }
                    other => other,
                })?;
                debug!(%metric, %quarter, entries = entries.len(), "Bucketed quarter");
                for (bucket, holdings) in buckets {
                    book.insert(CellKey::new(metric, bucket, quarter), holdings);
                }
            }
        }
        Ok(book)
    }
}
