//! Per-company metric scores, flipped into per-metric, per-quarter sequences.
//!
//! Score files are produced upstream with one row per company, quarter and
//! metric. The backtester consumes them the other way round: for one metric
//! and one quarter, the ordered list of every company's score. The order of a
//! list is the order in which companies first appear in the source, which is
//! what breaks ties when the list is ranked.

use std::collections::{BTreeMap, HashSet};
use std::io::Read;
use std::path::Path;

use lectura_traits::{CompanyId, Horizon, MetricName, Quarter, ScoreEntry};
use serde::Deserialize;
use tracing::debug;

use crate::DataError;

#[derive(Debug, Deserialize)]
struct ScoreRecord {
    cik: u64,
    quarter: Quarter,
    metric: MetricName,
    score: Option<f64>,
}

/// Score lists keyed by metric, then quarter.
#[derive(Debug, Clone, Default)]
pub struct ScoreBook {
    cells: BTreeMap<(MetricName, Quarter), Vec<ScoreEntry>>,
    seen: HashSet<(MetricName, Quarter, CompanyId)>,
}

impl ScoreBook {
    /// Creates an empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `cik,quarter,metric,score` records from a CSV source.
    ///
    /// Rows with an empty score are skipped. A company scored twice for the
    /// same metric and quarter is an error.
    pub fn from_reader(reader: impl Read) -> Result<Self, DataError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut book = Self::new();
        let mut skipped = 0usize;
        for result in csv_reader.deserialize() {
            let record: ScoreRecord = result?;
            let Some(score) = record.score else {
                skipped += 1;
                continue;
            };
            book.insert(
                record.metric,
                record.quarter,
                ScoreEntry::new(CompanyId(record.cik), score),
            )?;
        }
        if skipped > 0 {
            debug!(skipped, "Skipped score rows without a value");
        }
        Ok(book)
    }

    /// Reads a CSV score file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Appends one score to its (metric, quarter) list.
    pub fn insert(
        &mut self,
        metric: MetricName,
        quarter: Quarter,
        entry: ScoreEntry,
    ) -> Result<(), DataError> {
        if !entry.score.is_finite() {
            return Err(DataError::Parse(format!(
                "{metric} {quarter} CIK {}: score must be finite, got {}",
                entry.company, entry.score
            )));
        }
        if !self.seen.insert((metric, quarter, entry.company)) {
            return Err(DataError::Parse(format!(
                "{metric} {quarter}: CIK {} is scored more than once",
                entry.company
            )));
        }
        self.cells.entry((metric, quarter)).or_default().push(entry);
        Ok(())
    }

    /// Scores of one metric at one quarter, in first-seen company order.
    pub fn entries(&self, metric: MetricName, quarter: Quarter) -> &[ScoreEntry] {
        self.cells
            .get(&(metric, quarter))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// A copy holding only the quarters of `horizon`.
    pub fn restricted_to(&self, horizon: &Horizon) -> Self {
        let mut book = Self::new();
        for ((metric, quarter), entries) in &self.cells {
            if horizon.quarters().binary_search(quarter).is_ok() {
                for entry in entries {
                    book.seen.insert((*metric, *quarter, entry.company));
                }
                book.cells.insert((*metric, *quarter), entries.clone());
            }
        }
        book
    }

    /// Keeps only the companies for which `keep` returns true.
    pub fn retain_companies(&mut self, mut keep: impl FnMut(CompanyId) -> bool) {
        self.seen.retain(|(_, _, company)| keep(*company));
        let seen = &self.seen;
        for ((metric, quarter), entries) in &mut self.cells {
            entries.retain(|entry| seen.contains(&(*metric, *quarter, entry.company)));
        }
        self.cells.retain(|_, entries| !entries.is_empty());
    }

    /// Distinct companies with at least one score, ascending.
    pub fn companies(&self) -> Vec<CompanyId> {
        let mut companies: Vec<CompanyId> = self
            .seen
            .iter()
            .map(|(_, _, company)| *company)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        companies.sort_unstable();
        companies
    }

    /// Metrics present in the book.
    pub fn metrics(&self) -> Vec<MetricName> {
        let mut metrics: Vec<MetricName> = self.cells.keys().map(|(m, _)| *m).collect();
        metrics.dedup();
        metrics
    }

    /// Number of scores across all cells.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Whether the book holds no score.
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
