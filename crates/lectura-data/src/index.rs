//! Benchmark index levels.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use lectura_traits::{Date, Quarter};
use serde::Deserialize;

use crate::{DataError, first_within};

#[derive(Debug, Deserialize)]
struct IndexRecord {
    date: Date,
    close: f64,
}

/// Daily closing levels of a benchmark index (e.g. the S&P 500).
#[derive(Debug, Clone, Default)]
pub struct IndexSeries {
    name: String,
    levels: BTreeMap<Date, f64>,
}

impl IndexSeries {
    /// Creates an empty series.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            levels: BTreeMap::new(),
        }
    }

    /// Reads `date,close` records from a CSV source.
    pub fn from_reader(name: impl Into<String>, reader: impl Read) -> Result<Self, DataError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut series = Self::new(name);
        for result in csv_reader.deserialize() {
            let record: IndexRecord = result?;
            if !(record.close.is_finite() && record.close > 0.0) {
                return Err(DataError::Parse(format!(
                    "{}: index level must be positive on {}, got {}",
                    series.name, record.date, record.close
                )));
            }
            series.levels.insert(record.date, record.close);
        }
        Ok(series)
    }

    /// Reads a CSV index file, naming the series after the file stem.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .map_or_else(|| "index".to_string(), |s| s.to_string_lossy().to_uppercase());
        let file = std::fs::File::open(path)?;
        Self::from_reader(name, file)
    }

    /// Series name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds or replaces a level.
    pub fn insert(&mut self, date: Date, level: f64) {
        self.levels.insert(date, level);
    }

    /// First level within `days` calendar days from `start`.
    pub fn level_near(&self, start: Date, days: u32) -> Option<(Date, f64)> {
        first_within(&self.levels, start, days).map(|(date, level)| (date, *level))
    }

    /// Level applicable at the start of `quarter`.
    pub fn level_at(&self, quarter: Quarter, days: u32) -> Option<f64> {
        self.level_near(quarter.start_date(), days)
            .map(|(_, level)| level)
    }

    /// Number of daily levels.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Whether the series holds no level.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_level_at_quarter_start() {
        let csv = "date,close\n2010-01-04,1132.99\n2010-04-01,1178.10\n2010-07-01,1027.37\n";
        let index = IndexSeries::from_reader("SPX", csv.as_bytes()).unwrap();
        assert_eq!(index.name(), "SPX");
        assert_eq!(index.len(), 3);

        let q1 = Quarter::new(2010, 1).unwrap();
        assert_relative_eq!(index.level_at(q1, 7).unwrap(), 1132.99);
        assert_relative_eq!(index.level_at(q1.next(), 7).unwrap(), 1178.10);
        assert!(index.level_at(Quarter::new(2010, 4).unwrap(), 7).is_none());
    }

    #[test]
    fn test_rejects_non_positive_level() {
        let csv = "date,close\n2010-01-04,-1\n";
        assert!(IndexSeries::from_reader("SPX", csv.as_bytes()).is_err());
    }
}
