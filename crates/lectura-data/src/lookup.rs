//! Filer identifier to ticker lookup.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use lectura_traits::{CompanyId, Ticker};
use serde::Deserialize;

use crate::DataError;

#[derive(Debug, Deserialize)]
struct LookupRecord {
    cik: u64,
    ticker: String,
}

/// Mapping from [`CompanyId`] to the ticker it trades under.
#[derive(Debug, Clone, Default)]
pub struct TickerLookup {
    tickers: HashMap<CompanyId, Ticker>,
}

impl TickerLookup {
    /// Creates an empty lookup.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `cik,ticker` records from a CSV source.
    ///
    /// A filer listed twice must map to the same ticker both times.
    pub fn from_reader(reader: impl Read) -> Result<Self, DataError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut lookup = Self::new();
        for result in csv_reader.deserialize() {
            let record: LookupRecord = result?;
            let company = CompanyId(record.cik);
            let ticker = Ticker::new(&record.ticker);
            if ticker.as_str().is_empty() {
                return Err(DataError::Parse(format!("empty ticker for CIK {company}")));
            }
            match lookup.tickers.get(&company) {
                Some(existing) if *existing != ticker => {
                    return Err(DataError::Parse(format!(
                        "CIK {company} maps to both {existing} and {ticker}"
                    )));
                }
                Some(_) => {}
                None => {
                    lookup.tickers.insert(company, ticker);
                }
            }
        }
        Ok(lookup)
    }

    /// Reads a CSV lookup file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Ticker of `company`, if known.
    pub fn get(&self, company: CompanyId) -> Option<&Ticker> {
        self.tickers.get(&company)
    }

    /// Whether `company` has a ticker.
    pub fn contains(&self, company: CompanyId) -> bool {
        self.tickers.contains_key(&company)
    }

    /// Adds or replaces the ticker of `company`.
    pub fn insert(&mut self, company: CompanyId, ticker: Ticker) -> Option<Ticker> {
        self.tickers.insert(company, ticker)
    }

    /// Keeps only the entries for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(CompanyId, &Ticker) -> bool) {
        self.tickers.retain(|company, ticker| keep(*company, ticker));
    }

    /// Iterates over all entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (CompanyId, &Ticker)> {
        self.tickers.iter().map(|(company, ticker)| (*company, ticker))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    /// Whether the lookup is empty.
    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }
}

impl FromIterator<(CompanyId, Ticker)> for TickerLookup {
    fn from_iter<I: IntoIterator<Item = (CompanyId, Ticker)>>(iter: I) -> Self {
        Self {
            tickers: iter.into_iter().collect(),
        }
    }
}
