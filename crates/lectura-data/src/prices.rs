//! Daily share price and market capitalization table.
//!
//! The table is loaded once, before any simulation, and is read-only
//! afterwards. Each ticker owns a date-ordered series so forward searches from
//! a quarter's start are a single range query.

use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::Path;

use chrono::Days;
use lectura_traits::{CE_TO_UNIX_EPOCH_DAYS, Date, Ticker};
use polars::prelude::*;
use serde::Deserialize;

use crate::DataError;

/// Closing share price and market capitalization on one trading day.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct PricePoint {
    /// Closing share price
    pub share_price: f64,
    /// Market capitalization
    pub market_cap: f64,
}

/// CSV record for daily prices.
#[derive(Debug, Deserialize)]
struct PriceRecord {
    ticker: String,
    date: Date,
    price: f64,
    market_cap: f64,
}

/// Finds the first entry dated within `days` calendar days from `start`
/// (`start` itself included).
pub fn first_within<T>(
    series: &BTreeMap<Date, T>,
    start: Date,
    days: u32,
) -> Option<(Date, &T)> {
    if days == 0 {
        return None;
    }
    let end = start.checked_add_days(Days::new(u64::from(days)))?;
    series
        .range(start..end)
        .next()
        .map(|(date, value)| (*date, value))
}

/// Price series for every ticker.
#[derive(Debug, Clone, Default)]
pub struct PriceTable {
    series: HashMap<Ticker, BTreeMap<Date, PricePoint>>,
}

impl PriceTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `ticker,date,price,market_cap` records from a CSV source.
    ///
    /// Non-finite or non-positive prices are rejected.
    pub fn from_reader(reader: impl Read) -> Result<Self, DataError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut table = Self::new();
        for result in csv_reader.deserialize() {
            let record: PriceRecord = result?;
            table.insert_checked(
                Ticker::new(&record.ticker),
                record.date,
                record.price,
                record.market_cap,
            )?;
        }
        Ok(table)
    }

    /// Reads a CSV price file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Builds the table from a DataFrame with `symbol`, `date`, `close` and
    /// `market_cap` columns. Rows with a null in any of them are skipped.
    pub fn from_frame(df: &DataFrame) -> Result<Self, DataError> {
        for col in ["symbol", "date", "close", "market_cap"] {
            if df.column(col).is_err() {
                return Err(DataError::MissingColumn(col.to_string()));
            }
        }

        let symbols = df.column("symbol")?.as_materialized_series().str()?;
        let dates = df.column("date")?.as_materialized_series().date()?;
        let closes = df.column("close")?.as_materialized_series().f64()?;
        let caps = df.column("market_cap")?.as_materialized_series().f64()?;

        let mut table = Self::new();
        let rows = symbols
            .into_iter()
            .zip(dates.into_iter())
            .zip(closes.into_iter())
            .zip(caps.into_iter());
        for (((symbol, days), close), cap) in rows {
            let (Some(symbol), Some(days), Some(close), Some(cap)) = (symbol, days, close, cap)
            else {
                continue;
            };
            let date = Date::from_num_days_from_ce_opt(days + CE_TO_UNIX_EPOCH_DAYS)
                .ok_or_else(|| DataError::Parse(format!("date out of range: {days}")))?;
            table.insert_checked(Ticker::new(symbol), date, close, cap)?;
        }
        Ok(table)
    }

    fn insert_checked(
        &mut self,
        ticker: Ticker,
        date: Date,
        share_price: f64,
        market_cap: f64,
    ) -> Result<(), DataError> {
        if !(share_price.is_finite() && share_price > 0.0) {
            return Err(DataError::Parse(format!(
                "{ticker} on {date}: share price must be positive, got {share_price}"
            )));
        }
        if !(market_cap.is_finite() && market_cap >= 0.0) {
            return Err(DataError::Parse(format!(
                "{ticker} on {date}: market cap must be non-negative, got {market_cap}"
            )));
        }
        self.insert(
            ticker,
            date,
            PricePoint {
                share_price,
                market_cap,
            },
        );
        Ok(())
    }

    /// Inserts (or replaces) one daily point.
    pub fn insert(&mut self, ticker: Ticker, date: Date, point: PricePoint) {
        self.series.entry(ticker).or_default().insert(date, point);
    }

    /// The date-ordered series of a ticker.
    pub fn series(&self, ticker: &Ticker) -> Option<&BTreeMap<Date, PricePoint>> {
        self.series.get(ticker)
    }

    /// Whether a ticker has any price at all.
    pub fn contains(&self, ticker: &Ticker) -> bool {
        self.series.contains_key(ticker)
    }

    /// Exact-date lookup.
    pub fn get(&self, ticker: &Ticker, date: Date) -> Option<PricePoint> {
        self.series.get(ticker)?.get(&date).copied()
    }

    /// First trading day on or after `start`, at most `days` calendar days away.
    pub fn first_within(
        &self,
        ticker: &Ticker,
        start: Date,
        days: u32,
    ) -> Option<(Date, PricePoint)> {
        let series = self.series.get(ticker)?;
        first_within(series, start, days).map(|(date, point)| (date, *point))
    }

    /// Tickers present in the table.
    pub fn tickers(&self) -> impl Iterator<Item = &Ticker> {
        self.series.keys()
    }

    /// Number of tickers.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// Whether the table holds no ticker.
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd_opt(y, m, d).unwrap()
    }

    const CSV: &str = "\
ticker,date,price,market_cap
aapl,2010-01-04,30.5,27000
AAPL,2010-01-05,31.0,27500
MSFT,2010-01-04,28.0,245000
";

    #[test]
    fn test_from_reader() {
        let table = PriceTable::from_reader(CSV.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);

        let aapl = Ticker::new("AAPL");
        let point = table.get(&aapl, date(2010, 1, 4)).unwrap();
        assert_relative_eq!(point.share_price, 30.5);
        assert_relative_eq!(point.market_cap, 27000.0);
        assert_eq!(table.series(&aapl).unwrap().len(), 2);
    }

    #[test]
    fn test_rejects_non_positive_price() {
        let csv = "ticker,date,price,market_cap\nXYZ,2010-01-04,0.0,10\n";
        assert!(matches!(
            PriceTable::from_reader(csv.as_bytes()),
            Err(DataError::Parse(_))
        ));
    }

    #[test]
    fn test_rejects_bad_date() {
        let csv = "ticker,date,price,market_cap\nXYZ,2010-13-04,1.0,10\n";
        assert!(matches!(
            PriceTable::from_reader(csv.as_bytes()),
            Err(DataError::Csv(_))
        ));
    }

    #[test]
    fn test_first_within_window() {
        let mut series = BTreeMap::new();
        series.insert(date(2010, 4, 4), 1.0);
        series.insert(date(2010, 4, 20), 2.0);

        // Three days after the start is inside a seven-day window.
        let found = first_within(&series, date(2010, 4, 1), 7).unwrap();
        assert_eq!(found.0, date(2010, 4, 4));

        // Nothing between Apr 5 and Apr 11.
        assert!(first_within(&series, date(2010, 4, 5), 7).is_none());

        // The window is exclusive of start + days.
        assert!(first_within(&series, date(2010, 3, 28), 7).is_none());
        assert!(first_within(&series, date(2010, 3, 29), 7).is_some());
        assert!(first_within(&series, date(2010, 4, 4), 0).is_none());
    }

    #[test]
    fn test_first_within_crosses_month_end() {
        let mut series = BTreeMap::new();
        series.insert(date(2011, 1, 2), 5.0);
        let found = first_within(&series, date(2010, 12, 30), 7).unwrap();
        assert_eq!(found.0, date(2011, 1, 2));
    }

    #[test]
    fn test_from_frame() {
        let df = df! {
            "symbol" => &["AAPL", "AAPL", "MSFT"],
            "date" => &[date(2010, 1, 4), date(2010, 1, 5), date(2010, 1, 4)],
            "close" => &[30.5, 31.0, 28.0],
            "market_cap" => &[27000.0, 27500.0, 245000.0],
        }
        .unwrap();

        let table = PriceTable::from_frame(&df).unwrap();
        assert_eq!(table.len(), 2);
        let point = table.get(&Ticker::new("MSFT"), date(2010, 1, 4)).unwrap();
        assert_relative_eq!(point.share_price, 28.0);
    }

    #[test]
    fn test_from_frame_missing_column() {
        let df = df! {
            "symbol" => &["AAPL"],
            "close" => &[30.5],
        }
        .unwrap();

        assert!(matches!(
            PriceTable::from_frame(&df),
            Err(DataError::MissingColumn(ref c)) if c == "date"
        ));
    }
}
