//! Calendar quarters and the simulation horizon.
//!
//! Quarters form a strict total order (year first, then quarter number). The
//! [`Horizon`] is the explicit ordered list of quarters a run covers, together
//! with the lag: the number of leading quarters that have no prior filing to
//! compare against and are therefore never simulated.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{LecturaError, Result};

/// A calendar quarter, e.g. `2010Q3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Quarter {
    year: i32,
    number: u8,
}

impl Quarter {
    /// Creates a quarter, validating the quarter number and the year.
    pub fn new(year: i32, number: u8) -> Result<Self> {
        if !(1..=4).contains(&number) {
            return Err(LecturaError::InvalidQuarter(format!(
                "quarter number must be 1-4, got {number}"
            )));
        }
        if NaiveDate::from_ymd_opt(year, 1, 1).is_none()
            || NaiveDate::from_ymd_opt(year + 1, 1, 1).is_none()
        {
            return Err(LecturaError::InvalidQuarter(format!(
                "year {year} is outside the supported calendar"
            )));
        }
        Ok(Self { year, number })
    }

    /// Builds a quarter the caller knows to be valid.
    pub(crate) const fn from_parts(year: i32, number: u8) -> Self {
        Self { year, number }
    }

    /// Calendar year.
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// Quarter number in `1..=4`.
    pub const fn number(&self) -> u8 {
        self.number
    }

    /// First month of the quarter (1, 4, 7 or 10).
    pub const fn first_month(&self) -> u32 {
        (self.number as u32 - 1) * 3 + 1
    }

    /// Nominal start date: the first calendar day of the quarter's first month.
    pub fn start_date(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.first_month(), 1).unwrap_or_default()
    }

    /// Last calendar day of the quarter.
    pub fn end_date(&self) -> NaiveDate {
        self.next()
            .start_date()
            .pred_opt()
            .unwrap_or_else(|| self.start_date())
    }

    /// The following quarter.
    pub const fn next(&self) -> Self {
        if self.number == 4 {
            Self {
                year: self.year + 1,
                number: 1,
            }
        } else {
            Self {
                year: self.year,
                number: self.number + 1,
            }
        }
    }

    /// The preceding quarter.
    pub const fn previous(&self) -> Self {
        if self.number == 1 {
            Self {
                year: self.year - 1,
                number: 4,
            }
        } else {
            Self {
                year: self.year,
                number: self.number - 1,
            }
        }
    }

    /// All quarters from `start` to `end`, both included.
    ///
    /// Returns an empty list when `end` precedes `start`.
    pub fn range(start: Self, end: Self) -> Vec<Self> {
        let mut quarters = Vec::new();
        let mut current = start;
        while current <= end {
            quarters.push(current);
            current = current.next();
        }
        quarters
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Q{}", self.year, self.number)
    }
}

impl FromStr for Quarter {
    type Err = LecturaError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (year, number) = s
            .split_once(['Q', 'q'])
            .ok_or_else(|| LecturaError::InvalidQuarter(format!("expected YYYYQn, got '{s}'")))?;
        let year: i32 = year
            .parse()
            .map_err(|_| LecturaError::InvalidQuarter(format!("bad year in '{s}'")))?;
        let number: u8 = number
            .parse()
            .map_err(|_| LecturaError::InvalidQuarter(format!("bad quarter number in '{s}'")))?;
        Self::new(year, number)
    }
}

impl TryFrom<String> for Quarter {
    type Error = LecturaError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Quarter> for String {
    fn from(q: Quarter) -> Self {
        q.to_string()
    }
}

/// The ordered list of quarters covered by a run, with its lag offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Horizon {
    quarters: Vec<Quarter>,
    lag: usize,
}

impl Horizon {
    /// Builds the horizon `start..=end` with `lag` leading unsimulated quarters.
    ///
    /// # Errors
    ///
    /// Fails when the range is empty or not longer than the lag, since the run
    /// would then have no simulated quarter at all.
    pub fn new(start: Quarter, end: Quarter, lag: usize) -> Result<Self> {
        let quarters = Quarter::range(start, end);
        if quarters.len() <= lag {
            return Err(LecturaError::configuration(format!(
                "horizon {start}..{end} has {} quarters, need more than the lag of {lag}",
                quarters.len()
            )));
        }
        Ok(Self { quarters, lag })
    }

    /// Every quarter of the horizon, ascending.
    pub fn quarters(&self) -> &[Quarter] {
        &self.quarters
    }

    /// Number of leading quarters without a prior-period comparison.
    pub const fn lag(&self) -> usize {
        self.lag
    }

    /// Quarters that take part in the simulation, ascending.
    pub fn simulated(&self) -> &[Quarter] {
        &self.quarters[self.lag..]
    }

    /// First simulated quarter, where every portfolio is seeded.
    pub fn seed(&self) -> Quarter {
        self.quarters[self.lag]
    }

    /// Whether `quarter` is one of the simulated quarters.
    pub fn is_simulated(&self, quarter: Quarter) -> bool {
        self.simulated().binary_search(&quarter).is_ok()
    }

    /// Total number of quarters, lag included.
    pub fn len(&self) -> usize {
        self.quarters.len()
    }

    /// A valid horizon always holds at least one simulated quarter.
    pub fn is_empty(&self) -> bool {
        self.quarters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn q(year: i32, number: u8) -> Quarter {
        Quarter::new(year, number).unwrap()
    }

    #[test]
    fn test_quarter_validation() {
        assert!(Quarter::new(2010, 0).is_err());
        assert!(Quarter::new(2010, 5).is_err());
        assert!(Quarter::new(2010, 4).is_ok());
    }

    #[test]
    fn test_quarter_ordering() {
        assert!(q(2010, 4) < q(2011, 1));
        assert!(q(2011, 1) < q(2011, 2));
        assert_eq!(q(2010, 4).next(), q(2011, 1));
        assert_eq!(q(2011, 1).previous(), q(2010, 4));
    }

    #[test]
    fn test_start_and_end_dates() {
        let start = q(2012, 3).start_date();
        assert_eq!((start.year(), start.month(), start.day()), (2012, 7, 1));

        let end = q(2012, 4).end_date();
        assert_eq!((end.year(), end.month(), end.day()), (2012, 12, 31));

        let end = q(2012, 1).end_date();
        assert_eq!((end.month(), end.day()), (3, 31));
    }

    #[test]
    fn test_parse_and_display() {
        let parsed: Quarter = "2010Q2".parse().unwrap();
        assert_eq!(parsed, q(2010, 2));
        assert_eq!(parsed.to_string(), "2010Q2");
        assert!("2010-2".parse::<Quarter>().is_err());
        assert!("2010Q9".parse::<Quarter>().is_err());
    }

    #[test]
    fn test_serde_uses_display_form() {
        let json = serde_json::to_string(&q(2011, 3)).unwrap();
        assert_eq!(json, "\"2011Q3\"");
        let back: Quarter = serde_json::from_str(&json).unwrap();
        assert_eq!(back, q(2011, 3));
    }

    #[test]
    fn test_range_inclusive() {
        let quarters = Quarter::range(q(2010, 1), q(2012, 4));
        assert_eq!(quarters.len(), 12);
        assert_eq!(quarters[0], q(2010, 1));
        assert_eq!(quarters[11], q(2012, 4));
        assert!(quarters.windows(2).all(|w| w[0] < w[1]));
        assert!(Quarter::range(q(2012, 1), q(2011, 1)).is_empty());
    }

    #[test]
    fn test_horizon_seed_and_simulated() {
        let horizon = Horizon::new(q(2010, 1), q(2010, 4), 1).unwrap();
        assert_eq!(horizon.len(), 4);
        assert_eq!(horizon.seed(), q(2010, 2));
        assert_eq!(horizon.simulated(), &[q(2010, 2), q(2010, 3), q(2010, 4)]);
        assert!(horizon.is_simulated(q(2010, 3)));
        assert!(!horizon.is_simulated(q(2010, 1)));
    }

    #[test]
    fn test_horizon_too_short_for_lag() {
        let result = Horizon::new(q(2010, 1), q(2010, 4), 4);
        assert!(matches!(result, Err(LecturaError::Configuration(_))));
    }
}
