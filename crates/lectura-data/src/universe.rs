//! Narrowing the company universe to what every table can serve.
//!
//! Filings are keyed by CIK, prices by ticker. A company is usable only when
//! the lookup knows its ticker and the price table holds that ticker.

use lectura_traits::CompanyId;
use tracing::info;

use crate::{PriceTable, ScoreBook, TickerLookup};

/// Counts observed while intersecting the universe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UniverseReport {
    /// Scored companies before intersection
    pub scored_companies: usize,
    /// Lookup entries before intersection
    pub lookup_entries: usize,
    /// Lookup entries dropped because their ticker has no price series
    pub unpriced_tickers: usize,
    /// Scored companies dropped because they are absent from the lookup
    pub unmapped_companies: usize,
    /// Companies left in both the scores and the lookup
    pub retained_companies: usize,
}

/// Drops lookup entries without prices, then scored companies without a
/// usable lookup entry.
///
/// After this call every company in `scores` maps to a ticker that has a
/// price series.
pub fn intersect_universe(
    scores: &mut ScoreBook,
    lookup: &mut TickerLookup,
    prices: &PriceTable,
) -> UniverseReport {
    let mut report = UniverseReport {
        scored_companies: scores.companies().len(),
        lookup_entries: lookup.len(),
        ..Default::default()
    };

    lookup.retain(|_, ticker| prices.contains(ticker));
    report.unpriced_tickers = report.lookup_entries - lookup.len();

    scores.retain_companies(|company| lookup.contains(company));
    let retained: Vec<CompanyId> = scores.companies();
    report.retained_companies = retained.len();
    report.unmapped_companies = report.scored_companies - report.retained_companies;

    lookup.retain(|company, _| retained.binary_search(&company).is_ok());

    info!(
        scored = report.scored_companies,
        lookup = report.lookup_entries,
        unpriced = report.unpriced_tickers,
        unmapped = report.unmapped_companies,
        retained = report.retained_companies,
        "Intersected scores, lookup and prices"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PricePoint;
    use lectura_traits::{Date, MetricName, Quarter, ScoreEntry, Ticker};

    fn fixture() -> (ScoreBook, TickerLookup, PriceTable) {
        let q = Quarter::new(2010, 2).unwrap();
        let mut scores = ScoreBook::new();
        for cik in [1, 2, 3] {
            scores
                .insert(MetricName::DiffJaccard, q, ScoreEntry::new(CompanyId(cik), 0.1))
                .unwrap();
        }

        let lookup: TickerLookup = [
            (CompanyId(1), Ticker::new("AAA")),
            (CompanyId(2), Ticker::new("BBB")),
            (CompanyId(4), Ticker::new("DDD")),
        ]
        .into_iter()
        .collect();

        let mut prices = PriceTable::new();
        let point = PricePoint {
            share_price: 10.0,
            market_cap: 100.0,
        };
        let day = Date::from_ymd_opt(2010, 4, 1).unwrap();
        prices.insert(Ticker::new("AAA"), day, point);
        prices.insert(Ticker::new("DDD"), day, point);

        (scores, lookup, prices)
    }

    #[test]
    fn test_intersection_counts() {
        let (mut scores, mut lookup, prices) = fixture();
        let report = intersect_universe(&mut scores, &mut lookup, &prices);

        assert_eq!(report.scored_companies, 3);
        assert_eq!(report.lookup_entries, 3);
        assert_eq!(report.unpriced_tickers, 1);
        assert_eq!(report.unmapped_companies, 2);
        assert_eq!(report.retained_companies, 1);

        assert_eq!(scores.companies(), vec![CompanyId(1)]);
        assert_eq!(lookup.len(), 1);
        assert!(lookup.contains(CompanyId(1)));
    }
}
