//! Price coverage filtering.
//!
//! Every holding of every cell is checked against the price resolver at the
//! cell's own quarter. Unpriced holdings leave that cell only; a company
//! priced in one quarter and not in another keeps its other memberships.

use lectura_traits::{LecturaError, PriceResolver, Result};
use tracing::{info, warn};

use crate::{BucketBook, CellKey};

/// Outcome of a coverage pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverageReport {
    /// Holdings removed across all cells
    pub removed: usize,
    /// Holdings kept across all cells
    pub retained: usize,
    /// Cells whose surviving population is at or below the fragility threshold
    pub fragile_cells: Vec<CellKey>,
}

/// Drops holdings without a resolvable price.
#[derive(Debug)]
pub struct CoverageFilter<'a, R: ?Sized> {
    resolver: &'a R,
    fragile_threshold: usize,
}

impl<'a, R: PriceResolver + ?Sized> CoverageFilter<'a, R> {
    /// Create a filter that flags cells with at most `fragile_threshold` members.
    pub const fn new(resolver: &'a R, fragile_threshold: usize) -> Self {
        Self {
            resolver,
            fragile_threshold,
        }
    }

    /// Filters every cell of `book`, returning the filtered book.
    ///
    /// # Errors
    ///
    /// Returns [`LecturaError::CoverageExhausted`] as soon as a cell is left
    /// without members. The run cannot continue from there.
    pub fn filter(&self, book: BucketBook) -> Result<(BucketBook, CoverageReport)> {
        let mut filtered = BucketBook::new(
            book.metrics().to_vec(),
            book.quarters().to_vec(),
            book.labels().to_vec(),
        );
        let mut report = CoverageReport::default();

        for (key, holdings) in book.iter() {
            let before = holdings.len();
            let kept: Vec<_> = holdings
                .iter()
                .filter(|h| self.resolver.has_price(h.company, key.quarter))
                .copied()
                .collect();
            let removed = before - kept.len();
            info!(cell = %key, removed, total = before, "Removed unpriced companies");

            if kept.is_empty() {
                return Err(LecturaError::CoverageExhausted {
                    metric: key.metric,
                    bucket: key.bucket,
                    quarter: key.quarter,
                });
            }
            if kept.len() <= self.fragile_threshold {
                warn!(cell = %key, members = kept.len(), "Cell population is fragile");
                report.fragile_cells.push(key);
            }

            report.removed += removed;
            report.retained += kept.len();
            filtered.insert(key, kept);
        }

        Ok((filtered, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lectura_traits::{BucketLabel, CompanyId, Holding, MetricName, PriceQuote, Quarter};
    use std::collections::HashSet;

    struct SetResolver {
        priced: HashSet<(CompanyId, Quarter)>,
    }

    impl PriceResolver for SetResolver {
        fn resolve(&self, company: CompanyId, quarter: Quarter) -> Option<PriceQuote> {
            self.priced.contains(&(company, quarter)).then(|| PriceQuote {
                date: quarter.start_date(),
                share_price: 10.0,
                market_cap: 100.0,
            })
        }
    }

    fn book(q: Quarter, members: &[u64]) -> (BucketBook, CellKey) {
        let label = BucketLabel::new('Q', 1);
        let key = CellKey::new(MetricName::DiffJaccard, label, q);
        let mut book = BucketBook::new(vec![MetricName::DiffJaccard], vec![q], vec![label]);
        book.insert(
            key,
            members
                .iter()
                .map(|&id| Holding::new(CompanyId(id), 0.1))
                .collect(),
        );
        (book, key)
    }

    #[test]
    fn test_unpriced_holdings_removed() {
        let q = Quarter::new(2010, 2).unwrap();
        let (book, key) = book(q, &[1, 2, 3]);
        let resolver = SetResolver {
            priced: HashSet::from([(CompanyId(1), q), (CompanyId(3), q)]),
        };

        let (filtered, report) = CoverageFilter::new(&resolver, 20).filter(book).unwrap();
        let kept: Vec<u64> = filtered.cell(key).iter().map(|h| h.company.0).collect();
        assert_eq!(kept, vec![1, 3]);
        assert_eq!(report.removed, 1);
        assert_eq!(report.retained, 2);
        assert_eq!(report.fragile_cells, vec![key]);
    }

    #[test]
    fn test_large_cell_is_not_fragile() {
        let q = Quarter::new(2010, 2).unwrap();
        let ids: Vec<u64> = (1..=21).collect();
        let (book, _) = book(q, &ids);
        let resolver = SetResolver {
            priced: ids.iter().map(|&id| (CompanyId(id), q)).collect(),
        };

        let (_, report) = CoverageFilter::new(&resolver, 20).filter(book).unwrap();
        assert!(report.fragile_cells.is_empty());
        assert_eq!(report.retained, 21);
    }

    #[test]
    fn test_emptied_cell_is_fatal() {
        let q = Quarter::new(2010, 2).unwrap();
        let (book, _) = book(q, &[1, 2]);
        let resolver = SetResolver {
            priced: HashSet::from([(CompanyId(1), q.next())]),
        };

        let err = CoverageFilter::new(&resolver, 20).filter(book).unwrap_err();
        assert!(err.is_coverage_failure());
        assert!(matches!(
            err,
            LecturaError::CoverageExhausted { quarter, .. } if quarter == q
        ));
    }
}
