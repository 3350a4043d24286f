//! Price resolution against the loaded lookup and price tables.

use lectura_traits::{CompanyId, PriceQuote, PriceResolver, Quarter};
use tracing::debug;

use crate::{PriceTable, TickerLookup};

/// Default number of calendar days searched from a quarter's start.
pub const DEFAULT_SEARCH_DAYS: u32 = 7;

/// Resolves a company's quote at a quarter through its ticker.
///
/// The quarter's nominal start date is tried first; on a miss the date
/// advances one calendar day at a time, for `search_days` attempts in total.
#[derive(Debug, Clone)]
pub struct MarketResolver {
    lookup: TickerLookup,
    prices: PriceTable,
    search_days: u32,
}

impl MarketResolver {
    /// Creates a resolver over owned tables.
    pub const fn new(lookup: TickerLookup, prices: PriceTable, search_days: u32) -> Self {
        Self {
            lookup,
            prices,
            search_days,
        }
    }

    /// The ticker lookup.
    pub const fn lookup(&self) -> &TickerLookup {
        &self.lookup
    }

    /// The price table.
    pub const fn prices(&self) -> &PriceTable {
        &self.prices
    }

    /// Number of calendar days tried from a quarter's start.
    pub const fn search_days(&self) -> u32 {
        self.search_days
    }
}

impl PriceResolver for MarketResolver {
    fn resolve(&self, company: CompanyId, quarter: Quarter) -> Option<PriceQuote> {
        let Some(ticker) = self.lookup.get(company) else {
            debug!(%company, "No ticker for company");
            return None;
        };
        let start = quarter.start_date();
        let Some((date, point)) = self.prices.first_within(ticker, start, self.search_days) else {
            debug!(%company, %ticker, %quarter, "No price within search window");
            return None;
        };
        if date != start {
            debug!(%ticker, %quarter, settled = %date, "Price settled after quarter start");
        }
        Some(PriceQuote {
            date,
            share_price: point.share_price,
            market_cap: point.market_cap,
        })
    }
}
