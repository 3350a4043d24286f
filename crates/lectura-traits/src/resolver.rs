//! Price resolver trait.
//!
//! The portfolio engine never reads price tables directly. Every share price
//! and market capitalization it needs goes through a [`PriceResolver`], which
//! keeps the engine independent of how prices are stored or loaded.

use crate::{CompanyId, PriceQuote, Quarter};

/// Resolves the applicable trading-day quote of a company at a quarter.
///
/// Implementations must be pure lookups: the same `(company, quarter)` pair
/// always yields the same answer. They are `Send + Sync` so independent
/// portfolio tracks can be simulated in parallel against one resolver.
///
/// # Example
///
/// ```no_run
/// use lectura_traits::{CompanyId, PriceQuote, PriceResolver, Quarter};
///
/// struct FlatPrice;
///
/// impl PriceResolver for FlatPrice {
///     fn resolve(&self, _company: CompanyId, quarter: Quarter) -> Option<PriceQuote> {
///         Some(PriceQuote {
///             date: quarter.start_date(),
///             share_price: 10.0,
///             market_cap: 1_000.0,
///         })
///     }
/// }
/// ```
pub trait PriceResolver: Send + Sync {
    /// Returns the quote for `company` at `quarter`, or `None` when no price
    /// is available within the resolver's search window.
    ///
    /// A missing quote is never fatal for the resolver; callers decide whether
    /// it drops the company or aborts the run.
    fn resolve(&self, company: CompanyId, quarter: Quarter) -> Option<PriceQuote>;

    /// Whether a quote exists for `company` at `quarter`.
    fn has_price(&self, company: CompanyId, quarter: Quarter) -> bool {
        self.resolve(company, quarter).is_some()
    }
}

impl<R: PriceResolver + ?Sized> PriceResolver for &R {
    fn resolve(&self, company: CompanyId, quarter: Quarter) -> Option<PriceQuote> {
        (**self).resolve(company, quarter)
    }
}
