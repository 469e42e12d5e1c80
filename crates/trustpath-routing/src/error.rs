use trustpath_core::{Amount, Asset};
use trustpath_ledger::LedgerError;

/// Errors that can occur while resolving a payment path.
#[derive(Debug, thiserror::Error)]
pub enum RoutingError {
    /// A fetch failed: the ledger was unreachable, rejected the request, or
    /// the request was cancelled.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("malformed trustline {id}: {reason}")]
    MalformedTrustline { id: String, reason: String },

    #[error("trustline price has a zero quote component")]
    ZeroQuotePrice,

    #[error("no trust path found for {amount} of {asset}")]
    NoRouteFound { amount: Amount, asset: Asset },

    #[error("unsupported search depth: {max_hops} hops (at most 1 is supported)")]
    UnsupportedSearchDepth { max_hops: u32 },
}

impl RoutingError {
    /// The ledger could not be reached.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Ledger(e) if e.is_transport())
    }

    /// The ledger answered and rejected a fetch.
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Ledger(e) if e.is_remote())
    }

    pub fn is_no_route(&self) -> bool {
        matches!(self, Self::NoRouteFound { .. })
    }
}
