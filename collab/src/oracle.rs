//! Reserve balance oracle contract.

use keel_types::{ReserveId, Sats};

/// One oracle observation of a reserve's Bitcoin backing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OracleReading {
    /// The attested backing amount.
    pub amount: Sats,
    /// Whether the observation is stale. A stale reading means "capacity
    /// is zero" regardless of `amount` — never silently substituted with
    /// a cached value.
    pub is_stale: bool,
}

/// External source of truth for each reserve's Bitcoin backing.
pub trait ReserveOracle {
    fn balance(&self, reserve: &ReserveId) -> OracleReading;
}
