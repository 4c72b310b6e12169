//! Protocol parameters — governance-tunable operating bounds.

use serde::{Deserialize, Serialize};

use crate::amount::Sats;

/// Operating parameters for the reserve engine.
///
/// Loaded from configuration at startup and adjustable by governance at
/// runtime. Redemption deadlines snapshot the timeout at creation, so a
/// later change never moves an existing deadline.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProtocolParams {
    /// Smallest mint a reserve may perform.
    #[serde(default = "default_min_mint")]
    pub min_mint: Sats,

    /// Largest single mint a reserve may perform.
    #[serde(default = "default_max_single_mint")]
    pub max_single_mint: Sats,

    /// Smallest redemption request accepted.
    #[serde(default = "default_min_redemption")]
    pub min_redemption: Sats,

    /// Largest redemption request accepted.
    #[serde(default = "default_max_redemption")]
    pub max_redemption: Sats,

    /// Seconds a reserve has to fulfill a redemption before it counts as
    /// timed out. Advisory for dispute resolution, not a hard cutoff.
    #[serde(default = "default_redemption_timeout_secs")]
    pub redemption_timeout_secs: u64,

    /// Maximum wallets a single reserve may have registered
    /// (deregistered wallets do not count).
    #[serde(default = "default_max_wallets_per_reserve")]
    pub max_wallets_per_reserve: usize,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_min_mint() -> Sats {
    Sats::new(10_000) // 0.0001 BTC
}

fn default_max_single_mint() -> Sats {
    Sats::new(10_000_000_000) // 100 BTC
}

fn default_min_redemption() -> Sats {
    Sats::new(50_000) // 0.0005 BTC
}

fn default_max_redemption() -> Sats {
    Sats::new(50_000_000_000) // 500 BTC
}

fn default_redemption_timeout_secs() -> u64 {
    48 * 3600
}

fn default_max_wallets_per_reserve() -> usize {
    10
}

impl Default for ProtocolParams {
    fn default() -> Self {
        Self {
            min_mint: default_min_mint(),
            max_single_mint: default_max_single_mint(),
            min_redemption: default_min_redemption(),
            max_redemption: default_max_redemption(),
            redemption_timeout_secs: default_redemption_timeout_secs(),
            max_wallets_per_reserve: default_max_wallets_per_reserve(),
        }
    }
}
