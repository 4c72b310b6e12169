//! Registry errors. Every variant names the offending entity.

use keel_types::{BtcAddress, ReserveId, ReserveStatus, Sats, WalletStatus};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    // ── Reserves ───────────────────────────────────────────────────────
    #[error("reserve not registered: {0}")]
    ReserveNotRegistered(ReserveId),

    #[error("reserve already registered: {0}")]
    ReserveAlreadyRegistered(ReserveId),

    #[error("reserve identity must not be empty")]
    EmptyReserveId,

    #[error("minting cap must be positive for reserve {0}")]
    CapMustBePositive(ReserveId),

    #[error("invalid status transition for reserve {reserve}: {from} -> {to}")]
    InvalidStatusTransition {
        reserve: ReserveId,
        from: ReserveStatus,
        to: ReserveStatus,
    },

    #[error("capacity ratchet violated for reserve {reserve}: requested {requested}, current {current}")]
    CapNotIncreased {
        reserve: ReserveId,
        current: Sats,
        requested: Sats,
    },

    #[error("reserve {0} was paused by governance and can only be resumed by governance")]
    PausedByGovernance(ReserveId),

    #[error("reserve {0} is not paused")]
    NotPaused(ReserveId),

    // ── Wallets ────────────────────────────────────────────────────────
    #[error("wallet not registered: {0}")]
    WalletNotRegistered(BtcAddress),

    #[error("wallet already registered: {0}")]
    WalletAlreadyRegistered(BtcAddress),

    #[error("wallet address must not be empty")]
    EmptyWalletAddress,

    #[error("wallet limit reached for reserve {reserve}: at most {max} wallets")]
    WalletLimitReached { reserve: ReserveId, max: usize },

    #[error("wallet not inactive: {address} (status {actual})")]
    WalletNotInactive {
        address: BtcAddress,
        actual: WalletStatus,
    },

    #[error("wallet not active: {address} (status {actual})")]
    WalletNotActive {
        address: BtcAddress,
        actual: WalletStatus,
    },

    #[error("wallet not pending de-registration: {address} (status {actual})")]
    WalletNotPendingDeRegistration {
        address: BtcAddress,
        actual: WalletStatus,
    },
}
