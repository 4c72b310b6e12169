//! Ledger errors. Every variant names the offending entity.

use keel_types::{ReserveId, Sats};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("reserve not authorized: {0}")]
    NotAuthorized(ReserveId),

    #[error("reserve already authorized: {0}")]
    AlreadyAuthorized(ReserveId),

    #[error("minting cap must be positive for reserve {0}")]
    CapMustBePositive(ReserveId),

    #[error("cannot deauthorize reserve {reserve}: {minted} still minted")]
    MintedOutstanding { reserve: ReserveId, minted: Sats },

    #[error("system minting is paused")]
    SystemMintingPaused,

    #[error("system redemption is paused")]
    SystemRedemptionPaused,

    #[error("reserve is emergency-paused: {0}")]
    ReservePaused(ReserveId),

    #[error("mint of {amount} below minimum {min}")]
    BelowMinimumMint { amount: Sats, min: Sats },

    #[error("mint of {amount} above single-mint maximum {max}")]
    AboveMaximumMint { amount: Sats, max: Sats },

    #[error("mint exceeds cap for reserve {reserve}: minted {minted} + {amount} > cap {cap}")]
    ExceedsCap {
        reserve: ReserveId,
        minted: Sats,
        amount: Sats,
        cap: Sats,
    },

    #[error(
        "insufficient backing for reserve {reserve}: minted {minted} + {amount} > backing {backing}"
    )]
    InsufficientBacking {
        reserve: ReserveId,
        minted: Sats,
        amount: Sats,
        backing: Sats,
    },

    #[error("insufficient minted for reserve {reserve}: requested {requested}, minted {minted}")]
    InsufficientMinted {
        reserve: ReserveId,
        requested: Sats,
        minted: Sats,
    },

    #[error("minted amount {minted} exceeds requested reserve cap {requested} for {reserve}")]
    CapBelowMinted {
        reserve: ReserveId,
        minted: Sats,
        requested: Sats,
    },

    #[error("amount overflow on reserve {0}")]
    AmountOverflow(ReserveId),

    #[error(transparent)]
    Issuer(#[from] keel_collab::IssuerError),
}
