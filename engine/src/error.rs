//! Facade-level errors.
//!
//! Component errors bubble through unchanged; the variants defined here
//! cover the cross-component preconditions only the facade can check.

use thiserror::Error;

use keel_auth::AuthError;
use keel_capacity::CapacityError;
use keel_collab::IssuerError;
use keel_ledger::LedgerError;
use keel_redemption::RedemptionError;
use keel_registry::RegistryError;
use keel_types::{BtcAddress, PrincipalId, ReserveId, ReserveStatus};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Capacity(#[from] CapacityError),

    #[error(transparent)]
    Redemption(#[from] RedemptionError),

    #[error(transparent)]
    Issuer(#[from] IssuerError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("caller {caller} is not the reserve principal {reserve}")]
    NotReservePrincipal {
        caller: PrincipalId,
        reserve: ReserveId,
    },

    #[error("reserve {reserve} does not permit minting (status {status})")]
    ReserveNotActive {
        reserve: ReserveId,
        status: ReserveStatus,
    },

    #[error("reserve is revoked: {0}")]
    ReserveRevoked(ReserveId),

    #[error("invalid bitcoin address: {0}")]
    InvalidBtcAddress(BtcAddress),

    #[error("ownership proof rejected for wallet {0}")]
    OwnershipProofRejected(BtcAddress),

    #[error("wallet {wallet} belongs to reserve {actual}, not {expected}")]
    WalletNotOwnedByReserve {
        wallet: BtcAddress,
        expected: ReserveId,
        actual: ReserveId,
    },

    #[error("reserve {reserve} has {count} open redemption obligations")]
    ObligationsOutstanding { reserve: ReserveId, count: u64 },

    #[error("wallet {wallet} has {count} open redemption obligations")]
    WalletObligationsOutstanding { wallet: BtcAddress, count: u64 },

    #[error("system wallet registration is paused")]
    WalletRegistrationPaused,

    #[error("snapshot codec failure: {0}")]
    Snapshot(String),
}

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}
