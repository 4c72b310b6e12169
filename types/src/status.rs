//! Lifecycle status enums and their transition tables.
//!
//! Every lifecycle in the engine is a tagged enum with an explicit
//! `can_transition_to` table; anything off-table is rejected by the owning
//! component with a typed error.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The operational status of a reserve (qualified custodian).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReserveStatus {
    /// Fully operational: may mint, redeem, and manage wallets.
    Active,
    /// Minting halted; redemption and wallet management continue.
    MintingPaused,
    /// All custodian-initiated operations halted.
    Paused,
    /// Under compliance/solvency review; operations halted pending outcome.
    UnderReview,
    /// Permanently removed from the custodian set. Absorbing.
    Revoked,
}

impl ReserveStatus {
    /// Whether this status permits minting new supply.
    pub fn permits_minting(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Transition table. `Revoked` is absorbing; a reserve under review
    /// either clears fully, stays halted, or is revoked — it cannot move
    /// to the half-open `MintingPaused` state.
    pub fn can_transition_to(&self, to: ReserveStatus) -> bool {
        use ReserveStatus::*;
        match (self, to) {
            (Active, MintingPaused | Paused | UnderReview | Revoked) => true,
            (MintingPaused, Active | Paused | UnderReview | Revoked) => true,
            (Paused, Active | MintingPaused | UnderReview | Revoked) => true,
            (UnderReview, Active | Paused | Revoked) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ReserveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Active => "active",
            Self::MintingPaused => "minting-paused",
            Self::Paused => "paused",
            Self::UnderReview => "under-review",
            Self::Revoked => "revoked",
        };
        write!(f, "{s}")
    }
}

/// How much of a reserve's operation a pause covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PauseLevel {
    /// Only minting is halted.
    MintingOnly,
    /// All custodian-initiated operations are halted.
    Complete,
}

impl PauseLevel {
    /// The reserve status a pause at this level lands in.
    pub fn paused_status(&self) -> ReserveStatus {
        match self {
            Self::MintingOnly => ReserveStatus::MintingPaused,
            Self::Complete => ReserveStatus::Paused,
        }
    }
}

/// The lifecycle state of a registered Bitcoin wallet.
///
/// One-way except the initial activation: wallets are never physically
/// removed, so `Deregistered` records remain for audit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WalletStatus {
    /// Registered but not yet usable for redemptions.
    Inactive,
    /// Usable as a redemption source.
    Active,
    /// De-registration requested; awaiting finalization.
    PendingDeRegistration,
    /// De-registration finalized. Terminal.
    Deregistered,
}

impl WalletStatus {
    pub fn can_transition_to(&self, to: WalletStatus) -> bool {
        use WalletStatus::*;
        matches!(
            (self, to),
            (Inactive, Active)
                | (Active, PendingDeRegistration)
                | (PendingDeRegistration, Deregistered)
        )
    }
}

impl fmt::Display for WalletStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Inactive => "inactive",
            Self::Active => "active",
            Self::PendingDeRegistration => "pending-deregistration",
            Self::Deregistered => "deregistered",
        };
        write!(f, "{s}")
    }
}

/// The state of a redemption request. `Pending` is the only non-terminal
/// state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RedemptionStatus {
    Pending,
    Fulfilled,
    Defaulted,
}

impl RedemptionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for RedemptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Fulfilled => "fulfilled",
            Self::Defaulted => "defaulted",
        };
        write!(f, "{s}")
    }
}
