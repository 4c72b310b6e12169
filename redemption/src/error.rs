//! Redemption errors. Every variant names the offending entity.

use keel_types::{RedemptionId, RedemptionStatus, Sats};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RedemptionError {
    #[error("unknown redemption: {0}")]
    Unknown(RedemptionId),

    #[error("redemption {id} is not pending (status {status})")]
    NotPending {
        id: RedemptionId,
        status: RedemptionStatus,
    },

    #[error("redemption of {amount} below minimum {min}")]
    BelowMinimum { amount: Sats, min: Sats },

    #[error("redemption of {amount} above maximum {max}")]
    AboveMaximum { amount: Sats, max: Sats },

    #[error("fulfillment amount must be positive for {0}")]
    ZeroFulfillmentAmount(RedemptionId),

    #[error("default reason must not be empty for {0}")]
    EmptyDefaultReason(RedemptionId),
}
