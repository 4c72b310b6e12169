//! Token issuer contract.

use keel_types::{PrincipalId, TokenAmount};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IssuerError {
    #[error("insufficient token balance for {principal}: need {needed}, have {available}")]
    InsufficientBalance {
        principal: PrincipalId,
        needed: TokenAmount,
        available: TokenAmount,
    },

    #[error("insufficient escrow: need {needed}, have {available}")]
    InsufficientEscrow {
        needed: TokenAmount,
        available: TokenAmount,
    },

    #[error("token issuer failure: {0}")]
    Failed(String),
}

/// The transferable-token implementation, consumed at the mint/redeem
/// boundary only. Assumed to succeed once called; a failure is fatal to
/// the calling operation and is propagated, not retried.
pub trait TokenIssuer {
    /// Credit freshly minted tokens to `destination`.
    fn credit(&mut self, destination: &PrincipalId, amount: TokenAmount) -> Result<(), IssuerError>;

    /// Move `amount` of `from`'s tokens into the redemption escrow.
    fn escrow(&mut self, from: &PrincipalId, amount: TokenAmount) -> Result<(), IssuerError>;

    /// Burn `amount` out of the redemption escrow.
    fn debit_from_escrow(&mut self, amount: TokenAmount) -> Result<(), IssuerError>;
}
