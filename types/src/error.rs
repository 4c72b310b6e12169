//! Errors for the fundamental types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AmountError {
    #[error("token amount {amount} is not a whole number of satoshis")]
    PrecisionLoss { amount: u128 },

    #[error("token amount {amount} exceeds the representable satoshi range")]
    SatsOverflow { amount: u128 },
}
