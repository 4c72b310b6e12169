//! Satoshi and token amounts, and the fixed-point bridge between them.
//!
//! All internal accounting runs in `Sats` — the Bitcoin-native smallest
//! unit. The token itself is denominated at a higher precision; the two are
//! bridged by the fixed `SAT_TO_TOKEN` scaling constant, applied only at
//! the mint/redeem boundary. Both types are integer newtypes; arithmetic is
//! checked or saturating, never silently wrapping.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::AmountError;

/// Token smallest-units per satoshi: the token carries 10 more decimal
/// places than Bitcoin.
pub const SAT_TO_TOKEN: u128 = 10_000_000_000;

/// A Bitcoin amount in satoshis.
///
/// `u64` comfortably holds the maximum possible supply
/// (21,000,000 BTC = 2.1e15 sats).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Sats(u64);

impl Sats {
    pub const ZERO: Self = Self(0);

    /// The total Bitcoin supply, in satoshis.
    pub const MAX_SUPPLY: Self = Self(2_100_000_000_000_000);

    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Convert to token smallest-units. Total: `u64::MAX * SAT_TO_TOKEN`
    /// fits in a `u128` with room to spare.
    pub fn to_token_amount(self) -> TokenAmount {
        TokenAmount(self.0 as u128 * SAT_TO_TOKEN)
    }
}

impl fmt::Display for Sats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} sat", self.0)
    }
}

/// A token amount in the token's smallest unit (10^-18 BTC-equivalent).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenAmount(u128);

impl TokenAmount {
    pub const ZERO: Self = Self(0);

    pub fn new(raw: u128) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Convert back to satoshis.
    ///
    /// Fails if the amount is not an exact multiple of `SAT_TO_TOKEN`
    /// (precision would be lost) or does not fit in a `u64`.
    pub fn to_sats(self) -> Result<Sats, AmountError> {
        if self.0 % SAT_TO_TOKEN != 0 {
            return Err(AmountError::PrecisionLoss { amount: self.0 });
        }
        let sats = self.0 / SAT_TO_TOKEN;
        u64::try_from(sats)
            .map(Sats)
            .map_err(|_| AmountError::SatsOverflow { amount: self.0 })
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ktok", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sats_to_token_scales_by_bridge_constant() {
        assert_eq!(Sats::new(1).to_token_amount(), TokenAmount::new(SAT_TO_TOKEN));
        assert_eq!(
            Sats::new(500_000).to_token_amount(),
            TokenAmount::new(500_000 * SAT_TO_TOKEN)
        );
    }

    #[test]
    fn max_supply_bridges_without_overflow() {
        let token = Sats::MAX_SUPPLY.to_token_amount();
        assert_eq!(token.raw(), 2_100_000_000_000_000u128 * SAT_TO_TOKEN);
        assert_eq!(token.to_sats().unwrap(), Sats::MAX_SUPPLY);
    }

    #[test]
    fn u64_max_bridges_without_overflow() {
        // Even amounts beyond the real supply cap must not wrap.
        let token = Sats::new(u64::MAX).to_token_amount();
        assert_eq!(token.to_sats().unwrap(), Sats::new(u64::MAX));
    }

    #[test]
    fn token_to_sats_rejects_precision_loss() {
        let odd = TokenAmount::new(SAT_TO_TOKEN + 1);
        assert!(matches!(odd.to_sats(), Err(AmountError::PrecisionLoss { .. })));
    }

    #[test]
    fn token_to_sats_rejects_u64_overflow() {
        let huge = TokenAmount::new((u64::MAX as u128 + 1) * SAT_TO_TOKEN);
        assert!(matches!(huge.to_sats(), Err(AmountError::SatsOverflow { .. })));
    }

    #[test]
    fn checked_arithmetic() {
        assert_eq!(Sats::new(1).checked_add(Sats::new(2)), Some(Sats::new(3)));
        assert_eq!(Sats::new(u64::MAX).checked_add(Sats::new(1)), None);
        assert_eq!(Sats::new(1).checked_sub(Sats::new(2)), None);
        assert_eq!(Sats::new(1).saturating_sub(Sats::new(2)), Sats::ZERO);
    }
}
