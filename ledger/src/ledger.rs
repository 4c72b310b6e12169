//! The reserve ledger — mint/redeem bookkeeping and pause state.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use keel_collab::TokenIssuer;
use keel_types::{PrincipalId, ProtocolParams, ReserveId, Sats, TokenAmount};

use crate::error::LedgerError;

/// Per-reserve ledger record.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Backing attested by the reserve via `update_backing`.
    pub backing: Sats,
    /// Outstanding minted supply. Invariant: `minted <= minting_cap`.
    pub minted: Sats,
    /// Governance-level cap: adjustable both ways, but never below
    /// `minted`.
    pub minting_cap: Sats,
    /// Fast-acting halt set by the emergency council, cleared only by
    /// governance.
    pub emergency_paused: bool,
}

/// Independent system-wide pause flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemPause {
    pub minting: bool,
    pub redemption: bool,
    pub wallet_registration: bool,
}

/// The global ledger: per-reserve entries plus the `total_minted`
/// aggregate.
///
/// Conservation invariant: `total_minted` equals the sum of every entry's
/// `minted` at all times. Each operation either applies fully or not at
/// all — every precondition is checked before the first mutation.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ReserveLedger {
    entries: HashMap<ReserveId, LedgerEntry>,
    total_minted: Sats,
    pause: SystemPause,
}

impl ReserveLedger {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Reserve set ────────────────────────────────────────────────────

    /// Add a reserve with its initial cap and empty balances.
    pub fn authorize_reserve(&mut self, reserve: ReserveId, cap: Sats) -> Result<(), LedgerError> {
        if cap.is_zero() {
            return Err(LedgerError::CapMustBePositive(reserve));
        }
        if self.entries.contains_key(&reserve) {
            return Err(LedgerError::AlreadyAuthorized(reserve));
        }
        self.entries.insert(
            reserve,
            LedgerEntry {
                backing: Sats::ZERO,
                minted: Sats::ZERO,
                minting_cap: cap,
                emergency_paused: false,
            },
        );
        Ok(())
    }

    /// Remove a reserve. Fails while any supply is outstanding.
    pub fn deauthorize_reserve(&mut self, reserve: &ReserveId) -> Result<(), LedgerError> {
        let entry = self.get(reserve)?;
        if !entry.minted.is_zero() {
            return Err(LedgerError::MintedOutstanding {
                reserve: reserve.clone(),
                minted: entry.minted,
            });
        }
        self.entries.remove(reserve);
        Ok(())
    }

    // ── Balance operations ─────────────────────────────────────────────

    /// Record the reserve's attested backing. No effect on minted supply.
    pub fn update_backing(&mut self, reserve: &ReserveId, amount: Sats) -> Result<(), LedgerError> {
        let entry = self.get_mut(reserve)?;
        if entry.emergency_paused {
            return Err(LedgerError::ReservePaused(reserve.clone()));
        }
        entry.backing = amount;
        Ok(())
    }

    /// Mint `amount` against `reserve`, crediting `destination` through
    /// the token issuer at token precision.
    ///
    /// The issuer is invoked after every precondition has passed and
    /// before any ledger mutation, so an issuer failure leaves the ledger
    /// untouched.
    pub fn mint<I: TokenIssuer>(
        &mut self,
        reserve: &ReserveId,
        destination: &PrincipalId,
        amount: Sats,
        params: &ProtocolParams,
        issuer: &mut I,
    ) -> Result<TokenAmount, LedgerError> {
        if self.pause.minting {
            return Err(LedgerError::SystemMintingPaused);
        }
        let entry = self.get(reserve)?;
        if entry.emergency_paused {
            return Err(LedgerError::ReservePaused(reserve.clone()));
        }
        if amount < params.min_mint {
            return Err(LedgerError::BelowMinimumMint {
                amount,
                min: params.min_mint,
            });
        }
        if amount > params.max_single_mint {
            return Err(LedgerError::AboveMaximumMint {
                amount,
                max: params.max_single_mint,
            });
        }
        let new_minted = entry
            .minted
            .checked_add(amount)
            .ok_or_else(|| LedgerError::AmountOverflow(reserve.clone()))?;
        if new_minted > entry.minting_cap {
            return Err(LedgerError::ExceedsCap {
                reserve: reserve.clone(),
                minted: entry.minted,
                amount,
                cap: entry.minting_cap,
            });
        }
        if new_minted > entry.backing {
            return Err(LedgerError::InsufficientBacking {
                reserve: reserve.clone(),
                minted: entry.minted,
                amount,
                backing: entry.backing,
            });
        }
        let new_total = self
            .total_minted
            .checked_add(amount)
            .ok_or_else(|| LedgerError::AmountOverflow(reserve.clone()))?;

        let token_amount = amount.to_token_amount();
        issuer.credit(destination, token_amount)?;

        let entry = self.get_mut(reserve)?;
        entry.minted = new_minted;
        self.total_minted = new_total;
        Ok(token_amount)
    }

    /// Retire `amount` of `reserve`'s minted supply.
    pub fn redeem(&mut self, reserve: &ReserveId, amount: Sats) -> Result<(), LedgerError> {
        if self.pause.redemption {
            return Err(LedgerError::SystemRedemptionPaused);
        }
        let entry = self.get_mut(reserve)?;
        if entry.emergency_paused {
            return Err(LedgerError::ReservePaused(reserve.clone()));
        }
        if amount > entry.minted {
            return Err(LedgerError::InsufficientMinted {
                reserve: reserve.clone(),
                requested: amount,
                minted: entry.minted,
            });
        }
        entry.minted = entry.minted.saturating_sub(amount);
        self.total_minted = self.total_minted.saturating_sub(amount);
        Ok(())
    }

    /// Governance cap adjustment: both directions, but never below the
    /// outstanding minted amount.
    pub fn set_minting_cap(&mut self, reserve: &ReserveId, new_cap: Sats) -> Result<(), LedgerError> {
        let entry = self.get_mut(reserve)?;
        if new_cap < entry.minted {
            return Err(LedgerError::CapBelowMinted {
                reserve: reserve.clone(),
                minted: entry.minted,
                requested: new_cap,
            });
        }
        entry.minting_cap = new_cap;
        Ok(())
    }

    // ── Pause control ──────────────────────────────────────────────────

    pub fn set_emergency_pause(&mut self, reserve: &ReserveId) -> Result<(), LedgerError> {
        self.get_mut(reserve)?.emergency_paused = true;
        Ok(())
    }

    pub fn clear_emergency_pause(&mut self, reserve: &ReserveId) -> Result<(), LedgerError> {
        self.get_mut(reserve)?.emergency_paused = false;
        Ok(())
    }

    pub fn set_minting_paused(&mut self, paused: bool) {
        self.pause.minting = paused;
    }

    pub fn set_redemption_paused(&mut self, paused: bool) {
        self.pause.redemption = paused;
    }

    pub fn set_wallet_registration_paused(&mut self, paused: bool) {
        self.pause.wallet_registration = paused;
    }

    // ── Queries ────────────────────────────────────────────────────────

    pub fn is_authorized(&self, reserve: &ReserveId) -> bool {
        self.entries.contains_key(reserve)
    }

    pub fn is_emergency_paused(&self, reserve: &ReserveId) -> bool {
        self.entries
            .get(reserve)
            .map(|e| e.emergency_paused)
            .unwrap_or(false)
    }

    pub fn minted_of(&self, reserve: &ReserveId) -> Option<Sats> {
        self.entries.get(reserve).map(|e| e.minted)
    }

    pub fn backing_of(&self, reserve: &ReserveId) -> Option<Sats> {
        self.entries.get(reserve).map(|e| e.backing)
    }

    pub fn cap_of(&self, reserve: &ReserveId) -> Option<Sats> {
        self.entries.get(reserve).map(|e| e.minting_cap)
    }

    pub fn entry(&self, reserve: &ReserveId) -> Option<&LedgerEntry> {
        self.entries.get(reserve)
    }

    pub fn total_minted(&self) -> Sats {
        self.total_minted
    }

    pub fn pause(&self) -> SystemPause {
        self.pause
    }

    /// Conservation check: the aggregate equals the sum of the parts.
    pub fn conserved(&self) -> bool {
        let sum = self
            .entries
            .values()
            .try_fold(Sats::ZERO, |acc, e| acc.checked_add(e.minted));
        sum == Some(self.total_minted)
    }

    fn get(&self, reserve: &ReserveId) -> Result<&LedgerEntry, LedgerError> {
        self.entries
            .get(reserve)
            .ok_or_else(|| LedgerError::NotAuthorized(reserve.clone()))
    }

    fn get_mut(&mut self, reserve: &ReserveId) -> Result<&mut LedgerEntry, LedgerError> {
        self.entries
            .get_mut(reserve)
            .ok_or_else(|| LedgerError::NotAuthorized(reserve.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keel_nullables::NullIssuer;
    use keel_types::SAT_TO_TOKEN;

    fn rid(name: &str) -> ReserveId {
        ReserveId::new(name)
    }

    fn dest() -> PrincipalId {
        PrincipalId::new("holder")
    }

    fn params() -> ProtocolParams {
        ProtocolParams {
            min_mint: Sats::new(1_000),
            max_single_mint: Sats::new(1_000_000),
            ..ProtocolParams::default()
        }
    }

    /// Ledger with one authorized reserve, capped and backed.
    fn ledger_with(cap: u64, backing: u64) -> ReserveLedger {
        let mut ledger = ReserveLedger::new();
        ledger.authorize_reserve(rid("r1"), Sats::new(cap)).unwrap();
        ledger.update_backing(&rid("r1"), Sats::new(backing)).unwrap();
        ledger
    }

    #[test]
    fn authorize_rejects_zero_cap_and_duplicates() {
        let mut ledger = ReserveLedger::new();
        assert!(matches!(
            ledger.authorize_reserve(rid("r1"), Sats::ZERO),
            Err(LedgerError::CapMustBePositive(_))
        ));
        ledger.authorize_reserve(rid("r1"), Sats::new(100)).unwrap();
        assert!(matches!(
            ledger.authorize_reserve(rid("r1"), Sats::new(200)),
            Err(LedgerError::AlreadyAuthorized(_))
        ));
    }

    #[test]
    fn mint_updates_minted_total_and_credits_issuer() {
        let mut ledger = ledger_with(1_000_000, 1_000_000);
        let mut issuer = NullIssuer::new();

        let token = ledger
            .mint(&rid("r1"), &dest(), Sats::new(500_000), &params(), &mut issuer)
            .unwrap();

        assert_eq!(token.raw(), 500_000 * SAT_TO_TOKEN);
        assert_eq!(ledger.minted_of(&rid("r1")), Some(Sats::new(500_000)));
        assert_eq!(ledger.total_minted(), Sats::new(500_000));
        assert_eq!(issuer.credited_to(&dest()).raw(), 500_000 * SAT_TO_TOKEN);
        assert!(ledger.conserved());
    }

    #[test]
    fn mint_enforces_the_tighter_of_cap_and_backing() {
        // Cap is the binding constraint.
        let mut ledger = ledger_with(400_000, 1_000_000);
        let mut issuer = NullIssuer::new();
        assert!(matches!(
            ledger.mint(&rid("r1"), &dest(), Sats::new(500_000), &params(), &mut issuer),
            Err(LedgerError::ExceedsCap { .. })
        ));

        // Backing is the binding constraint.
        let mut ledger = ledger_with(1_000_000, 400_000);
        assert!(matches!(
            ledger.mint(&rid("r1"), &dest(), Sats::new(500_000), &params(), &mut issuer),
            Err(LedgerError::InsufficientBacking { .. })
        ));
        assert_eq!(ledger.total_minted(), Sats::ZERO);
    }

    #[test]
    fn mint_enforces_amount_bounds() {
        let mut ledger = ledger_with(10_000_000, 10_000_000);
        let mut issuer = NullIssuer::new();
        assert!(matches!(
            ledger.mint(&rid("r1"), &dest(), Sats::new(999), &params(), &mut issuer),
            Err(LedgerError::BelowMinimumMint { .. })
        ));
        assert!(matches!(
            ledger.mint(&rid("r1"), &dest(), Sats::new(1_000_001), &params(), &mut issuer),
            Err(LedgerError::AboveMaximumMint { .. })
        ));
    }

    #[test]
    fn mint_respects_pauses() {
        let mut ledger = ledger_with(1_000_000, 1_000_000);
        let mut issuer = NullIssuer::new();

        ledger.set_minting_paused(true);
        assert!(matches!(
            ledger.mint(&rid("r1"), &dest(), Sats::new(10_000), &params(), &mut issuer),
            Err(LedgerError::SystemMintingPaused)
        ));
        ledger.set_minting_paused(false);

        ledger.set_emergency_pause(&rid("r1")).unwrap();
        assert!(matches!(
            ledger.mint(&rid("r1"), &dest(), Sats::new(10_000), &params(), &mut issuer),
            Err(LedgerError::ReservePaused(_))
        ));
    }

    #[test]
    fn issuer_failure_leaves_ledger_untouched() {
        let mut ledger = ledger_with(1_000_000, 1_000_000);
        let mut issuer = NullIssuer::new();
        issuer.fail_next_call();

        assert!(ledger
            .mint(&rid("r1"), &dest(), Sats::new(10_000), &params(), &mut issuer)
            .is_err());
        assert_eq!(ledger.minted_of(&rid("r1")), Some(Sats::ZERO));
        assert_eq!(ledger.total_minted(), Sats::ZERO);
        assert!(ledger.conserved());
    }

    #[test]
    fn redeem_decreases_minted_and_total() {
        let mut ledger = ledger_with(1_000_000, 1_000_000);
        let mut issuer = NullIssuer::new();
        ledger
            .mint(&rid("r1"), &dest(), Sats::new(500_000), &params(), &mut issuer)
            .unwrap();

        ledger.redeem(&rid("r1"), Sats::new(200_000)).unwrap();
        assert_eq!(ledger.minted_of(&rid("r1")), Some(Sats::new(300_000)));
        assert_eq!(ledger.total_minted(), Sats::new(300_000));
        assert!(ledger.conserved());
    }

    #[test]
    fn redeem_more_than_minted_fails_with_insufficient_minted() {
        let mut ledger = ledger_with(1_000_000, 1_000_000);
        let mut issuer = NullIssuer::new();
        ledger
            .mint(&rid("r1"), &dest(), Sats::new(300_000), &params(), &mut issuer)
            .unwrap();

        let err = ledger.redeem(&rid("r1"), Sats::new(1_000_000)).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientMinted { .. }));
        assert!(err.to_string().contains("insufficient minted"));
        assert_eq!(ledger.minted_of(&rid("r1")), Some(Sats::new(300_000)));
    }

    #[test]
    fn redeem_respects_pauses() {
        let mut ledger = ledger_with(1_000_000, 1_000_000);
        let mut issuer = NullIssuer::new();
        ledger
            .mint(&rid("r1"), &dest(), Sats::new(100_000), &params(), &mut issuer)
            .unwrap();

        ledger.set_redemption_paused(true);
        assert!(matches!(
            ledger.redeem(&rid("r1"), Sats::new(10_000)),
            Err(LedgerError::SystemRedemptionPaused)
        ));
        ledger.set_redemption_paused(false);

        ledger.set_emergency_pause(&rid("r1")).unwrap();
        assert!(matches!(
            ledger.redeem(&rid("r1"), Sats::new(10_000)),
            Err(LedgerError::ReservePaused(_))
        ));
    }

    #[test]
    fn cap_can_drop_to_exactly_minted_but_not_below() {
        let mut ledger = ledger_with(1_000_000, 1_000_000);
        let mut issuer = NullIssuer::new();
        ledger
            .mint(&rid("r1"), &dest(), Sats::new(300_000), &params(), &mut issuer)
            .unwrap();

        assert!(matches!(
            ledger.set_minting_cap(&rid("r1"), Sats::new(299_999)),
            Err(LedgerError::CapBelowMinted { .. })
        ));
        ledger.set_minting_cap(&rid("r1"), Sats::new(300_000)).unwrap();
        assert_eq!(ledger.cap_of(&rid("r1")), Some(Sats::new(300_000)));
        // And back up: the governance path is not ratcheted.
        ledger.set_minting_cap(&rid("r1"), Sats::new(2_000_000)).unwrap();
    }

    #[test]
    fn deauthorize_requires_zero_minted() {
        let mut ledger = ledger_with(1_000_000, 1_000_000);
        let mut issuer = NullIssuer::new();
        ledger
            .mint(&rid("r1"), &dest(), Sats::new(100_000), &params(), &mut issuer)
            .unwrap();

        assert!(matches!(
            ledger.deauthorize_reserve(&rid("r1")),
            Err(LedgerError::MintedOutstanding { .. })
        ));

        ledger.redeem(&rid("r1"), Sats::new(100_000)).unwrap();
        ledger.deauthorize_reserve(&rid("r1")).unwrap();
        assert!(!ledger.is_authorized(&rid("r1")));
    }

    #[test]
    fn update_backing_blocked_while_emergency_paused() {
        let mut ledger = ledger_with(1_000_000, 0);
        ledger.set_emergency_pause(&rid("r1")).unwrap();
        assert!(matches!(
            ledger.update_backing(&rid("r1"), Sats::new(5)),
            Err(LedgerError::ReservePaused(_))
        ));
        ledger.clear_emergency_pause(&rid("r1")).unwrap();
        ledger.update_backing(&rid("r1"), Sats::new(5)).unwrap();
        assert_eq!(ledger.backing_of(&rid("r1")), Some(Sats::new(5)));
    }

    #[test]
    fn conservation_across_multiple_reserves() {
        let mut ledger = ReserveLedger::new();
        let mut issuer = NullIssuer::new();
        for (name, minted) in [("r1", 100_000u64), ("r2", 250_000), ("r3", 50_000)] {
            ledger.authorize_reserve(rid(name), Sats::new(1_000_000)).unwrap();
            ledger.update_backing(&rid(name), Sats::new(1_000_000)).unwrap();
            ledger
                .mint(&rid(name), &dest(), Sats::new(minted), &params(), &mut issuer)
                .unwrap();
        }
        assert_eq!(ledger.total_minted(), Sats::new(400_000));
        assert!(ledger.conserved());

        ledger.redeem(&rid("r2"), Sats::new(250_000)).unwrap();
        assert_eq!(ledger.total_minted(), Sats::new(150_000));
        assert!(ledger.conserved());
    }
}
