//! Wallet registry — per-reserve Bitcoin destination wallets.
//!
//! Registration and de-registration are both two-step. Records are never
//! physically removed: finalizing a de-registration drops the wallet from
//! the reserve's active list but the historical record stays for audit.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use keel_types::{BtcAddress, ReserveId, Timestamp, WalletStatus};

use crate::error::RegistryError;

/// One registered wallet.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Wallet {
    pub address: BtcAddress,
    pub reserve: ReserveId,
    pub status: WalletStatus,
    pub registered_at: Timestamp,
}

/// Owned map of all wallets plus the per-reserve live list.
///
/// `by_reserve` holds every wallet that counts against the reserve's
/// limit (anything not yet `Deregistered`); `wallets` holds the full
/// historical record.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WalletRegistry {
    wallets: HashMap<BtcAddress, Wallet>,
    by_reserve: HashMap<ReserveId, Vec<BtcAddress>>,
    max_per_reserve: usize,
}

impl WalletRegistry {
    pub fn new(max_per_reserve: usize) -> Self {
        Self {
            wallets: HashMap::new(),
            by_reserve: HashMap::new(),
            max_per_reserve,
        }
    }

    /// Register a wallet under `reserve`, in `Inactive` state.
    ///
    /// The address has already passed the external format validator at
    /// the facade; this enforces non-emptiness, uniqueness, and the
    /// per-reserve limit.
    pub fn register(
        &mut self,
        reserve: ReserveId,
        address: BtcAddress,
        now: Timestamp,
    ) -> Result<(), RegistryError> {
        if address.is_empty() {
            return Err(RegistryError::EmptyWalletAddress);
        }
        if self.wallets.contains_key(&address) {
            return Err(RegistryError::WalletAlreadyRegistered(address));
        }
        let live = self.by_reserve.entry(reserve.clone()).or_default();
        if live.len() >= self.max_per_reserve {
            return Err(RegistryError::WalletLimitReached {
                reserve,
                max: self.max_per_reserve,
            });
        }
        live.push(address.clone());
        self.wallets.insert(
            address.clone(),
            Wallet {
                address,
                reserve,
                status: WalletStatus::Inactive,
                registered_at: now,
            },
        );
        Ok(())
    }

    /// `Inactive -> Active`.
    pub fn activate(&mut self, address: &BtcAddress) -> Result<(), RegistryError> {
        let wallet = self.get_mut(address)?;
        if !wallet.status.can_transition_to(WalletStatus::Active) {
            return Err(RegistryError::WalletNotInactive {
                address: address.clone(),
                actual: wallet.status,
            });
        }
        wallet.status = WalletStatus::Active;
        Ok(())
    }

    /// `Active -> PendingDeRegistration`.
    pub fn request_deregistration(&mut self, address: &BtcAddress) -> Result<(), RegistryError> {
        let wallet = self.get_mut(address)?;
        if !wallet.status.can_transition_to(WalletStatus::PendingDeRegistration) {
            return Err(RegistryError::WalletNotActive {
                address: address.clone(),
                actual: wallet.status,
            });
        }
        wallet.status = WalletStatus::PendingDeRegistration;
        Ok(())
    }

    /// `PendingDeRegistration -> Deregistered`. Drops the wallet from the
    /// reserve's live list; the record itself is retained.
    pub fn finalize_deregistration(&mut self, address: &BtcAddress) -> Result<(), RegistryError> {
        let wallet = self.get_mut(address)?;
        if !wallet.status.can_transition_to(WalletStatus::Deregistered) {
            return Err(RegistryError::WalletNotPendingDeRegistration {
                address: address.clone(),
                actual: wallet.status,
            });
        }
        wallet.status = WalletStatus::Deregistered;
        let reserve = wallet.reserve.clone();
        if let Some(live) = self.by_reserve.get_mut(&reserve) {
            live.retain(|a| a != address);
        }
        Ok(())
    }

    pub fn get(&self, address: &BtcAddress) -> Result<&Wallet, RegistryError> {
        self.wallets
            .get(address)
            .ok_or_else(|| RegistryError::WalletNotRegistered(address.clone()))
    }

    fn get_mut(&mut self, address: &BtcAddress) -> Result<&mut Wallet, RegistryError> {
        self.wallets
            .get_mut(address)
            .ok_or_else(|| RegistryError::WalletNotRegistered(address.clone()))
    }

    /// The wallets currently counting against `reserve`'s limit.
    pub fn live_wallets(&self, reserve: &ReserveId) -> &[BtcAddress] {
        self.by_reserve
            .get(reserve)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn live_wallet_count(&self, reserve: &ReserveId) -> usize {
        self.live_wallets(reserve).len()
    }

    /// Whether `address` is registered, `Active`, and owned by `reserve`.
    pub fn is_active_for(&self, address: &BtcAddress, reserve: &ReserveId) -> bool {
        self.wallets
            .get(address)
            .map(|w| w.status == WalletStatus::Active && &w.reserve == reserve)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rid(name: &str) -> ReserveId {
        ReserveId::new(name)
    }

    fn addr(name: &str) -> BtcAddress {
        BtcAddress::new(name)
    }

    fn registry() -> WalletRegistry {
        WalletRegistry::new(10)
    }

    #[test]
    fn register_starts_inactive_and_counts_against_reserve() {
        let mut reg = registry();
        reg.register(rid("r1"), addr("bc1qabc"), Timestamp::new(10)).unwrap();

        let w = reg.get(&addr("bc1qabc")).unwrap();
        assert_eq!(w.status, WalletStatus::Inactive);
        assert_eq!(w.reserve, rid("r1"));
        assert_eq!(w.registered_at, Timestamp::new(10));
        assert_eq!(reg.live_wallet_count(&rid("r1")), 1);
    }

    #[test]
    fn register_rejects_empty_and_duplicate_addresses() {
        let mut reg = registry();
        assert!(matches!(
            reg.register(rid("r1"), addr(""), Timestamp::EPOCH),
            Err(RegistryError::EmptyWalletAddress)
        ));
        reg.register(rid("r1"), addr("bc1qabc"), Timestamp::EPOCH).unwrap();
        // Uniqueness is global, not per reserve.
        assert!(matches!(
            reg.register(rid("r2"), addr("bc1qabc"), Timestamp::EPOCH),
            Err(RegistryError::WalletAlreadyRegistered(_))
        ));
    }

    #[test]
    fn wallet_limit_is_enforced_per_reserve() {
        let mut reg = WalletRegistry::new(2);
        reg.register(rid("r1"), addr("w1"), Timestamp::EPOCH).unwrap();
        reg.register(rid("r1"), addr("w2"), Timestamp::EPOCH).unwrap();
        assert!(matches!(
            reg.register(rid("r1"), addr("w3"), Timestamp::EPOCH),
            Err(RegistryError::WalletLimitReached { max: 2, .. })
        ));
        // Other reserves are unaffected.
        reg.register(rid("r2"), addr("w3"), Timestamp::EPOCH).unwrap();
    }

    #[test]
    fn full_lifecycle_in_order() {
        let mut reg = registry();
        let a = addr("bc1qabc");
        reg.register(rid("r1"), a.clone(), Timestamp::EPOCH).unwrap();
        reg.activate(&a).unwrap();
        assert_eq!(reg.get(&a).unwrap().status, WalletStatus::Active);
        reg.request_deregistration(&a).unwrap();
        assert_eq!(reg.get(&a).unwrap().status, WalletStatus::PendingDeRegistration);
        reg.finalize_deregistration(&a).unwrap();
        assert_eq!(reg.get(&a).unwrap().status, WalletStatus::Deregistered);
    }

    #[test]
    fn activate_after_deregistration_names_expected_state() {
        let mut reg = registry();
        let a = addr("bc1qabc");
        reg.register(rid("r1"), a.clone(), Timestamp::EPOCH).unwrap();
        reg.activate(&a).unwrap();
        reg.request_deregistration(&a).unwrap();
        reg.finalize_deregistration(&a).unwrap();

        let err = reg.activate(&a).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::WalletNotInactive {
                actual: WalletStatus::Deregistered,
                ..
            }
        ));
        assert!(err.to_string().contains("wallet not inactive"));
    }

    #[test]
    fn activate_pending_deregistration_is_rejected() {
        let mut reg = registry();
        let a = addr("bc1qabc");
        reg.register(rid("r1"), a.clone(), Timestamp::EPOCH).unwrap();
        reg.activate(&a).unwrap();
        reg.request_deregistration(&a).unwrap();
        assert!(matches!(
            reg.activate(&a),
            Err(RegistryError::WalletNotInactive { .. })
        ));
    }

    #[test]
    fn deregistration_requires_the_right_predecessor_state() {
        let mut reg = registry();
        let a = addr("bc1qabc");
        reg.register(rid("r1"), a.clone(), Timestamp::EPOCH).unwrap();
        // Inactive wallet cannot request de-registration.
        assert!(matches!(
            reg.request_deregistration(&a),
            Err(RegistryError::WalletNotActive { .. })
        ));
        // Nor can it finalize one.
        assert!(matches!(
            reg.finalize_deregistration(&a),
            Err(RegistryError::WalletNotPendingDeRegistration { .. })
        ));
    }

    #[test]
    fn finalize_frees_a_limit_slot_but_keeps_the_record() {
        let mut reg = WalletRegistry::new(1);
        let a = addr("w1");
        reg.register(rid("r1"), a.clone(), Timestamp::EPOCH).unwrap();
        assert!(matches!(
            reg.register(rid("r1"), addr("w2"), Timestamp::EPOCH),
            Err(RegistryError::WalletLimitReached { .. })
        ));

        reg.activate(&a).unwrap();
        reg.request_deregistration(&a).unwrap();
        reg.finalize_deregistration(&a).unwrap();

        assert_eq!(reg.live_wallet_count(&rid("r1")), 0);
        reg.register(rid("r1"), addr("w2"), Timestamp::EPOCH).unwrap();
        // Historical record survives.
        assert_eq!(reg.get(&a).unwrap().status, WalletStatus::Deregistered);
        // And the address can never be reused.
        assert!(matches!(
            reg.register(rid("r1"), a, Timestamp::EPOCH),
            Err(RegistryError::WalletAlreadyRegistered(_))
        ));
    }

    #[test]
    fn is_active_for_checks_owner_and_status() {
        let mut reg = registry();
        let a = addr("bc1qabc");
        reg.register(rid("r1"), a.clone(), Timestamp::EPOCH).unwrap();
        assert!(!reg.is_active_for(&a, &rid("r1")));
        reg.activate(&a).unwrap();
        assert!(reg.is_active_for(&a, &rid("r1")));
        assert!(!reg.is_active_for(&a, &rid("r2")));
        assert!(!reg.is_active_for(&addr("ghost"), &rid("r1")));
    }
}
