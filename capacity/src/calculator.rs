//! The capacity engine.

use tracing::{info, warn};

use keel_collab::ReserveOracle;
use keel_ledger::ReserveLedger;
use keel_registry::ReserveRegistry;
use keel_types::{ReserveId, ReserveStatus, Sats, Timestamp};

use crate::error::CapacityError;

/// Derives capacity and validates capacity/status changes.
///
/// Holds the oracle collaborator; all other state is read from (and sync
/// metadata written to) the registry and ledger passed per call, so the
/// calculator itself owns nothing another component could drift from.
pub struct CapacityEngine<O: ReserveOracle> {
    oracle: O,
}

impl<O: ReserveOracle> CapacityEngine<O> {
    pub fn new(oracle: O) -> Self {
        Self { oracle }
    }

    /// How much `reserve` could mint right now.
    ///
    /// Zero when the reserve's status forbids minting or the oracle
    /// reports stale data (the staleness is latched on the reserve
    /// record); otherwise refreshes the registry's backing mirror and
    /// returns `min(ratcheted cap, backing) − minted`, saturating at
    /// zero.
    pub fn available_minting_capacity(
        &self,
        registry: &mut ReserveRegistry,
        ledger: &ReserveLedger,
        reserve: &ReserveId,
        now: Timestamp,
    ) -> Result<Sats, CapacityError> {
        let record = registry.get(reserve)?;
        if !record.status.permits_minting() {
            return Ok(Sats::ZERO);
        }
        let cap = record.minting_cap;

        let reading = self.oracle.balance(reserve);
        if reading.is_stale {
            warn!(reserve = %reserve, "oracle reported stale backing, capacity is zero");
            registry.record_oracle_failure(reserve)?;
            return Ok(Sats::ZERO);
        }
        registry.record_backing_sync(reserve, reading.amount, now)?;

        let minted = ledger.minted_of(reserve).unwrap_or(Sats::ZERO);
        let headroom = cap.min(reading.amount);
        Ok(headroom.saturating_sub(minted))
    }

    /// Custodian-initiated capacity growth: a strict ratchet on the
    /// registry cap, propagated to the ledger's mirrored cap.
    pub fn increase_minting_capacity(
        &self,
        registry: &mut ReserveRegistry,
        ledger: &mut ReserveLedger,
        reserve: &ReserveId,
        new_cap: Sats,
    ) -> Result<(), CapacityError> {
        registry.raise_cap(reserve, new_cap)?;
        ledger.set_minting_cap(reserve, new_cap)?;
        info!(reserve = %reserve, cap = %new_cap, "minting capacity increased");
        Ok(())
    }

    /// Governance status change, validated against the transition table.
    pub fn set_reserve_status(
        &self,
        registry: &mut ReserveRegistry,
        reserve: &ReserveId,
        new_status: ReserveStatus,
        reason: &str,
    ) -> Result<(), CapacityError> {
        registry.set_status(reserve, new_status)?;
        info!(reserve = %reserve, status = %new_status, reason, "reserve status changed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keel_nullables::{NullIssuer, NullOracle};
    use keel_types::{PrincipalId, ProtocolParams};

    fn rid(name: &str) -> ReserveId {
        ReserveId::new(name)
    }

    struct Fixture {
        registry: ReserveRegistry,
        ledger: ReserveLedger,
        engine: CapacityEngine<NullOracle>,
    }

    /// One reserve, registered and authorized with the given cap.
    fn fixture(cap: u64) -> Fixture {
        let mut registry = ReserveRegistry::new();
        let mut ledger = ReserveLedger::new();
        registry.register(rid("r1"), Sats::new(cap), Timestamp::EPOCH).unwrap();
        ledger.authorize_reserve(rid("r1"), Sats::new(cap)).unwrap();
        Fixture {
            registry,
            ledger,
            engine: CapacityEngine::new(NullOracle::new()),
        }
    }

    fn mint(f: &mut Fixture, amount: u64) {
        let params = ProtocolParams {
            min_mint: Sats::new(1),
            max_single_mint: Sats::new(u64::MAX),
            ..ProtocolParams::default()
        };
        let mut issuer = NullIssuer::new();
        f.ledger
            .update_backing(&rid("r1"), Sats::new(amount))
            .unwrap();
        f.ledger
            .mint(&rid("r1"), &PrincipalId::new("holder"), Sats::new(amount), &params, &mut issuer)
            .unwrap();
    }

    #[test]
    fn capacity_is_headroom_under_the_tighter_bound() {
        let mut f = fixture(1_000_000);
        f.engine.oracle.set_balance(&rid("r1"), Sats::new(800_000));
        mint(&mut f, 300_000);

        let available = f
            .engine
            .available_minting_capacity(&mut f.registry, &f.ledger, &rid("r1"), Timestamp::new(50))
            .unwrap();
        // min(cap 1_000_000, backing 800_000) - minted 300_000
        assert_eq!(available, Sats::new(500_000));
    }

    #[test]
    fn capacity_saturates_at_zero_when_overminted_relative_to_backing() {
        let mut f = fixture(1_000_000);
        mint(&mut f, 500_000);
        // Backing later drops below minted.
        f.engine.oracle.set_balance(&rid("r1"), Sats::new(200_000));

        let available = f
            .engine
            .available_minting_capacity(&mut f.registry, &f.ledger, &rid("r1"), Timestamp::new(50))
            .unwrap();
        assert_eq!(available, Sats::ZERO);
    }

    #[test]
    fn stale_oracle_means_zero_capacity_and_latches_failure() {
        let mut f = fixture(1_000_000);
        f.engine.oracle.set_balance(&rid("r1"), Sats::new(800_000));
        f.engine.oracle.mark_stale(&rid("r1"));

        let available = f
            .engine
            .available_minting_capacity(&mut f.registry, &f.ledger, &rid("r1"), Timestamp::new(50))
            .unwrap();
        assert_eq!(available, Sats::ZERO);
        assert!(f.registry.get(&rid("r1")).unwrap().oracle_failure_detected);

        // A fresh reading restores capacity and clears the latch.
        f.engine.oracle.set_balance(&rid("r1"), Sats::new(800_000));
        let available = f
            .engine
            .available_minting_capacity(&mut f.registry, &f.ledger, &rid("r1"), Timestamp::new(60))
            .unwrap();
        assert_eq!(available, Sats::new(800_000));
        let record = f.registry.get(&rid("r1")).unwrap();
        assert!(!record.oracle_failure_detected);
        assert_eq!(record.last_sync_timestamp, Some(Timestamp::new(60)));
        assert_eq!(record.backing_amount, Sats::new(800_000));
    }

    #[test]
    fn non_minting_status_means_zero_capacity_without_an_oracle_call() {
        let mut f = fixture(1_000_000);
        f.engine.oracle.set_balance(&rid("r1"), Sats::new(800_000));
        f.registry.set_status(&rid("r1"), ReserveStatus::UnderReview).unwrap();

        let available = f
            .engine
            .available_minting_capacity(&mut f.registry, &f.ledger, &rid("r1"), Timestamp::new(50))
            .unwrap();
        assert_eq!(available, Sats::ZERO);
        // No sync happened for a non-minting reserve.
        assert_eq!(f.registry.get(&rid("r1")).unwrap().last_sync_timestamp, None);
    }

    #[test]
    fn capacity_query_does_not_move_minted() {
        let mut f = fixture(1_000_000);
        f.engine.oracle.set_balance(&rid("r1"), Sats::new(800_000));
        mint(&mut f, 100_000);

        f.engine
            .available_minting_capacity(&mut f.registry, &f.ledger, &rid("r1"), Timestamp::new(50))
            .unwrap();
        assert_eq!(f.ledger.minted_of(&rid("r1")), Some(Sats::new(100_000)));
        assert_eq!(f.ledger.total_minted(), Sats::new(100_000));
    }

    #[test]
    fn ratchet_propagates_to_ledger_cap() {
        let mut f = fixture(1_000_000);
        f.engine
            .increase_minting_capacity(&mut f.registry, &mut f.ledger, &rid("r1"), Sats::new(2_000_000))
            .unwrap();
        assert_eq!(f.registry.get(&rid("r1")).unwrap().minting_cap, Sats::new(2_000_000));
        assert_eq!(f.ledger.cap_of(&rid("r1")), Some(Sats::new(2_000_000)));
    }

    #[test]
    fn ratchet_rejects_equal_and_lower_caps() {
        let mut f = fixture(1_000_000);
        for cap in [1_000_000u64, 999_999] {
            let err = f
                .engine
                .increase_minting_capacity(&mut f.registry, &mut f.ledger, &rid("r1"), Sats::new(cap))
                .unwrap_err();
            assert!(matches!(err, CapacityError::Registry(_)));
        }
        // Neither side moved.
        assert_eq!(f.registry.get(&rid("r1")).unwrap().minting_cap, Sats::new(1_000_000));
        assert_eq!(f.ledger.cap_of(&rid("r1")), Some(Sats::new(1_000_000)));
    }

    #[test]
    fn status_change_goes_through_the_transition_table() {
        let mut f = fixture(1_000_000);
        f.engine
            .set_reserve_status(&mut f.registry, &rid("r1"), ReserveStatus::Revoked, "audit failed")
            .unwrap();
        let err = f
            .engine
            .set_reserve_status(&mut f.registry, &rid("r1"), ReserveStatus::Active, "appeal")
            .unwrap_err();
        assert!(matches!(err, CapacityError::Registry(_)));
    }
}
