//! Reserve registry — the authoritative custodian record.
//!
//! The registry owns identity, status, the ratcheted capacity cap, pause
//! metadata, and oracle-sync state. Minted amounts are owned by the
//! ledger; stats queries join the two at the facade.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use keel_types::{PauseLevel, ReserveId, ReserveStatus, Sats, Timestamp};

use crate::error::RegistryError;

/// One registered reserve (qualified custodian).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Reserve {
    pub id: ReserveId,
    pub status: ReserveStatus,
    /// Registry-level capacity cap. Only ever moves upward, through the
    /// ratchet path.
    pub minting_cap: Sats,
    /// Oracle-synced backing mirror.
    pub backing_amount: Sats,
    /// Set while the reserve is paused; which operations the pause covers.
    pub pause_level: Option<PauseLevel>,
    /// Whether the reserve paused itself (vs. was paused by governance).
    pub self_paused: bool,
    pub registered_at: Timestamp,
    /// When the backing mirror was last refreshed from the oracle.
    pub last_sync_timestamp: Option<Timestamp>,
    /// Latched when the oracle reported stale; cleared on the next good
    /// sync.
    pub oracle_failure_detected: bool,
}

/// Owned map of all reserves, keyed by principal identity.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ReserveRegistry {
    reserves: HashMap<ReserveId, Reserve>,
}

impl ReserveRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new reserve with its initial ratcheted cap.
    pub fn register(
        &mut self,
        id: ReserveId,
        minting_cap: Sats,
        now: Timestamp,
    ) -> Result<(), RegistryError> {
        if id.is_empty() {
            return Err(RegistryError::EmptyReserveId);
        }
        if minting_cap.is_zero() {
            return Err(RegistryError::CapMustBePositive(id));
        }
        if self.reserves.contains_key(&id) {
            return Err(RegistryError::ReserveAlreadyRegistered(id));
        }
        self.reserves.insert(
            id.clone(),
            Reserve {
                id,
                status: ReserveStatus::Active,
                minting_cap,
                backing_amount: Sats::ZERO,
                pause_level: None,
                self_paused: false,
                registered_at: now,
                last_sync_timestamp: None,
                oracle_failure_detected: false,
            },
        );
        Ok(())
    }

    /// Remove a reserve record. Only called on full deauthorization; the
    /// facade has already verified there is no outstanding minted supply
    /// or obligation.
    pub fn remove(&mut self, id: &ReserveId) -> Result<Reserve, RegistryError> {
        self.reserves
            .remove(id)
            .ok_or_else(|| RegistryError::ReserveNotRegistered(id.clone()))
    }

    pub fn get(&self, id: &ReserveId) -> Result<&Reserve, RegistryError> {
        self.reserves
            .get(id)
            .ok_or_else(|| RegistryError::ReserveNotRegistered(id.clone()))
    }

    fn get_mut(&mut self, id: &ReserveId) -> Result<&mut Reserve, RegistryError> {
        self.reserves
            .get_mut(id)
            .ok_or_else(|| RegistryError::ReserveNotRegistered(id.clone()))
    }

    pub fn contains(&self, id: &ReserveId) -> bool {
        self.reserves.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Reserve> {
        self.reserves.values()
    }

    /// Move a reserve to `to`, validated against the transition table.
    /// `Revoked` is absorbing.
    pub fn set_status(&mut self, id: &ReserveId, to: ReserveStatus) -> Result<(), RegistryError> {
        let reserve = self.get_mut(id)?;
        if !reserve.status.can_transition_to(to) {
            return Err(RegistryError::InvalidStatusTransition {
                reserve: id.clone(),
                from: reserve.status,
                to,
            });
        }
        reserve.status = to;
        if to == ReserveStatus::Active {
            reserve.pause_level = None;
            reserve.self_paused = false;
        }
        Ok(())
    }

    /// Pause initiated by the reserve itself.
    pub fn self_pause(&mut self, id: &ReserveId, level: PauseLevel) -> Result<(), RegistryError> {
        self.pause(id, level, true)
    }

    /// Pause initiated by governance.
    pub fn governance_pause(
        &mut self,
        id: &ReserveId,
        level: PauseLevel,
    ) -> Result<(), RegistryError> {
        self.pause(id, level, false)
    }

    fn pause(
        &mut self,
        id: &ReserveId,
        level: PauseLevel,
        by_self: bool,
    ) -> Result<(), RegistryError> {
        let target = level.paused_status();
        let reserve = self.get_mut(id)?;
        if !reserve.status.can_transition_to(target) {
            return Err(RegistryError::InvalidStatusTransition {
                reserve: id.clone(),
                from: reserve.status,
                to: target,
            });
        }
        reserve.status = target;
        reserve.pause_level = Some(level);
        reserve.self_paused = by_self;
        Ok(())
    }

    /// Resume a paused reserve. A governance pause can only be lifted by
    /// governance; a self-pause can be lifted by either party.
    pub fn resume(&mut self, id: &ReserveId, by_governance: bool) -> Result<(), RegistryError> {
        let reserve = self.get_mut(id)?;
        if reserve.pause_level.is_none() {
            return Err(RegistryError::NotPaused(id.clone()));
        }
        if !reserve.self_paused && !by_governance {
            return Err(RegistryError::PausedByGovernance(id.clone()));
        }
        if !reserve.status.can_transition_to(ReserveStatus::Active) {
            return Err(RegistryError::InvalidStatusTransition {
                reserve: id.clone(),
                from: reserve.status,
                to: ReserveStatus::Active,
            });
        }
        reserve.status = ReserveStatus::Active;
        reserve.pause_level = None;
        reserve.self_paused = false;
        Ok(())
    }

    /// Record a fresh oracle observation of the reserve's backing.
    pub fn record_backing_sync(
        &mut self,
        id: &ReserveId,
        amount: Sats,
        now: Timestamp,
    ) -> Result<(), RegistryError> {
        let reserve = self.get_mut(id)?;
        reserve.backing_amount = amount;
        reserve.last_sync_timestamp = Some(now);
        reserve.oracle_failure_detected = false;
        Ok(())
    }

    /// Latch that the oracle reported stale data for this reserve.
    pub fn record_oracle_failure(&mut self, id: &ReserveId) -> Result<(), RegistryError> {
        self.get_mut(id)?.oracle_failure_detected = true;
        Ok(())
    }

    /// Raise the ratcheted cap. Strictly increasing: equal or lower
    /// values are rejected.
    pub fn raise_cap(&mut self, id: &ReserveId, new_cap: Sats) -> Result<(), RegistryError> {
        let reserve = self.get_mut(id)?;
        if new_cap <= reserve.minting_cap {
            return Err(RegistryError::CapNotIncreased {
                reserve: id.clone(),
                current: reserve.minting_cap,
                requested: new_cap,
            });
        }
        reserve.minting_cap = new_cap;
        Ok(())
    }
}
