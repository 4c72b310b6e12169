//! System snapshots — capture every persisted record at a point in time.
//!
//! The persisted state of the engine is the reserve, wallet, and
//! redemption records plus the access-control table, pause flags, and the
//! `total_minted` aggregate (the latter two live inside the ledger).
//! Snapshots serialize all of it with `bincode` so an embedding
//! application can persist and restore the engine wholesale.

use serde::{Deserialize, Serialize};

use keel_auth::AccessControl;
use keel_ledger::ReserveLedger;
use keel_redemption::RedemptionEngine;
use keel_registry::{ReserveRegistry, WalletRegistry};
use keel_types::ProtocolParams;

use crate::error::EngineError;

/// A full copy of the engine's persisted state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SystemSnapshot {
    pub auth: AccessControl,
    pub registry: ReserveRegistry,
    pub wallets: WalletRegistry,
    pub ledger: ReserveLedger,
    pub redemptions: RedemptionEngine,
    pub params: ProtocolParams,
    /// Snapshot version for compatibility.
    pub version: u32,
}

impl SystemSnapshot {
    pub const VERSION: u32 = 1;

    /// Serialize to bytes for persistence.
    pub fn to_bytes(&self) -> Result<Vec<u8>, EngineError> {
        bincode::serialize(self).map_err(|e| EngineError::Snapshot(e.to_string()))
    }

    /// Restore from serialized bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self, EngineError> {
        bincode::deserialize(data).map_err(|e| EngineError::Snapshot(e.to_string()))
    }
}
