//! Global mint/redeem ledger.
//!
//! Tracks per-reserve backing, minted amount, and the governance-level
//! minting cap; maintains the global `total_minted` aggregate and the
//! system-wide and per-reserve pause flags. Every state-dependent
//! precondition of mint/redeem is enforced here; caller identity and
//! capability checks belong to the facade.

pub mod error;
pub mod ledger;

pub use error::LedgerError;
pub use ledger::{LedgerEntry, ReserveLedger, SystemPause};
