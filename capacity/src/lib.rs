//! Capacity and solvency calculation.
//!
//! Derives each reserve's available-to-mint capacity from its ratcheted
//! cap, oracle-synced backing, and outstanding minted supply; owns the
//! custodian-initiated capacity-growth path and reserve status
//! transitions. Capacity queries never mutate minted amounts — only
//! mint/redeem do.

pub mod calculator;
pub mod error;

pub use calculator::CapacityEngine;
pub use error::CapacityError;
