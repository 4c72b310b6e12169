//! Reserve and wallet registries.
//!
//! Authoritative records of each reserve's identity, status, ratcheted
//! capacity, pause metadata, and oracle-sync state, and of each reserve's
//! Bitcoin destination wallets with their two-step registration and
//! de-registration lifecycles. Both registries are owned maps mutated only
//! through their operation set.

pub mod error;
pub mod reserve;
pub mod wallet;

pub use error::RegistryError;
pub use reserve::{Reserve, ReserveRegistry};
pub use wallet::{Wallet, WalletRegistry};
