//! The keel reserve system facade.
//!
//! Wires access control and the five core components together behind the
//! operator surface: every operation checks the caller's capability,
//! runs its cross-component precondition queries, and only then mutates —
//! so each call applies fully or not at all. Also home to TOML
//! configuration, tracing initialization, and state snapshots.

pub mod config;
pub mod error;
pub mod logging;
pub mod snapshot;
pub mod system;

pub use config::EngineConfig;
pub use error::{ConfigError, EngineError};
pub use snapshot::SystemSnapshot;
pub use system::{ReserveStats, ReserveSystem, WalletStats};
