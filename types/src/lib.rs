//! Fundamental types for the keel reserve engine.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: satoshi/token amounts with the fixed-point bridge, timestamps,
//! principal identities, Bitcoin address and redemption-id newtypes,
//! lifecycle status enums with their transition tables, and protocol
//! parameters.

pub mod amount;
pub mod btc;
pub mod error;
pub mod ids;
pub mod params;
pub mod principal;
pub mod status;
pub mod time;

pub use amount::{Sats, TokenAmount, SAT_TO_TOKEN};
pub use btc::BtcAddress;
pub use error::AmountError;
pub use ids::RedemptionId;
pub use params::ProtocolParams;
pub use principal::{PrincipalId, ReserveId};
pub use status::{PauseLevel, RedemptionStatus, ReserveStatus, WalletStatus};
pub use time::Timestamp;
