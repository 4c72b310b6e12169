//! The redemption engine.
//!
//! Accepts redemption requests against a reserve/wallet pair, assigns
//! deadlines, and resolves each request to fulfilled or defaulted,
//! maintaining per-reserve and per-wallet active-obligation counts,
//! earliest-deadline queries, and full history. Pause and ownership
//! checks are cross-component concerns handled by the facade; the engine
//! enforces everything expressible over its own records.

pub mod engine;
pub mod error;

pub use engine::{Redemption, RedemptionEngine};
pub use error::RedemptionError;
