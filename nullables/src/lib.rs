//! Nullable collaborators for deterministic testing.
//!
//! Every external dependency of the engine (clock, oracle, token issuer,
//! address validator, ownership prover) is abstracted behind a
//! `keel-collab` trait. This crate provides test-friendly implementations
//! that return programmable values and never touch a network or chain.
//!
//! Usage: swap real implementations for nullables in tests.

pub mod address;
pub mod clock;
pub mod issuer;
pub mod oracle;
pub mod prover;

pub use address::NullAddressValidator;
pub use clock::NullClock;
pub use issuer::NullIssuer;
pub use oracle::NullOracle;
pub use prover::NullProver;
