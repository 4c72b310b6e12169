//! Capability-based access control.
//!
//! Roles are disjoint and independently grantable/revocable; a revocation
//! takes effect for the very next call. Minter grants are bound to a
//! specific reserve rather than being a global role.

pub mod error;
pub mod roles;

pub use error::AuthError;
pub use roles::{AccessControl, Role};
