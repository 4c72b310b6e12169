//! Opaque principal identities.
//!
//! A principal is whatever the embedding execution context uses to identify
//! a caller — the engine never inspects it beyond equality and non-emptiness.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque caller identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrincipalId(String);

impl PrincipalId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PrincipalId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A reserve is identified by its principal.
pub type ReserveId = PrincipalId;
