//! Bitcoin address newtype.
//!
//! The engine treats addresses as opaque strings; format validation
//! (Base58Check, Bech32, SegWit) is the address-validator collaborator's
//! job and is consumed as a boolean predicate.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A Bitcoin destination address, unvalidated at the type level.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BtcAddress(String);

impl BtcAddress {
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

impl fmt::Display for BtcAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for BtcAddress {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
