//! Redemption identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Engine-assigned redemption id, monotonically increasing from 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RedemptionId(u64);

impl RedemptionId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RedemptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "redemption#{}", self.0)
    }
}
