//! Timestamp type used throughout the engine.
//!
//! Timestamps are Unix epoch seconds (UTC). Deadlines are a logical
//! property — a stored timestamp compared against a caller-supplied `now` —
//! never a live timer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// A Unix timestamp in seconds since epoch (UTC).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The epoch (time zero).
    pub const EPOCH: Self = Self(0);

    pub fn new(secs: u64) -> Self {
        Self(secs)
    }

    /// Get the current system time as a `Timestamp`.
    pub fn now() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock before Unix epoch")
            .as_secs();
        Self(secs)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// This timestamp shifted forward by `secs`, saturating at the
    /// representable maximum.
    pub fn plus_secs(&self, secs: u64) -> Self {
        Self(self.0.saturating_add(secs))
    }

    /// Whether this timestamp (a deadline) lies strictly in the past
    /// relative to `now`.
    pub fn is_past(&self, now: Timestamp) -> bool {
        now.0 > self.0
    }

    /// Seconds elapsed since this timestamp (relative to `now`).
    pub fn elapsed_since(&self, now: Timestamp) -> u64 {
        now.0.saturating_sub(self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deadline_is_past_is_strict() {
        let deadline = Timestamp::new(1000);
        assert!(!deadline.is_past(Timestamp::new(999)));
        assert!(!deadline.is_past(Timestamp::new(1000)));
        assert!(deadline.is_past(Timestamp::new(1001)));
    }

    #[test]
    fn plus_secs_saturates() {
        assert_eq!(Timestamp::new(u64::MAX).plus_secs(1).as_secs(), u64::MAX);
        assert_eq!(Timestamp::new(100).plus_secs(50).as_secs(), 150);
    }
}
