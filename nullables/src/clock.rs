//! Nullable clock — time only advances when the test says so.

use std::cell::Cell;
use std::rc::Rc;

use keel_collab::Clock;
use keel_types::Timestamp;

/// A deterministic clock for testing.
///
/// Clones share the same underlying time, so a test can keep a handle
/// while the engine owns another.
#[derive(Clone)]
pub struct NullClock {
    current: Rc<Cell<u64>>,
}

impl NullClock {
    pub fn new(initial_secs: u64) -> Self {
        Self {
            current: Rc::new(Cell::new(initial_secs)),
        }
    }

    /// Advance time by a number of seconds.
    pub fn advance(&self, secs: u64) {
        self.current.set(self.current.get() + secs);
    }

    /// Jump to a specific time.
    pub fn set(&self, secs: u64) {
        self.current.set(secs);
    }
}

impl Clock for NullClock {
    fn now(&self) -> Timestamp {
        Timestamp::new(self.current.get())
    }
}
