//! Nullable reserve balance oracle.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use keel_collab::{OracleReading, ReserveOracle};
use keel_types::{ReserveId, Sats};

/// A programmable oracle. Unknown reserves read as stale-zero. Clones
/// share the same readings.
#[derive(Clone, Default)]
pub struct NullOracle {
    readings: Rc<RefCell<HashMap<ReserveId, OracleReading>>>,
}

impl NullOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a fresh balance for a reserve.
    pub fn set_balance(&self, reserve: &ReserveId, amount: Sats) {
        self.readings.borrow_mut().insert(
            reserve.clone(),
            OracleReading {
                amount,
                is_stale: false,
            },
        );
    }

    /// Mark a reserve's reading stale (the amount is retained but must be
    /// ignored by the engine).
    pub fn mark_stale(&self, reserve: &ReserveId) {
        let mut readings = self.readings.borrow_mut();
        let entry = readings.entry(reserve.clone()).or_insert(OracleReading {
            amount: Sats::ZERO,
            is_stale: true,
        });
        entry.is_stale = true;
    }
}

impl ReserveOracle for NullOracle {
    fn balance(&self, reserve: &ReserveId) -> OracleReading {
        self.readings
            .borrow()
            .get(reserve)
            .copied()
            .unwrap_or(OracleReading {
                amount: Sats::ZERO,
                is_stale: true,
            })
    }
}
