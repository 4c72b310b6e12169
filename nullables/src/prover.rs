//! Nullable ownership prover.

use std::cell::Cell;
use std::rc::Rc;

use keel_collab::OwnershipProver;

/// A prover double whose verdict is set by the test. Clones share the
/// verdict.
#[derive(Clone)]
pub struct NullProver {
    accept: Rc<Cell<bool>>,
}

impl NullProver {
    pub fn accepting() -> Self {
        Self {
            accept: Rc::new(Cell::new(true)),
        }
    }

    pub fn rejecting() -> Self {
        Self {
            accept: Rc::new(Cell::new(false)),
        }
    }

    pub fn set_accept(&self, accept: bool) {
        self.accept.set(accept);
    }
}

impl OwnershipProver for NullProver {
    fn verify(&self, _challenge: &[u8], _pubkey: &[u8], _signature: &[u8]) -> bool {
        self.accept.get()
    }
}
