//! Capacity errors.

use thiserror::Error;

use keel_ledger::LedgerError;
use keel_registry::RegistryError;

#[derive(Debug, Error)]
pub enum CapacityError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
