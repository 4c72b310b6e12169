//! Trait contracts for the engine's external collaborators.
//!
//! The core consumes each collaborator through a narrow interface: the
//! Bitcoin address validator as a pure predicate/parser, the reserve
//! balance oracle as an amount-plus-staleness reading, the token issuer as
//! an always-succeeds-once-called sink (failure is fatal to the calling
//! operation, never retried), and the ownership prover as a boolean check.
//! Deterministic test doubles for every trait live in `keel-nullables`.

pub mod address;
pub mod clock;
pub mod issuer;
pub mod oracle;
pub mod prover;

pub use address::{AddressKind, BtcAddressValidator, DecodedAddress};
pub use clock::{Clock, SystemClock};
pub use issuer::{IssuerError, TokenIssuer};
pub use oracle::{OracleReading, ReserveOracle};
pub use prover::OwnershipProver;
