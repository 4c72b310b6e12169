//! Bitcoin address validation contract.

use keel_types::BtcAddress;

/// Script classification of a Bitcoin address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AddressKind {
    P2pkh,
    P2sh,
    P2wpkh,
    P2wsh,
    Taproot,
    Invalid,
}

/// The payload extracted from a parsed address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedAddress {
    pub kind: AddressKind,
    pub script_hash: Vec<u8>,
}

/// Pure, side-effect-free address parser/predicate.
///
/// Base58Check / Bech32 / SegWit decoding and checksum verification happen
/// behind this trait; the engine only consumes the verdict.
pub trait BtcAddressValidator {
    /// Whether `address` is a well-formed Bitcoin address.
    fn is_valid(&self, address: &BtcAddress) -> bool;

    /// Classify the address's script type. `Invalid` for malformed input.
    fn classify(&self, address: &BtcAddress) -> AddressKind;

    /// Decode the address into its script payload, if well-formed.
    fn decode(&self, address: &BtcAddress) -> Option<DecodedAddress>;
}
