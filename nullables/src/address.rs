//! Nullable Bitcoin address validator.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use keel_collab::{AddressKind, BtcAddressValidator, DecodedAddress};
use keel_types::BtcAddress;

/// A prefix-based validator double.
///
/// Classifies by the conventional mainnet prefixes and accepts anything
/// non-empty that classifies, minus an explicit reject list. Clones share
/// the reject list.
#[derive(Clone, Default)]
pub struct NullAddressValidator {
    rejects: Rc<RefCell<HashSet<String>>>,
}

impl NullAddressValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a specific address invalid regardless of shape.
    pub fn reject(&self, address: &BtcAddress) {
        self.rejects.borrow_mut().insert(address.as_str().to_string());
    }
}

impl BtcAddressValidator for NullAddressValidator {
    fn is_valid(&self, address: &BtcAddress) -> bool {
        self.classify(address) != AddressKind::Invalid
    }

    fn classify(&self, address: &BtcAddress) -> AddressKind {
        if self.rejects.borrow().contains(address.as_str()) {
            return AddressKind::Invalid;
        }
        let s = address.as_str();
        if s.starts_with("bc1p") {
            AddressKind::Taproot
        } else if s.starts_with("bc1q") {
            // Witness-program length distinguishes the two v0 programs.
            if s.len() > 45 {
                AddressKind::P2wsh
            } else {
                AddressKind::P2wpkh
            }
        } else if s.starts_with('1') {
            AddressKind::P2pkh
        } else if s.starts_with('3') {
            AddressKind::P2sh
        } else {
            AddressKind::Invalid
        }
    }

    fn decode(&self, address: &BtcAddress) -> Option<DecodedAddress> {
        match self.classify(address) {
            AddressKind::Invalid => None,
            kind => Some(DecodedAddress {
                kind,
                script_hash: address.as_str().as_bytes().to_vec(),
            }),
        }
    }
}
