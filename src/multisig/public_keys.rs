//! Public key registry
//!
//! Each owner declares its own verification key. An owner without a key
//! can neither submit, confirm, nor be authenticated.

use crate::multisig::error::MultisigError;
use secp256k1::PublicKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct PublicKeyRegistry {
    keys: BTreeMap<String, PublicKey>,
}

impl PublicKeyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registered key, `None` when unset
    pub fn get(&self, address: &str) -> Option<&PublicKey> {
        self.keys.get(address)
    }

    pub fn has_public_key(&self, address: &str) -> bool {
        self.keys.contains_key(address)
    }

    /// The registered key, or `PublicKeyNotSet`
    pub fn require(&self, address: &str) -> Result<&PublicKey, MultisigError> {
        self.keys
            .get(address)
            .ok_or_else(|| MultisigError::PublicKeyNotSet(address.to_string()))
    }

    /// Set the key for `owner`. Callers must have checked that `owner` is
    /// the authenticated caller; returns the previous key if any.
    pub(crate) fn set(&mut self, owner: &str, key: PublicKey) -> Option<PublicKey> {
        self.keys.insert(owner.to_string(), key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
