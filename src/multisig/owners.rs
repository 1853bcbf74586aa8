//! Owner registry

use crate::multisig::error::MultisigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Fixed set of owner addresses, established at initialization
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct OwnerRegistry {
    owners: BTreeSet<String>,
}

impl OwnerRegistry {
    /// Build the registry from an already validated owner list
    pub(crate) fn from_owners(owners: &[String]) -> Self {
        Self {
            owners: owners.iter().cloned().collect(),
        }
    }

    pub fn is_owner(&self, address: &str) -> bool {
        self.owners.contains(address)
    }

    /// Fail with `NotOwner` unless `address` is registered
    pub fn require_owner(&self, address: &str) -> Result<(), MultisigError> {
        if self.is_owner(address) {
            Ok(())
        } else {
            Err(MultisigError::NotOwner(address.to_string()))
        }
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    /// Owners in address order
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.owners.iter()
    }
}
