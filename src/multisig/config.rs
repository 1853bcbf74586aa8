//! Initialization configuration
//!
//! The owner set and threshold are validated once here and never change
//! for the lifetime of an account.

use crate::crypto::{double_sha256, is_key_address, sha256};
use crate::multisig::error::MultisigError;
use ripemd::Ripemd160;
use serde::{Deserialize, Serialize};
use sha2::Digest;
use std::collections::BTreeSet;

/// Minimum number of owners an account can be initialized with
pub const MIN_OWNERS: usize = 2;

/// Configuration for a multisig account
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MultisigConfig {
    /// Minimum distinct confirmations required (M in M-of-N)
    pub threshold: u32,
    /// Owner addresses (N), in the order given at initialization
    pub owners: Vec<String>,
    /// Optional human-readable label
    pub label: Option<String>,
}

impl MultisigConfig {
    /// Create a new configuration
    ///
    /// # Errors
    /// * `InvalidOwnerCount` if fewer than two owners are given
    /// * `DuplicateOwner` if an address appears twice
    /// * `InvalidThreshold` if the threshold is zero or exceeds the owner count
    pub fn new(
        threshold: u32,
        owners: Vec<String>,
        label: Option<String>,
    ) -> Result<Self, MultisigError> {
        if owners.len() < MIN_OWNERS {
            return Err(MultisigError::InvalidOwnerCount(owners.len()));
        }

        let mut seen = BTreeSet::new();
        for owner in &owners {
            if !seen.insert(owner.as_str()) {
                return Err(MultisigError::DuplicateOwner(owner.clone()));
            }
        }

        if threshold == 0 || threshold as usize > owners.len() {
            return Err(MultisigError::InvalidThreshold {
                threshold,
                owners: owners.len(),
            });
        }

        Ok(Self {
            threshold,
            owners,
            label,
        })
    }

    /// Require every owner to be a key address.
    ///
    /// A first key can only be registered through a signed request when
    /// the key derives to the owner's address, so any other owner string
    /// could never authenticate.
    pub fn require_key_addresses(&self) -> Result<(), MultisigError> {
        match self.owners.iter().find(|owner| !is_key_address(owner)) {
            Some(owner) => Err(MultisigError::InvalidOwnerAddress(owner.clone())),
            None => Ok(()),
        }
    }

    /// Get description like "2-of-3"
    pub fn description(&self) -> String {
        format!("{}-of-{}", self.threshold, self.owners.len())
    }

    /// Derive the account address from threshold and sorted owners
    ///
    /// Address = Base58Check(0x05 || RIPEMD160(SHA256(threshold || sorted_owners)))
    pub fn account_address(&self) -> String {
        let mut sorted = self.owners.clone();
        sorted.sort();

        let mut script_data = self.threshold.to_be_bytes().to_vec();
        for owner in &sorted {
            script_data.extend_from_slice(&(owner.len() as u32).to_be_bytes());
            script_data.extend_from_slice(owner.as_bytes());
        }

        let sha256_hash = sha256(&script_data);
        let mut ripemd = Ripemd160::new();
        ripemd.update(&sha256_hash);
        let ripemd_hash = ripemd.finalize();

        let mut address_bytes = vec![0x05];
        address_bytes.extend_from_slice(&ripemd_hash);
        let checksum = double_sha256(&address_bytes);
        address_bytes.extend_from_slice(&checksum[..4]);

        bs58::encode(address_bytes).into_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owners(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("owner{}", i)).collect()
    }

    #[test]
    fn test_config_creation() {
        let config = MultisigConfig::new(2, owners(3), Some("Treasury".to_string())).unwrap();

        assert_eq!(config.threshold, 2);
        assert_eq!(config.owners.len(), 3);
        assert_eq!(config.description(), "2-of-3");
    }

    #[test]
    fn test_config_validation() {
        assert!(matches!(
            MultisigConfig::new(1, owners(1), None),
            Err(MultisigError::InvalidOwnerCount(1))
        ));
        assert!(matches!(
            MultisigConfig::new(1, vec![], None),
            Err(MultisigError::InvalidOwnerCount(0))
        ));
        assert!(matches!(
            MultisigConfig::new(4, owners(3), None),
            Err(MultisigError::InvalidThreshold { threshold: 4, owners: 3 })
        ));
        assert!(matches!(
            MultisigConfig::new(0, owners(3), None),
            Err(MultisigError::InvalidThreshold { threshold: 0, .. })
        ));
        assert!(matches!(
            MultisigConfig::new(2, vec!["same".to_string(), "same".to_string()], None),
            Err(MultisigError::DuplicateOwner(_))
        ));

        // Threshold equal to owner count is allowed
        assert!(MultisigConfig::new(3, owners(3), None).is_ok());
    }

    #[test]
    fn test_require_key_addresses() {
        use crate::crypto::KeyPair;

        let keyed: Vec<String> = (0..3).map(|_| KeyPair::generate().address()).collect();
        let config = MultisigConfig::new(2, keyed.clone(), None).unwrap();
        assert!(config.require_key_addresses().is_ok());

        let mut mixed = keyed;
        mixed[1] = "alice".to_string();
        let config = MultisigConfig::new(2, mixed, None).unwrap();
        assert!(matches!(
            config.require_key_addresses(),
            Err(MultisigError::InvalidOwnerAddress(owner)) if owner == "alice"
        ));
    }

    #[test]
    fn test_address_determinism() {
        let mut reversed = owners(3);
        reversed.reverse();

        let a = MultisigConfig::new(2, owners(3), None).unwrap();
        let b = MultisigConfig::new(2, reversed, Some("label".to_string())).unwrap();
        let c = MultisigConfig::new(3, owners(3), None).unwrap();

        // P2SH-style version byte produces addresses starting with '3'
        assert!(a.account_address().starts_with('3'));
        assert_eq!(a.account_address(), b.account_address());
        assert_ne!(a.account_address(), c.account_address());
    }
}
