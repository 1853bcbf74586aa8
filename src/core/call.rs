//! Delegated calls
//!
//! A `Call` is what owners agree on: a target, a selector naming the
//! operation on that target, and an ordered payload of field elements.

use crate::core::Felt;
use crate::crypto::sha256;
use serde::{Deserialize, Serialize};

/// A call to be dispatched to an external target
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Call {
    /// Target identifier
    pub target: String,
    /// Selector / operation code on the target
    pub selector: Felt,
    /// Ordered payload
    pub payload: Vec<Felt>,
}

impl Call {
    pub fn new(target: impl Into<String>, selector: Felt, payload: Vec<Felt>) -> Self {
        Self {
            target: target.into(),
            selector,
            payload,
        }
    }

    /// Canonical byte encoding.
    ///
    /// Format: len(target) as u32 BE || target || selector || len(payload) as u32 BE || payload
    pub fn encode(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(4 + self.target.len() + 36 + self.payload.len() * 32);
        data.extend_from_slice(&(self.target.len() as u32).to_be_bytes());
        data.extend_from_slice(self.target.as_bytes());
        data.extend_from_slice(self.selector.as_bytes());
        data.extend_from_slice(&(self.payload.len() as u32).to_be_bytes());
        for item in &self.payload {
            data.extend_from_slice(item.as_bytes());
        }
        data
    }

    /// SHA-256 of the canonical encoding
    pub fn hash(&self) -> Felt {
        let mut out = [0u8; 32];
        out.copy_from_slice(&sha256(&self.encode()));
        Felt::from_bytes(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_covers_every_field() {
        let base = Call::new("target", Felt::from_name("transfer"), vec![1u64.into(), 2u64.into()]);

        let mut other_target = base.clone();
        other_target.target = "other".to_string();

        let mut other_selector = base.clone();
        other_selector.selector = Felt::from_name("approve");

        let mut reordered = base.clone();
        reordered.payload.reverse();

        assert_eq!(base.hash(), base.clone().hash());
        assert_ne!(base.hash(), other_target.hash());
        assert_ne!(base.hash(), other_selector.hash());
        assert_ne!(base.hash(), reordered.hash());
    }

    #[test]
    fn test_encoding_is_length_prefixed() {
        // "ab" + [] must not collide with "a" + ["b"-ish] payloads
        let a = Call::new("ab", Felt::ZERO, vec![]);
        let b = Call::new("a", Felt::ZERO, vec![Felt::from_u64(0x62)]);
        assert_ne!(a.encode(), b.encode());
        assert_eq!(a.encode().len(), 4 + 2 + 32 + 4);
    }
}
