//! 32-byte field elements
//!
//! Selectors, payload items, signature scalars and request hashes are all
//! carried as `Felt`s: 32 big-endian bytes with a compact hex text form.

use crate::crypto::sha256;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced when parsing a field element from text
#[derive(Error, Debug, PartialEq, Eq)]
pub enum FeltError {
    #[error("Empty field element")]
    Empty,
    #[error("Field element too long: {0} hex digits (max 64)")]
    TooLong(usize),
    #[error("Invalid field element: {0}")]
    Invalid(String),
}

/// A 32-byte big-endian field element
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Felt([u8; 32]);

impl Felt {
    pub const ZERO: Felt = Felt([0u8; 32]);

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Build from a slice of at most 32 bytes, left-padded with zeros
    pub fn from_be_slice(bytes: &[u8]) -> Result<Self, FeltError> {
        if bytes.len() > 32 {
            return Err(FeltError::TooLong(bytes.len() * 2));
        }
        let mut out = [0u8; 32];
        out[32 - bytes.len()..].copy_from_slice(bytes);
        Ok(Self(out))
    }

    pub fn from_u64(value: u64) -> Self {
        Self::from_u128(value as u128)
    }

    pub fn from_u128(value: u128) -> Self {
        let mut out = [0u8; 32];
        out[16..].copy_from_slice(&value.to_be_bytes());
        Self(out)
    }

    /// Derive a selector from an entry-point name.
    ///
    /// SHA-256 of the name with the top byte cleared, so selectors never
    /// collide with values that use the full 256 bits.
    pub fn from_name(name: &str) -> Self {
        let hash = sha256(name.as_bytes());
        let mut out = [0u8; 32];
        out.copy_from_slice(&hash);
        out[0] = 0;
        Self(out)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Full 64-digit hex encoding without prefix
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl From<u64> for Felt {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

impl fmt::Display for Felt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex = self.to_hex();
        let trimmed = hex.trim_start_matches('0');
        if trimmed.is_empty() {
            write!(f, "0x0")
        } else {
            write!(f, "0x{}", trimmed)
        }
    }
}

impl fmt::Debug for Felt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Felt({})", self)
    }
}

impl FromStr for Felt {
    type Err = FeltError;

    /// Accepts `0x`-prefixed hex (up to 64 digits) or a decimal `u128`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(FeltError::Empty);
        }

        if let Some(digits) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            if digits.is_empty() {
                return Err(FeltError::Invalid(s.to_string()));
            }
            if digits.len() > 64 {
                return Err(FeltError::TooLong(digits.len()));
            }
            let padded = format!("{:0>64}", digits);
            let bytes = hex::decode(&padded).map_err(|_| FeltError::Invalid(s.to_string()))?;
            let mut out = [0u8; 32];
            out.copy_from_slice(&bytes);
            return Ok(Self(out));
        }

        s.parse::<u128>()
            .map(Self::from_u128)
            .map_err(|_| FeltError::Invalid(s.to_string()))
    }
}

impl Serialize for Felt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Felt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_trims_leading_zeros() {
        assert_eq!(Felt::ZERO.to_string(), "0x0");
        assert_eq!(Felt::from_u64(42).to_string(), "0x2a");
        assert_eq!(Felt::from_u64(0x1000).to_string(), "0x1000");
    }

    #[test]
    fn test_parse_hex_and_decimal() {
        assert_eq!("0x2a".parse::<Felt>().unwrap(), Felt::from_u64(42));
        assert_eq!("42".parse::<Felt>().unwrap(), Felt::from_u64(42));
        assert_eq!("0x0".parse::<Felt>().unwrap(), Felt::ZERO);

        assert_eq!("".parse::<Felt>(), Err(FeltError::Empty));
        assert!("0x".parse::<Felt>().is_err());
        assert!("0xzz".parse::<Felt>().is_err());
        assert!("transfer".parse::<Felt>().is_err());

        let too_long = format!("0x{}", "1".repeat(65));
        assert_eq!(too_long.parse::<Felt>(), Err(FeltError::TooLong(65)));
    }

    #[test]
    fn test_from_name_is_deterministic() {
        let a = Felt::from_name("transfer");
        let b = Felt::from_name("transfer");
        let c = Felt::from_name("approve");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.as_bytes()[0], 0);
    }

    #[test]
    fn test_serde_uses_text_form() {
        let felt = Felt::from_u64(255);
        let json = serde_json::to_string(&felt).unwrap();
        assert_eq!(json, "\"0xff\"");

        let back: Felt = serde_json::from_str(&json).unwrap();
        assert_eq!(back, felt);
    }

    #[test]
    fn test_from_be_slice_pads() {
        let felt = Felt::from_be_slice(&[0x01, 0x02]).unwrap();
        assert_eq!(felt, Felt::from_u64(0x0102));
        assert!(Felt::from_be_slice(&[0u8; 33]).is_err());
    }
}
