//! Cryptographic utilities
//!
//! This module provides:
//! - SHA-256 hashing
//! - ECDSA key management (secp256k1)
//! - Address derivation

pub mod hash;
pub mod keys;

pub use hash::{double_sha256, sha256};
pub use keys::{
    is_key_address, public_key_from_hex, public_key_to_address, sign_message, verify_signature, KeyError, KeyPair,
};
