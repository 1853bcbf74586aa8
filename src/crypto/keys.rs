//! ECDSA key management
//!
//! Provides key pair generation, signing, and verification using
//! the secp256k1 elliptic curve. Signatures travel as two field
//! elements `[r, s]`, the halves of the compact encoding.

use rand::rngs::OsRng;
use ripemd::Ripemd160;
use secp256k1::ecdsa::Signature;
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use sha2::Digest;
use thiserror::Error;

use super::hash::{double_sha256, sha256};
use crate::core::Felt;

/// Errors that can occur during key operations
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("Invalid private key")]
    InvalidPrivateKey,
    #[error("Invalid public key")]
    InvalidPublicKey,
    #[error("Invalid signature")]
    InvalidSignature,
    #[error("Secp256k1 error: {0}")]
    Secp256k1Error(#[from] secp256k1::Error),
}

/// A key pair consisting of a private key and its corresponding public key
#[derive(Clone)]
pub struct KeyPair {
    pub secret_key: SecretKey,
    pub public_key: PublicKey,
}

impl KeyPair {
    /// Generate a new random key pair
    pub fn generate() -> Self {
        let secp = Secp256k1::new();
        let (secret_key, public_key) = secp.generate_keypair(&mut OsRng);
        Self {
            secret_key,
            public_key,
        }
    }

    /// Create a key pair from an existing secret key
    pub fn from_secret_key(secret_key: SecretKey) -> Self {
        let secp = Secp256k1::new();
        let public_key = PublicKey::from_secret_key(&secp, &secret_key);
        Self {
            secret_key,
            public_key,
        }
    }

    /// Create a key pair from a hex-encoded private key
    pub fn from_private_key_hex(hex_key: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(hex_key).map_err(|_| KeyError::InvalidPrivateKey)?;
        let secret_key =
            SecretKey::from_slice(&bytes).map_err(|_| KeyError::InvalidPrivateKey)?;
        Ok(Self::from_secret_key(secret_key))
    }

    /// Get the private key as a hex string
    pub fn private_key_hex(&self) -> String {
        hex::encode(self.secret_key.secret_bytes())
    }

    /// Get the public key as a hex string (compressed format)
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key.serialize())
    }

    /// Owner address derived from the public key
    pub fn address(&self) -> String {
        public_key_to_address(&self.public_key)
    }

    /// Sign a 32-byte message hash, producing `[r, s]`
    pub fn sign(&self, message_hash: &Felt) -> Result<Vec<Felt>, KeyError> {
        sign_message(&self.secret_key, message_hash)
    }
}

/// Convert a public key to an address
///
/// Base58Check(0x00 || RIPEMD160(SHA256(pubkey)) || checksum)
pub fn public_key_to_address(public_key: &PublicKey) -> String {
    let sha256_hash = sha256(&public_key.serialize());

    let mut ripemd = Ripemd160::new();
    ripemd.update(&sha256_hash);
    let ripemd_hash = ripemd.finalize();

    let mut address_bytes = vec![0x00];
    address_bytes.extend_from_slice(&ripemd_hash);

    let checksum = double_sha256(&address_bytes);
    address_bytes.extend_from_slice(&checksum[..4]);

    bs58::encode(address_bytes).into_string()
}

/// Check that `address` is a Base58Check key address (version 0x00),
/// the form produced by `public_key_to_address`
pub fn is_key_address(address: &str) -> bool {
    let bytes = match bs58::decode(address).into_vec() {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };
    if bytes.len() != 25 || bytes[0] != 0x00 {
        return false;
    }
    let checksum = double_sha256(&bytes[..21]);
    bytes[21..] == checksum[..4]
}

/// Parse a public key from hex string
pub fn public_key_from_hex(hex_key: &str) -> Result<PublicKey, KeyError> {
    let bytes = hex::decode(hex_key).map_err(|_| KeyError::InvalidPublicKey)?;
    PublicKey::from_slice(&bytes).map_err(|_| KeyError::InvalidPublicKey)
}

/// Sign a message hash with a secret key, returning `[r, s]`
pub fn sign_message(secret_key: &SecretKey, message_hash: &Felt) -> Result<Vec<Felt>, KeyError> {
    let secp = Secp256k1::new();
    let message = Message::from_digest_slice(message_hash.as_bytes())?;
    let compact = secp.sign_ecdsa(&message, secret_key).serialize_compact();

    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&compact[..32]);
    s.copy_from_slice(&compact[32..]);

    Ok(vec![Felt::from_bytes(r), Felt::from_bytes(s)])
}

/// Verify an `(r, s)` signature over a message hash.
///
/// Returns `Ok(false)` on a well-formed signature that does not verify and
/// `Err(KeyError::InvalidSignature)` when `(r, s)` is not a valid scalar pair
/// (zero or out of range). High-S signatures are normalized before checking.
pub fn verify_signature(
    public_key: &PublicKey,
    message_hash: &Felt,
    r: &Felt,
    s: &Felt,
) -> Result<bool, KeyError> {
    if r.is_zero() || s.is_zero() {
        return Err(KeyError::InvalidSignature);
    }

    let secp = Secp256k1::new();
    let message = Message::from_digest_slice(message_hash.as_bytes())?;

    let mut compact = [0u8; 64];
    compact[..32].copy_from_slice(r.as_bytes());
    compact[32..].copy_from_slice(s.as_bytes());
    let mut sig = Signature::from_compact(&compact).map_err(|_| KeyError::InvalidSignature)?;
    sig.normalize_s();

    match secp.verify_ecdsa(&message, &sig, public_key) {
        Ok(()) => Ok(true),
        Err(_) => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message_hash(data: &[u8]) -> Felt {
        Felt::from_be_slice(&sha256(data)).unwrap()
    }

    #[test]
    fn test_key_pair_generation() {
        let kp = KeyPair::generate();
        assert!(!kp.private_key_hex().is_empty());
        assert_eq!(kp.public_key_hex().len(), 66);
        assert!(!kp.address().is_empty());
    }

    #[test]
    fn test_sign_and_verify() {
        let kp = KeyPair::generate();
        let hash = message_hash(b"confirm 1");

        let sig = kp.sign(&hash).unwrap();
        assert_eq!(sig.len(), 2);
        assert!(verify_signature(&kp.public_key, &hash, &sig[0], &sig[1]).unwrap());

        let other = message_hash(b"confirm 2");
        assert!(!verify_signature(&kp.public_key, &other, &sig[0], &sig[1]).unwrap());

        let stranger = KeyPair::generate();
        assert!(!verify_signature(&stranger.public_key, &hash, &sig[0], &sig[1]).unwrap());
    }

    #[test]
    fn test_zero_scalars_are_invalid() {
        let kp = KeyPair::generate();
        let hash = message_hash(b"anything");
        let result = verify_signature(&kp.public_key, &hash, &Felt::ZERO, &Felt::ZERO);
        assert!(matches!(result, Err(KeyError::InvalidSignature)));

        let sig = kp.sign(&hash).unwrap();
        assert!(matches!(
            verify_signature(&kp.public_key, &hash, &sig[0], &Felt::ZERO),
            Err(KeyError::InvalidSignature)
        ));
        assert!(matches!(
            verify_signature(&kp.public_key, &hash, &Felt::ZERO, &sig[1]),
            Err(KeyError::InvalidSignature)
        ));
    }

    #[test]
    fn test_high_s_signature_verifies() {
        let kp = KeyPair::generate();
        let hash = message_hash(b"submit 1");
        let sig = kp.sign(&hash).unwrap();

        // n - s through scalar negation
        let high_s = SecretKey::from_slice(sig[1].as_bytes()).unwrap().negate();
        let high_s = Felt::from_bytes(high_s.secret_bytes());
        assert_ne!(high_s, sig[1]);

        assert!(verify_signature(&kp.public_key, &hash, &sig[0], &high_s).unwrap());
        let other = message_hash(b"submit 2");
        assert!(!verify_signature(&kp.public_key, &other, &sig[0], &high_s).unwrap());
    }

    #[test]
    fn test_key_address_check() {
        let kp = KeyPair::generate();
        assert!(is_key_address(&kp.address()));

        assert!(!is_key_address("alice"));
        assert!(!is_key_address(""));

        // Flip the last character to break the checksum
        let mut tampered = kp.address();
        let last = tampered.pop().unwrap();
        tampered.push(if last == '2' { '3' } else { '2' });
        assert!(!is_key_address(&tampered));

        // Account addresses use version 0x05 and are not key addresses
        let owners = vec![kp.address(), KeyPair::generate().address()];
        let config = crate::multisig::MultisigConfig::new(2, owners, None).unwrap();
        assert!(!is_key_address(&config.account_address()));
    }

    #[test]
    fn test_key_pair_from_hex() {
        let kp1 = KeyPair::generate();
        let private_hex = kp1.private_key_hex();

        let kp2 = KeyPair::from_private_key_hex(&private_hex).unwrap();
        assert_eq!(kp1.public_key_hex(), kp2.public_key_hex());
        assert_eq!(kp1.address(), kp2.address());

        assert!(KeyPair::from_private_key_hex("not hex").is_err());
    }

    #[test]
    fn test_public_key_round_trip_and_address_format() {
        let kp = KeyPair::generate();
        let parsed = public_key_from_hex(&kp.public_key_hex()).unwrap();
        assert_eq!(parsed, kp.public_key);

        // Version byte 0x00 produces addresses starting with '1'
        assert!(kp.address().starts_with('1'));
    }
}
