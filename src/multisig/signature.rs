//! Signature validator
//!
//! The one routine every authentication hook goes through, so declare,
//! deploy and transaction validation share identical semantics.

use crate::core::Felt;
use crate::crypto::verify_signature;
use crate::multisig::error::MultisigError;
use secp256k1::PublicKey;

/// Number of scalar components in a signature: `[r, s]`
pub const SIGNATURE_LEN: usize = 2;

/// Successful validation result
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Validated;

/// Verify `signature` over `message_hash` against `public_key`.
///
/// The length is checked before any curve arithmetic.
pub fn validate(
    message_hash: &Felt,
    public_key: &PublicKey,
    signature: &[Felt],
) -> Result<Validated, MultisigError> {
    if signature.len() != SIGNATURE_LEN {
        return Err(MultisigError::InvalidSignatureLength(signature.len()));
    }

    match verify_signature(public_key, message_hash, &signature[0], &signature[1]) {
        Ok(true) => Ok(Validated),
        Ok(false) | Err(_) => Err(MultisigError::InvalidSignature),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyPair;

    fn flip_bit(felt: &Felt, byte: usize, bit: u8) -> Felt {
        let mut bytes = *felt.as_bytes();
        bytes[byte] ^= 1 << bit;
        Felt::from_bytes(bytes)
    }

    #[test]
    fn test_valid_signature_passes() {
        let kp = KeyPair::generate();
        let hash = Felt::from_name("request");
        let sig = kp.sign(&hash).unwrap();

        assert_eq!(validate(&hash, &kp.public_key, &sig).unwrap(), Validated);
    }

    #[test]
    fn test_wrong_length_fails_without_verifying() {
        let kp = KeyPair::generate();
        let hash = Felt::from_name("request");
        let sig = kp.sign(&hash).unwrap();

        for len in [0usize, 1, 3, 4] {
            let mut candidate = sig.clone();
            candidate.resize(len, Felt::ZERO);
            if len > 2 {
                // Still fails even though the first two components are valid
                assert_eq!(&candidate[..2], &sig[..]);
            }
            assert!(matches!(
                validate(&hash, &kp.public_key, &candidate),
                Err(MultisigError::InvalidSignatureLength(n)) if n == len
            ));
        }
    }

    #[test]
    fn test_flipped_bits_fail() {
        let kp = KeyPair::generate();
        let hash = Felt::from_name("request");
        let sig = kp.sign(&hash).unwrap();

        for (byte, bit) in [(0usize, 7u8), (0, 0), (15, 3), (31, 0)] {
            let bad_r = vec![flip_bit(&sig[0], byte, bit), sig[1]];
            let bad_s = vec![sig[0], flip_bit(&sig[1], byte, bit)];

            assert!(matches!(
                validate(&hash, &kp.public_key, &bad_r),
                Err(MultisigError::InvalidSignature)
            ));
            assert!(matches!(
                validate(&hash, &kp.public_key, &bad_s),
                Err(MultisigError::InvalidSignature)
            ));
        }
    }

    #[test]
    fn test_wrong_key_or_hash_fails() {
        let kp = KeyPair::generate();
        let other = KeyPair::generate();
        let hash = Felt::from_name("request");
        let sig = kp.sign(&hash).unwrap();

        assert!(validate(&hash, &other.public_key, &sig).is_err());
        assert!(validate(&Felt::from_name("other"), &kp.public_key, &sig).is_err());
    }

    #[test]
    fn test_high_s_and_zero_scalars() {
        let kp = KeyPair::generate();
        let hash = Felt::from_name("request");
        let sig = kp.sign(&hash).unwrap();

        let negated = secp256k1::SecretKey::from_slice(sig[1].as_bytes())
            .unwrap()
            .negate();
        let high_s = [sig[0], Felt::from_bytes(negated.secret_bytes())];
        assert_eq!(validate(&hash, &kp.public_key, &high_s).unwrap(), Validated);

        assert!(matches!(
            validate(&hash, &kp.public_key, &[Felt::ZERO, Felt::ZERO]),
            Err(MultisigError::InvalidSignature)
        ));
    }
}
