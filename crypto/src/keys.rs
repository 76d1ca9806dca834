//! Ed25519 key pairs.

use ed25519_dalek::SigningKey;
use thiserror::Error;

#[derive(Clone)]
pub struct Keypair {
    pub public: [u8; 32],
    pub secret: [u8; 32],
}

impl std::fmt::Debug for Keypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keypair")
            .field("public", &hex::encode(self.public))
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("invalid hex: {0}")]
    Hex(String),
    #[error("expected {expected} bytes, got {got}")]
    Length { expected: usize, got: usize },
}

/// Deterministic key pair from a 32-byte seed.
pub fn keypair_from_seed(seed: &[u8; 32]) -> Keypair {
    let signing_key = SigningKey::from_bytes(seed);
    Keypair {
        public: signing_key.verifying_key().to_bytes(),
        secret: signing_key.to_bytes(),
    }
}

/// Decode a fixed-length hex string, with or without `0x`.
pub fn decode_fixed<const N: usize>(s: &str) -> Result<[u8; N], KeyError> {
    let raw = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(raw).map_err(|e| KeyError::Hex(e.to_string()))?;
    let got = bytes.len();
    bytes
        .try_into()
        .map_err(|_| KeyError::Length { expected: N, got })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_is_deterministic() {
        let a = keypair_from_seed(&[9; 32]);
        let b = keypair_from_seed(&[9; 32]);
        assert_eq!(a.public, b.public);
        assert_eq!(a.secret, [9; 32]);
    }

    #[test]
    fn decode_fixed_checks_length() {
        assert_eq!(decode_fixed::<2>("0xabcd").unwrap(), [0xab, 0xcd]);
        assert_eq!(
            decode_fixed::<32>("abcd"),
            Err(KeyError::Length { expected: 32, got: 2 })
        );
        assert!(matches!(decode_fixed::<2>("zz"), Err(KeyError::Hex(_))));
    }
}
