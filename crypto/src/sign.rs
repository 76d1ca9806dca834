//! Ed25519 message signing and verification.

use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};

pub fn sign_message(message: &[u8], secret: &[u8; 32]) -> [u8; 64] {
    SigningKey::from_bytes(secret).sign(message).to_bytes()
}

/// `false` for a bad signature or a public key that is not a curve point.
pub fn verify_signature(message: &[u8], signature: &[u8; 64], public_key: &[u8; 32]) -> bool {
    let Ok(verifying_key) = VerifyingKey::from_bytes(public_key) else {
        return false;
    };
    let sig = ed25519_dalek::Signature::from_bytes(signature);
    verifying_key.verify_strict(message, &sig).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::keypair_from_seed;

    #[test]
    fn sign_and_verify() {
        let kp = keypair_from_seed(&[3; 32]);
        let sig = sign_message(b"take office", &kp.secret);
        assert!(verify_signature(b"take office", &sig, &kp.public));
    }

    #[test]
    fn wrong_message_fails() {
        let kp = keypair_from_seed(&[3; 32]);
        let sig = sign_message(b"take office", &kp.secret);
        assert!(!verify_signature(b"relinquish", &sig, &kp.public));
    }

    #[test]
    fn wrong_key_fails() {
        let signer = keypair_from_seed(&[3; 32]);
        let other = keypair_from_seed(&[4; 32]);
        let sig = sign_message(b"raid", &signer.secret);
        assert!(!verify_signature(b"raid", &sig, &other.public));
    }
}
