//! Account addresses derived from Ed25519 public keys.

use crate::hash::blake2b_256;
use tavern_types::Address;

/// The account a public key speaks for: the last 20 bytes of its Blake2b-256 hash.
pub fn address_of(public_key: &[u8; 32]) -> Address {
    let digest = blake2b_256(public_key);
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&digest[12..]);
    Address::new(bytes)
}
