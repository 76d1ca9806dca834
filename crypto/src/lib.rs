//! Cryptographic primitives for the tavern keeper.
//!
//! - **Ed25519** for signing requests and verifying them at the HTTP boundary
//! - **Blake2b** for hashing public keys into account addresses

pub mod address;
pub mod hash;
pub mod keys;
pub mod sign;

pub use address::address_of;
pub use hash::{blake2b_256, blake2b_256_multi};
pub use keys::{decode_fixed, keypair_from_seed, KeyError, Keypair};
pub use sign::{sign_message, verify_signature};
