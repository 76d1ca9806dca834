//! Blake2b-256 hashing.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};

type Blake2b256 = Blake2b<U32>;

pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    blake2b_256_multi(&[data])
}

/// Hash several slices as if concatenated.
pub fn blake2b_256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    for part in parts {
        hasher.update(part);
    }
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_and_input_sensitive() {
        assert_eq!(blake2b_256(b"tavern"), blake2b_256(b"tavern"));
        assert_ne!(blake2b_256(b"office"), blake2b_256(b"cellar"));
        assert_ne!(blake2b_256(b""), [0u8; 32]);
    }

    #[test]
    fn multi_matches_concatenation() {
        assert_eq!(blake2b_256(b"keepertavern"), blake2b_256_multi(&[b"keeper", b"tavern"]));
    }
}
