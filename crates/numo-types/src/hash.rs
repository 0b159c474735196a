//! Keccak-256 hashing primitives.
//!
//! The engine hashes exactly one way: Keccak-256 over a plain byte
//! concatenation. Callers pass the pieces and never build intermediate
//! buffers themselves.

use sha3::{Digest, Keccak256};

use crate::Hash32;

/// The all-zero hash: absent leaves, empty accumulators.
pub const ZERO_HASH: Hash32 = [0u8; 32];

/// Keccak-256 of a single byte string.
#[must_use]
pub fn keccak256(data: &[u8]) -> Hash32 {
    Keccak256::digest(data).into()
}

/// Keccak-256 of the concatenation of `parts`.
#[must_use]
pub fn keccak256_concat(parts: &[&[u8]]) -> Hash32 {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keccak_of_empty_input() {
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn concat_equals_single_buffer() {
        let joined = keccak256(b"helloworld");
        let parts = keccak256_concat(&[b"hello", b"world"]);
        assert_eq!(joined, parts);
    }

    #[test]
    fn different_splits_same_bytes_same_hash() {
        assert_eq!(
            keccak256_concat(&[b"ab", b"c"]),
            keccak256_concat(&[b"a", b"bc"])
        );
    }
}
