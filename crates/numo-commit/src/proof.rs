//! Membership and absence proofs against a 256-level tree.
//!
//! A proof carries the key, the value at that key (or `None` for absent),
//! and 256 sibling hashes: `siblings[d]` is the sibling of the path node at
//! depth `d + 1`. Folding runs from the leaf (index 255) up to the root.

use numo_types::constants::{LEAF_PREFIX, NODE_PREFIX, TREE_DEPTH};
use numo_types::{
    ByteReader, ByteWriter, Decode, Encode, Hash32, NumoError, Result, ZERO_HASH, keccak256,
    keccak256_concat,
};

/// `H(0x00 || key || H(value))`.
#[must_use]
pub fn leaf_hash(key: &Hash32, value: &[u8]) -> Hash32 {
    keccak256_concat(&[&[LEAF_PREFIX], key, &keccak256(value)])
}

/// Leaf image of an optional value; absent keys are the zero hash.
#[must_use]
pub fn leaf_image(key: &Hash32, value: Option<&[u8]>) -> Hash32 {
    value.map_or(ZERO_HASH, |v| leaf_hash(key, v))
}

/// `H(0x01 || left || right)`.
#[must_use]
pub fn node_hash(left: &Hash32, right: &Hash32) -> Hash32 {
    keccak256_concat(&[&[NODE_PREFIX], left, right])
}

/// Bit `depth` of `key`, most significant bit first.
#[must_use]
pub fn get_bit(key: &Hash32, depth: usize) -> bool {
    (key[depth / 8] >> (7 - depth % 8)) & 1 == 1
}

/// Fold a leaf image up through `siblings` to a root.
pub fn fold(key: &Hash32, leaf: Hash32, siblings: &[Hash32]) -> Result<Hash32> {
    if siblings.len() != TREE_DEPTH {
        return Err(NumoError::MalformedProof {
            reason: format!("expected {TREE_DEPTH} siblings, got {}", siblings.len()),
        });
    }
    let mut cur = leaf;
    for depth in (0..TREE_DEPTH).rev() {
        let sibling = &siblings[depth];
        cur = if get_bit(key, depth) {
            node_hash(sibling, &cur)
        } else {
            node_hash(&cur, sibling)
        };
    }
    Ok(cur)
}

/// A Merkle path for one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleProof {
    pub key: Hash32,
    pub value: Option<Vec<u8>>,
    pub siblings: Vec<Hash32>,
}

impl MerkleProof {
    /// Root implied by this proof's own value.
    pub fn compute_root(&self) -> Result<Hash32> {
        fold(
            &self.key,
            leaf_image(&self.key, self.value.as_deref()),
            &self.siblings,
        )
    }

    /// Root the tree would have if this key held `value` instead.
    pub fn root_with(&self, value: Option<&[u8]>) -> Result<Hash32> {
        fold(&self.key, leaf_image(&self.key, value), &self.siblings)
    }

    /// Check the proof against `root`.
    pub fn verify(&self, root: &Hash32) -> Result<()> {
        if self.compute_root()? == *root {
            Ok(())
        } else {
            Err(NumoError::ProofRootMismatch)
        }
    }
}

/// Boolean form of [`MerkleProof::verify`] over loose parts.
#[must_use]
pub fn verify_proof(root: &Hash32, key: &Hash32, value: Option<&[u8]>, siblings: &[Hash32]) -> bool {
    fold(key, leaf_image(key, value), siblings).is_ok_and(|r| r == *root)
}

impl Encode for MerkleProof {
    // Stored values are fixed-width entities of at most 90 bytes.
    #[allow(clippy::cast_possible_truncation)]
    fn encode_to(&self, w: &mut ByteWriter) {
        w.put_bytes(&self.key);
        match &self.value {
            Some(v) => {
                w.put_u8(1);
                w.put_u32(v.len() as u32);
                w.put_bytes(v);
            }
            None => {
                w.put_u8(0);
                w.put_u32(0);
            }
        }
        for sibling in &self.siblings {
            w.put_bytes(sibling);
        }
    }
}

impl Decode for MerkleProof {
    fn decode_from(r: &mut ByteReader<'_>) -> Result<Self> {
        let key = r.array()?;
        let present = r.u8()?;
        let raw = r.var_bytes()?;
        let value = match present {
            1 => Some(raw.to_vec()),
            0 if raw.is_empty() => None,
            0 => {
                return Err(NumoError::MalformedProof {
                    reason: "absent proof carries value bytes".into(),
                });
            }
            other => {
                return Err(NumoError::InvalidEnum {
                    field: "present",
                    value: u32::from(other),
                });
            }
        };
        let mut siblings = Vec::with_capacity(TREE_DEPTH);
        for _ in 0..TREE_DEPTH {
            siblings.push(r.array()?);
        }
        Ok(Self {
            key,
            value,
            siblings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_are_msb_first() {
        let mut key = [0u8; 32];
        key[0] = 0b1000_0001;
        key[31] = 0b0000_0001;
        assert!(get_bit(&key, 0));
        assert!(!get_bit(&key, 1));
        assert!(get_bit(&key, 7));
        assert!(get_bit(&key, 255));
        assert!(!get_bit(&key, 254));
    }

    #[test]
    fn absent_leaf_is_zero() {
        assert_eq!(leaf_image(&[1; 32], None), ZERO_HASH);
        assert_ne!(leaf_image(&[1; 32], Some(b"".as_slice())), ZERO_HASH);
    }

    #[test]
    fn leaf_and_node_domains_differ() {
        let a = [3u8; 32];
        assert_ne!(leaf_hash(&a, &a), node_hash(&a, &a));
    }

    #[test]
    fn fold_rejects_wrong_sibling_count() {
        let err = fold(&[0; 32], ZERO_HASH, &[ZERO_HASH; 3]).unwrap_err();
        assert_eq!(err.code(), 204);
    }

    #[test]
    fn proof_wire_round_trip() {
        let proof = MerkleProof {
            key: [9; 32],
            value: Some(vec![1, 2, 3]),
            siblings: vec![[4; 32]; TREE_DEPTH],
        };
        let bytes = proof.to_bytes();
        assert_eq!(bytes.len(), 32 + 1 + 4 + 3 + TREE_DEPTH * 32);
        assert_eq!(MerkleProof::from_bytes(&bytes).unwrap(), proof);

        let absent = MerkleProof {
            value: None,
            ..proof
        };
        assert_eq!(MerkleProof::from_bytes(&absent.to_bytes()).unwrap(), absent);
    }

    #[test]
    fn absent_with_bytes_is_malformed() {
        let mut w = ByteWriter::new();
        w.put_bytes(&[9; 32]);
        w.put_u8(0);
        w.put_var_bytes(&[1]).unwrap();
        for _ in 0..TREE_DEPTH {
            w.put_bytes(&[0; 32]);
        }
        let err = MerkleProof::from_bytes(&w.into_bytes()).unwrap_err();
        assert_eq!(err.code(), 204);
    }
}
