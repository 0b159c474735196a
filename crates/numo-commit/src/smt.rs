//! 256-level sparse Merkle tree.
//!
//! Every 256-bit key addresses one leaf. Only non-empty nodes are stored:
//! a node missing from the map is the empty-subtree constant for its depth,
//! so an empty tree costs nothing and each write touches exactly 257 nodes.
//!
//! Nodes are addressed by `(depth, prefix)` where `prefix` is the key with
//! every bit at or below `depth` cleared.

use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

use numo_types::constants::TREE_DEPTH;
use numo_types::{Hash32, ZERO_HASH};

use crate::proof::{MerkleProof, get_bit, leaf_image, node_hash};

/// `empty[d]` is the root of an empty subtree whose top is at depth `d`;
/// `empty[256]` is the absent-leaf image.
pub fn empty_hashes() -> &'static [Hash32] {
    static EMPTY: OnceLock<Vec<Hash32>> = OnceLock::new();
    EMPTY.get_or_init(|| {
        let mut table = vec![ZERO_HASH; TREE_DEPTH + 1];
        for depth in (0..TREE_DEPTH).rev() {
            table[depth] = node_hash(&table[depth + 1], &table[depth + 1]);
        }
        table
    })
}

/// Root of the empty tree.
#[must_use]
pub fn empty_root() -> Hash32 {
    empty_hashes()[0]
}

fn prefix(key: &Hash32, depth: usize) -> Hash32 {
    let mut out = [0u8; 32];
    let full = depth / 8;
    out[..full].copy_from_slice(&key[..full]);
    let rem = depth % 8;
    if rem != 0 {
        out[full] = key[full] & (0xffu8 << (8 - rem));
    }
    out
}

fn with_bit(mut p: Hash32, depth: usize, set: bool) -> Hash32 {
    let mask = 1u8 << (7 - depth % 8);
    if set {
        p[depth / 8] |= mask;
    } else {
        p[depth / 8] &= !mask;
    }
    p
}

/// Host-side tree holding every value of one market.
#[derive(Debug, Clone, Default)]
pub struct SparseMerkleTree {
    values: BTreeMap<Hash32, Vec<u8>>,
    nodes: HashMap<(usize, Hash32), Hash32>,
}

impl SparseMerkleTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from initial `(key, value)` pairs.
    pub fn from_entries(entries: impl IntoIterator<Item = (Hash32, Vec<u8>)>) -> Self {
        let mut tree = Self::new();
        for (key, value) in entries {
            tree.insert(key, Some(value));
        }
        tree
    }

    fn node(&self, depth: usize, p: &Hash32) -> Hash32 {
        self.nodes
            .get(&(depth, *p))
            .copied()
            .unwrap_or(empty_hashes()[depth])
    }

    fn set_node(&mut self, depth: usize, p: Hash32, hash: Hash32) {
        if hash == empty_hashes()[depth] {
            self.nodes.remove(&(depth, p));
        } else {
            self.nodes.insert((depth, p), hash);
        }
    }

    #[must_use]
    pub fn root(&self) -> Hash32 {
        self.node(0, &ZERO_HASH)
    }

    #[must_use]
    pub fn get(&self, key: &Hash32) -> Option<&[u8]> {
        self.values.get(key).map(Vec::as_slice)
    }

    /// Set (`Some`) or delete (`None`) a value; returns the previous value.
    pub fn insert(&mut self, key: Hash32, value: Option<Vec<u8>>) -> Option<Vec<u8>> {
        self.set_node(TREE_DEPTH, key, leaf_image(&key, value.as_deref()));
        for depth in (0..TREE_DEPTH).rev() {
            let p = prefix(&key, depth);
            let left = self.node(depth + 1, &p);
            let right = self.node(depth + 1, &with_bit(p, depth, true));
            self.set_node(depth, p, node_hash(&left, &right));
        }
        match value {
            Some(v) => self.values.insert(key, v),
            None => self.values.remove(&key),
        }
    }

    /// Proof of the current value (or absence) at `key`.
    #[must_use]
    pub fn prove(&self, key: &Hash32) -> MerkleProof {
        let siblings = (0..TREE_DEPTH)
            .map(|depth| {
                let on_path = prefix(key, depth + 1);
                let sibling = with_bit(on_path, depth, !get_bit(key, depth));
                self.node(depth + 1, &sibling)
            })
            .collect();
        MerkleProof {
            key: *key,
            value: self.values.get(key).cloned(),
            siblings,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All present entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&Hash32, &Vec<u8>)> {
        self.values.iter()
    }
}
