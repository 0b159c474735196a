//! Binary Merkle accumulator over ordered leaves.
//!
//! Used for `tradesRoot` (trade leaves in execution order) and `feesRoot`
//! (fee leaves sorted by asset id). An odd level duplicates its last node;
//! a single leaf is its own root; no leaves give the zero root.

use numo_types::{Hash32, ZERO_HASH};

use crate::proof::node_hash;

#[must_use]
pub fn merkle_root(leaves: &[Hash32]) -> Hash32 {
    if leaves.is_empty() {
        return ZERO_HASH;
    }
    let mut level = leaves.to_vec();
    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| {
                let left = &pair[0];
                node_hash(left, pair.get(1).unwrap_or(left))
            })
            .collect();
    }
    level[0]
}
