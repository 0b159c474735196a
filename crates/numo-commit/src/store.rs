//! State access seam: recording on the host, replaying in the guest.
//!
//! The engine reads and writes state only through [`StateAccess`]. Two
//! implementations exist:
//!
//! - [`TreeStore`]: owns the full [`SparseMerkleTree`]; every access emits
//!   a proof of the pre-access value, in access order.
//! - [`ProofStore`]: owns only a root; consumes those proofs in the same
//!   order, verifying each against the running root and applying writes
//!   root-to-root.
//!
//! Both log every accessed key. Checkpoints let a single message roll back
//! its writes without disturbing the proof stream: rolled-back accesses
//! still consumed their proofs on both sides.

use numo_types::{Hash32, NumoError, Result, keccak256_concat};

use crate::proof::MerkleProof;
use crate::smt::SparseMerkleTree;

/// A point to roll back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    journal_len: usize,
    root: Hash32,
}

/// Read/write access to one market's authenticated state.
pub trait StateAccess {
    /// Current value at `key`, `None` if absent.
    fn read(&mut self, key: &Hash32) -> Result<Option<Vec<u8>>>;

    /// Set or delete the value at `key`.
    fn write(&mut self, key: Hash32, value: Option<Vec<u8>>) -> Result<()>;

    fn root(&self) -> Hash32;

    fn checkpoint(&self) -> Checkpoint;

    /// Undo every write since `checkpoint`. The access log is kept.
    fn rollback(&mut self, checkpoint: Checkpoint) -> Result<()>;

    /// Every accessed key, in access order.
    fn touched_keys(&self) -> &[Hash32];
}

/// Digest of the ordered touched-key log: `H(k_0 || k_1 || ...)`.
#[must_use]
pub fn touched_digest(keys: &[Hash32]) -> Hash32 {
    let parts: Vec<&[u8]> = keys.iter().map(<[u8; 32]>::as_slice).collect();
    keccak256_concat(&parts)
}

/// What a recorded run produced for the prover.
#[derive(Debug, Clone, Default)]
pub struct StoreTrace {
    pub proofs: Vec<MerkleProof>,
    pub touched_keys: Vec<Hash32>,
}

// ---------------------------------------------------------------------------
// TreeStore
// ---------------------------------------------------------------------------

/// Host store: the full tree plus a proof recorder.
#[derive(Debug, Clone, Default)]
pub struct TreeStore {
    tree: SparseMerkleTree,
    journal: Vec<(Hash32, Option<Vec<u8>>)>,
    proofs: Vec<MerkleProof>,
    touched: Vec<Hash32>,
}

impl TreeStore {
    #[must_use]
    pub fn new(tree: SparseMerkleTree) -> Self {
        Self {
            tree,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn tree(&self) -> &SparseMerkleTree {
        &self.tree
    }

    /// Hand the recorded proofs and key log to the caller and start a
    /// fresh recording. Writes already applied stay applied.
    pub fn take_trace(&mut self) -> StoreTrace {
        self.journal.clear();
        StoreTrace {
            proofs: std::mem::take(&mut self.proofs),
            touched_keys: std::mem::take(&mut self.touched),
        }
    }

    fn record(&mut self, key: &Hash32) -> &MerkleProof {
        self.touched.push(*key);
        let proof = self.tree.prove(key);
        self.proofs.push(proof);
        &self.proofs[self.proofs.len() - 1]
    }

    #[must_use]
    pub fn into_tree(self) -> SparseMerkleTree {
        self.tree
    }
}

impl StateAccess for TreeStore {
    fn read(&mut self, key: &Hash32) -> Result<Option<Vec<u8>>> {
        Ok(self.record(key).value.clone())
    }

    fn write(&mut self, key: Hash32, value: Option<Vec<u8>>) -> Result<()> {
        self.record(&key);
        let old = self.tree.insert(key, value);
        self.journal.push((key, old));
        Ok(())
    }

    fn root(&self) -> Hash32 {
        self.tree.root()
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            journal_len: self.journal.len(),
            root: self.tree.root(),
        }
    }

    fn rollback(&mut self, checkpoint: Checkpoint) -> Result<()> {
        if checkpoint.journal_len > self.journal.len() {
            return Err(NumoError::InvariantViolation(
                "checkpoint is newer than the journal".into(),
            ));
        }
        while self.journal.len() > checkpoint.journal_len {
            if let Some((key, old)) = self.journal.pop() {
                self.tree.insert(key, old);
            }
        }
        if self.tree.root() != checkpoint.root {
            return Err(NumoError::InvariantViolation(
                "rollback did not restore checkpoint root".into(),
            ));
        }
        Ok(())
    }

    fn touched_keys(&self) -> &[Hash32] {
        &self.touched
    }
}

// ---------------------------------------------------------------------------
// ProofStore
// ---------------------------------------------------------------------------

/// Guest store: a running root fed by an ordered proof stream.
#[derive(Debug, Clone)]
pub struct ProofStore {
    root: Hash32,
    proofs: std::vec::IntoIter<MerkleProof>,
    touched: Vec<Hash32>,
    writes: usize,
}

impl ProofStore {
    #[must_use]
    pub fn new(root: Hash32, proofs: Vec<MerkleProof>) -> Self {
        Self {
            root,
            proofs: proofs.into_iter(),
            touched: Vec::new(),
            writes: 0,
        }
    }

    fn next_proof(&mut self, key: &Hash32) -> Result<MerkleProof> {
        let proof = self.proofs.next().ok_or(NumoError::MissingProof)?;
        if proof.key != *key {
            return Err(NumoError::ProofKeyMismatch {
                expected: hex::encode(key),
                got: hex::encode(proof.key),
            });
        }
        proof.verify(&self.root)?;
        self.touched.push(*key);
        Ok(proof)
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.proofs.len()
    }

    /// Every proof must have been consumed.
    pub fn finish(&self) -> Result<()> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(NumoError::UnusedProofs(n)),
        }
    }
}

impl StateAccess for ProofStore {
    fn read(&mut self, key: &Hash32) -> Result<Option<Vec<u8>>> {
        Ok(self.next_proof(key)?.value)
    }

    fn write(&mut self, key: Hash32, value: Option<Vec<u8>>) -> Result<()> {
        let proof = self.next_proof(&key)?;
        self.root = proof.root_with(value.as_deref())?;
        self.writes += 1;
        Ok(())
    }

    fn root(&self) -> Hash32 {
        self.root
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            journal_len: self.writes,
            root: self.root,
        }
    }

    fn rollback(&mut self, checkpoint: Checkpoint) -> Result<()> {
        if checkpoint.journal_len > self.writes {
            return Err(NumoError::InvariantViolation(
                "checkpoint is newer than the journal".into(),
            ));
        }
        self.root = checkpoint.root;
        self.writes = checkpoint.journal_len;
        Ok(())
    }

    fn touched_keys(&self) -> &[Hash32] {
        &self.touched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smt::empty_root;

    fn k(b: u8) -> Hash32 {
        [b; 32]
    }

    fn script<S: StateAccess>(store: &mut S) -> Result<()> {
        store.write(k(1), Some(vec![1]))?;
        assert_eq!(store.read(&k(1))?, Some(vec![1]));
        assert_eq!(store.read(&k(2))?, None);
        let cp = store.checkpoint();
        store.write(k(2), Some(vec![2]))?;
        store.write(k(1), None)?;
        store.rollback(cp)?;
        store.write(k(3), Some(vec![3]))?;
        assert_eq!(store.read(&k(1))?, Some(vec![1]));
        Ok(())
    }

    #[test]
    fn tree_store_rollback_restores_values() {
        let mut store = TreeStore::default();
        script(&mut store).unwrap();
        assert_eq!(store.tree().get(&k(1)), Some(&[1u8][..]));
        assert_eq!(store.tree().get(&k(2)), None);
        assert_eq!(store.tree().get(&k(3)), Some(&[3u8][..]));
        assert_eq!(store.touched_keys().len(), 7);
    }

    #[test]
    fn proof_store_replays_recorded_trace() {
        let mut host = TreeStore::default();
        script(&mut host).unwrap();
        let host_root = host.root();
        let trace = host.take_trace();

        let mut guest = ProofStore::new(empty_root(), trace.proofs);
        script(&mut guest).unwrap();
        guest.finish().unwrap();
        assert_eq!(guest.root(), host_root);
        assert_eq!(guest.touched_keys(), trace.touched_keys.as_slice());
        assert_eq!(
            touched_digest(guest.touched_keys()),
            touched_digest(&trace.touched_keys)
        );
    }

    #[test]
    fn proof_store_detects_missing_and_unused_proofs() {
        let mut host = TreeStore::default();
        host.write(k(1), Some(vec![1])).unwrap();
        host.write(k(2), Some(vec![2])).unwrap();
        let trace = host.take_trace();

        let mut short = ProofStore::new(empty_root(), trace.proofs[..1].to_vec());
        short.write(k(1), Some(vec![1])).unwrap();
        assert_eq!(
            short.write(k(2), Some(vec![2])),
            Err(NumoError::MissingProof)
        );

        let mut long = ProofStore::new(empty_root(), trace.proofs);
        long.write(k(1), Some(vec![1])).unwrap();
        assert_eq!(long.finish(), Err(NumoError::UnusedProofs(1)));
    }

    #[test]
    fn proof_store_rejects_wrong_key_and_tampered_value() {
        let mut host = TreeStore::new(SparseMerkleTree::from_entries([(k(9), vec![9])]));
        let start = host.root();
        host.read(&k(9)).unwrap();
        let trace = host.take_trace();

        let mut wrong_key = ProofStore::new(start, trace.proofs.clone());
        assert_eq!(wrong_key.read(&k(8)).unwrap_err().code(), 201);

        let mut tampered = trace.proofs;
        tampered[0].value = Some(vec![10]);
        let mut guest = ProofStore::new(start, tampered);
        assert_eq!(guest.read(&k(9)), Err(NumoError::ProofRootMismatch));
    }

    #[test]
    fn touched_digest_of_nothing_is_hash_of_empty() {
        assert_eq!(touched_digest(&[]), numo_types::keccak256(b""));
    }
}
