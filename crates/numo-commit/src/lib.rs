//! # numo-commit
//!
//! The **commitment layer** of the Numo engine. All market state lives in a
//! single authenticated key-value store per market:
//!
//! - [`keys`]: namespaced key derivation for every stored entity
//! - [`smt`]: the 256-level sparse Merkle tree and its empty-subtree constants
//! - [`proof`]: membership / absence proofs and root recomputation
//! - [`store`]: the [`StateAccess`] seam with a recording [`TreeStore`]
//!   (host) and a replaying [`ProofStore`] (guest)
//! - [`state`]: typed entity accessors over any [`StateAccess`]
//! - [`accumulator`]: binary Merkle roots over trade and fee leaves
//!
//! Every access to the store is logged in order; the digest of that log is
//! a private debugging commitment, never part of consensus output.

pub mod accumulator;
pub mod keys;
pub mod proof;
pub mod smt;
pub mod state;
pub mod store;

pub use accumulator::merkle_root;
pub use proof::MerkleProof;
pub use smt::SparseMerkleTree;
pub use state::State;
pub use store::{Checkpoint, ProofStore, StateAccess, StoreTrace, TreeStore, touched_digest};
