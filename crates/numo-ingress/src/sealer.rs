//! Batch sealing: fixes the message order and commits to it.
//!
//! `batchDigest = H("BATCH_V1" || domainSeparator || batchSeq || H(h_0 || h_1 || ...))`
//! where `h_i` are the domain-bound message hashes in batch order. Every
//! message counts, including ones later skipped.

use numo_types::constants::BATCH_TAG;
use numo_types::{Hash32, SignedMessage, keccak256_concat};

/// An ordered batch and its digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedBatch {
    pub batch_seq: u64,
    pub domain_separator: Hash32,
    pub messages: Vec<SignedMessage>,
    pub message_hashes: Vec<Hash32>,
    pub digest: Hash32,
}

impl SealedBatch {
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[must_use]
pub fn batch_digest(domain_separator: &Hash32, batch_seq: u64, message_hashes: &[Hash32]) -> Hash32 {
    let parts: Vec<&[u8]> = message_hashes.iter().map(<[u8; 32]>::as_slice).collect();
    let inner = keccak256_concat(&parts);
    keccak256_concat(&[
        BATCH_TAG,
        domain_separator,
        &batch_seq.to_be_bytes(),
        &inner,
    ])
}

/// Seal `messages` in the given order.
#[must_use]
pub fn seal(domain_separator: Hash32, batch_seq: u64, messages: Vec<SignedMessage>) -> SealedBatch {
    let message_hashes: Vec<Hash32> = messages
        .iter()
        .map(|m| m.message.hash(&domain_separator))
        .collect();
    let digest = batch_digest(&domain_separator, batch_seq, &message_hashes);
    tracing::debug!(
        batch_seq,
        messages = messages.len(),
        digest = %hex::encode(digest),
        "Batch sealed"
    );
    SealedBatch {
        batch_seq,
        domain_separator,
        messages,
        message_hashes,
        digest,
    }
}
