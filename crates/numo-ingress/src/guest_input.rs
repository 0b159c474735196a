//! The guest input blob.
//!
//! Fixed section order, no framing beyond the two `u32` counts:
//!
//! | Section   | Layout                                                     |
//! |-----------|------------------------------------------------------------|
//! | partial   | `PublicInputsPartial` (176 bytes)                          |
//! | market    | `chainId(u64) || venueId(32) || marketId(32)`              |
//! | rules     | `Rules` in fixed field order                               |
//! | messages  | `u32 count`, then each signed message with its hints       |
//! | proofs    | `u32 count`, then each store proof in access order         |
//!
//! Bytes after the proof section make the blob malformed.

use numo_commit::MerkleProof;
use numo_types::constants::{SIGNATURE_LEN, TREE_DEPTH};
use numo_types::{
    ByteReader, ByteWriter, Decode, Encode, Hash32, MarketConfig, PublicInputsPartial, Result,
    Rules, SignedMessage,
};

/// Smallest encoded message: a cancel.
const MIN_MESSAGE_LEN: usize = 1 + 20 + 8 + 32 + SIGNATURE_LEN;

/// Smallest encoded proof: an absence proof.
const MIN_PROOF_LEN: usize = 32 + 1 + 4 + TREE_DEPTH * 32;

/// Everything the guest needs to re-execute one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuestInput {
    pub partial: PublicInputsPartial,
    pub chain_id: u64,
    pub venue_id: Hash32,
    pub market_id: Hash32,
    pub rules: Rules,
    pub messages: Vec<SignedMessage>,
    pub proofs: Vec<MerkleProof>,
}

impl GuestInput {
    #[must_use]
    pub fn market(&self) -> MarketConfig {
        MarketConfig {
            chain_id: self.chain_id,
            venue_id: self.venue_id,
            market_id: self.market_id,
            rules: self.rules.clone(),
        }
    }
}

impl Encode for GuestInput {
    // Counts are bounded by maxOrdersPerBatch and the batch's access count.
    #[allow(clippy::cast_possible_truncation)]
    fn encode_to(&self, w: &mut ByteWriter) {
        self.partial.encode_to(w);
        w.put_u64(self.chain_id);
        w.put_bytes(&self.venue_id);
        w.put_bytes(&self.market_id);
        self.rules.encode_to(w);
        w.put_u32(self.messages.len() as u32);
        for message in &self.messages {
            message.encode_to(w);
        }
        w.put_u32(self.proofs.len() as u32);
        for proof in &self.proofs {
            proof.encode_to(w);
        }
    }
}

impl Decode for GuestInput {
    fn decode_from(r: &mut ByteReader<'_>) -> Result<Self> {
        let partial = PublicInputsPartial::decode_from(r)?;
        let chain_id = r.u64()?;
        let venue_id = r.array()?;
        let market_id = r.array()?;
        let rules = Rules::decode_from(r)?;

        let count = r.u32()?;
        let mut messages = Vec::with_capacity(r.capacity_hint(count, MIN_MESSAGE_LEN));
        for _ in 0..count {
            messages.push(SignedMessage::decode_from(r)?);
        }

        let count = r.u32()?;
        let mut proofs = Vec::with_capacity(r.capacity_hint(count, MIN_PROOF_LEN));
        for _ in 0..count {
            proofs.push(MerkleProof::decode_from(r)?);
        }

        Ok(Self {
            partial,
            chain_id,
            venue_id,
            market_id,
            rules,
            messages,
            proofs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::{TestTrader, with_hints};
    use numo_commit::SparseMerkleTree;
    use numo_types::{NumoError, Side};

    fn sample() -> GuestInput {
        let market = MarketConfig::dummy();
        let domain = market.domain_separator();
        let mut alice = TestTrader::new(1, domain);
        let messages = vec![
            with_hints(alice.sign_place(1, Side::Buy, 10, 3), Some(11), None),
            alice.sign_cancel(1),
        ];
        let tree = SparseMerkleTree::from_entries([([1; 32], vec![1, 2, 3])]);
        GuestInput {
            partial: PublicInputsPartial {
                prev_root: tree.root(),
                batch_digest: [2; 32],
                rules_hash: market.rules_hash(),
                domain_separator: domain,
                batch_seq: 1,
                batch_timestamp: 1_700_000_000,
                da_commitment: [0; 32],
            },
            chain_id: market.chain_id,
            venue_id: market.venue_id,
            market_id: market.market_id,
            rules: market.rules,
            messages,
            proofs: vec![tree.prove(&[1; 32]), tree.prove(&[2; 32])],
        }
    }

    #[test]
    fn blob_decodes_to_same_input() {
        let input = sample();
        let blob = input.to_bytes();
        let decoded = GuestInput::from_bytes(&blob).unwrap();
        assert_eq!(decoded, input);
        assert_eq!(decoded.market(), MarketConfig::dummy());
    }

    #[test]
    fn trailing_bytes_are_malformed() {
        let mut blob = sample().to_bytes();
        blob.push(0);
        assert_eq!(
            GuestInput::from_bytes(&blob),
            Err(NumoError::TrailingBytes { count: 1 })
        );
    }

    #[test]
    fn truncated_blob_fails_at_every_cut() {
        let blob = sample().to_bytes();
        for cut in [0, 100, 176, 300, blob.len() / 2, blob.len() - 1] {
            let err = GuestInput::from_bytes(&blob[..cut]).unwrap_err();
            assert!(err.is_batch_fatal(), "cut {cut}: {err}");
        }
    }

    #[test]
    fn hostile_message_count_does_not_preallocate() {
        let mut input = sample();
        input.messages.clear();
        input.proofs.clear();
        let mut blob = input.to_bytes();
        // Overwrite the message count (8 bytes before the end) with u32::MAX.
        let at = blob.len() - 8;
        blob[at..at + 4].copy_from_slice(&u32::MAX.to_be_bytes());
        assert!(matches!(
            GuestInput::from_bytes(&blob),
            Err(NumoError::UnexpectedEof { .. })
        ));
    }
}
