//! The public-input record committed to by a batch proof.
//!
//! [`PublicInputs`] is the exact concatenation of eight 32-byte hashes and
//! two big-endian `u64`s in field order, with no prefixes or padding. The
//! on-chain verifier re-encodes the same record and compares bytes.
//!
//! [`PublicInputsPartial`] is the host-asserted prefix that opens the guest
//! input blob: everything known before execution.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::ids::{Hash32, serde_hex};
use crate::wire::{ByteReader, ByteWriter, Decode, Encode};

/// Exact encoded length of [`PublicInputs`].
pub const PUBLIC_INPUTS_LEN: usize = 8 * 32 + 2 * 8;

/// Exact encoded length of [`PublicInputsPartial`].
pub const PUBLIC_INPUTS_PARTIAL_LEN: usize = 5 * 32 + 2 * 8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicInputs {
    #[serde(with = "serde_hex")]
    pub prev_root: Hash32,
    #[serde(with = "serde_hex")]
    pub new_root: Hash32,
    #[serde(with = "serde_hex")]
    pub batch_digest: Hash32,
    #[serde(with = "serde_hex")]
    pub rules_hash: Hash32,
    #[serde(with = "serde_hex")]
    pub domain_separator: Hash32,
    pub batch_seq: u64,
    pub batch_timestamp: u64,
    #[serde(with = "serde_hex")]
    pub da_commitment: Hash32,
    #[serde(with = "serde_hex")]
    pub trades_root: Hash32,
    #[serde(with = "serde_hex")]
    pub fees_root: Hash32,
}

impl PublicInputs {
    /// Complete a partial record with the execution results.
    #[must_use]
    pub fn from_partial(
        partial: &PublicInputsPartial,
        new_root: Hash32,
        trades_root: Hash32,
        fees_root: Hash32,
    ) -> Self {
        Self {
            prev_root: partial.prev_root,
            new_root,
            batch_digest: partial.batch_digest,
            rules_hash: partial.rules_hash,
            domain_separator: partial.domain_separator,
            batch_seq: partial.batch_seq,
            batch_timestamp: partial.batch_timestamp,
            da_commitment: partial.da_commitment,
            trades_root,
            fees_root,
        }
    }
}

impl Encode for PublicInputs {
    fn encode_to(&self, w: &mut ByteWriter) {
        w.put_bytes(&self.prev_root);
        w.put_bytes(&self.new_root);
        w.put_bytes(&self.batch_digest);
        w.put_bytes(&self.rules_hash);
        w.put_bytes(&self.domain_separator);
        w.put_u64(self.batch_seq);
        w.put_u64(self.batch_timestamp);
        w.put_bytes(&self.da_commitment);
        w.put_bytes(&self.trades_root);
        w.put_bytes(&self.fees_root);
    }
}

impl Decode for PublicInputs {
    fn decode_from(r: &mut ByteReader<'_>) -> Result<Self> {
        Ok(Self {
            prev_root: r.array()?,
            new_root: r.array()?,
            batch_digest: r.array()?,
            rules_hash: r.array()?,
            domain_separator: r.array()?,
            batch_seq: r.u64()?,
            batch_timestamp: r.u64()?,
            da_commitment: r.array()?,
            trades_root: r.array()?,
            fees_root: r.array()?,
        })
    }
}

/// Host-asserted fields, known before the batch runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicInputsPartial {
    #[serde(with = "serde_hex")]
    pub prev_root: Hash32,
    #[serde(with = "serde_hex")]
    pub batch_digest: Hash32,
    #[serde(with = "serde_hex")]
    pub rules_hash: Hash32,
    #[serde(with = "serde_hex")]
    pub domain_separator: Hash32,
    pub batch_seq: u64,
    pub batch_timestamp: u64,
    #[serde(with = "serde_hex")]
    pub da_commitment: Hash32,
}

impl Encode for PublicInputsPartial {
    fn encode_to(&self, w: &mut ByteWriter) {
        w.put_bytes(&self.prev_root);
        w.put_bytes(&self.batch_digest);
        w.put_bytes(&self.rules_hash);
        w.put_bytes(&self.domain_separator);
        w.put_u64(self.batch_seq);
        w.put_u64(self.batch_timestamp);
        w.put_bytes(&self.da_commitment);
    }
}

impl Decode for PublicInputsPartial {
    fn decode_from(r: &mut ByteReader<'_>) -> Result<Self> {
        Ok(Self {
            prev_root: r.array()?,
            batch_digest: r.array()?,
            rules_hash: r.array()?,
            domain_separator: r.array()?,
            batch_seq: r.u64()?,
            batch_timestamp: r.u64()?,
            da_commitment: r.array()?,
        })
    }
}
