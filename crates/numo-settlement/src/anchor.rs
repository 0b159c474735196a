//! In-process model of the on-chain root anchor.
//!
//! The anchor keeps `markets[domainSeparator] -> (root, batchSeq)` and
//! accepts a batch only if it extends that position by exactly one and its
//! proof verifies over the exact public-input bytes. How a proof verifies
//! is behind [`ProofVerifier`].

use std::collections::BTreeMap;

use numo_types::{Encode, Hash32, NumoError, PublicInputs, Result};
use serde::{Deserialize, Serialize};

use crate::guest::execute_guest;

/// Checks a proof for a program over public-input bytes.
pub trait ProofVerifier {
    fn verify(&self, program_key: &Hash32, public_inputs: &[u8], proof: &[u8]) -> bool;
}

/// Verifier that treats the "proof" as the guest witness and re-executes it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReexecutionVerifier;

impl ProofVerifier for ReexecutionVerifier {
    fn verify(&self, _program_key: &Hash32, public_inputs: &[u8], proof: &[u8]) -> bool {
        execute_guest(proof).is_ok_and(|out| out.public_inputs_bytes == public_inputs)
    }
}

/// Anchored position of one market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchoredMarket {
    #[serde(with = "numo_types::serde_hex")]
    pub root: Hash32,
    pub batch_seq: u64,
}

pub struct RootAnchor<V: ProofVerifier> {
    verifier: V,
    program_key: Hash32,
    markets: BTreeMap<Hash32, AnchoredMarket>,
    accepted: Vec<PublicInputs>,
}

impl<V: ProofVerifier> RootAnchor<V> {
    #[must_use]
    pub fn new(verifier: V, program_key: Hash32) -> Self {
        Self {
            verifier,
            program_key,
            markets: BTreeMap::new(),
            accepted: Vec::new(),
        }
    }

    /// Start tracking a market at its genesis root, sequence zero.
    pub fn register_market(&mut self, domain_separator: Hash32, genesis_root: Hash32) {
        self.markets.insert(
            domain_separator,
            AnchoredMarket {
                root: genesis_root,
                batch_seq: 0,
            },
        );
    }

    #[must_use]
    pub fn market(&self, domain_separator: &Hash32) -> Option<AnchoredMarket> {
        self.markets.get(domain_separator).copied()
    }

    /// Every accepted batch, in acceptance order.
    #[must_use]
    pub fn accepted(&self) -> &[PublicInputs] {
        &self.accepted
    }

    pub fn verify_and_update(&mut self, inputs: &PublicInputs, proof: &[u8]) -> Result<()> {
        let domain = inputs.domain_separator;
        let current = self
            .markets
            .get(&domain)
            .copied()
            .ok_or_else(|| NumoError::UnknownMarket(hex::encode(domain)))?;
        let expected = current.batch_seq.checked_add(1).ok_or(NumoError::ArithmeticOverflow)?;
        if inputs.batch_seq != expected {
            return Err(NumoError::BatchSeqMismatch {
                expected,
                got: inputs.batch_seq,
            });
        }
        if inputs.prev_root != current.root {
            return Err(NumoError::PrevRootMismatch);
        }
        if !self
            .verifier
            .verify(&self.program_key, &inputs.to_bytes(), proof)
        {
            return Err(NumoError::ProofRejected);
        }
        self.markets.insert(
            domain,
            AnchoredMarket {
                root: inputs.new_root,
                batch_seq: inputs.batch_seq,
            },
        );
        self.accepted.push(*inputs);
        tracing::info!(
            domain = %hex::encode(domain),
            batch_seq = inputs.batch_seq,
            new_root = %hex::encode(inputs.new_root),
            "Batch anchored"
        );
        Ok(())
    }
}
