//! Guest program entry.
//!
//! Re-executes a batch from its witness blob alone: no tree, only the
//! asserted previous root and the ordered access proofs. What it outputs is
//! what a proof commits to.

use numo_commit::{ProofStore, StateAccess, touched_digest};
use numo_ingress::{GuestInput, batch_digest};
use numo_types::{Decode, Encode, Hash32, NumoError, PublicInputs, Result};

use crate::processor::apply_batch;

/// Committed output of one guest run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuestOutput {
    pub public_inputs: PublicInputs,
    /// Exact bytes the verifier re-derives and compares.
    pub public_inputs_bytes: Vec<u8>,
    /// Private debugging commitment to the access log.
    pub touched_digest: Hash32,
}

/// Decode, check and replay a guest input blob.
pub fn execute_guest(blob: &[u8]) -> Result<GuestOutput> {
    let input = GuestInput::from_bytes(blob)?;
    let market = input.market();
    let partial = &input.partial;

    market.rules.validate()?;
    if market.domain_separator() != partial.domain_separator {
        return Err(NumoError::DomainSeparatorMismatch);
    }
    if market.rules_hash() != partial.rules_hash {
        return Err(NumoError::RulesHashMismatch);
    }
    let max = market.rules.max_orders_per_batch;
    if input.messages.len() > max as usize {
        return Err(NumoError::TooManyMessages {
            count: input.messages.len(),
            max,
        });
    }
    let hashes: Vec<Hash32> = input
        .messages
        .iter()
        .map(|m| m.message.hash(&partial.domain_separator))
        .collect();
    if batch_digest(&partial.domain_separator, partial.batch_seq, &hashes) != partial.batch_digest {
        return Err(NumoError::BatchDigestMismatch);
    }

    let mut store = ProofStore::new(partial.prev_root, input.proofs);
    let output = apply_batch(&mut store, &market, &input.messages)?;
    store.finish()?;

    let public_inputs = PublicInputs::from_partial(
        partial,
        store.root(),
        output.trades_root(),
        output.fees_root(),
    );
    Ok(GuestOutput {
        public_inputs_bytes: public_inputs.to_bytes(),
        public_inputs,
        touched_digest: touched_digest(store.touched_keys()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::MarketLedger;
    use numo_ingress::testkit::TestTrader;
    use numo_types::{MarketConfig, Side, U256};

    fn receipt_blob() -> (crate::ledger::BatchReceipt, Vec<u8>) {
        let market = MarketConfig::dummy();
        let domain = market.domain_separator();
        let mut alice = TestTrader::new(1, domain);
        let mut bob = TestTrader::new(2, domain);
        let rules = market.rules.clone();
        let mut ledger = MarketLedger::with_balances(
            market,
            [alice.address(), bob.address()].into_iter().flat_map(|who| {
                [rules.base_asset_id, rules.quote_asset_id].map(|a| (who, a, U256::from(500u64)))
            }),
        )
        .unwrap();
        let request = ledger.next_request(
            9,
            vec![
                alice.sign_place(1, Side::Sell, 3, 2),
                bob.sign_place(2, Side::Buy, 3, 1),
                alice.sign_cancel(1),
            ],
        );
        let receipt = ledger.submit_batch(request).unwrap();
        let blob = receipt.witness_bytes();
        (receipt, blob)
    }

    #[test]
    fn replay_matches_host() {
        let (receipt, blob) = receipt_blob();
        let out = execute_guest(&blob).unwrap();
        assert_eq!(out.public_inputs, receipt.public_inputs);
        assert_eq!(out.public_inputs_bytes, receipt.public_inputs_bytes());
        assert_eq!(out.touched_digest, receipt.touched_digest);
    }

    #[test]
    fn asserted_header_fields_are_checked() {
        let (receipt, _) = receipt_blob();

        let mut input = receipt.witness.clone();
        input.partial.batch_digest[0] ^= 1;
        assert_eq!(execute_guest(&input.to_bytes()), Err(NumoError::BatchDigestMismatch));

        let mut input = receipt.witness.clone();
        input.partial.rules_hash[0] ^= 1;
        assert_eq!(execute_guest(&input.to_bytes()), Err(NumoError::RulesHashMismatch));

        let mut input = receipt.witness.clone();
        input.chain_id += 1;
        assert_eq!(execute_guest(&input.to_bytes()), Err(NumoError::DomainSeparatorMismatch));

        let mut input = receipt.witness;
        input.messages.pop();
        assert_eq!(execute_guest(&input.to_bytes()), Err(NumoError::BatchDigestMismatch));
    }

    #[test]
    fn proof_stream_must_be_exact() {
        let (receipt, _) = receipt_blob();

        let mut input = receipt.witness.clone();
        input.proofs.pop();
        assert_eq!(execute_guest(&input.to_bytes()), Err(NumoError::MissingProof));

        let mut input = receipt.witness.clone();
        let extra = input.proofs[0].clone();
        input.proofs.push(extra);
        assert_eq!(execute_guest(&input.to_bytes()), Err(NumoError::UnusedProofs(1)));

        let mut input = receipt.witness;
        input.partial.prev_root[0] ^= 1;
        assert_eq!(execute_guest(&input.to_bytes()), Err(NumoError::ProofRootMismatch));
    }

    #[test]
    fn trailing_byte_is_fatal() {
        let (_, mut blob) = receipt_blob();
        blob.push(0);
        assert_eq!(execute_guest(&blob), Err(NumoError::TrailingBytes { count: 1 }));
    }
}
