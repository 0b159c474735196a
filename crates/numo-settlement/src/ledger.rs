//! Host-side market ledger.
//!
//! Owns one market's full tree, its stored root and batch sequence. A batch
//! runs against a recording [`TreeStore`]; the recorded proofs become the
//! guest witness. Any batch-fatal error restores the tree exactly as it was.

use numo_commit::{SparseMerkleTree, State, StateAccess, TreeStore, touched_digest};
use numo_ingress::{GuestInput, seal};
use numo_types::{
    Address, AssetId, Balance, Encode, FeeTotal, Hash32, MarketConfig, NumoError,
    PublicInputs, PublicInputsPartial, Result, SignedMessage, TradeRecord, U256,
};

use crate::processor::{MessageOutcome, apply_batch};

/// A batch as submitted by the host, with its asserted preconditions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    pub batch_seq: u64,
    pub prev_root: Hash32,
    pub rules_hash: Hash32,
    pub batch_timestamp: u64,
    pub da_commitment: Hash32,
    pub messages: Vec<SignedMessage>,
}

/// Result of a committed batch.
#[derive(Debug, Clone)]
pub struct BatchReceipt {
    pub public_inputs: PublicInputs,
    pub touched_digest: Hash32,
    pub trades: Vec<TradeRecord>,
    pub fee_totals: Vec<FeeTotal>,
    pub outcomes: Vec<MessageOutcome>,
    /// Private input for the prover.
    pub witness: GuestInput,
}

impl BatchReceipt {
    #[must_use]
    pub fn public_inputs_bytes(&self) -> Vec<u8> {
        self.public_inputs.to_bytes()
    }

    #[must_use]
    pub fn witness_bytes(&self) -> Vec<u8> {
        self.witness.to_bytes()
    }
}

/// One market's authenticated state plus its anchor position.
#[derive(Debug, Clone)]
pub struct MarketLedger {
    market: MarketConfig,
    domain_separator: Hash32,
    rules_hash: Hash32,
    tree: SparseMerkleTree,
    batch_seq: u64,
}

impl MarketLedger {
    /// Empty market at sequence zero.
    pub fn new(market: MarketConfig) -> Result<Self> {
        Self::with_tree(market, SparseMerkleTree::new(), 0)
    }

    /// Resume from an existing tree and sequence.
    pub fn with_tree(market: MarketConfig, tree: SparseMerkleTree, batch_seq: u64) -> Result<Self> {
        market.rules.validate()?;
        Ok(Self {
            domain_separator: market.domain_separator(),
            rules_hash: market.rules_hash(),
            market,
            tree,
            batch_seq,
        })
    }

    /// Genesis market seeded with available balances.
    pub fn with_balances(
        market: MarketConfig,
        balances: impl IntoIterator<Item = (Address, AssetId, U256)>,
    ) -> Result<Self> {
        let mut store = TreeStore::default();
        let mut state = State::new(&mut store, market.market_id);
        for (account, asset, amount) in balances {
            let balance = Balance::new(amount, U256::zero());
            balance.check_cap(market.rules.max_balance)?;
            state.set_balance(&account, &asset, &balance)?;
        }
        Self::with_tree(market, store.into_tree(), 0)
    }

    #[must_use]
    pub fn market(&self) -> &MarketConfig {
        &self.market
    }

    #[must_use]
    pub fn domain_separator(&self) -> Hash32 {
        self.domain_separator
    }

    #[must_use]
    pub fn rules_hash(&self) -> Hash32 {
        self.rules_hash
    }

    #[must_use]
    pub fn root(&self) -> Hash32 {
        self.tree.root()
    }

    #[must_use]
    pub fn batch_seq(&self) -> u64 {
        self.batch_seq
    }

    #[must_use]
    pub fn tree(&self) -> &SparseMerkleTree {
        &self.tree
    }

    /// A throwaway store over a copy of the current tree, for inspection.
    #[must_use]
    pub fn snapshot(&self) -> TreeStore {
        TreeStore::new(self.tree.clone())
    }

    pub fn balance(&self, account: &Address, asset: &AssetId) -> Result<Balance> {
        let mut store = self.snapshot();
        State::new(&mut store, self.market.market_id).balance(account, asset)
    }

    pub fn nonce(&self, account: &Address) -> Result<u64> {
        let mut store = self.snapshot();
        State::new(&mut store, self.market.market_id).nonce(account)
    }

    /// Request for the next batch with the ledger's own preconditions.
    #[must_use]
    pub fn next_request(&self, batch_timestamp: u64, messages: Vec<SignedMessage>) -> BatchRequest {
        BatchRequest {
            batch_seq: self.batch_seq + 1,
            prev_root: self.root(),
            rules_hash: self.rules_hash,
            batch_timestamp,
            da_commitment: [0; 32],
            messages,
        }
    }

    fn check_preconditions(&self, request: &BatchRequest) -> Result<()> {
        let expected = self.batch_seq.checked_add(1).ok_or(NumoError::ArithmeticOverflow)?;
        if request.batch_seq != expected {
            return Err(NumoError::BatchSeqMismatch {
                expected,
                got: request.batch_seq,
            });
        }
        if request.prev_root != self.root() {
            return Err(NumoError::PrevRootMismatch);
        }
        if request.rules_hash != self.rules_hash {
            return Err(NumoError::RulesHashMismatch);
        }
        let max = self.market.rules.max_orders_per_batch;
        if request.messages.len() > max as usize {
            return Err(NumoError::TooManyMessages {
                count: request.messages.len(),
                max,
            });
        }
        Ok(())
    }

    /// Run one batch. On success the ledger advances to the new root and
    /// sequence; on any error it is left untouched.
    pub fn submit_batch(&mut self, request: BatchRequest) -> Result<BatchReceipt> {
        if let Err(err) = self.check_preconditions(&request) {
            tracing::warn!(batch_seq = request.batch_seq, code = err.code(), error = %err, "Batch rejected");
            return Err(err);
        }

        let sealed = seal(self.domain_separator, request.batch_seq, request.messages);
        let partial = PublicInputsPartial {
            prev_root: request.prev_root,
            batch_digest: sealed.digest,
            rules_hash: self.rules_hash,
            domain_separator: self.domain_separator,
            batch_seq: request.batch_seq,
            batch_timestamp: request.batch_timestamp,
            da_commitment: request.da_commitment,
        };

        let mut store = TreeStore::new(std::mem::take(&mut self.tree));
        let start = store.checkpoint();
        let output = match apply_batch(&mut store, &self.market, &sealed.messages) {
            Ok(output) => output,
            Err(err) => {
                let restored = store.rollback(start);
                self.tree = store.into_tree();
                restored?;
                tracing::warn!(batch_seq = request.batch_seq, code = err.code(), error = %err, "Batch rejected");
                return Err(err);
            }
        };

        let new_root = store.root();
        let trace = store.take_trace();
        self.tree = store.into_tree();
        self.batch_seq = request.batch_seq;

        let public_inputs =
            PublicInputs::from_partial(&partial, new_root, output.trades_root(), output.fees_root());
        tracing::info!(
            batch_seq = request.batch_seq,
            applied = output.applied(),
            skipped = output.skipped(),
            trades = output.trades.len(),
            new_root = %hex::encode(new_root),
            "Batch committed"
        );

        Ok(BatchReceipt {
            public_inputs,
            touched_digest: touched_digest(&trace.touched_keys),
            fee_totals: output.fee_totals(),
            trades: output.trades,
            outcomes: output.outcomes,
            witness: GuestInput {
                partial,
                chain_id: self.market.chain_id,
                venue_id: self.market.venue_id,
                market_id: self.market.market_id,
                rules: self.market.rules.clone(),
                messages: sealed.messages,
                proofs: trace.proofs,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use numo_ingress::testkit::TestTrader;
    use numo_types::Side;

    fn ledger_with(traders: &[Address]) -> MarketLedger {
        let market = MarketConfig::dummy();
        let rules = market.rules.clone();
        let balances = traders.iter().flat_map(|who| {
            [rules.base_asset_id, rules.quote_asset_id]
                .map(|asset| (*who, asset, U256::from(1_000u64)))
        });
        MarketLedger::with_balances(market, balances).unwrap()
    }

    #[test]
    fn preconditions_reject_without_change() {
        let mut ledger = ledger_with(&[]);
        let root = ledger.root();

        let mut bad_seq = ledger.next_request(0, Vec::new());
        bad_seq.batch_seq = 2;
        assert_eq!(
            ledger.submit_batch(bad_seq).unwrap_err(),
            NumoError::BatchSeqMismatch { expected: 1, got: 2 }
        );

        let mut bad_root = ledger.next_request(0, Vec::new());
        bad_root.prev_root = [1; 32];
        assert_eq!(ledger.submit_batch(bad_root).unwrap_err(), NumoError::PrevRootMismatch);

        let mut bad_rules = ledger.next_request(0, Vec::new());
        bad_rules.rules_hash = [1; 32];
        assert_eq!(ledger.submit_batch(bad_rules).unwrap_err(), NumoError::RulesHashMismatch);

        assert_eq!((ledger.root(), ledger.batch_seq()), (root, 0));
    }

    #[test]
    fn oversized_batch_is_rejected() {
        let mut market = MarketConfig::dummy();
        market.rules.max_orders_per_batch = 1;
        let mut ledger = MarketLedger::new(market).unwrap();
        let mut t = TestTrader::new(1, ledger.domain_separator());
        let request = ledger.next_request(0, vec![t.sign_cancel(1), t.sign_cancel(2)]);
        assert_eq!(
            ledger.submit_batch(request).unwrap_err(),
            NumoError::TooManyMessages { count: 2, max: 1 }
        );
    }

    #[test]
    fn empty_batch_advances_sequence_only() {
        let mut ledger = ledger_with(&[]);
        let root = ledger.root();
        let receipt = ledger.submit_batch(ledger.next_request(5, Vec::new())).unwrap();
        assert_eq!(receipt.public_inputs.prev_root, root);
        assert_eq!(receipt.public_inputs.new_root, root);
        assert_eq!(receipt.public_inputs.trades_root, [0; 32]);
        assert_eq!(receipt.public_inputs.fees_root, [0; 32]);
        assert_eq!(receipt.public_inputs.batch_timestamp, 5);
        assert_eq!(ledger.batch_seq(), 1);
        assert_eq!(receipt.public_inputs_bytes().len(), numo_types::PUBLIC_INPUTS_LEN);
    }

    #[test]
    fn committed_batch_updates_root_and_receipt() {
        let domain = MarketConfig::dummy().domain_separator();
        let mut alice = TestTrader::new(1, domain);
        let mut bob = TestTrader::new(2, domain);
        let mut ledger = ledger_with(&[alice.address(), bob.address()]);
        let request = ledger.next_request(
            0,
            vec![
                alice.sign_place(1, Side::Sell, 10, 4),
                bob.sign_place(2, Side::Buy, 10, 4),
            ],
        );
        let receipt = ledger.submit_batch(request).unwrap();
        assert_eq!(receipt.public_inputs.new_root, ledger.root());
        assert_eq!(receipt.trades.len(), 1);
        assert_eq!(receipt.fee_totals.len(), 1);
        assert_eq!(receipt.witness.messages.len(), 2);
        assert!(!receipt.witness.proofs.is_empty());
        assert_eq!(ledger.nonce(&alice.address()).unwrap(), 1);
        let bob_base = ledger.balance(&bob.address(), &ledger.market().rules.base_asset_id).unwrap();
        assert_eq!(bob_base.available, U256::from(1_004u64));
    }
}
