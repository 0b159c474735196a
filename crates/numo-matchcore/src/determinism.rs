//! Batch output commitments.
//!
//! Every replay of the same batch must yield the same `tradesRoot` and
//! `feesRoot`. Trades are committed in execution order; fee totals in
//! ascending asset-id order.

use std::collections::BTreeMap;

use numo_commit::merkle_root;
use numo_types::{AssetId, FeeTotal, Hash32, Result, TradeRecord, U256, add_checked};

/// Accumulator root over trade leaves in execution order.
#[must_use]
pub fn trades_root(trades: &[TradeRecord]) -> Hash32 {
    let leaves: Vec<Hash32> = trades.iter().map(TradeRecord::leaf_hash).collect();
    merkle_root(&leaves)
}

/// Accumulator root over fee totals. The slice must already be sorted by
/// asset id, as [`FeeLedger::totals`] returns it.
#[must_use]
pub fn fees_root(totals: &[FeeTotal]) -> Hash32 {
    let leaves: Vec<Hash32> = totals.iter().map(FeeTotal::leaf_hash).collect();
    merkle_root(&leaves)
}

/// Per-asset fee sums collected across one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeeLedger {
    totals: BTreeMap<AssetId, U256>,
}

impl FeeLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one fill's fee. Zero fees still register the asset.
    pub fn add(&mut self, asset: AssetId, fee: U256) -> Result<()> {
        let entry = self.totals.entry(asset).or_default();
        *entry = add_checked(*entry, fee)?;
        Ok(())
    }

    /// Add the fees of every trade, all charged in `quote`.
    pub fn add_trades(&mut self, quote: AssetId, trades: &[TradeRecord]) -> Result<()> {
        trades.iter().try_for_each(|t| self.add(quote, t.fee))
    }

    /// Totals sorted by asset id.
    #[must_use]
    pub fn totals(&self) -> Vec<FeeTotal> {
        self.totals
            .iter()
            .map(|(asset, total)| FeeTotal {
                asset: *asset,
                total: *total,
            })
            .collect()
    }

    #[must_use]
    pub fn root(&self) -> Hash32 {
        fees_root(&self.totals())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }
}
