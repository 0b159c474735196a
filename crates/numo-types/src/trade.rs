//! Trade and fee records emitted by a batch.
//!
//! One [`TradeRecord`] per fill, in execution order. [`FeeTotal`]s are the
//! per-asset fee sums of the batch, sorted by asset id.

use serde::{Deserialize, Serialize};

use crate::hash::keccak256;
use crate::ids::{Address, AssetId, Hash32, OrderId, serde_hex};
use crate::order::Side;
use crate::u256::{U256, serde_u256};
use crate::wire::{ByteWriter, Encode};

/// A single fill between a resting maker and an incoming taker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRecord {
    #[serde(with = "serde_hex")]
    pub market_id: Hash32,
    pub maker_order_id: OrderId,
    pub taker_order_id: OrderId,
    pub maker: Address,
    pub taker: Address,
    pub taker_side: Side,
    /// Execution tick (always the maker's).
    pub maker_tick: i32,
    #[serde(with = "serde_u256")]
    pub qty: U256,
    #[serde(with = "serde_u256")]
    pub quote_amount: U256,
    /// Taker fee in quote units.
    #[serde(with = "serde_u256")]
    pub fee: U256,
}

impl TradeRecord {
    /// Accumulator leaf: `H(encode(record))`.
    #[must_use]
    pub fn leaf_hash(&self) -> Hash32 {
        keccak256(&self.to_bytes())
    }
}

impl Encode for TradeRecord {
    fn encode_to(&self, w: &mut ByteWriter) {
        w.put_bytes(&self.market_id);
        w.put_bytes(self.maker_order_id.as_bytes());
        w.put_bytes(self.taker_order_id.as_bytes());
        w.put_bytes(self.maker.as_bytes());
        w.put_bytes(self.taker.as_bytes());
        w.put_u8(self.taker_side.as_u8());
        w.put_i32(self.maker_tick);
        w.put_u256(self.qty);
        w.put_u256(self.quote_amount);
        w.put_u256(self.fee);
    }
}

/// Fees collected in one asset over a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeTotal {
    pub asset: AssetId,
    #[serde(with = "serde_u256")]
    pub total: U256,
}

impl FeeTotal {
    /// Accumulator leaf: `H(asset || total)`.
    #[must_use]
    pub fn leaf_hash(&self) -> Hash32 {
        keccak256(&self.to_bytes())
    }
}

impl Encode for FeeTotal {
    fn encode_to(&self, w: &mut ByteWriter) {
        w.put_bytes(self.asset.as_bytes());
        w.put_u256(self.total);
    }
}
