//! Market rules and domain configuration.
//!
//! A market is identified by `(chain_id, venue_id, market_id)`; the hash of
//! those ids is the [`domain_separator`] that partitions the state store
//! and domains every signature. The [`Rules`] are immutable per market and
//! are committed to by [`Rules::hash`].

use serde::{Deserialize, Serialize};

use crate::constants::{DOMAIN_TAG, FEE_BPS_DENOMINATOR, PRICE_SCALE};
use crate::error::{NumoError, Result};
use crate::hash::{keccak256, keccak256_concat};
use crate::ids::{AssetId, Hash32, serde_hex};
use crate::u256::{U256, mul_checked, rem_checked, serde_u256};
use crate::wire::{ByteReader, ByteWriter, Decode, Encode};

/// `H("NUMO_SPOT_CLOB_V1" || chainId || venueId || marketId)`.
#[must_use]
pub fn domain_separator(chain_id: u64, venue_id: &Hash32, market_id: &Hash32) -> Hash32 {
    keccak256_concat(&[DOMAIN_TAG, &chain_id.to_be_bytes(), venue_id, market_id])
}

/// Per-market trading rules, validated once per batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rules {
    pub base_asset_id: AssetId,
    pub quote_asset_id: AssetId,
    /// Fixed-point scale of prices. Must be 10^18.
    #[serde(with = "serde_u256")]
    pub price_scale: U256,
    /// Price per tick index.
    #[serde(with = "serde_u256")]
    pub tick_size: U256,
    /// Base quantity granularity.
    #[serde(with = "serde_u256")]
    pub lot_size: U256,
    pub taker_fee_bps: u32,
    /// Must be zero: maker rebates are not supported.
    pub maker_fee_bps: u32,
    pub max_orders_per_batch: u32,
    pub max_matches_per_order: u32,
    /// Hard cap on `available + locked` for any balance.
    #[serde(with = "serde_u256")]
    pub max_balance: U256,
}

impl Rules {
    /// Keccak-256 of the fixed-order encoding.
    #[must_use]
    pub fn hash(&self) -> Hash32 {
        keccak256(&self.to_bytes())
    }

    /// Structural checks; any failure is batch-fatal.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| {
            Err(NumoError::InvalidRules {
                reason: reason.to_string(),
            })
        };
        if self.price_scale != PRICE_SCALE {
            return invalid("price scale must be 1e18");
        }
        if self.maker_fee_bps != 0 {
            return invalid("maker fee must be zero");
        }
        if u64::from(self.taker_fee_bps) > FEE_BPS_DENOMINATOR {
            return invalid("taker fee exceeds 10000 bps");
        }
        if self.tick_size.is_zero() {
            return invalid("tick size is zero");
        }
        if self.lot_size.is_zero() {
            return invalid("lot size is zero");
        }
        if self.max_orders_per_batch == 0 {
            return invalid("max orders per batch is zero");
        }
        if self.max_matches_per_order == 0 {
            return invalid("max matches per order is zero");
        }
        if self.base_asset_id == self.quote_asset_id {
            return invalid("base and quote assets are identical");
        }
        Ok(())
    }

    /// `tick * tickSize`; negative ticks have no price.
    pub fn price_of(&self, tick: i32) -> Result<U256> {
        let idx = u64::try_from(tick).map_err(|_| NumoError::TickMisaligned(tick))?;
        mul_checked(U256::from(idx), self.tick_size)
    }

    /// Quantity must be non-zero and a whole number of lots.
    pub fn check_qty(&self, qty: U256) -> Result<()> {
        if qty.is_zero() {
            return Err(NumoError::ZeroQuantity);
        }
        if !rem_checked(qty, self.lot_size)?.is_zero() {
            return Err(NumoError::LotMisaligned(qty));
        }
        Ok(())
    }

    /// Taker fee rate as a `U256` numerator over 10 000.
    #[must_use]
    pub fn taker_fee(&self) -> U256 {
        U256::from(self.taker_fee_bps)
    }
}

impl Encode for Rules {
    fn encode_to(&self, w: &mut ByteWriter) {
        w.put_bytes(self.base_asset_id.as_bytes());
        w.put_bytes(self.quote_asset_id.as_bytes());
        w.put_u256(self.price_scale);
        w.put_u256(self.tick_size);
        w.put_u256(self.lot_size);
        w.put_u32(self.taker_fee_bps);
        w.put_u32(self.maker_fee_bps);
        w.put_u32(self.max_orders_per_batch);
        w.put_u32(self.max_matches_per_order);
        w.put_u256(self.max_balance);
    }
}

impl Decode for Rules {
    fn decode_from(r: &mut ByteReader<'_>) -> Result<Self> {
        Ok(Self {
            base_asset_id: AssetId(r.array()?),
            quote_asset_id: AssetId(r.array()?),
            price_scale: r.u256()?,
            tick_size: r.u256()?,
            lot_size: r.u256()?,
            taker_fee_bps: r.u32()?,
            maker_fee_bps: r.u32()?,
            max_orders_per_batch: r.u32()?,
            max_matches_per_order: r.u32()?,
            max_balance: r.u256()?,
        })
    }
}

/// Everything a host needs to address one market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketConfig {
    pub chain_id: u64,
    #[serde(with = "serde_hex")]
    pub venue_id: Hash32,
    #[serde(with = "serde_hex")]
    pub market_id: Hash32,
    pub rules: Rules,
}

impl MarketConfig {
    #[must_use]
    pub fn domain_separator(&self) -> Hash32 {
        domain_separator(self.chain_id, &self.venue_id, &self.market_id)
    }

    #[must_use]
    pub fn rules_hash(&self) -> Hash32 {
        self.rules.hash()
    }

    /// Parse from JSON and validate the rules.
    pub fn from_json(json: &str) -> Result<Self> {
        let cfg: Self =
            serde_json::from_str(json).map_err(|e| NumoError::Serialization(e.to_string()))?;
        cfg.rules.validate()?;
        Ok(cfg)
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl Rules {
    /// A permissive rule set: 1e18 tick, unit lots, 30 bps taker fee.
    #[must_use]
    pub fn dummy() -> Self {
        Self {
            base_asset_id: AssetId([0xba; 32]),
            quote_asset_id: AssetId([0x9e; 32]),
            price_scale: PRICE_SCALE,
            tick_size: PRICE_SCALE,
            lot_size: U256::one(),
            taker_fee_bps: 30,
            maker_fee_bps: 0,
            max_orders_per_batch: 64,
            max_matches_per_order: 16,
            max_balance: U256::from(u128::MAX),
        }
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl MarketConfig {
    #[must_use]
    pub fn dummy() -> Self {
        Self {
            chain_id: 1,
            venue_id: [0x01; 32],
            market_id: [0x02; 32],
            rules: Rules::dummy(),
        }
    }
}
