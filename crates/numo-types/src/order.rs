//! Order and book-structure entities.
//!
//! The book is an arena of independently stored nodes linked by id:
//! - [`Order`]: a resting limit order and its locked collateral
//! - [`OrderNode`]: FIFO links between orders at the same tick
//! - [`TickNode`]: ladder links between active ticks of one side, plus the
//!   head/tail of that tick's FIFO queue
//! - [`MarketBest`]: the best active tick of one side
//!
//! In memory, "no neighbour" is `None`; on the wire it is the zero order id
//! or [`NONE_TICK`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::NONE_TICK;
use crate::error::{NumoError, Result};
use crate::ids::{Address, OrderId};
use crate::u256::{U256, serde_u256};
use crate::wire::{ByteReader, ByteWriter, Decode, Encode, StoredValue};

/// Buy or sell side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }

    #[must_use]
    pub fn as_u8(self) -> u8 {
        match self {
            Self::Buy => 0,
            Self::Sell => 1,
        }
    }

    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::Buy),
            1 => Ok(Self::Sell),
            _ => Err(NumoError::InvalidEnum {
                field: "side",
                value: u32::from(value),
            }),
        }
    }

    /// Whether tick `a` has better priority than `b` on this side
    /// (bids: higher first, asks: lower first).
    #[must_use]
    pub fn is_better(self, a: i32, b: i32) -> bool {
        match self {
            Self::Buy => a > b,
            Self::Sell => a < b,
        }
    }

    /// Whether a taker on this side at `limit` may trade at maker tick
    /// `maker_tick`.
    #[must_use]
    pub fn crosses(self, limit: i32, maker_tick: i32) -> bool {
        match self {
            Self::Buy => maker_tick <= limit,
            Self::Sell => maker_tick >= limit,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// Time-in-force policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimeInForce {
    /// Good-till-cancel: any remainder rests on the book.
    Gtc,
    /// Immediate-or-cancel: any remainder is released.
    Ioc,
}

impl TimeInForce {
    #[must_use]
    pub fn as_u32(self) -> u32 {
        match self {
            Self::Gtc => 0,
            Self::Ioc => 1,
        }
    }

    pub fn from_u32(value: u32) -> Result<Self> {
        match value {
            0 => Ok(Self::Gtc),
            1 => Ok(Self::Ioc),
            _ => Err(NumoError::InvalidEnum { field: "tif", value }),
        }
    }
}

/// A resting limit order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub trader: Address,
    pub side: Side,
    pub tif: TimeInForce,
    pub tick: i32,
    /// Base quantity still open.
    #[serde(with = "serde_u256")]
    pub remaining: U256,
    /// Collateral still held for this order (quote for bids, base for asks).
    #[serde(with = "serde_u256")]
    pub locked: U256,
}

impl Order {
    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.remaining.is_zero()
    }
}

impl Encode for Order {
    fn encode_to(&self, w: &mut ByteWriter) {
        w.put_bytes(self.trader.as_bytes());
        w.put_u8(self.side.as_u8());
        w.put_u8(u8::from(self.tif == TimeInForce::Ioc));
        w.put_i32(self.tick);
        w.put_u256(self.remaining);
        w.put_u256(self.locked);
    }
}

impl Decode for Order {
    fn decode_from(r: &mut ByteReader<'_>) -> Result<Self> {
        Ok(Self {
            trader: Address(r.array()?),
            side: Side::from_u8(r.u8()?)?,
            tif: TimeInForce::from_u32(u32::from(r.u8()?))?,
            tick: r.i32()?,
            remaining: r.u256()?,
            locked: r.u256()?,
        })
    }
}

impl StoredValue for Order {
    const ENTITY: &'static str = "order";
    const LEN: usize = 20 + 1 + 1 + 4 + 32 + 32;
}

/// FIFO links of one order within its tick queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderNode {
    pub prev: Option<OrderId>,
    pub next: Option<OrderId>,
}

impl Encode for OrderNode {
    fn encode_to(&self, w: &mut ByteWriter) {
        w.put_bytes(OrderId::from_option(self.prev).as_bytes());
        w.put_bytes(OrderId::from_option(self.next).as_bytes());
    }
}

impl Decode for OrderNode {
    fn decode_from(r: &mut ByteReader<'_>) -> Result<Self> {
        Ok(Self {
            prev: OrderId(r.array()?).to_option(),
            next: OrderId(r.array()?).to_option(),
        })
    }
}

impl StoredValue for OrderNode {
    const ENTITY: &'static str = "order node";
    const LEN: usize = 64;
}

fn tick_to_wire(tick: Option<i32>) -> i32 {
    tick.unwrap_or(NONE_TICK)
}

fn tick_from_wire(tick: i32) -> Option<i32> {
    (tick != NONE_TICK).then_some(tick)
}

/// An active tick: ladder links plus its FIFO head and tail.
///
/// A `TickNode` exists only while its queue is non-empty, so head and tail
/// are always real orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickNode {
    /// Neighbour with better priority (towards the best tick).
    pub prev: Option<i32>,
    /// Neighbour with worse priority.
    pub next: Option<i32>,
    pub head: OrderId,
    pub tail: OrderId,
}

impl Encode for TickNode {
    fn encode_to(&self, w: &mut ByteWriter) {
        w.put_i32(tick_to_wire(self.prev));
        w.put_i32(tick_to_wire(self.next));
        w.put_bytes(self.head.as_bytes());
        w.put_bytes(self.tail.as_bytes());
    }
}

impl Decode for TickNode {
    fn decode_from(r: &mut ByteReader<'_>) -> Result<Self> {
        Ok(Self {
            prev: tick_from_wire(r.i32()?),
            next: tick_from_wire(r.i32()?),
            head: OrderId(r.array()?),
            tail: OrderId(r.array()?),
        })
    }
}

impl StoredValue for TickNode {
    const ENTITY: &'static str = "tick node";
    const LEN: usize = 72;
}

/// Best active tick of one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketBest(pub i32);

impl Encode for MarketBest {
    fn encode_to(&self, w: &mut ByteWriter) {
        w.put_i32(self.0);
    }
}

impl Decode for MarketBest {
    fn decode_from(r: &mut ByteReader<'_>) -> Result<Self> {
        Ok(Self(r.i32()?))
    }
}

impl StoredValue for MarketBest {
    const ENTITY: &'static str = "market best";
    const LEN: usize = 4;
}

/// Host-supplied neighbours for inserting a new tick. Never trusted
/// without an adjacency check against the ladder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickHints {
    pub prev: Option<i32>,
    pub next: Option<i32>,
}

impl TickHints {
    #[must_use]
    pub fn new(prev: Option<i32>, next: Option<i32>) -> Self {
        Self { prev, next }
    }
}

impl Encode for TickHints {
    fn encode_to(&self, w: &mut ByteWriter) {
        w.put_i32(tick_to_wire(self.prev));
        w.put_i32(tick_to_wire(self.next));
    }
}

impl Decode for TickHints {
    fn decode_from(r: &mut ByteReader<'_>) -> Result<Self> {
        Ok(Self {
            prev: tick_from_wire(r.i32()?),
            next: tick_from_wire(r.i32()?),
        })
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Order {
    #[must_use]
    pub fn dummy(side: Side, tick: i32, qty: U256) -> Self {
        Self {
            trader: Address([0xaa; 20]),
            side,
            tif: TimeInForce::Gtc,
            tick,
            remaining: qty,
            locked: qty,
        }
    }
}
