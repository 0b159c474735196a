//! System-wide constants for the Numo state-transition engine.
//!
//! Anything in here is consensus-critical: changing a value changes every
//! root, digest, and key the engine produces.

use crate::U256;

/// Depth of the authenticated key-value tree (one level per key bit).
pub const TREE_DEPTH: usize = 256;

/// Separator byte between a namespace label and its key material.
pub const KEY_SEPARATOR: u8 = 0x1f;

pub const NS_BAL: [u8; 32] = *b"NS_BAL__________________________";
pub const NS_NONCE: [u8; 32] = *b"NS_NONCE________________________";
pub const NS_ORDER: [u8; 32] = *b"NS_ORDER________________________";
pub const NS_ORDERNODE: [u8; 32] = *b"NS_ORDERNODE____________________";
pub const NS_TICKNODE: [u8; 32] = *b"NS_TICKNODE_____________________";
pub const NS_MARKETBEST: [u8; 32] = *b"NS_MARKETBEST___________________";
pub const NS_FEEVAULT: [u8; 32] = *b"NS_FEEVAULT_____________________";

/// Tag hashed into every domain separator.
pub const DOMAIN_TAG: &[u8] = b"NUMO_SPOT_CLOB_V1";

/// Tag hashed into every batch digest.
pub const BATCH_TAG: &[u8] = b"BATCH_V1";

/// Two-byte prefix of the signed message hash (`0x19 0x01`).
pub const SIGNING_PREFIX: [u8; 2] = [0x19, 0x01];

/// Leaf-hash domain byte.
pub const LEAF_PREFIX: u8 = 0x00;

/// Internal-node domain byte (tree and accumulators).
pub const NODE_PREFIX: u8 = 0x01;

/// Wire tag of a `Place` message.
pub const MSG_TAG_PLACE: u8 = 0x01;

/// Wire tag of a `Cancel` message.
pub const MSG_TAG_CANCEL: u8 = 0x02;

/// Length of a recoverable secp256k1 signature `r || s || v`.
pub const SIGNATURE_LEN: usize = 65;

/// The only accepted `priceScale` (10^18).
pub const PRICE_SCALE: U256 = U256([1_000_000_000_000_000_000, 0, 0, 0]);

/// Basis-point denominator for fee rates.
pub const FEE_BPS_DENOMINATOR: u64 = 10_000;

/// On-wire sentinel for "no tick" in hints, ladder links, and best pointers.
pub const NONE_TICK: i32 = i32::MIN;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "Numo";
