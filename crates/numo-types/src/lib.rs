//! # numo-types
//!
//! Shared types, errors, and wire codecs for the **Numo** spot CLOB
//! state-transition engine.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`Address`], [`OrderId`], [`AssetId`], [`Hash32`]
//! - **Arithmetic**: [`U256`] with explicit-rounding [`mul_div_up`] / [`mul_div_down`]
//! - **Configuration**: [`Rules`], [`MarketConfig`], [`domain_separator`]
//! - **Stored entities**: [`Balance`], [`FeeVault`], [`Order`], [`OrderNode`], [`TickNode`]
//! - **Messages**: [`Message`], [`PlaceOrder`], [`CancelOrder`], [`SignedMessage`]
//! - **Outputs**: [`TradeRecord`], [`FeeTotal`], [`PublicInputs`]
//! - **Wire format**: [`ByteReader`], [`ByteWriter`], [`Encode`], [`Decode`]
//! - **Errors**: [`NumoError`] with `NUMO_ERR_` prefix codes and a [`Severity`]
//!
//! Every byte layout in this crate is big-endian and fixed-width: the same
//! bytes must be produced by the host, the guest, and the on-chain encoder.

pub mod balance;
pub mod config;
pub mod constants;
pub mod error;
pub mod hash;
pub mod ids;
pub mod message;
pub mod order;
pub mod public_inputs;
pub mod trade;
pub mod u256;
pub mod wire;

// Re-export all primary types at crate root for ergonomic imports:
//   use numo_types::{Order, Side, TradeRecord, NumoError, ...};

pub use balance::*;
pub use config::*;
pub use error::*;
pub use hash::*;
pub use ids::*;
pub use message::*;
pub use order::*;
pub use public_inputs::*;
pub use trade::*;
pub use u256::*;
pub use wire::*;

// Constants are accessed via `numo_types::constants::FOO`
// (not re-exported to avoid name collisions).
