//! # numo-matchcore
//!
//! **Deterministic price-time matching engine for Numo.**
//!
//! Matching runs directly against the authenticated store: the book is not
//! an in-memory structure but a set of linked entities (orders, FIFO nodes,
//! tick nodes, best pointers) read and written through a
//! [`numo_commit::State`] handle. That makes every step of a match
//! provable by replay.
//!
//! - **Price-time priority**: best tick first, FIFO within a tick
//! - **Maker price**: every fill executes at the resting order's tick
//! - **Explicit rounding**: quote amounts round down, fees and locks round up
//! - **Checked arithmetic**: overflow and `maxBalance` breaches are errors
//! - **Verified hints**: tick insertion never trusts host adjacency data

pub mod determinism;
pub mod engine;
pub mod fills;
pub mod ladder;
pub mod queue;

pub use determinism::{FeeLedger, fees_root, trades_root};
pub use engine::{Execution, apply_cancel, apply_place};
pub use fills::{Fill, compute_fill, lock_amount};
