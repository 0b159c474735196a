//! # numo-settlement
//!
//! **Batch plane**: turns a sealed batch into a new authenticated root.
//!
//! ## Pipeline
//!
//! 1. [`MarketLedger::submit_batch`] checks `batchSeq`, `prevRoot`,
//!    `rulesHash` and the batch size; any failure rejects the whole batch.
//! 2. [`apply_batch`] runs each message: signature, nonce gate, then
//!    static checks and matching inside a checkpoint. A message-level error
//!    rolls the message back to just after its nonce advance and skips it.
//! 3. The ledger records every store access as a proof and emits a
//!    [`BatchReceipt`] with the public inputs and the guest witness.
//! 4. [`execute_guest`] replays the witness against proofs alone and must
//!    reproduce the same public inputs.
//! 5. [`RootAnchor`] models the on-chain verifier that accepts the chain
//!    of roots.
//!
//! A batch either fully commits or leaves the stored root and sequence
//! untouched.

pub mod anchor;
pub mod guest;
pub mod ledger;
pub mod processor;

pub use anchor::{AnchoredMarket, ProofVerifier, ReexecutionVerifier, RootAnchor};
pub use guest::{GuestOutput, execute_guest};
pub use ledger::{BatchReceipt, BatchRequest, MarketLedger};
pub use processor::{BatchOutput, MessageOutcome, apply_batch};
