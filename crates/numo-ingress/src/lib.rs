//! # numo-ingress
//!
//! **Admission plane for Numo batches.**
//!
//! Everything that happens to a message before it reaches the matching
//! engine, plus the framing that carries a batch into the guest:
//!
//! - [`signing`]: secp256k1 signer recovery over the domain-bound hash
//! - [`nonce`]: the per-account replay gate
//! - [`validate`]: static checks of place/cancel fields against the rules
//! - [`sealer`]: batch digest over the ordered message hashes
//! - [`guest_input`]: the byte-exact guest input blob
//!
//! With the `test-helpers` feature, [`testkit`] provides deterministic
//! signing traders.

pub mod guest_input;
pub mod nonce;
pub mod sealer;
pub mod signing;
#[cfg(any(test, feature = "test-helpers"))]
pub mod testkit;
pub mod validate;

pub use guest_input::GuestInput;
pub use nonce::consume_nonce;
pub use sealer::{SealedBatch, batch_digest, seal};
pub use signing::{address_of, recover_signer, verify_message};
pub use validate::check_static;
