//! Replay gate.
//!
//! The stored nonce is the next one an account may use; an absent entry
//! means zero. A message passes only with exactly that nonce, and passing
//! advances it by one. Nothing is written on rejection.

use numo_commit::{State, StateAccess};
use numo_types::{Address, NumoError, Result};

/// Check `nonce` against `trader`'s stored nonce and advance it.
pub fn consume_nonce<S: StateAccess>(
    state: &mut State<'_, S>,
    trader: &Address,
    nonce: u64,
) -> Result<()> {
    let expected = state.nonce(trader)?;
    if nonce != expected {
        return Err(NumoError::NonceMismatch {
            expected,
            got: nonce,
        });
    }
    let next = expected.checked_add(1).ok_or(NumoError::ArithmeticOverflow)?;
    state.set_nonce(trader, next)
}
