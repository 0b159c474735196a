//! Static message checks.
//!
//! Field-level checks that need only the rules, run after the nonce gate
//! and before any book access: reserved order ids, lot alignment and tick
//! validity for a place; reserved ids for a cancel. Side and time in force
//! are already enforced by decoding.

use numo_types::{Message, NumoError, Result, Rules};

pub fn check_static(rules: &Rules, message: &Message) -> Result<()> {
    if message.order_id().is_none() {
        return Err(NumoError::ReservedOrderId);
    }
    if let Message::Place(place) = message {
        rules.check_qty(place.qty)?;
        rules.price_of(place.tick)?;
    }
    Ok(())
}
