//! FIFO queue of orders resting at one tick.
//!
//! Each queue is a doubly linked list of [`OrderNode`]s whose head and
//! tail live in the tick's [`TickNode`]. Appending to an inactive tick
//! activates it; removing the last order deactivates it.

use numo_commit::{State, StateAccess};
use numo_types::{NumoError, OrderId, OrderNode, Result, Side, TickHints};

use crate::ladder;

fn broken(what: impl Into<String>) -> NumoError {
    NumoError::InvariantViolation(what.into())
}

/// Append `order_id` at the tail of `tick`'s queue. `hints` are only
/// consulted (and verified) when the tick is not yet active.
pub fn push_back<S: StateAccess>(
    state: &mut State<'_, S>,
    side: Side,
    tick: i32,
    order_id: OrderId,
    hints: TickHints,
) -> Result<()> {
    let Some(mut tick_node) = state.tick_node(side, tick)? else {
        ladder::activate(state, side, tick, hints, order_id)?;
        return state.set_order_node(&order_id, Some(&OrderNode::default()));
    };

    let tail = tick_node.tail;
    let mut tail_node = state
        .order_node(&tail)?
        .ok_or_else(|| broken(format!("tail {tail} has no queue node")))?;
    tail_node.next = Some(order_id);
    state.set_order_node(&tail, Some(&tail_node))?;
    state.set_order_node(
        &order_id,
        Some(&OrderNode {
            prev: Some(tail),
            next: None,
        }),
    )?;
    tick_node.tail = order_id;
    state.set_tick_node(side, tick, Some(&tick_node))
}

/// Unlink `order_id` from `tick`'s queue and delete its node.
pub fn remove<S: StateAccess>(
    state: &mut State<'_, S>,
    side: Side,
    tick: i32,
    order_id: OrderId,
) -> Result<()> {
    let node = state
        .order_node(&order_id)?
        .ok_or_else(|| broken(format!("{order_id} has no queue node")))?;
    let mut tick_node = state
        .tick_node(side, tick)?
        .ok_or_else(|| broken(format!("{side} tick {tick} not active")))?;

    match node.prev {
        Some(prev) => {
            let mut prev_node = state
                .order_node(&prev)?
                .ok_or_else(|| broken(format!("{prev} has no queue node")))?;
            prev_node.next = node.next;
            state.set_order_node(&prev, Some(&prev_node))?;
        }
        None if tick_node.head != order_id => {
            return Err(broken(format!("{order_id} has no prev but is not head")));
        }
        None => {}
    }
    match node.next {
        Some(next) => {
            let mut next_node = state
                .order_node(&next)?
                .ok_or_else(|| broken(format!("{next} has no queue node")))?;
            next_node.prev = node.prev;
            state.set_order_node(&next, Some(&next_node))?;
        }
        None if tick_node.tail != order_id => {
            return Err(broken(format!("{order_id} has no next but is not tail")));
        }
        None => {}
    }
    state.set_order_node(&order_id, None)?;

    match (node.prev, node.next) {
        (None, None) => ladder::deactivate(state, side, tick, &tick_node),
        (prev, next) => {
            if prev.is_none() {
                tick_node.head = next.unwrap_or(OrderId::NONE);
            }
            if next.is_none() {
                tick_node.tail = prev.unwrap_or(OrderId::NONE);
            }
            state.set_tick_node(side, tick, Some(&tick_node))
        }
    }
}

/// Order ids at `tick`, head first.
pub fn walk<S: StateAccess>(
    state: &mut State<'_, S>,
    side: Side,
    tick: i32,
) -> Result<Vec<OrderId>> {
    let Some(tick_node) = state.tick_node(side, tick)? else {
        return Ok(Vec::new());
    };
    let mut ids = Vec::new();
    let mut cursor = Some(tick_node.head);
    while let Some(id) = cursor {
        let node = state
            .order_node(&id)?
            .ok_or_else(|| broken(format!("{id} has no queue node")))?;
        ids.push(id);
        cursor = node.next;
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use numo_commit::TreeStore;

    const M: [u8; 32] = [3; 32];

    fn id(n: u64) -> OrderId {
        OrderId::from_u64(n)
    }

    #[test]
    fn appends_in_arrival_order() {
        let mut store = TreeStore::default();
        let mut state = State::new(&mut store, M);
        for n in 1..=3 {
            push_back(&mut state, Side::Buy, 7, id(n), TickHints::default()).unwrap();
        }
        assert_eq!(walk(&mut state, Side::Buy, 7).unwrap(), vec![id(1), id(2), id(3)]);
        assert_eq!(state.best(Side::Buy).unwrap(), Some(7));
    }

    #[test]
    fn remove_middle_head_and_tail() {
        let mut store = TreeStore::default();
        let mut state = State::new(&mut store, M);
        for n in 1..=4 {
            push_back(&mut state, Side::Sell, 5, id(n), TickHints::default()).unwrap();
        }
        remove(&mut state, Side::Sell, 5, id(2)).unwrap();
        assert_eq!(walk(&mut state, Side::Sell, 5).unwrap(), vec![id(1), id(3), id(4)]);
        remove(&mut state, Side::Sell, 5, id(1)).unwrap();
        remove(&mut state, Side::Sell, 5, id(4)).unwrap();
        assert_eq!(walk(&mut state, Side::Sell, 5).unwrap(), vec![id(3)]);
        let node = state.tick_node(Side::Sell, 5).unwrap().unwrap();
        assert_eq!((node.head, node.tail), (id(3), id(3)));
        assert_eq!(state.order_node(&id(2)).unwrap(), None);
    }

    #[test]
    fn removing_last_order_deactivates_tick() {
        let mut store = TreeStore::default();
        let empty = store.root();
        let mut state = State::new(&mut store, M);
        push_back(&mut state, Side::Sell, 5, id(1), TickHints::default()).unwrap();
        push_back(&mut state, Side::Sell, 6, id(2), TickHints::new(Some(5), None)).unwrap();
        remove(&mut state, Side::Sell, 5, id(1)).unwrap();
        assert_eq!(state.tick_node(Side::Sell, 5).unwrap(), None);
        assert_eq!(state.best(Side::Sell).unwrap(), Some(6));
        remove(&mut state, Side::Sell, 6, id(2)).unwrap();
        assert_eq!(state.root(), empty);
    }

    #[test]
    fn hints_ignored_when_tick_is_active() {
        let mut store = TreeStore::default();
        let mut state = State::new(&mut store, M);
        push_back(&mut state, Side::Buy, 9, id(1), TickHints::default()).unwrap();
        push_back(&mut state, Side::Buy, 9, id(2), TickHints::new(Some(100), Some(-4))).unwrap();
        assert_eq!(walk(&mut state, Side::Buy, 9).unwrap(), vec![id(1), id(2)]);
    }

    #[test]
    fn bad_hints_on_new_tick_fail() {
        let mut store = TreeStore::default();
        let mut state = State::new(&mut store, M);
        push_back(&mut state, Side::Buy, 9, id(1), TickHints::default()).unwrap();
        let err = push_back(&mut state, Side::Buy, 8, id(2), TickHints::default()).unwrap_err();
        assert_eq!(err.code(), 501);
    }
}
