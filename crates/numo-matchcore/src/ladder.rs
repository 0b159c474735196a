//! Tick ladder: the doubly linked list of active ticks on one side.
//!
//! `prev` points towards the best tick, `next` away from it. The head of
//! each side is recorded in its best pointer, so a tick with no `prev`
//! must be the best. A tick is active iff its queue holds at least one
//! order; emptying the queue deactivates it immediately.

use numo_commit::{State, StateAccess};
use numo_types::{NumoError, OrderId, Result, Side, TickHints, TickNode};

fn bad_hint(reason: impl Into<String>) -> NumoError {
    NumoError::InvalidTickHint {
        reason: reason.into(),
    }
}

fn missing_tick(side: Side, tick: i32) -> NumoError {
    NumoError::InvariantViolation(format!("{side} tick {tick} linked but not active"))
}

/// Check that `hints` names exactly the neighbours `tick` would have if
/// inserted now. The tick itself must be inactive.
pub fn verify_hints<S: StateAccess>(
    state: &mut State<'_, S>,
    side: Side,
    tick: i32,
    hints: TickHints,
) -> Result<()> {
    match hints.prev {
        Some(prev) => {
            let node = state
                .tick_node(side, prev)?
                .ok_or_else(|| bad_hint(format!("prev tick {prev} is not active")))?;
            if node.next != hints.next {
                return Err(bad_hint(format!("prev tick {prev} is not adjacent to next hint")));
            }
            if !side.is_better(prev, tick) {
                return Err(bad_hint(format!("prev tick {prev} does not rank above {tick}")));
            }
        }
        None => {
            if state.best(side)? != hints.next {
                return Err(bad_hint("next hint is not the current best tick"));
            }
        }
    }
    if let Some(next) = hints.next {
        let node = state
            .tick_node(side, next)?
            .ok_or_else(|| bad_hint(format!("next tick {next} is not active")))?;
        if node.prev != hints.prev {
            return Err(bad_hint(format!("next tick {next} is not adjacent to prev hint")));
        }
        if !side.is_better(tick, next) {
            return Err(bad_hint(format!("next tick {next} does not rank below {tick}")));
        }
    }
    Ok(())
}

/// Link a new tick holding the single order `order_id` between its
/// verified neighbours.
pub fn activate<S: StateAccess>(
    state: &mut State<'_, S>,
    side: Side,
    tick: i32,
    hints: TickHints,
    order_id: OrderId,
) -> Result<()> {
    verify_hints(state, side, tick, hints)?;
    state.set_tick_node(
        side,
        tick,
        Some(&TickNode {
            prev: hints.prev,
            next: hints.next,
            head: order_id,
            tail: order_id,
        }),
    )?;
    match hints.prev {
        Some(prev) => {
            let mut node = state
                .tick_node(side, prev)?
                .ok_or_else(|| missing_tick(side, prev))?;
            node.next = Some(tick);
            state.set_tick_node(side, prev, Some(&node))?;
        }
        None => state.set_best(side, Some(tick))?,
    }
    if let Some(next) = hints.next {
        let mut node = state
            .tick_node(side, next)?
            .ok_or_else(|| missing_tick(side, next))?;
        node.prev = Some(tick);
        state.set_tick_node(side, next, Some(&node))?;
    }
    tracing::debug!(%side, tick, "Tick activated");
    Ok(())
}

/// Unlink an emptied tick and delete its node, moving the best pointer
/// when the tick was the best.
pub fn deactivate<S: StateAccess>(
    state: &mut State<'_, S>,
    side: Side,
    tick: i32,
    node: &TickNode,
) -> Result<()> {
    match node.prev {
        Some(prev) => {
            let mut prev_node = state
                .tick_node(side, prev)?
                .ok_or_else(|| missing_tick(side, prev))?;
            prev_node.next = node.next;
            state.set_tick_node(side, prev, Some(&prev_node))?;
        }
        None => {
            if state.best(side)? != Some(tick) {
                return Err(NumoError::InvariantViolation(format!(
                    "{side} tick {tick} has no prev but is not best"
                )));
            }
            state.set_best(side, node.next)?;
        }
    }
    if let Some(next) = node.next {
        let mut next_node = state
            .tick_node(side, next)?
            .ok_or_else(|| missing_tick(side, next))?;
        next_node.prev = node.prev;
        state.set_tick_node(side, next, Some(&next_node))?;
    }
    state.set_tick_node(side, tick, None)?;
    tracing::debug!(%side, tick, "Tick deactivated");
    Ok(())
}

/// Walk one side from best to worst. Test and diagnostics helper; the
/// engine itself never walks the ladder.
pub fn walk<S: StateAccess>(state: &mut State<'_, S>, side: Side) -> Result<Vec<i32>> {
    let mut ticks = Vec::new();
    let mut cursor = state.best(side)?;
    while let Some(tick) = cursor {
        let node = state
            .tick_node(side, tick)?
            .ok_or_else(|| missing_tick(side, tick))?;
        ticks.push(tick);
        cursor = node.next;
    }
    Ok(ticks)
}
