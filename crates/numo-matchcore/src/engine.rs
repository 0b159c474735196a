//! Place and cancel against the authenticated book.
//!
//! ## Place
//!
//! 1. Reject the reserved id, a live duplicate id, a misaligned quantity or
//!    a tick that does not map to a price.
//! 2. Lock collateral: quote notional at the limit for a BUY, base for a
//!    SELL.
//! 3. Match against the best opposite tick while it crosses, FIFO within
//!    the tick, at the maker's price, up to `maxMatchesPerOrder` fills.
//! 4. Release the residual lock of a filled or IOC order; rest a GTC
//!    remainder at the tail of its tick (activating the tick through
//!    verified hints when needed).
//!
//! ## Cancel
//!
//! Only the owner may cancel. The order leaves its queue, its residual lock
//! is released, and its entities are deleted.
//!
//! Nonce and signature checks belong to the caller. An error from either
//! operation leaves partial writes behind; the caller rolls back to its
//! own checkpoint.

use numo_commit::{State, StateAccess};
use numo_types::{
    CancelOrder, NumoError, Order, OrderId, PlaceOrder, Result, Rules, Side, TimeInForce,
    TradeRecord, U256, add_checked, sub_checked,
};

use crate::fills::{self, compute_fill, lock_amount, lock_asset};
use crate::queue;

/// What a successful place did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Execution {
    /// Fills in execution order.
    pub trades: Vec<TradeRecord>,
    /// Base quantity filled.
    pub filled: U256,
    /// Whether a GTC remainder now rests on the book.
    pub rested: bool,
}

/// Apply a validated, signature-checked place instruction.
pub fn apply_place<S: StateAccess>(
    state: &mut State<'_, S>,
    rules: &Rules,
    place: &PlaceOrder,
) -> Result<Execution> {
    let order_id = place.order_id;
    if order_id.is_none() {
        return Err(NumoError::ReservedOrderId);
    }
    if state.order(&order_id)?.is_some() {
        return Err(NumoError::DuplicateOrder(order_id));
    }
    rules.check_qty(place.qty)?;
    let limit_price = rules.price_of(place.tick)?;

    let asset = lock_asset(rules, place.side);
    let mut order_lock = lock_amount(rules, place.side, limit_price, place.qty)?;
    fills::lock(state, rules, &place.trader, &asset, order_lock)?;

    let mut remaining = place.qty;
    let mut execution = Execution::default();
    let maker_side = place.side.opposite();
    let mut matches = 0u32;

    while !remaining.is_zero() && matches < rules.max_matches_per_order {
        let Some(best) = state.best(maker_side)? else {
            break;
        };
        if !place.side.crosses(place.tick, best) {
            break;
        }
        let trade = fill_against_head(state, rules, place, &mut order_lock, remaining, best)?;
        remaining = sub_checked(remaining, trade.qty)?;
        execution.filled = add_checked(execution.filled, trade.qty)?;
        execution.trades.push(trade);
        matches += 1;
    }

    if remaining.is_zero() || place.tif == TimeInForce::Ioc {
        fills::release(state, rules, &place.trader, &asset, order_lock)?;
    } else {
        queue::push_back(state, place.side, place.tick, order_id, place.hints)?;
        state.set_order(
            &order_id,
            Some(&Order {
                trader: place.trader,
                side: place.side,
                tif: place.tif,
                tick: place.tick,
                remaining,
                locked: order_lock,
            }),
        )?;
        execution.rested = true;
    }

    tracing::debug!(
        order = %order_id.short(),
        side = %place.side,
        tick = place.tick,
        fills = execution.trades.len(),
        rested = execution.rested,
        "Order placed"
    );
    Ok(execution)
}

/// Fill the incoming order against the head of the maker tick `tick`.
fn fill_against_head<S: StateAccess>(
    state: &mut State<'_, S>,
    rules: &Rules,
    taker: &PlaceOrder,
    taker_lock: &mut U256,
    taker_remaining: U256,
    tick: i32,
) -> Result<TradeRecord> {
    let maker_side = taker.side.opposite();
    let head = state
        .tick_node(maker_side, tick)?
        .ok_or_else(|| {
            NumoError::InvariantViolation(format!("best {maker_side} tick {tick} not active"))
        })?
        .head;
    let mut maker = state
        .order(&head)?
        .ok_or_else(|| NumoError::InvariantViolation(format!("queue head {head} missing")))?;
    if maker.side != maker_side || maker.tick != tick {
        return Err(NumoError::InvariantViolation(format!(
            "queue head {head} does not belong to {maker_side} tick {tick}"
        )));
    }

    let qty = taker_remaining.min(maker.remaining);
    let fill = compute_fill(rules, rules.price_of(tick)?, qty)?;
    let (base, quote) = (rules.base_asset_id, rules.quote_asset_id);

    match taker.side {
        Side::Buy => {
            let cost = add_checked(fill.quote_amount, fill.fee)?;
            fills::spend_locked(state, rules, &taker.trader, &quote, cost, taker_lock)?;
            fills::credit(state, rules, &taker.trader, &base, qty)?;
            fills::spend_locked(state, rules, &maker.trader, &base, qty, &mut maker.locked)?;
            fills::credit(state, rules, &maker.trader, &quote, fill.quote_amount)?;
        }
        Side::Sell => {
            let proceeds = sub_checked(fill.quote_amount, fill.fee)?;
            fills::spend_locked(state, rules, &taker.trader, &base, qty, taker_lock)?;
            fills::credit(state, rules, &taker.trader, &quote, proceeds)?;
            fills::spend_locked(
                state,
                rules,
                &maker.trader,
                &quote,
                fill.quote_amount,
                &mut maker.locked,
            )?;
            fills::credit(state, rules, &maker.trader, &base, qty)?;
        }
    }
    fills::collect_fee(state, &quote, fill.fee)?;

    maker.remaining = sub_checked(maker.remaining, qty)?;
    if maker.is_filled() {
        fills::release(
            state,
            rules,
            &maker.trader,
            &lock_asset(rules, maker_side),
            maker.locked,
        )?;
        queue::remove(state, maker_side, tick, head)?;
        state.set_order(&head, None)?;
    } else {
        state.set_order(&head, Some(&maker))?;
    }

    tracing::debug!(
        maker = %head.short(),
        taker = %taker.order_id.short(),
        tick,
        qty = %fill.qty,
        quote = %fill.quote_amount,
        fee = %fill.fee,
        "Fill"
    );

    Ok(TradeRecord {
        market_id: *state.market_id(),
        maker_order_id: head,
        taker_order_id: taker.order_id,
        maker: maker.trader,
        taker: taker.trader,
        taker_side: taker.side,
        maker_tick: tick,
        qty: fill.qty,
        quote_amount: fill.quote_amount,
        fee: fill.fee,
    })
}

/// Apply a signature-checked cancel instruction. Returns the cancelled
/// order as it stood.
pub fn apply_cancel<S: StateAccess>(
    state: &mut State<'_, S>,
    rules: &Rules,
    cancel: &CancelOrder,
) -> Result<Order> {
    let order_id: OrderId = cancel.order_id;
    let order = state
        .order(&order_id)?
        .ok_or(NumoError::OrderNotFound(order_id))?;
    if order.trader != cancel.trader {
        return Err(NumoError::NotOrderOwner(order_id));
    }
    queue::remove(state, order.side, order.tick, order_id)?;
    fills::release(
        state,
        rules,
        &order.trader,
        &lock_asset(rules, order.side),
        order.locked,
    )?;
    state.set_order(&order_id, None)?;
    tracing::debug!(order = %order_id.short(), side = %order.side, tick = order.tick, "Order cancelled");
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ladder, queue};
    use numo_commit::TreeStore;
    use numo_types::{Address, Balance, TickHints};

    const M: [u8; 32] = [2; 32];
    const ALICE: Address = Address([0xa1; 20]);
    const BOB: Address = Address([0xb0; 20]);

    fn u(n: u64) -> U256 {
        U256::from(n)
    }

    fn place(trader: Address, id: u64, side: Side, tick: i32, qty: u64) -> PlaceOrder {
        PlaceOrder {
            trader,
            nonce: 0,
            order_id: OrderId::from_u64(id),
            side,
            tif: TimeInForce::Gtc,
            tick,
            qty: u(qty),
            hints: TickHints::default(),
        }
    }

    fn fund(state: &mut State<'_, TreeStore>, rules: &Rules, who: Address) {
        for asset in [rules.base_asset_id, rules.quote_asset_id] {
            state
                .set_balance(&who, &asset, &Balance::new(u(1_000_000), U256::zero()))
                .unwrap();
        }
    }

    fn setup(store: &mut TreeStore) -> (State<'_, TreeStore>, Rules) {
        let rules = Rules::dummy();
        let mut state = State::new(store, M);
        fund(&mut state, &rules, ALICE);
        fund(&mut state, &rules, BOB);
        (state, rules)
    }

    #[test]
    fn resting_buy_locks_notional_only() {
        let mut store = TreeStore::default();
        let (mut state, rules) = setup(&mut store);
        let exec = apply_place(&mut state, &rules, &place(ALICE, 1, Side::Buy, 100, 10)).unwrap();
        assert!(exec.rested && exec.trades.is_empty());
        let bal = state.balance(&ALICE, &rules.quote_asset_id).unwrap();
        assert_eq!(bal.locked, u(1000));
        assert_eq!(bal.available, u(1_000_000 - 1000));
        let order = state.order(&OrderId::from_u64(1)).unwrap().unwrap();
        assert_eq!(order.locked, u(1000));
        assert_eq!(state.best(Side::Buy).unwrap(), Some(100));
    }

    #[test]
    fn buyer_funded_with_exact_notional() {
        let mut store = TreeStore::default();
        let (mut state, rules) = setup(&mut store);
        let carol = Address([0xc0; 20]);
        let quote = rules.quote_asset_id;
        state.set_balance(&carol, &quote, &Balance::new(u(1000), U256::zero())).unwrap();

        let exec = apply_place(&mut state, &rules, &place(carol, 1, Side::Buy, 100, 10)).unwrap();
        assert!(exec.rested);
        assert_eq!(state.balance(&carol, &quote).unwrap(), Balance::new(U256::zero(), u(1000)));
        assert_eq!(state.order(&OrderId::from_u64(1)).unwrap().unwrap().locked, u(1000));

        // As a taker the same buyer cannot also cover the 3 unit fee.
        let mut store = TreeStore::default();
        let (mut state, rules) = setup(&mut store);
        state.set_balance(&carol, &quote, &Balance::new(u(1000), U256::zero())).unwrap();
        apply_place(&mut state, &rules, &place(BOB, 1, Side::Sell, 100, 10)).unwrap();
        let err = apply_place(&mut state, &rules, &place(carol, 2, Side::Buy, 100, 10)).unwrap_err();
        assert_eq!(err.code(), 500);

        // With the fee on top in available, the fill draws it from there.
        let mut store = TreeStore::default();
        let (mut state, rules) = setup(&mut store);
        state.set_balance(&carol, &quote, &Balance::new(u(1003), U256::zero())).unwrap();
        apply_place(&mut state, &rules, &place(BOB, 1, Side::Sell, 100, 10)).unwrap();
        let exec = apply_place(&mut state, &rules, &place(carol, 2, Side::Buy, 100, 10)).unwrap();
        assert_eq!(exec.trades[0].fee, u(3));
        assert_eq!(state.balance(&carol, &quote).unwrap(), Balance::new(U256::zero(), U256::zero()));
    }

    #[test]
    fn taker_buy_fills_at_maker_price_and_pays_fee() {
        let mut store = TreeStore::default();
        let (mut state, rules) = setup(&mut store);
        apply_place(&mut state, &rules, &place(BOB, 1, Side::Sell, 100, 10)).unwrap();
        let exec = apply_place(&mut state, &rules, &place(ALICE, 2, Side::Buy, 105, 10)).unwrap();

        assert_eq!(exec.trades.len(), 1);
        let t = &exec.trades[0];
        assert_eq!((t.maker_tick, t.qty, t.quote_amount, t.fee), (100, u(10), u(1000), u(3)));
        assert!(!exec.rested);

        // Alice locked 1050 at her limit, spent 1003, got the rest back.
        let alice_quote = state.balance(&ALICE, &rules.quote_asset_id).unwrap();
        assert_eq!(alice_quote, Balance::new(u(1_000_000 - 1003), U256::zero()));
        let alice_base = state.balance(&ALICE, &rules.base_asset_id).unwrap();
        assert_eq!(alice_base.available, u(1_000_010));
        let bob_quote = state.balance(&BOB, &rules.quote_asset_id).unwrap();
        assert_eq!(bob_quote.available, u(1_001_000));
        let bob_base = state.balance(&BOB, &rules.base_asset_id).unwrap();
        assert_eq!(bob_base, Balance::new(u(999_990), U256::zero()));
        assert_eq!(state.fee_vault(&rules.quote_asset_id).unwrap().total, u(3));

        assert_eq!(state.best(Side::Sell).unwrap(), None);
        assert_eq!(state.order(&OrderId::from_u64(1)).unwrap(), None);
        assert_eq!(state.order(&OrderId::from_u64(2)).unwrap(), None);
    }

    #[test]
    fn taker_sell_receives_quote_minus_fee() {
        let mut store = TreeStore::default();
        let (mut state, rules) = setup(&mut store);
        apply_place(&mut state, &rules, &place(ALICE, 1, Side::Buy, 100, 10)).unwrap();
        let exec = apply_place(&mut state, &rules, &place(BOB, 2, Side::Sell, 90, 4)).unwrap();
        assert_eq!(exec.trades[0].quote_amount, u(400));
        assert_eq!(exec.trades[0].fee, u(2));

        let bob_quote = state.balance(&BOB, &rules.quote_asset_id).unwrap();
        assert_eq!(bob_quote.available, u(1_000_398));
        let maker = state.order(&OrderId::from_u64(1)).unwrap().unwrap();
        assert_eq!(maker.remaining, u(6));
        assert_eq!(maker.locked, u(600));
        let alice_quote = state.balance(&ALICE, &rules.quote_asset_id).unwrap();
        assert_eq!(alice_quote.locked, u(600));
    }

    #[test]
    fn sweeps_ticks_in_price_then_time_order() {
        let mut store = TreeStore::default();
        let (mut state, rules) = setup(&mut store);
        apply_place(&mut state, &rules, &place(BOB, 1, Side::Sell, 101, 2)).unwrap();
        let mut p = place(BOB, 2, Side::Sell, 100, 2);
        p.hints = TickHints::new(None, Some(101));
        apply_place(&mut state, &rules, &p).unwrap();
        apply_place(&mut state, &rules, &place(BOB, 3, Side::Sell, 100, 2)).unwrap();

        let exec = apply_place(&mut state, &rules, &place(ALICE, 9, Side::Buy, 101, 5)).unwrap();
        let makers: Vec<_> = exec.trades.iter().map(|t| t.maker_order_id).collect();
        assert_eq!(makers, vec![OrderId::from_u64(2), OrderId::from_u64(3), OrderId::from_u64(1)]);
        assert_eq!(exec.filled, u(5));
        assert_eq!(state.best(Side::Sell).unwrap(), Some(101));
        let rest = state.order(&OrderId::from_u64(1)).unwrap().unwrap();
        assert_eq!(rest.remaining, u(1));
    }

    #[test]
    fn ioc_remainder_is_released() {
        let mut store = TreeStore::default();
        let (mut state, rules) = setup(&mut store);
        apply_place(&mut state, &rules, &place(BOB, 1, Side::Sell, 100, 3)).unwrap();
        let mut ioc = place(ALICE, 2, Side::Buy, 100, 10);
        ioc.tif = TimeInForce::Ioc;
        let exec = apply_place(&mut state, &rules, &ioc).unwrap();
        assert_eq!(exec.filled, u(3));
        assert!(!exec.rested);
        assert_eq!(state.order(&OrderId::from_u64(2)).unwrap(), None);
        let bal = state.balance(&ALICE, &rules.quote_asset_id).unwrap();
        assert!(bal.locked.is_zero());
        assert_eq!(bal.available, u(1_000_000 - 301));
        assert_eq!(state.best(Side::Buy).unwrap(), None);
    }

    #[test]
    fn match_cap_stops_and_rests_remainder() {
        let mut store = TreeStore::default();
        let (mut state, mut rules) = setup(&mut store);
        rules.max_matches_per_order = 2;
        for id in 1..=3 {
            apply_place(&mut state, &rules, &place(BOB, id, Side::Sell, 100, 1)).unwrap();
        }
        // The remainder rests at 100 even though ask 100 is still live.
        let exec = apply_place(&mut state, &rules, &place(ALICE, 9, Side::Buy, 100, 3)).unwrap();
        assert_eq!(exec.trades.len(), 2);
        assert!(exec.rested);
        assert_eq!(queue::walk(&mut state, Side::Sell, 100).unwrap(), vec![OrderId::from_u64(3)]);
        assert_eq!(state.best(Side::Buy).unwrap(), Some(100));
    }

    #[test]
    fn place_rejections() {
        let mut store = TreeStore::default();
        let (mut state, rules) = setup(&mut store);
        let mut p = place(ALICE, 0, Side::Buy, 1, 1);
        assert_eq!(apply_place(&mut state, &rules, &p).unwrap_err(), NumoError::ReservedOrderId);

        p.order_id = OrderId::from_u64(1);
        p.qty = U256::zero();
        assert_eq!(apply_place(&mut state, &rules, &p).unwrap_err(), NumoError::ZeroQuantity);

        p.qty = u(1);
        p.tick = -1;
        assert_eq!(apply_place(&mut state, &rules, &p).unwrap_err().code(), 403);

        p.tick = 1;
        apply_place(&mut state, &rules, &p).unwrap();
        assert_eq!(
            apply_place(&mut state, &rules, &p).unwrap_err(),
            NumoError::DuplicateOrder(OrderId::from_u64(1))
        );

        let big = place(ALICE, 2, Side::Sell, 1, 2_000_000);
        assert_eq!(apply_place(&mut state, &rules, &big).unwrap_err().code(), 500);
    }

    #[test]
    fn cancel_releases_and_unlinks() {
        let mut store = TreeStore::default();
        let (mut state, rules) = setup(&mut store);
        for id in 1..=3 {
            apply_place(&mut state, &rules, &place(ALICE, id, Side::Sell, 50, 5)).unwrap();
        }
        let cancel = CancelOrder {
            trader: ALICE,
            nonce: 0,
            order_id: OrderId::from_u64(2),
        };
        let wrong_owner = CancelOrder { trader: BOB, ..cancel.clone() };
        assert_eq!(
            apply_cancel(&mut state, &rules, &wrong_owner).unwrap_err(),
            NumoError::NotOrderOwner(OrderId::from_u64(2))
        );

        let cancelled = apply_cancel(&mut state, &rules, &cancel).unwrap();
        assert_eq!(cancelled.remaining, u(5));
        assert_eq!(
            queue::walk(&mut state, Side::Sell, 50).unwrap(),
            vec![OrderId::from_u64(1), OrderId::from_u64(3)]
        );
        let bal = state.balance(&ALICE, &rules.base_asset_id).unwrap();
        assert_eq!(bal.locked, u(10));
        assert_eq!(
            apply_cancel(&mut state, &rules, &cancel).unwrap_err(),
            NumoError::OrderNotFound(OrderId::from_u64(2))
        );
    }

    #[test]
    fn cancelling_everything_restores_funded_root() {
        let mut store = TreeStore::default();
        let (mut state, rules) = setup(&mut store);
        let funded = state.root();
        apply_place(&mut state, &rules, &place(ALICE, 1, Side::Buy, 10, 5)).unwrap();
        let mut p = place(ALICE, 2, Side::Buy, 9, 5);
        p.hints = TickHints::new(Some(10), None);
        apply_place(&mut state, &rules, &p).unwrap();
        assert_eq!(ladder::walk(&mut state, Side::Buy).unwrap(), vec![10, 9]);
        for id in [1, 2] {
            let c = CancelOrder { trader: ALICE, nonce: 0, order_id: OrderId::from_u64(id) };
            apply_cancel(&mut state, &rules, &c).unwrap();
        }
        assert_eq!(state.root(), funded);
    }
}
