//! Fill arithmetic and balance movements.
//!
//! ## Rounding
//!
//! | Amount              | Formula                                  | Rounding |
//! |---------------------|------------------------------------------|----------|
//! | quote of a fill     | `price * qty / priceScale`               | down     |
//! | taker fee           | `quote * takerFeeBps / 10000`            | up       |
//! | BUY lock            | `price * qty / priceScale`               | up       |
//!
//! A BUY lock covers notional only. A taker's fee, and any rounding gap,
//! is drawn from available when the lock runs short.
//!
//! Every movement re-checks the `maxBalance` cap of the balance it writes.

use numo_commit::{State, StateAccess};
use numo_types::constants::FEE_BPS_DENOMINATOR;
use numo_types::{
    Address, AssetId, NumoError, Result, Rules, Side, U256, add_checked, mul_div_down,
    mul_div_up, sub_checked,
};

fn bps_denominator() -> U256 {
    U256::from(FEE_BPS_DENOMINATOR)
}

/// Amounts exchanged by one maker/taker fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fill {
    pub qty: U256,
    pub quote_amount: U256,
    pub fee: U256,
}

/// Quote and fee for `qty` base units at `price`.
pub fn compute_fill(rules: &Rules, price: U256, qty: U256) -> Result<Fill> {
    let quote_amount = mul_div_down(price, qty, rules.price_scale)?;
    let fee = mul_div_up(quote_amount, rules.taker_fee(), bps_denominator())?;
    Ok(Fill {
        qty,
        quote_amount,
        fee,
    })
}

/// Collateral a new order must lock: quote notional at the limit price for
/// a BUY, base for a SELL.
pub fn lock_amount(rules: &Rules, side: Side, price: U256, qty: U256) -> Result<U256> {
    match side {
        Side::Buy => mul_div_up(price, qty, rules.price_scale),
        Side::Sell => Ok(qty),
    }
}

/// Asset an order on `side` locks.
#[must_use]
pub fn lock_asset(rules: &Rules, side: Side) -> AssetId {
    match side {
        Side::Buy => rules.quote_asset_id,
        Side::Sell => rules.base_asset_id,
    }
}

/// Move `amount` from available to locked.
pub fn lock<S: StateAccess>(
    state: &mut State<'_, S>,
    rules: &Rules,
    account: &Address,
    asset: &AssetId,
    amount: U256,
) -> Result<()> {
    let mut balance = state.balance(account, asset)?;
    if balance.available < amount {
        return Err(NumoError::InsufficientBalance {
            needed: amount,
            available: balance.available,
        });
    }
    balance.available = sub_checked(balance.available, amount)?;
    balance.locked = add_checked(balance.locked, amount)?;
    balance.check_cap(rules.max_balance)?;
    state.set_balance(account, asset, &balance)
}

/// Move `amount` from locked back to available.
pub fn release<S: StateAccess>(
    state: &mut State<'_, S>,
    rules: &Rules,
    account: &Address,
    asset: &AssetId,
    amount: U256,
) -> Result<()> {
    if amount.is_zero() {
        return Ok(());
    }
    let mut balance = state.balance(account, asset)?;
    balance.locked = sub_checked(balance.locked, amount)?;
    balance.available = add_checked(balance.available, amount)?;
    balance.check_cap(rules.max_balance)?;
    state.set_balance(account, asset, &balance)
}

/// Pay `amount` out of an order's lock. Any part the order lock cannot
/// cover (fee rounding across several fills) is drawn from available.
pub fn spend_locked<S: StateAccess>(
    state: &mut State<'_, S>,
    rules: &Rules,
    account: &Address,
    asset: &AssetId,
    amount: U256,
    order_lock: &mut U256,
) -> Result<()> {
    let from_lock = amount.min(*order_lock);
    let shortfall = sub_checked(amount, from_lock)?;
    let mut balance = state.balance(account, asset)?;
    if balance.available < shortfall {
        return Err(NumoError::InsufficientBalance {
            needed: shortfall,
            available: balance.available,
        });
    }
    balance.locked = sub_checked(balance.locked, from_lock)?;
    balance.available = sub_checked(balance.available, shortfall)?;
    balance.check_cap(rules.max_balance)?;
    state.set_balance(account, asset, &balance)?;
    *order_lock = sub_checked(*order_lock, from_lock)?;
    Ok(())
}

/// Add `amount` to available.
pub fn credit<S: StateAccess>(
    state: &mut State<'_, S>,
    rules: &Rules,
    account: &Address,
    asset: &AssetId,
    amount: U256,
) -> Result<()> {
    let mut balance = state.balance(account, asset)?;
    balance.available = add_checked(balance.available, amount)?;
    balance.check_cap(rules.max_balance)?;
    state.set_balance(account, asset, &balance)
}

/// Add a fee to the vault of `asset`.
pub fn collect_fee<S: StateAccess>(state: &mut State<'_, S>, asset: &AssetId, fee: U256) -> Result<()> {
    let mut vault = state.fee_vault(asset)?;
    vault.total = add_checked(vault.total, fee)?;
    state.set_fee_vault(asset, &vault)
}
