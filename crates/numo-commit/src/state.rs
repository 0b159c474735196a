//! Typed entity accessors over a [`StateAccess`] store.
//!
//! [`State`] is the explicit store handle threaded through every engine
//! operation. It knows the market id (needed for ladder keys) and turns raw
//! tree values into entities and back. A stored value that fails to decode
//! is a batch-fatal error.

use numo_types::{
    Address, AssetId, Balance, Encode, FeeVault, Hash32, MarketBest, Nonce, Order, OrderId,
    OrderNode, Result, Side, StoredValue, TickNode,
};

use crate::keys;
use crate::store::{Checkpoint, StateAccess};

/// Market-scoped view of one store.
pub struct State<'s, S: StateAccess> {
    store: &'s mut S,
    market_id: Hash32,
}

impl<'s, S: StateAccess> State<'s, S> {
    pub fn new(store: &'s mut S, market_id: Hash32) -> Self {
        Self { store, market_id }
    }

    #[must_use]
    pub fn market_id(&self) -> &Hash32 {
        &self.market_id
    }

    #[must_use]
    pub fn root(&self) -> Hash32 {
        self.store.root()
    }

    #[must_use]
    pub fn checkpoint(&self) -> Checkpoint {
        self.store.checkpoint()
    }

    pub fn rollback(&mut self, checkpoint: Checkpoint) -> Result<()> {
        self.store.rollback(checkpoint)
    }

    #[must_use]
    pub fn touched_keys(&self) -> &[Hash32] {
        self.store.touched_keys()
    }

    fn get<T: StoredValue>(&mut self, key: &Hash32) -> Result<Option<T>> {
        self.store
            .read(key)?
            .map(|bytes| T::from_stored(&bytes))
            .transpose()
    }

    fn put<T: StoredValue>(&mut self, key: Hash32, value: Option<&T>) -> Result<()> {
        self.store.write(key, value.map(Encode::to_bytes))
    }

    // --- balances ----------------------------------------------------------

    pub fn balance(&mut self, account: &Address, asset: &AssetId) -> Result<Balance> {
        Ok(self
            .get(&keys::balance_key(account, asset))?
            .unwrap_or_default())
    }

    pub fn set_balance(&mut self, account: &Address, asset: &AssetId, b: &Balance) -> Result<()> {
        self.put(keys::balance_key(account, asset), Some(b))
    }

    // --- nonces ------------------------------------------------------------

    pub fn nonce(&mut self, account: &Address) -> Result<u64> {
        Ok(self
            .get::<Nonce>(&keys::nonce_key(account))?
            .unwrap_or_default()
            .0)
    }

    pub fn set_nonce(&mut self, account: &Address, nonce: u64) -> Result<()> {
        self.put(keys::nonce_key(account), Some(&Nonce(nonce)))
    }

    // --- orders ------------------------------------------------------------

    pub fn order(&mut self, id: &OrderId) -> Result<Option<Order>> {
        self.get(&keys::order_key(id))
    }

    pub fn set_order(&mut self, id: &OrderId, order: Option<&Order>) -> Result<()> {
        self.put(keys::order_key(id), order)
    }

    pub fn order_node(&mut self, id: &OrderId) -> Result<Option<OrderNode>> {
        self.get(&keys::order_node_key(id))
    }

    pub fn set_order_node(&mut self, id: &OrderId, node: Option<&OrderNode>) -> Result<()> {
        self.put(keys::order_node_key(id), node)
    }

    // --- ladder ------------------------------------------------------------

    pub fn tick_node(&mut self, side: Side, tick: i32) -> Result<Option<TickNode>> {
        let key = keys::tick_node_key(&self.market_id, side, tick);
        self.get(&key)
    }

    pub fn set_tick_node(&mut self, side: Side, tick: i32, node: Option<&TickNode>) -> Result<()> {
        let key = keys::tick_node_key(&self.market_id, side, tick);
        self.put(key, node)
    }

    pub fn best(&mut self, side: Side) -> Result<Option<i32>> {
        let key = keys::market_best_key(&self.market_id, side);
        Ok(self.get::<MarketBest>(&key)?.map(|b| b.0))
    }

    pub fn set_best(&mut self, side: Side, tick: Option<i32>) -> Result<()> {
        let key = keys::market_best_key(&self.market_id, side);
        self.put(key, tick.map(MarketBest).as_ref())
    }

    // --- fees --------------------------------------------------------------

    pub fn fee_vault(&mut self, asset: &AssetId) -> Result<FeeVault> {
        Ok(self.get(&keys::fee_vault_key(asset))?.unwrap_or_default())
    }

    pub fn set_fee_vault(&mut self, asset: &AssetId, vault: &FeeVault) -> Result<()> {
        self.put(keys::fee_vault_key(asset), Some(vault))
    }
}
