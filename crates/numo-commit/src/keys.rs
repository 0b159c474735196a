//! Namespaced state keys.
//!
//! `key = H(namespace || 0x1f || packed key material)`. Namespaces are
//! distinct 32-byte labels, so keys of different entity types never
//! collide even when their material does.

use numo_types::constants::{
    KEY_SEPARATOR, NS_BAL, NS_FEEVAULT, NS_MARKETBEST, NS_NONCE, NS_ORDER, NS_ORDERNODE,
    NS_TICKNODE,
};
use numo_types::{Address, AssetId, Hash32, OrderId, Side, keccak256_concat};

fn derive(namespace: &[u8; 32], material: &[&[u8]]) -> Hash32 {
    let mut parts: Vec<&[u8]> = Vec::with_capacity(material.len() + 2);
    parts.push(namespace);
    parts.push(std::slice::from_ref(&KEY_SEPARATOR));
    parts.extend_from_slice(material);
    keccak256_concat(&parts)
}

#[must_use]
pub fn balance_key(account: &Address, asset: &AssetId) -> Hash32 {
    derive(&NS_BAL, &[account.as_bytes(), asset.as_bytes()])
}

#[must_use]
pub fn nonce_key(account: &Address) -> Hash32 {
    derive(&NS_NONCE, &[account.as_bytes()])
}

#[must_use]
pub fn order_key(id: &OrderId) -> Hash32 {
    derive(&NS_ORDER, &[id.as_bytes()])
}

#[must_use]
pub fn order_node_key(id: &OrderId) -> Hash32 {
    derive(&NS_ORDERNODE, &[id.as_bytes()])
}

#[must_use]
pub fn tick_node_key(market_id: &Hash32, side: Side, tick: i32) -> Hash32 {
    derive(
        &NS_TICKNODE,
        &[market_id, &[side.as_u8()], &tick.to_be_bytes()],
    )
}

#[must_use]
pub fn market_best_key(market_id: &Hash32, side: Side) -> Hash32 {
    derive(&NS_MARKETBEST, &[market_id, &[side.as_u8()]])
}

#[must_use]
pub fn fee_vault_key(asset: &AssetId) -> Hash32 {
    derive(&NS_FEEVAULT, &[asset.as_bytes()])
}
