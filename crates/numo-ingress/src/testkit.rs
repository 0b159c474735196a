//! Deterministic signing traders for tests.

use k256::ecdsa::SigningKey;
use numo_types::{
    Address, CancelOrder, Hash32, Message, MessageSignature, OrderId, PlaceOrder, Side,
    SignedMessage, TickHints, TimeInForce, U256, keccak256_concat,
};

use crate::signing::address_of;

/// A trader with a seed-derived key and a local nonce counter.
pub struct TestTrader {
    key: SigningKey,
    address: Address,
    domain_separator: Hash32,
    nonce: u64,
}

impl TestTrader {
    /// Same seed, same key.
    #[must_use]
    pub fn new(seed: u8, domain_separator: Hash32) -> Self {
        let secret = keccak256_concat(&[b"numo-test-trader".as_slice(), &[seed]]);
        let key = SigningKey::from_slice(&secret).expect("hash is a valid scalar");
        let address = address_of(key.verifying_key());
        Self {
            key,
            address,
            domain_separator,
            nonce: 0,
        }
    }

    #[must_use]
    pub fn address(&self) -> Address {
        self.address
    }

    /// Nonce the next built message will carry.
    #[must_use]
    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn set_nonce(&mut self, nonce: u64) {
        self.nonce = nonce;
    }

    fn take_nonce(&mut self) -> u64 {
        let n = self.nonce;
        self.nonce += 1;
        n
    }

    /// Unsigned GTC place with default hints, consuming a nonce.
    pub fn place(&mut self, order_id: u64, side: Side, tick: i32, qty: u64) -> PlaceOrder {
        PlaceOrder {
            trader: self.address,
            nonce: self.take_nonce(),
            order_id: OrderId::from_u64(order_id),
            side,
            tif: TimeInForce::Gtc,
            tick,
            qty: U256::from(qty),
            hints: TickHints::default(),
        }
    }

    /// Unsigned cancel, consuming a nonce.
    pub fn cancel(&mut self, order_id: u64) -> CancelOrder {
        CancelOrder {
            trader: self.address,
            nonce: self.take_nonce(),
            order_id: OrderId::from_u64(order_id),
        }
    }

    /// Sign any message body under this trader's domain. `v` is 27/28.
    #[must_use]
    pub fn sign(&self, message: Message) -> SignedMessage {
        let hash = message.hash(&self.domain_separator);
        let (sig, recovery_id) = self
            .key
            .sign_prehash_recoverable(&hash)
            .expect("signing a 32-byte prehash");
        let bytes = sig.to_bytes();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..]);
        SignedMessage::new(
            message,
            MessageSignature {
                r,
                s,
                v: 27 + recovery_id.to_byte(),
            },
        )
    }

    pub fn sign_place(&mut self, order_id: u64, side: Side, tick: i32, qty: u64) -> SignedMessage {
        let place = self.place(order_id, side, tick, qty);
        self.sign(Message::Place(place))
    }

    pub fn sign_ioc(&mut self, order_id: u64, side: Side, tick: i32, qty: u64) -> SignedMessage {
        let mut place = self.place(order_id, side, tick, qty);
        place.tif = TimeInForce::Ioc;
        self.sign(Message::Place(place))
    }

    pub fn sign_cancel(&mut self, order_id: u64) -> SignedMessage {
        let cancel = self.cancel(order_id);
        self.sign(Message::Cancel(cancel))
    }
}

/// Replace the (unsigned) tick hints of a signed place.
#[must_use]
pub fn with_hints(mut signed: SignedMessage, prev: Option<i32>, next: Option<i32>) -> SignedMessage {
    if let Message::Place(place) = &mut signed.message {
        place.hints = TickHints::new(prev, next);
    }
    signed
}
