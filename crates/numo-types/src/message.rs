//! Signed order messages.
//!
//! The message set is closed: [`Message::Place`] and [`Message::Cancel`],
//! dispatched once on the wire tag. Each has a canonical signing body; tick
//! hints travel next to a `Place` message but are not part of what the
//! trader signs.

use serde::{Deserialize, Serialize};

use crate::constants::{MSG_TAG_CANCEL, MSG_TAG_PLACE, SIGNATURE_LEN, SIGNING_PREFIX};
use crate::error::{NumoError, Result};
use crate::hash::{keccak256, keccak256_concat};
use crate::ids::{Address, Hash32, OrderId, serde_hex};
use crate::order::{Side, TickHints, TimeInForce};
use crate::u256::{U256, serde_u256};
use crate::wire::{ByteReader, ByteWriter, Decode, Encode};

/// Place a new limit order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceOrder {
    pub trader: Address,
    pub nonce: u64,
    pub order_id: OrderId,
    pub side: Side,
    pub tif: TimeInForce,
    pub tick: i32,
    #[serde(with = "serde_u256")]
    pub qty: U256,
    /// Unsigned insertion hints for a not-yet-active tick.
    #[serde(default)]
    pub hints: TickHints,
}

/// Cancel a resting order owned by the signer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelOrder {
    pub trader: Address,
    pub nonce: u64,
    pub order_id: OrderId,
}

/// One batch message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Message {
    Place(PlaceOrder),
    Cancel(CancelOrder),
}

impl Message {
    #[must_use]
    pub fn tag(&self) -> u8 {
        match self {
            Self::Place(_) => MSG_TAG_PLACE,
            Self::Cancel(_) => MSG_TAG_CANCEL,
        }
    }

    #[must_use]
    pub fn trader(&self) -> Address {
        match self {
            Self::Place(p) => p.trader,
            Self::Cancel(c) => c.trader,
        }
    }

    #[must_use]
    pub fn nonce(&self) -> u64 {
        match self {
            Self::Place(p) => p.nonce,
            Self::Cancel(c) => c.nonce,
        }
    }

    #[must_use]
    pub fn order_id(&self) -> OrderId {
        match self {
            Self::Place(p) => p.order_id,
            Self::Cancel(c) => c.order_id,
        }
    }

    fn encode_body(&self, w: &mut ByteWriter) {
        w.put_u8(self.tag());
        w.put_bytes(self.trader().as_bytes());
        w.put_u64(self.nonce());
        w.put_bytes(self.order_id().as_bytes());
        if let Self::Place(p) = self {
            w.put_u8(p.side.as_u8());
            w.put_u32(p.tif.as_u32());
            w.put_i32(p.tick);
            w.put_u256(p.qty);
        }
    }

    /// The canonical bytes the trader signs over.
    #[must_use]
    pub fn signing_bytes(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        self.encode_body(&mut w);
        w.into_bytes()
    }

    /// `H(0x19 || 0x01 || domainSeparator || H(signing_bytes))`.
    #[must_use]
    pub fn hash(&self, domain_separator: &Hash32) -> Hash32 {
        let body_hash = keccak256(&self.signing_bytes());
        keccak256_concat(&[&SIGNING_PREFIX, domain_separator, &body_hash])
    }
}

/// A recoverable secp256k1 signature `r || s || v`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSignature {
    #[serde(with = "serde_hex")]
    pub r: [u8; 32],
    #[serde(with = "serde_hex")]
    pub s: [u8; 32],
    /// `0/1` or `27/28`.
    pub v: u8,
}

impl MessageSignature {
    #[must_use]
    pub fn to_bytes(&self) -> [u8; SIGNATURE_LEN] {
        let mut out = [0u8; SIGNATURE_LEN];
        out[..32].copy_from_slice(&self.r);
        out[32..64].copy_from_slice(&self.s);
        out[64] = self.v;
        out
    }

    #[must_use]
    pub fn from_bytes(bytes: &[u8; SIGNATURE_LEN]) -> Self {
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..64]);
        Self { r, s, v: bytes[64] }
    }

    /// Recovery id normalised to `0/1`; `None` for any other `v`.
    #[must_use]
    pub fn recovery_id(&self) -> Option<u8> {
        match self.v {
            0 | 27 => Some(0),
            1 | 28 => Some(1),
            _ => None,
        }
    }
}

/// A message with its signature, as carried in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedMessage {
    pub message: Message,
    pub signature: MessageSignature,
}

impl SignedMessage {
    #[must_use]
    pub fn new(message: Message, signature: MessageSignature) -> Self {
        Self { message, signature }
    }
}

impl Encode for SignedMessage {
    fn encode_to(&self, w: &mut ByteWriter) {
        self.message.encode_body(w);
        w.put_bytes(&self.signature.to_bytes());
        if let Message::Place(p) = &self.message {
            p.hints.encode_to(w);
        }
    }
}

impl Decode for SignedMessage {
    fn decode_from(r: &mut ByteReader<'_>) -> Result<Self> {
        let tag = r.u8()?;
        let trader = Address(r.array()?);
        let nonce = r.u64()?;
        let order_id = OrderId(r.array()?);
        let message = match tag {
            MSG_TAG_PLACE => {
                let side = Side::from_u8(r.u8()?)?;
                let tif = TimeInForce::from_u32(r.u32()?)?;
                let tick = r.i32()?;
                let qty = r.u256()?;
                let signature = MessageSignature::from_bytes(&r.array()?);
                let hints = TickHints::decode_from(r)?;
                return Ok(Self::new(
                    Message::Place(PlaceOrder {
                        trader,
                        nonce,
                        order_id,
                        side,
                        tif,
                        tick,
                        qty,
                        hints,
                    }),
                    signature,
                ));
            }
            MSG_TAG_CANCEL => Message::Cancel(CancelOrder {
                trader,
                nonce,
                order_id,
            }),
            other => return Err(NumoError::UnknownMessageTag(other)),
        };
        let signature = MessageSignature::from_bytes(&r.array()?);
        Ok(Self::new(message, signature))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place() -> Message {
        Message::Place(PlaceOrder {
            trader: Address([0x11; 20]),
            nonce: 3,
            order_id: OrderId::from_u64(77),
            side: Side::Sell,
            tif: TimeInForce::Gtc,
            tick: 100,
            qty: U256::from(5u64),
            hints: TickHints::new(Some(99), None),
        })
    }

    fn cancel() -> Message {
        Message::Cancel(CancelOrder {
            trader: Address([0x11; 20]),
            nonce: 4,
            order_id: OrderId::from_u64(77),
        })
    }

    fn sig() -> MessageSignature {
        MessageSignature {
            r: [1; 32],
            s: [2; 32],
            v: 27,
        }
    }

    #[test]
    fn signing_body_layouts() {
        let body = place().signing_bytes();
        assert_eq!(body.len(), 1 + 20 + 8 + 32 + 1 + 4 + 4 + 32);
        assert_eq!(body[0], MSG_TAG_PLACE);
        let body = cancel().signing_bytes();
        assert_eq!(body.len(), 1 + 20 + 8 + 32);
        assert_eq!(body[0], MSG_TAG_CANCEL);
    }

    #[test]
    fn hints_are_not_signed() {
        let a = place();
        let mut b = place();
        if let Message::Place(p) = &mut b {
            p.hints = TickHints::default();
        }
        assert_eq!(a.hash(&[9; 32]), b.hash(&[9; 32]));
    }

    #[test]
    fn hash_is_domain_bound() {
        assert_ne!(place().hash(&[1; 32]), place().hash(&[2; 32]));
    }

    #[test]
    fn signed_message_wire_round_trip() {
        for msg in [place(), cancel()] {
            let signed = SignedMessage::new(msg, sig());
            let bytes = signed.to_bytes();
            assert_eq!(SignedMessage::from_bytes(&bytes).unwrap(), signed);
        }
    }

    #[test]
    fn unknown_tag_rejected() {
        let mut bytes = SignedMessage::new(cancel(), sig()).to_bytes();
        bytes[0] = 0x07;
        assert_eq!(
            SignedMessage::from_bytes(&bytes),
            Err(NumoError::UnknownMessageTag(0x07))
        );
    }

    #[test]
    fn invalid_side_rejected_at_decode() {
        let mut bytes = SignedMessage::new(place(), sig()).to_bytes();
        bytes[1 + 20 + 8 + 32] = 9;
        let err = SignedMessage::from_bytes(&bytes).unwrap_err();
        assert_eq!(err.code(), 102);
    }

    #[test]
    fn recovery_id_normalisation() {
        let mut s = sig();
        assert_eq!(s.recovery_id(), Some(0));
        s.v = 1;
        assert_eq!(s.recovery_id(), Some(1));
        s.v = 28;
        assert_eq!(s.recovery_id(), Some(1));
        s.v = 2;
        assert_eq!(s.recovery_id(), None);
    }
}
