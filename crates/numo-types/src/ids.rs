//! Fixed-width identifiers used throughout Numo.
//!
//! Every identifier is raw bytes: accounts are 20-byte secp256k1 addresses,
//! orders and assets are 32-byte ids chosen by the client or the market.
//! All of them serialize to `0x`-prefixed hex strings.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A 32-byte Keccak-256 digest (roots, keys, message hashes).
pub type Hash32 = [u8; 32];

// ---------------------------------------------------------------------------
// serde helpers
// ---------------------------------------------------------------------------

/// `#[serde(with = "serde_hex")]` for fixed byte arrays as `0x` hex strings.
pub mod serde_hex {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S, const N: usize>(bytes: &[u8; N], s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    pub fn deserialize<'de, D, const N: usize>(d: D) -> Result<[u8; N], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(d)?;
        let digits = s.strip_prefix("0x").unwrap_or(&s);
        let mut out = [0u8; N];
        hex::decode_to_slice(digits, &mut out).map_err(serde::de::Error::custom)?;
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// A trading account: the last 20 bytes of the Keccak-256 of the
/// uncompressed secp256k1 public key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Address(#[serde(with = "serde_hex")] pub [u8; 20]);

impl Address {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

// ---------------------------------------------------------------------------
// OrderId
// ---------------------------------------------------------------------------

/// Client-chosen order identifier. The all-zero id is reserved as the
/// "no order" sentinel in FIFO links.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct OrderId(#[serde(with = "serde_hex")] pub [u8; 32]);

impl OrderId {
    /// The reserved sentinel id.
    pub const NONE: Self = Self([0u8; 32]);

    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Convenience constructor: a big-endian counter in the low 8 bytes.
    #[must_use]
    pub fn from_u64(n: u64) -> Self {
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&n.to_be_bytes());
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    #[must_use]
    pub fn is_none(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Map the sentinel to `None` for in-memory links.
    #[must_use]
    pub fn to_option(self) -> Option<Self> {
        if self.is_none() { None } else { Some(self) }
    }

    /// Inverse of [`OrderId::to_option`].
    #[must_use]
    pub fn from_option(id: Option<Self>) -> Self {
        id.unwrap_or(Self::NONE)
    }

    /// Last four bytes as hex, for log lines.
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[28..])
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "order:0x{}", hex::encode(self.0))
    }
}

// ---------------------------------------------------------------------------
// AssetId
// ---------------------------------------------------------------------------

/// Market-level asset identifier (base or quote).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct AssetId(#[serde(with = "serde_hex")] pub [u8; 32]);

impl AssetId {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "asset:0x{}", hex::encode(&self.0[..8]))
    }
}
