//! Fixed-width big-endian byte codec.
//!
//! Every consensus-visible byte string (stored values, signed message
//! bodies, the guest input blob, public inputs) is produced by
//! [`ByteWriter`] and consumed by [`ByteReader`]. There are no length
//! prefixes except where a layout declares an explicit `u32` count.

use crate::error::{NumoError, Result};
use crate::u256::{U256, u256_from_be, u256_to_be};

/// Append-only big-endian writer.
#[derive(Debug, Default, Clone)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn put_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn put_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn put_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn put_i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn put_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn put_u256(&mut self, v: U256) {
        self.buf.extend_from_slice(&u256_to_be(v));
    }

    /// `u32` length prefix followed by the bytes.
    pub fn put_var_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let len = u32::try_from(bytes.len()).map_err(|_| NumoError::ArithmeticOverflow)?;
        self.put_u32(len);
        self.put_bytes(bytes);
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Cursor over a borrowed byte slice. Every read is bounds-checked and
/// reports the offset it failed at.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.pos == self.data.len()
    }

    /// Reject any bytes left after the last section.
    pub fn finish(&self) -> Result<()> {
        if self.is_finished() {
            Ok(())
        } else {
            Err(NumoError::TrailingBytes {
                count: self.remaining(),
            })
        }
    }

    pub fn bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(NumoError::UnexpectedEof {
                offset: self.pos,
                needed: n,
            });
        }
        let out = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    pub fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.bytes(N)?);
        Ok(out)
    }

    pub fn u8(&mut self) -> Result<u8> {
        Ok(self.array::<1>()?[0])
    }

    pub fn u32(&mut self) -> Result<u32> {
        Ok(u32::from_be_bytes(self.array()?))
    }

    pub fn u64(&mut self) -> Result<u64> {
        Ok(u64::from_be_bytes(self.array()?))
    }

    pub fn i32(&mut self) -> Result<i32> {
        Ok(i32::from_be_bytes(self.array()?))
    }

    pub fn u256(&mut self) -> Result<U256> {
        Ok(u256_from_be(&self.array()?))
    }

    /// `u32` length prefix followed by that many bytes.
    pub fn var_bytes(&mut self) -> Result<&'a [u8]> {
        let len = self.u32()? as usize;
        self.bytes(len)
    }

    /// Upper bound for `Vec::with_capacity` when a count precedes items of
    /// at least `min_item` bytes, so a hostile count cannot force a huge
    /// allocation.
    #[must_use]
    pub fn capacity_hint(&self, count: u32, min_item: usize) -> usize {
        (count as usize).min(self.remaining() / min_item.max(1))
    }
}

/// Types with a canonical fixed-layout encoding.
pub trait Encode {
    fn encode_to(&self, w: &mut ByteWriter);

    fn to_bytes(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        self.encode_to(&mut w);
        w.into_bytes()
    }
}

/// Inverse of [`Encode`].
pub trait Decode: Sized {
    fn decode_from(r: &mut ByteReader<'_>) -> Result<Self>;

    /// Decode a complete buffer; trailing bytes are an error.
    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = ByteReader::new(bytes);
        let v = Self::decode_from(&mut r)?;
        r.finish()?;
        Ok(v)
    }
}

/// An entity stored as a fixed-length value in the state tree.
pub trait StoredValue: Encode + Decode {
    /// Entity name for error messages.
    const ENTITY: &'static str;
    /// Exact encoded length.
    const LEN: usize;

    /// Decode a stored value, rejecting any other length up front.
    fn from_stored(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != Self::LEN {
            return Err(NumoError::InvalidValueLength {
                entity: Self::ENTITY,
                expected: Self::LEN,
                got: bytes.len(),
            });
        }
        Self::from_bytes(bytes)
    }
}
