//! 256-bit unsigned arithmetic with explicit rounding.
//!
//! All amounts, prices, and caps are [`U256`]. Every operation the engine
//! performs on them is checked: overflow, underflow, and division by zero
//! return a [`NumoError`] instead of wrapping or panicking.
//!
//! `mul_div_*` widen to 512 bits so `a * b` never overflows before the
//! division; only a quotient that does not fit back into 256 bits errors.

use crate::error::{NumoError, Result};

#[allow(unsafe_code, unexpected_cfgs, clippy::all, clippy::pedantic)]
mod wide {
    use uint::construct_uint;

    construct_uint! {
        /// 256-bit unsigned integer, little-endian limbs.
        pub struct U256(4);
    }

    construct_uint! {
        /// 512-bit intermediate for widening multiplication.
        pub struct U512(8);
    }
}

pub use wide::{U256, U512};

fn widen(x: U256) -> U512 {
    let mut limbs = [0u64; 8];
    limbs[..4].copy_from_slice(&x.0);
    U512(limbs)
}

fn narrow(x: U512) -> Result<U256> {
    if x.0[4..].iter().any(|limb| *limb != 0) {
        return Err(NumoError::ArithmeticOverflow);
    }
    Ok(U256([x.0[0], x.0[1], x.0[2], x.0[3]]))
}

fn mul_div_rem(a: U256, b: U256, denom: U256) -> Result<(U512, U512)> {
    if denom.is_zero() {
        return Err(NumoError::DivisionByZero);
    }
    let product = widen(a)
        .checked_mul(widen(b))
        .ok_or(NumoError::ArithmeticOverflow)?;
    Ok(product.div_mod(widen(denom)))
}

/// `floor(a * b / denom)`.
pub fn mul_div_down(a: U256, b: U256, denom: U256) -> Result<U256> {
    let (q, _) = mul_div_rem(a, b, denom)?;
    narrow(q)
}

/// `ceil(a * b / denom)`.
pub fn mul_div_up(a: U256, b: U256, denom: U256) -> Result<U256> {
    let (q, r) = mul_div_rem(a, b, denom)?;
    let q = if r.is_zero() {
        q
    } else {
        q.checked_add(U512::one()).ok_or(NumoError::ArithmeticOverflow)?
    };
    narrow(q)
}

pub fn add_checked(a: U256, b: U256) -> Result<U256> {
    a.checked_add(b).ok_or(NumoError::ArithmeticOverflow)
}

pub fn sub_checked(a: U256, b: U256) -> Result<U256> {
    a.checked_sub(b).ok_or(NumoError::ArithmeticOverflow)
}

pub fn mul_checked(a: U256, b: U256) -> Result<U256> {
    a.checked_mul(b).ok_or(NumoError::ArithmeticOverflow)
}

/// `a % b`, with a zero modulus reported as [`NumoError::DivisionByZero`].
pub fn rem_checked(a: U256, b: U256) -> Result<U256> {
    a.checked_rem(b).ok_or(NumoError::DivisionByZero)
}

/// Big-endian 32-byte image.
#[must_use]
pub fn u256_to_be(v: U256) -> [u8; 32] {
    let mut out = [0u8; 32];
    v.to_big_endian(&mut out);
    out
}

#[must_use]
pub fn u256_from_be(bytes: &[u8; 32]) -> U256 {
    U256::from_big_endian(bytes)
}

/// `#[serde(with = "serde_u256")]`: `0x` hex strings, decimal accepted on input.
pub mod serde_u256 {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::U256;

    pub fn serialize<S>(v: &U256, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(&format!("0x{v:x}"))
    }

    pub fn deserialize<'de, D>(d: D) -> Result<U256, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(d)?;
        match s.strip_prefix("0x") {
            Some(digits) => U256::from_str_radix(digits, 16).map_err(serde::de::Error::custom),
            None => U256::from_dec_str(&s).map_err(serde::de::Error::custom),
        }
    }
}
