//! Balance and fee-vault entities.
//!
//! Every account has, per asset, an `available` balance (usable for new
//! orders) and a `locked` balance (collateral held by its resting orders).
//! Protocol fees accumulate in a per-asset [`FeeVault`].

use serde::{Deserialize, Serialize};

use crate::error::{NumoError, Result};
use crate::u256::{U256, add_checked, serde_u256};
use crate::wire::{ByteReader, ByteWriter, Decode, Encode, StoredValue};

/// A single balance entry for an (account, asset) pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    /// Available for new orders.
    #[serde(with = "serde_u256")]
    pub available: U256,
    /// Locked by resting or in-flight orders.
    #[serde(with = "serde_u256")]
    pub locked: U256,
}

impl Balance {
    #[must_use]
    pub fn new(available: U256, locked: U256) -> Self {
        Self { available, locked }
    }

    /// `available + locked`, checked.
    pub fn total(&self) -> Result<U256> {
        add_checked(self.available, self.locked)
    }

    /// Enforce the `maxBalance` hard cap.
    pub fn check_cap(&self, cap: U256) -> Result<()> {
        let total = self.total()?;
        if total > cap {
            return Err(NumoError::BalanceCapExceeded { total, cap });
        }
        Ok(())
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.available.is_zero() && self.locked.is_zero()
    }
}

impl Encode for Balance {
    fn encode_to(&self, w: &mut ByteWriter) {
        w.put_u256(self.available);
        w.put_u256(self.locked);
    }
}

impl Decode for Balance {
    fn decode_from(r: &mut ByteReader<'_>) -> Result<Self> {
        Ok(Self {
            available: r.u256()?,
            locked: r.u256()?,
        })
    }
}

impl StoredValue for Balance {
    const ENTITY: &'static str = "balance";
    const LEN: usize = 64;
}

/// Cumulative protocol fees for one asset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeVault {
    #[serde(with = "serde_u256")]
    pub total: U256,
}

impl Encode for FeeVault {
    fn encode_to(&self, w: &mut ByteWriter) {
        w.put_u256(self.total);
    }
}

impl Decode for FeeVault {
    fn decode_from(r: &mut ByteReader<'_>) -> Result<Self> {
        Ok(Self { total: r.u256()? })
    }
}

impl StoredValue for FeeVault {
    const ENTITY: &'static str = "fee vault";
    const LEN: usize = 32;
}

/// Next expected nonce of an account (absent reads as zero).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Nonce(pub u64);

impl Encode for Nonce {
    fn encode_to(&self, w: &mut ByteWriter) {
        w.put_u64(self.0);
    }
}

impl Decode for Nonce {
    fn decode_from(r: &mut ByteReader<'_>) -> Result<Self> {
        Ok(Self(r.u64()?))
    }
}

impl StoredValue for Nonce {
    const ENTITY: &'static str = "nonce";
    const LEN: usize = 8;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balance_default_is_zero() {
        let b = Balance::default();
        assert!(b.is_zero());
        assert_eq!(b.total().unwrap(), U256::zero());
    }

    #[test]
    fn balance_cap_is_inclusive() {
        let b = Balance::new(U256::from(60u64), U256::from(40u64));
        assert!(b.check_cap(U256::from(100u64)).is_ok());
        assert_eq!(
            b.check_cap(U256::from(99u64)),
            Err(NumoError::BalanceCapExceeded {
                total: U256::from(100u64),
                cap: U256::from(99u64)
            })
        );
    }

    #[test]
    fn balance_total_overflow_is_an_error() {
        let b = Balance::new(U256::MAX, U256::one());
        assert_eq!(b.total(), Err(NumoError::ArithmeticOverflow));
    }

    #[test]
    fn stored_layouts() {
        let b = Balance::new(U256::from(1u64), U256::from(2u64));
        let bytes = b.to_bytes();
        assert_eq!(bytes.len(), Balance::LEN);
        assert_eq!(bytes[31], 1);
        assert_eq!(bytes[63], 2);
        assert_eq!(Balance::from_stored(&bytes).unwrap(), b);

        let n = Nonce(7);
        assert_eq!(Nonce::from_stored(&n.to_bytes()).unwrap(), n);
        let v = FeeVault {
            total: U256::from(9u64),
        };
        assert_eq!(FeeVault::from_stored(&v.to_bytes()).unwrap(), v);
    }

    #[test]
    fn wrong_length_is_rejected() {
        let err = Balance::from_stored(&[0u8; 63]).unwrap_err();
        assert_eq!(err.code(), 104);
        assert!(Nonce::from_stored(&[0u8; 9]).is_err());
    }
}
