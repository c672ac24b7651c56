//! Monetary amounts in minimal units (wei).
//!
//! Amounts travel as base-10 strings and are held as 256-bit unsigned
//! integers so on-chain values never pass through a float.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::U256;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// Non-negative amount in minimal currency units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Wei(U256);

impl Wei {
    pub const ZERO: Wei = Wei(U256::ZERO);

    pub fn from_u128(value: u128) -> Self {
        Self(U256::from(value))
    }

    /// Parse a decimal string. Only ASCII digits are accepted; leading
    /// zeros are fine, signs, whitespace, prefixes and overflow are not.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(Error::InvalidAmount("amount cannot be empty".into()));
        }
        if !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidAmount(format!(
                "\"{raw}\" is not a decimal integer"
            )));
        }
        U256::from_str_radix(raw, 10)
            .map(Self)
            .map_err(|e| Error::InvalidAmount(format!("\"{raw}\": {e}")))
    }

    pub fn checked_add(self, other: Wei) -> Result<Wei> {
        self.0
            .checked_add(other.0)
            .map(Wei)
            .ok_or_else(|| Error::InvalidAmount(format!("{self} + {other} overflows")))
    }

    pub fn saturating_sub(self, other: Wei) -> Wei {
        Wei(self.0.saturating_sub(other.0))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Lossy float view, for scoring only.
    pub fn as_f64(&self) -> f64 {
        self.0.to_string().parse().unwrap_or(f64::MAX)
    }
}

impl From<U256> for Wei {
    fn from(value: U256) -> Self {
        Self(value)
    }
}

impl FromStr for Wei {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Wei::parse(s)
    }
}

impl fmt::Display for Wei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Wei {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Wei {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Wei::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_large_amount() {
        let amount = Wei::parse("123456789012345678901234567890").unwrap();
        assert_eq!(amount.to_string(), "123456789012345678901234567890");
    }

    #[test]
    fn test_leading_zeros_accepted() {
        assert_eq!(Wei::parse("0042").unwrap(), Wei::from_u128(42));
    }

    #[test]
    fn test_rejects_non_canonical() {
        for raw in ["", " 1", "1 ", "-1", "+1", "1.5", "1e18", "0x10", "abc"] {
            let err = Wei::parse(raw).unwrap_err();
            assert!(matches!(err, Error::InvalidAmount(_)), "accepted {raw:?}");
        }
    }

    #[test]
    fn test_rejects_overflow() {
        let too_big = format!("{}0", U256::MAX);
        assert!(Wei::parse(&too_big).is_err());
    }

    #[test]
    fn test_checked_add_overflow() {
        let max = Wei::from(U256::MAX);
        assert!(max.checked_add(Wei::from_u128(1)).is_err());
        assert_eq!(
            Wei::from_u128(7).checked_add(Wei::from_u128(5)).unwrap(),
            Wei::from_u128(12)
        );
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&Wei::from_u128(20_000_000_000_000_000)).unwrap();
        assert_eq!(json, "\"20000000000000000\"");
        let back: Wei = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Wei::from_u128(20_000_000_000_000_000));
        assert!(serde_json::from_str::<Wei>("\"-3\"").is_err());
    }
}
