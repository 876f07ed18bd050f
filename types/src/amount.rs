//! Token amount types.
//!
//! Amounts are integers in token base units (1 token = 10^18 base units) to
//! avoid floating-point errors. Both types serialize as decimal strings so
//! values above 2^53 survive JSON consumers that parse numbers as doubles.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

use crate::error::TypesError;

/// Number of decimals in one whole token.
pub const TOKEN_DECIMALS: u32 = 18;

/// A non-negative token amount in base units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenAmount(u128);

impl TokenAmount {
    pub const ZERO: Self = Self(0);

    /// Base units in one whole token.
    pub const ONE_TOKEN: Self = Self(10u128.pow(TOKEN_DECIMALS));

    pub const fn new(raw: u128) -> Self {
        Self(raw)
    }

    /// Whole tokens to base units, saturating.
    pub const fn from_tokens(units: u128) -> Self {
        Self(units.saturating_mul(Self::ONE_TOKEN.0))
    }

    pub const fn raw(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    pub fn saturating_mul(self, factor: u128) -> Self {
        Self(self.0.saturating_mul(factor))
    }
}

impl Add for TokenAmount {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for TokenAmount {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TokenAmount {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u128>()
            .map(Self)
            .map_err(|_| TypesError::InvalidAmount(s.to_string()))
    }
}

impl From<u128> for TokenAmount {
    fn from(raw: u128) -> Self {
        Self(raw)
    }
}

/// A signed allowance balance in base units.
///
/// Negative when more was recorded against an allowance than it held.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Allowance(i128);

impl Allowance {
    pub const ZERO: Self = Self(0);

    pub fn new(raw: i128) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> i128 {
        self.0
    }

    /// True once nothing is left to spend (zero or overdrawn).
    pub fn is_depleted(&self) -> bool {
        self.0 <= 0
    }

    /// Whether `amount` fits in what is left.
    pub fn covers(&self, amount: TokenAmount) -> bool {
        *self >= Self::from(amount)
    }

    pub fn debit(self, amount: TokenAmount) -> Self {
        Self(self.0.saturating_sub(Self::from(amount).0))
    }
}

impl From<TokenAmount> for Allowance {
    /// Saturates at `i128::MAX` for amounts beyond the signed range.
    fn from(amount: TokenAmount) -> Self {
        Self(i128::try_from(amount.raw()).unwrap_or(i128::MAX))
    }
}

impl fmt::Display for Allowance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Allowance {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i128>()
            .map(Self)
            .map_err(|_| TypesError::InvalidAmount(s.to_string()))
    }
}

// ── Decimal-string serde ───────────────────────────────────────────────

impl Serialize for TokenAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TokenAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(UnsignedVisitor).map(Self)
    }
}

impl Serialize for Allowance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Allowance {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(SignedVisitor).map(Self)
    }
}

/// Accepts a non-negative decimal string or a JSON integer.
struct UnsignedVisitor;

impl<'de> serde::de::Visitor<'de> for UnsignedVisitor {
    type Value = u128;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "a non-negative decimal integer string")
    }

    fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.trim()
            .parse::<u128>()
            .map_err(|_| E::custom(format!("invalid token amount: {v}")))
    }

    fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(v as u128)
    }

    fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Self::Value, E> {
        u128::try_from(v).map_err(|_| E::custom("token amount must not be negative"))
    }

    fn visit_u128<E: serde::de::Error>(self, v: u128) -> Result<Self::Value, E> {
        Ok(v)
    }
}

/// Accepts a signed decimal string or a JSON integer.
struct SignedVisitor;

impl<'de> serde::de::Visitor<'de> for SignedVisitor {
    type Value = i128;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "a decimal integer string")
    }

    fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.trim()
            .parse::<i128>()
            .map_err(|_| E::custom(format!("invalid allowance: {v}")))
    }

    fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(v as i128)
    }

    fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(v as i128)
    }

    fn visit_i128<E: serde::de::Error>(self, v: i128) -> Result<Self::Value, E> {
        Ok(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_decimal_string() {
        let amount = TokenAmount::from_tokens(10);
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, "\"10000000000000000000\"");
    }

    #[test]
    fn deserializes_from_string_or_number() {
        let a: TokenAmount = serde_json::from_str("\"42\"").unwrap();
        let b: TokenAmount = serde_json::from_str("42").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn negative_token_amount_rejected() {
        assert!(serde_json::from_str::<TokenAmount>("\"-1\"").is_err());
    }

    #[test]
    fn allowance_can_go_negative() {
        let left = Allowance::from(TokenAmount::new(5)).debit(TokenAmount::new(8));
        assert_eq!(left.raw(), -3);
        assert!(left.is_depleted());
    }

    #[test]
    fn allowance_covers() {
        let left = Allowance::from(TokenAmount::new(7));
        assert!(left.covers(TokenAmount::new(7)));
        assert!(!left.covers(TokenAmount::new(8)));
    }

    #[test]
    fn huge_amount_saturates_into_allowance() {
        let allowance = Allowance::from(TokenAmount::new(u128::MAX));
        assert_eq!(allowance.raw(), i128::MAX);
    }
}
