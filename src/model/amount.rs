//! Amount type for debt totals, balances and ledger entries.
//!
//! This module provides the `Amount` type which wraps `Decimal`. On the wire an amount is a plain
//! JSON number, on the command line it is typed by a person and may carry thousands separators.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// Represents an amount of money owed or paid.
///
/// Arithmetic is exact so that a debt's history can be replayed to reproduce its balance.
///
/// # Examples
///
/// Parsing with thousands separators:
/// ```
/// # use debt_ledger::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("1,250.50").unwrap();
/// assert_eq!(amount.to_string(), "1,250.50");
/// ```
///
/// Amounts are written to JSON as numbers:
/// ```
/// # use debt_ledger::model::Amount;
/// let amount = Amount::from(300);
/// assert_eq!(serde_json::to_string(&amount).unwrap(), "300");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// Creates a new Amount from a Decimal value.
    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the amount is strictly greater than zero.
    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.0.is_sign_positive()
    }

    /// Returns true if the amount is strictly less than zero.
    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.0.is_sign_negative()
    }

    /// `self + rhs`, or `None` when the result is out of range.
    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    /// `self - rhs`, or `None` when the result is out of range.
    pub fn checked_sub(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_sub(rhs.0).map(Amount)
    }

    /// Adds up `amounts`, or `None` when any partial sum is out of range.
    pub fn checked_sum<I>(amounts: I) -> Option<Amount>
    where
        I: IntoIterator<Item = Amount>,
    {
        amounts
            .into_iter()
            .try_fold(Amount::ZERO, |acc, a| acc.checked_add(a))
    }
}

/// An error that can occur when parsing strings into `Amount` values.
pub struct AmountError(rust_decimal::Error);

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Thousands separators are tolerated, e.g. "1,000.00"
        let cleaned = s.trim().replace(',', "");
        let value = Decimal::from_str(&cleaned).map_err(AmountError)?;
        Ok(Amount(value.normalize()))
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let (sign, num) = if self.is_negative() {
            ("-", self.0.abs())
        } else {
            ("", self.0)
        };
        write!(
            f,
            "{sign}{}",
            format_num::format_num!(",.2", num.to_f64().unwrap_or_default())
        )
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Whole numbers go out as integers so that `1000` does not become `1000.0`
        if self.0.fract().is_zero() {
            if let Some(i) = self.0.to_i64() {
                return serializer.serialize_i64(i);
            }
        }
        serializer.serialize_f64(self.0.to_f64().unwrap_or_default())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(AmountVisitor)
    }
}

struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("a number or a numeric string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Amount(Decimal::from(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Amount(Decimal::from(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        // The shortest round-trip text of the float is the value the server meant, e.g. 0.1
        Decimal::from_str(&v.to_string())
            .or_else(|_| {
                Decimal::from_f64(v).ok_or(rust_decimal::Error::ExceedsMaximumPossibleValue)
            })
            .map(|d| Amount(d.normalize()))
            .map_err(|e| E::custom(format!("invalid amount {v}: {e}")))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Amount::from_str(v).map_err(E::custom)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Amount(Decimal::from(value))
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain() {
        let amount = Amount::from_str("50.00").unwrap();
        assert_eq!(amount.value(), Decimal::from(50));
    }

    #[test]
    fn test_parse_with_commas() {
        let amount = Amount::from_str("1,234,567.89").unwrap();
        assert_eq!(amount.value(), Decimal::from_str("1234567.89").unwrap());
    }

    #[test]
    fn test_parse_whitespace() {
        let amount = Amount::from_str("  300  ").unwrap();
        assert_eq!(amount, Amount::from(300));
    }

    #[test]
    fn test_parse_garbage() {
        assert!(Amount::from_str("three hundred").is_err());
        assert!(Amount::from_str("").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Amount::from(1000).to_string(), "1,000.00");
        assert_eq!(Amount::from(-5).to_string(), "-5.00");
        assert_eq!(Amount::ZERO.to_string(), "0.00");
    }

    #[test]
    fn test_serialize_integral_as_integer() {
        let json = serde_json::to_string(&Amount::from_str("700.00").unwrap()).unwrap();
        assert_eq!(json, "700");
    }

    #[test]
    fn test_serialize_fraction() {
        let json = serde_json::to_string(&Amount::from_str("12.5").unwrap()).unwrap();
        assert_eq!(json, "12.5");
    }

    #[test]
    fn test_deserialize_number_forms() {
        let a: Amount = serde_json::from_str("1000").unwrap();
        assert_eq!(a, Amount::from(1000));
        let b: Amount = serde_json::from_str("0.1").unwrap();
        assert_eq!(b.value(), Decimal::from_str("0.1").unwrap());
        let c: Amount = serde_json::from_str("\"42.25\"").unwrap();
        assert_eq!(c.value(), Decimal::from_str("42.25").unwrap());
    }

    #[test]
    fn test_deserialize_rejects_non_numbers() {
        assert!(serde_json::from_str::<Amount>("true").is_err());
        assert!(serde_json::from_str::<Amount>("\"abc\"").is_err());
    }

    #[test]
    fn test_float_sums_are_exact() {
        let a: Amount = serde_json::from_str("0.1").unwrap();
        let b: Amount = serde_json::from_str("0.2").unwrap();
        assert_eq!(a.checked_add(b), Some(Amount::from_str("0.3").unwrap()));
    }

    #[test]
    fn test_sign_checks() {
        assert!(Amount::from(5).is_positive());
        assert!(!Amount::ZERO.is_positive());
        assert!(!Amount::ZERO.is_negative());
        assert!(Amount::from(-1).is_negative());
    }

    #[test]
    fn test_checked_sum() {
        let total = Amount::checked_sum([Amount::from(1), Amount::from(2), Amount::from(3)]);
        assert_eq!(total, Some(Amount::from(6)));
        assert_eq!(Amount::checked_sum(Vec::new()), Some(Amount::ZERO));
    }

    #[test]
    fn test_checked_arithmetic_overflow() {
        let max = Amount::new(Decimal::MAX);
        assert_eq!(max.checked_add(Amount::from(1)), None);
        assert_eq!(Amount::new(Decimal::MIN).checked_sub(Amount::from(1)), None);
        assert_eq!(Amount::checked_sum([max, Amount::from(1)]), None);
        assert_eq!(
            Amount::from(5).checked_sub(Amount::from(8)),
            Some(Amount::from(-3))
        );
    }
}
