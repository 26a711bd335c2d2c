//! Type-safe unit price using decimal arithmetic.
//!
//! Prices are non-negative amounts in the store's single currency. They are
//! stored as `Decimal` so that line totals do not accumulate floating point
//! error, but serialize as plain JSON numbers so persisted snapshots keep the
//! `{ "price": 19.99 }` shape.

use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative (got {0})")]
    Negative(Decimal),
    /// The input is not a number.
    #[error("price must be a number (got {0:?})")]
    NotANumber(String),
}

/// A non-negative unit price.
///
/// ```
/// use legora_core::Price;
/// use rust_decimal::Decimal;
///
/// let price = Price::new(Decimal::new(1999, 2)).unwrap();
/// assert_eq!(price.line_total(3), Decimal::new(5997, 2));
/// assert!(Price::new(Decimal::new(-1, 0)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `amount` is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self(amount.normalize()))
    }

    /// Create a price from an amount in minor units (e.g. cents).
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `cents` is below zero.
    pub fn from_cents(cents: i64) -> Result<Self, PriceError> {
        Self::new(Decimal::new(cents, 2))
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price of `qty` units. Saturates at `Decimal::MAX`.
    #[must_use]
    pub fn line_total(&self, qty: u32) -> Decimal {
        self.0
            .checked_mul(Decimal::from(qty))
            .unwrap_or(Decimal::MAX)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = Decimal::from_str(s.trim())
            .map_err(|_| PriceError::NotANumber(s.to_owned()))?;
        Self::new(amount)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let value = self
            .0
            .to_f64()
            .ok_or_else(|| serde::ser::Error::custom("price out of f64 range"))?;
        serializer.serialize_f64(value)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = <Decimal as Deserialize>::deserialize(deserializer)?;
        Self::new(amount).map_err(serde::de::Error::custom)
    }
}

/// Parse a price from product display text such as `"$1,299.00"`.
///
/// Everything except ASCII digits and `.` is discarded before parsing.
/// Text that still fails to parse yields [`Price::ZERO`], which is how the
/// add-to-cart button treats unreadable display prices.
#[must_use]
pub fn parse_display_price(input: &str) -> Price {
    let digits: String = input
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if digits.is_empty() {
        return Price::ZERO;
    }
    Decimal::from_str(&digits)
        .ok()
        .and_then(|amount| Price::new(amount).ok())
        .unwrap_or(Price::ZERO)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_negative() {
        let err = Price::new(Decimal::new(-5, 1)).unwrap_err();
        assert!(matches!(err, PriceError::Negative(_)));
    }

    #[test]
    fn test_accepts_zero() {
        assert_eq!(Price::new(Decimal::ZERO).unwrap(), Price::ZERO);
    }

    #[test]
    fn test_serializes_as_number() {
        let price = Price::from_cents(1999).unwrap();
        assert_eq!(serde_json::to_string(&price).unwrap(), "19.99");
    }

    #[test]
    fn test_deserializes_number_and_string() {
        let from_number: Price = serde_json::from_str("19.99").unwrap();
        let from_string: Price = serde_json::from_str("\"19.99\"").unwrap();
        assert_eq!(from_number, Price::from_cents(1999).unwrap());
        assert_eq!(from_string, from_number);
    }

    #[test]
    fn test_deserialize_rejects_negative() {
        assert!(serde_json::from_str::<Price>("-3").is_err());
    }

    #[test]
    fn test_line_total() {
        let price = Price::from_cents(250).unwrap();
        assert_eq!(price.line_total(4), Decimal::new(10, 0));
        assert_eq!(price.line_total(0), Decimal::ZERO);
    }

    #[test]
    fn test_from_str() {
        assert_eq!(" 12.5 ".parse::<Price>().unwrap(), Price::from_cents(1250).unwrap());
        assert!(matches!(
            "abc".parse::<Price>(),
            Err(PriceError::NotANumber(_))
        ));
    }

    #[test]
    fn test_parse_display_price() {
        assert_eq!(parse_display_price("$1,299.00"), Price::from_cents(129_900).unwrap());
        assert_eq!(parse_display_price("PKR 450"), Price::from_cents(45_000).unwrap());
        assert_eq!(parse_display_price("free"), Price::ZERO);
        assert_eq!(parse_display_price("1.2.3"), Price::ZERO);
    }

    #[test]
    fn test_display_two_decimals() {
        assert_eq!(Price::from_cents(500).unwrap().to_string(), "5.00");
    }
}
