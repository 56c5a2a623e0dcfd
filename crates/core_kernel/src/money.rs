//! VND amounts and percentage rates
//!
//! The dong has no minor unit, so amounts are whole numbers held in an `i64`.
//! Operator input is kept as [`AmountText`] until it is validated, so a bad
//! entry can be shown back and rejected instead of being silently coerced.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during money operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Amount is empty")]
    Empty,

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Amount must not be negative: {0}")]
    Negative(String),

    #[error("Invalid rate: {0}")]
    InvalidRate(String),

    #[error("Overflow during calculation")]
    Overflow,
}

/// A whole amount of Vietnamese dong
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Vnd(i64);

impl Vnd {
    pub const ZERO: Vnd = Vnd(0);

    pub fn new(amount: i64) -> Self {
        Self(amount)
    }

    pub fn amount(&self) -> i64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Vnd) -> Result<Vnd, MoneyError> {
        self.0.checked_add(other.0).map(Vnd).ok_or(MoneyError::Overflow)
    }

    pub fn checked_sub(self, other: Vnd) -> Result<Vnd, MoneyError> {
        self.0.checked_sub(other.0).map(Vnd).ok_or(MoneyError::Overflow)
    }

    /// Parses a non-negative whole amount made of ASCII digits only.
    pub fn parse_strict(input: &str) -> Result<Vnd, MoneyError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(MoneyError::Empty);
        }
        if let Some(rest) = trimmed.strip_prefix('-') {
            if !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()) {
                return Err(MoneyError::Negative(trimmed.to_string()));
            }
        }
        if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(MoneyError::InvalidAmount(trimmed.to_string()));
        }
        trimmed.parse::<i64>().map(Vnd).map_err(|_| MoneyError::Overflow)
    }

    /// Parses for aggregation. Thousands separators are ignored, fractions
    /// are truncated, and anything unparseable counts as zero.
    pub fn parse_lenient(input: &str) -> Vnd {
        let cleaned: String = input
            .chars()
            .filter(|c| *c != ',' && !c.is_whitespace())
            .collect();
        Decimal::from_str(&cleaned)
            .ok()
            .and_then(|d| d.trunc().to_i64())
            .map(Vnd)
            .unwrap_or(Vnd::ZERO)
    }
}

impl fmt::Display for Vnd {
    /// Vietnamese grouping, e.g. `1.234.567 ₫`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{} ₫", sign, group_thousands(self.0.unsigned_abs()))
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

impl Add for Vnd {
    type Output = Vnd;

    fn add(self, other: Vnd) -> Vnd {
        Vnd(self.0.saturating_add(other.0))
    }
}

impl Sub for Vnd {
    type Output = Vnd;

    fn sub(self, other: Vnd) -> Vnd {
        Vnd(self.0.saturating_sub(other.0))
    }
}

impl Sum for Vnd {
    fn sum<I: Iterator<Item = Vnd>>(iter: I) -> Vnd {
        iter.fold(Vnd::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Vnd> for Vnd {
    fn sum<I: Iterator<Item = &'a Vnd>>(iter: I) -> Vnd {
        iter.copied().sum()
    }
}

/// A fractional rate between 0 and 1 (e.g. 0.1 for 10%)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Rate(Decimal);

impl Rate {
    pub fn new(value: Decimal) -> Result<Self, MoneyError> {
        if value < Decimal::ZERO || value > Decimal::ONE {
            return Err(MoneyError::InvalidRate(value.to_string()));
        }
        Ok(Self(value))
    }

    /// Creates a rate from a percentage (e.g. 10 for 10%)
    pub fn from_percentage(percentage: Decimal) -> Result<Self, MoneyError> {
        Self::new(percentage / dec!(100))
    }

    /// The flat service fee charged per bill
    pub fn service_fee() -> Self {
        Self(dec!(0.1))
    }

    /// Sender commission, 0.02% of the gross amount
    pub fn sender_commission() -> Self {
        Self(dec!(0.0002))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn as_percentage(&self) -> Decimal {
        self.0 * dec!(100)
    }

    /// Applies the rate and rounds down to a whole dong
    pub fn apply_floor(&self, amount: Vnd) -> Result<Vnd, MoneyError> {
        Decimal::from(amount.amount())
            .checked_mul(self.0)
            .and_then(|product| product.floor().to_i64())
            .map(Vnd)
            .ok_or(MoneyError::Overflow)
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_percentage().normalize())
    }
}

/// An amount exactly as it was entered or received
///
/// The backend sends amounts as numbers, numeric strings or `null`; all of
/// them land here unchanged (numbers are rendered without a fraction when
/// they are whole). `null` and absent become the empty text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct AmountText(String);

impl AmountText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn empty() -> Self {
        Self(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Strict parse; the empty text is `Ok(None)`.
    pub fn parse(&self) -> Result<Option<Vnd>, MoneyError> {
        if self.is_empty() {
            return Ok(None);
        }
        Vnd::parse_strict(&self.0).map(Some)
    }

    pub fn lenient(&self) -> Vnd {
        Vnd::parse_lenient(&self.0)
    }

    /// Amount as the backend stores it: plain digits, or a plain decimal
    /// such as `100000.00` with the fraction dropped. `None` when empty or
    /// not a number.
    pub fn whole(&self) -> Option<Vnd> {
        Self::from_wire(&self.0).parse().ok().flatten()
    }

    /// Text received from the backend. Plain decimals keep their whole part
    /// only; anything else is kept as sent.
    fn from_wire(text: &str) -> AmountText {
        let trimmed = text.trim();
        if trimmed.contains('.') {
            if let Some(whole) = Decimal::from_str(trimmed).ok().and_then(|d| d.trunc().to_i64()) {
                return AmountText(whole.to_string());
            }
        }
        AmountText(text.to_string())
    }

    /// Drops every character that is not an ASCII digit.
    pub fn digits_only(&self) -> AmountText {
        AmountText(self.0.chars().filter(|c| c.is_ascii_digit()).collect())
    }
}

impl fmt::Display for AmountText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AmountText {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for AmountText {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl From<Vnd> for AmountText {
    fn from(amount: Vnd) -> Self {
        Self(amount.amount().to_string())
    }
}

impl Serialize for AmountText {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_empty() {
            serializer.serialize_none()
        } else {
            serializer.serialize_str(self.0.trim())
        }
    }
}

struct AmountTextVisitor;

impl<'de> Visitor<'de> for AmountTextVisitor {
    type Value = AmountText;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an amount as a number, a string or null")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<AmountText, E> {
        Ok(AmountText(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<AmountText, E> {
        Ok(AmountText(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<AmountText, E> {
        if v.is_finite() && v.abs() < i64::MAX as f64 {
            Ok(AmountText((v.trunc() as i64).to_string()))
        } else {
            Ok(AmountText(v.to_string()))
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<AmountText, E> {
        Ok(AmountText::from_wire(v))
    }

    fn visit_none<E: de::Error>(self) -> Result<AmountText, E> {
        Ok(AmountText::empty())
    }

    fn visit_unit<E: de::Error>(self) -> Result<AmountText, E> {
        Ok(AmountText::empty())
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<AmountText, D::Error> {
        deserializer.deserialize_any(AmountTextVisitor)
    }
}

impl<'de> Deserialize<'de> for AmountText {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(AmountTextVisitor)
    }
}

/// Serde helper reading a backend total as [`Vnd`].
///
/// Accepts numbers, numeric strings and `null`; anything unparseable is zero.
pub mod lenient_vnd {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Vnd, serializer: S) -> Result<S::Ok, S::Error> {
        value.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vnd, D::Error> {
        Ok(AmountText::deserialize(deserializer)?.lenient())
    }
}
