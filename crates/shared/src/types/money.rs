//! Peso amounts with decimal precision.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! `Amount` wraps `rust_decimal::Decimal` and can never be negative; the
//! direction of a posting (charge or payment) is carried separately.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced when constructing an [`Amount`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    /// The value was below zero.
    #[error("amount must not be negative (got {0})")]
    Negative(Decimal),
}

/// A non-negative peso amount.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    /// Zero pesos.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Creates an amount, rejecting negative values.
    ///
    /// # Errors
    ///
    /// Returns `AmountError::Negative` when `value < 0`.
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(AmountError::Negative(value));
        }
        Ok(Self(value.normalize()))
    }

    /// Builds an amount from the magnitude of a signed value.
    #[must_use]
    pub fn from_magnitude(value: Decimal) -> Self {
        Self(value.abs().normalize())
    }

    /// Returns the inner decimal value.
    #[must_use]
    pub const fn value(self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    /// Formats the amount the way receipts and exports print pesos, e.g. `₱1,250.00`.
    #[must_use]
    pub fn format_peso(self) -> String {
        format_peso(self.0)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = AmountError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.round_dp(2))
    }
}

/// Formats any signed decimal as pesos with thousands separators and two decimals.
#[must_use]
pub fn format_peso(value: Decimal) -> String {
    let rounded = value.round_dp(2);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = format!("{:.2}", rounded.abs());
    let (whole, frac) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    format!("{sign}₱{grouped}.{frac}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amount_rejects_negative() {
        assert_eq!(
            Amount::new(dec!(-0.01)),
            Err(AmountError::Negative(dec!(-0.01)))
        );
        assert!(Amount::new(Decimal::ZERO).unwrap().is_zero());
    }

    #[test]
    fn test_amount_from_magnitude_drops_sign() {
        assert_eq!(Amount::from_magnitude(dec!(-150)).value(), dec!(150));
    }

    #[test]
    fn test_amount_equality_ignores_scale() {
        assert_eq!(Amount::new(dec!(150.00)).unwrap(), Amount::new(dec!(150)).unwrap());
    }

    #[test]
    fn test_amount_deserialize_rejects_negative() {
        assert!(serde_json::from_str::<Amount>("\"-5\"").is_err());
        let ok: Amount = serde_json::from_str("\"12.50\"").unwrap();
        assert_eq!(ok.value(), dec!(12.5));
    }

    #[rstest]
    #[case(dec!(0), "₱0.00")]
    #[case(dec!(150), "₱150.00")]
    #[case(dec!(1250.5), "₱1,250.50")]
    #[case(dec!(1234567.891), "₱1,234,567.89")]
    #[case(dec!(-300), "-₱300.00")]
    fn test_format_peso(#[case] value: Decimal, #[case] expected: &str) {
        assert_eq!(format_peso(value), expected);
    }
}
