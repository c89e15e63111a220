//! Type-safe price representation using decimal arithmetic.
//!
//! The catalog API serializes prices as decimal strings (`"99.99"`), while
//! the offline catalog and some envelopes use plain JSON numbers. [`Price`]
//! accepts both and rejects negative amounts at the boundary, so every price
//! inside the storefront satisfies `amount >= 0`.

use core::fmt;
use core::ops::Mul;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative (got {0})")]
    Negative(Decimal),
}

/// A non-negative price in the store currency.
///
/// ## Examples
///
/// ```
/// use rust_decimal::Decimal;
/// use shopnow_core::Price;
///
/// let price = Price::new(Decimal::new(9999, 2)).unwrap();
/// assert_eq!(price.display(), "$99.99");
///
/// assert!(Price::new(Decimal::new(-1, 0)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price, rejecting negative amounts.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `amount < 0`.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self(amount))
    }

    /// Create a price from a whole number of cents.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `cents < 0`.
    pub fn from_cents(cents: i64) -> Result<Self, PriceError> {
        Self::new(Decimal::new(cents, 2))
    }

    /// The exact amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Format for display, rounded half away from zero to cents (e.g. `"$19.99"`).
    #[must_use]
    pub fn display(&self) -> String {
        format_amount(self.0)
    }
}

/// Format a decimal amount as a dollar string with two decimal places.
///
/// Display layers round here; stored values and totals stay exact.
#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("${rounded:.2}")
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl Mul<u32> for Price {
    type Output = Decimal;

    /// Saturates at [`Decimal::MAX`] instead of overflowing.
    fn mul(self, quantity: u32) -> Decimal {
        self.0
            .checked_mul(Decimal::from(quantity))
            .unwrap_or(Decimal::MAX)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_price_accepts_string_and_number() {
        let from_str: Price = serde_json::from_str("\"24.99\"").unwrap();
        let from_num: Price = serde_json::from_str("24.99").unwrap();
        assert_eq!(from_str, from_num);
        assert_eq!(from_str.amount(), Decimal::new(2499, 2));
    }

    #[test]
    fn test_price_rejects_negative() {
        assert_eq!(
            Price::new(Decimal::new(-5, 0)),
            Err(PriceError::Negative(Decimal::new(-5, 0)))
        );
        assert!(serde_json::from_str::<Price>("-1.00").is_err());
    }

    #[test]
    fn test_price_zero_is_valid() {
        assert_eq!(Price::new(Decimal::ZERO).unwrap(), Price::ZERO);
    }

    #[test]
    fn test_price_display_rounds_to_cents() {
        assert_eq!(Price::from_cents(1000).unwrap().display(), "$10.00");
        assert_eq!(format_amount(Decimal::new(10_005, 3)), "$10.01");
        assert_eq!(format_amount(Decimal::new(7, 0)), "$7.00");
    }

    #[test]
    fn test_price_times_quantity() {
        let price = Price::from_cents(500).unwrap();
        assert_eq!(price * 3, Decimal::new(1500, 2));
    }

    #[test]
    fn test_price_times_quantity_saturates() {
        let price = Price::new(Decimal::from_i128_with_scale(100_000_000_000_000_000_000, 0)).unwrap();
        assert_eq!(price * u32::MAX, Decimal::MAX);
    }
}
