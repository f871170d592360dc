//! Non-negative product price backed by decimal arithmetic.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Price`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum PriceError {
    /// The input is not a decimal number.
    #[error("price must be a number")]
    NotANumber,
    /// The amount is below zero.
    #[error("price cannot be negative")]
    Negative,
}

/// A product price.
///
/// Amounts are decimal (never floating point) and guaranteed non-negative
/// at construction. Stored as `NUMERIC(10,2)` in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a `Price` from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if the amount is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        Ok(Self(amount))
    }

    /// Parse a `Price` from user input such as `"25"` or `"19.99"`.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::NotANumber`] if the input doesn't parse,
    /// or [`PriceError::Negative`] for negative amounts.
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let amount: Decimal = s.trim().parse().map_err(|_| PriceError::NotANumber)?;
        Self::new(amount)
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Format for display, e.g. `"$19.99"`.
    #[must_use]
    pub fn display(&self) -> String {
        format!("${:.2}", self.0)
    }

    /// Sum an iterator of prices. Non-negativity is closed under addition.
    #[must_use]
    pub fn total<I: IntoIterator<Item = Self>>(prices: I) -> Self {
        Self(prices.into_iter().map(|p| p.0).sum())
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

// SQLx support (with postgres feature): delegate to Decimal / NUMERIC.
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are constrained non-negative by CHECK
        Ok(Self(amount))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert_eq!(Price::parse("19.99").unwrap().display(), "$19.99");
        assert_eq!(Price::parse("0").unwrap(), Price::ZERO);
        assert_eq!(Price::parse(" 120.00 ").unwrap().display(), "$120.00");
    }

    #[test]
    fn test_parse_negative() {
        assert!(matches!(Price::parse("-1"), Err(PriceError::Negative)));
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(
            Price::parse("free"),
            Err(PriceError::NotANumber)
        ));
    }

    #[test]
    fn test_total() {
        let prices = vec![
            Price::parse("120.00").unwrap(),
            Price::parse("25.00").unwrap(),
            Price::parse("10.00").unwrap(),
        ];
        assert_eq!(Price::total(prices).display(), "$155.00");
    }

    #[test]
    fn test_serde_transparent() {
        let price = Price::parse("50.00").unwrap();
        let json = serde_json::to_string(&price).unwrap();
        let back: Price = serde_json::from_str(&json).unwrap();
        assert_eq!(back, price);
    }
}
