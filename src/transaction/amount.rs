//! A fixed-point monetary amount.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::Error;

/// The number of digits after the decimal point that amounts are stored with.
const SCALE: u32 = 2;

/// The total number of digits an amount may have, including the [SCALE] fractional digits.
const PRECISION: u32 = 10;

/// A strictly positive amount of money with exactly two decimal places.
///
/// Amounts are rounded half away from zero to two decimal places and may have
/// at most eight digits before the decimal point. The string form always has
/// two fractional digits, so `"12.5"` is displayed as `"12.50"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(Decimal);

impl Amount {
    /// Create an amount from a decimal value.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidAmount] if `value` rounds to zero or less, or
    /// if it does not fit in ten digits with two decimal places.
    pub fn new(value: Decimal) -> Result<Self, Error> {
        let mut rounded = value.round_dp_with_strategy(SCALE, RoundingStrategy::MidpointAwayFromZero);

        if rounded <= Decimal::ZERO || rounded > Self::max_value() {
            return Err(Error::InvalidAmount(value.to_string()));
        }

        rounded.rescale(SCALE);

        Ok(Self(rounded))
    }

    /// The amount as a decimal number.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    fn max_value() -> Decimal {
        let max_mantissa = 10_i64.pow(PRECISION) - 1;
        Decimal::new(max_mantissa, SCALE)
    }
}

impl FromStr for Amount {
    type Err = Error;

    /// Parse an amount from plain (`"12.50"`) or scientific (`"1.25e1"`) notation.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();

        let value = Decimal::from_str(text)
            .or_else(|_| Decimal::from_scientific(text))
            .map_err(|_| Error::InvalidAmount(s.to_owned()))?;

        Amount::new(value).map_err(|_| Error::InvalidAmount(s.to_owned()))
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;

        text.parse().map_err(serde::de::Error::custom)
    }
}

impl ToSql for Amount {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0.to_string()))
    }
}

impl FromSql for Amount {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;

        Decimal::from_str(text)
            .map(Amount)
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}
