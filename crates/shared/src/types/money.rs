//! Decimal money helpers.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts are `rust_decimal::Decimal` end to end; floats only appear at the
//! JSON boundary, after rounding, via [`serde_amount`].

use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Number of decimal places used when presenting monetary amounts.
pub const MONEY_SCALE: u32 = 2;

/// Decimal places kept by `NUMERIC(19, 4)` amount columns.
pub const STORAGE_SCALE: u32 = 4;

/// Integer digits kept by `NUMERIC(19, 4)` amount columns.
const STORAGE_INTEGER_DIGITS: u32 = 15;

/// Returns true if the amount fits an amount column exactly.
///
/// `|amount| < 10^15` with at most four significant decimal places.
#[must_use]
pub fn is_storable(amount: Decimal) -> bool {
    amount.normalize().scale() <= STORAGE_SCALE
        && amount.abs() < Decimal::from(10_i64.pow(STORAGE_INTEGER_DIGITS))
}

/// Validator for request amounts that must be stored without rounding.
///
/// # Errors
///
/// Returns an `amount_range` error for amounts outside the storable range.
pub fn validate_amount(amount: &Decimal) -> Result<(), validator::ValidationError> {
    if is_storable(*amount) {
        Ok(())
    } else {
        let mut err = validator::ValidationError::new("amount_range");
        err.message = Some("must be below 10^15 with at most 4 decimal places".into());
        Err(err)
    }
}

/// Rounds an amount to two decimal places, half away from zero.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// The smallest monetary difference treated as significant.
///
/// The ledger compares totals exactly, so this is a business rule rather than
/// a rounding workaround: one cent (0.01) by convention. Two figures whose
/// difference is strictly below the tolerance are considered equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tolerance(Decimal);

impl Tolerance {
    /// One cent.
    pub const CENT: Self = Self(Decimal::from_parts(1, 0, 0, false, 2));

    /// Creates a tolerance from a non-negative amount.
    ///
    /// Returns `None` for negative values.
    #[must_use]
    pub fn new(value: Decimal) -> Option<Self> {
        if value.is_sign_negative() && !value.is_zero() {
            None
        } else {
            Some(Self(value))
        }
    }

    /// Returns the underlying amount.
    #[must_use]
    pub const fn value(self) -> Decimal {
        self.0
    }

    /// Returns true if `|difference| < tolerance`.
    #[must_use]
    pub fn is_negligible(self, difference: Decimal) -> bool {
        difference.abs() < self.0
    }

    /// Returns true if `|amount| <= tolerance`.
    ///
    /// Used for "zero balance" filtering, where the boundary itself counts as zero.
    #[must_use]
    pub fn is_zero_balance(self, amount: Decimal) -> bool {
        amount.abs() <= self.0
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::CENT
    }
}

impl fmt::Display for Tolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Serializes amounts as JSON numbers rounded to two decimals.
///
/// Deserialization accepts both JSON numbers and numeric strings.
///
/// ```ignore
/// #[serde(with = "tally_shared::types::money::serde_amount")]
/// pub balance: Decimal,
/// ```
pub mod serde_amount {
    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serializes a rounded amount as a number.
    pub fn serialize<S>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        rust_decimal::serde::float::serialize(&super::round_money(*value), serializer)
    }

    /// Deserializes an amount from a number or a numeric string.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        <Decimal as Deserialize>::deserialize(deserializer)
    }
}
