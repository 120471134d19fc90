//! Conversion between major-unit decimal strings and integer minor units.
//!
//! All monetary amounts crossing the HTTP boundary are decimal strings in
//! major units (`"1.00"` = one euro). Internally the ledger works in integer
//! minor units only, so the conversion multiplies by 100 and rounds to the
//! nearest integer (midpoint away from zero). Inputs with at most two
//! fractional digits convert exactly.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

/// Errors produced when a boundary amount cannot be converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AmountError {
    /// The input is not a finite decimal number.
    #[error("amount is not a valid decimal number")]
    Invalid,

    /// The input parsed but is zero or negative.
    #[error("amount must be greater than zero")]
    NotPositive,

    /// The input is too large to represent in minor units.
    #[error("amount is out of range")]
    OutOfRange,
}

/// Parse a major-unit decimal string into minor units.
///
/// Rejects anything that is not a finite positive number; never silently
/// truncates. Inputs with more than two fractional digits are rounded to the
/// nearest minor unit, away from zero on the midpoint.
pub fn to_minor_units(input: &str) -> Result<i64, AmountError> {
    let major = Decimal::from_str_exact(input.trim()).map_err(|_| AmountError::Invalid)?;
    if major <= Decimal::ZERO {
        return Err(AmountError::NotPositive);
    }
    let minor = (major * Decimal::from(100))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    minor.to_i64().ok_or(AmountError::OutOfRange)
}

/// Render minor units as a major-unit decimal string with two fractional
/// digits (`150` → `"1.50"`).
pub fn to_major_units(minor_units: i64) -> String {
    Decimal::new(minor_units, 2).to_string()
}
