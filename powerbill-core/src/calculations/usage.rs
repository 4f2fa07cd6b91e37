//! Validation of monthly usage input before it reaches the billing engine.

use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UsageError {
    #[error("usage '{0}' is not a number")]
    NotANumber(String),

    #[error("usage must be greater than zero, got {0}")]
    NotPositive(Decimal),

    #[error("usage must not exceed {max} kWh, got {0}", max = MAX_USAGE_KWH)]
    TooLarge(Decimal),
}

/// Largest monthly usage accepted, in kWh.
pub const MAX_USAGE_KWH: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Parses a usage value in kWh as typed by a user.
///
/// # Errors
///
/// * [`UsageError::NotANumber`] if the input is empty or not a decimal.
/// * [`UsageError::NotPositive`] if the value is zero or negative.
/// * [`UsageError::TooLarge`] if the value exceeds [`MAX_USAGE_KWH`].
pub fn parse_usage(input: &str) -> Result<Decimal, UsageError> {
    let trimmed = input.trim();
    let usage = Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| UsageError::NotANumber(trimmed.to_string()))?;
    validate_usage(usage)
}

/// Rejects zero, negative and implausibly large usage.
pub fn validate_usage(usage_kwh: Decimal) -> Result<Decimal, UsageError> {
    if usage_kwh <= Decimal::ZERO {
        return Err(UsageError::NotPositive(usage_kwh));
    }
    if usage_kwh > MAX_USAGE_KWH {
        return Err(UsageError::TooLarge(usage_kwh));
    }
    Ok(usage_kwh)
}
