//! Common rounding helpers shared by the billing engine and the unit
//! converter.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// Values at exactly 0.005 are rounded away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use powerbill_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46)); // Away from zero
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds `value` down to the nearest multiple of `step`.
///
/// `step` must be positive.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use powerbill_core::calculations::common::floor_to_multiple;
///
/// assert_eq!(floor_to_multiple(dec!(14678), dec!(10)), dec!(14670));
/// assert_eq!(floor_to_multiple(dec!(103301.5), dec!(10)), dec!(103300));
/// ```
pub fn floor_to_multiple(
    value: Decimal,
    step: Decimal,
) -> Decimal {
    (value / step).floor() * step
}
