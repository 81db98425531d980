//! Common money helpers shared by the calculators.
//!
//! Money is carried as [`Decimal`] throughout; these helpers pin down the
//! rounding convention and the clamping applied to noisy inputs.

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// Values at exactly 0.005 are rounded away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Returns the maximum of two decimal values.
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}

/// Clamps a money amount to be non-negative.
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::clamp_money;
///
/// assert_eq!(clamp_money(dec!(-42.10)), dec!(0));
/// assert_eq!(clamp_money(dec!(42.10)), dec!(42.10));
/// ```
pub fn clamp_money(value: Decimal) -> Decimal {
    max(value, Decimal::ZERO)
}

/// Converts a floating-point amount into money.
///
/// NaN, infinities, negatives and values too large for [`Decimal`] all
/// become zero, and the result is rounded to two places.
pub fn money_from_f64(value: f64) -> Decimal {
    if !value.is_finite() || value <= 0.0 {
        return Decimal::ZERO;
    }
    Decimal::from_f64(value)
        .map(round_half_up)
        .unwrap_or(Decimal::ZERO)
}

/// `percent` percent of `amount`, rounded to two places.
pub fn percent_of(
    amount: Decimal,
    percent: Decimal,
) -> Decimal {
    round_half_up(amount * percent / Decimal::ONE_HUNDRED)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // round_half_up tests
    // =========================================================================

    #[test]
    fn round_half_up_rounds_down_below_midpoint() {
        assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
    }

    #[test]
    fn round_half_up_rounds_up_at_midpoint() {
        assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
    }

    #[test]
    fn round_half_up_handles_large_values() {
        assert_eq!(round_half_up(dec!(999999.999)), dec!(1000000.00));
    }

    // =========================================================================
    // clamp_money / money_from_f64 tests
    // =========================================================================

    #[test]
    fn clamp_money_zeroes_negative_amounts() {
        assert_eq!(clamp_money(dec!(-0.01)), dec!(0));
    }

    #[test]
    fn money_from_f64_rejects_non_finite_values() {
        assert_eq!(money_from_f64(f64::NAN), dec!(0));
        assert_eq!(money_from_f64(f64::INFINITY), dec!(0));
        assert_eq!(money_from_f64(f64::NEG_INFINITY), dec!(0));
    }

    #[test]
    fn money_from_f64_clamps_negative_values() {
        assert_eq!(money_from_f64(-1500.0), dec!(0));
    }

    #[test]
    fn money_from_f64_rounds_to_paise() {
        assert_eq!(money_from_f64(84500.256), dec!(84500.26));
    }

    #[test]
    fn money_from_f64_rejects_values_beyond_decimal_range() {
        assert_eq!(money_from_f64(1e40), dec!(0));
    }

    // =========================================================================
    // percent_of tests
    // =========================================================================

    #[test]
    fn percent_of_applies_percentage() {
        assert_eq!(percent_of(dec!(22500), dec!(4)), dec!(900.00));
    }

    #[test]
    fn percent_of_rounds_result() {
        assert_eq!(percent_of(dec!(333.33), dec!(5)), dec!(16.67));
    }
}
