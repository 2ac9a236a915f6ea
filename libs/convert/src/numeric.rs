//! Bridges between exact rationals and `rust_decimal::Decimal`.

use crate::error::{Error, Result};
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use rust_decimal::Decimal;

/// Largest scale a `Decimal` can carry.
const MAX_DECIMAL_SCALE: u32 = 28;

pub fn decimal_to_rational(value: Decimal) -> BigRational {
    let mantissa = BigInt::from(value.mantissa());
    let denom = num_traits::pow(BigInt::from(10u8), value.scale() as usize);
    BigRational::new(mantissa, denom)
}

/// Converts back to a `Decimal` only when no digit is lost.
pub fn rational_to_decimal(value: &BigRational) -> Result<Decimal> {
    let scale = terminating_scale(value.denom())
        .ok_or_else(|| Error::Inexact(format!("{value} has no finite decimal expansion")))?;
    if scale > MAX_DECIMAL_SCALE {
        return Err(Error::Inexact(format!(
            "{value} needs {scale} fractional digits"
        )));
    }
    let mantissa = scaled_numerator(value, scale)
        .to_i128()
        .ok_or(Error::Overflow)?;
    Decimal::try_from_i128_with_scale(mantissa, scale).map_err(|_| Error::Overflow)
}

/// Renders an exact rational as a plain decimal literal (`273.15`, `-2`, `0.125`).
///
/// Returns `None` when the value has no terminating decimal expansion.
pub fn format_rational(value: &BigRational) -> Option<String> {
    let scale = terminating_scale(value.denom())? as usize;
    let digits = scaled_numerator(value, scale as u32).abs().to_string();
    let sign = if value.is_negative() { "-" } else { "" };
    if scale == 0 {
        return Some(format!("{sign}{digits}"));
    }
    let padded = format!("{digits:0>width$}", width = scale + 1);
    let (int_part, frac_part) = padded.split_at(padded.len() - scale);
    Some(format!("{sign}{int_part}.{frac_part}"))
}

/// Smallest `k` with `denom | 10^k`, if any.
fn terminating_scale(denom: &BigInt) -> Option<u32> {
    let two = BigInt::from(2u8);
    let five = BigInt::from(5u8);
    let mut rest = denom.abs();
    let mut twos = 0u32;
    let mut fives = 0u32;
    while !rest.is_zero() && rest.is_multiple_of(&two) {
        rest /= &two;
        twos += 1;
    }
    while !rest.is_zero() && rest.is_multiple_of(&five) {
        rest /= &five;
        fives += 1;
    }
    rest.is_one().then_some(twos.max(fives))
}

fn scaled_numerator(value: &BigRational, scale: u32) -> BigInt {
    let factor = num_traits::pow(BigInt::from(10u8), scale as usize);
    value.numer() * (factor / value.denom())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn ratio(n: i64, d: i64) -> BigRational {
        BigRational::new(BigInt::from(n), BigInt::from(d))
    }

    #[test]
    fn decimal_round_trips_through_rational() {
        let d = Decimal::from_str("273.15").unwrap();
        let r = decimal_to_rational(d);
        assert_eq!(r, ratio(5463, 20));
        assert_eq!(rational_to_decimal(&r).unwrap(), d);
    }

    #[test]
    fn repeating_fraction_is_inexact() {
        assert!(matches!(
            rational_to_decimal(&ratio(1, 3)),
            Err(Error::Inexact(_))
        ));
    }

    #[test]
    fn formats_terminating_fractions() {
        assert_eq!(format_rational(&ratio(5463, 20)).as_deref(), Some("273.15"));
        assert_eq!(format_rational(&ratio(-1, 8)).as_deref(), Some("-0.125"));
        assert_eq!(format_rational(&ratio(42, 1)).as_deref(), Some("42"));
        assert_eq!(format_rational(&ratio(2, 3)), None);
    }
}
