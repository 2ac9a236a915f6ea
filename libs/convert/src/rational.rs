use crate::error::{Error, Result};
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use std::fmt;

/// Largest magnitude, in bits, that [`RationalConverter::pow`] may produce.
const MAX_POWER_BITS: u64 = 4096;

/// Exact scaling `x * dividend / divisor` over arbitrary-precision integers.
///
/// Invariants: `divisor > 0`, `dividend != 0`, `dividend != divisor`. The pair
/// is not required to be in lowest terms when built with [`RationalConverter::new`],
/// but every composition result is.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RationalConverter {
    dividend: BigInt,
    divisor: BigInt,
}

impl RationalConverter {
    pub fn new(dividend: impl Into<BigInt>, divisor: impl Into<BigInt>) -> Result<Self> {
        let dividend = dividend.into();
        let divisor = divisor.into();
        if !divisor.is_positive() {
            return Err(Error::InvalidConverter(format!(
                "negative or zero divisor {divisor}"
            )));
        }
        if dividend == divisor {
            return Err(Error::InvalidConverter(
                "dividend equal to divisor would result in the identity converter".into(),
            ));
        }
        if dividend.is_zero() {
            return Err(Error::InvalidConverter(
                "zero dividend is not invertible".into(),
            ));
        }
        Ok(Self { dividend, divisor })
    }

    pub fn dividend(&self) -> &BigInt {
        &self.dividend
    }

    pub fn divisor(&self) -> &BigInt {
        &self.divisor
    }

    /// The scale factor as a normalized rational.
    pub fn ratio(&self) -> BigRational {
        BigRational::new(self.dividend.clone(), self.divisor.clone())
    }

    /// Multiplies both fractions and reduces to lowest terms.
    ///
    /// `None` means the product is exactly one.
    pub(crate) fn compose(&self, other: &Self) -> Option<Self> {
        Self::reduced(
            &self.dividend * &other.dividend,
            &self.divisor * &other.divisor,
        )
    }

    /// `None` when `dividend / divisor` reduces to one.
    pub(crate) fn reduced(dividend: BigInt, divisor: BigInt) -> Option<Self> {
        let gcd = dividend.gcd(&divisor);
        let dividend = dividend / &gcd;
        let divisor = divisor / &gcd;
        if dividend.is_one() && divisor.is_one() {
            None
        } else {
            Some(Self { dividend, divisor })
        }
    }

    /// Raises both terms to the `n`th power; `None` means the result is one.
    pub(crate) fn pow(&self, n: u32) -> Result<Option<Self>> {
        let bits = self.dividend.bits().max(self.divisor.bits());
        if bits.saturating_mul(u64::from(n)) > MAX_POWER_BITS {
            return Err(Error::Overflow);
        }
        Ok(Self::reduced(
            num_traits::pow(self.dividend.clone(), n as usize),
            num_traits::pow(self.divisor.clone(), n as usize),
        ))
    }

    /// Swaps the fraction, keeping the divisor positive.
    pub fn inverse(&self) -> Self {
        if self.dividend.is_negative() {
            Self {
                dividend: -&self.divisor,
                divisor: -&self.dividend,
            }
        } else {
            Self {
                dividend: self.divisor.clone(),
                divisor: self.dividend.clone(),
            }
        }
    }

    pub fn convert(&self, value: f64) -> f64 {
        value * to_f64(&self.dividend) / to_f64(&self.divisor)
    }

    pub fn convert_exact(&self, value: &BigRational) -> BigRational {
        value * self.ratio()
    }

    pub fn as_f64(&self) -> f64 {
        to_f64(&self.dividend) / to_f64(&self.divisor)
    }
}

fn to_f64(value: &BigInt) -> f64 {
    value.to_f64().unwrap_or(if value.is_negative() {
        f64::NEG_INFINITY
    } else {
        f64::INFINITY
    })
}

impl fmt::Display for RationalConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rational({}, {})", self.dividend, self.divisor)
    }
}
