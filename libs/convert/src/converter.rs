use crate::error::{Error, Result};
use crate::numeric::{decimal_to_rational, rational_to_decimal};
use crate::rational::RationalConverter;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, ToPrimitive, Zero};
use rust_decimal::Decimal;
use std::fmt;

/// A pure function from one numeric scale to another.
///
/// Equality is structural: `Rational(2, 4)` and `Rational(1, 2)` are
/// different values even though they scale identically. Composition results
/// are always in normal form (see [`Converter::concatenate`]), so values built
/// through it compare as expected.
///
/// The variants can be built directly, which skips the checks made by the
/// constructors ([`Converter::add`], [`Converter::multiply`], ...). Composition
/// and the unit model assume those checks hold.
#[derive(Clone, Debug, PartialEq)]
pub enum Converter {
    /// `f(x) = x`
    Identity,
    /// `f(x) = x + offset`
    Add(BigRational),
    /// `f(x) = x * factor`
    Multiply(f64),
    /// `f(x) = x * dividend / divisor`
    Rational(RationalConverter),
    /// `f(x) = log_base(x)`
    Log(f64),
    /// `f(x) = base^x`
    Exp(f64),
    /// `f(x) = outer(inner(x))`
    Pair(Box<Converter>, Box<Converter>),
}

impl Converter {
    pub fn rational(dividend: impl Into<BigInt>, divisor: impl Into<BigInt>) -> Result<Self> {
        RationalConverter::new(dividend, divisor).map(Converter::Rational)
    }

    /// Exact scaling by `factor`; one yields [`Converter::Identity`].
    pub fn scale(factor: BigRational) -> Result<Self> {
        if factor.is_one() {
            return Ok(Converter::Identity);
        }
        let (numer, denom) = factor.into_raw();
        Self::rational(numer, denom)
    }

    pub fn add(offset: BigRational) -> Result<Self> {
        if offset.is_zero() {
            return Err(Error::InvalidConverter(
                "zero offset would result in the identity converter".into(),
            ));
        }
        Ok(Converter::Add(offset))
    }

    pub fn multiply(factor: f64) -> Result<Self> {
        if !factor.is_finite() || factor == 0.0 {
            return Err(Error::InvalidConverter(format!("invalid factor {factor}")));
        }
        if factor == 1.0 {
            return Err(Error::InvalidConverter(
                "factor of one would result in the identity converter".into(),
            ));
        }
        Ok(Converter::Multiply(factor))
    }

    pub fn log(base: f64) -> Result<Self> {
        check_base(base).map(|_| Converter::Log(base))
    }

    pub fn exp(base: f64) -> Result<Self> {
        check_base(base).map(|_| Converter::Exp(base))
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, Converter::Identity)
    }

    /// Log and Exp are the only non-linear variants.
    pub fn is_linear(&self) -> bool {
        match self {
            Converter::Identity
            | Converter::Add(_)
            | Converter::Multiply(_)
            | Converter::Rational(_) => true,
            Converter::Log(_) | Converter::Exp(_) => false,
            Converter::Pair(outer, inner) => outer.is_linear() && inner.is_linear(),
        }
    }

    /// True for pure scalings (no offset, no logarithm).
    pub fn is_scale(&self) -> bool {
        match self {
            Converter::Multiply(_) | Converter::Rational(_) => true,
            Converter::Pair(outer, inner) => outer.is_scale() && inner.is_scale(),
            _ => false,
        }
    }

    /// Returns the converter equivalent to applying `other` first, then `self`.
    ///
    /// The result is in normal form: a left-nested chain `Pair(Pair(a, b), c)`
    /// in which no two neighbouring steps merge. Any grouping of the same
    /// steps composes to the same value.
    pub fn concatenate(&self, other: &Converter) -> Converter {
        let mut chain = Vec::new();
        for step in self.steps().into_iter().chain(other.steps()) {
            push_step(&mut chain, step.clone());
        }
        Converter::from_steps(chain)
    }

    /// The same function in normal form.
    pub fn normalized(&self) -> Converter {
        Converter::Identity.concatenate(self)
    }

    /// Non-identity steps, outermost (last applied) first.
    pub fn steps(&self) -> Vec<&Converter> {
        let mut steps = Vec::new();
        self.collect_steps(&mut steps);
        steps
    }

    fn collect_steps<'a>(&'a self, steps: &mut Vec<&'a Converter>) {
        match self {
            Converter::Identity => {}
            Converter::Pair(outer, inner) => {
                outer.collect_steps(steps);
                inner.collect_steps(steps);
            }
            step => steps.push(step),
        }
    }

    /// Left-nested chain of `steps`, outermost first. No merging is done.
    pub fn from_steps(steps: impl IntoIterator<Item = Converter>) -> Converter {
        steps
            .into_iter()
            .reduce(|outer, inner| Converter::Pair(Box::new(outer), Box::new(inner)))
            .unwrap_or(Converter::Identity)
    }

    /// Same-kind composition of two non-pair converters.
    fn merge(&self, other: &Converter) -> Option<Converter> {
        match (self, other) {
            (Converter::Rational(a), Converter::Rational(b)) => {
                Some(a.compose(b).map_or(Converter::Identity, Converter::Rational))
            }
            (Converter::Add(a), Converter::Add(b)) => {
                let offset = a + b;
                Some(if offset.is_zero() {
                    Converter::Identity
                } else {
                    Converter::Add(offset)
                })
            }
            (Converter::Multiply(a), Converter::Multiply(b)) => {
                let factor = a * b;
                if !factor.is_finite() || factor == 0.0 {
                    return None;
                }
                Some(if factor == 1.0 {
                    Converter::Identity
                } else {
                    Converter::Multiply(factor)
                })
            }
            (Converter::Log(a), Converter::Exp(b)) | (Converter::Exp(a), Converter::Log(b))
                if a == b =>
            {
                Some(Converter::Identity)
            }
            _ => None,
        }
    }

    /// `self` composed with itself `n` times; negative powers compose the
    /// inverse.
    ///
    /// Defined for scalings only. Fails with [`Error::Overflow`] when an exact
    /// result would be unreasonably large.
    pub fn pow(&self, n: i32) -> Result<Converter> {
        let power = self.pow_unsigned(n.unsigned_abs())?;
        Ok(if n < 0 { power.inverse() } else { power })
    }

    fn pow_unsigned(&self, n: u32) -> Result<Converter> {
        if n == 0 {
            return Ok(Converter::Identity);
        }
        match self {
            Converter::Identity => Ok(Converter::Identity),
            Converter::Rational(r) => Ok(r.pow(n)?.map_or(Converter::Identity, Converter::Rational)),
            Converter::Multiply(factor) => {
                let power = factor.powf(f64::from(n));
                if !power.is_finite() || power == 0.0 {
                    return Err(Error::Overflow);
                }
                Ok(if power == 1.0 {
                    Converter::Identity
                } else {
                    Converter::Multiply(power)
                })
            }
            // Scalings commute, so a chain of them distributes over the power.
            Converter::Pair(outer, inner) if self.is_scale() => {
                Ok(outer.pow_unsigned(n)?.concatenate(&inner.pow_unsigned(n)?))
            }
            _ => Err(Error::InvalidConverter(format!("{self} has no integer power"))),
        }
    }

    pub fn inverse(&self) -> Converter {
        match self {
            Converter::Identity => Converter::Identity,
            Converter::Add(offset) => Converter::Add(-offset),
            Converter::Multiply(factor) => Converter::Multiply(factor.recip()),
            Converter::Rational(r) => Converter::Rational(r.inverse()),
            Converter::Log(base) => Converter::Exp(*base),
            Converter::Exp(base) => Converter::Log(*base),
            Converter::Pair(outer, inner) => inner.inverse().concatenate(&outer.inverse()),
        }
    }

    pub fn convert(&self, value: f64) -> f64 {
        match self {
            Converter::Identity => value,
            Converter::Add(offset) => value + offset.to_f64().unwrap_or(f64::NAN),
            Converter::Multiply(factor) => value * factor,
            Converter::Rational(r) => r.convert(value),
            Converter::Log(base) => value.ln() / base.ln(),
            Converter::Exp(base) => base.powf(value),
            Converter::Pair(outer, inner) => outer.convert(inner.convert(value)),
        }
    }

    /// Evaluates without rounding; fails for floating-point and transcendental steps.
    pub fn convert_exact(&self, value: &BigRational) -> Result<BigRational> {
        match self {
            Converter::Identity => Ok(value.clone()),
            Converter::Add(offset) => Ok(value + offset),
            Converter::Rational(r) => Ok(r.convert_exact(value)),
            Converter::Pair(outer, inner) => outer.convert_exact(&inner.convert_exact(value)?),
            Converter::Multiply(_) | Converter::Log(_) | Converter::Exp(_) => {
                Err(Error::Inexact(format!("{self} has no exact form")))
            }
        }
    }

    pub fn convert_decimal(&self, value: Decimal) -> Result<Decimal> {
        let exact = self.convert_exact(&decimal_to_rational(value))?;
        rational_to_decimal(&exact)
    }
}

/// Appends `step` as the innermost step, merging it into its neighbours.
fn push_step(chain: &mut Vec<Converter>, mut step: Converter) {
    while let Some(last) = chain.last() {
        let Some(merged) = last.merge(&step) else {
            break;
        };
        chain.pop();
        if merged.is_identity() {
            return;
        }
        step = merged;
    }
    chain.push(step);
}

fn check_base(base: f64) -> Result<()> {
    if !base.is_finite() || base <= 0.0 || base == 1.0 {
        return Err(Error::InvalidConverter(format!(
            "logarithm base {base} is undefined"
        )));
    }
    Ok(())
}

impl From<RationalConverter> for Converter {
    fn from(value: RationalConverter) -> Self {
        Converter::Rational(value)
    }
}

impl fmt::Display for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Converter::Identity => f.write_str("Identity"),
            Converter::Add(offset) => write!(f, "Add({offset})"),
            Converter::Multiply(factor) => write!(f, "Multiply({factor})"),
            Converter::Rational(r) => fmt::Display::fmt(r, f),
            Converter::Log(base) => write!(f, "Log({base})"),
            Converter::Exp(base) => write!(f, "Exp({base})"),
            Converter::Pair(outer, inner) => write!(f, "Pair({outer}, {inner})"),
        }
    }
}
