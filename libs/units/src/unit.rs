use crate::error::{Error, Result};
use mensura_convert::Converter;
use num_rational::BigRational;
use once_cell::sync::Lazy;
use std::sync::Arc;

static ONE: Lazy<Unit> = Lazy::new(|| Unit::from_kind(UnitKind::Product(Vec::new())));

/// An immutable, cheaply clonable unit of measure.
///
/// Units share their parents: cloning a unit or deriving a new one from it
/// never copies the underlying graph.
#[derive(Clone, Debug)]
pub struct Unit(Arc<UnitKind>);

#[derive(Debug)]
pub enum UnitKind {
    /// The root of a dimension, e.g. `m` or `kg`.
    Base { symbol: String },
    /// A named derived unit that acts as its own system unit, e.g. `N` for `kg·m/s^2`.
    Alternate { symbol: String, parent: Unit },
    /// Units raised to non-zero integer powers, in insertion order.
    /// The empty product is the dimensionless unit.
    Product(Vec<Factor>),
    /// Values in this unit map to values in `parent` through `converter`.
    Transformed { parent: Unit, converter: Converter },
    /// Numerically identical to `actual`, printed with a `{annotation}` suffix.
    Annotated { actual: Unit, annotation: String },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Factor {
    pub unit: Unit,
    pub pow: i32,
}

impl Unit {
    fn from_kind(kind: UnitKind) -> Self {
        Unit(Arc::new(kind))
    }

    /// The dimensionless unit; neutral element of multiplication.
    pub fn one() -> Unit {
        ONE.clone()
    }

    pub fn base(symbol: impl Into<String>) -> Unit {
        Self::from_kind(UnitKind::Base {
            symbol: symbol.into(),
        })
    }

    pub fn alternate(symbol: impl Into<String>, parent: &Unit) -> Unit {
        Self::from_kind(UnitKind::Alternate {
            symbol: symbol.into(),
            parent: parent.clone(),
        })
    }

    /// Builds a product, merging equal units and dropping zero powers.
    pub fn product(factors: impl IntoIterator<Item = Factor>) -> Result<Unit> {
        let mut merged: Vec<Factor> = Vec::new();
        for factor in factors {
            match merged.iter_mut().find(|f| f.unit == factor.unit) {
                Some(existing) => {
                    existing.pow = existing
                        .pow
                        .checked_add(factor.pow)
                        .ok_or(Error::ExponentOverflow)?;
                }
                None => merged.push(factor),
            }
        }
        merged.retain(|f| f.pow != 0);
        Ok(match merged.as_slice() {
            [] => Unit::one(),
            [single] if single.pow == 1 => single.unit.clone(),
            _ => Self::from_kind(UnitKind::Product(merged)),
        })
    }

    pub fn kind(&self) -> &UnitKind {
        &self.0
    }

    pub fn is_one(&self) -> bool {
        matches!(self.kind(), UnitKind::Product(factors) if factors.is_empty())
    }

    /// Intrinsic symbol of base and alternate units.
    pub fn symbol(&self) -> Option<&str> {
        match self.kind() {
            UnitKind::Base { symbol } | UnitKind::Alternate { symbol, .. } => Some(symbol),
            _ => None,
        }
    }

    pub fn annotation(&self) -> Option<&str> {
        match self.kind() {
            UnitKind::Annotated { annotation, .. } => Some(annotation),
            _ => None,
        }
    }

    /// The scale of a dimensionless scaled unit such as the literal `1000`.
    pub fn scale_factor(&self) -> Option<&Converter> {
        match self.kind() {
            UnitKind::Transformed { parent, converter } if parent.is_one() && converter.is_scale() => {
                Some(converter)
            }
            _ => None,
        }
    }

    fn factors(&self) -> Vec<Factor> {
        match self.kind() {
            UnitKind::Product(factors) => factors.clone(),
            _ => vec![Factor {
                unit: self.clone(),
                pow: 1,
            }],
        }
    }

    /// Fails with [`Error::ExponentOverflow`] when a merged power leaves `i32`.
    pub fn multiply(&self, other: &Unit) -> Result<Unit> {
        if self.is_one() {
            return Ok(other.clone());
        }
        if other.is_one() {
            return Ok(self.clone());
        }
        if let Some(scale) = self.scale_factor() {
            return Ok(other.transform(scale));
        }
        if let Some(scale) = other.scale_factor() {
            return Ok(self.transform(scale));
        }
        let mut factors = self.factors();
        factors.extend(other.factors());
        Unit::product(factors)
    }

    pub fn reciprocal(&self) -> Result<Unit> {
        self.pow(-1)
    }

    pub fn divide(&self, other: &Unit) -> Result<Unit> {
        self.multiply(&other.reciprocal()?)
    }

    /// Multiplies every power by `n`; a scaled number raises its scale instead.
    pub fn pow(&self, n: i32) -> Result<Unit> {
        if let Some(scale) = self.scale_factor() {
            return Ok(Unit::one().transform(&scale.pow(n)?));
        }
        let factors = self
            .factors()
            .into_iter()
            .map(|f| {
                let pow = f.pow.checked_mul(n).ok_or(Error::ExponentOverflow)?;
                Ok(Factor { unit: f.unit, pow })
            })
            .collect::<Result<Vec<_>>>()?;
        Unit::product(factors)
    }

    /// The `n`th root, when it still has integer powers.
    pub fn root(&self, n: i32) -> Option<Unit> {
        match n {
            0 => None,
            1 => Some(self.clone()),
            _ if n < 0 => self.root(n.checked_neg()?)?.reciprocal().ok(),
            _ if self.is_one() => Some(self.clone()),
            _ => match self.kind() {
                UnitKind::Product(factors) if factors.iter().all(|f| f.pow % n == 0) => {
                    Unit::product(factors.iter().map(|f| Factor {
                        unit: f.unit.clone(),
                        pow: f.pow / n,
                    }))
                    .ok()
                }
                _ => None,
            },
        }
    }

    /// Derives a unit whose values map into `self` through `converter`.
    ///
    /// Nested transforms collapse into a single converter, and a transform
    /// that reduces to the identity returns the parent itself.
    pub fn transform(&self, converter: &Converter) -> Unit {
        if converter.is_identity() {
            return self.clone();
        }
        match self.kind() {
            UnitKind::Transformed {
                parent,
                converter: existing,
            } => {
                let combined = existing.concatenate(converter);
                if combined.is_identity() {
                    parent.clone()
                } else {
                    Self::from_kind(UnitKind::Transformed {
                        parent: parent.clone(),
                        converter: combined,
                    })
                }
            }
            _ => {
                let converter = converter.normalized();
                if converter.is_identity() {
                    return self.clone();
                }
                Self::from_kind(UnitKind::Transformed {
                    parent: self.clone(),
                    converter,
                })
            }
        }
    }

    /// Offsets the origin: `K.shift(273.15)` is the degree Celsius.
    ///
    /// A zero offset returns the unit itself.
    pub fn shift(&self, offset: BigRational) -> Unit {
        Converter::add(offset).map_or_else(|_| self.clone(), |add| self.transform(&add))
    }

    /// Attaches a `{annotation}` label; the text may not contain `}`.
    pub fn annotate(&self, annotation: impl Into<String>) -> Result<Unit> {
        let annotation = annotation.into();
        if annotation.contains('}') {
            return Err(Error::InvalidAnnotation(annotation));
        }
        Ok(Self::from_kind(UnitKind::Annotated {
            actual: self.clone(),
            annotation,
        }))
    }

    /// The base, alternate or product unit left after unwinding every transform.
    pub fn system_unit(&self) -> Result<Unit> {
        match self.kind() {
            UnitKind::Base { .. } | UnitKind::Alternate { .. } => Ok(self.clone()),
            UnitKind::Product(factors) => factors.iter().try_fold(Unit::one(), |acc, f| {
                acc.multiply(&f.unit.system_unit()?.pow(f.pow)?)
            }),
            UnitKind::Transformed { parent, .. } => parent.system_unit(),
            UnitKind::Annotated { actual, .. } => actual.system_unit(),
        }
    }

    /// Converter from this unit to [`Unit::system_unit`].
    ///
    /// Powers other than 1 and -1 are defined for scaled factors only; an
    /// offset such as the one in `℃^2` has no linear meaning.
    pub fn system_converter(&self) -> Result<Converter> {
        match self.kind() {
            UnitKind::Base { .. } | UnitKind::Alternate { .. } => Ok(Converter::Identity),
            UnitKind::Product(factors) => {
                let mut converter = Converter::Identity;
                for factor in factors {
                    let step = factor.unit.system_converter()?;
                    if !step.is_linear() {
                        return Err(Error::NonLinear(factor.unit.to_string()));
                    }
                    let step = match factor.pow {
                        1 => step,
                        -1 => step.inverse(),
                        pow if step.is_identity() || step.is_scale() => step.pow(pow)?,
                        _ => return Err(Error::NonLinear(factor.unit.to_string())),
                    };
                    converter = converter.concatenate(&step);
                }
                Ok(converter)
            }
            UnitKind::Transformed { parent, converter } => {
                Ok(parent.system_converter()?.concatenate(converter))
            }
            UnitKind::Annotated { actual, .. } => actual.system_converter(),
        }
    }

    /// Whether both units reduce to the same system unit.
    pub fn is_compatible(&self, other: &Unit) -> bool {
        match (self.system_unit(), other.system_unit()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }

    /// Converter taking values in `self` to values in `target`.
    pub fn converter_to(&self, target: &Unit) -> Result<Converter> {
        if self == target {
            return Ok(Converter::Identity);
        }
        if self.system_unit()? != target.system_unit()? {
            return Err(Error::Incompatible {
                from: self.to_string(),
                to: target.to_string(),
            });
        }
        let to_system = self.system_converter()?;
        let from_system = target.system_converter()?.inverse();
        Ok(from_system.concatenate(&to_system))
    }
}

impl PartialEq for Unit {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || *self.0 == *other.0
    }
}

impl PartialEq for UnitKind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (UnitKind::Base { symbol: a }, UnitKind::Base { symbol: b }) => a == b,
            (
                UnitKind::Alternate { symbol: a, parent: p },
                UnitKind::Alternate { symbol: b, parent: q },
            ) => a == b && p == q,
            // Factors are unique per unit, so order does not matter.
            (UnitKind::Product(a), UnitKind::Product(b)) => {
                a.len() == b.len() && a.iter().all(|f| b.contains(f))
            }
            (
                UnitKind::Transformed {
                    parent: p,
                    converter: c,
                },
                UnitKind::Transformed {
                    parent: q,
                    converter: d,
                },
            ) => p == q && c == d,
            (
                UnitKind::Annotated {
                    actual: a,
                    annotation: x,
                },
                UnitKind::Annotated {
                    actual: b,
                    annotation: y,
                },
            ) => a == b && x == y,
            _ => false,
        }
    }
}
