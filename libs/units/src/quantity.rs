use crate::error::Result;
use crate::unit::Unit;
use crate::unit_format::UnitFormat;
use rust_decimal::Decimal;
use std::fmt;

/// An exact decimal value in a unit.
#[derive(Clone, Debug, PartialEq)]
pub struct Quantity {
    pub value: Decimal,
    pub unit: Unit,
}

impl Quantity {
    pub fn new(value: Decimal, unit: Unit) -> Self {
        Self { value, unit }
    }

    /// The same quantity expressed in `target`, computed exactly.
    pub fn to(&self, target: &Unit) -> Result<Quantity> {
        let converter = self.unit.converter_to(target)?;
        Ok(Quantity {
            value: converter.convert_decimal(self.value)?,
            unit: target.clone(),
        })
    }

    /// The same quantity expressed in its system unit.
    pub fn normalize(&self) -> Result<Quantity> {
        let converter = self.unit.system_converter()?;
        Ok(Quantity {
            value: converter.convert_decimal(self.value)?,
            unit: self.unit.system_unit()?,
        })
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = self.unit.to_string();
        if unit.is_empty() {
            write!(f, "{}", self.value)
        } else {
            write!(f, "{} {}", self.value, unit)
        }
    }
}

/// Converts `value` between two unit expressions of the SI symbol map.
pub fn convert_decimal(value: Decimal, from: &str, to: &str) -> Result<Decimal> {
    let format: UnitFormat = UnitFormat::default();
    let from = format.parse(from)?;
    let to = format.parse(to)?;
    Ok(Quantity::new(value, from).to(&to)?.value)
}
