//! Units of measure and their textual notation.
//!
//! Units are immutable shared values built from base units, products,
//! converter transforms and annotations. [`UnitFormat`] translates between
//! units and expressions such as `kg·m/s^2`, `log(Pa)` or `2.54*cm`, and
//! formatted text always parses back to an equal unit.
//!
//! ```
//! use mensura_units::{format, parse, si};
//!
//! let speed = parse("km/h").unwrap();
//! assert!(speed.is_compatible(&si::METRE.divide(&si::SECOND).unwrap()));
//! assert_eq!(format(&speed), "km/h");
//! ```
#![forbid(unsafe_code)]

mod error;
mod format;
pub mod lexer;
pub mod parser;
mod quantity;
pub mod si;
pub mod symbols;
pub mod token;
mod unit;
mod unit_format;

pub use error::{Error, Result};
pub use format::{ExponentStyle, FormatOptions, Precedence, Printer, ProductSeparator};
pub use mensura_convert::Converter;
pub use quantity::{convert_decimal, Quantity};
pub use symbols::{SymbolMap, SymbolTable};
pub use unit::{Factor, Unit, UnitKind};
pub use unit_format::UnitFormat;

/// Parses `text` against the SI symbol map.
pub fn parse(text: &str) -> Result<Unit> {
    let format: UnitFormat = UnitFormat::default();
    format.parse(text)
}

/// Formats `unit` against the SI symbol map with default options.
pub fn format(unit: &Unit) -> String {
    unit.to_string()
}
