//! Exact, composable numeric converters.
//!
//! A [`Converter`] is a pure function from one measurement scale to another.
//! Converters compose with [`Converter::concatenate`] (the argument is applied
//! first), invert with [`Converter::inverse`], and evaluate either over `f64`
//! or exactly over rationals and decimals.
//!
//! ```
//! use mensura_convert::Converter;
//!
//! let milli = Converter::rational(1, 1000).unwrap();
//! let kilo = milli.inverse();
//! assert!(kilo.concatenate(&milli).is_identity());
//! ```
#![forbid(unsafe_code)]

mod converter;
mod error;
mod numeric;
mod rational;

pub use converter::Converter;
pub use error::{Error, Result};
pub use numeric::{decimal_to_rational, format_rational, rational_to_decimal};
pub use rational::RationalConverter;
