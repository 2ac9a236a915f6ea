//! Precedence printer - renders a [`Unit`] back into expression text
//!
//! Every formatting step reports the precedence of the outermost operator it
//! wrote, and callers parenthesize a sub-expression only when that precedence
//! is lower than their own operator needs. The output re-parses to an equal
//! unit.

use crate::si;
use crate::symbols::SymbolTable;
use crate::unit::{Factor, Unit, UnitKind};
use mensura_convert::{format_rational, Converter, RationalConverter};
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive};
use once_cell::sync::Lazy;
use std::f64::consts::E;
use std::fmt::Write;

/// Binding strength of the outermost operator of formatted text, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Precedence {
    Addition,
    Product,
    Exponent,
    Noop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum ProductSeparator {
    /// `m·s`
    #[default]
    MiddleDot,
    /// `m*s`
    Asterisk,
}

impl ProductSeparator {
    pub fn as_str(self) -> &'static str {
        match self {
            ProductSeparator::MiddleDot => "·",
            ProductSeparator::Asterisk => "*",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum ExponentStyle {
    /// `m^2`
    #[default]
    Caret,
    /// `m²`
    Superscript,
}

/// Output spelling choices. Every combination parses back to the same unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct FormatOptions {
    pub product_separator: ProductSeparator,
    pub exponent_style: ExponentStyle,
}

impl FormatOptions {
    pub fn with_product_separator(mut self, separator: ProductSeparator) -> Self {
        self.product_separator = separator;
        self
    }

    pub fn with_exponent_style(mut self, style: ExponentStyle) -> Self {
        self.exponent_style = style;
        self
    }
}

/// Transformed kilograms print relative to the gram and transformed cubic
/// metres relative to the litre.
static PRINT_OVERRIDES: Lazy<[(Unit, Unit); 2]> = Lazy::new(|| {
    [
        (si::KILOGRAM.clone(), si::GRAM.clone()),
        (si::CUBIC_METRE.clone(), si::LITRE.clone()),
    ]
});

/// Renders units against a symbol table.
pub struct Printer<'a, S: SymbolTable + ?Sized> {
    symbols: &'a S,
    options: FormatOptions,
}

impl<'a, S: SymbolTable + ?Sized> Printer<'a, S> {
    pub fn new(symbols: &'a S, options: FormatOptions) -> Self {
        Self { symbols, options }
    }

    /// Appends `unit` to `buf` and returns the precedence of what was written.
    ///
    /// Annotated units are written as `(unit{annotation})` so that the text
    /// stays unambiguous wherever it is embedded.
    pub fn format(&self, unit: &Unit, buf: &mut String) -> Precedence {
        if let Some(symbol) = self.symbols.symbol_for(unit) {
            buf.push_str(symbol);
            return Precedence::Noop;
        }

        match unit.kind() {
            UnitKind::Base { symbol } | UnitKind::Alternate { symbol, .. } => {
                buf.push_str(symbol);
                Precedence::Noop
            }
            UnitKind::Product(factors) => self.format_product(factors, buf),
            UnitKind::Transformed { parent, converter } => {
                let (parent, converter) = self.preferred_parent(parent, converter);
                self.format_chain(&parent, &converter, buf)
            }
            UnitKind::Annotated { actual, annotation } => {
                buf.push('(');
                self.format(actual, buf);
                buf.push('{');
                buf.push_str(annotation);
                buf.push_str("})");
                Precedence::Noop
            }
        }
    }

    fn separator(&self) -> &'static str {
        self.options.product_separator.as_str()
    }

    /// Positive powers first, then `/` and the negative powers, grouped in
    /// parentheses when there is more than one.
    fn format_product(&self, factors: &[Factor], buf: &mut String) -> Precedence {
        let (positive, negative): (Vec<&Factor>, Vec<&Factor>) =
            factors.iter().partition(|f| f.pow > 0);

        if positive.is_empty() && !negative.is_empty() {
            buf.push('1');
        }
        for (i, factor) in positive.iter().enumerate() {
            if i > 0 {
                buf.push_str(self.separator());
            }
            self.format_factor(&factor.unit, factor.pow.unsigned_abs(), buf);
        }

        if !negative.is_empty() {
            buf.push('/');
            let grouped = negative.len() > 1;
            if grouped {
                buf.push('(');
            }
            for (i, factor) in negative.iter().enumerate() {
                if i > 0 {
                    buf.push_str(self.separator());
                }
                self.format_factor(&factor.unit, factor.pow.unsigned_abs(), buf);
            }
            if grouped {
                buf.push(')');
            }
        }

        Precedence::Product
    }

    fn format_factor(&self, unit: &Unit, pow: u32, buf: &mut String) {
        let mut text = String::new();
        let precedence = self.format(unit, &mut text);

        let wrap = if pow == 1 {
            precedence < Precedence::Exponent
        } else {
            precedence < Precedence::Noop
        };
        if wrap {
            wrap_in_parens(&mut text);
        }
        buf.push_str(&text);

        if pow != 1 {
            match self.options.exponent_style {
                ExponentStyle::Caret => {
                    let _ = write!(buf, "^{pow}");
                }
                ExponentStyle::Superscript => {
                    buf.extend(pow.to_string().chars().map(superscript));
                }
            }
        }
    }

    /// Swaps a kilogram or cubic-metre parent for its historical print unit.
    fn preferred_parent(&self, parent: &Unit, converter: &Converter) -> (Unit, Converter) {
        for (system, preferred) in PRINT_OVERRIDES.iter() {
            if parent != system || self.symbols.symbol_for(preferred).is_none() {
                continue;
            }
            // `parent` is a system unit, so `converter` is the whole system converter.
            let Ok(from_system) = preferred.system_converter() else {
                continue;
            };
            return (preferred.clone(), from_system.inverse().concatenate(converter));
        }
        (parent.clone(), converter.clone())
    }

    fn format_chain(&self, parent: &Unit, converter: &Converter, buf: &mut String) -> Precedence {
        // Prefer a named intermediate unit, e.g. `m℃` over `(K+273.15)/1000`.
        let steps = converter.steps();
        for split in (1..steps.len()).rev() {
            let head = Converter::from_steps(steps[..split].iter().map(|&step| step.clone()));
            let named = parent.transform(&head);
            if self.symbols.symbol_for(&named).is_some() {
                let tail = Converter::from_steps(steps[split..].iter().map(|&step| step.clone()));
                return self.format_chain(&named, &tail, buf);
            }
        }

        let mut text = String::new();
        let precedence = self.format(parent, &mut text);
        let precedence = self.format_converter(converter, parent, precedence, &mut text);
        buf.push_str(&text);
        precedence
    }

    /// Applies `converter` to the text of `parent` held in `buf`.
    fn format_converter(
        &self,
        converter: &Converter,
        parent: &Unit,
        precedence: Precedence,
        buf: &mut String,
    ) -> Precedence {
        if self.format_prefix(converter, parent, precedence, buf) {
            return Precedence::Noop;
        }

        match converter {
            Converter::Identity => precedence,
            Converter::Add(offset) => {
                // `2+5` would read as a leading offset.
                if is_numeric(parent) {
                    if buf.is_empty() {
                        buf.push('1');
                    }
                    wrap_in_parens(buf);
                }
                buf.push(if offset.is_negative() { '-' } else { '+' });
                push_offset(&offset.abs(), buf);
                Precedence::Addition
            }
            Converter::Multiply(factor) => {
                if precedence < Precedence::Product {
                    wrap_in_parens(buf);
                }
                if !buf.is_empty() {
                    buf.push_str(self.separator());
                }
                let _ = write!(buf, "{factor}");
                Precedence::Product
            }
            Converter::Rational(ratio) => {
                if precedence < Precedence::Product {
                    wrap_in_parens(buf);
                }
                self.push_ratio(ratio, buf);
                Precedence::Product
            }
            Converter::Log(base) => {
                let Some(name) = log_name(*base) else {
                    return format_fallback(converter, buf);
                };
                if buf.is_empty() {
                    buf.push('1');
                }
                buf.insert_str(0, &format!("{name}("));
                buf.push(')');
                Precedence::Exponent
            }
            Converter::Exp(base) => {
                let Some(name) = exp_name(*base) else {
                    return format_fallback(converter, buf);
                };
                if is_numeric(parent) {
                    // `10^(3)` would read as a power.
                    if buf.is_empty() {
                        buf.push('1');
                    }
                    wrap_in_parens(buf);
                    wrap_in_parens(buf);
                } else if precedence < Precedence::Noop {
                    wrap_in_parens(buf);
                }
                buf.insert_str(0, &format!("{name}^"));
                Precedence::Exponent
            }
            Converter::Pair(outer, inner) => {
                let precedence = self.format_converter(outer, parent, precedence, buf);
                let parent = parent.transform(outer);
                self.format_converter(inner, &parent, precedence, buf)
            }
        }
    }

    fn push_ratio(&self, ratio: &RationalConverter, buf: &mut String) {
        let continued = !buf.is_empty();
        if !ratio.dividend().is_one() || !continued {
            if continued {
                buf.push_str(self.separator());
            }
            let _ = write!(buf, "{}", ratio.dividend());
        }
        if !ratio.divisor().is_one() {
            let _ = write!(buf, "/{}", ratio.divisor());
        }
    }

    /// `km` rather than `m·1000`, when the prefixed symbol parses back to
    /// the same unit.
    fn format_prefix(
        &self,
        converter: &Converter,
        parent: &Unit,
        precedence: Precedence,
        buf: &mut String,
    ) -> bool {
        if precedence != Precedence::Noop || buf.is_empty() {
            return false;
        }
        let Some(prefix) = self.symbols.prefix_for(converter) else {
            return false;
        };

        let candidate = format!("{prefix}{buf}");
        if self.symbols.lookup_symbol(&candidate) != Some(parent.transform(converter)) {
            return false;
        }
        *buf = candidate;
        true
    }
}

fn is_numeric(unit: &Unit) -> bool {
    unit.is_one() || unit.scale_factor().is_some()
}

fn wrap_in_parens(buf: &mut String) {
    buf.insert(0, '(');
    buf.push(')');
}

fn push_offset(offset: &BigRational, buf: &mut String) {
    match format_rational(offset) {
        Some(text) => buf.push_str(&text),
        None => {
            let approximate = offset.to_f64().unwrap_or(f64::NAN);
            tracing::debug!(%offset, approximate, "offset has no finite decimal form");
            let _ = write!(buf, "{approximate}");
        }
    }
}

fn format_fallback(converter: &Converter, buf: &mut String) -> Precedence {
    tracing::debug!(%converter, "converter has no expression syntax");
    let _ = write!(buf, "[{converter}]");
    Precedence::Noop
}

fn integral_base(base: f64) -> Option<u64> {
    (base > 1.0 && base.fract() == 0.0 && base < 9.007_199_254_740_992e15).then_some(base as u64)
}

fn log_name(base: f64) -> Option<String> {
    if base == E {
        return Some("ln".into());
    }
    match integral_base(base)? {
        10 => Some("log".into()),
        n => Some(format!("log{n}")),
    }
}

fn exp_name(base: f64) -> Option<String> {
    if base == E {
        return Some("e".into());
    }
    integral_base(base).map(|n| n.to_string())
}

fn superscript(digit: char) -> char {
    match digit {
        '0' => '⁰',
        '1' => '¹',
        '2' => '²',
        '3' => '³',
        '4' => '⁴',
        '5' => '⁵',
        '6' => '⁶',
        '7' => '⁷',
        '8' => '⁸',
        '9' => '⁹',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precedence_is_ordered_weakest_first() {
        assert!(Precedence::Addition < Precedence::Product);
        assert!(Precedence::Product < Precedence::Exponent);
        assert!(Precedence::Exponent < Precedence::Noop);
    }

    #[test]
    fn logarithm_names() {
        assert_eq!(log_name(E).as_deref(), Some("ln"));
        assert_eq!(log_name(10.0).as_deref(), Some("log"));
        assert_eq!(log_name(2.0).as_deref(), Some("log2"));
        assert_eq!(log_name(2.5), None);
        assert_eq!(exp_name(10.0).as_deref(), Some("10"));
        assert_eq!(exp_name(0.5), None);
    }

    #[test]
    fn wrap_adds_parentheses() {
        let mut text = String::from("m/s");
        wrap_in_parens(&mut text);
        assert_eq!(text, "(m/s)");
    }
}
