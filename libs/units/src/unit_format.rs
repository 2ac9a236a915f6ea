use crate::error::Result;
use crate::format::{FormatOptions, Printer};
use crate::parser::Parser;
use crate::si;
use crate::symbols::{SymbolMap, SymbolTable};
use crate::unit::{Unit, UnitKind};
use std::fmt;

/// Parses and formats unit expressions against one symbol table.
///
/// ```
/// use mensura_units::UnitFormat;
///
/// let format: UnitFormat = UnitFormat::default();
/// let unit = format.parse("kg*m/s^2").unwrap();
/// assert_eq!(format.format(&unit), "kg·m/s^2");
/// ```
#[derive(Clone, Debug)]
pub struct UnitFormat<S = &'static SymbolMap> {
    symbols: S,
    options: FormatOptions,
}

impl Default for UnitFormat {
    fn default() -> Self {
        Self::new(si::symbols())
    }
}

impl<S: SymbolTable> UnitFormat<S> {
    pub fn new(symbols: S) -> Self {
        Self {
            symbols,
            options: FormatOptions::default(),
        }
    }

    pub fn with_options(mut self, options: FormatOptions) -> Self {
        self.options = options;
        self
    }

    pub fn symbols(&self) -> &S {
        &self.symbols
    }

    pub fn options(&self) -> &FormatOptions {
        &self.options
    }

    /// Parses `text`; blank text is the dimensionless unit.
    ///
    /// A trailing `{annotation}` applies to the whole expression.
    pub fn parse(&self, text: &str) -> Result<Unit> {
        if text.trim().is_empty() {
            return Ok(Unit::one());
        }

        match split_annotation(text) {
            Some((body, annotation)) => self.parse_body(body)?.annotate(annotation),
            None => self.parse_body(text),
        }
    }

    fn parse_body(&self, text: &str) -> Result<Unit> {
        Parser::new(text, &self.symbols)?.parse()
    }

    pub fn format(&self, unit: &Unit) -> String {
        let mut out = String::new();
        self.write_unit(unit, &mut out);
        out
    }

    /// Writes the formatted unit to `out`, propagating sink failures.
    pub fn format_to<W: fmt::Write + ?Sized>(&self, unit: &Unit, out: &mut W) -> Result<()> {
        out.write_str(&self.format(unit))?;
        Ok(())
    }

    fn write_unit(&self, unit: &Unit, out: &mut String) {
        if let UnitKind::Annotated { actual, annotation } = unit.kind() {
            self.write_unit(actual, out);
            out.push('{');
            out.push_str(annotation);
            out.push('}');
            return;
        }
        Printer::new(&self.symbols, self.options).format(unit, out);
    }
}

/// Splits `m/s{speed}` into `m/s` and `speed`.
///
/// The annotation opens at the first `{` after the last inner `}`, so it may
/// itself contain `{`.
fn split_annotation(text: &str) -> Option<(&str, &str)> {
    let trimmed = text.trim_end().strip_suffix('}')?;
    let start = trimmed.rfind('}').map_or(0, |close| close + 1);
    let open = start + trimmed[start..].find('{')?;
    Some((&trimmed[..open], &trimmed[open + 1..]))
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let format: UnitFormat = UnitFormat::default();
        f.write_str(&format.format(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_trailing_annotation() {
        assert_eq!(split_annotation("m/s{speed}"), Some(("m/s", "speed")));
        assert_eq!(split_annotation("{rbc} "), Some(("", "rbc")));
        assert_eq!(split_annotation("m{a}{b}"), Some(("m{a}", "b")));
        assert_eq!(split_annotation("m{a{b}"), Some(("m", "a{b")));
        assert_eq!(split_annotation("m{x}{a{b}"), Some(("m{x}", "a{b")));
        assert_eq!(split_annotation("m/s"), None);
        assert_eq!(split_annotation("m}"), None);
    }
}
