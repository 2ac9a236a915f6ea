//! Symbol lookup between unit text and unit values.

use crate::unit::Unit;
use mensura_convert::Converter;
use std::collections::HashMap;
use std::sync::Arc;

/// Read-only mapping between symbols and units, injected into the parser and
/// printer.
pub trait SymbolTable {
    /// Resolves an identifier, including any prefix handling the table supports.
    fn lookup_symbol(&self, symbol: &str) -> Option<Unit>;

    /// The printable symbol of exactly this unit.
    fn symbol_for(&self, unit: &Unit) -> Option<&str>;

    /// The prefix symbol that stands for `converter`, if any.
    fn prefix_for(&self, _converter: &Converter) -> Option<&str> {
        None
    }
}

impl<T: SymbolTable + ?Sized> SymbolTable for &T {
    fn lookup_symbol(&self, symbol: &str) -> Option<Unit> {
        (**self).lookup_symbol(symbol)
    }

    fn symbol_for(&self, unit: &Unit) -> Option<&str> {
        (**self).symbol_for(unit)
    }

    fn prefix_for(&self, converter: &Converter) -> Option<&str> {
        (**self).prefix_for(converter)
    }
}

impl<T: SymbolTable + ?Sized> SymbolTable for Arc<T> {
    fn lookup_symbol(&self, symbol: &str) -> Option<Unit> {
        (**self).lookup_symbol(symbol)
    }

    fn symbol_for(&self, unit: &Unit) -> Option<&str> {
        (**self).symbol_for(unit)
    }

    fn prefix_for(&self, converter: &Converter) -> Option<&str> {
        (**self).prefix_for(converter)
    }
}

/// A [`SymbolTable`] built from labels, aliases and metric prefixes.
///
/// A label maps both ways; an alias is only recognized when parsing.
/// Identifiers resolve to an exact symbol first, then to the longest known
/// prefix followed by a known symbol.
#[derive(Clone, Debug, Default)]
pub struct SymbolMap {
    symbol_to_unit: HashMap<String, Unit>,
    unit_to_symbol: Vec<(Unit, String)>,
    symbol_to_prefix: HashMap<String, Converter>,
    prefix_to_symbol: Vec<(Converter, String)>,
    longest_prefix: usize,
}

impl SymbolMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches `symbol` to `unit`, replacing a previous label of the unit.
    pub fn label(&mut self, unit: &Unit, symbol: impl Into<String>) -> &mut Self {
        let symbol = symbol.into();
        self.unit_to_symbol.retain(|(u, _)| u != unit);
        self.unit_to_symbol.push((unit.clone(), symbol.clone()));
        self.symbol_to_unit.insert(symbol, unit.clone());
        self
    }

    pub fn alias(&mut self, unit: &Unit, symbol: impl Into<String>) -> &mut Self {
        self.symbol_to_unit.insert(symbol.into(), unit.clone());
        self
    }

    pub fn label_prefix(&mut self, converter: &Converter, symbol: impl Into<String>) -> &mut Self {
        let symbol = symbol.into();
        self.prefix_to_symbol.retain(|(c, _)| c != converter);
        self.prefix_to_symbol.push((converter.clone(), symbol.clone()));
        self.alias_prefix(converter, symbol)
    }

    pub fn alias_prefix(&mut self, converter: &Converter, symbol: impl Into<String>) -> &mut Self {
        let symbol = symbol.into();
        self.longest_prefix = self.longest_prefix.max(symbol.chars().count());
        self.symbol_to_prefix.insert(symbol, converter.clone());
        self
    }

    pub fn len(&self) -> usize {
        self.symbol_to_unit.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbol_to_unit.is_empty()
    }

    fn lookup_prefixed(&self, symbol: &str) -> Option<Unit> {
        let boundaries: Vec<usize> = symbol
            .char_indices()
            .map(|(i, _)| i)
            .skip(1)
            .take(self.longest_prefix)
            .collect();
        for &split in boundaries.iter().rev() {
            let (prefix, rest) = symbol.split_at(split);
            let Some(converter) = self.symbol_to_prefix.get(prefix) else {
                continue;
            };
            if let Some(unit) = self.symbol_to_unit.get(rest) {
                tracing::trace!(symbol, prefix, rest, "resolved prefixed unit");
                return Some(unit.transform(converter));
            }
        }
        None
    }
}

impl SymbolTable for SymbolMap {
    fn lookup_symbol(&self, symbol: &str) -> Option<Unit> {
        if let Some(unit) = self.symbol_to_unit.get(symbol) {
            tracing::trace!(symbol, "resolved unit");
            return Some(unit.clone());
        }
        self.lookup_prefixed(symbol)
    }

    fn symbol_for(&self, unit: &Unit) -> Option<&str> {
        self.unit_to_symbol
            .iter()
            .find(|(u, _)| u == unit)
            .map(|(_, s)| s.as_str())
    }

    fn prefix_for(&self, converter: &Converter) -> Option<&str> {
        self.prefix_to_symbol
            .iter()
            .find(|(c, _)| c == converter)
            .map(|(_, s)| s.as_str())
    }
}
