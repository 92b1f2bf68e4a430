//! The symbol table maps label names to instruction addresses.
//!
//! It is filled by the lexer as labels are seen and then handed,
//! read-only, to the parser and code generator. Each assembly owns
//! its own table, so independent runs never share labels.
use std::collections::HashMap;

use super::error::AsmError;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Symbol {
    pub address: usize,
    /// Line the label was defined on.
    pub line: usize,
}

#[derive(Clone, Default, Debug)]
pub struct SymbolTable {
    symbols: HashMap<String, Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable { symbols: HashMap::new() }
    }

    /// Binds `name` to `address`. Labels are case-insensitive, so
    /// `Loop` and `LOOP` collide.
    pub fn define(&mut self, name: &str, address: usize, line: usize) -> Result<(), AsmError> {
        let key = name.to_ascii_lowercase();
        if let Some(prev) = self.symbols.get(&key) {
            return Err(AsmError::DuplicateLabel {
                line,
                label: name.to_owned(),
                first: prev.line,
            });
        }
        self.symbols.insert(key, Symbol { address, line });
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(&name.to_ascii_lowercase())
    }

    /// Returns the address bound to `name`, if any.
    pub fn address(&self, name: &str) -> Option<usize> {
        self.get(name).map(|sym| sym.address)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Labels sorted by address, then name.
    pub fn sorted(&self) -> Vec<(&str, &Symbol)> {
        let mut out: Vec<(&str, &Symbol)> = self.symbols
            .iter()
            .map(|(name, sym)| (name.as_str(), sym))
            .collect();
        out.sort_by(|a, b| a.1.address.cmp(&b.1.address).then(a.0.cmp(b.0)));
        out
    }
}
