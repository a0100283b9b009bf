//! Ticker symbols.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// A security's symbol. For most funds this is the ticker.
///
/// Symbols are always stored upper-cased, so `Symbol::new("tsla")` and
/// `Symbol::new("TSLA")` compare equal.
///
/// # Example
///
/// ```
/// use iexcloud_types::Symbol;
///
/// let sym = Symbol::new("brk.a");
/// assert_eq!(sym.as_str(), "BRK.A");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Creates a symbol, upper-casing the input.
    #[must_use]
    pub fn new(sym: impl AsRef<str>) -> Self {
        Self(sym.as_ref().to_uppercase())
    }

    /// Returns the symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(sym: &str) -> Self {
        Self::new(sym)
    }
}

/// A unique collection of symbols.
pub type SymbolSet = HashSet<Symbol>;

/// A map keyed by symbol.
pub type SymbolMap<T> = HashMap<Symbol, T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_uppercases() {
        assert_eq!(Symbol::new("aig+").as_str(), "AIG+");
        assert_eq!(Symbol::from("tsla"), Symbol::new("TSLA"));
    }

    #[test]
    fn test_symbol_set_dedups_case() {
        let set: SymbolSet = ["amd", "AMD", "msft"].into_iter().map(Symbol::from).collect();
        assert_eq!(set.len(), 2);
    }
}
