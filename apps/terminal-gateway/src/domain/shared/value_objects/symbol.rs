//! Symbol value object for instrument names.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A terminal symbol name.
///
/// Broker symbols are case-sensitive and often carry suffixes
/// (`"EURUSDm"`, `"XAUUSD.r"`), so the name is kept verbatim apart from
/// surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Create a new Symbol.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_string())
    }

    /// Get the symbol string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the name is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// History group pattern matching this symbol and its variants.
    #[must_use]
    pub fn group_pattern(&self) -> String {
        format!("*{}*", self.0)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_keeps_case_and_suffix() {
        let symbol = Symbol::new(" EURUSDm ");
        assert_eq!(symbol.as_str(), "EURUSDm");
    }

    #[test]
    fn symbol_group_pattern() {
        assert_eq!(Symbol::new("XAUUSD").group_pattern(), "*XAUUSD*");
    }

    #[test]
    fn symbol_empty() {
        assert!(Symbol::new("   ").is_empty());
        assert!(!Symbol::new("EURUSD").is_empty());
    }
}
