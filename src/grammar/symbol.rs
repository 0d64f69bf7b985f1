use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::{Error, Result};

/// A single grammar symbol. Upper-case letters are non-terminals, everything
/// else is a terminal; the epsilon sentinel is decided by the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Symbol(char);

impl Symbol {
    pub const fn new(c: char) -> Self {
        Self(c)
    }

    pub fn as_char(self) -> char {
        self.0
    }

    pub fn is_non_terminal(self) -> bool {
        self.0.is_uppercase()
    }

    pub fn is_terminal(self) -> bool {
        !self.is_non_terminal()
    }

    pub fn class(self) -> SymbolClass {
        if self.is_non_terminal() {
            SymbolClass::NonTerminal
        } else {
            SymbolClass::Terminal
        }
    }
}

impl From<char> for Symbol {
    fn from(c: char) -> Self {
        Self(c)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Turns a word into the symbols it is made of.
pub fn symbols(word: &str) -> Vec<Symbol> {
    word.chars().map(Symbol::from).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SymbolClass {
    Terminal,
    NonTerminal,
}

impl fmt::Display for SymbolClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolClass::Terminal => write!(f, "terminal"),
            SymbolClass::NonTerminal => write!(f, "non-terminal"),
        }
    }
}

/// An ordered, duplicate-free set of symbols, optionally restricted to one
/// class.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Alphabet {
    #[serde(skip)]
    class: Option<SymbolClass>,
    symbols: BTreeSet<Symbol>,
}

impl Alphabet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn terminals() -> Self {
        Self {
            class: Some(SymbolClass::Terminal),
            symbols: BTreeSet::new(),
        }
    }

    pub fn non_terminals() -> Self {
        Self {
            class: Some(SymbolClass::NonTerminal),
            symbols: BTreeSet::new(),
        }
    }

    /// The symbols of `class` among `symbols`; others are left out.
    pub(crate) fn collect(class: SymbolClass, symbols: impl IntoIterator<Item = Symbol>) -> Self {
        Self {
            class: Some(class),
            symbols: symbols.into_iter().filter(|s| s.class() == class).collect(),
        }
    }

    pub fn class(&self) -> Option<SymbolClass> {
        self.class
    }

    /// Inserts `symbol`, returning whether it was new. A symbol of the wrong
    /// class is refused.
    pub fn insert(&mut self, symbol: Symbol) -> Result<bool> {
        match self.class {
            Some(expected) if symbol.class() != expected => {
                Err(Error::SymbolClass { symbol, expected })
            }
            _ => Ok(self.symbols.insert(symbol)),
        }
    }

    pub fn contains(&self, symbol: Symbol) -> bool {
        self.symbols.contains(&symbol)
    }

    pub fn iter(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.symbols.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn as_set(&self) -> &BTreeSet<Symbol> {
        &self.symbols
    }
}

impl<'a> IntoIterator for &'a Alphabet {
    type Item = &'a Symbol;
    type IntoIter = std::collections::btree_set::Iter<'a, Symbol>;

    fn into_iter(self) -> Self::IntoIter {
        self.symbols.iter()
    }
}

/// Hands out non-terminals not yet in use: `A`..`Z` first, then the remaining
/// Unicode upper-case letters in code point order.
#[derive(Debug, Clone)]
pub struct FreshSymbols {
    taken: BTreeSet<Symbol>,
}

impl FreshSymbols {
    pub fn new(taken: impl IntoIterator<Item = Symbol>) -> Self {
        Self {
            taken: taken.into_iter().collect(),
        }
    }

    pub fn next(&mut self) -> Result<Symbol> {
        let candidate = ('A'..='Z')
            .chain(('\u{c0}'..=char::MAX).filter(|c| c.is_uppercase()))
            .map(Symbol::from)
            .find(|s| !self.taken.contains(s))
            .ok_or(Error::SymbolsExhausted)?;
        self.taken.insert(candidate);
        Ok(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn classification() {
        assert!(Symbol::from('S').is_non_terminal());
        assert!(Symbol::from('a').is_terminal());
        assert!(Symbol::from('+').is_terminal());
        assert!(Symbol::from('Ä').is_non_terminal());
    }

    #[test]
    fn alphabet_refuses_wrong_class() {
        let mut alphabet = Alphabet::non_terminals();
        assert_eq!(alphabet.insert('A'.into()), Ok(true));
        assert_eq!(alphabet.insert('A'.into()), Ok(false));
        assert_eq!(
            alphabet.insert('a'.into()),
            Err(Error::SymbolClass {
                symbol: 'a'.into(),
                expected: SymbolClass::NonTerminal
            })
        );
        assert_eq!(alphabet.len(), 1);
    }

    #[test]
    fn alphabet_is_ordered() {
        let mut alphabet = Alphabet::new();
        for c in "cab".chars() {
            alphabet.insert(c.into()).unwrap();
        }
        assert_eq!(alphabet.iter().map(Symbol::as_char).collect::<String>(), "abc");
    }

    #[test]
    fn fresh_symbols_skip_taken() {
        let mut fresh = FreshSymbols::new(symbols("ABD"));
        assert_eq!(fresh.next(), Ok('C'.into()));
        assert_eq!(fresh.next(), Ok('E'.into()));

        let mut fresh = FreshSymbols::new(('A'..='Z').map(Symbol::from));
        assert_eq!(fresh.next(), Ok('À'.into()));
    }
}
