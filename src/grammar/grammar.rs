use std::collections::BTreeSet;
use std::fmt;

use super::production::Production;
use super::symbol::{Alphabet, FreshSymbols, Symbol, SymbolClass};
use super::EPSILON;
use crate::{Error, Result};

/// Caps on how far the rewriting pipelines may grow a grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_productions: usize,
    pub max_rounds: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_productions: 10_000,
            max_rounds: 1_000,
        }
    }
}

impl Limits {
    pub(crate) fn check(&self, productions: usize) -> Result<()> {
        if productions > self.max_productions {
            Err(Error::LimitExceeded {
                what: "productions",
                limit: self.max_productions,
            })
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    axiom: Symbol,
    epsilon: Symbol,
    productions: BTreeSet<Production>,
}

impl Grammar {
    pub fn builder() -> GrammarBuilder {
        GrammarBuilder::new()
    }

    /// Parses the compact notation with the default epsilon sentinel.
    pub fn parse(grammar: &str) -> Result<Self> {
        GrammarBuilder::new().notation(grammar)?.build()
    }

    pub fn axiom(&self) -> Symbol {
        self.axiom
    }

    pub fn epsilon(&self) -> Symbol {
        self.epsilon
    }

    pub fn productions(&self) -> impl Iterator<Item = &Production> + '_ {
        self.productions.iter()
    }

    pub fn production_set(&self) -> &BTreeSet<Production> {
        &self.productions
    }

    pub fn productions_of(&self, left: Symbol) -> impl Iterator<Item = &Production> + '_ {
        self.productions.iter().filter(move |p| p.left() == left)
    }

    pub fn contains(&self, production: &Production) -> bool {
        self.productions.contains(production)
    }

    pub fn len(&self) -> usize {
        self.productions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.productions.is_empty()
    }

    /// The axiom has at least one production.
    pub fn has_axiom_rule(&self) -> bool {
        self.productions().any(|p| p.left() == self.axiom)
    }

    pub fn has_axiom_epsilon(&self) -> bool {
        self.productions_of(self.axiom).any(Production::is_epsilon)
    }

    pub fn axiom_on_right(&self) -> bool {
        self.productions().any(|p| p.right().contains(&self.axiom))
    }

    /// Every symbol mentioned by some production.
    pub fn symbols(&self) -> BTreeSet<Symbol> {
        self.productions
            .iter()
            .flat_map(|p| std::iter::once(p.left()).chain(p.right().iter().copied()))
            .collect()
    }

    pub fn terminals(&self) -> Alphabet {
        Alphabet::collect(SymbolClass::Terminal, self.symbols())
    }

    pub fn non_terminals(&self) -> Alphabet {
        Alphabet::collect(SymbolClass::NonTerminal, self.symbols())
    }

    /// A grammar with the same axiom and epsilon over another production set.
    pub fn with_productions(&self, productions: impl IntoIterator<Item = Production>) -> Self {
        Self {
            axiom: self.axiom,
            epsilon: self.epsilon,
            productions: productions.into_iter().collect(),
        }
    }

    pub fn with_axiom(mut self, axiom: Symbol) -> Self {
        self.axiom = axiom;
        self
    }

    pub(crate) fn fresh_symbols(&self) -> FreshSymbols {
        FreshSymbols::new(
            self.symbols()
                .into_iter()
                .chain([self.axiom, self.epsilon]),
        )
    }

    /// Left sides in the order they are listed: axiom first, the rest sorted.
    pub fn lefts(&self) -> Vec<Symbol> {
        let mut lefts: Vec<Symbol> = self.productions.iter().map(Production::left).collect();
        lefts.dedup();
        if let Some(i) = lefts.iter().position(|&s| s == self.axiom) {
            let axiom = lefts.remove(i);
            lefts.insert(0, axiom);
        }
        lefts
    }
}

impl fmt::Display for Grammar {
    /// Writes the grammar back in the notation it is parsed from.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rules = self
            .lefts()
            .into_iter()
            .map(|left| {
                let rights = self
                    .productions_of(left)
                    .map(|p| p.right_to_string(self.epsilon))
                    .collect::<Vec<_>>()
                    .join("|");
                format!("{}->{}", left, rights)
            })
            .collect::<Vec<_>>()
            .join(";");
        write!(f, "{}.", rules)
    }
}

/// Accumulates productions and produces an independent [`Grammar`].
#[derive(Debug, Clone)]
pub struct GrammarBuilder {
    axiom: Option<Symbol>,
    epsilon: Symbol,
    rules: Vec<(Symbol, Vec<Symbol>)>,
}

impl Default for GrammarBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GrammarBuilder {
    pub fn new() -> Self {
        Self {
            axiom: None,
            epsilon: EPSILON,
            rules: Vec::new(),
        }
    }

    /// Defaults to the left side of the first production, or `S`.
    pub fn axiom(mut self, axiom: impl Into<Symbol>) -> Self {
        self.axiom = Some(axiom.into());
        self
    }

    pub fn epsilon(mut self, epsilon: impl Into<Symbol>) -> Self {
        self.epsilon = epsilon.into();
        self
    }

    pub fn production(mut self, left: impl Into<Symbol>, right: &str) -> Self {
        self.rules
            .push((left.into(), right.chars().map(Symbol::from).collect()));
        self
    }

    pub fn productions<I>(mut self, productions: I) -> Self
    where
        I: IntoIterator<Item = Production>,
    {
        self.rules.extend(
            productions
                .into_iter()
                .map(|p| (p.left(), p.right().to_vec())),
        );
        self
    }

    pub fn notation(mut self, grammar: &str) -> Result<Self> {
        self.rules.extend(super::parse::parse_rules(grammar)?);
        Ok(self)
    }

    pub fn build(self) -> Result<Grammar> {
        let epsilon = self.epsilon;
        if epsilon.is_non_terminal() {
            return Err(Error::InvalidEpsilon(epsilon));
        }

        let mut productions = BTreeSet::new();
        for (left, right) in &self.rules {
            if !left.is_non_terminal() {
                return Err(Error::SymbolClass {
                    symbol: *left,
                    expected: SymbolClass::NonTerminal,
                });
            }
            productions.insert(Production::new(*left, right.iter().copied(), epsilon));
        }

        let axiom = self
            .axiom
            .or_else(|| self.rules.first().map(|(left, _)| *left))
            .unwrap_or(Symbol::new('S'));
        if !axiom.is_non_terminal() {
            return Err(Error::SymbolClass {
                symbol: axiom,
                expected: SymbolClass::NonTerminal,
            });
        }

        Ok(Grammar {
            axiom,
            epsilon,
            productions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::symbol::symbols;
    use pretty_assertions::assert_eq;

    #[test]
    fn builder_defaults_axiom_to_first_left_side() {
        let g = Grammar::builder()
            .production('A', "a")
            .production('S', "A")
            .build()
            .unwrap();
        assert_eq!(g.axiom(), Symbol::new('A'));

        let g = Grammar::builder().build().unwrap();
        assert_eq!(g.axiom(), Symbol::new('S'));
        assert!(g.is_empty());
        assert!(!g.has_axiom_rule());
    }

    #[test]
    fn builder_rejects_terminal_left_side() {
        let r = Grammar::builder().production('a', "b").build();
        assert_eq!(
            r,
            Err(Error::SymbolClass {
                symbol: 'a'.into(),
                expected: SymbolClass::NonTerminal
            })
        );
    }

    #[test]
    fn builder_rejects_upper_case_epsilon() {
        let r = Grammar::builder().epsilon('E').build();
        assert_eq!(r, Err(Error::InvalidEpsilon('E'.into())));
    }

    #[test]
    fn custom_epsilon() {
        let g = Grammar::builder()
            .epsilon('_')
            .notation("S->aS|_.")
            .unwrap()
            .build()
            .unwrap();
        assert!(g.has_axiom_epsilon());
        assert_eq!(g.to_string(), "S->_|aS.");
    }

    #[test]
    fn builders_are_independent() {
        let base = Grammar::builder().production('S', "a");
        let one = base.clone().production('S', "b").build().unwrap();
        let two = base.build().unwrap();
        assert_eq!(one.len(), 2);
        assert_eq!(two.len(), 1);
    }

    #[test]
    fn duplicate_productions_collapse() {
        let g = Grammar::parse("S->aε|εa|a.").unwrap();
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn derived_alphabets() {
        let g = Grammar::parse("S->aA|ε;A->bS.").unwrap();
        assert_eq!(g.terminals().iter().collect::<Vec<_>>(), symbols("ab"));
        assert_eq!(g.non_terminals().iter().collect::<Vec<_>>(), symbols("AS"));
    }

    #[test]
    fn display_lists_axiom_first() {
        let g = Grammar::parse("S->AB;A->a;B->b|S.").unwrap();
        assert_eq!(g.to_string(), "S->AB;A->a;B->S|b.");
        assert_eq!(Grammar::parse(&g.to_string()).unwrap(), g);
    }
}
