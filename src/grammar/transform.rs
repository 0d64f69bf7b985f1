use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;
use std::str::FromStr;

use log::{debug, info};

use super::production::Production;
use super::symbol::{FreshSymbols, Symbol};
use super::{Grammar, Limits};
use crate::{Error, Result};

/// The rewrites selectable by name from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transformation {
    RemoveUngenerative,
    RemoveUnreachable,
    RemoveUseless,
    RemoveEpsilonProductions,
    RemoveUnitProductions,
    EliminateLeftRecursion,
    ToCnf,
    ToGnf,
}

impl Transformation {
    pub const ALL: [Transformation; 8] = [
        Transformation::RemoveUngenerative,
        Transformation::RemoveUnreachable,
        Transformation::RemoveUseless,
        Transformation::RemoveEpsilonProductions,
        Transformation::RemoveUnitProductions,
        Transformation::EliminateLeftRecursion,
        Transformation::ToCnf,
        Transformation::ToGnf,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Transformation::RemoveUngenerative => "remove-ungenerative",
            Transformation::RemoveUnreachable => "remove-unreachable",
            Transformation::RemoveUseless => "remove-useless",
            Transformation::RemoveEpsilonProductions => "remove-epsilon-productions",
            Transformation::RemoveUnitProductions => "remove-unit-productions",
            Transformation::EliminateLeftRecursion => "eliminate-left-recursion",
            Transformation::ToCnf => "to-cnf",
            Transformation::ToGnf => "to-gnf",
        }
    }

    pub fn apply(self, grammar: &Grammar, limits: Limits) -> Result<Grammar> {
        info!("applying {}", self);
        match self {
            Transformation::RemoveUngenerative => Ok(grammar.remove_ungenerative()),
            Transformation::RemoveUnreachable => Ok(grammar.remove_unreachable()),
            Transformation::RemoveUseless => Ok(grammar.remove_useless()),
            Transformation::RemoveEpsilonProductions => Ok(grammar.remove_epsilon_productions()),
            Transformation::RemoveUnitProductions => Ok(grammar.remove_unit_productions()),
            Transformation::EliminateLeftRecursion => grammar.eliminate_left_recursion_with(limits),
            Transformation::ToCnf => grammar.to_cnf(),
            Transformation::ToGnf => grammar.to_gnf_with(limits),
        }
    }
}

impl fmt::Display for Transformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Transformation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_ascii_lowercase().replace('_', "-");
        Transformation::ALL
            .into_iter()
            .find(|t| t.name() == key)
            .ok_or_else(|| Error::UnknownTransformation(s.to_string()))
    }
}

impl Grammar {
    fn retain(&self, keep: impl Fn(&Production) -> bool, what: &str) -> Grammar {
        let g = self.with_productions(self.productions().filter(|p| keep(p)).cloned());
        debug!("{}: {} -> {} productions", what, self.len(), g.len());
        g
    }

    /// Drops every production mentioning a non-generating symbol.
    pub fn remove_ungenerative(&self) -> Grammar {
        if !self.has_axiom_rule() {
            return self.clone();
        }
        let generating = self.generating_symbols();
        self.retain(
            |p| generating.contains(&p.left()) && p.right().iter().all(|s| generating.contains(s)),
            "remove ungenerative",
        )
    }

    /// Drops every production of an unreachable non-terminal.
    pub fn remove_unreachable(&self) -> Grammar {
        if !self.has_axiom_rule() {
            return self.clone();
        }
        let reachable = self.reachable_symbols();
        self.retain(|p| reachable.contains(&p.left()), "remove unreachable")
    }

    pub fn remove_useless(&self) -> Grammar {
        let useless = self.useless_symbols();
        self.retain(
            |p| !useless.iter().any(|&s| p.mentions(s)),
            "remove useless",
        )
    }

    /// Replaces each production by every variant with some nullable
    /// occurrences deleted. Only the axiom keeps an epsilon production, and
    /// only if it is nullable.
    pub fn remove_epsilon_productions(&self) -> Grammar {
        let nullable = self.nullable_symbols();
        if nullable.is_empty() {
            return self.clone();
        }

        let mut productions = BTreeSet::new();
        for production in self.productions() {
            let mut variants: BTreeSet<Vec<Symbol>> = BTreeSet::from([Vec::new()]);
            for &s in production.right() {
                let mut next = BTreeSet::new();
                for variant in variants {
                    if nullable.contains(&s) {
                        next.insert(variant.clone());
                    }
                    let mut kept = variant;
                    kept.push(s);
                    next.insert(kept);
                }
                variants = next;
            }
            productions.extend(
                variants
                    .into_iter()
                    .filter(|v| !v.is_empty())
                    .map(|v| Production::from_symbols(production.left(), v)),
            );
        }
        if nullable.contains(&self.axiom()) {
            productions.insert(Production::from_symbols(self.axiom(), Vec::new()));
        }

        let g = self.with_productions(productions);
        debug!(
            "remove epsilon productions: {} nullable, {} -> {} productions",
            nullable.len(),
            self.len(),
            g.len()
        );
        g
    }

    /// Non-terminals reachable from `symbol` through one or more unit
    /// productions.
    pub fn unit_closure(&self, symbol: Symbol) -> BTreeSet<Symbol> {
        let mut closure = BTreeSet::new();
        let mut q: VecDeque<Symbol> = VecDeque::from([symbol]);
        while let Some(left) = q.pop_front() {
            for production in self.productions_of(left).filter(|p| p.is_unit()) {
                let target = production.right()[0];
                if closure.insert(target) {
                    q.push_back(target);
                }
            }
        }
        closure
    }

    pub fn remove_unit_productions(&self) -> Grammar {
        if self.unit_productions().is_empty() {
            return self.clone();
        }

        let mut productions = BTreeSet::new();
        for left in self.lefts() {
            let mut sources = self.unit_closure(left);
            sources.insert(left);
            for source in sources {
                productions.extend(
                    self.productions_of(source)
                        .filter(|p| !p.is_unit())
                        .map(|p| Production::from_symbols(left, p.right().to_vec())),
                );
            }
        }

        let g = self.with_productions(productions);
        debug!("remove unit productions: {} -> {} productions", self.len(), g.len());
        g
    }

    /// No useless symbols, no cycles, and no epsilon production except one
    /// for an axiom that occurs on no right side.
    pub(crate) fn proper(&self) -> Result<Grammar> {
        let mut g = self.remove_useless();
        if !g.has_axiom_rule() {
            return Ok(g);
        }

        if g.nullable_symbols().contains(&g.axiom()) && g.axiom_on_right() {
            let axiom = g.fresh_symbols().next()?;
            debug!("new axiom {} for nullable {}", axiom, g.axiom());
            let productions = g.productions().cloned().chain([
                Production::from_symbols(axiom, vec![g.axiom()]),
                Production::from_symbols(axiom, Vec::new()),
            ]);
            g = g.with_productions(productions).with_axiom(axiom);
        }

        Ok(g
            .remove_epsilon_productions()
            .remove_unit_productions()
            .remove_useless())
    }

    /// Every right side is one terminal or two non-terminals; `axiom -> ε` is
    /// allowed while the axiom is kept off every right side.
    pub fn is_cnf(&self) -> bool {
        let axiom_free = !self.axiom_on_right();
        self.productions().all(|p| match p.right() {
            [a] => a.is_terminal(),
            [b, c] => b.is_non_terminal() && c.is_non_terminal(),
            [] => p.left() == self.axiom() && axiom_free,
            _ => false,
        })
    }

    pub fn to_cnf(&self) -> Result<Grammar> {
        if !self.has_axiom_rule() {
            return Ok(self.clone());
        }
        let g = self.proper()?.binarize()?;
        info!("chomsky normal form: {} -> {} productions", self.len(), g.len());
        Ok(g)
    }

    /// Moves terminals out of long right sides and splits every right side
    /// longer than two into a chain of binary productions. Right sides ending
    /// in the same suffix share the non-terminal standing for it.
    fn binarize(&self) -> Result<Grammar> {
        let mut fresh = self.fresh_symbols();
        let mut lifted = TerminalLift::default();
        let mut chains: BTreeMap<Vec<Symbol>, Symbol> = BTreeMap::new();
        let mut productions = BTreeSet::new();

        for production in self.productions() {
            if production.len() <= 1 {
                productions.insert(production.clone());
                continue;
            }

            let right = production
                .right()
                .iter()
                .map(|&s| lifted.lift(s, &mut fresh))
                .collect::<Result<Vec<Symbol>>>()?;
            let mut left = production.left();
            let mut rest = right.as_slice();
            while rest.len() > 2 {
                let tail = &rest[1..];
                if let Some(&shared) = chains.get(tail) {
                    productions.insert(Production::from_symbols(left, vec![rest[0], shared]));
                    rest = &[];
                    break;
                }
                let next = fresh.next()?;
                chains.insert(tail.to_vec(), next);
                productions.insert(Production::from_symbols(left, vec![rest[0], next]));
                left = next;
                rest = tail;
            }
            if !rest.is_empty() {
                productions.insert(Production::from_symbols(left, rest.to_vec()));
            }
        }
        productions.extend(lifted.into_productions());

        Ok(self.with_productions(productions))
    }
}

/// One `T -> a` non-terminal per terminal `a` that has to stand among
/// non-terminals.
#[derive(Debug, Default)]
pub(crate) struct TerminalLift {
    lifted: BTreeMap<Symbol, Symbol>,
}

impl TerminalLift {
    pub(crate) fn lift(&mut self, symbol: Symbol, fresh: &mut FreshSymbols) -> Result<Symbol> {
        if symbol.is_non_terminal() {
            return Ok(symbol);
        }
        if let Some(&nt) = self.lifted.get(&symbol) {
            return Ok(nt);
        }
        let nt = fresh.next()?;
        self.lifted.insert(symbol, nt);
        Ok(nt)
    }

    pub(crate) fn into_productions(self) -> impl Iterator<Item = Production> {
        self.lifted
            .into_iter()
            .map(|(terminal, nt)| Production::from_symbols(nt, vec![terminal]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::testing::language;
    use pretty_assertions::assert_eq;

    fn parse(s: &str) -> Grammar {
        Grammar::parse(s).unwrap()
    }

    #[test]
    fn names_round_trip() {
        for t in Transformation::ALL {
            assert_eq!(t.name().parse::<Transformation>(), Ok(t));
        }
        assert_eq!("TO_CNF".parse::<Transformation>(), Ok(Transformation::ToCnf));
        assert_eq!(
            "to-lnf".parse::<Transformation>(),
            Err(Error::UnknownTransformation("to-lnf".to_string()))
        );
    }

    #[test]
    fn remove_ungenerative() {
        let g = parse("S->a|aB|C;B->bB;C->c.").remove_ungenerative();
        assert_eq!(g, parse("S->a|C;C->c."));
    }

    #[test]
    fn remove_unreachable() {
        let g = parse("S->aA;A->b;B->cS.").remove_unreachable();
        assert_eq!(g, parse("S->aA;A->b."));
    }

    #[test]
    fn remove_useless() {
        let g = parse("S->a|aB;B->bB|CB;C->c;D->d.");
        let cleaned = g.remove_useless();
        assert_eq!(cleaned, parse("S->a."));
        assert!(cleaned.useless_symbols().is_empty());
    }

    #[test]
    fn remove_epsilon_keeps_nullable_axiom() {
        let g = parse("S->AB|ε;A->aA|ε;B->b|ε.");
        let h = g.remove_epsilon_productions();
        assert_eq!(h, parse("S->AB|A|B|ε;A->aA|a;B->b."));
        assert_eq!(language(&g, 4), language(&h, 4));
    }

    #[test]
    fn remove_epsilon_without_nullable_axiom() {
        let g = parse("S->aAb;A->aAb|ε.");
        let h = g.remove_epsilon_productions();
        assert_eq!(h, parse("S->aAb|ab;A->aAb|ab."));
        assert!(h.epsilon_productions().is_empty());
        assert_eq!(language(&g, 6), language(&h, 6));
    }

    #[test]
    fn remove_unit_productions() {
        let g = parse("S->AS|A;A->B|a;B->A|S|b.");
        let h = g.remove_unit_productions();
        assert!(h.unit_productions().is_empty());
        assert_eq!(h, parse("S->AS|a|b;A->AS|a|b;B->AS|a|b."));
        assert_eq!(language(&g, 4), language(&h, 4));
    }

    #[test]
    fn unit_closure() {
        let g = parse("S->A|a;A->B;B->b|C;C->c.");
        assert_eq!(
            g.unit_closure('S'.into()),
            "ABC".chars().map(Symbol::from).collect::<BTreeSet<_>>()
        );
        assert!(g.unit_closure('C'.into()).is_empty());
    }

    #[test]
    fn transformations_on_missing_axiom_are_no_ops() {
        let g = Grammar::builder()
            .axiom('S')
            .production('A', "Aε")
            .production('B', "C")
            .build()
            .unwrap();
        for t in Transformation::ALL {
            assert_eq!(t.apply(&g, Limits::default()).unwrap(), g, "{}", t);
        }
    }

    #[test]
    fn already_cnf_is_recognized() {
        let g = parse("S->CB|FA|FB;A->CS|FD|a;B->FS|CE|b;C->a;D->AA;E->BB;F->b.");
        assert!(g.is_cnf());
        assert!(!parse("S->aS|a.").is_cnf());
        assert!(parse("S->AB|ε;A->a;B->b.").is_cnf());
        assert!(!parse("S->AS|ε;A->a.").is_cnf());
    }

    #[test]
    fn to_cnf() {
        let g = parse("S->aSb|SS|ε.");
        let cnf = g.to_cnf().unwrap();
        assert!(cnf.is_cnf(), "{}", cnf);
        assert!(cnf.has_axiom_epsilon());
        assert_eq!(language(&g, 6), language(&cnf, 6));
    }

    #[test]
    fn to_cnf_long_right_sides() {
        let g = parse("S->abcS|dA;A->a.");
        let cnf = g.to_cnf().unwrap();
        assert!(cnf.is_cnf(), "{}", cnf);
        assert_eq!(language(&g, 7), language(&cnf, 7));
    }

    #[test]
    fn to_cnf_shares_common_suffixes() {
        let g = parse("S->ABCD|BCD|ECD;A->a;B->b;C->c;D->d;E->e.");
        let cnf = g.to_cnf().unwrap();
        assert!(cnf.is_cnf(), "{}", cnf);
        // `BCD` and `CD` each get a single chain symbol.
        assert_eq!(cnf.len(), 10, "{}", cnf);
        assert_eq!(cnf.non_terminals().len(), 8, "{}", cnf);
        assert_eq!(language(&g, 4), language(&cnf, 4));
    }

    #[test]
    fn to_cnf_is_idempotent() {
        for s in [
            "S->aSb|SS|ε.",
            "S->AS|A;A->B|a;B->A|S|b.",
            "E->E+T|T;T->T*F|F;F->(E)|a.",
            "S->CB|FA|FB;A->CS|FD|a;B->FS|CE|b;C->a;D->AA;E->BB;F->b.",
        ] {
            let once = parse(s).to_cnf().unwrap();
            let twice = once.to_cnf().unwrap();
            assert_eq!(once.production_set(), twice.production_set(), "{}", s);
        }
    }

    #[test]
    fn to_cnf_of_empty_language() {
        let g = parse("S->aS.").to_cnf().unwrap();
        assert!(g.is_empty());
        assert!(g.is_cnf());
    }
}
