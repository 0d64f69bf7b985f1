use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::Serialize;

use super::lr_dfa::Lr1Automaton;
use super::production::Production;
use super::symbol::Symbol;
use super::Grammar;

/// Every derived property of a grammar, as reported by `analyze`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Analysis {
    pub axiom: Symbol,
    pub terminals: Vec<Symbol>,
    pub non_terminals: Vec<Symbol>,
    pub nullable: Vec<Symbol>,
    pub generating: Vec<Symbol>,
    pub reachable: Vec<Symbol>,
    pub useless: Vec<Symbol>,
    pub unit_productions: Vec<String>,
    pub epsilon_productions: Vec<String>,
    pub cnf: bool,
    pub gnf: bool,
    /// `None` when no LR(1) automaton can be built for the grammar.
    pub lr1: Option<bool>,
}

impl Grammar {
    pub fn analyze(&self) -> Analysis {
        let show = |productions: Vec<&Production>| -> Vec<String> {
            productions
                .into_iter()
                .map(|p| p.display(self.epsilon()).to_string())
                .collect()
        };

        Analysis {
            axiom: self.axiom(),
            terminals: self.terminals().iter().collect(),
            non_terminals: self.non_terminals().iter().collect(),
            nullable: self.nullable_symbols().into_iter().collect(),
            generating: self.generating_symbols().into_iter().collect(),
            reachable: self.reachable_symbols().into_iter().collect(),
            useless: self.useless_symbols().into_iter().collect(),
            unit_productions: show(self.unit_productions()),
            epsilon_productions: show(self.epsilon_productions()),
            cnf: self.is_cnf(),
            gnf: self.is_gnf(),
            lr1: Lr1Automaton::new(self).ok().map(|automaton| automaton.is_lr1()),
        }
    }

    /// Non-terminals deriving the empty word.
    pub fn nullable_symbols(&self) -> BTreeSet<Symbol> {
        if !self.has_axiom_rule() {
            return BTreeSet::new();
        }
        self.calculate_nullable()
    }

    fn calculate_nullable(&self) -> BTreeSet<Symbol> {
        let mut nullable = BTreeSet::new();
        let mut changed = true;
        while changed {
            changed = false;
            for production in self.productions() {
                if nullable.contains(&production.left()) {
                    continue;
                }
                if production.right().iter().all(|s| nullable.contains(s)) {
                    nullable.insert(production.left());
                    changed = true;
                }
            }
        }
        nullable
    }

    /// Symbols deriving some terminal word. Terminals generate themselves.
    pub fn generating_symbols(&self) -> BTreeSet<Symbol> {
        if !self.has_axiom_rule() {
            return BTreeSet::new();
        }

        let mut generating: BTreeSet<Symbol> = self.terminals().iter().collect();
        let mut changed = true;
        while changed {
            changed = false;
            for production in self.productions() {
                if generating.contains(&production.left()) {
                    continue;
                }
                if production.right().iter().all(|s| generating.contains(s)) {
                    generating.insert(production.left());
                    changed = true;
                }
            }
        }
        generating
    }

    /// Symbols occurring in some sentential form derived from the axiom.
    pub fn reachable_symbols(&self) -> BTreeSet<Symbol> {
        if !self.has_axiom_rule() {
            return BTreeSet::new();
        }

        let mut reachable = BTreeSet::from([self.axiom()]);
        let mut q: VecDeque<Symbol> = VecDeque::from([self.axiom()]);
        while let Some(left) = q.pop_front() {
            for production in self.productions_of(left) {
                for &s in production.right() {
                    if reachable.insert(s) {
                        q.push_back(s);
                    }
                }
            }
        }
        reachable
    }

    pub fn ungenerative_symbols(&self) -> BTreeSet<Symbol> {
        if !self.has_axiom_rule() {
            return BTreeSet::new();
        }
        let generating = self.generating_symbols();
        self.symbols()
            .into_iter()
            .filter(|s| !generating.contains(s))
            .collect()
    }

    pub fn unreachable_symbols(&self) -> BTreeSet<Symbol> {
        if !self.has_axiom_rule() {
            return BTreeSet::new();
        }
        let reachable = self.reachable_symbols();
        self.symbols()
            .into_iter()
            .filter(|s| !reachable.contains(s))
            .collect()
    }

    /// Non-generating symbols, plus whatever is unreachable once they are gone.
    pub fn useless_symbols(&self) -> BTreeSet<Symbol> {
        if !self.has_axiom_rule() {
            return BTreeSet::new();
        }

        let generating = self.generating_symbols();
        let pruned = self.with_productions(
            self.productions()
                .filter(|p| {
                    generating.contains(&p.left())
                        && p.right().iter().all(|s| generating.contains(s))
                })
                .cloned(),
        );
        let reachable = pruned.reachable_symbols();

        self.symbols()
            .into_iter()
            .filter(|s| !reachable.contains(s))
            .collect()
    }

    pub fn unit_productions(&self) -> Vec<&Production> {
        if !self.has_axiom_rule() {
            return Vec::new();
        }
        self.productions().filter(|p| p.is_unit()).collect()
    }

    pub fn epsilon_productions(&self) -> Vec<&Production> {
        if !self.has_axiom_rule() {
            return Vec::new();
        }
        self.productions().filter(|p| p.is_epsilon()).collect()
    }

    pub fn first_sets(&self) -> FirstSets {
        let mut sets = FirstSets {
            first: self
                .non_terminals()
                .iter()
                .map(|nt| (nt, BTreeSet::new()))
                .collect(),
            nullable: self.calculate_nullable(),
        };

        let mut changed = true;
        while changed {
            changed = false;
            for production in self.productions() {
                let (first, _) = sets.of_sequence(production.right());
                let entry = sets.first.entry(production.left()).or_default();
                let before = entry.len();
                entry.extend(first);
                if entry.len() != before {
                    changed = true;
                }
            }
        }
        sets
    }
}

/// FIRST of every non-terminal, together with the nullable set it was
/// computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirstSets {
    first: BTreeMap<Symbol, BTreeSet<Symbol>>,
    nullable: BTreeSet<Symbol>,
}

impl FirstSets {
    pub fn of(&self, symbol: Symbol) -> BTreeSet<Symbol> {
        if symbol.is_terminal() {
            BTreeSet::from([symbol])
        } else {
            self.first.get(&symbol).cloned().unwrap_or_default()
        }
    }

    pub fn is_nullable(&self, symbol: Symbol) -> bool {
        self.nullable.contains(&symbol)
    }

    /// FIRST of a symbol sequence, and whether the whole sequence is nullable.
    pub fn of_sequence(&self, sequence: &[Symbol]) -> (BTreeSet<Symbol>, bool) {
        let mut first = BTreeSet::new();
        for &symbol in sequence {
            first.extend(self.of(symbol));
            if !self.is_nullable(symbol) {
                return (first, false);
            }
        }
        (first, true)
    }
}
