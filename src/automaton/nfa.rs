use std::collections::{BTreeSet, VecDeque};

use super::{Dfa, StateId, States, Transitions};
use crate::grammar::Symbol;

/// Finite automaton with epsilon moves. State `0` is created with the
/// automaton and is its initial state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nfa {
    states: States,
    alphabet: BTreeSet<Symbol>,
    transitions: Transitions,
    initial: StateId,
}

impl Default for Nfa {
    fn default() -> Self {
        Self::new()
    }
}

impl Nfa {
    pub fn new() -> Self {
        let mut states = States::new();
        let (initial, _) = states.intern(BTreeSet::from([0]));
        if let Some(state) = states.get_mut(initial) {
            state.set_initial(true);
        }
        Self {
            states,
            alphabet: BTreeSet::new(),
            transitions: Transitions::new(),
            initial,
        }
    }

    pub fn add_state(&mut self, is_final: bool) -> StateId {
        let (id, _) = self.states.intern(BTreeSet::from([self.states.len()]));
        self.set_final(id, is_final);
        id
    }

    pub fn set_final(&mut self, id: StateId, is_final: bool) {
        if let Some(state) = self.states.get_mut(id) {
            state.set_final(is_final);
        }
    }

    /// Adds a move on `symbol`, or an epsilon move for `None`.
    pub fn add_transition(&mut self, from: StateId, symbol: Option<Symbol>, to: StateId) {
        if let Some(symbol) = symbol {
            self.alphabet.insert(symbol);
        }
        self.transitions.add(from, symbol, to);
    }

    pub fn states(&self) -> &States {
        &self.states
    }

    pub fn alphabet(&self) -> &BTreeSet<Symbol> {
        &self.alphabet
    }

    pub fn transitions(&self) -> &Transitions {
        &self.transitions
    }

    pub fn initial(&self) -> StateId {
        self.initial
    }

    pub fn finals(&self) -> BTreeSet<StateId> {
        self.states.finals()
    }

    pub fn epsilon_closure(&self, set: &BTreeSet<StateId>) -> BTreeSet<StateId> {
        let mut closure = set.clone();
        let mut q: VecDeque<StateId> = set.iter().copied().collect();
        while let Some(u) = q.pop_front() {
            for v in self.transitions.targets(u, None) {
                if closure.insert(v) {
                    q.push_back(v);
                }
            }
        }
        closure
    }

    /// Epsilon closure of every state reachable from `set` on `symbol`.
    pub fn step(&self, set: &BTreeSet<StateId>, symbol: Symbol) -> BTreeSet<StateId> {
        let moved: BTreeSet<StateId> = set
            .iter()
            .flat_map(|&u| self.transitions.targets(u, Some(symbol)))
            .collect();
        self.epsilon_closure(&moved)
    }

    pub fn accepts(&self, word: &[Symbol]) -> bool {
        let mut current = self.epsilon_closure(&BTreeSet::from([self.initial]));
        for &symbol in word {
            current = self.step(&current, symbol);
            if current.is_empty() {
                return false;
            }
        }
        let finals = self.finals();
        current.iter().any(|s| finals.contains(s))
    }

    pub fn to_dfa(&self) -> Dfa {
        Dfa::from_nfa(self)
    }
}
