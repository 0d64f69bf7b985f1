use std::collections::{BTreeMap, BTreeSet};

use super::StateId;
use crate::grammar::Symbol;

/// Non-deterministic transition relation. `None` labels an epsilon move;
/// every state also has an implicit epsilon move onto itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transitions {
    edges: BTreeMap<(StateId, Option<Symbol>), BTreeSet<StateId>>,
}

impl Transitions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, from: StateId, symbol: Option<Symbol>, to: StateId) -> bool {
        self.edges.entry((from, symbol)).or_default().insert(to)
    }

    pub fn targets(&self, from: StateId, symbol: Option<Symbol>) -> BTreeSet<StateId> {
        let mut targets = self
            .edges
            .get(&(from, symbol))
            .cloned()
            .unwrap_or_default();
        if symbol.is_none() {
            targets.insert(from);
        }
        targets
    }

    /// Every explicit `(source, symbol, destination)` triple.
    pub fn iter(&self) -> impl Iterator<Item = (StateId, Option<Symbol>, StateId)> + '_ {
        self.edges
            .iter()
            .flat_map(|(&(from, symbol), to)| to.iter().map(move |&to| (from, symbol, to)))
    }

    pub fn len(&self) -> usize {
        self.edges.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// At most one destination per `(state, symbol)` and no epsilon moves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeterministicTransitions {
    edges: BTreeMap<(StateId, Symbol), StateId>,
}

impl DeterministicTransitions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `from --symbol--> to` unless `from` already moves elsewhere on
    /// `symbol`; returns whether the relation now holds the transition.
    pub fn add(&mut self, from: StateId, symbol: Symbol, to: StateId) -> bool {
        *self.edges.entry((from, symbol)).or_insert(to) == to
    }

    pub fn next(&self, from: StateId, symbol: Symbol) -> Option<StateId> {
        self.edges.get(&(from, symbol)).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (StateId, Symbol, StateId)> + '_ {
        self.edges
            .iter()
            .map(|(&(from, symbol), &to)| (from, symbol, to))
    }

    /// Outgoing transitions of one state.
    pub fn from_state(&self, from: StateId) -> impl Iterator<Item = (Symbol, StateId)> + '_ {
        self.edges
            .range((from, Symbol::new('\0'))..=(from, Symbol::new(char::MAX)))
            .map(|(&(_, symbol), &to)| (symbol, to))
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn epsilon_self_loop_is_implicit() {
        let t = Transitions::new();
        assert_eq!(t.targets(3, None), BTreeSet::from([3]));
        assert!(t.targets(3, Some('a'.into())).is_empty());
    }

    #[test]
    fn non_deterministic_targets() {
        let mut t = Transitions::new();
        t.add(0, Some('a'.into()), 1);
        t.add(0, Some('a'.into()), 2);
        assert_eq!(t.targets(0, Some('a'.into())), BTreeSet::from([1, 2]));
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn deterministic_refuses_second_destination() {
        let mut t = DeterministicTransitions::new();
        assert!(t.add(0, 'a'.into(), 1));
        assert!(t.add(0, 'a'.into(), 1));
        assert!(!t.add(0, 'a'.into(), 2));
        assert!(t.add(1, 'b'.into(), 0));
        assert_eq!(t.next(0, 'a'.into()), Some(1));
        assert_eq!(t.from_state(0).collect::<Vec<_>>(), vec![('a'.into(), 1)]);
    }
}
