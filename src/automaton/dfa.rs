use std::collections::{BTreeSet, VecDeque};

use log::{debug, trace};

use super::{DeterministicTransitions, Nfa, State, StateId, States};
use crate::grammar::Symbol;

/// Deterministic automaton. Built by powerset construction, each state's
/// identity is the set of NFA states it stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dfa {
    states: States,
    alphabet: BTreeSet<Symbol>,
    transitions: DeterministicTransitions,
    initial: StateId,
}

impl Dfa {
    pub fn from_nfa(nfa: &Nfa) -> Self {
        let mut states = States::new();
        let mut transitions = DeterministicTransitions::new();

        let start = nfa.epsilon_closure(&BTreeSet::from([nfa.initial()]));
        let (initial, _) = states.intern(start);
        let mut q: VecDeque<StateId> = VecDeque::from([initial]);

        while let Some(u) = q.pop_front() {
            let subset = match states.get(u) {
                Some(state) => state.identity().clone(),
                None => continue,
            };
            for &symbol in nfa.alphabet() {
                let target = nfa.step(&subset, symbol);
                if target.is_empty() {
                    continue;
                }
                let (v, inserted) = states.intern(target);
                if inserted {
                    trace!("powerset: new state {} via {} from {}", v, symbol, u);
                    q.push_back(v);
                }
                transitions.add(u, symbol, v);
            }
        }

        let finals = nfa.finals();
        let ids: Vec<StateId> = states.iter().map(|(id, _)| id).collect();
        for id in ids {
            if let Some(state) = states.get_mut(id) {
                let is_final = state.identity().iter().any(|s| finals.contains(s));
                state.set_initial(id == initial);
                state.set_final(is_final);
            }
        }

        debug!(
            "powerset construction: {} NFA states -> {} DFA states",
            nfa.states().len(),
            states.len()
        );

        Self {
            states,
            alphabet: nfa.alphabet().clone(),
            transitions,
            initial,
        }
    }

    pub fn states(&self) -> &States {
        &self.states
    }

    pub fn state(&self, id: StateId) -> Option<&State> {
        self.states.get(id)
    }

    pub fn alphabet(&self) -> &BTreeSet<Symbol> {
        &self.alphabet
    }

    pub fn transitions(&self) -> &DeterministicTransitions {
        &self.transitions
    }

    pub fn initial(&self) -> StateId {
        self.initial
    }

    pub fn next(&self, from: StateId, symbol: Symbol) -> Option<StateId> {
        self.transitions.next(from, symbol)
    }

    pub fn accepts(&self, word: &[Symbol]) -> bool {
        let mut current = self.initial;
        for &symbol in word {
            match self.next(current, symbol) {
                Some(next) => current = next,
                None => return false,
            }
        }
        self.state(current).map_or(false, State::is_final)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::symbol::symbols;
    use crate::grammar::testing::words;
    use pretty_assertions::assert_eq;

    /// Four states recognising `a b*`, with epsilon moves 0 -> 1 and 2 -> 3.
    fn a_then_bs() -> Nfa {
        let mut nfa = Nfa::new();
        let q1 = nfa.add_state(false);
        let q2 = nfa.add_state(false);
        let q3 = nfa.add_state(true);
        nfa.add_transition(0, None, q1);
        nfa.add_transition(q1, Some('a'.into()), q2);
        nfa.add_transition(q2, None, q3);
        nfa.add_transition(q3, Some('b'.into()), q3);
        nfa
    }

    #[test]
    fn powerset_collapses_epsilon_moves() {
        let nfa = a_then_bs();
        assert_eq!(nfa.states().len(), 4);

        let dfa = nfa.to_dfa();
        assert_eq!(dfa.states().len(), 3);
        assert_eq!(
            dfa.state(dfa.initial()).unwrap().identity(),
            &BTreeSet::from([0, 1])
        );
        assert!(dfa.state(dfa.initial()).unwrap().is_initial());

        let identities: Vec<&BTreeSet<usize>> =
            dfa.states().iter().map(|(_, s)| s.identity()).collect();
        assert_eq!(
            identities,
            vec![
                &BTreeSet::from([0, 1]),
                &BTreeSet::from([2, 3]),
                &BTreeSet::from([3])
            ]
        );
        assert_eq!(dfa.states().finals(), BTreeSet::from([1, 2]));
    }

    #[test]
    fn powerset_preserves_language() {
        let nfa = a_then_bs();
        let dfa = nfa.to_dfa();
        for word in words("ab", 6) {
            let word = symbols(&word);
            assert_eq!(nfa.accepts(&word), dfa.accepts(&word), "{:?}", word);
        }
        assert!(dfa.accepts(&symbols("abbb")));
        assert!(!dfa.accepts(&symbols("ba")));
        assert!(!dfa.accepts(&symbols("")));
    }

    #[test]
    fn powerset_merges_non_deterministic_branches() {
        // (a|ab) with two branches on `a` from the start
        let mut nfa = Nfa::new();
        let q1 = nfa.add_state(true);
        let q2 = nfa.add_state(false);
        let q3 = nfa.add_state(true);
        nfa.add_transition(0, Some('a'.into()), q1);
        nfa.add_transition(0, Some('a'.into()), q2);
        nfa.add_transition(q2, Some('b'.into()), q3);

        let dfa = nfa.to_dfa();
        assert_eq!(dfa.states().len(), 3);
        let after_a = dfa.next(dfa.initial(), 'a'.into()).unwrap();
        assert_eq!(
            dfa.state(after_a).unwrap().identity(),
            &BTreeSet::from([q1, q2])
        );
        for word in words("ab", 4) {
            let word = symbols(&word);
            assert_eq!(nfa.accepts(&word), dfa.accepts(&word));
        }
    }

    #[test]
    fn initial_state_can_be_final() {
        let mut nfa = Nfa::new();
        let q1 = nfa.add_state(true);
        nfa.add_transition(0, None, q1);
        let dfa = nfa.to_dfa();
        assert_eq!(dfa.states().len(), 1);
        assert!(dfa.accepts(&[]));
    }
}
