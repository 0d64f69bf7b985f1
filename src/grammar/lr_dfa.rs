use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use log::debug;
use serde::Serialize;

use super::production::Production;
use super::symbol::Symbol;
use super::{Grammar, END_MARK};
use crate::automaton::{Dfa, Nfa, StateId};
use crate::{Error, Result};

/// `[A -> α.β, a]`: a production with a dot and one lookahead terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Item {
    pub production: usize,
    pub dot: usize,
    pub lookahead: Symbol,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Action {
    Shift(StateId),
    Reduce(usize),
    Goto(StateId),
    Accept,
}

/// Canonical LR(1) collection and its action/goto table.
#[derive(Debug, Clone)]
pub struct Lr1Automaton {
    productions: Vec<Production>,
    epsilon: Symbol,
    items: Vec<Item>,
    nfa: Nfa,
    dfa: Dfa,
    table: BTreeMap<(StateId, Symbol), BTreeSet<Action>>,
}

struct ItemGraph {
    nfa: Nfa,
    items: Vec<Item>,
    index: HashMap<Item, StateId>,
    queue: VecDeque<StateId>,
}

impl ItemGraph {
    fn new(start: Item) -> Self {
        Self {
            nfa: Nfa::new(),
            items: vec![start],
            index: HashMap::from([(start, 0)]),
            queue: VecDeque::from([0]),
        }
    }

    fn intern(&mut self, item: Item) -> StateId {
        if let Some(&id) = self.index.get(&item) {
            return id;
        }
        let id = self.nfa.add_state(false);
        self.items.push(item);
        self.index.insert(item, id);
        self.queue.push_back(id);
        id
    }
}

impl Lr1Automaton {
    pub fn new(grammar: &Grammar) -> Result<Self> {
        if grammar.terminals().contains(END_MARK) {
            return Err(Error::ReservedSymbol(END_MARK));
        }

        let start = grammar.fresh_symbols().next()?;
        let productions: Vec<Production> =
            std::iter::once(Production::from_symbols(start, vec![grammar.axiom()]))
                .chain(grammar.productions().cloned())
                .collect();
        let augmented = grammar
            .with_productions(productions.iter().cloned())
            .with_axiom(start);
        let first = augmented.first_sets();

        let mut graph = ItemGraph::new(Item {
            production: 0,
            dot: 0,
            lookahead: END_MARK,
        });
        while let Some(u) = graph.queue.pop_front() {
            let item = graph.items[u];
            let right = productions[item.production].right();
            let next = match right.get(item.dot) {
                Some(&next) => next,
                None => {
                    graph.nfa.set_final(u, true);
                    continue;
                }
            };

            let advanced = graph.intern(Item {
                dot: item.dot + 1,
                ..item
            });
            graph.nfa.add_transition(u, Some(next), advanced);

            if next.is_non_terminal() {
                let (mut lookaheads, nullable) = first.of_sequence(&right[item.dot + 1..]);
                if nullable {
                    lookaheads.insert(item.lookahead);
                }
                for (p, production) in productions.iter().enumerate() {
                    if production.left() != next {
                        continue;
                    }
                    for &lookahead in &lookaheads {
                        let v = graph.intern(Item {
                            production: p,
                            dot: 0,
                            lookahead,
                        });
                        graph.nfa.add_transition(u, None, v);
                    }
                }
            }
        }

        let dfa = graph.nfa.to_dfa();
        debug!(
            "LR(1): {} items, {} states",
            graph.items.len(),
            dfa.states().len()
        );

        let mut automaton = Self {
            productions,
            epsilon: grammar.epsilon(),
            items: graph.items,
            nfa: graph.nfa,
            dfa,
            table: BTreeMap::new(),
        };
        automaton.build_table();
        Ok(automaton)
    }

    fn build_table(&mut self) {
        let mut table: BTreeMap<(StateId, Symbol), BTreeSet<Action>> = BTreeMap::new();
        for (q, state) in self.dfa.states().iter() {
            for &id in state.identity() {
                let item = self.items[id];
                match self.productions[item.production].right().get(item.dot) {
                    Some(&s) if s.is_terminal() => {
                        if let Some(t) = self.dfa.next(q, s) {
                            table.entry((q, s)).or_default().insert(Action::Shift(t));
                        }
                    }
                    Some(_) => {}
                    None if item.production == 0 => {
                        table
                            .entry((q, item.lookahead))
                            .or_default()
                            .insert(Action::Accept);
                    }
                    None => {
                        table
                            .entry((q, item.lookahead))
                            .or_default()
                            .insert(Action::Reduce(item.production));
                    }
                }
            }
            for (symbol, t) in self.dfa.transitions().from_state(q) {
                if symbol.is_non_terminal() {
                    table.entry((q, symbol)).or_default().insert(Action::Goto(t));
                }
            }
        }
        self.table = table;
    }

    /// Productions of the augmented grammar; index 0 is `S' -> S`.
    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    pub fn production(&self, index: usize) -> Option<&Production> {
        self.productions.get(index)
    }

    pub fn epsilon(&self) -> Symbol {
        self.epsilon
    }

    pub fn nfa(&self) -> &Nfa {
        &self.nfa
    }

    pub fn dfa(&self) -> &Dfa {
        &self.dfa
    }

    pub fn initial(&self) -> StateId {
        self.dfa.initial()
    }

    /// Items of a deterministic state, in a stable order.
    pub fn items(&self, state: StateId) -> Vec<Item> {
        let mut items: Vec<Item> = self
            .dfa
            .state(state)
            .map(|s| s.identity().iter().map(|&id| self.items[id]).collect())
            .unwrap_or_default();
        items.sort();
        items
    }

    pub fn table(&self) -> &BTreeMap<(StateId, Symbol), BTreeSet<Action>> {
        &self.table
    }

    pub fn actions(&self, state: StateId, symbol: Symbol) -> Option<&BTreeSet<Action>> {
        self.table.get(&(state, symbol))
    }

    /// The action for a cell holding exactly one.
    pub fn action(&self, state: StateId, symbol: Symbol) -> Option<Action> {
        match self.actions(state, symbol) {
            Some(actions) if actions.len() == 1 => actions.iter().next().copied(),
            _ => None,
        }
    }

    pub fn goto(&self, state: StateId, symbol: Symbol) -> Option<StateId> {
        self.actions(state, symbol)?.iter().find_map(|a| match a {
            Action::Goto(t) => Some(*t),
            _ => None,
        })
    }

    /// Cells holding more than one action.
    pub fn conflicts(&self) -> Vec<(StateId, Symbol, &BTreeSet<Action>)> {
        self.table
            .iter()
            .filter(|(_, actions)| actions.len() > 1)
            .map(|(&(q, s), actions)| (q, s, actions))
            .collect()
    }

    pub fn is_lr1(&self) -> bool {
        self.table.values().all(|actions| actions.len() <= 1)
    }

    /// Terminals heading the action columns, end marker last.
    pub fn terminals(&self) -> Vec<Symbol> {
        let mut terminals: BTreeSet<Symbol> = self
            .productions
            .iter()
            .flat_map(|p| p.right().iter().copied())
            .filter(|s| s.is_terminal())
            .collect();
        terminals.remove(&END_MARK);
        terminals.into_iter().chain([END_MARK]).collect()
    }

    /// Non-terminals heading the goto columns, augmented axiom left out.
    pub fn non_terminals(&self) -> Vec<Symbol> {
        let augmented = self.productions[0].left();
        self.productions
            .iter()
            .map(Production::left)
            .filter(|&s| s != augmented)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
