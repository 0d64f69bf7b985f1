use std::collections::{BTreeSet, HashMap};

/// Stable handle of a state inside its [`States`] arena.
pub type StateId = usize;

/// A state whose identity is a set of underlying ids. A state built directly
/// has a singleton identity; a state from powerset construction holds the ids
/// of every state it subsumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    identity: BTreeSet<usize>,
    initial: bool,
    is_final: bool,
}

impl State {
    pub fn identity(&self) -> &BTreeSet<usize> {
        &self.identity
    }

    pub fn is_initial(&self) -> bool {
        self.initial
    }

    pub fn is_final(&self) -> bool {
        self.is_final
    }

    pub fn set_initial(&mut self, initial: bool) {
        self.initial = initial;
    }

    pub fn set_final(&mut self, is_final: bool) {
        self.is_final = is_final;
    }
}

/// Arena of states, deduplicated by identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct States {
    states: Vec<State>,
    index: HashMap<BTreeSet<usize>, StateId>,
}

impl States {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the handle for `identity`, registering it if unseen. The flag
    /// tells whether a new state was created.
    pub fn intern(&mut self, identity: BTreeSet<usize>) -> (StateId, bool) {
        if let Some(&id) = self.index.get(&identity) {
            return (id, false);
        }
        let id = self.states.len();
        self.index.insert(identity.clone(), id);
        self.states.push(State {
            identity,
            initial: false,
            is_final: false,
        });
        (id, true)
    }

    pub fn find(&self, identity: &BTreeSet<usize>) -> Option<StateId> {
        self.index.get(identity).copied()
    }

    pub fn get(&self, id: StateId) -> Option<&State> {
        self.states.get(id)
    }

    pub fn get_mut(&mut self, id: StateId) -> Option<&mut State> {
        self.states.get_mut(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (StateId, &State)> + '_ {
        self.states.iter().enumerate()
    }

    pub fn finals(&self) -> BTreeSet<StateId> {
        self.iter()
            .filter(|(_, s)| s.is_final())
            .map(|(id, _)| id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn intern_deduplicates_by_identity() {
        let mut states = States::new();
        assert_eq!(states.intern(BTreeSet::from([2, 1])), (0, true));
        assert_eq!(states.intern(BTreeSet::from([3])), (1, true));
        assert_eq!(states.intern(BTreeSet::from([1, 2])), (0, false));
        assert_eq!(states.len(), 2);
        assert_eq!(states.find(&BTreeSet::from([3])), Some(1));
    }

    #[test]
    fn flags_are_independent() {
        let mut states = States::new();
        let (id, _) = states.intern(BTreeSet::from([0]));
        let state = states.get_mut(id).unwrap();
        state.set_final(true);
        assert!(!state.is_initial());
        assert_eq!(states.finals(), BTreeSet::from([id]));
    }
}
