//! Finite automata over grammar symbols and the powerset construction that
//! turns an epsilon-NFA into a DFA.

pub mod dfa;
pub mod nfa;
pub mod state;
pub mod transition;

pub use dfa::Dfa;
pub use nfa::Nfa;
pub use state::{State, StateId, States};
pub use transition::{DeterministicTransitions, Transitions};
