pub mod analysis;
pub mod eliminate_left_recursion;
pub mod gnf;
pub mod grammar;
pub mod lr_dfa;
pub mod parse;
pub mod pretty_print;
pub mod production;
pub mod symbol;
pub mod transform;

pub use grammar::{Grammar, GrammarBuilder, Limits};
pub use production::Production;
pub use symbol::{Alphabet, Symbol, SymbolClass};
pub use transform::Transformation;

#[cfg(test)]
pub(crate) mod testing;

pub const EPSILON: Symbol = Symbol::new('ε');
pub const END_MARK: Symbol = Symbol::new('$');
