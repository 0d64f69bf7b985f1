use std::fmt;

use serde::Serialize;

use super::symbol::Symbol;

/// `left -> right`. The right side is stored with every epsilon stripped, so
/// an epsilon production has an empty right side.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Production {
    left: Symbol,
    right: Vec<Symbol>,
}

impl Production {
    pub fn new(left: Symbol, right: impl IntoIterator<Item = Symbol>, epsilon: Symbol) -> Self {
        Self {
            left,
            right: right.into_iter().filter(|&s| s != epsilon).collect(),
        }
    }

    /// Builds a production from symbols known to contain no epsilon.
    pub fn from_symbols(left: Symbol, right: Vec<Symbol>) -> Self {
        Self { left, right }
    }

    pub fn left(&self) -> Symbol {
        self.left
    }

    pub fn right(&self) -> &[Symbol] {
        &self.right
    }

    pub fn len(&self) -> usize {
        self.right.len()
    }

    pub fn is_epsilon(&self) -> bool {
        self.right.is_empty()
    }

    pub fn is_unit(&self) -> bool {
        matches!(self.right[..], [s] if s.is_non_terminal())
    }

    pub fn mentions(&self, symbol: Symbol) -> bool {
        self.left == symbol || self.right.contains(&symbol)
    }

    pub fn display(&self, epsilon: Symbol) -> ProductionDisplay<'_> {
        ProductionDisplay {
            production: self,
            epsilon,
        }
    }

    /// Right side as text, epsilon rendered as `epsilon`.
    pub fn right_to_string(&self, epsilon: Symbol) -> String {
        if self.right.is_empty() {
            epsilon.to_string()
        } else {
            self.right.iter().map(|s| s.as_char()).collect()
        }
    }
}

pub struct ProductionDisplay<'a> {
    production: &'a Production,
    epsilon: Symbol,
}

impl fmt::Display for ProductionDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}->{}",
            self.production.left,
            self.production.right_to_string(self.epsilon)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::symbol::symbols;
    use crate::grammar::EPSILON;
    use pretty_assertions::{assert_eq, assert_ne};

    fn production(right: &str) -> Production {
        Production::new('S'.into(), symbols(right), EPSILON)
    }

    #[test]
    fn epsilon_normalization() {
        assert_eq!(production("ε"), production("εεε"));
        assert_eq!(production("εA"), production("Aε"));
        assert_eq!(production("Aε"), production("εAε"));
        assert_ne!(production("ε"), production("εA"));
        assert!(production("εεε").is_epsilon());
        assert_eq!(production("εεε").right_to_string(EPSILON), "ε");
    }

    #[test]
    fn left_side_takes_part_in_equality() {
        let a = Production::new('A'.into(), symbols("a"), EPSILON);
        assert_ne!(a, production("a"));
    }

    #[test]
    fn unit() {
        assert!(production("A").is_unit());
        assert!(!production("a").is_unit());
        assert!(!production("AB").is_unit());
        assert!(!production("ε").is_unit());
    }

    #[test]
    fn display() {
        assert_eq!(production("aAε").display(EPSILON).to_string(), "S->aA");
        assert_eq!(production("").display(EPSILON).to_string(), "S->ε");
    }
}
