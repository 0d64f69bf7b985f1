use std::collections::BTreeSet;

use log::{debug, info};

use super::production::Production;
use super::transform::TerminalLift;
use super::{Grammar, Limits};
use crate::{Error, Result};

impl Grammar {
    /// Every right side is one terminal followed by non-terminals only;
    /// `axiom -> ε` is allowed while the axiom is kept off every right side.
    pub fn is_gnf(&self) -> bool {
        let axiom_free = !self.axiom_on_right();
        self.productions().all(|p| match p.right().split_first() {
            Some((first, rest)) => {
                first.is_terminal() && rest.iter().all(|s| s.is_non_terminal())
            }
            None => p.left() == self.axiom() && axiom_free,
        })
    }

    pub fn to_gnf(&self) -> Result<Grammar> {
        self.to_gnf_with(Limits::default())
    }

    pub fn to_gnf_with(&self, limits: Limits) -> Result<Grammar> {
        if !self.has_axiom_rule() {
            return Ok(self.clone());
        }

        let g = self
            .to_cnf()?
            .remove_left_recursion(limits)?
            .substitute_leading(limits)?
            .lift_trailing_terminals()?
            .remove_useless();
        info!("greibach normal form: {} -> {} productions", self.len(), g.len());
        Ok(g)
    }

    /// Replaces the leading non-terminal of every right side by each of its
    /// alternatives until all right sides start with a terminal.
    fn substitute_leading(&self, limits: Limits) -> Result<Grammar> {
        let mut productions: BTreeSet<Production> = self.production_set().clone();

        for round in 0..limits.max_rounds {
            let (ready, pending): (BTreeSet<Production>, BTreeSet<Production>) = productions
                .iter()
                .cloned()
                .partition(|p| p.right().first().map_or(true, |s| s.is_terminal()));
            if pending.is_empty() {
                debug!("leading substitution settled after {} rounds", round);
                return Ok(self.with_productions(productions));
            }

            let mut next = ready;
            for production in &pending {
                let (lead, rest) = match production.right().split_first() {
                    Some(split) => split,
                    None => continue,
                };
                for alternative in productions.iter().filter(|p| p.left() == *lead) {
                    next.insert(Production::from_symbols(
                        production.left(),
                        alternative.right().iter().chain(rest).copied().collect(),
                    ));
                }
            }
            limits.check(next.len())?;
            productions = next;
        }

        Err(Error::LimitExceeded {
            what: "rounds",
            limit: limits.max_rounds,
        })
    }

    /// Keeps the leading terminal of each right side and replaces the others
    /// by a non-terminal deriving just that terminal.
    fn lift_trailing_terminals(&self) -> Result<Grammar> {
        let mut fresh = self.fresh_symbols();
        let mut lifted = TerminalLift::default();
        let mut productions = BTreeSet::new();

        for production in self.productions() {
            let mut right = Vec::with_capacity(production.len());
            for (i, &s) in production.right().iter().enumerate() {
                right.push(if i == 0 { s } else { lifted.lift(s, &mut fresh)? });
            }
            productions.insert(Production::from_symbols(production.left(), right));
        }
        productions.extend(lifted.into_productions());

        Ok(self.with_productions(productions))
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
    fn recognizes_gnf() {
        assert!(parse("S->aA|a;A->aA|a|bS|b.").is_gnf());
        assert!(!parse("S->SA|A|a;A->aA|Aab.").is_gnf());
        assert!(!parse("S->aAb;A->a.").is_gnf());
        assert!(parse("S->aA|ε;A->a.").is_gnf());
        assert!(!parse("S->aS|ε.").is_gnf());
    }

    #[test]
    fn expression_grammar_to_gnf() {
        let g = parse("E->E+T|T;T->T*F|F;F->(E)|a.");
        let gnf = g.to_gnf().unwrap();
        assert!(gnf.is_gnf(), "{}", gnf);
        assert_eq!(language(&g, 5), language(&gnf, 5));
    }

    #[test]
    fn nullable_axiom_to_gnf() {
        let g = parse("S->aSb|SS|ε.");
        let gnf = g.to_gnf().unwrap();
        assert!(gnf.is_gnf(), "{}", gnf);
        assert!(gnf.has_axiom_epsilon());
        assert_eq!(language(&g, 6), language(&gnf, 6));
    }

    #[test]
    fn already_gnf_keeps_its_language() {
        let g = parse("S->aA|a;A->aA|a|bS|b.");
        let gnf = g.to_gnf().unwrap();
        assert!(gnf.is_gnf());
        assert_eq!(language(&g, 6), language(&gnf, 6));
    }

    #[test]
    fn tight_limits_fail_instead_of_diverging() {
        let g = parse("E->E+T|T;T->T*F|F;F->(E)|a.");
        let limits = Limits {
            max_productions: 10,
            max_rounds: 1,
        };
        assert!(matches!(
            g.to_gnf_with(limits),
            Err(Error::LimitExceeded { .. })
        ));
    }

    #[test]
    fn empty_language() {
        let g = parse("S->SA;A->a.").to_gnf().unwrap();
        assert!(g.is_empty());
    }
}
