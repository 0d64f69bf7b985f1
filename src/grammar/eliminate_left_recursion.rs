use std::collections::{BTreeMap, HashMap};

use log::debug;

use super::production::Production;
use super::symbol::Symbol;
use super::{Grammar, Limits};
use crate::Result;

impl Grammar {
    pub fn eliminate_left_recursion(&self) -> Result<Grammar> {
        self.eliminate_left_recursion_with(Limits::default())
    }

    /// Brings the grammar to proper form first, since the ordering algorithm
    /// needs a grammar without cycles or epsilon productions.
    pub fn eliminate_left_recursion_with(&self, limits: Limits) -> Result<Grammar> {
        if !self.has_axiom_rule() {
            return Ok(self.clone());
        }
        self.proper()?.remove_left_recursion(limits)
    }

    /// Orders the non-terminals (axiom first), substitutes every earlier
    /// left side leading a right side, then replaces direct left recursion
    /// `A -> Aα | β` with `A -> β | βZ`, `Z -> α | αZ`.
    pub(crate) fn remove_left_recursion(&self, limits: Limits) -> Result<Grammar> {
        let order = self.lefts();
        let position: HashMap<Symbol, usize> =
            order.iter().enumerate().map(|(i, &nt)| (nt, i)).collect();

        let mut rules: BTreeMap<Symbol, Vec<Vec<Symbol>>> = BTreeMap::new();
        for production in self.productions() {
            rules
                .entry(production.left())
                .or_default()
                .push(production.right().to_vec());
        }

        let mut fresh = self.fresh_symbols();
        let mut total = self.len();

        for (i, &nt) in order.iter().enumerate() {
            let mut pending = rules.remove(&nt).unwrap_or_default();
            let mut kept: Vec<Vec<Symbol>> = Vec::new();
            let mut recursive: Vec<Vec<Symbol>> = Vec::new();

            while let Some(production) = pending.pop() {
                let lead = production.first().and_then(|s| position.get(s).copied());
                match lead {
                    Some(j) if j < i => {
                        let prefixes = rules.get(&order[j]).cloned().unwrap_or_default();
                        total += prefixes.len();
                        limits.check(total)?;
                        for prefix in prefixes {
                            pending.push(
                                prefix
                                    .iter()
                                    .chain(production.iter().skip(1))
                                    .copied()
                                    .collect(),
                            );
                        }
                    }
                    Some(j) if j == i => {
                        if production.len() > 1 {
                            recursive.push(production[1..].to_vec());
                        }
                    }
                    _ => kept.push(production),
                }
            }

            if !recursive.is_empty() {
                let z = fresh.next()?;
                debug!(
                    "left recursion on {}: {} recursive alternatives moved to {}",
                    nt,
                    recursive.len(),
                    z
                );

                let with_z = |alternatives: &[Vec<Symbol>]| -> Vec<Vec<Symbol>> {
                    alternatives
                        .iter()
                        .filter(|a| !a.is_empty())
                        .map(|a| a.iter().copied().chain([z]).collect())
                        .collect()
                };
                let kept_z = with_z(&kept);
                let recursive_z = with_z(&recursive);
                kept.extend(kept_z);
                recursive.extend(recursive_z);

                total += kept.len() + recursive.len();
                limits.check(total)?;
                rules.insert(z, recursive);
            }

            kept.sort();
            kept.dedup();
            rules.insert(nt, kept);
        }

        let productions = rules.into_iter().flat_map(|(left, rights)| {
            rights
                .into_iter()
                .map(move |right| Production::from_symbols(left, right))
        });
        Ok(self.with_productions(productions))
    }

    /// Some non-terminal derives a sentential form starting with itself.
    pub fn is_left_recursive(&self) -> bool {
        let nullable = self.nullable_symbols();
        let mut leads: HashMap<Symbol, Vec<Symbol>> = HashMap::new();
        for production in self.productions() {
            for &s in production.right() {
                if s.is_non_terminal() {
                    leads.entry(production.left()).or_default().push(s);
                }
                if !nullable.contains(&s) {
                    break;
                }
            }
        }

        self.lefts().into_iter().any(|start| {
            let mut seen = Vec::new();
            let mut stack = leads.get(&start).cloned().unwrap_or_default();
            while let Some(s) = stack.pop() {
                if s == start {
                    return true;
                }
                if !seen.contains(&s) {
                    seen.push(s);
                    stack.extend(leads.get(&s).cloned().unwrap_or_default());
                }
            }
            false
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::testing::language;

    #[test]
    fn direct_left_recursion() {
        let g = Grammar::parse("E->E+T|T;T->T*F|F;F->(E)|a.").unwrap();
        assert!(g.is_left_recursive());
        let h = g.eliminate_left_recursion().unwrap();
        assert!(!h.is_left_recursive(), "{}", h);
        assert_eq!(language(&g, 5), language(&h, 5));
    }

    #[test]
    fn indirect_left_recursion() {
        let g = Grammar::parse("S->Aa|b;A->Sc|d.").unwrap();
        assert!(g.is_left_recursive());
        let h = g.eliminate_left_recursion().unwrap();
        assert!(!h.is_left_recursive(), "{}", h);
        assert_eq!(language(&g, 7), language(&h, 7));
    }

    #[test]
    fn left_recursion_through_nullable_prefix() {
        let g = Grammar::parse("S->ASa|b;A->ε|c.").unwrap();
        assert!(g.is_left_recursive());
        let h = g.eliminate_left_recursion().unwrap();
        assert!(!h.is_left_recursive(), "{}", h);
        assert_eq!(language(&g, 5), language(&h, 5));
    }

    #[test]
    fn limits_are_enforced() {
        let g = Grammar::parse("E->E+T|T;T->T*F|F;F->(E)|a.").unwrap();
        let limits = Limits {
            max_productions: 3,
            max_rounds: 10,
        };
        assert!(g.eliminate_left_recursion_with(limits).is_err());
    }

    #[test]
    fn not_left_recursive() {
        let g = Grammar::parse("S->aS|b.").unwrap();
        assert!(!g.is_left_recursive());
        assert_eq!(g.eliminate_left_recursion().unwrap(), g);
    }
}
