use std::collections::{BTreeMap, BTreeSet};

use super::{Grammar, Symbol};

/// Words of at most `max_len` terminals derivable from the axiom.
///
/// Each non-terminal's bounded language is grown to a fixed point, one
/// production at a time, so nullable and cyclic non-terminals are handled
/// exactly.
pub(crate) fn language(g: &Grammar, max_len: usize) -> BTreeSet<String> {
    if !g.has_axiom_rule() {
        return BTreeSet::new();
    }

    let mut derived: BTreeMap<Symbol, BTreeSet<String>> = BTreeMap::new();
    let mut changed = true;
    while changed {
        changed = false;
        for production in g.productions() {
            let mut prefixes: BTreeSet<String> = BTreeSet::from([String::new()]);
            for &symbol in production.right() {
                let pieces = if symbol.is_terminal() {
                    BTreeSet::from([symbol.as_char().to_string()])
                } else {
                    derived.get(&symbol).cloned().unwrap_or_default()
                };
                prefixes = prefixes
                    .iter()
                    .flat_map(|u| pieces.iter().map(move |v| format!("{}{}", u, v)))
                    .filter(|w| w.chars().count() <= max_len)
                    .collect();
                if prefixes.is_empty() {
                    break;
                }
            }
            let known = derived.entry(production.left()).or_default();
            for word in prefixes {
                changed |= known.insert(word);
            }
        }
    }
    derived.remove(&g.axiom()).unwrap_or_default()
}

/// Every word over `alphabet` with at most `max_len` letters.
pub(crate) fn words(alphabet: &str, max_len: usize) -> Vec<String> {
    let mut all = vec![String::new()];
    let mut last = vec![String::new()];
    for _ in 0..max_len {
        last = last
            .iter()
            .flat_map(|w| alphabet.chars().map(move |c| format!("{}{}", w, c)))
            .collect();
        all.extend(last.iter().cloned());
    }
    all
}
