use std::borrow::Cow;
use std::collections::{BTreeSet, HashMap};

use log::debug;
use serde::Serialize;

use super::{ParseOutcome, Recognizer, RejectReason};
use crate::grammar::{Grammar, Symbol};
use crate::Result;

/// Triangular recognition matrix. Row `l - 1` holds the cells for substrings
/// of length `l`, column `p - 1` the one starting at position `p`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CykMatrix {
    word: Vec<Symbol>,
    rows: Vec<Vec<BTreeSet<Symbol>>>,
}

impl CykMatrix {
    pub fn word(&self) -> &[Symbol] {
        &self.word
    }

    /// Cell `M[length, pos]`, 1-based. The empty word has the single cell
    /// `M[0, 1]`.
    pub fn get(&self, length: usize, pos: usize) -> Option<&BTreeSet<Symbol>> {
        if self.word.is_empty() {
            return if length == 0 && pos == 1 {
                self.rows.first()?.first()
            } else {
                None
            };
        }
        self.rows
            .get(length.checked_sub(1)?)?
            .get(pos.checked_sub(1)?)
    }

    pub fn rows(&self) -> &[Vec<BTreeSet<Symbol>>] {
        &self.rows
    }

    /// The cell spanning the whole word.
    pub fn top(&self) -> Option<&BTreeSet<Symbol>> {
        self.rows.last()?.first()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CykParse {
    pub outcome: ParseOutcome,
    pub matrix: CykMatrix,
}

#[derive(Debug, Clone)]
pub struct CykParser<'g> {
    grammar: Cow<'g, Grammar>,
    unary: HashMap<Symbol, BTreeSet<Symbol>>,
    binary: Vec<(Symbol, Symbol, Symbol)>,
}

impl<'g> CykParser<'g> {
    /// Works on a Chomsky normal form copy unless `grammar` already is one.
    pub fn new(grammar: &'g Grammar) -> Result<Self> {
        let grammar = if grammar.is_cnf() {
            Cow::Borrowed(grammar)
        } else {
            debug!("cyk: converting a working copy to chomsky normal form");
            Cow::Owned(grammar.to_cnf()?)
        };

        let mut unary: HashMap<Symbol, BTreeSet<Symbol>> = HashMap::new();
        let mut binary = Vec::new();
        for production in grammar.productions() {
            match *production.right() {
                [a] => {
                    unary.entry(a).or_default().insert(production.left());
                }
                [b, c] => binary.push((production.left(), b, c)),
                _ => {}
            }
        }

        Ok(Self {
            grammar,
            unary,
            binary,
        })
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn parse(&self, word: &[Symbol]) -> CykParse {
        let axiom = self.grammar.axiom();
        let n = word.len();

        if n == 0 {
            let mut cell = BTreeSet::new();
            if self.grammar.has_axiom_epsilon() {
                cell.insert(axiom);
            }
            return self.finish(word, vec![vec![cell]]);
        }

        let mut rows: Vec<Vec<BTreeSet<Symbol>>> = Vec::with_capacity(n);
        rows.push(
            word.iter()
                .map(|s| self.unary.get(s).cloned().unwrap_or_default())
                .collect(),
        );

        for l in 2..=n {
            let mut row = Vec::with_capacity(n - l + 1);
            for p in 0..=n - l {
                let mut cell = BTreeSet::new();
                for l1 in 1..l {
                    let left = &rows[l1 - 1][p];
                    let right = &rows[l - l1 - 1][p + l1];
                    if left.is_empty() || right.is_empty() {
                        continue;
                    }
                    for &(a, b, c) in &self.binary {
                        if left.contains(&b) && right.contains(&c) {
                            cell.insert(a);
                        }
                    }
                }
                row.push(cell);
            }
            rows.push(row);
        }

        self.finish(word, rows)
    }

    fn finish(&self, word: &[Symbol], rows: Vec<Vec<BTreeSet<Symbol>>>) -> CykParse {
        let matrix = CykMatrix {
            word: word.to_vec(),
            rows,
        };
        let accepted = matrix
            .top()
            .map_or(false, |cell| cell.contains(&self.grammar.axiom()));
        CykParse {
            outcome: if accepted {
                ParseOutcome::Accepted
            } else {
                ParseOutcome::Rejected(RejectReason::NotDerived)
            },
            matrix,
        }
    }
}

impl Recognizer for CykParser<'_> {
    fn recognize(&self, word: &[Symbol]) -> Result<bool> {
        Ok(self.parse(word).outcome.is_accepted())
    }
}
