use log::{debug, trace};
use serde::Serialize;

use super::{ParseOutcome, Recognizer, RejectReason};
use crate::automaton::StateId;
use crate::grammar::lr_dfa::{Action, Lr1Automaton};
use crate::grammar::{Grammar, Symbol, END_MARK};
use crate::{Error, Result};

/// One entry of the parser stack: the symbol that was pushed and the
/// automaton state reached. The bottom entry carries the end marker.
pub type StackEntry = (Option<Symbol>, StateId);

/// Configuration seen by the driver before it takes `action`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceStep {
    pub stack: Vec<StackEntry>,
    pub input: Vec<Symbol>,
    pub action: Option<Action>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lr1Parse {
    pub outcome: ParseOutcome,
    pub trace: Vec<TraceStep>,
}

enum DriverState {
    Running,
    Accepted,
    Rejected(RejectReason),
}

#[derive(Debug, Clone)]
pub struct Lr1Parser {
    automaton: Lr1Automaton,
}

impl Lr1Parser {
    pub fn new(grammar: &Grammar) -> Result<Self> {
        Ok(Self {
            automaton: Lr1Automaton::new(grammar)?,
        })
    }

    pub fn automaton(&self) -> &Lr1Automaton {
        &self.automaton
    }

    pub fn is_lr1(&self) -> bool {
        self.automaton.is_lr1()
    }

    pub fn parse(&self, word: &[Symbol]) -> Result<Lr1Parse> {
        if !self.is_lr1() {
            debug!(
                "lr(1): {} conflicting cells, not simulating",
                self.automaton.conflicts().len()
            );
            return Ok(Lr1Parse {
                outcome: ParseOutcome::Rejected(RejectReason::NotLr1),
                trace: Vec::new(),
            });
        }

        let input: Vec<Symbol> = word.iter().copied().chain([END_MARK]).collect();
        let mut stack: Vec<StackEntry> = vec![(Some(END_MARK), self.automaton.initial())];
        let mut position = 0;
        let mut trace = Vec::new();
        let mut state = DriverState::Running;

        while let DriverState::Running = state {
            let top = match stack.last() {
                Some(&(_, top)) => top,
                None => {
                    state = DriverState::Rejected(RejectReason::StackExhausted);
                    break;
                }
            };
            let lookahead = input.get(position).copied().unwrap_or(END_MARK);
            let last = position + 1 == input.len();
            // Gotos are only followed after a reduction, and the end marker
            // only accepts once the whole word has been consumed.
            let action = match self.automaton.action(top, lookahead) {
                _ if lookahead.is_non_terminal() => None,
                Some(Action::Goto(_)) => None,
                Some(Action::Accept) if !last => None,
                action => action,
            };
            trace.push(TraceStep {
                stack: stack.clone(),
                input: input[position.min(input.len())..].to_vec(),
                action,
            });
            trace!("lr(1): state {} on {}: {:?}", top, lookahead, action);

            state = match action {
                None | Some(Action::Goto(_)) => DriverState::Rejected(RejectReason::NoAction {
                    state: top,
                    symbol: lookahead,
                }),
                Some(Action::Accept) => DriverState::Accepted,
                Some(Action::Shift(next)) => {
                    stack.push((Some(lookahead), next));
                    position += 1;
                    DriverState::Running
                }
                Some(Action::Reduce(p)) => self.reduce(&mut stack, p)?,
            };
        }

        let outcome = match state {
            DriverState::Accepted => ParseOutcome::Accepted,
            DriverState::Rejected(reason) => ParseOutcome::Rejected(reason),
            DriverState::Running => ParseOutcome::Rejected(RejectReason::StackExhausted),
        };
        Ok(Lr1Parse { outcome, trace })
    }

    /// Pops the right side of production `p` and pushes its left side with
    /// the goto of the exposed state.
    fn reduce(&self, stack: &mut Vec<StackEntry>, p: usize) -> Result<DriverState> {
        let production = self
            .automaton
            .production(p)
            .ok_or(Error::StackInvariant { production: p })?;
        let k = production.len();
        if stack.len() <= k {
            return Err(Error::StackInvariant { production: p });
        }

        let popped = stack.split_off(stack.len() - k);
        let matches = popped
            .iter()
            .zip(production.right())
            .all(|(&(symbol, _), &expected)| symbol.map_or(true, |s| s == expected));
        if !matches {
            return Err(Error::StackInvariant { production: p });
        }

        let exposed = match stack.last() {
            Some(&(_, exposed)) => exposed,
            None => return Ok(DriverState::Rejected(RejectReason::StackExhausted)),
        };
        let left = production.left();
        Ok(match self.automaton.goto(exposed, left) {
            Some(next) => {
                stack.push((Some(left), next));
                DriverState::Running
            }
            None => DriverState::Rejected(RejectReason::MissingGoto {
                state: exposed,
                symbol: left,
            }),
        })
    }
}

impl Recognizer for Lr1Parser {
    fn recognize(&self, word: &[Symbol]) -> Result<bool> {
        Ok(self.parse(word)?.outcome.is_accepted())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::symbol::symbols;
    use pretty_assertions::assert_eq;

    #[test]
    fn accepts_and_rejects() {
        let g = Grammar::parse("S->CC;C->cC|d.").unwrap();
        let parser = Lr1Parser::new(&g).unwrap();
        assert!(parser.recognize_str("cdd").unwrap());
        assert!(parser.recognize_str("dccd").unwrap());
        assert!(!parser.recognize_str("cd").unwrap());
        assert!(!parser.recognize_str("").unwrap());
    }

    #[test]
    fn trace_of_single_shift() {
        let g = Grammar::parse("S->a.").unwrap();
        let parser = Lr1Parser::new(&g).unwrap();
        let parse = parser.parse(&symbols("a")).unwrap();
        assert_eq!(parse.outcome, ParseOutcome::Accepted);

        let actions: Vec<Option<Action>> = parse.trace.iter().map(|s| s.action).collect();
        assert!(matches!(
            actions.as_slice(),
            [
                Some(Action::Shift(_)),
                Some(Action::Reduce(1)),
                Some(Action::Accept)
            ]
        ));
        assert_eq!(parse.trace[0].input, symbols("a$"));
        assert_eq!(parse.trace[0].stack, vec![(Some(END_MARK), parser.automaton().initial())]);
        assert_eq!(parse.trace[2].stack.len(), 2);
        assert_eq!(parse.trace[2].stack[1].0, Some(Symbol::from('S')));
    }

    #[test]
    fn rejection_names_the_failing_cell() {
        let g = Grammar::parse("S->ab.").unwrap();
        let parser = Lr1Parser::new(&g).unwrap();
        let parse = parser.parse(&symbols("aa")).unwrap();
        match parse.outcome {
            ParseOutcome::Rejected(RejectReason::NoAction { symbol, .. }) => {
                assert_eq!(symbol, Symbol::from('a'))
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(parse.trace.last().map(|s| s.action), Some(None));
    }

    #[test]
    fn epsilon_word() {
        let g = Grammar::parse("S->aSb|ε.").unwrap();
        let parser = Lr1Parser::new(&g).unwrap();
        assert!(parser.recognize_str("").unwrap());
        assert!(parser.recognize_str("aabb").unwrap());
        assert!(!parser.recognize_str("abb").unwrap());
    }

    #[test]
    fn not_lr1_fails_fast() {
        let g = Grammar::parse("E->E+E|a.").unwrap();
        let parser = Lr1Parser::new(&g).unwrap();
        assert!(!parser.is_lr1());
        let parse = parser.parse(&symbols("a+a")).unwrap();
        assert_eq!(parse.outcome, ParseOutcome::Rejected(RejectReason::NotLr1));
        assert!(parse.trace.is_empty());
    }

    #[test]
    fn non_terminal_in_word_is_rejected() {
        let g = Grammar::parse("S->AS|b;A->a.").unwrap();
        let parser = Lr1Parser::new(&g).unwrap();
        assert!(parser.recognize_str("ab").unwrap());

        let parse = parser.parse(&symbols("Ab")).unwrap();
        assert_eq!(
            parse.outcome,
            ParseOutcome::Rejected(RejectReason::NoAction {
                state: parser.automaton().initial(),
                symbol: Symbol::from('A'),
            })
        );
        assert_eq!(parse.trace.len(), 1);
        assert!(!parser.recognize_str("aAb").unwrap());
        assert!(!parser.recognize_str("S").unwrap());
    }

    #[test]
    fn end_marker_in_word_is_rejected() {
        let g = Grammar::parse("S->a.").unwrap();
        let parser = Lr1Parser::new(&g).unwrap();
        let parse = parser.parse(&symbols("a$b")).unwrap();
        match parse.outcome {
            ParseOutcome::Rejected(RejectReason::NoAction { symbol, .. }) => {
                assert_eq!(symbol, END_MARK)
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(parse.trace.iter().all(|s| s.action != Some(Action::Accept)));
        assert!(!parser.recognize_str("a$").unwrap());
        assert!(!parser.recognize_str("$").unwrap());
        assert!(parser.recognize_str("a").unwrap());
    }

    #[test]
    fn empty_grammar() {
        let g = Grammar::parse("").unwrap();
        let parser = Lr1Parser::new(&g).unwrap();
        assert!(!parser.recognize_str("").unwrap());
        assert!(!parser.recognize_str("a").unwrap());
    }
}
