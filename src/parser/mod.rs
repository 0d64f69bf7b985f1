use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::automaton::StateId;
use crate::grammar::{symbol, Grammar, Symbol};
use crate::{Error, Result};

pub mod cyk;
pub mod lr1;
pub mod pretty_print;

pub use cyk::{CykMatrix, CykParse, CykParser};
pub use lr1::{Lr1Parse, Lr1Parser, TraceStep};
pub use pretty_print::{TraceOutput, TraceRow};

/// Membership test of a word against a grammar.
pub trait Recognizer {
    fn recognize(&self, word: &[Symbol]) -> Result<bool>;

    fn recognize_str(&self, word: &str) -> Result<bool> {
        self.recognize(&symbol::symbols(word))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum ParseOutcome {
    Accepted,
    Rejected(RejectReason),
}

impl ParseOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ParseOutcome::Accepted)
    }
}

impl fmt::Display for ParseOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseOutcome::Accepted => write!(f, "accepted"),
            ParseOutcome::Rejected(reason) => write!(f, "rejected: {}", reason),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// The axiom is missing from the top cell of the CYK matrix.
    NotDerived,
    NoAction { state: StateId, symbol: Symbol },
    MissingGoto { state: StateId, symbol: Symbol },
    NotLr1,
    StackExhausted,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::NotDerived => write!(f, "the axiom does not derive the word"),
            RejectReason::NoAction { state, symbol } => {
                write!(f, "no action in state {} on `{}`", state, symbol)
            }
            RejectReason::MissingGoto { state, symbol } => {
                write!(f, "no goto in state {} on `{}`", state, symbol)
            }
            RejectReason::NotLr1 => write!(f, "the grammar is not LR(1)"),
            RejectReason::StackExhausted => write!(f, "stack exhausted"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParserKind {
    Cyk,
    Lr1,
}

impl ParserKind {
    pub const ALL: [ParserKind; 2] = [ParserKind::Cyk, ParserKind::Lr1];

    pub fn name(self) -> &'static str {
        match self {
            ParserKind::Cyk => "cyk",
            ParserKind::Lr1 => "lr1",
        }
    }

    /// Builds the selected parser and runs it over `word`.
    pub fn recognize(self, grammar: &Grammar, word: &[Symbol]) -> Result<bool> {
        match self {
            ParserKind::Cyk => CykParser::new(grammar)?.recognize(word),
            ParserKind::Lr1 => Lr1Parser::new(grammar)?.recognize(word),
        }
    }
}

impl fmt::Display for ParserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ParserKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "cyk" => Ok(ParserKind::Cyk),
            "lr1" | "lr(1)" | "lr-1" => Ok(ParserKind::Lr1),
            _ => Err(Error::UnknownParser(s.to_string())),
        }
    }
}
