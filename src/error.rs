use thiserror::Error;

use crate::grammar::symbol::{Symbol, SymbolClass};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotationError {
    #[error("missing \"->\"")]
    MissingArrow,
    #[error("too many \"->\"")]
    RepeatedArrow,
    #[error("empty left side")]
    EmptyLeft,
    #[error("left side `{0}` is not a single non-terminal")]
    InvalidLeft(String),
    #[error("empty alternative")]
    EmptyAlternative,
    #[error("grammar is not terminated by \".\"")]
    MissingTerminator,
    #[error("unexpected input after \".\": `{0}`")]
    TrailingInput(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("rule {rule}: {kind}")]
    Notation { rule: usize, kind: NotationError },

    #[error("symbol `{symbol}` is not a {expected}")]
    SymbolClass {
        symbol: Symbol,
        expected: SymbolClass,
    },

    #[error("epsilon sentinel `{0}` must not be an upper-case letter")]
    InvalidEpsilon(Symbol),

    #[error("symbol `{0}` is reserved as the end-of-input marker")]
    ReservedSymbol(Symbol),

    #[error("no fresh non-terminal symbol is available")]
    SymbolsExhausted,

    #[error("transformation exceeded the limit of {limit} {what}")]
    LimitExceeded { what: &'static str, limit: usize },

    #[error("unknown transformation `{0}`")]
    UnknownTransformation(String),

    #[error("unknown parser `{0}`")]
    UnknownParser(String),

    #[error("parser stack does not match the right side of production {production}")]
    StackInvariant { production: usize },
}
