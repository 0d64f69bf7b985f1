use super::symbol::Symbol;
use crate::error::NotationError;
use crate::{Error, Result};

/// Splits `LHS->RHS1|RHS2;LHS2->...` terminated by `.` into raw rules.
/// Whitespace is insignificant; epsilon is left in place for the builder.
pub(crate) fn parse_rules(grammar: &str) -> Result<Vec<(Symbol, Vec<Symbol>)>> {
    let text: String = grammar.chars().filter(|c| !c.is_whitespace()).collect();
    if text.is_empty() {
        return Ok(Vec::new());
    }

    let (body, rest) = match text.split_once('.') {
        Some(split) => split,
        None => {
            let rule = text.split(';').count();
            return Err(notation(rule, NotationError::MissingTerminator));
        }
    };
    if !rest.is_empty() {
        let rule = body.split(';').count();
        return Err(notation(rule, NotationError::TrailingInput(rest.to_string())));
    }
    if body.is_empty() {
        return Ok(Vec::new());
    }

    let mut rules = Vec::new();
    for (i, rule) in body.split(';').enumerate() {
        let parts: Vec<&str> = rule.split("->").collect();
        if parts.len() > 2 {
            return Err(notation(i + 1, NotationError::RepeatedArrow));
        } else if parts.len() < 2 {
            return Err(notation(i + 1, NotationError::MissingArrow));
        }

        let left = parse_left(parts[0]).map_err(|kind| notation(i + 1, kind))?;
        for right in parts[1].split('|') {
            if right.is_empty() {
                return Err(notation(i + 1, NotationError::EmptyAlternative));
            }
            rules.push((left, right.chars().map(Symbol::from).collect()));
        }
    }

    Ok(rules)
}

fn parse_left(left: &str) -> std::result::Result<Symbol, NotationError> {
    let mut chars = left.chars();
    match (chars.next(), chars.next()) {
        (None, _) => Err(NotationError::EmptyLeft),
        (Some(c), None) if Symbol::from(c).is_non_terminal() => Ok(Symbol::from(c)),
        _ => Err(NotationError::InvalidLeft(left.to_string())),
    }
}

fn notation(rule: usize, kind: NotationError) -> Error {
    Error::Notation { rule, kind }
}
