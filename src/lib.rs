extern crate wasm_bindgen;

use serde::Serialize;
use wasm_bindgen::prelude::*;

pub mod automaton;
pub mod error;
pub mod grammar;
pub mod parser;

pub use error::{Error, Result};
pub use grammar::{Grammar, GrammarBuilder, Limits, Production, Symbol, Transformation};
pub use parser::{ParseOutcome, ParserKind, Recognizer, RejectReason};

fn to_json<T: Serialize>(result: Result<T>) -> String {
    let value = result.map_err(|e| e.to_string()).and_then(|value| {
        serde_json::to_value(value).map_err(|e| e.to_string())
    });
    match value {
        Ok(value) => value.to_string(),
        Err(e) => serde_json::json!({ "error": e }).to_string(),
    }
}

#[derive(Serialize)]
struct TransformOutput {
    grammar: String,
    productions: grammar::pretty_print::ProductionOutputVec,
}

#[derive(Serialize)]
struct Lr1Output {
    #[serde(flatten)]
    parse: parser::Lr1Parse,
    table: grammar::pretty_print::LrParsingTable,
}

#[derive(Serialize)]
#[serde(untagged)]
enum ParseOutput {
    Cyk(parser::CykParse),
    Lr1(Lr1Output),
}

/// Runs the parser selected by `kind` over `word` and renders the matrix or
/// the trace as JSON.
pub fn run_parser(grammar: &Grammar, word: &str, kind: ParserKind) -> Result<String> {
    let word = grammar::symbol::symbols(word);
    let output = match kind {
        ParserKind::Cyk => ParseOutput::Cyk(parser::CykParser::new(grammar)?.parse(&word)),
        ParserKind::Lr1 => {
            let lr1 = parser::Lr1Parser::new(grammar)?;
            ParseOutput::Lr1(Lr1Output {
                parse: lr1.parse(&word)?,
                table: lr1.automaton().to_parsing_table(),
            })
        }
    };
    Ok(to_json(Ok(output)))
}

#[wasm_bindgen]
pub fn analyze_to_json(grammar: &str) -> String {
    to_json(Grammar::parse(grammar).map(|g| g.analyze()))
}

#[wasm_bindgen]
pub fn transform_to_json(grammar: &str, transformation: &str) -> String {
    let result = Grammar::parse(grammar).and_then(|g| {
        let t: Transformation = transformation.parse()?;
        let g = t.apply(&g, Limits::default())?;
        Ok(TransformOutput {
            grammar: g.to_string(),
            productions: g.to_production_output_vec(),
        })
    });
    to_json(result)
}

#[wasm_bindgen]
pub fn parse_to_json(grammar: &str, word: &str, parser: &str) -> String {
    let result = Grammar::parse(grammar)
        .and_then(|g| run_parser(&g, word, parser.parse()?));
    match result {
        Ok(json) => json,
        Err(e) => to_json::<()>(Err(e)),
    }
}
