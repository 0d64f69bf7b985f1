use std::collections::BTreeSet;

use crowbook_text_processing::escape;
use serde::Serialize;

use super::cyk::CykMatrix;
use super::lr1::{Lr1Parse, Lr1Parser, StackEntry};
use crate::grammar::lr_dfa::Action;
use crate::grammar::pretty_print::LrParsingTable;
use crate::grammar::Symbol;

fn cell_to_plaintext(cell: &BTreeSet<Symbol>) -> String {
    if cell.is_empty() {
        "-".to_string()
    } else {
        cell.iter().map(Symbol::to_string).collect::<Vec<_>>().join(",")
    }
}

impl CykMatrix {
    /// Longest substrings on top, the word itself as the bottom row.
    pub fn to_plaintext(&self) -> String {
        let mut output: Vec<Vec<String>> = self
            .rows()
            .iter()
            .enumerate()
            .rev()
            .map(|(i, row)| {
                let length = if self.word().is_empty() { 0 } else { i + 1 };
                std::iter::once(length.to_string())
                    .chain(row.iter().map(cell_to_plaintext))
                    .collect()
            })
            .collect();
        output.push(
            std::iter::once(String::new())
                .chain(self.word().iter().map(Symbol::to_string))
                .collect(),
        );

        let columns = output.iter().map(Vec::len).max().unwrap_or(0);
        let width: Vec<usize> = (0..columns)
            .map(|j| {
                output
                    .iter()
                    .filter_map(|row| row.get(j))
                    .map(|s| s.chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        output
            .iter()
            .map(|line| {
                line.iter()
                    .enumerate()
                    .map(|(i, s)| format!("{:>width$}", s, width = width[i]))
                    .collect::<Vec<_>>()
                    .join(" | ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_latex(&self) -> String {
        let columns = self.word().len().max(1);
        let cell = |c: &BTreeSet<Symbol>| {
            if c.is_empty() {
                "$\\emptyset$".to_string()
            } else {
                c.iter()
                    .map(|s| escape::tex(s.to_string()).into_owned())
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        };

        let content = self
            .rows()
            .iter()
            .enumerate()
            .rev()
            .map(|(i, row)| {
                let length = if self.word().is_empty() { 0 } else { i + 1 };
                std::iter::once(length.to_string())
                    .chain(row.iter().map(cell))
                    .collect::<Vec<_>>()
                    .join(" & ")
            })
            .collect::<Vec<_>>()
            .join(" \\\\\n");
        let word = std::iter::once(String::new())
            .chain(
                self.word()
                    .iter()
                    .map(|s| escape::tex(s.to_string()).into_owned()),
            )
            .collect::<Vec<_>>()
            .join(" & ");

        format!(
            "\\begin{{tabular}}{{c{}}}\n{} \\\\\\hline\n{}\n\\end{{tabular}}",
            "|c".repeat(columns),
            content,
            word
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TraceRow {
    pub stack: String,
    pub input: String,
    pub action: String,
}

/// An LR(1) parse rendered step by step against its parsing table.
#[derive(Debug, Clone, Serialize)]
pub struct TraceOutput {
    pub outcome: String,
    pub accepted: bool,
    pub steps: Vec<TraceRow>,
    #[serde(skip)]
    latex_actions: Vec<String>,
}

fn stack_to_string(stack: &[StackEntry]) -> String {
    stack
        .iter()
        .map(|(symbol, state)| match symbol {
            Some(s) => format!("{}{}", s, state),
            None => state.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

impl Lr1Parser {
    pub fn to_trace_output(&self, parse: &Lr1Parse) -> TraceOutput {
        let table: LrParsingTable = self.automaton().to_parsing_table();
        let action = |a: Option<Action>| {
            a.map(|a| table.action_to_plaintext(&a))
                .unwrap_or_else(|| "error".to_string())
        };
        TraceOutput {
            outcome: parse.outcome.to_string(),
            accepted: parse.outcome.is_accepted(),
            steps: parse
                .trace
                .iter()
                .map(|step| TraceRow {
                    stack: stack_to_string(&step.stack),
                    input: step.input.iter().map(|s| s.as_char()).collect(),
                    action: action(step.action),
                })
                .collect(),
            latex_actions: parse
                .trace
                .iter()
                .map(|step| {
                    step.action
                        .map(|a| table.action_to_latex(&a))
                        .unwrap_or_else(|| "error".to_string())
                })
                .collect(),
        }
    }
}

impl TraceOutput {
    pub fn to_plaintext(&self) -> String {
        let header = TraceRow {
            stack: "stack".to_string(),
            input: "input".to_string(),
            action: "action".to_string(),
        };
        let rows: Vec<&TraceRow> = std::iter::once(&header).chain(self.steps.iter()).collect();
        let stack_width = rows.iter().map(|r| r.stack.chars().count()).max().unwrap_or(0);
        let input_width = rows.iter().map(|r| r.input.chars().count()).max().unwrap_or(0);

        rows.iter()
            .map(|r| {
                format!(
                    "{:<sw$} | {:>iw$} | {}",
                    r.stack,
                    r.input,
                    r.action,
                    sw = stack_width,
                    iw = input_width
                )
            })
            .chain(std::iter::once(self.outcome.clone()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_latex(&self) -> String {
        let content = self
            .steps
            .iter()
            .zip(self.latex_actions.iter())
            .map(|(step, action)| {
                format!(
                    "{} & {} & {}",
                    escape::tex(step.stack.as_str()),
                    escape::tex(step.input.as_str()),
                    action
                )
            })
            .collect::<Vec<_>>()
            .join(" \\\\\n");

        "\\begin{tabular}{l|r|l}\n".to_string()
            + "Stack & Input & Action\\\\\\hline\n"
            + &content
            + "\\\\\n\\end{tabular}\n"
            + &escape::tex(self.outcome.as_str())
    }
}

#[cfg(test)]
mod tests {
    use crate::grammar::symbol::symbols;
    use crate::grammar::Grammar;
    use crate::parser::{CykParser, Lr1Parser};
    use pretty_assertions::assert_eq;

    #[test]
    fn cyk_matrix_plaintext() {
        let g = Grammar::parse("S->AB;A->a;B->b.").unwrap();
        let parse = CykParser::new(&g).unwrap().parse(&symbols("ab"));
        assert_eq!(parse.matrix.to_plaintext(), "2 | S\n1 | A | B\n  | a | b");
    }

    #[test]
    fn cyk_matrix_of_empty_word() {
        let g = Grammar::parse("S->a.").unwrap();
        let parse = CykParser::new(&g).unwrap().parse(&[]);
        assert_eq!(parse.matrix.to_plaintext(), "0 | -\n ");
    }

    #[test]
    fn trace_plaintext() {
        let g = Grammar::parse("S->a.").unwrap();
        let parser = Lr1Parser::new(&g).unwrap();
        let parse = parser.parse(&symbols("a")).unwrap();
        let output = parser.to_trace_output(&parse);
        assert!(output.accepted);
        let actions: Vec<&str> = output.steps.iter().map(|s| s.action.as_str()).collect();
        assert_eq!(actions, vec!["s2", "r(S->a)", "acc"]);
        assert_eq!(output.steps[0].stack, "$0");
        assert_eq!(output.steps[0].input, "a$");
        assert!(output.to_plaintext().ends_with("accepted"));
    }
}
