use crowbook_text_processing::escape;
use serde::Serialize;

use super::analysis::Analysis;
use super::lr_dfa::{Action, Lr1Automaton};
use super::production::Production;
use super::{Grammar, Symbol};
use crate::automaton::StateId;

fn symbol_to_latex(symbol: Symbol, epsilon: Symbol) -> String {
    if symbol == epsilon {
        "\\epsilon".to_string()
    } else {
        escape::tex(symbol.to_string()).into_owned()
    }
}

fn right_to_latex(production: &Production, epsilon: Symbol) -> String {
    if production.is_epsilon() {
        return "\\epsilon".to_string();
    }
    production
        .right()
        .iter()
        .map(|&s| symbol_to_latex(s, epsilon))
        .collect::<Vec<_>>()
        .join(" \\ ")
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductionOutput {
    pub left: Symbol,
    pub rights: Vec<String>,
    #[serde(skip)]
    latex_rights: Vec<String>,
}

impl ProductionOutput {
    pub fn to_plaintext(&self, multiline: bool) -> String {
        self.rights
            .iter()
            .enumerate()
            .map(|(i, right)| {
                if i == 0 {
                    format!("{} -> {}", self.left, right)
                } else if multiline {
                    format!("   | {}", right)
                } else {
                    format!(" | {}", right)
                }
            })
            .collect::<Vec<_>>()
            .join(if multiline { "\n" } else { "" })
    }

    pub fn to_latex(&self, and_sign: bool) -> String {
        if self.latex_rights.is_empty() {
            return String::new();
        }
        let left = escape::tex(self.left.to_string()).into_owned();
        let arrow = if and_sign {
            " & \\rightarrow & "
        } else {
            " \\rightarrow "
        };
        left + arrow + &self.latex_rights.join(" \\mid ")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductionOutputVec {
    axiom: Symbol,
    productions: Vec<ProductionOutput>,
}

impl ProductionOutputVec {
    pub fn to_plaintext(&self) -> String {
        self.productions
            .iter()
            .map(|p| p.to_plaintext(true))
            .collect::<Vec<String>>()
            .join("\n")
    }

    pub fn to_latex(&self) -> String {
        std::iter::once("\\[\\begin{array}{cll}".to_string())
            .chain(self.productions.iter().map(|p| p.to_latex(true)))
            .chain(std::iter::once("\\end{array}\\]".to_string()))
            .collect::<Vec<String>>()
            .join("\\\\\n")
    }
}

impl Grammar {
    pub fn to_production_output_vec(&self) -> ProductionOutputVec {
        let epsilon = self.epsilon();
        let productions = self
            .lefts()
            .into_iter()
            .map(|left| {
                let of_left: Vec<&Production> = self.productions_of(left).collect();
                ProductionOutput {
                    left,
                    rights: of_left.iter().map(|p| p.right_to_string(epsilon)).collect(),
                    latex_rights: of_left.iter().map(|p| right_to_latex(p, epsilon)).collect(),
                }
            })
            .collect();
        ProductionOutputVec {
            axiom: self.axiom(),
            productions,
        }
    }
}

fn join_symbols(symbols: &[Symbol]) -> String {
    symbols
        .iter()
        .map(Symbol::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl Analysis {
    fn rows(&self) -> Vec<(&'static str, String)> {
        let flag = |b: bool| if b { "yes" } else { "no" }.to_string();
        vec![
            ("Axiom", self.axiom.to_string()),
            ("Terminals", join_symbols(&self.terminals)),
            ("Non-terminals", join_symbols(&self.non_terminals)),
            ("Nullable", join_symbols(&self.nullable)),
            ("Generating", join_symbols(&self.generating)),
            ("Reachable", join_symbols(&self.reachable)),
            ("Useless", join_symbols(&self.useless)),
            ("Unit productions", self.unit_productions.join(", ")),
            ("Epsilon productions", self.epsilon_productions.join(", ")),
            ("CNF", flag(self.cnf)),
            ("GNF", flag(self.gnf)),
            (
                "LR(1)",
                self.lr1.map_or_else(|| "unknown".to_string(), flag),
            ),
        ]
    }

    pub fn to_plaintext(&self) -> String {
        let rows = self.rows();
        let width = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
        rows.iter()
            .map(|(k, v)| format!("{:>width$} | {}", k, v, width = width))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_latex(&self) -> String {
        let content = self
            .rows()
            .iter()
            .map(|(k, v)| format!("{} & {}", k, escape::tex(v.as_str())))
            .collect::<Vec<_>>()
            .join("\\\\\n");

        "\\begin{tabular}{r|l}\n".to_string()
            + "Property & Value\\\\\\hline\n"
            + &content
            + "\\\\\n\\end{tabular}"
    }
}

/// Action/goto table laid out by state, one column per terminal (end marker
/// last) and one per non-terminal.
#[derive(Debug, Clone, Serialize)]
pub struct LrParsingTable {
    pub productions: Vec<String>,
    pub terminals: Vec<Symbol>,
    pub non_terminals: Vec<Symbol>,
    pub action: Vec<Vec<Vec<Action>>>,
    pub goto: Vec<Vec<Option<StateId>>>,
    #[serde(skip)]
    latex_productions: Vec<String>,
}

impl Lr1Automaton {
    pub fn to_parsing_table(&self) -> LrParsingTable {
        let terminals = self.terminals();
        let non_terminals = self.non_terminals();
        let epsilon = self.epsilon();

        let states: Vec<StateId> = self.dfa().states().iter().map(|(id, _)| id).collect();
        let action = states
            .iter()
            .map(|&q| {
                terminals
                    .iter()
                    .map(|&t| {
                        self.actions(q, t)
                            .map(|a| a.iter().copied().collect())
                            .unwrap_or_default()
                    })
                    .collect()
            })
            .collect();
        let goto = states
            .iter()
            .map(|&q| non_terminals.iter().map(|&nt| self.goto(q, nt)).collect())
            .collect();

        LrParsingTable {
            productions: self
                .productions()
                .iter()
                .map(|p| p.display(epsilon).to_string())
                .collect(),
            latex_productions: self
                .productions()
                .iter()
                .map(|p| {
                    format!(
                        "{} \\rightarrow {}",
                        escape::tex(p.left().to_string()),
                        right_to_latex(p, epsilon)
                    )
                })
                .collect(),
            terminals,
            non_terminals,
            action,
            goto,
        }
    }
}

impl LrParsingTable {
    pub fn action_to_plaintext(&self, action: &Action) -> String {
        match action {
            Action::Shift(q) => format!("s{}", q),
            Action::Reduce(p) => format!(
                "r({})",
                self.productions.get(*p).map(String::as_str).unwrap_or("?")
            ),
            Action::Goto(q) => format!("g{}", q),
            Action::Accept => "acc".to_string(),
        }
    }

    pub fn action_to_latex(&self, action: &Action) -> String {
        match action {
            Action::Shift(q) => format!("shift {}", q),
            Action::Reduce(p) => format!(
                "reduce ${}$",
                self.latex_productions
                    .get(*p)
                    .map(String::as_str)
                    .unwrap_or("?")
            ),
            Action::Goto(q) => format!("goto {}", q),
            Action::Accept => "accept".to_string(),
        }
    }

    fn goto_cell(goto: &Option<StateId>) -> String {
        goto.map(|q| q.to_string()).unwrap_or_default()
    }

    pub fn to_plaintext(&self) -> String {
        let mut output: Vec<Vec<String>> = Vec::new();

        output.push(vec![String::new()]);
        for s in self.terminals.iter().chain(self.non_terminals.iter()) {
            output[0].push(s.to_string());
        }

        for (i, (r1, r2)) in self.action.iter().zip(self.goto.iter()).enumerate() {
            let row: Vec<String> = std::iter::once(i.to_string())
                .chain(r1.iter().map(|actions| {
                    actions
                        .iter()
                        .map(|a| self.action_to_plaintext(a))
                        .collect::<Vec<_>>()
                        .join("; ")
                }))
                .chain(r2.iter().map(Self::goto_cell))
                .collect();
            output.push(row);
        }

        let width: Vec<usize> = (0..output[0].len())
            .map(|j| {
                output
                    .iter()
                    .map(|row| row[j].chars().count())
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
        let header = format!(
            "\\begin{{tabular}}{{c{}}}\n & \\multicolumn{{{}}}{{c}}{{action}} & \\multicolumn{{{}}}{{|c}}{{goto}}\\\\",
            "|l".repeat(self.terminals.len() + self.non_terminals.len()),
            self.terminals.len(),
            self.non_terminals.len(),
        );

        let first_row = std::iter::once(String::new())
            .chain(
                self.terminals
                    .iter()
                    .chain(self.non_terminals.iter())
                    .map(|s| escape::tex(s.to_string()).into_owned()),
            )
            .collect::<Vec<_>>()
            .join(" & ");

        let content = self
            .action
            .iter()
            .zip(self.goto.iter())
            .enumerate()
            .map(|(i, (r1, r2))| {
                std::iter::once(i.to_string())
                    .chain(r1.iter().map(|actions| {
                        let r = actions
                            .iter()
                            .map(|a| self.action_to_latex(a))
                            .collect::<Vec<_>>()
                            .join("; ");
                        if actions.len() > 1 {
                            format!("{{\\color{{red}}{}}}", r)
                        } else {
                            r
                        }
                    }))
                    .chain(r2.iter().map(Self::goto_cell))
                    .collect::<Vec<_>>()
                    .join(" & ")
            })
            .collect::<Vec<_>>()
            .join(" \\\\\n");

        format!(
            "{}\n{} \\\\\\hline\n{}\n\\end{{tabular}}",
            header, first_row, content
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn productions_plaintext() {
        let g = Grammar::parse("S->aA|ε;A->b.").unwrap();
        assert_eq!(
            g.to_production_output_vec().to_plaintext(),
            "S -> ε\n   | aA\nA -> b"
        );
    }

    #[test]
    fn productions_latex() {
        let g = Grammar::parse("S->a_|ε.").unwrap();
        let latex = g.to_production_output_vec().to_latex();
        assert!(latex.contains("S & \\rightarrow & \\epsilon \\mid a \\ \\_"), "{}", latex);
    }

    #[test]
    fn analysis_plaintext() {
        let g = Grammar::parse("S->aS|b.").unwrap();
        let text = g.analyze().to_plaintext();
        assert!(text.contains("Terminals | a, b"), "{}", text);
        assert!(text.contains("LR(1) | yes"), "{}", text);
    }

    #[test]
    fn parsing_table_layout() {
        let g = Grammar::parse("S->a.").unwrap();
        let table = Lr1Automaton::new(&g).unwrap().to_parsing_table();
        assert_eq!(table.terminals, vec![Symbol::from('a'), Symbol::from('$')]);
        assert_eq!(table.non_terminals, vec![Symbol::from('S')]);
        assert_eq!(table.action.len(), 3);
        // `S` sorts before `a`, so the goto target is found first.
        assert_eq!(table.goto[0][0], Some(1));
        assert_eq!(table.action[0][0], vec![Action::Shift(2)]);
        assert_eq!(table.action[1][1], vec![Action::Accept]);
        assert_eq!(table.productions[1], "S->a");
        let text = table.to_plaintext();
        assert!(text.contains("r(S->a)"), "{}", text);
        assert!(text.contains("acc"), "{}", text);
    }
}
