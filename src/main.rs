use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use cfg_workbench::grammar::symbol::symbols;
use cfg_workbench::parser::{CykParser, Lr1Parser};
use cfg_workbench::{Grammar, Limits, ParserKind, Transformation};

#[derive(Parser)]
#[command(version, about = "Analyze, normalize and parse context-free grammars")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Print in LaTeX format
    #[arg(short, long, global = true, conflicts_with = "json")]
    latex: bool,

    /// Print in JSON format
    #[arg(short, long, global = true)]
    json: bool,

    /// Character standing for the empty word in grammar text
    #[arg(long, global = true, value_name = "CHAR", default_value_t = 'ε')]
    epsilon: char,

    /// Production count at which GNF and left-recursion elimination give up
    #[arg(long, global = true, value_name = "N")]
    max_productions: Option<usize>,
}

#[derive(Subcommand)]
enum Command {
    /// Report the derived properties of a grammar
    Analyze {
        /// Grammar file, or the grammar itself (`S->aS|b.`)
        grammar: String,
    },
    /// Rewrite a grammar
    Transform {
        grammar: String,
        /// One of remove-ungenerative, remove-unreachable, remove-useless,
        /// remove-epsilon-productions, remove-unit-productions,
        /// eliminate-left-recursion, to-cnf, to-gnf
        transformation: String,
    },
    /// Decide whether a grammar generates a word
    Parse {
        grammar: String,
        /// Word to recognize; pass "" for the empty word
        word: String,
        /// cyk or lr1
        parser: String,
    },
}

enum OutputFormat {
    Plain,
    LaTeX,
    Json,
}

impl Cli {
    fn format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else if self.latex {
            OutputFormat::LaTeX
        } else {
            OutputFormat::Plain
        }
    }

    fn limits(&self) -> Limits {
        let mut limits = Limits::default();
        if let Some(max) = self.max_productions {
            limits.max_productions = max;
        }
        limits
    }

    fn grammar(&self, grammar: &str) -> Result<Grammar> {
        let text = if Path::new(grammar).is_file() {
            info!("reading grammar from {}", grammar);
            fs::read_to_string(grammar).with_context(|| format!("failed to read {}", grammar))?
        } else {
            grammar.to_string()
        };
        let g = Grammar::builder()
            .epsilon(self.epsilon)
            .notation(&text)
            .and_then(|b| b.build())
            .context("invalid grammar")?;
        Ok(g)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();
    let format = cli.format();

    match &cli.command {
        Command::Analyze { grammar } => {
            let g = cli.grammar(grammar)?;
            let analysis = g.analyze();
            let t = g.to_production_output_vec();
            match format {
                OutputFormat::Plain => {
                    println!("{}\n\n{}", t.to_plaintext(), analysis.to_plaintext())
                }
                OutputFormat::LaTeX => println!("{}\n\n{}", t.to_latex(), analysis.to_latex()),
                OutputFormat::Json => println!("{}", serde_json::to_string(&analysis)?),
            }
        }
        Command::Transform {
            grammar,
            transformation,
        } => {
            let g = cli.grammar(grammar)?;
            let transformation: Transformation = transformation.parse()?;
            let g = transformation.apply(&g, cli.limits())?;
            let t = g.to_production_output_vec();
            match format {
                OutputFormat::Plain => println!("{}\n\n{}", g, t.to_plaintext()),
                OutputFormat::LaTeX => println!("{}", t.to_latex()),
                OutputFormat::Json => println!("{}", serde_json::to_string(&t)?),
            }
        }
        Command::Parse {
            grammar,
            word,
            parser,
        } => {
            let g = cli.grammar(grammar)?;
            let kind: ParserKind = parser.parse()?;
            if let OutputFormat::Json = format {
                println!("{}", cfg_workbench::run_parser(&g, word, kind)?);
                return Ok(());
            }

            let word = symbols(word);
            match kind {
                ParserKind::Cyk => {
                    let cyk = CykParser::new(&g)?;
                    let parse = cyk.parse(&word);
                    match format {
                        OutputFormat::LaTeX => println!("{}", parse.matrix.to_latex()),
                        _ => println!("{}", parse.matrix.to_plaintext()),
                    }
                    println!("{}", parse.outcome);
                }
                ParserKind::Lr1 => {
                    let lr1 = Lr1Parser::new(&g)?;
                    let table = lr1.automaton().to_parsing_table();
                    let trace = lr1.to_trace_output(&lr1.parse(&word)?);
                    match format {
                        OutputFormat::LaTeX => {
                            println!("{}\n\n{}", table.to_latex(), trace.to_latex())
                        }
                        _ => println!("{}\n\n{}", table.to_plaintext(), trace.to_plaintext()),
                    }
                }
            }
        }
    }

    Ok(())
}
