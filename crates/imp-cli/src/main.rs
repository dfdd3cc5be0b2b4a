//! # imp-cli
//!
//! Command-line interface for the imp image-pipeline language.
//!
//! Reads a pipeline script from a file or the command line, runs it through
//! the lexer and parser, and reports every collected diagnostic with source
//! context. Can also dump the token stream or emit a Graphviz diagram of the
//! parsed pipeline.

mod report;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use colored::*;
use imp_syntax::{lexer, parser};
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "imp")]
#[command(about = "Front end for the imp image-pipeline language", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Script file to check when no subcommand is given
    #[arg(value_name = "SCRIPT")]
    script: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a script and report diagnostics
    Check {
        #[arg(value_name = "SCRIPT")]
        script: Option<PathBuf>,
        /// Inline script text instead of a file
        #[arg(short, long)]
        source: Option<String>,
    },
    /// Dump the spanned token stream
    Tokens {
        #[arg(value_name = "SCRIPT")]
        script: Option<PathBuf>,
        /// Inline script text instead of a file
        #[arg(short, long)]
        source: Option<String>,
    },
    /// Emit a Graphviz diagram of the parsed pipeline
    Diagram {
        #[arg(value_name = "SCRIPT")]
        script: Option<PathBuf>,
        /// Inline script text instead of a file
        #[arg(short, long)]
        source: Option<String>,
        /// Write the DOT document here instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

struct Input {
    name: String,
    text: String,
}

fn load(script: Option<PathBuf>, source: Option<String>) -> Result<Input> {
    match (script, source) {
        (Some(_), Some(_)) => bail!("pass a script file or --source, not both"),
        (Some(path), None) => {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("failed to read script from {}", path.display()))?;
            Ok(Input {
                name: path.display().to_string(),
                text,
            })
        }
        (None, Some(text)) => Ok(Input {
            name: "<source>".to_string(),
            text,
        }),
        (None, None) => bail!("no script given; pass a file path or --source"),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Check { script, source }) => check(load(script, source)?),
        Some(Commands::Tokens { script, source }) => tokens(load(script, source)?),
        Some(Commands::Diagram {
            script,
            source,
            output,
        }) => diagram(load(script, source)?, output),
        None => check(load(cli.script, None)?),
    }
}

fn check(input: Input) -> Result<()> {
    let outcome = parser::parse(&input.text);
    report::print_all(&outcome.diagnostics, &input.name, &input.text);

    match outcome.program {
        Some(program) => {
            let stages = program.stages().count();
            println!(
                "{} parsed {} stage{} targeting \"{}\"",
                "ok:".green().bold(),
                stages,
                if stages == 1 { "" } else { "s" },
                program.target.value
            );
            if !outcome.diagnostics.is_empty() {
                println!(
                    "{} recovered with {} diagnostic(s)",
                    "note:".yellow().bold(),
                    outcome.diagnostics.len()
                );
            }
            Ok(())
        }
        None => {
            eprintln!("{} script did not parse", "failed:".red().bold());
            std::process::exit(1);
        }
    }
}

fn tokens(input: Input) -> Result<()> {
    let (tokens, diagnostics) = lexer::tokenize(&input.text);

    for st in &tokens {
        println!(
            "{:>4}:{:<4} {}",
            st.span.line,
            st.span.col,
            st.token.display_name()
        );
    }
    report::print_all(&diagnostics, &input.name, &input.text);

    Ok(())
}

fn diagram(input: Input, output: Option<PathBuf>) -> Result<()> {
    let outcome = parser::parse(&input.text);
    report::print_all(&outcome.diagnostics, &input.name, &input.text);

    let Some(program) = outcome.program else {
        eprintln!("{} script did not parse", "failed:".red().bold());
        std::process::exit(1);
    };

    let dot = imp_viz::render_dot(&program);
    match output {
        Some(path) => {
            fs::write(&path, dot)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("{} wrote {}", "ok:".green().bold(), path.display());
        }
        None => print!("{}", dot),
    }

    Ok(())
}
