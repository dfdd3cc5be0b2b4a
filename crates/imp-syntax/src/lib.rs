//! # imp-syntax
//!
//! Lexer, parser, and Abstract Syntax Tree (AST) definitions for the imp
//! image-pipeline language.
//!
//! ## Overview
//!
//! This crate provides the foundational components for parsing imp scripts:
//!
//! - **Lexer**: Tokenizes source text into a stream of spanned tokens
//! - **Parser**: Builds an Abstract Syntax Tree from tokens
//! - **AST**: Type-safe representation of a pipeline program
//! - **Diagnostics**: Structured, positioned problem reports accumulated
//!   alongside the parse result instead of aborting on first error
//!
//! ## Architecture
//!
//! ```text
//! Source Code
//!     ↓
//! Lexer (tokenize)
//!     ↓
//! Vec<SpannedToken>
//!     ↓
//! Parser (parse)
//!     ↓
//! StartCommand (AST) + Vec<Diagnostic>
//! ```
//!
//! ## Example
//!
//! ```rust
//! use imp_syntax::parse;
//!
//! let outcome = parse(r#"imp --target="in.png" crop --x=10 --y=10 -> bw"#);
//!
//! let program = outcome.program.expect("parse failed");
//! assert!(outcome.diagnostics.is_empty());
//! assert_eq!(program.target.value, "in.png");
//! assert_eq!(program.stages().count(), 2);
//! ```
//!
//! ## Grammar Overview
//!
//! ```text
//! program       := 'imp' target_flag command_chain
//! target_flag   := FLAG '=' (image_path | folder_path)
//! command_chain := command | command '->' command_chain
//! command       := COMMAND | COMMAND flag_list
//! flag          := FLAG '=' (NUMBER | FORMAT | image_path)
//! ```
//!
//! ## Error Handling
//!
//! Lexical problems (unknown names, illegal characters) never stop the scan;
//! they are collected as [`Diagnostic`]s and tokenization continues. Syntax
//! problems fail the smallest enclosing rule: a malformed pipeline tail is
//! truncated and the prefix kept, anything else fails the whole parse. The
//! caller inspects [`ParseOutcome::diagnostics`] to tell a clean parse from
//! a recovered one.

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;

pub use ast::{Command, Flag, FlagList, FlagValue, NodeRef, StartCommand, Stages, TargetFlag};
pub use error::{Diagnostic, DiagnosticKind, Span};
pub use lexer::{SpannedToken, Token, tokenize};
pub use parser::{ParseOutcome, parse, parse_strict, parse_tokens};
