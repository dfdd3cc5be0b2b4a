use crate::ast::{Command, Flag, FlagList, FlagValue, StartCommand, TargetFlag};
use crate::error::{Diagnostic, DiagnosticKind, Span};
use crate::lexer::{self, SpannedToken, Token};
use anyhow::bail;

/// Result of a parse run: the program (when the `program` rule reduced) and
/// every diagnostic collected along the way, in detection order.
///
/// The two are independent: a program together with a non-empty diagnostic
/// list means the parse recovered (unknown names, truncated pipeline tail);
/// `program == None` means an unrecoverable syntax error.
#[derive(Debug)]
pub struct ParseOutcome {
    pub program: Option<StartCommand>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseOutcome {
    /// True only for a parse that produced a program with zero diagnostics.
    pub fn is_clean(&self) -> bool {
        self.program.is_some() && self.diagnostics.is_empty()
    }
}

/// Unrecoverable violation of a grammar rule. Converted to a [`Diagnostic`]
/// at the recovery boundary that catches it.
struct SyntaxError {
    message: String,
    /// Offending lexeme in quotes, or `end of input`.
    found: String,
    span: Option<Span>,
}

fn unexpected(expected: &str, at: Option<&SpannedToken>) -> SyntaxError {
    match at {
        Some(st) => SyntaxError {
            message: format!("expected {}, found {}", expected, st.token.display_name()),
            found: format!("'{}'", st.token),
            span: Some(st.span),
        },
        None => SyntaxError {
            message: format!("expected {}, found end of input", expected),
            found: "end of input".to_string(),
            span: None,
        },
    }
}

/// Descent over the token stream. Holds only per-call cursor state; the
/// keyword and pattern tables live in the lexer as immutable statics.
pub struct Parser {
    tokens: Vec<SpannedToken>,
    pos: usize,
    diagnostics: Vec<Diagnostic>,
}

impl Parser {
    pub fn new(tokens: Vec<SpannedToken>) -> Self {
        Self {
            tokens,
            pos: 0,
            diagnostics: Vec::new(),
        }
    }

    #[inline]
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|st| &st.token)
    }

    #[inline]
    fn advance(&mut self) -> Option<SpannedToken> {
        if self.pos < self.tokens.len() {
            let token = self.tokens[self.pos].clone();
            self.pos += 1;
            Some(token)
        } else {
            None
        }
    }

    fn expect_equals(&mut self, flag: &str) -> Result<Span, SyntaxError> {
        match self.advance() {
            Some(SpannedToken {
                token: Token::Equals,
                span,
            }) => Ok(span),
            other => Err(unexpected(&format!("'=' after '--{}'", flag), other.as_ref())),
        }
    }

    /// `program := START target_flag command_chain`
    fn parse_program(&mut self) -> Result<StartCommand, SyntaxError> {
        let (name, start_span) = match self.advance() {
            Some(SpannedToken {
                token: Token::Start,
                span,
            }) => (Token::Start.to_string(), span),
            other => return Err(unexpected("keyword 'imp'", other.as_ref())),
        };

        let target = self.parse_target_flag()?;
        let pipeline_head = self.parse_command_chain()?;

        if self.pos < self.tokens.len() {
            let trailing = self.tokens[self.pos].clone();
            return Err(unexpected("end of input", Some(&trailing)));
        }

        let span = start_span.merge(&pipeline_head.span);
        Ok(StartCommand {
            name,
            target,
            pipeline_head,
            span,
        })
    }

    /// `target_flag := FLAG '=' (image_path | folder_path)`
    ///
    /// The flag name is not checked against `target` here; name validation
    /// is the lexer's job and anything further is semantic.
    fn parse_target_flag(&mut self) -> Result<TargetFlag, SyntaxError> {
        let (name, flag_span) = match self.advance() {
            Some(SpannedToken {
                token: Token::Flag(name),
                span,
            }) => (name, span),
            other => return Err(unexpected("a target flag", other.as_ref())),
        };

        self.expect_equals(&name)?;

        let (value, value_span) = match self.advance() {
            Some(SpannedToken {
                token: Token::ImagePath(path) | Token::FolderPath(path),
                span,
            }) => (path, span),
            other => return Err(unexpected("an image or folder path", other.as_ref())),
        };

        Ok(TargetFlag {
            name,
            value,
            span: flag_span.merge(&value_span),
        })
    }

    /// `command_chain := command | command '->' command_chain`
    ///
    /// Right-recursive, so `A -> B -> C` links `A.next = B`, `B.next = C`.
    /// A pipeline operator with a malformed continuation truncates the chain
    /// at the operator: the diagnostic names the unexpected token, the tail
    /// is discarded, and the already-built prefix is kept.
    fn parse_command_chain(&mut self) -> Result<Command, SyntaxError> {
        let mut head = self.parse_command()?;

        if matches!(self.peek(), Some(Token::Pipeline)) {
            self.advance();

            match self.parse_command_chain() {
                Ok(rest) => {
                    head.span = head.span.merge(&rest.span);
                    head.next = Some(Box::new(rest));
                }
                Err(err) => {
                    self.diagnostics.push(Diagnostic::new(
                        DiagnosticKind::PipelineIncomplete,
                        format!("'->' must be followed by a command chain, found {}", err.found),
                        err.span,
                    ));
                    // discard the malformed tail, keep the prefix
                    self.pos = self.tokens.len();
                }
            }
        }

        Ok(head)
    }

    /// `command := COMMAND | COMMAND flag_list`
    fn parse_command(&mut self) -> Result<Command, SyntaxError> {
        let (name, mut span) = match self.advance() {
            Some(SpannedToken {
                token: Token::Command(name),
                span,
            }) => (name, span),
            other => return Err(unexpected("a command", other.as_ref())),
        };

        let mut flags = FlagList::new();
        while matches!(self.peek(), Some(Token::Flag(_))) {
            let flag = self.parse_flag()?;
            span = span.merge(&flag.span);
            flags.push(flag);
        }

        Ok(Command {
            name,
            flags,
            next: None,
            span,
        })
    }

    /// `flag := FLAG '=' value` with `value := NUMBER | FORMAT | image_path`
    fn parse_flag(&mut self) -> Result<Flag, SyntaxError> {
        let (name, flag_span) = match self.advance() {
            Some(SpannedToken {
                token: Token::Flag(name),
                span,
            }) => (name, span),
            other => return Err(unexpected("a flag", other.as_ref())),
        };

        self.expect_equals(&name)?;

        let (value, value_span) = match self.advance() {
            Some(SpannedToken { token, span }) => match token {
                Token::Number(n) => (FlagValue::Number(n), span),
                Token::Format(s) => (FlagValue::Format(s), span),
                Token::ImagePath(p) => (FlagValue::Path(p), span),
                other => {
                    let st = SpannedToken { token: other, span };
                    return Err(unexpected(
                        "a number, image format, or image path",
                        Some(&st),
                    ));
                }
            },
            None => {
                return Err(unexpected(
                    "a number, image format, or image path",
                    None,
                ));
            }
        };

        Ok(Flag {
            name,
            value,
            span: flag_span.merge(&value_span),
        })
    }
}

/// Parses an already-lexed token stream.
pub fn parse_tokens(tokens: Vec<SpannedToken>) -> ParseOutcome {
    let mut parser = Parser::new(tokens);
    match parser.parse_program() {
        Ok(program) => ParseOutcome {
            program: Some(program),
            diagnostics: parser.diagnostics,
        },
        Err(err) => {
            parser
                .diagnostics
                .push(Diagnostic::new(DiagnosticKind::Syntax, err.message, err.span));
            ParseOutcome {
                program: None,
                diagnostics: parser.diagnostics,
            }
        }
    }
}

/// Lexes and parses `source`. This is the main entry point; lexical
/// diagnostics come first in the returned list, parse diagnostics after.
pub fn parse(source: &str) -> ParseOutcome {
    let (tokens, mut diagnostics) = lexer::tokenize(source);
    let outcome = parse_tokens(tokens);
    diagnostics.extend(outcome.diagnostics);
    ParseOutcome {
        program: outcome.program,
        diagnostics,
    }
}

/// Like [`parse`], but any diagnostic at all is an error. Convenient for
/// callers that have no use for a partially recovered program.
pub fn parse_strict(source: &str) -> anyhow::Result<StartCommand> {
    let outcome = parse(source);
    match outcome.program {
        Some(program) if outcome.diagnostics.is_empty() => Ok(program),
        _ => match outcome.diagnostics.first() {
            Some(first) => bail!("{}", first),
            None => bail!("syntax-generic: no program parsed"),
        },
    }
}
