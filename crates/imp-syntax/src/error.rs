use std::fmt;

/// Source region of a token or diagnostic. `start`/`end` are byte offsets
/// into the original input, `line`/`col` are 1-based and point at the start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub line: usize,
    pub col: usize,
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(line: usize, col: usize, start: usize, end: usize) -> Self {
        Self { line, col, start, end }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn merge(&self, other: &Span) -> Self {
        Self {
            line: self.line.min(other.line),
            col: if self.line == other.line { self.col.min(other.col) } else { self.col },
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// Classification of everything the front end can complain about.
///
/// The first two are produced while scanning and never stop the scan; the
/// last two are produced while parsing. `PipelineIncomplete` is recoverable
/// (the chain is truncated at the operator), `Syntax` is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// Well-shaped name that is not in the known command/flag set.
    LexicalUnknown,
    /// Character no pattern recognizes.
    LexicalIllegal,
    /// `->` not followed by a well-formed command chain.
    PipelineIncomplete,
    /// Any other grammar violation.
    Syntax,
}

impl DiagnosticKind {
    pub fn label(&self) -> &'static str {
        match self {
            DiagnosticKind::LexicalUnknown => "lexical-unknown",
            DiagnosticKind::LexicalIllegal => "lexical-illegal",
            DiagnosticKind::PipelineIncomplete => "syntax-pipeline-incomplete",
            DiagnosticKind::Syntax => "syntax-generic",
        }
    }
}

/// A single reported problem. Diagnostics are accumulated in detection order
/// and returned next to the parse result; they are never printed by this
/// crate.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    /// `None` when the problem is at end of input.
    pub span: Option<Span>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>, span: Option<Span>) -> Self {
        Self { kind, message: message.into(), span }
    }

    /// Byte offset of the offending text, when known.
    pub fn offset(&self) -> Option<usize> {
        self.span.map(|s| s.start)
    }

    /// Multi-line rendering with a caret-annotated source excerpt.
    pub fn render(&self, source: &str) -> String {
        let mut output = String::new();
        output.push_str(&format!("error: {}\n", self.message));
        match self.span {
            Some(span) => {
                output.push_str(&format!("  --> line {}:{}\n", span.line, span.col));
                output.push_str(&excerpt(source, span, self.kind.label()));
            }
            None => {
                output.push_str(&format!("  --> end of input ({})\n", self.kind.label()));
            }
        }
        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.span {
            Some(span) => write!(
                f,
                "{}: {} at line {}, column {}",
                self.kind.label(),
                self.message,
                span.line,
                span.col
            ),
            None => write!(f, "{}: {}", self.kind.label(), self.message),
        }
    }
}

impl std::error::Error for Diagnostic {}

/// Caret-annotated excerpt of the source line a span points at.
pub fn excerpt(source: &str, span: Span, label: &str) -> String {
    let lines: Vec<&str> = source.lines().collect();
    let line_idx = span.line.saturating_sub(1);

    if line_idx >= lines.len() {
        return String::new();
    }

    let line_content = lines[line_idx];
    let line_num_width = span.line.to_string().len().max(2);

    let mut output = String::new();
    output.push_str(&format!(" {: >width$} |\n", "", width = line_num_width));
    output.push_str(&format!(
        " {: >width$} | {}\n",
        span.line,
        line_content,
        width = line_num_width
    ));

    let caret_len = span.end.saturating_sub(span.start).max(1);
    output.push_str(&format!(
        " {: >width$} | {}{} {}\n",
        "",
        " ".repeat(span.col.saturating_sub(1)),
        "^".repeat(caret_len),
        label,
        width = line_num_width
    ));

    output
}
