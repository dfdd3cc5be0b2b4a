use colored::*;
use imp_syntax::error::{Diagnostic, DiagnosticKind, excerpt};

// Unknown names keep the parse alive, so they surface as warnings;
// everything else is an error.
fn header(kind: DiagnosticKind) -> ColoredString {
    match kind {
        DiagnosticKind::LexicalUnknown => "warning:".yellow().bold(),
        DiagnosticKind::LexicalIllegal
        | DiagnosticKind::PipelineIncomplete
        | DiagnosticKind::Syntax => "error:".red().bold(),
    }
}

pub fn print_all(diagnostics: &[Diagnostic], file: &str, source: &str) {
    for diag in diagnostics {
        print_one(diag, file, source);
    }
}

pub fn print_one(diag: &Diagnostic, file: &str, source: &str) {
    eprintln!("{} {}", header(diag.kind), diag.message.bold());
    match diag.span {
        Some(span) => {
            eprintln!(
                "  {} {}:{}:{}",
                "-->".blue().bold(),
                file,
                span.line,
                span.col
            );
            eprint!("{}", excerpt(source, span, diag.kind.label()));
        }
        None => {
            eprintln!("  {} {}: end of input", "-->".blue().bold(), file);
        }
    }
}
