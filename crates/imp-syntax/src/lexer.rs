use crate::error::{Diagnostic, DiagnosticKind, Span};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::fmt;

static COMMANDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "crop",
        "convert",
        "rotate",
        "resize",
        "flipX",
        "flipY",
        "bw",
        "colorize",
        "contrast",
        "brightness",
        "negative",
        "blur",
        "sharpen",
        "compress",
        "ft",
        "th",
    ]
    .into_iter()
    .collect()
});

static FLAGS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["target", "x", "y", "w", "h", "format", "deg", "lvl", "help"]
        .into_iter()
        .collect()
});

static FORMATS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["png", "jpg", "jpeg", "gif", "bmp", "tiff", "webp"]
        .into_iter()
        .collect()
});

// Quoted-literal shapes. Paths may carry a drive prefix or leading slash,
// any number of `/`- or `\`-separated segments, and no embedded quote. An
// image path must end in a recognized format extension.
static IMAGE_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(?:[A-Za-z]:\\|/)?(?:[^"/\\]+[\\/])*[^"/\\]*\.(?:png|jpg|jpeg|gif|bmp|tiff|webp)$"#)
        .expect("image path pattern")
});

static FOLDER_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(?:[A-Za-z]:\\|/)?(?:[^"/\\]+[\\/])+[^"/\\]*/?$"#).expect("folder path pattern")
});

/// One lexeme of the pipeline language.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// The program entry keyword `imp`.
    Start,
    /// A command name. Emitted for unknown names too; the parser decides
    /// syntactic validity, the lexer only reports the unknown name.
    Command(String),
    /// A `--name` flag, stored without the dashes.
    Flag(String),
    Number(u64),
    /// Quoted literal whose entire content is a recognized image format.
    Format(String),
    /// Quoted literal shaped like a file path with an image extension.
    ImagePath(String),
    /// Quoted literal shaped like a directory path.
    FolderPath(String),
    /// Any other quoted literal.
    Quoted(String),
    Equals,
    Pipeline,
}

impl Token {
    /// Human-readable description used in diagnostics.
    pub fn display_name(&self) -> String {
        match self {
            Token::Start => "keyword 'imp'".to_string(),
            Token::Command(s) => format!("command '{}'", s),
            Token::Flag(s) => format!("flag '--{}'", s),
            Token::Number(n) => format!("number {}", n),
            Token::Format(s) => format!("image format \"{}\"", s),
            Token::ImagePath(s) => format!("image path \"{}\"", s),
            Token::FolderPath(s) => format!("folder path \"{}\"", s),
            Token::Quoted(s) => format!("string \"{}\"", s),
            Token::Equals => "'='".to_string(),
            Token::Pipeline => "'->'".to_string(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Start => write!(f, "imp"),
            Token::Command(s) => write!(f, "{}", s),
            Token::Flag(s) => write!(f, "--{}", s),
            Token::Number(n) => write!(f, "{}", n),
            Token::Format(s) | Token::ImagePath(s) | Token::FolderPath(s) | Token::Quoted(s) => {
                write!(f, "\"{}\"", s)
            }
            Token::Equals => write!(f, "="),
            Token::Pipeline => write!(f, "->"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
}

fn classify_quoted(content: String) -> Token {
    if FORMATS.contains(content.as_str()) {
        Token::Format(content)
    } else if IMAGE_PATH.is_match(&content) {
        Token::ImagePath(content)
    } else if FOLDER_PATH.is_match(&content) {
        Token::FolderPath(content)
    } else {
        Token::Quoted(content)
    }
}

/// Scans `input` left to right into a token stream.
///
/// Scanning never aborts: unknown names and illegal characters are recorded
/// as [`Diagnostic`]s and the scan resumes. Unknown commands and flags still
/// produce a token so downstream sequencing is not derailed.
pub fn tokenize(input: &str) -> (Vec<SpannedToken>, Vec<Diagnostic>) {
    let mut tokens = Vec::with_capacity(input.len() / 4);
    let mut diagnostics = Vec::new();
    let mut chars = input.chars().peekable();

    let mut line = 1;
    let mut col = 1;
    let mut offset = 0;

    let bump = |ch: char, line: &mut usize, col: &mut usize, offset: &mut usize| {
        if ch == '\n' {
            *line += 1;
            *col = 1;
        } else {
            *col += 1;
        }
        *offset += ch.len_utf8();
    };

    while let Some(&ch) = chars.peek() {
        let start_line = line;
        let start_col = col;
        let start_offset = offset;

        match ch {
            ' ' | '\t' | '\r' | '\n' => {
                chars.next();
                bump(ch, &mut line, &mut col, &mut offset);
            }

            '"' => {
                chars.next();
                bump(ch, &mut line, &mut col, &mut offset);

                match input[offset..].find('"') {
                    Some(rel) => {
                        let content = input[offset..offset + rel].to_string();
                        let close = offset + rel;
                        while offset <= close {
                            match chars.next() {
                                Some(c) => bump(c, &mut line, &mut col, &mut offset),
                                None => break,
                            }
                        }
                        tokens.push(SpannedToken {
                            token: classify_quoted(content),
                            span: Span::new(start_line, start_col, start_offset, offset),
                        });
                    }
                    None => {
                        // only the quote is dropped; the rest rescans normally
                        diagnostics.push(Diagnostic::new(
                            DiagnosticKind::LexicalIllegal,
                            "unterminated string literal",
                            Some(Span::new(start_line, start_col, start_offset, offset)),
                        ));
                    }
                }
            }

            '0'..='9' => {
                let mut num_str = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_digit() {
                        num_str.push(c);
                        chars.next();
                        bump(c, &mut line, &mut col, &mut offset);
                    } else {
                        break;
                    }
                }

                let span = Span::new(start_line, start_col, start_offset, offset);
                match num_str.parse::<u64>() {
                    Ok(n) => tokens.push(SpannedToken {
                        token: Token::Number(n),
                        span,
                    }),
                    Err(_) => diagnostics.push(Diagnostic::new(
                        DiagnosticKind::LexicalIllegal,
                        format!("numeric literal '{}' out of range", num_str),
                        Some(span),
                    )),
                }
            }

            '=' => {
                chars.next();
                bump(ch, &mut line, &mut col, &mut offset);
                tokens.push(SpannedToken {
                    token: Token::Equals,
                    span: Span::new(start_line, start_col, start_offset, offset),
                });
            }

            '-' => {
                let rest = &input[offset..];

                if rest.starts_with("->") {
                    chars.next();
                    bump('-', &mut line, &mut col, &mut offset);
                    chars.next();
                    bump('>', &mut line, &mut col, &mut offset);
                    tokens.push(SpannedToken {
                        token: Token::Pipeline,
                        span: Span::new(start_line, start_col, start_offset, offset),
                    });
                } else if rest.starts_with("--")
                    && rest[2..].starts_with(|c: char| c.is_ascii_alphabetic())
                {
                    chars.next();
                    bump('-', &mut line, &mut col, &mut offset);
                    chars.next();
                    bump('-', &mut line, &mut col, &mut offset);

                    let mut name = String::with_capacity(8);
                    while let Some(&c) = chars.peek() {
                        if c.is_ascii_alphabetic() {
                            name.push(c);
                            chars.next();
                            bump(c, &mut line, &mut col, &mut offset);
                        } else {
                            break;
                        }
                    }

                    let span = Span::new(start_line, start_col, start_offset, offset);
                    if !FLAGS.contains(name.as_str()) {
                        diagnostics.push(Diagnostic::new(
                            DiagnosticKind::LexicalUnknown,
                            format!("unknown flag '--{}'", name),
                            Some(span),
                        ));
                        tokens.push(SpannedToken {
                            token: Token::Flag(name),
                            span,
                        });
                        // resynchronize past one character
                        if let Some(&c) = chars.peek() {
                            chars.next();
                            bump(c, &mut line, &mut col, &mut offset);
                        }
                    } else {
                        tokens.push(SpannedToken {
                            token: Token::Flag(name),
                            span,
                        });
                    }
                } else {
                    chars.next();
                    bump(ch, &mut line, &mut col, &mut offset);
                    diagnostics.push(Diagnostic::new(
                        DiagnosticKind::LexicalIllegal,
                        "illegal character '-'",
                        Some(Span::new(start_line, start_col, start_offset, offset)),
                    ));
                }
            }

            _ if ch.is_ascii_alphabetic() || ch == '_' => {
                let mut ident = String::with_capacity(16);
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        ident.push(c);
                        chars.next();
                        bump(c, &mut line, &mut col, &mut offset);
                    } else {
                        break;
                    }
                }

                let span = Span::new(start_line, start_col, start_offset, offset);
                if ident == "imp" {
                    tokens.push(SpannedToken {
                        token: Token::Start,
                        span,
                    });
                } else {
                    if !COMMANDS.contains(ident.as_str()) {
                        diagnostics.push(Diagnostic::new(
                            DiagnosticKind::LexicalUnknown,
                            format!("unknown command '{}'", ident),
                            Some(span),
                        ));
                    }
                    tokens.push(SpannedToken {
                        token: Token::Command(ident),
                        span,
                    });
                }
            }

            _ => {
                chars.next();
                bump(ch, &mut line, &mut col, &mut offset);
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::LexicalIllegal,
                    format!("illegal character '{}'", ch),
                    Some(Span::new(start_line, start_col, start_offset, offset)),
                ));
            }
        }
    }

    (tokens, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_start_keyword() {
        let (tokens, diagnostics) = tokenize("imp");

        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].token, Token::Start);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_tokenize_commands() {
        let (tokens, diagnostics) = tokenize("crop flipX bw ft");

        assert_eq!(tokens[0].token, Token::Command("crop".to_string()));
        assert_eq!(tokens[1].token, Token::Command("flipX".to_string()));
        assert_eq!(tokens[2].token, Token::Command("bw".to_string()));
        assert_eq!(tokens[3].token, Token::Command("ft".to_string()));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_tokenize_operators() {
        let (tokens, diagnostics) = tokenize("= ->");

        assert_eq!(tokens[0].token, Token::Equals);
        assert_eq!(tokens[1].token, Token::Pipeline);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_tokenize_flag() {
        let (tokens, diagnostics) = tokenize("--target --lvl");

        assert_eq!(tokens[0].token, Token::Flag("target".to_string()));
        assert_eq!(tokens[1].token, Token::Flag("lvl".to_string()));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_tokenize_number() {
        let (tokens, diagnostics) = tokenize("42 007");

        assert_eq!(tokens[0].token, Token::Number(42));
        assert_eq!(tokens[1].token, Token::Number(7));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_quoted_format() {
        let (tokens, _) = tokenize(r#""png" "webp""#);

        assert_eq!(tokens[0].token, Token::Format("png".to_string()));
        assert_eq!(tokens[1].token, Token::Format("webp".to_string()));
    }

    #[test]
    fn test_quoted_image_path() {
        let (tokens, _) = tokenize(r#""in.png" "/imgs/photo.jpeg" "C:\imgs\a.bmp""#);

        assert_eq!(tokens[0].token, Token::ImagePath("in.png".to_string()));
        assert_eq!(tokens[1].token, Token::ImagePath("/imgs/photo.jpeg".to_string()));
        assert_eq!(tokens[2].token, Token::ImagePath(r"C:\imgs\a.bmp".to_string()));
    }

    #[test]
    fn test_quoted_folder_path() {
        let (tokens, _) = tokenize(r#""/imgs/" "photos/summer" "C:\imgs\""#);

        assert_eq!(tokens[0].token, Token::FolderPath("/imgs/".to_string()));
        assert_eq!(tokens[1].token, Token::FolderPath("photos/summer".to_string()));
        assert_eq!(tokens[2].token, Token::FolderPath(r"C:\imgs\".to_string()));
    }

    #[test]
    fn test_quoted_fallback() {
        let (tokens, _) = tokenize(r#""banana""#);

        assert_eq!(tokens[0].token, Token::Quoted("banana".to_string()));
    }

    #[test]
    fn test_unknown_command_still_tokenized() {
        let (tokens, diagnostics) = tokenize("foo");

        assert_eq!(tokens[0].token, Token::Command("foo".to_string()));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::LexicalUnknown);
        assert!(diagnostics[0].message.contains("foo"));
    }

    #[test]
    fn test_unknown_flag_skips_one_char() {
        // the '=' after the unknown flag is swallowed by the resync skip
        let (tokens, diagnostics) = tokenize("crop --bogus=5");

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::LexicalUnknown);
        assert!(diagnostics[0].message.contains("--bogus"));

        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].token, Token::Command("crop".to_string()));
        assert_eq!(tokens[1].token, Token::Flag("bogus".to_string()));
        assert_eq!(tokens[2].token, Token::Number(5));
    }

    #[test]
    fn test_stray_hyphen_recovers_to_pipeline() {
        // only the first '-' is dropped; the remaining "->" still lexes
        let (tokens, diagnostics) = tokenize("bw --> crop");

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::LexicalIllegal);
        assert_eq!(tokens[1].token, Token::Pipeline);
        assert_eq!(tokens[2].token, Token::Command("crop".to_string()));
    }

    #[test]
    fn test_illegal_character_offset() {
        let (tokens, diagnostics) = tokenize("imp @ crop");

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::LexicalIllegal);
        assert!(diagnostics[0].message.contains('@'));
        assert_eq!(diagnostics[0].offset(), Some(4));

        // tokens on both sides of the illegal character survive
        assert_eq!(tokens[0].token, Token::Start);
        assert_eq!(tokens[1].token, Token::Command("crop".to_string()));
    }

    #[test]
    fn test_unterminated_string() {
        let (tokens, diagnostics) = tokenize(r#"imp "abc"#);

        assert_eq!(tokens[0].token, Token::Start);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::LexicalIllegal);
        assert!(diagnostics[0].message.contains("unterminated"));
        // the quote is dropped and "abc" rescans as an (unknown) command
        assert_eq!(tokens[1].token, Token::Command("abc".to_string()));
    }

    #[test]
    fn test_span_tracking() {
        let (tokens, _) = tokenize("imp --target=\"in.png\"");

        assert_eq!(tokens[0].span.line, 1);
        assert_eq!(tokens[0].span.col, 1);
        assert_eq!(tokens[0].span.start, 0);
        assert_eq!(tokens[0].span.end, 3);

        assert_eq!(tokens[1].span.col, 5);
        assert_eq!(tokens[1].span.start, 4);
        assert_eq!(tokens[1].span.end, 12);
    }

    #[test]
    fn test_whitespace_carries_no_token() {
        let (tokens, diagnostics) = tokenize(" \t\r\n ");

        assert!(tokens.is_empty());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_display_round_trips_lexemes() {
        let (tokens, _) = tokenize(r#"imp --target="in.png" crop --x=10 -> bw"#);
        let rendered: Vec<String> = tokens.iter().map(|t| t.token.to_string()).collect();

        assert_eq!(
            rendered,
            vec!["imp", "--target", "=", "\"in.png\"", "crop", "--x", "=", "10", "->", "bw"]
        );
    }
}
