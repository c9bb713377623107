//! C-like lexer.
//!
//! Turns source text into a flat list of [`Token`]s with line/column
//! positions, and turns a slice of tokens back into source text. Newlines are
//! consumed for position tracking but never emitted; comments are emitted so
//! reconstructed text keeps them.

pub mod token;

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::SourceConfig;
use crate::errors::{ErrorLocation, ParseResult, SourceView, SyntaxError};
pub use token::{LineCol, Token, TokenKind};

// ============================================================================
// PATTERNS
// ============================================================================

const IDENTIFIER: &str = r"[a-zA-Z_][0-9a-zA-Z_]*";
const SUFFIX: &str = r"[uU]?[lL]?[lL]?";
const EXPONENT: &str = r"[eE][-+]?[0-9]+";
const STRING: &str = r#""(?:[^"\\\n]|\\(?:[a-zA-Z._~!=&^\-\\?'"]|[0-9]+|x[0-9a-fA-F]+))*""#;
const CHARACTER: &str = r"'(?:[^'\\\n]|\\[^\n])'";
const NEWLINE: &str = r"\n";
const MACRO: &str = r"# *(?:ifdef|ifndef|undef|define|error|endif|if|else|include|#)";
const COMMENT: &str = r"//.*|/\*(?:[^*]|\*+[^*/])*\*+/";
const INVALID: &str = r"\S";

fn number_pattern() -> String {
    let octal = format!("0[0-7]+{SUFFIX}");
    let hex = "0[xX][0-9a-fA-F]+".to_string();
    let fraction = r"[0-9]*\.[0-9]+|[0-9]+\.";
    let float = format!("(?:(?:(?:{fraction})(?:{EXPONENT})?)|(?:[0-9]+(?:{EXPONENT})))[FfLl]?");
    let decimal = format!("(?:0|[1-9][0-9]*){SUFFIX}");
    choice(&[&octal, &hex, &float, &decimal])
}

fn choice(options: &[&str]) -> String {
    options
        .iter()
        .map(|option| format!("(?:{option})"))
        .collect::<Vec<_>>()
        .join("|")
}

static MATCHER: Lazy<Regex> = Lazy::new(|| {
    let number = number_pattern();
    let operators: Vec<String> = token::OPERATORS
        .iter()
        .map(|(spelling, _)| regex::escape(spelling))
        .collect();
    let mut options: Vec<&str> = vec![IDENTIFIER, number.as_str(), STRING, CHARACTER, NEWLINE, MACRO, COMMENT];
    options.extend(operators.iter().map(String::as_str));
    options.push(INVALID);
    Regex::new(&choice(&options)).expect("token pattern is valid")
});

// ============================================================================
// TOKENIZER
// ============================================================================

/// Tokenize `text`. Line numbers start at `config.first_line`.
pub fn tokenize(text: &str, config: &SourceConfig) -> ParseResult<Vec<Token>> {
    tokenize_in(text, config, &SourceView::new(&config.filename, text, config.first_line))
}

/// Tokenize `text`, reporting bad tokens against `view`.
pub(crate) fn tokenize_in(text: &str, config: &SourceConfig, view: &SourceView) -> ParseResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut line = config.first_line;
    // Byte index of the newline ending the previous line; columns are 1-based.
    let mut line_start: isize = -1;

    for found in MATCHER.find_iter(text) {
        let start = found.start();
        let lexeme = found.as_str();
        let column = (start as isize - line_start) as usize;

        if lexeme == "\n" {
            line_start = start as isize;
            line += 1;
            continue;
        }

        let Some(kind) = classify(lexeme) else {
            return Err(bad_token(view, text, lexeme, line, column, line_start, start));
        };

        let begin = LineCol::new(line, column);
        if kind == TokenKind::Comment {
            if let Some(last_newline) = lexeme.rfind('\n') {
                line += lexeme.matches('\n').count();
                line_start = (start + last_newline) as isize;
            }
        }
        let end = LineCol::new(line, (found.end() as isize - line_start) as usize);

        tokens.push(Token {
            kind,
            text: lexeme.to_string(),
            begin,
            end,
            offset: start,
        });
    }

    debug!("{}: lexed {} tokens", config.filename, tokens.len());
    Ok(tokens)
}

fn classify(lexeme: &str) -> Option<TokenKind> {
    if let Some(kind) = TokenKind::keyword(lexeme) {
        return Some(kind);
    }
    let first = lexeme.chars().next()?;
    let kind = if first.is_ascii_alphabetic() || first == '_' {
        TokenKind::Identifier
    } else if lexeme == "..." {
        TokenKind::Ellipsis
    } else if lexeme == "." {
        TokenKind::Period
    } else if first.is_ascii_digit() || first == '.' {
        TokenKind::Number
    } else if first == '"' {
        TokenKind::String
    } else if let Some(kind) = TokenKind::operator(lexeme) {
        kind
    } else if first == '\'' {
        TokenKind::Character
    } else if first == '#' {
        TokenKind::Macro
    } else if lexeme.starts_with("//") || lexeme.starts_with("/*") {
        TokenKind::Comment
    } else {
        return None;
    };
    Some(kind)
}

fn bad_token(
    view: &SourceView,
    text: &str,
    lexeme: &str,
    line: usize,
    column: usize,
    line_start: isize,
    start: usize,
) -> SyntaxError {
    let line_begin = (line_start + 1) as usize;
    let line_end = text[line_begin..]
        .find('\n')
        .map_or(text.len(), |index| line_begin + index);
    view.error(
        format!("Bad token: {lexeme}"),
        ErrorLocation {
            line,
            column,
            line_text: text[line_begin..line_end].to_string(),
            offset: start,
            len: lexeme.len(),
        },
    )
}

// ============================================================================
// TEXT RECONSTRUCTION
// ============================================================================

/// Rebuild source text from `tokens`.
///
/// Layout comes from token positions: a newline for every line crossed and
/// spaces up to each token's column. Output columns start at `1 + dedent`,
/// so a positive `dedent` strips that many leading columns from each line
/// and a negative one indents by `-dedent`.
pub fn to_text(tokens: &[Token], dedent: isize) -> String {
    let mut out = String::new();
    let mut line: Option<usize> = None;
    let mut column: isize = 1 + dedent;

    for token in tokens {
        let mut current = *line.get_or_insert(token.begin.line);
        while token.begin.line > current {
            current += 1;
            out.push('\n');
            column = 1 + dedent;
        }
        let padding = token.begin.column as isize - column;
        if padding > 0 {
            out.push_str(&" ".repeat(padding as usize));
        }
        if dedent != 0 && token.kind == TokenKind::Comment && token.text.contains('\n') {
            out.push_str(&dedent_comment(&token.text, dedent));
        } else {
            out.push_str(&token.text);
        }
        line = Some(token.end.line);
        column = token.end.column as isize;
    }

    out
}

fn dedent_comment(text: &str, dedent: isize) -> String {
    if dedent < 0 {
        let indent = " ".repeat(dedent.unsigned_abs());
        return text.replace('\n', &format!("\n{indent}"));
    }
    let mut lines = text.split('\n');
    let mut out = lines.next().unwrap_or_default().to_string();
    for rest in lines {
        let strip = rest
            .chars()
            .take(dedent as usize)
            .take_while(|c| *c == ' ')
            .count();
        out.push('\n');
        out.push_str(&rest[strip..]);
    }
    out
}
