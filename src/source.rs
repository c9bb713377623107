//! Token sources and cursors.
//!
//! A [`Source`] owns the text and its fully materialized token list for the
//! whole parse session. A [`Cursor`] borrows a `Source` and owns nothing but
//! a [`Position`], so spans can point back into the source while the cursor
//! keeps moving.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{Section, SourceConfig};
use crate::errors::{ErrorLocation, ParseResult, SourceView, SyntaxError};
use crate::lexer::{self, Token, TokenKind};

// ============================================================================
// POSITION
// ============================================================================

/// Index into a token list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position(usize);

impl Position {
    pub const START: Position = Position(0);

    pub fn new(index: usize) -> Self {
        Position(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// SOURCE
// ============================================================================

/// Source text plus its token list.
pub struct Source {
    filename: String,
    first_line: usize,
    text: String,
    tokens: Vec<Token>,
    view: SourceView,
}

impl Source {
    /// Tokenize `text` labelled `filename`.
    pub fn new(filename: impl Into<String>, text: impl Into<String>) -> ParseResult<Self> {
        Self::with_config(text, &SourceConfig::named(filename))
    }

    pub fn with_config(text: impl Into<String>, config: &SourceConfig) -> ParseResult<Self> {
        let text = text.into();
        let view = SourceView::new(&config.filename, &text, config.first_line);
        Self::build(text, config, view)
    }

    /// Tokenize a section selected from `file`. Diagnostics quote `file`.
    pub fn from_section(file: &str, section: Section) -> ParseResult<Self> {
        let config = section.config;
        let view = SourceView::within(&config.filename, file, section.offset, config.first_line);
        Self::build(section.text, &config, view)
    }

    fn build(text: String, config: &SourceConfig, view: SourceView) -> ParseResult<Self> {
        let tokens = lexer::tokenize_in(&text, config, &view)?;
        Ok(Self {
            filename: config.filename.clone(),
            first_line: config.first_line,
            text,
            tokens,
            view,
        })
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Tokens in `[begin, end)`, clamped to the token list.
    pub fn slice(&self, begin: Position, end: Position) -> &[Token] {
        let end = end.index().min(self.tokens.len());
        let begin = begin.index().min(end);
        &self.tokens[begin..end]
    }

    /// Reconstruct source text for `tokens`; see [`lexer::to_text`].
    pub fn to_text(&self, tokens: &[Token], dedent: isize) -> String {
        lexer::to_text(tokens, dedent)
    }

    /// Text of the given line, without its newline.
    pub fn extract_line(&self, line: usize) -> &str {
        line.checked_sub(self.first_line)
            .and_then(|index| self.text.lines().nth(index))
            .unwrap_or("")
    }

    /// Build a syntax error pointing at `token`, or at the last token when
    /// `token` is `None` (end of input).
    pub fn syntax_error(&self, message: impl Into<String>, token: Option<&Token>) -> SyntaxError {
        let location = match token.or_else(|| self.tokens.last()) {
            Some(token) => ErrorLocation {
                line: token.line(),
                column: token.column(),
                line_text: self.extract_line(token.line()).to_string(),
                offset: token.offset,
                len: token.text.len(),
            },
            None => ErrorLocation {
                line: 1,
                column: 1,
                ..ErrorLocation::default()
            },
        };
        self.view.error(message, location)
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Source")
            .field("filename", &self.filename)
            .field("tokens", &self.tokens.len())
            .finish()
    }
}

// ============================================================================
// CURSOR
// ============================================================================

/// A read position over a [`Source`].
///
/// `next`, `peek`, `expect` and `require` skip comment tokens; the `_raw`
/// variants do not.
#[derive(Debug, Clone)]
pub struct Cursor<'src> {
    source: &'src Source,
    pos: Position,
}

impl<'src> Cursor<'src> {
    pub fn new(source: &'src Source) -> Self {
        Self {
            source,
            pos: Position::START,
        }
    }

    pub fn source(&self) -> &'src Source {
        self.source
    }

    pub fn position(&self) -> Position {
        self.pos
    }

    pub fn set_position(&mut self, pos: Position) {
        self.pos = pos;
    }

    /// Return the next non-comment token and advance past it.
    pub fn next(&mut self) -> Option<&'src Token> {
        self.advance(false)
    }

    /// Return the next token, comments included, and advance past it.
    pub fn next_raw(&mut self) -> Option<&'src Token> {
        self.advance(true)
    }

    pub fn peek(&mut self) -> Option<&'src Token> {
        let pos = self.pos;
        let token = self.next();
        self.pos = pos;
        token
    }

    pub fn peek_raw(&mut self) -> Option<&'src Token> {
        let pos = self.pos;
        let token = self.next_raw();
        self.pos = pos;
        token
    }

    /// Peek at the next token if it has the given kind.
    pub fn maybe(&mut self, kind: TokenKind) -> Option<&'src Token> {
        self.peek().filter(|token| token.kind == kind)
    }

    /// Consume the next token if it has the given kind; otherwise stay put.
    pub fn expect(&mut self, kind: TokenKind) -> Option<&'src Token> {
        let pos = self.pos;
        match self.next() {
            Some(token) if token.kind == kind => Some(token),
            _ => {
                self.pos = pos;
                None
            }
        }
    }

    /// Consume a token of the given kind or fail with a syntax error.
    pub fn require(&mut self, kind: TokenKind) -> ParseResult<&'src Token> {
        if let Some(token) = self.expect(kind) {
            return Ok(token);
        }
        let found = match self.peek() {
            Some(token) => format!("{:?}", token),
            None => "end of input".to_string(),
        };
        Err(self.syntax_error(format!("Expected {} but got {}", kind, found)))
    }

    /// True when only comments (or nothing) remain.
    pub fn eof(&mut self) -> bool {
        self.peek().is_none()
    }

    /// Syntax error pointing at the next token.
    pub fn syntax_error(&mut self, message: impl Into<String>) -> SyntaxError {
        let token = self.peek();
        self.source.syntax_error(message, token)
    }

    fn advance(&mut self, raw: bool) -> Option<&'src Token> {
        let tokens = self.source.tokens();
        while let Some(token) = tokens.get(self.pos.0) {
            self.pos = Position(self.pos.0 + 1);
            if raw || token.kind != TokenKind::Comment {
                return Some(token);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(text: &str) -> Source {
        Source::new("test.c", text).unwrap()
    }

    #[test]
    fn test_next_skips_comments() {
        let src = source("a /* c */ b");
        let mut cursor = Cursor::new(&src);
        assert_eq!(cursor.next().map(|t| t.text.as_str()), Some("a"));
        assert_eq!(cursor.peek_raw().map(|t| t.kind), Some(TokenKind::Comment));
        assert_eq!(cursor.next().map(|t| t.text.as_str()), Some("b"));
        assert_eq!(cursor.position(), Position::new(3));
        assert!(cursor.next().is_none());
        assert!(cursor.eof());
    }

    #[test]
    fn test_expect_does_not_move_on_mismatch() {
        let src = source("x ;");
        let mut cursor = Cursor::new(&src);
        assert!(cursor.expect(TokenKind::Semi).is_none());
        assert_eq!(cursor.position(), Position::START);
        assert!(cursor.expect(TokenKind::Identifier).is_some());
        assert!(cursor.maybe(TokenKind::Semi).is_some());
        assert_eq!(cursor.position(), Position::new(1));
    }

    #[test]
    fn test_require_reports_location() {
        let src = source("x\n  y");
        let mut cursor = Cursor::new(&src);
        cursor.next();
        let err = cursor.require(TokenKind::Semi).unwrap_err();
        assert_eq!(err.message, "Expected SEMI but got IDENTIFIER(\"y\", 2:3:4)");
        assert_eq!(err.line, 2);
        assert_eq!(err.column, 3);
        assert_eq!(err.line_text, "  y");
    }

    #[test]
    fn test_error_at_end_points_to_last_token() {
        let src = source("a b");
        let mut cursor = Cursor::new(&src);
        cursor.set_position(Position::new(2));
        let err = cursor.syntax_error("Expected statement");
        assert_eq!(err.column, 3);
    }

    #[test]
    fn test_slice_clamps() {
        let src = source("a b c");
        assert_eq!(src.slice(Position::new(1), Position::new(9)).len(), 2);
        assert!(src.slice(Position::new(5), Position::new(9)).is_empty());
    }

    #[test]
    fn test_extract_line_with_offset_start() {
        let config = SourceConfig {
            first_line: 10,
            ..SourceConfig::named("f.c")
        };
        let src = Source::with_config("one\ntwo", &config).unwrap();
        assert_eq!(src.extract_line(11), "two");
        assert_eq!(src.extract_line(3), "");
    }

    #[test]
    fn test_section_errors_point_into_file() {
        let file = "a;\n// BEGIN BYTECODES //\nx = @;\n// END BYTECODES //\n";
        let section = SourceConfig::named("f.c").select(file).unwrap();
        let err = Source::from_section(file, section).unwrap_err();
        assert_eq!(err.line, 3);
        assert_eq!(&file[err.span.offset()..err.span.offset() + 1], "@");

        let file = file.replace('@', "1");
        let section = SourceConfig::named("f.c").select(&file).unwrap();
        let src = Source::from_section(&file, section).unwrap();
        let mut cursor = Cursor::new(&src);
        cursor.next();
        let err = cursor.syntax_error("Expected expression");
        assert_eq!((err.line, err.column), (3, 3));
        assert_eq!(err.line_text, "x = 1;");
        assert_eq!(&file[err.span.offset()..err.span.offset() + 1], "=");
    }
}
