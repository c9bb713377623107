//! Rewind Error Handling
//!
//! A committed parse failure is a [`SyntaxError`]. Ordinary "this alternative
//! does not apply here" results are not errors at all: rules return
//! `Ok(None)` and the caller tries the next alternative.

use std::path::PathBuf;
use std::sync::Arc;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Result of a grammar rule or lexer operation.
pub type ParseResult<T> = Result<T, SyntaxError>;

// ============================================================================
// SYNTAX ERRORS
// ============================================================================

/// A syntax error with enough location data to render a diagnostic.
#[derive(Debug, Clone, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(rewind::syntax))]
pub struct SyntaxError {
    pub message: String,
    pub filename: String,
    /// 1-based line of the offending token.
    pub line: usize,
    /// 1-based column of the offending token.
    pub column: usize,
    /// The full text of the offending line, without its newline.
    pub line_text: String,
    #[source_code]
    pub source_code: Arc<NamedSource<String>>,
    #[label("here")]
    pub span: SourceSpan,
}

impl SyntaxError {
    /// Create an error pointing at `len` bytes starting at byte `offset` of `source_code`.
    pub fn new(
        message: impl Into<String>,
        source_code: Arc<NamedSource<String>>,
        location: ErrorLocation,
    ) -> Self {
        Self {
            message: message.into(),
            filename: source_code.name().to_string(),
            line: location.line,
            column: location.column,
            line_text: location.line_text,
            source_code,
            span: SourceSpan::new(location.offset.into(), location.len),
        }
    }

    /// `filename:line:column` prefix used in plain-text reports.
    pub fn location(&self) -> String {
        format!("{}:{}:{}", self.filename, self.line, self.column)
    }
}

/// Where a [`SyntaxError`] points.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorLocation {
    pub line: usize,
    pub column: usize,
    pub line_text: String,
    pub offset: usize,
    pub len: usize,
}

/// The text a rendered [`SyntaxError`] quotes, plus the byte shift from
/// lexed text to that text.
///
/// Lexed text may be a section of a larger file or may start at a line
/// other than 1. Diagnostics quote the whole file when it is known and pad
/// with blank lines otherwise, so rendered line numbers match
/// [`SyntaxError::line`].
#[derive(Debug, Clone)]
pub struct SourceView {
    named: Arc<NamedSource<String>>,
    shift: usize,
}

impl SourceView {
    /// View of `text` whose first line is numbered `first_line`.
    pub fn new(filename: &str, text: &str, first_line: usize) -> Self {
        Self::within(filename, text, 0, first_line)
    }

    /// View of the text starting at byte `offset` of `file`, where the line
    /// holding `offset` is numbered `first_line`.
    pub fn within(filename: &str, file: &str, offset: usize, first_line: usize) -> Self {
        let preceding = file.get(..offset).map_or(0, |before| before.matches('\n').count());
        let padding = first_line.saturating_sub(1 + preceding);
        let mut text = "\n".repeat(padding);
        text.push_str(file);
        Self {
            named: Arc::new(NamedSource::new(filename, text)),
            shift: padding + offset,
        }
    }

    /// Error at `location`, whose offset is relative to the lexed text.
    pub fn error(&self, message: impl Into<String>, mut location: ErrorLocation) -> SyntaxError {
        location.offset += self.shift;
        SyntaxError::new(message, self.named.clone(), location)
    }
}

// ============================================================================
// CONFIGURATION ERRORS
// ============================================================================

/// Failure to load a [`crate::config::SourceConfig`].
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config file {}", path.display())]
    #[diagnostic(code(rewind::config::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {}", path.display())]
    #[diagnostic(code(rewind::config::format))]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("section marker {marker:?} not found")]
    #[diagnostic(
        code(rewind::config::section),
        help("check the `section` markers in the config")
    )]
    MissingMarker { marker: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_prefix() {
        let source = Arc::new(NamedSource::new("demo.c", "x = ;".to_string()));
        let err = SyntaxError::new(
            "Expected expression",
            source,
            ErrorLocation {
                line: 1,
                column: 5,
                line_text: "x = ;".into(),
                offset: 4,
                len: 1,
            },
        );
        assert_eq!(err.location(), "demo.c:1:5");
        assert_eq!(err.to_string(), "Expected expression");
        assert_eq!(err.span.offset(), 4);
        assert_eq!(err.span.len(), 1);
    }

    #[test]
    fn test_view_pads_to_first_line() {
        use miette::{SourceCode, SpanContents};

        let view = SourceView::new("named.c", "x = ;", 7);
        let err = view.error(
            "Expected expression",
            ErrorLocation {
                line: 7,
                column: 5,
                line_text: "x = ;".into(),
                offset: 4,
                len: 1,
            },
        );
        assert_eq!(err.span.offset(), 10);
        let contents = err.source_code.read_span(&err.span, 0, 0).unwrap();
        assert_eq!(contents.line() + 1, 7);
        assert_eq!(contents.column() + 1, 5);
    }

    #[test]
    fn test_view_within_file() {
        use miette::{SourceCode, SpanContents};

        let file = "a;\nb;\n// mark\nx = ;\n";
        let view = SourceView::within("f.c", file, 14, 4);
        let err = view.error(
            "Expected expression",
            ErrorLocation {
                line: 4,
                column: 5,
                line_text: "x = ;".into(),
                offset: 4,
                len: 1,
            },
        );
        assert_eq!(&file[err.span.offset()..err.span.offset() + 1], ";");
        let contents = err.source_code.read_span(&err.span, 0, 0).unwrap();
        assert_eq!(contents.line() + 1, 4);
    }
}
