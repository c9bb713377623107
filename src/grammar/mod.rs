//! Recursive-descent grammars built on [`Backtrack`].
//!
//! [`Parser`] owns a [`Cursor`]; each rule set lives in its own module as an
//! `impl Parser` block:
//!
//! - [`expr`]: C expressions and types
//! - [`stmt`]: C statements and declarations
//! - [`inst`]: instruction and family definitions
//!
//! Public rules return `ParseResult<Option<Node>>` and go through
//! [`Backtrack::contextual`], so each one either matches and carries a span,
//! or leaves the cursor where it found it.

pub mod expr;
pub mod inst;
pub mod stmt;

use crate::backtrack::Backtrack;
use crate::source::{Cursor, Position, Source};

/// Parser over one [`Source`].
#[derive(Debug, Clone)]
pub struct Parser<'src> {
    cursor: Cursor<'src>,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src Source) -> Self {
        Self {
            cursor: Cursor::new(source),
        }
    }

    pub fn cursor(&self) -> &Cursor<'src> {
        &self.cursor
    }

    pub fn cursor_mut(&mut self) -> &mut Cursor<'src> {
        &mut self.cursor
    }

    /// True when only comments (or nothing) remain.
    pub fn eof(&mut self) -> bool {
        self.cursor.eof()
    }
}

impl<'src> Backtrack<'src> for Parser<'src> {
    fn position(&self) -> Position {
        self.cursor.position()
    }

    fn set_position(&mut self, pos: Position) {
        self.cursor.set_position(pos);
    }

    fn source(&self) -> &'src Source {
        self.cursor.source()
    }
}
