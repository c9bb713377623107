//! Backtracking rule wrapper.
//!
//! A grammar rule is any function `FnOnce(&mut P) -> ParseResult<Option<N>>`
//! where `P` is something with a movable [`Position`]. `Ok(Some(node))` is a
//! match, `Ok(None)` is "this alternative does not apply here" and `Err` is
//! a committed syntax error.
//!
//! Running a rule through [`Backtrack::contextual`] makes it transactional:
//! on a match the node gets a [`Span`] covering exactly the tokens the rule
//! consumed; on `Ok(None)` or `Err` the position is put back where the rule
//! started, however far the rule and its nested rules had moved it.

use log::trace;

use crate::ast::{Node, Span};
use crate::errors::ParseResult;
use crate::source::{Cursor, Position, Source};

/// A parser state with a movable position over a [`Source`].
pub trait Backtrack<'src> {
    fn position(&self) -> Position;

    fn set_position(&mut self, pos: Position);

    /// The source spans produced by this parser point into.
    fn source(&self) -> &'src Source;

    /// Run `rule`, attaching a span on a match and rewinding otherwise.
    fn contextual<N, F>(&mut self, rule: F) -> ParseResult<Option<N>>
    where
        Self: Sized,
        N: Node<'src>,
        F: FnOnce(&mut Self) -> ParseResult<Option<N>>,
    {
        let begin = self.position();
        match rule(self) {
            Ok(Some(mut node)) => {
                let end = self.position();
                node.set_span(Span::new(begin, end, self.source()));
                Ok(Some(node))
            }
            Ok(None) => {
                self.rewind(begin);
                Ok(None)
            }
            Err(err) => {
                self.rewind(begin);
                Err(err)
            }
        }
    }

    /// Run `rule` and rewind unless it matched. For helper rules whose
    /// results are plain values rather than nodes.
    fn attempt<T, F>(&mut self, rule: F) -> ParseResult<Option<T>>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> ParseResult<Option<T>>,
    {
        let begin = self.position();
        let result = rule(self);
        if !matches!(result, Ok(Some(_))) {
            self.rewind(begin);
        }
        result
    }

    fn rewind(&mut self, to: Position) {
        let from = self.position();
        if from != to {
            trace!("{}: rewind {} -> {}", self.source().filename(), from, to);
        }
        self.set_position(to);
    }
}

impl<'src> Backtrack<'src> for Cursor<'src> {
    fn position(&self) -> Position {
        Cursor::position(self)
    }

    fn set_position(&mut self, pos: Position) {
        Cursor::set_position(self, pos)
    }

    fn source(&self) -> &'src Source {
        Cursor::source(self)
    }
}

// ============================================================================
// WRAPPED RULES
// ============================================================================

/// A rule function with [`Backtrack::contextual`] applied on every call.
#[derive(Debug, Clone, Copy)]
pub struct Contextual<F>(F);

/// Wrap `rule` so every call records its span and rewinds on failure.
pub fn contextual<F>(rule: F) -> Contextual<F> {
    Contextual(rule)
}

impl<F> Contextual<F> {
    pub fn call<'src, P, N>(&self, parser: &mut P) -> ParseResult<Option<N>>
    where
        P: Backtrack<'src>,
        N: Node<'src>,
        F: Fn(&mut P) -> ParseResult<Option<N>>,
    {
        parser.contextual(|p| (self.0)(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Spanned;
    use crate::lexer::TokenKind;

    type Unit<'src> = Spanned<'src, ()>;

    fn consume<'src>(cursor: &mut Cursor<'src>, count: usize) -> ParseResult<Option<Unit<'src>>> {
        for _ in 0..count {
            if cursor.next().is_none() {
                return Ok(None);
            }
        }
        Ok(Some(Unit::synthetic(())))
    }

    #[test]
    fn test_match_attaches_span() {
        let src = Source::new("t.c", "a b c").unwrap();
        let mut cursor = Cursor::new(&src);
        cursor.next();
        let node = cursor.contextual(|c| consume(c, 2)).unwrap().unwrap();
        let span = node.span().unwrap();
        assert_eq!((span.begin(), span.end()), (Position::new(1), Position::new(3)));
        // Text keeps the leading column of the first token.
        assert_eq!(node.text(), "  b c");
        assert_eq!(cursor.position(), Position::new(3));
    }

    #[test]
    fn test_no_match_rewinds() {
        let src = Source::new("t.c", "a b").unwrap();
        let mut cursor = Cursor::new(&src);
        let result = cursor.contextual(|c| consume(c, 3)).unwrap();
        assert!(result.is_none());
        assert_eq!(cursor.position(), Position::START);
    }

    #[test]
    fn test_error_rewinds() {
        let src = Source::new("t.c", "a b").unwrap();
        let mut cursor = Cursor::new(&src);
        let result: ParseResult<Option<Unit>> = cursor.contextual(|c| {
            c.next();
            c.require(TokenKind::Semi)?;
            Ok(Some(Unit::synthetic(())))
        });
        assert!(result.is_err());
        assert_eq!(cursor.position(), Position::START);
    }

    #[test]
    fn test_attempt_rewinds_plain_values() {
        let src = Source::new("t.c", "a b").unwrap();
        let mut cursor = Cursor::new(&src);
        let none: Option<usize> = cursor
            .attempt(|c| {
                c.next();
                Ok(None)
            })
            .unwrap();
        assert!(none.is_none());
        assert_eq!(cursor.position(), Position::START);
        let some = cursor.attempt(|c| Ok(c.next().map(|t| t.text.len()))).unwrap();
        assert_eq!(some, Some(1));
        assert_eq!(cursor.position(), Position::new(1));
    }

    fn two<'src>(cursor: &mut Cursor<'src>) -> ParseResult<Option<Unit<'src>>> {
        consume(cursor, 2)
    }

    #[test]
    fn test_wrapped_rule() {
        let src = Source::new("t.c", "a b").unwrap();
        let mut cursor = Cursor::new(&src);
        let pair = contextual(two);
        let node = pair.call(&mut cursor).unwrap().unwrap();
        assert_eq!(node.text(), "a b");
        assert!(pair.call(&mut cursor).unwrap().is_none());
        assert_eq!(cursor.position(), Position::new(2));
    }

    #[test]
    fn test_match_behind_entry_gets_empty_span() {
        let src = Source::new("t.c", "a b c").unwrap();
        let mut cursor = Cursor::new(&src);
        cursor.set_position(Position::new(2));
        let node = cursor
            .contextual(|c| {
                c.set_position(Position::START);
                Ok(Some(Unit::synthetic(())))
            })
            .unwrap()
            .unwrap();
        let span = node.span().unwrap();
        assert_eq!((span.begin(), span.end()), (Position::new(2), Position::new(2)));
        assert_eq!(span.len(), 0);
        assert_eq!(node.text(), "");
    }
}
