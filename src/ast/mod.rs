//! AST module for Rewind
//!
//! Every node type embeds a [`Provenance`] and implements [`Node`], which
//! gives it lazy access to the tokens and text it was parsed from.

// ============================================================================
// IMPORTS
// ============================================================================

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;

use crate::lexer::{Token, TokenKind};

pub mod expr;
pub mod inst;
pub mod span;
pub mod stmt;

pub use expr::{Expr, ExprKind, TypeExpr, TypeKind};
pub use inst::{Definition, Family, InstDef};
pub use span::{Provenance, Span};
pub use stmt::{Initializer, Stmt, StmtKind, VarDecl};

// ============================================================================
// NODE
// ============================================================================

/// The base shape of every parse result.
///
/// Implementors only provide access to their [`Provenance`]; span handling,
/// token slicing and text reconstruction come from the default methods.
pub trait Node<'src> {
    fn provenance(&self) -> &Provenance<'src>;

    fn provenance_mut(&mut self) -> &mut Provenance<'src>;

    fn span(&self) -> Option<Span<'src>> {
        self.provenance().get()
    }

    /// Attach `span`, replacing any previous one.
    fn set_span(&mut self, span: Span<'src>) {
        self.provenance_mut().set(span);
    }

    /// Tokens the node was parsed from; empty for synthetic nodes.
    fn tokens(&self) -> &'src [Token] {
        match self.span() {
            Some(span) => span.tokens(),
            None => &[],
        }
    }

    /// Source text the node was parsed from; empty for synthetic nodes.
    fn text(&self) -> String {
        self.to_text(0)
    }

    /// Like [`Node::text`], with `dedent` leading columns removed per line.
    fn to_text(&self, dedent: isize) -> String {
        match self.span() {
            Some(span) => span.text(dedent),
            None => String::new(),
        }
    }
}

/// Implement [`Node`] for structs with a `span: Provenance<'src>` field.
#[macro_export]
macro_rules! impl_node {
    ($($ty:ident),+ $(,)?) => {
        $(
            impl<'src> $crate::ast::Node<'src> for $ty<'src> {
                fn provenance(&self) -> &$crate::ast::Provenance<'src> {
                    &self.span
                }

                fn provenance_mut(&mut self) -> &mut $crate::ast::Provenance<'src> {
                    &mut self.span
                }
            }
        )+
    };
}

// ============================================================================
// SPANNED
// ============================================================================

/// A node made of a payload `K` plus provenance.
///
/// Equality and hashing look at `kind` only.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Spanned<'src, K> {
    pub kind: K,
    pub span: Provenance<'src>,
}

impl<'src, K> Spanned<'src, K> {
    /// A node with no span yet.
    pub fn synthetic(kind: K) -> Self {
        Self {
            kind,
            span: Provenance::none(),
        }
    }
}

impl<'src, K> From<K> for Spanned<'src, K> {
    fn from(kind: K) -> Self {
        Self::synthetic(kind)
    }
}

impl<'src, K> Node<'src> for Spanned<'src, K> {
    fn provenance(&self) -> &Provenance<'src> {
        &self.span
    }

    fn provenance_mut(&mut self) -> &mut Provenance<'src> {
        &mut self.span
    }
}

impl<K: fmt::Debug> fmt::Debug for Spanned<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)?;
        if let Some(span) = self.span.get() {
            write!(f, " @ {:?}", span)?;
        }
        Ok(())
    }
}

// ============================================================================
// TOKEN REFERENCES
// ============================================================================

/// A token held by a node. Compares by kind and text, not by position.
#[derive(Clone, Copy)]
pub struct TokenRef<'src>(&'src Token);

impl<'src> TokenRef<'src> {
    pub fn new(token: &'src Token) -> Self {
        TokenRef(token)
    }

    pub fn token(&self) -> &'src Token {
        self.0
    }

    pub fn text(&self) -> &'src str {
        &self.0.text
    }
}

impl Deref for TokenRef<'_> {
    type Target = Token;

    fn deref(&self) -> &Token {
        self.0
    }
}

impl<'src> From<&'src Token> for TokenRef<'src> {
    fn from(token: &'src Token) -> Self {
        TokenRef(token)
    }
}

impl PartialEq for TokenRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.0.kind == other.0.kind && self.0.text == other.0.text
    }
}

impl Eq for TokenRef<'_> {}

impl Hash for TokenRef<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.kind.hash(state);
        self.0.text.hash(state);
    }
}

impl PartialEq<TokenKind> for TokenRef<'_> {
    fn eq(&self, kind: &TokenKind) -> bool {
        self.0.kind == *kind
    }
}

impl fmt::Debug for TokenRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})", self.0.kind, self.0.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Source;

    #[test]
    fn test_synthetic_node_has_no_text() {
        let node: Spanned<'_, u8> = Spanned::synthetic(1);
        assert!(node.span().is_none());
        assert!(node.tokens().is_empty());
        assert_eq!(node.text(), "");
        assert_eq!(node.to_text(4), "");
    }

    #[test]
    fn test_token_ref_ignores_position() {
        let src = Source::new("t.c", "x\n  x y").unwrap();
        let tokens = src.tokens();
        assert_eq!(TokenRef::new(&tokens[0]), TokenRef::new(&tokens[1]));
        assert_ne!(TokenRef::new(&tokens[0]), TokenRef::new(&tokens[2]));
        assert_eq!(TokenRef::new(&tokens[2]), TokenKind::Identifier);
        assert_eq!(format!("{:?}", TokenRef::new(&tokens[2])), "IDENTIFIER(\"y\")");
    }
}
