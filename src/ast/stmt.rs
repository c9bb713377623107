//! Statement and declaration nodes.

use super::{Expr, Provenance, Spanned, TokenRef, TypeExpr};
use crate::impl_node;

/// A statement node.
pub type Stmt<'src> = Spanned<'src, StmtKind<'src>>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StmtKind<'src> {
    Block(Vec<Stmt<'src>>),
    For {
        init: Option<Box<Stmt<'src>>>,
        cond: Option<Expr<'src>>,
        next: Option<Expr<'src>>,
        body: Box<Stmt<'src>>,
    },
    If {
        cond: Expr<'src>,
        body: Box<Stmt<'src>>,
        orelse: Option<Box<Stmt<'src>>>,
    },
    While {
        cond: Expr<'src>,
        body: Box<Stmt<'src>>,
    },
    Switch {
        expr: Expr<'src>,
        block: Box<Stmt<'src>>,
    },
    /// `case expr: stmt`, or `default: stmt` when `expr` is `None`.
    Case {
        expr: Option<Expr<'src>>,
        block: Box<Stmt<'src>>,
    },
    Break,
    Continue,
    Return(Option<Expr<'src>>),
    Goto(TokenRef<'src>),
    /// A lone `;`.
    Null,
    Decl(Vec<VarDecl<'src>>),
    /// An expression followed by `;`.
    Expr(Expr<'src>),
}

/// One declarator of a declaration statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VarDecl<'src> {
    pub ty: TypeExpr<'src>,
    pub name: TokenRef<'src>,
    pub init: Option<Initializer<'src>>,
    pub span: Provenance<'src>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Initializer<'src> {
    Expr(Expr<'src>),
    /// `{a, b, c}`
    List(Vec<Expr<'src>>),
}

impl_node!(VarDecl);

impl<'src> VarDecl<'src> {
    pub fn new(ty: TypeExpr<'src>, name: TokenRef<'src>, init: Option<Initializer<'src>>) -> Self {
        Self {
            ty,
            name,
            init,
            span: Provenance::none(),
        }
    }
}
