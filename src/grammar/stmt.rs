//! C statement grammar.

use super::Parser;
use crate::ast::{Expr, Initializer, Stmt, StmtKind, TokenRef, TypeExpr, TypeKind, VarDecl};
use crate::backtrack::Backtrack;
use crate::errors::ParseResult;
use crate::lexer::TokenKind;

impl<'src> Parser<'src> {
    /// Any statement. `None` at end of input or before a closing brace.
    pub fn stmt(&mut self) -> ParseResult<Option<Stmt<'src>>> {
        self.contextual(|p| p.stmt_inner())
    }

    fn stmt_inner(&mut self) -> ParseResult<Option<Stmt<'src>>> {
        let Some(token) = self.cursor.peek() else {
            return Ok(None);
        };
        match token.kind {
            TokenKind::LBrace => self.block(),
            TokenKind::For => self.for_stmt(),
            TokenKind::If => self.if_stmt(),
            TokenKind::While => self.while_stmt(),
            TokenKind::Switch => self.switch_stmt(),
            TokenKind::Case => self.case_stmt(),
            TokenKind::Default => self.default_stmt(),
            TokenKind::Break | TokenKind::Continue => {
                self.cursor.next();
                self.cursor.require(TokenKind::Semi)?;
                let kind = if token.kind == TokenKind::Break {
                    StmtKind::Break
                } else {
                    StmtKind::Continue
                };
                Ok(Some(Stmt::synthetic(kind)))
            }
            TokenKind::Return => {
                self.cursor.next();
                let expr = self.expr()?;
                self.cursor.require(TokenKind::Semi)?;
                Ok(Some(Stmt::synthetic(StmtKind::Return(expr))))
            }
            TokenKind::Goto => {
                self.cursor.next();
                let label = self.cursor.require(TokenKind::Identifier)?;
                self.cursor.require(TokenKind::Semi)?;
                Ok(Some(Stmt::synthetic(StmtKind::Goto(TokenRef::new(label)))))
            }
            TokenKind::Semi => self.null_stmt(),
            _ => match self.decl_stmt()? {
                Some(decl) => Ok(Some(decl)),
                None => self.expr_stmt(),
            },
        }
    }

    /// `{ stmt* }`
    pub fn block(&mut self) -> ParseResult<Option<Stmt<'src>>> {
        self.contextual(|p| {
            if p.cursor.expect(TokenKind::LBrace).is_none() {
                return Ok(None);
            }
            let mut stmts = Vec::new();
            while let Some(stmt) = p.stmt()? {
                stmts.push(stmt);
            }
            if p.cursor.expect(TokenKind::RBrace).is_none() {
                return Err(p.cursor.syntax_error("Expected '}'"));
            }
            Ok(Some(Stmt::synthetic(StmtKind::Block(stmts))))
        })
    }

    /// `for (init; cond; next) body`; every clause may be empty.
    pub fn for_stmt(&mut self) -> ParseResult<Option<Stmt<'src>>> {
        self.contextual(|p| {
            if p.cursor.expect(TokenKind::For).is_none() {
                return Ok(None);
            }
            p.cursor.require(TokenKind::LParen)?;
            let init = match p.decl_stmt()? {
                Some(decl) => Some(decl),
                None => match p.expr_stmt()? {
                    Some(stmt) => Some(stmt),
                    None => p.null_stmt()?,
                },
            };
            let cond = p.expr()?;
            p.cursor.require(TokenKind::Semi)?;
            let next = p.expr()?;
            p.cursor.require(TokenKind::RParen)?;
            let body = p.required_stmt()?;
            Ok(Some(Stmt::synthetic(StmtKind::For {
                init: init.map(Box::new),
                cond,
                next,
                body: Box::new(body),
            })))
        })
    }

    /// `if (cond) body [else orelse]`
    pub fn if_stmt(&mut self) -> ParseResult<Option<Stmt<'src>>> {
        self.contextual(|p| {
            if p.cursor.expect(TokenKind::If).is_none() {
                return Ok(None);
            }
            let cond = p.paren_cond()?;
            let body = p.required_stmt()?;
            let orelse = if p.cursor.expect(TokenKind::Else).is_some() {
                Some(Box::new(p.required_stmt()?))
            } else {
                None
            };
            Ok(Some(Stmt::synthetic(StmtKind::If {
                cond,
                body: Box::new(body),
                orelse,
            })))
        })
    }

    /// `while (cond) body`
    pub fn while_stmt(&mut self) -> ParseResult<Option<Stmt<'src>>> {
        self.contextual(|p| {
            if p.cursor.expect(TokenKind::While).is_none() {
                return Ok(None);
            }
            let cond = p.paren_cond()?;
            let body = p.required_stmt()?;
            Ok(Some(Stmt::synthetic(StmtKind::While {
                cond,
                body: Box::new(body),
            })))
        })
    }

    /// `switch (expr) { ... }`
    pub fn switch_stmt(&mut self) -> ParseResult<Option<Stmt<'src>>> {
        self.contextual(|p| {
            if p.cursor.expect(TokenKind::Switch).is_none() {
                return Ok(None);
            }
            let expr = p.paren_cond()?;
            let Some(block) = p.block()? else {
                return Err(p.cursor.syntax_error("Expected block"));
            };
            Ok(Some(Stmt::synthetic(StmtKind::Switch {
                expr,
                block: Box::new(block),
            })))
        })
    }

    /// `case expr: stmt`
    pub fn case_stmt(&mut self) -> ParseResult<Option<Stmt<'src>>> {
        self.contextual(|p| {
            if p.cursor.expect(TokenKind::Case).is_none() {
                return Ok(None);
            }
            let Some(expr) = p.expr()? else {
                return Err(p.cursor.syntax_error("Expected expression"));
            };
            p.cursor.require(TokenKind::Colon)?;
            let block = p.required_stmt()?;
            Ok(Some(Stmt::synthetic(StmtKind::Case {
                expr: Some(expr),
                block: Box::new(block),
            })))
        })
    }

    /// `default: stmt`
    pub fn default_stmt(&mut self) -> ParseResult<Option<Stmt<'src>>> {
        self.contextual(|p| {
            if p.cursor.expect(TokenKind::Default).is_none() {
                return Ok(None);
            }
            p.cursor.require(TokenKind::Colon)?;
            let block = p.required_stmt()?;
            Ok(Some(Stmt::synthetic(StmtKind::Case {
                expr: None,
                block: Box::new(block),
            })))
        })
    }

    /// A lone `;`.
    pub fn null_stmt(&mut self) -> ParseResult<Option<Stmt<'src>>> {
        self.contextual(|p| {
            Ok(p.cursor
                .expect(TokenKind::Semi)
                .map(|_| Stmt::synthetic(StmtKind::Null)))
        })
    }

    /// `expr;`
    pub fn expr_stmt(&mut self) -> ParseResult<Option<Stmt<'src>>> {
        self.contextual(|p| {
            let Some(expr) = p.expr()? else {
                return Ok(None);
            };
            p.cursor.require(TokenKind::Semi)?;
            Ok(Some(Stmt::synthetic(StmtKind::Expr(expr))))
        })
    }

    /// `type decl, decl, ...;`
    pub fn decl_stmt(&mut self) -> ParseResult<Option<Stmt<'src>>> {
        self.contextual(|p| {
            let Some(ty) = p.type_name()? else {
                return Ok(None);
            };
            let Some(first) = p.decl(&ty)? else {
                return Ok(None);
            };
            let mut decls = vec![first];
            while p.cursor.expect(TokenKind::Comma).is_some() {
                let Some(decl) = p.decl(&ty)? else {
                    return Err(p.cursor.syntax_error("Expected declaration"));
                };
                decls.push(decl);
            }
            p.cursor.require(TokenKind::Semi)?;
            Ok(Some(Stmt::synthetic(StmtKind::Decl(decls))))
        })
    }

    /// One declarator following the base type `ty`:
    ///
    /// ```text
    /// **name[N][M] = init
    /// *(*name)(type, type)
    /// ```
    pub fn decl(&mut self, ty: &TypeExpr<'src>) -> ParseResult<Option<VarDecl<'src>>> {
        self.contextual(|p| p.decl_inner(ty.clone()))
    }

    fn decl_inner(&mut self, mut ty: TypeExpr<'src>) -> ParseResult<Option<VarDecl<'src>>> {
        let mut stars = 0;
        while self.cursor.expect(TokenKind::Times).is_some() {
            stars += 1;
        }

        if let Some(name) = self.cursor.expect(TokenKind::Identifier) {
            while self.cursor.expect(TokenKind::LBracket).is_some() {
                let Some(size) = self.expr()? else {
                    return Err(self.cursor.syntax_error("Expected dimension expression"));
                };
                self.cursor.require(TokenKind::RBracket)?;
                ty = TypeExpr::synthetic(TypeKind::Array {
                    ty: Box::new(ty),
                    size: Some(Box::new(size)),
                });
            }
            ty = wrap_pointers(ty, stars);
            let init = if self.cursor.expect(TokenKind::Equals).is_some() {
                Some(self.initializer()?)
            } else {
                None
            };
            return Ok(Some(VarDecl::new(ty, TokenRef::new(name), init)));
        }

        // Function pointer: (*name)(args)
        if self.cursor.expect(TokenKind::LParen).is_some()
            && self.cursor.expect(TokenKind::Times).is_some()
        {
            if let Some(name) = self.cursor.expect(TokenKind::Identifier) {
                if self.cursor.expect(TokenKind::RParen).is_some()
                    && self.cursor.expect(TokenKind::LParen).is_some()
                {
                    let mut args = Vec::new();
                    while let Some(arg) = self.type_expr()? {
                        args.push(arg);
                        if self.cursor.expect(TokenKind::Comma).is_none() {
                            break;
                        }
                    }
                    if self.cursor.expect(TokenKind::RParen).is_some() {
                        let ty = TypeExpr::synthetic(TypeKind::Function {
                            ty: Box::new(wrap_pointers(ty, stars)),
                            args,
                        });
                        return Ok(Some(VarDecl::new(ty, TokenRef::new(name), None)));
                    }
                }
            }
        }
        Ok(None)
    }

    /// The part after `=` in a declarator.
    fn initializer(&mut self) -> ParseResult<Initializer<'src>> {
        if self.cursor.expect(TokenKind::LBrace).is_some() {
            let mut exprs = Vec::new();
            while let Some(expr) = self.expr1()? {
                exprs.push(expr);
                if self.cursor.expect(TokenKind::Comma).is_none() {
                    break;
                }
            }
            self.cursor.require(TokenKind::RBrace)?;
            return Ok(Initializer::List(exprs));
        }
        match self.expr1()? {
            Some(expr) => Ok(Initializer::Expr(expr)),
            None => Err(self.cursor.syntax_error("Expected initialization expression")),
        }
    }

    fn paren_cond(&mut self) -> ParseResult<Expr<'src>> {
        self.cursor.require(TokenKind::LParen)?;
        let Some(cond) = self.expr()? else {
            return Err(self.cursor.syntax_error("Expected expression"));
        };
        self.cursor.require(TokenKind::RParen)?;
        Ok(cond)
    }

    fn required_stmt(&mut self) -> ParseResult<Stmt<'src>> {
        match self.stmt()? {
            Some(stmt) => Ok(stmt),
            None => Err(self.cursor.syntax_error("Expected statement")),
        }
    }
}

fn wrap_pointers<'src>(mut ty: TypeExpr<'src>, stars: usize) -> TypeExpr<'src> {
    for _ in 0..stars {
        ty = TypeExpr::synthetic(TypeKind::Pointer(Box::new(ty)));
    }
    ty
}
