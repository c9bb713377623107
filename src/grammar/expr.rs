//! C expression grammar.
//!
//! Binary operators are parsed with an operator-precedence stack: terms and
//! the operators preceding them are pushed left to right, and the top of the
//! stack is reduced whenever the incoming operator binds less tightly.

use super::Parser;
use crate::ast::{Expr, ExprKind, TokenRef, TypeExpr, TypeKind};
use crate::backtrack::Backtrack;
use crate::errors::ParseResult;
use crate::lexer::{Token, TokenKind};

const NUMERIC_TYPES: &[TokenKind] = &[
    TokenKind::Void,
    TokenKind::Unsigned,
    TokenKind::Signed,
    TokenKind::Char,
    TokenKind::Short,
    TokenKind::Int,
    TokenKind::Long,
    TokenKind::Float,
    TokenKind::Double,
];

const PREFIX_OPS: &[TokenKind] = &[
    TokenKind::PlusPlus,
    TokenKind::MinusMinus,
    TokenKind::And,
    TokenKind::Times,
    TokenKind::Plus,
    TokenKind::Minus,
    TokenKind::Not,
    TokenKind::LNot,
];

const CONDITIONAL: u8 = 2;

/// Binding strength of an infix operator, 12 (multiplicative) down to 0 (comma).
pub fn infix_precedence(kind: TokenKind) -> Option<u8> {
    use TokenKind::*;
    let prec = match kind {
        Times | Divide | Mod => 12,
        Plus | Minus => 11,
        LShift | RShift => 10,
        Lt | Le | Gt | Ge => 9,
        Ne | Eq => 8,
        And => 7,
        Xor => 6,
        Or => 5,
        LAnd => 4,
        LOr => 3,
        CondOp => CONDITIONAL,
        Equals | TimesEqual | DivEqual | ModEqual | PlusEqual | MinusEqual | LShiftEqual
        | RShiftEqual | AndEqual | XorEqual | OrEqual => 1,
        Comma => 0,
        _ => return None,
    };
    Some(prec)
}

/// An operator waiting on the precedence stack.
struct Operator<'src> {
    prec: u8,
    kind: OperatorKind<'src>,
}

enum OperatorKind<'src> {
    Binary(&'src Token),
    /// `? middle :` behaves like a single infix operator.
    Conditional(Expr<'src>),
}

impl<'src> Operator<'src> {
    fn binary(token: &'src Token, prec: u8) -> Self {
        Self {
            prec,
            kind: OperatorKind::Binary(token),
        }
    }

    fn conditional(middle: Expr<'src>) -> Self {
        Self {
            prec: CONDITIONAL,
            kind: OperatorKind::Conditional(middle),
        }
    }

    /// Whether `self`, already on the stack, must be reduced before `next`
    /// is pushed. Conditional and assignment operators are right-associative.
    fn must_reduce(&self, next: &Operator<'src>) -> bool {
        self.prec > next.prec || (self.prec == next.prec && self.prec > CONDITIONAL)
    }

    fn apply(self, left: Expr<'src>, right: Expr<'src>) -> Expr<'src> {
        let kind = match self.kind {
            OperatorKind::Binary(token) => ExprKind::Infix {
                left: Box::new(left),
                op: TokenRef::new(token),
                right: Box::new(right),
            },
            OperatorKind::Conditional(middle) => ExprKind::Conditional {
                cond: Box::new(left),
                then: Box::new(middle),
                orelse: Box::new(right),
            },
        };
        Expr::synthetic(kind)
    }
}

type Stack<'src> = Vec<(Option<Operator<'src>>, Expr<'src>)>;

fn reduce_top(stack: &mut Stack<'_>) {
    if stack.len() < 2 {
        return;
    }
    if let (Some((Some(op), right)), Some((prev_op, left))) = (stack.pop(), stack.pop()) {
        stack.push((prev_op, op.apply(left, right)));
    }
}

fn top_must_reduce(stack: &Stack<'_>, next: &Operator<'_>) -> bool {
    match stack.last() {
        Some((Some(top), _)) => top.must_reduce(next),
        _ => false,
    }
}

impl<'src> Parser<'src> {
    /// A full expression, comma operator included.
    pub fn expr(&mut self) -> ParseResult<Option<Expr<'src>>> {
        self.contextual(|p| p.binary_expr(true))
    }

    /// An expression without a top-level comma, as in call arguments.
    pub fn expr1(&mut self) -> ParseResult<Option<Expr<'src>>> {
        self.contextual(|p| p.binary_expr(false))
    }

    fn binary_expr(&mut self, allow_comma: bool) -> ParseResult<Option<Expr<'src>>> {
        let Some(term) = self.full_term()? else {
            return Ok(None);
        };
        let mut stack: Stack<'src> = vec![(None, term)];

        while let Some(token) = self.infix_op(allow_comma) {
            let op = match infix_precedence(token.kind) {
                Some(CONDITIONAL) => {
                    let Some(middle) = self.full_term()? else {
                        return Err(self.cursor.syntax_error("Expected expression"));
                    };
                    self.cursor.require(TokenKind::Colon)?;
                    Operator::conditional(middle)
                }
                prec => Operator::binary(token, prec.unwrap_or_default()),
            };
            while top_must_reduce(&stack, &op) {
                reduce_top(&mut stack);
            }
            let Some(term) = self.full_term()? else {
                return Err(self
                    .cursor
                    .syntax_error(format!("Expected term following '{}'", token.text)));
            };
            stack.push((Some(op), term));
        }

        while stack.len() >= 2 {
            reduce_top(&mut stack);
        }
        Ok(stack.pop().map(|(_, expr)| expr))
    }

    /// A term with its prefix and postfix operators, or a cast.
    pub fn full_term(&mut self) -> ParseResult<Option<Expr<'src>>> {
        self.contextual(|p| p.full_term_inner())
    }

    fn full_term_inner(&mut self) -> ParseResult<Option<Expr<'src>>> {
        if let Some(token) = self.cursor.peek().filter(|t| PREFIX_OPS.contains(&t.kind)) {
            self.cursor.next();
            let Some(term) = self.full_term()? else {
                return Err(self
                    .cursor
                    .syntax_error(format!("Expected term following '{}'", token.text)));
            };
            return Ok(Some(Expr::synthetic(ExprKind::Prefix {
                op: TokenRef::new(token),
                expr: Box::new(term),
            })));
        }
        // TODO: sizeof, which takes either "(type)" or a term.
        if let Some(cast) = self.cast()? {
            return Ok(Some(cast));
        }
        let Some(mut term) = self.term()? else {
            return Ok(None);
        };

        loop {
            let kind = if self.cursor.expect(TokenKind::LParen).is_some() {
                let mut args = Vec::new();
                while let Some(arg) = self.expr1()? {
                    args.push(arg);
                    if self.cursor.expect(TokenKind::Comma).is_none() {
                        break;
                    }
                }
                self.cursor.require(TokenKind::RParen)?;
                ExprKind::Call {
                    term: Box::new(term),
                    args,
                }
            } else if self.cursor.expect(TokenKind::LBracket).is_some() {
                let Some(index) = self.expr()? else {
                    return Err(self.cursor.syntax_error("Expected index expression"));
                };
                self.cursor.require(TokenKind::RBracket)?;
                ExprKind::Index {
                    term: Box::new(term),
                    index: Box::new(index),
                }
            } else if self.cursor.expect(TokenKind::Period).is_some() {
                let name = self.cursor.require(TokenKind::Identifier)?;
                ExprKind::Member {
                    term: Box::new(term),
                    name: TokenRef::new(name),
                }
            } else if self.cursor.expect(TokenKind::Arrow).is_some() {
                let name = self.cursor.require(TokenKind::Identifier)?;
                ExprKind::Arrow {
                    term: Box::new(term),
                    name: TokenRef::new(name),
                }
            } else if let Some(op) = self
                .cursor
                .expect(TokenKind::PlusPlus)
                .or_else(|| self.cursor.expect(TokenKind::MinusMinus))
            {
                ExprKind::Postfix {
                    expr: Box::new(term),
                    op: TokenRef::new(op),
                }
            } else {
                break;
            };
            term = Expr::synthetic(kind);
        }

        Ok(Some(term))
    }

    /// `(type) term`
    pub fn cast(&mut self) -> ParseResult<Option<Expr<'src>>> {
        self.contextual(|p| {
            if p.cursor.expect(TokenKind::LParen).is_some() {
                if let Some(ty) = p.type_expr()? {
                    if p.cursor.expect(TokenKind::RParen).is_some() {
                        if let Some(term) = p.full_term()? {
                            return Ok(Some(Expr::synthetic(ExprKind::Cast {
                                ty: Box::new(ty),
                                expr: Box::new(term),
                            })));
                        }
                    }
                }
            }
            Ok(None)
        })
    }

    /// A type name followed by pointer and function-type suffixes.
    pub fn type_expr(&mut self) -> ParseResult<Option<TypeExpr<'src>>> {
        self.contextual(|p| {
            let Some(mut ty) = p.type_name()? else {
                return Ok(None);
            };
            while p.cursor.expect(TokenKind::Times).is_some() {
                ty = TypeExpr::synthetic(TypeKind::Pointer(Box::new(ty)));
            }
            // TODO: array suffixes, e.g. "int[4]".
            while p.cursor.expect(TokenKind::LParen).is_some() {
                if p.cursor.expect(TokenKind::Times).is_some() {
                    p.cursor.require(TokenKind::RParen)?;
                    ty = TypeExpr::synthetic(TypeKind::Pointer(Box::new(ty)));
                    continue;
                }
                let mut args = Vec::new();
                while let Some(arg) = p.type_expr()? {
                    args.push(arg);
                    if p.cursor.expect(TokenKind::Comma).is_none() {
                        break;
                    }
                }
                p.cursor.require(TokenKind::RParen)?;
                ty = TypeExpr::synthetic(TypeKind::Function {
                    ty: Box::new(ty),
                    args,
                });
            }
            Ok(Some(ty))
        })
    }

    /// A run of numeric type keywords, or a single identifier.
    pub fn type_name(&mut self) -> ParseResult<Option<TypeExpr<'src>>> {
        self.contextual(|p| {
            let mut keywords = Vec::new();
            while let Some(token) = p.cursor.peek().filter(|t| NUMERIC_TYPES.contains(&t.kind)) {
                p.cursor.next();
                keywords.push(TokenRef::new(token));
            }
            if !keywords.is_empty() {
                return Ok(Some(TypeExpr::synthetic(TypeKind::Numeric(keywords))));
            }
            Ok(p
                .cursor
                .expect(TokenKind::Identifier)
                .map(|name| TypeExpr::synthetic(TypeKind::Named(TokenRef::new(name)))))
        })
    }

    /// A literal, a name, or a parenthesized expression.
    pub fn term(&mut self) -> ParseResult<Option<Expr<'src>>> {
        self.contextual(|p| {
            let Some(token) = p.cursor.next() else {
                return Ok(None);
            };
            let kind = match token.kind {
                TokenKind::Number | TokenKind::Character => ExprKind::Number(TokenRef::new(token)),
                TokenKind::String => {
                    let mut strings = vec![TokenRef::new(token)];
                    while let Some(next) = p.cursor.expect(TokenKind::String) {
                        strings.push(TokenRef::new(next));
                    }
                    ExprKind::String(strings)
                }
                TokenKind::Identifier => ExprKind::Name(TokenRef::new(token)),
                TokenKind::LParen => {
                    // The inner node is returned as is; its span widens to the parentheses.
                    let expr = p.expr()?;
                    p.cursor.require(TokenKind::RParen)?;
                    return Ok(expr);
                }
                _ => return Ok(None),
            };
            Ok(Some(Expr::synthetic(kind)))
        })
    }

    /// Consume an infix operator token. A comma only counts when `allow_comma`.
    fn infix_op(&mut self, allow_comma: bool) -> Option<&'src Token> {
        let pos = self.cursor.position();
        let token = self.cursor.next()?;
        if infix_precedence(token.kind).is_some() && (allow_comma || token.kind != TokenKind::Comma) {
            return Some(token);
        }
        self.cursor.set_position(pos);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Node;
    use crate::errors::SyntaxError;
    use crate::source::Source;

    fn parse(text: &str) -> String {
        let src = Source::new("e.c", text).unwrap();
        let mut parser = Parser::new(&src);
        let expr = parser.expr().unwrap().unwrap();
        render(&expr)
    }

    // Fully parenthesized rendering, to check tree shape.
    fn render(expr: &Expr<'_>) -> String {
        match &expr.kind {
            ExprKind::Infix { left, op, right } => {
                format!("({} {} {})", render(left), op.text(), render(right))
            }
            ExprKind::Conditional { cond, then, orelse } => {
                format!("({} ? {} : {})", render(cond), render(then), render(orelse))
            }
            ExprKind::Prefix { op, expr } => format!("({}{})", op.text(), render(expr)),
            ExprKind::Postfix { expr, op } => format!("({}{})", render(expr), op.text()),
            ExprKind::Cast { expr, .. } => format!("(cast {})", render(expr)),
            ExprKind::Call { term, args } => {
                let args: Vec<_> = args.iter().map(render).collect();
                format!("{}({})", render(term), args.join(", "))
            }
            ExprKind::Index { term, index } => format!("{}[{}]", render(term), render(index)),
            ExprKind::Member { term, name } => format!("{}.{}", render(term), name.text()),
            ExprKind::Arrow { term, name } => format!("{}->{}", render(term), name.text()),
            ExprKind::Number(token) | ExprKind::Name(token) => token.text().to_string(),
            ExprKind::String(tokens) => tokens.iter().map(|t| t.text()).collect::<Vec<_>>().join(" "),
        }
    }

    #[test]
    fn test_precedence() {
        assert_eq!(parse("a + b * c"), "(a + (b * c))");
        assert_eq!(parse("a * b + c"), "((a * b) + c)");
        assert_eq!(parse("a - b * c - d"), "((a - (b * c)) - d)");
        assert_eq!(parse("a < b == c"), "((a < b) == c)");
        assert_eq!(parse("a || b && c"), "(a || (b && c))");
    }

    #[test]
    fn test_right_associative() {
        assert_eq!(parse("a = b = c"), "(a = (b = c))");
        assert_eq!(parse("a ? b : c ? d : e"), "(a ? b : (c ? d : e))");
        assert_eq!(parse("x = a ? b : c"), "(x = (a ? b : c))");
    }

    #[test]
    fn test_comma() {
        assert_eq!(parse("a, b = c"), "(a , (b = c))");
        assert_eq!(parse("f(a, b + 1)"), "f(a, (b + 1))");
    }

    #[test]
    fn test_prefix_postfix() {
        assert_eq!(parse("-x++"), "(-(x++))");
        assert_eq!(parse("*p->next[1].v"), "(*p->next[1].v)");
        assert_eq!(parse("!!ok"), "(!(!ok))");
    }

    #[test]
    fn test_cast_and_parens() {
        assert_eq!(parse("(int)x + 1"), "((cast x) + 1)");
        assert_eq!(parse("(a + b) * c"), "((a + b) * c)");
        assert_eq!(parse("(PyObject *)op"), "(cast op)");
    }

    #[test]
    fn test_strings_concatenate() {
        let src = Source::new("e.c", r#""a" "b""#).unwrap();
        let mut parser = Parser::new(&src);
        let expr = parser.term().unwrap().unwrap();
        assert!(matches!(&expr.kind, ExprKind::String(parts) if parts.len() == 2));
    }

    #[test]
    fn test_paren_term_widens_span() {
        let src = Source::new("e.c", "(a + b)").unwrap();
        let mut parser = Parser::new(&src);
        let expr = parser.term().unwrap().unwrap();
        assert_eq!(expr.text(), "(a + b)");
        assert!(matches!(expr.kind, ExprKind::Infix { .. }));
    }

    #[test]
    fn test_function_pointer_type() {
        let src = Source::new("e.c", "int (*)(int, char *)").unwrap();
        let mut parser = Parser::new(&src);
        let ty = parser.type_expr().unwrap().unwrap();
        let TypeKind::Function { ty: inner, args } = &ty.kind else {
            panic!("expected function type, got {:?}", ty.kind);
        };
        assert!(matches!(inner.kind, TypeKind::Pointer(_)));
        assert_eq!(args.len(), 2);
        assert_eq!(ty.text(), "int (*)(int, char *)");
    }

    #[test]
    fn test_missing_operand_is_error() {
        let src = Source::new("e.c", "a +").unwrap();
        let mut parser = Parser::new(&src);
        let err = parser.expr().unwrap_err();
        assert_eq!(err.message, "Expected term following '+'");
        assert_eq!(parser.position().index(), 0);
    }

    #[test]
    fn test_not_an_expression() {
        let src = Source::new("e.c", ") x").unwrap();
        let mut parser = Parser::new(&src);
        assert!(parser.expr().unwrap().is_none());
        assert_eq!(parser.position().index(), 0);
    }

    fn parse_err(text: &str) -> SyntaxError {
        let src = Source::new("e.c", text).unwrap();
        let mut parser = Parser::new(&src);
        let err = parser.expr().unwrap_err();
        assert_eq!(parser.position().index(), 0);
        err
    }

    #[test]
    fn test_conditional_needs_middle() {
        let err = parse_err("a ? : b");
        assert_eq!(err.message, "Expected expression");
        assert_eq!(err.column, 5);
    }

    #[test]
    fn test_empty_index() {
        let err = parse_err("a[]");
        assert_eq!(err.message, "Expected index expression");
        assert_eq!(err.column, 3);
    }
}
