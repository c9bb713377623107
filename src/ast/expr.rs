//! Expression and type nodes.

use super::{Spanned, TokenRef};

/// An expression node.
pub type Expr<'src> = Spanned<'src, ExprKind<'src>>;

/// A type node, as used by casts, declarations and function types.
pub type TypeExpr<'src> = Spanned<'src, TypeKind<'src>>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExprKind<'src> {
    /// `left op right` for every binary operator, including assignment and comma.
    Infix {
        left: Box<Expr<'src>>,
        op: TokenRef<'src>,
        right: Box<Expr<'src>>,
    },
    /// `cond ? then : orelse`
    Conditional {
        cond: Box<Expr<'src>>,
        then: Box<Expr<'src>>,
        orelse: Box<Expr<'src>>,
    },
    Prefix {
        op: TokenRef<'src>,
        expr: Box<Expr<'src>>,
    },
    Postfix {
        expr: Box<Expr<'src>>,
        op: TokenRef<'src>,
    },
    /// `(type) expr`
    Cast {
        ty: Box<TypeExpr<'src>>,
        expr: Box<Expr<'src>>,
    },
    Call {
        term: Box<Expr<'src>>,
        args: Vec<Expr<'src>>,
    },
    Index {
        term: Box<Expr<'src>>,
        index: Box<Expr<'src>>,
    },
    /// `term.name`
    Member {
        term: Box<Expr<'src>>,
        name: TokenRef<'src>,
    },
    /// `term->name`
    Arrow {
        term: Box<Expr<'src>>,
        name: TokenRef<'src>,
    },
    /// A number or character literal.
    Number(TokenRef<'src>),
    /// One or more adjacent string literals.
    String(Vec<TokenRef<'src>>),
    Name(TokenRef<'src>),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKind<'src> {
    /// A run of numeric keywords: `int`, `unsigned long`, `void`, ...
    Numeric(Vec<TokenRef<'src>>),
    Named(TokenRef<'src>),
    /// `*type`; `**type` nests two pointers.
    Pointer(Box<TypeExpr<'src>>),
    Array {
        ty: Box<TypeExpr<'src>>,
        size: Option<Box<Expr<'src>>>,
    },
    Function {
        ty: Box<TypeExpr<'src>>,
        args: Vec<TypeExpr<'src>>,
    },
}

/// Value of a number or character literal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumberValue {
    Int(i64),
    Float(f64),
}

impl<'src> Expr<'src> {
    /// Evaluate a [`ExprKind::Number`] literal. Character literals yield
    /// their code point; integer suffixes are ignored.
    pub fn number_value(&self) -> Option<NumberValue> {
        let ExprKind::Number(token) = &self.kind else {
            return None;
        };
        let text = token.text();
        if let Some(inner) = text.strip_prefix('\'').and_then(|t| t.strip_suffix('\'')) {
            return char_value(inner).map(|c| NumberValue::Int(c as i64));
        }
        let digits = text.trim_end_matches(['u', 'U', 'l', 'L']);
        if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
            return i64::from_str_radix(hex, 16).ok().map(NumberValue::Int);
        }
        if digits.len() > 1 && digits.starts_with('0') && digits.bytes().all(|b| b.is_ascii_digit()) {
            return i64::from_str_radix(&digits[1..], 8).ok().map(NumberValue::Int);
        }
        if let Ok(value) = digits.parse::<i64>() {
            return Some(NumberValue::Int(value));
        }
        text.trim_end_matches(['f', 'F', 'l', 'L'])
            .parse::<f64>()
            .ok()
            .map(NumberValue::Float)
    }
}

fn char_value(inner: &str) -> Option<char> {
    let mut chars = inner.chars();
    match (chars.next()?, chars.next()) {
        ('\\', Some(escape)) => Some(match escape {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            '0' => '\0',
            other => other,
        }),
        (c, None) => Some(c),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Source;

    fn number(text: &str) -> Option<NumberValue> {
        let src = Source::new("n.c", text).unwrap();
        let token = &src.tokens()[0];
        Expr::synthetic(ExprKind::Number(TokenRef::new(token))).number_value()
    }

    #[test]
    fn test_number_values() {
        assert_eq!(number("42"), Some(NumberValue::Int(42)));
        assert_eq!(number("0x1f"), Some(NumberValue::Int(31)));
        assert_eq!(number("017"), Some(NumberValue::Int(15)));
        assert_eq!(number("10UL"), Some(NumberValue::Int(10)));
        assert_eq!(number("2.5f"), Some(NumberValue::Float(2.5)));
        assert_eq!(number("'a'"), Some(NumberValue::Int(97)));
        assert_eq!(number("'\\n'"), Some(NumberValue::Int(10)));
    }
}
