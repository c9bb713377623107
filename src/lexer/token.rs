//! Token types produced by the lexer.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    Identifier,
    Number,
    String,
    Character,
    Comment,
    Macro,

    // Multi-character operators
    PlusPlus,
    MinusMinus,
    Arrow,
    Ellipsis,
    TimesEqual,
    DivEqual,
    ModEqual,
    PlusEqual,
    MinusEqual,
    LShiftEqual,
    RShiftEqual,
    AndEqual,
    OrEqual,
    XorEqual,
    LOr,
    LAnd,
    LShift,
    RShift,
    Le,
    Ge,
    Eq,
    Ne,

    // Single-character operators
    Plus,
    Minus,
    Times,
    Divide,
    Mod,
    Not,
    Xor,
    Lt,
    Gt,
    LNot,
    Or,
    And,
    Equals,
    CondOp,

    // Delimiters
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Period,
    Semi,
    Colon,
    Backslash,

    // Keywords
    Auto,
    Break,
    Case,
    Char,
    Const,
    Continue,
    Default,
    Do,
    Double,
    Else,
    Enum,
    Extern,
    Float,
    For,
    Goto,
    If,
    Inline,
    Int,
    Long,
    Offsetof,
    Register,
    Restrict,
    Return,
    Short,
    Signed,
    Sizeof,
    Static,
    Struct,
    Switch,
    Typedef,
    Union,
    Unsigned,
    Void,
    Volatile,
    While,
}

/// Operator spellings, longest first so that regex alternation prefers them.
pub(crate) const OPERATORS: &[(&str, TokenKind)] = &[
    ("<<=", TokenKind::LShiftEqual),
    (">>=", TokenKind::RShiftEqual),
    ("...", TokenKind::Ellipsis),
    ("++", TokenKind::PlusPlus),
    ("--", TokenKind::MinusMinus),
    ("->", TokenKind::Arrow),
    ("*=", TokenKind::TimesEqual),
    ("/=", TokenKind::DivEqual),
    ("%=", TokenKind::ModEqual),
    ("+=", TokenKind::PlusEqual),
    ("-=", TokenKind::MinusEqual),
    ("&=", TokenKind::AndEqual),
    ("|=", TokenKind::OrEqual),
    ("^=", TokenKind::XorEqual),
    ("||", TokenKind::LOr),
    ("&&", TokenKind::LAnd),
    ("<<", TokenKind::LShift),
    (">>", TokenKind::RShift),
    ("<=", TokenKind::Le),
    (">=", TokenKind::Ge),
    ("==", TokenKind::Eq),
    ("!=", TokenKind::Ne),
    ("+", TokenKind::Plus),
    ("-", TokenKind::Minus),
    ("*", TokenKind::Times),
    ("/", TokenKind::Divide),
    ("%", TokenKind::Mod),
    ("~", TokenKind::Not),
    ("^", TokenKind::Xor),
    ("<", TokenKind::Lt),
    (">", TokenKind::Gt),
    ("!", TokenKind::LNot),
    ("|", TokenKind::Or),
    ("&", TokenKind::And),
    ("=", TokenKind::Equals),
    ("?", TokenKind::CondOp),
    ("(", TokenKind::LParen),
    (")", TokenKind::RParen),
    ("[", TokenKind::LBracket),
    ("]", TokenKind::RBracket),
    ("{", TokenKind::LBrace),
    ("}", TokenKind::RBrace),
    (",", TokenKind::Comma),
    (".", TokenKind::Period),
    (";", TokenKind::Semi),
    (":", TokenKind::Colon),
    ("\\", TokenKind::Backslash),
];

pub(crate) const KEYWORDS: &[(&str, TokenKind)] = &[
    ("auto", TokenKind::Auto),
    ("break", TokenKind::Break),
    ("case", TokenKind::Case),
    ("char", TokenKind::Char),
    ("const", TokenKind::Const),
    ("continue", TokenKind::Continue),
    ("default", TokenKind::Default),
    ("do", TokenKind::Do),
    ("double", TokenKind::Double),
    ("else", TokenKind::Else),
    ("enum", TokenKind::Enum),
    ("extern", TokenKind::Extern),
    ("float", TokenKind::Float),
    ("for", TokenKind::For),
    ("goto", TokenKind::Goto),
    ("if", TokenKind::If),
    ("inline", TokenKind::Inline),
    ("int", TokenKind::Int),
    ("long", TokenKind::Long),
    ("offsetof", TokenKind::Offsetof),
    ("register", TokenKind::Register),
    ("restrict", TokenKind::Restrict),
    ("return", TokenKind::Return),
    ("short", TokenKind::Short),
    ("signed", TokenKind::Signed),
    ("sizeof", TokenKind::Sizeof),
    ("static", TokenKind::Static),
    ("struct", TokenKind::Struct),
    ("switch", TokenKind::Switch),
    ("typedef", TokenKind::Typedef),
    ("union", TokenKind::Union),
    ("unsigned", TokenKind::Unsigned),
    ("void", TokenKind::Void),
    ("volatile", TokenKind::Volatile),
    ("while", TokenKind::While),
];

impl TokenKind {
    /// Look up the keyword spelled `text`.
    pub fn keyword(text: &str) -> Option<TokenKind> {
        KEYWORDS
            .iter()
            .find(|(spelling, _)| *spelling == text)
            .map(|(_, kind)| *kind)
    }

    /// Look up the operator or delimiter spelled `text`.
    pub fn operator(text: &str) -> Option<TokenKind> {
        OPERATORS
            .iter()
            .find(|(spelling, _)| *spelling == text)
            .map(|(_, kind)| *kind)
    }

    pub fn is_keyword(self) -> bool {
        KEYWORDS.iter().any(|(_, kind)| *kind == self)
    }

    /// Upper-case name used in messages, e.g. `IDENTIFIER` or `LPAREN`.
    pub fn name(self) -> String {
        format!("{:?}", self).to_uppercase()
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// A 1-based line and column pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LineCol {
    pub line: usize,
    pub column: usize,
}

impl LineCol {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// A lexed token. `end` is exclusive.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub begin: LineCol,
    pub end: LineCol,
    /// Byte offset of the first character in the lexed text.
    pub offset: usize,
}

impl Token {
    pub fn line(&self) -> usize {
        self.begin.line
    }

    pub fn column(&self) -> usize {
        self.begin.column
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.begin.line == self.end.line {
            write!(
                f,
                "{}({:?}, {}:{}:{})",
                self.kind, self.text, self.begin.line, self.begin.column, self.end.column
            )
        } else {
            write!(
                f,
                "{}({:?}, {}:{}-{}:{})",
                self.kind,
                self.text,
                self.begin.line,
                self.begin.column,
                self.end.line,
                self.end.column
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(TokenKind::Identifier.name(), "IDENTIFIER");
        assert_eq!(TokenKind::LParen.name(), "LPAREN");
        assert_eq!(TokenKind::CondOp.name(), "CONDOP");
        assert_eq!(TokenKind::MinusMinus.to_string(), "MINUSMINUS");
    }

    #[test]
    fn test_lookup_tables() {
        assert_eq!(TokenKind::keyword("while"), Some(TokenKind::While));
        assert_eq!(TokenKind::keyword("whilst"), None);
        assert_eq!(TokenKind::operator("->"), Some(TokenKind::Arrow));
        assert!(TokenKind::Unsigned.is_keyword());
        assert!(!TokenKind::Identifier.is_keyword());
    }

    #[test]
    fn test_debug_repr() {
        let token = Token {
            kind: TokenKind::Identifier,
            text: "x".into(),
            begin: LineCol::new(2, 5),
            end: LineCol::new(2, 6),
            offset: 10,
        };
        assert_eq!(format!("{:?}", token), "IDENTIFIER(\"x\", 2:5:6)");
    }
}
