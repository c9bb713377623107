//! Rewind: position tracking, automatic backtracking and source spans for
//! recursive-descent token parsers, with grammars for C expressions,
//! statements and instruction definitions built on top.

pub use crate::ast::{Node, Provenance, Span, Spanned, TokenRef};
pub use crate::backtrack::{contextual, Backtrack, Contextual};
pub use crate::config::{Section, SourceConfig};
pub use crate::errors::{ConfigError, ParseResult, SourceView, SyntaxError};
pub use crate::grammar::Parser;
pub use crate::lexer::{Token, TokenKind};
pub use crate::source::{Cursor, Position, Source};

pub mod ast;
pub mod backtrack;
pub mod cli;
pub mod config;
pub mod errors;
pub mod grammar;
pub mod lexer;
pub mod source;
