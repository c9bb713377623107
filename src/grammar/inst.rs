//! Instruction definition grammar.
//!
//! ```text
//! inst(NAME, (in1, in2[oparg], ?? -- out1)) { ...C statements... }
//! family(NAME) = MEMBER1, MEMBER2;
//! ```

use super::Parser;
use crate::ast::{Definition, Family, InstDef};
use crate::backtrack::Backtrack;
use crate::errors::ParseResult;
use crate::lexer::TokenKind;

impl<'src> Parser<'src> {
    /// Every definition up to end of input.
    pub fn definitions(&mut self) -> ParseResult<Vec<Definition<'src>>> {
        let mut defs = Vec::new();
        while !self.cursor.eof() {
            if let Some(inst) = self.inst_def()? {
                defs.push(Definition::Inst(inst));
            } else if let Some(family) = self.family_def()? {
                defs.push(Definition::Family(family));
            } else {
                return Err(self
                    .cursor
                    .syntax_error("Expected instruction or family definition"));
            }
        }
        Ok(defs)
    }

    /// A header followed by its block.
    pub fn inst_def(&mut self) -> ParseResult<Option<InstDef<'src>>> {
        self.contextual(|p| {
            let Some(mut inst) = p.inst_header()? else {
                return Ok(None);
            };
            let Some(block) = p.block()? else {
                return Err(p.cursor.syntax_error("Expected block"));
            };
            inst.block = Some(block);
            Ok(Some(inst))
        })
    }

    /// `inst(NAME, (inputs -- outputs))`
    pub fn inst_header(&mut self) -> ParseResult<Option<InstDef<'src>>> {
        self.contextual(|p| {
            if !p.keyword("inst") || p.cursor.expect(TokenKind::LParen).is_none() {
                return Ok(None);
            }
            let Some(name) = p.cursor.expect(TokenKind::Identifier) else {
                return Ok(None);
            };
            if p.cursor.expect(TokenKind::Comma).is_none() {
                return Ok(None);
            }
            let (inputs, outputs) = p.stack_effect()?;
            if p.cursor.expect(TokenKind::RParen).is_none() {
                return Ok(None);
            }
            Ok(Some(InstDef::new(name.text.as_str(), inputs, outputs)))
        })
    }

    /// `(inputs -- outputs)`; either side may be empty.
    pub fn stack_effect(&mut self) -> ParseResult<(Vec<String>, Vec<String>)> {
        if self.cursor.expect(TokenKind::LParen).is_some() {
            let inputs = self.inputs()?.unwrap_or_default();
            if self.cursor.expect(TokenKind::MinusMinus).is_some() {
                let outputs = self.outputs()?.unwrap_or_default();
                if self.cursor.expect(TokenKind::RParen).is_some() {
                    return Ok((inputs, outputs));
                }
            }
        }
        Err(self.cursor.syntax_error("Expected stack effect"))
    }

    pub fn inputs(&mut self) -> ParseResult<Option<Vec<String>>> {
        self.comma_list(Self::input)
    }

    /// `name`, `name[arg]`, `name[arg*N]`, or a run of `?` (unused slots).
    pub fn input(&mut self) -> ParseResult<Option<String>> {
        if let Some(name) = self.cursor.expect(TokenKind::Identifier) {
            if self.cursor.expect(TokenKind::LBracket).is_none() {
                return Ok(Some(name.text.clone()));
            }
            if let Some(arg) = self.cursor.expect(TokenKind::Identifier) {
                if self.cursor.expect(TokenKind::RBracket).is_some() {
                    return Ok(Some(format!("{}[{}]", name.text, arg.text)));
                }
                if self.cursor.expect(TokenKind::Times).is_some() {
                    if let Some(num) = self.cursor.expect(TokenKind::Number) {
                        if self.cursor.expect(TokenKind::RBracket).is_some() {
                            return Ok(Some(format!("{}[{}*{}]", name.text, arg.text, num.text)));
                        }
                    }
                }
            }
            return Err(self
                .source()
                .syntax_error("Expected argument in brackets", Some(name)));
        }
        if self.cursor.expect(TokenKind::CondOp).is_some() {
            while self.cursor.expect(TokenKind::CondOp).is_some() {}
            return Ok(Some("??".to_string()));
        }
        Ok(None)
    }

    pub fn outputs(&mut self) -> ParseResult<Option<Vec<String>>> {
        self.comma_list(Self::output)
    }

    /// Outputs take the same forms as inputs.
    pub fn output(&mut self) -> ParseResult<Option<String>> {
        self.input()
    }

    /// `family(NAME) = MEMBER, MEMBER;`
    pub fn family_def(&mut self) -> ParseResult<Option<Family<'src>>> {
        self.contextual(|p| {
            if !p.keyword("family") || p.cursor.expect(TokenKind::LParen).is_none() {
                return Ok(None);
            }
            let Some(name) = p.cursor.expect(TokenKind::Identifier) else {
                return Ok(None);
            };
            if p.cursor.expect(TokenKind::RParen).is_none() || p.cursor.expect(TokenKind::Equals).is_none() {
                return Ok(None);
            }
            let Some(members) = p.members()? else {
                return Ok(None);
            };
            if p.cursor.expect(TokenKind::Semi).is_none() {
                return Ok(None);
            }
            Ok(Some(Family::new(name.text.as_str(), members)))
        })
    }

    pub fn members(&mut self) -> ParseResult<Option<Vec<String>>> {
        self.comma_list(|p| Ok(p.cursor.expect(TokenKind::Identifier).map(|t| t.text.clone())))
    }

    /// `item (, item)*`. A trailing comma not followed by an item is left unconsumed.
    fn comma_list<T>(
        &mut self,
        item: impl Fn(&mut Self) -> ParseResult<Option<T>>,
    ) -> ParseResult<Option<Vec<T>>> {
        self.attempt(|p| {
            let Some(first) = item(p)? else {
                return Ok(None);
            };
            let mut items = vec![first];
            while let Some(next) = p.attempt(|p| {
                if p.cursor.expect(TokenKind::Comma).is_none() {
                    return Ok(None);
                }
                item(p)
            })? {
                items.push(next);
            }
            Ok(Some(items))
        })
    }

    /// Consume an identifier spelled `word`.
    fn keyword(&mut self, word: &str) -> bool {
        let pos = self.cursor.position();
        match self.cursor.next() {
            Some(token) if token.kind == TokenKind::Identifier && token.text == word => true,
            _ => {
                self.cursor.set_position(pos);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Node, StmtKind};
    use crate::source::Source;

    const DEFS: &str = "\
inst(BINARY_OP, (lhs, rhs -- res)) {
    res = op(lhs, rhs);
}

family(binary) = BINARY_OP, BINARY_OP_ADD;
";

    #[test]
    fn test_definitions() {
        let src = Source::new("defs.c", DEFS).unwrap();
        let mut parser = Parser::new(&src);
        let defs = parser.definitions().unwrap();
        assert_eq!(defs.len(), 2);
        let Definition::Inst(inst) = &defs[0] else {
            panic!("expected inst, got {:?}", defs[0]);
        };
        assert_eq!(inst.name, "BINARY_OP");
        assert_eq!(inst.inputs, ["lhs", "rhs"]);
        assert_eq!(inst.outputs, ["res"]);
        assert!(matches!(&inst.block, Some(block) if matches!(block.kind, StmtKind::Block(_))));
        assert!(inst.text().starts_with("inst(BINARY_OP"));
        assert!(inst.text().ends_with('}'));
        let Definition::Family(family) = &defs[1] else {
            panic!("expected family, got {:?}", defs[1]);
        };
        assert_eq!(family.members, ["BINARY_OP", "BINARY_OP_ADD"]);
        assert_eq!(family.text(), "family(binary) = BINARY_OP, BINARY_OP_ADD;");
    }

    #[test]
    fn test_input_forms() {
        let src = Source::new("defs.c", "inst(X, (a, b[oparg], c[oparg*2], ?? -- )) {}").unwrap();
        let mut parser = Parser::new(&src);
        let inst = parser.inst_def().unwrap().unwrap();
        assert_eq!(inst.inputs, ["a", "b[oparg]", "c[oparg*2]", "??"]);
        assert!(inst.outputs.is_empty());
    }

    #[test]
    fn test_header_needs_block() {
        let src = Source::new("defs.c", "inst(X, (a -- b));").unwrap();
        let mut parser = Parser::new(&src);
        let header = parser.inst_header().unwrap().unwrap();
        assert!(header.block.is_none());
        assert_eq!(header.text(), "inst(X, (a -- b))");

        let mut parser = Parser::new(&src);
        let err = parser.definitions().unwrap_err();
        assert_eq!(err.message, "Expected block");
        assert_eq!(err.column, 18);
        assert_eq!(parser.position().index(), 0);
    }

    #[test]
    fn test_bad_stack_effect() {
        let src = Source::new("defs.c", "inst(X, (a b)) {}").unwrap();
        let mut parser = Parser::new(&src);
        let err = parser.inst_def().unwrap_err();
        assert_eq!(err.message, "Expected stack effect");
        assert_eq!(parser.position().index(), 0);
    }

    #[test]
    fn test_bad_bracket_argument() {
        let src = Source::new("defs.c", "inst(X, (a[1] -- )) {}").unwrap();
        let mut parser = Parser::new(&src);
        let err = parser.inst_def().unwrap_err();
        assert_eq!(err.message, "Expected argument in brackets");
    }

    #[test]
    fn test_unknown_definition() {
        let src = Source::new("defs.c", "macro(X) = 1;").unwrap();
        let mut parser = Parser::new(&src);
        let err = parser.definitions().unwrap_err();
        assert_eq!(err.message, "Expected instruction or family definition");
    }
}
