//! Instruction definition nodes.
//!
//! ```text
//! inst(NAME, (inputs -- outputs)) { ... }
//! family(NAME) = MEMBER, MEMBER, ...;
//! ```

use super::{Node, Provenance, Stmt};
use crate::impl_node;

/// `inst(NAME, (inputs -- outputs)) block`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstDef<'src> {
    pub name: String,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    /// `None` while only the header has been parsed.
    pub block: Option<Stmt<'src>>,
    pub span: Provenance<'src>,
}

/// `family(NAME) = MEMBER, ...;`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Family<'src> {
    pub name: String,
    pub members: Vec<String>,
    pub span: Provenance<'src>,
}

impl_node!(InstDef, Family);

impl<'src> InstDef<'src> {
    pub fn new(name: impl Into<String>, inputs: Vec<String>, outputs: Vec<String>) -> Self {
        Self {
            name: name.into(),
            inputs,
            outputs,
            block: None,
            span: Provenance::none(),
        }
    }
}

impl<'src> Family<'src> {
    pub fn new(name: impl Into<String>, members: Vec<String>) -> Self {
        Self {
            name: name.into(),
            members,
            span: Provenance::none(),
        }
    }
}

/// A top-level definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Definition<'src> {
    Inst(InstDef<'src>),
    Family(Family<'src>),
}

impl<'src> Definition<'src> {
    pub fn name(&self) -> &str {
        match self {
            Definition::Inst(inst) => &inst.name,
            Definition::Family(family) => &family.name,
        }
    }
}

impl<'src> Node<'src> for Definition<'src> {
    fn provenance(&self) -> &Provenance<'src> {
        match self {
            Definition::Inst(inst) => inst.provenance(),
            Definition::Family(family) => family.provenance(),
        }
    }

    fn provenance_mut(&mut self) -> &mut Provenance<'src> {
        match self {
            Definition::Inst(inst) => inst.provenance_mut(),
            Definition::Family(family) => family.provenance_mut(),
        }
    }
}
