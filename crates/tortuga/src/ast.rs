use std::rc::Rc;

use smallvec::SmallVec;

use crate::{datum::Datum, primitives::Prim, procedures::Procedure, types::Word};

/// How the evaluator executes an AST node.
#[derive(Debug, Clone)]
pub enum Generator {
    /// The node's first child is the value.
    Literal,
    /// The node's first child is a variable name word; the value is looked up
    /// dynamically through the call-frame stack.
    ValueOf,
    /// A GOTO landing point. Executes as a no-op.
    Tag,
    /// Explicit no-op, appended when a line ends in a tag so there is always
    /// an instruction to jump to.
    Noop,
    /// ALLOWGETSET fallback: read the variable named by the node itself.
    GetVar,
    /// ALLOWGETSET fallback: `setfoo v` assigns the variable `foo`.
    SetVar,
    /// A primitive from the flat dispatch table.
    Prim(Prim),
    /// A user-defined procedure call.
    Proc(Rc<Procedure>),
    /// A user-defined macro call: the output list is re-evaluated in the
    /// caller's frame.
    Macro(Rc<Procedure>),
}

/// Declared result category of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnKind {
    Datum,
    Real,
    Bool,
    Nothing,
}

/// One semantic step of a parsed program: the evaluator's unit of dispatch.
///
/// Children are datums; a `Datum::Ast` child is a subexpression evaluated on
/// demand, anything else is passed through as-is (literals and the raw tokens
/// collected for name-taking special forms).
#[derive(Debug)]
pub struct AstNode {
    pub name: Word,
    pub generator: Generator,
    pub returns: ReturnKind,
    pub children: SmallVec<[Datum; 2]>,
}

impl AstNode {
    #[must_use]
    pub fn new(name: Word, generator: Generator, returns: ReturnKind) -> Self {
        Self {
            name,
            generator,
            returns,
            children: SmallVec::new(),
        }
    }

    pub fn add_child(&mut self, child: Datum) {
        self.children.push(child);
    }

    /// True for GOTO landing points.
    #[must_use]
    pub fn is_tag(&self) -> bool {
        matches!(self.generator, Generator::Prim(Prim::Tag) | Generator::Tag)
    }

    /// The tag name when this node is a tag whose argument is a literal
    /// quoted word.
    #[must_use]
    pub fn tag_name(&self) -> Option<Word> {
        if !self.is_tag() {
            return None;
        }
        match self.children.first() {
            Some(Datum::Ast(child)) => match (&child.generator, child.children.first()) {
                (Generator::Literal, Some(Datum::Word(w))) => Some(w.clone()),
                _ => None,
            },
            Some(Datum::Word(w)) => Some(w.clone()),
            _ => None,
        }
    }
}
