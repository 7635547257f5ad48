//! AST node model.
//!
//! The incremental builder pushes nodes with empty operand slots ([`Slot`])
//! and fills each slot exactly once while resolving precedence. After a
//! parse completes the tree is immutable; the evaluator only reads it.

mod display;

use std::rc::Rc;

use crate::ops::{self, BinaryOp, IncDecOp, UnaryOp};
use crate::Loc;

/// An operand slot. `None` until the resolver binds it.
pub type Slot = Option<Box<Node>>;

/// Declaration level of an assignment.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AssignLevel {
    /// `x = v`: rebind an existing variable.
    Assign,
    /// `const x = v`
    Const,
    /// `var x = v`
    Var,
    /// `function x(...) {...}`
    FuncDefine,
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct Block {
    pub lines: Vec<Node>,
}

impl Block {
    pub fn new(lines: Vec<Node>) -> Self {
        Block { lines }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FuncDef {
    pub params: Option<Block>,
    pub body: Option<Rc<Node>>,
    pub is_abstract: bool,
    /// `@Override`, `@Suppress`, ... written before the definition.
    pub tags: Vec<String>,
    pub doc: String,
}

impl FuncDef {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClassDef {
    pub name: String,
    /// Declaration order, with the implicit root `Object` last.
    pub superclass_names: Vec<String>,
    pub body: Option<Rc<Node>>,
    pub is_abstract: bool,
    pub doc: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub loc: Loc,
    pub kind: NodeKind,
}

#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Int(i64),
    Float(f64),
    Literal(String),
    Name(String),
    Bool(bool),
    Null,
    Break,
    Continue,
    /// Value of a `var x;` declaration without initializer.
    Undefined,
    Assignment {
        left: Box<Node>,
        right: Slot,
        level: AssignLevel,
    },
    Dot {
        left: Slot,
        right: Slot,
        extra: u32,
    },
    Binary {
        op: BinaryOp,
        left: Slot,
        right: Slot,
        extra: u32,
        /// `+=` and friends.
        compound: bool,
    },
    Unary {
        op: UnaryOp,
        value: Slot,
        extra: u32,
    },
    IncDec {
        op: IncDecOp,
        target: Slot,
        prefix: bool,
        extra: u32,
    },
    Ternary {
        left: Slot,
        mid: Slot,
        right: Slot,
        extra: u32,
    },
    Block(Block),
    If {
        cond: Option<Block>,
        then: Slot,
        otherwise: Slot,
    },
    While {
        cond: Option<Block>,
        body: Slot,
    },
    /// Three clauses: C-style loop. Two clauses: for-each.
    For {
        clauses: Option<Block>,
        body: Slot,
    },
    FuncDef(Box<FuncDef>),
    /// `args` stays `None` until the closing `)` or `]` is read.
    Call {
        callee: Box<Node>,
        args: Option<Block>,
    },
    ClassDef(Box<ClassDef>),
    /// `new Name`. Constructor arguments belong to an enclosing `Call`.
    ClassInit {
        name: String,
    },
    Try {
        body: Slot,
        catches: Vec<Node>,
        finally: Slot,
    },
    Catch {
        cond: Option<Block>,
        then: Slot,
    },
    /// `key: value` inside a dict literal, or `binding: Type` in a catch clause.
    KeyValue {
        key: Box<Node>,
        value: Slot,
    },
    Dict {
        entries: Vec<Node>,
    },
}

/// Discriminant of [`NodeKind`], used in diagnostics and tracing.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeTag {
    Int,
    Float,
    Literal,
    Name,
    Bool,
    Null,
    Break,
    Continue,
    Undefined,
    Assignment,
    Dot,
    Binary,
    Unary,
    IncDec,
    Ternary,
    Block,
    If,
    While,
    For,
    FuncDef,
    Call,
    ClassDef,
    ClassInit,
    Try,
    Catch,
    KeyValue,
    Dict,
}

impl Node {
    #[inline]
    pub fn new(loc: Loc, kind: NodeKind) -> Self {
        Node { loc, kind }
    }

    pub fn tag(&self) -> NodeTag {
        match &self.kind {
            NodeKind::Int(_) => NodeTag::Int,
            NodeKind::Float(_) => NodeTag::Float,
            NodeKind::Literal(_) => NodeTag::Literal,
            NodeKind::Name(_) => NodeTag::Name,
            NodeKind::Bool(_) => NodeTag::Bool,
            NodeKind::Null => NodeTag::Null,
            NodeKind::Break => NodeTag::Break,
            NodeKind::Continue => NodeTag::Continue,
            NodeKind::Undefined => NodeTag::Undefined,
            NodeKind::Assignment { .. } => NodeTag::Assignment,
            NodeKind::Dot { .. } => NodeTag::Dot,
            NodeKind::Binary { .. } => NodeTag::Binary,
            NodeKind::Unary { .. } => NodeTag::Unary,
            NodeKind::IncDec { .. } => NodeTag::IncDec,
            NodeKind::Ternary { .. } => NodeTag::Ternary,
            NodeKind::Block(_) => NodeTag::Block,
            NodeKind::If { .. } => NodeTag::If,
            NodeKind::While { .. } => NodeTag::While,
            NodeKind::For { .. } => NodeTag::For,
            NodeKind::FuncDef(_) => NodeTag::FuncDef,
            NodeKind::Call { .. } => NodeTag::Call,
            NodeKind::ClassDef(_) => NodeTag::ClassDef,
            NodeKind::ClassInit { .. } => NodeTag::ClassInit,
            NodeKind::Try { .. } => NodeTag::Try,
            NodeKind::Catch { .. } => NodeTag::Catch,
            NodeKind::KeyValue { .. } => NodeTag::KeyValue,
            NodeKind::Dict { .. } => NodeTag::Dict,
        }
    }

    /// Identifier text when this is a `Name` node.
    pub fn as_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Name(name) => Some(name),
            _ => None,
        }
    }

    /// Whether the expression resolver may collect this node.
    ///
    /// Operands, operator nodes (filled or not) and completed calls qualify.
    /// Statements, blocks and pending calls end the collected suffix.
    pub fn is_expression_like(&self) -> bool {
        match &self.kind {
            NodeKind::Int(_)
            | NodeKind::Float(_)
            | NodeKind::Literal(_)
            | NodeKind::Name(_)
            | NodeKind::Bool(_)
            | NodeKind::Null
            | NodeKind::Dot { .. }
            | NodeKind::Binary { .. }
            | NodeKind::Unary { .. }
            | NodeKind::IncDec { .. }
            | NodeKind::Ternary { .. }
            | NodeKind::ClassInit { .. }
            | NodeKind::Dict { .. } => true,
            NodeKind::Call { args, .. } => args.is_some(),
            _ => false,
        }
    }

    /// Score of this node if it is an operator with every slot still empty.
    ///
    /// Filled operators return `None` and are treated as operands.
    pub fn pending_score(&self) -> Option<u32> {
        match &self.kind {
            NodeKind::Binary {
                op,
                left: None,
                right: None,
                extra,
                compound,
            } => {
                let base = if *compound {
                    ops::COMPOUND_ASSIGN_PRECEDENCE
                } else {
                    op.precedence()
                };
                Some(ops::score(base, *extra))
            }
            NodeKind::Dot {
                left: None,
                right: None,
                extra,
            } => Some(ops::score(ops::DOT_PRECEDENCE, *extra)),
            NodeKind::Unary {
                op,
                value: None,
                extra,
            } => Some(ops::score(op.precedence(), *extra)),
            NodeKind::IncDec {
                target: None,
                extra,
                ..
            } => Some(ops::score(ops::INC_DEC_PRECEDENCE, *extra)),
            NodeKind::Ternary {
                left: None,
                mid: None,
                right: None,
                extra,
            } => Some(ops::score(ops::TERNARY_PRECEDENCE, *extra)),
            _ => None,
        }
    }
}
