//! Operator symbols and the precedence table used by the expression resolver.
//!
//! A node's score is its base precedence plus [`PAREN_WEIGHT`] for every
//! grouping parenthesis open when its token was read, so any parenthesized
//! operator outranks every bare one.

use std::fmt;

/// Score added per enclosing grouping parenthesis.
pub const PAREN_WEIGHT: u32 = 1000;

pub const DOT_PRECEDENCE: u32 = 500;
pub const INC_DEC_PRECEDENCE: u32 = 300;
pub const TERNARY_PRECEDENCE: u32 = 3;
pub const COMPOUND_ASSIGN_PRECEDENCE: u32 = 2;

/// Final score of an operator read under `extra` grouping parentheses.
#[inline]
pub fn score(base: u32, extra: u32) -> u32 {
    base + extra * PAREN_WEIGHT
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    NotEq,
    Gt,
    Lt,
    GtEq,
    LtEq,
    /// `===`
    Identical,
    /// `!==`
    NotIdentical,
    /// `is`, same meaning as `===`
    Is,
    InstanceOf,
    /// `&&` / `and`, lazy
    And,
    /// `||` / `or`, lazy
    Or,
    BitAnd,
    BitXor,
    BitOr,
    Shl,
    Shr,
}

impl BinaryOp {
    /// Parse a binary operator symbol or keyword alias.
    pub fn from_symbol(sym: &str) -> Option<Self> {
        Some(match sym {
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            "%" => BinaryOp::Mod,
            "==" => BinaryOp::Eq,
            "!=" => BinaryOp::NotEq,
            ">" => BinaryOp::Gt,
            "<" => BinaryOp::Lt,
            ">=" => BinaryOp::GtEq,
            "<=" => BinaryOp::LtEq,
            "===" => BinaryOp::Identical,
            "!==" => BinaryOp::NotIdentical,
            "is" => BinaryOp::Is,
            "instanceof" => BinaryOp::InstanceOf,
            "&&" | "and" => BinaryOp::And,
            "||" | "or" => BinaryOp::Or,
            "&" => BinaryOp::BitAnd,
            "^" => BinaryOp::BitXor,
            "|" => BinaryOp::BitOr,
            "<<" => BinaryOp::Shl,
            ">>" => BinaryOp::Shr,
            _ => return None,
        })
    }

    /// Operator behind a compound assignment symbol such as `+=` or `<<=`.
    pub fn from_compound(sym: &str) -> Option<Self> {
        let base = sym.strip_suffix('=')?;
        match base {
            "+" | "-" | "*" | "/" | "%" | "&" | "^" | "|" | "<<" | ">>" => Self::from_symbol(base),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Gt => ">",
            BinaryOp::Lt => "<",
            BinaryOp::GtEq => ">=",
            BinaryOp::LtEq => "<=",
            BinaryOp::Identical => "===",
            BinaryOp::NotIdentical => "!==",
            BinaryOp::Is => "is",
            BinaryOp::InstanceOf => "instanceof",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitXor => "^",
            BinaryOp::BitOr => "|",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
        }
    }

    pub fn precedence(self) -> u32 {
        match self {
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => 100,
            BinaryOp::Add | BinaryOp::Sub => 50,
            BinaryOp::Shl | BinaryOp::Shr => 40,
            BinaryOp::Gt
            | BinaryOp::Lt
            | BinaryOp::GtEq
            | BinaryOp::LtEq
            | BinaryOp::InstanceOf => 25,
            BinaryOp::Eq
            | BinaryOp::NotEq
            | BinaryOp::Identical
            | BinaryOp::NotIdentical
            | BinaryOp::Is => 20,
            BinaryOp::BitAnd => 12,
            BinaryOp::BitXor => 11,
            BinaryOp::BitOr => 10,
            BinaryOp::And | BinaryOp::Or => 5,
        }
    }

    /// Method name an instance must define to overload this operator.
    ///
    /// Identity, type-check and lazy logical operators cannot be overloaded.
    pub fn dunder(self) -> Option<&'static str> {
        Some(match self {
            BinaryOp::Add => "__add__",
            BinaryOp::Sub => "__sub__",
            BinaryOp::Mul => "__mul__",
            BinaryOp::Div => "__div__",
            BinaryOp::Mod => "__mod__",
            BinaryOp::Eq => "__eq__",
            BinaryOp::NotEq => "__ne__",
            BinaryOp::Gt => "__gt__",
            BinaryOp::Lt => "__lt__",
            BinaryOp::GtEq => "__ge__",
            BinaryOp::LtEq => "__le__",
            BinaryOp::BitAnd => "__and__",
            BinaryOp::BitXor => "__xor__",
            BinaryOp::BitOr => "__or__",
            BinaryOp::Shl => "__lshift__",
            BinaryOp::Shr => "__rshift__",
            BinaryOp::Identical
            | BinaryOp::NotIdentical
            | BinaryOp::Is
            | BinaryOp::InstanceOf
            | BinaryOp::And
            | BinaryOp::Or => return None,
        })
    }

    #[inline]
    pub fn is_lazy(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Not,
    Return,
    Throw,
    Assert,
    /// `*expr` in a call or `*name` in a parameter list
    Unpack,
    /// `**expr` / `**name`
    KwUnpack,
}

impl UnaryOp {
    pub fn precedence(self) -> u32 {
        match self {
            UnaryOp::Neg | UnaryOp::Not | UnaryOp::Unpack | UnaryOp::KwUnpack => 200,
            UnaryOp::Return | UnaryOp::Throw | UnaryOp::Assert => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            UnaryOp::Neg => "neg",
            UnaryOp::Not => "!",
            UnaryOp::Return => "return",
            UnaryOp::Throw => "throw",
            UnaryOp::Assert => "assert",
            UnaryOp::Unpack => "unpack",
            UnaryOp::KwUnpack => "kw_unpack",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum IncDecOp {
    Inc,
    Dec,
}

impl IncDecOp {
    pub fn from_symbol(sym: &str) -> Option<Self> {
        match sym {
            "++" => Some(IncDecOp::Inc),
            "--" => Some(IncDecOp::Dec),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            IncDecOp::Inc => "++",
            IncDecOp::Dec => "--",
        }
    }

    pub fn delta(self) -> i64 {
        match self {
            IncDecOp::Inc => 1,
            IncDecOp::Dec => -1,
        }
    }
}
