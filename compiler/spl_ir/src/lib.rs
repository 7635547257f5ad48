//! SPL IR: the data shared by the lexer, the parser and the evaluator.
//!
//! - [`Loc`]: line + file of a token or node
//! - [`Token`] / [`TokenKind`]: tokenizer output
//! - [`ops`]: operator symbols and their precedence table
//! - [`ast`]: the node model produced by the incremental builder
//!
//! Nodes are plain owned trees. Function and class bodies sit behind `Rc`
//! so runtime `Function`/`Class` values can share them without copying.

pub mod ast;
mod loc;
pub mod ops;
mod token;

pub use ast::{AssignLevel, Block, ClassDef, FuncDef, Node, NodeKind, NodeTag, Slot};
pub use loc::Loc;
pub use ops::{BinaryOp, IncDecOp, UnaryOp};
pub use token::{is_keyword, Token, TokenKind, KEYWORDS, SYMBOLS};
