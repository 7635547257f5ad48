//! Parse error types.
//!
//! Every error carries the location of the token being processed when the
//! builder or the driver gave up. [`FrameKind`] doubles as the "while
//! parsing X" context for end-of-input errors.

use spl_ir::Loc;
use spl_lexer::LexError;

/// Kind of an open builder frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrameKind {
    Root,
    Block,
    Call,
    Params,
    Condition,
    Dict,
}

impl FrameKind {
    /// Phrase suitable for "while parsing {description}".
    pub fn description(self) -> &'static str {
        match self {
            FrameKind::Root => "the program",
            FrameKind::Block => "a block",
            FrameKind::Call => "call arguments",
            FrameKind::Params => "a parameter list",
            FrameKind::Condition => "a condition",
            FrameKind::Dict => "a dict literal",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseErrorKind {
    #[error("reached the end of input while parsing {}", .0.description())]
    UnexpectedEof(FrameKind),
    #[error("unmatched '{0}'")]
    Unmatched(&'static str),
    #[error("operator '{0}' is missing an operand")]
    MissingOperand(String),
    #[error("line is not terminated")]
    Unterminated,
    #[error("unexpected {0}")]
    Unexpected(String),
    #[error("expected {expected} after '{after}'")]
    Expected {
        expected: &'static str,
        after: String,
    },
    #[error("illegal {what} name '{name}'")]
    IllegalName { what: &'static str, name: String },
    #[error("'abstract' must precede 'function', 'def' or 'class'")]
    MisplacedAbstract,
    #[error("dict entries must be written as 'key: value'")]
    BadDictEntry,
    #[error("cannot close {found} while parsing {}", .expected.description())]
    FrameMismatch {
        expected: FrameKind,
        found: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}, {loc}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub loc: Loc,
}

impl ParseError {
    #[cold]
    pub fn new(kind: ParseErrorKind, loc: Loc) -> Self {
        ParseError { kind, loc }
    }
}

/// Failure of [`crate::parse_source`]: either stage of the front end.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl SourceError {
    pub fn loc(&self) -> &Loc {
        match self {
            SourceError::Lex(e) => e.loc(),
            SourceError::Parse(e) => &e.loc,
        }
    }
}
