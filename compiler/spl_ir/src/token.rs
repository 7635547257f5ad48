//! Tokenizer output consumed by the parser.

use std::fmt;

use crate::Loc;

/// Reserved words. Identifier-shaped tokens outside this set are plain names.
pub const KEYWORDS: &[&str] = &[
    "abstract",
    "and",
    "assert",
    "break",
    "catch",
    "class",
    "const",
    "continue",
    "def",
    "else",
    "extends",
    "false",
    "finally",
    "for",
    "function",
    "if",
    "instanceof",
    "is",
    "new",
    "not",
    "null",
    "operator",
    "or",
    "return",
    "throw",
    "true",
    "try",
    "var",
    "while",
];

/// Punctuation and operator symbols, longest first so a greedy scan picks
/// `===` over `==` over `=`.
pub const SYMBOLS: &[&str] = &[
    "===", "!==", "<<=", ">>=", "==", "!=", ">=", "<=", "&&", "||", "<<", ">>", "+=", "-=", "*=",
    "/=", "%=", "&=", "^=", "|=", "++", "--", "+", "-", "*", "/", "%", "=", "<", ">", "!", "&",
    "|", "^", "~", "?", ":", ".", ",", "(", ")", "[", "]", "{", "}", "@",
];

#[inline]
pub fn is_keyword(text: &str) -> bool {
    KEYWORDS.contains(&text)
}

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub loc: Loc,
}

impl Token {
    #[inline]
    pub fn new(kind: TokenKind, loc: Loc) -> Self {
        Token { kind, loc }
    }

    /// Identifier or keyword text.
    pub fn ident(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Ident(text) => Some(text),
            _ => None,
        }
    }

    pub fn symbol(&self) -> Option<&'static str> {
        match self.kind {
            TokenKind::Symbol(sym) => Some(sym),
            _ => None,
        }
    }

    pub fn is_symbol(&self, sym: &str) -> bool {
        self.symbol() == Some(sym)
    }

    pub fn is_ident(&self, text: &str) -> bool {
        self.ident() == Some(text)
    }

    pub fn is_eol(&self) -> bool {
        matches!(self.kind, TokenKind::Eol)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    /// Identifier or keyword: `foo`, `while`.
    Ident(String),
    /// Operator or punctuation from [`SYMBOLS`].
    Symbol(&'static str),
    Int(i64),
    Float(f64),
    /// String literal with escapes already processed.
    Str(String),
    /// `/** ... */` payload, attached to the next function or class.
    Doc(String),
    /// Statement terminator: `;` or a significant newline.
    Eol,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Ident(text) => write!(f, "Ident({text})"),
            TokenKind::Symbol(sym) => write!(f, "Symbol({sym})"),
            TokenKind::Int(v) => write!(f, "Int({v})"),
            TokenKind::Float(v) => write!(f, "Float({v:?})"),
            TokenKind::Str(text) => write!(f, "Str({text:?})"),
            TokenKind::Doc(_) => f.write_str("Doc"),
            TokenKind::Eol => f.write_str("EOL"),
            TokenKind::Eof => f.write_str("EOF"),
        }
    }
}
