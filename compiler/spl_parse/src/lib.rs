//! SPL parser.
//!
//! Tokens go through the [`parser::Parser`] driver, which feeds an
//! [`AstBuilder`]: an operator-precedence builder that keeps unfinished
//! nodes on per-frame stacks instead of recursing per grammar rule.

mod builder;
mod error;
mod parser;

use spl_ir::{Block, Token};

pub use builder::{AstBuilder, ROOT_CLASS};
pub use error::{FrameKind, ParseError, ParseErrorKind, SourceError};
pub use parser::Parser;

/// Parse a token list produced by `spl_lexer::tokenize`.
#[tracing::instrument(level = "debug", skip_all, fields(tokens = tokens.len()))]
pub fn parse_tokens(tokens: &[Token]) -> Result<Block, ParseError> {
    Parser::new(tokens).parse()
}

/// Tokenize and parse `source`.
#[tracing::instrument(level = "debug", skip(source))]
pub fn parse_source(source: &str, file: &str) -> Result<Block, SourceError> {
    let tokens = spl_lexer::tokenize(source, file)?;
    Ok(parse_tokens(&tokens)?)
}
