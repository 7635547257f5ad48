use spl_ir::Loc;

/// Tokenizer failure. Always carries the offending line and file.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexError {
    #[error("unexpected character '{ch}', {loc}")]
    UnexpectedChar { ch: char, loc: Loc },
    #[error("unterminated string literal, {loc}")]
    UnterminatedString { loc: Loc },
    #[error("unterminated block comment, {loc}")]
    UnterminatedComment { loc: Loc },
    #[error("invalid number literal '{text}', {loc}")]
    InvalidNumber { text: String, loc: Loc },
    #[error("unknown escape sequence '\\{ch}', {loc}")]
    UnknownEscape { ch: char, loc: Loc },
}

impl LexError {
    pub fn loc(&self) -> &Loc {
        match self {
            LexError::UnexpectedChar { loc, .. }
            | LexError::UnterminatedString { loc }
            | LexError::UnterminatedComment { loc }
            | LexError::InvalidNumber { loc, .. }
            | LexError::UnknownEscape { loc, .. } => loc,
        }
    }
}
