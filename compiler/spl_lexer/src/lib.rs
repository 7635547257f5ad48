//! Tokenizer for SPL.
//!
//! Produces the flat token list the parser consumes: identifiers (keywords
//! included), symbols, numbers, string literals, doc comments, end-of-line
//! markers and a final end-of-file marker.
//!
//! # End of line
//!
//! `;` always ends a line. A newline ends a line only when
//! - the innermost open bracket is a `{` (or none is open),
//! - the previous token can end a statement, and
//! - the next significant text does not continue the statement
//!   (`else`, `catch`, `finally`, `extends`, `{` or a leading `.`).

mod cursor;
mod error;

use std::rc::Rc;

use spl_ir::{Loc, Token, TokenKind, SYMBOLS};

use cursor::{is_ident_continue, is_ident_start, Cursor};
pub use error::LexError;

/// Tokenize `source`, tagging every token with `file`.
pub fn tokenize(source: &str, file: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source, Rc::from(file)).run()
}

struct Lexer<'a> {
    cursor: Cursor<'a>,
    file: Rc<str>,
    tokens: Vec<Token>,
    /// Open `(`, `[` and `{` in nesting order.
    brackets: Vec<u8>,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str, file: Rc<str>) -> Self {
        Lexer {
            cursor: Cursor::new(source),
            file,
            tokens: Vec::new(),
            brackets: Vec::new(),
        }
    }

    fn loc(&self) -> Loc {
        Loc::new(self.cursor.line(), Rc::clone(&self.file))
    }

    fn push(&mut self, kind: TokenKind, line: u32) {
        let loc = Loc::new(line, Rc::clone(&self.file));
        self.tokens.push(Token::new(kind, loc));
    }

    fn run(mut self) -> Result<Vec<Token>, LexError> {
        loop {
            self.cursor.eat_blanks();
            if self.cursor.is_eof() {
                break;
            }
            let line = self.cursor.line();
            match self.cursor.current() {
                b'\n' => {
                    self.cursor.advance();
                    if self.newline_ends_statement() {
                        self.push(TokenKind::Eol, line);
                    }
                }
                b';' => {
                    self.cursor.advance();
                    self.push(TokenKind::Eol, line);
                }
                b'/' if self.cursor.peek() == b'/' => self.cursor.eat_until_newline(),
                b'/' if self.cursor.peek() == b'*' => self.comment(line)?,
                b'"' | b'\'' => self.string(line)?,
                b'0'..=b'9' => self.number(line)?,
                b if is_ident_start(b) => {
                    let start = self.cursor.pos();
                    self.cursor.eat_while(is_ident_continue);
                    let text = self.cursor.slice_from(start).to_string();
                    self.push(TokenKind::Ident(text), line);
                }
                _ => self.symbol(line)?,
            }
        }
        let line = self.cursor.line();
        if self.last_ends_statement() {
            self.push(TokenKind::Eol, line);
        }
        self.push(TokenKind::Eof, line);
        Ok(self.tokens)
    }

    fn comment(&mut self, line: u32) -> Result<(), LexError> {
        let start = self.cursor.pos();
        // `/**/` is an empty plain comment, `/** ...` a doc comment.
        let is_doc = self.cursor.peek2() == b'*' && !self.cursor.rest().starts_with("/**/");
        self.cursor.advance_n(2);
        if !self.cursor.eat_block_comment_body() {
            return Err(LexError::UnterminatedComment {
                loc: Loc::new(line, Rc::clone(&self.file)),
            });
        }
        if is_doc {
            let raw = self.cursor.slice_from(start);
            self.push(TokenKind::Doc(clean_doc(raw)), line);
        }
        Ok(())
    }

    fn string(&mut self, line: u32) -> Result<(), LexError> {
        let quote = self.cursor.current();
        self.cursor.advance();
        let mut text = String::new();
        loop {
            if self.cursor.is_eof() {
                return Err(LexError::UnterminatedString {
                    loc: Loc::new(line, Rc::clone(&self.file)),
                });
            }
            let b = self.cursor.current();
            if b == quote {
                self.cursor.advance();
                break;
            }
            if b == b'\\' {
                self.cursor.advance();
                let escaped = match self.cursor.current() {
                    b'n' => '\n',
                    b't' => '\t',
                    b'r' => '\r',
                    b'0' => '\0',
                    b'\\' => '\\',
                    b'\'' => '\'',
                    b'"' => '"',
                    _ => {
                        let ch = self.cursor.advance_char().unwrap_or('\\');
                        return Err(LexError::UnknownEscape {
                            ch,
                            loc: self.loc(),
                        });
                    }
                };
                self.cursor.advance();
                text.push(escaped);
                continue;
            }
            if let Some(ch) = self.cursor.advance_char() {
                text.push(ch);
            }
        }
        self.push(TokenKind::Str(text), line);
        Ok(())
    }

    fn number(&mut self, line: u32) -> Result<(), LexError> {
        let start = self.cursor.pos();
        self.cursor.eat_while(|b| b.is_ascii_digit());
        let is_float = self.cursor.current() == b'.' && self.cursor.peek().is_ascii_digit();
        if is_float {
            self.cursor.advance();
            self.cursor.eat_while(|b| b.is_ascii_digit());
        }
        let text = self.cursor.slice_from(start);
        let kind = if is_float {
            text.parse::<f64>().map(TokenKind::Float).ok()
        } else {
            text.parse::<i64>().map(TokenKind::Int).ok()
        };
        match kind {
            Some(kind) => {
                self.push(kind, line);
                Ok(())
            }
            None => Err(LexError::InvalidNumber {
                text: text.to_string(),
                loc: Loc::new(line, Rc::clone(&self.file)),
            }),
        }
    }

    fn symbol(&mut self, line: u32) -> Result<(), LexError> {
        let rest = self.cursor.rest();
        let Some(sym) = SYMBOLS.iter().copied().find(|s| rest.starts_with(s)) else {
            let ch = rest.chars().next().unwrap_or('\0');
            return Err(LexError::UnexpectedChar {
                ch,
                loc: self.loc(),
            });
        };
        self.cursor.advance_n(sym.len());
        match sym {
            "(" => self.brackets.push(b'('),
            "[" => self.brackets.push(b'['),
            "{" => self.brackets.push(b'{'),
            ")" | "]" | "}" => {
                self.brackets.pop();
            }
            _ => {}
        }
        self.push(TokenKind::Symbol(sym), line);
        Ok(())
    }

    fn last_ends_statement(&self) -> bool {
        let Some(last) = self.tokens.last() else {
            return false;
        };
        match &last.kind {
            TokenKind::Int(_) | TokenKind::Float(_) | TokenKind::Str(_) => true,
            TokenKind::Ident(text) => {
                !spl_ir::is_keyword(text)
                    || matches!(
                        text.as_str(),
                        "true" | "false" | "null" | "break" | "continue" | "return"
                    )
            }
            TokenKind::Symbol(sym) => matches!(*sym, ")" | "]" | "}" | "++" | "--"),
            TokenKind::Doc(_) | TokenKind::Eol | TokenKind::Eof => false,
        }
    }

    fn newline_ends_statement(&self) -> bool {
        if matches!(self.brackets.last(), Some(b'(' | b'[')) {
            return false;
        }
        if !self.last_ends_statement() {
            return false;
        }
        let (next, text) = self.cursor.peek_significant();
        match next {
            b'{' => false,
            b'.' => false,
            b if is_ident_start(b) => {
                let word_len = text
                    .bytes()
                    .position(|c| !is_ident_continue(c))
                    .unwrap_or(text.len());
                !matches!(&text[..word_len], "else" | "catch" | "finally" | "extends")
            }
            _ => true,
        }
    }
}

/// Strip the comment markers and leading `*` gutters of a doc comment.
fn clean_doc(raw: &str) -> String {
    let inner = raw
        .strip_prefix("/**")
        .and_then(|s| s.strip_suffix("*/"))
        .unwrap_or(raw);
    inner
        .lines()
        .map(|line| {
            let line = line.trim();
            line.strip_prefix('*').map_or(line, str::trim_start)
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
