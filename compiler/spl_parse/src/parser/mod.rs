//! Token driver for the incremental builder.
//!
//! Walks the token list once, left to right, translating each token into
//! builder calls. The driver owns everything the builder cannot know from
//! a single token: which kind of bracket is open, how many grouping
//! parentheses surround the current operator, whether a `{` starts a
//! block or a dict literal, and the sticky `var`/`const` level of a
//! declaration list.

use spl_ir::{AssignLevel, BinaryOp, IncDecOp, Loc, NodeKind, Token, TokenKind, UnaryOp};

use crate::builder::AstBuilder;
use crate::error::{FrameKind, ParseError, ParseErrorKind};

/// Kind of an open `(`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Paren {
    /// Grouping: raises the score of every operator inside.
    Group,
    Call,
    Params,
    /// `if (`, `while (`, `for (`, `catch (`
    Cond,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Bracket {
    /// `[a, b]` or `~[a, b]`
    List,
    /// `x[i]`
    Index,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Brace {
    Block,
    Class,
    Dict,
}

/// Keywords that start a block when directly followed by `{`.
const BLOCK_KEYWORDS: &[&str] = &["else", "try", "finally"];

/// Keywords after which a newline-free `}` keeps the statement open.
const CONTINUATION_KEYWORDS: &[&str] = &["else", "catch", "finally"];

pub struct Parser<'a> {
    tokens: &'a [Token],
    /// Index of the next unread token.
    pos: usize,
    builder: AstBuilder,
    parens: Vec<(Paren, Loc)>,
    brackets: Vec<(Bracket, Loc)>,
    braces: Vec<(Brace, Loc)>,
    /// Number of open grouping parentheses.
    extra: u32,
    /// Kind of the `)` most recently read.
    last_paren: Option<Paren>,
    /// Declaration level waiting for its `=`.
    var_level: Option<AssignLevel>,
    /// Declaration level of the current `var a, b = 1, c` list.
    decl_level: Option<AssignLevel>,
    class_pending: bool,
    pending_abstract: bool,
    tags: Vec<String>,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        let loc = tokens.first().map_or_else(Loc::internal, |t| t.loc.clone());
        Parser {
            tokens,
            pos: 0,
            builder: AstBuilder::new(loc),
            parens: Vec::new(),
            brackets: Vec::new(),
            braces: Vec::new(),
            extra: 0,
            last_paren: None,
            var_level: None,
            decl_level: None,
            class_pending: false,
            pending_abstract: false,
            tags: Vec::new(),
        }
    }

    // ----- cursor -----

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    /// Token before the one currently being processed.
    fn prev(&self) -> Option<&'a Token> {
        self.pos.checked_sub(2).and_then(|i| self.tokens.get(i))
    }

    fn next_is_symbol(&self, sym: &str) -> bool {
        self.peek().is_some_and(|t| t.is_symbol(sym))
    }

    fn next_is_ident(&self, words: &[&str]) -> bool {
        self.peek()
            .and_then(Token::ident)
            .is_some_and(|w| words.contains(&w))
    }

    /// Consume the `(` that must follow `after`.
    fn expect_open_paren(&mut self, after: &str, loc: &Loc) -> Result<(), ParseError> {
        if self.next_is_symbol("(") {
            self.pos += 1;
            return Ok(());
        }
        Err(ParseError::new(
            ParseErrorKind::Expected {
                expected: "'('",
                after: after.to_string(),
            },
            self.peek().map_or_else(|| loc.clone(), |t| t.loc.clone()),
        ))
    }

    /// Consume a plain identifier naming a `what`.
    fn expect_name(&mut self, what: &'static str, loc: &Loc) -> Result<String, ParseError> {
        match self.bump() {
            Some(Token {
                kind: TokenKind::Ident(name),
                ..
            }) if !spl_ir::is_keyword(name) => Ok(name.clone()),
            Some(token) => Err(ParseError::new(
                ParseErrorKind::IllegalName {
                    what,
                    name: token.kind.to_string(),
                },
                token.loc.clone(),
            )),
            None => Err(ParseError::new(
                ParseErrorKind::IllegalName {
                    what,
                    name: "EOF".to_string(),
                },
                loc.clone(),
            )),
        }
    }

    // ----- token context -----

    /// Whether the previous token ends an operand, so that `-`, `*` and
    /// `++` read as binary or postfix operators.
    fn after_operand(&self) -> bool {
        let Some(prev) = self.prev() else {
            return false;
        };
        match &prev.kind {
            TokenKind::Int(_) | TokenKind::Float(_) | TokenKind::Str(_) => true,
            TokenKind::Ident(word) => {
                !spl_ir::is_keyword(word) || matches!(word.as_str(), "true" | "false" | "null")
            }
            TokenKind::Symbol(sym) => matches!(*sym, ")" | "]" | "}" | "++" | "--"),
            TokenKind::Doc(_) | TokenKind::Eol | TokenKind::Eof => false,
        }
    }

    /// Whether a `(` read now applies a call to the preceding expression.
    fn opens_call(&self) -> bool {
        match self.prev().map(|t| &t.kind) {
            Some(TokenKind::Ident(word)) => !spl_ir::is_keyword(word),
            Some(TokenKind::Symbol("]")) => true,
            Some(TokenKind::Symbol(")")) => self.last_paren == Some(Paren::Call),
            _ => false,
        }
    }

    /// Whether a `[` read now indexes the preceding expression.
    fn opens_index(&self) -> bool {
        match self.prev().map(|t| &t.kind) {
            Some(TokenKind::Ident(word)) => !spl_ir::is_keyword(word),
            Some(TokenKind::Str(_)) => true,
            Some(TokenKind::Symbol(sym)) => matches!(*sym, ")" | "]"),
            _ => false,
        }
    }

    fn opens_block(&self) -> bool {
        if self.class_pending {
            return true;
        }
        match self.prev().map(|t| &t.kind) {
            // `;` lexes as Eol, so a clause inside `for (..)` still reads a dict.
            None | Some(TokenKind::Eol | TokenKind::Doc(_)) => self.at_statement_level(),
            Some(TokenKind::Symbol(sym)) => matches!(*sym, ")" | "}"),
            Some(TokenKind::Ident(word)) => {
                !spl_ir::is_keyword(word) || BLOCK_KEYWORDS.contains(&word.as_str())
            }
            _ => false,
        }
    }

    fn at_statement_level(&self) -> bool {
        matches!(
            self.builder.active_kind(),
            FrameKind::Root | FrameKind::Block
        )
    }

    /// Doc comment written before the definition at `self.pos - 1`,
    /// looking past `abstract`, `@Tag` and line ends.
    fn doc_before_definition(&self) -> String {
        let mut i = self.pos.saturating_sub(1);
        while i > 0 {
            i -= 1;
            let token = &self.tokens[i];
            match &token.kind {
                TokenKind::Doc(text) => return text.clone(),
                TokenKind::Eol | TokenKind::Symbol("@") => {}
                TokenKind::Ident(word) if word == "abstract" => {}
                TokenKind::Ident(_) if i > 0 && self.tokens[i - 1].is_symbol("@") => {}
                _ => break,
            }
        }
        String::new()
    }

    // ----- driver -----

    pub fn parse(mut self) -> Result<spl_ir::Block, ParseError> {
        while let Some(token) = self.bump() {
            let loc = token.loc.clone();
            match &token.kind {
                TokenKind::Eof => break,
                TokenKind::Eol => self.end_of_line(loc)?,
                TokenKind::Doc(_) => {}
                TokenKind::Int(v) => self.builder.add_int(loc, *v),
                TokenKind::Float(v) => self.builder.add_float(loc, *v),
                TokenKind::Str(text) => self.builder.add_literal(loc, text),
                TokenKind::Ident(word) if spl_ir::is_keyword(word) => self.keyword(word, loc)?,
                TokenKind::Ident(name) => self.builder.add_name(loc, name),
                TokenKind::Symbol(sym) => self.symbol(*sym, loc)?,
            }
        }
        self.finish()
    }

    fn finish(mut self) -> Result<spl_ir::Block, ParseError> {
        if let Some((_, loc)) = self.parens.pop() {
            return Err(ParseError::new(ParseErrorKind::Unmatched("("), loc));
        }
        if let Some((_, loc)) = self.brackets.pop() {
            return Err(ParseError::new(ParseErrorKind::Unmatched("["), loc));
        }
        if let Some((_, loc)) = self.braces.pop() {
            return Err(ParseError::new(ParseErrorKind::Unmatched("{"), loc));
        }
        if self.pending_abstract {
            let loc = self.tokens.last().map_or_else(Loc::internal, |t| t.loc.clone());
            return Err(ParseError::new(ParseErrorKind::MisplacedAbstract, loc));
        }
        self.builder.finish()
    }

    /// Turn a trailing bare name of a `var`/`const` list into a declaration
    /// without initializer.
    fn declare_pending(&mut self, loc: &Loc) -> Result<(), ParseError> {
        let Some(level) = self.var_level else {
            return Ok(());
        };
        if matches!(self.builder.top().map(|n| &n.kind), Some(NodeKind::Name(_))) {
            self.builder.add_assignment(loc.clone(), level)?;
            self.builder.add_undefined(loc.clone());
        }
        Ok(())
    }

    fn end_of_line(&mut self, loc: Loc) -> Result<(), ParseError> {
        self.declare_pending(&loc)?;
        self.builder.build_line()?;
        self.var_level = None;
        self.decl_level = None;
        Ok(())
    }

    fn keyword(&mut self, word: &str, loc: Loc) -> Result<(), ParseError> {
        match word {
            "true" => self.builder.add_bool(loc, true),
            "false" => self.builder.add_bool(loc, false),
            "null" => self.builder.add_null(loc),
            "break" => self.builder.add_break(loc),
            "continue" => self.builder.add_continue(loc),
            "return" => self.builder.add_unary(loc, UnaryOp::Return, self.extra),
            "throw" => self.builder.add_unary(loc, UnaryOp::Throw, self.extra),
            "assert" => self.builder.add_unary(loc, UnaryOp::Assert, self.extra),
            "not" => self.builder.add_unary(loc, UnaryOp::Not, self.extra),
            "and" | "or" | "is" | "instanceof" => {
                if let Some(op) = BinaryOp::from_symbol(word) {
                    self.builder.add_operator(loc, op, self.extra, false);
                }
            }
            "var" => {
                self.var_level = Some(AssignLevel::Var);
                self.decl_level = self.var_level;
            }
            "const" => {
                self.var_level = Some(AssignLevel::Const);
                self.decl_level = self.var_level;
            }
            "if" => {
                self.expect_open_paren(word, &loc)?;
                self.builder.add_if(loc.clone());
                self.parens.push((Paren::Cond, loc));
            }
            "while" => {
                self.expect_open_paren(word, &loc)?;
                self.builder.add_while(loc.clone());
                self.parens.push((Paren::Cond, loc));
            }
            "for" => {
                self.expect_open_paren(word, &loc)?;
                self.builder.add_for_loop(loc.clone());
                self.parens.push((Paren::Cond, loc));
            }
            "catch" => {
                self.expect_open_paren(word, &loc)?;
                self.builder.add_catch(loc.clone());
                self.parens.push((Paren::Cond, loc));
            }
            "else" => self.builder.build_expr()?,
            "try" => self.builder.add_try(loc),
            "finally" => {}
            "function" | "def" => self.function(loc)?,
            "class" => {
                let doc = self.doc_before_definition();
                let name = self.expect_name("class", &loc)?;
                let is_abstract = std::mem::take(&mut self.pending_abstract);
                self.tags.clear();
                self.builder.add_class(loc, &name, is_abstract, doc);
                self.class_pending = true;
            }
            "extends" => loop {
                let name = self.expect_name("class", &loc)?;
                self.builder.add_extends(&loc, &name)?;
                if !self.next_is_symbol(",") {
                    break;
                }
                self.pos += 1;
            },
            "abstract" => {
                if !self.next_is_ident(&["function", "def", "class"]) {
                    return Err(ParseError::new(ParseErrorKind::MisplacedAbstract, loc));
                }
                self.pending_abstract = true;
            }
            "new" => {
                let name = self.expect_name("class", &loc)?;
                self.builder.add_class_new(loc, &name);
            }
            _ => {
                return Err(ParseError::new(
                    ParseErrorKind::Unexpected(format!("'{word}'")),
                    loc,
                ))
            }
        }
        Ok(())
    }

    fn function(&mut self, loc: Loc) -> Result<(), ParseError> {
        let doc = self.doc_before_definition();
        if !self.next_is_symbol("(") {
            let name = if self.next_is_ident(&["operator"]) {
                self.pos += 1;
                self.operator_name(&loc)?
            } else {
                self.expect_name("function", &loc)?
            };
            self.builder.add_name(loc.clone(), &name);
            self.builder.add_assignment(loc.clone(), AssignLevel::FuncDefine)?;
        }
        self.expect_open_paren("function", &loc)?;
        let is_abstract = std::mem::take(&mut self.pending_abstract);
        let tags = std::mem::take(&mut self.tags);
        self.builder.add_function(loc.clone(), is_abstract, tags, doc);
        self.parens.push((Paren::Params, loc));
        Ok(())
    }

    /// `operator <sym>` names the overloading method of `<sym>`.
    fn operator_name(&mut self, loc: &Loc) -> Result<String, ParseError> {
        let token = self.bump();
        let dunder = token
            .and_then(Token::symbol)
            .and_then(BinaryOp::from_symbol)
            .and_then(BinaryOp::dunder);
        match dunder {
            Some(name) => Ok(name.to_string()),
            None => Err(ParseError::new(
                ParseErrorKind::IllegalName {
                    what: "operator",
                    name: token.map_or_else(|| "EOF".to_string(), |t| t.kind.to_string()),
                },
                token.map_or_else(|| loc.clone(), |t| t.loc.clone()),
            )),
        }
    }

    fn symbol(&mut self, sym: &'static str, loc: Loc) -> Result<(), ParseError> {
        match sym {
            "(" => self.open_paren(loc),
            ")" => self.close_paren(loc),
            "[" => self.open_bracket(loc),
            "]" => self.close_bracket(loc),
            "{" => self.open_brace(loc),
            "}" => self.close_brace(loc),
            "," => self.comma(loc),
            "=" => {
                self.builder.build_expr()?;
                let level = self.var_level.take().unwrap_or(AssignLevel::Assign);
                self.builder.add_assignment(loc, level)
            }
            "?" => {
                self.builder.add_ternary(loc, self.extra);
                Ok(())
            }
            ":" => {
                if self.builder.is_in_ternary() {
                    self.builder.finish_ternary(&loc)
                } else {
                    self.builder.add_key_value(loc)
                }
            }
            "." => {
                self.builder.add_dot(loc, self.extra);
                Ok(())
            }
            "~" => {
                if self.next_is_symbol("[") {
                    Ok(())
                } else {
                    Err(ParseError::new(
                        ParseErrorKind::Expected {
                            expected: "'['",
                            after: "~".to_string(),
                        },
                        loc,
                    ))
                }
            }
            "@" => {
                let tag = self.expect_name("tag", &loc)?;
                self.tags.push(tag);
                Ok(())
            }
            "++" | "--" => {
                if let Some(op) = IncDecOp::from_symbol(sym) {
                    let prefix = !self.after_operand();
                    self.builder.add_inc_dec(loc, op, prefix, self.extra);
                }
                Ok(())
            }
            "!" => {
                self.builder.add_unary(loc, UnaryOp::Not, self.extra);
                Ok(())
            }
            "-" if !self.after_operand() => {
                self.builder.add_unary(loc, UnaryOp::Neg, self.extra);
                Ok(())
            }
            "+" if !self.after_operand() => Ok(()),
            "*" if !self.after_operand() => {
                let op = if self.next_is_symbol("*") {
                    self.pos += 1;
                    UnaryOp::KwUnpack
                } else {
                    UnaryOp::Unpack
                };
                self.builder.add_unary(loc, op, self.extra);
                Ok(())
            }
            _ => {
                if let Some(op) = BinaryOp::from_symbol(sym) {
                    self.builder.add_operator(loc, op, self.extra, false);
                    Ok(())
                } else if let Some(op) = BinaryOp::from_compound(sym) {
                    self.builder.add_operator(loc, op, self.extra, true);
                    Ok(())
                } else {
                    Err(ParseError::new(
                        ParseErrorKind::Unexpected(format!("'{sym}'")),
                        loc,
                    ))
                }
            }
        }
    }

    fn open_paren(&mut self, loc: Loc) -> Result<(), ParseError> {
        if self.opens_call() {
            self.builder.add_call(loc.clone())?;
            self.parens.push((Paren::Call, loc));
        } else {
            self.extra += 1;
            self.parens.push((Paren::Group, loc));
        }
        Ok(())
    }

    fn close_paren(&mut self, loc: Loc) -> Result<(), ParseError> {
        let Some((kind, _)) = self.parens.pop() else {
            return Err(ParseError::new(ParseErrorKind::Unmatched(")"), loc));
        };
        self.last_paren = Some(kind);
        match kind {
            Paren::Group => {
                self.extra = self.extra.saturating_sub(1);
                Ok(())
            }
            Paren::Call => {
                self.declare_pending(&loc)?;
                self.builder.build_call()
            }
            Paren::Params => self.builder.build_func_params(),
            Paren::Cond => {
                self.declare_pending(&loc)?;
                self.var_level = None;
                self.decl_level = None;
                self.builder.build_condition()
            }
        }
    }

    fn open_bracket(&mut self, loc: Loc) -> Result<(), ParseError> {
        let list_name = match self.prev().map(|t| &t.kind) {
            Some(TokenKind::Symbol("~")) => Some("i_list"),
            _ if self.opens_index() => None,
            _ => Some("list"),
        };
        match list_name {
            Some(name) => {
                self.builder.add_name(loc.clone(), name);
                self.builder.add_call(loc.clone())?;
                self.brackets.push((Bracket::List, loc));
            }
            None => {
                self.builder.add_dot(loc.clone(), self.extra);
                self.builder.add_name(loc.clone(), "__getitem__");
                self.builder.add_call(loc.clone())?;
                self.brackets.push((Bracket::Index, loc));
            }
        }
        Ok(())
    }

    fn close_bracket(&mut self, loc: Loc) -> Result<(), ParseError> {
        if self.brackets.pop().is_none() {
            return Err(ParseError::new(ParseErrorKind::Unmatched("]"), loc));
        }
        self.builder.build_call()
    }

    fn open_brace(&mut self, loc: Loc) -> Result<(), ParseError> {
        if self.opens_block() {
            let kind = if std::mem::take(&mut self.class_pending) {
                Brace::Class
            } else {
                Brace::Block
            };
            self.builder.build_expr()?;
            self.var_level = None;
            self.decl_level = None;
            self.builder.new_block(loc.clone());
            self.braces.push((kind, loc));
        } else {
            self.builder.add_dict(loc.clone());
            self.braces.push((Brace::Dict, loc));
        }
        Ok(())
    }

    fn close_brace(&mut self, loc: Loc) -> Result<(), ParseError> {
        let Some((kind, _)) = self.braces.pop() else {
            return Err(ParseError::new(ParseErrorKind::Unmatched("}"), loc));
        };
        match kind {
            Brace::Dict => return self.builder.build_dict(),
            Brace::Block => {
                self.declare_pending(&loc)?;
                self.var_level = None;
                self.decl_level = None;
                self.builder.build_block()?;
            }
            Brace::Class => {
                self.declare_pending(&loc)?;
                self.var_level = None;
                self.decl_level = None;
                self.builder.build_block()?;
                self.builder.build_class()?;
            }
        }
        if !self.next_is_ident(CONTINUATION_KEYWORDS) {
            self.builder.build_line()?;
        }
        Ok(())
    }

    fn comma(&mut self, loc: Loc) -> Result<(), ParseError> {
        if self.at_statement_level() {
            let level = self.decl_level;
            self.declare_pending(&loc)?;
            self.builder.build_line()?;
            self.var_level = level;
        } else {
            self.builder.build_line()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
