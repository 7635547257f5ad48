//! Incremental AST builder.
//!
//! The builder receives one call per token from the driver and keeps
//! partially built nodes on a stack. Each unfinished block, argument list,
//! parameter list, condition or dict literal gets its own [`Frame`]; every
//! `add_*` call targets the innermost frame. Closing a frame resolves its
//! pending line and hands the collected lines to the node waiting in the
//! parent frame.
//!
//! Expression structure is decided late: operators are pushed with empty
//! slots and only bound to their operands when a line ends (see
//! [`resolve`]).

mod resolve;

use std::rc::Rc;

use spl_ir::{
    AssignLevel, BinaryOp, Block, ClassDef, FuncDef, IncDecOp, Loc, Node, NodeKind, UnaryOp,
};

use crate::error::{FrameKind, ParseError, ParseErrorKind};

/// Name of the implicit root class every class extends.
pub const ROOT_CLASS: &str = "Object";

struct Frame {
    kind: FrameKind,
    loc: Loc,
    lines: Vec<Node>,
    stack: Vec<Node>,
    /// An operator was pushed since the last expression resolution.
    in_expr: bool,
    /// Ternaries still waiting for their `:`.
    open_ternaries: u32,
}

impl Frame {
    fn new(kind: FrameKind, loc: Loc) -> Self {
        Frame {
            kind,
            loc,
            lines: Vec::new(),
            stack: Vec::new(),
            in_expr: false,
            open_ternaries: 0,
        }
    }
}

pub struct AstBuilder {
    root: Frame,
    nested: Vec<Frame>,
}

impl Default for AstBuilder {
    fn default() -> Self {
        Self::new(Loc::internal())
    }
}

impl AstBuilder {
    pub fn new(loc: Loc) -> Self {
        AstBuilder {
            root: Frame::new(FrameKind::Root, loc),
            nested: Vec::new(),
        }
    }

    fn active(&mut self) -> &mut Frame {
        match self.nested.last_mut() {
            Some(frame) => frame,
            None => &mut self.root,
        }
    }

    fn active_ref(&self) -> &Frame {
        self.nested.last().unwrap_or(&self.root)
    }

    pub fn active_kind(&self) -> FrameKind {
        self.active_ref().kind
    }

    /// Number of frames open above the root.
    pub fn depth(&self) -> usize {
        self.nested.len()
    }

    pub fn is_in_ternary(&self) -> bool {
        self.active_ref().open_ternaries > 0
    }

    /// Last pending node of the innermost frame.
    pub fn top(&self) -> Option<&Node> {
        self.active_ref().stack.last()
    }

    fn push(&mut self, node: Node) {
        self.active().stack.push(node);
    }

    fn push_operator(&mut self, node: Node) {
        let frame = self.active();
        frame.in_expr = true;
        frame.stack.push(node);
    }

    fn pop_operand(&mut self, loc: &Loc, what: &str) -> Result<Node, ParseError> {
        self.active().stack.pop().ok_or_else(|| {
            ParseError::new(ParseErrorKind::MissingOperand(what.to_string()), loc.clone())
        })
    }

    fn open_frame(&mut self, kind: FrameKind, loc: Loc) {
        tracing::trace!(?kind, depth = self.nested.len() + 1, "open frame");
        self.nested.push(Frame::new(kind, loc));
    }

    /// Finish the innermost frame and return its lines.
    fn close_frame(&mut self, expected: FrameKind, found: &'static str) -> Result<Block, ParseError> {
        let kind = self.active_kind();
        if kind != expected || self.nested.is_empty() {
            let loc = self.active_ref().loc.clone();
            return Err(ParseError::new(
                ParseErrorKind::FrameMismatch {
                    expected: kind,
                    found,
                },
                loc,
            ));
        }
        self.build_line()?;
        let frame = match self.nested.pop() {
            Some(frame) => frame,
            None => return Err(ParseError::new(ParseErrorKind::Unmatched(found), self.root.loc.clone())),
        };
        tracing::trace!(?kind, depth = self.nested.len(), "close frame");
        Ok(Block::new(frame.lines))
    }

    /// Mutable access to the pending node right below the new frame's product.
    fn waiting_node(&mut self, what: &'static str) -> Result<&mut Node, ParseError> {
        let loc = self.active_ref().loc.clone();
        self.active()
            .stack
            .last_mut()
            .ok_or_else(|| ParseError::new(ParseErrorKind::Unexpected(what.to_string()), loc))
    }

    // ----- leaves -----

    pub fn add_name(&mut self, loc: Loc, name: &str) {
        self.push(Node::new(loc, NodeKind::Name(name.to_string())));
    }

    pub fn add_int(&mut self, loc: Loc, value: i64) {
        self.push(Node::new(loc, NodeKind::Int(value)));
    }

    pub fn add_float(&mut self, loc: Loc, value: f64) {
        self.push(Node::new(loc, NodeKind::Float(value)));
    }

    pub fn add_literal(&mut self, loc: Loc, text: &str) {
        self.push(Node::new(loc, NodeKind::Literal(text.to_string())));
    }

    pub fn add_bool(&mut self, loc: Loc, value: bool) {
        self.push(Node::new(loc, NodeKind::Bool(value)));
    }

    pub fn add_null(&mut self, loc: Loc) {
        self.push(Node::new(loc, NodeKind::Null));
    }

    pub fn add_break(&mut self, loc: Loc) {
        self.push(Node::new(loc, NodeKind::Break));
    }

    pub fn add_continue(&mut self, loc: Loc) {
        self.push(Node::new(loc, NodeKind::Continue));
    }

    pub fn add_undefined(&mut self, loc: Loc) {
        self.push(Node::new(loc, NodeKind::Undefined));
    }

    // ----- operators -----

    pub fn add_operator(&mut self, loc: Loc, op: BinaryOp, extra: u32, compound: bool) {
        self.push_operator(Node::new(
            loc,
            NodeKind::Binary {
                op,
                left: None,
                right: None,
                extra,
                compound,
            },
        ));
    }

    pub fn add_unary(&mut self, loc: Loc, op: UnaryOp, extra: u32) {
        self.push_operator(Node::new(
            loc,
            NodeKind::Unary {
                op,
                value: None,
                extra,
            },
        ));
    }

    pub fn add_inc_dec(&mut self, loc: Loc, op: IncDecOp, prefix: bool, extra: u32) {
        self.push_operator(Node::new(
            loc,
            NodeKind::IncDec {
                op,
                target: None,
                prefix,
                extra,
            },
        ));
    }

    pub fn add_ternary(&mut self, loc: Loc, extra: u32) {
        self.push_operator(Node::new(
            loc,
            NodeKind::Ternary {
                left: None,
                mid: None,
                right: None,
                extra,
            },
        ));
        self.active().open_ternaries += 1;
    }

    /// Record the `:` of the innermost open ternary.
    pub fn finish_ternary(&mut self, loc: &Loc) -> Result<(), ParseError> {
        let frame = self.active();
        if frame.open_ternaries == 0 {
            return Err(ParseError::new(
                ParseErrorKind::Unexpected("':'".to_string()),
                loc.clone(),
            ));
        }
        frame.open_ternaries -= 1;
        Ok(())
    }

    pub fn add_dot(&mut self, loc: Loc, extra: u32) {
        self.push_operator(Node::new(
            loc,
            NodeKind::Dot {
                left: None,
                right: None,
                extra,
            },
        ));
    }

    /// Turn the last pending node into the target of an assignment.
    ///
    /// The driver resolves the target expression first, so `a.b[c] = v`
    /// receives the whole member chain.
    pub fn add_assignment(&mut self, loc: Loc, level: AssignLevel) -> Result<(), ParseError> {
        let left = self.pop_operand(&loc, "=")?;
        self.push(Node::new(
            loc,
            NodeKind::Assignment {
                left: Box::new(left),
                right: None,
                level,
            },
        ));
        Ok(())
    }

    /// `key:` inside a dict literal or `binding:` inside a catch clause.
    pub fn add_key_value(&mut self, loc: Loc) -> Result<(), ParseError> {
        self.build_expr()?;
        let key = self.pop_operand(&loc, ":")?;
        self.push(Node::new(
            loc,
            NodeKind::KeyValue {
                key: Box::new(key),
                value: None,
            },
        ));
        Ok(())
    }

    // ----- calls -----

    /// Wrap the last pending node as a callee and open its argument frame.
    pub fn add_call(&mut self, loc: Loc) -> Result<(), ParseError> {
        let callee = self.pop_operand(&loc, "(")?;
        self.push(Node::new(
            loc.clone(),
            NodeKind::Call {
                callee: Box::new(callee),
                args: None,
            },
        ));
        self.open_frame(FrameKind::Call, loc);
        Ok(())
    }

    pub fn build_call(&mut self) -> Result<(), ParseError> {
        let block = self.close_frame(FrameKind::Call, "')'")?;
        match &mut self.waiting_node("')'")?.kind {
            NodeKind::Call { args, .. } if args.is_none() => {
                *args = Some(block);
                Ok(())
            }
            _ => Err(self.unexpected("')'")),
        }
    }

    // ----- control flow -----

    pub fn add_if(&mut self, loc: Loc) {
        self.push(Node::new(
            loc.clone(),
            NodeKind::If {
                cond: None,
                then: None,
                otherwise: None,
            },
        ));
        self.open_frame(FrameKind::Condition, loc);
    }

    pub fn add_while(&mut self, loc: Loc) {
        self.push(Node::new(
            loc.clone(),
            NodeKind::While {
                cond: None,
                body: None,
            },
        ));
        self.open_frame(FrameKind::Condition, loc);
    }

    pub fn add_for_loop(&mut self, loc: Loc) {
        self.push(Node::new(
            loc.clone(),
            NodeKind::For {
                clauses: None,
                body: None,
            },
        ));
        self.open_frame(FrameKind::Condition, loc);
    }

    pub fn add_try(&mut self, loc: Loc) {
        self.push(Node::new(
            loc,
            NodeKind::Try {
                body: None,
                catches: Vec::new(),
                finally: None,
            },
        ));
    }

    pub fn add_catch(&mut self, loc: Loc) {
        self.push(Node::new(
            loc.clone(),
            NodeKind::Catch {
                cond: None,
                then: None,
            },
        ));
        self.open_frame(FrameKind::Condition, loc);
    }

    /// Close a condition frame and attach it to the waiting `if`, `while`,
    /// `for` or `catch`.
    pub fn build_condition(&mut self) -> Result<(), ParseError> {
        let block = self.close_frame(FrameKind::Condition, "')'")?;
        match &mut self.waiting_node("')'")?.kind {
            NodeKind::If { cond, .. }
            | NodeKind::While { cond, .. }
            | NodeKind::Catch { cond, .. }
            | NodeKind::For { clauses: cond, .. } => {
                *cond = Some(block);
                Ok(())
            }
            _ => Err(self.unexpected("')'")),
        }
    }

    pub fn new_block(&mut self, loc: Loc) {
        self.open_frame(FrameKind::Block, loc);
    }

    /// Close a block frame and push the finished block as a pending node.
    pub fn build_block(&mut self) -> Result<(), ParseError> {
        let loc = self.active_ref().loc.clone();
        let block = self.close_frame(FrameKind::Block, "'}'")?;
        self.push(Node::new(loc, NodeKind::Block(block)));
        Ok(())
    }

    // ----- functions and classes -----

    pub fn add_function(&mut self, loc: Loc, is_abstract: bool, tags: Vec<String>, doc: String) {
        self.push(Node::new(
            loc.clone(),
            NodeKind::FuncDef(Box::new(FuncDef {
                params: None,
                body: None,
                is_abstract,
                tags,
                doc,
            })),
        ));
        self.open_frame(FrameKind::Params, loc);
    }

    pub fn build_func_params(&mut self) -> Result<(), ParseError> {
        let block = self.close_frame(FrameKind::Params, "')'")?;
        match &mut self.waiting_node("')'")?.kind {
            NodeKind::FuncDef(def) if def.params.is_none() => {
                def.params = Some(block);
                Ok(())
            }
            _ => Err(self.unexpected("')'")),
        }
    }

    pub fn add_class(&mut self, loc: Loc, name: &str, is_abstract: bool, doc: String) {
        self.push(Node::new(
            loc,
            NodeKind::ClassDef(Box::new(ClassDef {
                name: name.to_string(),
                superclass_names: Vec::new(),
                body: None,
                is_abstract,
                doc,
            })),
        ));
    }

    pub fn add_extends(&mut self, loc: &Loc, superclass: &str) -> Result<(), ParseError> {
        match self.active().stack.last_mut().map(|n| &mut n.kind) {
            Some(NodeKind::ClassDef(def)) => {
                def.superclass_names.push(superclass.to_string());
                Ok(())
            }
            _ => Err(ParseError::new(
                ParseErrorKind::Unexpected("'extends'".to_string()),
                loc.clone(),
            )),
        }
    }

    /// Attach the just-built body block to the class below it and append
    /// the implicit root class.
    pub fn build_class(&mut self) -> Result<(), ParseError> {
        let loc = self.active_ref().loc.clone();
        let body = self.pop_operand(&loc, "class")?;
        match &mut self.waiting_node("'}'")?.kind {
            NodeKind::ClassDef(def) if def.body.is_none() => {
                if def.name != ROOT_CLASS && !def.superclass_names.iter().any(|s| s == ROOT_CLASS) {
                    def.superclass_names.push(ROOT_CLASS.to_string());
                }
                def.body = Some(Rc::new(body));
                Ok(())
            }
            _ => Err(self.unexpected("'}'")),
        }
    }

    pub fn add_class_new(&mut self, loc: Loc, name: &str) {
        self.push(Node::new(
            loc,
            NodeKind::ClassInit {
                name: name.to_string(),
            },
        ));
    }

    // ----- dict literals -----

    pub fn add_dict(&mut self, loc: Loc) {
        self.open_frame(FrameKind::Dict, loc);
    }

    pub fn build_dict(&mut self) -> Result<(), ParseError> {
        let loc = self.active_ref().loc.clone();
        let block = self.close_frame(FrameKind::Dict, "'}'")?;
        let mut entries = Vec::with_capacity(block.len());
        for line in block.lines {
            match &line.kind {
                NodeKind::KeyValue { value: Some(_), .. } => entries.push(line),
                _ => return Err(ParseError::new(ParseErrorKind::BadDictEntry, line.loc)),
            }
        }
        self.push(Node::new(loc, NodeKind::Dict { entries }));
        Ok(())
    }

    // ----- resolution -----

    /// Resolve the trailing expression of the active frame, if an operator
    /// was added since the last resolution.
    pub fn build_expr(&mut self) -> Result<(), ParseError> {
        let frame = self.active();
        if !frame.in_expr {
            return Ok(());
        }
        frame.in_expr = false;
        let start = frame
            .stack
            .iter()
            .rposition(|n| !n.is_expression_like())
            .map_or(0, |i| i + 1);
        if start == frame.stack.len() {
            return Ok(());
        }
        let suffix = frame.stack.split_off(start);
        let node = resolve::resolve(suffix)?;
        frame.stack.push(node);
        Ok(())
    }

    /// Resolve the active frame's pending nodes into one statement and
    /// append it to the frame's lines.
    pub fn build_line(&mut self) -> Result<(), ParseError> {
        self.build_expr()?;
        let frame = self.active();
        if frame.open_ternaries > 0 {
            let loc = frame.stack.last().map_or_else(|| frame.loc.clone(), |n| n.loc.clone());
            return Err(ParseError::new(
                ParseErrorKind::Expected {
                    expected: "':'",
                    after: "?".to_string(),
                },
                loc,
            ));
        }
        if let Some(line) = resolve::fold_line(&mut frame.stack)? {
            frame.lines.push(line);
        }
        Ok(())
    }

    /// Finish parsing and return the program block.
    pub fn finish(mut self) -> Result<Block, ParseError> {
        if let Some(open) = self.nested.last() {
            return Err(ParseError::new(
                ParseErrorKind::UnexpectedEof(open.kind),
                open.loc.clone(),
            ));
        }
        self.build_line()?;
        if !self.root.stack.is_empty() || self.root.in_expr {
            return Err(ParseError::new(
                ParseErrorKind::Unterminated,
                self.root.loc.clone(),
            ));
        }
        Ok(Block::new(self.root.lines))
    }

    #[cold]
    fn unexpected(&self, what: &str) -> ParseError {
        let frame = self.active_ref();
        let loc = frame.stack.last().map_or_else(|| frame.loc.clone(), |n| n.loc.clone());
        ParseError::new(ParseErrorKind::Unexpected(what.to_string()), loc)
    }
}

#[cfg(test)]
mod tests;
