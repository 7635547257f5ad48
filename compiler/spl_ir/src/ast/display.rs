//! Compact parenthesized rendering of the tree, used by `spl parse` and by
//! parser tests to compare shapes.

use std::fmt::{self, Write};

use super::{AssignLevel, Block, Node, NodeKind, Slot};

fn slot(f: &mut fmt::Formatter<'_>, node: &Slot) -> fmt::Result {
    match node {
        Some(n) => write!(f, "{n}"),
        None => f.write_char('_'),
    }
}

fn opt_block(f: &mut fmt::Formatter<'_>, block: Option<&Block>) -> fmt::Result {
    match block {
        Some(b) => write!(f, "{b}"),
        None => f.write_char('_'),
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('{')?;
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{line}")?;
        }
        f.write_char('}')
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            NodeKind::Int(v) => write!(f, "{v}"),
            NodeKind::Float(v) => write!(f, "{v:?}"),
            NodeKind::Literal(text) => write!(f, "{text:?}"),
            NodeKind::Name(name) => f.write_str(name),
            NodeKind::Bool(v) => write!(f, "{v}"),
            NodeKind::Null => f.write_str("null"),
            NodeKind::Break => f.write_str("break"),
            NodeKind::Continue => f.write_str("continue"),
            NodeKind::Undefined => f.write_str("undefined"),
            NodeKind::Assignment { left, right, level } => {
                f.write_char('(')?;
                match level {
                    AssignLevel::Assign => {}
                    AssignLevel::Const => f.write_str("const ")?,
                    AssignLevel::Var => f.write_str("var ")?,
                    AssignLevel::FuncDefine => f.write_str("fn ")?,
                }
                write!(f, "{left} = ")?;
                slot(f, right)?;
                f.write_char(')')
            }
            NodeKind::Dot { left, right, .. } => {
                f.write_char('(')?;
                slot(f, left)?;
                f.write_char('.')?;
                slot(f, right)?;
                f.write_char(')')
            }
            NodeKind::Binary {
                op,
                left,
                right,
                compound,
                ..
            } => {
                f.write_char('(')?;
                slot(f, left)?;
                write!(f, " {op}{} ", if *compound { "=" } else { "" })?;
                slot(f, right)?;
                f.write_char(')')
            }
            NodeKind::Unary { op, value, .. } => {
                write!(f, "({op}")?;
                if value.is_some() {
                    f.write_char(' ')?;
                    slot(f, value)?;
                }
                f.write_char(')')
            }
            NodeKind::IncDec {
                op, target, prefix, ..
            } => {
                f.write_char('(')?;
                if *prefix {
                    f.write_str(op.symbol())?;
                    slot(f, target)?;
                } else {
                    slot(f, target)?;
                    f.write_str(op.symbol())?;
                }
                f.write_char(')')
            }
            NodeKind::Ternary {
                left, mid, right, ..
            } => {
                f.write_char('(')?;
                slot(f, left)?;
                f.write_str(" ? ")?;
                slot(f, mid)?;
                f.write_str(" : ")?;
                slot(f, right)?;
                f.write_char(')')
            }
            NodeKind::Block(block) => write!(f, "{block}"),
            NodeKind::If {
                cond,
                then,
                otherwise,
            } => {
                f.write_str("if ")?;
                opt_block(f, cond.as_ref())?;
                f.write_char(' ')?;
                slot(f, then)?;
                if otherwise.is_some() {
                    f.write_str(" else ")?;
                    slot(f, otherwise)?;
                }
                Ok(())
            }
            NodeKind::While { cond, body } => {
                f.write_str("while ")?;
                opt_block(f, cond.as_ref())?;
                f.write_char(' ')?;
                slot(f, body)
            }
            NodeKind::For { clauses, body } => {
                f.write_str("for ")?;
                opt_block(f, clauses.as_ref())?;
                f.write_char(' ')?;
                slot(f, body)
            }
            NodeKind::FuncDef(def) => {
                if def.is_abstract {
                    f.write_str("abstract ")?;
                }
                f.write_str("function")?;
                opt_block(f, def.params.as_ref())?;
                match &def.body {
                    Some(body) => write!(f, " {body}"),
                    None => Ok(()),
                }
            }
            NodeKind::Call { callee, args } => {
                write!(f, "{callee}(")?;
                if let Some(args) = args {
                    for (i, arg) in args.lines.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                }
                f.write_char(')')
            }
            NodeKind::ClassDef(def) => {
                if def.is_abstract {
                    f.write_str("abstract ")?;
                }
                write!(f, "class {}", def.name)?;
                if !def.superclass_names.is_empty() {
                    write!(f, " extends {}", def.superclass_names.join(", "))?;
                }
                match &def.body {
                    Some(body) => write!(f, " {body}"),
                    None => Ok(()),
                }
            }
            NodeKind::ClassInit { name } => write!(f, "new {name}"),
            NodeKind::Try {
                body,
                catches,
                finally,
            } => {
                f.write_str("try ")?;
                slot(f, body)?;
                for catch in catches {
                    write!(f, " {catch}")?;
                }
                if finally.is_some() {
                    f.write_str(" finally ")?;
                    slot(f, finally)?;
                }
                Ok(())
            }
            NodeKind::Catch { cond, then } => {
                f.write_str("catch ")?;
                opt_block(f, cond.as_ref())?;
                f.write_char(' ')?;
                slot(f, then)
            }
            NodeKind::KeyValue { key, value } => {
                write!(f, "{key}: ")?;
                slot(f, value)
            }
            NodeKind::Dict { entries } => {
                f.write_str("dict{")?;
                for (i, entry) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{entry}")?;
                }
                f.write_char('}')
            }
        }
    }
}
