//! Precedence resolution and line folding.
//!
//! [`resolve`] turns a flat run of operands and empty operator nodes into a
//! single expression by repeatedly binding the highest scoring operator to
//! its neighbours. [`fold_line`] then assembles statements (assignments,
//! control flow, function bodies) from what is left on a frame's stack.

use std::rc::Rc;

use spl_ir::{Loc, Node, NodeKind, UnaryOp};

use crate::error::{ParseError, ParseErrorKind};

/// Which neighbours an operator consumes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Arity {
    /// `i + 1`
    Right,
    /// `i - 1`
    Left,
    /// `i - 1` and `i + 1`
    Both,
    /// `i - 1`, `i + 1` and `i + 2`
    Ternary,
}

fn arity(node: &Node) -> Option<Arity> {
    match &node.kind {
        NodeKind::Unary { .. } => Some(Arity::Right),
        NodeKind::IncDec { prefix: true, .. } => Some(Arity::Right),
        NodeKind::IncDec { prefix: false, .. } => Some(Arity::Left),
        NodeKind::Binary { .. } | NodeKind::Dot { .. } => Some(Arity::Both),
        NodeKind::Ternary { .. } => Some(Arity::Ternary),
        _ => None,
    }
}

fn is_operand(nodes: &[Node], i: Option<usize>) -> bool {
    i.and_then(|i| nodes.get(i))
        .is_some_and(|n| n.pending_score().is_none())
}

/// A value-less `return` at the end of the run needs no operand.
fn is_bare_return(nodes: &[Node], i: usize) -> bool {
    i + 1 == nodes.len()
        && matches!(
            nodes[i].kind,
            NodeKind::Unary {
                op: UnaryOp::Return,
                value: None,
                ..
            }
        )
}

fn eligible(nodes: &[Node], i: usize) -> bool {
    let Some(arity) = arity(&nodes[i]) else {
        return false;
    };
    let left = i.checked_sub(1);
    match arity {
        Arity::Right => is_operand(nodes, Some(i + 1)),
        Arity::Left => is_operand(nodes, left),
        Arity::Both => is_operand(nodes, left) && is_operand(nodes, Some(i + 1)),
        Arity::Ternary => {
            is_operand(nodes, left)
                && is_operand(nodes, Some(i + 1))
                && is_operand(nodes, Some(i + 2))
        }
    }
}

/// Index of the next operator to bind.
///
/// Highest score wins. Ties keep the leftmost operator, except for
/// ternaries, which associate to the right.
fn select(nodes: &[Node]) -> Option<usize> {
    let mut best: Option<(usize, u32)> = None;
    for (i, node) in nodes.iter().enumerate() {
        let Some(score) = node.pending_score() else {
            continue;
        };
        if is_bare_return(nodes, i) || !eligible(nodes, i) {
            continue;
        }
        let better = match best {
            None => true,
            Some((_, top)) => {
                score > top || (score == top && matches!(node.kind, NodeKind::Ternary { .. }))
            }
        };
        if better {
            best = Some((i, score));
        }
    }
    best.map(|(i, _)| i)
}

fn take(nodes: &mut Vec<Node>, i: usize) -> Option<Box<Node>> {
    Some(Box::new(nodes.remove(i)))
}

/// Fill operator `i` from its neighbours. Returns the operator's new index.
fn bind(nodes: &mut Vec<Node>, i: usize) -> usize {
    let Some(arity) = arity(&nodes[i]) else {
        return i;
    };
    match arity {
        Arity::Right => {
            let operand = take(nodes, i + 1);
            match &mut nodes[i].kind {
                NodeKind::Unary { value, .. } => *value = operand,
                NodeKind::IncDec { target, .. } => *target = operand,
                _ => {}
            }
            i
        }
        Arity::Left => {
            let operand = take(nodes, i - 1);
            let i = i - 1;
            if let NodeKind::IncDec { target, .. } = &mut nodes[i].kind {
                *target = operand;
            }
            i
        }
        Arity::Both => {
            let rhs = take(nodes, i + 1);
            let lhs = take(nodes, i - 1);
            let i = i - 1;
            match &mut nodes[i].kind {
                NodeKind::Binary { left, right, .. } | NodeKind::Dot { left, right, .. } => {
                    *left = lhs;
                    *right = rhs;
                }
                _ => {}
            }
            i
        }
        Arity::Ternary => {
            let else_branch = take(nodes, i + 2);
            let then_branch = take(nodes, i + 1);
            let cond = take(nodes, i - 1);
            let i = i - 1;
            if let NodeKind::Ternary {
                left, mid, right, ..
            } = &mut nodes[i].kind
            {
                *left = cond;
                *mid = then_branch;
                *right = else_branch;
            }
            i
        }
    }
}

fn operator_text(node: &Node) -> String {
    match &node.kind {
        NodeKind::Binary { op, compound, .. } => {
            format!("{}{}", op.symbol(), if *compound { "=" } else { "" })
        }
        NodeKind::Unary { op, .. } => op.name().to_string(),
        NodeKind::IncDec { op, .. } => op.symbol().to_string(),
        NodeKind::Dot { .. } => ".".to_string(),
        NodeKind::Ternary { .. } => "?".to_string(),
        _ => format!("{:?}", node.tag()),
    }
}

/// Resolve a run of expression-like nodes into one expression.
pub(super) fn resolve(mut nodes: Vec<Node>) -> Result<Node, ParseError> {
    while let Some(i) = select(&nodes) {
        bind(&mut nodes, i);
    }
    if let Some(pending) = nodes
        .iter()
        .enumerate()
        .find(|(i, n)| n.pending_score().is_some() && !is_bare_return(&nodes, *i))
        .map(|(_, n)| n)
    {
        return Err(ParseError::new(
            ParseErrorKind::MissingOperand(operator_text(pending)),
            pending.loc.clone(),
        ));
    }
    let mut iter = nodes.into_iter();
    match (iter.next(), iter.next()) {
        (Some(node), None) => Ok(node),
        (Some(_), Some(extra)) => Err(unexpected(&extra)),
        (None, _) => Err(ParseError::new(
            ParseErrorKind::Unterminated,
            Loc::internal(),
        )),
    }
}

#[cold]
fn unexpected(node: &Node) -> ParseError {
    ParseError::new(
        ParseErrorKind::Unexpected(format!("'{node}'")),
        node.loc.clone(),
    )
}

#[cold]
fn expected_body(loc: &Loc, after: &str) -> ParseError {
    ParseError::new(
        ParseErrorKind::Expected {
            expected: "a body",
            after: after.to_string(),
        },
        loc.clone(),
    )
}

/// Take the first folded statement, failing with "expected a body after `after`".
fn first(lst: &mut Vec<Node>, loc: &Loc, after: &str) -> Result<Box<Node>, ParseError> {
    if lst.is_empty() {
        return Err(expected_body(loc, after));
    }
    Ok(Box::new(lst.remove(0)))
}

fn first_opt(lst: &mut Vec<Node>) -> Option<Box<Node>> {
    if lst.is_empty() {
        None
    } else {
        Some(Box::new(lst.remove(0)))
    }
}

/// Fold a frame's pending nodes into one statement, right to left.
///
/// Returns `None` for an empty stack.
pub(super) fn fold_line(stack: &mut Vec<Node>) -> Result<Option<Node>, ParseError> {
    let mut lst: Vec<Node> = Vec::new();
    while let Some(node) = stack.pop() {
        let Node { loc, kind } = node;
        let kind = match kind {
            NodeKind::Unary {
                op,
                value: None,
                extra,
            } => NodeKind::Unary {
                op,
                value: first_opt(&mut lst),
                extra,
            },
            NodeKind::Assignment {
                left,
                right: None,
                level,
            } => NodeKind::Assignment {
                left,
                right: Some(first(&mut lst, &loc, "=")?),
                level,
            },
            NodeKind::KeyValue { key, value: None } => NodeKind::KeyValue {
                key,
                value: Some(first(&mut lst, &loc, ":")?),
            },
            NodeKind::If {
                cond, then: None, ..
            } => {
                let then = Some(first(&mut lst, &loc, "if")?);
                NodeKind::If {
                    cond,
                    then,
                    otherwise: first_opt(&mut lst),
                }
            }
            NodeKind::While { cond, body: None } => NodeKind::While {
                cond,
                body: Some(first(&mut lst, &loc, "while")?),
            },
            NodeKind::For {
                clauses,
                body: None,
            } => NodeKind::For {
                clauses,
                body: Some(first(&mut lst, &loc, "for")?),
            },
            NodeKind::Catch { cond, then: None } => NodeKind::Catch {
                cond,
                then: Some(first(&mut lst, &loc, "catch")?),
            },
            NodeKind::FuncDef(mut def) if def.body.is_none() => {
                if lst.is_empty() {
                    if !def.is_abstract {
                        return Err(expected_body(&loc, "function"));
                    }
                } else {
                    def.body = Some(Rc::new(lst.remove(0)));
                }
                NodeKind::FuncDef(def)
            }
            NodeKind::Try { body: None, .. } => {
                let body = Some(first(&mut lst, &loc, "try")?);
                let mut catches = Vec::new();
                while lst
                    .first()
                    .is_some_and(|n| matches!(n.kind, NodeKind::Catch { .. }))
                {
                    catches.push(lst.remove(0));
                }
                let finally = if lst
                    .first()
                    .is_some_and(|n| matches!(n.kind, NodeKind::Block(_)))
                {
                    first_opt(&mut lst)
                } else {
                    None
                };
                NodeKind::Try {
                    body,
                    catches,
                    finally,
                }
            }
            // Complete nodes stay in place; an `if` to their left may
            // still claim them as its else branch.
            kind => kind,
        };
        lst.insert(0, Node::new(loc, kind));
    }
    let mut iter = lst.into_iter();
    let line = iter.next();
    if let Some(extra) = iter.next() {
        return Err(unexpected(&extra));
    }
    Ok(line)
}
