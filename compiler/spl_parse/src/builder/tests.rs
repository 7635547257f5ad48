use std::rc::Rc;

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;

fn loc() -> Loc {
    Loc::new(1, Rc::from("test.sp"))
}

fn finish(builder: AstBuilder) -> String {
    match builder.finish() {
        Ok(block) => block.to_string(),
        Err(e) => panic!("build failed: {e}"),
    }
}

#[test]
fn test_precedence_without_parens() {
    // 3 + 2 * 5 + 4
    let mut b = AstBuilder::default();
    b.add_int(loc(), 3);
    b.add_operator(loc(), BinaryOp::Add, 0, false);
    b.add_int(loc(), 2);
    b.add_operator(loc(), BinaryOp::Mul, 0, false);
    b.add_int(loc(), 5);
    b.add_operator(loc(), BinaryOp::Add, 0, false);
    b.add_int(loc(), 4);
    assert_eq!(finish(b), "{((3 + (2 * 5)) + 4)}");
}

#[test]
fn test_paren_extra_outranks_base_precedence() {
    // (3 + 2) * 5
    let mut b = AstBuilder::default();
    b.add_int(loc(), 3);
    b.add_operator(loc(), BinaryOp::Add, 1, false);
    b.add_int(loc(), 2);
    b.add_operator(loc(), BinaryOp::Mul, 0, false);
    b.add_int(loc(), 5);
    assert_eq!(finish(b), "{((3 + 2) * 5)}");
}

#[test]
fn test_chained_prefix_unaries() {
    let mut b = AstBuilder::default();
    b.add_unary(loc(), UnaryOp::Neg, 0);
    b.add_unary(loc(), UnaryOp::Neg, 0);
    b.add_name(loc(), "x");
    assert_eq!(finish(b), "{(neg (neg x))}");
}

#[test]
fn test_ternary_is_right_associative() {
    // c ? x : d ? y : z
    let mut b = AstBuilder::default();
    b.add_name(loc(), "c");
    b.add_ternary(loc(), 0);
    b.add_name(loc(), "x");
    assert!(b.finish_ternary(&loc()).is_ok());
    b.add_name(loc(), "d");
    b.add_ternary(loc(), 0);
    b.add_name(loc(), "y");
    assert!(b.finish_ternary(&loc()).is_ok());
    b.add_name(loc(), "z");
    assert_eq!(finish(b), "{(c ? x : (d ? y : z))}");
}

#[test]
fn test_var_assignment_absorbs_expression() {
    let mut b = AstBuilder::default();
    b.add_name(loc(), "x");
    assert!(b.add_assignment(loc(), AssignLevel::Var).is_ok());
    b.add_name(loc(), "a");
    b.add_dot(loc(), 0);
    b.add_name(loc(), "b");
    b.add_operator(loc(), BinaryOp::Sub, 0, false);
    b.add_int(loc(), 1);
    assert_eq!(finish(b), "{(var x = ((a.b) - 1))}");
}

#[test]
fn test_postfix_and_prefix_inc_dec() {
    let mut b = AstBuilder::default();
    b.add_name(loc(), "i");
    b.add_inc_dec(loc(), IncDecOp::Inc, false, 0);
    b.add_operator(loc(), BinaryOp::Add, 0, false);
    b.add_inc_dec(loc(), IncDecOp::Dec, true, 0);
    b.add_name(loc(), "j");
    assert_eq!(finish(b), "{((i++) + (--j))}");
}

#[test]
fn test_call_with_arguments() {
    let mut b = AstBuilder::default();
    b.add_name(loc(), "f");
    assert!(b.add_call(loc()).is_ok());
    assert_eq!(b.active_kind(), FrameKind::Call);
    b.add_int(loc(), 1);
    assert!(b.build_line().is_ok());
    b.add_name(loc(), "a");
    b.add_operator(loc(), BinaryOp::Mul, 0, false);
    b.add_int(loc(), 2);
    assert!(b.build_call().is_ok());
    assert_eq!(b.active_kind(), FrameKind::Root);
    assert_eq!(finish(b), "{f(1, (a * 2))}");
}

#[test]
fn test_if_else_with_blocks() {
    let mut b = AstBuilder::default();
    b.add_if(loc());
    b.add_name(loc(), "c");
    assert!(b.build_condition().is_ok());
    b.new_block(loc());
    b.add_int(loc(), 1);
    assert!(b.build_block().is_ok());
    b.new_block(loc());
    b.add_int(loc(), 2);
    assert!(b.build_block().is_ok());
    assert_eq!(finish(b), "{if {c} {1} else {2}}");
}

#[test]
fn test_try_catch_finally() {
    let mut b = AstBuilder::default();
    b.add_try(loc());
    b.new_block(loc());
    b.add_name(loc(), "risky");
    assert!(b.build_block().is_ok());
    b.add_catch(loc());
    b.add_name(loc(), "e");
    assert!(b.add_key_value(loc()).is_ok());
    b.add_name(loc(), "Exception");
    assert!(b.build_condition().is_ok());
    b.new_block(loc());
    assert!(b.build_block().is_ok());
    b.new_block(loc());
    b.add_name(loc(), "cleanup");
    assert!(b.build_block().is_ok());
    assert_eq!(
        finish(b),
        "{try {risky} catch {e: Exception} {} finally {cleanup}}"
    );
}

#[test]
fn test_class_gets_implicit_root() {
    let mut b = AstBuilder::default();
    b.add_class(loc(), "A", false, String::new());
    assert!(b.add_extends(&loc(), "B").is_ok());
    b.new_block(loc());
    assert!(b.build_block().is_ok());
    assert!(b.build_class().is_ok());
    assert_eq!(finish(b), "{class A extends B, Object {}}");
}

#[test]
fn test_root_class_does_not_extend_itself() {
    let mut b = AstBuilder::default();
    b.add_class(loc(), ROOT_CLASS, false, String::new());
    b.new_block(loc());
    assert!(b.build_block().is_ok());
    assert!(b.build_class().is_ok());
    assert_eq!(finish(b), "{class Object {}}");
}

#[test]
fn test_dict_literal() {
    let mut b = AstBuilder::default();
    b.add_dict(loc());
    b.add_literal(loc(), "a");
    assert!(b.add_key_value(loc()).is_ok());
    b.add_int(loc(), 1);
    assert!(b.build_dict().is_ok());
    assert_eq!(finish(b), "{dict{\"a\": 1}}");
}

#[test]
fn test_dict_rejects_bare_entries() {
    let mut b = AstBuilder::default();
    b.add_dict(loc());
    b.add_int(loc(), 1);
    let err = b.build_dict().err();
    assert_eq!(err.map(|e| e.kind), Some(ParseErrorKind::BadDictEntry));
}

#[test]
fn test_missing_operand_is_an_error() {
    let mut b = AstBuilder::default();
    b.add_int(loc(), 1);
    b.add_operator(loc(), BinaryOp::Add, 0, false);
    let err = b.finish().err();
    assert_eq!(
        err.map(|e| e.kind),
        Some(ParseErrorKind::MissingOperand("+".into()))
    );
}

#[test]
fn test_adjacent_operands_are_an_error() {
    let mut b = AstBuilder::default();
    b.add_int(loc(), 1);
    b.add_int(loc(), 2);
    assert!(matches!(
        b.finish().map_err(|e| e.kind),
        Err(ParseErrorKind::Unexpected(_))
    ));
}

#[test]
fn test_unclosed_frame_at_finish() {
    let mut b = AstBuilder::default();
    b.new_block(loc());
    assert_eq!(
        b.finish().map_err(|e| e.kind),
        Err(ParseErrorKind::UnexpectedEof(FrameKind::Block))
    );
}

#[test]
fn test_closing_wrong_frame() {
    let mut b = AstBuilder::default();
    b.new_block(loc());
    assert!(matches!(
        b.build_call().map_err(|e| e.kind),
        Err(ParseErrorKind::FrameMismatch {
            expected: FrameKind::Block,
            ..
        })
    ));
}

#[test]
fn test_bare_return() {
    let mut b = AstBuilder::default();
    b.add_unary(loc(), UnaryOp::Return, 0);
    assert_eq!(finish(b), "{(return)}");
}

/// Evaluate a resolved arithmetic tree.
fn eval(node: &Node) -> i64 {
    match &node.kind {
        NodeKind::Int(v) => *v,
        NodeKind::Binary {
            op,
            left: Some(l),
            right: Some(r),
            ..
        } => {
            let (l, r) = (eval(l), eval(r));
            match op {
                BinaryOp::Add => l + r,
                BinaryOp::Sub => l - r,
                BinaryOp::Mul => l * r,
                _ => unreachable!("only + - * are generated"),
            }
        }
        other => panic!("unexpected node {other:?}"),
    }
}

fn op_strategy() -> impl Strategy<Value = BinaryOp> {
    prop_oneof![
        Just(BinaryOp::Add),
        Just(BinaryOp::Sub),
        Just(BinaryOp::Mul)
    ]
}

proptest! {
    /// Flat arithmetic resolves with the usual precedence and left associativity.
    #[test]
    fn prop_flat_arithmetic_matches_reference(
        first in 0i64..20,
        rest in prop::collection::vec((op_strategy(), 0i64..20), 0..8),
    ) {
        let mut b = AstBuilder::default();
        b.add_int(loc(), first);
        for (op, v) in &rest {
            b.add_operator(loc(), *op, 0, false);
            b.add_int(loc(), *v);
        }
        let block = b.finish().map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(block.len(), 1);

        // Reference: fold products first, then sums left to right.
        let mut terms = vec![first];
        let mut signs = vec![1i64];
        for (op, v) in &rest {
            match op {
                BinaryOp::Mul => {
                    if let Some(last) = terms.last_mut() {
                        *last *= *v;
                    }
                }
                BinaryOp::Add => {
                    terms.push(*v);
                    signs.push(1);
                }
                _ => {
                    terms.push(*v);
                    signs.push(-1);
                }
            }
        }
        let expected: i64 = terms.iter().zip(&signs).map(|(t, s)| t * s).sum();
        prop_assert_eq!(eval(&block.lines[0]), expected);
    }
}
