use pretty_assertions::assert_eq;

use super::*;
use crate::errors::EvalErrorKind;

fn ok(left: Value, right: Value, op: BinaryOp) -> Value {
    match evaluate_binary(&left, &right, op) {
        Ok(v) => v,
        Err(e) => panic!("{op} failed: {e}"),
    }
}

fn fault(left: Value, right: Value, op: BinaryOp) -> EvalErrorKind {
    match evaluate_binary(&left, &right, op) {
        Ok(v) => panic!("{op} unexpectedly gave {v}"),
        Err(e) => e.kind,
    }
}

#[test]
fn test_int_division_floors() {
    assert_eq!(ok(Value::Int(7), Value::Int(2), BinaryOp::Div), Value::Int(3));
    assert_eq!(ok(Value::Int(-7), Value::Int(2), BinaryOp::Div), Value::Int(-4));
    assert_eq!(ok(Value::Int(7), Value::Int(-2), BinaryOp::Div), Value::Int(-4));
    assert_eq!(ok(Value::Int(-8), Value::Int(2), BinaryOp::Div), Value::Int(-4));
}

#[test]
fn test_modulo_follows_divisor_sign() {
    assert_eq!(ok(Value::Int(7), Value::Int(3), BinaryOp::Mod), Value::Int(1));
    assert_eq!(ok(Value::Int(-7), Value::Int(3), BinaryOp::Mod), Value::Int(2));
    assert_eq!(ok(Value::Int(7), Value::Int(-3), BinaryOp::Mod), Value::Int(-2));
    assert_eq!(ok(Value::Float(-1.5), Value::Int(1), BinaryOp::Mod), Value::Float(0.5));
}

#[test]
fn test_arithmetic_faults() {
    assert!(matches!(
        fault(Value::Int(1), Value::Int(0), BinaryOp::Div),
        EvalErrorKind::Arithmetic
    ));
    assert!(matches!(
        fault(Value::Float(1.0), Value::Int(0), BinaryOp::Div),
        EvalErrorKind::Arithmetic
    ));
    assert!(matches!(
        fault(Value::Int(i64::MAX), Value::Int(1), BinaryOp::Add),
        EvalErrorKind::Arithmetic
    ));
    assert!(matches!(
        fault(Value::Int(1), Value::Int(64), BinaryOp::Shl),
        EvalErrorKind::Arithmetic
    ));
}

#[test]
fn test_mixed_numbers_promote() {
    assert_eq!(ok(Value::Int(1), Value::Float(0.5), BinaryOp::Add), Value::Float(1.5));
    assert_eq!(ok(Value::Int(1), Value::Float(1.0), BinaryOp::Eq), Value::Bool(true));
    assert_eq!(ok(Value::Int(1), Value::Float(1.0), BinaryOp::Identical), Value::Bool(false));
}

#[test]
fn test_strings() {
    assert_eq!(ok(Value::str("ab"), Value::str("cd"), BinaryOp::Add), Value::str("abcd"));
    assert_eq!(ok(Value::str("a"), Value::str("a"), BinaryOp::Identical), Value::Bool(true));
    assert!(matches!(
        fault(Value::str("a"), Value::str("b"), BinaryOp::Lt),
        EvalErrorKind::Type
    ));
}

#[test]
fn test_unsupported_names_both_types() {
    let err = evaluate_binary(&Value::Bool(true), &Value::Int(1), BinaryOp::Sub).err();
    assert_eq!(
        err.map(|e| e.message),
        Some("Unsupported operation '-' between boolean and int".to_string())
    );
}

#[test]
fn test_equality_across_types_is_false() {
    assert_eq!(ok(Value::Null, Value::Int(0), BinaryOp::Eq), Value::Bool(false));
    assert_eq!(ok(Value::Null, Value::Null, BinaryOp::Eq), Value::Bool(true));
    assert_eq!(
        ok(Value::list(vec![]), Value::list(vec![]), BinaryOp::NotEq),
        Value::Bool(false)
    );
}

#[test]
fn test_short_circuit_table() {
    let cases = [
        (BinaryOp::And, Value::Bool(true), None),
        (BinaryOp::And, Value::Int(0), Some(Value::Bool(false))),
        (BinaryOp::Or, Value::Float(2.0), Some(Value::Bool(true))),
        (BinaryOp::Or, Value::Null, None),
    ];
    for (op, left, expected) in cases {
        assert_eq!(short_circuit(op, &left).ok(), Some(expected));
    }
    assert!(short_circuit(BinaryOp::And, &Value::str("x")).is_err());
}

#[test]
fn test_negate_and_step() {
    assert_eq!(negate(&Value::Int(3)).ok(), Some(Value::Int(-3)));
    assert!(negate(&Value::Int(i64::MIN)).is_err());
    assert!(negate(&Value::str("a")).is_err());
    assert_eq!(step_int(&Value::Int(1), -1).ok(), Some(Value::Int(0)));
    assert!(step_int(&Value::Float(1.0), 1).is_err());
}
