//! Binary and unary operators on native values.
//!
//! Dispatch is a `match` on the operand pair. Class instances never reach
//! this module: the interpreter handles identity and `instanceof` for them
//! and routes everything else to `__opname__` methods. `&&`/`||` are decided
//! by [`short_circuit`] before the right operand is evaluated.

use spl_ir::BinaryOp;

use crate::errors::{self, EvalError, EvalResult};
use crate::value::Value;

#[inline]
fn checked_arith(result: Option<i64>, op_name: &'static str) -> EvalResult {
    result.map(Value::Int).ok_or_else(|| errors::integer_overflow(op_name))
}

/// Integer division rounding toward negative infinity.
fn floor_div(a: i64, b: i64) -> EvalResult {
    if b == 0 {
        return Err(errors::division_by_zero());
    }
    let q = a
        .checked_div(b)
        .ok_or_else(|| errors::integer_overflow("division"))?;
    if a % b != 0 && ((a < 0) != (b < 0)) {
        Ok(Value::Int(q - 1))
    } else {
        Ok(Value::Int(q))
    }
}

/// Remainder carrying the sign of the divisor.
fn floor_mod(a: i64, b: i64) -> EvalResult {
    if b == 0 {
        return Err(errors::division_by_zero());
    }
    let r = a
        .checked_rem(b)
        .ok_or_else(|| errors::integer_overflow("remainder"))?;
    if r != 0 && ((r < 0) != (b < 0)) {
        Ok(Value::Int(r + b))
    } else {
        Ok(Value::Int(r))
    }
}

fn shift(a: i64, b: i64, op: BinaryOp) -> EvalResult {
    let amount = u32::try_from(b).ok().filter(|s| *s < 64);
    let result = amount.and_then(|s| match op {
        BinaryOp::Shl => a.checked_shl(s),
        _ => a.checked_shr(s),
    });
    result
        .map(Value::Int)
        .ok_or_else(|| errors::integer_overflow("shift"))
}

fn eval_int_binary(a: i64, b: i64, op: BinaryOp) -> Option<EvalResult> {
    Some(match op {
        BinaryOp::Add => checked_arith(a.checked_add(b), "addition"),
        BinaryOp::Sub => checked_arith(a.checked_sub(b), "subtraction"),
        BinaryOp::Mul => checked_arith(a.checked_mul(b), "multiplication"),
        BinaryOp::Div => floor_div(a, b),
        BinaryOp::Mod => floor_mod(a, b),
        BinaryOp::Eq => Ok(Value::Bool(a == b)),
        BinaryOp::NotEq => Ok(Value::Bool(a != b)),
        BinaryOp::Lt => Ok(Value::Bool(a < b)),
        BinaryOp::LtEq => Ok(Value::Bool(a <= b)),
        BinaryOp::Gt => Ok(Value::Bool(a > b)),
        BinaryOp::GtEq => Ok(Value::Bool(a >= b)),
        BinaryOp::BitAnd => Ok(Value::Int(a & b)),
        BinaryOp::BitOr => Ok(Value::Int(a | b)),
        BinaryOp::BitXor => Ok(Value::Int(a ^ b)),
        BinaryOp::Shl | BinaryOp::Shr => shift(a, b, op),
        _ => return None,
    })
}

#[expect(clippy::float_cmp, reason = "language-level float equality")]
fn eval_float_binary(a: f64, b: f64, op: BinaryOp) -> Option<EvalResult> {
    Some(match op {
        BinaryOp::Add => Ok(Value::Float(a + b)),
        BinaryOp::Sub => Ok(Value::Float(a - b)),
        BinaryOp::Mul => Ok(Value::Float(a * b)),
        BinaryOp::Div if b == 0.0 => Err(errors::division_by_zero()),
        BinaryOp::Div => Ok(Value::Float(a / b)),
        BinaryOp::Mod if b == 0.0 => Err(errors::division_by_zero()),
        BinaryOp::Mod => {
            let r = a % b;
            if r != 0.0 && ((r < 0.0) != (b < 0.0)) {
                Ok(Value::Float(r + b))
            } else {
                Ok(Value::Float(r))
            }
        }
        BinaryOp::Eq => Ok(Value::Bool(a == b)),
        BinaryOp::NotEq => Ok(Value::Bool(a != b)),
        BinaryOp::Lt => Ok(Value::Bool(a < b)),
        BinaryOp::LtEq => Ok(Value::Bool(a <= b)),
        BinaryOp::Gt => Ok(Value::Bool(a > b)),
        BinaryOp::GtEq => Ok(Value::Bool(a >= b)),
        _ => return None,
    })
}

fn eval_string_binary(a: &str, b: &str, op: BinaryOp) -> Option<EvalResult> {
    Some(match op {
        BinaryOp::Add => {
            let mut joined = String::with_capacity(a.len() + b.len());
            joined.push_str(a);
            joined.push_str(b);
            Ok(Value::str(&joined))
        }
        BinaryOp::Eq => Ok(Value::Bool(a == b)),
        BinaryOp::NotEq => Ok(Value::Bool(a != b)),
        _ => return None,
    })
}

/// Evaluate `left op right` for two non-instance values.
///
/// Identity (`===`, `!==`, `is`) and equality (`==`, `!=`) apply to every
/// type; arithmetic, comparison and bit operators only to the categories
/// that define them. Anything else is a Type fault naming both types.
pub fn evaluate_binary(left: &Value, right: &Value, op: BinaryOp) -> EvalResult {
    match op {
        BinaryOp::Identical | BinaryOp::Is => return Ok(Value::Bool(left.is_identical(right))),
        BinaryOp::NotIdentical => return Ok(Value::Bool(!left.is_identical(right))),
        _ => {}
    }

    let result = match (left, right) {
        (Value::Int(a), Value::Int(b)) => eval_int_binary(*a, *b, op),
        (Value::Str(a), Value::Str(b)) => eval_string_binary(a, b, op),
        (a, b) => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => eval_float_binary(x, y, op),
            _ => None,
        },
    };
    if let Some(result) = result {
        return result;
    }

    match op {
        BinaryOp::Eq => Ok(Value::Bool(left.equals(right))),
        BinaryOp::NotEq => Ok(Value::Bool(!left.equals(right))),
        _ => Err(errors::unsupported_operation(
            op.symbol(),
            left.type_name(),
            right.type_name(),
        )),
    }
}

/// Decide `&&` / `||` from the left operand alone.
///
/// `Ok(Some(v))` is the final result; `Ok(None)` means the result is the
/// right operand. Only null, boolean and numeric left operands are allowed.
pub fn short_circuit(op: BinaryOp, left: &Value) -> Result<Option<Value>, EvalError> {
    match left {
        Value::Null | Value::Undefined | Value::Bool(_) | Value::Int(_) | Value::Float(_) => {}
        other => return Err(errors::lazy_operand(op.symbol(), other.type_name())),
    }
    Ok(match (op, left.is_truthy()) {
        (BinaryOp::Or, true) => Some(Value::Bool(true)),
        (BinaryOp::And, false) => Some(Value::Bool(false)),
        _ => None,
    })
}

/// Arithmetic negation of a number.
pub fn negate(value: &Value) -> EvalResult {
    match value {
        Value::Int(v) => v
            .checked_neg()
            .map(Value::Int)
            .ok_or_else(|| errors::integer_overflow("negation")),
        Value::Float(v) => Ok(Value::Float(-v)),
        other => Err(errors::unsupported_unary("neg", other.type_name())),
    }
}

/// `target += delta` for `++` / `--`.
pub fn step_int(value: &Value, delta: i64) -> EvalResult {
    match value {
        Value::Int(v) => checked_arith(v.checked_add(delta), "increment"),
        other => Err(errors::type_mismatch("int", other.type_name())),
    }
}

#[cfg(test)]
mod tests;
