//! Argument validation shared by the native method tables.

use crate::errors::{self, EvalError};
use crate::value::Value;

pub fn require_args(method: &str, expected: usize, actual: usize) -> Result<(), EvalError> {
    if actual == expected {
        Ok(())
    } else {
        Err(errors::arity_mismatch(method, expected, actual))
    }
}

/// Accept between `min` and `max` arguments inclusive.
pub fn require_arg_range(
    method: &str,
    min: usize,
    max: usize,
    actual: usize,
) -> Result<(), EvalError> {
    if (min..=max).contains(&actual) {
        Ok(())
    } else {
        Err(errors::argument_error(format!(
            "'{method}' expects {min} to {max} arguments, got {actual}"
        )))
    }
}

pub fn require_int_arg(method: &str, args: &[Value], index: usize) -> Result<i64, EvalError> {
    match args.get(index) {
        Some(Value::Int(v)) => Ok(*v),
        Some(other) => Err(arg_type(method, "int", other)),
        None => Err(errors::arity_mismatch(method, index + 1, args.len())),
    }
}

pub fn require_str_arg<'a>(
    method: &str,
    args: &'a [Value],
    index: usize,
) -> Result<&'a str, EvalError> {
    match args.get(index) {
        Some(Value::Str(s)) => Ok(s),
        Some(other) => Err(arg_type(method, "string", other)),
        None => Err(errors::arity_mismatch(method, index + 1, args.len())),
    }
}

/// Optional trailing int argument.
pub fn optional_int_arg(
    method: &str,
    args: &[Value],
    index: usize,
) -> Result<Option<i64>, EvalError> {
    match args.get(index) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Int(v)) => Ok(Some(*v)),
        Some(other) => Err(arg_type(method, "int", other)),
    }
}

#[cold]
fn arg_type(method: &str, expected: &str, got: &Value) -> EvalError {
    errors::type_mismatch(&format!("{expected} argument to '{method}'"), got.type_name())
}

/// Resolve a possibly negative index against `len`.
pub fn normalize_index(index: i64, len: usize) -> Result<usize, EvalError> {
    let signed_len = i64::try_from(len).unwrap_or(i64::MAX);
    let resolved = if index < 0 { index + signed_len } else { index };
    usize::try_from(resolved)
        .ok()
        .filter(|&i| i < len)
        .ok_or_else(|| errors::index_out_of_range(index, len))
}

/// Validate a `[from, to)` slice, `to` defaulting to `len`.
pub fn slice_bounds(
    what: &str,
    from: i64,
    to: Option<i64>,
    len: usize,
) -> Result<(usize, usize), EvalError> {
    let signed_len = i64::try_from(len).unwrap_or(i64::MAX);
    let to = to.unwrap_or(signed_len);
    if from < 0 || to > signed_len || from > to {
        return Err(errors::illegal_index(what, from, to, len));
    }
    // Both bounds are within 0..=len here.
    Ok((
        usize::try_from(from).unwrap_or_default(),
        usize::try_from(to).unwrap_or_default(),
    ))
}

/// Elements of any native iterable.
pub fn iter_values(method: &str, value: &Value) -> Result<Vec<Value>, EvalError> {
    Ok(match value {
        Value::List(list) => list.to_vec(),
        Value::Set(set) => set.borrow().keys().cloned().collect(),
        Value::Pair(pair) => pair.borrow().keys().cloned().collect(),
        Value::Str(s) => s.chars().map(|c| Value::str(c.encode_utf8(&mut [0; 4]))).collect(),
        other => return Err(arg_type(method, "iterable", other)),
    })
}
