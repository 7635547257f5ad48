//! Pair (insertion-ordered map) methods.

use std::rc::Rc;

use super::helpers::require_args;
use super::NativeMethod;
use crate::environment::Environment;
use crate::errors::{self, EvalError, EvalResult};
use crate::interpreter::Interpreter;
use crate::value::{Pair, Value};

pub static METHODS: &[NativeMethod] = &[
    NativeMethod::new("__getitem__", get),
    NativeMethod::new("__setitem__", put),
    NativeMethod::new("contains", contains),
    NativeMethod::new("get", get),
    NativeMethod::new("keys", keys),
    NativeMethod::new("put", put),
    NativeMethod::new("size", size),
    NativeMethod::new("values", values),
];

fn receiver(value: &Value) -> Result<&Rc<Pair>, EvalError> {
    match value {
        Value::Pair(pair) => Ok(pair),
        other => Err(errors::type_mismatch("pair", other.type_name())),
    }
}

fn get(_: &mut Interpreter, this: &Value, args: Vec<Value>, _: Option<&Environment>) -> EvalResult {
    require_args("get", 1, args.len())?;
    let found = receiver(this)?.borrow().get(&args[0])?.cloned();
    found.ok_or_else(|| errors::key_not_found(&args[0].repr()))
}

fn put(_: &mut Interpreter, this: &Value, mut args: Vec<Value>, _: Option<&Environment>) -> EvalResult {
    require_args("put", 2, args.len())?;
    let value = args.pop().unwrap_or(Value::Null);
    let key = args.pop().unwrap_or(Value::Null);
    receiver(this)?.borrow_mut().insert(key, value.clone())?;
    Ok(value)
}

fn contains(_: &mut Interpreter, this: &Value, args: Vec<Value>, _: Option<&Environment>) -> EvalResult {
    require_args("contains", 1, args.len())?;
    Ok(Value::Bool(receiver(this)?.borrow().contains(&args[0])?))
}

fn size(_: &mut Interpreter, this: &Value, args: Vec<Value>, _: Option<&Environment>) -> EvalResult {
    require_args("size", 0, args.len())?;
    let len = receiver(this)?.borrow().len();
    Ok(Value::Int(i64::try_from(len).unwrap_or(i64::MAX)))
}

fn keys(_: &mut Interpreter, this: &Value, args: Vec<Value>, _: Option<&Environment>) -> EvalResult {
    require_args("keys", 0, args.len())?;
    Ok(Value::list(receiver(this)?.borrow().keys().cloned().collect()))
}

fn values(_: &mut Interpreter, this: &Value, args: Vec<Value>, _: Option<&Environment>) -> EvalResult {
    require_args("values", 0, args.len())?;
    Ok(Value::list(receiver(this)?.borrow().values().cloned().collect()))
}
