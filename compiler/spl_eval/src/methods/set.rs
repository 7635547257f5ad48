//! Set methods.

use std::rc::Rc;

use super::helpers::{iter_values, require_args};
use super::NativeMethod;
use crate::environment::Environment;
use crate::errors::{self, EvalError, EvalResult};
use crate::interpreter::Interpreter;
use crate::value::{Set, Value};

pub static METHODS: &[NativeMethod] = &[
    NativeMethod::new("add", add),
    NativeMethod::new("clear", clear),
    NativeMethod::new("contains", contains),
    NativeMethod::new("pop", pop),
    NativeMethod::new("size", size),
    NativeMethod::new("union", union),
    NativeMethod::new("update", update),
];

fn receiver(value: &Value) -> Result<&Rc<Set>, EvalError> {
    match value {
        Value::Set(set) => Ok(set),
        other => Err(errors::type_mismatch("set", other.type_name())),
    }
}

fn add(_: &mut Interpreter, this: &Value, mut args: Vec<Value>, _: Option<&Environment>) -> EvalResult {
    require_args("add", 1, args.len())?;
    let item = args.pop().unwrap_or(Value::Null);
    receiver(this)?.borrow_mut().insert(item, Value::Null)?;
    Ok(Value::Null)
}

fn contains(_: &mut Interpreter, this: &Value, args: Vec<Value>, _: Option<&Environment>) -> EvalResult {
    require_args("contains", 1, args.len())?;
    Ok(Value::Bool(receiver(this)?.borrow().contains(&args[0])?))
}

/// Remove and return the most recently added member.
fn pop(_: &mut Interpreter, this: &Value, args: Vec<Value>, _: Option<&Environment>) -> EvalResult {
    require_args("pop", 0, args.len())?;
    let popped = receiver(this)?.borrow_mut().pop_last();
    popped
        .map(|(k, _)| k)
        .ok_or_else(|| errors::illegal_operation("pop from an empty set"))
}

fn clear(_: &mut Interpreter, this: &Value, args: Vec<Value>, _: Option<&Environment>) -> EvalResult {
    require_args("clear", 0, args.len())?;
    receiver(this)?.borrow_mut().clear();
    Ok(Value::Null)
}

fn size(_: &mut Interpreter, this: &Value, args: Vec<Value>, _: Option<&Environment>) -> EvalResult {
    require_args("size", 0, args.len())?;
    let len = receiver(this)?.borrow().len();
    Ok(Value::Int(i64::try_from(len).unwrap_or(i64::MAX)))
}

/// New set holding the members of both.
fn union(_: &mut Interpreter, this: &Value, args: Vec<Value>, _: Option<&Environment>) -> EvalResult {
    require_args("union", 1, args.len())?;
    let mut members: Vec<Value> = receiver(this)?.borrow().keys().cloned().collect();
    members.extend(iter_values("union", &args[0])?);
    Ok(Value::Set(Rc::new(Set::from_values(members)?)))
}

/// Add every member of an iterable in place.
fn update(_: &mut Interpreter, this: &Value, args: Vec<Value>, _: Option<&Environment>) -> EvalResult {
    require_args("update", 1, args.len())?;
    let extra = iter_values("update", &args[0])?;
    let mut set = receiver(this)?.borrow_mut();
    for item in extra {
        set.insert(item, Value::Null)?;
    }
    Ok(Value::Null)
}
