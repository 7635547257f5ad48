//! List methods. Mutators fail on lists created with `~[...]` or `i_list`.

use std::cmp::Ordering;
use std::rc::Rc;

use super::helpers::{
    iter_values, normalize_index, optional_int_arg, require_arg_range, require_args,
    require_int_arg, slice_bounds,
};
use super::NativeMethod;
use crate::environment::Environment;
use crate::errors::{self, EvalError, EvalResult};
use crate::interpreter::Interpreter;
use crate::value::{List, Value};

pub static METHODS: &[NativeMethod] = &[
    NativeMethod::new("__getitem__", get),
    NativeMethod::new("__setitem__", set),
    NativeMethod::new("append", append),
    NativeMethod::new("clear", clear),
    NativeMethod::new("contains", contains),
    NativeMethod::new("extend", extend),
    NativeMethod::new("get", get),
    NativeMethod::new("index_of", index_of),
    NativeMethod::new("insert", insert),
    NativeMethod::new("pop", pop),
    NativeMethod::new("reverse", reverse),
    NativeMethod::new("set", set),
    NativeMethod::new("size", size),
    NativeMethod::new("sort", sort),
    NativeMethod::new("sublist", sublist),
];

fn receiver(value: &Value) -> Result<&Rc<List>, EvalError> {
    match value {
        Value::List(list) => Ok(list),
        other => Err(errors::type_mismatch("list", other.type_name())),
    }
}

fn len_value(len: usize) -> Value {
    Value::Int(i64::try_from(len).unwrap_or(i64::MAX))
}

fn size(_: &mut Interpreter, this: &Value, args: Vec<Value>, _: Option<&Environment>) -> EvalResult {
    require_args("size", 0, args.len())?;
    Ok(len_value(receiver(this)?.len()))
}

fn get(_: &mut Interpreter, this: &Value, args: Vec<Value>, _: Option<&Environment>) -> EvalResult {
    require_args("get", 1, args.len())?;
    let list = receiver(this)?;
    let items = list.items();
    let i = normalize_index(require_int_arg("get", &args, 0)?, items.len())?;
    Ok(items[i].clone())
}

fn set(_: &mut Interpreter, this: &Value, mut args: Vec<Value>, _: Option<&Environment>) -> EvalResult {
    require_args("set", 2, args.len())?;
    let index = require_int_arg("set", &args, 0)?;
    let value = args.pop().unwrap_or(Value::Null);
    let mut items = receiver(this)?.items_mut()?;
    let i = normalize_index(index, items.len())?;
    items[i] = value.clone();
    Ok(value)
}

/// Returns the appended value.
fn append(_: &mut Interpreter, this: &Value, mut args: Vec<Value>, _: Option<&Environment>) -> EvalResult {
    require_args("append", 1, args.len())?;
    let value = args.pop().unwrap_or(Value::Null);
    receiver(this)?.items_mut()?.push(value.clone());
    Ok(value)
}

fn insert(_: &mut Interpreter, this: &Value, mut args: Vec<Value>, _: Option<&Environment>) -> EvalResult {
    require_args("insert", 2, args.len())?;
    let index = require_int_arg("insert", &args, 0)?;
    let value = args.pop().unwrap_or(Value::Null);
    let mut items = receiver(this)?.items_mut()?;
    // Inserting at `len` appends.
    let at = if index == i64::try_from(items.len()).unwrap_or(i64::MAX) {
        items.len()
    } else {
        normalize_index(index, items.len())?
    };
    items.insert(at, value);
    Ok(Value::Null)
}

/// `pop()` removes the last item, `pop(i)` the item at `i`.
fn pop(_: &mut Interpreter, this: &Value, args: Vec<Value>, _: Option<&Environment>) -> EvalResult {
    require_arg_range("pop", 0, 1, args.len())?;
    let index = optional_int_arg("pop", &args, 0)?.unwrap_or(-1);
    let mut items = receiver(this)?.items_mut()?;
    let i = normalize_index(index, items.len())?;
    Ok(items.remove(i))
}

fn clear(_: &mut Interpreter, this: &Value, args: Vec<Value>, _: Option<&Environment>) -> EvalResult {
    require_args("clear", 0, args.len())?;
    receiver(this)?.items_mut()?.clear();
    Ok(Value::Null)
}

fn extend(_: &mut Interpreter, this: &Value, args: Vec<Value>, _: Option<&Environment>) -> EvalResult {
    require_args("extend", 1, args.len())?;
    let extra = iter_values("extend", &args[0])?;
    receiver(this)?.items_mut()?.extend(extra);
    Ok(Value::Null)
}

fn contains(_: &mut Interpreter, this: &Value, args: Vec<Value>, _: Option<&Environment>) -> EvalResult {
    require_args("contains", 1, args.len())?;
    let found = receiver(this)?.items().iter().any(|v| v.equals(&args[0]));
    Ok(Value::Bool(found))
}

/// Index of the first equal item, or -1.
fn index_of(_: &mut Interpreter, this: &Value, args: Vec<Value>, _: Option<&Environment>) -> EvalResult {
    require_args("index_of", 1, args.len())?;
    let position = receiver(this)?.items().iter().position(|v| v.equals(&args[0]));
    Ok(position.map_or(Value::Int(-1), len_value))
}

fn reverse(_: &mut Interpreter, this: &Value, args: Vec<Value>, _: Option<&Environment>) -> EvalResult {
    require_args("reverse", 0, args.len())?;
    receiver(this)?.items_mut()?.reverse();
    Ok(Value::Null)
}

/// Sort in place. Items must be all numbers or all strings.
fn sort(_: &mut Interpreter, this: &Value, args: Vec<Value>, _: Option<&Environment>) -> EvalResult {
    require_args("sort", 0, args.len())?;
    let list = receiver(this)?;
    let mut sorted = list.to_vec();
    let mut failure = None;
    sorted.sort_by(|a, b| {
        compare(a, b).unwrap_or_else(|err| {
            failure.get_or_insert(err);
            Ordering::Equal
        })
    });
    if let Some(err) = failure {
        return Err(err);
    }
    *list.items_mut()? = sorted;
    Ok(Value::Null)
}

fn compare(a: &Value, b: &Value) -> Result<Ordering, EvalError> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Ok(x.cmp(y)),
        (Value::Str(x), Value::Str(y)) => Ok(x.cmp(y)),
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => Ok(x.total_cmp(&y)),
            _ => Err(errors::unsupported_operation("<", a.type_name(), b.type_name())),
        },
    }
}

fn sublist(_: &mut Interpreter, this: &Value, args: Vec<Value>, _: Option<&Environment>) -> EvalResult {
    require_arg_range("sublist", 1, 2, args.len())?;
    let list = receiver(this)?;
    let items = list.items();
    let from = require_int_arg("sublist", &args, 0)?;
    let to = optional_int_arg("sublist", &args, 1)?;
    let (from, to) = slice_bounds("Sublist", from, to, items.len())?;
    Ok(Value::list(items[from..to].to_vec()))
}
