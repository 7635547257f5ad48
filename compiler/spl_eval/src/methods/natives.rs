//! The `natives` object and `Thread` handles.

use std::rc::Rc;

use super::helpers::{iter_values, require_args, require_str_arg};
use super::NativeMethod;
use crate::environment::Environment;
use crate::errors::{self, EvalError, EvalResult};
use crate::interpreter::Interpreter;
use crate::objects::{NativeKind, NativeObject};
use crate::value::Value;
use crate::worker::{self, ThreadHandle};

pub static METHODS: &[NativeMethod] = &[
    NativeMethod::new("str_join", str_join),
    NativeMethod::with_env("thread", thread),
];

pub static THREAD_METHODS: &[NativeMethod] = &[
    NativeMethod::new("alive", alive),
    NativeMethod::new("join", join),
    NativeMethod::new("set_daemon", set_daemon),
    NativeMethod::new("start", start),
];

pub fn thread_attribute(thread: &ThreadHandle, name: &str) -> Option<Value> {
    match name {
        "name" => Some(Value::str(thread.name())),
        "daemon" => Some(Value::Bool(thread.is_daemon())),
        _ => None,
    }
}

/// `natives.str_join(sep, items)`: items go through `string()`.
fn str_join(interp: &mut Interpreter, _: &Value, args: Vec<Value>, _: Option<&Environment>) -> EvalResult {
    require_args("str_join", 2, args.len())?;
    let sep = require_str_arg("str_join", &args, 0)?;
    let items = iter_values("str_join", &args[1])?;
    let mut parts = Vec::with_capacity(items.len());
    for item in &items {
        parts.push(interp.stringify(item)?);
    }
    Ok(Value::str(&parts.join(sep)))
}

/// `natives.thread(target, name, args)`.
///
/// `target` must be a function reachable by its own name from the calling
/// scope, since the worker looks it up again after re-running the script.
fn thread(interp: &mut Interpreter, _: &Value, args: Vec<Value>, env: Option<&Environment>) -> EvalResult {
    require_args("thread", 3, args.len())?;
    let Value::Function(target) = &args[0] else {
        return Err(errors::type_mismatch("function", args[0].type_name()));
    };
    let name = require_str_arg("thread", &args, 1)?;
    let reachable = env
        .and_then(|env| env.lookup(&target.name))
        .is_some_and(|found| found.is_identical(&args[0]));
    if !reachable {
        return Err(errors::argument_error(format!(
            "Thread target '{}' must be a named function visible from the caller",
            target.name
        )));
    }
    let Value::List(list) = &args[2] else {
        return Err(errors::type_mismatch("list", args[2].type_name()));
    };
    let literals = list
        .items()
        .iter()
        .map(worker::transferable_literal)
        .collect::<Result<Vec<_>, _>>()?;

    let script = interp
        .script
        .clone()
        .ok_or_else(|| errors::io_message("Threads need a script file to re-run"))?;
    let program = match &interp.worker_program {
        Some(program) => program.clone(),
        None => std::env::current_exe().map_err(|e| errors::io_error(&e))?,
    };
    let handle = ThreadHandle::new(&target.name, name, literals, program, script);
    Ok(Value::Native(NativeObject::new(NativeKind::Thread(handle))))
}

fn receiver(value: &Value) -> Result<(&Rc<NativeObject>, &ThreadHandle), EvalError> {
    if let Value::Native(native) = value {
        if let NativeKind::Thread(thread) = &native.kind {
            return Ok((native, thread));
        }
    }
    Err(errors::type_mismatch("thread", value.type_name()))
}

fn set_daemon(_: &mut Interpreter, this: &Value, args: Vec<Value>, _: Option<&Environment>) -> EvalResult {
    require_args("set_daemon", 1, args.len())?;
    let (_, thread) = receiver(this)?;
    thread.set_daemon(args[0].is_truthy());
    Ok(Value::Null)
}

/// Launch the worker. Non-daemon threads are joined when the program ends.
fn start(interp: &mut Interpreter, this: &Value, args: Vec<Value>, _: Option<&Environment>) -> EvalResult {
    require_args("start", 0, args.len())?;
    let (native, thread) = receiver(this)?;
    thread.start()?;
    if !thread.is_daemon() {
        interp.workers.push(Rc::clone(native));
    }
    Ok(Value::Null)
}

fn alive(_: &mut Interpreter, this: &Value, args: Vec<Value>, _: Option<&Environment>) -> EvalResult {
    require_args("alive", 0, args.len())?;
    let (_, thread) = receiver(this)?;
    Ok(Value::Bool(thread.is_alive()?))
}

fn join(_: &mut Interpreter, this: &Value, args: Vec<Value>, _: Option<&Environment>) -> EvalResult {
    require_args("join", 0, args.len())?;
    let (_, thread) = receiver(this)?;
    thread.join()?;
    Ok(Value::Null)
}
