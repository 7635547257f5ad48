//! Worker processes behind `natives.thread(...)`.
//!
//! A thread is a child process running `<program> worker <script> <function>
//! <args...>`. The child re-runs the script with `main()` returning false,
//! then calls the named global function with the arguments rebuilt from
//! their literal text. Nothing is shared between the processes.

use std::cell::{Cell, RefCell};
use std::path::PathBuf;
use std::process::{Child, Command};

use spl_ir::Loc;

use crate::errors::{self, EvalError, EvalResult};
use crate::interpreter::{Args, Interpreter};
use crate::value::Value;

pub struct ThreadHandle {
    function: String,
    name: String,
    /// Argument literals, passed on the child's command line.
    args: Vec<String>,
    program: PathBuf,
    script: PathBuf,
    daemon: Cell<bool>,
    child: RefCell<Option<Child>>,
}

impl ThreadHandle {
    pub fn new(
        function: &str,
        name: &str,
        args: Vec<String>,
        program: PathBuf,
        script: PathBuf,
    ) -> Self {
        ThreadHandle {
            function: function.to_string(),
            name: name.to_string(),
            args,
            program,
            script,
            daemon: Cell::new(false),
            child: RefCell::new(None),
        }
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_daemon(&self) -> bool {
        self.daemon.get()
    }

    pub fn set_daemon(&self, daemon: bool) {
        self.daemon.set(daemon);
    }

    pub fn start(&self) -> Result<(), EvalError> {
        let mut child = self.child.borrow_mut();
        if child.is_some() {
            return Err(errors::illegal_operation(format!(
                "Thread '{}' already started",
                self.name
            )));
        }
        tracing::debug!(
            program = %self.program.display(),
            script = %self.script.display(),
            function = %self.function,
            "launching worker"
        );
        let spawned = Command::new(&self.program)
            .arg("worker")
            .arg(&self.script)
            .arg(&self.function)
            .args(&self.args)
            .spawn()
            .map_err(|e| errors::io_error(&e))?;
        *child = Some(spawned);
        Ok(())
    }

    pub fn is_alive(&self) -> Result<bool, EvalError> {
        match self.child.borrow_mut().as_mut() {
            Some(child) => Ok(child.try_wait().map_err(|e| errors::io_error(&e))?.is_none()),
            None => Ok(false),
        }
    }

    /// Wait for the worker to finish. A worker that never started joins
    /// immediately.
    pub fn join(&self) -> Result<(), EvalError> {
        let Some(child) = self.child.borrow_mut().as_mut().map(Child::wait) else {
            return Ok(());
        };
        let status = child.map_err(|e| errors::io_error(&e))?;
        if !status.success() {
            tracing::warn!(thread = %self.name, %status, "worker exited unsuccessfully");
        }
        Ok(())
    }
}

/// Literal text for a value sent to a worker.
///
/// Only null, booleans, numbers, strings, lists and pairs survive the trip.
pub fn transferable_literal(value: &Value) -> Result<String, EvalError> {
    check_transferable(value)?;
    Ok(value.repr())
}

fn check_transferable(value: &Value) -> Result<(), EvalError> {
    match value {
        Value::Null | Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Str(_) => Ok(()),
        Value::List(list) => list.items().iter().try_for_each(check_transferable),
        Value::Pair(pair) => pair
            .borrow()
            .iter()
            .try_for_each(|(k, v)| check_transferable(k).and_then(|()| check_transferable(v))),
        other => Err(errors::argument_error(format!(
            "Value of type '{}' cannot be passed to a thread",
            other.type_name()
        ))),
    }
}

/// Worker side: rebuild the arguments and call `function` in the
/// already-loaded script.
pub fn run_worker(interp: &mut Interpreter, function: &str, literals: &[String]) -> EvalResult {
    let mut values = Vec::with_capacity(literals.len());
    for literal in literals {
        values.push(argument_value(interp, literal)?);
    }
    let globals = interp.globals().clone();
    let target = globals.get(function)?;
    interp.call_value(&target, Args::positional(values), &globals, &Loc::internal())
}

/// Rebuild one argument. The literal is read inside a list so that a
/// pair's `{` parses as a dict rather than a block.
fn argument_value(interp: &mut Interpreter, literal: &str) -> EvalResult {
    let wrapped = interp.eval_source(&format!("[{literal}]"), "<worker argument>")?;
    let Value::List(list) = &wrapped else {
        return Err(errors::argument_error(format!(
            "Malformed thread argument '{literal}'"
        )));
    };
    let items = list.items();
    match items.as_slice() {
        [value] => Ok(value.clone()),
        _ => Err(errors::argument_error(format!(
            "Malformed thread argument '{literal}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::OrderedMap;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scalars_and_containers_are_transferable() {
        let mut map = OrderedMap::new();
        assert!(map.insert(Value::str("k"), Value::list(vec![Value::Int(1)])).is_ok());
        let value = Value::list(vec![Value::Null, Value::str("a\"b"), Value::pair(map)]);
        assert_eq!(
            transferable_literal(&value).ok().as_deref(),
            Some(r#"[null, "a\"b", {"k": [1]}]"#)
        );
    }

    #[test]
    fn test_faults_are_not_transferable() {
        let fault = errors::assertion_failed();
        let value = Value::list(vec![Value::Fault(std::rc::Rc::new(fault))]);
        assert!(transferable_literal(&value).is_err());
    }
}
