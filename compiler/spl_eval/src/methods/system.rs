//! The `system` and `os` host objects.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use super::helpers::{require_args, require_str_arg};
use super::NativeMethod;
use crate::environment::Environment;
use crate::errors::{self, EvalResult};
use crate::interpreter::Interpreter;
use crate::value::Value;

pub static SYSTEM_METHODS: &[NativeMethod] = &[
    NativeMethod::new("sleep", sleep),
    NativeMethod::new("time", time),
];

pub static SYSTEM_ATTRIBUTES: &[&str] = &["argv", "cwd", "encoding"];

pub static OS_METHODS: &[NativeMethod] = &[NativeMethod::new("list_files", list_files)];

pub static OS_ATTRIBUTES: &[&str] = &["name", "separator"];

pub fn system_attribute(interp: &Interpreter, name: &str) -> Option<Value> {
    match name {
        "argv" => Some(Value::list(interp.argv.iter().map(|a| Value::str(a)).collect())),
        "cwd" => std::env::current_dir()
            .ok()
            .map(|dir| Value::str(&dir.to_string_lossy())),
        "encoding" => Some(Value::str(&interp.encoding)),
        _ => None,
    }
}

pub fn os_attribute(name: &str) -> Option<Value> {
    match name {
        "name" => Some(Value::str(std::env::consts::FAMILY)),
        "separator" => Some(Value::str(std::path::MAIN_SEPARATOR_STR)),
        _ => None,
    }
}

/// Milliseconds since the Unix epoch.
fn time(_: &mut Interpreter, _: &Value, args: Vec<Value>, _: Option<&Environment>) -> EvalResult {
    require_args("time", 0, args.len())?;
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis());
    Ok(Value::Int(i64::try_from(millis).unwrap_or(i64::MAX)))
}

/// Block the interpreter for the given number of milliseconds.
fn sleep(_: &mut Interpreter, _: &Value, args: Vec<Value>, _: Option<&Environment>) -> EvalResult {
    require_args("sleep", 1, args.len())?;
    let millis = match &args[0] {
        Value::Int(v) => u64::try_from(*v).unwrap_or(0),
        Value::Float(v) if *v > 0.0 => Duration::from_secs_f64(*v / 1000.0)
            .as_millis()
            .try_into()
            .unwrap_or(u64::MAX),
        Value::Float(_) => 0,
        other => return Err(errors::type_mismatch("number", other.type_name())),
    };
    std::thread::sleep(Duration::from_millis(millis));
    Ok(Value::Null)
}

/// Entry names under a directory, sorted.
fn list_files(_: &mut Interpreter, _: &Value, args: Vec<Value>, _: Option<&Environment>) -> EvalResult {
    require_args("list_files", 1, args.len())?;
    let path = require_str_arg("list_files", &args, 0)?;
    let mut names = Vec::new();
    for entry in std::fs::read_dir(path).map_err(|e| errors::io_error(&e))? {
        let entry = entry.map_err(|e| errors::io_error(&e))?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(Value::list(names.iter().map(|n| Value::str(n)).collect()))
}
