//! String methods.

use super::helpers::{
    normalize_index, optional_int_arg, require_arg_range, require_args, require_int_arg,
    require_str_arg, slice_bounds,
};
use super::NativeMethod;
use crate::environment::Environment;
use crate::errors::{self, EvalError, EvalResult};
use crate::interpreter::Interpreter;
use crate::value::{format_float, Value};

pub static METHODS: &[NativeMethod] = &[
    NativeMethod::new("__getitem__", get_item),
    NativeMethod::new("contains", contains),
    NativeMethod::new("format", format),
    NativeMethod::new("length", length),
    NativeMethod::new("split", split),
    NativeMethod::new("substring", substring),
];

fn receiver(value: &Value) -> Result<&str, EvalError> {
    match value {
        Value::Str(s) => Ok(s),
        other => Err(errors::type_mismatch("string", other.type_name())),
    }
}

fn char_count(s: &str) -> i64 {
    i64::try_from(s.chars().count()).unwrap_or(i64::MAX)
}

fn length(_: &mut Interpreter, this: &Value, args: Vec<Value>, _: Option<&Environment>) -> EvalResult {
    require_args("length", 0, args.len())?;
    Ok(Value::Int(char_count(receiver(this)?)))
}

fn contains(_: &mut Interpreter, this: &Value, args: Vec<Value>, _: Option<&Environment>) -> EvalResult {
    require_args("contains", 1, args.len())?;
    let needle = require_str_arg("contains", &args, 0)?;
    Ok(Value::Bool(receiver(this)?.contains(needle)))
}

fn get_item(_: &mut Interpreter, this: &Value, args: Vec<Value>, _: Option<&Environment>) -> EvalResult {
    require_args("__getitem__", 1, args.len())?;
    let s = receiver(this)?;
    let index = require_int_arg("__getitem__", &args, 0)?;
    let len = s.chars().count();
    let i = normalize_index(index, len)?;
    Ok(s.chars()
        .nth(i)
        .map_or(Value::Null, |c| Value::str(c.encode_utf8(&mut [0; 4]))))
}

fn substring(_: &mut Interpreter, this: &Value, args: Vec<Value>, _: Option<&Environment>) -> EvalResult {
    require_arg_range("substring", 1, 2, args.len())?;
    let s = receiver(this)?;
    let from = require_int_arg("substring", &args, 0)?;
    let to = optional_int_arg("substring", &args, 1)?;
    let (from, to) = slice_bounds("Substring", from, to, s.chars().count())?;
    let out: String = s.chars().skip(from).take(to - from).collect();
    Ok(Value::str(&out))
}

/// `s.split()` splits on whitespace, `s.split(sep)` on `sep`.
fn split(_: &mut Interpreter, this: &Value, args: Vec<Value>, _: Option<&Environment>) -> EvalResult {
    require_arg_range("split", 0, 1, args.len())?;
    let s = receiver(this)?;
    let parts: Vec<Value> = if args.is_empty() {
        s.split_whitespace().map(Value::str).collect()
    } else {
        let sep = require_str_arg("split", &args, 0)?;
        if sep.is_empty() {
            return Err(errors::argument_error("'split' separator must not be empty"));
        }
        s.split(sep).map(Value::str).collect()
    };
    Ok(Value::list(parts))
}

/// `"%s has %d items".format(name, n)`.
///
/// Flags: `%s` string, `%d` integer, `%f` float with optional `.N`
/// precision, `%r` any value through `string()`, `%%` a literal percent.
fn format(interp: &mut Interpreter, this: &Value, args: Vec<Value>, _: Option<&Environment>) -> EvalResult {
    let template = receiver(this)?;
    let mut out = String::with_capacity(template.len());
    let mut args = args.into_iter();
    let mut used = 0usize;
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        if chars.peek() == Some(&'%') {
            chars.next();
            out.push('%');
            continue;
        }
        let mut spec = String::new();
        let flag = loop {
            match chars.next() {
                Some(f) if f.is_alphabetic() => break f,
                Some(other) => spec.push(other),
                None => return Err(errors::string_format("Incomplete format specifier")),
            }
        };
        if !matches!(flag, 's' | 'd' | 'f' | 'r') {
            tracing::warn!(flag = %flag, "unknown string format flag");
            out.push('%');
            out.push_str(&spec);
            out.push(flag);
            continue;
        }
        let Some(arg) = args.next() else {
            return Err(errors::format_args_missing(used + 1, used));
        };
        used += 1;
        match flag {
            's' => match &arg {
                Value::Str(s) => out.push_str(s),
                other => {
                    return Err(errors::string_format(format!(
                        "Cannot resolve type '{}' with symbol '%s'",
                        other.type_name()
                    )))
                }
            },
            'd' => match arg {
                Value::Int(v) => out.push_str(&v.to_string()),
                Value::Float(v) => out.push_str(&format!("{:.0}", v.trunc())),
                other => {
                    return Err(errors::string_format(format!(
                        "Cannot resolve type '{}' with symbol '%d'",
                        other.type_name()
                    )))
                }
            },
            'f' => {
                let Some(v) = arg.as_f64() else {
                    return Err(errors::string_format(format!(
                        "Cannot resolve type '{}' with symbol '%f'",
                        arg.type_name()
                    )));
                };
                out.push_str(&format_fixed(v, &spec)?);
            }
            _ => out.push_str(&interp.stringify(&arg)?),
        }
    }

    if args.next().is_some() {
        tracing::warn!(template, "too many arguments for string format");
    }
    Ok(Value::str(&out))
}

/// `%f` body: `spec` is empty or `.N`; the value is rounded to N places.
fn format_fixed(v: f64, spec: &str) -> Result<String, EvalError> {
    let Some(digits) = spec.strip_prefix('.') else {
        if spec.is_empty() {
            return Ok(format_float(v));
        }
        return Err(errors::string_format(format!("Invalid precision '{spec}'")));
    };
    let places: i32 = digits
        .parse()
        .map_err(|_| errors::string_format(format!("Invalid precision '{spec}'")))?;
    let scale = 10f64.powi(places);
    Ok(format_float((v * scale).round() / scale))
}
