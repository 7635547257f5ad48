//! Methods and attributes of native types.
//!
//! Every native type has a static table of [`NativeMethod`]s. Dispatch is a
//! linear scan: the tables are short and fixed, so a match on the receiver
//! picks the table and the name picks the entry.
//!
//! # Module Structure
//!
//! - [`helpers`]: argument checks and index normalization
//! - [`string`]: `length`, `contains`, `format`, ...
//! - [`list`], [`pair`], [`set`]: native containers
//! - [`file`]: handles returned by `f_open`
//! - [`system`]: the `system` and `os` objects
//! - [`natives`]: the `natives` object and thread handles

#![allow(
    clippy::needless_pass_by_value,
    reason = "native methods share the MethodFn signature"
)]

pub(crate) mod file;
pub(crate) mod helpers;
mod list;
mod natives;
mod pair;
mod set;
mod string;
mod system;

use crate::environment::Environment;
use crate::errors::{self, EvalResult};
use crate::interpreter::{Args, Interpreter};
use crate::objects::NativeKind;
use crate::value::Value;

/// Native method implementation. The environment is only passed when the
/// table entry asks for it.
pub type MethodFn = fn(&mut Interpreter, &Value, Vec<Value>, Option<&Environment>) -> EvalResult;

pub struct NativeMethod {
    pub name: &'static str,
    pub needs_env: bool,
    pub call: MethodFn,
}

impl NativeMethod {
    pub(crate) const fn new(name: &'static str, call: MethodFn) -> Self {
        NativeMethod {
            name,
            needs_env: false,
            call,
        }
    }

    pub(crate) const fn with_env(name: &'static str, call: MethodFn) -> Self {
        NativeMethod {
            name,
            needs_env: true,
            call,
        }
    }
}

/// Method table for a type name as reported by `type()`.
pub fn type_methods(type_name: &str) -> &'static [NativeMethod] {
    match type_name {
        "string" => string::METHODS,
        "list" => list::METHODS,
        "pair" => pair::METHODS,
        "set" => set::METHODS,
        "file" => file::METHODS,
        "system" => system::SYSTEM_METHODS,
        "os" => system::OS_METHODS,
        "natives" => natives::METHODS,
        "thread" => natives::THREAD_METHODS,
        _ => &[],
    }
}

/// Attribute names readable without a call, per type name.
pub fn type_attributes(type_name: &str) -> &'static [&'static str] {
    match type_name {
        "system" => system::SYSTEM_ATTRIBUTES,
        "os" => system::OS_ATTRIBUTES,
        "file" => &["mode", "path"],
        "thread" => &["daemon", "name"],
        _ if type_name.ends_with("Exception") || type_name == "StackOverflow" => {
            &["kind", "message"]
        }
        _ => &[],
    }
}

fn table_for(receiver: &Value) -> &'static [NativeMethod] {
    match receiver {
        Value::Str(_) | Value::List(_) | Value::Pair(_) | Value::Set(_) | Value::Native(_) => {
            type_methods(receiver.type_name())
        }
        _ => &[],
    }
}

/// `receiver.name(args)` for a non-instance receiver.
pub fn call_method(
    interp: &mut Interpreter,
    receiver: &Value,
    name: &str,
    args: Args,
    env: &Environment,
) -> EvalResult {
    args.reject_keywords(name)?;
    let method = table_for(receiver)
        .iter()
        .find(|m| m.name == name)
        .ok_or_else(|| errors::no_method(receiver.type_name(), name))?;
    let env = method.needs_env.then_some(env);
    (method.call)(interp, receiver, args.positional, env)
}

/// `receiver.name` for a non-instance receiver.
pub fn attribute(interp: &Interpreter, receiver: &Value, name: &str) -> EvalResult {
    let found = match receiver {
        Value::Native(native) => match &native.kind {
            NativeKind::System => system::system_attribute(interp, name),
            NativeKind::Os => system::os_attribute(name),
            NativeKind::File(file) => file::attribute(file, name),
            NativeKind::Thread(thread) => natives::thread_attribute(thread, name),
            NativeKind::Natives => None,
        },
        Value::Fault(fault) => match name {
            "message" => Some(Value::str(&fault.message)),
            "kind" => Some(Value::str(fault.kind.exception_name())),
            _ => None,
        },
        _ => None,
    };
    found.ok_or_else(|| errors::no_attribute(receiver.type_name(), name))
}

/// Sorted attribute and method names of a native type, for `dir`.
pub fn member_names(type_name: &str) -> Vec<String> {
    let mut names: Vec<String> = type_methods(type_name)
        .iter()
        .map(|m| m.name.to_string())
        .chain(type_attributes(type_name).iter().map(|a| (*a).to_string()))
        .collect();
    names.sort_unstable();
    names
}

#[cfg(test)]
mod tests;
