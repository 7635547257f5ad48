//! Built-in functions seeded into the global heap.
//!
//! Each built-in is a static [`Builtin`] entry; `install` registers them
//! together with the root `Object` class and the `system`, `os` and
//! `natives` host objects.

#![allow(
    clippy::needless_pass_by_value,
    reason = "built-ins share the BuiltinFn signature"
)]

use std::rc::Rc;
use std::sync::Arc;

use spl_ir::Loc;
use spl_parse::ROOT_CLASS;

use crate::environment::Environment;
use crate::errors::{self, EvalError, EvalResult};
use crate::interpreter::{Args, Interpreter};
use crate::memory;
use crate::methods::{self, file::FileHandle, helpers::require_args};
use crate::objects::{Class, NativeKind, NativeObject};
use crate::value::{OrderedMap, Set, Value};

pub type BuiltinFn = fn(&mut Interpreter, Args, &Environment, &Loc) -> EvalResult;

pub struct Builtin {
    pub name: &'static str,
    pub call: BuiltinFn,
}

impl std::fmt::Debug for Builtin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Builtin({})", self.name)
    }
}

pub static BUILTINS: &[Builtin] = &[
    Builtin { name: "print", call: print },
    Builtin { name: "println", call: println },
    Builtin { name: "type", call: type_of },
    Builtin { name: "pair", call: make_pair },
    Builtin { name: "list", call: make_list },
    Builtin { name: "i_list", call: make_immutable_list },
    Builtin { name: "set", call: make_set },
    Builtin { name: "int", call: to_int },
    Builtin { name: "float", call: to_float },
    Builtin { name: "string", call: to_string },
    Builtin { name: "repr", call: to_repr },
    Builtin { name: "boolean", call: to_boolean },
    Builtin { name: "void", call: void },
    Builtin { name: "input", call: input },
    Builtin { name: "eval", call: eval },
    Builtin { name: "dir", call: dir },
    Builtin { name: "help", call: help },
    Builtin { name: "main", call: is_main },
    Builtin { name: "exit", call: exit },
    Builtin { name: "f_open", call: f_open },
    Builtin { name: "getcwf", call: getcwf },
];

/// Seed the heap of a fresh global frame.
pub fn install(globals: &Environment) {
    for builtin in BUILTINS {
        globals.add_heap(builtin.name, Value::Builtin(builtin));
    }
    let object = Class {
        name: ROOT_CLASS.to_string(),
        superclass_names: Vec::new(),
        body: None,
        is_abstract: false,
        doc: String::new(),
        defining_env: globals.clone(),
    };
    globals.add_heap(ROOT_CLASS, Value::Class(Rc::new(object)));
    globals.add_heap("system", Value::Native(NativeObject::new(NativeKind::System)));
    globals.add_heap("os", Value::Native(NativeObject::new(NativeKind::Os)));
    globals.add_heap("natives", Value::Native(NativeObject::new(NativeKind::Natives)));
}

/// The single positional argument of `name`.
fn one_arg(name: &str, args: Args) -> Result<Value, EvalError> {
    args.reject_keywords(name)?;
    require_args(name, 1, args.positional.len())?;
    Ok(args.positional.into_iter().next().unwrap_or(Value::Null))
}

// Output

fn joined(interp: &mut Interpreter, name: &str, args: Args) -> Result<String, EvalError> {
    args.reject_keywords(name)?;
    let mut parts = Vec::with_capacity(args.positional.len());
    for value in &args.positional {
        parts.push(interp.stringify(value)?);
    }
    Ok(parts.join(" "))
}

/// `print(a, b, ...)`: arguments separated by spaces, no line break.
fn print(interp: &mut Interpreter, args: Args, _: &Environment, _: &Loc) -> EvalResult {
    let text = joined(interp, "print", args)?;
    interp.print_handler.print(&text);
    Ok(Value::Null)
}

fn println(interp: &mut Interpreter, args: Args, _: &Environment, _: &Loc) -> EvalResult {
    let text = joined(interp, "println", args)?;
    interp.print_handler.println(&text);
    Ok(Value::Null)
}

/// `input(prompt?)`: one line without its terminator, or null at end of input.
fn input(interp: &mut Interpreter, args: Args, _: &Environment, _: &Loc) -> EvalResult {
    args.reject_keywords("input")?;
    methods::helpers::require_arg_range("input", 0, 1, args.positional.len())?;
    if let Some(prompt) = args.positional.first() {
        let prompt = interp.stringify(prompt)?;
        interp.print_handler.print(&prompt);
    }
    let line = interp
        .print_handler
        .read_line()
        .map_err(|e| errors::io_error(&e))?;
    Ok(line.map_or(Value::Null, |l| Value::str(&l)))
}

// Constructors

/// `pair()`, `pair(other)` for a shallow copy, or `pair(k1 = v1, ...)`.
fn make_pair(_: &mut Interpreter, args: Args, _: &Environment, _: &Loc) -> EvalResult {
    let mut map = OrderedMap::new();
    match args.positional.as_slice() {
        [] => {}
        [Value::Pair(source)] => {
            for (k, v) in source.borrow().iter() {
                map.insert(k.clone(), v.clone())?;
            }
        }
        [other] => return Err(errors::type_mismatch("pair", other.type_name())),
        _ => {
            return Err(errors::argument_error(
                "'pair' takes at most one positional argument",
            ))
        }
    }
    for (name, value) in args.keywords {
        map.insert(Value::str(&name), value)?;
    }
    Ok(Value::pair(map))
}

fn make_list(_: &mut Interpreter, args: Args, _: &Environment, _: &Loc) -> EvalResult {
    args.reject_keywords("list")?;
    Ok(Value::list(args.positional))
}

fn make_immutable_list(_: &mut Interpreter, args: Args, _: &Environment, _: &Loc) -> EvalResult {
    args.reject_keywords("i_list")?;
    Ok(Value::immutable_list(args.positional))
}

fn make_set(_: &mut Interpreter, args: Args, _: &Environment, _: &Loc) -> EvalResult {
    args.reject_keywords("set")?;
    Ok(Value::Set(Rc::new(Set::from_values(args.positional)?)))
}

// Conversions

/// Truncate toward zero, refusing values outside the `i64` range.
fn float_to_int(f: f64) -> EvalResult {
    if !f.is_finite() {
        return Err(errors::argument_error(format!("Cannot convert {f} to int")));
    }
    let truncated = f.trunc();
    let bound = 2.0_f64.powi(63);
    if truncated >= bound || truncated < -bound {
        return Err(errors::integer_overflow("int()"));
    }
    format!("{truncated:.0}")
        .parse::<i64>()
        .map(Value::Int)
        .map_err(|_| errors::integer_overflow("int()"))
}

fn to_int(_: &mut Interpreter, args: Args, _: &Environment, _: &Loc) -> EvalResult {
    match one_arg("int", args)? {
        Value::Int(v) => Ok(Value::Int(v)),
        Value::Float(f) => float_to_int(f),
        Value::Bool(b) => Ok(Value::Int(i64::from(b))),
        Value::Str(s) => {
            let text = s.trim();
            match text.parse::<i64>() {
                Ok(v) => Ok(Value::Int(v)),
                Err(_) => text
                    .parse::<f64>()
                    .map_err(|_| errors::argument_error(format!("Cannot convert '{s}' to int")))
                    .and_then(float_to_int),
            }
        }
        other => Err(errors::type_mismatch("number or string", other.type_name())),
    }
}

fn to_float(_: &mut Interpreter, args: Args, _: &Environment, _: &Loc) -> EvalResult {
    match one_arg("float", args)? {
        Value::Float(f) => Ok(Value::Float(f)),
        value @ Value::Int(_) => Ok(Value::Float(value.as_f64().unwrap_or(f64::NAN))),
        Value::Bool(b) => Ok(Value::Float(if b { 1.0 } else { 0.0 })),
        Value::Str(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| errors::argument_error(format!("Cannot convert '{s}' to float"))),
        other => Err(errors::type_mismatch("number or string", other.type_name())),
    }
}

fn to_string(interp: &mut Interpreter, args: Args, _: &Environment, _: &Loc) -> EvalResult {
    let value = one_arg("string", args)?;
    Ok(Value::str(&interp.stringify(&value)?))
}

fn to_repr(interp: &mut Interpreter, args: Args, _: &Environment, _: &Loc) -> EvalResult {
    let value = one_arg("repr", args)?;
    Ok(Value::str(&interp.repr_of(&value)?))
}

fn to_boolean(_: &mut Interpreter, args: Args, _: &Environment, _: &Loc) -> EvalResult {
    Ok(Value::Bool(one_arg("boolean", args)?.is_truthy()))
}

/// `void` mostly serves as the type name of null in `instanceof`; calling it
/// yields null.
fn void(_: &mut Interpreter, args: Args, _: &Environment, _: &Loc) -> EvalResult {
    args.reject_keywords("void")?;
    Ok(Value::Null)
}

fn type_of(_: &mut Interpreter, args: Args, _: &Environment, _: &Loc) -> EvalResult {
    Ok(Value::str(one_arg("type", args)?.type_name()))
}

// Introspection

/// `eval(source)`: run `source` in the caller's frame and yield the value of
/// its last statement.
fn eval(interp: &mut Interpreter, args: Args, env: &Environment, _: &Loc) -> EvalResult {
    let source = match one_arg("eval", args)? {
        Value::Str(s) => s,
        other => return Err(errors::type_mismatch("string", other.type_name())),
    };
    let block =
        spl_parse::parse_source(&source, "expression").map_err(|e| errors::syntax_error(&e))?;
    interp.eval_block(&block, env)
}

/// Member names of a class, rolling the id counter back afterwards.
fn class_attributes(
    interp: &mut Interpreter,
    class: &Rc<Class>,
) -> Result<Vec<(String, Value)>, EvalError> {
    let saved = memory::snapshot();
    let instance = interp.build_instance(class);
    memory::restore(saved);
    Ok(instance?
        .env
        .attributes()
        .into_iter()
        .filter(|(name, _)| name != "this")
        .collect())
}

/// `dir(x)`: sorted member names of a class, an instance, a native value or
/// the native type a built-in constructs.
fn dir(interp: &mut Interpreter, args: Args, _: &Environment, _: &Loc) -> EvalResult {
    let names: Vec<String> = match one_arg("dir", args)? {
        Value::Class(class) => class_attributes(interp, &class)?
            .into_iter()
            .map(|(name, _)| name)
            .collect(),
        Value::Instance(instance) => instance
            .env
            .attributes()
            .into_iter()
            .map(|(name, _)| name)
            .filter(|name| name != "this")
            .collect(),
        Value::Builtin(builtin) => methods::member_names(builtin.name),
        other => methods::member_names(other.type_name()),
    };
    Ok(Value::list(names.iter().map(|n| Value::str(n)).collect()))
}

/// `help(x)`: print the documentation of a function or class.
fn help(interp: &mut Interpreter, args: Args, _: &Environment, _: &Loc) -> EvalResult {
    let handler = Arc::clone(&interp.print_handler);
    match one_arg("help", args)? {
        Value::Function(func) => {
            handler.println(&func.signature());
            if !func.doc.is_empty() {
                handler.println(&func.doc);
            }
        }
        Value::Class(class) => {
            handler.println(&format!("Help on class {}\n", class.name));
            let mut title = format!("class {}", class.name);
            if !class.superclass_names.is_empty() {
                title.push_str(" extends ");
                title.push_str(&class.superclass_names.join(", "));
            }
            handler.println(&title);
            handler.println(&class.doc);
            handler.println("---------- Attributes ----------");
            for (name, value) in class_attributes(interp, &class)? {
                match value {
                    Value::Function(func) => {
                        handler.println(&func.signature());
                        if !func.doc.is_empty() {
                            handler.println(&format!("    {}", func.doc));
                        }
                    }
                    _ => handler.println(&name),
                }
            }
        }
        Value::Builtin(builtin) => {
            handler.println(&format!("built-in function {}", builtin.name));
            let members = methods::member_names(builtin.name);
            if !members.is_empty() {
                handler.println(&members.join(", "));
            }
        }
        other => handler.println(&format!("No documentation for {}", other.type_name())),
    }
    Ok(Value::Null)
}

/// `main()`: true unless running inside a worker process.
fn is_main(interp: &mut Interpreter, args: Args, _: &Environment, _: &Loc) -> EvalResult {
    args.reject_keywords("main")?;
    require_args("main", 0, args.positional.len())?;
    Ok(Value::Bool(interp.is_main))
}

/// Path of the running script, or null when evaluating a string.
fn getcwf(interp: &mut Interpreter, args: Args, _: &Environment, _: &Loc) -> EvalResult {
    args.reject_keywords("getcwf")?;
    require_args("getcwf", 0, args.positional.len())?;
    Ok(interp
        .script
        .as_ref()
        .map_or(Value::Null, |p| Value::str(&p.to_string_lossy())))
}

/// `exit(code = 0)`: unwinds to the front end, past every `catch`.
fn exit(_: &mut Interpreter, args: Args, _: &Environment, _: &Loc) -> EvalResult {
    args.reject_keywords("exit")?;
    methods::helpers::require_arg_range("exit", 0, 1, args.positional.len())?;
    let code = match args.positional.first() {
        None => 0,
        Some(Value::Int(code)) => i32::try_from(*code)
            .map_err(|_| errors::argument_error(format!("Exit code {code} out of range")))?,
        Some(other) => return Err(errors::type_mismatch("int", other.type_name())),
    };
    Err(errors::exit(code))
}

/// `f_open(path, mode = "r")`.
fn f_open(_: &mut Interpreter, mut args: Args, _: &Environment, _: &Loc) -> EvalResult {
    let mode = args.take_keyword("mode");
    args.reject_keywords("f_open")?;
    methods::helpers::require_arg_range("f_open", 1, 2, args.positional.len())?;
    let mode = mode.or_else(|| args.positional.get(1).cloned());
    let path = match &args.positional[0] {
        Value::Str(s) => s.clone(),
        other => return Err(errors::type_mismatch("string", other.type_name())),
    };
    let mode = match mode {
        None => Rc::from("r"),
        Some(Value::Str(s)) => s,
        Some(other) => return Err(errors::type_mismatch("string", other.type_name())),
    };
    let file = FileHandle::open(&path, &mode)?;
    Ok(Value::Native(NativeObject::new(NativeKind::File(file))))
}
