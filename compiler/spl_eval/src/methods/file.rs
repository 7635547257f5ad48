//! File handles returned by `f_open(path, mode)`.
//!
//! Modes: `r` / `rb` read text or bytes, `w` / `wb` truncate and write,
//! `a` / `ab` append. Binary reads yield a list of ints and binary writes
//! take one.

use std::cell::RefCell;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Read, Write};

use super::helpers::require_args;
use super::NativeMethod;
use crate::environment::Environment;
use crate::errors::{self, EvalError, EvalResult};
use crate::interpreter::Interpreter;
use crate::objects::NativeKind;
use crate::value::Value;

pub static METHODS: &[NativeMethod] = &[
    NativeMethod::new("close", close),
    NativeMethod::new("flush", flush),
    NativeMethod::new("read", read),
    NativeMethod::new("readline", readline),
    NativeMethod::new("write", write),
];

enum Stream {
    Reader(BufReader<File>),
    Writer(BufWriter<File>),
    Closed,
}

pub struct FileHandle {
    path: String,
    mode: String,
    binary: bool,
    stream: RefCell<Stream>,
}

impl FileHandle {
    pub fn open(path: &str, mode: &str) -> Result<Self, EvalError> {
        let binary = mode.ends_with('b');
        let stream = match mode.trim_end_matches('b') {
            "r" => Stream::Reader(BufReader::new(File::open(path).map_err(|e| errors::io_error(&e))?)),
            "w" => Stream::Writer(BufWriter::new(
                File::create(path).map_err(|e| errors::io_error(&e))?,
            )),
            "a" => Stream::Writer(BufWriter::new(
                OpenOptions::new()
                    .append(true)
                    .create(true)
                    .open(path)
                    .map_err(|e| errors::io_error(&e))?,
            )),
            _ => return Err(errors::io_message(format!("Unknown file mode '{mode}'"))),
        };
        tracing::debug!(path, mode, "opened file");
        Ok(FileHandle {
            path: path.to_string(),
            mode: mode.to_string(),
            binary,
            stream: RefCell::new(stream),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    fn wrong_mode(&self) -> EvalError {
        errors::io_message(format!("File '{}' is not open for this operation (mode '{}')", self.path, self.mode))
    }

    fn read_all(&self) -> EvalResult {
        let mut stream = self.stream.borrow_mut();
        let Stream::Reader(reader) = &mut *stream else {
            return Err(self.wrong_mode());
        };
        if self.binary {
            let mut bytes = Vec::new();
            reader.read_to_end(&mut bytes).map_err(|e| errors::io_error(&e))?;
            Ok(Value::list(bytes.into_iter().map(|b| Value::Int(i64::from(b))).collect()))
        } else {
            let mut text = String::new();
            reader.read_to_string(&mut text).map_err(|e| errors::io_error(&e))?;
            Ok(Value::str(&text))
        }
    }

    /// Next line including its terminator, or null at end of file.
    fn read_line(&self) -> EvalResult {
        let mut stream = self.stream.borrow_mut();
        let Stream::Reader(reader) = &mut *stream else {
            return Err(self.wrong_mode());
        };
        if self.binary {
            return Err(self.wrong_mode());
        }
        let mut line = String::new();
        let n = reader.read_line(&mut line).map_err(|e| errors::io_error(&e))?;
        Ok(if n == 0 { Value::Null } else { Value::str(&line) })
    }

    fn write_text(&self, text: &str) -> Result<(), EvalError> {
        self.write_bytes(text.as_bytes())
    }

    fn write_bytes(&self, bytes: &[u8]) -> Result<(), EvalError> {
        let mut stream = self.stream.borrow_mut();
        let Stream::Writer(writer) = &mut *stream else {
            return Err(self.wrong_mode());
        };
        writer.write_all(bytes).map_err(|e| errors::io_error(&e))
    }

    fn flush(&self) -> Result<(), EvalError> {
        let mut stream = self.stream.borrow_mut();
        let Stream::Writer(writer) = &mut *stream else {
            return Err(self.wrong_mode());
        };
        writer.flush().map_err(|e| errors::io_error(&e))
    }

    /// Flush pending output and release the OS handle. Closing twice is a no-op.
    fn close(&self) -> Result<(), EvalError> {
        let previous = std::mem::replace(&mut *self.stream.borrow_mut(), Stream::Closed);
        if let Stream::Writer(mut writer) = previous {
            writer.flush().map_err(|e| errors::io_error(&e))?;
        }
        Ok(())
    }
}

pub fn attribute(file: &FileHandle, name: &str) -> Option<Value> {
    match name {
        "path" => Some(Value::str(&file.path)),
        "mode" => Some(Value::str(&file.mode)),
        _ => None,
    }
}

fn receiver(value: &Value) -> Result<&FileHandle, EvalError> {
    match value {
        Value::Native(native) => match &native.kind {
            NativeKind::File(file) => Ok(file),
            _ => Err(errors::type_mismatch("file", native.type_name())),
        },
        other => Err(errors::type_mismatch("file", other.type_name())),
    }
}

fn read(_: &mut Interpreter, this: &Value, args: Vec<Value>, _: Option<&Environment>) -> EvalResult {
    require_args("read", 0, args.len())?;
    receiver(this)?.read_all()
}

fn readline(_: &mut Interpreter, this: &Value, args: Vec<Value>, _: Option<&Environment>) -> EvalResult {
    require_args("readline", 0, args.len())?;
    receiver(this)?.read_line()
}

/// Text mode writes `string(value)`; binary mode takes a list of byte values.
fn write(interp: &mut Interpreter, this: &Value, args: Vec<Value>, _: Option<&Environment>) -> EvalResult {
    require_args("write", 1, args.len())?;
    let file = receiver(this)?;
    if file.binary {
        let Value::List(list) = &args[0] else {
            return Err(errors::type_mismatch("list of bytes", args[0].type_name()));
        };
        let mut bytes = Vec::with_capacity(list.len());
        for item in list.items().iter() {
            match item {
                Value::Int(v) => bytes.push(
                    u8::try_from(*v)
                        .map_err(|_| errors::argument_error(format!("{v} is not a byte value")))?,
                ),
                other => return Err(errors::type_mismatch("int", other.type_name())),
            }
        }
        file.write_bytes(&bytes)?;
    } else {
        let text = interp.stringify(&args[0])?;
        file.write_text(&text)?;
    }
    Ok(Value::Null)
}

fn flush(_: &mut Interpreter, this: &Value, args: Vec<Value>, _: Option<&Environment>) -> EvalResult {
    require_args("flush", 0, args.len())?;
    receiver(this)?.flush()?;
    Ok(Value::Null)
}

fn close(_: &mut Interpreter, this: &Value, args: Vec<Value>, _: Option<&Environment>) -> EvalResult {
    require_args("close", 0, args.len())?;
    receiver(this)?.close()?;
    Ok(Value::Null)
}
