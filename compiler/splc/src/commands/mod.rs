//! Command handlers for the `spl` binary.
//!
//! Each submodule implements one command. Argument parsing and the shared
//! run options live here in the module root.

use spl_eval::{EvalError, EvalErrorKind, Interpreter, InterpreterBuilder};

mod debug;
mod run;
mod worker;

pub use debug::{lex_file, parse_file};
pub use run::{run_file, run_source};
pub use worker::{run_worker_source, worker_file};


/// Environment variable consulted when `--max-depth` is absent.
pub const MAX_DEPTH_VAR: &str = "SPL_MAX_DEPTH";

/// Interpreter options shared by `run` and `worker`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Call depth limit; the interpreter default when `None`.
    pub max_depth: Option<usize>,
}

impl RunOptions {
    /// Consume `arg` if it is an option. Returns `Ok(false)` for anything else.
    pub fn parse_flag(&mut self, arg: &str) -> Result<bool, String> {
        let Some(value) = arg.strip_prefix("--max-depth=") else {
            return Ok(false);
        };
        self.max_depth = Some(parse_depth(value)?);
        Ok(true)
    }

    /// Fill a missing depth limit from `value`, normally the contents of
    /// [`MAX_DEPTH_VAR`].
    pub fn with_depth_fallback(mut self, value: Option<&str>) -> Result<Self, String> {
        if self.max_depth.is_none() {
            if let Some(value) = value {
                self.max_depth = Some(parse_depth(value)?);
            }
        }
        Ok(self)
    }

    /// Interpreter builder for running `script` with these options.
    pub fn builder(&self, script: &str) -> InterpreterBuilder {
        let builder = Interpreter::builder().script(script);
        match self.max_depth {
            Some(depth) => builder.max_call_depth(depth),
            None => builder,
        }
    }
}

fn parse_depth(value: &str) -> Result<usize, String> {
    match value.trim().parse::<usize>() {
        Ok(0) => Err("call depth must be at least 1".to_string()),
        Ok(depth) => Ok(depth),
        Err(_) => Err(format!("invalid call depth '{value}'")),
    }
}

/// `spl run` arguments: options, the script, then the script's own arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunCommand {
    pub path: String,
    /// Exposed to the script as `system.argv`, script path first.
    pub argv: Vec<String>,
    pub options: RunOptions,
}

impl RunCommand {
    /// Parse the arguments following `run`. Options are only recognised
    /// before the script path; everything after it belongs to the script.
    pub fn parse(args: &[String]) -> Result<Self, String> {
        let mut options = RunOptions::default();
        let mut rest = args.iter();
        let path = loop {
            let Some(arg) = rest.next() else {
                return Err("missing file path".to_string());
            };
            if options.parse_flag(arg)? {
                continue;
            }
            if arg.starts_with("--") {
                return Err(format!("unknown option '{arg}'"));
            }
            break arg.clone();
        };
        let mut argv = vec![path.clone()];
        argv.extend(rest.cloned());
        Ok(RunCommand {
            path,
            argv,
            options,
        })
    }
}

/// Process exit status for the outcome of a run: the code passed to
/// `exit()`, `0` on success, `1` for any other fault.
pub fn exit_code(result: &Result<(), EvalError>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => match err.kind {
            EvalErrorKind::Exit(code) => code,
            _ => 1,
        },
    }
}

/// Print an uncaught fault and its backtrace to stderr.
pub(crate) fn report(result: &Result<(), EvalError>) {
    let Err(err) = result else {
        return;
    };
    if matches!(err.kind, EvalErrorKind::Exit(_)) {
        return;
    }
    eprintln!("error: {err}");
    if let Some(backtrace) = &err.backtrace {
        eprint!("{backtrace}");
    }
}

/// Read a source file, exiting with a readable message on failure.
pub(crate) fn read_file(path: &str) -> String {
    match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            let msg = match e.kind() {
                std::io::ErrorKind::NotFound => format!("cannot find file '{path}'"),
                std::io::ErrorKind::PermissionDenied => {
                    format!("permission denied reading '{path}'")
                }
                std::io::ErrorKind::InvalidData => {
                    format!("'{path}' contains invalid UTF-8 data")
                }
                _ => format!("error reading '{path}': {e}"),
            };
            eprintln!("error: {msg}");
            std::process::exit(1);
        }
    }
}
