//! `InterpreterBuilder` for creating Interpreter instances with various configurations.

use std::path::PathBuf;

use super::Interpreter;
use crate::builtins;
use crate::diagnostics::{CallStack, DEFAULT_MAX_DEPTH};
use crate::environment::Environment;
use crate::errors::EvalError;
use crate::prelude;
use crate::print_handler::{stdout_handler, SharedPrintHandler};

/// Builder for [`Interpreter`].
///
/// The defaults suit `spl run`: stdout output, UTF-8, a call depth of
/// [`DEFAULT_MAX_DEPTH`] and the prelude loaded.
pub struct InterpreterBuilder {
    argv: Vec<String>,
    encoding: String,
    max_call_depth: usize,
    print_handler: Option<SharedPrintHandler>,
    worker_program: Option<PathBuf>,
    script: Option<PathBuf>,
    load_prelude: bool,
    is_main: bool,
}

impl InterpreterBuilder {
    pub fn new() -> Self {
        Self {
            argv: Vec::new(),
            encoding: "utf-8".to_string(),
            max_call_depth: DEFAULT_MAX_DEPTH,
            print_handler: None,
            worker_program: None,
            script: None,
            load_prelude: true,
            is_main: true,
        }
    }

    /// Script arguments, exposed as `system.argv`.
    #[must_use]
    pub fn argv(mut self, argv: Vec<String>) -> Self {
        self.argv = argv;
        self
    }

    #[must_use]
    pub fn encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    /// Deepest allowed nesting of SPL calls.
    #[must_use]
    pub fn max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    #[must_use]
    pub fn print_handler(mut self, handler: SharedPrintHandler) -> Self {
        self.print_handler = Some(handler);
        self
    }

    /// Program launched by `Thread.start`. Defaults to the current executable.
    #[must_use]
    pub fn worker_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.worker_program = Some(program.into());
        self
    }

    /// Path of the script being run; workers re-run it.
    #[must_use]
    pub fn script(mut self, script: impl Into<PathBuf>) -> Self {
        self.script = Some(script.into());
        self
    }

    /// Skip the prelude. Only built-ins and the empty `Object` class remain.
    #[must_use]
    pub fn load_prelude(mut self, load: bool) -> Self {
        self.load_prelude = load;
        self
    }

    /// Mark the interpreter as running inside a worker process.
    #[must_use]
    pub fn worker(mut self) -> Self {
        self.is_main = false;
        self
    }

    /// Build the interpreter: seed the heap, then run the prelude.
    pub fn build(self) -> Result<Interpreter, EvalError> {
        let globals = Environment::global();
        builtins::install(&globals);

        let mut interpreter = Interpreter {
            globals,
            print_handler: self.print_handler.unwrap_or_else(stdout_handler),
            call_stack: CallStack::new(self.max_call_depth),
            argv: self.argv,
            encoding: self.encoding,
            worker_program: self.worker_program,
            script: self.script,
            is_main: self.is_main,
            workers: Vec::new(),
        };
        if self.load_prelude {
            interpreter.eval_source(prelude::PRELUDE, prelude::PRELUDE_FILE)?;
        }
        Ok(interpreter)
    }
}

impl Default for InterpreterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
