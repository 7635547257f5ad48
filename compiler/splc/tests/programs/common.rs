//! Runners shared by the end-to-end tests.

use std::sync::Arc;

use spl_eval::{buffer_handler, EvalError, Interpreter, InterpreterBuilder};
use splc::run_source;

/// Result of one program run and everything it printed.
pub struct Outcome {
    pub result: Result<(), EvalError>,
    pub output: String,
}

/// Run `source` with `builder`, capturing output.
pub fn run_with(builder: InterpreterBuilder, source: &str, path: &str) -> Outcome {
    let handler = buffer_handler();
    let result = run_source(builder.print_handler(Arc::clone(&handler)), source, path);
    Outcome {
        result,
        output: handler.get_output(),
    }
}

pub fn run(source: &str) -> Outcome {
    run_with(Interpreter::builder(), source, "program.sp")
}

/// Output of a program that must finish without a fault.
pub fn output_of(source: &str) -> String {
    let outcome = run(source);
    if let Err(e) = &outcome.result {
        panic!("program failed: {e}\noutput so far:\n{}", outcome.output);
    }
    outcome.output
}
