//! The `run` command: parse and evaluate an SPL script.

use spl_eval::{EvalError, InterpreterBuilder};

use super::{exit_code, read_file, report, RunCommand};

/// Run a script file and return the process exit status.
pub fn run_file(command: &RunCommand) -> i32 {
    let source = read_file(&command.path);
    let builder = command
        .options
        .builder(&command.path)
        .argv(command.argv.clone());
    let result = run_source(builder, &source, &command.path);
    report(&result);
    exit_code(&result)
}

/// Build an interpreter, run `source` as the main program, then wait for
/// the non-daemon threads it started.
///
/// Threads are joined even when the program faults.
pub fn run_source(builder: InterpreterBuilder, source: &str, path: &str) -> Result<(), EvalError> {
    let mut interp = builder.build()?;
    let result = interp.eval_source(source, path).map(drop);
    let joined = interp.join_workers();
    result.and(joined)
}
