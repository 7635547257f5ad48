//! The `worker` command, launched by `Thread.start` in a parent process.

use spl_eval::{EvalError, InterpreterBuilder};

use super::{exit_code, read_file, report, RunOptions};

pub fn worker_file(path: &str, function: &str, literals: &[String], options: &RunOptions) -> i32 {
    let source = read_file(path);
    let builder = options
        .builder(path)
        .argv(vec![path.to_string()])
        .worker();
    let result = run_worker_source(builder, &source, path, function, literals);
    report(&result);
    exit_code(&result)
}

/// Re-run the script with `main()` false, then call `function` with the
/// arguments rebuilt from `literals`.
pub fn run_worker_source(
    builder: InterpreterBuilder,
    source: &str,
    path: &str,
    function: &str,
    literals: &[String],
) -> Result<(), EvalError> {
    let mut interp = builder.build()?;
    interp.eval_source(source, path)?;
    tracing::debug!(function, args = literals.len(), "worker calling target");
    let result = spl_eval::run_worker(&mut interp, function, literals).map(drop);
    let joined = interp.join_workers();
    result.and(joined)
}
