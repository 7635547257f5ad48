//! Process-level behavior: exit codes, call depth, argv and workers.

use pretty_assertions::assert_eq;
use spl_eval::{buffer_handler, EvalErrorKind, Interpreter};
use splc::commands::{run_worker_source, RunCommand};
use splc::{exit_code, RunOptions};

use super::common::{run, run_with};

#[test]
fn test_exit_code_is_passed_through() {
    let outcome = run("println(\"before\")\nexit(4)\nprintln(\"after\")");
    assert_eq!(outcome.output, "before\n");
    assert_eq!(exit_code(&outcome.result), 4);
}

#[test]
fn test_uncaught_fault_fails_with_location() {
    let outcome = run("var l = [1]\n\nl[7]");
    assert_eq!(exit_code(&outcome.result), 1);
    match outcome.result {
        Err(e) => {
            assert!(matches!(e.kind, EvalErrorKind::IndexOutOfRange));
            assert_eq!(e.loc.map(|l| l.line), Some(3));
        }
        Ok(()) => panic!("expected an index fault"),
    }
}

#[test]
fn test_syntax_error_is_structural() {
    let outcome = run("var x = (1 + 2");
    match outcome.result {
        Err(e) => assert!(matches!(e.kind, EvalErrorKind::Structural)),
        Ok(()) => panic!("expected a syntax fault"),
    }
}

#[test]
fn test_max_depth_option_limits_recursion() {
    let options = RunOptions {
        max_depth: Some(30),
    };
    let src = "function down(n) {\n return down(n + 1)\n}\ndown(0)";
    let outcome = run_with(options.builder("deep.sp"), src, "deep.sp");
    match outcome.result {
        Err(e) => assert!(matches!(e.kind, EvalErrorKind::StackOverflow { depth: 30 })),
        Ok(()) => panic!("expected the depth guard to fire"),
    }
}

#[test]
fn test_script_sees_argv_and_path() {
    let run_cmd = match RunCommand::parse(&["tool.sp".to_string(), "alpha".to_string()]) {
        Ok(cmd) => cmd,
        Err(e) => panic!("{e}"),
    };
    let builder = run_cmd
        .options
        .builder(&run_cmd.path)
        .argv(run_cmd.argv.clone());
    let outcome = run_with(builder, "println(system.argv)\nprintln(getcwf())", &run_cmd.path);
    assert!(outcome.result.is_ok());
    assert_eq!(outcome.output, "[\"tool.sp\", \"alpha\"]\ntool.sp\n");
}

#[test]
fn test_worker_runs_named_function_without_main_block() {
    let src = "function square(x) {
    println(x * x)
}
if (main()) {
    println(\"parent only\")
}";
    let handler = buffer_handler();
    let builder = Interpreter::builder()
        .print_handler(std::sync::Arc::clone(&handler))
        .worker();
    let result = run_worker_source(builder, src, "w.sp", "square", &["7".to_string()]);
    assert!(result.is_ok());
    assert_eq!(handler.get_output(), "49\n");
}

#[test]
fn test_worker_with_unknown_function_fails() {
    let builder = Interpreter::builder().print_handler(buffer_handler()).worker();
    let result = run_worker_source(builder, "var x = 1", "w.sp", "missing", &[]);
    assert_eq!(exit_code(&result), 1);
}
