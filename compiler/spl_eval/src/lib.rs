//! SPL Eval - tree-walking evaluator for SPL programs.
//!
//! # Architecture
//!
//! The evaluator uses:
//! - `Environment`: chained scope frames sharing one heap of classes and
//!   built-ins
//! - `Interpreter`: node dispatch, calls, classes, loops and exceptions
//! - `evaluate_binary`: operator tables for non-instance operands
//! - `methods`: static method tables of the native types
//! - `memory`: object id allocation
//!
//! Faults travel as `Err(EvalError)`; `return`, `break` and `continue` are
//! flags on the scope frames.

pub mod builtins;
pub mod diagnostics;
mod environment;
pub mod errors;
pub mod interpreter;
pub mod memory;
mod methods;
pub mod objects;
mod operators;
mod prelude;
mod print_handler;
pub mod value;
pub mod worker;

pub use diagnostics::{CallFrame, CallStack, DEFAULT_MAX_DEPTH};
pub use environment::{Environment, Heap, LocalScope, ScopeKind};
pub use errors::{BacktraceFrame, EvalBacktrace, EvalError, EvalErrorKind, EvalResult};
pub use interpreter::{Args, Interpreter, InterpreterBuilder};
pub use objects::{Class, ClassInstance, Function, NativeObject};
pub use operators::evaluate_binary;
pub use print_handler::{
    buffer_handler, scripted_handler, silent_handler, stdout_handler, PrintHandlerImpl,
    SharedPrintHandler,
};
pub use value::{OrderedMap, Value};
pub use worker::run_worker;
