//! Tree-walking interpreter.
//!
//! [`Interpreter::evaluate`] dispatches on the node kind. Control flow is
//! split by concern:
//! - `call`: argument evaluation, parameter binding, calls, instantiation
//! - `control`: blocks, `if`, loops, `try`/`catch`/`finally`
//! - `assign`: assignments, compound assignment, `++`/`--`
//! - `members`: member access and operator dispatch
//! - `format`: script-visible string conversion (`__str__` / `__repr__`)
//!
//! `return`, `break` and `continue` are flags on scope frames; faults
//! unwind as `Err`.

mod assign;
mod builder;
mod call;
mod control;
mod format;
mod members;

use std::path::PathBuf;
use std::rc::Rc;

use spl_ir::{Block, Loc, Node, NodeKind, UnaryOp};
use spl_stack::ensure_sufficient_stack;

use crate::diagnostics::CallStack;
use crate::environment::Environment;
use crate::errors::{self, EvalResult};
use crate::objects::{Class, NativeObject};
use crate::operators;
use crate::print_handler::SharedPrintHandler;
use crate::value::{OrderedMap, Value};

pub use builder::InterpreterBuilder;
pub use call::Args;

/// Evaluator state for one script run.
pub struct Interpreter {
    globals: Environment,
    pub(crate) print_handler: SharedPrintHandler,
    pub(crate) call_stack: CallStack,
    pub(crate) argv: Vec<String>,
    pub(crate) encoding: String,
    /// Executable launched for `Thread.start`; the current one by default.
    pub(crate) worker_program: Option<PathBuf>,
    /// Script being run, reported by `getcwf`.
    pub(crate) script: Option<PathBuf>,
    /// `false` inside a worker process.
    pub(crate) is_main: bool,
    /// Started non-daemon threads, joined by [`Interpreter::join_workers`].
    pub(crate) workers: Vec<Rc<NativeObject>>,
}

impl Interpreter {
    pub fn builder() -> InterpreterBuilder {
        InterpreterBuilder::new()
    }

    pub fn globals(&self) -> &Environment {
        &self.globals
    }

    pub fn print_handler(&self) -> &SharedPrintHandler {
        &self.print_handler
    }

    /// Run a parsed program in the global frame.
    pub fn run(&mut self, program: &Block) -> EvalResult {
        let globals = self.globals.clone();
        self.eval_block(program, &globals)
    }

    /// Tokenize, parse and run `source` in the global frame.
    pub fn eval_source(&mut self, source: &str, file: &str) -> EvalResult {
        let program =
            spl_parse::parse_source(source, file).map_err(|e| errors::syntax_error(&e))?;
        self.run(&program)
    }

    /// Wait for every non-daemon thread started by the script.
    pub fn join_workers(&mut self) -> Result<(), errors::EvalError> {
        for worker in std::mem::take(&mut self.workers) {
            if let crate::objects::NativeKind::Thread(thread) = &worker.kind {
                thread.join()?;
            }
        }
        Ok(())
    }

    /// Evaluate one node in `env`.
    ///
    /// Faults get the node's location attached unless a deeper node
    /// already supplied one.
    pub fn evaluate(&mut self, node: &Node, env: &Environment) -> EvalResult {
        ensure_sufficient_stack(|| self.eval_inner(node, env))
            .map_err(|e| e.with_loc(&node.loc))
    }

    fn eval_slot(&mut self, slot: Option<&Node>, env: &Environment) -> EvalResult {
        match slot {
            Some(node) => self.evaluate(node, env),
            None => Err(errors::structural("Incomplete expression")),
        }
    }

    fn eval_inner(&mut self, node: &Node, env: &Environment) -> EvalResult {
        if env.is_terminated() {
            return Ok(env.terminate_value());
        }
        match &node.kind {
            NodeKind::Int(v) => Ok(Value::Int(*v)),
            NodeKind::Float(v) => Ok(Value::Float(*v)),
            NodeKind::Literal(text) => Ok(Value::str(text)),
            NodeKind::Bool(v) => Ok(Value::Bool(*v)),
            NodeKind::Null => Ok(Value::Null),
            NodeKind::Undefined => Ok(Value::Undefined),
            NodeKind::Name(name) => env.get(name),
            NodeKind::Break => env.break_loop().map(|()| Value::Null),
            NodeKind::Continue => env.pause_loop().map(|()| Value::Null),
            NodeKind::Block(block) => self.eval_block(block, env),

            NodeKind::Assignment { left, right, level } => {
                self.eval_assignment(left, right.as_deref(), *level, env, &node.loc)
            }
            NodeKind::Binary {
                op,
                left,
                right,
                compound: true,
                ..
            } => self.eval_compound(*op, left.as_deref(), right.as_deref(), env, &node.loc),
            NodeKind::Binary {
                op, left, right, ..
            } => self.eval_binary(*op, left.as_deref(), right.as_deref(), env, &node.loc),
            NodeKind::Unary { op, value, .. } => {
                self.eval_unary(*op, value.as_deref(), env, &node.loc)
            }
            NodeKind::IncDec {
                op, target, prefix, ..
            } => self.eval_inc_dec(op.delta(), target.as_deref(), *prefix, env),
            NodeKind::Ternary {
                left, mid, right, ..
            } => {
                let cond = self.eval_slot(left.as_deref(), env)?;
                if cond.is_truthy() {
                    self.eval_slot(mid.as_deref(), env)
                } else {
                    self.eval_slot(right.as_deref(), env)
                }
            }
            NodeKind::Dot { left, right, .. } => {
                self.eval_dot(left.as_deref(), right.as_deref(), env, &node.loc)
            }

            NodeKind::If {
                cond,
                then,
                otherwise,
            } => self.eval_if(cond.as_ref(), then.as_deref(), otherwise.as_deref(), env),
            NodeKind::While { cond, body } => {
                self.eval_while(cond.as_ref(), body.as_deref(), env)
            }
            NodeKind::For { clauses, body } => {
                self.eval_for(clauses.as_ref(), body.as_deref(), env, &node.loc)
            }
            NodeKind::Try {
                body,
                catches,
                finally,
            } => self.eval_try(body.as_deref(), catches, finally.as_deref(), env),
            NodeKind::Catch { .. } => Err(errors::structural("'catch' without 'try'")),

            NodeKind::FuncDef(def) => self.make_function(def, "<anonymous>", env, &node.loc),
            NodeKind::Call { callee, args } => self.eval_call(callee, args.as_ref(), env, &node.loc),
            NodeKind::ClassDef(def) => {
                let class = Class {
                    name: def.name.clone(),
                    superclass_names: def.superclass_names.clone(),
                    body: def.body.clone(),
                    is_abstract: def.is_abstract,
                    doc: def.doc.clone(),
                    defining_env: env.clone(),
                };
                env.add_heap(&def.name, Value::Class(Rc::new(class)));
                Ok(Value::Null)
            }
            NodeKind::ClassInit { name } => {
                let instance = self.instantiate(name)?;
                self.construct(instance, Args::default(), env, &node.loc)
            }

            NodeKind::Dict { entries } => {
                let mut map = OrderedMap::new();
                for entry in entries {
                    let NodeKind::KeyValue { key, value } = &entry.kind else {
                        return Err(errors::structural("Malformed dict entry"));
                    };
                    let k = self.evaluate(key, env)?;
                    let v = self.eval_slot(value.as_deref(), env)?;
                    map.insert(k, v).map_err(|e| e.with_loc(&entry.loc))?;
                }
                Ok(Value::pair(map))
            }
            NodeKind::KeyValue { .. } => Err(errors::structural("Unexpected 'key: value'")),
        }
    }

    fn eval_unary(
        &mut self,
        op: UnaryOp,
        value: Option<&Node>,
        env: &Environment,
        loc: &Loc,
    ) -> EvalResult {
        match op {
            UnaryOp::Return => {
                let result = match value {
                    Some(node) => self.evaluate(node, env)?,
                    None => Value::Null,
                };
                env.terminate(result)?;
                Ok(Value::Null)
            }
            UnaryOp::Neg => match self.eval_slot(value, env)? {
                Value::Instance(instance) => self.call_method(&instance, "__neg__", vec![], loc),
                other => operators::negate(&other),
            },
            UnaryOp::Not => Ok(Value::Bool(!self.eval_slot(value, env)?.is_truthy())),
            UnaryOp::Throw => match self.eval_slot(value, env)? {
                Value::Instance(instance) => Err(errors::thrown(instance)),
                other => Err(errors::not_throwable(other.type_name())),
            },
            UnaryOp::Assert => match self.eval_slot(value, env)? {
                Value::Bool(true) => Ok(Value::Null),
                _ => Err(errors::assertion_failed()),
            },
            UnaryOp::Unpack | UnaryOp::KwUnpack => Err(errors::structural(format!(
                "'{}' is only allowed in call arguments and parameter lists",
                op.name()
            ))),
        }
    }
}

#[cfg(test)]
mod tests;
