//! Blocks, conditionals, loops and exception handling.

use spl_ir::{AssignLevel, Block, Loc, Node, NodeKind};

use super::Interpreter;
use crate::environment::Environment;
use crate::errors::{self, EvalError, EvalErrorKind, EvalResult};
use crate::value::Value;

impl Interpreter {
    /// Run statements in order. Stops after a `return`, or once the nearest
    /// loop has seen `break` or `continue`. Yields the last statement's value.
    pub(crate) fn eval_block(&mut self, block: &Block, env: &Environment) -> EvalResult {
        let mut last = Value::Null;
        for line in &block.lines {
            last = self.evaluate(line, env)?;
            if env.is_terminated() {
                return Ok(env.terminate_value());
            }
            if env.loop_interrupted() {
                break;
            }
        }
        Ok(last)
    }

    fn eval_condition(&mut self, cond: Option<&Block>, env: &Environment) -> EvalResult {
        let Some(cond) = cond.filter(|c| !c.is_empty()) else {
            return Err(errors::structural("Missing condition"));
        };
        self.eval_block(cond, env)
    }

    pub(crate) fn eval_if(
        &mut self,
        cond: Option<&Block>,
        then: Option<&Node>,
        otherwise: Option<&Node>,
        env: &Environment,
    ) -> EvalResult {
        let branch = if self.eval_condition(cond, env)?.is_truthy() {
            then
        } else {
            otherwise
        };
        match branch {
            Some(node) => self.evaluate(node, &Environment::sub(env)),
            None => Ok(Value::Null),
        }
    }

    /// Run one iteration of a loop body. Returns `false` when the loop must
    /// stop: `return` or `break` in the body, or a broken title frame.
    fn run_iteration(
        &mut self,
        body: &Node,
        title: &Environment,
        body_frame: &Environment,
    ) -> Result<bool, EvalError> {
        body_frame.invalidate();
        self.evaluate(body, body_frame)?;
        if body_frame.is_terminated() || body_frame.is_broken() || title.is_broken() {
            return Ok(false);
        }
        body_frame.resume_loop();
        Ok(true)
    }

    pub(crate) fn eval_while(
        &mut self,
        cond: Option<&Block>,
        body: Option<&Node>,
        env: &Environment,
    ) -> EvalResult {
        let body = body.ok_or_else(|| errors::structural("'while' without body"))?;
        let title = Environment::loop_frame(env);
        let body_frame = Environment::loop_frame(&title);
        while !title.is_broken() && self.eval_condition(cond, &title)?.is_truthy() {
            if !self.run_iteration(body, &title, &body_frame)? {
                break;
            }
        }
        Ok(Value::Null)
    }

    pub(crate) fn eval_for(
        &mut self,
        clauses: Option<&Block>,
        body: Option<&Node>,
        env: &Environment,
        loc: &Loc,
    ) -> EvalResult {
        let body = body.ok_or_else(|| errors::structural("'for' without body"))?;
        let lines = clauses.map_or(&[][..], |c| c.lines.as_slice());
        match lines {
            [init, cond, step] => self.eval_c_for(init, cond, step, body, env),
            [var, iterable] => self.eval_for_each(var, iterable, body, env, loc),
            _ => Err(errors::structural(
                "'for' takes either three clauses or a variable and an iterable",
            )),
        }
    }

    fn eval_c_for(
        &mut self,
        init: &Node,
        cond: &Node,
        step: &Node,
        body: &Node,
        env: &Environment,
    ) -> EvalResult {
        let title = Environment::loop_frame(env);
        let body_frame = Environment::loop_frame(&title);
        self.evaluate(init, &title)?;
        while !title.is_broken() && self.evaluate(cond, &title)?.is_truthy() {
            if !self.run_iteration(body, &title, &body_frame)? {
                break;
            }
            self.evaluate(step, &title)?;
        }
        Ok(Value::Null)
    }

    fn eval_for_each(
        &mut self,
        var: &Node,
        iterable: &Node,
        body: &Node,
        env: &Environment,
        loc: &Loc,
    ) -> EvalResult {
        let title = Environment::loop_frame(env);
        let body_frame = Environment::loop_frame(&title);

        let name = match &var.kind {
            NodeKind::Name(name) => {
                if !title.contains_key(name) {
                    title.bind_local(name, Value::Undefined);
                }
                name.as_str()
            }
            NodeKind::Assignment {
                left,
                level: AssignLevel::Var,
                ..
            } => {
                let Some(name) = left.as_name() else {
                    return Err(errors::structural("Invalid for-each loop variable"));
                };
                self.evaluate(var, &title)?;
                name
            }
            _ => return Err(errors::structural("Invalid for-each loop variable")),
        };

        let collection = self.evaluate(iterable, &title)?;
        let items = match &collection {
            Value::Str(s) => Some(s.chars().map(|c| Value::str(c.encode_utf8(&mut [0; 4]))).collect()),
            Value::List(list) => Some(list.to_vec()),
            Value::Pair(pair) => Some(pair.borrow().keys().cloned().collect()),
            Value::Set(set) => Some(set.borrow().keys().cloned().collect()),
            _ => None,
        };

        if let Some(items) = items {
            for item in items {
                if title.is_broken() {
                    break;
                }
                title.assign(name, item)?;
                if !self.run_iteration(body, &title, &body_frame)? {
                    break;
                }
            }
            return Ok(Value::Null);
        }

        let Value::Instance(instance) = &collection else {
            return Err(errors::not_iterable(collection.type_name()));
        };
        if !self.is_subclass_of(&instance.class_name, "Iterable") {
            return Err(errors::not_iterable(&instance.class_name));
        }
        let iterator = match self.call_method(instance, "__iter__", vec![], loc)? {
            Value::Instance(iterator) => iterator,
            other => return Err(errors::type_mismatch("an iterator instance", other.type_name())),
        };
        while !title.is_broken() {
            let next = self.call_method(&iterator, "__next__", vec![], loc)?;
            if let Value::Instance(item) = &next {
                if self.is_subclass_of(&item.class_name, "StopIteration") {
                    break;
                }
            }
            title.assign(name, next)?;
            if !self.run_iteration(body, &title, &body_frame)? {
                break;
            }
        }
        Ok(Value::Null)
    }

    pub(crate) fn eval_try(
        &mut self,
        body: Option<&Node>,
        catches: &[Node],
        finally: Option<&Node>,
        env: &Environment,
    ) -> EvalResult {
        let body = body.ok_or_else(|| errors::structural("'try' without body"))?;
        let outcome = match self.evaluate(body, &Environment::sub(env)) {
            Err(err) if !err.is_exit() => self.handle_fault(err, catches, env),
            other => other,
        };

        let Some(finally) = finally else {
            return outcome;
        };
        let saved = env.suspend_control();
        self.evaluate(finally, &Environment::sub(env))?;
        if env.is_terminated() {
            // `return` inside finally wins over the try/catch outcome.
            return Ok(env.terminate_value());
        }
        env.restore_control(saved)?;
        outcome
    }

    /// Find the first catch clause selecting `err` and run it.
    fn handle_fault(&mut self, err: EvalError, catches: &[Node], env: &Environment) -> EvalResult {
        for catch in catches {
            let NodeKind::Catch { cond, then } = &catch.kind else {
                return Err(errors::structural("Malformed catch clause"));
            };
            for clause in cond.iter().flat_map(|c| &c.lines) {
                let NodeKind::KeyValue { key, value } = &clause.kind else {
                    return Err(errors::structural("Catch clause must be 'name: Type'"));
                };
                let (Some(binding), Some(type_name)) =
                    (key.as_name(), value.as_deref().and_then(Node::as_name))
                else {
                    return Err(errors::structural("Catch clause must be 'name: Type'"));
                };
                if !self.fault_matches(&err, type_name) {
                    continue;
                }
                let scope = Environment::sub(env);
                scope.bind_local(binding, fault_value(err));
                return match then {
                    Some(then) => self.evaluate(then, &scope),
                    None => Ok(Value::Null),
                };
            }
        }
        Err(err)
    }

    fn fault_matches(&self, err: &EvalError, type_name: &str) -> bool {
        match &err.kind {
            EvalErrorKind::Thrown(instance) => self.is_subclass_of(&instance.class_name, type_name),
            _ => err.caught_by(type_name),
        }
    }
}

/// Value bound by `catch (e: T)`.
fn fault_value(err: EvalError) -> Value {
    match err.kind {
        EvalErrorKind::Thrown(instance) => Value::Instance(instance),
        _ => Value::Fault(std::rc::Rc::new(err)),
    }
}
