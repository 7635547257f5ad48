//! Function calls and class instantiation.

use std::rc::Rc;

use rustc_hash::FxHashSet;
use spl_ir::{Block, FuncDef, Loc, Node, NodeKind, UnaryOp};

use super::Interpreter;
use crate::diagnostics::CallFrame;
use crate::environment::Environment;
use crate::errors::{self, EvalError, EvalResult};
use crate::objects::{Class, ClassInstance, Function, ParamDefault, ParameterPair};
use crate::value::{OrderedMap, Value};

/// Evaluated call arguments.
#[derive(Debug, Default)]
pub struct Args {
    pub positional: Vec<Value>,
    /// `name = value` arguments, in source order.
    pub keywords: Vec<(String, Value)>,
}

impl Args {
    pub fn positional(values: Vec<Value>) -> Self {
        Args {
            positional: values,
            keywords: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keywords.is_empty()
    }

    /// Remove and return the keyword argument `name`.
    pub fn take_keyword(&mut self, name: &str) -> Option<Value> {
        let i = self.keywords.iter().position(|(k, _)| k == name)?;
        Some(self.keywords.remove(i).1)
    }

    /// Refuse keyword arguments for callables that take none.
    pub fn reject_keywords(&self, function: &str) -> Result<(), EvalError> {
        match self.keywords.first() {
            Some((name, _)) => Err(errors::unexpected_keyword(function, name)),
            None => Ok(()),
        }
    }
}

impl Interpreter {
    /// Evaluate call arguments in the caller's frame, left to right.
    pub(crate) fn eval_args(&mut self, args: &Block, env: &Environment) -> Result<Args, EvalError> {
        let mut out = Args::default();
        for arg in &args.lines {
            match &arg.kind {
                NodeKind::Assignment {
                    left,
                    right,
                    level: spl_ir::AssignLevel::Assign,
                } if left.as_name().is_some() => {
                    let value = self.eval_slot(right.as_deref(), env)?;
                    let name = left.as_name().unwrap_or_default().to_string();
                    out.keywords.push((name, value));
                }
                NodeKind::Unary {
                    op: UnaryOp::Unpack,
                    value,
                    ..
                } => match self.eval_slot(value.as_deref(), env)? {
                    Value::List(list) => out.positional.extend(list.to_vec()),
                    other => {
                        return Err(errors::type_mismatch("list", other.type_name()).with_loc(&arg.loc))
                    }
                },
                NodeKind::Unary {
                    op: UnaryOp::KwUnpack,
                    value,
                    ..
                } => match self.eval_slot(value.as_deref(), env)? {
                    Value::Pair(pair) => {
                        for (k, v) in pair.borrow().iter() {
                            let Value::Str(name) = k else {
                                return Err(errors::type_mismatch("string key", k.type_name())
                                    .with_loc(&arg.loc));
                            };
                            out.keywords.push((name.to_string(), v.clone()));
                        }
                    }
                    other => {
                        return Err(errors::type_mismatch("pair", other.type_name()).with_loc(&arg.loc))
                    }
                },
                _ => out.positional.push(self.evaluate(arg, env)?),
            }
        }
        Ok(out)
    }

    /// Build a function value. Default expressions are evaluated here, once.
    pub(crate) fn make_function(
        &mut self,
        def: &FuncDef,
        name: &str,
        env: &Environment,
        loc: &Loc,
    ) -> EvalResult {
        let mut params = Vec::new();
        for param in def.params.iter().flat_map(|p| &p.lines) {
            let pair = match &param.kind {
                NodeKind::Name(n) => ParameterPair {
                    name: n.clone(),
                    default: ParamDefault::Required,
                },
                NodeKind::Assignment { left, right, .. } if left.as_name().is_some() => {
                    let value = self.eval_slot(right.as_deref(), env)?;
                    ParameterPair {
                        name: left.as_name().unwrap_or_default().to_string(),
                        default: ParamDefault::Value(value),
                    }
                }
                NodeKind::Unary {
                    op: op @ (UnaryOp::Unpack | UnaryOp::KwUnpack),
                    value: Some(inner),
                    ..
                } if inner.as_name().is_some() => ParameterPair {
                    name: inner.as_name().unwrap_or_default().to_string(),
                    default: if *op == UnaryOp::Unpack {
                        ParamDefault::Unpack
                    } else {
                        ParamDefault::KwUnpack
                    },
                },
                _ => {
                    return Err(errors::structural(format!(
                        "Invalid parameter in definition of '{name}'"
                    ))
                    .with_loc(&param.loc))
                }
            };
            params.push(pair);
        }
        Ok(Value::Function(Rc::new(Function {
            name: name.to_string(),
            params,
            body: def.body.clone(),
            defining_env: env.clone(),
            is_abstract: def.is_abstract,
            tags: def.tags.clone(),
            doc: def.doc.clone(),
            loc: loc.clone(),
        })))
    }

    /// Bind arguments to parameters in a fresh Function frame.
    fn bind_params(func: &Function, args: Args, scope: &Environment) -> Result<(), EvalError> {
        let Args {
            positional,
            mut keywords,
        } = args;
        let given = positional.len();
        let mut positional = positional.into_iter();
        let mut accepted = 0;

        for param in &func.params {
            let value = match &param.default {
                ParamDefault::Unpack => Value::list(positional.by_ref().collect()),
                ParamDefault::KwUnpack => {
                    let mut map = OrderedMap::new();
                    for (k, v) in keywords.drain(..) {
                        map.insert(Value::str(&k), v)?;
                    }
                    Value::pair(map)
                }
                default => {
                    accepted += 1;
                    if let Some(v) = positional.next() {
                        v
                    } else if let Some(i) = keywords.iter().position(|(k, _)| *k == param.name) {
                        keywords.remove(i).1
                    } else if let ParamDefault::Value(v) = default {
                        v.clone()
                    } else {
                        return Err(errors::argument_missing(&func.name, &param.name));
                    }
                }
            };
            scope.bind_local(&param.name, value);
        }

        if positional.next().is_some() {
            return Err(errors::too_many_arguments(&func.name, accepted, given));
        }
        if let Some((name, _)) = keywords.first() {
            return Err(errors::unexpected_keyword(&func.name, name));
        }
        Ok(())
    }

    /// Call a user function. The result is the `return` value, or null.
    #[tracing::instrument(level = "debug", skip_all, fields(function = %func.name))]
    pub(crate) fn call_function(&mut self, func: &Function, args: Args, loc: &Loc) -> EvalResult {
        if func.is_abstract {
            return Err(errors::abstract_not_callable(&func.name));
        }
        let scope = Environment::function(&func.defining_env);
        Self::bind_params(func, args, &scope)?;

        self.call_stack.push(CallFrame {
            name: func.name.clone(),
            call_loc: Some(loc.clone()),
        })?;
        let result = match &func.body {
            Some(body) => self.evaluate(body, &scope),
            None => Ok(Value::Null),
        };
        let result = result.map_err(|e| self.call_stack.attach_backtrace(e));
        self.call_stack.pop();
        result?;

        Ok(if scope.is_terminated() {
            scope.terminate_value()
        } else {
            Value::Null
        })
    }

    /// Call anything callable: functions, built-ins, and instances (which
    /// runs their constructor).
    pub fn call_value(
        &mut self,
        callee: &Value,
        args: Args,
        env: &Environment,
        loc: &Loc,
    ) -> EvalResult {
        match callee {
            Value::Function(func) => self.call_function(func, args, loc),
            Value::Builtin(builtin) => (builtin.call)(self, args, env, loc),
            Value::Instance(instance) => self.construct(Rc::clone(instance), args, env, loc),
            other => Err(errors::not_callable(other.type_name())),
        }
    }

    pub(crate) fn eval_call(
        &mut self,
        callee: &Node,
        args: Option<&Block>,
        env: &Environment,
        loc: &Loc,
    ) -> EvalResult {
        let Some(args) = args else {
            return Err(errors::structural("Incomplete call"));
        };
        if let NodeKind::ClassInit { name } = &callee.kind {
            let instance = self.instantiate(name).map_err(|e| e.with_loc(&callee.loc))?;
            let args = self.eval_args(args, env)?;
            return self.construct(instance, args, env, loc);
        }
        let function = self.evaluate(callee, env)?;
        let args = self.eval_args(args, env)?;
        self.call_value(&function, args, env, loc)
    }

    /// Run the constructor (the method named after the class) and yield the
    /// instance. A class without one accepts an empty argument list.
    pub(crate) fn construct(
        &mut self,
        instance: Rc<ClassInstance>,
        args: Args,
        env: &Environment,
        loc: &Loc,
    ) -> EvalResult {
        match instance.member(&instance.class_name) {
            Some(ctor) => {
                self.call_value(&ctor, args, env, loc)?;
            }
            None if args.is_empty() => {}
            None => return Err(errors::no_constructor(&instance.class_name)),
        }
        Ok(Value::Instance(instance))
    }

    fn class_named(&self, name: &str) -> Result<Rc<Class>, EvalError> {
        match self.globals.get_heap(name) {
            Some(Value::Class(class)) => Ok(class),
            _ => Err(errors::not_a_class(name)),
        }
    }

    /// `new Name` without the constructor call. Abstract classes are refused.
    pub(crate) fn instantiate(&mut self, name: &str) -> Result<Rc<ClassInstance>, EvalError> {
        let class = self.class_named(name)?;
        if class.is_abstract {
            return Err(errors::abstract_not_instantiable(name));
        }
        self.build_instance(&class)
    }

    /// Allocate an instance and fill its frame from the class hierarchy.
    pub(crate) fn build_instance(&mut self, class: &Rc<Class>) -> Result<Rc<ClassInstance>, EvalError> {
        let instance = ClassInstance::new(&class.name, &class.defining_env);
        let mut chain = Vec::new();
        let mut done = FxHashSet::default();
        self.inherit(class, &instance.env, &mut chain, &mut done)?;
        tracing::debug!(class = %class.name, id = instance.id, "instantiated");
        Ok(instance)
    }

    /// Evaluate superclass bodies depth-first in declaration order, then the
    /// class's own body. A class reached twice through a diamond runs once.
    fn inherit(
        &mut self,
        class: &Rc<Class>,
        frame: &Environment,
        chain: &mut Vec<String>,
        done: &mut FxHashSet<String>,
    ) -> Result<(), EvalError> {
        if chain.contains(&class.name) {
            return Err(errors::cyclic_inheritance(&class.name));
        }
        if !done.insert(class.name.clone()) {
            return Ok(());
        }
        chain.push(class.name.clone());
        for parent in &class.superclass_names {
            let parent = self.class_named(parent)?;
            self.inherit(&parent, frame, chain, done)?;
        }
        if let Some(body) = &class.body {
            self.evaluate(body, frame)?;
        }
        chain.pop();
        Ok(())
    }

    /// Whether `child` is `ancestor` or inherits from it.
    pub fn is_subclass_of(&self, child: &str, ancestor: &str) -> bool {
        let mut pending = vec![child.to_string()];
        let mut seen = FxHashSet::default();
        while let Some(name) = pending.pop() {
            if name == ancestor {
                return true;
            }
            if !seen.insert(name.clone()) {
                continue;
            }
            if let Ok(class) = self.class_named(&name) {
                pending.extend(class.superclass_names.iter().cloned());
            }
        }
        false
    }

    /// Call method `name` of `instance` with positional arguments.
    pub fn call_method(
        &mut self,
        instance: &Rc<ClassInstance>,
        name: &str,
        args: Vec<Value>,
        loc: &Loc,
    ) -> EvalResult {
        let method = instance
            .member(name)
            .ok_or_else(|| errors::no_method(&instance.class_name, name))?;
        let env = instance.env.clone();
        self.call_value(&method, Args::positional(args), &env, loc)
    }
}
