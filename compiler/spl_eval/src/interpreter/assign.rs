//! Assignment targets: names, attributes and `obj[i]`.

use spl_ir::{AssignLevel, BinaryOp, Loc, Node, NodeKind};

use super::Interpreter;
use crate::environment::Environment;
use crate::errors::{self, EvalError, EvalResult};
use crate::operators;
use crate::value::Value;

impl Interpreter {
    pub(crate) fn eval_assignment(
        &mut self,
        left: &Node,
        right: Option<&Node>,
        level: AssignLevel,
        env: &Environment,
        loc: &Loc,
    ) -> EvalResult {
        let Some(name) = left.as_name() else {
            if level != AssignLevel::Assign {
                return Err(errors::structural("Only plain names can be declared"));
            }
            let value = self.eval_slot(right, env)?;
            self.store(left, value.clone(), env)?;
            return Ok(value);
        };

        let value = match right {
            Some(Node {
                kind: NodeKind::FuncDef(def),
                loc: def_loc,
            }) => self.make_function(def, name, env, def_loc)?,
            Some(node) => self.evaluate(node, env)?,
            None => Value::Undefined,
        };
        match level {
            AssignLevel::Assign => env.assign(name, value.clone())?,
            AssignLevel::Var => env.define_var(name, value.clone())?,
            AssignLevel::Const => env.define_const(name, value.clone())?,
            AssignLevel::FuncDefine => {
                let tags = match &value {
                    Value::Function(func) => func.tags.clone(),
                    _ => Vec::new(),
                };
                env.define_function(name, value.clone(), &tags, loc);
            }
        }
        Ok(value)
    }

    /// Write `value` into an existing target.
    fn store(&mut self, target: &Node, value: Value, env: &Environment) -> Result<(), EvalError> {
        match &target.kind {
            NodeKind::Name(name) => env.assign(name, value),
            NodeKind::Dot {
                left,
                right: Some(member),
                ..
            } => {
                let object = self.eval_slot(left.as_deref(), env)?;
                match &member.kind {
                    NodeKind::Name(attr) => Self::set_attribute(&object, attr, value),
                    NodeKind::Call {
                        callee,
                        args: Some(args),
                    } if callee.as_name() == Some("__getitem__") => {
                        let mut args = self.eval_args(args, env)?;
                        args.positional.push(value);
                        self.invoke_member(&object, "__setitem__", args, env, &member.loc)?;
                        Ok(())
                    }
                    _ => Err(errors::structural("Cannot assign to a method call")),
                }
            }
            _ => Err(errors::structural("Invalid assignment target")),
        }
    }

    /// `target op= value`
    pub(crate) fn eval_compound(
        &mut self,
        op: BinaryOp,
        target: Option<&Node>,
        right: Option<&Node>,
        env: &Environment,
        loc: &Loc,
    ) -> EvalResult {
        let target = target.ok_or_else(|| errors::structural("Incomplete expression"))?;
        let current = self.evaluate(target, env)?;
        let operand = self.eval_slot(right, env)?;
        let result = self.binary_values(op, current, operand, loc)?;
        self.store(target, result.clone(), env)?;
        Ok(result)
    }

    /// `++x`, `x--`, ... on integer targets.
    pub(crate) fn eval_inc_dec(
        &mut self,
        delta: i64,
        target: Option<&Node>,
        prefix: bool,
        env: &Environment,
    ) -> EvalResult {
        let target = target.ok_or_else(|| errors::structural("Incomplete expression"))?;
        let old = self.evaluate(target, env)?;
        let new = operators::step_int(&old, delta)?;
        self.store(target, new.clone(), env)?;
        Ok(if prefix { new } else { old })
    }
}
