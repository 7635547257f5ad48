//! Member access (`a.b`, `a.f(x)`, `a[i]`) and binary operator dispatch.

use spl_ir::{BinaryOp, Block, Loc, Node, NodeKind};

use super::{Args, Interpreter};
use crate::environment::Environment;
use crate::errors::{self, EvalError, EvalResult};
use crate::methods;
use crate::operators;
use crate::value::Value;

impl Interpreter {
    pub(crate) fn eval_dot(
        &mut self,
        left: Option<&Node>,
        right: Option<&Node>,
        env: &Environment,
        loc: &Loc,
    ) -> EvalResult {
        let object = self.eval_slot(left, env)?;
        let Some(right) = right else {
            return Err(errors::structural("Incomplete member access"));
        };
        match &right.kind {
            NodeKind::Name(attr) => self.get_attribute(&object, attr),
            NodeKind::Call { callee, args } => {
                self.member_call(&object, callee, args.as_ref(), env, loc)
            }
            _ => Err(errors::structural("Invalid member access")),
        }
    }

    /// `object.callee(args)`. Chained calls such as `obj.f(a)(b)` call the
    /// result of the inner member call.
    fn member_call(
        &mut self,
        object: &Value,
        callee: &Node,
        args: Option<&Block>,
        env: &Environment,
        loc: &Loc,
    ) -> EvalResult {
        let Some(args) = args else {
            return Err(errors::structural("Incomplete call"));
        };
        match &callee.kind {
            NodeKind::Name(name) => {
                let args = self.eval_args(args, env)?;
                self.invoke_member(object, name, args, env, loc)
            }
            NodeKind::Call {
                callee: inner,
                args: inner_args,
            } => {
                let function = self.member_call(object, inner, inner_args.as_ref(), env, loc)?;
                let args = self.eval_args(args, env)?;
                self.call_value(&function, args, env, loc)
            }
            _ => Err(errors::structural("Invalid method call")),
        }
    }

    /// Read `object.attr`.
    pub(crate) fn get_attribute(&self, object: &Value, attr: &str) -> EvalResult {
        if attr == "this" {
            return Err(errors::unauthorized_this());
        }
        match object {
            Value::Instance(instance) => instance
                .member(attr)
                .ok_or_else(|| errors::no_attribute(&instance.class_name, attr)),
            other => methods::attribute(self, other, attr),
        }
    }

    /// Write `object.attr = value`. Only existing members of instances can
    /// be reassigned.
    pub(crate) fn set_attribute(object: &Value, attr: &str, value: Value) -> Result<(), EvalError> {
        if attr == "this" {
            return Err(errors::unauthorized_this());
        }
        match object {
            Value::Instance(instance) => {
                if instance.env.assign_own(attr, value)? {
                    Ok(())
                } else {
                    Err(errors::no_attribute(&instance.class_name, attr))
                }
            }
            other => Err(errors::no_attribute(other.type_name(), attr)),
        }
    }

    /// Call method `name` on any receiver: instance members first, then
    /// the native method table of the receiver's type.
    pub(crate) fn invoke_member(
        &mut self,
        object: &Value,
        name: &str,
        args: Args,
        env: &Environment,
        loc: &Loc,
    ) -> EvalResult {
        match object {
            Value::Instance(instance) => {
                let method = instance
                    .member(name)
                    .ok_or_else(|| errors::no_method(&instance.class_name, name))?;
                let scope = instance.env.clone();
                self.call_value(&method, args, &scope, loc)
            }
            other => methods::call_method(self, other, name, args, env),
        }
    }

    pub(crate) fn eval_binary(
        &mut self,
        op: BinaryOp,
        left: Option<&Node>,
        right: Option<&Node>,
        env: &Environment,
        loc: &Loc,
    ) -> EvalResult {
        let lhs = self.eval_slot(left, env)?;
        if op.is_lazy() {
            return match operators::short_circuit(op, &lhs)? {
                Some(decided) => Ok(decided),
                None => self.eval_slot(right, env),
            };
        }
        let rhs = self.eval_slot(right, env)?;
        self.binary_values(op, lhs, rhs, loc)
    }

    /// Apply a non-lazy binary operator to evaluated operands.
    pub(crate) fn binary_values(
        &mut self,
        op: BinaryOp,
        left: Value,
        right: Value,
        loc: &Loc,
    ) -> EvalResult {
        if op == BinaryOp::InstanceOf {
            return self.instance_of(&left, &right).map(Value::Bool);
        }
        let Value::Instance(instance) = &left else {
            return operators::evaluate_binary(&left, &right, op);
        };
        match op {
            BinaryOp::Identical | BinaryOp::Is => return Ok(Value::Bool(left.is_identical(&right))),
            BinaryOp::NotIdentical => return Ok(Value::Bool(!left.is_identical(&right))),
            _ => {}
        }
        let Some(method) = op.dunder() else {
            return Err(errors::unsupported_operation(
                op.symbol(),
                left.type_name(),
                right.type_name(),
            ));
        };
        if instance.member(method).is_none() {
            return Err(errors::operator_not_supported(&instance.class_name, op.symbol()));
        }
        self.call_method(instance, method, vec![right], loc)
    }

    /// `value instanceof T` where `T` is a class or a built-in type function
    /// such as `int` or `list`.
    fn instance_of(&self, value: &Value, ty: &Value) -> Result<bool, EvalError> {
        match ty {
            Value::Class(class) => Ok(match value {
                Value::Instance(instance) => self.is_subclass_of(&instance.class_name, &class.name),
                Value::Fault(fault) => fault.caught_by(&class.name),
                _ => false,
            }),
            Value::Builtin(builtin) => Ok(value.type_name() == builtin.name),
            other => Err(errors::unsupported_operation(
                "instanceof",
                value.type_name(),
                other.type_name(),
            )),
        }
    }
}
