//! Script-visible string conversion.
//!
//! `print`, `string()` and string formatting go through [`Interpreter::stringify`];
//! `repr()` and container elements through [`Interpreter::repr_of`]. Both
//! honour the `__str__` / `__repr__` methods of class instances, which is why
//! they live on the interpreter instead of on [`Value`].

use spl_ir::Loc;

use super::Interpreter;
use crate::errors::{self, EvalError};
use crate::memory::ObjectId;
use crate::value::Value;

impl Interpreter {
    pub(crate) fn stringify(&mut self, value: &Value) -> Result<String, EvalError> {
        match value {
            Value::Instance(instance) if instance.member("__str__").is_some() => {
                let text = self.call_method(instance, "__str__", Vec::new(), &Loc::internal())?;
                expect_text(text, "__str__")
            }
            Value::List(_) | Value::Pair(_) | Value::Set(_) | Value::Instance(_) => {
                self.repr_of(value)
            }
            other => Ok(other.to_string()),
        }
    }

    pub(crate) fn repr_of(&mut self, value: &Value) -> Result<String, EvalError> {
        let mut open = Vec::new();
        self.write_repr(value, &mut open)
    }

    /// `open` holds the containers currently being rendered; meeting one
    /// again prints an ellipsis instead of recursing forever.
    fn write_repr(&mut self, value: &Value, open: &mut Vec<ObjectId>) -> Result<String, EvalError> {
        let id = match value {
            Value::List(_) | Value::Pair(_) | Value::Set(_) => value.object_id(),
            _ => None,
        };
        if let Some(id) = id {
            if open.contains(&id) {
                return Ok("...".to_string());
            }
            open.push(id);
        }

        let text = match value {
            Value::Instance(instance) => {
                let hook = ["__repr__", "__str__"]
                    .into_iter()
                    .find(|name| instance.member(name).is_some());
                match hook {
                    Some(hook) => {
                        let text = self.call_method(instance, hook, Vec::new(), &Loc::internal())?;
                        expect_text(text, hook)?
                    }
                    None => value.to_string(),
                }
            }
            Value::List(list) => {
                let mut parts = Vec::with_capacity(list.len());
                for item in list.to_vec() {
                    parts.push(self.write_repr(&item, open)?);
                }
                format!("[{}]", parts.join(", "))
            }
            Value::Pair(pair) => {
                let entries: Vec<(Value, Value)> = pair
                    .borrow()
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                let mut parts = Vec::with_capacity(entries.len());
                for (k, v) in entries {
                    let k = self.write_repr(&k, open)?;
                    let v = self.write_repr(&v, open)?;
                    parts.push(format!("{k}: {v}"));
                }
                format!("{{{}}}", parts.join(", "))
            }
            Value::Set(set) => {
                let keys: Vec<Value> = set.borrow().keys().cloned().collect();
                if keys.is_empty() {
                    "set()".to_string()
                } else {
                    let mut parts = Vec::with_capacity(keys.len());
                    for k in keys {
                        parts.push(self.write_repr(&k, open)?);
                    }
                    format!("{{{}}}", parts.join(", "))
                }
            }
            other => other.repr(),
        };

        if id.is_some() {
            open.pop();
        }
        Ok(text)
    }
}

fn expect_text(value: Value, hook: &str) -> Result<String, EvalError> {
    match value {
        Value::Str(s) => Ok(s.to_string()),
        other => Err(errors::type_mismatch(
            &format!("string from {hook}"),
            other.type_name(),
        )),
    }
}
