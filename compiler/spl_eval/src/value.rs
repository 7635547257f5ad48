//! Runtime values.
//!
//! Scalars are stored inline. Containers, functions, classes and instances
//! are reference counted: copying a `Value` shares the object, and
//! identity (`===`) compares object ids or pointers.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt::{self, Write as _};
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::builtins::Builtin;
use crate::errors::{self, EvalError};
use crate::memory::{self, ObjectId};
use crate::objects::{Class, ClassInstance, Function, NativeObject};

#[derive(Clone)]
pub enum Value {
    Null,
    /// Value of a declared but unassigned variable.
    Undefined,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    List(Rc<List>),
    Pair(Rc<Pair>),
    Set(Rc<Set>),
    Function(Rc<Function>),
    Builtin(&'static Builtin),
    Class(Rc<Class>),
    Instance(Rc<ClassInstance>),
    Native(Rc<NativeObject>),
    /// A runtime fault bound by `catch`.
    Fault(Rc<EvalError>),
}

impl Value {
    #[inline]
    pub fn str(s: &str) -> Self {
        Value::Str(Rc::from(s))
    }

    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Rc::new(List::new(items, false)))
    }

    pub fn immutable_list(items: Vec<Value>) -> Self {
        Value::List(Rc::new(List::new(items, true)))
    }

    pub fn pair(map: OrderedMap) -> Self {
        Value::Pair(Rc::new(Pair::new(map)))
    }

    pub fn set(map: OrderedMap) -> Self {
        Value::Set(Rc::new(Set::new(map)))
    }

    /// Name reported by `type()` and matched by `instanceof`.
    pub fn type_name(&self) -> &str {
        match self {
            Value::Null => "void",
            Value::Undefined => "undefined",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Pair(_) => "pair",
            Value::Set(_) => "set",
            Value::Function(_) => "function",
            Value::Builtin(_) => "builtin",
            Value::Class(_) => "class",
            Value::Instance(instance) => &instance.class_name,
            Value::Native(native) => native.type_name(),
            Value::Fault(err) => err.kind.exception_name(),
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null | Value::Undefined => false,
            Value::Bool(b) => *b,
            Value::Int(v) => *v != 0,
            Value::Float(v) => *v != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(list) => list.len() > 0,
            Value::Pair(pair) => !pair.borrow().is_empty(),
            Value::Set(set) => !set.borrow().is_empty(),
            _ => true,
        }
    }

    #[inline]
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            #[expect(clippy::cast_precision_loss, reason = "int to float promotion")]
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn object_id(&self) -> Option<ObjectId> {
        match self {
            Value::List(list) => Some(list.id),
            Value::Pair(pair) => Some(pair.id),
            Value::Set(set) => Some(set.id),
            Value::Instance(instance) => Some(instance.id),
            Value::Native(native) => Some(native.id),
            _ => None,
        }
    }

    /// `===`: same scalar, or same object.
    pub fn is_identical(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) | (Value::Undefined, Value::Undefined) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            #[expect(clippy::float_cmp, reason = "identity of float scalars")]
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => std::ptr::eq(*a, *b),
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            (Value::Fault(a), Value::Fault(b)) => Rc::ptr_eq(a, b),
            _ => match (self.object_id(), other.object_id()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }

    /// Structural `==` for scalars and native containers.
    ///
    /// Instances compare by identity here; the interpreter dispatches
    /// `__eq__` before falling back to this.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (a, b) if a.is_number() && b.is_number() => a.as_f64() == b.as_f64(),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                let (a, b) = (a.items(), b.items());
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.equals(y))
            }
            (Value::Pair(a), Value::Pair(b)) => a.borrow().same_entries(&b.borrow()),
            (Value::Set(a), Value::Set(b)) => a.borrow().same_entries(&b.borrow()),
            _ => self.is_identical(other),
        }
    }

    /// Key used by pairs and sets.
    pub fn hash_key(&self) -> Result<HashKey, EvalError> {
        Ok(match self {
            Value::Null => HashKey::Null,
            Value::Bool(b) => HashKey::Bool(*b),
            Value::Int(v) => HashKey::Int(*v),
            Value::Float(v) => float_key(*v),
            Value::Str(s) => HashKey::Str(Rc::clone(s)),
            Value::Function(f) => HashKey::Ptr(Rc::as_ptr(f).cast::<()>() as usize),
            Value::Class(c) => HashKey::Ptr(Rc::as_ptr(c).cast::<()>() as usize),
            Value::Builtin(b) => HashKey::Ptr(std::ptr::from_ref(*b).cast::<()>() as usize),
            Value::Instance(i) => HashKey::Id(i.id),
            Value::Native(n) => HashKey::Id(n.id),
            other => return Err(errors::unhashable(other.type_name())),
        })
    }

    /// Source-like rendering: strings quoted, containers recursive.
    pub fn repr(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_repr(&mut out);
        out
    }

    fn write_repr(&self, out: &mut impl fmt::Write) -> fmt::Result {
        match self {
            Value::Str(s) => write_quoted(out, s),
            other => write!(out, "{other}"),
        }
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "only integral floats in i64 range are folded"
)]
fn float_key(v: f64) -> HashKey {
    if v.fract() == 0.0 && v.abs() < 9.0e15 {
        HashKey::Int(v as i64)
    } else {
        HashKey::Float(v.to_bits())
    }
}

fn write_quoted(out: &mut impl fmt::Write, s: &str) -> fmt::Result {
    out.write_char('"')?;
    for c in s.chars() {
        match c {
            '"' => out.write_str("\\\"")?,
            '\\' => out.write_str("\\\\")?,
            '\n' => out.write_str("\\n")?,
            '\t' => out.write_str("\\t")?,
            '\r' => out.write_str("\\r")?,
            '\0' => out.write_str("\\0")?,
            c => out.write_char(c)?,
        }
    }
    out.write_char('"')
}

/// Float formatting: integral values keep a trailing `.0`.
pub fn format_float(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Undefined => f.write_str("undefined"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => f.write_str(&format_float(*v)),
            Value::Str(s) => f.write_str(s),
            Value::List(list) => {
                f.write_char('[')?;
                for (i, item) in list.items().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    item.write_repr(f)?;
                }
                f.write_char(']')
            }
            Value::Pair(pair) => {
                f.write_char('{')?;
                for (i, (k, v)) in pair.borrow().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    k.write_repr(f)?;
                    f.write_str(": ")?;
                    v.write_repr(f)?;
                }
                f.write_char('}')
            }
            Value::Set(set) => {
                let set = set.borrow();
                if set.is_empty() {
                    return f.write_str("set()");
                }
                f.write_char('{')?;
                for (i, k) in set.keys().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    k.write_repr(f)?;
                }
                f.write_char('}')
            }
            Value::Function(func) => write!(f, "<function {}>", func.name),
            Value::Builtin(b) => write!(f, "<built-in function {}>", b.name),
            Value::Class(class) => write!(f, "<class {}>", class.name),
            Value::Instance(instance) => {
                write!(f, "<{} at {}>", instance.class_name, instance.id)
            }
            Value::Native(native) => write!(f, "{native}"),
            Value::Fault(err) => write!(f, "{}: {}", err.kind, err.message),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_repr(f)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::str(s)
    }
}

/// Hashable projection of a [`Value`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum HashKey {
    Null,
    Bool(bool),
    Int(i64),
    /// Bits of a non-integral float.
    Float(u64),
    Str(Rc<str>),
    Id(ObjectId),
    Ptr(usize),
}

/// Insertion-ordered hash map keyed by values.
#[derive(Clone, Default)]
pub struct OrderedMap {
    entries: Vec<(Value, Value)>,
    index: FxHashMap<HashKey, usize>,
}

impl OrderedMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert or overwrite. Overwriting keeps the original position.
    pub fn insert(&mut self, key: Value, value: Value) -> Result<(), EvalError> {
        let hash = key.hash_key()?;
        if let Some(&i) = self.index.get(&hash) {
            self.entries[i].1 = value;
        } else {
            self.index.insert(hash, self.entries.len());
            self.entries.push((key, value));
        }
        Ok(())
    }

    pub fn get(&self, key: &Value) -> Result<Option<&Value>, EvalError> {
        let hash = key.hash_key()?;
        Ok(self.index.get(&hash).map(|&i| &self.entries[i].1))
    }

    pub fn contains(&self, key: &Value) -> Result<bool, EvalError> {
        Ok(self.index.contains_key(&key.hash_key()?))
    }

    /// Remove the most recently inserted entry.
    pub fn pop_last(&mut self) -> Option<(Value, Value)> {
        let (key, value) = self.entries.pop()?;
        if let Ok(hash) = key.hash_key() {
            self.index.remove(&hash);
        }
        Some((key, value))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    fn same_entries(&self, other: &OrderedMap) -> bool {
        self.len() == other.len()
            && self.iter().all(|(k, v)| {
                matches!(other.get(k), Ok(Some(theirs)) if theirs.equals(v))
            })
    }
}

/// `[...]` (mutable) or `~[...]` (immutable).
pub struct List {
    pub id: ObjectId,
    items: RefCell<Vec<Value>>,
    immutable: bool,
}

impl List {
    pub fn new(items: Vec<Value>, immutable: bool) -> Self {
        List {
            id: memory::next_id(),
            items: RefCell::new(items),
            immutable,
        }
    }

    #[inline]
    pub fn is_immutable(&self) -> bool {
        self.immutable
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn items(&self) -> Ref<'_, Vec<Value>> {
        self.items.borrow()
    }

    /// Mutable access, refused for immutable lists.
    pub fn items_mut(&self) -> Result<RefMut<'_, Vec<Value>>, EvalError> {
        if self.immutable {
            return Err(errors::immutable_list());
        }
        Ok(self.items.borrow_mut())
    }

    /// Copy of the current items, safe to hold across evaluation.
    pub fn to_vec(&self) -> Vec<Value> {
        self.items.borrow().clone()
    }
}

/// `{key: value, ...}` / `pair()`.
pub struct Pair {
    pub id: ObjectId,
    map: RefCell<OrderedMap>,
}

impl Pair {
    pub fn new(map: OrderedMap) -> Self {
        Pair {
            id: memory::next_id(),
            map: RefCell::new(map),
        }
    }

    pub fn borrow(&self) -> Ref<'_, OrderedMap> {
        self.map.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, OrderedMap> {
        self.map.borrow_mut()
    }
}

/// `set(...)`. Members are the keys of an [`OrderedMap`] with null values.
pub struct Set {
    pub id: ObjectId,
    map: RefCell<OrderedMap>,
}

impl Set {
    pub fn new(map: OrderedMap) -> Self {
        Set {
            id: memory::next_id(),
            map: RefCell::new(map),
        }
    }

    pub fn from_values(values: impl IntoIterator<Item = Value>) -> Result<Self, EvalError> {
        let mut map = OrderedMap::new();
        for v in values {
            map.insert(v, Value::Null)?;
        }
        Ok(Set::new(map))
    }

    pub fn borrow(&self) -> Ref<'_, OrderedMap> {
        self.map.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, OrderedMap> {
        self.map.borrow_mut()
    }
}
