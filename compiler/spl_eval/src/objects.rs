//! Runtime objects: functions, classes, instances and host objects.

use std::fmt;
use std::rc::Rc;

use spl_ir::{Loc, Node};

use crate::environment::Environment;
use crate::memory::{self, ObjectId};
use crate::methods::file::FileHandle;
use crate::value::Value;
use crate::worker::ThreadHandle;

/// How a parameter is filled when the call does not name it.
#[derive(Clone, Debug)]
pub enum ParamDefault {
    Required,
    /// Evaluated once, when the function was defined.
    Value(Value),
    /// `*name`: remaining positional arguments as a list.
    Unpack,
    /// `**name`: unclaimed keyword arguments as a pair.
    KwUnpack,
}

#[derive(Clone, Debug)]
pub struct ParameterPair {
    pub name: String,
    pub default: ParamDefault,
}

/// A user function or method.
pub struct Function {
    pub name: String,
    pub params: Vec<ParameterPair>,
    pub body: Option<Rc<Node>>,
    /// Frame the function was defined in; calls run in a child of it.
    pub defining_env: Environment,
    pub is_abstract: bool,
    pub tags: Vec<String>,
    pub doc: String,
    pub loc: Loc,
}

impl Function {
    /// `name(a, b = 1, *rest)` as shown by `help`.
    pub fn signature(&self) -> String {
        let params: Vec<String> = self
            .params
            .iter()
            .map(|p| match &p.default {
                ParamDefault::Required => p.name.clone(),
                ParamDefault::Value(v) => format!("{}={}", p.name, v.repr()),
                ParamDefault::Unpack => format!("*{}", p.name),
                ParamDefault::KwUnpack => format!("**{}", p.name),
            })
            .collect();
        format!("{}({})", self.name, params.join(", "))
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("is_abstract", &self.is_abstract)
            .finish_non_exhaustive()
    }
}

/// A class declaration, registered in the heap under its name.
pub struct Class {
    pub name: String,
    /// Declaration order, implicit `Object` last.
    pub superclass_names: Vec<String>,
    pub body: Option<Rc<Node>>,
    pub is_abstract: bool,
    pub doc: String,
    pub defining_env: Environment,
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.name)
            .field("superclass_names", &self.superclass_names)
            .field("is_abstract", &self.is_abstract)
            .finish_non_exhaustive()
    }
}

/// An object created by `new`.
///
/// The instance owns its Class-kind environment; the environment points back
/// at the instance weakly so `this` resolves without a cycle.
pub struct ClassInstance {
    pub id: ObjectId,
    pub class_name: String,
    pub env: Environment,
}

impl ClassInstance {
    /// Allocate an instance with an empty member frame under `outer`.
    pub fn new(class_name: &str, outer: &Environment) -> Rc<Self> {
        let instance = Rc::new(ClassInstance {
            id: memory::next_id(),
            class_name: class_name.to_string(),
            env: Environment::class(outer),
        });
        instance.env.set_this(&instance);
        instance
    }

    /// Member lookup restricted to the instance's own frame.
    pub fn member(&self, name: &str) -> Option<Value> {
        self.env.own(name)
    }
}

impl fmt::Debug for ClassInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassInstance")
            .field("id", &self.id)
            .field("class_name", &self.class_name)
            .finish_non_exhaustive()
    }
}

/// Host object exposed to scripts.
pub struct NativeObject {
    pub id: ObjectId,
    pub kind: NativeKind,
}

pub enum NativeKind {
    /// `system`: argv, cwd, encoding, time, sleep.
    System,
    /// `os`: platform name, path separator, directory listing.
    Os,
    /// `natives`: helpers that need the interpreter.
    Natives,
    File(FileHandle),
    Thread(ThreadHandle),
}

impl NativeObject {
    pub fn new(kind: NativeKind) -> Rc<Self> {
        Rc::new(NativeObject {
            id: memory::next_id(),
            kind,
        })
    }

    pub fn type_name(&self) -> &'static str {
        match self.kind {
            NativeKind::System => "system",
            NativeKind::Os => "os",
            NativeKind::Natives => "natives",
            NativeKind::File(_) => "file",
            NativeKind::Thread(_) => "thread",
        }
    }
}

impl fmt::Display for NativeObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            NativeKind::File(file) => write!(f, "<file '{}'>", file.path()),
            NativeKind::Thread(thread) => write!(f, "<thread {}>", thread.function()),
            _ => write!(f, "<{}>", self.type_name()),
        }
    }
}
