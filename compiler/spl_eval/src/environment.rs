//! Scope frames.
//!
//! Every construct that introduces names gets its own frame, linked to the
//! enclosing one through `outer`. Frames come in five kinds:
//!
//! - `Global`: the program's top frame; creates the heap.
//! - `Class`: an instance's member frame; resolves `this`.
//! - `Function`: one per call; records `return`.
//! - `Loop`: loop title and body frames; record `break` / `continue`.
//! - `Sub`: `if` branches, `try` bodies, `catch` clauses.
//!
//! Global, Class and Function are *main* frames: they bound the
//! "already defined" check. Loop and Sub frames are transparent for it, and
//! Sub frames also forward definitions and control signals to their outer
//! frame. The heap (classes and built-ins) is shared by every frame of an
//! interpreter and is passed explicitly from parent to child.

use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::fmt;
use std::ops::Deref;
use std::rc::{Rc, Weak};

use spl_ir::Loc;

use crate::errors::{self, EvalError};
use crate::objects::ClassInstance;
use crate::value::Value;

/// A single-threaded shared cell.
///
/// All frames and the heap are allocated through [`LocalScope::new`]; the
/// wrapper has the layout of `Rc<RefCell<T>>`.
#[repr(transparent)]
pub struct LocalScope<T>(Rc<RefCell<T>>);

impl<T> LocalScope<T> {
    #[inline]
    pub fn new(value: T) -> Self {
        LocalScope(Rc::new(RefCell::new(value)))
    }

    #[inline]
    pub fn borrow(&self) -> std::cell::Ref<'_, T> {
        self.0.borrow()
    }

    #[inline]
    pub fn borrow_mut(&self) -> std::cell::RefMut<'_, T> {
        self.0.borrow_mut()
    }

    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> Clone for LocalScope<T> {
    #[inline]
    fn clone(&self) -> Self {
        LocalScope(Rc::clone(&self.0))
    }
}

impl<T: Default> Default for LocalScope<T> {
    fn default() -> Self {
        LocalScope::new(T::default())
    }
}

impl<T> Deref for LocalScope<T> {
    type Target = RefCell<T>;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Classes and built-ins, keyed by name.
pub type Heap = LocalScope<FxHashMap<String, Value>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    Class,
    Function,
    Loop,
    Sub,
}

impl ScopeKind {
    /// Main frames own an independent variable layer.
    #[inline]
    pub fn is_main(self) -> bool {
        matches!(self, ScopeKind::Global | ScopeKind::Class | ScopeKind::Function)
    }
}

/// One frame.
struct Scope {
    kind: ScopeKind,
    variables: FxHashMap<String, Value>,
    constants: FxHashMap<String, Value>,
    outer: Option<Environment>,
    heap: Heap,
    /// Function frames: `return` seen.
    terminated: bool,
    exit_value: Value,
    /// Loop frames: `break` seen.
    broken: bool,
    /// Loop frames: `continue` seen.
    paused: bool,
    /// Class frames: the owning instance.
    this: Weak<ClassInstance>,
}

impl Scope {
    fn new(kind: ScopeKind, outer: Option<Environment>, heap: Heap) -> Self {
        Scope {
            kind,
            variables: FxHashMap::default(),
            constants: FxHashMap::default(),
            outer,
            heap,
            terminated: false,
            exit_value: Value::Null,
            broken: false,
            paused: false,
            this: Weak::new(),
        }
    }

    fn own(&self, name: &str) -> Option<Value> {
        if let Some(v) = self.constants.get(name).or_else(|| self.variables.get(name)) {
            return Some(v.clone());
        }
        if name == "this" {
            return self.this.upgrade().map(Value::Instance);
        }
        None
    }
}

/// Control state set aside while a `finally` block runs.
#[derive(Debug, Default)]
pub struct SuspendedControl {
    exit_value: Option<Value>,
    broken: bool,
    paused: bool,
}

/// Handle to a frame. Cloning shares the frame.
#[derive(Clone)]
pub struct Environment(LocalScope<Scope>);

impl Environment {
    /// A fresh global frame with an empty heap.
    pub fn global() -> Self {
        Environment(LocalScope::new(Scope::new(
            ScopeKind::Global,
            None,
            Heap::default(),
        )))
    }

    fn child(kind: ScopeKind, outer: &Environment) -> Self {
        let heap = outer.heap();
        Environment(LocalScope::new(Scope::new(kind, Some(outer.clone()), heap)))
    }

    pub fn class(outer: &Environment) -> Self {
        Self::child(ScopeKind::Class, outer)
    }

    pub fn function(outer: &Environment) -> Self {
        Self::child(ScopeKind::Function, outer)
    }

    pub fn loop_frame(outer: &Environment) -> Self {
        Self::child(ScopeKind::Loop, outer)
    }

    pub fn sub(outer: &Environment) -> Self {
        Self::child(ScopeKind::Sub, outer)
    }

    #[inline]
    pub fn kind(&self) -> ScopeKind {
        self.0.borrow().kind
    }

    fn outer(&self) -> Option<Environment> {
        self.0.borrow().outer.clone()
    }

    pub fn heap(&self) -> Heap {
        self.0.borrow().heap.clone()
    }

    #[inline]
    pub fn ptr_eq(&self, other: &Environment) -> bool {
        self.0.ptr_eq(&other.0)
    }

    // Lookup

    /// This frame's own binding.
    pub fn own(&self, name: &str) -> Option<Value> {
        self.0.borrow().own(name)
    }

    /// Full lookup: this frame, every outer frame, then the heap.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        let mut frame = Some(self.clone());
        while let Some(env) = frame {
            if let Some(v) = env.own(name) {
                return Some(v);
            }
            frame = env.outer();
        }
        self.get_heap(name)
    }

    pub fn get(&self, name: &str) -> Result<Value, EvalError> {
        self.lookup(name).ok_or_else(|| errors::undefined_name(name))
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Lookup bounded by the nearest main frame, then the heap.
    pub fn local_get(&self, name: &str) -> Option<Value> {
        let mut env = self.clone();
        loop {
            if let Some(v) = env.own(name) {
                return Some(v);
            }
            if env.kind().is_main() {
                break;
            }
            match env.outer() {
                Some(outer) => env = outer,
                None => break,
            }
        }
        self.get_heap(name)
    }

    pub fn local_contains(&self, name: &str) -> bool {
        self.local_get(name).is_some()
    }

    // Definitions

    /// Frame that receives definitions made here: Sub frames forward them.
    fn definition_frame(&self) -> Environment {
        let mut env = self.clone();
        while env.kind() == ScopeKind::Sub {
            match env.outer() {
                Some(outer) => env = outer,
                None => break,
            }
        }
        env
    }

    pub fn define_var(&self, name: &str, value: Value) -> Result<(), EvalError> {
        let target = self.definition_frame();
        if target.local_contains(name) {
            return Err(errors::already_defined(name));
        }
        target.0.borrow_mut().variables.insert(name.to_string(), value);
        Ok(())
    }

    pub fn define_const(&self, name: &str, value: Value) -> Result<(), EvalError> {
        let target = self.definition_frame();
        if target.contains_key(name) {
            return Err(errors::already_defined(name));
        }
        target.0.borrow_mut().constants.insert(name.to_string(), value);
        Ok(())
    }

    /// Define or overwrite a function binding.
    ///
    /// Re-declaring a visible lowercase name without `@Override` or
    /// `@Suppress` is reported as a warning.
    pub fn define_function(&self, name: &str, value: Value, tags: &[String], loc: &Loc) {
        let tagged = tags.iter().any(|t| t == "Override" || t == "Suppress");
        let lowercase = name.chars().next().is_some_and(char::is_lowercase);
        let target = self.definition_frame();
        if !tagged && lowercase && target.contains_key(name) {
            tracing::warn!(name, %loc, "re-declaring method without @Override");
        }
        target.0.borrow_mut().variables.insert(name.to_string(), value);
    }

    /// Bind `name` in exactly this frame, without checks.
    pub fn bind_local(&self, name: &str, value: Value) {
        self.0.borrow_mut().variables.insert(name.to_string(), value);
    }

    /// Rebind the nearest variable called `name`.
    pub fn assign(&self, name: &str, value: Value) -> Result<(), EvalError> {
        let mut frame = Some(self.clone());
        while let Some(env) = frame {
            {
                let mut scope = env.0.borrow_mut();
                if scope.constants.contains_key(name) {
                    return Err(errors::assign_to_constant(name));
                }
                if let Some(slot) = scope.variables.get_mut(name) {
                    *slot = value;
                    return Ok(());
                }
            }
            frame = env.outer();
        }
        Err(errors::undefined_name(name))
    }

    /// Rebind a member of this frame only. Returns `false` when absent.
    pub fn assign_own(&self, name: &str, value: Value) -> Result<bool, EvalError> {
        let mut scope = self.0.borrow_mut();
        if scope.constants.contains_key(name) {
            return Err(errors::assign_to_constant(name));
        }
        match scope.variables.get_mut(name) {
            Some(slot) => {
                *slot = value;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // Function termination

    /// Record `return value`.
    pub fn terminate(&self, value: Value) -> Result<(), EvalError> {
        let outer = {
            let mut scope = self.0.borrow_mut();
            match scope.kind {
                ScopeKind::Function => {
                    scope.terminated = true;
                    scope.exit_value = value;
                    return Ok(());
                }
                ScopeKind::Loop => {
                    scope.broken = true;
                    scope.outer.clone()
                }
                ScopeKind::Sub => scope.outer.clone(),
                ScopeKind::Global | ScopeKind::Class => {
                    return Err(errors::return_outside_function())
                }
            }
        };
        match outer {
            Some(outer) => outer.terminate(value),
            None => Err(errors::return_outside_function()),
        }
    }

    /// Nearest function frame, looking through Loop and Sub frames.
    fn function_frame(&self) -> Option<Environment> {
        let mut env = self.clone();
        loop {
            match env.kind() {
                ScopeKind::Function => return Some(env),
                ScopeKind::Loop | ScopeKind::Sub => env = env.outer()?,
                ScopeKind::Global | ScopeKind::Class => return None,
            }
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.function_frame()
            .is_some_and(|f| f.0.borrow().terminated)
    }

    pub fn terminate_value(&self) -> Value {
        self.function_frame()
            .map_or(Value::Null, |f| f.0.borrow().exit_value.clone())
    }

    // Loop control

    /// Nearest loop frame, looking through Sub frames only.
    fn nearest_loop(&self) -> Option<Environment> {
        let mut env = self.clone();
        loop {
            match env.kind() {
                ScopeKind::Loop => return Some(env),
                ScopeKind::Sub => env = env.outer()?,
                _ => return None,
            }
        }
    }

    pub fn break_loop(&self) -> Result<(), EvalError> {
        let frame = self.nearest_loop().ok_or_else(errors::break_outside_loop)?;
        frame.0.borrow_mut().broken = true;
        Ok(())
    }

    pub fn pause_loop(&self) -> Result<(), EvalError> {
        let frame = self
            .nearest_loop()
            .ok_or_else(errors::continue_outside_loop)?;
        frame.0.borrow_mut().paused = true;
        Ok(())
    }

    /// Clear a pending `continue`. No effect outside loops.
    pub fn resume_loop(&self) {
        if let Some(frame) = self.nearest_loop() {
            frame.0.borrow_mut().paused = false;
        }
    }

    pub fn is_broken(&self) -> bool {
        self.nearest_loop().is_some_and(|f| f.0.borrow().broken)
    }

    /// Whether statements after the current one must be skipped.
    pub fn loop_interrupted(&self) -> bool {
        self.nearest_loop().is_some_and(|f| {
            let scope = f.0.borrow();
            scope.broken || scope.paused
        })
    }

    /// Drop every binding of a loop body frame before the next iteration.
    pub fn invalidate(&self) {
        let mut scope = self.0.borrow_mut();
        scope.variables.clear();
        scope.constants.clear();
        scope.paused = false;
    }

    /// Take a pending `return`, `break` or `continue` out of the way.
    pub fn suspend_control(&self) -> SuspendedControl {
        let exit_value = self.function_frame().and_then(|f| {
            let mut scope = f.0.borrow_mut();
            if scope.terminated {
                scope.terminated = false;
                Some(std::mem::replace(&mut scope.exit_value, Value::Null))
            } else {
                None
            }
        });
        let (broken, paused) = self.nearest_loop().map_or((false, false), |f| {
            let mut scope = f.0.borrow_mut();
            (
                std::mem::take(&mut scope.broken),
                std::mem::take(&mut scope.paused),
            )
        });
        SuspendedControl {
            exit_value,
            broken,
            paused,
        }
    }

    /// Reinstate what [`Environment::suspend_control`] set aside.
    pub fn restore_control(&self, saved: SuspendedControl) -> Result<(), EvalError> {
        if let Some(frame) = self.nearest_loop() {
            let mut scope = frame.0.borrow_mut();
            scope.broken |= saved.broken;
            scope.paused |= saved.paused;
        }
        match saved.exit_value {
            Some(value) => self.terminate(value),
            None => Ok(()),
        }
    }

    // Heap

    pub fn add_heap(&self, name: &str, value: Value) {
        self.heap().borrow_mut().insert(name.to_string(), value);
    }

    pub fn get_heap(&self, name: &str) -> Option<Value> {
        self.heap().borrow().get(name).cloned()
    }

    /// Own constants and variables, sorted by name.
    pub fn attributes(&self) -> Vec<(String, Value)> {
        let scope = self.0.borrow();
        let mut attrs: Vec<(String, Value)> = scope
            .constants
            .iter()
            .chain(scope.variables.iter())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        attrs.sort_by(|a, b| a.0.cmp(&b.0));
        attrs
    }

    // Instances

    pub fn set_this(&self, instance: &Rc<ClassInstance>) {
        self.0.borrow_mut().this = Rc::downgrade(instance);
    }

    /// Instance owning the nearest Class frame.
    pub fn this(&self) -> Option<Rc<ClassInstance>> {
        match self.lookup("this") {
            Some(Value::Instance(instance)) => Some(instance),
            _ => None,
        }
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scope = self.0.borrow();
        let mut names: Vec<&String> = scope.constants.keys().chain(scope.variables.keys()).collect();
        names.sort();
        f.debug_struct("Environment")
            .field("kind", &scope.kind)
            .field("names", &names)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
