//! Runtime faults.
//!
//! Every fault the evaluator raises is an [`EvalError`]: a kind, a
//! human-readable message, the location of the node being evaluated and,
//! once it has crossed a function boundary, a backtrace. Factory functions
//! are `#[cold]` so the happy path stays small.
//!
//! Kinds fall in three groups:
//! - language faults (`Name`, `Type`, ...), catchable as `Exception` or as
//!   `<Kind>Exception`;
//! - `Thrown`, an instance raised by `throw`, matched by its class ancestry;
//! - host faults (`StackOverflow`, `Structural`), catchable only as
//!   `Exception`, and `Exit`, which is never caught.

use std::fmt;
use std::rc::Rc;

use spl_ir::Loc;

use crate::objects::ClassInstance;
use crate::value::Value;

/// Result of evaluation.
pub type EvalResult = Result<Value, EvalError>;

#[derive(Clone, Debug)]
pub enum EvalErrorKind {
    Name,
    Type,
    IndexOutOfRange,
    Io,
    AbstractMethod,
    Unauthorized,
    IllegalOperation,
    Argument,
    Arithmetic,
    Attribute,
    StringFormat,
    Assertion,
    /// `throw instance`
    Thrown(Rc<ClassInstance>),
    StackOverflow {
        depth: usize,
    },
    /// The tree or the runtime is in a shape the evaluator cannot handle.
    Structural,
    /// `exit(code)`
    Exit(i32),
}

impl EvalErrorKind {
    /// Class name a `catch` clause uses to select this fault.
    pub fn exception_name(&self) -> &str {
        match self {
            Self::Name => "NameException",
            Self::Type => "TypeException",
            Self::IndexOutOfRange => "IndexOutOfRangeException",
            Self::Io => "IOException",
            Self::AbstractMethod => "AbstractMethodException",
            Self::Unauthorized => "UnauthorizedException",
            Self::IllegalOperation => "IllegalOperationException",
            Self::Argument => "ArgumentException",
            Self::Arithmetic => "ArithmeticException",
            Self::Attribute => "AttributeException",
            Self::StringFormat => "StringFormatException",
            Self::Assertion => "AssertionException",
            Self::Thrown(instance) => &instance.class_name,
            Self::StackOverflow { .. } => "StackOverflow",
            Self::Structural => "InterpretException",
            Self::Exit(_) => "Exit",
        }
    }

    /// Faults raised by the host rather than by SPL semantics.
    #[inline]
    pub fn is_host(&self) -> bool {
        matches!(self, Self::StackOverflow { .. } | Self::Structural)
    }
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.exception_name())
    }
}

/// A single frame in an evaluation backtrace.
#[derive(Clone, Debug)]
pub struct BacktraceFrame {
    /// Function or method name.
    pub name: String,
    /// Location of the call site.
    pub loc: Option<Loc>,
}

/// Snapshot of the call stack taken when a fault left a function.
#[derive(Clone, Debug, Default)]
pub struct EvalBacktrace {
    frames: Vec<BacktraceFrame>,
}

impl EvalBacktrace {
    pub fn new(frames: Vec<BacktraceFrame>) -> Self {
        Self { frames }
    }

    pub fn frames(&self) -> &[BacktraceFrame] {
        &self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }
}

impl fmt::Display for EvalBacktrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.frames.is_empty() {
            return Ok(());
        }
        writeln!(f, "stack backtrace:")?;
        for (i, frame) in self.frames.iter().enumerate() {
            write!(f, "  {i}: {}", frame.name)?;
            if let Some(loc) = &frame.loc {
                write!(f, " {loc}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Evaluation error.
#[derive(Clone, Debug)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    pub message: String,
    /// Location of the innermost node that failed.
    pub loc: Option<Loc>,
    /// Call chain at the fault site, outermost call last.
    pub backtrace: Option<EvalBacktrace>,
}

impl EvalError {
    fn from_kind(kind: EvalErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            loc: None,
            backtrace: None,
        }
    }

    /// Attach a location unless one is already set.
    #[must_use]
    pub fn with_loc(mut self, loc: &Loc) -> Self {
        if self.loc.is_none() {
            self.loc = Some(loc.clone());
        }
        self
    }

    /// Attach a backtrace unless one is already set.
    #[must_use]
    pub fn with_backtrace(mut self, backtrace: EvalBacktrace) -> Self {
        if self.backtrace.is_none() {
            self.backtrace = Some(backtrace);
        }
        self
    }

    #[inline]
    pub fn is_exit(&self) -> bool {
        matches!(self.kind, EvalErrorKind::Exit(_))
    }

    /// Whether a `catch (e: type_name)` clause selects this fault on kind
    /// alone. Thrown instances are matched against their class ancestry by
    /// the interpreter instead.
    pub fn caught_by(&self, type_name: &str) -> bool {
        match &self.kind {
            EvalErrorKind::Exit(_) | EvalErrorKind::Thrown(_) => false,
            kind if kind.is_host() => type_name == "Exception",
            kind => type_name == "Exception" || type_name == kind.exception_name(),
        }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            EvalErrorKind::Exit(code) => write!(f, "exit({code})")?,
            kind if self.message.is_empty() => write!(f, "{kind}")?,
            kind => write!(f, "{kind}: {}", self.message)?,
        }
        if let Some(loc) = &self.loc {
            write!(f, ", {loc}")?;
        }
        Ok(())
    }
}

impl std::error::Error for EvalError {}

// Scope faults

#[cold]
pub fn undefined_name(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Name, format!("Name '{name}' is not defined"))
}

#[cold]
pub fn already_defined(name: &str) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::Name,
        format!("Name '{name}' is already defined in this scope"),
    )
}

#[cold]
pub fn assign_to_constant(name: &str) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::Type,
        format!("Cannot assign to constant '{name}'"),
    )
}

#[cold]
pub fn return_outside_function() -> EvalError {
    EvalError::from_kind(EvalErrorKind::Structural, "Return outside function")
}

#[cold]
pub fn break_outside_loop() -> EvalError {
    EvalError::from_kind(EvalErrorKind::Structural, "Break not inside loop")
}

#[cold]
pub fn continue_outside_loop() -> EvalError {
    EvalError::from_kind(EvalErrorKind::Structural, "Continue not inside loop")
}

// Calls

#[cold]
pub fn argument_missing(function: &str, param: &str) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::Argument,
        format!("Function '{function}' missing a positional argument '{param}'"),
    )
}

#[cold]
pub fn too_many_arguments(function: &str, expected: usize, got: usize) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::Argument,
        format!("Function '{function}' takes {expected} positional arguments but {got} were given"),
    )
}

#[cold]
pub fn unexpected_keyword(function: &str, name: &str) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::Argument,
        format!("Function '{function}' got an unexpected keyword argument '{name}'"),
    )
}

#[cold]
pub fn arity_mismatch(function: &str, expected: usize, got: usize) -> EvalError {
    let word = if expected == 1 { "argument" } else { "arguments" };
    EvalError::from_kind(
        EvalErrorKind::Argument,
        format!("'{function}' expects {expected} {word}, got {got}"),
    )
}

#[cold]
pub fn argument_error(message: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Argument, message)
}

#[cold]
pub fn abstract_not_callable(function: &str) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::AbstractMethod,
        format!("Abstract method '{function}' is not callable"),
    )
}

#[cold]
pub fn not_callable(type_name: &str) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::Type,
        format!("Object of type '{type_name}' is not callable"),
    )
}

#[cold]
pub fn stack_overflow(depth: usize) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::StackOverflow { depth },
        format!("Maximum recursion depth exceeded (limit: {depth})"),
    )
}

// Classes and members

#[cold]
pub fn abstract_not_instantiable(class: &str) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::AbstractMethod,
        format!("Abstract class '{class}' is not instantiable"),
    )
}

#[cold]
pub fn not_a_class(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Name, format!("Class '{name}' is not defined"))
}

#[cold]
pub fn cyclic_inheritance(class: &str) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::Structural,
        format!("Class '{class}' inherits from itself"),
    )
}

#[cold]
pub fn unauthorized_this() -> EvalError {
    EvalError::from_kind(EvalErrorKind::Unauthorized, "Access 'this' from outside")
}

#[cold]
pub fn no_attribute(type_name: &str, attr: &str) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::Attribute,
        format!("'{type_name}' object has no attribute '{attr}'"),
    )
}

#[cold]
pub fn no_method(type_name: &str, method: &str) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::Attribute,
        format!("'{type_name}' object has no method '{method}'"),
    )
}

#[cold]
pub fn operator_not_supported(class: &str, symbol: &str) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::Attribute,
        format!("Class '{class}' does not support operation '{symbol}'"),
    )
}

#[cold]
pub fn no_constructor(class: &str) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::Argument,
        format!("Class '{class}' has no constructor taking arguments"),
    )
}

// Operators and values

#[cold]
pub fn unsupported_operation(symbol: &str, left: &str, right: &str) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::Type,
        format!("Unsupported operation '{symbol}' between {left} and {right}"),
    )
}

#[cold]
pub fn unsupported_unary(symbol: &str, operand: &str) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::Type,
        format!("Unsupported operation '{symbol}' on {operand}"),
    )
}

#[cold]
pub fn lazy_operand(symbol: &str, operand: &str) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::Type,
        format!("Operator '{symbol}' does not support type '{operand}'"),
    )
}

#[cold]
pub fn type_mismatch(expected: &str, got: &str) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::Type,
        format!("Expected {expected}, got {got}"),
    )
}

#[cold]
pub fn not_iterable(type_name: &str) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::Type,
        format!("For-each loop on non-iterable object of type '{type_name}'"),
    )
}

#[cold]
pub fn not_throwable(type_name: &str) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::Type,
        format!("Only class instances can be thrown, got '{type_name}'"),
    )
}

#[cold]
pub fn unhashable(type_name: &str) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::Type,
        format!("Unhashable type '{type_name}'"),
    )
}

#[cold]
pub fn division_by_zero() -> EvalError {
    EvalError::from_kind(EvalErrorKind::Arithmetic, "Division by zero")
}

#[cold]
pub fn integer_overflow(operation: &str) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::Arithmetic,
        format!("Integer overflow in {operation}"),
    )
}

#[cold]
pub fn index_out_of_range(index: i64, len: usize) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::IndexOutOfRange,
        format!("Index {index} out of range for length {len}"),
    )
}

#[cold]
pub fn illegal_index(what: &str, from: i64, to: i64, len: usize) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::IndexOutOfRange,
        format!("{what} range {from}..{to} out of range for length {len}"),
    )
}

#[cold]
pub fn format_args_missing(needed: usize, given: usize) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::IndexOutOfRange,
        format!("Not enough arguments for string format: needed {needed}, got {given}"),
    )
}

#[cold]
pub fn key_not_found(key: &str) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::IndexOutOfRange,
        format!("Key {key} not found"),
    )
}

#[cold]
pub fn illegal_operation(message: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IllegalOperation, message)
}

#[cold]
pub fn immutable_list() -> EvalError {
    illegal_operation("Immutable list is not modifiable")
}

#[cold]
pub fn assertion_failed() -> EvalError {
    EvalError::from_kind(EvalErrorKind::Assertion, "Assertion failed")
}

#[cold]
pub fn string_format(message: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::StringFormat, message)
}

#[cold]
pub fn io_error(err: &std::io::Error) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Io, err.to_string())
}

#[cold]
pub fn io_message(message: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Io, message)
}

// Control

#[cold]
pub fn thrown(instance: Rc<ClassInstance>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Thrown(instance), String::new())
}

#[cold]
pub fn exit(code: i32) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Exit(code), String::new())
}

#[cold]
pub fn structural(message: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Structural, message)
}

/// Source handed to `eval` or a worker failed to tokenize or parse.
#[cold]
pub fn syntax_error(err: &spl_parse::SourceError) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Structural, err.to_string())
}
