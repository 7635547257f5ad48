//! SPL source run by every interpreter before the script.

/// Defines `Object`, `Exception`, `Error`, `StopIteration` and `Iterable`.
pub const PRELUDE: &str = include_str!("prelude.sp");

/// File name reported in faults raised from prelude code.
pub const PRELUDE_FILE: &str = "<prelude>";
