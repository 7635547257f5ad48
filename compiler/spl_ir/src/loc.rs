//! Source positions.

use std::fmt;
use std::rc::Rc;

/// Line number and originating file of a token or node.
///
/// The file name is shared: every token of a file points at the same `Rc<str>`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Loc {
    pub line: u32,
    pub file: Rc<str>,
}

impl Loc {
    #[inline]
    pub fn new(line: u32, file: Rc<str>) -> Self {
        Loc { line, file }
    }

    /// Location for nodes synthesized by the runtime rather than parsed.
    pub fn internal() -> Self {
        Loc {
            line: 0,
            file: Rc::from("<internal>"),
        }
    }

    /// Same file, different line.
    #[must_use]
    pub fn with_line(&self, line: u32) -> Self {
        Loc {
            line,
            file: Rc::clone(&self.file),
        }
    }
}

impl fmt::Debug for Loc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "in file '{}', at line {}", self.file, self.line)
    }
}
