//! Scope kinds shared by the catalog and the scope stack.

use std::fmt;

/// What happens when a scope of this kind is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    /// The outermost frame. Never opened by an instruction, never closed.
    Root,
    /// Closing falls through to the next instruction.
    Basic,
    /// Closing jumps back to the instruction that opened the scope.
    Loop,
    /// Closing returns to the top of the call stack.
    Function,
}

impl ScopeKind {
    /// Lowercase name used in listings and diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            ScopeKind::Root => "root",
            ScopeKind::Basic => "basic",
            ScopeKind::Loop => "loop",
            ScopeKind::Function => "function",
        }
    }
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
