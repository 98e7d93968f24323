//! Read-only view of an instruction catalog.
//!
//! The VM's catalog owns the handlers; everything that only needs names,
//! arities and scope layout (loaders, printers) works through this trait.

use crate::instruction::{Arg, InstId, Instruction};
use crate::scope::ScopeKind;

/// Scope behavior declared by a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeSpec {
    /// Kind of frame the instruction opens.
    pub kind: ScopeKind,
    /// Which argument slot carries the scope depth.
    pub arg: usize,
}

/// Name, arity and scope metadata for a set of instructions.
pub trait InstSet {
    /// Number of entries. Valid ids are `0..size()`.
    fn size(&self) -> usize;

    /// Look up an instruction id by name.
    fn id_of(&self, name: &str) -> Option<InstId>;

    /// Name of the entry with this id.
    fn name_of(&self, id: InstId) -> Option<&str>;

    /// Number of meaningful argument slots for this id.
    fn num_args(&self, id: InstId) -> Option<usize>;

    /// Scope opened by this id, if any.
    fn scope_of(&self, id: InstId) -> Option<ScopeSpec>;

    /// Value of a symbolic argument name such as `RegB`.
    fn arg_value(&self, name: &str) -> Option<Arg>;

    /// Depth the instruction would open, or 0 if it opens none.
    ///
    /// Depths are one higher than the argument value because the root
    /// frame sits at depth 0.
    fn inst_scope(&self, inst: &Instruction) -> usize {
        match self.scope_of(inst.id) {
            Some(spec) => inst.args.get(spec.arg).map_or(0, |&a| a as usize + 1),
            None => 0,
        }
    }
}
