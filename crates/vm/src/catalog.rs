//! Instruction catalog: opcode id → name, arity, scope layout and handler.
//!
//! A catalog is built once and shared read-only (`Arc<InstLib>`) by every
//! [`Hardware`] that runs genomes against it.

use std::collections::HashMap;

use evocpu_common::{Arg, Args, InstId, InstSet, ScopeKind, ScopeSpec, INST_ARGS};

use crate::error::{CatalogError, VmError};
use crate::hardware::Hardware;

/// Handler invoked when an instruction is dispatched.
///
/// Handlers that open or close scopes go through
/// [`Hardware::update_scope`] and must return as soon as it reports that
/// the scope was not entered.
pub type InstFn = fn(&mut Hardware, &Args) -> Result<(), VmError>;

/// One catalog entry.
#[derive(Debug, Clone)]
pub struct InstDef {
    /// Name used by loaders and printers.
    pub name: String,
    /// Behavior.
    pub func: InstFn,
    /// Number of meaningful argument slots (0..=3).
    pub num_args: usize,
    /// One-line human description.
    pub desc: String,
    /// Scope this instruction opens, if any.
    pub scope: Option<ScopeSpec>,
}

/// A set of instructions a genome can be written in.
#[derive(Debug, Clone, Default)]
pub struct InstLib {
    defs: Vec<InstDef>,
    name_map: HashMap<String, InstId>,
    arg_map: HashMap<String, Arg>,
}

impl InstLib {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an instruction that opens no scope.
    pub fn add_inst(
        &mut self,
        name: &str,
        func: InstFn,
        num_args: usize,
        desc: &str,
    ) -> Result<InstId, CatalogError> {
        self.insert(name, func, num_args, desc, None)
    }

    /// Register an instruction that opens a scope of `kind`, with its depth
    /// carried in argument slot `scope_arg`.
    pub fn add_scoped_inst(
        &mut self,
        name: &str,
        func: InstFn,
        num_args: usize,
        desc: &str,
        kind: ScopeKind,
        scope_arg: usize,
    ) -> Result<InstId, CatalogError> {
        if kind == ScopeKind::Root {
            return Err(CatalogError::RootScope(name.to_string()));
        }
        if scope_arg >= num_args {
            return Err(CatalogError::ScopeArgOutOfRange {
                name: name.to_string(),
                arg: scope_arg,
                num_args,
            });
        }
        let spec = ScopeSpec {
            kind,
            arg: scope_arg,
        };
        self.insert(name, func, num_args, desc, Some(spec))
    }

    fn insert(
        &mut self,
        name: &str,
        func: InstFn,
        num_args: usize,
        desc: &str,
        scope: Option<ScopeSpec>,
    ) -> Result<InstId, CatalogError> {
        if num_args > INST_ARGS {
            return Err(CatalogError::TooManyArgs {
                name: name.to_string(),
                num_args,
                max: INST_ARGS,
            });
        }
        if self.name_map.contains_key(name) {
            return Err(CatalogError::DuplicateName(name.to_string()));
        }
        let id = InstId::try_from(self.defs.len()).map_err(|_| CatalogError::Full)?;

        self.defs.push(InstDef {
            name: name.to_string(),
            func,
            num_args,
            desc: desc.to_string(),
            scope,
        });
        self.name_map.insert(name.to_string(), id);
        Ok(id)
    }

    /// Register a symbolic name for an argument value (e.g. `RegC` = 2).
    pub fn add_arg(&mut self, name: &str, value: Arg) {
        self.arg_map.insert(name.to_string(), value);
    }

    /// Entry for `id`.
    pub fn get(&self, id: InstId) -> Option<&InstDef> {
        self.defs.get(id as usize)
    }

    /// All entries in id order.
    pub fn defs(&self) -> &[InstDef] {
        &self.defs
    }

    /// Human description of `id`.
    pub fn desc(&self, id: InstId) -> Option<&str> {
        self.get(id).map(|d| d.desc.as_str())
    }
}

impl InstSet for InstLib {
    fn size(&self) -> usize {
        self.defs.len()
    }

    fn id_of(&self, name: &str) -> Option<InstId> {
        self.name_map.get(name).copied()
    }

    fn name_of(&self, id: InstId) -> Option<&str> {
        self.get(id).map(|d| d.name.as_str())
    }

    fn num_args(&self, id: InstId) -> Option<usize> {
        self.get(id).map(|d| d.num_args)
    }

    fn scope_of(&self, id: InstId) -> Option<ScopeSpec> {
        self.get(id).and_then(|d| d.scope)
    }

    fn arg_value(&self, name: &str) -> Option<Arg> {
        self.arg_map.get(name).copied()
    }
}
