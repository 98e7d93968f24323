//! Errors for the evocpu VM.
//!
//! Runtime errors are genome-construction faults the engine refuses to run
//! through. Arithmetic faults are not errors: they bump the hardware's error
//! counter and execution continues. Every runtime variant carries the
//! instruction pointer (`at`) where it was raised.

use std::fmt;

use thiserror::Error;

/// Errors that stop a single step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VmError {
    /// The genome names an instruction id the catalog does not have.
    #[error("unknown instruction id {id} at instruction {at}")]
    UnknownInstruction { at: usize, id: u16 },

    /// Opening another scope would put more frames on the stack than there
    /// are registers.
    #[error("scope stack overflow opening depth {depth} at instruction {at}")]
    ScopeOverflow { at: usize, depth: usize },

    /// Register argument is not below the register count.
    #[error("register {index} out of range at instruction {at}")]
    RegisterOutOfRange { at: usize, index: u16 },

    /// Memory block argument is not below the block count.
    #[error("memory block {index} out of range at instruction {at}")]
    BlockOutOfRange { at: usize, index: u16 },

    /// Define names a function slot outside the function table.
    #[error("function slot {slot} out of range at instruction {at}")]
    FunctionSlotOutOfRange { at: usize, slot: u16 },
}

/// Errors raised while building an instruction catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// An entry with this name already exists.
    #[error("duplicate instruction name '{0}'")]
    DuplicateName(String),

    /// More arguments than an instruction can carry.
    #[error("instruction '{name}' declares {num_args} arguments (max {max})")]
    TooManyArgs {
        name: String,
        num_args: usize,
        max: usize,
    },

    /// Scope argument slot is not one of the declared arguments.
    #[error("instruction '{name}' carries its scope in argument {arg} but has {num_args}")]
    ScopeArgOutOfRange {
        name: String,
        arg: usize,
        num_args: usize,
    },

    /// Instructions may not open the root scope.
    #[error("instruction '{0}' cannot open a root scope")]
    RootScope(String),

    /// Catalog ids are u16; no room left.
    #[error("instruction catalog is full")]
    Full,
}

/// Failure while tracing: either the output sink or the CPU.
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("trace output failed")]
    Write(#[from] fmt::Error),

    #[error(transparent)]
    Vm(#[from] VmError),
}
