//! evocpu common types and genome encoding.
//!
//! This crate provides the foundational data structures shared by the
//! evocpu virtual CPU, its loaders and its tools:
//!
//! - [`Instruction`]: the 64-bit instruction struct with encode/decode
//! - [`Genome`]: an ordered, mutable sequence of instructions
//! - [`ScopeKind`]: Root / Basic / Loop / Function scope frames
//! - [`InstSet`]: read-only name/arity/scope view of a catalog
//! - [`DecodeError`]: errors from decoding byte streams
//!
//! Machine geometry is fixed at compile time by the constants below.

pub mod error;
pub mod genome;
pub mod inst_set;
pub mod instruction;
pub mod scope;

pub use error::DecodeError;
pub use genome::Genome;
pub use inst_set::{InstSet, ScopeSpec};
pub use instruction::{Arg, Args, InstId, Instruction};
pub use scope::ScopeKind;

/// Number of registers, memory blocks and function slots, and the maximum
/// number of frames on the scope stack.
pub const CPU_SIZE: usize = 16;

/// Argument slots per instruction.
pub const INST_ARGS: usize = 3;

/// Trait index an organism sets to 1.0 to end its turn.
pub const HALT_TRAIT: usize = 100;

/// Number of squares on the game board.
pub const BOARD_SIZE: usize = 64;
