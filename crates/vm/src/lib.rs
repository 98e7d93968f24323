//! evocpu virtual machine. Runs genomes whose control flow is written as
//! scope depths.
//!
//! The CPU has:
//! - a register file of [`CPU_SIZE`](evocpu_common::CPU_SIZE) numeric registers
//! - a scope stack of open frames (Root / Basic / Loop / Function)
//! - a register backup stack restored as scopes close
//! - a call stack of return positions
//! - sparse inputs, outputs and memory blocks, and a trait vector
//!
//! Instructions come from an [`InstLib`] catalog shared read-only between
//! CPUs. Branches, loops and function bodies are not jump targets: each
//! scope-opening instruction carries a depth, and the scope stack decides
//! whether reaching it opens a new scope, loops back, returns, or closes.
//!
//! # Usage
//!
//! ```
//! use evocpu_vm::{Hardware, InstLib};
//!
//! let lib = InstLib::default_library();
//! let mut hw = Hardware::new(lib);
//! hw.push_inst_named("SetReg", 0, 3, 0).unwrap();
//! hw.push_inst_named("Countdown", 0, 0, 0).unwrap();
//! hw.push_inst_named("Inc", 1, 0, 0).unwrap();
//! hw.push_inst_named("Scope", 0, 0, 0).unwrap();
//!
//! hw.process(9).unwrap();
//! assert_eq!(hw.reg(1), 4.0); // started at 1, three passes
//! ```

pub mod board;
pub mod catalog;
pub mod error;
pub mod execute;
pub mod hardware;
pub mod library;
pub mod scope;
pub mod trace;

pub use catalog::{InstDef, InstFn, InstLib};
pub use error::{CatalogError, TraceError, VmError};
pub use hardware::{Hardware, RegBackup, ScopeFrame, ValueMap};
