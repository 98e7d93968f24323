//! Hardware state: registers, scope/backup/call stacks, memory, I/O, traits.

use std::collections::BTreeMap;
use std::sync::Arc;

use evocpu_common::{
    Arg, Genome, InstId, InstSet, Instruction, ScopeKind, BOARD_SIZE, CPU_SIZE, HALT_TRAIT,
};

use crate::catalog::InstLib;
use crate::error::VmError;

/// A live scope on the scope stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeFrame {
    /// Nesting depth. 0 for the root frame, strictly increasing upward.
    pub depth: usize,
    /// What closing this frame does.
    pub kind: ScopeKind,
    /// Instruction pointer when the frame was opened.
    pub start_pos: usize,
}

impl ScopeFrame {
    pub(crate) fn root() -> Self {
        Self {
            depth: 0,
            kind: ScopeKind::Root,
            start_pos: 0,
        }
    }
}

/// A saved register value, restored when its owning scope exits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegBackup {
    /// Depth of the frame that owns this backup.
    pub scope: usize,
    /// Register to restore.
    pub reg: usize,
    /// Value to put back.
    pub value: f64,
}

/// Sparse numeric map used for inputs, outputs and memory blocks.
pub type ValueMap = BTreeMap<i64, f64>;

/// One virtual CPU running one genome.
///
/// The catalog is shared; everything else is owned exclusively.
#[derive(Debug, Clone)]
pub struct Hardware {
    pub(crate) inst_lib: Arc<InstLib>,

    pub(crate) genome: Genome,
    pub(crate) regs: [f64; CPU_SIZE],
    pub(crate) inputs: ValueMap,
    pub(crate) outputs: ValueMap,
    pub(crate) mem: [ValueMap; CPU_SIZE],
    pub(crate) fun_starts: [Option<usize>; CPU_SIZE],

    pub(crate) inst_ptr: usize,
    pub(crate) scope_stack: Vec<ScopeFrame>,
    pub(crate) reg_stack: Vec<RegBackup>,
    pub(crate) call_stack: Vec<usize>,
    pub(crate) board: [f64; BOARD_SIZE],

    /// Set by scope resolution when the instruction now at the pointer must
    /// run before the current step finishes.
    pub(crate) redispatch: bool,

    pub(crate) errors: usize,
    pub(crate) traits: Vec<f64>,
}

impl Hardware {
    /// Create a CPU with an empty genome, running against `inst_lib`.
    pub fn new(inst_lib: Arc<InstLib>) -> Self {
        let mut hw = Self {
            inst_lib,
            genome: Genome::default(),
            regs: [0.0; CPU_SIZE],
            inputs: ValueMap::new(),
            outputs: ValueMap::new(),
            mem: Default::default(),
            fun_starts: [None; CPU_SIZE],
            inst_ptr: 0,
            scope_stack: vec![ScopeFrame::root()],
            reg_stack: Vec::new(),
            call_stack: Vec::new(),
            board: [0.0; BOARD_SIZE],
            redispatch: false,
            errors: 0,
            traits: Vec::new(),
        };
        hw.reset();
        hw
    }

    /// Create a CPU already loaded with `genome`.
    pub fn with_genome(inst_lib: Arc<InstLib>, genome: Genome) -> Self {
        let mut hw = Self::new(inst_lib);
        hw.genome = genome;
        hw
    }

    /// Reset the entire CPU to a starting state, without a genome.
    pub fn reset(&mut self) {
        self.genome.clear();
        self.traits.clear();
        self.set_trait(HALT_TRAIT, 0.0);
        self.reset_hardware();
    }

    /// Reset just the CPU hardware, keeping the genome and traits.
    ///
    /// Register `i` starts holding the value `i`.
    pub fn reset_hardware(&mut self) {
        for (i, reg) in self.regs.iter_mut().enumerate() {
            *reg = i as f64;
        }
        self.inputs.clear();
        self.outputs.clear();
        self.mem.iter_mut().for_each(ValueMap::clear);
        self.fun_starts = [None; CPU_SIZE];
        self.inst_ptr = 0;
        self.scope_stack.truncate(1);
        self.reg_stack.clear();
        self.call_stack.clear();
        self.board = [0.0; BOARD_SIZE];
        self.redispatch = false;
        self.errors = 0;
    }

    // ---- Accessors ----

    /// Catalog this CPU dispatches through.
    pub fn inst_lib(&self) -> &Arc<InstLib> {
        &self.inst_lib
    }

    /// Genome being executed.
    pub fn genome(&self) -> &Genome {
        &self.genome
    }

    /// Instruction at `pos`, if in range.
    pub fn inst(&self, pos: usize) -> Option<&Instruction> {
        self.genome.get(pos)
    }

    /// Value of register `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not below `CPU_SIZE`. Check instruction arguments
    /// with [`reg_slot`](Hardware::reg_slot) or [`block_slot`](Hardware::block_slot) first.
    pub fn reg(&self, id: usize) -> f64 {
        self.regs[id]
    }

    /// All registers.
    pub fn regs(&self) -> &[f64; CPU_SIZE] {
        &self.regs
    }

    /// Input `id`, or 0.0.
    pub fn input(&self, id: i64) -> f64 {
        self.inputs.get(&id).copied().unwrap_or(0.0)
    }

    /// All set inputs, ordered by id.
    pub fn inputs(&self) -> &ValueMap {
        &self.inputs
    }

    /// Output `id`, or 0.0.
    pub fn output(&self, id: i64) -> f64 {
        self.outputs.get(&id).copied().unwrap_or(0.0)
    }

    /// All set outputs, ordered by id.
    pub fn outputs(&self) -> &ValueMap {
        &self.outputs
    }

    /// Value stored in memory `block` at `pos`, or 0.0.
    pub fn mem(&self, block: usize, pos: i64) -> f64 {
        self.mem
            .get(block)
            .and_then(|m| m.get(&pos))
            .copied()
            .unwrap_or(0.0)
    }

    /// Position of the Define for function `slot`, if one has run.
    pub fn fun_start(&self, slot: usize) -> Option<usize> {
        self.fun_starts.get(slot).copied().flatten()
    }

    /// Instruction pointer.
    pub fn ip(&self) -> usize {
        self.inst_ptr
    }

    /// Open scope frames, root first.
    pub fn scope_stack(&self) -> &[ScopeFrame] {
        &self.scope_stack
    }

    /// Depth of the innermost open scope.
    pub fn cur_scope(&self) -> usize {
        self.top_frame().depth
    }

    /// Kind of the innermost open scope.
    pub fn cur_scope_kind(&self) -> ScopeKind {
        self.top_frame().kind
    }

    pub(crate) fn top_frame(&self) -> &ScopeFrame {
        // The root frame is never popped.
        &self.scope_stack[self.scope_stack.len() - 1]
    }

    /// Pending register backups, oldest first.
    pub fn reg_stack(&self) -> &[RegBackup] {
        &self.reg_stack
    }

    /// Return positions, innermost call last.
    pub fn call_stack(&self) -> &[usize] {
        &self.call_stack
    }

    /// Board cells as last loaded by `SetBoard`.
    pub fn board(&self) -> &[f64; BOARD_SIZE] {
        &self.board
    }

    /// Count of non-fatal faults such as division by zero.
    pub fn num_errors(&self) -> usize {
        self.errors
    }

    /// Trait value, 0.0 if never set.
    pub fn trait_value(&self, id: usize) -> f64 {
        self.traits.get(id).copied().unwrap_or(0.0)
    }

    /// The whole trait vector.
    pub fn traits(&self) -> &[f64] {
        &self.traits
    }

    /// Whether the organism has ended its turn.
    pub fn is_halted(&self) -> bool {
        self.trait_value(HALT_TRAIT) == 1.0
    }

    /// Depth the instruction would open, or 0.
    pub fn inst_scope(&self, inst: &Instruction) -> usize {
        self.inst_lib.inst_scope(inst)
    }

    // ---- Mutators ----

    /// Replace the instruction at `pos`. Out-of-range positions are ignored.
    pub fn set_inst(&mut self, pos: usize, inst: Instruction) {
        if let Some(slot) = self.genome.instructions.get_mut(pos) {
            *slot = inst;
        }
    }

    /// Replace the genome. Execution state is left as is.
    pub fn set_genome(&mut self, genome: Genome) {
        self.genome = genome;
    }

    /// Append an instruction to the genome.
    pub fn push_inst(&mut self, inst: Instruction) {
        self.genome.instructions.push(inst);
    }

    /// Append an instruction by catalog name.
    ///
    /// Returns `None` (and appends nothing) if the name is unknown.
    pub fn push_inst_named(&mut self, name: &str, a0: Arg, a1: Arg, a2: Arg) -> Option<InstId> {
        let id = self.inst_lib.id_of(name)?;
        self.genome.push(id, a0, a1, a2);
        Some(id)
    }

    /// Set register `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not below `CPU_SIZE`. Check instruction arguments
    /// with [`reg_slot`](Hardware::reg_slot) or [`block_slot`](Hardware::block_slot) first.
    pub fn set_reg(&mut self, id: usize, value: f64) {
        self.regs[id] = value;
    }

    /// Set input `id`.
    pub fn set_input(&mut self, id: i64, value: f64) {
        self.inputs.insert(id, value);
    }

    /// Replace all inputs.
    pub fn set_inputs(&mut self, inputs: ValueMap) {
        self.inputs = inputs;
    }

    /// Set output `id`.
    pub fn set_output(&mut self, id: i64, value: f64) {
        self.outputs.insert(id, value);
    }

    /// Replace all outputs.
    pub fn set_outputs(&mut self, outputs: ValueMap) {
        self.outputs = outputs;
    }

    /// Store `value` in memory `block` at `pos`.
    ///
    /// # Panics
    ///
    /// Panics if `block` is not below `CPU_SIZE`. Check instruction arguments
    /// with [`reg_slot`](Hardware::reg_slot) or [`block_slot`](Hardware::block_slot) first.
    pub fn set_mem(&mut self, block: usize, pos: i64, value: f64) {
        self.mem[block].insert(pos, value);
    }

    /// Overwrite block `to` with a copy of block `from`.
    ///
    /// # Panics
    ///
    /// Panics if either block is not below `CPU_SIZE`. Check instruction arguments
    /// with [`reg_slot`](Hardware::reg_slot) or [`block_slot`](Hardware::block_slot) first.
    pub fn copy_mem(&mut self, from: usize, to: usize) {
        self.mem[to] = self.mem[from].clone();
    }

    /// Move every entry of `block` up by `shift` positions.
    ///
    /// # Panics
    ///
    /// Panics if `block` is not below `CPU_SIZE`. Check instruction arguments
    /// with [`reg_slot`](Hardware::reg_slot) or [`block_slot`](Hardware::block_slot) first.
    pub fn shift_mem(&mut self, block: usize, shift: i64) {
        let shifted = std::mem::take(&mut self.mem[block])
            .into_iter()
            .map(|(pos, value)| (pos.wrapping_add(shift), value))
            .collect();
        self.mem[block] = shifted;
    }

    /// Record (or clear) where function `slot` is defined.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is not below `CPU_SIZE`. Check instruction arguments
    /// with [`reg_slot`](Hardware::reg_slot) or [`block_slot`](Hardware::block_slot) first.
    pub fn set_fun_start(&mut self, slot: usize, pos: Option<usize>) {
        self.fun_starts[slot] = pos;
    }

    /// Move the instruction pointer.
    pub fn set_ip(&mut self, pos: usize) {
        self.inst_ptr = pos;
    }

    /// Back up register `reg` under scope `scope`, to be restored when that
    /// scope exits.
    ///
    /// # Panics
    ///
    /// Panics if `reg` is not below `CPU_SIZE`. Check instruction arguments
    /// with [`reg_slot`](Hardware::reg_slot) or [`block_slot`](Hardware::block_slot) first.
    pub fn push_reg_info(&mut self, scope: usize, reg: usize) {
        self.reg_stack.push(RegBackup {
            scope,
            reg,
            value: self.regs[reg],
        });
    }

    /// Push a return position onto the call stack.
    pub fn push_call_info(&mut self, pos: usize) {
        self.call_stack.push(pos);
    }

    /// Count one non-fatal fault.
    pub fn inc_errors(&mut self) {
        self.errors += 1;
    }

    /// Set trait `id`, growing the trait vector with 0.0 as needed.
    pub fn set_trait(&mut self, id: usize, value: f64) {
        if id >= self.traits.len() {
            self.traits.resize(id + 1, 0.0);
        }
        self.traits[id] = value;
    }

    /// Append a trait value.
    pub fn push_trait(&mut self, value: f64) {
        self.traits.push(value);
    }

    /// Signal that the organism is done computing for this turn.
    pub fn end_turn(&mut self) {
        self.set_trait(HALT_TRAIT, 1.0);
    }

    /// Load the board from inputs `0..BOARD_SIZE`.
    pub fn set_board(&mut self) {
        for (i, cell) in self.board.iter_mut().enumerate() {
            *cell = self.inputs.get(&(i as i64)).copied().unwrap_or(0.0);
        }
    }

    // ---- Argument checks used by handlers ----

    /// Register index named by an argument.
    pub fn reg_slot(&self, arg: Arg) -> Result<usize, VmError> {
        let index = arg as usize;
        if index < CPU_SIZE {
            Ok(index)
        } else {
            Err(VmError::RegisterOutOfRange {
                at: self.inst_ptr,
                index: arg,
            })
        }
    }

    /// Memory block index named by an argument.
    pub fn block_slot(&self, arg: Arg) -> Result<usize, VmError> {
        let index = arg as usize;
        if index < CPU_SIZE {
            Ok(index)
        } else {
            Err(VmError::BlockOutOfRange {
                at: self.inst_ptr,
                index: arg,
            })
        }
    }
}
