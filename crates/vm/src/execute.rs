//! Dispatch loop, single-step and batched execution, next-instruction
//! prediction.

use evocpu_common::{Instruction, ScopeKind};
use tracing::trace;

use crate::error::VmError;
use crate::hardware::Hardware;

impl Hardware {
    /// Run the instruction at the pointer, then advance the pointer by one.
    ///
    /// Running off the end of the genome is not an error: the pointer wraps
    /// to 0 and every open scope is unwound first (see [`Hardware::reset_ip`]).
    /// Handlers that redirect the pointer leave it one slot before their
    /// target, since the advance here always happens.
    pub fn single_process(&mut self) -> Result<(), VmError> {
        if self.genome.is_empty() {
            return Ok(());
        }
        if self.inst_ptr >= self.genome.len() {
            self.reset_ip();
        }
        let inst = self.genome.instructions[self.inst_ptr];
        self.process_inst(&inst)?;
        self.inst_ptr += 1;
        Ok(())
    }

    /// Run up to `num_inst` steps, stopping early once the halt trait is
    /// set. Returns the number of steps run, which is 0 for an empty genome.
    pub fn process(&mut self, num_inst: usize) -> Result<usize, VmError> {
        if self.genome.is_empty() {
            return Ok(0);
        }
        for done in 0..num_inst {
            if self.is_halted() {
                return Ok(done);
            }
            self.single_process()?;
        }
        Ok(num_inst)
    }

    /// Run a caller-supplied instruction against the current state.
    ///
    /// The pointer is not advanced. If the instruction closes a loop or
    /// function scope, the instruction the pointer was moved to runs here
    /// as well, and so on until a handler finishes without closing one.
    pub fn process_inst(&mut self, inst: &Instruction) -> Result<(), VmError> {
        self.redispatch = false;
        self.call_handler(inst)?;

        while std::mem::take(&mut self.redispatch) {
            if self.inst_ptr >= self.genome.len() {
                self.reset_ip();
            }
            let Some(next) = self.genome.get(self.inst_ptr).copied() else {
                return Ok(());
            };
            self.call_handler(&next)?;
        }
        Ok(())
    }

    fn call_handler(&mut self, inst: &Instruction) -> Result<(), VmError> {
        let func = self
            .inst_lib
            .get(inst.id)
            .map(|def| def.func)
            .ok_or(VmError::UnknownInstruction {
                at: self.inst_ptr,
                id: inst.id,
            })?;
        trace!(at = self.inst_ptr, id = inst.id, args = ?inst.args, "dispatch");
        func(self, &inst.args)
    }

    /// Position of the instruction the next [`single_process`] will run,
    /// without changing anything.
    ///
    /// [`single_process`]: Hardware::single_process
    pub fn predict_next_inst(&self) -> usize {
        let Some(inst) = self.genome.get(self.inst_ptr) else {
            return 0;
        };

        let new_scope = self.inst_scope(inst);
        if new_scope == 0 {
            return self.inst_ptr;
        }

        for frame in self.scope_stack.iter().rev() {
            if new_scope > frame.depth {
                return self.inst_ptr;
            }
            match frame.kind {
                ScopeKind::Loop => return frame.start_pos,
                ScopeKind::Function => {
                    return match self.call_stack.last() {
                        Some(&ret) if ret < self.genome.len() => ret,
                        _ => 0,
                    };
                }
                ScopeKind::Basic | ScopeKind::Root => {}
            }
        }
        self.inst_ptr
    }
}
