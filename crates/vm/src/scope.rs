//! Scope resolution: entering, closing, looping back, returning, bypassing.
//!
//! Control flow is never written as jump targets. Instructions that open
//! scopes carry a nesting depth, and the stack of open frames decides what
//! a given depth means at the moment it is reached:
//!
//! - deeper than the current frame: a new frame opens;
//! - otherwise the current frame is finished, and its kind decides what
//!   happens next (Loop jumps back, Function returns, Basic closes and the
//!   comparison is retried against the enclosing frame).
//!
//! Depths handed to these functions are instruction argument values; the
//! stored frame depth is one higher because the root frame sits at 0.

use evocpu_common::{ScopeKind, CPU_SIZE};
use tracing::{debug, trace};

use crate::error::VmError;
use crate::hardware::{Hardware, ScopeFrame};

impl Hardware {
    /// Enter the scope at argument depth `scope`, or resolve the close of
    /// the current one.
    ///
    /// Returns `Ok(true)` when a new frame of `kind` was pushed and the
    /// caller should go on to run the scope body. Returns `Ok(false)` when
    /// the current scope was closed by a loop-back or a function return; the
    /// instruction now at the pointer has been scheduled to run before this
    /// step ends, and the caller must do nothing further.
    pub fn update_scope(&mut self, scope: usize, kind: ScopeKind) -> Result<bool, VmError> {
        let new_scope = scope + 1;

        loop {
            let cur = *self.top_frame();

            if new_scope > cur.depth {
                if self.scope_stack.len() >= CPU_SIZE {
                    debug!(at = self.inst_ptr, depth = new_scope, "scope stack full");
                    return Err(VmError::ScopeOverflow {
                        at: self.inst_ptr,
                        depth: new_scope,
                    });
                }
                trace!(depth = new_scope, %kind, at = self.inst_ptr, "enter scope");
                self.scope_stack.push(ScopeFrame {
                    depth: new_scope,
                    kind,
                    start_pos: self.inst_ptr,
                });
                return Ok(true);
            }

            match cur.kind {
                ScopeKind::Loop => {
                    trace!(depth = cur.depth, to = cur.start_pos, "loop back");
                    self.inst_ptr = cur.start_pos;
                    self.exit_scope();
                    self.redispatch = true;
                    return Ok(false);
                }
                ScopeKind::Function => {
                    match self.call_stack.last().copied() {
                        Some(ret) if ret < self.genome.len() => {
                            trace!(depth = cur.depth, to = ret, "return");
                            self.inst_ptr = ret;
                            self.call_stack.pop();
                            self.exit_scope();
                        }
                        // The call was the last instruction of the genome.
                        _ => self.reset_ip(),
                    }
                    self.redispatch = true;
                    return Ok(false);
                }
                ScopeKind::Basic | ScopeKind::Root => self.exit_scope(),
            }
        }
    }

    /// Pop the innermost frame, restoring every register backed up in it.
    ///
    /// The root frame is never popped.
    pub fn exit_scope(&mut self) {
        if self.scope_stack.len() <= 1 {
            return;
        }
        debug_assert!(self.scope_stack.len() <= CPU_SIZE);

        let depth = self.cur_scope();
        while let Some(backup) = self.reg_stack.last().copied() {
            if backup.scope != depth {
                break;
            }
            self.regs[backup.reg] = backup.value;
            self.reg_stack.pop();
        }

        trace!(depth, "exit scope");
        self.scope_stack.pop();
    }

    /// Skip forward past the body of the innermost scope without running it.
    ///
    /// Always closes the innermost frame, whatever `scope` names, then
    /// scans forward until an instruction that opens a depth at or above
    /// argument depth `scope`. The pointer is left one before that
    /// instruction so the next fetch runs it. If the innermost frame is
    /// already shallower than `scope` there is nothing to break out of and
    /// nothing happens.
    pub fn bypass_scope(&mut self, scope: usize) {
        let scope = scope + 1;
        if self.cur_scope() < scope {
            return;
        }

        self.exit_scope();
        while self.inst_ptr + 1 < self.genome.len() {
            self.inst_ptr += 1;
            let test_scope = self.inst_scope(&self.genome.instructions[self.inst_ptr]);

            if test_scope != 0 && test_scope <= scope {
                self.inst_ptr -= 1;
                break;
            }
        }
    }

    /// Send the pointer back to the start of the genome and unwind
    /// everything: every non-root frame exits, every remaining backup is
    /// restored, the call stack is cleared.
    pub fn reset_ip(&mut self) {
        debug!(from = self.inst_ptr, frames = self.scope_stack.len(), "wrap to genome start");
        self.inst_ptr = 0;
        while self.scope_stack.len() > 1 {
            self.exit_scope();
        }
        // Backups owned by the root frame.
        while let Some(backup) = self.reg_stack.pop() {
            self.regs[backup.reg] = backup.value;
        }
        self.call_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InstLib;
    use evocpu_common::{InstSet, Instruction};
    use std::sync::Arc;

    fn hw() -> Hardware {
        Hardware::new(InstLib::default_library())
    }

    fn id(hw: &Hardware, name: &str) -> u16 {
        hw.inst_lib().id_of(name).unwrap()
    }

    #[test]
    fn deeper_scope_is_entered() {
        let mut hw = hw();
        hw.set_ip(7);
        assert_eq!(hw.update_scope(0, ScopeKind::Basic), Ok(true));
        assert_eq!(
            hw.scope_stack().last(),
            Some(&ScopeFrame {
                depth: 1,
                kind: ScopeKind::Basic,
                start_pos: 7
            })
        );
    }

    #[test]
    fn same_depth_closes_basic_then_enters() {
        let mut hw = hw();
        hw.update_scope(0, ScopeKind::Basic).unwrap();
        hw.update_scope(2, ScopeKind::Basic).unwrap();
        hw.update_scope(4, ScopeKind::Basic).unwrap();
        assert_eq!(hw.scope_stack().len(), 4);

        // Depth 2 closes frames at 5 and 3, then opens a new one at 2.
        assert_eq!(hw.update_scope(1, ScopeKind::Loop), Ok(true));
        let depths: Vec<usize> = hw.scope_stack().iter().map(|f| f.depth).collect();
        assert_eq!(depths, vec![0, 1, 2]);
        assert_eq!(hw.cur_scope_kind(), ScopeKind::Loop);
    }

    #[test]
    fn loop_close_rewinds_and_schedules_redispatch() {
        let mut hw = hw();
        hw.set_ip(3);
        hw.update_scope(0, ScopeKind::Loop).unwrap();
        hw.set_ip(9);
        assert_eq!(hw.update_scope(0, ScopeKind::Basic), Ok(false));
        assert_eq!(hw.ip(), 3);
        assert_eq!(hw.scope_stack().len(), 1);
        assert!(hw.redispatch);
    }

    #[test]
    fn function_close_returns_to_call_stack_top() {
        let mut hw = hw();
        let inc = id(&hw, "Inc");
        for _ in 0..10 {
            hw.push_inst(Instruction::new(inc, 0, 0, 0));
        }
        hw.update_scope(0, ScopeKind::Function).unwrap();
        hw.push_call_info(6);
        assert_eq!(hw.update_scope(0, ScopeKind::Basic), Ok(false));
        assert_eq!(hw.ip(), 6);
        assert!(hw.call_stack().is_empty());
        assert_eq!(hw.scope_stack().len(), 1);
    }

    #[test]
    fn function_close_past_end_resets() {
        let mut hw = hw();
        let inc = id(&hw, "Inc");
        hw.push_inst(Instruction::new(inc, 0, 0, 0));
        hw.set_ip(0);
        hw.update_scope(3, ScopeKind::Basic).unwrap();
        hw.update_scope(5, ScopeKind::Function).unwrap();
        hw.push_call_info(1);
        hw.set_ip(5);
        assert_eq!(hw.update_scope(0, ScopeKind::Basic), Ok(false));
        assert_eq!(hw.ip(), 0);
        assert!(hw.call_stack().is_empty());
        assert_eq!(hw.scope_stack().len(), 1);
    }

    #[test]
    fn exit_restores_backups_in_lifo_order() {
        let mut hw = hw();
        hw.update_scope(0, ScopeKind::Basic).unwrap();
        hw.set_reg(2, 10.0);
        hw.push_reg_info(1, 2);
        hw.set_reg(2, 20.0);
        hw.push_reg_info(1, 2);
        hw.set_reg(2, 30.0);

        hw.exit_scope();
        // The first value backed up in the scope wins.
        assert_eq!(hw.reg(2), 10.0);
        assert!(hw.reg_stack().is_empty());
    }

    #[test]
    fn exit_leaves_outer_backups_alone() {
        let mut hw = hw();
        hw.update_scope(0, ScopeKind::Basic).unwrap();
        hw.push_reg_info(1, 4);
        hw.update_scope(1, ScopeKind::Basic).unwrap();
        hw.push_reg_info(2, 5);
        hw.set_reg(4, -1.0);
        hw.set_reg(5, -1.0);

        hw.exit_scope();
        assert_eq!(hw.reg(5), 5.0);
        assert_eq!(hw.reg(4), -1.0);
        assert_eq!(hw.reg_stack().len(), 1);
    }

    #[test]
    fn exit_never_pops_root() {
        let mut hw = hw();
        hw.exit_scope();
        hw.exit_scope();
        assert_eq!(hw.scope_stack().len(), 1);
        assert_eq!(hw.cur_scope_kind(), ScopeKind::Root);
    }

    #[test]
    fn overflow_is_an_error_and_leaves_stack_intact() {
        let mut hw = hw();
        for depth in 0..CPU_SIZE - 1 {
            assert_eq!(hw.update_scope(depth, ScopeKind::Basic), Ok(true));
        }
        assert_eq!(hw.scope_stack().len(), CPU_SIZE);
        assert_eq!(
            hw.update_scope(CPU_SIZE, ScopeKind::Basic),
            Err(VmError::ScopeOverflow {
                at: 0,
                depth: CPU_SIZE + 1
            })
        );
        assert_eq!(hw.scope_stack().len(), CPU_SIZE);
    }

    #[test]
    fn bypass_stops_before_enclosing_scope_instruction() {
        let mut hw = hw();
        let inc = id(&hw, "Inc");
        let scope = id(&hw, "Scope");
        let lib = Arc::clone(hw.inst_lib());
        assert_eq!(lib.scope_of(scope).map(|s| s.arg), Some(0));

        hw.push_inst(Instruction::new(scope, 0, 0, 0)); // 0: opens depth 1
        hw.push_inst(Instruction::new(inc, 1, 0, 0)); // 1
        hw.push_inst(Instruction::new(scope, 1, 0, 0)); // 2: depth 2, nested
        hw.push_inst(Instruction::new(inc, 1, 0, 0)); // 3
        hw.push_inst(Instruction::new(scope, 0, 0, 0)); // 4: depth 1, sibling
        hw.push_inst(Instruction::new(inc, 1, 0, 0)); // 5

        hw.update_scope(0, ScopeKind::Basic).unwrap();
        hw.bypass_scope(0);
        assert_eq!(hw.ip(), 3);
        assert_eq!(hw.scope_stack().len(), 1);
    }

    #[test]
    fn bypass_runs_to_end_without_closer() {
        let mut hw = hw();
        let inc = id(&hw, "Inc");
        for _ in 0..4 {
            hw.push_inst(Instruction::new(inc, 0, 0, 0));
        }
        hw.update_scope(2, ScopeKind::Basic).unwrap();
        hw.bypass_scope(2);
        assert_eq!(hw.ip(), 3);
    }

    #[test]
    fn bypass_of_unopened_scope_is_noop() {
        let mut hw = hw();
        hw.update_scope(0, ScopeKind::Basic).unwrap();
        hw.set_ip(2);
        hw.bypass_scope(3);
        assert_eq!(hw.scope_stack().len(), 2);
        assert_eq!(hw.ip(), 2);
    }

    #[test]
    fn bypass_exits_innermost_only() {
        let mut hw = hw();
        hw.update_scope(0, ScopeKind::Basic).unwrap();
        hw.update_scope(3, ScopeKind::Basic).unwrap();
        hw.bypass_scope(0);
        assert_eq!(hw.scope_stack().len(), 2);
        assert_eq!(hw.cur_scope(), 1);
    }

    #[test]
    fn reset_ip_restores_all_backups() {
        let mut hw = hw();
        hw.push_reg_info(0, 1);
        hw.update_scope(0, ScopeKind::Basic).unwrap();
        hw.push_reg_info(1, 2);
        hw.update_scope(1, ScopeKind::Function).unwrap();
        hw.push_call_info(4);
        hw.set_reg(1, 100.0);
        hw.set_reg(2, 200.0);
        hw.set_ip(12);

        hw.reset_ip();
        assert_eq!(hw.ip(), 0);
        assert_eq!(hw.reg(1), 1.0);
        assert_eq!(hw.reg(2), 2.0);
        assert_eq!(hw.scope_stack().len(), 1);
        assert!(hw.call_stack().is_empty());
        assert!(hw.reg_stack().is_empty());
    }
}
