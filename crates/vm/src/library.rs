//! The default instruction set.
//!
//! Arithmetic and comparison instructions work on registers named by
//! their arguments. Control-flow instructions (If, While, Countdown, Scope,
//! Define, Call, Break) go through the scope primitives and never move the
//! instruction pointer on their own except for Call.

use std::sync::Arc;

use evocpu_common::{Args, InstSet, ScopeKind, CPU_SIZE};
use tracing::debug;

use crate::board::Direction;
use crate::catalog::{InstFn, InstLib};
use crate::error::{CatalogError, VmError};
use crate::hardware::Hardware;

type Entry = (&'static str, InstFn, usize, &'static str, Option<(ScopeKind, usize)>);

const DEFAULT_INSTS: &[Entry] = &[
    ("Inc", inst_inc, 1, "Increment value in reg Arg1", None),
    ("Dec", inst_dec, 1, "Decrement value in reg Arg1", None),
    ("Not", inst_not, 1, "Logically toggle value in reg Arg1", None),
    ("SetReg", inst_set_reg, 2, "Set reg Arg1 to numerical value Arg2", None),
    ("Add", inst_add, 3, "regs: Arg3 = Arg1 + Arg2", None),
    ("Sub", inst_sub, 3, "regs: Arg3 = Arg1 - Arg2", None),
    ("Mult", inst_mult, 3, "regs: Arg3 = Arg1 * Arg2", None),
    ("Div", inst_div, 3, "regs: Arg3 = Arg1 / Arg2", None),
    ("Mod", inst_mod, 3, "regs: Arg3 = Arg1 % Arg2", None),
    ("TestEqu", inst_test_equ, 3, "regs: Arg3 = (Arg1 == Arg2)", None),
    ("TestNEqu", inst_test_nequ, 3, "regs: Arg3 = (Arg1 != Arg2)", None),
    ("TestLess", inst_test_less, 3, "regs: Arg3 = (Arg1 < Arg2)", None),
    (
        "If",
        inst_if,
        2,
        "If reg Arg1 != 0, scope -> Arg2; else skip scope",
        Some((ScopeKind::Basic, 1)),
    ),
    (
        "While",
        inst_while,
        2,
        "Until reg Arg1 != 0, repeat scope Arg2; else skip",
        Some((ScopeKind::Loop, 1)),
    ),
    (
        "Countdown",
        inst_countdown,
        2,
        "Countdown reg Arg1 to zero; scope to Arg2",
        Some((ScopeKind::Loop, 1)),
    ),
    ("Break", inst_break, 1, "Break out of scope Arg1", None),
    ("Scope", inst_scope, 1, "Enter scope Arg1", Some((ScopeKind::Basic, 0))),
    (
        "Define",
        inst_define,
        2,
        "Build function Arg1 in scope Arg2",
        Some((ScopeKind::Function, 1)),
    ),
    ("Call", inst_call, 1, "Call previously defined function Arg1", None),
    ("SetMem", inst_set_mem, 3, "Put reg Arg3 into mem block Arg1 at position reg Arg2", None),
    ("GetMem", inst_get_mem, 3, "Get from block Arg1 position reg Arg2 into reg Arg3", None),
    ("CopyMem", inst_copy_mem, 2, "Copy memory block Arg1 into memory block Arg2", None),
    ("ShiftMem", inst_shift_mem, 2, "Shift positions in memory block Arg1 by reg Arg2", None),
    ("SetBoard", inst_set_board, 1, "Sets board state in board memory", None),
    ("EndTurn", inst_end_turn, 1, "Signals that the organism is done with computation", None),
    (
        "GetSquareCurr",
        inst_get_square_curr,
        2,
        "Gets piece from reg Arg1 in board and puts it in reg Arg2",
        None,
    ),
    ("GetValidAbove", inst_valid_above, 2, "Check if reg Arg1 flanks a piece above, bool put in reg Arg2", None),
    ("GetValidBelow", inst_valid_below, 2, "Check if reg Arg1 flanks a piece below, bool put in reg Arg2", None),
    ("GetValidLeft", inst_valid_left, 2, "Check if reg Arg1 flanks a piece left, bool put in reg Arg2", None),
    ("GetValidRight", inst_valid_right, 2, "Check if reg Arg1 flanks a piece right, bool put in reg Arg2", None),
    ("GetValidUL", inst_valid_ul, 2, "Check if reg Arg1 flanks a piece upper left, bool put in reg Arg2", None),
    ("GetValidUR", inst_valid_ur, 2, "Check if reg Arg1 flanks a piece upper right, bool put in reg Arg2", None),
    ("GetValidLL", inst_valid_ll, 2, "Check if reg Arg1 flanks a piece lower left, bool put in reg Arg2", None),
    ("GetValidLR", inst_valid_lr, 2, "Check if reg Arg1 flanks a piece lower right, bool put in reg Arg2", None),
    ("Input", inst_input, 2, "Pull next value from input Arg1 into reg Arg2", None),
    ("Output", inst_output, 2, "Push reg Arg1 into output Arg2", None),
    ("CopyVal", inst_copy_val, 2, "Copy reg Arg1 into reg Arg2", None),
    ("ScopeReg", inst_scope_reg, 1, "Backup reg Arg1; restore at end of scope", None),
];

const REG_NAMES: &str = "ABCDEFGHIJKLMNOP";

impl InstLib {
    /// Build the reference instruction set, with `0`..`15` and
    /// `RegA`..`RegP` as symbolic arguments.
    pub fn try_default_library() -> Result<InstLib, CatalogError> {
        let mut lib = InstLib::new();
        for &(name, func, num_args, desc, scope) in DEFAULT_INSTS {
            match scope {
                Some((kind, arg)) => lib.add_scoped_inst(name, func, num_args, desc, kind, arg)?,
                None => lib.add_inst(name, func, num_args, desc)?,
            };
        }
        for (i, letter) in REG_NAMES.chars().take(CPU_SIZE).enumerate() {
            let value = i as u16;
            lib.add_arg(&i.to_string(), value);
            lib.add_arg(&format!("Reg{letter}"), value);
        }
        Ok(lib)
    }

    /// The reference instruction set, ready to share between CPUs.
    pub fn default_library() -> Arc<InstLib> {
        Arc::new(
            Self::try_default_library().expect("built-in instruction table is well-formed"),
        )
    }
}

// ---- Register arithmetic ----

fn inst_inc(hw: &mut Hardware, args: &Args) -> Result<(), VmError> {
    let r = hw.reg_slot(args[0])?;
    hw.regs[r] += 1.0;
    Ok(())
}

fn inst_dec(hw: &mut Hardware, args: &Args) -> Result<(), VmError> {
    let r = hw.reg_slot(args[0])?;
    hw.regs[r] -= 1.0;
    Ok(())
}

fn inst_not(hw: &mut Hardware, args: &Args) -> Result<(), VmError> {
    let r = hw.reg_slot(args[0])?;
    hw.regs[r] = bool_value(hw.regs[r] == 0.0);
    Ok(())
}

fn inst_set_reg(hw: &mut Hardware, args: &Args) -> Result<(), VmError> {
    let r = hw.reg_slot(args[0])?;
    hw.regs[r] = f64::from(args[1]);
    Ok(())
}

/// Apply `op` to regs Arg1 and Arg2, storing into reg Arg3.
fn binary_op(hw: &mut Hardware, args: &Args, op: impl Fn(f64, f64) -> f64) -> Result<(), VmError> {
    let a = hw.reg_slot(args[0])?;
    let b = hw.reg_slot(args[1])?;
    let out = hw.reg_slot(args[2])?;
    hw.regs[out] = op(hw.regs[a], hw.regs[b]);
    Ok(())
}

/// As [`binary_op`], but a zero right operand counts an error and leaves
/// the destination alone.
fn checked_op(hw: &mut Hardware, args: &Args, op: impl Fn(f64, f64) -> f64) -> Result<(), VmError> {
    let a = hw.reg_slot(args[0])?;
    let b = hw.reg_slot(args[1])?;
    let out = hw.reg_slot(args[2])?;
    let denom = hw.regs[b];
    if denom == 0.0 {
        hw.inc_errors();
    } else {
        hw.regs[out] = op(hw.regs[a], denom);
    }
    Ok(())
}

fn bool_value(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

fn inst_add(hw: &mut Hardware, args: &Args) -> Result<(), VmError> {
    binary_op(hw, args, |a, b| a + b)
}

fn inst_sub(hw: &mut Hardware, args: &Args) -> Result<(), VmError> {
    binary_op(hw, args, |a, b| a - b)
}

fn inst_mult(hw: &mut Hardware, args: &Args) -> Result<(), VmError> {
    binary_op(hw, args, |a, b| a * b)
}

fn inst_div(hw: &mut Hardware, args: &Args) -> Result<(), VmError> {
    checked_op(hw, args, |a, b| a / b)
}

fn inst_mod(hw: &mut Hardware, args: &Args) -> Result<(), VmError> {
    checked_op(hw, args, |a, b| a % b)
}

fn inst_test_equ(hw: &mut Hardware, args: &Args) -> Result<(), VmError> {
    binary_op(hw, args, |a, b| bool_value(a == b))
}

fn inst_test_nequ(hw: &mut Hardware, args: &Args) -> Result<(), VmError> {
    binary_op(hw, args, |a, b| bool_value(a != b))
}

fn inst_test_less(hw: &mut Hardware, args: &Args) -> Result<(), VmError> {
    binary_op(hw, args, |a, b| bool_value(a < b))
}

// ---- Control flow ----

/// Shared body of If / While / Countdown: open the scope, then skip it if
/// the test register is zero. Returns the test register when the body is
/// going to run.
fn open_guarded(hw: &mut Hardware, args: &Args, kind: ScopeKind) -> Result<Option<usize>, VmError> {
    let test = hw.reg_slot(args[0])?;
    let scope = args[1] as usize;
    if !hw.update_scope(scope, kind)? {
        return Ok(None);
    }
    if hw.regs[test] == 0.0 {
        hw.bypass_scope(scope);
        return Ok(None);
    }
    Ok(Some(test))
}

fn inst_if(hw: &mut Hardware, args: &Args) -> Result<(), VmError> {
    open_guarded(hw, args, ScopeKind::Basic).map(|_| ())
}

fn inst_while(hw: &mut Hardware, args: &Args) -> Result<(), VmError> {
    open_guarded(hw, args, ScopeKind::Loop).map(|_| ())
}

fn inst_countdown(hw: &mut Hardware, args: &Args) -> Result<(), VmError> {
    if let Some(test) = open_guarded(hw, args, ScopeKind::Loop)? {
        hw.regs[test] -= 1.0;
    }
    Ok(())
}

fn inst_break(hw: &mut Hardware, args: &Args) -> Result<(), VmError> {
    hw.bypass_scope(args[0] as usize);
    Ok(())
}

fn inst_scope(hw: &mut Hardware, args: &Args) -> Result<(), VmError> {
    hw.update_scope(args[0] as usize, ScopeKind::Basic)?;
    Ok(())
}

fn inst_define(hw: &mut Hardware, args: &Args) -> Result<(), VmError> {
    let slot = args[0] as usize;
    if slot >= CPU_SIZE {
        return Err(VmError::FunctionSlotOutOfRange {
            at: hw.inst_ptr,
            slot: args[0],
        });
    }
    let scope = args[1] as usize;
    if !hw.update_scope(scope, ScopeKind::Function)? {
        return Ok(());
    }
    hw.fun_starts[slot] = Some(hw.inst_ptr);
    // The body only runs when called.
    hw.bypass_scope(scope);
    Ok(())
}

/// Jump into function Arg1.
///
/// Stale or undefined slots are ignored: the recorded position must still
/// hold an instruction that opens a Function scope. The pointer is set to
/// the slot after the definition and then advanced by the engine, so the
/// instruction directly after the Define is not run by a call.
fn inst_call(hw: &mut Hardware, args: &Args) -> Result<(), VmError> {
    let Some(def_pos) = hw.fun_start(args[0] as usize) else {
        debug!(at = hw.inst_ptr, slot = args[0], "call to undefined function");
        return Ok(());
    };
    let Some(def) = hw.genome.get(def_pos).copied() else {
        debug!(at = hw.inst_ptr, slot = args[0], def_pos, "call past genome end");
        return Ok(());
    };
    let fun_scope = match hw.inst_lib.scope_of(def.id) {
        Some(spec) if spec.kind == ScopeKind::Function => def.args[spec.arg] as usize,
        _ => {
            debug!(at = hw.inst_ptr, slot = args[0], def_pos, "stale function entry");
            return Ok(());
        }
    };

    if !hw.update_scope(fun_scope, ScopeKind::Function)? {
        return Ok(());
    }
    hw.call_stack.push(hw.inst_ptr + 1);
    hw.inst_ptr = def_pos + 1;
    Ok(())
}

fn inst_scope_reg(hw: &mut Hardware, args: &Args) -> Result<(), VmError> {
    let r = hw.reg_slot(args[0])?;
    let scope = hw.cur_scope();
    hw.push_reg_info(scope, r);
    Ok(())
}

// ---- Memory ----

/// Register value used as a map key or board square.
fn reg_key(value: f64) -> i64 {
    value as i64
}

fn inst_set_mem(hw: &mut Hardware, args: &Args) -> Result<(), VmError> {
    let block = hw.block_slot(args[0])?;
    let pos = hw.reg_slot(args[1])?;
    let value = hw.reg_slot(args[2])?;
    hw.set_mem(block, reg_key(hw.regs[pos]), hw.regs[value]);
    Ok(())
}

fn inst_get_mem(hw: &mut Hardware, args: &Args) -> Result<(), VmError> {
    let block = hw.block_slot(args[0])?;
    let pos = hw.reg_slot(args[1])?;
    let out = hw.reg_slot(args[2])?;
    hw.regs[out] = hw.mem(block, reg_key(hw.regs[pos]));
    Ok(())
}

fn inst_copy_mem(hw: &mut Hardware, args: &Args) -> Result<(), VmError> {
    let from = hw.block_slot(args[0])?;
    let to = hw.block_slot(args[1])?;
    hw.copy_mem(from, to);
    Ok(())
}

fn inst_shift_mem(hw: &mut Hardware, args: &Args) -> Result<(), VmError> {
    let block = hw.block_slot(args[0])?;
    let shift = hw.reg_slot(args[1])?;
    hw.shift_mem(block, reg_key(hw.regs[shift]));
    Ok(())
}

// ---- I/O ----

fn inst_input(hw: &mut Hardware, args: &Args) -> Result<(), VmError> {
    let id = hw.reg_slot(args[0])?;
    let out = hw.reg_slot(args[1])?;
    hw.regs[out] = hw.input(reg_key(hw.regs[id]));
    Ok(())
}

fn inst_output(hw: &mut Hardware, args: &Args) -> Result<(), VmError> {
    let value = hw.reg_slot(args[0])?;
    let id = hw.reg_slot(args[1])?;
    hw.set_output(reg_key(hw.regs[id]), hw.regs[value]);
    Ok(())
}

fn inst_copy_val(hw: &mut Hardware, args: &Args) -> Result<(), VmError> {
    let from = hw.reg_slot(args[0])?;
    let to = hw.reg_slot(args[1])?;
    hw.regs[to] = hw.regs[from];
    Ok(())
}

fn inst_end_turn(hw: &mut Hardware, _args: &Args) -> Result<(), VmError> {
    hw.end_turn();
    Ok(())
}

// ---- Board ----

fn inst_set_board(hw: &mut Hardware, _args: &Args) -> Result<(), VmError> {
    hw.set_board();
    Ok(())
}

fn inst_get_square_curr(hw: &mut Hardware, args: &Args) -> Result<(), VmError> {
    let pos = hw.reg_slot(args[0])?;
    let out = hw.reg_slot(args[1])?;
    hw.regs[out] = hw.square(reg_key(hw.regs[pos]));
    Ok(())
}

fn valid_move(hw: &mut Hardware, args: &Args, dir: Direction) -> Result<(), VmError> {
    let pos = hw.reg_slot(args[0])?;
    let out = hw.reg_slot(args[1])?;
    hw.regs[out] = bool_value(hw.flanks(reg_key(hw.regs[pos]), dir));
    Ok(())
}

fn inst_valid_above(hw: &mut Hardware, args: &Args) -> Result<(), VmError> {
    valid_move(hw, args, Direction::Up)
}

fn inst_valid_below(hw: &mut Hardware, args: &Args) -> Result<(), VmError> {
    valid_move(hw, args, Direction::Down)
}

fn inst_valid_left(hw: &mut Hardware, args: &Args) -> Result<(), VmError> {
    valid_move(hw, args, Direction::Left)
}

fn inst_valid_right(hw: &mut Hardware, args: &Args) -> Result<(), VmError> {
    valid_move(hw, args, Direction::Right)
}

fn inst_valid_ul(hw: &mut Hardware, args: &Args) -> Result<(), VmError> {
    valid_move(hw, args, Direction::UpLeft)
}

fn inst_valid_ur(hw: &mut Hardware, args: &Args) -> Result<(), VmError> {
    valid_move(hw, args, Direction::UpRight)
}

fn inst_valid_ll(hw: &mut Hardware, args: &Args) -> Result<(), VmError> {
    valid_move(hw, args, Direction::DownLeft)
}

fn inst_valid_lr(hw: &mut Hardware, args: &Args) -> Result<(), VmError> {
    valid_move(hw, args, Direction::DownRight)
}
