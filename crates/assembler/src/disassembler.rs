//! Disassembler: genome → listing text.
//!
//! Two layouts. The flat listing is canonical: one instruction per line, no
//! indentation, no comments. The indented listing shows scope structure and
//! is meant for reading; the assembler accepts it too.

use std::fmt::Write;

use evocpu_common::{Genome, InstSet, Instruction};

use crate::lexer::{OPEN_MARKER, SIBLING_MARKER};

/// Write `Name a0 a1` with as many arguments as the entry declares.
///
/// Ids missing from the set become a comment line, so a listing of a
/// corrupt genome still reassembles (without those slots).
fn write_inst<S: InstSet + ?Sized>(out: &mut String, inst: &Instruction, set: &S) {
    let Some(name) = set.name_of(inst.id) else {
        let _ = write!(out, "; unknown instruction {}", inst.id);
        return;
    };
    out.push_str(name);
    let num_args = set.num_args(inst.id).unwrap_or(0).min(inst.args.len());
    for arg in &inst.args[..num_args] {
        let _ = write!(out, " {arg}");
    }
}

/// Flat listing of `genome`.
///
/// `assemble(disassemble(genome))` reproduces `genome` whenever every
/// argument slot past an entry's arity is zero and every id is known to
/// `set`. Unknown ids are written as `; unknown instruction N` comment
/// lines, so reassembling drops them.
pub fn disassemble<S: InstSet + ?Sized>(genome: &Genome, set: &S) -> String {
    let mut out = String::new();
    for inst in &genome.instructions {
        write_inst(&mut out, inst, set);
        out.push('\n');
    }
    out
}

/// Scope-indented listing of `genome`.
///
/// Each line is indented by the depth in effect when it is reached in a
/// straight read. Scope openers end with `-->`. When an opener names the
/// depth already in effect, a `----` line separates it from the sibling
/// scope it closes.
pub fn print_genome<S: InstSet + ?Sized>(genome: &Genome, set: &S) -> String {
    let mut out = String::new();
    let mut cur_scope = 0usize;

    for inst in &genome.instructions {
        let new_scope = set.inst_scope(inst);

        if new_scope != 0 {
            if new_scope == cur_scope {
                indent(&mut out, cur_scope);
                out.push_str(SIBLING_MARKER);
                out.push('\n');
            }
            if new_scope < cur_scope {
                cur_scope = new_scope - 1;
            }
        }

        indent(&mut out, cur_scope);
        write_inst(&mut out, inst, set);
        if new_scope != 0 {
            if new_scope > cur_scope {
                out.push(' ');
                out.push_str(OPEN_MARKER);
            }
            cur_scope = new_scope;
        }
        out.push('\n');
    }
    out
}

fn indent(out: &mut String, depth: usize) {
    out.extend(std::iter::repeat(' ').take(depth));
}
