//! Human-readable CPU state and step-by-step tracing.

use std::fmt::{self, Write};

use evocpu_common::{InstSet, Instruction};

use crate::error::TraceError;
use crate::hardware::Hardware;

impl Hardware {
    /// `Name a0 a1` with as many arguments as the entry declares.
    pub fn inst_string(&self, inst: &Instruction) -> String {
        let lib = &self.inst_lib;
        let Some(name) = lib.name_of(inst.id) else {
            return format!("<unknown {}>", inst.id);
        };
        let num_args = lib.num_args(inst.id).unwrap_or(0);
        let mut out = name.to_string();
        for arg in &inst.args[..num_args] {
            let _ = write!(out, " {arg}");
        }
        out
    }

    /// Write registers, I/O and the upcoming instruction.
    pub fn write_state<W: Write>(&self, out: &mut W) -> fmt::Result {
        let next_inst = self.predict_next_inst();

        write!(out, " REGS: ")?;
        for reg in &self.regs {
            write!(out, "[{reg}] ")?;
        }
        write!(out, "\n INPUTS: ")?;
        for (id, value) in &self.inputs {
            write!(out, "[{id},{value}] ")?;
        }
        write!(out, "\n OUTPUTS: ")?;
        for (id, value) in &self.outputs {
            write!(out, "[{id},{value}] ")?;
        }
        writeln!(out)?;

        write!(out, "IP:{}", self.inst_ptr)?;
        if self.inst_ptr != next_inst {
            write!(out, "(-> {next_inst})")?;
        }
        let next = match self.genome.get(next_inst) {
            Some(inst) => self.inst_string(inst),
            None => "none".to_string(),
        };
        writeln!(
            out,
            " scope:{} ({}) errors: {}",
            self.cur_scope(),
            next,
            self.errors
        )
    }

    /// [`write_state`](Hardware::write_state) into a fresh string.
    pub fn state_string(&self) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail.
        let _ = self.write_state(&mut out);
        out
    }

    /// Print the state, then step, `num_inst` times.
    pub fn trace<W: Write>(&mut self, num_inst: usize, out: &mut W) -> Result<(), TraceError> {
        for _ in 0..num_inst {
            self.write_state(out)?;
            self.single_process()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InstLib;

    fn hw_with(lines: &[(&str, u16, u16, u16)]) -> Hardware {
        let mut hw = Hardware::new(InstLib::default_library());
        for &(name, a0, a1, a2) in lines {
            hw.push_inst_named(name, a0, a1, a2).unwrap();
        }
        hw
    }

    #[test]
    fn inst_string_prints_declared_arity_only() {
        let hw = hw_with(&[("SetReg", 3, 7, 9), ("Inc", 2, 5, 5)]);
        assert_eq!(hw.inst_string(&hw.genome().instructions[0]), "SetReg 3 7");
        assert_eq!(hw.inst_string(&hw.genome().instructions[1]), "Inc 2");
        assert_eq!(
            hw.inst_string(&Instruction::new(999, 0, 0, 0)),
            "<unknown 999>"
        );
    }

    #[test]
    fn state_shows_ip_scope_and_next_instruction() {
        let hw = hw_with(&[("Inc", 0, 0, 0)]);
        let state = hw.state_string();
        assert!(state.starts_with(" REGS: [0] [1] [2]"));
        assert!(state.contains("IP:0 scope:0 (Inc 0) errors: 0"));
    }

    #[test]
    fn state_shows_predicted_jump() {
        // While reg1 (1) loops; the Scope at 2 closes it.
        let mut hw = hw_with(&[("While", 1, 0, 0), ("Inc", 3, 0, 0), ("Scope", 0, 0, 0)]);
        hw.process(2).unwrap();
        assert_eq!(hw.ip(), 2);
        assert!(hw.state_string().contains("IP:2(-> 0) scope:1 (While 1 0)"));
    }

    #[test]
    fn trace_writes_one_state_per_step() {
        let mut hw = hw_with(&[("Inc", 0, 0, 0), ("Inc", 0, 0, 0)]);
        let mut out = String::new();
        hw.trace(3, &mut out).unwrap();
        assert_eq!(out.matches("IP:").count(), 3);
        assert_eq!(hw.reg(0), 3.0);
    }

    #[test]
    fn empty_genome_state() {
        let hw = hw_with(&[]);
        assert!(hw.state_string().contains("IP:0 scope:0 (none)"));
    }
}
