//! Text listings of evocpu genomes, in both directions.
//!
//! Translation is line for line: one instruction per non-blank line, names
//! and arities taken from whatever [`InstSet`] is supplied.
//!
//! # Usage
//!
//! ```
//! use evocpu_assembler::{assemble, disassemble};
//! use evocpu_vm::InstLib;
//!
//! let lib = InstLib::default_library();
//! let text = "SetReg 0 3\nCountdown 0 0\nInc 1\nScope 0\n";
//! let genome = assemble(text, lib.as_ref()).unwrap();
//! assert_eq!(genome.len(), 4);
//! assert_eq!(disassemble(&genome, lib.as_ref()), text);
//! ```
//!
//! # Roundtrip
//!
//! `assemble(disassemble(genome)) == genome` for genomes that leave unused
//! argument slots zero. The assembler also accepts hex (`0x0a`), symbolic
//! arguments (`RegB`), comments, and the indented layout from
//! [`print_genome`].

pub mod error;

mod disassembler;
mod lexer;
mod parser;

pub use disassembler::{disassemble, print_genome};
pub use error::AsmError;

use evocpu_common::{Genome, InstSet};
use lexer::tokenize_line;
use parser::parse_line;

/// Assemble listing text into a genome.
///
/// Returns the first error encountered.
pub fn assemble<S: InstSet + ?Sized>(text: &str, set: &S) -> Result<Genome, AsmError> {
    let mut instructions = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let line_num = idx + 1;
        let tokens = tokenize_line(line, line_num)?;
        if let Some(inst) = parse_line(&tokens, line_num, set)? {
            instructions.push(inst);
        }
    }

    Ok(Genome::from(instructions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use evocpu_common::Instruction;
    use evocpu_vm::InstLib;

    #[test]
    fn assemble_minimal() {
        let lib = InstLib::default_library();
        let genome = assemble("SetReg 2 40\nInc 2\n", lib.as_ref()).unwrap();
        let set_reg = lib.id_of("SetReg").unwrap();
        let inc = lib.id_of("Inc").unwrap();
        assert_eq!(
            genome.instructions,
            vec![
                Instruction::new(set_reg, 2, 40, 0),
                Instruction::new(inc, 2, 0, 0)
            ]
        );
    }

    #[test]
    fn disassemble_empty() {
        let lib = InstLib::default_library();
        assert_eq!(disassemble(&Genome::default(), lib.as_ref()), "");
    }

    #[test]
    fn comments_and_blanks() {
        let lib = InstLib::default_library();
        let text = "\
; count down from three
SetReg 0 3      ; loop counter

Countdown 0 0
  Inc 1
Scope 0
";
        let genome = assemble(text, lib.as_ref()).unwrap();
        assert_eq!(genome.len(), 4);
    }

    #[test]
    fn decimal_hex_and_symbolic_agree() {
        let lib = InstLib::default_library();
        let dec = assemble("Add 1 2 11\n", lib.as_ref()).unwrap();
        let hex = assemble("Add 0x1 0x2 0xb\n", lib.as_ref()).unwrap();
        let sym = assemble("Add RegB RegC RegL\n", lib.as_ref()).unwrap();
        assert_eq!(dec, hex);
        assert_eq!(dec, sym);
    }

    #[test]
    fn error_reports_line() {
        let lib = InstLib::default_library();
        let err = assemble("Inc 0\nJump 4\n", lib.as_ref()).unwrap_err();
        assert_eq!(
            err,
            AsmError::UnknownInstruction {
                line: 2,
                token: "Jump".to_string()
            }
        );
    }
}
