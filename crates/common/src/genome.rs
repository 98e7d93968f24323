//! Genome representation.
//!
//! A genome is an ordered, mutable sequence of instructions. Binary genome
//! files (.gpb) are raw concatenations of 8-byte instructions with no header.

use crate::error::DecodeError;
use crate::instruction::{Arg, InstId, Instruction};

/// An evolvable program: a sequence of instructions addressed by position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Genome {
    /// The instruction stream.
    pub instructions: Vec<Instruction>,
}

impl Genome {
    /// Create a new genome from a vector of instructions.
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }

    /// Append an instruction.
    pub fn push(&mut self, id: InstId, a0: Arg, a1: Arg, a2: Arg) {
        self.instructions.push(Instruction::new(id, a0, a1, a2));
    }

    /// Instruction at `pos`, if in range.
    pub fn get(&self, pos: usize) -> Option<&Instruction> {
        self.instructions.get(pos)
    }

    /// Encode the entire genome to bytes.
    ///
    /// Each instruction becomes 8 bytes. The result length is always
    /// `instructions.len() * 8`.
    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.instructions.len() * 8);
        for instr in &self.instructions {
            bytes.extend_from_slice(&instr.encode());
        }
        bytes
    }

    /// Decode a byte slice into a genome.
    ///
    /// The byte slice length must be a multiple of 8.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.len() % 8 != 0 {
            return Err(DecodeError::InvalidLength(bytes.len()));
        }

        let instructions = bytes
            .chunks_exact(8)
            .map(|chunk| {
                let mut arr = [0u8; 8];
                arr.copy_from_slice(chunk);
                Instruction::decode(arr)
            })
            .collect();

        Ok(Self { instructions })
    }

    /// Number of instructions in the genome.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns true if the genome has no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Remove every instruction.
    pub fn clear(&mut self) {
        self.instructions.clear();
    }
}

impl From<Vec<Instruction>> for Genome {
    fn from(instructions: Vec<Instruction>) -> Self {
        Self::new(instructions)
    }
}
