//! Instruction encoding and decoding for evocpu genomes.
//!
//! Every instruction is exactly 64 bits (8 bytes), encoded little-endian:
//! ```text
//! Bytes 0-1: id   (u16, catalog index)
//! Bytes 2-3: arg0 (u16)
//! Bytes 4-5: arg1 (u16)
//! Bytes 6-7: arg2 (u16)
//! ```
//!
//! Argument meaning (register index, literal, scope depth, function slot)
//! is decided per instruction by the catalog, not by the encoding.

use crate::INST_ARGS;

/// Catalog index of an instruction.
pub type InstId = u16;

/// A single instruction argument. Always non-negative.
pub type Arg = u16;

/// The fixed argument slots carried by every instruction.
pub type Args = [Arg; INST_ARGS];

/// A single 64-bit instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Instruction {
    /// Which catalog entry executes this instruction.
    pub id: InstId,
    /// Argument slots. Slots beyond the entry's arity are ignored.
    pub args: Args,
}

impl Instruction {
    /// Create a new instruction.
    pub fn new(id: InstId, a0: Arg, a1: Arg, a2: Arg) -> Self {
        Self {
            id,
            args: [a0, a1, a2],
        }
    }

    /// Overwrite this instruction in place.
    pub fn set(&mut self, id: InstId, a0: Arg, a1: Arg, a2: Arg) {
        self.id = id;
        self.args = [a0, a1, a2];
    }

    /// Encode this instruction to 8 bytes (little-endian).
    pub fn encode(&self) -> [u8; 8] {
        let mut bytes = [0u8; 8];
        bytes[0..2].copy_from_slice(&self.id.to_le_bytes());
        bytes[2..4].copy_from_slice(&self.args[0].to_le_bytes());
        bytes[4..6].copy_from_slice(&self.args[1].to_le_bytes());
        bytes[6..8].copy_from_slice(&self.args[2].to_le_bytes());
        bytes
    }

    /// Decode 8 bytes into an instruction (little-endian).
    ///
    /// Every bit pattern is a structurally valid instruction; whether the id
    /// names a real catalog entry is checked at dispatch time.
    pub fn decode(bytes: [u8; 8]) -> Self {
        Self {
            id: u16::from_le_bytes([bytes[0], bytes[1]]),
            args: [
                u16::from_le_bytes([bytes[2], bytes[3]]),
                u16::from_le_bytes([bytes[4], bytes[5]]),
                u16::from_le_bytes([bytes[6], bytes[7]]),
            ],
        }
    }
}
