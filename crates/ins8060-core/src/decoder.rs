//! Addressing-mode extraction and instruction length decoding.

use crate::encoding::{Opcode, OPCODE_TABLE};
use crate::state::Pointer;

/// Addressing modes of the memory-reference instruction groups.
///
/// Bits 2..0 of the opcode select the mode: `0..=3` index through `P0..P3`,
/// `4` is immediate, `5..=7` auto-index through `P1..P3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressingMode {
    /// `disp(Pn)`: page-wrapped `Pn + disp`. With `P0` this is PC-relative.
    Indexed(Pointer),
    /// `@disp(Pn)`: pre-decrement for negative `disp`, post-increment otherwise.
    AutoIndexed(Pointer),
    /// The displacement byte is the operand itself.
    Immediate,
}

impl AddressingMode {
    /// Extracts the addressing mode from the low three bits of an opcode.
    #[must_use]
    pub const fn from_opcode(opcode: u8) -> Self {
        let ptr = Pointer::from_bits(opcode);
        match opcode & 0x07 {
            0..=3 => Self::Indexed(ptr),
            4 => Self::Immediate,
            _ => Self::AutoIndexed(ptr),
        }
    }

    /// Pointer register the mode addresses through, if any.
    #[must_use]
    pub const fn pointer(self) -> Option<Pointer> {
        match self {
            Self::Indexed(ptr) | Self::AutoIndexed(ptr) => Some(ptr),
            Self::Immediate => None,
        }
    }
}

/// A classified opcode byte with its encoded length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecodedInstruction {
    /// Raw opcode byte.
    pub raw: u8,
    /// Operation selected by the opcode.
    pub opcode: Opcode,
    /// Encoded length in bytes (1 or 2).
    pub len_bytes: u8,
}

/// Stateless opcode classifier.
pub struct Decoder;

impl Decoder {
    /// Classifies an opcode byte.
    #[must_use]
    pub const fn decode(raw: u8) -> DecodedInstruction {
        let opcode = OPCODE_TABLE[raw as usize];
        DecodedInstruction {
            raw,
            opcode,
            len_bytes: Self::instruction_length(raw),
        }
    }

    /// Encoded length of the instruction starting with `raw`.
    ///
    /// Undefined opcodes with bit 7 set are two bytes long, matching how the
    /// core skips them.
    #[must_use]
    pub const fn instruction_length(raw: u8) -> u8 {
        if raw & 0x80 != 0 {
            2
        } else {
            1
        }
    }
}
