use crate::decoder::AddressingMode;
use crate::state::Pointer;

/// Accumulator operation shared by the memory-reference, immediate and
/// extension-register instruction groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AluOp {
    /// `AC = operand`.
    Load,
    /// `AC &= operand`.
    And,
    /// `AC |= operand`.
    Or,
    /// `AC ^= operand`.
    Xor,
    /// `AC = AC + operand + CY`.
    Add,
    /// `AC = AC + !operand + CY`.
    ComplementAdd,
}

/// Branch predicate on the accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    /// `JMP`.
    Always,
    /// `JP`: sign bit clear.
    Positive,
    /// `JZ`.
    Zero,
    /// `JNZ`.
    NonZero,
}

impl Condition {
    /// Evaluates the predicate against the accumulator.
    #[must_use]
    pub const fn holds(self, accumulator: u8) -> bool {
        match self {
            Self::Always => true,
            Self::Positive => accumulator & 0x80 == 0,
            Self::Zero => accumulator == 0,
            Self::NonZero => accumulator != 0,
        }
    }
}

/// Operation selected by an opcode byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Opcode {
    Halt,
    /// Exchange AC and E.
    Xae,
    /// Clear carry.
    Ccl,
    /// Set carry.
    Scl,
    /// Disable interrupts.
    Dint,
    /// Enable interrupts.
    Ien,
    /// Copy status to AC.
    Csa,
    /// Copy AC to status.
    Cas,
    Nop,
    /// Shift right.
    Sr,
    /// Shift right with link.
    Srl,
    /// Rotate right.
    Rr,
    /// Rotate right through carry.
    Rrl,
    /// Write `AC & 0x7F` to the host output hook.
    Putc,
    /// Read a host input character into AC and E.
    Getc,
    /// Exchange AC with the low byte of a pointer.
    Xpal(Pointer),
    /// Exchange AC with the high byte of a pointer.
    Xpah(Pointer),
    /// Exchange PC with a pointer.
    Xppc(Pointer),
    /// Accumulator operation with E as the operand.
    Extension(AluOp),
    /// Branch through a pointer-relative target.
    Jump(Condition, Pointer),
    /// Increment memory and load.
    Ild(AddressingMode),
    /// Decrement memory and load.
    Dld(AddressingMode),
    /// Accumulator operation with a memory or immediate operand.
    Memory(AluOp, AddressingMode),
    /// Store AC to memory.
    Store(AddressingMode),
    /// Undefined or unimplemented opcode.
    Illegal,
}

impl Opcode {
    /// Returns `true` for opcodes the core skips over.
    #[must_use]
    pub const fn is_illegal(self) -> bool {
        matches!(self, Self::Illegal)
    }
}

const fn memory_group(opcode: u8) -> Option<AluOp> {
    match opcode & 0xF8 {
        0xC0 => Some(AluOp::Load),
        0xD0 => Some(AluOp::And),
        0xD8 => Some(AluOp::Or),
        0xE0 => Some(AluOp::Xor),
        0xF0 => Some(AluOp::Add),
        0xF8 => Some(AluOp::ComplementAdd),
        _ => None,
    }
}

/// Classifies one opcode byte.
#[must_use]
pub const fn decode_opcode(opcode: u8) -> Opcode {
    let ptr = Pointer::from_bits(opcode);
    let mode = AddressingMode::from_opcode(opcode);

    if let Some(op) = memory_group(opcode) {
        return Opcode::Memory(op, mode);
    }

    match opcode {
        0x00 => Opcode::Halt,
        0x01 => Opcode::Xae,
        0x02 => Opcode::Ccl,
        0x03 => Opcode::Scl,
        0x04 => Opcode::Dint,
        0x05 => Opcode::Ien,
        0x06 => Opcode::Csa,
        0x07 => Opcode::Cas,
        0x08 => Opcode::Nop,
        0x1C => Opcode::Sr,
        0x1D => Opcode::Srl,
        0x1E => Opcode::Rr,
        0x1F => Opcode::Rrl,
        0x20 => Opcode::Putc,
        0x21 => Opcode::Getc,
        0x30..=0x33 => Opcode::Xpal(ptr),
        0x34..=0x37 => Opcode::Xpah(ptr),
        0x3C..=0x3F => Opcode::Xppc(ptr),
        0x40 => Opcode::Extension(AluOp::Load),
        0x50 => Opcode::Extension(AluOp::And),
        0x58 => Opcode::Extension(AluOp::Or),
        0x60 => Opcode::Extension(AluOp::Xor),
        0x70 => Opcode::Extension(AluOp::Add),
        0x78 => Opcode::Extension(AluOp::ComplementAdd),
        0x90..=0x93 => Opcode::Jump(Condition::Always, ptr),
        0x94..=0x97 => Opcode::Jump(Condition::Positive, ptr),
        0x98..=0x9B => Opcode::Jump(Condition::Zero, ptr),
        0x9C..=0x9F => Opcode::Jump(Condition::NonZero, ptr),
        0xA8..=0xAB => Opcode::Ild(mode),
        0xB8..=0xBB => Opcode::Dld(mode),
        0xCC => Opcode::Illegal,
        0xC8..=0xCF => Opcode::Store(mode),
        _ => Opcode::Illegal,
    }
}

const fn build_opcode_table() -> [Opcode; 256] {
    let mut table = [Opcode::Illegal; 256];
    let mut index = 0;
    while index < 256 {
        table[index] = decode_opcode(index as u8);
        index += 1;
    }
    table
}

/// Dispatch table indexed by opcode byte.
pub const OPCODE_TABLE: [Opcode; 256] = build_opcode_table();
