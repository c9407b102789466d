//! Instruction disassembly in National Semiconductor SC/MP notation.

use std::fmt;

use crate::decoder::{AddressingMode, Decoder};
use crate::encoding::{AluOp, Condition, Opcode};
use crate::memory::MemoryBus;
use crate::state::Pointer;

/// A single disassembled instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DisassemblyRow {
    /// Address of the opcode byte.
    pub addr_start: u16,
    /// Encoded length in bytes.
    pub len_bytes: u8,
    /// Raw instruction bytes.
    pub bytes: Vec<u8>,
    /// Mnemonic, e.g. `LD` or `XPPC`.
    pub mnemonic: String,
    /// Formatted operand, e.g. `@-1(P1)`; empty for implied instructions.
    pub operands: String,
    /// Whether the opcode is undefined.
    pub is_illegal: bool,
}

impl fmt::Display for DisassemblyRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.operands.is_empty() {
            f.write_str(&self.mnemonic)
        } else {
            write!(f, "{} {}", self.mnemonic, self.operands)
        }
    }
}

const fn alu_mnemonic(op: AluOp, mode: AddressingMode) -> &'static str {
    let immediate = matches!(mode, AddressingMode::Immediate);
    match (op, immediate) {
        (AluOp::Load, false) => "LD",
        (AluOp::Load, true) => "LDI",
        (AluOp::And, false) => "AND",
        (AluOp::And, true) => "ANI",
        (AluOp::Or, false) => "OR",
        (AluOp::Or, true) => "ORI",
        (AluOp::Xor, false) => "XOR",
        (AluOp::Xor, true) => "XRI",
        (AluOp::Add, false) => "ADD",
        (AluOp::Add, true) => "ADI",
        (AluOp::ComplementAdd, false) => "CAD",
        (AluOp::ComplementAdd, true) => "CAI",
    }
}

const fn extension_mnemonic(op: AluOp) -> &'static str {
    match op {
        AluOp::Load => "LDE",
        AluOp::And => "ANE",
        AluOp::Or => "ORE",
        AluOp::Xor => "XRE",
        AluOp::Add => "ADE",
        AluOp::ComplementAdd => "CAE",
    }
}

const fn jump_mnemonic(condition: Condition) -> &'static str {
    match condition {
        Condition::Always => "JMP",
        Condition::Positive => "JP",
        Condition::Zero => "JZ",
        Condition::NonZero => "JNZ",
    }
}

const fn pointer_name(ptr: Pointer) -> &'static str {
    match ptr {
        Pointer::P0 => "P0",
        Pointer::P1 => "P1",
        Pointer::P2 => "P2",
        Pointer::P3 => "P3",
    }
}

fn displacement_text(operand: Option<u8>, extension_sentinel: bool) -> String {
    match operand {
        None => "?".to_string(),
        Some(0x80) if extension_sentinel => "E".to_string(),
        Some(byte) => (byte as i8).to_string(),
    }
}

fn mode_operand(mode: AddressingMode, operand: Option<u8>) -> String {
    match mode {
        AddressingMode::Immediate => {
            operand.map_or_else(|| "?".to_string(), |byte| format!("0x{byte:02X}"))
        }
        AddressingMode::Indexed(ptr) => {
            format!("{}({})", displacement_text(operand, true), pointer_name(ptr))
        }
        AddressingMode::AutoIndexed(ptr) => {
            format!("@{}({})", displacement_text(operand, true), pointer_name(ptr))
        }
    }
}

fn mnemonic_and_operands(opcode: Opcode, raw: u8, operand: Option<u8>) -> (&'static str, String) {
    let none = String::new;
    match opcode {
        Opcode::Halt => ("HALT", none()),
        Opcode::Xae => ("XAE", none()),
        Opcode::Ccl => ("CCL", none()),
        Opcode::Scl => ("SCL", none()),
        Opcode::Dint => ("DINT", none()),
        Opcode::Ien => ("IEN", none()),
        Opcode::Csa => ("CSA", none()),
        Opcode::Cas => ("CAS", none()),
        Opcode::Nop => ("NOP", none()),
        Opcode::Sr => ("SR", none()),
        Opcode::Srl => ("SRL", none()),
        Opcode::Rr => ("RR", none()),
        Opcode::Rrl => ("RRL", none()),
        Opcode::Putc => ("PUTC", none()),
        Opcode::Getc => ("GETC", none()),
        Opcode::Xpal(ptr) => ("XPAL", pointer_name(ptr).to_string()),
        Opcode::Xpah(ptr) => ("XPAH", pointer_name(ptr).to_string()),
        Opcode::Xppc(ptr) => ("XPPC", pointer_name(ptr).to_string()),
        Opcode::Extension(op) => (extension_mnemonic(op), none()),
        Opcode::Jump(condition, ptr) => (
            jump_mnemonic(condition),
            format!("{}({})", displacement_text(operand, false), pointer_name(ptr)),
        ),
        Opcode::Ild(mode) => ("ILD", mode_operand(mode, operand)),
        Opcode::Dld(mode) => ("DLD", mode_operand(mode, operand)),
        Opcode::Memory(op, mode) => (alu_mnemonic(op, mode), mode_operand(mode, operand)),
        Opcode::Store(mode) => ("ST", mode_operand(mode, operand)),
        Opcode::Illegal => (".byte", format!("0x{raw:02X}")),
    }
}

fn build_row(addr_start: u16, bytes: &[u8]) -> Option<DisassemblyRow> {
    let (&raw, rest) = bytes.split_first()?;
    let decoded = Decoder::decode(raw);
    let operand = rest.first().copied();
    let (mnemonic, operands) = mnemonic_and_operands(decoded.opcode, raw, operand);
    let kept = bytes.len().min(usize::from(decoded.len_bytes));
    Some(DisassemblyRow {
        addr_start,
        len_bytes: decoded.len_bytes,
        bytes: bytes[..kept].to_vec(),
        mnemonic: mnemonic.to_string(),
        operands,
        is_illegal: decoded.opcode.is_illegal(),
    })
}

/// Formats an instruction from its fetched bytes.
///
/// A missing operand byte (an untaken branch fetches only its opcode) is
/// shown as `?`. An empty slice formats as an empty string.
#[must_use]
pub fn disassemble_bytes(bytes: &[u8]) -> String {
    build_row(0, bytes).map_or_else(String::new, |row| row.to_string())
}

/// Disassembles the instruction whose opcode byte is at `addr`.
#[must_use]
pub fn disassemble_one(addr: u16, memory: &dyn MemoryBus) -> DisassemblyRow {
    let bytes = [memory.load(addr), memory.load(addr.wrapping_add(1))];
    let len = usize::from(Decoder::instruction_length(bytes[0]));
    match build_row(addr, &bytes[..len]) {
        Some(row) => row,
        None => DisassemblyRow {
            addr_start: addr,
            len_bytes: 1,
            bytes: vec![bytes[0]],
            mnemonic: ".byte".to_string(),
            operands: format!("0x{:02X}", bytes[0]),
            is_illegal: true,
        },
    }
}

/// Disassembles `count` consecutive instructions starting at `start`.
#[must_use]
pub fn disassemble_range(start: u16, count: usize, memory: &dyn MemoryBus) -> Vec<DisassemblyRow> {
    let mut rows = Vec::with_capacity(count);
    let mut addr = start;
    for _ in 0..count {
        let row = disassemble_one(addr, memory);
        addr = addr.wrapping_add(u16::from(row.len_bytes));
        rows.push(row);
    }
    rows
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{disassemble_bytes, disassemble_one, disassemble_range};
    use crate::{new_address_space, MemoryBus};

    #[rstest]
    #[case(&[0x00], "HALT")]
    #[case(&[0x3D], "XPPC P1")]
    #[case(&[0x78], "CAE")]
    #[case(&[0xC4, 0x05], "LDI 0x05")]
    #[case(&[0xC1, 0xFE], "LD -2(P1)")]
    #[case(&[0xC2, 0x80], "LD E(P2)")]
    #[case(&[0xCD, 0xFF], "ST @-1(P1)")]
    #[case(&[0xFC, 0x30], "CAI 0x30")]
    #[case(&[0xA9, 0x00], "ILD 0(P1)")]
    #[case(&[0x9C, 0x80], "JNZ -128(P0)")]
    #[case(&[0x98], "JZ ?(P0)")]
    #[case(&[0x8F, 0x01], ".byte 0x8F")]
    fn formats_instructions(#[case] bytes: &[u8], #[case] expected: &str) {
        assert_eq!(disassemble_bytes(bytes), expected);
    }

    #[test]
    fn empty_input_formats_as_empty_string() {
        assert_eq!(disassemble_bytes(&[]), "");
    }

    #[test]
    fn range_steps_over_two_byte_instructions() {
        let mut memory = new_address_space();
        for (addr, byte) in (0x0100_u16..).zip([0xC4, 0x01, 0x08, 0x90, 0xFC]) {
            memory.store(addr, byte);
        }

        let rows = disassemble_range(0x0100, 3, &memory);
        let starts: Vec<u16> = rows.iter().map(|row| row.addr_start).collect();
        assert_eq!(starts, vec![0x0100, 0x0102, 0x0103]);
        assert_eq!(rows[2].to_string(), "JMP -4(P0)");
        assert_eq!(rows[2].bytes, vec![0x90, 0xFC]);

        let nop = disassemble_one(0x0102, &memory);
        assert_eq!(nop.len_bytes, 1);
        assert!(!nop.is_illegal);
    }
}
