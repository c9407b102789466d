//! Instruction-stream fetch and effective-address helpers.

use crate::api::{ExecutionContext, TraceEvent};
use crate::decoder::AddressingMode;
use crate::memory::page_offset;
use crate::state::ProcessorState;

/// Displacement byte that selects the extension register as displacement.
pub const EXTENSION_DISPLACEMENT: i8 = i8::MIN;

/// Fetches the next instruction-stream byte.
///
/// The program counter is pre-incremented, so it always holds the address
/// of the last byte fetched.
pub fn fetch_byte(state: &mut ProcessorState, ctx: &mut ExecutionContext<'_>) -> u8 {
    let addr = state.pc().wrapping_add(1);
    state.set_pc(addr);
    let byte = ctx.memory.load(addr);
    ctx.emit(TraceEvent::Fetch { addr, byte });
    byte
}

/// Fetches a displacement byte, substituting E for the `-128` sentinel.
pub fn fetch_displacement(state: &mut ProcessorState, ctx: &mut ExecutionContext<'_>) -> i8 {
    let raw = fetch_byte(state, ctx) as i8;
    if raw == EXTENSION_DISPLACEMENT {
        state.extension() as i8
    } else {
        raw
    }
}

/// Computes the effective address of a memory-reference instruction.
///
/// Consumes the displacement byte and applies auto-indexing to the pointer.
/// Returns `None` for immediate mode, whose operand is the displacement
/// byte itself.
pub fn effective_address(
    state: &mut ProcessorState,
    ctx: &mut ExecutionContext<'_>,
    mode: AddressingMode,
) -> Option<u16> {
    match mode {
        AddressingMode::Immediate => None,
        AddressingMode::Indexed(ptr) => {
            let disp = fetch_displacement(state, ctx);
            Some(page_offset(state.pointer(ptr), disp))
        }
        AddressingMode::AutoIndexed(ptr) => {
            let disp = fetch_displacement(state, ctx);
            let base = state.pointer(ptr);
            let updated = page_offset(base, disp);
            state.set_pointer(ptr, updated);
            if disp < 0 {
                Some(updated)
            } else {
                Some(base)
            }
        }
    }
}
