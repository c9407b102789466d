//! Processor state model for the INS8060 register file.

/// Register file, pointer identifiers and status-bit constants.
pub mod registers;
/// Running/halted execution state.
pub mod run_state;

pub use registers::{
    Pointer, ProcessorState, RegisterSnapshot, POINTER_COUNT, STATUS_CARRY,
    STATUS_INTERRUPT_ENABLE, STATUS_OVERFLOW, STATUS_RESET, STATUS_SENSE,
};
pub use run_state::RunState;
