//! Instruction-level emulator core for the INS8060 (SC/MP) microprocessor.

/// Memory bus contract and page-wrapped address arithmetic.
pub mod memory;
pub use memory::{
    new_address_space, page_offset, MemoryBus, ADDRESS_SPACE_BYTES, OFFSET_MASK, OPEN_BUS,
    PAGE_MASK,
};

/// Host-facing configuration, console hooks, trace events and execution context.
pub mod api;
pub use api::{
    AccessKind, BudgetUnit, CoreConfig, ExecutionContext, HostIo, MemoryAccess, NullIo,
    TraceEvent, TraceSink,
};

/// Register file and run-state model.
pub mod state;
pub use state::{
    Pointer, ProcessorState, RegisterSnapshot, RunState, POINTER_COUNT, STATUS_CARRY,
    STATUS_INTERRUPT_ENABLE, STATUS_OVERFLOW, STATUS_RESET, STATUS_SENSE,
};

/// Opcode classification and the dispatch table.
pub mod encoding;
pub use encoding::{decode_opcode, AluOp, Condition, Opcode, OPCODE_TABLE};

/// Addressing modes and instruction lengths.
pub mod decoder;
pub use decoder::{AddressingMode, DecodedInstruction, Decoder};

/// Anomalies reported to trace sinks.
pub mod fault;
pub use fault::Anomaly;

/// Per-opcode cycle costs.
pub mod timing;
pub use timing::{cycle_cost, BRANCH_NOT_TAKEN_REBATE, CYCLE_TABLE};

/// Instruction execution and the budgeted run loop.
pub mod execute;
pub use execute::{add_with_carry, normalize_input, AddResult, Processor, StepOutcome};

/// Trace ring buffer and text dump.
pub mod trace;
pub use trace::{TraceBuffer, TraceConfig, TracePolicy, TraceRecord, DEFAULT_TRACE_CAPACITY};

/// Disassembler for trace dumps and tooling.
pub mod disasm;
pub use disasm::{disassemble_bytes, disassemble_one, disassemble_range, DisassemblyRow};

#[cfg(test)]
use proptest as _;
