//! Instruction execution for the INS8060 core.
//!
//! [`Processor::execute`] runs whole instructions until the halted state is
//! reached or the accumulated microcycle cost meets the caller's budget:
//! 1. Fetch the opcode byte (pre-incrementing `P0`)
//! 2. Dispatch through [`OPCODE_TABLE`], fetching any displacement byte
//! 3. Charge the cycle-table cost, less the rebate for an untaken branch
//!
//! An instruction, once dispatched, always completes.

mod flags;
mod helpers;

pub use flags::{add_with_carry, AddResult};
pub use helpers::{effective_address, fetch_byte, fetch_displacement, EXTENSION_DISPLACEMENT};

use crate::api::{CoreConfig, ExecutionContext, TraceEvent};
use crate::encoding::{AluOp, Condition, Opcode, OPCODE_TABLE};
use crate::memory::page_offset;
use crate::state::{
    Pointer, ProcessorState, STATUS_CARRY, STATUS_INTERRUPT_ENABLE, STATUS_OVERFLOW,
};
use crate::timing::{cycle_cost, BRANCH_NOT_TAKEN_REBATE};
use crate::Anomaly;

/// Result of a single [`Processor::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepOutcome {
    /// An instruction retired and the core is still running.
    Retired {
        /// The opcode byte.
        opcode: u8,
        /// Microcycles charged.
        cycles: u8,
    },
    /// `HALT` retired.
    Halted {
        /// Microcycles charged for the `HALT`.
        cycles: u8,
    },
    /// The core was already halted; nothing ran.
    Idle,
}

/// An INS8060 processor: register file plus configuration.
///
/// Memory and console hooks are lent per call through an [`ExecutionContext`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Processor {
    state: ProcessorState,
    config: CoreConfig,
}

impl Processor {
    /// Creates a processor in the reset state.
    #[must_use]
    pub fn new(config: CoreConfig) -> Self {
        Self {
            state: ProcessorState::default(),
            config,
        }
    }

    /// Clears registers, sets status to the reset value and re-arms a halted core.
    pub fn reset(&mut self) {
        self.state.reset();
    }

    /// Sets `P0`. The first opcode is fetched from `addr + 1`.
    pub const fn set_program_counter(&mut self, addr: u16) {
        self.state.set_pc(addr);
    }

    /// Register file.
    #[must_use]
    pub const fn state(&self) -> &ProcessorState {
        &self.state
    }

    /// Mutable register file, for hosts that preset registers.
    pub const fn state_mut(&mut self) -> &mut ProcessorState {
        &mut self.state
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Returns `true` once `HALT` has retired.
    #[must_use]
    pub const fn is_halted(&self) -> bool {
        self.state.is_halted()
    }

    /// Runs instructions until the core halts, the budget is used up, or an
    /// attached trace sink requests a stop.
    ///
    /// At least one instruction runs on a running core. Returns the signed
    /// overrun `consumed - budget` in the configured [`crate::BudgetUnit`],
    /// or `0` when the core halted before the budget was used up. A halted
    /// core runs nothing and returns `0`.
    pub fn execute(&mut self, ctx: &mut ExecutionContext<'_>, budget: i64) -> i64 {
        if self.state.is_halted() {
            return 0;
        }

        let unit = self.config.budget_unit;
        let quota = unit.to_microcycles(budget);
        let mut consumed: i64 = 0;

        loop {
            match self.step(ctx) {
                StepOutcome::Retired { cycles, .. } => {
                    consumed = consumed.saturating_add(i64::from(cycles));
                }
                StepOutcome::Halted { cycles } => {
                    consumed = consumed.saturating_add(i64::from(cycles));
                    break;
                }
                StepOutcome::Idle => break,
            }
            if consumed >= quota || ctx.stop_requested() {
                break;
            }
        }

        if self.state.is_halted() && consumed < quota {
            0
        } else {
            unit.from_microcycles(consumed.saturating_sub(quota))
        }
    }

    /// Executes exactly one instruction.
    pub fn step(&mut self, ctx: &mut ExecutionContext<'_>) -> StepOutcome {
        if self.state.is_halted() {
            return StepOutcome::Idle;
        }

        let state = &mut self.state;
        ctx.emit(TraceEvent::InstructionStart {
            pc: state.pc().wrapping_add(1),
        });
        let opcode = fetch_byte(state, ctx);
        let rebate = execute_opcode(state, ctx, opcode);
        let cycles = cycle_cost(opcode) - rebate;
        ctx.emit(TraceEvent::InstructionRetired {
            registers: state.snapshot(),
            cycles,
        });

        if state.is_halted() {
            StepOutcome::Halted { cycles }
        } else {
            StepOutcome::Retired { opcode, cycles }
        }
    }
}

/// Dispatches one opcode. Returns the cycle rebate.
fn execute_opcode(state: &mut ProcessorState, ctx: &mut ExecutionContext<'_>, opcode: u8) -> u8 {
    match OPCODE_TABLE[usize::from(opcode)] {
        Opcode::Halt => state.halt(),
        Opcode::Xae => {
            let ac = state.accumulator();
            state.set_accumulator(state.extension());
            state.set_extension(ac);
        }
        Opcode::Ccl => state.set_flag(STATUS_CARRY, false),
        Opcode::Scl => state.set_flag(STATUS_CARRY, true),
        Opcode::Dint => state.set_flag(STATUS_INTERRUPT_ENABLE, false),
        Opcode::Ien => state.set_flag(STATUS_INTERRUPT_ENABLE, true),
        Opcode::Csa => state.set_accumulator(state.status()),
        Opcode::Cas => state.set_status(state.accumulator()),
        Opcode::Nop => {}
        Opcode::Sr => state.set_accumulator(state.accumulator() >> 1),
        Opcode::Srl => {
            let link = state.status() & STATUS_CARRY;
            state.set_accumulator(link | (state.accumulator() >> 1));
        }
        Opcode::Rr => state.set_accumulator(state.accumulator().rotate_right(1)),
        Opcode::Rrl => {
            let ac = state.accumulator();
            let link = state.status() & STATUS_CARRY;
            state.set_accumulator(link | (ac >> 1));
            state.set_flag(STATUS_CARRY, ac & 0x01 != 0);
        }
        Opcode::Putc => ctx.io.write_char(state.accumulator() & 0x7F),
        Opcode::Getc => {
            let ch = normalize_input(ctx.io.read_char());
            state.set_accumulator(ch);
            state.set_extension(ch);
        }
        Opcode::Xpal(ptr) => {
            let low = state.pointer_low(ptr);
            state.set_pointer_low(ptr, state.accumulator());
            state.set_accumulator(low);
        }
        Opcode::Xpah(ptr) => {
            let high = state.pointer_high(ptr);
            state.set_pointer_high(ptr, state.accumulator());
            state.set_accumulator(high);
        }
        Opcode::Xppc(ptr) => {
            let pc = state.pc();
            state.set_pc(state.pointer(ptr));
            state.set_pointer(ptr, pc);
        }
        Opcode::Extension(op) => apply_alu(state, op, state.extension()),
        Opcode::Jump(condition, ptr) => return execute_jump(state, ctx, condition, ptr),
        Opcode::Ild(mode) => {
            if let Some(ea) = effective_address(state, ctx, mode) {
                let value = ctx.load(ea).wrapping_add(1);
                ctx.store(ea, value);
                state.set_accumulator(value);
            }
        }
        Opcode::Dld(mode) => {
            if let Some(ea) = effective_address(state, ctx, mode) {
                let value = ctx.load(ea).wrapping_sub(1);
                ctx.store(ea, value);
                state.set_accumulator(value);
            }
        }
        Opcode::Memory(op, mode) => {
            let operand = match effective_address(state, ctx, mode) {
                Some(ea) => ctx.load(ea),
                None => fetch_byte(state, ctx),
            };
            apply_alu(state, op, operand);
        }
        Opcode::Store(mode) => {
            if let Some(ea) = effective_address(state, ctx, mode) {
                ctx.store(ea, state.accumulator());
            }
        }
        Opcode::Illegal => execute_illegal(state, ctx, opcode),
    }
    0
}

fn apply_alu(state: &mut ProcessorState, op: AluOp, operand: u8) {
    let ac = state.accumulator();
    match op {
        AluOp::Load => state.set_accumulator(operand),
        AluOp::And => state.set_accumulator(ac & operand),
        AluOp::Or => state.set_accumulator(ac | operand),
        AluOp::Xor => state.set_accumulator(ac ^ operand),
        AluOp::Add => add_to_accumulator(state, operand),
        AluOp::ComplementAdd => add_to_accumulator(state, !operand),
    }
}

fn add_to_accumulator(state: &mut ProcessorState, operand: u8) {
    let carry_in = state.flag_is_set(STATUS_CARRY);
    let result = add_with_carry(state.accumulator(), operand, carry_in);
    state.set_accumulator(result.value);
    state.set_flag(STATUS_CARRY, result.carry);
    state.set_flag(STATUS_OVERFLOW, result.overflow);
}

fn execute_jump(
    state: &mut ProcessorState,
    ctx: &mut ExecutionContext<'_>,
    condition: Condition,
    ptr: Pointer,
) -> u8 {
    if condition.holds(state.accumulator()) {
        let disp = fetch_byte(state, ctx) as i8;
        state.set_pc(page_offset(state.pointer(ptr), disp));
        0
    } else {
        state.set_pc(state.pc().wrapping_add(1));
        BRANCH_NOT_TAKEN_REBATE
    }
}

fn execute_illegal(state: &mut ProcessorState, ctx: &mut ExecutionContext<'_>, opcode: u8) {
    let anomaly = Anomaly::IllegalOpcode {
        pc: state.pc(),
        opcode,
    };
    if opcode & 0x80 != 0 {
        state.set_pc(state.pc().wrapping_add(1));
    }
    log::debug!("{anomaly}");
    ctx.emit(TraceEvent::IllegalOpcode(anomaly));
}

/// Folds lower-case letters to upper case and LF to CR.
#[must_use]
pub const fn normalize_input(ch: u8) -> u8 {
    match ch {
        b'\n' => b'\r',
        _ => ch.to_ascii_uppercase(),
    }
}
