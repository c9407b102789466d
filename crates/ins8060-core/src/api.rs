//! Host-facing contracts for embedding the processor core.
//!
//! The core owns no memory and performs no I/O of its own. Each call to
//! [`crate::Processor::execute`] borrows the bus, the console hooks and an
//! optional trace sink through an [`ExecutionContext`].

use crate::{Anomaly, MemoryBus, RegisterSnapshot};

/// Unit of the budget passed to [`crate::Processor::execute`] and of the
/// overrun it returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum BudgetUnit {
    /// Oscillator periods; two per microcycle. Budgets are halved on the way
    /// in and overruns doubled on the way out.
    #[default]
    ClockPeriods,
    /// Microcycles as listed in the cycle table, unscaled.
    Microcycles,
}

impl BudgetUnit {
    /// Converts a budget in this unit to microcycles.
    #[must_use]
    pub const fn to_microcycles(self, budget: i64) -> i64 {
        match self {
            Self::ClockPeriods => budget >> 1,
            Self::Microcycles => budget,
        }
    }

    /// Converts a microcycle count back to this unit.
    #[must_use]
    pub const fn from_microcycles(self, cycles: i64) -> i64 {
        match self {
            Self::ClockPeriods => cycles.saturating_mul(2),
            Self::Microcycles => cycles,
        }
    }
}

/// Configuration for a processor instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CoreConfig {
    /// Unit used by the execution budget contract.
    pub budget_unit: BudgetUnit,
}

/// Console hooks invoked by `GETC` (0x21) and `PUTC` (0x20).
pub trait HostIo {
    /// Returns the next raw input character, blocking if necessary.
    ///
    /// Case folding and line-ending translation are applied by the core.
    fn read_char(&mut self) -> u8;

    /// Writes one output character (already masked to seven bits).
    fn write_char(&mut self, ch: u8);
}

/// Console that reads carriage returns and discards output.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullIo;

impl HostIo for NullIo {
    fn read_char(&mut self) -> u8 {
        b'\r'
    }

    fn write_char(&mut self, _ch: u8) {}
}

/// Direction of a data memory access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum AccessKind {
    /// Read from memory.
    Load,
    /// Write to memory.
    Store,
}

/// One data memory access performed by an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct MemoryAccess {
    /// Load or store.
    pub kind: AccessKind,
    /// Effective address.
    pub addr: u16,
    /// Byte read or written.
    pub value: u8,
}

/// Trace events emitted while executing, in program order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceEvent {
    /// An instruction is about to be fetched.
    InstructionStart {
        /// Address of the opcode byte.
        pc: u16,
    },
    /// An instruction-stream byte (opcode or operand) was fetched.
    Fetch {
        /// Address of the byte.
        addr: u16,
        /// Fetched byte.
        byte: u8,
    },
    /// A data memory access, excluding instruction-stream fetches.
    MemoryAccess(MemoryAccess),
    /// An undefined opcode was skipped.
    IllegalOpcode(Anomaly),
    /// The instruction finished.
    InstructionRetired {
        /// Register file after the instruction.
        registers: RegisterSnapshot,
        /// Microcycles charged, after any branch rebate.
        cycles: u8,
    },
}

/// Receiver for trace events.
pub trait TraceSink {
    /// Records an event in execution order.
    fn on_event(&mut self, event: TraceEvent);

    /// Polled after every instruction; `true` ends the current execute call.
    fn stop_requested(&self) -> bool {
        false
    }
}

/// Borrowed collaborators for one execution call.
pub struct ExecutionContext<'a> {
    /// Memory the core reads and writes.
    pub memory: &'a mut dyn MemoryBus,
    /// Console hooks.
    pub io: &'a mut dyn HostIo,
    /// Optional trace receiver.
    pub trace: Option<&'a mut dyn TraceSink>,
}

impl<'a> ExecutionContext<'a> {
    /// Builds a context without tracing.
    #[must_use]
    pub fn new(memory: &'a mut dyn MemoryBus, io: &'a mut dyn HostIo) -> Self {
        Self {
            memory,
            io,
            trace: None,
        }
    }

    /// Attaches a trace sink.
    #[must_use]
    pub fn with_trace(mut self, sink: &'a mut dyn TraceSink) -> Self {
        self.trace = Some(sink);
        self
    }

    /// Returns `true` when an attached sink asked execution to stop.
    #[must_use]
    pub fn stop_requested(&self) -> bool {
        self.trace.as_deref().is_some_and(|sink| sink.stop_requested())
    }

    pub(crate) fn emit(&mut self, event: TraceEvent) {
        if let Some(sink) = self.trace.as_deref_mut() {
            sink.on_event(event);
        }
    }

    pub(crate) fn load(&mut self, addr: u16) -> u8 {
        let value = self.memory.load(addr);
        self.emit(TraceEvent::MemoryAccess(MemoryAccess {
            kind: AccessKind::Load,
            addr,
            value,
        }));
        value
    }

    pub(crate) fn store(&mut self, addr: u16, value: u8) {
        self.memory.store(addr, value);
        self.emit(TraceEvent::MemoryAccess(MemoryAccess {
            kind: AccessKind::Store,
            addr,
            value,
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::{
        AccessKind, BudgetUnit, CoreConfig, ExecutionContext, HostIo, MemoryAccess, NullIo,
        TraceEvent, TraceSink,
    };
    use crate::new_address_space;

    #[derive(Default)]
    struct Recorder {
        events: Vec<TraceEvent>,
    }

    impl TraceSink for Recorder {
        fn on_event(&mut self, event: TraceEvent) {
            self.events.push(event);
        }
    }

    #[test]
    fn default_config_counts_clock_periods() {
        assert_eq!(CoreConfig::default().budget_unit, BudgetUnit::ClockPeriods);
    }

    #[test]
    fn clock_periods_halve_budgets_and_double_overruns() {
        let unit = BudgetUnit::ClockPeriods;
        assert_eq!(unit.to_microcycles(100), 50);
        assert_eq!(unit.to_microcycles(7), 3);
        assert_eq!(unit.from_microcycles(-3), -6);

        let unit = BudgetUnit::Microcycles;
        assert_eq!(unit.to_microcycles(7), 7);
        assert_eq!(unit.from_microcycles(-3), -3);
    }

    #[test]
    fn doubled_overruns_saturate() {
        let unit = BudgetUnit::ClockPeriods;
        assert_eq!(unit.from_microcycles(i64::MAX), i64::MAX);
        assert_eq!(unit.from_microcycles(i64::MIN), i64::MIN);
        assert_eq!(unit.to_microcycles(i64::MIN), i64::MIN / 2);
    }

    #[test]
    fn null_io_reads_carriage_return() {
        let mut io = NullIo;
        io.write_char(b'x');
        assert_eq!(io.read_char(), b'\r');
    }

    #[test]
    fn context_reports_data_accesses_to_the_sink() {
        let mut memory = new_address_space();
        let mut io = NullIo;
        let mut recorder = Recorder::default();
        {
            let mut ctx = ExecutionContext::new(&mut memory, &mut io).with_trace(&mut recorder);
            ctx.store(0x1234, 0x56);
            assert_eq!(ctx.load(0x1234), 0x56);
            assert!(!ctx.stop_requested());
        }

        assert_eq!(
            recorder.events,
            vec![
                TraceEvent::MemoryAccess(MemoryAccess {
                    kind: AccessKind::Store,
                    addr: 0x1234,
                    value: 0x56,
                }),
                TraceEvent::MemoryAccess(MemoryAccess {
                    kind: AccessKind::Load,
                    addr: 0x1234,
                    value: 0x56,
                }),
            ]
        );
    }
}
