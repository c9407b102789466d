//! Ring buffer of per-instruction trace records and its text dump.

use std::io::{self, Write};

use crate::api::{AccessKind, MemoryAccess, TraceEvent, TraceSink};
use crate::disasm::disassemble_bytes;
use crate::{Anomaly, RegisterSnapshot};

/// Default ring capacity in records.
pub const DEFAULT_TRACE_CAPACITY: usize = 10_000;

/// Maximum opcode bytes kept per record.
pub const MAX_OPCODE_BYTES: usize = 2;

/// What the ring does once it holds `capacity` records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum TracePolicy {
    /// Overwrite the oldest record.
    #[default]
    Wrap,
    /// Request a stop when the last slot is filled.
    StopWhenFull,
}

/// Trace buffer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct TraceConfig {
    /// Number of records kept.
    pub capacity: usize,
    /// Behaviour once full.
    pub policy: TracePolicy,
    /// Request a stop when an illegal opcode is skipped.
    pub stop_on_illegal: bool,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_TRACE_CAPACITY,
            policy: TracePolicy::Wrap,
            stop_on_illegal: true,
        }
    }
}

/// Snapshot of one executed instruction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct TraceRecord {
    /// Address of the opcode byte.
    pub pc: u16,
    opcode: [u8; MAX_OPCODE_BYTES],
    opcode_len: u8,
    /// Registers after the instruction retired.
    pub registers: RegisterSnapshot,
    /// Data accesses in program order.
    pub accesses: Vec<MemoryAccess>,
}

impl TraceRecord {
    /// Opcode and operand bytes fetched by the instruction.
    #[must_use]
    pub fn opcode_bytes(&self) -> &[u8] {
        &self.opcode[..usize::from(self.opcode_len)]
    }

    fn push_opcode_byte(&mut self, byte: u8) {
        let len = usize::from(self.opcode_len);
        if len < MAX_OPCODE_BYTES {
            self.opcode[len] = byte;
            self.opcode_len += 1;
        }
    }

    fn begin(&mut self, pc: u16) {
        self.pc = pc;
        self.opcode_len = 0;
        self.registers = RegisterSnapshot::default();
        self.accesses.clear();
    }

    /// Writes the record as one dump line, without the trailing newline.
    ///
    /// # Errors
    ///
    /// Propagates write failures from `out`.
    pub fn write_line<W: Write + ?Sized>(&self, out: &mut W, index: usize) -> io::Result<()> {
        write!(out, "{index:4} {:04X} ", self.pc)?;
        for slot in 0..MAX_OPCODE_BYTES {
            match self.opcode_bytes().get(slot) {
                Some(byte) => write!(out, "{byte:02X} ")?,
                None => write!(out, "   ")?,
            }
        }
        for pointer in self.registers.pointers {
            write!(out, "{pointer:04X} ")?;
        }
        write!(
            out,
            "{:02X} {:02X} {}{} ",
            self.registers.accumulator,
            self.registers.extension,
            if self.registers.carry() { 'C' } else { '-' },
            if self.registers.overflow() { 'V' } else { '-' },
        )?;
        for access in &self.accesses {
            let tag = match access.kind {
                AccessKind::Load => 'L',
                AccessKind::Store => 'S',
            };
            write!(out, "{tag} {:04X} {:02X} ", access.addr, access.value)?;
        }
        write!(out, "; {}", disassemble_bytes(self.opcode_bytes()))
    }
}

/// Capacity-bounded trace sink.
#[derive(Debug, Clone)]
pub struct TraceBuffer {
    config: TraceConfig,
    records: Vec<TraceRecord>,
    next: usize,
    pending: TraceRecord,
    stop: Option<Anomaly>,
}

impl TraceBuffer {
    /// Creates an empty buffer. A zero capacity is raised to one record.
    #[must_use]
    pub fn new(mut config: TraceConfig) -> Self {
        config.capacity = config.capacity.max(1);
        Self {
            config,
            records: Vec::new(),
            next: 0,
            pending: TraceRecord::default(),
            stop: None,
        }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &TraceConfig {
        &self.config
    }

    /// Number of records held.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` when no instruction has been recorded.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The anomaly that caused a stop request, if any.
    #[must_use]
    pub const fn stop_reason(&self) -> Option<&Anomaly> {
        self.stop.as_ref()
    }

    /// Records from oldest to newest.
    pub fn records(&self) -> impl Iterator<Item = &TraceRecord> + '_ {
        let (newer, older) = self.records.split_at(self.next);
        older.iter().chain(newer.iter())
    }

    /// Clears records and any pending stop request.
    pub fn clear(&mut self) {
        self.records.clear();
        self.next = 0;
        self.stop = None;
    }

    /// Writes every record, oldest first, one per line.
    ///
    /// # Errors
    ///
    /// Propagates write failures from `out`.
    pub fn dump<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        for (index, record) in self.records().enumerate() {
            record.write_line(out, index)?;
            writeln!(out)?;
        }
        out.flush()
    }

    fn latch(&mut self, anomaly: Anomaly) {
        if self.stop.is_none() {
            self.stop = Some(anomaly);
        }
    }

    fn commit(&mut self, registers: RegisterSnapshot) {
        self.pending.registers = registers;
        let record = self.pending.clone();
        if self.records.len() < self.config.capacity {
            self.records.push(record);
            if self.records.len() == self.config.capacity
                && self.config.policy == TracePolicy::StopWhenFull
            {
                self.latch(Anomaly::TraceCapacityReached {
                    capacity: self.config.capacity,
                });
            }
        } else {
            self.records[self.next] = record;
            self.next = (self.next + 1) % self.config.capacity;
        }
    }
}

impl TraceSink for TraceBuffer {
    fn on_event(&mut self, event: TraceEvent) {
        match event {
            TraceEvent::InstructionStart { pc } => self.pending.begin(pc),
            TraceEvent::Fetch { byte, .. } => self.pending.push_opcode_byte(byte),
            TraceEvent::MemoryAccess(access) => self.pending.accesses.push(access),
            TraceEvent::IllegalOpcode(anomaly) => {
                if self.config.stop_on_illegal {
                    self.latch(anomaly);
                }
            }
            TraceEvent::InstructionRetired { registers, .. } => self.commit(registers),
        }
    }

    fn stop_requested(&self) -> bool {
        self.stop.is_some()
    }
}
