/// Number of 16-bit pointer registers (`P0..P3`).
pub const POINTER_COUNT: usize = 4;
/// Status bit for carry/link.
pub const STATUS_CARRY: u8 = 1 << 7;
/// Status bit for signed overflow.
pub const STATUS_OVERFLOW: u8 = 1 << 6;
/// Status bit for the sense input, read as 1 after reset.
pub const STATUS_SENSE: u8 = 1 << 5;
/// Status bit for interrupt enable.
pub const STATUS_INTERRUPT_ENABLE: u8 = 1 << 3;
/// Status register value after reset.
pub const STATUS_RESET: u8 = STATUS_SENSE;

/// Pointer register identifier. `P0` doubles as the program counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Pointer {
    P0 = 0,
    P1 = 1,
    P2 = 2,
    P3 = 3,
}

impl Pointer {
    /// Program counter alias.
    pub const PC: Self = Self::P0;

    /// Ordered list of all pointer registers.
    pub const ALL: [Self; POINTER_COUNT] = [Self::P0, Self::P1, Self::P2, Self::P3];

    /// Returns the array index for this pointer (`0..=3`).
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Selects a pointer from the low two bits of an opcode byte.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => Self::P0,
            1 => Self::P1,
            2 => Self::P2,
            _ => Self::P3,
        }
    }
}

/// Copyable view of the register file, taken at instruction boundaries for tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RegisterSnapshot {
    /// `P0..P3` in index order.
    pub pointers: [u16; POINTER_COUNT],
    /// Accumulator.
    pub accumulator: u8,
    /// Extension register.
    pub extension: u8,
    /// Status register.
    pub status: u8,
}

impl RegisterSnapshot {
    /// Returns `true` when the carry bit is set.
    #[must_use]
    pub const fn carry(&self) -> bool {
        self.status & STATUS_CARRY != 0
    }

    /// Returns `true` when the overflow bit is set.
    #[must_use]
    pub const fn overflow(&self) -> bool {
        self.status & STATUS_OVERFLOW != 0
    }
}

/// Full register file of the INS8060 core.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ProcessorState {
    pointers: [u16; POINTER_COUNT],
    accumulator: u8,
    extension: u8,
    status: u8,
    run_state: super::RunState,
}

impl Default for ProcessorState {
    fn default() -> Self {
        Self {
            pointers: [0; POINTER_COUNT],
            accumulator: 0,
            extension: 0,
            status: STATUS_RESET,
            run_state: super::RunState::Running,
        }
    }
}

impl ProcessorState {
    /// Restores power-on values: registers cleared, sense bit set, running.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Reads a pointer register.
    #[must_use]
    pub const fn pointer(&self, ptr: Pointer) -> u16 {
        self.pointers[ptr.index()]
    }

    /// Writes a pointer register.
    pub const fn set_pointer(&mut self, ptr: Pointer, value: u16) {
        self.pointers[ptr.index()] = value;
    }

    /// Reads the low byte of a pointer register.
    #[must_use]
    pub const fn pointer_low(&self, ptr: Pointer) -> u8 {
        (self.pointer(ptr) & 0x00FF) as u8
    }

    /// Reads the high byte of a pointer register.
    #[must_use]
    pub const fn pointer_high(&self, ptr: Pointer) -> u8 {
        (self.pointer(ptr) >> 8) as u8
    }

    /// Replaces the low byte of a pointer register, keeping the high byte.
    pub const fn set_pointer_low(&mut self, ptr: Pointer, value: u8) {
        let merged = (self.pointer(ptr) & 0xFF00) | value as u16;
        self.set_pointer(ptr, merged);
    }

    /// Replaces the high byte of a pointer register, keeping the low byte.
    pub const fn set_pointer_high(&mut self, ptr: Pointer, value: u8) {
        let merged = (self.pointer(ptr) & 0x00FF) | ((value as u16) << 8);
        self.set_pointer(ptr, merged);
    }

    /// Reads the program counter (`P0`).
    #[must_use]
    pub const fn pc(&self) -> u16 {
        self.pointer(Pointer::PC)
    }

    /// Writes the program counter (`P0`).
    pub const fn set_pc(&mut self, value: u16) {
        self.set_pointer(Pointer::PC, value);
    }

    /// Reads the accumulator.
    #[must_use]
    pub const fn accumulator(&self) -> u8 {
        self.accumulator
    }

    /// Writes the accumulator.
    pub const fn set_accumulator(&mut self, value: u8) {
        self.accumulator = value;
    }

    /// Reads the extension register.
    #[must_use]
    pub const fn extension(&self) -> u8 {
        self.extension
    }

    /// Writes the extension register.
    pub const fn set_extension(&mut self, value: u8) {
        self.extension = value;
    }

    /// Reads the status register.
    #[must_use]
    pub const fn status(&self) -> u8 {
        self.status
    }

    /// Writes the status register verbatim, reserved bits included.
    pub const fn set_status(&mut self, value: u8) {
        self.status = value;
    }

    /// Returns `true` when every bit of `flag` is set in the status register.
    #[must_use]
    pub const fn flag_is_set(&self, flag: u8) -> bool {
        (self.status & flag) == flag
    }

    /// Sets or clears status bits.
    pub const fn set_flag(&mut self, flag: u8, enabled: bool) {
        if enabled {
            self.status |= flag;
        } else {
            self.status &= !flag;
        }
    }

    /// Returns the carry bit as `0` or `1`.
    #[must_use]
    pub const fn carry_in(&self) -> u8 {
        (self.status & STATUS_CARRY) >> 7
    }

    /// Reads the current run state.
    #[must_use]
    pub const fn run_state(&self) -> super::RunState {
        self.run_state
    }

    /// Returns `true` once `HALT` has retired.
    #[must_use]
    pub const fn is_halted(&self) -> bool {
        self.run_state.is_halted()
    }

    /// Latches the halted state.
    pub const fn halt(&mut self) {
        self.run_state = super::RunState::Halted;
    }

    /// Captures the register file for tracing.
    #[must_use]
    pub const fn snapshot(&self) -> RegisterSnapshot {
        RegisterSnapshot {
            pointers: self.pointers,
            accumulator: self.accumulator,
            extension: self.extension,
            status: self.status,
        }
    }
}
