use thiserror::Error;

/// Conditions that do not stop emulation on their own but are reported to a
/// trace sink, which may request a stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Anomaly {
    /// An undefined or unimplemented opcode was skipped.
    #[error("illegal opcode {opcode:#04x} at {pc:#06x}")]
    IllegalOpcode {
        /// Address of the opcode byte.
        pc: u16,
        /// The opcode byte.
        opcode: u8,
    },
    /// The trace ring filled up under the stop-when-full policy.
    #[error("trace buffer reached its capacity of {capacity} records")]
    TraceCapacityReached {
        /// Configured ring capacity.
        capacity: usize,
    },
}

impl Anomaly {
    /// Address associated with the anomaly, when it has one.
    #[must_use]
    pub const fn pc(&self) -> Option<u16> {
        match self {
            Self::IllegalOpcode { pc, .. } => Some(*pc),
            Self::TraceCapacityReached { .. } => None,
        }
    }
}
