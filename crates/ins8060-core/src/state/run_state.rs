/// Execution state of the processor core.
///
/// `Halted` is terminal for [`crate::Processor::execute`] until the core is
/// reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum RunState {
    /// Ready to fetch the next instruction.
    #[default]
    Running,
    /// A `HALT` instruction has retired.
    Halted,
}

impl RunState {
    /// Returns `true` once a `HALT` instruction has retired.
    #[must_use]
    pub const fn is_halted(self) -> bool {
        matches!(self, Self::Halted)
    }
}
