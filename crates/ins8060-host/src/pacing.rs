//! Slice-based run loop that optionally holds the core to a real clock rate.
//!
//! Execution proceeds in slices. An unpaced run gives every slice a fixed
//! [`UNPACED_BUDGET`] and never sleeps. A paced run sizes each slice to one
//! hundredth of a second at the configured clock and sleeps away whatever
//! wall time the slice did not use.

use std::thread;
use std::time::{Duration, Instant};

use ins8060_core::{ExecutionContext, Processor};

/// Slices per emulated second when pacing.
pub const SLICES_PER_SECOND: u32 = 100;

/// Budget, in clock periods, of one unpaced slice.
pub const UNPACED_BUDGET: i64 = 1_000_000;

const SLICE_DURATION: Duration = Duration::from_millis(10);

/// Target oscillator frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClockRate {
    mhz: u32,
}

impl ClockRate {
    /// A clock of `mhz` megahertz; `None` for zero.
    #[must_use]
    pub const fn from_mhz(mhz: u32) -> Option<Self> {
        if mhz == 0 {
            None
        } else {
            Some(Self { mhz })
        }
    }

    /// Frequency in megahertz.
    #[must_use]
    pub const fn mhz(self) -> u32 {
        self.mhz
    }

    /// Clock periods in one slice.
    #[must_use]
    pub fn slice_budget(self) -> i64 {
        i64::from(self.mhz) * 1_000_000 / i64::from(SLICES_PER_SECOND)
    }
}

/// Why and after how long a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    /// Slices executed.
    pub slices: u64,
    /// The program executed `HALT`.
    pub halted: bool,
    /// A trace sink asked execution to stop.
    pub stopped_by_trace: bool,
}

/// Drives [`Processor::execute`] slice by slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pacer {
    clock: Option<ClockRate>,
    carry_overrun: bool,
}

impl Pacer {
    /// Creates a pacer. `clock: None` runs as fast as possible.
    ///
    /// With `carry_overrun`, cycles a slice ran past its budget are taken off
    /// the next slice's budget.
    #[must_use]
    pub const fn new(clock: Option<ClockRate>, carry_overrun: bool) -> Self {
        Self {
            clock,
            carry_overrun,
        }
    }

    /// Target clock, if paced.
    #[must_use]
    pub const fn clock(&self) -> Option<ClockRate> {
        self.clock
    }

    /// Budget handed to each slice before any carried overrun.
    #[must_use]
    pub fn slice_budget(&self) -> i64 {
        self.clock.map_or(UNPACED_BUDGET, ClockRate::slice_budget)
    }

    /// Runs until the program halts or the trace sink in `ctx` requests a stop.
    pub fn run(&self, processor: &mut Processor, ctx: &mut ExecutionContext<'_>) -> RunSummary {
        let mut summary = RunSummary::default();
        let mut overrun = 0;

        loop {
            let started = Instant::now();
            let budget = if self.carry_overrun {
                self.slice_budget() - overrun
            } else {
                self.slice_budget()
            };
            overrun = processor.execute(ctx, budget);
            summary.slices += 1;
            log::trace!(
                "slice {}: budget {budget}, overrun {overrun}",
                summary.slices
            );

            if processor.is_halted() {
                summary.halted = true;
                break;
            }
            if ctx.stop_requested() {
                summary.stopped_by_trace = true;
                break;
            }
            if self.clock.is_some() {
                if let Some(rest) = SLICE_DURATION.checked_sub(started.elapsed()) {
                    thread::sleep(rest);
                }
            }
        }

        summary
    }
}
