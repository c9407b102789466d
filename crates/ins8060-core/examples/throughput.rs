//! Measures how many emulated microcycles per second the core sustains.
//!
//! ```sh
//! cargo run -p ins8060-core --release --example throughput
//! ```
//!
//! The program is a nested `DLD`/`JNZ` delay loop, the same shape NIBL uses
//! for its console bit timing.

#![allow(clippy::pedantic)]

use ins8060_core::{
    new_address_space, BudgetUnit, CoreConfig, ExecutionContext, MemoryBus, NullIo, Processor,
};
use log as _;
use proptest as _;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

use std::time::Instant;

/// Microcycles per `execute` call; one host slice at 2 MHz.
const SLICE: i64 = 10_000;
const SLICES: u32 = 20_000;

/// DLD inner; JNZ -4; DLD outer; JNZ -8; JMP -10 (counters at 0x0041 and 0x0042)
const DELAY_LOOP: [u8; 10] = [0xB8, 0x3F, 0x9C, 0xFC, 0xB8, 0x3C, 0x9C, 0xF8, 0x90, 0xF6];

fn main() {
    let mut memory = new_address_space();
    for (addr, byte) in (0x0001_u16..).zip(DELAY_LOOP) {
        memory.store(addr, byte);
    }

    let mut processor = Processor::new(CoreConfig {
        budget_unit: BudgetUnit::Microcycles,
    });
    let mut io = NullIo;
    let mut ctx = ExecutionContext::new(&mut memory, &mut io);

    let start = Instant::now();
    let mut consumed: i64 = 0;
    let mut carry = 0;
    for _ in 0..SLICES {
        let budget = SLICE - carry;
        carry = processor.execute(&mut ctx, budget);
        consumed += budget + carry;
    }
    let elapsed = start.elapsed().as_secs_f64();

    let per_second = consumed as f64 / elapsed;
    println!("microcycles:        {consumed}");
    println!("elapsed:            {elapsed:.3} s");
    println!("microcycles/second: {per_second:.0}");
    println!("real-time factor:   {:.1}x at 2 MHz", per_second / 1_000_000.0);
}
