//! Property coverage for page-wrapped addressing and binary addition.

#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]

use ins8060_core::{
    add_with_carry, new_address_space, page_offset, ExecutionContext, MemoryBus, NullIo, Pointer,
    Processor, OFFSET_MASK, PAGE_MASK,
};
use log as _;
use proptest::prelude::*;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

/// Runs one memory-reference instruction at 0x0001 with `P1 = base` and
/// returns the pointer afterwards plus the address the load touched.
fn run_auto_indexed_load(base: u16, disp: u8) -> (u16, u16) {
    let mut memory = new_address_space();
    memory.store(0x0001, 0xC5); // LD @disp(P1)
    memory.store(0x0002, disp);

    let probe = page_offset(base, disp as i8);
    let mut processor = Processor::default();
    processor.state_mut().set_pointer(Pointer::P1, base);
    // Tag the two candidate addresses so the loaded value tells them apart.
    memory.store(base, 0x11);
    if probe != base {
        memory.store(probe, 0x22);
    }

    let mut io = NullIo;
    let mut ctx = ExecutionContext::new(&mut memory, &mut io);
    processor.step(&mut ctx);

    let after = processor.state().pointer(Pointer::P1);
    let loaded_from = if processor.state().accumulator() == 0x11 {
        base
    } else {
        probe
    };
    (after, loaded_from)
}

#[test]
fn page_offset_keeps_page_bits_and_wraps_offset() {
    const OFFSETS: [u16; 6] = [0x000, 0x001, 0x07F, 0x800, 0xF80, 0xFFF];

    for page in 0_u16..16 {
        for offset in OFFSETS {
            let base = (page << 12) | offset;
            for disp in i8::MIN..=i8::MAX {
                let ea = page_offset(base, disp);
                let expected = (i32::from(offset) + i32::from(disp)).rem_euclid(0x1000) as u16;

                assert_eq!(ea & PAGE_MASK, base & PAGE_MASK, "{base:#06x}{disp:+}");
                assert_eq!(ea & OFFSET_MASK, expected, "{base:#06x}{disp:+}");
            }
        }
    }
}

proptest! {
    #[test]
    fn auto_index_pre_decrements_and_post_increments(base in 0x0100_u16..=0xFFFF, disp in any::<u8>()) {
        // Sentinel displacement substitutes E, covered separately.
        prop_assume!(disp != 0x80);
        // Keep the tagged cells clear of the program bytes.
        prop_assume!(page_offset(base, disp as i8) > 0x0002);

        let (after, loaded_from) = run_auto_indexed_load(base, disp);
        let stepped = page_offset(base, disp as i8);

        prop_assert_eq!(after, stepped);
        if (disp as i8) < 0 {
            prop_assert_eq!(loaded_from, after);
        } else {
            prop_assert_eq!(loaded_from, base);
        }
    }

    #[test]
    fn addition_matches_wide_arithmetic(ac in any::<u8>(), operand in any::<u8>(), carry_in in any::<bool>()) {
        let result = add_with_carry(ac, operand, carry_in);
        let wide = u16::from(ac) + u16::from(operand) + u16::from(carry_in);
        let signed = i16::from(ac as i8) + i16::from(operand as i8) + i16::from(carry_in);

        prop_assert_eq!(u16::from(result.value), wide & 0xFF);
        prop_assert_eq!(result.carry, wide > 0xFF);
        prop_assert_eq!(result.overflow, !(-128..=127).contains(&signed));
    }

    #[test]
    fn complement_add_of_self_with_carry_is_zero(value in any::<u8>()) {
        let result = add_with_carry(value, !value, true);
        prop_assert_eq!(result.value, 0);
        prop_assert!(result.carry);
        prop_assert!(!result.overflow);
    }
}
