//! Memory bus contract and page-wrapped address arithmetic.

/// Size in bytes of the flat architectural address space (64 KiB).
pub const ADDRESS_SPACE_BYTES: usize = u16::MAX as usize + 1;

/// Address bits that select the 4 KiB page. Offset arithmetic never carries into them.
pub const PAGE_MASK: u16 = 0xF000;

/// Address bits that hold the offset within a page.
pub const OFFSET_MASK: u16 = 0x0FFF;

/// Value read from addresses a short backing buffer does not cover.
pub const OPEN_BUS: u8 = 0xFF;

/// Byte-addressed memory seen by the processor core.
pub trait MemoryBus {
    /// Reads one byte.
    fn load(&self, addr: u16) -> u8;

    /// Writes one byte.
    fn store(&mut self, addr: u16, value: u8);
}

macro_rules! impl_memory_bus_for_bytes {
    ($($ty:ty),* $(,)?) => {
        $(
            impl MemoryBus for $ty {
                fn load(&self, addr: u16) -> u8 {
                    self.get(usize::from(addr)).copied().unwrap_or(OPEN_BUS)
                }

                fn store(&mut self, addr: u16, value: u8) {
                    if let Some(cell) = self.get_mut(usize::from(addr)) {
                        *cell = value;
                    }
                }
            }
        )*
    };
}

impl_memory_bus_for_bytes!(Box<[u8]>, Vec<u8>, [u8; ADDRESS_SPACE_BYTES]);

/// Allocates a zeroed 64 KiB address-space backing store.
#[must_use]
pub fn new_address_space() -> Box<[u8]> {
    vec![0; ADDRESS_SPACE_BYTES].into_boxed_slice()
}

/// Adds a signed displacement to `base` within its 4 KiB page.
///
/// The top four bits of `base` are kept; the low twelve wrap.
#[must_use]
pub const fn page_offset(base: u16, displacement: i8) -> u16 {
    (base & PAGE_MASK) | (base.wrapping_add_signed(displacement as i16) & OFFSET_MASK)
}

#[cfg(test)]
mod tests {
    use super::{new_address_space, page_offset, MemoryBus, ADDRESS_SPACE_BYTES, OPEN_BUS};

    #[test]
    fn canonical_backing_store_size_is_64kib() {
        let memory = new_address_space();
        assert_eq!(memory.len(), ADDRESS_SPACE_BYTES);
        assert!(memory.iter().all(|byte| *byte == 0));
    }

    #[test]
    fn full_address_space_round_trips_every_address() {
        let mut memory = new_address_space();
        memory.store(0x0000, 0x11);
        memory.store(0xFFFF, 0x22);

        assert_eq!(memory.load(0x0000), 0x11);
        assert_eq!(memory.load(0xFFFF), 0x22);
    }

    #[test]
    fn short_buffer_reads_open_bus_and_drops_stores_past_its_end() {
        let mut memory = vec![0_u8; 16];
        memory.store(0x0010, 0x5A);

        assert_eq!(memory.len(), 16);
        assert_eq!(memory.load(0x0010), OPEN_BUS);
        assert_eq!(memory.load(0x000F), 0);
    }

    #[test]
    fn page_offset_wraps_inside_the_page() {
        assert_eq!(page_offset(0x1FFF, 1), 0x1000);
        assert_eq!(page_offset(0x1000, -1), 0x1FFF);
        assert_eq!(page_offset(0x2345, 0x10), 0x2355);
        assert_eq!(page_offset(0xF000, i8::MIN), 0xFF80);
    }
}
