//! Memory image loaders: raw binaries and Intel HEX.

use std::fs;
use std::path::Path;

use ins8060_core::{MemoryBus, ADDRESS_SPACE_BYTES};

use crate::errors::HostError;

/// Copies `image` into memory starting at `offset`.
///
/// Bytes that would land past `0xFFFF` are dropped. Returns `offset`, which
/// becomes the entry point.
pub fn load_binary(memory: &mut dyn MemoryBus, image: &[u8], offset: u16) -> u16 {
    let room = ADDRESS_SPACE_BYTES - usize::from(offset);
    if image.len() > room {
        log::warn!(
            "binary image of {} bytes truncated to {room} at {offset:#06x}",
            image.len()
        );
    }
    for (addr, &byte) in (offset..=u16::MAX).zip(image) {
        memory.store(addr, byte);
    }
    offset
}

/// Reads a binary image from `path` and loads it at `offset`.
///
/// # Errors
///
/// Returns [`HostError::Io`] when the file cannot be read.
pub fn load_binary_file(
    memory: &mut dyn MemoryBus,
    path: &Path,
    offset: u16,
) -> Result<u16, HostError> {
    let image = fs::read(path).map_err(|source| HostError::io(path, source))?;
    log::info!(
        "loaded {} ({} bytes) at {offset:#06x}",
        path.display(),
        image.len()
    );
    Ok(load_binary(memory, &image, offset))
}

/// Cursor over the hex digits of one record.
///
/// Each field consumes a fixed number of characters; characters that are not
/// hex digits count toward the width but contribute nothing.
struct HexDigits<'a> {
    chars: std::str::Chars<'a>,
}

impl<'a> HexDigits<'a> {
    fn new(record: &'a str) -> Self {
        Self {
            chars: record.chars(),
        }
    }

    fn take(&mut self, width: usize) -> u32 {
        self.chars
            .by_ref()
            .take(width)
            .filter_map(|ch| ch.to_digit(16))
            .fold(0, |value, digit| (value << 4) | digit)
    }

    fn byte(&mut self) -> u8 {
        let [low, ..] = self.take(2).to_le_bytes();
        low
    }

    fn word(&mut self) -> u16 {
        let [low, high, ..] = self.take(4).to_le_bytes();
        u16::from_le_bytes([low, high])
    }
}

const RECORD_DATA: u8 = 0x00;
const RECORD_SEGMENT: u8 = 0x02;

/// Loads Intel HEX records from `text`.
///
/// Lines not starting with `:` are ignored and checksums are not verified.
/// Data records (type 00) are stored at their address plus the current
/// segment base; extended segment address records (type 02) set that base.
/// Any other record type, including end-of-file, stops loading.
///
/// Returns the address field of the last record read, which callers use as
/// the entry point, or `None` when the text holds no records.
pub fn load_intel_hex(memory: &mut dyn MemoryBus, text: &str) -> Option<u16> {
    let mut entry = None;
    let mut segment: u32 = 0;
    let mut stored = 0_usize;

    for record in text.lines().filter_map(|line| line.strip_prefix(':')) {
        let mut digits = HexDigits::new(record);
        let count = digits.byte();
        let addr = digits.word();
        let kind = digits.byte();
        entry = Some(addr);

        match kind {
            RECORD_DATA => {
                let base = segment + u32::from(addr);
                for target in (base..).take(usize::from(count)) {
                    let Ok(target) = u16::try_from(target) else {
                        break;
                    };
                    memory.store(target, digits.byte());
                    stored += 1;
                }
            }
            RECORD_SEGMENT => segment = u32::from(digits.word()) << 4,
            _ => break,
        }
    }

    log::info!("loaded {stored} bytes from Intel HEX");
    entry
}

/// Reads and loads an Intel HEX file.
///
/// # Errors
///
/// Returns [`HostError::Io`] when the file cannot be read.
pub fn load_intel_hex_file(
    memory: &mut dyn MemoryBus,
    path: &Path,
) -> Result<Option<u16>, HostError> {
    let bytes = fs::read(path).map_err(|source| HostError::io(path, source))?;
    Ok(load_intel_hex(memory, &String::from_utf8_lossy(&bytes)))
}
