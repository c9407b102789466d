//! Console plumbing behind the `GETC` and `PUTC` opcodes.

use std::collections::VecDeque;
use std::io::{self, Read, Write};

use ins8060_core::HostIo;

/// Byte handed to `GETC` once input is exhausted.
pub const END_OF_INPUT: u8 = 0xFF;

/// Text typed into the console before the keyboard is read.
///
/// Program sources are queued here so NIBL receives them as if entered at
/// its prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptedInput {
    pending: VecDeque<u8>,
}

impl ScriptedInput {
    /// Creates an empty script.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pending: VecDeque::new(),
        }
    }

    /// Appends text to the end of the script.
    pub fn push_str(&mut self, text: &str) {
        self.pending.extend(text.bytes());
    }

    /// Bytes still queued.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns `true` once every scripted byte has been consumed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Removes and returns the next scripted byte.
    pub fn next_byte(&mut self) -> Option<u8> {
        self.pending.pop_front()
    }

    /// Queued text, for inspection.
    #[must_use]
    pub fn to_text(&self) -> String {
        let bytes: Vec<u8> = self.pending.iter().copied().collect();
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

/// [`HostIo`] over a reader and a writer, fed first from a [`ScriptedInput`].
#[derive(Debug)]
pub struct ConsoleIo<R, W> {
    script: ScriptedInput,
    reader: R,
    writer: W,
}

impl<R: Read, W: Write> ConsoleIo<R, W> {
    /// Creates a console that drains `script` before reading `reader`.
    #[must_use]
    pub const fn new(script: ScriptedInput, reader: R, writer: W) -> Self {
        Self {
            script,
            reader,
            writer,
        }
    }

    /// Output sink.
    #[must_use]
    pub const fn writer(&self) -> &W {
        &self.writer
    }

    /// Flushes pending output, logging a failure.
    pub fn flush(&mut self) {
        if let Err(error) = self.writer.flush() {
            log::warn!("console flush failed: {error}");
        }
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut byte = [0_u8; 1];
        loop {
            match self.reader.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(byte[0])),
                Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
                Err(error) => return Err(error),
            }
        }
    }
}

impl<R: Read, W: Write> HostIo for ConsoleIo<R, W> {
    fn read_char(&mut self) -> u8 {
        if let Some(byte) = self.script.next_byte() {
            return byte;
        }
        self.flush();
        match self.read_byte() {
            Ok(Some(byte)) => byte,
            Ok(None) => END_OF_INPUT,
            Err(error) => {
                log::warn!("console read failed: {error}");
                END_OF_INPUT
            }
        }
    }

    fn write_char(&mut self, ch: u8) {
        if let Err(error) = self.writer.write_all(&[ch]) {
            log::warn!("console write failed: {error}");
            return;
        }
        if ch == b'\n' || ch == b'\r' {
            self.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Cursor, Read};

    use ins8060_core::HostIo;

    use super::{ConsoleIo, ScriptedInput, END_OF_INPUT};

    struct BrokenReader;

    impl Read for BrokenReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("unplugged"))
        }
    }

    #[test]
    fn script_is_read_before_the_keyboard() {
        let mut script = ScriptedInput::new();
        script.push_str("ab");
        let mut console = ConsoleIo::new(script, Cursor::new(b"c".to_vec()), Vec::new());

        let read: Vec<u8> = (0..4).map(|_| console.read_char()).collect();

        assert_eq!(read, vec![b'a', b'b', b'c', END_OF_INPUT]);
    }

    #[test]
    fn read_errors_look_like_end_of_input() {
        let mut console = ConsoleIo::new(ScriptedInput::new(), BrokenReader, Vec::new());
        assert_eq!(console.read_char(), END_OF_INPUT);
    }

    #[test]
    fn output_is_written_byte_for_byte() {
        let mut console = ConsoleIo::new(ScriptedInput::new(), io::empty(), Vec::new());

        for &ch in b"OK\r\n" {
            console.write_char(ch);
        }

        assert_eq!(console.writer(), &b"OK\r\n".to_vec());
    }

    #[test]
    fn scripted_input_reports_what_is_left() {
        let mut script = ScriptedInput::default();
        assert!(script.is_empty());

        script.push_str("1 PRINT\n");
        script.push_str("run\n");
        assert_eq!(script.len(), 12);
        assert_eq!(script.next_byte(), Some(b'1'));
        assert_eq!(script.to_text(), " PRINT\nrun\n");
    }
}
