//! One emulator run: memory image, console script, trace and pacing.
//!
//! A session is built in two steps. [`Session::prepare`] loads the BASIC
//! interpreter and every input file, seeds the random-number cell and points
//! the processor at the entry address. [`Session::run`] then drives the core
//! against the terminal until the program halts or a trace stop dumps the
//! trace ring.

use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use ins8060_core::{
    new_address_space, ExecutionContext, MemoryBus, Processor, TraceBuffer, TraceConfig,
};

use crate::console::{ConsoleIo, ScriptedInput};
use crate::errors::HostError;
use crate::loader::{load_binary_file, load_intel_hex_file};
use crate::pacing::{ClockRate, Pacer};
use crate::preprocess::{prepare_program, DEFAULT_INTERVAL};
use crate::source::clean_source;

/// Address of the 32-bit little-endian seed NIBL's `RND` starts from.
pub const RANDOM_SEED_ADDR: u16 = 0xCFFC;

/// Intel HEX image of the NIBL floating-point BASIC interpreter.
pub const DEFAULT_BASIC_IMAGE: &str = "NIBLFP.hex";

/// Command typed after the sources when auto-run is requested.
const RUN_COMMAND: &str = "run\n";

/// How an input file is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKind {
    /// Raw memory image loaded at address 0.
    Binary,
    /// Program text typed into the console.
    Source,
}

impl InputKind {
    /// Files whose name contains `.bin` are binaries; anything else is source.
    #[must_use]
    pub fn classify(path: &Path) -> Self {
        if path.to_string_lossy().contains(".bin") {
            Self::Binary
        } else {
            Self::Source
        }
    }
}

/// Where and how to capture an execution trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceOptions {
    /// File the ring is dumped to when a stop is requested.
    pub path: PathBuf,
    /// Ring configuration.
    pub config: TraceConfig,
}

/// Everything a session needs, usually built from command-line arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Paced clock; `None` runs unpaced.
    pub clock: Option<ClockRate>,
    /// Load the BASIC interpreter image first.
    pub load_basic: bool,
    /// Type `run` after the sources. Implies `load_basic`.
    pub auto_run: bool,
    /// Path of the BASIC interpreter image.
    pub basic_image: PathBuf,
    /// Line-number step for unnumbered sources.
    pub interval: u32,
    /// Subtract each slice's overrun from the next slice's budget.
    pub carry_overrun: bool,
    /// Optional execution trace.
    pub trace: Option<TraceOptions>,
    /// Input files in load order.
    pub files: Vec<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            clock: None,
            load_basic: false,
            auto_run: false,
            basic_image: PathBuf::from(DEFAULT_BASIC_IMAGE),
            interval: DEFAULT_INTERVAL,
            carry_overrun: false,
            trace: None,
            files: Vec::new(),
        }
    }
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The program executed `HALT`.
    Halted,
    /// A trace stop was requested and the ring was written out.
    TraceDumped {
        /// Dump file.
        path: PathBuf,
    },
}

impl SessionOutcome {
    /// Process exit status for this outcome.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Halted => 0,
            Self::TraceDumped { .. } => 1,
        }
    }
}

/// A loaded machine ready to run.
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    memory: Box<[u8]>,
    processor: Processor,
    script: ScriptedInput,
    entry: u16,
}

impl Session {
    /// Loads every input named by `config` and resets the processor.
    ///
    /// # Errors
    ///
    /// Fails when the BASIC image is required but absent, when an input file
    /// cannot be read, or when a source file has an unterminated comment.
    pub fn prepare(config: SessionConfig) -> Result<Self, HostError> {
        let mut memory = new_address_space();
        let mut script = ScriptedInput::new();
        let mut entry = 0;

        if config.load_basic || config.auto_run {
            let image = &config.basic_image;
            match load_intel_hex_file(&mut memory, image) {
                Ok(image_entry) => entry = image_entry.unwrap_or(entry),
                Err(HostError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                    return Err(HostError::BasicImageMissing {
                        path: image.clone(),
                    });
                }
                Err(error) => return Err(error),
            }
        }

        for path in &config.files {
            match InputKind::classify(path) {
                InputKind::Binary => entry = load_binary_file(&mut memory, path, 0)?,
                InputKind::Source => {
                    let program = read_program(path, config.interval)?;
                    log::info!("queued {} ({} bytes)", path.display(), program.len());
                    script.push_str(&program);
                    if config.auto_run {
                        script.push_str(RUN_COMMAND);
                    }
                }
            }
        }

        seed_random_cell(&mut memory, wall_clock_seed());

        let mut processor = Processor::default();
        processor.reset();
        processor.set_program_counter(entry);
        log::info!("entry point {entry:#06x}");

        Ok(Self {
            config,
            memory,
            processor,
            script,
            entry,
        })
    }

    /// Address `P0` was set to; the first opcode comes from the next byte.
    #[must_use]
    pub const fn entry(&self) -> u16 {
        self.entry
    }

    /// Loaded memory image.
    #[must_use]
    pub fn memory(&self) -> &[u8] {
        &self.memory
    }

    /// Processor as prepared or as left by the last run.
    #[must_use]
    pub const fn processor(&self) -> &Processor {
        &self.processor
    }

    /// Console text queued ahead of the keyboard.
    #[must_use]
    pub const fn script(&self) -> &ScriptedInput {
        &self.script
    }

    /// Runs against the process's standard input and output.
    ///
    /// # Errors
    ///
    /// See [`Session::run_with_io`].
    pub fn run(self) -> Result<SessionOutcome, HostError> {
        self.run_with_io(io::stdin().lock(), io::stdout().lock())
    }

    /// Runs with `reader` as the keyboard and `writer` as the display.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::TraceDump`] when a trace stop occurs and the dump
    /// file cannot be written.
    pub fn run_with_io<R: Read, W: Write>(
        mut self,
        reader: R,
        writer: W,
    ) -> Result<SessionOutcome, HostError> {
        let script = std::mem::take(&mut self.script);
        let mut console = ConsoleIo::new(script, reader, writer);
        let pacer = Pacer::new(self.config.clock, self.config.carry_overrun);

        let outcome = match &self.config.trace {
            None => {
                let mut ctx = ExecutionContext::new(&mut self.memory, &mut console);
                pacer.run(&mut self.processor, &mut ctx);
                SessionOutcome::Halted
            }
            Some(options) => {
                let mut trace = TraceBuffer::new(options.config);
                let summary = {
                    let mut ctx = ExecutionContext::new(&mut self.memory, &mut console)
                        .with_trace(&mut trace);
                    pacer.run(&mut self.processor, &mut ctx)
                };
                if summary.stopped_by_trace {
                    if let Some(reason) = trace.stop_reason() {
                        log::warn!("execution stopped: {reason}");
                    }
                    dump_trace(&trace, &options.path)?;
                    SessionOutcome::TraceDumped {
                        path: options.path.clone(),
                    }
                } else {
                    SessionOutcome::Halted
                }
            }
        };

        console.flush();
        Ok(outcome)
    }
}

fn read_program(path: &Path, interval: u32) -> Result<String, HostError> {
    let bytes = fs::read(path).map_err(|source| HostError::io(path, source))?;
    let cleaned =
        clean_source(&String::from_utf8_lossy(&bytes)).map_err(|source| HostError::Source {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(prepare_program(&cleaned, interval))
}

fn dump_trace(trace: &TraceBuffer, path: &Path) -> Result<(), HostError> {
    let to_error = |source| HostError::TraceDump {
        path: path.to_path_buf(),
        source,
    };
    let mut out = BufWriter::new(File::create(path).map_err(to_error)?);
    trace.dump(&mut out).map_err(to_error)?;
    out.flush().map_err(to_error)?;
    log::info!("wrote {} trace records to {}", trace.len(), path.display());
    Ok(())
}

/// Stores `seed` little-endian at [`RANDOM_SEED_ADDR`].
pub fn seed_random_cell(memory: &mut dyn MemoryBus, seed: u32) {
    for (addr, byte) in (RANDOM_SEED_ADDR..).zip(seed.to_le_bytes()) {
        memory.store(addr, byte);
    }
}

/// Low 32 bits of the current Unix time in seconds.
fn wall_clock_seed() -> u32 {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs());
    let [b0, b1, b2, b3, ..] = secs.to_le_bytes();
    u32::from_le_bytes([b0, b1, b2, b3])
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::{self, Cursor};
    use std::path::{Path, PathBuf};

    use ins8060_core::{new_address_space, MemoryBus, TraceConfig, TracePolicy};
    use rstest::rstest;

    use super::{
        seed_random_cell, InputKind, Session, SessionConfig, SessionOutcome, TraceOptions,
        RANDOM_SEED_ADDR,
    };
    use crate::errors::HostError;

    /// GETC; PUTC; XRI 0x0D; JNZ -6; HALT, preceded by the unused byte at 0.
    const ECHO_UNTIL_CR: [u8; 8] = [0x00, 0x21, 0x20, 0xE4, 0x0D, 0x9C, 0xFA, 0x00];

    fn write(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).expect("write fixture");
        path
    }

    #[rstest]
    #[case("prog.bin", InputKind::Binary)]
    #[case("image.bin.old", InputKind::Binary)]
    #[case("prog.bas", InputKind::Source)]
    #[case("binary", InputKind::Source)]
    fn inputs_are_classified_by_name(#[case] name: &str, #[case] kind: InputKind) {
        assert_eq!(InputKind::classify(Path::new(name)), kind);
    }

    #[test]
    fn seed_is_stored_little_endian() {
        let mut memory = new_address_space();

        seed_random_cell(&mut memory, 0x1234_5678);

        assert_eq!(memory.load(RANDOM_SEED_ADDR), 0x78);
        assert_eq!(memory.load(RANDOM_SEED_ADDR + 3), 0x12);
    }

    #[test]
    fn binary_inputs_load_at_zero_and_set_the_entry() {
        let dir = tempfile::tempdir().expect("temp dir");
        let image = write(dir.path(), "echo.bin", &ECHO_UNTIL_CR);

        let session = Session::prepare(SessionConfig {
            files: vec![image],
            ..SessionConfig::default()
        })
        .expect("prepare");

        assert_eq!(session.entry(), 0);
        assert_eq!(session.memory()[1], 0x21);
        assert_eq!(session.processor().state().pc(), 0);
        assert!(session.script().is_empty());
    }

    #[test]
    fn sources_are_cleaned_numbered_and_queued() {
        let dir = tempfile::tempdir().expect("temp dir");
        let source = write(dir.path(), "prog.bas", b"&top // start\r\nPRINT 1\r\nGOTO &top\r\n");
        let basic = write(dir.path(), "basic.hex", b":00000001FF\n");

        let session = Session::prepare(SessionConfig {
            auto_run: true,
            basic_image: basic,
            files: vec![source],
            ..SessionConfig::default()
        })
        .expect("prepare");

        assert_eq!(session.script().to_text(), "1 PRINT 1\n2 GOTO 1\nrun\n");
    }

    #[test]
    fn numbered_sources_are_queued_verbatim() {
        let dir = tempfile::tempdir().expect("temp dir");
        let source = write(dir.path(), "prog.bas", b"10 PRINT 1\n20 END\n");

        let session = Session::prepare(SessionConfig {
            files: vec![source],
            ..SessionConfig::default()
        })
        .expect("prepare");

        assert_eq!(session.script().to_text(), "10 PRINT 1\n20 END\n");
    }

    #[test]
    fn missing_basic_image_is_reported() {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join("NIBLFP.hex");

        let result = Session::prepare(SessionConfig {
            load_basic: true,
            basic_image: missing.clone(),
            ..SessionConfig::default()
        });

        match result {
            Err(HostError::BasicImageMissing { path }) => assert_eq!(path, missing),
            other => panic!("expected a missing-image error, got {other:?}"),
        }
    }

    #[test]
    fn unterminated_comment_names_the_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let source = write(dir.path(), "bad.bas", b"PRINT 1\n/* never closed\n");

        let result = Session::prepare(SessionConfig {
            files: vec![source.clone()],
            ..SessionConfig::default()
        });

        assert!(matches!(result, Err(HostError::Source { path, .. }) if path == source));
    }

    #[test]
    fn run_echoes_scripted_source_until_carriage_return() {
        let dir = tempfile::tempdir().expect("temp dir");
        let image = write(dir.path(), "echo.bin", &ECHO_UNTIL_CR);
        let source = write(dir.path(), "hi.txt", b"hi\n");

        let session = Session::prepare(SessionConfig {
            files: vec![image, source],
            ..SessionConfig::default()
        })
        .expect("prepare");
        let mut output = Vec::new();
        let outcome = session
            .run_with_io(io::empty(), &mut output)
            .expect("run");

        assert_eq!(outcome, SessionOutcome::Halted);
        assert_eq!(outcome.exit_code(), 0);
        assert_eq!(output, b"1 HI\r".to_vec());
    }

    #[test]
    fn keyboard_is_read_after_the_script() {
        let dir = tempfile::tempdir().expect("temp dir");
        let image = write(dir.path(), "echo.bin", &ECHO_UNTIL_CR);

        let session = Session::prepare(SessionConfig {
            files: vec![image],
            ..SessionConfig::default()
        })
        .expect("prepare");
        let mut output = Vec::new();
        session
            .run_with_io(Cursor::new(b"ok\n".to_vec()), &mut output)
            .expect("run");

        assert_eq!(output, b"OK\r".to_vec());
    }

    #[test]
    fn illegal_opcode_under_trace_dumps_the_ring() {
        let dir = tempfile::tempdir().expect("temp dir");
        let image = write(dir.path(), "bad.bin", &[0x00, 0x08, 0x8F, 0x00, 0x00]);
        let dump = dir.path().join("trace.txt");

        let session = Session::prepare(SessionConfig {
            trace: Some(TraceOptions {
                path: dump.clone(),
                config: TraceConfig::default(),
            }),
            files: vec![image],
            ..SessionConfig::default()
        })
        .expect("prepare");
        let outcome = session.run_with_io(io::empty(), io::sink()).expect("run");

        assert_eq!(outcome, SessionOutcome::TraceDumped { path: dump.clone() });
        assert_eq!(outcome.exit_code(), 1);
        let text = fs::read_to_string(&dump).expect("dump written");
        assert_eq!(text.lines().count(), 2);
        assert!(text.lines().nth(1).is_some_and(|line| line.ends_with("; .byte 0x8F")));
    }

    #[test]
    fn trace_that_never_stops_is_not_dumped() {
        let dir = tempfile::tempdir().expect("temp dir");
        let image = write(dir.path(), "halt.bin", &[0x00, 0x00]);
        let dump = dir.path().join("trace.txt");

        let session = Session::prepare(SessionConfig {
            trace: Some(TraceOptions {
                path: dump.clone(),
                config: TraceConfig {
                    capacity: 4,
                    policy: TracePolicy::StopWhenFull,
                    stop_on_illegal: true,
                },
            }),
            files: vec![image],
            ..SessionConfig::default()
        })
        .expect("prepare");

        assert_eq!(
            session.run_with_io(io::empty(), io::sink()).expect("run"),
            SessionOutcome::Halted
        );
        assert!(!dump.exists());
    }
}
