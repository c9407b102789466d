//! Host side of the INS8060 emulator: image loaders, source preprocessing,
//! console plumbing, real-time pacing and the `emu8060` command line.

use simple_logger as _;

/// Command-line arguments.
pub mod cli;
/// `GETC`/`PUTC` console backed by a script and the terminal.
pub mod console;
/// Host error types.
pub mod errors;
/// Binary and Intel HEX image loaders.
pub mod loader;
/// Slice-based run loop with optional real-time pacing.
pub mod pacing;
/// Line numbering and label substitution for BASIC sources.
pub mod preprocess;
/// Session assembly and execution.
pub mod session;
/// Comment stripping for program sources.
pub mod source;

pub use errors::{HostError, SourceError};
pub use session::{Session, SessionConfig, SessionOutcome};
