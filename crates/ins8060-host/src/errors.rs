//! Error types for loading programs and running a session.
//!
//! Every variant carries the path it concerns so the binary can report
//! failures as `error: <path>: <reason>` without extra context.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Malformed program source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// A `/*` comment runs to the end of the file.
    #[error("comment opened on line {line} is not closed")]
    UnterminatedComment {
        /// 1-indexed line of the opening `/*`.
        line: usize,
    },
}

/// Failure while preparing or running an emulator session.
#[derive(Debug, Error)]
pub enum HostError {
    /// A file could not be read.
    #[error("cannot open {}: {source}", path.display())]
    Io {
        /// File being read.
        path: PathBuf,
        /// Underlying I/O failure.
        source: io::Error,
    },
    /// A program source file could not be cleaned.
    #[error("{}: {source}", path.display())]
    Source {
        /// Source file.
        path: PathBuf,
        /// What was wrong with it.
        source: SourceError,
    },
    /// The BASIC interpreter image requested by `-b` or `-r` is absent.
    #[error("BASIC interpreter ({}) not found", path.display())]
    BasicImageMissing {
        /// Expected Intel HEX image.
        path: PathBuf,
    },
    /// The trace buffer could not be written out.
    #[error("cannot write trace to {}: {source}", path.display())]
    TraceDump {
        /// Destination of the dump.
        path: PathBuf,
        /// Underlying I/O failure.
        source: io::Error,
    },
}

impl HostError {
    /// Wraps a read failure, reporting a missing file with its path.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
