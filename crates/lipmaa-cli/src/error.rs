//! CLI error types.

use std::path::PathBuf;

use lipmaa_core::{BuildError, StorageError};
use lipmaa_proto::EncodeError;

/// Errors that abort a command.
///
/// An invalid chain is not an error; `verify` reports it as an outcome.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// File could not be read or written.
    #[error("{}: {source}", path.display())]
    File {
        /// File being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Writing to the output stream failed.
    #[error("output error: {0}")]
    Output(#[from] std::io::Error),

    /// Seed is neither `random` nor 64 hex digits.
    #[error("invalid seed: {0}")]
    InvalidSeed(String),

    /// OS randomness unavailable.
    #[error("random seed unavailable: {0}")]
    Random(String),

    /// `--to` is zero or newer than the starting sequence.
    #[error("no backward path from {from} to {to}")]
    InvalidRange {
        /// Starting sequence.
        from: u64,
        /// Requested target.
        to: u64,
    },

    /// `--relaxed` given together with `--to`, whose walk always checks
    /// skip targets exactly.
    #[error("--relaxed cannot be combined with --to {to}")]
    RelaxedRange {
        /// Requested target.
        to: u64,
    },

    /// Log file holds no entries.
    #[error("log is empty")]
    EmptyLog,

    /// Requested entry is not in the log.
    #[error("no entry at sequence {sequence}")]
    MissingEntry {
        /// Requested sequence.
        sequence: u64,
    },

    /// Entries could not be built.
    #[error("build failed: {0}")]
    Build(#[from] BuildError),

    /// Log file is not a continuous log.
    #[error("malformed log: {0}")]
    Storage(#[from] StorageError),

    /// Log file could not be encoded or decoded.
    #[error("log encoding: {0}")]
    Encoding(#[from] EncodeError),
}
