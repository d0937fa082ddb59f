//! Error types for the CODA parser library.

use crate::record::RecordKind;
use std::io;
use thiserror::Error;

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while reading, parsing or exporting CODA data.
///
/// A file that fails structural validation is not represented here:
/// [`crate::validate`] reports it as `false` and [`crate::parse`] as an
/// empty statement list.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error occurred during read or write operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error writing CSV output.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The account structure digit of an old balance record is not 0, 1, 2 or 3.
    #[error("unsupported account type '{digit}' at line {line}")]
    UnsupportedAccountType { line: usize, digit: String },

    /// A record arrived before the record it depends on (e.g. a movement
    /// before any header).
    #[error("{kind:?} record at line {line} has no enclosing {missing}")]
    ProtocolViolation {
        line: usize,
        kind: RecordKind,
        missing: &'static str,
    },
}
