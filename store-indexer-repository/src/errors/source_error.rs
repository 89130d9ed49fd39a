//! System-of-record error types.

use thiserror::Error;

/// Errors that can occur while reading store rows from the system-of-record.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    /// The source could not be opened or reached.
    #[error("Source unavailable: {0}")]
    Unavailable(String),

    /// A single row could not be decoded.
    #[error("Failed to decode row at line {line}: {message}")]
    Decode { line: usize, message: String },

    /// Reading from an already opened source failed.
    #[error("Read error: {0}")]
    ReadError(String),
}

impl SourceError {
    /// Create an unavailable error.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Create a decode error for the given 1-based line.
    pub fn decode(line: usize, msg: impl Into<String>) -> Self {
        Self::Decode {
            line,
            message: msg.into(),
        }
    }

    /// Create a read error.
    pub fn read(msg: impl Into<String>) -> Self {
        Self::ReadError(msg.into())
    }

    /// Whether the error concerns a single row rather than the whole source.
    pub fn is_row_error(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}
