//! Codec Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction, matching the rest of the workspace.

use derive_more::{Display, Error};

/// A codec error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for codec operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Payload is corrupt or malformed (bad gzip stream, truncated or
    /// garbage bincode, out-of-range timestamp). Don't retry with the
    /// same input.
    #[display("invalid or corrupted snapshot data")]
    InvalidData,
    /// The payload declares a format version newer than this build supports.
    #[display("unsupported snapshot format version: {_0}")]
    UnsupportedVersion(#[error(not(source))] u32),
    /// An I/O operation failed while encoding.
    #[display("I/O error")]
    Io,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Io)
    }
}
