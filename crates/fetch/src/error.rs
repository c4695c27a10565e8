//! Fetch Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction, matching the rest of the workspace.

use derive_more::{Display, Error};

/// A fetch error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for fetch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Failed to construct the underlying HTTP client.
    #[display("failed to build HTTP client")]
    Client,
    /// The server answered with a non-success status code.
    #[display("unexpected response status: {_0}")]
    Status(#[error(not(source))] u16),
    /// Connect, TLS, or body-read failure before a usable response arrived.
    #[display("transport error: {_0}")]
    Transport(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ErrorKind::Client => false,
            // 5xx and 429 are worth retrying; 4xx otherwise are not.
            ErrorKind::Status(code) => *code >= 500 || *code == 429,
            ErrorKind::Transport(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(
            ErrorKind::Status(503).to_string(),
            "unexpected response status: 503"
        );
        assert_eq!(
            ErrorKind::Transport("connection refused".to_string()).to_string(),
            "transport error: connection refused"
        );
    }

    #[test]
    fn error_kind_retryable() {
        assert!(!ErrorKind::Client.is_retryable());
        assert!(!ErrorKind::Status(404).is_retryable());
        assert!(ErrorKind::Status(429).is_retryable());
        assert!(ErrorKind::Status(503).is_retryable());
        assert!(ErrorKind::Transport("timed out".to_string()).is_retryable());
    }
}
