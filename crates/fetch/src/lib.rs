//! Remote snapshot source abstraction.
//!
//! The provider only needs one capability from the network: "GET this URL,
//! give me the whole body if the response was a success". That seam is the
//! [`RemoteSource`] trait; [`HttpSource`] is the real implementation and
//! [`MockSource`] (behind the `mock` feature) is the in-memory stand-in for
//! tests.
//!
//! Bodies are returned still compressed; decompression and decoding belong
//! to `mapdex-codec`.

pub mod error;
mod http;
#[cfg(feature = "mock")]
mod mock;

use crate::error::Result;
use async_trait::async_trait;

pub use crate::http::HttpSource;
#[cfg(feature = "mock")]
pub use crate::mock::MockSource;

/// A remote origin that can serve snapshot payloads.
///
/// Implementations must be cheap to share behind an [`Arc`](std::sync::Arc);
/// the provider holds one for the lifetime of the process.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Name of the configured source (used for logging only).
    fn name(&self) -> &str;

    /// Fetch the full response body for `url`.
    ///
    /// Returns [`ErrorKind::Status`](crate::error::ErrorKind::Status) for a
    /// non-success response and
    /// [`ErrorKind::Transport`](crate::error::ErrorKind::Transport) for
    /// connect/read failures. Callers treat every error here as "this source
    /// produced nothing" rather than a fault.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}
