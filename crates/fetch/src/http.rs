//! HTTP implementation of [`RemoteSource`] backed by reqwest.

use crate::RemoteSource;
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use exn::ResultExt;
use std::time::Duration;

// Snapshot payloads are tens of megabytes; give slow connections room
// without letting a dead one hang initialization forever.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
const USER_AGENT: &str = concat!("mapdex/", env!("CARGO_PKG_VERSION"));

/// Remote source that issues plain HTTP GET requests.
///
/// The body is returned exactly as sent by the server; transfer-level
/// decompression is deliberately *not* enabled so that the gzip bytes reach
/// the codec (and the disk cache) untouched.
///
/// # Examples
///
/// ```no_run
/// use mapdex_fetch::{HttpSource, RemoteSource};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let source = HttpSource::new("catalog")?;
/// let bytes = source.fetch("https://example.com/snapshot.gz").await?;
/// # Ok(())
/// # }
/// ```
pub struct HttpSource {
    name: String,
    client: reqwest::Client,
}

impl HttpSource {
    /// Create a new HTTP source.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Client`] if the TLS backend cannot be
    /// initialized.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .or_raise(|| ErrorKind::Client)?;
        Ok(Self { name: name.into(), client })
    }
}

#[async_trait]
impl RemoteSource for HttpSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        tracing::debug!(source = self.name, url, "fetching remote snapshot");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ErrorKind::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            exn::bail!(ErrorKind::Status(status.as_u16()));
        }
        // reqwest closes the connection when the response is dropped, on
        // success and on read failure alike.
        let body = response
            .bytes()
            .await
            .map_err(|e| ErrorKind::Transport(e.to_string()))?;
        tracing::debug!(source = self.name, bytes = body.len(), "fetched remote snapshot");
        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_builds_client() {
        let source = HttpSource::new("test").unwrap();
        assert_eq!(source.name(), "test");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let source = HttpSource::new("test").unwrap();
        // Reserved TLD, guaranteed not to resolve.
        let err = source.fetch("http://snapshot.invalid/catalog.gz").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Transport(_)));
    }
}
