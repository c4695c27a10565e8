//! In-memory remote source for testing.

use crate::RemoteSource;
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// In-memory remote source for testing.
///
/// Serves canned payloads keyed by URL, so unit tests need neither a network
/// nor a server. Every call to [`fetch`](RemoteSource::fetch) increments a
/// counter, which is how single-flight tests assert that the loader ran
/// exactly once. An optional latency keeps a fetch in flight long enough for
/// concurrent callers to pile up on it.
///
/// # Examples
///
/// ```
/// use mapdex_fetch::{MockSource, RemoteSource};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let source = MockSource::with_responses([("https://x/snapshot.gz", b"bytes".to_vec())]);
/// assert_eq!(source.fetch("https://x/snapshot.gz").await?, b"bytes");
/// assert_eq!(source.fetch_count(), 1);
/// # Ok(())
/// # }
/// ```
pub struct MockSource {
    name: String,
    responses: HashMap<String, Vec<u8>>,
    failure: Option<ErrorKind>,
    latency: Option<Duration>,
    calls: AtomicUsize,
}

impl MockSource {
    /// Create a mock source pre-populated with responses.
    pub fn with_responses(
        responses: impl IntoIterator<Item = (impl Into<String>, impl Into<Vec<u8>>)>,
    ) -> Self {
        Self {
            name: "mock".to_string(),
            responses: responses.into_iter().map(|(url, body)| (url.into(), body.into())).collect(),
            failure: None,
            latency: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Make every fetch fail with the given error kind, regardless of URL.
    pub fn failing_with(kind: ErrorKind) -> Self {
        let mut source = Self::default();
        source.failure = Some(kind);
        source
    }

    /// Change the name of the mock source.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Delay every fetch by `latency` before responding.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of times [`fetch`](RemoteSource::fetch) has been called.
    pub fn fetch_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockSource {
    fn default() -> Self {
        let responses: [(&str, &[u8]); 0] = [];
        Self::with_responses(responses)
    }
}

#[async_trait]
impl RemoteSource for MockSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if let Some(kind) = &self.failure {
            exn::bail!(kind.clone());
        }
        match self.responses.get(url) {
            Some(body) => Ok(body.clone()),
            None => exn::bail!(ErrorKind::Status(404)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_canned_response() {
        let source = MockSource::with_responses([("https://x/a.gz", b"payload".to_vec())]);
        assert_eq!(source.fetch("https://x/a.gz").await.unwrap(), b"payload");
    }

    #[tokio::test]
    async fn test_unknown_url_is_404() {
        let source = MockSource::default();
        let err = source.fetch("https://x/missing.gz").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Status(404)));
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let source = MockSource::failing_with(ErrorKind::Transport("boom".to_string()));
        let err = source.fetch("https://x/a.gz").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Transport(_)));
    }

    #[tokio::test]
    async fn test_fetch_count() {
        let source = MockSource::default();
        assert_eq!(source.fetch_count(), 0);
        let _ = source.fetch("https://x/one.gz").await;
        let _ = source.fetch("https://x/two.gz").await;
        assert_eq!(source.fetch_count(), 2);
    }
}
