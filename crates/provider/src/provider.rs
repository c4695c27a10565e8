//! Single-flight cached lookup provider.
//!
//! The initialization gate is a nullable shared future behind a mutex: the
//! first caller to find it empty creates the one allowed attempt, everyone
//! else (including that caller) awaits the same handle. The attempt itself
//! is spawned onto the runtime so that a waiter abandoning its own
//! invocation (timeout, dropped request) never aborts the work for the
//! others — once started, the attempt always runs to completion and its
//! result is cached for the lifetime of the provider instance.

use crate::config::ProviderConfig;
use crate::loader::SnapshotLoader;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use mapdex_codec::{CatalogRecord, CatalogSnapshot};
use mapdex_fetch::RemoteSource;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Mutex;

type InitFuture = Shared<BoxFuture<'static, Arc<Index>>>;

/// The two lookup indexes built from one snapshot.
///
/// Built in a single pass and never mutated afterwards; readers only ever
/// see this fully constructed (it travels behind an `Arc` through the shared
/// initialization future).
#[derive(Debug, Default)]
struct Index {
    by_hash: HashMap<String, CatalogRecord>,
    by_key: HashMap<String, CatalogRecord>,
}

impl Index {
    fn build(snapshot: Option<CatalogSnapshot>) -> Self {
        let Some(snapshot) = snapshot else {
            return Self::default();
        };
        let mut by_hash = HashMap::with_capacity(snapshot.records.len());
        let mut by_key = HashMap::with_capacity(snapshot.records.len());
        for record in snapshot.records {
            if let Some(key) = record.key.as_deref()
                && !key.is_empty()
            {
                by_key.insert(key.to_ascii_lowercase(), record.clone());
            }
            if !record.hash.is_empty() {
                by_hash.insert(record.hash.to_ascii_lowercase(), record);
            }
        }
        Self { by_hash, by_key }
    }
}

/// Lazily-initialized, single-flight cached catalog provider.
///
/// The first lookup from any caller triggers exactly one load-and-index
/// attempt; concurrent first lookups join it rather than starting their own.
/// Once the attempt settles — successfully or not — its outcome is served
/// from memory forever after. Total source failure degrades the provider to
/// "no answers" ([`is_available`](Self::is_available) stays `false`, lookups
/// return `None`); it never faults the caller and never retries on its own.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use mapdex_fetch::HttpSource;
/// use mapdex_provider::{CachedProvider, ProviderConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let source = Arc::new(HttpSource::new("catalog")?);
/// let provider = CachedProvider::new(source, ProviderConfig::default());
/// if let Some(record) = provider.lookup_by_hash("0fde9a...").await {
///     println!("{}", record.title);
/// }
/// # Ok(())
/// # }
/// ```
pub struct CachedProvider {
    loader: Arc<SnapshotLoader>,
    init: Mutex<Option<InitFuture>>,
    // Published by the init task *before* its future settles, so these are
    // readable without awaiting initialization.
    available: Arc<AtomicBool>,
    record_count: Arc<AtomicUsize>,
}

impl CachedProvider {
    /// Create a provider over the given remote source and configuration.
    ///
    /// No work happens until the first lookup.
    pub fn new(source: Arc<dyn RemoteSource>, config: ProviderConfig) -> Self {
        Self {
            loader: Arc::new(SnapshotLoader::new(source, config)),
            init: Mutex::new(None),
            available: Arc::new(AtomicBool::new(false)),
            record_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Look up a record by its content hash (case-insensitive).
    ///
    /// Triggers initialization if it has not started yet and awaits its
    /// completion; afterwards answers directly from the in-memory index.
    pub async fn lookup_by_hash(&self, hash: &str) -> Option<CatalogRecord> {
        let index = self.ensure_initialized().await;
        index.by_hash.get(&hash.to_ascii_lowercase()).cloned()
    }

    /// Look up a record by its short key (case-insensitive).
    pub async fn lookup_by_key(&self, key: &str) -> Option<CatalogRecord> {
        let index = self.ensure_initialized().await;
        index.by_key.get(&key.to_ascii_lowercase()).cloned()
    }

    /// Whether any successful load has completed indexing so far.
    ///
    /// Non-blocking; `false` before initialization finishes and forever
    /// after a totally failed one. Once `true`, stays `true` for the
    /// lifetime of the instance.
    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::Acquire)
    }

    /// Number of records in the hash index. Non-blocking; `0` before
    /// initialization completes.
    pub fn record_count(&self) -> usize {
        self.record_count.load(Ordering::Acquire)
    }

    /// Join the one allowed initialization attempt, creating it first if no
    /// caller has yet. The lock covers only the create-if-absent decision;
    /// the load itself runs outside it.
    async fn ensure_initialized(&self) -> Arc<Index> {
        let attempt = {
            let mut guard = self.init.lock().await;
            guard.get_or_insert_with(|| self.spawn_attempt()).clone()
        };
        attempt.await
    }

    fn spawn_attempt(&self) -> InitFuture {
        let loader = Arc::clone(&self.loader);
        let available = Arc::clone(&self.available);
        let record_count = Arc::clone(&self.record_count);
        // Spawned, not inlined: waiters may be cancelled, the attempt may not.
        let task = tokio::spawn(async move {
            let snapshot = loader.load().await;
            let non_empty = snapshot.as_ref().is_some_and(|s| !s.records.is_empty());
            let index = Arc::new(Index::build(snapshot));
            // Both stores happen before the future settles; a caller that
            // observed completion also observes availability.
            record_count.store(index.by_hash.len(), Ordering::Release);
            if non_empty {
                available.store(true, Ordering::Release);
            } else {
                tracing::warn!("no catalog snapshot available; lookups will return nothing");
            }
            index
        });
        task.map(|joined| {
            joined.unwrap_or_else(|e| {
                // Task panicked or the runtime is shutting down. Absorb it;
                // lookups degrade to "not found".
                tracing::error!(error = %e, "catalog initialization attempt did not complete");
                Arc::new(Index::default())
            })
        })
        .boxed()
        .shared()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapdex_codec::FORMAT_VERSION;
    use mapdex_fetch::MockSource;
    use mapdex_fetch::error::ErrorKind as FetchErrorKind;
    use rstest::rstest;
    use std::time::Duration as StdDuration;
    use time::UtcDateTime;

    const URL: &str = "https://catalog.test/snapshot.gz";

    fn record(hash: &str, key: Option<&str>) -> CatalogRecord {
        CatalogRecord {
            hash: hash.to_string(),
            key: key.map(str::to_string),
            title: "Test Item".to_string(),
            uploader: "someone".to_string(),
            uploaded_at: 1_700_000_000,
            duration_secs: 180,
            upvotes: 3,
            downvotes: 0,
        }
    }

    fn encoded(records: Vec<CatalogRecord>) -> Vec<u8> {
        mapdex_codec::encode(&CatalogSnapshot {
            format_version: FORMAT_VERSION,
            scraped_at: UtcDateTime::now(),
            records,
        })
        .unwrap()
    }

    fn config() -> ProviderConfig {
        ProviderConfig { remote_url: URL.to_string(), ..ProviderConfig::default() }
    }

    fn provider_with(source: Arc<MockSource>) -> CachedProvider {
        CachedProvider::new(source, config())
    }

    #[rstest]
    #[case::same_case("ABC123")]
    #[case::lowered("abc123")]
    #[case::mixed("aBc123")]
    #[tokio::test]
    async fn lookup_by_hash_is_case_insensitive(#[case] query: &str) {
        let source = Arc::new(MockSource::with_responses([(
            URL,
            encoded(vec![record("ABC123", None)]),
        )]));
        let provider = provider_with(source);
        let found = provider.lookup_by_hash(query).await.unwrap();
        assert_eq!(found.hash, "ABC123");
    }

    #[rstest]
    #[case::same_case("1F9A")]
    #[case::lowered("1f9a")]
    #[tokio::test]
    async fn lookup_by_key_is_case_insensitive(#[case] query: &str) {
        let source = Arc::new(MockSource::with_responses([(
            URL,
            encoded(vec![record("abc", Some("1F9A"))]),
        )]));
        let provider = provider_with(source);
        let found = provider.lookup_by_key(query).await.unwrap();
        assert_eq!(found.key.as_deref(), Some("1F9A"));
    }

    #[tokio::test]
    async fn missing_key_and_hash_are_skipped_per_index() {
        let source = Arc::new(MockSource::with_responses([(
            URL,
            encoded(vec![record("", Some("beef")), record("cafe", None)]),
        )]));
        let provider = provider_with(source);
        // Keyed record with empty hash: reachable by key only.
        assert!(provider.lookup_by_key("beef").await.is_some());
        assert!(provider.lookup_by_hash("").await.is_none());
        // Hash-only record: reachable by hash only.
        assert!(provider.lookup_by_hash("cafe").await.is_some());
        assert!(provider.lookup_by_key("cafe").await.is_none());
    }

    #[tokio::test]
    async fn duplicate_identifiers_are_last_write_wins() {
        let mut first = record("dead", Some("k1"));
        first.title = "first".to_string();
        let mut second = record("DEAD", Some("K1"));
        second.title = "second".to_string();
        let source = Arc::new(MockSource::with_responses([(URL, encoded(vec![first, second]))]));
        let provider = provider_with(source);
        assert_eq!(provider.lookup_by_hash("dead").await.unwrap().title, "second");
        assert_eq!(provider.lookup_by_key("k1").await.unwrap().title, "second");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_first_lookups_are_single_flight() {
        let source = Arc::new(
            MockSource::with_responses([(URL, encoded(vec![record("abc123", None)]))])
                .with_latency(StdDuration::from_millis(50)),
        );
        let provider = Arc::new(provider_with(source.clone()));

        let barrier = Arc::new(tokio::sync::Barrier::new(16));
        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let provider = Arc::clone(&provider);
                let barrier = Arc::clone(&barrier);
                tokio::spawn(async move {
                    barrier.wait().await;
                    provider.lookup_by_hash("ABC123").await
                })
            })
            .collect();
        for task in tasks {
            let found = task.await.unwrap();
            assert_eq!(found.unwrap().hash, "abc123");
        }
        assert_eq!(source.fetch_count(), 1, "all callers must share one load attempt");
    }

    #[tokio::test]
    async fn abandoned_waiter_does_not_abort_the_attempt() {
        let source = Arc::new(
            MockSource::with_responses([(URL, encoded(vec![record("abc", None)]))])
                .with_latency(StdDuration::from_millis(50)),
        );
        let provider = Arc::new(provider_with(source.clone()));

        let waiter = {
            let provider = Arc::clone(&provider);
            tokio::spawn(async move { provider.lookup_by_hash("abc").await })
        };
        // Give the waiter time to start the attempt, then abandon it mid-load.
        tokio::time::sleep(StdDuration::from_millis(10)).await;
        waiter.abort();
        assert!(waiter.await.is_err());

        // The shared attempt finished anyway; later callers reuse its result.
        let found = provider.lookup_by_hash("abc").await;
        assert_eq!(found.unwrap().hash, "abc");
        assert_eq!(source.fetch_count(), 1);
    }

    #[tokio::test]
    async fn settled_outcome_is_cached() {
        let source = Arc::new(MockSource::with_responses([(
            URL,
            encoded(vec![record("abc", None)]),
        )]));
        let provider = provider_with(source.clone());
        for _ in 0..5 {
            assert!(provider.lookup_by_hash("abc").await.is_some());
        }
        assert_eq!(source.fetch_count(), 1);
    }

    #[tokio::test]
    async fn availability_is_idempotent() {
        let source = Arc::new(MockSource::with_responses([(
            URL,
            encoded(vec![record("abc", None)]),
        )]));
        let provider = provider_with(source);
        assert!(!provider.is_available());
        assert_eq!(provider.record_count(), 0);
        provider.lookup_by_hash("abc").await;
        assert!(provider.is_available());
        assert_eq!(provider.record_count(), 1);
        // Further lookups, hits or misses, never flip it back.
        provider.lookup_by_hash("nope").await;
        provider.lookup_by_key("nope").await;
        assert!(provider.is_available());
    }

    #[tokio::test]
    async fn total_failure_degrades_to_unavailable() {
        let source = Arc::new(MockSource::failing_with(FetchErrorKind::Status(503)));
        let provider = provider_with(source.clone());
        assert!(provider.lookup_by_hash("anything").await.is_none());
        assert!(!provider.is_available());
        assert_eq!(provider.record_count(), 0);
        // Failed attempts are cached too; no automatic retry.
        assert!(provider.lookup_by_key("anything").await.is_none());
        assert_eq!(source.fetch_count(), 1);
    }

    #[tokio::test]
    async fn empty_snapshot_is_not_available() {
        let source = Arc::new(MockSource::with_responses([(URL, encoded(Vec::new()))]));
        let provider = provider_with(source);
        assert!(provider.lookup_by_hash("abc").await.is_none());
        assert!(!provider.is_available());
    }
}
