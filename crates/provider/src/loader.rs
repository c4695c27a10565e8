//! Tiered snapshot loading: local cache first, then network.
//!
//! The loader is deliberately concurrency-unaware; serialization of attempts
//! is the [`CachedProvider`](crate::CachedProvider)'s job. It is also
//! deliberately infallible at its public surface: every I/O, decode, or
//! transport failure inside is caught, logged, and converted into "this
//! source produced nothing", so `load` returns an `Option` rather than a
//! `Result`.

use crate::config::ProviderConfig;
use mapdex_codec::CatalogSnapshot;
use mapdex_fetch::RemoteSource;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;

/// Produces one normalized in-memory snapshot from the configured tiers.
///
/// Tier order: the local cache artifact (if configured and fresh enough),
/// then the remote snapshot. A stale local snapshot is retained as a
/// fallback candidate and served with a warning when the network tier fails
/// or is disabled — stale answers beat no answers.
pub struct SnapshotLoader {
    source: Arc<dyn RemoteSource>,
    config: ProviderConfig,
}

impl SnapshotLoader {
    pub fn new(source: Arc<dyn RemoteSource>, config: ProviderConfig) -> Self {
        Self { source, config }
    }

    /// Run one load attempt.
    ///
    /// Returns `None` only when *neither* tier yields a snapshot; that is an
    /// expected outcome (e.g. first run offline), not an error.
    pub async fn load(&self) -> Option<CatalogSnapshot> {
        let local = match &self.config.cache_path {
            Some(path) => self.read_local(path).await,
            None => None,
        };

        if let Some(snapshot) = &local {
            let age = snapshot.age();
            if age < self.config.max_age() {
                tracing::debug!(
                    age_hours = age.whole_hours(),
                    records = snapshot.records.len(),
                    "local snapshot is fresh; skipping network fetch"
                );
                return local;
            }
            tracing::debug!(age_hours = age.whole_hours(), "local snapshot is stale");
        }

        if !self.config.allow_web_fetch {
            if local.is_some() {
                tracing::warn!("web fetch disabled; serving stale local snapshot");
            }
            return local;
        }

        match self.fetch_remote().await {
            Some(snapshot) => Some(snapshot),
            None if local.is_some() => {
                tracing::warn!("remote fetch failed; serving stale local snapshot");
                local
            },
            None => None,
        }
    }

    /// Read and decode the local cache artifact.
    ///
    /// A missing file is the normal first-run state; a corrupt one is
    /// ignored as if missing (the network tier will replace it).
    async fn read_local(&self, path: &Path) -> Option<CatalogSnapshot> {
        let bytes = match fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no local snapshot");
                return None;
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read local snapshot");
                return None;
            },
        };
        match mapdex_codec::decode(&bytes) {
            Ok(snapshot) => {
                tracing::debug!(
                    path = %path.display(),
                    records = snapshot.records.len(),
                    "loaded local snapshot"
                );
                Some(snapshot)
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "local snapshot is corrupt; ignoring");
                None
            },
        }
    }

    /// Fetch and decode the remote snapshot, persisting the raw bytes to the
    /// cache path when configured to do so.
    async fn fetch_remote(&self) -> Option<CatalogSnapshot> {
        let url = &self.config.remote_url;
        let bytes = match self.source.fetch(url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(source = self.source.name(), url, error = %e, "remote snapshot fetch failed");
                return None;
            },
        };
        let snapshot = match mapdex_codec::decode(&bytes) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(url, error = %e, "remote snapshot is corrupt");
                return None;
            },
        };
        // Persist the compressed bytes verbatim; the in-memory snapshot is
        // already decoded, so a write failure costs nothing but the cache.
        if self.config.cache_to_disk
            && let Some(path) = &self.config.cache_path
            && let Err(e) = Self::persist(path, &bytes).await
        {
            tracing::warn!(path = %path.display(), error = %e, "failed to persist snapshot cache");
        }
        tracing::info!(
            records = snapshot.records.len(),
            scraped_at = %snapshot.scraped_at,
            "fetched remote snapshot"
        );
        Some(snapshot)
    }

    /// Write to a sibling temp file and rename into place, so a crash
    /// mid-write never clobbers the previous cache artifact.
    async fn persist(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).await?;
        }
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, bytes).await?;
        fs::rename(&tmp, path).await
    }
}
