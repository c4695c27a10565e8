//! Provider configuration.
//!
//! Plain struct with serde defaults, loadable through figment so embedders
//! can layer a TOML file and `MAPDEX_*` environment variables over the
//! built-in defaults. The provider itself only ever reads the struct; how it
//! was assembled is the embedder's business.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use time::Duration;

/// Where the upstream scraper publishes the full catalog snapshot.
pub const DEFAULT_REMOTE_URL: &str = "https://catalog.mapdex.dev/v2/snapshot.gz";

const DEFAULT_MAX_AGE_SECS: u64 = 60 * 60 * 24 * 2; // 2 days

/// Configuration accepted by [`SnapshotLoader`](crate::SnapshotLoader) and
/// [`CachedProvider`](crate::CachedProvider).
///
/// # Examples
///
/// ```
/// use mapdex_provider::ProviderConfig;
///
/// let config = ProviderConfig {
///     cache_to_disk: true,
///     cache_path: ProviderConfig::default_cache_path(),
///     ..ProviderConfig::default()
/// };
/// assert!(config.allow_web_fetch);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// URL of the remote snapshot.
    pub remote_url: String,
    /// Path of the local cache artifact. `None` disables the local tier
    /// entirely (no reads, no writes).
    pub cache_path: Option<PathBuf>,
    /// Maximum acceptable snapshot age in seconds before the network is
    /// consulted. Measured against the snapshot's embedded scrape time.
    pub max_age_secs: u64,
    /// Whether the network tier may be used at all.
    pub allow_web_fetch: bool,
    /// Whether a successfully fetched snapshot is persisted to `cache_path`.
    pub cache_to_disk: bool,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            remote_url: DEFAULT_REMOTE_URL.to_string(),
            cache_path: None,
            max_age_secs: DEFAULT_MAX_AGE_SECS,
            allow_web_fetch: true,
            cache_to_disk: false,
        }
    }
}

impl ProviderConfig {
    /// Maximum acceptable snapshot age as a [`time::Duration`].
    pub fn max_age(&self) -> Duration {
        Duration::seconds(i64::try_from(self.max_age_secs).unwrap_or(i64::MAX))
    }

    /// Default per-user location for the cache artifact, under the platform
    /// cache directory. `None` if no home directory can be determined.
    pub fn default_cache_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("dev", "mapdex", "mapdex")
            .map(|dirs| dirs.cache_dir().join("catalog.gz"))
    }

    /// Load configuration by merging, in increasing precedence: built-in
    /// defaults, an optional TOML file, and `MAPDEX_`-prefixed environment
    /// variables.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Config`] if any layer fails to parse or a value
    /// has the wrong shape.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(file) = file {
            figment = figment.merge(Toml::file(file));
        }
        figment
            .merge(Env::prefixed("MAPDEX_"))
            .extract()
            .or_raise(|| ErrorKind::Config)
    }
}
