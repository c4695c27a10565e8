//! Tiered, single-flight cached catalog provider.
//!
//! This crate decides *where* current catalog data comes from — a local
//! cache file, a remote gzip-compressed snapshot, or an already-warm
//! in-memory index — deduplicates concurrent initialization attempts, and
//! answers O(1) lookups by content hash or short key once data is loaded.
//!
//! # Architecture
//! Two pieces, leaves first:
//! - [`SnapshotLoader`]: pure fetch/parse/merge logic. Tries the local cache
//!   first, falls back to the network, degrades gracefully. No concurrency
//!   awareness; every failure inside it is logged and swallowed.
//! - [`CachedProvider`]: wraps the loader behind a lazily-triggered,
//!   single-flight initialization gate. On success it builds two
//!   case-insensitive indexes; on total failure it settles into a permanent
//!   "not available" state instead of crashing or retrying.
//!
//! The provider never re-fetches on its own. A fresh instance is required to
//! pick up a newer upstream snapshot.

pub mod config;
pub mod error;
mod loader;
mod provider;

pub use crate::config::ProviderConfig;
pub use crate::loader::SnapshotLoader;
pub use crate::provider::CachedProvider;
// Callers almost always need the record types alongside the provider.
pub use mapdex_codec::{CatalogRecord, CatalogSnapshot};
pub use mapdex_fetch::RemoteSource;
