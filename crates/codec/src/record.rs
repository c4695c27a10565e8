use serde::{Deserialize, Serialize};
use time::{Duration, UtcDateTime};

/// One entry of the scraped catalog.
///
/// The `hash` is the primary content-addressable identifier and `key` is an
/// optional short alias assigned by the upstream service; both are compared
/// case-insensitively by lookups. Everything else is descriptive metadata
/// that the provider passes through unchanged and never inspects.
///
/// Identity for indexing purposes is `(hash, key)`. If the same hash or key
/// appears more than once within a single snapshot, the later record wins in
/// that index (load order, last-write-wins).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRecord {
    /// Content hash of the item (hex string, case-insensitive).
    pub hash: String,
    /// Optional short alias identifier (case-insensitive, may be empty).
    pub key: Option<String>,
    /// Display title, as scraped.
    pub title: String,
    /// Uploader handle, as scraped.
    pub uploader: String,
    /// Upload time, unix seconds.
    pub uploaded_at: i64,
    /// Item play length in seconds.
    pub duration_secs: u32,
    pub upvotes: u32,
    pub downvotes: u32,
}
impl AsRef<CatalogRecord> for CatalogRecord {
    fn as_ref(&self) -> &CatalogRecord {
        self
    }
}

/// One complete, internally consistent load of the catalog.
///
/// Constructed once per successful parse (from the cache file or from the
/// network), consumed immediately to build lookup indexes, then discarded.
/// `scraped_at` is when the upstream dataset was *produced*, not when it was
/// fetched; staleness is always measured against it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSnapshot {
    pub format_version: u32,
    pub scraped_at: UtcDateTime,
    pub records: Vec<CatalogRecord>,
}

impl CatalogSnapshot {
    /// Age of the snapshot, measured from its embedded production timestamp.
    ///
    /// Can be negative if the upstream clock is ahead of ours; callers only
    /// compare against a maximum age, so that degenerates to "fresh".
    pub fn age(&self) -> Duration {
        UtcDateTime::now() - self.scraped_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_scraped(scraped_at: UtcDateTime) -> CatalogSnapshot {
        CatalogSnapshot {
            format_version: 1,
            scraped_at,
            records: Vec::new(),
        }
    }

    #[test]
    fn age_of_past_snapshot_is_positive() {
        let snapshot = snapshot_scraped(UtcDateTime::now() - Duration::hours(3));
        assert!(snapshot.age() >= Duration::hours(3));
    }

    #[test]
    fn age_of_future_snapshot_is_negative() {
        let snapshot = snapshot_scraped(UtcDateTime::now() + Duration::hours(1));
        assert!(snapshot.age() < Duration::ZERO);
    }
}
