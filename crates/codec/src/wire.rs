//! Wire format: gzip around a bincode envelope.
//!
//! The envelope carries the format version and the scrape timestamp as plain
//! unix seconds so the header stays readable by any format version; the
//! record batch follows. The exact same bytes are used over HTTP and on disk.

use crate::error::{ErrorKind, Result};
use crate::record::{CatalogRecord, CatalogSnapshot};
use exn::ResultExt;
use flate2::Compression as GzCompression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use time::UtcDateTime;

/// Current snapshot format version for forward compatibility.
///
/// Decoding rejects payloads declaring a *newer* version; older versions are
/// accepted as-is (fields have only ever been appended).
pub const FORMAT_VERSION: u32 = 2;

#[derive(Serialize, Deserialize)]
struct Envelope {
    format_version: u32,
    /// Unix seconds, UTC.
    scraped_at: i64,
    records: Vec<CatalogRecord>,
}

/// Decode a gzip-compressed snapshot payload.
///
/// # Examples
///
/// ```
/// use mapdex_codec::{CatalogSnapshot, FORMAT_VERSION, decode, encode};
/// use time::UtcDateTime;
///
/// let snapshot = CatalogSnapshot {
///     format_version: FORMAT_VERSION,
///     scraped_at: UtcDateTime::now(),
///     records: Vec::new(),
/// };
/// let bytes = encode(&snapshot).unwrap();
/// let decoded = decode(&bytes).unwrap();
/// assert_eq!(decoded.format_version, FORMAT_VERSION);
/// ```
pub fn decode(bytes: &[u8]) -> Result<CatalogSnapshot> {
    let mut body = Vec::new();
    GzDecoder::new(bytes)
        .read_to_end(&mut body)
        .or_raise(|| ErrorKind::InvalidData)?;
    let envelope: Envelope = bincode::deserialize(&body).or_raise(|| ErrorKind::InvalidData)?;
    if envelope.format_version > FORMAT_VERSION {
        exn::bail!(ErrorKind::UnsupportedVersion(envelope.format_version));
    }
    let scraped_at =
        UtcDateTime::from_unix_timestamp(envelope.scraped_at).or_raise(|| ErrorKind::InvalidData)?;
    tracing::debug!(
        format_version = envelope.format_version,
        records = envelope.records.len(),
        "decoded catalog snapshot"
    );
    Ok(CatalogSnapshot {
        format_version: envelope.format_version,
        scraped_at,
        records: envelope.records,
    })
}

/// Encode a snapshot into the gzip-compressed wire/disk representation.
///
/// The provider persists *fetched* bytes verbatim rather than re-encoding,
/// so this is mostly used to produce fixtures and fresh cache artifacts.
pub fn encode(snapshot: &CatalogSnapshot) -> Result<Vec<u8>> {
    let envelope = Envelope {
        format_version: snapshot.format_version,
        scraped_at: snapshot.scraped_at.unix_timestamp(),
        records: snapshot.records.clone(),
    };
    let body = bincode::serialize(&envelope).or_raise(|| ErrorKind::InvalidData)?;
    let mut encoder = GzEncoder::new(Vec::new(), GzCompression::best());
    encoder.write_all(&body).or_raise(|| ErrorKind::Io)?;
    encoder.finish().or_raise(|| ErrorKind::Io)
}
