//! Record model and wire format for catalog snapshots.
//!
//! The upstream scraper publishes the entire catalog as one gzip-compressed
//! binary batch. This crate owns both halves of that artifact:
//!
//! - **Model**: [`CatalogRecord`] (one catalog entry, identified by a content
//!   hash and an optional short key) and [`CatalogSnapshot`] (one complete,
//!   internally consistent load of the catalog with its own production
//!   timestamp).
//! - **Wire format**: [`decode`]/[`encode`] for the gzip+bincode encoding
//!   used both over HTTP and for the local cache file. The two are
//!   byte-identical on purpose, so fetched bytes can be persisted verbatim.
//!
//! Nothing in this crate touches the network or the filesystem; it only
//! transforms bytes.

pub mod error;
mod record;
mod wire;

pub use crate::record::{CatalogRecord, CatalogSnapshot};
pub use crate::wire::{FORMAT_VERSION, decode, encode};
