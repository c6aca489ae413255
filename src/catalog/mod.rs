//! Catalog module for Nugget Extract
//!
//! Builds the deduplicated translation catalog:
//! - Key derivation from normalized msgid and optional context comment
//! - Entries collecting every reference and comment for a key
//! - A sharded aggregator safe to feed from many scanning threads

mod aggregator;
mod entry;

pub use aggregator::Aggregator;
pub use entry::{normalize_msgid, Catalog, CatalogEntry, CatalogKey, CONTEXT_SEPARATOR};
