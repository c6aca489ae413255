//! Nugget Extract - translatable nugget extraction and URL localization
//!
//! Scans source trees for nuggets such as `[[[Hello|||///greeting]]]`,
//! aggregates them into a deduplicated catalog keyed by message id (and
//! optionally context comment), and provides helpers for inserting a
//! language segment into URLs.

pub mod catalog;
pub mod config;
pub mod error;
pub mod file_handler;
pub mod localizer;
pub mod nugget;
pub mod utils;

pub use catalog::{Aggregator, Catalog, CatalogEntry, CatalogKey};
pub use config::Settings;
pub use error::{AppError, AppResult};
pub use file_handler::{scan, scan_async, ScanOutcome, ScanStats, SourceScanner};
pub use localizer::{is_local, prepend_path_segment, strip_path_segment};
pub use nugget::{Nugget, NuggetParser, NuggetTokens};
