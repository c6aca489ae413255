//! URL localization for Nugget Extract
//!
//! Stateless helpers used when rewriting links for a language:
//! - Inserting a language segment at the front of a URL path
//! - Reading and stripping that segment again
//! - Deciding whether a link addresses the current host

mod url_path;

pub use url_path::{extract_first_segment, is_local, prepend_path_segment, strip_path_segment};
