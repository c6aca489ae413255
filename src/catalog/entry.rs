//! Catalog keys, entries and the finished catalog

use crate::utils::text;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Separates msgid from context in a key (gettext's EOT convention)
pub const CONTEXT_SEPARATOR: char = '\u{4}';

/// Normalize line endings in a msgid.
///
/// CRLF becomes LF. A bare CR then becomes the two characters `\n`
/// (backslash, n) rather than a newline; existing catalogs are keyed that way.
pub fn normalize_msgid(msgid: &str) -> String {
    if !msgid.contains('\r') {
        return msgid.to_string();
    }
    msgid.replace("\r\n", "\n").replace('\r', "\\n")
}

/// Deduplication key for catalog entries
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct CatalogKey(String);

impl CatalogKey {
    /// Derive a key from an already normalized msgid.
    ///
    /// The comment takes part only when `context_from_comment` is set and the
    /// comment is non-empty.
    pub fn new(msgid: &str, comment: Option<&str>, context_from_comment: bool) -> Self {
        if context_from_comment && text::is_set(comment) {
            Self(format!("{}{}{}", msgid, CONTEXT_SEPARATOR, comment.unwrap_or_default()))
        } else {
            Self(msgid.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CatalogKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One logical message and every place it was seen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub key: CatalogKey,
    /// Normalized msgid
    pub msgid: String,
    /// `path:line` references, in insertion order, duplicates kept
    pub references: Vec<String>,
    /// Non-empty comments, in insertion order, duplicates kept
    pub comments: Vec<String>,
}

impl CatalogEntry {
    /// Create an entry from its first sighting
    pub fn new(key: CatalogKey, msgid: String, reference: String, comment: Option<&str>) -> Self {
        let mut entry = Self {
            key,
            msgid,
            references: Vec::with_capacity(1),
            comments: Vec::new(),
        };
        entry.record(reference, comment);
        entry
    }

    /// Append a further sighting
    pub fn record(&mut self, reference: String, comment: Option<&str>) {
        self.references.push(reference);
        if let Some(comment) = comment.filter(|c| !c.is_empty()) {
            self.comments.push(comment.to_string());
        }
    }

    /// Fold another entry for the same key into this one
    pub fn absorb(&mut self, other: CatalogEntry) {
        self.references.extend(other.references);
        self.comments.extend(other.comments);
    }
}

/// The finished catalog, ordered by key for reproducible output
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: BTreeMap<CatalogKey, CatalogEntry>,
}

impl Catalog {
    pub(crate) fn from_map(entries: BTreeMap<CatalogKey, CatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &CatalogKey) -> Option<&CatalogEntry> {
        self.entries.get(key)
    }

    /// Look up by msgid and comment the same way keys are derived
    pub fn find(
        &self,
        msgid: &str,
        comment: Option<&str>,
        context_from_comment: bool,
    ) -> Option<&CatalogEntry> {
        let msgid = normalize_msgid(msgid);
        self.get(&CatalogKey::new(&msgid, comment, context_from_comment))
    }

    /// Entries sorted by key
    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = &CatalogKey> {
        self.entries.keys()
    }

    /// Total number of references across all entries
    pub fn reference_count(&self) -> usize {
        self.entries.values().map(|e| e.references.len()).sum()
    }

    pub fn into_entries(self) -> Vec<CatalogEntry> {
        self.entries.into_values().collect()
    }
}

impl Serialize for Catalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.entries.values())
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a CatalogEntry;
    type IntoIter = std::collections::btree_map::Values<'a, CatalogKey, CatalogEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.values()
    }
}
