//! Concurrent catalog aggregation
//!
//! Keys are spread over a fixed set of mutex-guarded shards. An upsert locks
//! only the shard owning its key, so the read-if-absent-else-merge step is
//! atomic per key while unrelated keys proceed in parallel.

use super::entry::{normalize_msgid, Catalog, CatalogEntry, CatalogKey};
use crate::nugget::Nugget;
use std::collections::hash_map::{DefaultHasher, Entry};
use std::collections::{BTreeMap, HashMap};
use std::hash::{Hash, Hasher};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Number of lock shards
const SHARD_COUNT: usize = 32;

type Shard = HashMap<CatalogKey, CatalogEntry>;

/// Thread-safe builder for a [`Catalog`]
#[derive(Debug)]
pub struct Aggregator {
    shards: Vec<Mutex<Shard>>,
    context_from_comment: bool,
    index_empty_msgids: bool,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Aggregator {
    /// Create an empty aggregator.
    ///
    /// `context_from_comment` makes the comment part of each entry's key.
    pub fn new(context_from_comment: bool) -> Self {
        Self {
            shards: (0..SHARD_COUNT).map(|_| Mutex::new(HashMap::new())).collect(),
            context_from_comment,
            index_empty_msgids: false,
        }
    }

    /// Whether nuggets with an empty msgid get an entry
    pub fn with_empty_msgids(mut self, index: bool) -> Self {
        self.index_empty_msgids = index;
        self
    }

    pub fn context_from_comment(&self) -> bool {
        self.context_from_comment
    }

    /// Record one occurrence of `nugget` at `path:line`.
    ///
    /// Safe to call from many threads at once. Returns `false` when the
    /// nugget was not indexed (empty msgid with indexing disabled).
    pub fn add_occurrence(&self, path: &str, line: usize, nugget: &Nugget) -> bool {
        if nugget.msgid.is_empty() && !self.index_empty_msgids {
            return false;
        }

        let msgid = normalize_msgid(&nugget.msgid);
        let comment = nugget.comment.as_deref();
        let key = CatalogKey::new(&msgid, comment, self.context_from_comment);
        let reference = format!("{}:{}", path, line);

        let mut shard = self.lock_shard(&key);
        match shard.entry(key) {
            Entry::Occupied(mut occupied) => occupied.get_mut().record(reference, comment),
            Entry::Vacant(vacant) => {
                let key = vacant.key().clone();
                vacant.insert(CatalogEntry::new(key, msgid, reference, comment));
            }
        }
        true
    }

    /// Fold everything collected by `other` into this aggregator
    pub fn merge(&self, other: Aggregator) {
        for shard in other.shards {
            for (key, entry) in shard.into_inner().unwrap_or_else(PoisonError::into_inner) {
                let mut target = self.lock_shard(&key);
                match target.entry(key) {
                    Entry::Occupied(mut occupied) => occupied.get_mut().absorb(entry),
                    Entry::Vacant(vacant) => {
                        vacant.insert(entry);
                    }
                }
            }
        }
    }

    /// Number of distinct keys collected so far
    pub fn len(&self) -> usize {
        self.shards
            .iter()
            .map(|s| s.lock().unwrap_or_else(PoisonError::into_inner).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Finish aggregation and produce the key-ordered catalog
    pub fn into_catalog(self) -> Catalog {
        let entries: BTreeMap<_, _> = self
            .shards
            .into_iter()
            .flat_map(|s| s.into_inner().unwrap_or_else(PoisonError::into_inner))
            .collect();
        Catalog::from_map(entries)
    }

    fn lock_shard(&self, key: &CatalogKey) -> MutexGuard<'_, Shard> {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        let index = (hasher.finish() as usize) % self.shards.len();
        // A panicking writer leaves at most its own occurrence half-applied.
        self.shards[index]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
