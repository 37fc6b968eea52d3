//! The ordered include list.
//!
//! An [`IncludeList`] is the set of files the exported runtime must load,
//! in dependency order: runtime core before renderer, renderer before
//! generated game code. Order is load order. Each entry may carry a
//! content hash so long-lived preview sessions can diff successive
//! exports file by file.

use std::collections::{BTreeMap, HashSet};

use sha2::{Digest, Sha256};

/// Stable 8-byte content hash used for include-file change detection.
pub fn content_hash(text: &str) -> u64 {
    let digest = Sha256::digest(text.as_bytes());
    u64::from_be_bytes(digest[..8].try_into().unwrap())
}

#[derive(Debug, Clone)]
pub struct IncludeEntry {
    pub path: String,
    pub hash: Option<u64>,
}

/// Ordered, deduplicated list of include-file paths.
///
/// Owned by exactly one export operation; never shared across concurrent
/// exports.
#[derive(Debug, Default, Clone)]
pub struct IncludeList {
    entries: Vec<IncludeEntry>,
    seen: HashSet<String>,
}

impl IncludeList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a path. Duplicates are ignored — the first occurrence wins
    /// and keeps its position.
    pub fn push(&mut self, path: impl Into<String>) -> bool {
        self.push_entry(path.into(), None)
    }

    /// Append a path together with its content hash.
    pub fn push_hashed(&mut self, path: impl Into<String>, hash: u64) -> bool {
        self.push_entry(path.into(), Some(hash))
    }

    fn push_entry(&mut self, path: String, hash: Option<u64>) -> bool {
        if !self.seen.insert(path.clone()) {
            return false;
        }
        self.entries.push(IncludeEntry { path, hash });
        true
    }

    pub fn extend<I, S>(&mut self, paths: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for p in paths {
            self.push(p);
        }
    }

    /// Remove every entry the predicate matches, preserving the relative
    /// order of what remains.
    pub fn remove_where(&mut self, mut predicate: impl FnMut(&str) -> bool) {
        self.entries.retain(|e| {
            if predicate(&e.path) {
                self.seen.remove(&e.path);
                false
            } else {
                true
            }
        });
    }

    /// Rewrite one entry's path in place (position preserved). Used when
    /// the merger relocates an absolute source into the export tree.
    pub fn rewrite(&mut self, old: &str, new: impl Into<String>) {
        let new = new.into();
        if let Some(entry) = self.entries.iter_mut().find(|e| e.path == old) {
            self.seen.remove(old);
            self.seen.insert(new.clone());
            entry.path = new;
        }
    }

    /// Record the content hash for an existing entry.
    pub fn set_hash(&mut self, path: &str, hash: u64) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.path == path) {
            entry.hash = Some(hash);
        }
    }

    /// Drop every entry and replace the list with a single artifact path.
    pub fn replace_with_single(&mut self, path: impl Into<String>, hash: Option<u64>) {
        let path = path.into();
        self.entries.clear();
        self.seen.clear();
        self.seen.insert(path.clone());
        self.entries.push(IncludeEntry { path, hash });
    }

    pub fn contains(&self, path: &str) -> bool {
        self.seen.contains(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &IncludeEntry> {
        self.entries.iter()
    }

    /// Paths only, in list order.
    pub fn paths(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.path.as_str()).collect()
    }

    /// Path→hash map for every entry that has one, sorted by path.
    pub fn hashes(&self) -> BTreeMap<String, u64> {
        self.entries
            .iter()
            .filter_map(|e| e.hash.map(|h| (e.path.clone(), h)))
            .collect()
    }
}
