//! Bounded record cache
//!
//! Holds recently read records so `get` can skip loading the collection file.
//! The cache is owned by the store and only ever touched under its mutex.
//!
//! Every write bumps `generation`. A reader notes the generation before it
//! loads the file and may only insert what it read if no write happened in
//! between, so a stale record can never land in the cache after a write.
//!
//! Writes from other handles on the same file never pass through this cache.
//! It remembers the `FileStamp` its entries were read under and drops them all
//! once the file on disk carries a different one.

use std::collections::{HashMap, VecDeque};

use super::persistence::FileStamp;
use crate::document_id::DocumentId;
use crate::models::DocumentRecord;

#[derive(Debug)]
pub struct RecordCache {
    capacity: usize,
    entries: HashMap<DocumentId, DocumentRecord>,
    /// Least recently used at the front
    order: VecDeque<DocumentId>,
    generation: u64,
    /// File version the entries were read from
    stamp: Option<FileStamp>,
}

impl RecordCache {
    /// Create a cache holding at most `capacity` records (0 disables it)
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            generation: 0,
            stamp: None,
        }
    }

    /// Current write generation
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Check the entries against the file's current stamp
    ///
    /// Clears everything (bumping the generation) unless `stamp` is the one the
    /// entries were read under. An unknown stamp never matches.
    pub fn sync(&mut self, stamp: Option<FileStamp>) {
        if stamp.is_none() || stamp != self.stamp {
            self.clear();
            self.stamp = stamp;
        }
    }

    /// Adopt the stamp of a file this handle just wrote
    ///
    /// Call after `sync` with the pre-write stamp so entries from before the
    /// write carry over.
    pub fn advance(&mut self, stamp: Option<FileStamp>) {
        self.stamp = stamp;
    }

    /// Copy of the cached record, marking it most recently used
    pub fn get(&mut self, id: &DocumentId) -> Option<DocumentRecord> {
        let record = self.entries.get(id)?.clone();
        self.touch(id);
        Some(record)
    }

    /// Insert a record read from disk, unless a write happened since `seen_generation`
    pub fn insert_if_current(&mut self, record: DocumentRecord, seen_generation: u64) -> bool {
        if seen_generation != self.generation {
            return false;
        }
        self.put(record);
        true
    }

    /// Record a write to `id`: bumps the generation and drops the entry
    pub fn invalidate(&mut self, id: &DocumentId) {
        self.generation = self.generation.wrapping_add(1);
        if self.entries.remove(id).is_some() {
            self.order.retain(|entry| entry != id);
        }
    }

    /// Insert or replace a record, evicting the least recently used one when full
    pub fn put(&mut self, record: DocumentRecord) {
        if self.capacity == 0 {
            return;
        }

        let id = record.id;
        if self.entries.insert(id, record).is_some() {
            self.touch(&id);
            return;
        }

        self.order.push_back(id);
        while self.entries.len() > self.capacity {
            match self.order.pop_front() {
                Some(evicted) => {
                    self.entries.remove(&evicted);
                }
                None => break,
            }
        }
    }

    fn clear(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.entries.clear();
        self.order.clear();
    }

    fn touch(&mut self, id: &DocumentId) {
        if let Some(pos) = self.order.iter().position(|entry| entry == id) {
            self.order.remove(pos);
        }
        self.order.push_back(*id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Content;
    use crate::storage::CollectionFile;
    use chrono::Utc;
    use tempfile::TempDir;

    fn record(name: &str) -> DocumentRecord {
        DocumentRecord::new(name, Content::starter(), Utc::now())
    }

    #[test]
    fn test_put_and_get() {
        let mut cache = RecordCache::new(4);
        let doc = record("a");
        cache.put(doc.clone());

        assert_eq!(cache.get(&doc.id), Some(doc));
        assert_eq!(cache.entries.len(), 1);
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let mut cache = RecordCache::new(2);
        let a = record("a");
        let b = record("b");
        let c = record("c");

        cache.put(a.clone());
        cache.put(b.clone());
        // Touch a so b becomes the eviction candidate
        cache.get(&a.id);
        cache.put(c.clone());

        assert_eq!(cache.entries.len(), 2);
        assert!(cache.get(&a.id).is_some());
        assert!(cache.get(&b.id).is_none());
        assert!(cache.get(&c.id).is_some());
    }

    #[test]
    fn test_zero_capacity_disables_cache() {
        let mut cache = RecordCache::new(0);
        let doc = record("a");
        cache.put(doc.clone());

        assert!(cache.entries.is_empty());
        assert!(cache.get(&doc.id).is_none());
    }

    #[test]
    fn test_invalidate_drops_entry_and_bumps_generation() {
        let mut cache = RecordCache::new(4);
        let doc = record("a");
        cache.put(doc.clone());
        let before = cache.generation();

        cache.invalidate(&doc.id);

        assert!(cache.get(&doc.id).is_none());
        assert_eq!(cache.generation(), before + 1);
    }

    #[test]
    fn test_stale_insert_is_refused() {
        let mut cache = RecordCache::new(4);
        let doc = record("a");
        let seen = cache.generation();

        // A write lands between the reader's load and its insert
        cache.invalidate(&doc.id);

        assert!(!cache.insert_if_current(doc.clone(), seen));
        assert!(cache.get(&doc.id).is_none());

        let seen = cache.generation();
        assert!(cache.insert_if_current(doc.clone(), seen));
        assert_eq!(cache.get(&doc.id), Some(doc));
    }

    #[test]
    fn test_sync_drops_entries_from_another_file_version() {
        let temp_dir = TempDir::new().unwrap();
        let file = CollectionFile::new(temp_dir.path().join("documents.json"));
        let doc = record("a");

        file.save(&[doc.clone()]).unwrap();
        let mut cache = RecordCache::new(4);
        cache.sync(file.stamp());
        cache.put(doc.clone());

        // Unchanged file keeps the entry
        cache.sync(file.stamp());
        assert!(cache.get(&doc.id).is_some());

        // Another handle rewrites the file
        let seen = cache.generation();
        file.save(&[]).unwrap();
        cache.sync(file.stamp());
        assert!(cache.entries.is_empty());
        assert!(!cache.insert_if_current(doc, seen));
    }

    #[test]
    fn test_advance_keeps_entries_across_own_write() {
        let temp_dir = TempDir::new().unwrap();
        let file = CollectionFile::new(temp_dir.path().join("documents.json"));
        let kept = record("kept");
        let written = record("written");

        file.save(&[kept.clone()]).unwrap();
        let mut cache = RecordCache::new(4);
        cache.sync(file.stamp());
        cache.put(kept.clone());

        let before = file.stamp();
        file.save(&[kept.clone(), written.clone()]).unwrap();
        cache.sync(before);
        cache.invalidate(&written.id);
        cache.advance(file.stamp());
        cache.put(written.clone());

        cache.sync(file.stamp());
        assert_eq!(cache.get(&kept.id), Some(kept));
        assert_eq!(cache.get(&written.id), Some(written));
    }

    #[test]
    fn test_unknown_stamp_never_matches() {
        let mut cache = RecordCache::new(4);
        let doc = record("a");
        cache.put(doc.clone());

        cache.sync(None);
        assert!(cache.get(&doc.id).is_none());
    }

    #[test]
    fn test_replacing_entry_keeps_size() {
        let mut cache = RecordCache::new(2);
        let mut doc = record("a");
        cache.put(doc.clone());
        doc.name = "renamed".to_string();
        cache.put(doc.clone());

        assert_eq!(cache.entries.len(), 1);
        assert_eq!(cache.get(&doc.id).unwrap().name, "renamed");
    }
}
