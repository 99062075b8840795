//! Document store
//!
//! The `Store` owns the document collection file and serializes every change
//! to it. Each mutation is one critical section:
//!
//! 1. take the handle's write mutex, then the file's exclusive lock
//! 2. load the full collection from disk
//! 3. apply the change
//! 4. write the full collection back atomically
//! 5. update the record cache, then release both locks
//!
//! The file lock makes this hold across every `Store` opened on the same data
//! directory, in this process or another.
//!
//! Reads take no write lock. They load the atomically replaced file (or hit
//! the cache), so they see the collection either before or after any given
//! write, never in between. The cache is checked against the file's stamp on
//! every read, so writes made through another handle are never hidden.
//!
//! ## Usage
//!
//! ```ignore
//! let store = Store::open_with_config(Config::load()?)?;
//!
//! let doc = store.create(Some("Report"), Content::starter())?;
//! let loaded = store.get(&doc.id)?;
//! let page = store.list(Pagination::default())?;
//! ```

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::Config;
use crate::content::{Content, ContentError};
use crate::document_id::DocumentId;
use crate::models::{normalize_name, DocumentRecord, DocumentSummary};
use crate::storage::{CollectionFile, FileStamp, RecordCache, StorageError};

/// Listing page size used when none is given
pub const DEFAULT_LIST_LIMIT: usize = 100;

/// Errors returned by store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Caller input violates a precondition
    #[error(transparent)]
    Validation(#[from] ContentError),

    /// No record with this id
    #[error("Document not found: {0}")]
    NotFound(DocumentId),

    /// The collection file could not be read or written
    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Offset/limit window over a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: usize,
    pub offset: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIST_LIMIT,
            offset: 0,
        }
    }
}

impl Pagination {
    /// Build from raw caller input: missing values take the defaults and
    /// negative values are treated as zero
    pub fn from_raw(limit: Option<i64>, offset: Option<i64>) -> Self {
        let clamp = |value: i64| usize::try_from(value.max(0)).unwrap_or(usize::MAX);
        Self {
            limit: limit.map(clamp).unwrap_or(DEFAULT_LIST_LIMIT),
            offset: offset.map(clamp).unwrap_or(0),
        }
    }
}

/// Durable, concurrency-safe document store
///
/// `Store` is `Send + Sync`; share it between threads behind an `Arc`.
pub struct Store {
    /// Backing collection file
    file: CollectionFile,
    /// Serializes this handle's load-mutate-persist cycles
    write_lock: Mutex<()>,
    /// Recently read records
    cache: Mutex<RecordCache>,
}

impl Store {
    /// Open the store with a specific configuration
    ///
    /// Creates the data directory if needed and checks the existing
    /// collection (if any) can be read.
    pub fn open_with_config(config: Config) -> Result<Self, StorageError> {
        std::fs::create_dir_all(&config.data_dir).map_err(|source| {
            StorageError::CreateDirectory {
                path: config.data_dir.clone(),
                source,
            }
        })?;

        let file = CollectionFile::new(config.documents_path());
        let existing = file.load()?;
        info!(
            path = ?file.path(),
            documents = existing.len(),
            cache_capacity = config.cache_capacity,
            "Opened document store"
        );

        Ok(Self {
            file,
            write_lock: Mutex::new(()),
            cache: Mutex::new(RecordCache::new(config.cache_capacity)),
        })
    }

    // ==================== Mutations ====================

    /// Create a new document
    ///
    /// A blank or missing name becomes "Untitled Document". Fails with
    /// `StoreError::Validation` if the content is empty or malformed.
    pub fn create(&self, name: Option<&str>, content: Content) -> StoreResult<DocumentRecord> {
        content.validate()?;
        let record = DocumentRecord::new(normalize_name(name), content, Utc::now());

        self.exclusive(|| {
            let before = self.file.stamp();
            let mut documents = self.file.load()?;
            documents.push(record.clone());
            self.file.save(&documents)?;
            self.remember_write(before, &record.id, Some(&record));
            Ok(())
        })?;

        info!(id = %record.id, name = %record.name, "Created document");
        Ok(record)
    }

    /// Update an existing document
    ///
    /// Fields left as `None` keep their current value. `updated_at` is always
    /// refreshed, even when both fields are omitted.
    pub fn update(
        &self,
        id: &DocumentId,
        name: Option<&str>,
        content: Option<Content>,
    ) -> StoreResult<DocumentRecord> {
        if let Some(content) = &content {
            content.validate()?;
        }

        let updated = self.exclusive(|| {
            let before = self.file.stamp();
            let mut documents = self.file.load()?;
            let record = documents
                .iter_mut()
                .find(|doc| doc.id == *id)
                .ok_or(StoreError::NotFound(*id))?;

            if let Some(name) = name {
                record.name = normalize_name(Some(name));
            }
            if let Some(content) = content {
                record.content = content;
            }
            record.updated_at = next_timestamp(record.updated_at);
            let updated = record.clone();

            self.file.save(&documents)?;
            self.remember_write(before, id, Some(&updated));
            Ok(updated)
        })?;

        info!(id = %id, "Updated document");
        Ok(updated)
    }

    /// Delete a document
    ///
    /// Returns whether a record was removed. Deleting a missing id is not an
    /// error and leaves the file untouched.
    pub fn delete(&self, id: &DocumentId) -> StoreResult<bool> {
        let removed = self.exclusive(|| {
            let before = self.file.stamp();
            let mut documents = self.file.load()?;
            let count = documents.len();
            documents.retain(|doc| doc.id != *id);
            if documents.len() == count {
                return Ok(false);
            }

            self.file.save(&documents)?;
            self.remember_write(before, id, None);
            Ok(true)
        })?;

        if removed {
            info!(id = %id, "Deleted document");
        } else {
            debug!(id = %id, "Delete of missing document");
        }
        Ok(removed)
    }

    // ==================== Queries ====================

    /// Get a copy of a document by id
    pub fn get(&self, id: &DocumentId) -> StoreResult<Option<DocumentRecord>> {
        let stamp = self.file.stamp();
        let seen_generation = {
            let mut cache = lock(&self.cache);
            cache.sync(stamp);
            if let Some(record) = cache.get(id) {
                debug!(id = %id, "Document cache hit");
                return Ok(Some(record));
            }
            cache.generation()
        };

        debug!(id = %id, "Document cache miss");
        let found = self.file.load()?.into_iter().find(|doc| doc.id == *id);
        if let Some(record) = &found {
            lock(&self.cache).insert_if_current(record.clone(), seen_generation);
        }
        Ok(found)
    }

    /// List document summaries, most recently updated first
    pub fn list(&self, page: Pagination) -> StoreResult<Vec<DocumentSummary>> {
        let mut documents = self.file.load()?;
        documents.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        Ok(documents
            .iter()
            .skip(page.offset)
            .take(page.limit)
            .map(DocumentRecord::summary)
            .collect())
    }

    /// Resolve a full id or unique id prefix to a stored document id
    pub fn resolve_id(&self, id_or_prefix: &str) -> StoreResult<Vec<DocumentId>> {
        let needle = id_or_prefix.trim().to_lowercase();
        if let Ok(id) = needle.parse::<DocumentId>() {
            return Ok(vec![id]);
        }
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .file
            .load()?
            .into_iter()
            .map(|doc| doc.id)
            .filter(|id| id.to_string().starts_with(&needle))
            .collect())
    }

    /// Run one load-mutate-persist cycle under both write locks
    fn exclusive<T>(&self, cycle: impl FnOnce() -> StoreResult<T>) -> StoreResult<T> {
        let _guard = lock(&self.write_lock);
        self.file.with_write_lock(cycle)
    }

    /// Update the cache after a successful write, still inside the write lock
    ///
    /// `before` is the file's stamp when the cycle loaded it. Entries older
    /// than that came from a file another handle has since replaced.
    fn remember_write(
        &self,
        before: Option<FileStamp>,
        id: &DocumentId,
        record: Option<&DocumentRecord>,
    ) {
        let after = self.file.stamp();
        let mut cache = lock(&self.cache);
        cache.sync(before);
        cache.invalidate(id);
        cache.advance(after);
        if let Some(record) = record {
            cache.put(record.clone());
        }
    }
}

/// Lock a mutex, recovering the guard if a previous holder panicked
///
/// Neither guarded value carries state that a panic could leave half-updated:
/// the write mutex guards nothing, and the cache is only a copy of the file.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Current time, forced strictly after `previous`
fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::nanoseconds(1)
    }
}
