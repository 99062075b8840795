//! Document collection persistence
//!
//! The whole collection lives in one JSON file and is rewritten in full on
//! every change. Writes are atomic (write to a fresh temp file, sync, then
//! rename) so a reader never sees a partially written collection.
//!
//! Writers in different processes, or different `Store` handles in one
//! process, serialize on an OS advisory lock taken on a sidecar
//! `documents.lock` file.
//!
//! Storage location: `~/.local/share/wordlite/documents.json` (configurable
//! via `Config`)

use std::fs::{self, Metadata, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use fd_lock::RwLock;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use super::error::{StorageError, StorageResult};
use crate::models::DocumentRecord;

/// Version written into the collection file
pub const COLLECTION_VERSION: u32 = 1;

#[derive(Deserialize)]
struct StoredCollection {
    version: u32,
    #[serde(default)]
    documents: Vec<DocumentRecord>,
}

#[derive(Serialize)]
struct StoredCollectionRef<'a> {
    version: u32,
    documents: &'a [DocumentRecord],
}

/// Identity of one version of the collection file
///
/// Every save renames a new file into place, so any write from any handle
/// changes the stamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStamp {
    len: u64,
    modified: Option<SystemTime>,
    #[cfg(unix)]
    inode: u64,
}

impl FileStamp {
    fn of(meta: &Metadata) -> Self {
        #[cfg(unix)]
        use std::os::unix::fs::MetadataExt;

        Self {
            len: meta.len(),
            modified: meta.modified().ok(),
            #[cfg(unix)]
            inode: meta.ino(),
        }
    }
}

/// Reads and writes the document collection file
#[derive(Debug, Clone)]
pub struct CollectionFile {
    path: PathBuf,
}

impl CollectionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the collection file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the sidecar file writers lock
    pub fn lock_path(&self) -> PathBuf {
        self.path.with_extension("lock")
    }

    /// Stamp of the file as it is on disk now
    ///
    /// `None` when the file is missing or can't be inspected.
    pub fn stamp(&self) -> Option<FileStamp> {
        fs::metadata(&self.path).ok().map(|meta| FileStamp::of(&meta))
    }

    /// Run `f` holding the exclusive write lock on the collection
    ///
    /// Blocks until every other holder, in this process or another, has
    /// released it. The lock is dropped when `f` returns.
    pub fn with_write_lock<T, E>(&self, f: impl FnOnce() -> Result<T, E>) -> Result<T, E>
    where
        E: From<StorageError>,
    {
        let lock_path = self.lock_path();
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| StorageError::from_io(e, lock_path.clone()))?;

        let mut lock = RwLock::new(file);
        let _guard = lock.write().map_err(|source| StorageError::Lock {
            path: lock_path.clone(),
            source,
        })?;
        f()
    }

    /// Load every record
    ///
    /// A missing file is an empty collection. A file that exists but can't be
    /// read or parsed is an error.
    pub fn load(&self) -> StorageResult<Vec<DocumentRecord>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::from_read_io(e, self.path.clone())),
        };

        let stored: StoredCollection = serde_json::from_slice(&bytes).map_err(|e| {
            warn!(path = ?self.path, error = %e, "Document collection is unreadable");
            StorageError::InvalidFormat {
                path: self.path.clone(),
                details: e.to_string(),
            }
        })?;

        if stored.version > COLLECTION_VERSION {
            return Err(StorageError::UnsupportedVersion {
                path: self.path.clone(),
                found: stored.version,
                expected: COLLECTION_VERSION,
            });
        }

        debug!(path = ?self.path, count = stored.documents.len(), "Loaded document collection");
        Ok(stored.documents)
    }

    /// Replace the collection on disk with `documents`
    ///
    /// Callers racing other writers must hold `with_write_lock` across their
    /// load and save.
    pub fn save(&self, documents: &[DocumentRecord]) -> StorageResult<()> {
        let stored = StoredCollectionRef {
            version: COLLECTION_VERSION,
            documents,
        };
        let bytes = serde_json::to_vec_pretty(&stored).map_err(StorageError::Serialize)?;

        atomic_write(&self.path, &bytes)?;
        debug!(path = ?self.path, count = documents.len(), "Persisted document collection");
        Ok(())
    }
}

/// Write data to a file atomically
///
/// 1. Write to a uniquely named temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
///
/// The target file is never left in a partially-written state. On failure the
/// temp file is removed and the target keeps its previous contents.
pub(crate) fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|source| StorageError::CreateDirectory {
        path: dir.to_path_buf(),
        source,
    })?;

    // Same directory as the target so the rename stays on one filesystem
    let mut temp =
        NamedTempFile::new_in(dir).map_err(|e| StorageError::from_io(e, dir.to_path_buf()))?;
    let temp_path = temp.path().to_path_buf();

    // Dropping `temp` on any error path removes it
    write_and_sync(&mut temp, data).map_err(|e| StorageError::from_io(e, temp_path.clone()))?;
    temp.persist(path).map_err(|err| StorageError::AtomicWriteFailed {
        from: temp_path,
        to: path.to_path_buf(),
        source: err.error,
    })?;

    Ok(())
}

fn write_and_sync(temp: &mut NamedTempFile, data: &[u8]) -> io::Result<()> {
    temp.write_all(data)?;
    temp.as_file().sync_all()
}
