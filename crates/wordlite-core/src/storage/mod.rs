//! Storage layer
//!
//! Handles persistence of the document collection.
//!
//! ## Architecture
//!
//! - **Collection file**: source of truth, one JSON file rewritten atomically
//! - **Write lock**: OS advisory lock on `documents.lock`, shared by every
//!   handle and process writing the same collection
//! - **Record cache**: bounded in-memory copies of recently read records,
//!   invalidated on every write and whenever the file's stamp changes
//!
//! The `Store` in `crate::store` combines them.

pub mod cache;
pub mod error;
pub mod persistence;

pub use cache::RecordCache;
pub use error::{StorageError, StorageResult};
pub use persistence::{CollectionFile, FileStamp, COLLECTION_VERSION};
