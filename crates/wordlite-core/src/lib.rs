//! wordlite core library
//!
//! This crate provides the core functionality for wordlite, a small
//! rich-text document store with export to plain text, HTML and
//! page-oriented word-processing documents (`.docx`).
//!
//! # Architecture
//!
//! - **Store**: one JSON collection file, rewritten atomically on every
//!   change; mutations are serialized, reads see whole snapshots
//! - **Export**: stateless renderers, one per format, deterministic output
//! - **Service**: string-id facade with a stable error taxonomy, plus an
//!   async adapter
//!
//! # Quick Start
//!
//! ```text
//! let service = DocumentService::open_with_config(Config::load()?)?;
//!
//! let doc = service.create_document(Some("Report"), Content::starter())?;
//! let file = service.export_stored_document(&doc.id.to_string(), ExportFormat::PageDocument)?;
//! std::fs::write(&file.filename, &file.bytes)?;
//! ```
//!
//! # Modules
//!
//! - `service`: Operation surface (main entry point)
//! - `store`: Durable, concurrency-safe document store
//! - `content`: Rich content tree and validation
//! - `export`: Renderers and the export entry point
//! - `models`: Stored records and listing summaries
//! - `document_id`: Document identifiers
//! - `storage`: Collection file persistence and record cache
//! - `config`: Application configuration

pub mod config;
pub mod content;
pub mod document_id;
pub mod export;
pub mod models;
pub mod service;
pub mod storage;
pub mod store;

pub use config::Config;
pub use content::{Alignment, Block, Content, ContentError, Inline, ListItem, Marks};
pub use document_id::{DocumentId, DocumentIdError};
pub use export::{ExportError, ExportFormat, ExportedFile, Renderer};
pub use models::{DocumentRecord, DocumentSummary, UNTITLED_DOCUMENT};
pub use service::{AsyncDocumentService, DocumentService, ErrorKind, ServiceError};
pub use storage::StorageError;
pub use store::{Pagination, Store, StoreError};
