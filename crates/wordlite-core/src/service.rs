//! Document service
//!
//! The operation surface callers program against. `DocumentService` wraps the
//! store and the export pipeline, accepts ids as strings, and translates
//! every lower-level failure into a `ServiceError` with a stable kind.
//! `AsyncDocumentService` exposes the same operations to async callers by
//! running them on tokio's blocking pool.

use std::io;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::config::Config;
use crate::content::Content;
use crate::document_id::DocumentId;
use crate::export::{self, ExportError, ExportFormat, ExportedFile};
use crate::models::{DocumentRecord, DocumentSummary};
use crate::storage::StorageError;
use crate::store::{Pagination, Store, StoreError};

/// Errors surfaced to callers of the service
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Caller input violates a precondition
    #[error("{0}")]
    Validation(String),

    /// Referenced document does not exist
    #[error("Document not found: {0}")]
    NotFound(String),

    /// Durable storage could not be read or written
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Content holds a node the requested format cannot render
    #[error("Unsupported node: {0}")]
    UnsupportedNode(String),

    /// Rendered output could not be assembled
    #[error("Failed to render {format}: {source}")]
    RenderIo {
        format: ExportFormat,
        #[source]
        source: io::Error,
    },

    /// The worker running the operation stopped before returning
    #[error("Operation interrupted: {0}")]
    Interrupted(String),
}

/// Stable classification of a `ServiceError`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    StorageIo,
    UnsupportedNode,
    RenderIo,
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Validation(_) => ErrorKind::Validation,
            ServiceError::NotFound(_) => ErrorKind::NotFound,
            ServiceError::Storage(_) | ServiceError::Interrupted(_) => ErrorKind::StorageIo,
            ServiceError::UnsupportedNode(_) => ErrorKind::UnsupportedNode,
            ServiceError::RenderIo { .. } => ErrorKind::RenderIo,
        }
    }

    /// HTTP-style status code for this error
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::NotFound => 404,
            ErrorKind::Validation => 400,
            ErrorKind::StorageIo | ErrorKind::UnsupportedNode | ErrorKind::RenderIo => 500,
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(err) => ServiceError::Validation(err.to_string()),
            StoreError::NotFound(id) => ServiceError::NotFound(id.to_string()),
            StoreError::Storage(err) => ServiceError::Storage(err),
        }
    }
}

impl From<ExportError> for ServiceError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::UnsupportedNode(node) => ServiceError::UnsupportedNode(node),
            ExportError::RenderIo { format, source } => ServiceError::RenderIo { format, source },
            err @ ExportError::UnknownFormat(_) => ServiceError::Validation(err.to_string()),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Synchronous facade over the store and the export pipeline
///
/// `Send + Sync`; share it behind an `Arc`.
pub struct DocumentService {
    store: Store,
}

impl DocumentService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Open the store described by `config`
    pub fn open_with_config(config: Config) -> ServiceResult<Self> {
        Ok(Self::new(Store::open_with_config(config)?))
    }

    /// List summaries, most recently updated first
    ///
    /// Missing values default to a limit of 100 and an offset of 0; negative
    /// values are treated as 0.
    pub fn list_documents(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> ServiceResult<Vec<DocumentSummary>> {
        Ok(self.store.list(Pagination::from_raw(limit, offset))?)
    }

    pub fn create_document(
        &self,
        name: Option<&str>,
        content: Content,
    ) -> ServiceResult<DocumentRecord> {
        Ok(self.store.create(name, content)?)
    }

    pub fn get_document(&self, id: &str) -> ServiceResult<DocumentRecord> {
        let parsed = parse_id(id).ok_or_else(|| ServiceError::NotFound(id.to_string()))?;
        self.store
            .get(&parsed)?
            .ok_or_else(|| ServiceError::NotFound(id.to_string()))
    }

    /// Merge the given fields into an existing document
    pub fn update_document(
        &self,
        id: &str,
        name: Option<&str>,
        content: Option<Content>,
    ) -> ServiceResult<DocumentRecord> {
        let parsed = parse_id(id).ok_or_else(|| ServiceError::NotFound(id.to_string()))?;
        Ok(self.store.update(&parsed, name, content)?)
    }

    /// Returns `false` when no such document exists
    pub fn delete_document(&self, id: &str) -> ServiceResult<bool> {
        match parse_id(id) {
            Some(parsed) => Ok(self.store.delete(&parsed)?),
            None => {
                debug!(id, "Delete with unparseable id");
                Ok(false)
            }
        }
    }

    /// Render caller-supplied content; nothing is read from or written to the store
    pub fn export_document(
        &self,
        content: &Content,
        filename: &str,
        format: ExportFormat,
    ) -> ServiceResult<ExportedFile> {
        Ok(export::export(content, filename, format)?)
    }

    /// Render a stored document, titled and named after it
    pub fn export_stored_document(
        &self,
        id: &str,
        format: ExportFormat,
    ) -> ServiceResult<ExportedFile> {
        let record = self.get_document(id)?;
        self.export_document(&record.content, &record.name, format)
    }

    /// Ids of stored documents matching a full id or id prefix
    pub fn resolve_id(&self, id_or_prefix: &str) -> ServiceResult<Vec<DocumentId>> {
        Ok(self.store.resolve_id(id_or_prefix)?)
    }
}

fn parse_id(id: &str) -> Option<DocumentId> {
    id.parse().ok()
}

/// Async adapter running each `DocumentService` operation on the blocking pool
///
/// Dropping a returned future abandons the result only; an operation that
/// already started runs to completion.
#[derive(Clone)]
pub struct AsyncDocumentService {
    inner: Arc<DocumentService>,
}

impl AsyncDocumentService {
    pub fn new(service: DocumentService) -> Self {
        Self {
            inner: Arc::new(service),
        }
    }

    async fn run<T, F>(&self, op: F) -> ServiceResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&DocumentService) -> ServiceResult<T> + Send + 'static,
    {
        let service = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || op(&service))
            .await
            .map_err(|err| ServiceError::Interrupted(err.to_string()))?
    }

    pub async fn list_documents(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> ServiceResult<Vec<DocumentSummary>> {
        self.run(move |s| s.list_documents(limit, offset)).await
    }

    pub async fn create_document(
        &self,
        name: Option<String>,
        content: Content,
    ) -> ServiceResult<DocumentRecord> {
        self.run(move |s| s.create_document(name.as_deref(), content))
            .await
    }

    pub async fn get_document(&self, id: String) -> ServiceResult<DocumentRecord> {
        self.run(move |s| s.get_document(&id)).await
    }

    pub async fn update_document(
        &self,
        id: String,
        name: Option<String>,
        content: Option<Content>,
    ) -> ServiceResult<DocumentRecord> {
        self.run(move |s| s.update_document(&id, name.as_deref(), content))
            .await
    }

    pub async fn delete_document(&self, id: String) -> ServiceResult<bool> {
        self.run(move |s| s.delete_document(&id)).await
    }

    pub async fn export_document(
        &self,
        content: Content,
        filename: String,
        format: ExportFormat,
    ) -> ServiceResult<ExportedFile> {
        self.run(move |s| s.export_document(&content, &filename, format))
            .await
    }

    pub async fn export_stored_document(
        &self,
        id: String,
        format: ExportFormat,
    ) -> ServiceResult<ExportedFile> {
        self.run(move |s| s.export_stored_document(&id, format))
            .await
    }

    pub async fn resolve_id(&self, id_or_prefix: String) -> ServiceResult<Vec<DocumentId>> {
        self.run(move |s| s.resolve_id(&id_or_prefix)).await
    }
}
