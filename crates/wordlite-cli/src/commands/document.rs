//! Document command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use wordlite_core::{AsyncDocumentService, Content};

use super::{confirm, read_content, resolve_document_id};
use crate::output::Output;

/// Create a document holding the starter content
pub async fn new(service: &AsyncDocumentService, name: Option<String>, output: &Output) -> Result<()> {
    let doc = service
        .create_document(name, Content::starter())
        .await
        .context("Failed to create document")?;

    output.success(&format!("Created document: {}", doc.id));
    output.print_document(&doc);
    Ok(())
}

/// Create a document from a content file or text
pub async fn create(
    service: &AsyncDocumentService,
    name: Option<String>,
    file: Option<PathBuf>,
    text: Option<String>,
    output: &Output,
) -> Result<()> {
    let Some(content) = read_content(file.as_deref(), text.as_deref())? else {
        bail!("No content given. Use --file or --text, or `wordlite new` for a starter document.");
    };

    let doc = service
        .create_document(name, content)
        .await
        .context("Failed to create document")?;

    output.success(&format!("Created document: {}", doc.id));
    output.print_document(&doc);
    Ok(())
}

/// List documents, most recently updated first
pub async fn list(
    service: &AsyncDocumentService,
    limit: Option<i64>,
    offset: Option<i64>,
    output: &Output,
) -> Result<()> {
    let docs = service.list_documents(limit, offset).await?;
    output.print_documents(&docs);
    Ok(())
}

/// Show a single document
pub async fn show(service: &AsyncDocumentService, id: String, output: &Output) -> Result<()> {
    let id = resolve_document_id(service, &id).await?;
    let doc = service.get_document(id).await?;
    output.print_document(&doc);
    Ok(())
}

/// Rename a document and/or replace its content
pub async fn update(
    service: &AsyncDocumentService,
    id: String,
    name: Option<String>,
    file: Option<PathBuf>,
    text: Option<String>,
    output: &Output,
) -> Result<()> {
    let id = resolve_document_id(service, &id).await?;
    let content = read_content(file.as_deref(), text.as_deref())?;

    let doc = service
        .update_document(id, name, content)
        .await
        .context("Failed to update document")?;

    output.success("Document updated");
    output.print_document(&doc);
    Ok(())
}

/// Delete a document
pub async fn delete(
    service: &AsyncDocumentService,
    id: String,
    yes: bool,
    output: &Output,
) -> Result<()> {
    let id = resolve_document_id(service, &id).await?;
    let doc = service.get_document(id.clone()).await?;

    // Confirm deletion
    if !yes && output.should_prompt() {
        println!("Delete document: {} - {}", doc.id.short(), doc.name);
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    if service.delete_document(id.clone()).await? {
        output.success(&format!("Deleted document: {}", id));
    } else {
        output.message(&format!("Document already deleted: {}", id));
    }
    Ok(())
}
