//! Export pipeline
//!
//! Renders a content tree into one of the supported output formats. Every
//! renderer is a pure function of its input: no shared state, no I/O, and the
//! same content always produces byte-identical output. A renderer returns a
//! complete buffer or an error, never a truncated artifact.
//!
//! - `plaintext`: text runs only, one line per block
//! - `html`: self-contained HTML document
//! - `docx`: page-oriented Office Open XML word-processing package

mod docx;
mod escape;
mod html;
mod plaintext;

use std::fmt;
use std::io;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::content::{Content, MAX_HEADING_LEVEL};
use crate::models::UNTITLED_DOCUMENT;

pub use docx::DocxRenderer;
pub use html::HtmlRenderer;
pub use plaintext::PlainTextRenderer;

/// Errors that can occur while rendering
#[derive(Error, Debug)]
pub enum ExportError {
    /// Node outside the supported vocabulary
    #[error("Unsupported node: {0}")]
    UnsupportedNode(String),

    /// Final buffer could not be assembled
    #[error("Failed to assemble {format} output: {source}")]
    RenderIo {
        format: ExportFormat,
        #[source]
        source: io::Error,
    },

    /// Unknown format name
    #[error("Unknown export format '{0}'. Expected one of: txt, html, page-document")]
    UnknownFormat(String),
}

pub type ExportResult<T> = Result<T, ExportError>;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportFormat {
    #[serde(rename = "txt")]
    PlainText,
    Html,
    PageDocument,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [
        ExportFormat::PlainText,
        ExportFormat::Html,
        ExportFormat::PageDocument,
    ];

    /// Canonical name, as accepted by `from_str`
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::PlainText => "txt",
            ExportFormat::Html => "html",
            ExportFormat::PageDocument => "page-document",
        }
    }

    /// File extension of the suggested filename
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::PlainText => "txt",
            ExportFormat::Html => "html",
            ExportFormat::PageDocument => "docx",
        }
    }

    /// MIME type of the rendered bytes
    pub fn media_type(&self) -> &'static str {
        match self {
            ExportFormat::PlainText => "text/plain; charset=utf-8",
            ExportFormat::Html => "text/html; charset=utf-8",
            ExportFormat::PageDocument => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    fn renderer(&self) -> &'static dyn Renderer {
        match self {
            ExportFormat::PlainText => &PlainTextRenderer,
            ExportFormat::Html => &HtmlRenderer,
            ExportFormat::PageDocument => &DocxRenderer,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "txt" | "text" | "plaintext" => Ok(ExportFormat::PlainText),
            "html" | "htm" => Ok(ExportFormat::Html),
            "page-document" | "docx" => Ok(ExportFormat::PageDocument),
            _ => Err(ExportError::UnknownFormat(s.to_string())),
        }
    }
}

/// A single output format
pub trait Renderer: Send + Sync {
    /// Format this renderer produces
    fn format(&self) -> ExportFormat;

    /// Render `content` with the given document title
    fn render(&self, content: &Content, title: &str) -> ExportResult<Vec<u8>>;
}

/// A rendered export, ready to be saved or sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub bytes: Vec<u8>,
    /// Suggested filename, with the format's extension
    pub filename: String,
    pub media_type: &'static str,
    pub format: ExportFormat,
}

/// Render `content` to `format`, titled after `filename`
pub fn export(content: &Content, filename: &str, format: ExportFormat) -> ExportResult<ExportedFile> {
    let title = document_title(filename);
    let bytes = format.renderer().render(content, &title)?;
    debug!(format = %format, bytes = bytes.len(), "Rendered export");

    Ok(ExportedFile {
        bytes,
        filename: suggested_filename(filename, format),
        media_type: format.media_type(),
        format,
    })
}

/// Title used inside exported documents
pub fn document_title(filename: &str) -> String {
    let trimmed = filename.trim();
    if trimmed.is_empty() {
        UNTITLED_DOCUMENT.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Filename to save an export under: path separators and control characters
/// replaced, format extension appended
pub fn suggested_filename(filename: &str, format: ExportFormat) -> String {
    let stem: String = document_title(filename)
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    format!("{}.{}", stem, format.extension())
}

/// Validated heading level
pub(crate) fn heading_level(level: u8) -> ExportResult<u8> {
    if (1..=MAX_HEADING_LEVEL).contains(&level) {
        Ok(level)
    } else {
        Err(ExportError::UnsupportedNode(format!("heading level {}", level)))
    }
}
