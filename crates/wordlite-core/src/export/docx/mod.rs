//! Page-document renderer
//!
//! Writes an Office Open XML word-processing package (`.docx`): a zip archive
//! of XML parts. Pages are US Letter with 1-inch margins. Zip entries carry a
//! fixed timestamp and the core properties carry none, so rendering the same
//! content twice yields identical bytes.

mod body;
mod parts;

use std::io::{self, Cursor, Write};

use zip::write::FileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use super::{ExportError, ExportFormat, ExportResult, Renderer};
use crate::content::Content;

pub struct DocxRenderer;

impl Renderer for DocxRenderer {
    fn format(&self) -> ExportFormat {
        ExportFormat::PageDocument
    }

    fn render(&self, content: &Content, title: &str) -> ExportResult<Vec<u8>> {
        let body = body::render_document(content)?;
        package(title, &body).map_err(|source| ExportError::RenderIo {
            format: ExportFormat::PageDocument,
            source,
        })
    }
}

fn package(title: &str, body: &body::RenderedBody) -> io::Result<Vec<u8>> {
    let mut extensions: Vec<&str> = body.media.iter().map(|m| m.extension).collect();
    extensions.sort_unstable();
    extensions.dedup();

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default());

    let entries: [(&str, String); 8] = [
        ("[Content_Types].xml", parts::content_types(&extensions)),
        ("_rels/.rels", parts::package_relationships()),
        ("docProps/core.xml", parts::core_properties(title)),
        ("docProps/app.xml", parts::app_properties()),
        ("word/document.xml", body.document_xml.clone()),
        ("word/styles.xml", parts::styles()),
        ("word/numbering.xml", parts::numbering(&body.numbering)),
        (
            "word/_rels/document.xml.rels",
            parts::document_relationships(&body.relationships),
        ),
    ];
    for (name, xml) in &entries {
        add_entry(&mut zip, options, name, xml.as_bytes())?;
    }
    for media in &body.media {
        let name = format!("word/media/{}", media.file_name);
        add_entry(&mut zip, options, &name, &media.bytes)?;
    }

    let cursor = zip.finish().map_err(zip_error)?;
    Ok(cursor.into_inner())
}

fn add_entry(
    zip: &mut ZipWriter<Cursor<Vec<u8>>>,
    options: FileOptions,
    name: &str,
    bytes: &[u8],
) -> io::Result<()> {
    zip.start_file(name, options).map_err(zip_error)?;
    zip.write_all(bytes)
}

fn zip_error(err: zip::result::ZipError) -> io::Error {
    io::Error::new(io::ErrorKind::Other, err)
}
