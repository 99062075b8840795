//! Export command handler

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use wordlite_core::{AsyncDocumentService, Config, ExportFormat, ExportedFile};

use super::{read_content, resolve_document_id};
use crate::output::Output;

/// What to export
pub enum Source {
    /// A stored document, by id or prefix
    Stored(String),
    /// A content file, titled with `name` (or the file stem)
    File { path: PathBuf, name: Option<String> },
}

/// Where to put the rendered bytes
pub enum Destination {
    /// Standard output
    Stdout,
    /// A file or directory; `None` uses the configured export directory
    Path(Option<PathBuf>),
}

pub async fn export(
    service: &AsyncDocumentService,
    config: &Config,
    source: Source,
    format: &str,
    destination: Destination,
    output: &Output,
) -> Result<()> {
    let format: ExportFormat = format.parse()?;

    let file = match source {
        Source::Stored(id) => {
            let id = resolve_document_id(service, &id).await?;
            service.export_stored_document(id, format).await?
        }
        Source::File { path, name } => {
            let Some(content) = read_content(Some(&path), None)? else {
                bail!("No content in {:?}", path);
            };
            let name = name.unwrap_or_else(|| file_stem(&path));
            service.export_document(content, name, format).await?
        }
    };

    match destination {
        Destination::Stdout => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(&file.bytes)
                .context("Failed to write export to stdout")?;
            stdout.flush()?;
        }
        Destination::Path(target) => {
            let path = output_path(&file, target.as_deref(), &config.export_dir());
            write_export(&file, &path)?;
            output.print_export(&file, &path);
        }
    }
    Ok(())
}

/// Final file path: an explicit file, an explicit directory, or the export directory
fn output_path(file: &ExportedFile, target: Option<&Path>, export_dir: &Path) -> PathBuf {
    match target {
        Some(target) if target.is_dir() => target.join(&file.filename),
        Some(target) => target.to_path_buf(),
        None => export_dir.join(&file.filename),
    }
}

fn write_export(file: &ExportedFile, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }
    std::fs::write(path, &file.bytes)
        .with_context(|| format!("Failed to write export: {:?}", path))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
