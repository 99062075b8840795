//! Command handlers

pub mod config;
pub mod document;
pub mod export;

use std::io::{self, IsTerminal, Read, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};

use wordlite_core::{AsyncDocumentService, Content};

/// Resolve a full id or unique prefix to a document id
pub async fn resolve_document_id(service: &AsyncDocumentService, id: &str) -> Result<String> {
    let matches = service.resolve_id(id.to_string()).await?;

    match matches.len() {
        0 => bail!("No document found matching: {}", id),
        1 => Ok(matches[0].to_string()),
        _ => {
            eprintln!("Multiple documents match '{}':", id);
            for id in &matches {
                eprintln!("  {}", id);
            }
            bail!("Ambiguous ID. Please provide more characters.");
        }
    }
}

/// Content given on the command line: a JSON file (`-` for stdin) or plain text
pub fn read_content(file: Option<&Path>, text: Option<&str>) -> Result<Option<Content>> {
    if let Some(path) = file {
        let json = if path == Path::new("-") {
            let mut json = String::new();
            io::stdin()
                .read_to_string(&mut json)
                .context("Failed to read content from stdin")?;
            json
        } else {
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read content file: {:?}", path))?
        };
        let content = Content::from_json(&json)
            .with_context(|| format!("Invalid content JSON in {:?}", path))?;
        return Ok(Some(content));
    }

    Ok(text.map(Content::from_plain_text))
}

/// Ask a yes/no question; anything but yes (or a non-interactive stdin) is no
pub fn confirm(prompt: &str) -> Result<bool> {
    if !io::stdin().is_terminal() {
        return Ok(false);
    }

    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    let input = input.trim().to_lowercase();
    Ok(input == "y" || input == "yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wordlite_core::{Block, Config, DocumentService, Inline};

    fn service() -> (AsyncDocumentService, TempDir) {
        let temp = TempDir::new().unwrap();
        let service = DocumentService::open_with_config(Config::with_data_dir(temp.path())).unwrap();
        (AsyncDocumentService::new(service), temp)
    }

    #[test]
    fn test_read_content_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("content.json");
        std::fs::write(
            &path,
            r#"{"blocks":[{"type":"heading","level":2,"inlines":[{"type":"text","text":"Hi"}]}]}"#,
        )
        .unwrap();

        let content = read_content(Some(&path), None).unwrap().unwrap();
        assert_eq!(
            content,
            Content::new(vec![Block::heading(2, vec![Inline::text("Hi")])])
        );
    }

    #[test]
    fn test_read_content_from_text() {
        let content = read_content(None, Some("one\ntwo")).unwrap().unwrap();
        assert_eq!(content.blocks.len(), 2);
        assert!(read_content(None, None).unwrap().is_none());
    }

    #[test]
    fn test_read_content_bad_json() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("content.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(read_content(Some(&path), None).is_err());
    }

    #[tokio::test]
    async fn test_resolve_document_id() {
        let (service, _temp) = service();
        let doc = service
            .create_document(None, Content::starter())
            .await
            .unwrap();

        let resolved = resolve_document_id(&service, &doc.id.short()).await.unwrap();
        assert_eq!(resolved, doc.id.to_string());

        assert!(resolve_document_id(&service, "zzzz").await.is_err());
    }
}
