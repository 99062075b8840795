//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use std::path::Path;

use chrono::Local;
use serde::Serialize;

use wordlite_core::export::PlainTextRenderer;
use wordlite_core::{DocumentRecord, DocumentSummary, ExportFormat, ExportedFile, Renderer};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print a single document, content rendered as plain text
    pub fn print_document(&self, doc: &DocumentRecord) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:       {}", doc.id);
                println!("Name:     {}", doc.name);
                println!("Created:  {}", local_time(doc.created_at));
                println!("Updated:  {}", local_time(doc.updated_at));
                println!();
                println!("── Content ──");
                match PlainTextRenderer.render(&doc.content, &doc.name) {
                    Ok(bytes) => println!("{}", String::from_utf8_lossy(&bytes)),
                    Err(e) => println!("(cannot display content: {})", e),
                }
            }
            OutputFormat::Json => print_json(doc),
            OutputFormat::Quiet => {
                println!("{}", doc.id);
            }
        }
    }

    /// Print a list of document summaries
    pub fn print_documents(&self, docs: &[DocumentSummary]) {
        match self.format {
            OutputFormat::Human => {
                if docs.is_empty() {
                    println!("No documents found.");
                    return;
                }
                for doc in docs {
                    println!(
                        "{} | {:<40} | {}",
                        doc.id.short(),
                        truncate(&doc.name, 40),
                        local_time(doc.updated_at)
                    );
                }
                println!("\n{} document(s)", docs.len());
            }
            OutputFormat::Json => print_json(&docs),
            OutputFormat::Quiet => {
                for doc in docs {
                    println!("{}", doc.id);
                }
            }
        }
    }

    /// Report a written export
    pub fn print_export(&self, file: &ExportedFile, path: &Path) {
        match self.format {
            OutputFormat::Human => {
                println!(
                    "✓ Exported {} ({}, {} bytes) to {}",
                    file.filename,
                    file.format,
                    file.bytes.len(),
                    path.display()
                );
            }
            OutputFormat::Json => print_json(&ExportReport {
                path,
                filename: &file.filename,
                format: file.format,
                media_type: file.media_type,
                bytes: file.bytes.len(),
            }),
            OutputFormat::Quiet => {
                println!("{}", path.display());
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportReport<'a> {
    path: &'a Path,
    filename: &'a str,
    format: ExportFormat,
    media_type: &'a str,
    bytes: usize,
}

/// Pretty-print any serializable value as JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize output: {}", e),
    }
}

fn local_time(time: chrono::DateTime<chrono::Utc>) -> String {
    time.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Quiet);
        // Quiet takes precedence
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("this is a long string", 10), "this is...");
        // Counts characters, not bytes
        assert_eq!(truncate("ééééééééééé", 6), "ééé...");
    }

    #[test]
    fn test_export_report_shape() {
        let report = ExportReport {
            path: Path::new("out/Report.docx"),
            filename: "Report.docx",
            format: ExportFormat::PageDocument,
            media_type: ExportFormat::PageDocument.media_type(),
            bytes: 42,
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["format"], "page-document");
        assert_eq!(value["mediaType"], ExportFormat::PageDocument.media_type());
        assert_eq!(value["bytes"], 42);
    }
}
