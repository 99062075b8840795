//! Data models for wordlite
//!
//! Defines the stored unit, `DocumentRecord`, and the content-free
//! `DocumentSummary` returned by listings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::content::Content;
use crate::document_id::DocumentId;

/// Name given to documents created without one
pub const UNTITLED_DOCUMENT: &str = "Untitled Document";

/// A stored document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    /// Unique identifier, assigned by the store
    pub id: DocumentId,
    /// Human-readable label
    pub name: String,
    /// Rich content tree
    pub content: Content,
    /// When this document was created
    pub created_at: DateTime<Utc>,
    /// When this document was last modified
    pub updated_at: DateTime<Utc>,
}

impl DocumentRecord {
    /// Create a record with a fresh id, stamped with `now`
    pub fn new(name: impl Into<String>, content: Content, now: DateTime<Utc>) -> Self {
        Self {
            id: DocumentId::new(),
            name: name.into(),
            content,
            created_at: now,
            updated_at: now,
        }
    }

    /// Listing view of this record
    pub fn summary(&self) -> DocumentSummary {
        DocumentSummary {
            id: self.id,
            name: self.name.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// A stored document without its content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub id: DocumentId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Trim a caller-supplied name, falling back to the placeholder when blank
pub fn normalize_name(name: Option<&str>) -> String {
    match name.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => UNTITLED_DOCUMENT.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_timestamps_match() {
        let now = Utc::now();
        let record = DocumentRecord::new("Doc", Content::starter(), now);
        assert_eq!(record.created_at, record.updated_at);
        assert_eq!(record.name, "Doc");
    }

    #[test]
    fn test_summary_drops_content() {
        let record = DocumentRecord::new("Doc", Content::starter(), Utc::now());
        let summary = record.summary();
        assert_eq!(summary.id, record.id);
        assert_eq!(summary.updated_at, record.updated_at);

        let json = serde_json::to_value(&summary).unwrap();
        assert!(json.get("content").is_none());
    }

    #[test]
    fn test_camel_case_field_names() {
        let record = DocumentRecord::new("Doc", Content::starter(), Utc::now());
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
        assert!(json.get("created_at").is_none());
    }

    #[test]
    fn test_record_json_roundtrip() {
        let record = DocumentRecord::new("Doc", Content::starter(), Utc::now());
        let json = serde_json::to_string(&record).unwrap();
        let parsed: DocumentRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name(None), UNTITLED_DOCUMENT);
        assert_eq!(normalize_name(Some("   ")), UNTITLED_DOCUMENT);
        assert_eq!(normalize_name(Some("  Report ")), "Report");
    }
}
