//! Rich content tree
//!
//! A document's content is a tree of block nodes containing inline nodes.
//! It is the single semantic source consumed by every exporter, so the node
//! vocabulary is a closed set of tagged variants that renderers match
//! exhaustively.
//!
//! The JSON shape follows the editor's node naming:
//!
//! ```json
//! {
//!   "blocks": [
//!     { "type": "heading", "level": 1, "inlines": [{ "type": "text", "text": "Welcome" }] },
//!     { "type": "paragraph", "inlines": [
//!       { "type": "text", "text": "bold", "marks": { "bold": true } }
//!     ] }
//!   ]
//! }
//! ```
//!
//! Node types outside the vocabulary deserialize to an `Unsupported`
//! variant instead of failing, so `validate` and the renderers can report
//! them as unsupported nodes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Highest heading level the model supports
pub const MAX_HEADING_LEVEL: u8 = 3;

/// Errors raised while parsing or validating content
#[derive(Error, Debug)]
pub enum ContentError {
    #[error("Content is required")]
    Empty,

    #[error("Unsupported {0} node")]
    UnsupportedNode(&'static str),

    #[error("Unsupported heading level {0} (expected 1-3)")]
    InvalidHeadingLevel(u8),

    #[error("Invalid content JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Root of a rich content tree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub blocks: Vec<Block>,
}

/// Block-level node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Block {
    Paragraph {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        align: Option<Alignment>,
        #[serde(default)]
        inlines: Vec<Inline>,
    },
    Heading {
        level: u8,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        align: Option<Alignment>,
        #[serde(default)]
        inlines: Vec<Inline>,
    },
    BulletList {
        #[serde(default)]
        items: Vec<ListItem>,
    },
    OrderedList {
        #[serde(default = "default_list_start")]
        start: u32,
        #[serde(default)]
        items: Vec<ListItem>,
    },
    Blockquote {
        #[serde(default)]
        blocks: Vec<Block>,
    },
    #[serde(other)]
    Unsupported,
}

fn default_list_start() -> u32 {
    1
}

/// One entry of a bullet or ordered list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    #[serde(default)]
    pub blocks: Vec<Block>,
}

/// Paragraph alignment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    /// CSS `text-align` value
    pub fn as_css(&self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "justify",
        }
    }
}

/// Inline node inside a paragraph or heading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Inline {
    Text {
        text: String,
        #[serde(default, skip_serializing_if = "Marks::is_plain")]
        marks: Marks,
    },
    Image {
        src: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alt: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        /// Display width in pixels
        #[serde(default, skip_serializing_if = "Option::is_none")]
        width: Option<u32>,
        /// Display height in pixels
        #[serde(default, skip_serializing_if = "Option::is_none")]
        height: Option<u32>,
    },
    HardBreak,
    #[serde(other)]
    Unsupported,
}

/// Character styling attached to a text run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Marks {
    #[serde(skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub underline: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub strike: bool,
    /// Link target
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// CSS text color
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Highlight color; an empty string selects the default highlight
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Marks {
    /// True when no styling is applied
    pub fn is_plain(&self) -> bool {
        *self == Marks::default()
    }

    pub fn bold() -> Self {
        Self {
            bold: true,
            ..Self::default()
        }
    }

    pub fn italic() -> Self {
        Self {
            italic: true,
            ..Self::default()
        }
    }

    pub fn link(href: impl Into<String>) -> Self {
        Self {
            link: Some(href.into()),
            ..Self::default()
        }
    }
}

impl Inline {
    /// Unstyled text run
    pub fn text(text: impl Into<String>) -> Self {
        Inline::Text {
            text: text.into(),
            marks: Marks::default(),
        }
    }

    /// Text run with marks
    pub fn styled(text: impl Into<String>, marks: Marks) -> Self {
        Inline::Text {
            text: text.into(),
            marks,
        }
    }

    /// Image with only a source
    pub fn image(src: impl Into<String>) -> Self {
        Inline::Image {
            src: src.into(),
            alt: None,
            title: None,
            width: None,
            height: None,
        }
    }
}

impl Block {
    pub fn paragraph(inlines: Vec<Inline>) -> Self {
        Block::Paragraph {
            align: None,
            inlines,
        }
    }

    pub fn heading(level: u8, inlines: Vec<Inline>) -> Self {
        Block::Heading {
            level,
            align: None,
            inlines,
        }
    }

    pub fn bullet_list(items: Vec<ListItem>) -> Self {
        Block::BulletList { items }
    }

    pub fn ordered_list(start: u32, items: Vec<ListItem>) -> Self {
        Block::OrderedList { start, items }
    }

    pub fn blockquote(blocks: Vec<Block>) -> Self {
        Block::Blockquote { blocks }
    }
}

impl ListItem {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    /// List item holding a single plain paragraph
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(vec![Block::paragraph(vec![Inline::text(text)])])
    }
}

impl Content {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    /// Content a freshly opened editor starts with
    pub fn starter() -> Self {
        Self::new(vec![
            Block::heading(1, vec![Inline::text("Welcome to MS Word Lite")]),
            Block::paragraph(vec![Inline::text("Start typing your document here...")]),
        ])
    }

    /// One plain paragraph per line of `text`
    pub fn from_plain_text(text: &str) -> Self {
        let blocks = text
            .lines()
            .map(|line| {
                if line.is_empty() {
                    Block::paragraph(Vec::new())
                } else {
                    Block::paragraph(vec![Inline::text(line)])
                }
            })
            .collect();
        Self::new(blocks)
    }

    /// Parse content from its JSON form
    pub fn from_json(json: &str) -> Result<Self, ContentError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json_pretty(&self) -> Result<String, ContentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// True when the content has no blocks at all
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Check the content is non-empty and uses only supported nodes
    pub fn validate(&self) -> Result<(), ContentError> {
        if self.is_empty() {
            return Err(ContentError::Empty);
        }
        validate_blocks(&self.blocks)
    }
}

fn validate_blocks(blocks: &[Block]) -> Result<(), ContentError> {
    for block in blocks {
        match block {
            Block::Paragraph { inlines, .. } => validate_inlines(inlines)?,
            Block::Heading { level, inlines, .. } => {
                if !(1..=MAX_HEADING_LEVEL).contains(level) {
                    return Err(ContentError::InvalidHeadingLevel(*level));
                }
                validate_inlines(inlines)?;
            }
            Block::BulletList { items } | Block::OrderedList { items, .. } => {
                for item in items {
                    validate_blocks(&item.blocks)?;
                }
            }
            Block::Blockquote { blocks } => validate_blocks(blocks)?,
            Block::Unsupported => return Err(ContentError::UnsupportedNode("block")),
        }
    }
    Ok(())
}

fn validate_inlines(inlines: &[Inline]) -> Result<(), ContentError> {
    if inlines.iter().any(|i| matches!(i, Inline::Unsupported)) {
        return Err(ContentError::UnsupportedNode("inline"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_editor_shape() {
        let json = r##"{
            "blocks": [
                { "type": "heading", "level": 2, "align": "center",
                  "inlines": [{ "type": "text", "text": "Title" }] },
                { "type": "paragraph", "inlines": [
                    { "type": "text", "text": "Hi", "marks": { "bold": true, "fontFamily": "Georgia" } },
                    { "type": "hardBreak" },
                    { "type": "image", "src": "cat.png", "alt": "a cat" }
                ] },
                { "type": "orderedList", "items": [{ "blocks": [] }] }
            ]
        }"##;

        let content = Content::from_json(json).unwrap();
        assert_eq!(content.blocks.len(), 3);

        match &content.blocks[0] {
            Block::Heading { level, align, .. } => {
                assert_eq!(*level, 2);
                assert_eq!(*align, Some(Alignment::Center));
            }
            other => panic!("unexpected block {:?}", other),
        }

        match &content.blocks[1] {
            Block::Paragraph { inlines, .. } => {
                assert_eq!(inlines.len(), 3);
                match &inlines[0] {
                    Inline::Text { marks, .. } => {
                        assert!(marks.bold);
                        assert_eq!(marks.font_family.as_deref(), Some("Georgia"));
                    }
                    other => panic!("unexpected inline {:?}", other),
                }
                assert_eq!(inlines[1], Inline::HardBreak);
            }
            other => panic!("unexpected block {:?}", other),
        }

        // Ordered lists start at 1 unless told otherwise
        assert_eq!(content.blocks[2], Block::ordered_list(1, vec![ListItem::default()]));
        assert!(content.validate().is_ok());
    }

    #[test]
    fn test_json_roundtrip_is_lossless() {
        let content = Content::new(vec![
            Block::heading(1, vec![Inline::text("Welcome")]),
            Block::blockquote(vec![Block::paragraph(vec![Inline::styled(
                "quoted",
                Marks {
                    italic: true,
                    color: Some("#ff0000".to_string()),
                    highlight: Some(String::new()),
                    ..Marks::default()
                },
            )])]),
            Block::bullet_list(vec![ListItem::text("one"), ListItem::text("two")]),
        ]);

        let json = serde_json::to_string(&content).unwrap();
        let parsed = Content::from_json(&json).unwrap();
        assert_eq!(parsed, content);
    }

    #[test]
    fn test_plain_marks_are_omitted() {
        let json = serde_json::to_string(&Inline::text("x")).unwrap();
        assert_eq!(json, r#"{"type":"text","text":"x"}"#);
    }

    #[test]
    fn test_unknown_node_types_are_unsupported() {
        let content =
            Content::from_json(r#"{"blocks":[{"type":"table","rows":[]}]}"#).unwrap();
        assert_eq!(content.blocks, vec![Block::Unsupported]);
        assert!(matches!(
            content.validate(),
            Err(ContentError::UnsupportedNode("block"))
        ));

        let content = Content::from_json(
            r#"{"blocks":[{"type":"paragraph","inlines":[{"type":"mention","id":"x"}]}]}"#,
        )
        .unwrap();
        assert!(matches!(
            content.validate(),
            Err(ContentError::UnsupportedNode("inline"))
        ));
    }

    #[test]
    fn test_validate_rejects_empty_content() {
        assert!(matches!(Content::default().validate(), Err(ContentError::Empty)));
    }

    #[test]
    fn test_validate_rejects_deep_heading() {
        let content = Content::new(vec![Block::blockquote(vec![Block::heading(
            4,
            vec![Inline::text("too deep")],
        )])]);
        assert!(matches!(
            content.validate(),
            Err(ContentError::InvalidHeadingLevel(4))
        ));
    }

    #[test]
    fn test_from_plain_text() {
        let content = Content::from_plain_text("first\n\nthird");
        assert_eq!(content.blocks.len(), 3);
        assert_eq!(content.blocks[1], Block::paragraph(Vec::new()));
    }

    #[test]
    fn test_malformed_json_is_a_parse_error() {
        assert!(matches!(
            Content::from_json("{not json"),
            Err(ContentError::Parse(_))
        ));
    }
}
