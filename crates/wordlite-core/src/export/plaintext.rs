//! Plain text renderer
//!
//! Emits the text runs in document order. Every paragraph or heading becomes
//! one line; lists and blockquotes contribute the lines of their children.
//! Styling, links and images are dropped.

use super::{heading_level, ExportError, ExportFormat, ExportResult, Renderer};
use crate::content::{Block, Content, Inline};

pub struct PlainTextRenderer;

impl Renderer for PlainTextRenderer {
    fn format(&self) -> ExportFormat {
        ExportFormat::PlainText
    }

    fn render(&self, content: &Content, _title: &str) -> ExportResult<Vec<u8>> {
        let mut lines = Vec::new();
        collect_lines(&content.blocks, &mut lines)?;
        Ok(lines.join("\n").into_bytes())
    }
}

fn collect_lines(blocks: &[Block], lines: &mut Vec<String>) -> ExportResult<()> {
    for block in blocks {
        match block {
            Block::Paragraph { inlines, .. } => lines.push(inline_text(inlines)?),
            Block::Heading { level, inlines, .. } => {
                heading_level(*level)?;
                lines.push(inline_text(inlines)?);
            }
            Block::BulletList { items } | Block::OrderedList { items, .. } => {
                for item in items {
                    collect_lines(&item.blocks, lines)?;
                }
            }
            Block::Blockquote { blocks } => collect_lines(blocks, lines)?,
            Block::Unsupported => {
                return Err(ExportError::UnsupportedNode("block".to_string()))
            }
        }
    }
    Ok(())
}

fn inline_text(inlines: &[Inline]) -> ExportResult<String> {
    let mut line = String::new();
    for inline in inlines {
        match inline {
            Inline::Text { text, .. } => line.push_str(text),
            Inline::HardBreak => line.push('\n'),
            Inline::Image { .. } => {}
            Inline::Unsupported => {
                return Err(ExportError::UnsupportedNode("inline".to_string()))
            }
        }
    }
    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ListItem, Marks};

    fn render(content: &Content) -> String {
        String::from_utf8(PlainTextRenderer.render(content, "Doc").unwrap()).unwrap()
    }

    #[test]
    fn test_blocks_become_lines() {
        let content = Content::new(vec![
            Block::heading(1, vec![Inline::text("Welcome")]),
            Block::paragraph(vec![Inline::text("Start typing your document here...")]),
        ]);
        assert_eq!(render(&content), "Welcome\nStart typing your document here...");
    }

    #[test]
    fn test_styles_are_discarded() {
        let content = Content::new(vec![Block::paragraph(vec![
            Inline::styled("bold", Marks::bold()),
            Inline::text(" and "),
            Inline::styled("linked", Marks::link("https://example.com")),
            Inline::image("cat.png"),
        ])]);
        assert_eq!(render(&content), "bold and linked");
    }

    #[test]
    fn test_nested_structure_is_flattened() {
        let content = Content::new(vec![
            Block::bullet_list(vec![ListItem::text("one"), ListItem::text("two")]),
            Block::blockquote(vec![
                Block::paragraph(vec![Inline::text("quoted")]),
                Block::ordered_list(3, vec![ListItem::text("three")]),
            ]),
        ]);
        assert_eq!(render(&content), "one\ntwo\nquoted\nthree");
    }

    #[test]
    fn test_hard_break_and_empty_paragraph() {
        let content = Content::new(vec![
            Block::paragraph(vec![
                Inline::text("line one"),
                Inline::HardBreak,
                Inline::text("line two"),
            ]),
            Block::paragraph(Vec::new()),
            Block::paragraph(vec![Inline::text("after gap")]),
        ]);
        assert_eq!(render(&content), "line one\nline two\n\nafter gap");
    }

    #[test]
    fn test_markup_characters_pass_through() {
        let content = Content::new(vec![Block::paragraph(vec![Inline::text("<a> & <b>")])]);
        assert_eq!(render(&content), "<a> & <b>");
    }

    #[test]
    fn test_unsupported_inline() {
        let content = Content::new(vec![Block::paragraph(vec![Inline::Unsupported])]);
        assert!(matches!(
            PlainTextRenderer.render(&content, "Doc"),
            Err(ExportError::UnsupportedNode(_))
        ));
    }
}
