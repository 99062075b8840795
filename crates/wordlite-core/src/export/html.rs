//! HTML renderer
//!
//! Produces a self-contained HTML document: a fixed preamble carrying the
//! charset, the title and the page style, followed by the content serialized
//! the way the editor writes its own markup. Image sources are referenced as
//! given (URLs or data URIs); they are never re-encoded.


use super::escape;
use super::{heading_level, ExportError, ExportFormat, ExportResult, Renderer};
use crate::content::{Alignment, Block, Content, Inline, Marks};

const STYLE: &str = "body { font-family: Arial, sans-serif; margin: 2cm; }\nimg { max-width: 100%; }\n";

pub struct HtmlRenderer;

impl Renderer for HtmlRenderer {
    fn format(&self) -> ExportFormat {
        ExportFormat::Html
    }

    fn render(&self, content: &Content, title: &str) -> ExportResult<Vec<u8>> {
        let body = render_body(content)?;

        let mut html = String::with_capacity(body.len() + 256);
        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        html.push_str("<title>");
        html.push_str(&escape::text(title));
        html.push_str("</title>\n<style>\n");
        html.push_str(STYLE);
        html.push_str("</style>\n</head>\n<body>\n");
        html.push_str(&body);
        html.push_str("\n</body>\n</html>\n");
        Ok(html.into_bytes())
    }
}

/// Serialize just the content tree, without the document preamble
pub fn render_body(content: &Content) -> ExportResult<String> {
    let mut out = String::new();
    write_blocks(&mut out, &content.blocks)?;
    Ok(out)
}

fn write_blocks(out: &mut String, blocks: &[Block]) -> ExportResult<()> {
    for block in blocks {
        match block {
            Block::Paragraph { align, inlines } => {
                out.push_str("<p");
                write_align(out, *align);
                out.push('>');
                write_inlines(out, inlines)?;
                out.push_str("</p>");
            }
            Block::Heading {
                level,
                align,
                inlines,
            } => {
                let level = heading_level(*level)?;
                out.push_str(&format!("<h{}", level));
                write_align(out, *align);
                out.push('>');
                write_inlines(out, inlines)?;
                out.push_str(&format!("</h{}>", level));
            }
            Block::BulletList { items } => {
                out.push_str("<ul>");
                for item in items {
                    out.push_str("<li>");
                    write_blocks(out, &item.blocks)?;
                    out.push_str("</li>");
                }
                out.push_str("</ul>");
            }
            Block::OrderedList { start, items } => {
                if *start == 1 {
                    out.push_str("<ol>");
                } else {
                    out.push_str(&format!("<ol start=\"{}\">", start));
                }
                for item in items {
                    out.push_str("<li>");
                    write_blocks(out, &item.blocks)?;
                    out.push_str("</li>");
                }
                out.push_str("</ol>");
            }
            Block::Blockquote { blocks } => {
                out.push_str("<blockquote>");
                write_blocks(out, blocks)?;
                out.push_str("</blockquote>");
            }
            Block::Unsupported => {
                return Err(ExportError::UnsupportedNode("block".to_string()))
            }
        }
    }
    Ok(())
}

fn write_align(out: &mut String, align: Option<Alignment>) {
    match align {
        None | Some(Alignment::Left) => {}
        Some(align) => {
            out.push_str(&format!(" style=\"text-align: {}\"", align.as_css()));
        }
    }
}

fn write_inlines(out: &mut String, inlines: &[Inline]) -> ExportResult<()> {
    for inline in inlines {
        match inline {
            Inline::Text { text, marks } => write_text(out, text, marks),
            Inline::Image {
                src,
                alt,
                title,
                width,
                height,
            } => {
                out.push_str(&format!("<img src=\"{}\"", escape::attr(src)));
                if let Some(alt) = alt {
                    out.push_str(&format!(" alt=\"{}\"", escape::attr(alt)));
                }
                if let Some(title) = title {
                    out.push_str(&format!(" title=\"{}\"", escape::attr(title)));
                }
                if let Some(width) = width {
                    out.push_str(&format!(" width=\"{}\"", width));
                }
                if let Some(height) = height {
                    out.push_str(&format!(" height=\"{}\"", height));
                }
                out.push('>');
            }
            Inline::HardBreak => out.push_str("<br>"),
            Inline::Unsupported => {
                return Err(ExportError::UnsupportedNode("inline".to_string()))
            }
        }
    }
    Ok(())
}

/// Text run wrapped in its marks, outermost first:
/// link, text style, highlight, bold, italic, underline, strike
fn write_text(out: &mut String, text: &str, marks: &Marks) {
    let mut closers: Vec<&str> = Vec::new();

    if let Some(href) = &marks.link {
        out.push_str(&format!(
            "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer nofollow\">",
            escape::attr(href)
        ));
        closers.push("</a>");
    }

    let mut style = Vec::new();
    if let Some(color) = &marks.color {
        style.push(format!("color: {}", color));
    }
    if let Some(font) = &marks.font_family {
        style.push(format!("font-family: {}", font));
    }
    if !style.is_empty() {
        out.push_str(&format!("<span style=\"{}\">", escape::attr(&style.join("; "))));
        closers.push("</span>");
    }

    if let Some(color) = &marks.highlight {
        if color.is_empty() {
            out.push_str("<mark>");
        } else {
            let color = escape::attr(color);
            out.push_str(&format!(
                "<mark data-color=\"{}\" style=\"background-color: {}\">",
                color, color
            ));
        }
        closers.push("</mark>");
    }

    for (on, open, close) in [
        (marks.bold, "<strong>", "</strong>"),
        (marks.italic, "<em>", "</em>"),
        (marks.underline, "<u>", "</u>"),
        (marks.strike, "<s>", "</s>"),
    ] {
        if on {
            out.push_str(open);
            closers.push(close);
        }
    }

    out.push_str(&escape::text(text));
    for close in closers.iter().rev() {
        out.push_str(close);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ListItem;

    fn render(content: &Content, title: &str) -> String {
        String::from_utf8(HtmlRenderer.render(content, title).unwrap()).unwrap()
    }

    fn body(content: &Content) -> String {
        render_body(content).unwrap()
    }

    #[test]
    fn test_full_document() {
        let content = Content::new(vec![
            Block::heading(1, vec![Inline::text("Welcome")]),
            Block::paragraph(vec![Inline::text("Start typing your document here...")]),
        ]);

        let expected = "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
<title>Untitled Document</title>\n<style>\n\
body { font-family: Arial, sans-serif; margin: 2cm; }\n\
img { max-width: 100%; }\n</style>\n</head>\n<body>\n\
<h1>Welcome</h1><p>Start typing your document here...</p>\n</body>\n</html>\n";

        assert_eq!(render(&content, "Untitled Document"), expected);
    }

    #[test]
    fn test_title_is_escaped() {
        let content = Content::from_plain_text("x");
        assert!(render(&content, "Q&A <draft>").contains("<title>Q&amp;A &lt;draft&gt;</title>"));
    }

    #[test]
    fn test_text_is_escaped() {
        let content = Content::new(vec![Block::paragraph(vec![Inline::text(
            "<script>alert('x')</script> & more",
        )])]);
        assert_eq!(
            body(&content),
            "<p>&lt;script&gt;alert('x')&lt;/script&gt; &amp; more</p>"
        );
    }

    #[test]
    fn test_alignment() {
        let content = Content::new(vec![
            Block::Paragraph {
                align: Some(Alignment::Center),
                inlines: vec![Inline::text("mid")],
            },
            Block::Heading {
                level: 2,
                align: Some(Alignment::Left),
                inlines: vec![Inline::text("left")],
            },
        ]);
        assert_eq!(
            body(&content),
            "<p style=\"text-align: center\">mid</p><h2>left</h2>"
        );
    }

    #[test]
    fn test_marks_nest_in_fixed_order() {
        let marks = Marks {
            bold: true,
            italic: true,
            underline: true,
            strike: true,
            link: Some("https://example.com/?a=1&b=2".to_string()),
            color: Some("#ff0000".to_string()),
            highlight: Some(String::new()),
            font_family: Some("Georgia".to_string()),
        };
        let content = Content::new(vec![Block::paragraph(vec![Inline::styled("x", marks)])]);

        assert_eq!(
            body(&content),
            "<p><a href=\"https://example.com/?a=1&amp;b=2\" target=\"_blank\" \
rel=\"noopener noreferrer nofollow\"><span style=\"color: #ff0000; font-family: Georgia\">\
<mark><strong><em><u><s>x</s></u></em></strong></mark></span></a></p>"
        );
    }

    #[test]
    fn test_colored_highlight() {
        let marks = Marks {
            highlight: Some("#ffff00".to_string()),
            ..Marks::default()
        };
        let content = Content::new(vec![Block::paragraph(vec![Inline::styled("hi", marks)])]);
        assert_eq!(
            body(&content),
            "<p><mark data-color=\"#ffff00\" style=\"background-color: #ffff00\">hi</mark></p>"
        );
    }

    #[test]
    fn test_lists_and_quotes() {
        let content = Content::new(vec![
            Block::bullet_list(vec![ListItem::text("a"), ListItem::text("b")]),
            Block::ordered_list(1, vec![ListItem::text("one")]),
            Block::ordered_list(4, vec![ListItem::text("four")]),
            Block::blockquote(vec![Block::paragraph(vec![Inline::text("wise")])]),
        ]);
        assert_eq!(
            body(&content),
            "<ul><li><p>a</p></li><li><p>b</p></li></ul>\
<ol><li><p>one</p></li></ol>\
<ol start=\"4\"><li><p>four</p></li></ol>\
<blockquote><p>wise</p></blockquote>"
        );
    }

    #[test]
    fn test_images_and_breaks() {
        let content = Content::new(vec![Block::paragraph(vec![
            Inline::Image {
                src: "data:image/png;base64,AAAA".to_string(),
                alt: Some("a \"cat\"".to_string()),
                title: None,
                width: Some(120),
                height: None,
            },
            Inline::HardBreak,
            Inline::image("https://example.com/dog.jpg"),
        ])]);
        assert_eq!(
            body(&content),
            "<p><img src=\"data:image/png;base64,AAAA\" alt=\"a &quot;cat&quot;\" width=\"120\">\
<br><img src=\"https://example.com/dog.jpg\"></p>"
        );
    }

    #[test]
    fn test_attribute_injection_is_neutralized() {
        let marks = Marks {
            color: Some("red\"><script>".to_string()),
            ..Marks::default()
        };
        let content = Content::new(vec![Block::paragraph(vec![Inline::styled("x", marks)])]);
        let html = body(&content);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&quot;&gt;&lt;script&gt;"));
    }
}
