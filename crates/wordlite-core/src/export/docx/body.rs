//! `word/document.xml` writer
//!
//! Maps the content tree onto WordprocessingML's flat paragraph/run model:
//!
//! - every paragraph or heading becomes a `w:p`
//! - lists become numbered paragraphs, one `w:num` instance per list, with
//!   the nesting depth as the numbering level
//! - blockquotes become `Quote` paragraphs indented per nesting depth
//! - marks become run properties; links become `w:hyperlink` wrappers
//!
//! Block-level styling reaches the runs through the paragraph style (which
//! runs inherit in Word) or, where no style carries it, as explicit run
//! properties merged under the run's own marks.

use std::collections::HashMap;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::warn;

use super::parts::{FIRST_DYNAMIC_REL_ID, QUOTE_BORDER, QUOTE_COLOR, XML_DECLARATION};
use crate::content::{Alignment, Block, Content, Inline, Marks};
use crate::export::escape;
use crate::export::{heading_level, ExportError, ExportResult};

/// Left indent per nesting step, in twips (half an inch)
const INDENT_STEP: u32 = 720;
const HANGING_INDENT: u32 = 360;
/// Deepest numbering level WordprocessingML defines
const MAX_LIST_LEVEL: u8 = 8;

/// Pixel size used for images that carry no dimensions
const DEFAULT_IMAGE_SIZE: (u32, u32) = (320, 240);
/// Printable width of a Letter page with 1-inch margins, at 96 dpi
const MAX_IMAGE_WIDTH_PX: u32 = 624;
const EMU_PER_PX: u64 = 9525;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Bullet,
    Ordered,
}

/// One concrete `w:num` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberingInstance {
    pub num_id: u32,
    pub kind: ListKind,
    pub level: u8,
    pub start: u32,
}

#[derive(Debug, Default)]
pub struct Numbering {
    pub instances: Vec<NumberingInstance>,
}

impl Numbering {
    fn add(&mut self, kind: ListKind, level: u8, start: u32) -> u32 {
        let num_id = self.instances.len() as u32 + 1;
        self.instances.push(NumberingInstance {
            num_id,
            kind,
            level,
            start,
        });
        num_id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationshipKind {
    Hyperlink,
    Image,
}

/// Relationship from the document part to a link target or image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub kind: RelationshipKind,
    pub target: String,
    pub external: bool,
}

/// Image bytes stored inside the package under `word/media/`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPart {
    pub file_name: String,
    pub extension: &'static str,
    pub bytes: Vec<u8>,
}

/// Everything the body contributes to the package
#[derive(Debug)]
pub struct RenderedBody {
    pub document_xml: String,
    pub numbering: Numbering,
    pub relationships: Vec<Relationship>,
    pub media: Vec<MediaPart>,
}

/// Where a block sits in the tree
#[derive(Debug, Clone, Copy, Default)]
struct Context {
    quote_depth: u32,
    list: Option<ListLevel>,
}

#[derive(Debug, Clone, Copy)]
struct ListLevel {
    num_id: u32,
    level: u8,
}

/// Run properties a paragraph passes down to its runs
#[derive(Debug, Clone, Copy, Default)]
struct InheritedRun {
    italic: bool,
    /// Hex color used when the run's marks carry none
    color: Option<&'static str>,
}

pub fn render_document(content: &Content) -> ExportResult<RenderedBody> {
    let mut writer = BodyWriter::default();
    writer.write_blocks(&content.blocks, Context::default())?;
    if writer.body.is_empty() {
        writer.body.push_str("<w:p/>");
    }

    let mut document_xml = String::with_capacity(writer.body.len() + 1024);
    document_xml.push_str(XML_DECLARATION);
    document_xml.push_str(
        "<w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\" \
xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\" \
xmlns:wp=\"http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing\" \
xmlns:a=\"http://schemas.openxmlformats.org/drawingml/2006/main\" \
xmlns:pic=\"http://schemas.openxmlformats.org/drawingml/2006/picture\"><w:body>",
    );
    document_xml.push_str(&writer.body);
    document_xml.push_str(
        "<w:sectPr><w:pgSz w:w=\"12240\" w:h=\"15840\"/>\
<w:pgMar w:top=\"1440\" w:right=\"1440\" w:bottom=\"1440\" w:left=\"1440\" \
w:header=\"720\" w:footer=\"720\" w:gutter=\"0\"/></w:sectPr></w:body></w:document>",
    );

    Ok(RenderedBody {
        document_xml,
        numbering: writer.numbering,
        relationships: writer.relationships,
        media: writer.media,
    })
}

#[derive(Default)]
struct BodyWriter {
    body: String,
    numbering: Numbering,
    relationships: Vec<Relationship>,
    /// Link target to relationship id, so repeated links share one entry
    hyperlinks: HashMap<String, String>,
    media: Vec<MediaPart>,
    drawings: u32,
    /// Set at the start of a list item until its first paragraph is written
    pending_number: bool,
}

impl BodyWriter {
    fn write_blocks(&mut self, blocks: &[Block], ctx: Context) -> ExportResult<()> {
        for block in blocks {
            match block {
                Block::Paragraph { align, inlines } => {
                    self.write_paragraph(None, *align, inlines, ctx)?
                }
                Block::Heading {
                    level,
                    align,
                    inlines,
                } => {
                    let level = heading_level(*level)?;
                    self.write_paragraph(Some(level), *align, inlines, ctx)?;
                }
                Block::BulletList { items } => {
                    self.write_list(ListKind::Bullet, 1, items, ctx)?;
                }
                Block::OrderedList { start, items } => {
                    self.write_list(ListKind::Ordered, *start, items, ctx)?;
                }
                Block::Blockquote { blocks } => {
                    let inner = Context {
                        quote_depth: ctx.quote_depth + 1,
                        ..ctx
                    };
                    self.write_blocks(blocks, inner)?;
                }
                Block::Unsupported => {
                    return Err(ExportError::UnsupportedNode("block".to_string()))
                }
            }
        }
        Ok(())
    }

    fn write_list(
        &mut self,
        kind: ListKind,
        start: u32,
        items: &[crate::content::ListItem],
        ctx: Context,
    ) -> ExportResult<()> {
        // A nested list opening an item still owes the item its number
        self.flush_pending_number(ctx)?;

        let level = ctx
            .list
            .map(|list| (list.level + 1).min(MAX_LIST_LEVEL))
            .unwrap_or(0);
        let num_id = self.numbering.add(kind, level, start);
        let inner = Context {
            list: Some(ListLevel { num_id, level }),
            ..ctx
        };

        for item in items {
            self.pending_number = true;
            self.write_blocks(&item.blocks, inner)?;
            self.flush_pending_number(inner)?;
        }
        Ok(())
    }

    fn flush_pending_number(&mut self, ctx: Context) -> ExportResult<()> {
        if self.pending_number && ctx.list.is_some() {
            self.write_paragraph(None, None, &[], ctx)?;
        }
        self.pending_number = false;
        Ok(())
    }

    fn write_paragraph(
        &mut self,
        heading: Option<u8>,
        align: Option<Alignment>,
        inlines: &[Inline],
        ctx: Context,
    ) -> ExportResult<()> {
        let numbered = std::mem::take(&mut self.pending_number) && ctx.list.is_some();
        // Heading styles don't carry the quote look, so it goes on directly
        let quoted_heading = heading.is_some() && ctx.quote_depth > 0;

        let mut ppr = String::new();
        let style = match heading {
            Some(level) => Some(format!("Heading{}", level)),
            None if ctx.quote_depth > 0 => Some("Quote".to_string()),
            None if ctx.list.is_some() => Some("ListParagraph".to_string()),
            None => None,
        };
        if let Some(style) = style {
            ppr.push_str(&format!("<w:pStyle w:val=\"{}\"/>", style));
        }
        if let (true, Some(list)) = (numbered, ctx.list) {
            ppr.push_str(&format!(
                "<w:numPr><w:ilvl w:val=\"{}\"/><w:numId w:val=\"{}\"/></w:numPr>",
                list.level, list.num_id
            ));
        }
        if quoted_heading {
            ppr.push_str(QUOTE_BORDER);
        }
        if ctx.quote_depth > 0 || ctx.list.is_some() {
            let list_indent = ctx
                .list
                .map(|list| INDENT_STEP * (u32::from(list.level) + 1))
                .unwrap_or(0);
            let left = INDENT_STEP * ctx.quote_depth + list_indent;
            if numbered {
                ppr.push_str(&format!(
                    "<w:ind w:left=\"{}\" w:hanging=\"{}\"/>",
                    left, HANGING_INDENT
                ));
            } else {
                ppr.push_str(&format!("<w:ind w:left=\"{}\"/>", left));
            }
        }
        if let Some(jc) = align.and_then(justification) {
            ppr.push_str(&format!("<w:jc w:val=\"{}\"/>", jc));
        }

        let inherited = if quoted_heading {
            InheritedRun {
                italic: true,
                color: Some(QUOTE_COLOR),
            }
        } else {
            InheritedRun::default()
        };

        self.body.push_str("<w:p>");
        if !ppr.is_empty() {
            self.body.push_str("<w:pPr>");
            self.body.push_str(&ppr);
            self.body.push_str("</w:pPr>");
        }
        self.write_inlines(inlines, inherited)?;
        self.body.push_str("</w:p>");
        Ok(())
    }

    fn write_inlines(&mut self, inlines: &[Inline], inherited: InheritedRun) -> ExportResult<()> {
        for inline in inlines {
            match inline {
                Inline::Text { text, marks } => self.write_text_run(text, marks, inherited),
                Inline::HardBreak => self.body.push_str("<w:r><w:br/></w:r>"),
                Inline::Image {
                    src,
                    alt,
                    title,
                    width,
                    height,
                } => self.write_image(
                    src,
                    alt.as_deref(),
                    title.as_deref(),
                    (*width, *height),
                    inherited,
                ),
                Inline::Unsupported => {
                    return Err(ExportError::UnsupportedNode("inline".to_string()))
                }
            }
        }
        Ok(())
    }

    fn write_text_run(&mut self, text: &str, marks: &Marks, inherited: InheritedRun) {
        if text.is_empty() {
            return;
        }

        let hyperlink = marks.link.as_ref().map(|href| self.hyperlink_id(href));
        if let Some(rel_id) = &hyperlink {
            self.body.push_str(&format!("<w:hyperlink r:id=\"{}\" w:history=\"1\">", rel_id));
        }

        self.body.push_str("<w:r>");
        let rpr = run_properties(marks, inherited);
        if !rpr.is_empty() {
            self.body.push_str("<w:rPr>");
            self.body.push_str(&rpr);
            self.body.push_str("</w:rPr>");
        }
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                self.body.push_str("<w:br/>");
            }
            for (j, segment) in line.split('\t').enumerate() {
                if j > 0 {
                    self.body.push_str("<w:tab/>");
                }
                if !segment.is_empty() {
                    self.body.push_str(&format!(
                        "<w:t xml:space=\"preserve\">{}</w:t>",
                        escape::xml_text(segment)
                    ));
                }
            }
        }
        self.body.push_str("</w:r>");

        if hyperlink.is_some() {
            self.body.push_str("</w:hyperlink>");
        }
    }

    fn write_image(
        &mut self,
        src: &str,
        alt: Option<&str>,
        title: Option<&str>,
        size: (Option<u32>, Option<u32>),
        inherited: InheritedRun,
    ) {
        let blip = if let Some(data_uri) = src.strip_prefix("data:") {
            match decode_data_uri(data_uri) {
                Some((extension, bytes)) => {
                    let file_name = format!("image{}.{}", self.media.len() + 1, extension);
                    let rel_id = self.add_relationship(
                        RelationshipKind::Image,
                        format!("media/{}", file_name),
                        false,
                    );
                    self.media.push(MediaPart {
                        file_name,
                        extension,
                        bytes,
                    });
                    format!("<a:blip r:embed=\"{}\"/>", rel_id)
                }
                None => {
                    // Undecodable image data: keep the description in the text
                    warn!("Skipping image with unsupported data URI");
                    if let Some(alt) = alt {
                        self.write_text_run(alt, &Marks::default(), inherited);
                    }
                    return;
                }
            }
        } else {
            let rel_id = self.add_relationship(RelationshipKind::Image, src.to_string(), true);
            format!("<a:blip r:link=\"{}\"/>", rel_id)
        };

        self.drawings += 1;
        let id = self.drawings;
        let (cx, cy) = image_extent(size.0, size.1);
        let descr = alt.or(title).unwrap_or("");
        self.body.push_str(&format!(
            "<w:r><w:drawing><wp:inline distT=\"0\" distB=\"0\" distL=\"0\" distR=\"0\">\
<wp:extent cx=\"{cx}\" cy=\"{cy}\"/>\
<wp:docPr id=\"{id}\" name=\"Picture {id}\" descr=\"{descr}\"/>\
<a:graphic><a:graphicData uri=\"http://schemas.openxmlformats.org/drawingml/2006/picture\">\
<pic:pic><pic:nvPicPr><pic:cNvPr id=\"{id}\" name=\"Picture {id}\"/><pic:cNvPicPr/></pic:nvPicPr>\
<pic:blipFill>{blip}<a:stretch><a:fillRect/></a:stretch></pic:blipFill>\
<pic:spPr><a:xfrm><a:off x=\"0\" y=\"0\"/><a:ext cx=\"{cx}\" cy=\"{cy}\"/></a:xfrm>\
<a:prstGeom prst=\"rect\"><a:avLst/></a:prstGeom></pic:spPr></pic:pic>\
</a:graphicData></a:graphic></wp:inline></w:drawing></w:r>",
            cx = cx,
            cy = cy,
            id = id,
            descr = escape::xml_attr(descr),
            blip = blip
        ));
    }

    fn hyperlink_id(&mut self, href: &str) -> String {
        if let Some(id) = self.hyperlinks.get(href) {
            return id.clone();
        }
        let id = self.add_relationship(RelationshipKind::Hyperlink, href.to_string(), true);
        self.hyperlinks.insert(href.to_string(), id.clone());
        id
    }

    fn add_relationship(&mut self, kind: RelationshipKind, target: String, external: bool) -> String {
        let id = format!(
            "rId{}",
            FIRST_DYNAMIC_REL_ID + self.relationships.len() as u32
        );
        self.relationships.push(Relationship {
            id: id.clone(),
            kind,
            target,
            external,
        });
        id
    }
}

fn justification(align: Alignment) -> Option<&'static str> {
    match align {
        Alignment::Left => None,
        Alignment::Center => Some("center"),
        Alignment::Right => Some("right"),
        Alignment::Justify => Some("both"),
    }
}

/// `w:rPr` children in schema order
fn run_properties(marks: &Marks, inherited: InheritedRun) -> String {
    let mut rpr = String::new();
    if marks.link.is_some() {
        rpr.push_str("<w:rStyle w:val=\"Hyperlink\"/>");
    }
    if let Some(font) = marks.font_family.as_deref().and_then(primary_font) {
        let font = escape::xml_attr(&font).into_owned();
        rpr.push_str(&format!(
            "<w:rFonts w:ascii=\"{0}\" w:hAnsi=\"{0}\" w:eastAsia=\"{0}\" w:cs=\"{0}\"/>",
            font
        ));
    }
    if marks.bold {
        rpr.push_str("<w:b/><w:bCs/>");
    }
    if marks.italic || inherited.italic {
        rpr.push_str("<w:i/><w:iCs/>");
    }
    if marks.strike {
        rpr.push_str("<w:strike/>");
    }
    let color = marks
        .color
        .as_deref()
        .and_then(css_color_to_hex)
        .or_else(|| inherited.color.map(str::to_string));
    if let Some(color) = color {
        rpr.push_str(&format!("<w:color w:val=\"{}\"/>", color));
    }
    let highlight_fill = marks.highlight.as_deref().map(css_color_to_hex);
    if let Some(None) = highlight_fill {
        rpr.push_str("<w:highlight w:val=\"yellow\"/>");
    }
    if marks.underline {
        rpr.push_str("<w:u w:val=\"single\"/>");
    }
    if let Some(Some(fill)) = highlight_fill {
        rpr.push_str(&format!(
            "<w:shd w:val=\"clear\" w:color=\"auto\" w:fill=\"{}\"/>",
            fill
        ));
    }
    rpr
}

/// First family of a CSS `font-family` list, without quotes
fn primary_font(family: &str) -> Option<String> {
    let first = family.split(',').next()?.trim();
    let unquoted = first.trim_matches(|c| c == '"' || c == '\'').trim();
    (!unquoted.is_empty()).then(|| unquoted.to_string())
}

/// Convert a CSS color to the six-digit uppercase hex WordprocessingML uses
pub(crate) fn css_color_to_hex(color: &str) -> Option<String> {
    let color = color.trim().to_ascii_lowercase();

    if let Some(hex) = color.strip_prefix('#') {
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        return match hex.len() {
            3 | 4 => Some(hex.chars().take(3).flat_map(|c| [c, c]).collect::<String>().to_uppercase()),
            6 | 8 => Some(hex[..6].to_uppercase()),
            _ => None,
        };
    }

    if let Some(args) = color
        .strip_prefix("rgba(")
        .or_else(|| color.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        let channels: Vec<u8> = args
            .split(',')
            .take(3)
            .map(|part| part.trim().parse::<u8>().ok())
            .collect::<Option<_>>()?;
        if channels.len() != 3 {
            return None;
        }
        return Some(format!(
            "{:02X}{:02X}{:02X}",
            channels[0], channels[1], channels[2]
        ));
    }

    let named = match color.as_str() {
        "black" => "000000",
        "white" => "FFFFFF",
        "red" => "FF0000",
        "green" => "008000",
        "blue" => "0000FF",
        "yellow" => "FFFF00",
        "orange" => "FFA500",
        "purple" => "800080",
        "gray" | "grey" => "808080",
        _ => return None,
    };
    Some(named.to_string())
}

/// Split `image/png;base64,AAAA` into a file extension and decoded bytes
fn decode_data_uri(data_uri: &str) -> Option<(&'static str, Vec<u8>)> {
    let (meta, data) = data_uri.split_once(',')?;
    let mut params = meta.split(';');
    let mime = params.next()?.trim().to_ascii_lowercase();
    if !params.any(|p| p.trim().eq_ignore_ascii_case("base64")) {
        return None;
    }

    let extension = match mime.as_str() {
        "image/png" => "png",
        "image/jpeg" | "image/jpg" => "jpeg",
        "image/gif" => "gif",
        "image/bmp" => "bmp",
        "image/tiff" => "tiff",
        _ => return None,
    };

    let cleaned: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD.decode(cleaned).ok()?;
    Some((extension, bytes))
}

/// Display size in EMU, filling in missing dimensions and fitting the page width
fn image_extent(width: Option<u32>, height: Option<u32>) -> (u64, u64) {
    let (default_w, default_h) = DEFAULT_IMAGE_SIZE;
    let (w, h) = match (width, height) {
        (Some(w), Some(h)) => (w, h),
        (Some(w), None) => (w, w.saturating_mul(default_h) / default_w),
        (None, Some(h)) => (h.saturating_mul(default_w) / default_h, h),
        (None, None) => (default_w, default_h),
    };
    let (w, h) = (u64::from(w.max(1)), u64::from(h.max(1)));
    let max_w = u64::from(MAX_IMAGE_WIDTH_PX);
    let (w, h) = if w > max_w {
        (max_w, (h * max_w / w).max(1))
    } else {
        (w, h)
    };
    (w * EMU_PER_PX, h * EMU_PER_PX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_colors() {
        assert_eq!(css_color_to_hex("#ff0000"), Some("FF0000".to_string()));
        assert_eq!(css_color_to_hex("#0f8"), Some("00FF88".to_string()));
        assert_eq!(css_color_to_hex("#11223344"), Some("112233".to_string()));
        assert_eq!(css_color_to_hex("rgb(255, 0, 16)"), Some("FF0010".to_string()));
        assert_eq!(css_color_to_hex("rgba(1,2,3,0.5)"), Some("010203".to_string()));
        assert_eq!(css_color_to_hex("Red"), Some("FF0000".to_string()));
        assert_eq!(css_color_to_hex("#zzz"), None);
        assert_eq!(css_color_to_hex("rgb(300, 0, 0)"), None);
        assert_eq!(css_color_to_hex("var(--accent)"), None);
    }

    #[test]
    fn test_primary_font() {
        assert_eq!(primary_font("Georgia, serif"), Some("Georgia".to_string()));
        assert_eq!(
            primary_font("'Times New Roman', Times"),
            Some("Times New Roman".to_string())
        );
        assert_eq!(primary_font(" , serif"), None);
    }

    #[test]
    fn test_decode_data_uri() {
        let (ext, bytes) = decode_data_uri("image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(ext, "png");
        assert_eq!(bytes, b"hello");

        assert!(decode_data_uri("image/svg+xml;base64,aGVsbG8=").is_none());
        assert!(decode_data_uri("image/png,rawdata").is_none());
        assert!(decode_data_uri("image/png;base64,!!!").is_none());
    }

    #[test]
    fn test_image_extent() {
        assert_eq!(image_extent(None, None), (320 * 9525, 240 * 9525));
        assert_eq!(image_extent(Some(100), None), (100 * 9525, 75 * 9525));
        // Wider than the page: scaled down, aspect ratio kept
        assert_eq!(image_extent(Some(1248), Some(200)), (624 * 9525, 100 * 9525));
    }

    #[test]
    fn test_run_properties_order() {
        let marks = Marks {
            bold: true,
            italic: true,
            underline: true,
            strike: true,
            link: Some("https://example.com".to_string()),
            color: Some("#123456".to_string()),
            highlight: Some("#ffff00".to_string()),
            font_family: Some("Georgia".to_string()),
        };
        assert_eq!(
            run_properties(&marks, InheritedRun::default()),
            "<w:rStyle w:val=\"Hyperlink\"/>\
<w:rFonts w:ascii=\"Georgia\" w:hAnsi=\"Georgia\" w:eastAsia=\"Georgia\" w:cs=\"Georgia\"/>\
<w:b/><w:bCs/><w:i/><w:iCs/><w:strike/><w:color w:val=\"123456\"/>\
<w:u w:val=\"single\"/><w:shd w:val=\"clear\" w:color=\"auto\" w:fill=\"FFFF00\"/>"
        );
    }

    #[test]
    fn test_default_highlight() {
        let marks = Marks {
            highlight: Some(String::new()),
            ..Marks::default()
        };
        assert_eq!(
            run_properties(&marks, InheritedRun::default()),
            "<w:highlight w:val=\"yellow\"/>"
        );
    }

    #[test]
    fn test_inherited_color_yields_to_marks() {
        let quoted = InheritedRun {
            italic: true,
            color: Some(QUOTE_COLOR),
        };
        assert_eq!(
            run_properties(&Marks::default(), quoted),
            "<w:i/><w:iCs/><w:color w:val=\"595959\"/>"
        );

        let marks = Marks {
            color: Some("red".to_string()),
            ..Marks::default()
        };
        assert_eq!(
            run_properties(&marks, quoted),
            "<w:i/><w:iCs/><w:color w:val=\"FF0000\"/>"
        );
    }
}
