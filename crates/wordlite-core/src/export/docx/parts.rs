//! Fixed and generated package parts other than the document body

use super::body::{ListKind, Numbering, Relationship, RelationshipKind};
use crate::export::escape;

pub const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n";

/// Relationship ids reserved for the parts every package carries
pub const STYLES_REL_ID: &str = "rId1";
pub const NUMBERING_REL_ID: &str = "rId2";
pub const FIRST_DYNAMIC_REL_ID: u32 = 3;

/// Text color and left rule of the `Quote` style, also applied to headings
/// inside a blockquote
pub const QUOTE_COLOR: &str = "595959";
pub const QUOTE_BORDER: &str =
    "<w:pBdr><w:left w:val=\"single\" w:sz=\"18\" w:space=\"8\" w:color=\"BFBFBF\"/></w:pBdr>";

/// `[Content_Types].xml`, with a default entry for every media extension used
pub fn content_types(media_extensions: &[&str]) -> String {
    let mut xml = String::from(XML_DECLARATION);
    xml.push_str(
        "<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">\
<Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>\
<Default Extension=\"xml\" ContentType=\"application/xml\"/>",
    );
    for ext in media_extensions {
        xml.push_str(&format!(
            "<Default Extension=\"{}\" ContentType=\"{}\"/>",
            ext,
            image_content_type(ext)
        ));
    }
    xml.push_str(
        "<Override PartName=\"/word/document.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml\"/>\
<Override PartName=\"/word/styles.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml\"/>\
<Override PartName=\"/word/numbering.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml\"/>\
<Override PartName=\"/docProps/core.xml\" ContentType=\"application/vnd.openxmlformats-package.core-properties+xml\"/>\
<Override PartName=\"/docProps/app.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.extended-properties+xml\"/>\
</Types>",
    );
    xml
}

fn image_content_type(ext: &str) -> &'static str {
    match ext {
        "png" => "image/png",
        "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tiff" => "image/tiff",
        _ => "application/octet-stream",
    }
}

/// `_rels/.rels`
pub fn package_relationships() -> String {
    let mut xml = String::from(XML_DECLARATION);
    xml.push_str(
        "<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
<Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument\" Target=\"word/document.xml\"/>\
<Relationship Id=\"rId2\" Type=\"http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties\" Target=\"docProps/core.xml\"/>\
<Relationship Id=\"rId3\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties\" Target=\"docProps/app.xml\"/>\
</Relationships>",
    );
    xml
}

/// `docProps/core.xml`; carries the title but no timestamps, so output stays
/// deterministic
pub fn core_properties(title: &str) -> String {
    let mut xml = String::from(XML_DECLARATION);
    xml.push_str(&format!(
        "<cp:coreProperties xmlns:cp=\"http://schemas.openxmlformats.org/package/2006/metadata/core-properties\" \
xmlns:dc=\"http://purl.org/dc/elements/1.1/\" xmlns:dcterms=\"http://purl.org/dc/terms/\" \
xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\">\
<dc:title>{}</dc:title><dc:creator>wordlite</dc:creator></cp:coreProperties>",
        escape::xml_text(title)
    ));
    xml
}

/// `docProps/app.xml`
pub fn app_properties() -> String {
    let mut xml = String::from(XML_DECLARATION);
    xml.push_str(
        "<Properties xmlns=\"http://schemas.openxmlformats.org/officeDocument/2006/extended-properties\">\
<Application>wordlite</Application></Properties>",
    );
    xml
}

/// `word/_rels/document.xml.rels`
pub fn document_relationships(dynamic: &[Relationship]) -> String {
    let mut xml = String::from(XML_DECLARATION);
    xml.push_str("<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">");
    xml.push_str(&format!(
        "<Relationship Id=\"{}\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles\" Target=\"styles.xml\"/>",
        STYLES_REL_ID
    ));
    xml.push_str(&format!(
        "<Relationship Id=\"{}\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering\" Target=\"numbering.xml\"/>",
        NUMBERING_REL_ID
    ));
    for rel in dynamic {
        let kind = match rel.kind {
            RelationshipKind::Hyperlink => "hyperlink",
            RelationshipKind::Image => "image",
        };
        xml.push_str(&format!(
            "<Relationship Id=\"{}\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/{}\" Target=\"{}\"{}/>",
            rel.id,
            kind,
            escape::xml_attr(&rel.target),
            if rel.external { " TargetMode=\"External\"" } else { "" }
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

/// `word/styles.xml`: document defaults plus the paragraph and character
/// styles the body refers to
pub fn styles() -> String {
    let mut xml = String::from(XML_DECLARATION);
    xml.push_str(
        "<w:styles xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
<w:docDefaults><w:rPrDefault><w:rPr>\
<w:rFonts w:ascii=\"Arial\" w:hAnsi=\"Arial\" w:eastAsia=\"Arial\" w:cs=\"Arial\"/>\
<w:sz w:val=\"22\"/><w:szCs w:val=\"22\"/><w:lang w:val=\"en-US\"/>\
</w:rPr></w:rPrDefault>\
<w:pPrDefault><w:pPr><w:spacing w:after=\"160\" w:line=\"259\" w:lineRule=\"auto\"/></w:pPr></w:pPrDefault>\
</w:docDefaults>\
<w:style w:type=\"paragraph\" w:default=\"1\" w:styleId=\"Normal\"><w:name w:val=\"Normal\"/><w:qFormat/></w:style>",
    );
    for (level, size) in [(1u8, 32u8), (2, 26), (3, 24)] {
        xml.push_str(&format!(
            "<w:style w:type=\"paragraph\" w:styleId=\"Heading{level}\"><w:name w:val=\"heading {level}\"/>\
<w:basedOn w:val=\"Normal\"/><w:next w:val=\"Normal\"/><w:qFormat/>\
<w:pPr><w:keepNext/><w:spacing w:before=\"240\" w:after=\"120\"/><w:outlineLvl w:val=\"{outline}\"/></w:pPr>\
<w:rPr><w:b/><w:bCs/><w:sz w:val=\"{size}\"/><w:szCs w:val=\"{size}\"/></w:rPr></w:style>",
            level = level,
            outline = level - 1,
            size = size
        ));
    }
    xml.push_str(&format!(
        "<w:style w:type=\"paragraph\" w:styleId=\"Quote\"><w:name w:val=\"Quote\"/>\
<w:basedOn w:val=\"Normal\"/><w:next w:val=\"Normal\"/><w:qFormat/>\
<w:pPr>{}</w:pPr><w:rPr><w:i/><w:iCs/><w:color w:val=\"{}\"/></w:rPr></w:style>",
        QUOTE_BORDER, QUOTE_COLOR
    ));
    xml.push_str(
        "<w:style w:type=\"paragraph\" w:styleId=\"ListParagraph\"><w:name w:val=\"List Paragraph\"/>\
<w:basedOn w:val=\"Normal\"/><w:qFormat/><w:pPr><w:contextualSpacing/></w:pPr></w:style>\
<w:style w:type=\"character\" w:styleId=\"Hyperlink\"><w:name w:val=\"Hyperlink\"/>\
<w:rPr><w:color w:val=\"0563C1\"/><w:u w:val=\"single\"/></w:rPr></w:style>\
</w:styles>",
    );
    xml
}

/// Abstract numbering id of each list kind
pub fn abstract_num_id(kind: ListKind) -> u32 {
    match kind {
        ListKind::Bullet => 0,
        ListKind::Ordered => 1,
    }
}

const BULLETS: [&str; 3] = ["\u{2022}", "\u{25E6}", "\u{25AA}"];
const ORDERED_FORMATS: [&str; 3] = ["decimal", "lowerLetter", "lowerRoman"];

/// `word/numbering.xml`: one abstract definition per list kind, one concrete
/// instance per list so every list numbers independently
pub fn numbering(numbering: &Numbering) -> String {
    let mut xml = String::from(XML_DECLARATION);
    xml.push_str("<w:numbering xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">");

    for kind in [ListKind::Bullet, ListKind::Ordered] {
        xml.push_str(&format!(
            "<w:abstractNum w:abstractNumId=\"{}\"><w:multiLevelType w:val=\"hybridMultilevel\"/>",
            abstract_num_id(kind)
        ));
        for ilvl in 0..9usize {
            let (num_fmt, text) = match kind {
                ListKind::Bullet => ("bullet", BULLETS[ilvl % BULLETS.len()].to_string()),
                ListKind::Ordered => (
                    ORDERED_FORMATS[ilvl % ORDERED_FORMATS.len()],
                    format!("%{}.", ilvl + 1),
                ),
            };
            xml.push_str(&format!(
                "<w:lvl w:ilvl=\"{ilvl}\"><w:start w:val=\"1\"/><w:numFmt w:val=\"{num_fmt}\"/>\
<w:lvlText w:val=\"{text}\"/><w:lvlJc w:val=\"left\"/>\
<w:pPr><w:ind w:left=\"{left}\" w:hanging=\"360\"/></w:pPr></w:lvl>",
                ilvl = ilvl,
                num_fmt = num_fmt,
                text = text,
                left = 720 * (ilvl + 1)
            ));
        }
        xml.push_str("</w:abstractNum>");
    }

    for instance in &numbering.instances {
        xml.push_str(&format!(
            "<w:num w:numId=\"{}\"><w:abstractNumId w:val=\"{}\"/>",
            instance.num_id,
            abstract_num_id(instance.kind)
        ));
        if instance.kind == ListKind::Ordered {
            xml.push_str(&format!(
                "<w:lvlOverride w:ilvl=\"{}\"><w:startOverride w:val=\"{}\"/></w:lvlOverride>",
                instance.level, instance.start
            ));
        }
        xml.push_str("</w:num>");
    }

    xml.push_str("</w:numbering>");
    xml
}
