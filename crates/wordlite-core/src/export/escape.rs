//! Markup escaping shared by the HTML and DOCX renderers

use std::borrow::Cow;

/// Escape text content for HTML or XML element bodies
pub fn text(input: &str) -> Cow<'_, str> {
    escape(input, false)
}

/// Escape a value for a double- or single-quoted attribute
pub fn attr(input: &str) -> Cow<'_, str> {
    escape(input, true)
}

/// Escape XML text, dropping characters XML 1.0 cannot carry
pub fn xml_text(input: &str) -> Cow<'_, str> {
    if input.chars().all(is_xml_char) {
        return text(input);
    }
    let cleaned: String = input.chars().filter(|c| is_xml_char(*c)).collect();
    Cow::Owned(text(&cleaned).into_owned())
}

/// Escape an XML attribute value, dropping characters XML 1.0 cannot carry
pub fn xml_attr(input: &str) -> Cow<'_, str> {
    if input.chars().all(is_xml_char) {
        return attr(input);
    }
    let cleaned: String = input.chars().filter(|c| is_xml_char(*c)).collect();
    Cow::Owned(attr(&cleaned).into_owned())
}

fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r') || (c >= ' ' && c != '\u{FFFE}' && c != '\u{FFFF}')
}

fn escape(input: &str, quotes: bool) -> Cow<'_, str> {
    let needs_escape = |c: char| matches!(c, '&' | '<' | '>') || (quotes && matches!(c, '"' | '\''));
    if !input.chars().any(needs_escape) {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len() + 16);
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if quotes => out.push_str("&quot;"),
            '\'' if quotes => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_borrowed() {
        assert!(matches!(text("hello"), Cow::Borrowed("hello")));
    }

    #[test]
    fn test_text_escaping() {
        assert_eq!(text("<b>&</b>"), "&lt;b&gt;&amp;&lt;/b&gt;");
        // Quotes are fine in element bodies
        assert_eq!(text("\"hi\""), "\"hi\"");
    }

    #[test]
    fn test_attr_escaping() {
        assert_eq!(attr("a\"b'c"), "a&quot;b&#39;c");
    }

    #[test]
    fn test_xml_drops_control_characters() {
        assert_eq!(xml_text("a\u{0}b\u{1b}c\td"), "abc\td");
        assert_eq!(xml_attr("x\u{8}<y"), "x&lt;y");
    }
}
