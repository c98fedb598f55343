//! Minimal tag-level helpers for the SVG documents returned by the compute backend.
//!
//! The backend emits flat, machine-generated SVG, so elements are located with
//! regular expressions rather than a full XML parser.

use std::ops::Range;

use regex::Regex;

/// A start tag (or self-closing tag) located in a document.
#[derive(Debug, Clone)]
pub(crate) struct Tag<'a> {
    pub name: &'a str,
    pub text: &'a str,
    pub span: Range<usize>,
}

impl<'a> Tag<'a> {
    pub fn attribute(&self, name: &str) -> Option<String> {
        attribute(self.text, name)
    }
}

fn attribute_pattern(name: &str) -> Regex {
    Regex::new(&format!(
        r#"(?:\s){}\s*=\s*(?:"([^"]*)"|'([^']*)')"#,
        regex::escape(name)
    ))
    .expect("attribute pattern is valid")
}

/// Reads an attribute value from a tag's text, accepting single or double quotes.
pub(crate) fn attribute(tag: &str, name: &str) -> Option<String> {
    let captures = attribute_pattern(name).captures(tag)?;
    captures
        .get(1)
        .or_else(|| captures.get(2))
        .map(|value| value.as_str().to_string())
}

/// Returns `tag` with `name` set to `value`, replacing an existing value or
/// inserting the attribute before the tag's closing bracket.
pub(crate) fn set_attribute(tag: &str, name: &str, value: &str) -> String {
    let pattern = attribute_pattern(name);
    let replacement = format!(r#" {}="{}""#, name, value);
    if pattern.is_match(tag) {
        return pattern
            .replace(tag, regex::NoExpand(&replacement))
            .into_owned();
    }

    let insert_at = if tag.ends_with("/>") {
        tag.len() - 2
    } else {
        tag.len() - 1
    };
    let mut updated = String::with_capacity(tag.len() + replacement.len());
    updated.push_str(tag[..insert_at].trim_end());
    updated.push_str(&replacement);
    updated.push_str(&tag[insert_at..]);
    updated
}

/// Finds every start tag whose name is one of `names`, in document order.
pub(crate) fn find_tags<'a>(document: &'a str, names: &[&str]) -> Vec<Tag<'a>> {
    let alternatives = names
        .iter()
        .map(|name| regex::escape(name))
        .collect::<Vec<_>>()
        .join("|");
    let pattern = Regex::new(&format!(r"(?s)<({})\b[^>]*>", alternatives))
        .expect("tag pattern is valid");

    pattern
        .captures_iter(document)
        .filter_map(|captures| {
            let whole = captures.get(0)?;
            let name = captures.get(1)?;
            Some(Tag {
                name: name.as_str(),
                text: whole.as_str(),
                span: whole.range(),
            })
        })
        .collect()
}

/// Locates a complete element (start tag through matching end tag, or a
/// self-closing tag) beginning at or after `from`.
pub(crate) fn find_element(
    document: &str,
    name: &str,
    from: usize,
) -> Option<(Range<usize>, Range<usize>)> {
    let escaped = regex::escape(name);
    let pattern = Regex::new(&format!(
        r"(?s)<{escaped}\b[^>]*?(?:/>|>.*?</{escaped}\s*>)"
    ))
    .expect("element pattern is valid");
    let start_tag = Regex::new(&format!(r"(?s)<{escaped}\b[^>]*>")).expect("tag pattern is valid");

    let found = pattern.find_at(document, from)?;
    let tag = start_tag.find_at(document, found.start())?;
    Some((found.range(), tag.range()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_accepts_both_quote_styles() {
        assert_eq!(
            attribute("<rect width='50' height=\"40\"/>", "width").as_deref(),
            Some("50")
        );
        assert_eq!(
            attribute("<rect width='50' height=\"40\"/>", "height").as_deref(),
            Some("40")
        );
    }

    #[test]
    fn attribute_ignores_hyphenated_lookalikes() {
        assert_eq!(attribute("<path stroke-width=\"3\"/>", "width"), None);
    }

    #[test]
    fn set_attribute_replaces_or_inserts() {
        assert_eq!(
            set_attribute("<svg width=\"100%\">", "width", "50"),
            "<svg width=\"50\">"
        );
        assert_eq!(set_attribute("<svg>", "width", "50"), "<svg width=\"50\">");
        assert_eq!(
            set_attribute("<rect x='1' />", "height", "2"),
            "<rect x='1' height=\"2\"/>"
        );
    }

    #[test]
    fn find_tags_keeps_document_order_and_skips_prefixes() {
        let doc = "<svg><line x1='0'/><linearGradient/><path d='M0 0'/><polyline points='1,2'/></svg>";
        let names: Vec<_> = find_tags(doc, &["path", "polyline", "polygon", "line"])
            .into_iter()
            .map(|tag| tag.name)
            .collect();
        assert_eq!(names, vec!["line", "path", "polyline"]);
    }

    #[test]
    fn find_element_covers_open_close_pairs() {
        let doc = "<svg><rect width='1'></rect><g/></svg>";
        let (element, tag) = find_element(doc, "rect", 0).unwrap();
        assert_eq!(&doc[element], "<rect width='1'></rect>");
        assert_eq!(&doc[tag], "<rect width='1'>");
    }
}
