use crate::geometry::markup;
use crate::remote::RemoteError;

/// Moves the backend's sizing `<rect>` onto the root element.
///
/// Generated art carries its dimensions on the first `<rect>` inside the
/// `<svg>`; the rect's `width`/`height` are copied to the root and the rect is
/// removed so it is never plotted.
pub fn normalize_svg(svg: &str) -> Result<String, RemoteError> {
    let root = markup::find_tags(svg, &["svg"])
        .into_iter()
        .next()
        .ok_or_else(|| RemoteError::MalformedResponse("response has no <svg> element".into()))?;

    let (rect_element, rect_tag) = markup::find_element(svg, "rect", root.span.end)
        .ok_or_else(|| RemoteError::MalformedResponse("svg has no sizing <rect>".into()))?;

    let rect = &svg[rect_tag];
    let width = markup::attribute(rect, "width")
        .ok_or_else(|| RemoteError::MalformedResponse("sizing <rect> has no width".into()))?;
    let height = markup::attribute(rect, "height")
        .ok_or_else(|| RemoteError::MalformedResponse("sizing <rect> has no height".into()))?;

    let root_tag = markup::set_attribute(root.text, "width", &width);
    let root_tag = markup::set_attribute(&root_tag, "height", &height);

    let mut normalized = String::with_capacity(svg.len());
    normalized.push_str(&svg[..root.span.start]);
    normalized.push_str(&root_tag);
    normalized.push_str(&svg[root.span.end..rect_element.start]);
    normalized.push_str(&svg[rect_element.end..]);

    log::debug!("Normalized svg to {}x{}", width, height);
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_size_moves_to_root() {
        let svg = "<svg xmlns=\"http://www.w3.org/2000/svg\"><rect width='50' height='50'/><path d=\"M0 0 L1 1\"/></svg>";

        let normalized = normalize_svg(svg).unwrap();

        assert!(normalized.starts_with(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"50\" height=\"50\">"
        ));
        assert!(!normalized.contains("<rect"));
        assert!(normalized.contains("<path d=\"M0 0 L1 1\"/>"));
    }

    #[test]
    fn existing_root_size_is_replaced() {
        let svg = "<?xml version=\"1.0\"?>\n<svg width=\"100%\" height=\"100%\">\n  <rect x=\"0\" y=\"0\" width=\"300\" height=\"120\" fill=\"white\"></rect>\n</svg>";

        let normalized = normalize_svg(svg).unwrap();

        assert!(normalized.contains("<svg width=\"300\" height=\"120\">"));
        assert!(!normalized.contains("rect"));
        assert!(normalized.starts_with("<?xml"));
    }

    #[test]
    fn only_first_rect_is_removed() {
        let svg = "<svg><rect width='10' height='20'/><rect width='1' height='1'/></svg>";
        let normalized = normalize_svg(svg).unwrap();
        assert_eq!(
            normalized,
            "<svg width=\"10\" height=\"20\"><rect width='1' height='1'/></svg>"
        );
    }

    #[test]
    fn missing_pieces_are_malformed() {
        for svg in [
            "<html></html>",
            "<svg><path d='M0 0'/></svg>",
            "<svg><rect height='5'/></svg>",
            "<svg><rect width='5'/></svg>",
        ] {
            assert!(
                matches!(normalize_svg(svg), Err(RemoteError::MalformedResponse(_))),
                "{svg}"
            );
        }
    }
}
