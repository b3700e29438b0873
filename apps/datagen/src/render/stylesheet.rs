//! Stylesheet inlining. The HTML→PDF converter runs on a copy of the document
//! outside the template folder, so the relative `style.css` link would not resolve.

use std::sync::LazyLock;

use regex::Regex;

static RE_STYLESHEET_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<link\s+rel="stylesheet"\s+href="style\.css"\s*/?>"#)
        .expect("valid stylesheet link regex")
});

pub fn has_stylesheet_link(html: &str) -> bool {
    RE_STYLESHEET_LINK.is_match(html)
}

/// Replaces the `style.css` link with an inline `<style>` block.
///
/// Returns `None` when there is no link to replace (already inlined, or the
/// template never linked one).
pub fn inline_stylesheet(html: &str, css: &str) -> Option<String> {
    if !has_stylesheet_link(html) {
        return None;
    }
    let block = format!("<style>\n{css}\n</style>");
    Some(
        RE_STYLESHEET_LINK
            .replacen(html, 1, regex::NoExpand(&block))
            .into_owned(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_replaced_with_style_block() {
        let html = r#"<head><link rel="stylesheet" href="style.css"></head>"#;
        let out = inline_stylesheet(html, "body { margin: 0; }").unwrap();
        assert_eq!(out, "<head><style>\nbody { margin: 0; }\n</style></head>");
        assert!(!has_stylesheet_link(&out));
    }

    #[test]
    fn test_self_closing_link_recognised() {
        assert!(has_stylesheet_link(r#"<link rel="stylesheet" href="style.css" />"#));
    }

    #[test]
    fn test_already_inlined_returns_none() {
        assert_eq!(inline_stylesheet("<style>p{}</style>", "p{}"), None);
    }

    #[test]
    fn test_css_with_dollar_signs_kept_verbatim() {
        let html = r#"<link rel="stylesheet" href="style.css">"#;
        let out = inline_stylesheet(html, "a::after { content: '$1'; }").unwrap();
        assert!(out.contains("content: '$1'"));
    }
}
