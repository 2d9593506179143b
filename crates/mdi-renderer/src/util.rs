//! Shared utility functions for markdown rendering.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use pulldown_cmark::HeadingLevel;

/// Escape `&`, `<`, `>` and `"` for HTML text and attribute values.
///
/// # Examples
///
/// ```
/// use mdi_renderer::escape_html;
///
/// assert_eq!(escape_html(r#"<a href="x">&"#), "&lt;a href=&quot;x&quot;&gt;&amp;");
/// ```
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            _ => result.push(ch),
        }
    }
    result
}

/// Bytes encoded in link destinations: everything except ASCII alphanumerics
/// and `;/?:@&=+$,-_.!~*'()#`.
const LINK_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b';')
    .remove(b'/')
    .remove(b'?')
    .remove(b':')
    .remove(b'@')
    .remove(b'&')
    .remove(b'=')
    .remove(b'+')
    .remove(b'$')
    .remove(b',')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'#');

/// Percent-encode a link destination.
///
/// Existing `%XX` escapes are kept; every other byte outside the URL-safe set
/// is encoded.
///
/// # Examples
///
/// ```
/// use mdi_renderer::normalize_link;
///
/// assert_eq!(normalize_link("/a b?q=1%20"), "/a%20b?q=1%20");
/// assert_eq!(normalize_link("/ü"), "/%C3%BC");
/// ```
#[must_use]
pub fn normalize_link(url: &str) -> String {
    let mut result = String::with_capacity(url.len());
    let mut rest = url;
    while let Some(pos) = rest.find('%') {
        let (segment, tail) = rest.split_at(pos);
        result.extend(utf8_percent_encode(segment, LINK_ENCODE_SET));
        if is_escape(tail) {
            result.push_str(&tail[..3]);
            rest = &tail[3..];
        } else {
            result.push_str("%25");
            rest = &tail[1..];
        }
    }
    result.extend(utf8_percent_encode(rest, LINK_ENCODE_SET));
    result
}

/// Whether `text` starts with a `%XX` escape.
fn is_escape(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() >= 3 && bytes[1].is_ascii_hexdigit() && bytes[2].is_ascii_hexdigit()
}

/// Whether a link destination is safe to emit.
///
/// Script-capable protocols are rejected; `data:` is allowed for common
/// image types only.
#[must_use]
pub fn validate_link(url: &str) -> bool {
    let url = url.trim().to_ascii_lowercase();
    if url.starts_with("data:") {
        return ["data:image/gif;", "data:image/png;", "data:image/jpeg;", "data:image/webp;"]
            .iter()
            .any(|prefix| url.starts_with(prefix));
    }
    !["javascript:", "vbscript:", "file:"]
        .iter()
        .any(|prefix| url.starts_with(prefix))
}

/// Convert heading level enum to number (1-6).
#[must_use]
pub(crate) fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html_passes_plain_text() {
        assert_eq!(escape_html("plain 'text'"), "plain 'text'");
    }

    #[test]
    fn test_normalize_link_keeps_reserved() {
        assert_eq!(
            normalize_link("https://example.com/a?b=c&d=e#f"),
            "https://example.com/a?b=c&d=e#f"
        );
    }

    #[test]
    fn test_normalize_link_encodes_lone_percent() {
        assert_eq!(normalize_link("100%"), "100%25");
        assert_eq!(normalize_link("%zz"), "%25zz");
        assert_eq!(normalize_link("a%2"), "a%252");
    }

    #[test]
    fn test_normalize_link_encodes_around_escapes() {
        assert_eq!(normalize_link("ä%41 [x]"), "%C3%A4%41%20%5Bx%5D");
    }

    #[test]
    fn test_validate_link() {
        assert!(validate_link("https://example.com"));
        assert!(validate_link("/relative"));
        assert!(validate_link("data:image/png;base64,AAAA"));
        assert!(!validate_link("javascript:alert(1)"));
        assert!(!validate_link("  JavaScript:alert(1)"));
        assert!(!validate_link("data:text/html;base64,AAAA"));
        assert!(!validate_link("file:///etc/passwd"));
    }

    #[test]
    fn test_heading_level_to_num() {
        assert_eq!(heading_level_to_num(HeadingLevel::H1), 1);
        assert_eq!(heading_level_to_num(HeadingLevel::H6), 6);
    }
}
