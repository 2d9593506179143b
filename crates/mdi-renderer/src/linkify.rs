//! Autolinking of bare URLs and email addresses in text.

use std::sync::LazyLock;

use regex::Regex;

use crate::token::{Nesting, Token, TokenKind};
use crate::util::{normalize_link, validate_link};

static LINK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:(?:https?|ftp)://|www\.)[^\s<>]+|[a-z0-9._%+-]+@[a-z0-9-]+(?:\.[a-z0-9-]+)+",
    )
    .expect("valid regex")
});

const TRAILING_PUNCTUATION: &[char] = &['.', ',', ':', ';', '!', '?', '"', '\''];

/// Wrap URLs in text tokens with link tokens, skipping text already inside a
/// link.
pub(crate) fn linkify(tokens: &mut [Token]) {
    for token in tokens.iter_mut().filter(|t| t.kind == TokenKind::INLINE) {
        token.children = linkify_inline(std::mem::take(&mut token.children));
    }
}

fn linkify_inline(children: Vec<Token>) -> Vec<Token> {
    let mut out = Vec::with_capacity(children.len());
    let mut link_depth = 0usize;

    for child in children {
        if child.kind == TokenKind::LINK_OPEN || is_html_link_open(&child) {
            link_depth += 1;
        } else if child.kind == TokenKind::LINK_CLOSE || is_html_link_close(&child) {
            link_depth = link_depth.saturating_sub(1);
        } else if child.kind == TokenKind::TEXT
            && link_depth == 0
            && LINK_PATTERN.is_match(&child.content)
        {
            split_links(&child.content, &mut out);
            continue;
        }
        out.push(child);
    }
    out
}

fn is_html_link_open(token: &Token) -> bool {
    token.kind == TokenKind::HTML_INLINE && {
        let lower = token.content.to_ascii_lowercase();
        lower.starts_with("<a>") || lower.starts_with("<a ")
    }
}

fn is_html_link_close(token: &Token) -> bool {
    token.kind == TokenKind::HTML_INLINE && token.content.eq_ignore_ascii_case("</a>")
}

fn split_links(text: &str, out: &mut Vec<Token>) {
    let mut last = 0;
    for found in LINK_PATTERN.find_iter(text) {
        let url = trim_url(found.as_str());
        let href = href_for(url);
        if url.is_empty() || !validate_link(&href) {
            continue;
        }

        let start = found.start();
        if start > last {
            out.push(Token::text(&text[last..start]));
        }
        out.push(Token::new(TokenKind::LINK_OPEN, "a", Nesting::Open).with_attr("href", normalize_link(&href)));
        out.push(Token::text(url));
        out.push(Token::new(TokenKind::LINK_CLOSE, "a", Nesting::Close));
        last = start + url.len();
    }
    if last < text.len() {
        out.push(Token::text(&text[last..]));
    }
}

/// Drop trailing punctuation and unbalanced closing parentheses.
fn trim_url(url: &str) -> &str {
    let mut url = url;
    loop {
        let trimmed = url.trim_end_matches(TRAILING_PUNCTUATION);
        let trimmed = if trimmed.ends_with(')') && trimmed.matches(')').count() > trimmed.matches('(').count() {
            &trimmed[..trimmed.len() - 1]
        } else {
            trimmed
        };
        if trimmed.len() == url.len() {
            return url;
        }
        url = trimmed;
    }
}

fn href_for(url: &str) -> String {
    if url.contains("://") {
        url.to_owned()
    } else if url.len() >= 4 && url[..4].eq_ignore_ascii_case("www.") {
        format!("http://{url}")
    } else {
        format!("mailto:{url}")
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::engine::{EngineOptions, MarkdownEngine};

    fn render(source: &str) -> String {
        MarkdownEngine::new(EngineOptions {
            linkify: true,
            ..EngineOptions::default()
        })
        .render(source)
    }

    #[test]
    fn test_linkify_url() {
        assert_eq!(
            render("see https://example.com/a."),
            "<p>see <a href=\"https://example.com/a\">https://example.com/a</a>.</p>\n"
        );
    }

    #[test]
    fn test_linkify_www_and_email() {
        assert_eq!(
            render("www.example.com or me@example.com"),
            "<p><a href=\"http://www.example.com\">www.example.com</a> or \
             <a href=\"mailto:me@example.com\">me@example.com</a></p>\n"
        );
    }

    #[test]
    fn test_linkify_balanced_parentheses() {
        assert_eq!(
            render("(https://example.com/a_(b))"),
            "<p>(<a href=\"https://example.com/a_(b)\">https://example.com/a_(b)</a>)</p>\n"
        );
    }

    #[test]
    fn test_linkify_skips_existing_links() {
        assert_eq!(
            render("[https://example.com](https://example.org)"),
            "<p><a href=\"https://example.org\">https://example.com</a></p>\n"
        );
    }

    #[test]
    fn test_linkify_skips_code() {
        assert_eq!(
            render("`https://example.com`"),
            "<p><code>https://example.com</code></p>\n"
        );
    }

    #[test]
    fn test_linkify_disabled_by_default() {
        let engine = MarkdownEngine::new(EngineOptions::default());
        assert_eq!(engine.render("https://example.com"), "<p>https://example.com</p>\n");
    }
}
