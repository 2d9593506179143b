//! Render rules.
//!
//! A [`Rule`] turns the token at `idx` into markup. The [`RuleTable`] maps
//! token kinds to rules and falls back to [`render_token`] for kinds without
//! one of their own.

use std::collections::HashMap;
use std::fmt::{self, Write};
use std::sync::Arc;

use crate::engine::EngineOptions;
use crate::token::{Nesting, Token, TokenKind, add_class};
use crate::util::escape_html;

/// Render rule: `(tokens, idx, options) -> markup`.
pub type Rule = Arc<dyn Fn(&[Token], usize, &EngineOptions) -> String + Send + Sync>;

/// Rules keyed by token kind, plus the fallback rule.
#[derive(Clone)]
pub struct RuleTable {
    rules: HashMap<TokenKind, Rule>,
    default_rule: Rule,
}

impl Default for RuleTable {
    fn default() -> Self {
        let mut rules: HashMap<TokenKind, Rule> = HashMap::new();
        rules.insert(TokenKind::CODE_INLINE, Arc::new(code_inline));
        rules.insert(TokenKind::CODE_BLOCK, Arc::new(code_block));
        rules.insert(TokenKind::FENCE, Arc::new(fence));
        rules.insert(TokenKind::IMAGE, Arc::new(image));
        rules.insert(TokenKind::HARDBREAK, Arc::new(hardbreak));
        rules.insert(TokenKind::SOFTBREAK, Arc::new(softbreak));
        rules.insert(TokenKind::TEXT, Arc::new(text));
        rules.insert(TokenKind::HTML_BLOCK, Arc::new(html));
        rules.insert(TokenKind::HTML_INLINE, Arc::new(html));

        Self {
            rules,
            default_rule: Arc::new(render_token),
        }
    }
}

impl fmt::Debug for RuleTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<&str> = self.rules.keys().map(TokenKind::as_str).collect();
        kinds.sort_unstable();
        f.debug_struct("RuleTable").field("rules", &kinds).finish_non_exhaustive()
    }
}

impl RuleTable {
    /// Rule registered for `kind`.
    #[must_use]
    pub fn get(&self, kind: &TokenKind) -> Option<&Rule> {
        self.rules.get(kind)
    }

    #[must_use]
    pub fn contains(&self, kind: &TokenKind) -> bool {
        self.rules.contains_key(kind)
    }

    /// Register `rule` for `kind`, returning the rule it replaces.
    pub fn set(&mut self, kind: TokenKind, rule: Rule) -> Option<Rule> {
        self.rules.insert(kind, rule)
    }

    /// Remove the rule for `kind`; its tokens fall back to the default rule.
    pub fn remove(&mut self, kind: &TokenKind) -> Option<Rule> {
        self.rules.remove(kind)
    }

    /// Fallback rule for kinds without their own.
    #[must_use]
    pub fn default_rule(&self) -> &Rule {
        &self.default_rule
    }

    pub fn set_default_rule(&mut self, rule: Rule) {
        self.default_rule = rule;
    }

    /// Replace the rule for `kind` with `wrap(rule)`.
    ///
    /// Returns `false` (and leaves the table alone) when `kind` has no rule.
    pub fn decorate(&mut self, kind: &TokenKind, wrap: impl FnOnce(Rule) -> Rule) -> bool {
        match self.rules.remove(kind) {
            Some(rule) => {
                self.rules.insert(kind.clone(), wrap(rule));
                true
            }
            None => false,
        }
    }

    /// Replace the fallback rule with `wrap(default_rule)`.
    pub fn decorate_default(&mut self, wrap: impl FnOnce(Rule) -> Rule) {
        self.default_rule = wrap(Arc::clone(&self.default_rule));
    }

    /// Render `tokens[idx]` with its rule.
    pub(crate) fn render(&self, tokens: &[Token], idx: usize, options: &EngineOptions) -> String {
        let rule = self
            .rules
            .get(&tokens[idx].kind)
            .unwrap_or(&self.default_rule);
        rule(tokens, idx, options)
    }
}

/// Default rule: render a token as an opening, closing or void tag.
///
/// Block tokens end with a line feed unless they open a container whose
/// content starts inline, and a block token following a hidden one starts
/// with a line feed. Hidden tokens render nothing.
pub fn render_token(tokens: &[Token], idx: usize, options: &EngineOptions) -> String {
    let token = &tokens[idx];
    if token.hidden {
        return String::new();
    }

    let mut result = String::new();
    if token.block && token.nesting != Nesting::Close && idx > 0 && tokens[idx - 1].hidden {
        result.push('\n');
    }

    result.push_str(if token.nesting == Nesting::Close { "</" } else { "<" });
    result.push_str(&token.tag);
    result.push_str(&render_attrs(&token.attrs));

    if token.nesting == Nesting::Leaf && options.xhtml_out {
        result.push_str(" /");
    }

    let mut need_lf = false;
    if token.block {
        need_lf = true;
        if token.nesting == Nesting::Open
            && let Some(next) = tokens.get(idx + 1)
            && (next.kind == TokenKind::INLINE
                || next.hidden
                || (next.nesting == Nesting::Close && next.tag == token.tag))
        {
            need_lf = false;
        }
    }

    result.push_str(if need_lf { ">\n" } else { ">" });
    result
}

/// Render attributes as ` name="value"` pairs.
pub(crate) fn render_attrs(attrs: &[(String, String)]) -> String {
    let mut out = String::new();
    for (name, value) in attrs {
        write!(out, r#" {}="{}""#, escape_html(name), escape_html(value)).unwrap();
    }
    out
}

fn code_inline(tokens: &[Token], idx: usize, _options: &EngineOptions) -> String {
    let token = &tokens[idx];
    format!(
        "<code{}>{}</code>",
        render_attrs(&token.attrs),
        escape_html(&token.content)
    )
}

fn code_block(tokens: &[Token], idx: usize, _options: &EngineOptions) -> String {
    let token = &tokens[idx];
    format!(
        "<pre{}><code>{}</code></pre>\n",
        render_attrs(&token.attrs),
        escape_html(&token.content)
    )
}

fn fence(tokens: &[Token], idx: usize, options: &EngineOptions) -> String {
    let token = &tokens[idx];
    let lang = token.info.split_whitespace().next().unwrap_or_default();
    let code = escape_html(&token.content);

    if lang.is_empty() {
        return format!("<pre><code{}>{code}</code></pre>\n", render_attrs(&token.attrs));
    }

    let mut attrs = token.attrs.clone();
    add_class(&mut attrs, &format!("{}{lang}", options.lang_prefix));
    format!("<pre><code{}>{code}</code></pre>\n", render_attrs(&attrs))
}

fn image(tokens: &[Token], idx: usize, options: &EngineOptions) -> String {
    let mut token = tokens[idx].clone();
    let alt = token.children_text();
    token.set_attr("alt", alt);
    render_token(std::slice::from_ref(&token), 0, options)
}

fn hardbreak(_tokens: &[Token], _idx: usize, options: &EngineOptions) -> String {
    if options.xhtml_out {
        "<br />\n".to_owned()
    } else {
        "<br>\n".to_owned()
    }
}

fn softbreak(tokens: &[Token], idx: usize, options: &EngineOptions) -> String {
    if options.breaks {
        hardbreak(tokens, idx, options)
    } else {
        "\n".to_owned()
    }
}

fn text(tokens: &[Token], idx: usize, _options: &EngineOptions) -> String {
    escape_html(&tokens[idx].content)
}

fn html(tokens: &[Token], idx: usize, _options: &EngineOptions) -> String {
    tokens[idx].content.clone()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn options() -> EngineOptions {
        EngineOptions::default()
    }

    #[test]
    fn test_render_token_block_open_before_inline() {
        let tokens = vec![
            Token::block(TokenKind::PARAGRAPH_OPEN, "p", Nesting::Open),
            Token::block(TokenKind::INLINE, "", Nesting::Leaf),
            Token::block(TokenKind::PARAGRAPH_CLOSE, "p", Nesting::Close),
        ];
        assert_eq!(render_token(&tokens, 0, &options()), "<p>");
        assert_eq!(render_token(&tokens, 2, &options()), "</p>\n");
    }

    #[test]
    fn test_render_token_container_open() {
        let tokens = vec![
            Token::block(TokenKind::BLOCKQUOTE_OPEN, "blockquote", Nesting::Open),
            Token::block(TokenKind::PARAGRAPH_OPEN, "p", Nesting::Open),
        ];
        assert_eq!(render_token(&tokens, 0, &options()), "<blockquote>\n");
    }

    #[test]
    fn test_render_token_after_hidden() {
        let mut hidden = Token::block(TokenKind::PARAGRAPH_CLOSE, "p", Nesting::Close);
        hidden.hidden = true;
        let tokens = vec![
            hidden,
            Token::block(TokenKind::BULLET_LIST_OPEN, "ul", Nesting::Open),
            Token::block(TokenKind::LIST_ITEM_OPEN, "li", Nesting::Open),
        ];
        assert_eq!(render_token(&tokens, 0, &options()), "");
        assert_eq!(render_token(&tokens, 1, &options()), "\n<ul>\n");
    }

    #[test]
    fn test_render_token_leaf_with_attrs() {
        let tokens = vec![
            Token::new(TokenKind::IMAGE, "img", Nesting::Leaf)
                .with_attr("src", "a&b.png")
                .with_attr("alt", "\"quoted\""),
        ];
        assert_eq!(
            render_token(&tokens, 0, &options()),
            r#"<img src="a&amp;b.png" alt="&quot;quoted&quot;">"#
        );

        let xhtml = EngineOptions {
            xhtml_out: true,
            ..options()
        };
        assert_eq!(
            render_token(&tokens, 0, &xhtml),
            r#"<img src="a&amp;b.png" alt="&quot;quoted&quot;" />"#
        );
    }

    #[test]
    fn test_fence_with_language() {
        let mut token = Token::block(TokenKind::FENCE, "code", Nesting::Leaf).with_content("a < b\n");
        token.info = "rust ignore".to_owned();
        assert_eq!(
            fence(&[token], 0, &options()),
            "<pre><code class=\"language-rust\">a &lt; b\n</code></pre>\n"
        );
    }

    #[test]
    fn test_fence_without_language() {
        let token = Token::block(TokenKind::FENCE, "code", Nesting::Leaf).with_content("x\n");
        assert_eq!(fence(&[token], 0, &options()), "<pre><code>x\n</code></pre>\n");
    }

    #[test]
    fn test_fence_uses_lang_prefix() {
        let mut token = Token::block(TokenKind::FENCE, "code", Nesting::Leaf).with_content("x");
        token.info = "js".to_owned();
        let options = EngineOptions {
            lang_prefix: "lang-".to_owned(),
            ..options()
        };
        assert_eq!(
            fence(&[token], 0, &options),
            "<pre><code class=\"lang-js\">x</code></pre>\n"
        );
    }

    #[test]
    fn test_breaks() {
        let tokens = vec![Token::new(TokenKind::SOFTBREAK, "br", Nesting::Leaf)];
        assert_eq!(softbreak(&tokens, 0, &options()), "\n");

        let breaks = EngineOptions {
            breaks: true,
            ..options()
        };
        assert_eq!(softbreak(&tokens, 0, &breaks), "<br>\n");
        assert_eq!(hardbreak(&tokens, 0, &options()), "<br>\n");
    }

    #[test]
    fn test_image_alt_from_children() {
        let mut token = Token::new(TokenKind::IMAGE, "img", Nesting::Leaf)
            .with_attr("src", "a.png")
            .with_attr("alt", "");
        token.children = vec![Token::text("a \"cat\"")];
        assert_eq!(
            image(&[token], 0, &options()),
            r#"<img src="a.png" alt="a &quot;cat&quot;">"#
        );
    }

    #[test]
    fn test_decorate_rule() {
        let mut table = RuleTable::default();
        let wrapped = table.decorate(&TokenKind::TEXT, |rule| {
            Arc::new(move |tokens: &[Token], idx: usize, options: &EngineOptions| {
                format!("[{}]", rule(tokens, idx, options))
            })
        });
        assert!(wrapped);
        assert!(!table.decorate(&TokenKind::custom("missing"), |rule| rule));

        let tokens = vec![Token::text("a&b")];
        assert_eq!(table.render(&tokens, 0, &options()), "[a&amp;b]");
    }

    #[test]
    fn test_unknown_kind_uses_default_rule() {
        let table = RuleTable::default();
        let tokens = vec![Token::new(TokenKind::custom("mark_open"), "mark", Nesting::Open)];
        assert_eq!(table.render(&tokens, 0, &options()), "<mark>");
    }
}
