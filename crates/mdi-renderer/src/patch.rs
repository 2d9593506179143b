//! Render adapter for markup that is parsed again afterwards.
//!
//! The default rules end block-level output with a line feed for readability.
//! Those line feeds become stray text nodes once the markup is re-parsed into
//! a document tree, so the adapter strips one trailing line feed from the
//! break, code and default rules. A rule whose entire output is a single line
//! feed (a soft break) keeps it, since there it is content.

use std::sync::Arc;

use crate::engine::{EngineOptions, MarkdownEngine};
use crate::rules::Rule;
use crate::token::{Token, TokenKind};

/// Token kinds whose rules the adapter wraps, besides the default rule.
pub const PATCHED_RULES: [TokenKind; 4] = [
    TokenKind::HARDBREAK,
    TokenKind::SOFTBREAK,
    TokenKind::FENCE,
    TokenKind::CODE_BLOCK,
];

/// Wrap `rule` so that one trailing line feed is removed from its output.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use mdi_renderer::{EngineOptions, Rule, Token, without_trailing_newline};
///
/// let rule: Rule = Arc::new(|_tokens: &[Token], _idx: usize, _options: &EngineOptions| {
///     "<hr>\n\n".to_owned()
/// });
/// let patched = without_trailing_newline(rule);
/// assert_eq!(patched(&[], 0, &EngineOptions::default()), "<hr>\n");
/// ```
#[must_use]
pub fn without_trailing_newline(rule: Rule) -> Rule {
    Arc::new(move |tokens: &[Token], idx: usize, options: &EngineOptions| {
        let mut rendered = rule(tokens, idx, options);
        if rendered != "\n" && rendered.ends_with('\n') {
            rendered.pop();
        }
        rendered
    })
}

/// Install [`without_trailing_newline`] on the [`PATCHED_RULES`] and the
/// default rule of `engine`.
///
/// Rules missing from the table are left absent. Rules registered afterwards
/// are not wrapped.
#[must_use]
pub fn with_patched_renderer(mut engine: MarkdownEngine) -> MarkdownEngine {
    let rules = engine.rules_mut();
    for kind in &PATCHED_RULES {
        if !rules.decorate(kind, without_trailing_newline) {
            tracing::debug!(rule = %kind, "No rule to patch");
        }
    }
    rules.decorate_default(without_trailing_newline);
    engine
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn engine() -> MarkdownEngine {
        with_patched_renderer(MarkdownEngine::new(EngineOptions {
            html: true,
            ..EngineOptions::default()
        }))
    }

    #[test]
    fn test_blocks_have_no_trailing_newline() {
        assert_eq!(engine().render("# A\n\nb"), "<h1>A</h1><p>b</p>");
    }

    #[test]
    fn test_tight_list() {
        assert_eq!(engine().render("- a\n- b"), "<ul><li>a</li><li>b</li></ul>");
    }

    #[test]
    fn test_nested_list_keeps_leading_newline() {
        assert_eq!(
            engine().render("- a\n  - b"),
            "<ul><li>a\n<ul><li>b</li></ul></li></ul>"
        );
    }

    #[test]
    fn test_soft_break_kept() {
        assert_eq!(engine().render("a\nb"), "<p>a\nb</p>");
    }

    #[test]
    fn test_hard_break_stripped() {
        assert_eq!(engine().render("a  \nb"), "<p>a<br>b</p>");
    }

    #[test]
    fn test_soft_break_as_br_stripped() {
        let mut engine = engine();
        engine.options_mut().breaks = true;
        assert_eq!(engine.render("a\nb"), "<p>a<br>b</p>");
    }

    #[test]
    fn test_code_keeps_content_newline() {
        assert_eq!(
            engine().render("```js\nlet a;\n```"),
            "<pre><code class=\"language-js\">let a;\n</code></pre>"
        );
    }

    #[test]
    fn test_indented_code_stripped() {
        assert_eq!(
            engine().render("    let x;\n"),
            "<pre><code>let x;\n</code></pre>"
        );
    }

    #[test]
    fn test_html_block_untouched() {
        assert_eq!(engine().render("<div>x</div>"), "<div>x</div>\n");
    }

    #[test]
    fn test_missing_rule_stays_missing() {
        let mut engine = MarkdownEngine::new(EngineOptions::default());
        engine.rules_mut().remove(&TokenKind::FENCE);
        let engine = with_patched_renderer(engine);
        assert!(!engine.rules().contains(&TokenKind::FENCE));
    }

    #[test]
    fn test_later_rules_not_wrapped() {
        let mut engine = engine();
        engine.set_rule(TokenKind::HR, |_tokens, _idx, _options| "<hr>\n".to_owned());
        assert_eq!(engine.render("---"), "<hr>\n");
    }
}
