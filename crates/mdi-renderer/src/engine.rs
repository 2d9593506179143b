//! Markdown engine: tokenizer, core rules and rule table bundled together.

use std::fmt;
use std::sync::Arc;

use pulldown_cmark::Options;

use crate::linkify::linkify;
use crate::rules::{Rule, RuleTable};
use crate::token::{Token, TokenKind};
use crate::tokenizer::tokenize;

/// Engine options.
#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct EngineOptions {
    /// Pass raw HTML through. When disabled it is rendered as escaped text.
    pub html: bool,
    /// Close void tags XHTML style (`<br />`).
    pub xhtml_out: bool,
    /// Render soft line breaks as `<br>`.
    pub breaks: bool,
    /// Turn bare URLs and email addresses into links.
    pub linkify: bool,
    /// Class prefix for fenced code languages.
    pub lang_prefix: String,
    /// pulldown-cmark syntax extensions.
    pub extensions: Options,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            html: false,
            xhtml_out: false,
            breaks: false,
            linkify: false,
            lang_prefix: "language-".to_owned(),
            extensions: Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH,
        }
    }
}

/// Core rule: rewrites the block token stream after tokenizing.
pub type CoreRule = Arc<dyn Fn(&mut Vec<Token>, &EngineOptions) + Send + Sync>;

/// Markdown to HTML engine.
///
/// Rendering runs in three steps: tokenize with pulldown-cmark, apply core
/// rules in registration order, then render every token through the
/// [`RuleTable`].
#[derive(Clone, Default)]
pub struct MarkdownEngine {
    options: EngineOptions,
    rules: RuleTable,
    core_rules: Vec<(String, CoreRule)>,
}

impl fmt::Debug for MarkdownEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarkdownEngine")
            .field("options", &self.options)
            .field("rules", &self.rules)
            .field("core_rules", &self.core_rule_names().collect::<Vec<_>>())
            .finish()
    }
}

impl MarkdownEngine {
    /// Create an engine with the default rule table.
    #[must_use]
    pub fn new(options: EngineOptions) -> Self {
        Self {
            options,
            rules: RuleTable::default(),
            core_rules: Vec::new(),
        }
    }

    #[must_use]
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut EngineOptions {
        &mut self.options
    }

    #[must_use]
    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    pub fn rules_mut(&mut self) -> &mut RuleTable {
        &mut self.rules
    }

    /// Register a render rule for `kind`.
    pub fn set_rule<F>(&mut self, kind: TokenKind, rule: F) -> &mut Self
    where
        F: Fn(&[Token], usize, &EngineOptions) -> String + Send + Sync + 'static,
    {
        let rule: Rule = Arc::new(rule);
        self.rules.set(kind, rule);
        self
    }

    /// Append a core rule run on every parse.
    pub fn push_core_rule<F>(&mut self, name: impl Into<String>, rule: F) -> &mut Self
    where
        F: Fn(&mut Vec<Token>, &EngineOptions) + Send + Sync + 'static,
    {
        self.core_rules.push((name.into(), Arc::new(rule)));
        self
    }

    /// Names of the registered core rules, in run order.
    pub fn core_rule_names(&self) -> impl Iterator<Item = &str> {
        self.core_rules.iter().map(|(name, _)| name.as_str())
    }

    /// Tokenize `source` and apply core rules.
    #[must_use]
    pub fn parse(&self, source: &str) -> Vec<Token> {
        let mut tokens = tokenize(source, &self.options);
        if self.options.linkify {
            linkify(&mut tokens);
        }
        for (name, rule) in &self.core_rules {
            tracing::trace!(rule = %name, "Running core rule");
            rule(&mut tokens, &self.options);
        }
        tokens
    }

    /// Render a token stream produced by [`Self::parse`].
    #[must_use]
    pub fn render_tokens(&self, tokens: &[Token]) -> String {
        let mut out = String::with_capacity(tokens.len() * 16);
        for (idx, token) in tokens.iter().enumerate() {
            if token.kind == TokenKind::INLINE {
                out.push_str(&self.render_inline(&token.children));
            } else {
                out.push_str(&self.rules.render(tokens, idx, &self.options));
            }
        }
        out
    }

    /// Render markdown to HTML.
    #[must_use]
    pub fn render(&self, source: &str) -> String {
        self.render_tokens(&self.parse(source))
    }

    fn render_inline(&self, tokens: &[Token]) -> String {
        let mut out = String::new();
        for idx in 0..tokens.len() {
            out.push_str(&self.rules.render(tokens, idx, &self.options));
        }
        out
    }
}
