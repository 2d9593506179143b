//! Markdown ingestion pipeline.
//!
//! Provides [`MarkdownParser`], which turns markdown text into normalized
//! markup for the editor's document model.

use mdi_dom::{Element, parse_fragment};
use mdi_renderer::{EngineOptions, MarkdownEngine, with_patched_renderer};

use crate::content::{Content, ParseOptions};
use crate::error::{HookKind, IngestError};
use crate::extension::Editor;
use crate::guard::PlaceholderGuard;
use crate::normalize::normalize;

/// Options for [`MarkdownParser`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarkdownOptions {
    /// Pass raw HTML in the source through to the output.
    pub html: bool,
    /// Turn bare URLs into links.
    pub linkify: bool,
    /// Render single line breaks as `<br>`.
    pub breaks: bool,
    /// Patterns whose matches are kept verbatim, untouched by markdown.
    pub ignore_regex: Vec<String>,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            html: true,
            linkify: false,
            breaks: false,
            ignore_regex: Vec::new(),
        }
    }
}

/// Markdown to editor markup converter.
///
/// Every call runs the full pipeline on its own engine instance:
/// guard protected text, run extension `setup` hooks, render, run
/// `update_dom` hooks, restore protected text, then normalize.
///
/// # Example
///
/// ```
/// use mdi_core::{MarkdownOptions, MarkdownParser, ParseOptions, standard_editor};
///
/// let parser = MarkdownParser::new(standard_editor(), MarkdownOptions::default()).unwrap();
/// let html = parser.parse_markdown("*hi*", ParseOptions::BLOCK).unwrap();
/// assert_eq!(html, "<p><em>hi</em></p>");
/// ```
#[derive(Debug)]
pub struct MarkdownParser {
    editor: Editor,
    engine_options: EngineOptions,
    guard: PlaceholderGuard,
}

impl MarkdownParser {
    /// Create a parser for `editor`.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::GuardPattern`] if an ignore pattern is invalid
    /// or can match an empty string.
    pub fn new(editor: Editor, options: MarkdownOptions) -> Result<Self, IngestError> {
        let guard = PlaceholderGuard::new(&options.ignore_regex)?;
        let engine_options = EngineOptions {
            html: options.html,
            linkify: options.linkify,
            breaks: options.breaks,
            ..EngineOptions::default()
        };
        Ok(Self {
            editor,
            engine_options,
            guard,
        })
    }

    #[must_use]
    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    /// Mutable editor access. Schema changes apply to the next call.
    pub fn editor_mut(&mut self) -> &mut Editor {
        &mut self.editor
    }

    /// Options every request's engine starts from.
    #[must_use]
    pub fn engine_options(&self) -> &EngineOptions {
        &self.engine_options
    }

    /// Ingest `content`. Anything but [`Content::Text`] is returned as is.
    ///
    /// # Errors
    ///
    /// See [`MarkdownParser::parse_markdown`].
    pub fn parse(&self, content: Content, options: ParseOptions) -> Result<Content, IngestError> {
        match content {
            Content::Text(text) => self.parse_markdown(&text, options).map(Content::Html),
            other => Ok(other),
        }
    }

    /// Convert markdown `text` to normalized markup.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Configuration`] if an extension hook fails and
    /// [`IngestError::MalformedMarkup`] if the rendered markup nests deeper than
    /// [`mdi_dom::MAX_NESTING`].
    pub fn parse_markdown(&self, text: &str, options: ParseOptions) -> Result<String, IngestError> {
        let (guarded, placeholders) = self.guard.guard(text)?;
        if !placeholders.is_empty() {
            tracing::debug!(placeholders = placeholders.len(), "Protected text from markdown");
        }

        let rendered = self.engine()?.render(&guarded);
        let mut tree = parse_fragment(&rendered)?;
        self.update_dom(&mut tree)?;

        let restored = placeholders.restore(&tree.inner_html());
        let mut tree = parse_fragment(&restored)?;
        normalize(
            &mut tree,
            &self.editor.schema().block_selectors(),
            options.inline,
            text,
        );

        let html = tree.inner_html();
        tracing::debug!(
            inline = options.inline,
            input_len = text.len(),
            output_len = html.len(),
            "Ingested markdown"
        );
        Ok(html)
    }

    /// Convert `text` for replacing a whole document.
    ///
    /// # Errors
    ///
    /// See [`MarkdownParser::parse`].
    pub fn set_content(&self, content: Content) -> Result<Content, IngestError> {
        self.parse(content, ParseOptions::BLOCK)
    }

    /// Convert `text` for insertion at a position.
    ///
    /// # Errors
    ///
    /// See [`MarkdownParser::parse`].
    pub fn insert_content(&self, content: Content) -> Result<Content, IngestError> {
        self.parse(content, ParseOptions::INLINE)
    }

    /// Fresh patched engine with every extension's `setup` applied.
    fn engine(&self) -> Result<MarkdownEngine, IngestError> {
        let mut engine = with_patched_renderer(MarkdownEngine::new(self.engine_options.clone()));
        for extension in self.editor.extensions().iter() {
            let Some(spec) = extension.markdown() else {
                continue;
            };
            let ctx = self.editor.hook_context(extension);
            spec.setup(&ctx, &mut engine)
                .map_err(|source| IngestError::Configuration {
                    extension: extension.name().to_owned(),
                    hook: HookKind::Setup,
                    source,
                })?;
        }
        Ok(engine)
    }

    fn update_dom(&self, tree: &mut Element) -> Result<(), IngestError> {
        for extension in self.editor.extensions().iter() {
            let Some(spec) = extension.markdown() else {
                continue;
            };
            let ctx = self.editor.hook_context(extension);
            spec.update_dom(&ctx, tree)
                .map_err(|source| IngestError::Configuration {
                    extension: extension.name().to_owned(),
                    hook: HookKind::UpdateDom,
                    source,
                })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::error::HookError;
    use crate::extension::{Extension, HookContext, MarkdownSpec};
    use crate::extensions::standard_editor;
    use crate::schema::NodeType;

    static_assertions::assert_impl_all!(MarkdownParser: Send, Sync);

    fn parser() -> MarkdownParser {
        MarkdownParser::new(standard_editor(), MarkdownOptions::default()).unwrap()
    }

    fn parser_with(options: MarkdownOptions) -> MarkdownParser {
        MarkdownParser::new(standard_editor(), options).unwrap()
    }

    fn block(parser: &MarkdownParser, text: &str) -> String {
        parser.parse_markdown(text, ParseOptions::BLOCK).unwrap()
    }

    fn inline(parser: &MarkdownParser, text: &str) -> String {
        parser.parse_markdown(text, ParseOptions::INLINE).unwrap()
    }

    #[test]
    fn test_heading() {
        assert_eq!(block(&parser(), "# Title"), "<h1>Title</h1>");
    }

    #[test]
    fn test_emphasis() {
        assert_eq!(block(&parser(), "*hi*"), "<p><em>hi</em></p>");
    }

    #[test]
    fn test_blocks_without_separators() {
        assert_eq!(
            block(&parser(), "# A\n\nb\n\n- c\n- d"),
            "<h1>A</h1><p>b</p><ul><li>c</li><li>d</li></ul>"
        );
    }

    #[test]
    fn test_soft_break_preserved() {
        assert_eq!(block(&parser(), "a\nb"), "<p>a\nb</p>");
    }

    #[test]
    fn test_breaks_option() {
        let parser = parser_with(MarkdownOptions {
            breaks: true,
            ..MarkdownOptions::default()
        });
        assert_eq!(block(&parser, "a\nb"), "<p>a<br>b</p>");
    }

    #[test]
    fn test_code_fence_keeps_content() {
        assert_eq!(
            block(&parser(), "```js\nlet a;\n```"),
            "<pre><code class=\"language-js\">let a;\n</code></pre>"
        );
    }

    #[test]
    fn test_indented_code_block() {
        assert_eq!(
            block(&parser(), "    let x;\n"),
            "<pre><code>let x;\n</code></pre>"
        );
        assert_eq!(
            block(&parser(), "    let x;\n\nafter"),
            "<pre><code>let x;\n</code></pre><p>after</p>"
        );
    }

    #[test]
    fn test_code_block_prefix_from_extension_options() {
        let mut editor = standard_editor();
        if let Some(code_block) = editor.extensions_mut().get_mut("codeBlock") {
            *code_block.options_mut() = json!({ "languageClassPrefix": "lang-" });
        }
        let parser = MarkdownParser::new(editor, MarkdownOptions::default()).unwrap();
        assert_eq!(
            block(&parser, "```rs\nx\n```"),
            "<pre><code class=\"lang-rs\">x\n</code></pre>"
        );
    }

    #[test]
    fn test_image_hoisted_out_of_paragraph() {
        assert_eq!(
            block(&parser(), "![alt](a.png)"),
            r#"<img src="a.png" alt="alt">"#
        );
    }

    #[test]
    fn test_raw_html_block_hoisted() {
        assert_eq!(
            block(&parser(), r#"<p>a<img src="i.png">b</p>"#),
            r#"<p>a</p><img src="i.png"><p>b</p>"#
        );
    }

    #[test]
    fn test_angle_brackets_in_prose() {
        assert_eq!(
            block(&parser(), "Use Vec<T> here"),
            "<p>Use Vec<t> here</t></p>"
        );
    }

    #[test]
    fn test_raw_html_repaired() {
        assert_eq!(block(&parser(), "<p>one<p>two"), "<p>one</p><p>two\n</p>");
        assert_eq!(
            block(&parser(), "a <br/> b <span>x"),
            "<p>a <br> b <span>x</span></p>"
        );
        assert_eq!(block(&parser(), "<div>"), "<div>\n</div>");
    }

    #[test]
    fn test_html_disabled_escapes_markup() {
        let parser = parser_with(MarkdownOptions {
            html: false,
            ..MarkdownOptions::default()
        });
        assert_eq!(block(&parser, "<b>x</b>"), "<p>&lt;b&gt;x&lt;/b&gt;</p>");
    }

    #[test]
    fn test_linkify() {
        let parser = parser_with(MarkdownOptions {
            linkify: true,
            ..MarkdownOptions::default()
        });
        assert_eq!(
            block(&parser, "see https://example.com"),
            r#"<p>see <a href="https://example.com">https://example.com</a></p>"#
        );
    }

    #[test]
    fn test_inline_preserves_outer_whitespace() {
        assert_eq!(inline(&parser(), "  hello world  "), "  hello world  ");
    }

    #[test]
    fn test_inline_blank_line_keeps_paragraph() {
        assert_eq!(
            inline(&parser(), "\n\nSome paragraph"),
            "<p>Some paragraph</p>"
        );
    }

    #[test]
    fn test_inline_unwraps_first_paragraph_only() {
        assert_eq!(inline(&parser(), "a\n\nb"), "a<p>b</p>");
    }

    #[test]
    fn test_inline_heading_untouched() {
        assert_eq!(inline(&parser(), "# T"), "<h1>T</h1>");
    }

    #[test]
    fn test_placeholders_round_trip() {
        let parser = parser_with(MarkdownOptions {
            ignore_regex: vec![r"\{\{[^}]+\}\}".to_owned()],
            ..MarkdownOptions::default()
        });
        assert_eq!(
            block(&parser, "Hello {{ name }} and *{{x}}*"),
            "<p>Hello {{ name }} and <em>{{x}}</em></p>"
        );
    }

    #[test]
    fn test_placeholders_with_markup_characters() {
        let parser = parser_with(MarkdownOptions {
            ignore_regex: vec![r"<%[^%]*%>".to_owned(), "a < b".to_owned()],
            ..MarkdownOptions::default()
        });

        let html = block(&parser, "Hi <% user %> there, if a < b then *go*");
        assert_eq!(
            html,
            "<p>Hi &lt;% user %&gt; there, if a &lt; b then <em>go</em></p>"
        );
        assert_eq!(
            mdi_dom::parse_fragment(&html).unwrap().text_content(),
            "Hi <% user %> there, if a < b then go"
        );
    }

    #[test]
    fn test_placeholders_shield_markdown() {
        let parser = parser_with(MarkdownOptions {
            ignore_regex: vec![r"__\w+__".to_owned()],
            ..MarkdownOptions::default()
        });
        assert_eq!(
            block(&parser, "call __init__ or __init__"),
            "<p>call __init__ or __init__</p>"
        );
    }

    #[test]
    fn test_many_placeholders() {
        let parser = parser_with(MarkdownOptions {
            ignore_regex: vec![r"_\d+_".to_owned()],
            ..MarkdownOptions::default()
        });
        let input = (0..12).map(|i| format!("_{i}_")).collect::<Vec<_>>().join(" ");
        assert_eq!(block(&parser, &input), format!("<p>{input}</p>"));
    }

    #[test]
    fn test_task_list() {
        assert_eq!(
            block(&parser(), "- [x] done\n- [ ] todo"),
            "<ul class=\"contains-task-list\" data-type=\"taskList\">\
             <li class=\"task-list-item\" data-type=\"taskItem\" data-checked=\"true\">done</li>\
             <li class=\"task-list-item\" data-type=\"taskItem\" data-checked=\"false\">todo</li>\
             </ul>"
        );
    }

    #[test]
    fn test_task_list_disabled_without_extensions() {
        let mut editor = standard_editor();
        editor.extensions_mut().remove("taskList");
        editor.extensions_mut().remove("taskItem");
        let parser = MarkdownParser::new(editor, MarkdownOptions::default()).unwrap();
        assert_eq!(block(&parser, "- [x] done"), "<ul><li>[x] done</li></ul>");
    }

    #[test]
    fn test_structured_content_passes_through() {
        let parser = parser();
        let doc = json!({ "type": "doc", "content": [] });
        assert_eq!(
            parser.parse(Content::Json(doc.clone()), ParseOptions::BLOCK).unwrap(),
            Content::Json(doc)
        );
        assert_eq!(
            parser.parse(Content::Html("<p>*x*</p>".to_owned()), ParseOptions::INLINE).unwrap(),
            Content::Html("<p>*x*</p>".to_owned())
        );
    }

    #[test]
    fn test_content_commands() {
        let parser = parser();
        assert_eq!(
            parser.set_content(Content::from("hello")).unwrap(),
            Content::Html("<p>hello</p>".to_owned())
        );
        assert_eq!(
            parser.insert_content(Content::from("hello")).unwrap(),
            Content::Html("hello".to_owned())
        );
    }

    #[test]
    fn test_invalid_ignore_pattern_rejected_up_front() {
        let err = MarkdownParser::new(
            standard_editor(),
            MarkdownOptions {
                ignore_regex: vec!["a*".to_owned()],
                ..MarkdownOptions::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, IngestError::GuardPattern(_)));
    }

    #[test]
    fn test_deeply_nested_html_is_malformed() {
        let err = parser()
            .parse_markdown(&"<div>".repeat(mdi_dom::MAX_NESTING + 1), ParseOptions::BLOCK)
            .unwrap_err();
        assert!(matches!(err, IngestError::MalformedMarkup(_)));
    }

    struct Failing(HookKind);

    impl MarkdownSpec for Failing {
        fn setup(&self, _ctx: &HookContext<'_>, _engine: &mut MarkdownEngine) -> Result<(), HookError> {
            match self.0 {
                HookKind::Setup => Err(HookError::new("no engine for you")),
                HookKind::UpdateDom => Ok(()),
            }
        }

        fn update_dom(&self, _ctx: &HookContext<'_>, _tree: &mut Element) -> Result<(), HookError> {
            match self.0 {
                HookKind::Setup => Ok(()),
                HookKind::UpdateDom => Err(HookError::new("no tree for you")),
            }
        }
    }

    fn failing_parser(hook: HookKind) -> MarkdownParser {
        let mut editor = standard_editor();
        editor
            .extensions_mut()
            .register(Extension::new("broken").with_markdown(Failing(hook)));
        MarkdownParser::new(editor, MarkdownOptions::default()).unwrap()
    }

    #[test]
    fn test_setup_failure_aborts() {
        let err = failing_parser(HookKind::Setup)
            .parse_markdown("x", ParseOptions::BLOCK)
            .unwrap_err();
        assert!(matches!(
            err,
            IngestError::Configuration { ref extension, hook: HookKind::Setup, .. } if extension == "broken"
        ));
    }

    #[test]
    fn test_update_dom_failure_aborts() {
        let err = failing_parser(HookKind::UpdateDom)
            .parse(Content::from("x"), ParseOptions::BLOCK)
            .unwrap_err();
        assert_eq!(err.to_string(), "extension 'broken' failed in updateDOM: no tree for you");
    }

    /// Records how many core rules the engine had when `setup` ran.
    struct CountingRules(Arc<Mutex<Vec<usize>>>);

    impl MarkdownSpec for CountingRules {
        fn setup(&self, _ctx: &HookContext<'_>, engine: &mut MarkdownEngine) -> Result<(), HookError> {
            self.0.lock().unwrap().push(engine.core_rule_names().count());
            engine.push_core_rule("noop", |_tokens, _options| {});
            Ok(())
        }
    }

    #[test]
    fn test_setup_does_not_leak_between_calls() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut editor = Editor::default();
        editor
            .extensions_mut()
            .register(Extension::new("counting").with_markdown(CountingRules(Arc::clone(&seen))));
        let parser = MarkdownParser::new(editor, MarkdownOptions::default()).unwrap();

        block(&parser, "a");
        block(&parser, "b");

        assert_eq!(*seen.lock().unwrap(), [0, 0]);
    }

    #[test]
    fn test_setup_runs_in_registration_order() {
        struct Prefix(&'static str);

        impl MarkdownSpec for Prefix {
            fn setup(&self, _ctx: &HookContext<'_>, engine: &mut MarkdownEngine) -> Result<(), HookError> {
                self.0.clone_into(&mut engine.options_mut().lang_prefix);
                Ok(())
            }
        }

        let mut editor = Editor::default();
        editor
            .extensions_mut()
            .register(Extension::new("first").with_markdown(Prefix("a-")))
            .register(Extension::new("second").with_markdown(Prefix("b-")));
        let parser = MarkdownParser::new(editor, MarkdownOptions::default()).unwrap();

        assert_eq!(
            block(&parser, "```x\ny\n```"),
            "<pre><code class=\"b-x\">y\n</code></pre>"
        );
    }

    #[test]
    fn test_block_selectors_follow_schema() {
        let mut parser = MarkdownParser::new(Editor::default(), MarkdownOptions::default()).unwrap();
        assert_eq!(block(&parser, "<p>a<hr>b</p>"), "<p>a<hr>b</p>");

        parser.editor_mut().schema_mut().add_node(NodeType::block("horizontalRule", ["hr"]));
        assert_eq!(block(&parser, "<p>a<hr>b</p>"), "<p>a</p><hr><p>b</p>");
    }
}
