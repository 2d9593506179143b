use mdi_renderer::MarkdownEngine;

use crate::error::HookError;
use crate::extension::{HookContext, MarkdownSpec};

const DEFAULT_PREFIX: &str = "language-";

/// Sets the fence language class prefix from the `languageClassPrefix`
/// option.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodeBlockSpec;

impl MarkdownSpec for CodeBlockSpec {
    fn setup(&self, ctx: &HookContext<'_>, engine: &mut MarkdownEngine) -> Result<(), HookError> {
        let prefix = match ctx.options.get("languageClassPrefix") {
            None | Some(serde_json::Value::Null) => DEFAULT_PREFIX,
            Some(value) => value
                .as_str()
                .ok_or_else(|| HookError::new("option 'languageClassPrefix' must be a string"))?,
        };
        prefix.clone_into(&mut engine.options_mut().lang_prefix);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::extension::{Editor, Extension};

    fn setup_with(options: serde_json::Value) -> Result<MarkdownEngine, HookError> {
        let editor = Editor::default();
        let extension = Extension::new("codeBlock").with_options(options);
        let mut engine = MarkdownEngine::default();
        CodeBlockSpec.setup(&editor.hook_context(&extension), &mut engine)?;
        Ok(engine)
    }

    #[test]
    fn test_custom_prefix() {
        let engine = setup_with(json!({ "languageClassPrefix": "lang-" })).unwrap();
        assert_eq!(
            engine.render("```rs\nx\n```"),
            "<pre><code class=\"lang-rs\">x\n</code></pre>\n"
        );
    }

    #[test]
    fn test_default_prefix() {
        let engine = setup_with(json!({})).unwrap();
        assert_eq!(engine.options().lang_prefix, "language-");
    }

    #[test]
    fn test_non_string_prefix_fails() {
        let err = setup_with(json!({ "languageClassPrefix": 3 })).unwrap_err();
        assert!(err.message().contains("languageClassPrefix"));
    }
}
