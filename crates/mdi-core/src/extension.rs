//! Extension registry and markdown hooks.
//!
//! Extensions take part in ingestion through [`MarkdownSpec`]: `setup`
//! configures the markdown engine before rendering, `update_dom` rewrites the
//! rendered tree afterwards. Both run once per extension, in registration
//! order, and receive a [`HookContext`] scoped to that extension.

use std::fmt;
use std::sync::Arc;

use mdi_dom::Element;
use mdi_renderer::MarkdownEngine;
use serde_json::Value;

use crate::error::HookError;
use crate::schema::Schema;

/// Markdown hooks of an extension. Both default to doing nothing.
pub trait MarkdownSpec: Send + Sync {
    /// Configure the engine for this request.
    fn setup(&self, _ctx: &HookContext<'_>, _engine: &mut MarkdownEngine) -> Result<(), HookError> {
        Ok(())
    }

    /// Rewrite the rendered tree in place.
    fn update_dom(&self, _ctx: &HookContext<'_>, _tree: &mut Element) -> Result<(), HookError> {
        Ok(())
    }
}

/// What a hook sees: the editor, and the extension it belongs to.
#[derive(Clone, Copy)]
pub struct HookContext<'a> {
    pub editor: &'a Editor,
    pub extension: &'a str,
    pub options: &'a Value,
}

impl HookContext<'_> {
    /// String option `key` of this extension.
    #[must_use]
    pub fn option_str(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(Value::as_str)
    }

    /// Boolean option `key` of this extension.
    #[must_use]
    pub fn option_bool(&self, key: &str) -> Option<bool> {
        self.options.get(key).and_then(Value::as_bool)
    }
}

impl fmt::Debug for HookContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookContext")
            .field("extension", &self.extension)
            .field("options", self.options)
            .finish_non_exhaustive()
    }
}

/// A registered editor extension.
#[derive(Clone)]
pub struct Extension {
    name: String,
    options: Value,
    markdown: Option<Arc<dyn MarkdownSpec>>,
}

impl Extension {
    /// Extension without options or markdown hooks.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: Value::Object(serde_json::Map::new()),
            markdown: None,
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: Value) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_markdown(mut self, spec: impl MarkdownSpec + 'static) -> Self {
        self.markdown = Some(Arc::new(spec));
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn options(&self) -> &Value {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut Value {
        &mut self.options
    }

    #[must_use]
    pub fn markdown(&self) -> Option<&dyn MarkdownSpec> {
        self.markdown.as_deref()
    }
}

impl fmt::Debug for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extension")
            .field("name", &self.name)
            .field("options", &self.options)
            .field("markdown", &self.markdown.is_some())
            .finish()
    }
}

/// Extensions in registration order.
#[derive(Debug, Clone, Default)]
pub struct ExtensionRegistry {
    extensions: Vec<Extension>,
}

impl ExtensionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an extension.
    pub fn register(&mut self, extension: Extension) -> &mut Self {
        self.extensions.push(extension);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Extension> {
        self.extensions.iter().find(|ext| ext.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Extension> {
        self.extensions.iter_mut().find(|ext| ext.name == name)
    }

    /// Remove an extension by name.
    pub fn remove(&mut self, name: &str) -> Option<Extension> {
        let index = self.extensions.iter().position(|ext| ext.name == name)?;
        Some(self.extensions.remove(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Extension> {
        self.extensions.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}

/// Editor handle: the schema plus the registered extensions.
#[derive(Debug, Clone, Default)]
pub struct Editor {
    schema: Schema,
    extensions: ExtensionRegistry,
}

impl Editor {
    #[must_use]
    pub fn new(schema: Schema, extensions: ExtensionRegistry) -> Self {
        Self { schema, extensions }
    }

    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn schema_mut(&mut self) -> &mut Schema {
        &mut self.schema
    }

    #[must_use]
    pub fn extensions(&self) -> &ExtensionRegistry {
        &self.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut ExtensionRegistry {
        &mut self.extensions
    }

    /// Context for the hooks of `extension`.
    #[must_use]
    pub fn hook_context<'a>(&'a self, extension: &'a Extension) -> HookContext<'a> {
        HookContext {
            editor: self,
            extension: extension.name(),
            options: extension.options(),
        }
    }
}
