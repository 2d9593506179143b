//! Built-in markdown hooks for common node types.

mod code_block;
mod task_item;
mod task_list;

use serde_json::json;

pub use code_block::CodeBlockSpec;
pub use task_item::TaskItemSpec;
pub use task_list::TaskListSpec;

use crate::extension::{Editor, Extension, ExtensionRegistry};
use crate::schema::Schema;

/// Extensions matching [`Schema::standard`], with the built-in hooks
/// attached.
#[must_use]
pub fn standard_extensions() -> ExtensionRegistry {
    let mut registry = ExtensionRegistry::new();
    for name in [
        "paragraph",
        "heading",
        "blockquote",
        "bulletList",
        "orderedList",
        "listItem",
    ] {
        registry.register(Extension::new(name));
    }
    registry
        .register(
            Extension::new("codeBlock")
                .with_options(json!({ "languageClassPrefix": "language-" }))
                .with_markdown(CodeBlockSpec),
        )
        .register(Extension::new("horizontalRule"))
        .register(Extension::new("image"))
        .register(Extension::new("table"))
        .register(Extension::new("taskList").with_markdown(TaskListSpec))
        .register(
            Extension::new("taskItem")
                .with_options(json!({ "nested": false }))
                .with_markdown(TaskItemSpec),
        )
        .register(Extension::new("hardBreak"));
    registry
}

/// Editor with the standard schema and extensions.
#[must_use]
pub fn standard_editor() -> Editor {
    Editor::new(Schema::standard(), standard_extensions())
}
