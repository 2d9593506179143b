//! Markdown ingestion for a structured rich-text editor.
//!
//! [`MarkdownParser`] converts markdown into markup the editor's document
//! model can load directly:
//!
//! 1. [`PlaceholderGuard`] swaps text matching the ignore patterns for inert
//!    tokens.
//! 2. Each extension's [`MarkdownSpec::setup`] configures a fresh, patched
//!    [`MarkdownEngine`](mdi_renderer::MarkdownEngine), which renders the text.
//! 3. Each extension's [`MarkdownSpec::update_dom`] rewrites the rendered tree.
//! 4. The protected text is restored and the result is normalized: block
//!    elements leave paragraphs, formatting line feeds go, and inline content
//!    loses its wrapping paragraph.
//!
//! The editor is represented by an [`Editor`]: a [`Schema`] naming the block
//! node types, and an [`ExtensionRegistry`] holding the hooks.
//!
//! # Example
//!
//! ```
//! use mdi_core::{MarkdownOptions, MarkdownParser, ParseOptions, standard_editor};
//!
//! let parser = MarkdownParser::new(
//!     standard_editor(),
//!     MarkdownOptions {
//!         ignore_regex: vec![r"\{\{[^}]*\}\}".to_owned()],
//!         ..MarkdownOptions::default()
//!     },
//! )
//! .unwrap();
//!
//! let html = parser.parse_markdown("Hi *{{user_name}}*", ParseOptions::INLINE).unwrap();
//! assert_eq!(html, "Hi <em>{{user_name}}</em>");
//! ```

mod content;
mod error;
mod extension;
mod extensions;
mod guard;
mod normalize;
mod parser;
mod schema;

pub use content::{Content, ParseOptions};
pub use error::{GuardPatternError, HookError, HookKind, IngestError};
pub use extension::{Editor, Extension, ExtensionRegistry, HookContext, MarkdownSpec};
pub use extensions::{CodeBlockSpec, TaskItemSpec, TaskListSpec, standard_editor, standard_extensions};
pub use guard::{PlaceholderGuard, PlaceholderTable};
pub use normalize::{hoist_blocks, normalize, strip_block_newlines, unwrap_inline};
pub use parser::{MarkdownOptions, MarkdownParser};
pub use schema::{NodeType, Schema};
