//! Rule-table markdown renderer.
//!
//! [`MarkdownEngine`] parses markdown with pulldown-cmark, turns the event
//! stream into a flat list of [`Token`]s (block tokens plus `inline` tokens
//! carrying their children), and renders those tokens through a [`RuleTable`]:
//! one [`Rule`] per token kind, with a default rule for everything else.
//!
//! # Architecture
//!
//! - [`token`]: token model ([`Token`], [`TokenKind`], [`Nesting`])
//! - [`tokenizer`]: pulldown-cmark events → tokens
//! - [`rules`]: default rules and the rule table
//! - [`linkify`]: core rule that turns bare URLs into links
//! - [`patch`]: the ingestion adapter that strips formatting line feeds
//!
//! Extensions customize an engine before rendering by toggling
//! [`EngineOptions`], replacing rules with [`MarkdownEngine::set_rule`], or
//! rewriting the token stream with [`MarkdownEngine::push_core_rule`].
//!
//! # Example
//!
//! ```
//! use mdi_renderer::{EngineOptions, MarkdownEngine, with_patched_renderer};
//!
//! let engine = MarkdownEngine::new(EngineOptions::default());
//! assert_eq!(engine.render("# Hello"), "<h1>Hello</h1>\n");
//!
//! let patched = with_patched_renderer(engine);
//! assert_eq!(patched.render("# Hello"), "<h1>Hello</h1>");
//! ```

mod engine;
mod linkify;
mod patch;
mod rules;
mod token;
mod tokenizer;
mod util;

pub use engine::{CoreRule, EngineOptions, MarkdownEngine};
pub use patch::{PATCHED_RULES, with_patched_renderer, without_trailing_newline};
pub use rules::{Rule, RuleTable, render_token};
pub use token::{Nesting, Token, TokenKind};
pub use util::{escape_html, normalize_link, validate_link};
