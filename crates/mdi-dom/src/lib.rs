//! Element tree for rendered markdown.
//!
//! The rendering engine produces a markup string; this crate turns it into an
//! owned, mutable [`Element`] tree, lets callers query and rewrite it, and
//! serializes it back.
//!
//! # Architecture
//!
//! - [`node`]: [`Element`] and [`Node`] with traversal and mutation helpers
//! - [`parser`]: markup fragment parser following the HTML standard, via html5ever
//! - [`tree_sink`]: html5ever tree sink building the [`Element`] tree
//! - [`serializer`]: `innerHTML`-style serializer
//! - [`selector`]: compound selectors (`tag`, `.class`, `#id`, `[attr=value]`) and lists of them
//!
//! # Example
//!
//! ```
//! use mdi_dom::{SelectorList, parse_fragment};
//!
//! let mut root = parse_fragment("<p>Hello <em>world</em></p>").unwrap();
//! let emphasis = SelectorList::parse("em").unwrap();
//! root.select_mut(&emphasis, &mut |el| el.set_attr("class", "loud"));
//!
//! assert_eq!(root.inner_html(), r#"<p>Hello <em class="loud">world</em></p>"#);
//! ```

mod error;
mod node;
mod parser;
mod selector;
mod serializer;
mod tree_sink;

pub use error::{MarkupError, SelectorError};
pub use node::{Element, Node, ROOT_TAG, is_void_element};
pub use parser::{MAX_NESTING, parse_fragment};
pub use selector::{Selector, SelectorList};
pub use serializer::{escape_attr, escape_text};
