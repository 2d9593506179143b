//! Markup fragment parser.
//!
//! Markup is parsed the way a browser parses `innerHTML`, through html5ever's
//! tree builder: references are decoded, stray end tags are dropped, open
//! elements are closed at the end, and misnested elements are moved where
//! the HTML standard puts them. Syntax alone never fails a parse; only
//! nesting deeper than [`MAX_NESTING`] does.

use html5ever::tendril::TendrilSink;
use html5ever::{ParseOpts, parse_document};

use crate::error::MarkupError;
use crate::node::Element;
use crate::tree_sink::ArenaSink;

/// Deepest element nesting a parsed fragment may have.
pub const MAX_NESTING: usize = 512;

/// Document prologue the fragment is parsed after, so it lands in `body`.
const PROLOGUE: &str = "<!DOCTYPE html><html><head></head><body>";

/// Parse a markup fragment into a [`ROOT_TAG`](crate::ROOT_TAG) element holding its nodes.
///
/// Leading and trailing whitespace is kept as text runs.
///
/// # Errors
///
/// Returns [`MarkupError::TooDeep`] if elements nest deeper than
/// [`MAX_NESTING`].
pub fn parse_fragment(markup: &str) -> Result<Element, MarkupError> {
    let document = format!("{PROLOGUE}{markup}");
    let sink = parse_document(ArenaSink::default(), ParseOpts::default())
        .from_utf8()
        .one(document.as_bytes());
    sink.into_fragment()
}
