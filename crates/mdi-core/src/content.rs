//! Ingestion input.

use serde_json::Value;

/// Content handed to the parser.
///
/// Only [`Content::Text`] is treated as markdown. Structured content is
/// returned unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    /// Markdown source.
    Text(String),
    /// Markup that is already structured.
    Html(String),
    /// Document JSON.
    Json(Value),
}

impl Content {
    /// Markdown source, if this is text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Html(_) | Self::Json(_) => None,
        }
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Value> for Content {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

/// Per-request ingestion options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Ingest as inline content: a single leading paragraph is unwrapped.
    pub inline: bool,
}

impl ParseOptions {
    /// Block mode, used when replacing a whole document.
    pub const BLOCK: Self = Self { inline: false };

    /// Inline mode, used when inserting at a position.
    pub const INLINE: Self = Self { inline: true };
}
