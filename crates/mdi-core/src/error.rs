//! Error types for markdown ingestion.

use std::fmt;

use mdi_dom::MarkupError;

/// Error raised by an extension hook.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct HookError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl HookError {
    /// Hook error with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Hook error wrapping an underlying error.
    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Extension hook that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookKind {
    /// Engine configuration before rendering.
    Setup,
    /// Tree rewrite after rendering.
    UpdateDom,
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Setup => f.write_str("setup"),
            Self::UpdateDom => f.write_str("updateDOM"),
        }
    }
}

/// Invalid placeholder guard pattern.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GuardPatternError {
    /// Pattern is not a valid regular expression.
    #[error("invalid guard pattern '{pattern}': {source}")]
    Invalid {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Pattern can match without consuming any character.
    #[error("guard pattern '{pattern}' can match an empty string")]
    ZeroWidth { pattern: String },
}

/// Error during markdown ingestion.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum IngestError {
    /// An extension hook failed; ingestion was aborted.
    #[error("extension '{extension}' failed in {hook}: {source}")]
    Configuration {
        extension: String,
        hook: HookKind,
        #[source]
        source: HookError,
    },

    /// Rendered markup could not be parsed into a tree.
    #[error("malformed markup: {0}")]
    MalformedMarkup(#[from] MarkupError),

    /// Placeholder guard pattern rejected.
    #[error("guard pattern error: {0}")]
    GuardPattern(#[from] GuardPatternError),
}
