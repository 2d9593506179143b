//! Error types for markup parsing and selectors.

/// Markup that cannot be turned into an element tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum MarkupError {
    /// Elements nest deeper than the tree may grow.
    #[error("markup nests deeper than {limit} elements")]
    TooDeep {
        /// Deepest nesting accepted.
        limit: usize,
    },
}

/// Invalid selector syntax.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid selector {selector:?}: {message}")]
pub struct SelectorError {
    /// Selector text as given.
    pub selector: String,
    /// What went wrong.
    pub message: String,
}

impl SelectorError {
    pub(crate) fn new(selector: &str, message: impl Into<String>) -> Self {
        Self {
            selector: selector.to_owned(),
            message: message.into(),
        }
    }
}
