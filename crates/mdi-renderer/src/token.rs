//! Token model.
//!
//! Block-level structure is a flat list of open/close/leaf tokens. Inline
//! content of a paragraph, heading or table cell lives in the `children` of a
//! single [`TokenKind::INLINE`] token.

use std::borrow::Cow;
use std::fmt;

/// Token kind, named after the rule that renders it (`paragraph_open`,
/// `fence`, …).
///
/// Known kinds are associated constants; extensions may introduce their own
/// with [`TokenKind::custom`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TokenKind(Cow<'static, str>);

macro_rules! token_kinds {
    ($($name:ident => $value:literal,)*) => {
        impl TokenKind {
            $(
                pub const $name: Self = Self(Cow::Borrowed($value));
            )*
        }
    };
}

token_kinds! {
    PARAGRAPH_OPEN => "paragraph_open",
    PARAGRAPH_CLOSE => "paragraph_close",
    HEADING_OPEN => "heading_open",
    HEADING_CLOSE => "heading_close",
    BLOCKQUOTE_OPEN => "blockquote_open",
    BLOCKQUOTE_CLOSE => "blockquote_close",
    BULLET_LIST_OPEN => "bullet_list_open",
    BULLET_LIST_CLOSE => "bullet_list_close",
    ORDERED_LIST_OPEN => "ordered_list_open",
    ORDERED_LIST_CLOSE => "ordered_list_close",
    LIST_ITEM_OPEN => "list_item_open",
    LIST_ITEM_CLOSE => "list_item_close",
    TABLE_OPEN => "table_open",
    TABLE_CLOSE => "table_close",
    THEAD_OPEN => "thead_open",
    THEAD_CLOSE => "thead_close",
    TBODY_OPEN => "tbody_open",
    TBODY_CLOSE => "tbody_close",
    TR_OPEN => "tr_open",
    TR_CLOSE => "tr_close",
    TH_OPEN => "th_open",
    TH_CLOSE => "th_close",
    TD_OPEN => "td_open",
    TD_CLOSE => "td_close",
    DL_OPEN => "dl_open",
    DL_CLOSE => "dl_close",
    DT_OPEN => "dt_open",
    DT_CLOSE => "dt_close",
    DD_OPEN => "dd_open",
    DD_CLOSE => "dd_close",
    HR => "hr",
    FENCE => "fence",
    CODE_BLOCK => "code_block",
    HTML_BLOCK => "html_block",
    INLINE => "inline",
    TEXT => "text",
    CODE_INLINE => "code_inline",
    HTML_INLINE => "html_inline",
    EM_OPEN => "em_open",
    EM_CLOSE => "em_close",
    STRONG_OPEN => "strong_open",
    STRONG_CLOSE => "strong_close",
    S_OPEN => "s_open",
    S_CLOSE => "s_close",
    SUP_OPEN => "sup_open",
    SUP_CLOSE => "sup_close",
    SUB_OPEN => "sub_open",
    SUB_CLOSE => "sub_close",
    LINK_OPEN => "link_open",
    LINK_CLOSE => "link_close",
    IMAGE => "image",
    SOFTBREAK => "softbreak",
    HARDBREAK => "hardbreak",
    TASK_LIST_MARKER => "task_list_marker",
}

impl TokenKind {
    /// Kind defined outside this crate.
    pub fn custom(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    /// Rule name of this kind.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether a token opens, closes, or is self-contained.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Nesting {
    Open,
    Close,
    Leaf,
}

/// One token of the rendered stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Element name the default rule renders (`p`, `h2`, `code`, …).
    pub tag: String,
    pub nesting: Nesting,
    /// Attributes in render order.
    pub attrs: Vec<(String, String)>,
    /// Literal content for text, code and html tokens.
    pub content: String,
    /// Fence info string.
    pub info: String,
    /// Block-level token. Affects line feeds emitted by [`crate::render_token`].
    pub block: bool,
    /// Hidden tokens render nothing (paragraphs of tight lists).
    pub hidden: bool,
    pub children: Vec<Token>,
}

impl Token {
    pub fn new(kind: TokenKind, tag: impl Into<String>, nesting: Nesting) -> Self {
        Self {
            kind,
            tag: tag.into(),
            nesting,
            attrs: Vec::new(),
            content: String::new(),
            info: String::new(),
            block: false,
            hidden: false,
            children: Vec::new(),
        }
    }

    /// Block-level token.
    pub fn block(kind: TokenKind, tag: impl Into<String>, nesting: Nesting) -> Self {
        Self {
            block: true,
            ..Self::new(kind, tag, nesting)
        }
    }

    /// Inline text token.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::new(TokenKind::TEXT, "", Nesting::Leaf)
        }
    }

    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Value of attribute `name`.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set attribute `name`, replacing an existing value in place.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
    }

    /// Append `class` to the `class` attribute.
    pub fn add_class(&mut self, class: &str) {
        add_class(&mut self.attrs, class);
    }

    /// Plain text of the children, the way image alt text is computed.
    #[must_use]
    pub fn children_text(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }
}

/// Append `class` to the `class` entry of `attrs`, creating it if needed.
pub(crate) fn add_class(attrs: &mut Vec<(String, String)>, class: &str) {
    match attrs.iter_mut().find(|(key, _)| key == "class") {
        Some((_, value)) if value.split_whitespace().any(|c| c == class) => {}
        Some((_, value)) if value.is_empty() => class.clone_into(value),
        Some((_, value)) => {
            value.push(' ');
            value.push_str(class);
        }
        None => attrs.push(("class".to_owned(), class.to_owned())),
    }
}

fn collect_text(tokens: &[Token], out: &mut String) {
    for token in tokens {
        match token.kind.as_str() {
            "text" | "code_inline" | "html_inline" => out.push_str(&token.content),
            "softbreak" | "hardbreak" => out.push('\n'),
            _ => collect_text(&token.children, out),
        }
    }
}
