//! Compound element selectors.
//!
//! Supports the subset that document schemas use to describe which elements a
//! node type is parsed from: a tag (or `*`), classes, an id, and attribute
//! presence/equality tests, combined in comma-separated lists. Combinators
//! are not supported.

use crate::error::SelectorError;
use crate::node::Element;

/// Attribute test inside `[...]`.
#[derive(Clone, Debug, PartialEq, Eq)]
struct AttrTest {
    name: String,
    value: Option<String>,
}

/// A single compound selector such as `ul[data-type="taskList"]`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selector {
    tag: Option<String>,
    classes: Vec<String>,
    id: Option<String>,
    attrs: Vec<AttrTest>,
}

impl Selector {
    /// Parse one compound selector.
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let source = input.trim();
        if source.is_empty() {
            return Err(SelectorError::new(input, "empty selector"));
        }

        let mut selector = Self::default();
        let mut rest = source;

        if let Some(after) = rest.strip_prefix('*') {
            rest = after;
        } else {
            let (tag, after) = take_ident(rest);
            if !tag.is_empty() {
                selector.tag = Some(tag.to_ascii_lowercase());
            }
            rest = after;
        }

        while let Some(c) = rest.chars().next() {
            match c {
                '.' => {
                    let (class, after) = take_ident(&rest[1..]);
                    if class.is_empty() {
                        return Err(SelectorError::new(input, "expected class name after '.'"));
                    }
                    selector.classes.push(class.to_owned());
                    rest = after;
                }
                '#' => {
                    let (id, after) = take_ident(&rest[1..]);
                    if id.is_empty() {
                        return Err(SelectorError::new(input, "expected id after '#'"));
                    }
                    selector.id = Some(id.to_owned());
                    rest = after;
                }
                '[' => {
                    let (test, after) = parse_attr_test(input, &rest[1..])?;
                    selector.attrs.push(test);
                    rest = after;
                }
                c if c.is_whitespace() || c == '>' || c == '+' || c == '~' => {
                    return Err(SelectorError::new(input, "combinators are not supported"));
                }
                other => {
                    return Err(SelectorError::new(
                        input,
                        format!("unexpected character {other:?}"),
                    ));
                }
            }
        }

        Ok(selector)
    }

    /// Check an element against this selector.
    #[must_use]
    pub fn matches(&self, el: &Element) -> bool {
        if self.tag.as_ref().is_some_and(|tag| *tag != el.tag) {
            return false;
        }
        if self.id.as_ref().is_some_and(|id| el.attr("id") != Some(id.as_str())) {
            return false;
        }
        if !self.classes.iter().all(|class| el.has_class(class)) {
            return false;
        }
        self.attrs.iter().all(|test| match (&test.value, el.attr(&test.name)) {
            (_, None) => false,
            (None, Some(_)) => true,
            (Some(expected), Some(actual)) => expected == actual,
        })
    }
}

/// Comma-separated list of selectors; matches when any member matches.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectorList {
    selectors: Vec<Selector>,
}

impl SelectorList {
    /// Parse a comma-separated selector list.
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let selectors = split_list(input)
            .into_iter()
            .map(Selector::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { selectors })
    }

    /// Add a selector to the list.
    pub fn push(&mut self, selector: Selector) {
        self.selectors.push(selector);
    }

    /// Whether the list has no selectors (and therefore matches nothing).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    /// Number of selectors in the list.
    #[must_use]
    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    /// Check an element against every selector in the list.
    #[must_use]
    pub fn matches(&self, el: &Element) -> bool {
        self.selectors.iter().any(|selector| selector.matches(el))
    }
}

impl FromIterator<Selector> for SelectorList {
    fn from_iter<I: IntoIterator<Item = Selector>>(iter: I) -> Self {
        Self {
            selectors: iter.into_iter().collect(),
        }
    }
}

/// Split on commas that are not inside brackets or quotes.
fn split_list(input: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in input.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                parts.push(&input[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ':'
}

fn take_ident(input: &str) -> (&str, &str) {
    let end = input
        .char_indices()
        .find(|&(_, c)| !is_ident_char(c))
        .map_or(input.len(), |(i, _)| i);
    input.split_at(end)
}

/// Parse the inside of `[...]`; `rest` starts right after the `[`.
fn parse_attr_test<'a>(
    selector: &str,
    rest: &'a str,
) -> Result<(AttrTest, &'a str), SelectorError> {
    let rest = rest.trim_start();
    let (name, rest) = take_ident(rest);
    if name.is_empty() {
        return Err(SelectorError::new(selector, "expected attribute name"));
    }
    let name = name.to_ascii_lowercase();
    let rest = rest.trim_start();

    if let Some(after) = rest.strip_prefix(']') {
        return Ok((AttrTest { name, value: None }, after));
    }

    let Some(rest) = rest.strip_prefix('=') else {
        return Err(SelectorError::new(
            selector,
            "only [attr] and [attr=value] tests are supported",
        ));
    };
    let rest = rest.trim_start();

    let (value, rest) = match rest.chars().next() {
        Some(q @ ('"' | '\'')) => {
            let body = &rest[1..];
            let end = body
                .find(q)
                .ok_or_else(|| SelectorError::new(selector, "unterminated quoted value"))?;
            (&body[..end], &body[end + 1..])
        }
        _ => take_ident(rest),
    };

    let rest = rest.trim_start();
    let Some(rest) = rest.strip_prefix(']') else {
        return Err(SelectorError::new(selector, "expected ']'"));
    };

    Ok((
        AttrTest {
            name,
            value: Some(value.to_owned()),
        },
        rest,
    ))
}
