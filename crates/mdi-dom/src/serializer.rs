//! Markup serializer.
//!
//! Output follows `innerHTML` conventions: void elements have no closing tag,
//! `&`, `<`, `>` and non-breaking spaces are escaped everywhere, double quotes
//! inside attribute values, which are always double-quoted. Text inside raw
//! text elements (`script`, `style`, ...) is written as is.

use std::fmt::Write;

use crate::node::{Element, Node, is_void_element};

/// Elements whose text is not escaped.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "iframe", "noembed", "noframes", "noscript", "plaintext", "script", "style", "xmp",
];

/// Serialize the children of `el`.
pub(crate) fn serialize_children(el: &Element) -> String {
    let mut out = String::with_capacity(256);
    write_children(el, &mut out);
    out
}

/// Serialize `el` including its own tags.
pub(crate) fn serialize_element(el: &Element) -> String {
    let mut out = String::with_capacity(256);
    write_element(el, &mut out);
    out
}

fn write_children(el: &Element, out: &mut String) {
    let raw_text = RAW_TEXT_ELEMENTS.contains(&el.tag.as_str());
    for child in &el.children {
        match child {
            Node::Element(inner) => write_element(inner, out),
            Node::Text(text) if raw_text => out.push_str(text),
            Node::Text(text) => out.push_str(&escape_text(text)),
            Node::Comment(body) => write!(out, "<!--{body}-->").unwrap(),
        }
    }
}

fn write_element(el: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&el.tag);
    for (key, value) in &el.attrs {
        write!(out, r#" {key}="{}""#, escape_attr(value)).unwrap();
    }
    out.push('>');

    if is_void_element(&el.tag) {
        return;
    }

    write_children(el, out);
    write!(out, "</{}>", el.tag).unwrap();
}

/// Escape text content.
#[must_use]
pub fn escape_text(text: &str) -> String {
    escape(text, false)
}

/// Escape an attribute value for use inside double quotes.
#[must_use]
pub fn escape_attr(text: &str) -> String {
    escape(text, true)
}

fn escape(text: &str, in_attribute: bool) -> String {
    let mut result = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => result.push_str("&amp;"),
            '\u{00a0}' => result.push_str("&nbsp;"),
            '"' if in_attribute => result.push_str("&quot;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            _ => result.push(ch),
        }
    }
    result
}
