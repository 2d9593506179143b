//! Tree normalization.
//!
//! Runs on the tree re-parsed from the rendered, restored markup:
//!
//! 1. Block elements that sit directly inside a paragraph are hoisted out,
//!    splitting the paragraph around them.
//! 2. The line feed the renderer leaves after an element is dropped from the
//!    following text, except inside `pre`.
//! 3. In inline mode, a leading paragraph is unwrapped and the outer
//!    whitespace of the source text is put back.

use mdi_dom::{Element, Node, SelectorList};

const PARAGRAPH: &str = "p";
const PREFORMATTED: &str = "pre";

/// Normalize `tree` in place.
///
/// `blocks` selects block elements; an empty list skips hoisting. `source`
/// is the caller's original text, used for inline whitespace.
pub fn normalize(tree: &mut Element, blocks: &SelectorList, inline: bool, source: &str) {
    if !blocks.is_empty() {
        hoist_blocks(tree, blocks);
    }
    strip_block_newlines(tree, false);
    if inline {
        unwrap_inline(tree, source);
    }
}

/// Move block elements out of the paragraphs that directly contain them.
///
/// A paragraph `<p>a<hr>b</p>` becomes `<p>a</p><hr><p>b</p>`. Paragraph
/// pieces left without children are dropped.
pub fn hoist_blocks(container: &mut Element, blocks: &SelectorList) {
    let mut idx = 0;
    while idx < container.children.len() {
        let split = match &container.children[idx] {
            Node::Element(p) if p.tag == PARAGRAPH && p.element_children().any(|c| blocks.matches(c)) => {
                Some(split_paragraph(p, blocks))
            }
            _ => None,
        };

        match split {
            // Revisit the first piece: a hoisted paragraph may need splitting too.
            Some(pieces) => {
                container.children.splice(idx..=idx, pieces);
            }
            None => {
                if let Node::Element(child) = &mut container.children[idx] {
                    hoist_blocks(child, blocks);
                }
                idx += 1;
            }
        }
    }
}

/// Pieces of `p` split at its direct block children.
fn split_paragraph(p: &Element, blocks: &SelectorList) -> Vec<Node> {
    let mut pieces = Vec::new();
    let mut run = p.shallow_clone();

    for child in &p.children {
        match child {
            Node::Element(el) if blocks.matches(el) => {
                if !run.children.is_empty() {
                    let next = run.shallow_clone();
                    pieces.push(Node::Element(std::mem::replace(&mut run, next)));
                }
                pieces.push(child.clone());
            }
            _ => run.children.push(child.clone()),
        }
    }
    if !run.children.is_empty() {
        pieces.push(Node::Element(run));
    }
    pieces
}

/// Drop one leading line feed from text that follows an element.
///
/// Text following an element inside `pre`, or following a `pre`, is kept.
pub fn strip_block_newlines(el: &mut Element, in_pre: bool) {
    for idx in 0..el.children.len() {
        let Node::Element(child) = &mut el.children[idx] else {
            continue;
        };
        let child_in_pre = in_pre || child.tag == PREFORMATTED;
        strip_block_newlines(child, child_in_pre);

        if !child_in_pre
            && let Some(Node::Text(text)) = el.children.get_mut(idx + 1)
            && text.starts_with('\n')
        {
            text.remove(0);
        }
    }
    el.retain_children(|node| !matches!(node, Node::Text(text) if text.is_empty()));
}

/// Unwrap a leading paragraph so inline content does not open a block.
///
/// Whitespace around `source` is restored around the result. Trailing
/// whitespace is only restored when the paragraph is the last element.
/// Source starting with a blank line keeps its paragraph.
pub fn unwrap_inline(root: &mut Element, source: &str) {
    let Some(idx) = root.first_element_index() else {
        return;
    };
    if !root.children[idx].is_element_named(PARAGRAPH) {
        return;
    }

    let start = &source[..source.len() - source.trim_start().len()];
    let end = if root.has_next_element_sibling(idx) {
        ""
    } else {
        &source[source.trim_end().len()..]
    };

    if source.starts_with("\n\n") {
        if let Some(Node::Element(p)) = root.children.get_mut(idx) {
            p.push_text(end);
        }
        return;
    }

    root.unwrap_child(idx);
    root.prepend_text(start);
    root.push_text(end);
}
