//! html5ever `TreeSink` that collects parsed markup into an arena.
//!
//! The tree builder addresses nodes by handle and moves them around while it
//! repairs markup, so nodes live in a flat arena until parsing finishes and
//! are only then turned into an owned [`Element`] tree.

use std::borrow::Cow;
use std::cell::RefCell;

use html5ever::tendril::StrTendril;
use html5ever::tree_builder::{ElementFlags, NodeOrText, QuirksMode, TreeSink};
use html5ever::{Attribute, QualName};

use crate::error::MarkupError;
use crate::node::{Element, Node, ROOT_TAG};
use crate::parser::MAX_NESTING;

/// Arena index of the document node.
const DOCUMENT: usize = 0;

#[derive(Debug)]
enum Data {
    Document,
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
    Comment(String),
}

#[derive(Debug)]
struct Slot {
    data: Data,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// Handle the tree builder keeps on a node.
///
/// Carries the qualified name so [`TreeSink::elem_name`] can lend it out
/// without reaching into the arena.
#[derive(Debug, Clone)]
pub(crate) struct Handle {
    id: usize,
    name: QualName,
}

impl Handle {
    fn unnamed(id: usize) -> Self {
        Self {
            id,
            name: QualName::new(None, html5ever::ns!(), html5ever::local_name!("")),
        }
    }
}

#[derive(Debug)]
struct Arena {
    slots: Vec<Slot>,
}

impl Arena {
    fn new() -> Self {
        let mut arena = Self { slots: Vec::new() };
        arena.push(Data::Document);
        arena
    }

    fn push(&mut self, data: Data) -> usize {
        self.slots.push(Slot {
            data,
            parent: None,
            children: Vec::new(),
        });
        self.slots.len() - 1
    }

    fn detach(&mut self, id: usize) {
        if let Some(parent) = self.slots[id].parent.take() {
            self.slots[parent].children.retain(|&child| child != id);
        }
    }

    fn attach(&mut self, parent: usize, index: usize, id: usize) {
        self.slots[id].parent = Some(parent);
        self.slots[parent].children.insert(index, id);
    }

    fn append(&mut self, parent: usize, child: NodeOrText<Handle>) {
        let id = match child {
            NodeOrText::AppendNode(node) => {
                self.detach(node.id);
                node.id
            }
            NodeOrText::AppendText(text) => {
                if let Some(&last) = self.slots[parent].children.last()
                    && let Data::Text(existing) = &mut self.slots[last].data
                {
                    existing.push_str(&text);
                    return;
                }
                self.push(Data::Text(text.to_string()))
            }
        };
        let index = self.slots[parent].children.len();
        self.attach(parent, index, id);
    }

    fn insert_before(&mut self, sibling: usize, child: NodeOrText<Handle>) {
        let Some(parent) = self.slots[sibling].parent else {
            return;
        };
        let id = match child {
            NodeOrText::AppendNode(node) => {
                self.detach(node.id);
                node.id
            }
            NodeOrText::AppendText(text) => {
                let previous = self.position(parent, sibling).and_then(|index| {
                    index
                        .checked_sub(1)
                        .map(|prev| self.slots[parent].children[prev])
                });
                if let Some(prev) = previous
                    && let Data::Text(existing) = &mut self.slots[prev].data
                {
                    existing.push_str(&text);
                    return;
                }
                self.push(Data::Text(text.to_string()))
            }
        };
        if let Some(index) = self.position(parent, sibling) {
            self.attach(parent, index, id);
        }
    }

    fn position(&self, parent: usize, child: usize) -> Option<usize> {
        self.slots[parent].children.iter().position(|&c| c == child)
    }

    fn child_element(&self, parent: usize, tag: &str) -> Option<usize> {
        self.slots[parent]
            .children
            .iter()
            .copied()
            .find(|&child| matches!(&self.slots[child].data, Data::Element { tag: t, .. } if t == tag))
    }

    fn build_children(&self, id: usize, target: &mut Element, depth: usize) -> Result<(), MarkupError> {
        for &child in &self.slots[id].children {
            match &self.slots[child].data {
                Data::Element { tag, attrs } => {
                    if depth >= MAX_NESTING {
                        return Err(MarkupError::TooDeep { limit: MAX_NESTING });
                    }
                    let mut el = Element::new(tag.as_str());
                    el.attrs.clone_from(attrs);
                    self.build_children(child, &mut el, depth + 1)?;
                    target.children.push(Node::Element(el));
                }
                Data::Text(text) => target.push_text(text),
                Data::Comment(body) => target.children.push(Node::Comment(body.clone())),
                Data::Document => {}
            }
        }
        Ok(())
    }
}

/// Sink building the arena for one parse.
#[derive(Debug)]
pub(crate) struct ArenaSink {
    arena: RefCell<Arena>,
}

impl Default for ArenaSink {
    fn default() -> Self {
        Self {
            arena: RefCell::new(Arena::new()),
        }
    }
}

impl ArenaSink {
    /// Children of the parsed `body`, under a [`ROOT_TAG`] element.
    pub(crate) fn into_fragment(self) -> Result<Element, MarkupError> {
        let arena = self.arena.into_inner();
        let mut root = Element::new(ROOT_TAG);
        let body = arena
            .child_element(DOCUMENT, "html")
            .and_then(|html| arena.child_element(html, ROOT_TAG));
        if let Some(body) = body {
            arena.build_children(body, &mut root, 0)?;
        }
        Ok(root)
    }
}

fn attribute_name(name: &QualName) -> String {
    match &name.prefix {
        Some(prefix) => format!("{prefix}:{}", name.local),
        None => name.local.to_string(),
    }
}

impl TreeSink for ArenaSink {
    type Handle = Handle;
    type Output = Self;
    type ElemName<'a>
        = &'a QualName
    where
        Self: 'a;

    fn finish(self) -> Self::Output {
        self
    }

    // Markup is repaired, never rejected.
    fn parse_error(&self, _msg: Cow<'static, str>) {}

    fn get_document(&self) -> Self::Handle {
        Handle::unnamed(DOCUMENT)
    }

    fn elem_name<'a>(&'a self, target: &'a Self::Handle) -> Self::ElemName<'a> {
        &target.name
    }

    fn create_element(&self, name: QualName, attrs: Vec<Attribute>, _flags: ElementFlags) -> Self::Handle {
        let data = Data::Element {
            tag: name.local.to_string(),
            attrs: attrs
                .into_iter()
                .map(|attr| (attribute_name(&attr.name), attr.value.to_string()))
                .collect(),
        };
        let id = self.arena.borrow_mut().push(data);
        Handle { id, name }
    }

    fn create_comment(&self, text: StrTendril) -> Self::Handle {
        Handle::unnamed(self.arena.borrow_mut().push(Data::Comment(text.to_string())))
    }

    fn create_pi(&self, _target: StrTendril, data: StrTendril) -> Self::Handle {
        Handle::unnamed(self.arena.borrow_mut().push(Data::Comment(data.to_string())))
    }

    fn append(&self, parent: &Self::Handle, child: NodeOrText<Self::Handle>) {
        self.arena.borrow_mut().append(parent.id, child);
    }

    fn append_based_on_parent_node(
        &self,
        element: &Self::Handle,
        prev_element: &Self::Handle,
        child: NodeOrText<Self::Handle>,
    ) {
        let has_parent = self.arena.borrow().slots[element.id].parent.is_some();
        if has_parent {
            self.append_before_sibling(element, child);
        } else {
            self.append(prev_element, child);
        }
    }

    fn append_doctype_to_document(&self, _name: StrTendril, _public_id: StrTendril, _system_id: StrTendril) {}

    fn get_template_contents(&self, target: &Self::Handle) -> Self::Handle {
        target.clone()
    }

    fn same_node(&self, x: &Self::Handle, y: &Self::Handle) -> bool {
        x.id == y.id
    }

    fn set_quirks_mode(&self, _mode: QuirksMode) {}

    fn append_before_sibling(&self, sibling: &Self::Handle, new_node: NodeOrText<Self::Handle>) {
        self.arena.borrow_mut().insert_before(sibling.id, new_node);
    }

    fn add_attrs_if_missing(&self, target: &Self::Handle, attrs: Vec<Attribute>) {
        let mut arena = self.arena.borrow_mut();
        if let Data::Element { attrs: existing, .. } = &mut arena.slots[target.id].data {
            for attr in attrs {
                let name = attribute_name(&attr.name);
                if !existing.iter().any(|(key, _)| *key == name) {
                    existing.push((name, attr.value.to_string()));
                }
            }
        }
    }

    fn remove_from_parent(&self, target: &Self::Handle) {
        self.arena.borrow_mut().detach(target.id);
    }

    fn reparent_children(&self, node: &Self::Handle, new_parent: &Self::Handle) {
        let mut arena = self.arena.borrow_mut();
        let children = std::mem::take(&mut arena.slots[node.id].children);
        for child in children {
            arena.slots[child].parent = None;
            let index = arena.slots[new_parent.id].children.len();
            arena.attach(new_parent.id, index, child);
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn element(sink: &ArenaSink, tag: &str) -> Handle {
        let name = QualName::new(None, html5ever::ns!(html), tag.into());
        sink.create_element(name, Vec::new(), ElementFlags::default())
    }

    fn text(value: &str) -> NodeOrText<Handle> {
        NodeOrText::AppendText(StrTendril::from(value))
    }

    #[test]
    fn test_adjacent_text_merged() {
        let sink = ArenaSink::default();
        let p = element(&sink, "p");
        sink.append(&p, text("a"));
        sink.append(&p, text("b"));

        assert_eq!(sink.arena.borrow().slots[p.id].children.len(), 1);
    }

    #[test]
    fn test_insert_before_merges_with_previous_text() {
        let sink = ArenaSink::default();
        let p = element(&sink, "p");
        let em = element(&sink, "em");
        sink.append(&p, text("a"));
        sink.append(&p, NodeOrText::AppendNode(em.clone()));
        sink.append_before_sibling(&em, text("b"));

        let arena = sink.arena.borrow();
        assert_eq!(arena.slots[p.id].children.len(), 2);
        assert!(matches!(&arena.slots[arena.slots[p.id].children[0]].data, Data::Text(t) if t == "ab"));
    }

    #[test]
    fn test_reparent_children_moves_in_order() {
        let sink = ArenaSink::default();
        let from = element(&sink, "div");
        let to = element(&sink, "span");
        let a = element(&sink, "a");
        let b = element(&sink, "b");
        sink.append(&from, NodeOrText::AppendNode(a.clone()));
        sink.append(&from, NodeOrText::AppendNode(b.clone()));
        sink.reparent_children(&from, &to);

        let arena = sink.arena.borrow();
        assert!(arena.slots[from.id].children.is_empty());
        assert_eq!(arena.slots[to.id].children, vec![a.id, b.id]);
        assert_eq!(arena.slots[a.id].parent, Some(to.id));
    }

    #[test]
    fn test_elem_name_borrowed_from_handle() {
        let sink = ArenaSink::default();
        let p = element(&sink, "p");
        assert_eq!(&*sink.elem_name(&p).local, "p");
    }
}
