//! Element tree node types.

use crate::selector::SelectorList;
use crate::serializer;

/// Tag of the synthetic element that holds a parsed fragment.
pub const ROOT_TAG: &str = "body";

/// HTML elements that never have content or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Check whether `tag` is an HTML void element.
#[must_use]
pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// Child of an element: another element, a text run, or a comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Nested element.
    Element(Element),
    /// Decoded character data.
    Text(String),
    /// Comment body without the `<!--`/`-->` delimiters.
    Comment(String),
}

impl Node {
    /// Create a text node.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// The element, if this node is one.
    #[must_use]
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Mutable access to the element, if this node is one.
    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Self::Element(el) => Some(el),
            _ => None,
        }
    }

    /// The text, if this node is a text run.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Whether this node is an element with the given tag.
    #[must_use]
    pub fn is_element_named(&self, tag: &str) -> bool {
        self.as_element().is_some_and(|el| el.tag == tag)
    }
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Self::Element(el)
    }
}

/// Element with ordered attributes and children.
///
/// Tag and attribute names are stored lowercase. Attribute order is kept so
/// serialization is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// Element tag name.
    pub tag: String,
    /// Attributes in source order.
    pub attrs: Vec<(String, String)>,
    /// Child nodes.
    pub children: Vec<Node>,
}

impl Element {
    /// Create a new element with the given tag.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Add an attribute.
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Append a text run.
    #[must_use]
    pub fn with_text(mut self, text: &str) -> Self {
        self.push_text(text);
        self
    }

    /// Append a child node.
    #[must_use]
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Set children.
    #[must_use]
    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    /// Copy of this element without its children (like `cloneNode(false)`).
    #[must_use]
    pub fn shallow_clone(&self) -> Self {
        Self {
            tag: self.tag.clone(),
            attrs: self.attrs.clone(),
            children: Vec::new(),
        }
    }

    /// Attribute value by name.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, replacing an existing value in place.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
    }

    /// Remove an attribute, returning its value.
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let index = self.attrs.iter().position(|(key, _)| key == name)?;
        Some(self.attrs.remove(index).1)
    }

    /// Whether the whitespace-separated `class` attribute contains `class`.
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_ascii_whitespace().any(|c| c == class))
    }

    /// Add a class unless it is already present.
    pub fn add_class(&mut self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let classes = match self.attr("class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {class}", existing.trim()),
            _ => class.to_owned(),
        };
        self.set_attr("class", classes);
    }

    /// Check this element against a selector list.
    #[must_use]
    pub fn matches(&self, selectors: &SelectorList) -> bool {
        selectors.matches(self)
    }

    /// Child elements, skipping text and comments.
    pub fn element_children(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Index in `children` of the first element child.
    #[must_use]
    pub fn first_element_index(&self) -> Option<usize> {
        self.children
            .iter()
            .position(|node| matches!(node, Node::Element(_)))
    }

    /// Whether any element follows `children[index]`.
    #[must_use]
    pub fn has_next_element_sibling(&self, index: usize) -> bool {
        self.children
            .iter()
            .skip(index + 1)
            .any(|node| matches!(node, Node::Element(_)))
    }

    /// Concatenated text of all descendant text runs.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    /// Append text, merging with a trailing text run.
    pub fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Node::Text(last)) = self.children.last_mut() {
            last.push_str(text);
        } else {
            self.children.push(Node::text(text));
        }
    }

    /// Prepend text, merging with a leading text run.
    pub fn prepend_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Node::Text(first)) = self.children.first_mut() {
            first.insert_str(0, text);
        } else {
            self.children.insert(0, Node::text(text));
        }
    }

    /// Replace the child at `index` with `nodes`.
    ///
    /// Returns the removed node, or `None` if `index` is out of range.
    pub fn replace_child(&mut self, index: usize, nodes: Vec<Node>) -> Option<Node> {
        if index >= self.children.len() {
            return None;
        }
        let removed = self.children.splice(index..=index, nodes).next();
        self.merge_adjacent_text();
        removed
    }

    /// Replace the element child at `index` with its own children.
    ///
    /// Returns `false` when there is no element at `index`.
    pub fn unwrap_child(&mut self, index: usize) -> bool {
        let Some(Node::Element(child)) = self.children.get_mut(index) else {
            return false;
        };
        let grandchildren = std::mem::take(&mut child.children);
        self.replace_child(index, grandchildren);
        true
    }

    /// Remove every child for which `keep` returns `false`.
    pub fn retain_children(&mut self, mut keep: impl FnMut(&Node) -> bool) {
        self.children.retain(|node| keep(node));
        self.merge_adjacent_text();
    }

    /// Merge neighbouring text runs and drop empty ones (like `Node.normalize()`).
    pub fn merge_adjacent_text(&mut self) {
        let mut merged: Vec<Node> = Vec::with_capacity(self.children.len());
        for node in std::mem::take(&mut self.children) {
            match node {
                Node::Text(text) if text.is_empty() => {}
                Node::Text(text) => {
                    if let Some(Node::Text(prev)) = merged.last_mut() {
                        prev.push_str(&text);
                    } else {
                        merged.push(Node::Text(text));
                    }
                }
                other => merged.push(other),
            }
        }
        self.children = merged;
    }

    /// All descendant elements matching `selectors`, in document order.
    ///
    /// The element itself is not considered, mirroring `querySelectorAll`.
    #[must_use]
    pub fn find_all(&self, selectors: &SelectorList) -> Vec<&Element> {
        let mut found = Vec::new();
        let mut stack: Vec<&Element> = self.element_children().collect();
        stack.reverse();
        while let Some(el) = stack.pop() {
            if selectors.matches(el) {
                found.push(el);
            }
            let start = stack.len();
            stack.extend(el.element_children());
            stack[start..].reverse();
        }
        found
    }

    /// First descendant element matching `selectors`.
    #[must_use]
    pub fn find_first(&self, selectors: &SelectorList) -> Option<&Element> {
        self.find_all(selectors).into_iter().next()
    }

    /// Visit every descendant element in document order.
    ///
    /// `visit` runs before the element's own children are visited, so it may
    /// rewrite them.
    pub fn for_each_descendant_mut(&mut self, visit: &mut dyn FnMut(&mut Element)) {
        for child in &mut self.children {
            if let Node::Element(el) = child {
                visit(el);
                el.for_each_descendant_mut(visit);
            }
        }
    }

    /// Visit every descendant element matching `selectors`.
    pub fn select_mut(&mut self, selectors: &SelectorList, visit: &mut dyn FnMut(&mut Element)) {
        self.for_each_descendant_mut(&mut |el| {
            if selectors.matches(el) {
                visit(el);
            }
        });
    }

    /// Serialize the children of this element.
    #[must_use]
    pub fn inner_html(&self) -> String {
        serializer::serialize_children(self)
    }

    /// Serialize this element including its own tag.
    #[must_use]
    pub fn outer_html(&self) -> String {
        serializer::serialize_element(self)
    }
}

fn collect_text(el: &Element, out: &mut String) {
    for child in &el.children {
        match child {
            Node::Text(text) => out.push_str(text),
            Node::Element(inner) => collect_text(inner, out),
            Node::Comment(_) => {}
        }
    }
}
