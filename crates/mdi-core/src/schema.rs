//! Document schema as seen by ingestion.
//!
//! Only what normalization needs is modelled: which node types are blocks and
//! which markup elements they are parsed from.

use mdi_dom::{Selector, SelectorList};

/// A node type of the target document model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeType {
    name: String,
    block: bool,
    /// Selectors of the elements this node is parsed from.
    parse_tags: Vec<String>,
}

impl NodeType {
    /// Block node parsed from `tags`.
    pub fn block<I, S>(name: impl Into<String>, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            block: true,
            parse_tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    /// Inline node parsed from `tags`.
    pub fn inline<I, S>(name: impl Into<String>, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            block: false,
            ..Self::block(name, tags)
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn is_block(&self) -> bool {
        self.block
    }

    pub fn parse_tags(&self) -> impl Iterator<Item = &str> {
        self.parse_tags.iter().map(String::as_str)
    }
}

/// Ordered set of node types.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    nodes: Vec<NodeType>,
}

impl Schema {
    #[must_use]
    pub fn new(nodes: Vec<NodeType>) -> Self {
        Self { nodes }
    }

    /// Node types of a typical rich-text editor: paragraphs, headings,
    /// quotes, lists, task lists, code blocks, rules, images and tables.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(vec![
            NodeType::block("paragraph", ["p"]),
            NodeType::block("heading", ["h1", "h2", "h3", "h4", "h5", "h6"]),
            NodeType::block("blockquote", ["blockquote"]),
            NodeType::block("bulletList", ["ul"]),
            NodeType::block("orderedList", ["ol"]),
            NodeType::block("listItem", ["li"]),
            NodeType::block("taskList", [r#"ul[data-type="taskList"]"#]),
            NodeType::block("taskItem", [r#"li[data-type="taskItem"]"#]),
            NodeType::block("codeBlock", ["pre"]),
            NodeType::block("horizontalRule", ["hr"]),
            NodeType::block("image", ["img[src]"]),
            NodeType::block("table", ["table"]),
            NodeType::block("tableRow", ["tr"]),
            NodeType::block("tableHeader", ["th"]),
            NodeType::block("tableCell", ["td"]),
            NodeType::inline("text", Vec::<String>::new()),
            NodeType::inline("hardBreak", ["br"]),
        ])
    }

    /// Add a node type; a node with the same name is replaced.
    pub fn add_node(&mut self, node: NodeType) {
        match self.nodes.iter_mut().find(|n| n.name == node.name) {
            Some(existing) => *existing = node,
            None => self.nodes.push(node),
        }
    }

    #[must_use]
    pub fn node(&self, name: &str) -> Option<&NodeType> {
        self.nodes.iter().find(|n| n.name == name)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodeType> {
        self.nodes.iter()
    }

    /// Selectors of every block node type.
    ///
    /// Selectors that fail to parse are skipped with a warning.
    #[must_use]
    pub fn block_selectors(&self) -> SelectorList {
        self.nodes
            .iter()
            .filter(|node| node.block)
            .flat_map(|node| node.parse_tags().map(move |tag| (node.name(), tag)))
            .filter_map(|(name, tag)| match Selector::parse(tag) {
                Ok(selector) => Some(selector),
                Err(e) => {
                    tracing::warn!(node = name, error = %e, "Skipping unsupported block selector");
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use mdi_dom::Element;

    use super::*;

    #[test]
    fn test_standard_block_selectors() {
        let selectors = Schema::standard().block_selectors();
        assert!(selectors.matches(&Element::new("p")));
        assert!(selectors.matches(&Element::new("h3")));
        assert!(selectors.matches(&Element::new("pre")));
        assert!(selectors.matches(&Element::new("img").with_attr("src", "a.png")));
        assert!(!selectors.matches(&Element::new("img")));
        assert!(!selectors.matches(&Element::new("em")));
        assert!(!selectors.matches(&Element::new("br")));
    }

    #[test]
    fn test_inline_nodes_excluded() {
        let schema = Schema::new(vec![NodeType::inline("mention", ["span[data-mention]"])]);
        assert!(schema.block_selectors().is_empty());
    }

    #[test]
    fn test_invalid_selector_skipped() {
        let schema = Schema::new(vec![
            NodeType::block("bad", ["div p"]),
            NodeType::block("callout", [r#"div[data-type="callout"]"#]),
        ]);
        let selectors = schema.block_selectors();
        assert_eq!(selectors.len(), 1);
        assert!(selectors.matches(&Element::new("div").with_attr("data-type", "callout")));
    }

    #[test]
    fn test_add_node_replaces_by_name() {
        let mut schema = Schema::standard();
        let before = schema.nodes().count();
        schema.add_node(NodeType::inline("image", ["img[src]"]));
        schema.add_node(NodeType::block("details", ["details"]));

        assert_eq!(schema.nodes().count(), before + 1);
        assert!(!schema.node("image").unwrap().is_block());
        assert!(schema.node("details").unwrap().is_block());
    }
}
