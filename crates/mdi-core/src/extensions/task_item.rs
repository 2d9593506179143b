use mdi_dom::{Element, Node, SelectorList};

use crate::error::HookError;
use crate::extension::{HookContext, MarkdownSpec};

/// Turns checkbox list items into task items.
///
/// Every `.task-list-item` gets `data-type="taskItem"` and, when it holds a
/// checkbox, `data-checked` with the checkbox state; the checkbox itself is
/// removed.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskItemSpec;

impl MarkdownSpec for TaskItemSpec {
    fn update_dom(&self, _ctx: &HookContext<'_>, tree: &mut Element) -> Result<(), HookError> {
        let items = SelectorList::parse(".task-list-item")
            .map_err(|e| HookError::with_source("invalid task item selector", e))?;
        tree.select_mut(&items, &mut |item| {
            item.set_attr("data-type", "taskItem");
            if let Some(input) = remove_first(item, "input") {
                let checked = input.attr("checked").is_some();
                item.set_attr("data-checked", checked.to_string());
            }
        });
        Ok(())
    }
}

/// Remove and return the first descendant named `tag`, in document order.
fn remove_first(el: &mut Element, tag: &str) -> Option<Element> {
    for idx in 0..el.children.len() {
        if el.children[idx].is_element_named(tag) {
            return match el.replace_child(idx, Vec::new()) {
                Some(Node::Element(found)) => Some(found),
                _ => None,
            };
        }
        if let Node::Element(child) = &mut el.children[idx]
            && let Some(found) = remove_first(child, tag)
        {
            return Some(found);
        }
    }
    None
}
