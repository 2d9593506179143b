use mdi_dom::{Element, SelectorList};
use mdi_renderer::{MarkdownEngine, Token, TokenKind};
use pulldown_cmark::Options;

use crate::error::HookError;
use crate::extension::{HookContext, MarkdownSpec};

/// Parses `- [ ]` / `- [x]` items and tags their lists as task lists.
///
/// `setup` turns on task list syntax and marks lists holding a checkbox
/// with `contains-task-list` and their items with `task-list-item`.
/// `update_dom` then tags those lists with `data-type="taskList"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskListSpec;

impl MarkdownSpec for TaskListSpec {
    fn setup(&self, _ctx: &HookContext<'_>, engine: &mut MarkdownEngine) -> Result<(), HookError> {
        engine.options_mut().extensions.insert(Options::ENABLE_TASKLISTS);
        engine.push_core_rule("task_lists", |tokens, _options| mark_task_lists(tokens));
        Ok(())
    }

    fn update_dom(&self, _ctx: &HookContext<'_>, tree: &mut Element) -> Result<(), HookError> {
        let lists = SelectorList::parse(".contains-task-list")
            .map_err(|e| HookError::with_source("invalid task list selector", e))?;
        tree.select_mut(&lists, &mut |list| list.set_attr("data-type", "taskList"));
        Ok(())
    }
}

/// Core rule: class lists and items whose first line starts with a checkbox.
fn mark_task_lists(tokens: &mut [Token]) {
    let mut lists: Vec<usize> = Vec::new();
    // (item index, first inline seen)
    let mut items: Vec<(usize, bool)> = Vec::new();

    for idx in 0..tokens.len() {
        let kind = &tokens[idx].kind;
        if *kind == TokenKind::BULLET_LIST_OPEN || *kind == TokenKind::ORDERED_LIST_OPEN {
            lists.push(idx);
        } else if *kind == TokenKind::BULLET_LIST_CLOSE || *kind == TokenKind::ORDERED_LIST_CLOSE {
            lists.pop();
        } else if *kind == TokenKind::LIST_ITEM_OPEN {
            items.push((idx, false));
        } else if *kind == TokenKind::LIST_ITEM_CLOSE {
            items.pop();
        } else if *kind == TokenKind::INLINE
            && let Some((item, seen)) = items.last_mut()
            && !*seen
        {
            *seen = true;
            let item = *item;
            let inline = &mut tokens[idx];
            let Some(marker) = inline
                .children
                .first_mut()
                .filter(|t| t.kind == TokenKind::TASK_LIST_MARKER)
            else {
                continue;
            };
            marker.add_class("task-list-item-checkbox");
            tokens[item].add_class("task-list-item");
            if let Some(&list) = lists.last() {
                tokens[list].add_class("contains-task-list");
            }
        }
    }
}
