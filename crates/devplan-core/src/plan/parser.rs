//! Planning-text parser.
//!
//! Combines the checkbox list and the tag blocks into candidate tasks:
//! - Checkbox pass: each unindented checkbox line is a task; indented
//!   checkbox lines are its subtasks. Lines inside closed tag blocks are
//!   skipped; an unterminated block hides nothing.
//! - Context and (missing) subtasks are resolved from the tag blocks by
//!   title, exact match first, then prefix match in either direction.
//! - When the checkbox pass finds nothing, one task per `<task>` block is
//!   synthesized instead.
//!
//! Parsing never fails; the worst case is an empty list.

use tracing::debug;

use super::classify::{LineKind, checkbox, classify_line};
use super::tags::{TagBlocks, extract_tag_blocks};
use super::task::DevTask;

/// Parse raw planning text into candidate tasks (no IDs, no ordering rules).
pub fn parse_tasks(text: &str) -> Vec<DevTask> {
    let blocks = extract_tag_blocks(text);
    let mut tasks = scan_checkbox_tasks(text, &blocks);

    if tasks.is_empty() {
        if !blocks.titles.is_empty() {
            debug!(
                count = blocks.titles.len(),
                "no checkbox tasks found, synthesizing from <task> blocks"
            );
        }
        return blocks
            .titles
            .iter()
            .map(|title| tag_task(title, &blocks))
            .collect();
    }

    for task in &mut tasks {
        if let Some(context) = blocks.context_for(&task.title) {
            task.context = context.to_string();
        }
        if task.subtasks.is_empty() {
            if let Some(items) = blocks.subtasks_for(&task.title) {
                task.subtasks = items.to_vec();
            }
        }
    }

    debug!(count = tasks.len(), "parsed checkbox tasks");
    tasks
}

fn scan_checkbox_tasks(text: &str, blocks: &TagBlocks) -> Vec<DevTask> {
    let mut tasks: Vec<DevTask> = Vec::new();
    for (index, line) in text.lines().enumerate() {
        if blocks.is_consumed(index) {
            continue;
        }
        match classify_line(line) {
            LineKind::Task { checked, text } => tasks.push(DevTask {
                checked,
                ..DevTask::new(text)
            }),
            LineKind::Subtask { checked, text, .. } => match tasks.last_mut() {
                Some(parent) => parent.subtasks.push(checkbox(checked, text)),
                None => debug!(line = text, "dropping subtask with no parent task"),
            },
            LineKind::Other => {}
        }
    }
    tasks
}

fn tag_task(title: &str, blocks: &TagBlocks) -> DevTask {
    DevTask {
        context: blocks.context_for(title).unwrap_or_default().to_string(),
        subtasks: blocks.subtasks_for(title).unwrap_or_default().to_vec(),
        ..DevTask::new(title)
    }
}
