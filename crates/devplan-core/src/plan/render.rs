//! Markdown rendering of finalized tasks.
//!
//! - [`render_task_list`] produces the master `task_list.md`.
//! - [`render_task_file`] produces one standalone document per task with an
//!   `xml` block of `<task>`, `<context>`, `<implement>`, `<subtask>` and
//!   `<dod>` sections, suitable for handing to an agent.

use chrono::{DateTime, SecondsFormat, Utc};

use super::task::DevTask;

/// Subtasks used when a task has none of its own.
const DEFAULT_SUBTASKS: [&str; 4] = [
    "- [ ] Analyze requirements and constraints for this task",
    "- [ ] Design the approach and the interfaces involved",
    "- [ ] Implement the changes",
    "- [ ] Review and test the implementation",
];

/// Definition-of-done checklist appended to every task.
const DEFINITION_OF_DONE: [&str; 3] = [
    "- [ ] Code implemented",
    "- [ ] Tests updated",
    "- [ ] Docs updated",
];

/// Inputs shared by every per-task document in a run.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions<'a> {
    /// Project name shown in the header; omitted when empty.
    pub project_name: &'a str,
    /// Timestamp of this run.
    pub generated_at: DateTime<Utc>,
    /// Used as `<context>` for tasks without their own context.
    pub fallback_context: &'a str,
}

/// Render the master task list.
pub fn render_task_list(tasks: &[DevTask], generated_at: DateTime<Utc>) -> String {
    let mut out = String::new();
    out.push_str("# Task List\n\n");
    out.push_str(&format!(
        "Generated: {}\n\n",
        generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    ));
    for task in tasks {
        let mark = if task.checked { 'x' } else { ' ' };
        out.push_str(&format!("- [{mark}] {} — {}\n", task.id, task.title));
    }
    out
}

/// Render the standalone document for one task.
pub fn render_task_file(task: &DevTask, opts: &RenderOptions<'_>) -> String {
    let mut out = String::new();

    // Header
    out.push_str(&format!("# {} — {}\n\n", task.id, task.title));
    if !opts.project_name.trim().is_empty() {
        out.push_str(&format!("- Project: {}\n", opts.project_name.trim()));
    }
    out.push_str(&format!(
        "- Date: {}\n\n",
        opts.generated_at.format("%Y-%m-%d")
    ));

    let context = if task.context.trim().is_empty() {
        opts.fallback_context
    } else {
        task.context.as_str()
    };

    let subtasks = if task.subtasks.is_empty() {
        DEFAULT_SUBTASKS.join("\n")
    } else {
        task.subtasks.join("\n")
    };

    let implement = format!(
        "Implement \"{}\" as described in the context above. Keep the change scoped to this task and leave the codebase building and tested.",
        task.title
    );

    out.push_str("```xml\n");
    push_section(&mut out, "task", &xml_escape(&task.title));
    push_section(&mut out, "context", &xml_escape(context.trim()));
    push_section(&mut out, "implement", &xml_escape(&implement));
    push_section(&mut out, "subtask", &xml_escape(&subtasks));
    push_section(&mut out, "dod", &DEFINITION_OF_DONE.join("\n"));
    out.push_str("```\n");

    out
}

fn push_section(out: &mut String, tag: &str, body: &str) {
    out.push_str(&format!("<{tag}>\n"));
    if !body.is_empty() {
        out.push_str(body);
        out.push('\n');
    }
    out.push_str(&format!("</{tag}>\n"));
}

/// Escape `&`, `<` and `>` so interpolated text cannot break the tag
/// structure. Quotes are left alone.
pub fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            other => out.push(other),
        }
    }
    out
}
