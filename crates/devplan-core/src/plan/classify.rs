//! Checkbox line classification.
//!
//! A checkbox line is optional leading whitespace, a dash, a `[ ]` / `[x]`
//! marker (the `x` is case-insensitive) and non-empty text. Lines without
//! leading whitespace are top-level tasks; indented lines are subtasks of the
//! most recent top-level task.

use std::sync::LazyLock;

use regex::Regex;

/// Compiled once; the pattern is a literal so compilation cannot fail.
static CHECKBOX_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\s*)-\s+\[([ xX])\]\s+(.*\S)\s*$").expect("checkbox pattern is a valid regex")
});

/// Result of classifying a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// Unindented checkbox line.
    Task { checked: bool, text: &'a str },
    /// Indented checkbox line; `indent` is the leading whitespace.
    Subtask {
        indent: &'a str,
        checked: bool,
        text: &'a str,
    },
    /// Anything that is not a checkbox line.
    Other,
}

/// Classify one line of planning text.
pub fn classify_line(line: &str) -> LineKind<'_> {
    let Some(caps) = CHECKBOX_LINE.captures(line) else {
        return LineKind::Other;
    };
    let (Some(indent), Some(mark), Some(text)) = (caps.get(1), caps.get(2), caps.get(3)) else {
        return LineKind::Other;
    };
    let checked = mark.as_str().eq_ignore_ascii_case("x");
    let text = text.as_str();

    if indent.as_str().is_empty() {
        LineKind::Task { checked, text }
    } else {
        LineKind::Subtask {
            indent: indent.as_str(),
            checked,
            text,
        }
    }
}

/// Format a canonical checkbox item: `- [ ] text` or `- [x] text`.
pub fn checkbox(checked: bool, text: &str) -> String {
    let mark = if checked { 'x' } else { ' ' };
    format!("- [{mark}] {}", text.trim())
}

/// Normalize a checkbox line (at any indentation) to its canonical form.
///
/// Returns `None` when the line is not a checkbox line.
pub fn normalize_checkbox(line: &str) -> Option<String> {
    match classify_line(line) {
        LineKind::Task { checked, text } | LineKind::Subtask { checked, text, .. } => {
            Some(checkbox(checked, text))
        }
        LineKind::Other => None,
    }
}

/// Whether `item` already has the canonical checkbox prefix.
pub fn is_canonical_checkbox(item: &str) -> bool {
    item.starts_with("- [ ] ") || item.starts_with("- [x] ")
}
