//! The task record produced by parsing and consumed by rendering.

use serde::{Deserialize, Serialize};

/// Title of the synthetic setup task inserted when none is present.
pub const SCAFFOLD_TITLE: &str = "Project Scaffold / Bootstrap";

/// Keywords (lower-case) that mark a task as the scaffold task.
const SCAFFOLD_KEYWORDS: [&str; 2] = ["scaffold", "bootstrap"];

/// One development task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevTask {
    /// `TASK-NNN`; empty until IDs are assigned.
    #[serde(default)]
    pub id: String,
    /// Display title (never empty for parsed tasks).
    pub title: String,
    /// Whether the originating checkbox was `[x]`.
    #[serde(default)]
    pub checked: bool,
    /// Canonical checkbox items (`- [ ] text` / `- [x] text`).
    #[serde(default)]
    pub subtasks: Vec<String>,
    /// Implementation context; empty means "use the budgeted fallback".
    #[serde(default)]
    pub context: String,
}

impl DevTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// The synthetic scaffold task.
    pub fn scaffold() -> Self {
        Self::new(SCAFFOLD_TITLE)
    }

    /// Whether the title names project setup (`scaffold` or `bootstrap`).
    pub fn is_scaffold(&self) -> bool {
        let title = self.title.to_lowercase();
        SCAFFOLD_KEYWORDS.iter().any(|kw| title.contains(kw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaffold_keyword_detection_is_case_insensitive() {
        assert!(DevTask::new("BOOTSTRAP the repo").is_scaffold());
        assert!(DevTask::new("Project Scaffolding").is_scaffold());
        assert!(DevTask::scaffold().is_scaffold());
        assert!(!DevTask::new("Implement parser").is_scaffold());
    }

    #[test]
    fn deserializes_with_defaults() {
        let task: DevTask = serde_json::from_str(r#"{"title":"Only title"}"#).unwrap();
        assert_eq!(task, DevTask::new("Only title"));
    }
}
