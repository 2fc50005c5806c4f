//! End-to-end run: parse, order, number, render and write.
//!
//! The pipeline is synchronous and holds no state between runs. Identical
//! input produces identical artifacts apart from the run timestamp.
//! Creating the output directories is left to the caller
//! ([`OutputLayout::ensure_dirs`]).

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::context::{
    CompactContext, DEFAULT_MAX_CONTEXT_CHARS, DocumentSource, build_compact_context,
};
use crate::error::DevplanError;
use crate::plan::{
    DevTask, RenderOptions, assign_task_ids, ensure_scaffold_first, parse_tasks, render_task_file,
    render_task_list,
};

// ---------------------------------------------------------------------------
// Output layout
// ---------------------------------------------------------------------------

/// Where the artifacts of a run are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    task_list: PathBuf,
    tasks_dir: PathBuf,
}

impl OutputLayout {
    pub const TASK_LIST_FILE: &str = "task_list.md";
    pub const TASKS_DIR: &str = "tasks";

    /// `<output_dir>/task_list.md` and `<output_dir>/tasks/<ID>.md`.
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        let output_dir = output_dir.as_ref();
        Self {
            task_list: output_dir.join(Self::TASK_LIST_FILE),
            tasks_dir: output_dir.join(Self::TASKS_DIR),
        }
    }

    pub fn task_list_path(&self) -> &Path {
        &self.task_list
    }

    pub fn tasks_dir(&self) -> &Path {
        &self.tasks_dir
    }

    pub fn task_path(&self, id: &str) -> PathBuf {
        self.tasks_dir.join(format!("{id}.md"))
    }

    /// Create the task-list parent directory and the tasks directory.
    pub fn ensure_dirs(&self) -> Result<(), DevplanError> {
        let parent = self.task_list.parent().unwrap_or_else(|| Path::new("."));
        for dir in [parent, self.tasks_dir.as_path()] {
            std::fs::create_dir_all(dir).map_err(|source| DevplanError::CreateDir {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Per-run settings.
#[derive(Debug, Clone)]
pub struct PlanSettings {
    pub project_name: String,
    /// Fallback context budget in chars; zero means the default.
    pub max_context_chars: usize,
    pub generated_at: DateTime<Utc>,
}

impl PlanSettings {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            max_context_chars: DEFAULT_MAX_CONTEXT_CHARS,
            generated_at: Utc::now(),
        }
    }
}

/// Parse planning text into the final, numbered task list.
///
/// Always returns at least one task, headed by the scaffold task.
pub fn finalize_tasks(text: &str) -> Vec<DevTask> {
    let mut tasks = ensure_scaffold_first(parse_tasks(text));
    assign_task_ids(&mut tasks);
    tasks
}

/// All artifacts of one run, rendered but not yet written.
#[derive(Debug, Clone)]
pub struct RenderedPlan {
    pub tasks: Vec<DevTask>,
    pub task_list: String,
    /// One document per task, parallel to `tasks`.
    pub task_files: Vec<String>,
    pub context: CompactContext,
    pub context_location: String,
}

/// Run parse → enforce → assign → render.
pub fn render_plan(
    text: &str,
    source: &dyn DocumentSource,
    settings: &PlanSettings,
) -> RenderedPlan {
    let tasks = finalize_tasks(text);
    let context = build_compact_context(source, settings.max_context_chars);
    debug!(
        tasks = tasks.len(),
        context_sources = context.sources.len(),
        "rendering plan"
    );

    let opts = RenderOptions {
        project_name: &settings.project_name,
        generated_at: settings.generated_at,
        fallback_context: &context.text,
    };
    let task_list = render_task_list(&tasks, settings.generated_at);
    let task_files = tasks
        .iter()
        .map(|task| render_task_file(task, &opts))
        .collect();

    RenderedPlan {
        tasks,
        task_list,
        task_files,
        context,
        context_location: source.location(),
    }
}

impl RenderedPlan {
    /// Write the task list and every task document.
    ///
    /// Stops at the first failed write; files already written are kept.
    pub fn write(self, layout: &OutputLayout) -> Result<EmitReport, DevplanError> {
        let mut written = Vec::with_capacity(self.tasks.len() + 1);

        write_file(layout.task_list_path(), &self.task_list)?;
        written.push(layout.task_list_path().to_path_buf());

        for (task, content) in self.tasks.iter().zip(&self.task_files) {
            let path = layout.task_path(&task.id);
            write_file(&path, content)?;
            written.push(path);
        }

        info!(
            tasks = self.tasks.len(),
            task_list = %layout.task_list_path().display(),
            "wrote development plan"
        );

        Ok(EmitReport {
            tasks: self.tasks,
            written,
            context_sources: self.context.sources,
            context_location: self.context_location,
        })
    }
}

/// Render and write in one step.
pub fn emit_devplan(
    text: &str,
    source: &dyn DocumentSource,
    settings: &PlanSettings,
    layout: &OutputLayout,
) -> Result<EmitReport, DevplanError> {
    render_plan(text, source, settings).write(layout)
}

fn write_file(path: &Path, content: &str) -> Result<(), DevplanError> {
    std::fs::write(path, content).map_err(|source| DevplanError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Outcome of a successful write.
#[derive(Debug, Clone)]
pub struct EmitReport {
    pub tasks: Vec<DevTask>,
    /// Every file written, task list first.
    pub written: Vec<PathBuf>,
    /// Prior documents that fed the fallback context.
    pub context_sources: Vec<&'static str>,
    pub context_location: String,
}

impl EmitReport {
    /// Error with [`DevplanError::NoContextDocs`] when no prior document was
    /// found. The artifacts have already been written at this point.
    pub fn require_context(&self) -> Result<(), DevplanError> {
        if self.context_sources.is_empty() {
            return Err(DevplanError::NoContextDocs {
                location: self.context_location.clone(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::SCAFFOLD_TITLE;

    fn summary(tasks: &[DevTask]) -> Vec<(&str, &str, bool)> {
        tasks
            .iter()
            .map(|t| (t.id.as_str(), t.title.as_str(), t.checked))
            .collect()
    }

    #[test]
    fn empty_input_yields_single_scaffold_task() {
        let tasks = finalize_tasks("");
        assert_eq!(summary(&tasks), vec![("TASK-001", SCAFFOLD_TITLE, false)]);
    }

    #[test]
    fn scaffold_is_prepended_when_missing() {
        let tasks = finalize_tasks("- [ ] A\n- [x] B");
        assert_eq!(
            summary(&tasks),
            vec![
                ("TASK-001", SCAFFOLD_TITLE, false),
                ("TASK-002", "A", false),
                ("TASK-003", "B", true),
            ]
        );
    }

    #[test]
    fn existing_scaffold_is_moved_to_front() {
        let tasks = finalize_tasks("- [ ] Implement devplan\n- [ ] Project Scaffold / Bootstrap");
        assert_eq!(
            summary(&tasks),
            vec![
                ("TASK-001", SCAFFOLD_TITLE, false),
                ("TASK-002", "Implement devplan", false),
            ]
        );
    }

    #[test]
    fn tag_only_input_is_synthesized_then_enforced() {
        let tasks = finalize_tasks(
            "<task>Setup CI</task><context>pipeline info</context><subtask>- [ ] step1</subtask>",
        );
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].title, SCAFFOLD_TITLE);
        assert_eq!(tasks[1].id, "TASK-002");
        assert_eq!(tasks[1].title, "Setup CI");
        assert_eq!(tasks[1].context, "pipeline info");
        assert_eq!(tasks[1].subtasks, vec!["- [ ] step1"]);
    }

    #[test]
    fn layout_paths() {
        let layout = OutputLayout::new("/out");
        assert_eq!(layout.task_list_path(), Path::new("/out/task_list.md"));
        assert_eq!(layout.tasks_dir(), Path::new("/out/tasks"));
        assert_eq!(layout.task_path("TASK-007"), Path::new("/out/tasks/TASK-007.md"));
    }
}
