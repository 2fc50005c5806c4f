//! Plan text generators.
//!
//! A [`PlanGenerator`] turns a prompt into raw planning text for the
//! pipeline. [`CommandGenerator`] shells out to an external program (the
//! prompt goes to stdin, the plan comes back on stdout); [`ScaffoldGenerator`]
//! returns the built-in scaffold plan. Any generator failure degrades to the
//! scaffold plan in [`generate_or_scaffold`].

use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

use devplan_core::context::CompactContext;
use devplan_core::plan::SCAFFOLD_PLAN;

use crate::config::GeneratorSection;

/// Produces raw planning text from a prompt.
#[async_trait]
pub trait PlanGenerator: Send + Sync {
    /// Human-readable name used in logs.
    fn name(&self) -> &str;

    /// Generate planning text. Errors mean "no usable plan".
    async fn generate(&self, prompt: &str) -> Result<String>;
}

// -----------------------------------------------------------------------
// Built-in scaffold
// -----------------------------------------------------------------------

/// Always returns [`SCAFFOLD_PLAN`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ScaffoldGenerator;

#[async_trait]
impl PlanGenerator for ScaffoldGenerator {
    fn name(&self) -> &str {
        "scaffold"
    }

    async fn generate(&self, _prompt: &str) -> Result<String> {
        Ok(SCAFFOLD_PLAN.to_string())
    }
}

// -----------------------------------------------------------------------
// External command
// -----------------------------------------------------------------------

/// Runs an external command with the prompt on stdin and reads the plan from
/// stdout.
#[derive(Debug, Clone)]
pub struct CommandGenerator {
    command: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandGenerator {
    pub fn new(command: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            args,
            timeout,
        }
    }
}

impl From<&GeneratorSection> for CommandGenerator {
    fn from(section: &GeneratorSection) -> Self {
        Self::new(
            section.command.clone(),
            section.args.clone(),
            Duration::from_secs(section.timeout_secs),
        )
    }
}

#[async_trait]
impl PlanGenerator for CommandGenerator {
    fn name(&self) -> &str {
        &self.command
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let mut cmd = Command::new(&self.command);
        cmd.args(&self.args)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd
            .spawn()
            .with_context(|| format!("failed to spawn generator {:?}", self.command))?;

        // Stdin is fed concurrently with draining stdout.
        let writer = child.stdin.take().map(|mut stdin| {
            let prompt = prompt.to_string();
            tokio::spawn(async move {
                let result = stdin.write_all(prompt.as_bytes()).await;
                drop(stdin);
                result
            })
        });

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                anyhow!(
                    "generator {:?} timed out after {}s",
                    self.command,
                    self.timeout.as_secs()
                )
            })?
            .with_context(|| format!("failed to wait for generator {:?}", self.command))?;

        if let Some(writer) = writer {
            // Exit status decides success, not whether all of stdin was read.
            if let Ok(Err(e)) = writer.await {
                debug!(error = %e, "generator closed stdin early");
            }
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "generator {:?} exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            );
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        if text.trim().is_empty() {
            bail!("generator {:?} produced no output", self.command);
        }
        Ok(text)
    }
}

// -----------------------------------------------------------------------
// Prompt and fallback
// -----------------------------------------------------------------------

const FORMAT_GUIDE: &str = "\
## Output format

Reply with planning text only.

- One top-level checkbox per task: `- [ ] Task title`
- Indented checkboxes under a task are its subtasks: `  - [ ] Step`
- Optionally follow with tag blocks that refine a task:
  `<task>Task title</task>`, `<context>...</context>`, `<subtask>- [ ] Step</subtask>`
- The first task must be the project scaffold / bootstrap task.
";

/// Build the generator prompt for a project from the budgeted context.
pub fn build_prompt(project_name: &str, context: &CompactContext) -> String {
    let mut prompt = String::with_capacity(FORMAT_GUIDE.len() + context.text.len() + 256);

    prompt.push_str(&format!("# Development plan for {project_name}\n\n"));
    prompt.push_str(
        "Break the project described below into an ordered list of \
         implementation tasks with concrete subtasks.\n\n",
    );
    prompt.push_str(FORMAT_GUIDE);
    prompt.push('\n');

    prompt.push_str("## Project documents\n\n");
    if context.is_empty() {
        prompt.push_str("(no prior documents were found)\n");
    } else {
        prompt.push_str(&context.text);
        prompt.push('\n');
    }
    prompt
}

/// Run `generator`, falling back to [`SCAFFOLD_PLAN`] when it fails.
///
/// The failure is logged and never retried.
pub async fn generate_or_scaffold(generator: &dyn PlanGenerator, prompt: &str) -> String {
    match generator.generate(prompt).await {
        Ok(text) => {
            info!(generator = generator.name(), bytes = text.len(), "generated plan text");
            text
        }
        Err(e) => {
            warn!(
                generator = generator.name(),
                error = %format!("{e:#}"),
                "plan generation failed; using scaffold plan"
            );
            SCAFFOLD_PLAN.to_string()
        }
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
