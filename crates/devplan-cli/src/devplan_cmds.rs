//! CLI handlers for the planning subcommands.
//!
//! Implements:
//! - `devplan run`     -- obtain plan text, render and write the task list and task files
//! - `devplan parse`   -- parse plan text and print the resulting tasks
//! - `devplan context` -- print the budgeted context built from prior documents

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{info, warn};

use devplan_core::DevplanError;
use devplan_core::context::{DirSource, DocumentSource, build_compact_context};
use devplan_core::pipeline::{OutputLayout, PlanSettings, emit_devplan, finalize_tasks};
use devplan_core::plan::{DevTask, checkbox};

use crate::config::DevplanConfig;
use crate::generator::{
    CommandGenerator, PlanGenerator, ScaffoldGenerator, build_prompt, generate_or_scaffold,
};

/// Read plan text from a file, or from stdin when `input` is `-`.
fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read plan text from stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(input).with_context(|| format!("failed to read plan file: {input}"))
}

// -----------------------------------------------------------------------
// devplan run
// -----------------------------------------------------------------------

/// Options for `devplan run` that are not part of the resolved config.
#[derive(Debug, Default)]
pub struct RunOptions<'a> {
    pub input: Option<&'a str>,
    pub dry_run: bool,
}

/// Obtain plan text: explicit input, the scaffold plan on dry runs, or the
/// configured generator (falling back to the scaffold plan).
async fn obtain_plan_text(
    config: &DevplanConfig,
    source: &dyn DocumentSource,
    opts: &RunOptions<'_>,
) -> Result<String> {
    if let Some(input) = opts.input {
        return read_input(input);
    }

    let generator: Box<dyn PlanGenerator> = match (&config.generator, opts.dry_run) {
        (Some(section), false) => Box::new(CommandGenerator::from(section)),
        _ => Box::new(ScaffoldGenerator),
    };
    let context = build_compact_context(source, config.max_context_chars);
    let prompt = build_prompt(&config.project_name, &context);
    Ok(generate_or_scaffold(generator.as_ref(), &prompt).await)
}

/// Generate and write the development plan.
///
/// When no prior document exists the artifacts are still written, then the
/// command fails.
pub async fn cmd_run(config: &DevplanConfig, opts: RunOptions<'_>) -> Result<()> {
    let source = DirSource::new(&config.source_dir);
    let text = obtain_plan_text(config, &source, &opts).await?;

    let layout = OutputLayout::new(&config.output_dir);
    layout.ensure_dirs()?;

    let settings = PlanSettings {
        project_name: config.project_name.clone(),
        max_context_chars: config.max_context_chars,
        generated_at: Utc::now(),
    };
    let report = emit_devplan(&text, &source, &settings, &layout)?;

    println!("Development plan written.");
    println!();
    println!("  Project:    {}", config.project_name);
    println!("  Task list:  {}", layout.task_list_path().display());
    println!("  Task files: {}", layout.tasks_dir().display());
    println!("  Tasks:      {}", report.tasks.len());
    println!();
    print_task_lines(&report.tasks);

    if report.context_sources.is_empty() {
        warn!(source = %report.context_location, "no prior documents found");
    } else {
        info!(sources = ?report.context_sources, "built fallback context");
    }
    report.require_context()?;
    Ok(())
}

fn print_task_lines(tasks: &[DevTask]) {
    for task in tasks {
        println!("  {}", checkbox(task.checked, &format!("{} — {}", task.id, task.title)));
    }
}

// -----------------------------------------------------------------------
// devplan parse
// -----------------------------------------------------------------------

/// Parse plan text and print the final task list, as text or JSON.
pub fn cmd_parse(input: &str, json: bool) -> Result<()> {
    let text = read_input(input)?;
    let tasks = finalize_tasks(&text);

    if json {
        let out = serde_json::to_string_pretty(&tasks).context("failed to serialize tasks")?;
        println!("{out}");
        return Ok(());
    }

    for task in &tasks {
        println!("{}", checkbox(task.checked, &format!("{} — {}", task.id, task.title)));
        for item in &task.subtasks {
            println!("    {item}");
        }
        if !task.context.is_empty() {
            println!("    context: {} chars", task.context.chars().count());
        }
    }
    Ok(())
}

// -----------------------------------------------------------------------
// devplan context
// -----------------------------------------------------------------------

/// Print the budgeted context, or fail when no prior document exists.
pub fn cmd_context(source_dir: &Path, max_context_chars: usize) -> Result<()> {
    let source = DirSource::new(source_dir);
    let context = build_compact_context(&source, max_context_chars);
    if context.is_empty() {
        return Err(DevplanError::NoContextDocs {
            location: source.location(),
        }
        .into());
    }

    eprintln!(
        "{} chars from {}",
        context.text.chars().count(),
        context.sources.join(", ")
    );
    println!("{}", context.text);
    Ok(())
}
