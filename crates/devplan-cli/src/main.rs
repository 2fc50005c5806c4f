mod config;
mod devplan_cmds;
mod generator;
#[cfg(test)]
mod test_util;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use config::{CliOverrides, ConfigFile, DevplanConfig};
use devplan_cmds::RunOptions;

#[derive(Parser)]
#[command(
    name = "devplan",
    about = "Turn planning text into a scaffold-first task list and per-task documents"
)]
struct Cli {
    /// Config file path (defaults to ~/.config/devplan/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a devplan config file
    Init {
        /// Project name recorded in the config (defaults to the current directory name)
        #[arg(long)]
        project_name: Option<String>,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Generate the task list and one document per task
    Run {
        /// Read plan text from this file ("-" for stdin) instead of the generator
        #[arg(long)]
        input: Option<String>,
        /// Directory holding prior documents (requirements.md, srs.md, ...)
        #[arg(long)]
        source: Option<String>,
        /// Directory to write task_list.md and tasks/ into
        #[arg(long)]
        output: Option<String>,
        /// Fallback context budget in characters
        #[arg(long)]
        max_context_chars: Option<usize>,
        /// Skip the generator and use the built-in scaffold plan
        #[arg(long)]
        dry_run: bool,
    },
    /// Parse plan text and print the resulting tasks
    Parse {
        /// Plan text file ("-" for stdin)
        #[arg(long, default_value = "-")]
        input: String,
        /// Print tasks as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the budgeted context built from prior documents
    Context {
        /// Directory holding prior documents
        #[arg(long)]
        source: Option<String>,
        /// Context budget in characters
        #[arg(long)]
        max_context_chars: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays machine-readable (`parse --json`).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Init {
            project_name,
            force,
        } => {
            let path = config_path
                .map(PathBuf::from)
                .unwrap_or_else(config::config_path);
            cmd_init(&path, project_name, force)?;
        }
        Commands::Run {
            input,
            source,
            output,
            max_context_chars,
            dry_run,
        } => {
            let overrides = CliOverrides {
                source_dir: source,
                output_dir: output,
                max_context_chars,
            };
            let resolved = DevplanConfig::resolve(config_path, &overrides)?;
            let opts = RunOptions {
                input: input.as_deref(),
                dry_run,
            };
            devplan_cmds::cmd_run(&resolved, opts).await?;
        }
        Commands::Parse { input, json } => {
            devplan_cmds::cmd_parse(&input, json)?;
        }
        Commands::Context {
            source,
            max_context_chars,
        } => {
            let overrides = CliOverrides {
                source_dir: source,
                max_context_chars,
                ..CliOverrides::default()
            };
            let resolved = DevplanConfig::resolve(config_path, &overrides)?;
            devplan_cmds::cmd_context(&resolved.source_dir, resolved.max_context_chars)?;
        }
    }

    Ok(())
}

/// Execute the `devplan init` command: write a config file with defaults.
fn cmd_init(path: &std::path::Path, project_name: Option<String>, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let project_name = project_name.unwrap_or_else(config::default_project_name);
    if project_name.trim().is_empty() {
        anyhow::bail!("--project-name must not be empty");
    }
    let cfg = ConfigFile::new(project_name);
    config::save_config(path, &cfg)
        .with_context(|| format!("failed to initialize config at {}", path.display()))?;

    println!("Config written to {}", path.display());
    println!("  project_name = {}", cfg.project_name);
    println!("  io.output_dir = {}", cfg.io.output_dir);
    println!(
        "  devplan.max_context_chars_per_task = {}",
        cfg.devplan.max_context_chars_per_task
    );
    println!();
    println!("Next: run `devplan run --dry-run` to write a scaffold plan.");

    Ok(())
}
