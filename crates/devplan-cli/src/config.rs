//! Configuration file management for devplan.
//!
//! Provides a TOML-based config file at `~/.config/devplan/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use devplan_core::context::DEFAULT_MAX_CONTEXT_CHARS;

/// Output directory used when nothing else is configured.
pub const DEFAULT_OUTPUT_DIR: &str = ".devplan/output";

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub project_name: String,
    #[serde(default)]
    pub io: IoSection,
    #[serde(default)]
    pub devplan: DevplanSection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator: Option<GeneratorSection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IoSection {
    /// Directory holding prior documents. Defaults to `output_dir`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_dir: Option<String>,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for IoSection {
    fn default() -> Self {
        Self {
            source_dir: None,
            output_dir: default_output_dir(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DevplanSection {
    #[serde(default = "default_max_context_chars")]
    pub max_context_chars_per_task: usize,
}

impl Default for DevplanSection {
    fn default() -> Self {
        Self {
            max_context_chars_per_task: default_max_context_chars(),
        }
    }
}

/// External command that turns a prompt (on stdin) into planning text (on
/// stdout).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorSection {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_output_dir() -> String {
    DEFAULT_OUTPUT_DIR.to_string()
}

fn default_max_context_chars() -> usize {
    DEFAULT_MAX_CONTEXT_CHARS
}

fn default_timeout_secs() -> u64 {
    300
}

impl ConfigFile {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            io: IoSection::default(),
            devplan: DevplanSection::default(),
            generator: None,
        }
    }
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the devplan config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/devplan` or `~/.config/devplan`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("devplan");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("devplan")
}

/// Return the path to the default devplan config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse a config file. Returns an error if it does not exist.
pub fn load_config(path: &Path) -> Result<ConfigFile> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file at {}", path.display()))?;
    Ok(config)
}

/// Serialize and write a config file, creating parent dirs as needed.
pub fn save_config(path: &Path, config: &ConfigFile) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create config directory {}", dir.display()))?;
    }
    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;
    Ok(())
}

/// Project name used when none is configured: the current directory's name.
pub fn default_project_name() -> String {
    std::env::current_dir()
        .ok()
        .and_then(|dir| dir.file_name().map(|n| n.to_string_lossy().into_owned()))
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| "project".to_string())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Values supplied on the command line; `None` means "not given".
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub source_dir: Option<String>,
    pub output_dir: Option<String>,
    pub max_context_chars: Option<usize>,
}

/// Fully resolved configuration, ready for use.
#[derive(Debug, Clone)]
pub struct DevplanConfig {
    pub project_name: String,
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    pub max_context_chars: usize,
    pub generator: Option<GeneratorSection>,
}

impl DevplanConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - Project name: `DEVPLAN_PROJECT_NAME` > `project_name` > current directory name
    /// - Output dir: `--output` > `DEVPLAN_OUTPUT_DIR` > `io.output_dir` > [`DEFAULT_OUTPUT_DIR`]
    /// - Source dir: `--source` > `DEVPLAN_SOURCE_DIR` > `io.source_dir` > resolved output dir
    /// - Budget: `--max-context-chars` > `DEVPLAN_MAX_CONTEXT_CHARS` >
    ///   `devplan.max_context_chars_per_task` > 4000 (values <= 0 mean 4000)
    /// - Generator: `DEVPLAN_GENERATOR` (whitespace-split command line) > `[generator]`
    ///
    /// An explicit `config_path` must exist; the default path is optional.
    pub fn resolve(config_path: Option<&Path>, overrides: &CliOverrides) -> Result<Self> {
        let file_config = match config_path {
            Some(path) => Some(load_config(path)?),
            None => load_config(&self::config_path()).ok(),
        };

        let project_name = if let Some(name) = env_value("DEVPLAN_PROJECT_NAME") {
            name
        } else if let Some(ref cfg) = file_config {
            cfg.project_name.clone()
        } else {
            default_project_name()
        };

        let output_dir = if let Some(ref dir) = overrides.output_dir {
            dir.clone()
        } else if let Some(dir) = env_value("DEVPLAN_OUTPUT_DIR") {
            dir
        } else if let Some(ref cfg) = file_config {
            cfg.io.output_dir.clone()
        } else {
            default_output_dir()
        };

        let source_dir = if let Some(ref dir) = overrides.source_dir {
            dir.clone()
        } else if let Some(dir) = env_value("DEVPLAN_SOURCE_DIR") {
            dir
        } else if let Some(dir) = file_config.as_ref().and_then(|c| c.io.source_dir.clone()) {
            dir
        } else {
            output_dir.clone()
        };

        let max_context_chars = if let Some(n) = overrides.max_context_chars {
            n
        } else if let Some(raw) = env_value("DEVPLAN_MAX_CONTEXT_CHARS") {
            let n: i64 = raw
                .parse()
                .with_context(|| format!("DEVPLAN_MAX_CONTEXT_CHARS is not an integer: {raw:?}"))?;
            usize::try_from(n).unwrap_or(0)
        } else if let Some(ref cfg) = file_config {
            cfg.devplan.max_context_chars_per_task
        } else {
            DEFAULT_MAX_CONTEXT_CHARS
        };

        let generator = if let Some(raw) = env_value("DEVPLAN_GENERATOR") {
            let mut parts = raw.split_whitespace().map(str::to_string);
            parts.next().map(|command| GeneratorSection {
                command,
                args: parts.collect(),
                timeout_secs: file_config
                    .as_ref()
                    .and_then(|c| c.generator.as_ref())
                    .map_or_else(default_timeout_secs, |g| g.timeout_secs),
            })
        } else {
            file_config.and_then(|c| c.generator)
        };

        let config = Self {
            project_name,
            source_dir: PathBuf::from(source_dir),
            output_dir: PathBuf::from(output_dir),
            max_context_chars: devplan_core::context::effective_budget(max_context_chars),
            generator,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.project_name.trim().is_empty() {
            bail!("project_name must not be empty");
        }
        if self.output_dir.as_os_str().is_empty() || self.source_dir.as_os_str().is_empty() {
            bail!("io.source_dir and io.output_dir must not be empty");
        }
        if let Some(ref generator) = self.generator {
            if generator.command.trim().is_empty() {
                bail!("generator.command must not be empty");
            }
            if generator.timeout_secs == 0 {
                bail!("generator.timeout_secs must be > 0");
            }
        }
        Ok(())
    }
}

/// Read a non-blank, trimmed environment variable.
fn env_value(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
