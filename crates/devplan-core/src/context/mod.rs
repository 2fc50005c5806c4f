//! Bounded fallback context built from prior project documents.
//!
//! Documents are read in a fixed priority order and concatenated (blank-line
//! separated) until the budget is reached, then hard-truncated to the budget
//! in characters. Missing or unreadable documents are skipped.

use std::path::PathBuf;

use tracing::debug;

/// Budget used when the configured budget is zero.
pub const DEFAULT_MAX_CONTEXT_CHARS: usize = 4000;

/// Prior documents consulted for context, highest priority first.
pub const CONTEXT_DOCUMENTS: [&str; 6] = [
    "requirements.md",
    "srs.md",
    "stories.md",
    "acceptance_criteria.md",
    "architecture.md",
    "uml.md",
];

/// Source of named prior documents.
pub trait DocumentSource {
    /// Read a document by file name. `None` when absent or unreadable.
    fn read_named(&self, name: &str) -> Option<String>;

    /// Human-readable location, used in diagnostics.
    fn location(&self) -> String;
}

/// Documents stored as files in one directory.
#[derive(Debug, Clone)]
pub struct DirSource {
    dir: PathBuf,
}

impl DirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl DocumentSource for DirSource {
    fn read_named(&self, name: &str) -> Option<String> {
        let path = self.dir.join(name);
        match std::fs::read_to_string(&path) {
            Ok(content) => Some(content),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "skipping context document");
                None
            }
        }
    }

    fn location(&self) -> String {
        self.dir.display().to_string()
    }
}

/// Budgeted context plus the documents that contributed to it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompactContext {
    pub text: String,
    pub sources: Vec<&'static str>,
}

impl CompactContext {
    /// True when no document contributed anything.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

/// Resolve the effective budget: zero means [`DEFAULT_MAX_CONTEXT_CHARS`].
pub fn effective_budget(max_chars: usize) -> usize {
    if max_chars == 0 {
        DEFAULT_MAX_CONTEXT_CHARS
    } else {
        max_chars
    }
}

/// Build the bounded context from `source`.
///
/// Appending stops after the document that brings the total to the budget;
/// the result is then truncated to exactly the budget in `char`s.
pub fn build_compact_context(source: &dyn DocumentSource, max_chars: usize) -> CompactContext {
    let budget = effective_budget(max_chars);
    let mut text = String::new();
    let mut chars = 0usize;
    let mut sources = Vec::new();

    for name in CONTEXT_DOCUMENTS {
        if chars >= budget {
            break;
        }
        let Some(content) = source.read_named(name) else {
            continue;
        };
        let content = content.trim();
        if content.is_empty() {
            continue;
        }
        if !text.is_empty() {
            text.push_str("\n\n");
            chars += 2;
        }
        text.push_str(content);
        chars += content.chars().count();
        sources.push(name);
    }

    CompactContext {
        text: truncate_chars(&text, budget).to_string(),
        sources,
    }
}

/// Truncate `s` to at most `max` chars without splitting a code point.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}
