//! Shared test utilities for devplan tests.
//!
//! Provides temporary project directories seeded with the prior documents
//! (requirements, SRS, stories, ...) that the context budgeter reads.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Contents used by [`ProjectFixture::with_standard_docs`].
pub const STANDARD_DOCS: [(&str, &str); 4] = [
    (
        "requirements.md",
        "# Requirements\n\nUsers can sign up and sign in with email.",
    ),
    (
        "srs.md",
        "# SRS\n\nThe auth service exposes /signup and /signin endpoints.",
    ),
    (
        "stories.md",
        "# Stories\n\nAs a user I want to reset my password.",
    ),
    (
        "architecture.md",
        "# Architecture\n\nA single Rust service backed by PostgreSQL.",
    ),
];

/// A temporary project with a docs directory and an output directory.
///
/// Both directories live under one [`TempDir`] that is removed on drop.
pub struct ProjectFixture {
    root: TempDir,
}

impl ProjectFixture {
    /// A project with an empty docs directory.
    pub fn empty() -> Self {
        let root = TempDir::new().expect("failed to create temp dir");
        std::fs::create_dir_all(root.path().join("docs")).expect("failed to create docs dir");
        Self { root }
    }

    /// A project whose docs directory holds [`STANDARD_DOCS`].
    pub fn with_standard_docs() -> Self {
        Self::with_docs(&STANDARD_DOCS)
    }

    /// A project whose docs directory holds the given `(file name, content)`
    /// pairs.
    pub fn with_docs(docs: &[(&str, &str)]) -> Self {
        let fixture = Self::empty();
        for (name, content) in docs {
            fixture.write_doc(name, content);
        }
        fixture
    }

    /// Write (or overwrite) one document in the docs directory.
    pub fn write_doc(&self, name: &str, content: &str) {
        let path = self.docs_dir().join(name);
        std::fs::write(&path, content)
            .unwrap_or_else(|e| panic!("failed to write {}: {e}", path.display()));
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    /// Directory holding prior documents.
    pub fn docs_dir(&self) -> PathBuf {
        self.root.path().join("docs")
    }

    /// Directory for generated artifacts (not created).
    pub fn output_dir(&self) -> PathBuf {
        self.root.path().join("out")
    }

    /// Read a generated artifact relative to [`Self::output_dir`].
    pub fn read_output(&self, relative: &str) -> String {
        let path = self.output_dir().join(relative);
        std::fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()))
    }
}
