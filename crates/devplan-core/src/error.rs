use std::path::PathBuf;

use thiserror::Error;

use crate::context::CONTEXT_DOCUMENTS;

/// Failures surfaced to callers of the pipeline.
///
/// Parsing never fails; only the filesystem side and the "no prior
/// documents" signal do.
#[derive(Debug, Error)]
pub enum DevplanError {
    #[error(
        "no context documents found in {location} (looked for: {})",
        CONTEXT_DOCUMENTS.join(", ")
    )]
    NoContextDocs { location: String },

    #[error("failed to create directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
