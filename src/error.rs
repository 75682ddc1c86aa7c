//! Error types for the confluence2md library.
//!
//! Three error types reflect three distinct failure scopes:
//!
//! * [`Doc2MdError`] is **fatal**: the batch cannot start at all (root
//!   directory missing, invalid configuration). Returned as
//!   `Err(Doc2MdError)` from the top-level `convert_dir*` functions.
//!
//! * [`FileError`] is **non-fatal**: a single file could not be converted
//!   (no HTML envelope, converter failure, I/O). Stored inside
//!   [`crate::output::FileResult`] and tallied; the batch continues.
//!
//! * [`PipelineError`] is the path-less error raised by the pure text
//!   pipeline. The file runner attaches the path and turns it into a
//!   [`FileError`].

use std::path::{Path, PathBuf};
use thiserror::Error;

/// All fatal errors returned by the confluence2md library.
///
/// Per-file failures use [`FileError`] and are stored in
/// [`crate::output::FileResult`] rather than propagated here.
#[derive(Debug, Error)]
pub enum Doc2MdError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The root directory does not exist.
    #[error("Directory '{path}' does not exist.")]
    RootNotFound { path: PathBuf },

    /// The root path exists but is a file, not a directory.
    #[error("'{path}' is not a directory.")]
    NotADirectory { path: PathBuf },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error (runtime creation, join failure).
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failure raised by the text pipeline, before any path is attached.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// No `<html>…</html>` span was found in the export.
    #[error("no <html> envelope found")]
    NoHtmlEnvelope,

    /// The HTML-to-Markdown converter failed.
    #[error("HTML to Markdown conversion failed: {0}")]
    ConversionFailed(String),

    /// The pipeline ran but produced no Markdown; nothing is written.
    #[error("conversion produced no Markdown")]
    EmptyMarkdown,
}

/// A non-fatal error for a single file.
///
/// The batch keeps going; the error is counted in
/// [`crate::output::BatchStats::failed`].
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum FileError {
    /// The file has no HTML envelope and was skipped.
    #[error("No HTML content found in '{path}'")]
    Extraction { path: PathBuf },

    /// The markup converter failed on this file.
    #[error("Failed to convert '{path}': {detail}")]
    Conversion { path: PathBuf, detail: String },

    /// The source file could not be read.
    #[error("Failed to read '{path}': {detail}")]
    Read { path: PathBuf, detail: String },

    /// The Markdown output could not be written.
    #[error("Failed to write '{path}': {detail}")]
    Write { path: PathBuf, detail: String },
}

impl FileError {
    /// Attach the source path to a pipeline failure.
    pub fn from_pipeline(path: &Path, err: PipelineError) -> Self {
        match err {
            PipelineError::NoHtmlEnvelope => FileError::Extraction {
                path: path.to_path_buf(),
            },
            PipelineError::ConversionFailed(detail) => FileError::Conversion {
                path: path.to_path_buf(),
                detail,
            },
            PipelineError::EmptyMarkdown => FileError::Conversion {
                path: path.to_path_buf(),
                detail: PipelineError::EmptyMarkdown.to_string(),
            },
        }
    }

    /// Path of the file the error refers to.
    pub fn path(&self) -> &Path {
        match self {
            FileError::Extraction { path }
            | FileError::Conversion { path, .. }
            | FileError::Read { path, .. }
            | FileError::Write { path, .. } => path,
        }
    }
}
