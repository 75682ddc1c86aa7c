//! Result types produced by the batch runner.
//!
//! Everything here is `Serialize` so the CLI can emit a machine-readable
//! report with `--json`.

use crate::error::FileError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One residual character sequence replaced by the decoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterHit {
    /// The quoted-printable sequence from the residual table, e.g. `=E2=80=9C`.
    pub sequence: String,
    /// What it was replaced with (may be empty for zero-width marks).
    pub replacement: String,
    /// Total occurrences replaced in this file.
    pub count: usize,
}

/// A document that made it through the text pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedDocument {
    /// Final Markdown text.
    pub markdown: String,
    /// Decoder hits; empty unless `show_decoded` was set.
    pub decoded_characters: Vec<CharacterHit>,
}

/// Outcome of converting one `.doc` file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileResult {
    /// Source `.doc` path.
    pub source: PathBuf,
    /// Path of the written Markdown file (`None` on failure).
    pub output: Option<PathBuf>,
    /// Byte length of the written Markdown.
    pub markdown_len: usize,
    /// Decoder hits (only collected with `show_decoded`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decoded_characters: Vec<CharacterHit>,
    /// Wall-clock time spent on this file.
    pub duration_ms: u64,
    /// Set when the file failed.
    pub error: Option<FileError>,
}

impl FileResult {
    pub fn converted(
        source: PathBuf,
        output: PathBuf,
        markdown_len: usize,
        decoded_characters: Vec<CharacterHit>,
        duration_ms: u64,
    ) -> Self {
        Self {
            source,
            output: Some(output),
            markdown_len,
            decoded_characters,
            duration_ms,
            error: None,
        }
    }

    pub fn failed(source: PathBuf, error: FileError, duration_ms: u64) -> Self {
        Self {
            source,
            output: None,
            markdown_len: 0,
            decoded_characters: Vec::new(),
            duration_ms,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Totals for one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStats {
    /// `.doc` files discovered under the root.
    pub total_files: usize,
    /// Files converted and written.
    pub converted: usize,
    /// Files that failed (no envelope, conversion or I/O error).
    pub failed: usize,
    /// Wall-clock time for the whole batch.
    pub total_duration_ms: u64,
}

/// Full report for one batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// The root directory that was walked.
    pub root: PathBuf,
    /// Per-file outcomes, sorted by source path.
    pub files: Vec<FileResult>,
    pub stats: BatchStats,
}

impl BatchReport {
    /// Assemble a report, sorting files and tallying successes.
    pub fn new(root: PathBuf, mut files: Vec<FileResult>, total_duration_ms: u64) -> Self {
        files.sort_by(|a, b| a.source.cmp(&b.source));
        let converted = files.iter().filter(|f| f.is_success()).count();
        let stats = BatchStats {
            total_files: files.len(),
            converted,
            failed: files.len() - converted,
            total_duration_ms,
        };
        Self { root, files, stats }
    }

    /// Iterate over the failures only.
    pub fn failures(&self) -> impl Iterator<Item = &FileError> {
        self.files.iter().filter_map(|f| f.error.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_sorts_and_counts() {
        let files = vec![
            FileResult::failed(
                PathBuf::from("b.doc"),
                FileError::Extraction {
                    path: PathBuf::from("b.doc"),
                },
                1,
            ),
            FileResult::converted(
                PathBuf::from("a.doc"),
                PathBuf::from("a.md"),
                12,
                Vec::new(),
                2,
            ),
        ];
        let report = BatchReport::new(PathBuf::from("."), files, 5);
        assert_eq!(report.files[0].source, PathBuf::from("a.doc"));
        assert_eq!(report.stats.total_files, 2);
        assert_eq!(report.stats.converted, 1);
        assert_eq!(report.stats.failed, 1);
        assert_eq!(report.failures().count(), 1);
    }

    #[test]
    fn empty_decode_list_is_omitted_from_json() {
        let r = FileResult::converted(
            PathBuf::from("a.doc"),
            PathBuf::from("a.md"),
            1,
            Vec::new(),
            0,
        );
        let json = serde_json::to_string(&r).unwrap();
        assert!(!json.contains("decoded_characters"), "got: {json}");
    }
}
