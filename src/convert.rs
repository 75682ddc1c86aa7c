//! Conversion entry points: one document, one file, a whole directory.
//!
//! [`convert_document`] is the pure text pipeline. [`convert_file`] adds the
//! I/O around it and never fails outright: every problem lands in the
//! returned [`FileResult`]. [`convert_dir`] walks a directory tree and runs
//! [`convert_file`] for each `.doc` export, optionally several at a time.
//! Use [`crate::stream::convert_stream`] instead to receive results as they
//! complete.

use crate::config::ConversionConfig;
use crate::discover;
use crate::error::{Doc2MdError, FileError, PipelineError};
use crate::output::{BatchReport, ConvertedDocument, FileResult};
use crate::pipeline::decode::{self, DecodeOptions};
use crate::pipeline::{envelope, markup, normalize, postprocess, tables};
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Run the text pipeline over the contents of one export.
///
/// # Errors
/// - [`PipelineError::NoHtmlEnvelope`] when `raw` contains no `<html>` span
/// - [`PipelineError::ConversionFailed`] when the HTML converter fails
/// - [`PipelineError::EmptyMarkdown`] when the final Markdown is empty
///
/// # Example
/// ```rust
/// use confluence2md::{convert_document, ConversionConfig};
///
/// let raw = "MIME-Version: 1.0\r\n\r\n<html><body><p>Hi</p></body></html>";
/// let doc = convert_document(raw, &ConversionConfig::default()).unwrap();
/// assert_eq!(doc.markdown, "Hi");
/// ```
pub fn convert_document(
    raw: &str,
    config: &ConversionConfig,
) -> Result<ConvertedDocument, PipelineError> {
    // ── Step 1: Envelope ─────────────────────────────────────────────────
    let html = envelope::extract_html(raw)?;

    // ── Step 2: Character decoding ───────────────────────────────────────
    let decoded = decode::decode_characters(
        html,
        DecodeOptions {
            quoted_printable: config.decode_quoted_printable,
            collect_hits: config.show_decoded,
        },
    );
    for hit in &decoded.hits {
        debug!(
            "Decoded {} → {:?} ({} times)",
            hit.sequence, hit.replacement, hit.count
        );
    }

    // ── Step 3: HTML → Markdown ──────────────────────────────────────────
    let markdown = markup::html_to_markdown(&decoded.html)?;

    // ── Step 4: Lists and tables ─────────────────────────────────────────
    let markdown = normalize::normalize_blocks(&markdown);
    let markdown = tables::format_tables(&markdown, config.table_separators);

    // ── Step 5: Whitespace ───────────────────────────────────────────────
    let markdown = if config.preserve_spacing {
        markdown
    } else {
        postprocess::clean_markdown(&markdown)
    };

    if markdown.is_empty() {
        return Err(PipelineError::EmptyMarkdown);
    }

    Ok(ConvertedDocument {
        markdown,
        decoded_characters: decoded.hits,
    })
}

/// Convert one `.doc` file and write its sibling `.md`.
///
/// Blocking; the batch runner calls it from tokio's blocking pool.
/// Failures are logged and returned inside the [`FileResult`].
pub fn convert_file(path: &Path, config: &ConversionConfig) -> FileResult {
    let start = Instant::now();
    match convert_file_inner(path, config) {
        Ok((output, doc)) => {
            info!("✓ Converted: {} -> {}", path.display(), output.display());
            FileResult::converted(
                path.to_path_buf(),
                output,
                doc.markdown.len(),
                doc.decoded_characters,
                start.elapsed().as_millis() as u64,
            )
        }
        Err(e) => {
            warn!("{}", e);
            FileResult::failed(path.to_path_buf(), e, start.elapsed().as_millis() as u64)
        }
    }
}

fn convert_file_inner(
    path: &Path,
    config: &ConversionConfig,
) -> Result<(PathBuf, ConvertedDocument), FileError> {
    let bytes = std::fs::read(path).map_err(|e| FileError::Read {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;
    let raw = decode::utf8_ignore_invalid(&bytes);

    let doc = convert_document(&raw, config).map_err(|e| FileError::from_pipeline(path, e))?;

    let output = config.output_naming.output_path(path);
    write_atomic(&output, &doc.markdown)?;
    Ok((output, doc))
}

/// Write via a temp file and rename so a crash never leaves a partial `.md`.
fn write_atomic(path: &Path, contents: &str) -> Result<(), FileError> {
    let write_err = |e: std::io::Error| FileError::Write {
        path: path.to_path_buf(),
        detail: e.to_string(),
    };

    let tmp_path = path.with_extension("md.tmp");
    std::fs::write(&tmp_path, contents).map_err(write_err)?;
    if let Err(e) = std::fs::rename(&tmp_path, path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(write_err(e));
    }
    Ok(())
}

/// Convert every `.doc` export under `root`.
///
/// # Returns
/// `Ok(BatchReport)` once every file has been attempted, even when some (or
/// all) failed; check `report.stats.failed`.
///
/// # Errors
/// Returns `Err(Doc2MdError)` only when `root` does not exist or is not a
/// directory.
pub async fn convert_dir(
    root: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<BatchReport, Doc2MdError> {
    let total_start = Instant::now();
    let root = root.as_ref();
    info!("Searching for .doc files in: {}", root.display());

    // ── Step 1: Discover ─────────────────────────────────────────────────
    let files = discover::find_doc_files(root)?;
    let total = files.len();
    info!("Found {} .doc file(s)", total);

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    // ── Step 2: Convert ──────────────────────────────────────────────────
    let results: Vec<FileResult> = stream::iter(
        files
            .into_iter()
            .enumerate()
            .map(|(i, path)| convert_in_worker(path, i + 1, total, config.clone())),
    )
    .buffer_unordered(config.concurrency)
    .collect()
    .await;

    // ── Step 3: Report ───────────────────────────────────────────────────
    let report = BatchReport::new(
        root.to_path_buf(),
        results,
        total_start.elapsed().as_millis() as u64,
    );

    info!(
        "Conversion complete: {}/{} files, {}ms total",
        report.stats.converted, report.stats.total_files, report.stats.total_duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(total, report.stats.converted);
    }

    Ok(report)
}

/// Synchronous wrapper around [`convert_dir`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_dir_sync(
    root: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<BatchReport, Doc2MdError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Doc2MdError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert_dir(root, config))
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Run [`convert_file`] on the blocking pool, firing per-file callbacks.
pub(crate) async fn convert_in_worker(
    path: PathBuf,
    index: usize,
    total: usize,
    config: ConversionConfig,
) -> FileResult {
    if let Some(ref cb) = config.progress_callback {
        cb.on_file_start(&path, index, total);
    }

    let start = Instant::now();
    let worker_path = path.clone();
    let worker_config = config.clone();
    let result = match tokio::task::spawn_blocking(move || {
        convert_file(&worker_path, &worker_config)
    })
    .await
    {
        Ok(result) => result,
        Err(e) => {
            warn!("Worker for {} failed: {}", path.display(), e);
            let err = FileError::Conversion {
                path: path.clone(),
                detail: format!("worker task failed: {e}"),
            };
            FileResult::failed(path, err, start.elapsed().as_millis() as u64)
        }
    };

    if let Some(ref cb) = config.progress_callback {
        match &result.error {
            None => cb.on_file_complete(&result),
            Some(e) => cb.on_file_error(&result.source, e),
        }
    }
    result
}
