//! Streaming conversion API: emit file results as they complete.
//!
//! Unlike the eager [`crate::convert::convert_dir`], which returns a sorted
//! [`crate::output::BatchReport`] only after every file has been attempted,
//! [`convert_stream`] yields one item per file as soon as it is done. With
//! `concurrency > 1` items arrive in completion order, not discovery order.
//!
//! Per-file progress callbacks fire as usual; the batch-level
//! `on_batch_start` / `on_batch_complete` events do not, since the caller
//! owns the end of the stream.

use crate::config::ConversionConfig;
use crate::convert::convert_in_worker;
use crate::discover;
use crate::error::{Doc2MdError, FileError};
use crate::output::FileResult;
use futures::stream::{self, StreamExt};
use std::path::Path;
use std::pin::Pin;
use tokio_stream::Stream;
use tracing::info;

/// A boxed stream of per-file results.
pub type FileStream = Pin<Box<dyn Stream<Item = Result<FileResult, FileError>> + Send>>;

/// Convert every `.doc` export under `root`, streaming results.
///
/// # Returns
/// - `Ok(FileStream)`: `Ok(FileResult)` for each converted file,
///   `Err(FileError)` for each failed one
/// - `Err(Doc2MdError)`: the root does not exist or is not a directory
///
/// # Example
/// ```rust,no_run
/// use confluence2md::{convert_stream, ConversionConfig};
/// use futures::StreamExt;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ConversionConfig::builder().concurrency(4).build()?;
/// let mut results = convert_stream("./export", &config).await?;
/// while let Some(item) = results.next().await {
///     match item {
///         Ok(file) => println!("{}", file.source.display()),
///         Err(e) => eprintln!("{e}"),
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub async fn convert_stream(
    root: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<FileStream, Doc2MdError> {
    let root = root.as_ref();
    info!("Starting streaming conversion: {}", root.display());

    let files = discover::find_doc_files(root)?;
    let total = files.len();
    let config = config.clone();
    let concurrency = config.concurrency;

    let s = stream::iter(files.into_iter().enumerate().map(move |(i, path)| {
        convert_in_worker(path, i + 1, total, config.clone())
    }))
    .buffer_unordered(concurrency)
    .map(|mut result| match result.error.take() {
        None => Ok(result),
        Some(e) => Err(e),
    });

    Ok(Box::pin(s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stream_yields_one_item_per_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.doc"), "<html><body><p>A</p></body></html>").unwrap();
        std::fs::write(dir.path().join("b.doc"), "no envelope").unwrap();

        let config = ConversionConfig::builder().concurrency(2).build().unwrap();
        let items: Vec<_> = convert_stream(dir.path(), &config)
            .await
            .unwrap()
            .collect()
            .await;

        assert_eq!(items.len(), 2);
        assert_eq!(items.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(items
            .iter()
            .any(|r| matches!(r, Err(FileError::Extraction { .. }))));
    }

    #[tokio::test]
    async fn test_stream_rejects_missing_root() {
        let result = convert_stream("/no/such/root/dir", &ConversionConfig::default()).await;
        assert!(matches!(result, Err(Doc2MdError::RootNotFound { .. })));
    }
}
