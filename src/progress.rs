//! Progress-callback trait for per-file conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the batch runner works through the discovered `.doc` files.
//!
//! The trait is `Send + Sync` because files may be converted concurrently on
//! tokio's blocking pool when `concurrency > 1`.
//!
//! # Example
//!
//! ```rust
//! use confluence2md::{ConversionConfig, ConversionProgressCallback, FileResult};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: AtomicUsize,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_file_complete(&self, result: &FileResult) {
//!         let done = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
//!         eprintln!("{done}: {}", result.source.display());
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { completed: AtomicUsize::new(0) });
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::error::FileError;
use crate::output::FileResult;
use std::path::Path;
use std::sync::Arc;

/// Called by the batch runner as it processes each file.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
///
/// # Thread safety
///
/// With `concurrency > 1`, `on_file_start`, `on_file_complete`, and
/// `on_file_error` may be called concurrently from different threads.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once after discovery, before any file is converted.
    fn on_batch_start(&self, total_files: usize) {
        let _ = total_files;
    }

    /// Called just before a file is read.
    ///
    /// # Arguments
    /// * `path`: source `.doc` path
    /// * `index`: 1-indexed position in discovery order
    /// * `total`: number of files in the batch
    fn on_file_start(&self, path: &Path, index: usize, total: usize) {
        let _ = (path, index, total);
    }

    /// Called when a file was converted and its Markdown written.
    fn on_file_complete(&self, result: &FileResult) {
        let _ = result;
    }

    /// Called when a file failed; the batch continues.
    fn on_file_error(&self, path: &Path, error: &FileError) {
        let _ = (path, error);
    }

    /// Called once after every file has been attempted.
    fn on_batch_complete(&self, total_files: usize, success_count: usize) {
        let _ = (total_files, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        starts: AtomicUsize,
        completes: AtomicUsize,
        errors: AtomicUsize,
        started_total: AtomicUsize,
        completed_total: AtomicUsize,
    }

    impl ConversionProgressCallback for TrackingCallback {
        fn on_batch_start(&self, total_files: usize) {
            self.started_total.store(total_files, Ordering::SeqCst);
        }

        fn on_file_start(&self, _path: &Path, _index: usize, _total: usize) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_file_complete(&self, _result: &FileResult) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_file_error(&self, _path: &Path, _error: &FileError) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }

        fn on_batch_complete(&self, _total_files: usize, success_count: usize) {
            self.completed_total.store(success_count, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        let path = Path::new("a.doc");
        cb.on_batch_start(2);
        cb.on_file_start(path, 1, 2);
        cb.on_file_complete(&FileResult::converted(
            PathBuf::from("a.doc"),
            PathBuf::from("a.md"),
            10,
            Vec::new(),
            1,
        ));
        cb.on_file_error(
            path,
            &FileError::Extraction {
                path: path.to_path_buf(),
            },
        );
        cb.on_batch_complete(2, 1);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        let a = Path::new("a.doc");
        let b = Path::new("b.doc");

        tracker.on_batch_start(2);
        assert_eq!(tracker.started_total.load(Ordering::SeqCst), 2);

        tracker.on_file_start(a, 1, 2);
        tracker.on_file_complete(&FileResult::converted(
            a.to_path_buf(),
            PathBuf::from("a.md"),
            42,
            Vec::new(),
            3,
        ));
        tracker.on_file_start(b, 2, 2);
        tracker.on_file_error(
            b,
            &FileError::Extraction {
                path: b.to_path_buf(),
            },
        );

        assert_eq!(tracker.starts.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.errors.load(Ordering::SeqCst), 1);

        tracker.on_batch_complete(2, 1);
        assert_eq!(tracker.completed_total.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_batch_start(10);
        cb.on_file_start(Path::new("x.doc"), 1, 10);
    }
}
