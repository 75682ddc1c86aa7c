//! # confluence2md
//!
//! Convert legacy Confluence "Word" exports to clean Markdown.
//!
//! Confluence can export a page as a `.doc` file that is not a Word document
//! at all: it is a MIME message whose body is quoted-printable encoded HTML.
//! Word opens it, most other tools don't. This crate pulls the HTML back out,
//! undoes the layered encodings, converts it to Markdown and tidies the
//! result so lists and tables render correctly.
//!
//! ## Pipeline Overview
//!
//! ```text
//! .doc export
//!  │
//!  ├─ 1. Envelope   first <html>…</html> span of the MIME message
//!  ├─ 2. Decode     quoted-printable, HTML entities, residual =XX artifacts
//!  ├─ 3. Markup     HTML → Markdown (html2md, `-` bullets, ATX headings)
//!  ├─ 4. Normalize  blank lines around list and table runs
//!  ├─ 5. Tables     uniform columns, header separator row
//!  └─ 6. Cleanup    blank-line and trailing-space cleanup (optional)
//! ```
//!
//! Each `.doc` file is converted independently and written next to its
//! source as `.md`. A file that fails is reported and skipped; only an
//! invalid root directory stops a batch.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use confluence2md::{convert_dir, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::default();
//!     let report = convert_dir("./confluence-export", &config).await?;
//!     eprintln!(
//!         "{} converted, {} failed",
//!         report.stats.converted, report.stats.failed
//!     );
//!     Ok(())
//! }
//! ```
//!
//! To convert text already in memory, call [`convert_document`] directly.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `confluence2md` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! confluence2md = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod discover;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, OutputNaming, SeparatorPolicy};
pub use convert::{convert_dir, convert_dir_sync, convert_document, convert_file};
pub use discover::find_doc_files;
pub use error::{Doc2MdError, FileError, PipelineError};
pub use output::{BatchReport, BatchStats, CharacterHit, ConvertedDocument, FileResult};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use stream::{convert_stream, FileStream};
