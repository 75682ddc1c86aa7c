//! Configuration types for Confluence-export-to-Markdown conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The config is cloned into every
//! worker task.

use crate::error::Doc2MdError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Configuration for a conversion run.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use confluence2md::{ConversionConfig, SeparatorPolicy};
///
/// let config = ConversionConfig::builder()
///     .preserve_spacing(true)
///     .table_separators(SeparatorPolicy::Strip)
///     .concurrency(4)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Skip the whitespace-cleaning pass. Default: false.
    ///
    /// The list/table normalizer and table formatter still run; only the
    /// final blank-line and trailing-space cleanup is skipped.
    pub preserve_spacing: bool,

    /// Collect a per-file report of the residual character sequences that
    /// were replaced, with occurrence counts. Default: false.
    pub show_decoded: bool,

    /// Run quoted-printable decoding over the extracted HTML. Default: true.
    ///
    /// Confluence exports carry the HTML body quoted-printable encoded in
    /// place, so this is required for real files. Turn it off for HTML that
    /// was already decoded, where `=XX` sequences are literal text.
    pub decode_quoted_printable: bool,

    /// How the table formatter treats separator rows already present in the
    /// source. Default: [`SeparatorPolicy::Keep`].
    pub table_separators: SeparatorPolicy,

    /// How the `.md` output path is derived from the `.doc` input path.
    /// Default: [`OutputNaming::LegacySubstring`].
    pub output_naming: OutputNaming,

    /// Number of files converted in parallel. Default: 1 (sequential).
    ///
    /// Each file is converted independently with no shared state, so any
    /// value ≥ 1 produces the same outputs; only wall-clock time changes.
    pub concurrency: usize,

    /// Optional progress callback for per-file events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            preserve_spacing: false,
            show_decoded: false,
            decode_quoted_printable: true,
            table_separators: SeparatorPolicy::default(),
            output_naming: OutputNaming::default(),
            concurrency: 1,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("preserve_spacing", &self.preserve_spacing)
            .field("show_decoded", &self.show_decoded)
            .field("decode_quoted_printable", &self.decode_quoted_printable)
            .field("table_separators", &self.table_separators)
            .field("output_naming", &self.output_naming)
            .field("concurrency", &self.concurrency)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn preserve_spacing(mut self, v: bool) -> Self {
        self.config.preserve_spacing = v;
        self
    }

    pub fn show_decoded(mut self, v: bool) -> Self {
        self.config.show_decoded = v;
        self
    }

    pub fn decode_quoted_printable(mut self, v: bool) -> Self {
        self.config.decode_quoted_printable = v;
        self
    }

    pub fn table_separators(mut self, policy: SeparatorPolicy) -> Self {
        self.config.table_separators = policy;
        self
    }

    pub fn output_naming(mut self, naming: OutputNaming) -> Self {
        self.config.output_naming = naming;
        self
    }

    /// Set the number of files converted in parallel.
    ///
    /// `0` is rejected by [`build`](Self::build).
    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n;
        self
    }

    /// Register a progress callback to receive per-file events.
    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Doc2MdError> {
        if self.config.concurrency == 0 {
            return Err(Doc2MdError::InvalidConfig(
                "Concurrency must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Treatment of `|---|---|` rows that already exist in a table run.
///
/// The formatter always inserts its own separator after the first row.
///
/// | Policy | Existing separator rows | Re-running the formatter |
/// |--------|------------------------|--------------------------|
/// | `Keep` | reformatted as ordinary data rows | adds one more separator row per pass |
/// | `Strip` | removed before formatting | idempotent |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SeparatorPolicy {
    /// Treat existing separator rows as data (default).
    #[default]
    Keep,
    /// Drop existing separator rows before formatting.
    Strip,
}

/// How the output path is derived from the input path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputNaming {
    /// Replace every occurrence of `.doc` in the full path with `.md`
    /// (default). `report.doc.v2.doc` becomes `report.md.v2.md`.
    #[default]
    LegacySubstring,
    /// Replace only the final `.doc` extension.
    /// `report.doc.v2.doc` becomes `report.doc.v2.md`.
    Extension,
}

impl OutputNaming {
    /// Compute the Markdown output path for `input`.
    pub fn output_path(&self, input: &Path) -> PathBuf {
        match self {
            OutputNaming::LegacySubstring => {
                PathBuf::from(input.to_string_lossy().replace(".doc", ".md"))
            }
            OutputNaming::Extension => input.with_extension("md"),
        }
    }
}
