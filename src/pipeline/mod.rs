//! Pipeline stages for Confluence-export-to-Markdown conversion.
//!
//! Each submodule implements exactly one transformation step. Every stage is
//! a pure function over the previous stage's full output, so a document can
//! be converted without touching the filesystem.
//!
//! ## Data Flow
//!
//! ```text
//! .doc text ──▶ envelope ──▶ decode ──▶ markup ──▶ normalize ──▶ tables ──▶ postprocess
//!  (MIME)      (<html>)     (QP/&ent;)  (html2md)  (lists)       (pipes)    (whitespace)
//! ```
//!
//! 1. [`envelope`]: cut the `<html>…</html>` span out of the MIME wrapper
//! 2. [`decode`]: quoted-printable, HTML entities, residual artifacts,
//!    control characters
//! 3. [`markup`]: HTML → Markdown through `html2md`
//! 4. [`normalize`]: blank lines around list and table runs, `-` bullets
//! 5. [`tables`]: uniform column counts and a header separator row
//! 6. [`postprocess`]: whitespace cleanup; skipped with `preserve_spacing`

pub mod decode;
pub mod envelope;
pub mod markup;
pub mod normalize;
pub mod postprocess;
pub mod tables;
