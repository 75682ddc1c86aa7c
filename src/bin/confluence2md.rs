//! CLI binary for confluence2md.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use confluence2md::discover::validate_root;
use confluence2md::{
    convert_dir, ConversionConfig, ConversionProgressCallback, FileError, FileResult,
    OutputNaming, ProgressCallback, SeparatorPolicy,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal reporter for per-file events.
///
/// With a progress bar it prints one line per file above the bar. Without
/// one (`--no-progress`, `--json`) the library's own log lines cover
/// per-file results and this only adds the `--verbose` and
/// `--show-decoded` output.
struct CliProgressCallback {
    bar: Option<ProgressBar>,
    verbose: bool,
    show_decoded: bool,
}

impl CliProgressCallback {
    fn new(with_bar: bool, verbose: bool, show_decoded: bool) -> Arc<Self> {
        let bar = with_bar.then(|| {
            let bar = ProgressBar::new(0); // length set in on_batch_start
            let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(TICKS);
            bar.set_style(spinner_style);
            bar.set_prefix("Searching");
            bar.set_message("Looking for .doc files…");
            bar.enable_steady_tick(Duration::from_millis(80));
            bar
        });

        Arc::new(Self {
            bar,
            verbose,
            show_decoded,
        })
    }

    fn println(&self, line: String) {
        match self.bar {
            Some(ref bar) => bar.println(line),
            None => eprintln!("{line}"),
        }
    }

    fn print_decoded(&self, result: &FileResult) {
        if !self.show_decoded || result.decoded_characters.is_empty() {
            return;
        }
        self.println(format!(
            "    {} {}",
            cyan("◆"),
            bold("Decoded special characters:")
        ));
        for hit in &result.decoded_characters {
            self.println(format!(
                "      {} → {:?} {}",
                hit.sequence,
                hit.replacement,
                dim(&format!("({} times)", hit.count))
            ));
        }
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_files: usize) {
        let Some(ref bar) = self.bar else {
            return;
        };
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  \
             ⏱ {elapsed_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        bar.set_length(total_files as u64);
        bar.set_style(progress_style);
        bar.set_prefix("Converting");
        bar.set_message("");
        bar.reset_eta();
    }

    fn on_file_start(&self, path: &Path, _index: usize, _total: usize) {
        if self.verbose {
            self.println(dim(&format!("Processing: {}", path.display())));
        }
        if let Some(ref bar) = self.bar {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            bar.set_message(name);
        }
    }

    fn on_file_complete(&self, result: &FileResult) {
        if let Some(ref bar) = self.bar {
            let output = result
                .output
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            bar.println(format!(
                "  {} {} -> {}  {}",
                green("✓"),
                result.source.display(),
                output,
                dim(&format!("{:>6} chars  {}ms", result.markdown_len, result.duration_ms)),
            ));
        }
        self.print_decoded(result);
        if let Some(ref bar) = self.bar {
            bar.inc(1);
        }
    }

    fn on_file_error(&self, _path: &Path, error: &FileError) {
        if let Some(ref bar) = self.bar {
            bar.println(format!("  {} {}", red("✗"), red(&error.to_string())));
            bar.inc(1);
        }
    }

    fn on_batch_complete(&self, _total_files: usize, _success_count: usize) {
        if let Some(ref bar) = self.bar {
            bar.finish_and_clear();
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert every .doc export under the current directory
  confluence2md

  # Convert a specific export tree, logging each file
  confluence2md ./space-export --verbose

  # Keep the converter's original blank lines
  confluence2md ./space-export --preserve-spacing

  # Report which residual character sequences were replaced
  confluence2md ./space-export --show-decoded

  # Four files at a time, machine-readable report
  confluence2md ./space-export -c 4 --json > report.json

OUTPUT NAMING:
  Each file is written next to its source. By default every ".doc" in the
  path becomes ".md" (report.doc.v2.doc -> report.md.v2.md); with
  --replace-extension-only only the final extension changes
  (report.doc.v2.doc -> report.doc.v2.md).

ENVIRONMENT VARIABLES:
  RUST_LOG                     Override the log filter (e.g. confluence2md=debug)
  CONFLUENCE2MD_CONCURRENCY    Default for --concurrency
"#;

/// Convert Confluence .doc exports (MIME-wrapped HTML) to Markdown.
#[derive(Parser, Debug)]
#[command(
    name = "confluence2md",
    version,
    about = "Convert Confluence .doc exports to Markdown",
    long_about = "Recursively find Confluence \"Word\" exports (.doc files that are really \
MIME-wrapped, quoted-printable encoded HTML) and write a cleaned-up Markdown file next to \
each one.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Directory to search for .doc files (recursively).
    #[arg(default_value = ".")]
    directory: PathBuf,

    /// Print each file as it is processed; with --no-progress also enable
    /// DEBUG-level logs.
    #[arg(short, long, env = "CONFLUENCE2MD_VERBOSE")]
    verbose: bool,

    /// Keep the converter's original spacing (skip whitespace cleanup).
    #[arg(long, env = "CONFLUENCE2MD_PRESERVE_SPACING")]
    preserve_spacing: bool,

    /// Show which encoded character sequences were replaced in each file.
    #[arg(long)]
    show_decoded: bool,

    /// Number of files converted in parallel.
    #[arg(short, long, env = "CONFLUENCE2MD_CONCURRENCY", default_value_t = 1)]
    concurrency: usize,

    /// Drop existing `|---|` rows before formatting tables.
    #[arg(long)]
    strip_table_separators: bool,

    /// Skip quoted-printable decoding (for HTML that is already decoded).
    #[arg(long)]
    no_quoted_printable: bool,

    /// Replace only the final .doc extension when naming output files.
    #[arg(long)]
    replace_extension_only: bool,

    /// Print the batch report as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "CONFLUENCE2MD_NO_PROGRESS")]
    no_progress: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = log_filter(cli.verbose, cli.quiet, show_progress);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Validate root ────────────────────────────────────────────────────
    validate_root(&cli.directory).context("Cannot convert")?;

    if !cli.quiet {
        let shown = std::path::absolute(&cli.directory).unwrap_or_else(|_| cli.directory.clone());
        eprintln!(
            "{} Searching for .doc files in: {}",
            cyan("◆"),
            bold(&shown.display().to_string())
        );
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> =
        if !cli.quiet && (show_progress || cli.verbose || cli.show_decoded) {
            let cb = CliProgressCallback::new(show_progress, cli.verbose, cli.show_decoded);
            Some(cb as Arc<dyn ConversionProgressCallback>)
        } else {
            None
        };

    let config = build_config(&cli, progress_cb)?;

    // ── Run conversion ───────────────────────────────────────────────────
    let report = convert_dir(&cli.directory, &config)
        .await
        .context("Conversion failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialise report")?;
        println!("{json}");
    }

    if cli.quiet {
        return Ok(());
    }

    let stats = &report.stats;
    if stats.total_files == 0 {
        eprintln!("{} No .doc files found in the specified directory.", cyan("⚠"));
        return Ok(());
    }

    eprintln!();
    eprintln!("{}", bold("Conversion complete:"));
    eprintln!("  {} Converted: {}", green("✓"), stats.converted);
    eprintln!(
        "  {} Failed:    {}",
        if stats.failed == 0 { dim("✗") } else { red("✗") },
        stats.failed
    );
    eprintln!(
        "  {} Total:     {}  {}",
        cyan("◆"),
        stats.total_files,
        dim(&format!("{}ms", stats.total_duration_ms))
    );

    Ok(())
}

/// Default log filter when `RUST_LOG` is unset.
///
/// While the progress bar is shown it prints the per-file lines itself, so
/// library logs stay at ERROR even with `--verbose`.
fn log_filter(verbose: bool, quiet: bool, show_progress: bool) -> &'static str {
    if show_progress || quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    }
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .preserve_spacing(cli.preserve_spacing)
        .show_decoded(cli.show_decoded)
        .decode_quoted_printable(!cli.no_quoted_printable)
        .table_separators(if cli.strip_table_separators {
            SeparatorPolicy::Strip
        } else {
            SeparatorPolicy::Keep
        })
        .output_naming(if cli.replace_extension_only {
            OutputNaming::Extension
        } else {
            OutputNaming::LegacySubstring
        })
        .concurrency(cli.concurrency);

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_bar_keeps_library_logs_quiet() {
        assert_eq!(log_filter(true, false, true), "error");
        assert_eq!(log_filter(false, false, true), "error");
    }

    #[test]
    fn test_verbose_without_bar_logs_debug() {
        assert_eq!(log_filter(true, false, false), "debug");
        assert_eq!(log_filter(false, false, false), "info");
        assert_eq!(log_filter(false, true, false), "error");
    }

    #[test]
    fn test_cli_flags_parse() {
        let cli = Cli::parse_from(["confluence2md", "export", "-v", "-c", "3", "--json"]);
        assert_eq!(cli.directory, PathBuf::from("export"));
        assert!(cli.verbose);
        assert_eq!(cli.concurrency, 3);
        let config = build_config(&cli, None).unwrap();
        assert_eq!(config.concurrency, 3);
        assert_eq!(config.output_naming, OutputNaming::LegacySubstring);
    }
}
