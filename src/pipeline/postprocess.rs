//! Post-processing: whitespace cleanup of the normalized Markdown.
//!
//! The converter and the normalizer leave behind runs of blank lines,
//! trailing spaces and blank lines glued to headings. This module applies a
//! few deterministic text rules and then one structural line walk. It never
//! changes content, only the whitespace between blocks.
//!
//! ## Rule Order
//!
//! Line endings are normalised before anything splits on `\n`, and trailing
//! whitespace is trimmed before blank-line collapsing so that lines holding
//! only spaces count as blank.

use crate::pipeline::normalize::list_marker;
use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all cleanup rules to a Markdown document.
///
/// Rules (applied in order):
/// 1. Normalise line endings (CRLF / CR → LF)
/// 2. Trim trailing spaces and tabs per line
/// 3. Collapse 3+ consecutive newlines down to one blank line
/// 4. Trim leading and trailing blank lines
/// 5. Block spacing walk (code blocks, list runs, headings, paragraphs)
///
/// The result carries no trailing newline.
pub fn clean_markdown(input: &str) -> String {
    let s = normalise_line_endings(input);
    let s = trim_trailing_whitespace(&s);
    let s = collapse_blank_lines(&s);
    let s = trim_blank_edges(&s);
    space_blocks(s)
}

// ── Rule 1: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 2: Trim trailing whitespace per line ────────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .split('\n')
        .map(|line| line.trim_end_matches([' ', '\t']))
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 3: Collapse excessive blank lines ───────────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n").to_string()
}

// ── Rule 4: Trim blank lines at both ends ────────────────────────────────────

fn trim_blank_edges(input: &str) -> &str {
    input.trim_matches('\n')
}

// ── Rule 5: Block spacing ────────────────────────────────────────────────────
//
// One pass over the lines. Code content is copied verbatim. Outside code:
// a list run and a heading each get exactly one blank line in front, a blank
// line closes a list run, and between ordinary lines a blank line survives
// only where the input had one.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CodeKind {
    Fenced,
    Indented,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockState {
    Normal,
    InList,
    InCode(CodeKind),
}

fn is_fence(line: &str) -> bool {
    line.starts_with("```")
}

fn is_heading(line: &str) -> bool {
    line.trim_start().starts_with('#')
}

fn push_blank(out: &mut Vec<&str>) {
    if out.last().is_some_and(|l| !l.is_empty()) {
        out.push("");
    }
}

fn space_blocks(input: &str) -> String {
    let lines: Vec<&str> = input.split('\n').collect();
    let mut out: Vec<&str> = Vec::with_capacity(lines.len());
    let mut state = BlockState::Normal;

    for (i, &line) in lines.iter().enumerate() {
        match state {
            BlockState::InCode(CodeKind::Fenced) => {
                out.push(line);
                if is_fence(line) {
                    state = BlockState::Normal;
                }
                continue;
            }
            BlockState::InCode(CodeKind::Indented) => {
                if line.is_empty() || line.starts_with("    ") {
                    out.push(line);
                    continue;
                }
                state = BlockState::Normal;
            }
            BlockState::Normal | BlockState::InList => {}
        }

        if is_fence(line) {
            out.push(line);
            state = BlockState::InCode(CodeKind::Fenced);
            continue;
        }

        let is_item = list_marker(line).is_some();

        if state == BlockState::Normal && !is_item && line.starts_with("    ") {
            out.push(line);
            state = BlockState::InCode(CodeKind::Indented);
            continue;
        }

        if is_item {
            if state != BlockState::InList {
                push_blank(&mut out);
                state = BlockState::InList;
            }
            out.push(line);
            continue;
        }

        if state == BlockState::InList {
            if line.is_empty() {
                out.push("");
                state = BlockState::Normal;
                continue;
            }
            if !is_heading(line) {
                // continuation of the current item
                out.push(line);
                continue;
            }
            state = BlockState::Normal;
        }

        if is_heading(line) {
            push_blank(&mut out);
            out.push(line);
        } else if !line.is_empty() {
            out.push(line);
        } else if i > 0 && !lines[i - 1].is_empty() {
            push_blank(&mut out);
        }
    }

    while out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }
    out.join("\n")
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalise_line_endings() {
        assert_eq!(normalise_line_endings("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn test_trim_trailing_whitespace() {
        assert_eq!(
            trim_trailing_whitespace("  hello \t \nworld  \n"),
            "  hello\nworld\n"
        );
    }

    #[test]
    fn test_collapse_blank_lines() {
        assert_eq!(collapse_blank_lines("a\n\n\n\n\n\nb"), "a\n\nb");
        assert_eq!(collapse_blank_lines("a\n\nb"), "a\n\nb");
    }

    #[test]
    fn test_trim_blank_edges_keeps_indentation() {
        assert_eq!(trim_blank_edges("\n\n    code\n\n"), "    code");
    }

    #[test]
    fn test_whitespace_only_lines_collapse() {
        let result = clean_markdown("a\n  \n \t\n\n \nb");
        assert_eq!(result, "a\n\nb");
    }

    #[test]
    fn test_no_trailing_newline() {
        assert_eq!(clean_markdown("text\n\n\n"), "text");
        assert_eq!(clean_markdown(""), "");
    }

    #[test]
    fn test_heading_gets_blank_line_before() {
        assert_eq!(clean_markdown("intro\n# Title\nbody"), "intro\n\n# Title\nbody");
        assert_eq!(clean_markdown("# Title\nbody"), "# Title\nbody");
    }

    #[test]
    fn test_heading_ends_list_run() {
        assert_eq!(clean_markdown("- a\n## Next"), "- a\n\n## Next");
    }

    #[test]
    fn test_list_run_spacing() {
        assert_eq!(
            clean_markdown("intro\n- a\n- b\n\nafter"),
            "intro\n\n- a\n- b\n\nafter"
        );
    }

    #[test]
    fn test_list_continuation_lines_kept() {
        assert_eq!(
            clean_markdown("- a\n  more of a\n- b"),
            "- a\n  more of a\n- b"
        );
    }

    #[test]
    fn test_paragraph_breaks_are_never_fabricated() {
        assert_eq!(clean_markdown("line one\nline two"), "line one\nline two");
        assert_eq!(clean_markdown("line one\n\nline two"), "line one\n\nline two");
    }

    #[test]
    fn test_fenced_code_passes_through() {
        let input = "text\n```\n# not a heading\n\n\n- not a list\n```\nafter";
        let result = clean_markdown(input);
        assert!(result.contains("```\n# not a heading\n\n- not a list\n```"), "got: {result:?}");
        assert!(!result.contains("text\n\n```"));
    }

    #[test]
    fn test_indented_code_passes_through() {
        let input = "para\n\n    let x = 1;\n    # comment\n\nafter";
        assert_eq!(clean_markdown(input), input);
    }

    #[test]
    fn test_no_triple_blank_lines_anywhere() {
        let input = "# A\n\n\n\n- x\n\n\n\n\ntext\n\n\n\n| a |\n\n\n\n";
        let result = clean_markdown(input);
        assert!(!result.contains("\n\n\n"), "got: {result:?}");
    }

    #[test]
    fn test_clean_markdown_full_pipeline() {
        let input = "\r\n\r\nHello \"world\"   \r\n\r\n\r\n\r\n- a\r\n- b\r\n\r\n";
        assert_eq!(clean_markdown(input), "Hello \"world\"\n\n- a\n- b");
    }
}
