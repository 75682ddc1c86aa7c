//! List/table normalization over raw converter output.
//!
//! One pass over the lines, tracking whether we are inside a table run, a
//! list run, or neither. Table runs and list runs are fenced off from the
//! surrounding text by a single blank line, and top-level `*`/`+` bullets
//! are rewritten to `-`. Table rows are left alone here; column layout is
//! the table formatter's job.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_ORDERED_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\s").unwrap());

/// Marker kind of a list-item line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ListMarker {
    /// `* `, `- ` or `+ `, carrying the bullet character.
    Bullet(char),
    /// `<digits>. `
    Ordered,
}

/// Whether `line` is a Markdown table row.
///
/// The line must contain a `|`, split into at least three `|`-segments, and
/// have at least one non-blank interior segment.
pub(crate) fn is_table_row(line: &str) -> bool {
    if line.trim().is_empty() || !line.contains('|') {
        return false;
    }
    let segments: Vec<&str> = line.split('|').collect();
    segments.len() >= 3
        && segments[1..segments.len() - 1]
            .iter()
            .any(|s| !s.trim().is_empty())
}

/// Classify `line` as a list item. Leading indentation is ignored, so nested
/// items qualify too.
pub(crate) fn list_marker(line: &str) -> Option<ListMarker> {
    let trimmed = line.trim();
    for bullet in ['*', '-', '+'] {
        if trimmed.starts_with(bullet) && trimmed[1..].starts_with(' ') {
            return Some(ListMarker::Bullet(bullet));
        }
    }
    RE_ORDERED_ITEM
        .is_match(trimmed)
        .then_some(ListMarker::Ordered)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Normal,
    InList,
    InTable,
}

/// Separate list and table runs from surrounding text and canonicalize
/// top-level bullets. Every output line is right-trimmed.
pub fn normalize_blocks(markdown: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut state = State::Normal;

    for raw in markdown.split('\n') {
        let line = raw.trim_end();

        // Table rows win over list items
        if is_table_row(line) {
            if state != State::InTable {
                push_separator(&mut out);
                state = State::InTable;
            }
            out.push(line.to_string());
            continue;
        }

        if state == State::InTable {
            out.push(String::new());
            state = State::Normal;
            if line.is_empty() {
                continue;
            }
        }

        match (list_marker(line), state) {
            (Some(marker), _) => {
                if state != State::InList {
                    push_separator(&mut out);
                    state = State::InList;
                }
                out.push(canonical_item(line, marker));
            }
            (None, State::InList) if line.is_empty() => {
                out.push(line.to_string());
            }
            (None, State::InList) => {
                push_separator(&mut out);
                out.push(line.to_string());
                state = State::Normal;
            }
            (None, _) => out.push(line.to_string()),
        }
    }

    out.join("\n")
}

/// Rewrite top-level `* x` / `+ x` to `- x`. Everything else is kept.
fn canonical_item(line: &str, marker: ListMarker) -> String {
    let content = line.trim_start();
    match marker {
        ListMarker::Bullet('*' | '+') if content.len() == line.len() => {
            format!("- {}", content[2..].trim())
        }
        _ => line.to_string(),
    }
}

/// Push a blank line unless the output is empty or already ends with one.
fn push_separator(out: &mut Vec<String>) {
    if out.last().is_some_and(|l| !l.is_empty()) {
        out.push(String::new());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_row_classification() {
        assert!(is_table_row("| a | b |"));
        assert!(is_table_row("|x|"));
        assert!(is_table_row("a | b | c"));
        assert!(!is_table_row("a | b"));
        assert!(!is_table_row("|  |"));
        assert!(!is_table_row("no pipes"));
        assert!(!is_table_row("   "));
    }

    #[test]
    fn list_item_classification() {
        assert_eq!(list_marker("* a"), Some(ListMarker::Bullet('*')));
        assert_eq!(list_marker("- a"), Some(ListMarker::Bullet('-')));
        assert_eq!(list_marker("  + a"), Some(ListMarker::Bullet('+')));
        assert_eq!(list_marker("12. twelve"), Some(ListMarker::Ordered));
        assert_eq!(list_marker("*bold*"), None);
        assert_eq!(list_marker("-"), None);
        assert_eq!(list_marker("3.14 is pi"), None);
    }

    #[test]
    fn top_level_bullets_become_dashes() {
        assert_eq!(normalize_blocks("* a\n+  b"), "- a\n- b");
    }

    #[test]
    fn indented_and_ordered_items_are_unchanged() {
        let input = "- a\n  * nested\n1. one\n2. two";
        assert_eq!(normalize_blocks(input), input);
    }

    #[test]
    fn list_is_separated_from_preceding_text() {
        assert_eq!(normalize_blocks("intro\n- a\n- b"), "intro\n\n- a\n- b");
    }

    #[test]
    fn text_after_list_gets_a_blank_line() {
        assert_eq!(normalize_blocks("- a\nafter"), "- a\n\nafter");
        assert_eq!(normalize_blocks("- a\n\nafter"), "- a\n\nafter");
    }

    #[test]
    fn blank_line_inside_list_is_kept() {
        assert_eq!(normalize_blocks("- a\n\n- b"), "- a\n\n- b");
    }

    #[test]
    fn indented_text_line_ends_list() {
        assert_eq!(normalize_blocks("- a\n  text"), "- a\n\n  text");
        assert_eq!(
            normalize_blocks("- item\n  more text\n- next"),
            "- item\n\n  more text\n\n- next"
        );
    }

    #[test]
    fn table_runs_are_fenced_by_blank_lines() {
        assert_eq!(
            normalize_blocks("text\n| a | b |\n| c | d |\nafter"),
            "text\n\n| a | b |\n| c | d |\n\nafter"
        );
    }

    #[test]
    fn table_ending_on_blank_line_keeps_one_blank() {
        assert_eq!(normalize_blocks("| a |\n\nx"), "| a |\n\nx");
    }

    #[test]
    fn table_then_list_has_single_separator() {
        assert_eq!(normalize_blocks("| a |\n* b"), "| a |\n\n- b");
    }

    #[test]
    fn table_takes_precedence_over_list() {
        let row = "* a | b | c";
        assert_eq!(normalize_blocks(row), row);
    }

    #[test]
    fn lines_are_right_trimmed() {
        assert_eq!(normalize_blocks("a  \t\nb \r"), "a\nb");
    }
}
