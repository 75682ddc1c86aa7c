//! Table formatting: give every table run uniform columns and a header
//! separator.

use crate::config::SeparatorPolicy;
use crate::pipeline::normalize::is_table_row;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static RE_SEPARATOR_CELL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^:?-+:?$").unwrap());

/// Reformat every maximal run of table rows in `markdown`.
///
/// A run is fenced by a blank line before it (unless the previous line is
/// already blank) and after it (unless the next line is blank or the run
/// ends the document).
pub fn format_tables(markdown: &str, policy: SeparatorPolicy) -> String {
    let lines: Vec<&str> = markdown.split('\n').collect();
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut runs = 0usize;
    let mut i = 0;

    while i < lines.len() {
        if !is_table_row(lines[i]) {
            out.push(lines[i].to_string());
            i += 1;
            continue;
        }

        let start = i;
        while i < lines.len() && is_table_row(lines[i]) {
            i += 1;
        }
        runs += 1;

        let table = format_table(&lines[start..i], policy);
        if table.is_empty() {
            continue;
        }
        if out.last().is_some_and(|l| !l.trim().is_empty()) {
            out.push(String::new());
        }
        out.extend(table);
        if lines.get(i).is_some_and(|l| !l.trim().is_empty()) {
            out.push(String::new());
        }
    }

    if runs > 0 {
        debug!("Formatted {runs} table run(s)");
    }
    out.join("\n")
}

/// Format one run of table rows.
///
/// Rows are padded to the widest row's cell count and a `|---|` separator
/// is inserted after the first row. With [`SeparatorPolicy::Strip`], rows
/// that are already separators are dropped first.
pub fn format_table(rows: &[&str], policy: SeparatorPolicy) -> Vec<String> {
    let rows: Vec<&str> = match policy {
        SeparatorPolicy::Keep => rows.to_vec(),
        SeparatorPolicy::Strip => rows
            .iter()
            .copied()
            .filter(|r| !is_separator_row(r))
            .collect(),
    };

    let max_columns = rows
        .iter()
        .map(|r| r.split('|').count().saturating_sub(2))
        .max()
        .unwrap_or(0);
    if max_columns == 0 {
        return rows.iter().map(|r| r.to_string()).collect();
    }

    let mut formatted = Vec::with_capacity(rows.len() + 1);
    for (idx, row) in rows.iter().enumerate() {
        let mut cells = interior_cells(row);
        cells.resize(max_columns, "");
        formatted.push(format!("| {} |", cells.join(" | ")));

        if idx == 0 {
            formatted.push(format!("|{}|", vec!["---"; max_columns].join("|")));
        }
    }
    formatted
}

/// Trimmed cells between the first and last `|`.
fn interior_cells(row: &str) -> Vec<&str> {
    let segments: Vec<&str> = row.split('|').collect();
    if segments.len() < 3 {
        return Vec::new();
    }
    segments[1..segments.len() - 1]
        .iter()
        .map(|c| c.trim())
        .collect()
}

fn is_separator_row(row: &str) -> bool {
    let cells = interior_cells(row);
    !cells.is_empty() && cells.iter().all(|c| RE_SEPARATOR_CELL.is_match(c))
}
