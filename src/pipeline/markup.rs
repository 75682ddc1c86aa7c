//! Markup conversion: decoded HTML → raw Markdown via `html2md`.
//!
//! The stock `html2md` output is adjusted with two custom tag handlers:
//!
//! - `<li>` items use `- ` (unordered) or `N. ` (ordered); an item's text is
//!   kept on its marker line and nested lists are indented by two spaces;
//! - `<h1>`–`<h6>` are written as ATX headings (`# Title`), which is what the
//!   whitespace cleaner recognises.
//!
//! Links, images, emphasis, inline code, `<pre>` blocks and tables use the
//! crate's own handlers. No line wrapping is applied.

use crate::error::PipelineError;
use crate::pipeline::normalize::{is_table_row, list_marker};
use html2md::{Handle, NodeData, StructuredPrinter, TagHandler, TagHandlerFactory};
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use tracing::debug;

/// Indentation unit for list continuation lines and nested lists.
const LIST_INDENT: &str = "  ";

/// Convert an HTML document to Markdown.
///
/// `html2md` panics on a handful of malformed inputs; such a panic is caught
/// and reported as [`PipelineError::ConversionFailed`] so a single bad file
/// cannot take down a batch.
pub fn html_to_markdown(html: &str) -> Result<String, PipelineError> {
    let handlers = custom_handlers();
    let markdown = panic::catch_unwind(AssertUnwindSafe(|| {
        html2md::parse_html_custom(html, &handlers)
    }))
    .map_err(|payload| PipelineError::ConversionFailed(panic_message(payload.as_ref())))?;

    debug!("Markup converted: {} → {} bytes", html.len(), markdown.len());
    Ok(markdown)
}

fn custom_handlers() -> HashMap<String, Box<dyn TagHandlerFactory>> {
    let mut handlers: HashMap<String, Box<dyn TagHandlerFactory>> = HashMap::new();
    handlers.insert("li".to_string(), Box::new(ListItemFactory));
    for level in 1..=6 {
        handlers.insert(format!("h{level}"), Box::new(HeadingFactory));
    }
    handlers
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("HTML converter panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("HTML converter panicked: {s}")
    } else {
        "HTML converter panicked".to_string()
    }
}

fn element_name(tag: &Handle) -> String {
    match tag.data {
        NodeData::Element { ref name, .. } => name.local.to_string(),
        _ => String::new(),
    }
}

// ── List items ───────────────────────────────────────────────────────────

struct ListItemFactory;

impl TagHandlerFactory for ListItemFactory {
    fn instantiate(&self) -> Box<dyn TagHandler> {
        Box::new(ListItemHandler::default())
    }
}

#[derive(Default)]
struct ListItemHandler {
    /// Byte offset just past the marker; `None` for an `<li>` outside a list.
    start_pos: Option<usize>,
}

impl TagHandler for ListItemHandler {
    fn handle(&mut self, _tag: &Handle, printer: &mut StructuredPrinter) {
        let ordered = match printer
            .parent_chain
            .iter()
            .rev()
            .find(|t| matches!(t.as_str(), "ul" | "ol" | "menu"))
        {
            Some(list) => list == "ol",
            None => return,
        };

        if !printer.data.ends_with('\n') {
            printer.insert_newline();
        }

        if ordered {
            // Siblings at this depth are the `<li>`s already emitted.
            let depth = printer.parent_chain.len();
            let order = printer.siblings.get(&depth).map_or(0, Vec::len) + 1;
            printer.append_str(&format!("{order}. "));
        } else {
            printer.append_str("- ");
        }

        self.start_pos = Some(printer.data.len());
    }

    fn after_handle(&mut self, printer: &mut StructuredPrinter) {
        let Some(start) = self.start_pos else {
            return;
        };

        // `<p>` inside `<li>` must not push the text off the marker line
        let body = printer.data.split_off(start);
        let body = body.trim_start_matches(['\n', ' ']).trim_end();
        printer.append_str(&flatten_item_body(body));
    }
}

/// Fold an item body onto as few lines as possible.
///
/// Text lines are joined to the line before them with a space. Nested list
/// items, table rows and fenced code keep their own lines, indented by
/// [`LIST_INDENT`].
fn flatten_item_body(body: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut in_fence = false;

    for line in body.lines() {
        let trimmed = line.trim();
        let is_fence = trimmed.starts_with("```");
        let own_line = in_fence
            || is_fence
            || list_marker(line).is_some()
            || is_table_row(line);
        if is_fence {
            in_fence = !in_fence;
        }

        match lines.last_mut() {
            None => lines.push(trimmed.to_string()),
            Some(_) if own_line => lines.push(format!("{LIST_INDENT}{line}")),
            Some(_) if trimmed.is_empty() => {}
            Some(last) => {
                last.push(' ');
                last.push_str(trimmed);
            }
        }
    }

    lines.join("\n")
}

// ── Headings ─────────────────────────────────────────────────────────────

struct HeadingFactory;

impl TagHandlerFactory for HeadingFactory {
    fn instantiate(&self) -> Box<dyn TagHandler> {
        Box::new(HeadingHandler)
    }
}

struct HeadingHandler;

impl TagHandler for HeadingHandler {
    fn handle(&mut self, tag: &Handle, printer: &mut StructuredPrinter) {
        let level = element_name(tag)
            .strip_prefix('h')
            .and_then(|n| n.parse::<usize>().ok())
            .unwrap_or(1)
            .clamp(1, 6);

        printer.insert_newline();
        printer.insert_newline();
        printer.append_str(&"#".repeat(level));
        printer.append_str(" ");
    }

    fn after_handle(&mut self, printer: &mut StructuredPrinter) {
        printer.insert_newline();
        printer.insert_newline();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn md(html: &str) -> String {
        html_to_markdown(html).unwrap()
    }

    #[test]
    fn unordered_items_use_dash_marker() {
        let out = md("<html><body><ul><li>a</li><li>b</li></ul></body></html>");
        assert!(out.contains("- a\n- b"), "got: {out:?}");
        assert!(!out.contains("* a"));
    }

    #[test]
    fn ordered_items_are_numbered() {
        let out = md("<ol><li>first</li><li>second</li><li>third</li></ol>");
        assert!(out.contains("1. first\n2. second\n3. third"), "got: {out:?}");
    }

    #[test]
    fn nested_lists_indent_by_two_spaces() {
        let out = md("<ul><li>outer<ul><li>inner</li></ul></li><li>next</li></ul>");
        assert!(out.contains("- outer\n  - inner"), "got: {out:?}");
        assert!(out.contains("  - inner\n- next"), "got: {out:?}");
    }

    #[test]
    fn paragraph_inside_item_stays_on_marker_line() {
        let out = md("<ul><li><p>para item</p></li></ul>");
        assert!(out.contains("- para item"), "got: {out:?}");
    }

    #[test]
    fn multi_paragraph_item_is_joined_onto_marker_line() {
        let out = md("<ul><li><p>first</p><p>second</p></li><li>next</li></ul>");
        assert!(out.contains("- first second\n- next"), "got: {out:?}");
    }

    #[test]
    fn item_text_survives_normalization_as_one_run() {
        let out = md("<ul><li>one<br>two</li><li>three</li></ul>");
        let normalized = crate::pipeline::normalize::normalize_blocks(&out);
        assert!(normalized.contains("- one two\n- three"), "got: {normalized:?}");
    }

    #[test]
    fn flatten_keeps_nested_items_and_fences() {
        assert_eq!(flatten_item_body("a\nb\n\nc"), "a b c");
        assert_eq!(flatten_item_body("top\n- child"), "top\n  - child");
        assert_eq!(
            flatten_item_body("run:\n```\nx  y\n```"),
            "run:\n  ```\n  x  y\n  ```"
        );
    }

    #[test]
    fn headings_are_atx() {
        let out = md("<h1>Title</h1><p>body</p><h3>Sub</h3>");
        assert!(out.contains("# Title"), "got: {out:?}");
        assert!(out.contains("### Sub"), "got: {out:?}");
        assert!(!out.contains("====="));
        assert!(!out.contains("Sub ###"));
    }

    #[test]
    fn links_and_emphasis_are_kept() {
        let out = md(r#"<p><a href="https://example.com/page">site</a> is <strong>bold</strong> and <em>it</em></p>"#);
        assert!(out.contains("[site](https://example.com/page)"), "got: {out:?}");
        assert!(out.contains("**bold**"), "got: {out:?}");
        assert!(out.contains("*it*"), "got: {out:?}");
    }

    #[test]
    fn tables_become_pipe_rows() {
        let out = md("<table><tr><th>A</th><th>B</th></tr><tr><td>1</td><td>2</td></tr></table>");
        let rows: Vec<&str> = out.lines().filter(|l| l.starts_with('|')).collect();
        assert!(rows.len() >= 2, "got: {out:?}");
        assert!(rows[0].contains('A') && rows[0].contains('B'));
    }

    #[test]
    fn long_paragraphs_are_not_wrapped() {
        let words = "word ".repeat(60);
        let out = md(&format!("<p>{words}</p>"));
        assert_eq!(out.lines().count(), 1, "got: {out:?}");
    }
}
