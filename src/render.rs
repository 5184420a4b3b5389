//! HTML rendering of reports
//!
//! Reports are rendered as ordered lists: one list of line numbers and one
//! of line contents per side (side-by-side), or two number lists and one
//! shared content list (inline). Changed character spans are wrapped in
//! `<em>`. All text passes through [`escape_html`]; nothing else in the
//! crate escapes.

use crate::chardiff::MarkedLine;
use crate::report::{Cell, Fold, LineRow, Report, Row};
use crate::types::OpKind;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt::Write;

const EMPTY_ITEM: &str = "<li class='empty'>&#8203;</li>";

/// Escape the characters that are significant in HTML text and attributes
///
/// # Examples
///
/// ```rust
/// use diffview::render::escape_html;
///
/// assert_eq!(escape_html("a < b && c"), "a &lt; b &amp;&amp; c");
/// assert_eq!(escape_html("plain"), "plain");
/// ```
pub fn escape_html(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }
    let mut escaped = String::with_capacity(text.len() + 16);
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    Cow::Owned(escaped)
}

/// Arrangement of the two texts in the output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// Base and new text in two columns
    #[default]
    SideBySide,
    /// One column with removed lines followed by added lines
    Inline,
}

/// Renders a [`Report`] as an HTML fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlRenderer {
    /// Column arrangement
    pub layout: Layout,
    /// Title of the base text
    pub base_name: String,
    /// Title of the new text
    pub new_name: String,
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self {
            layout: Layout::SideBySide,
            base_name: "Base Source".to_string(),
            new_name: "New Source".to_string(),
        }
    }
}

impl HtmlRenderer {
    /// Create a renderer with default titles
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            ..Default::default()
        }
    }

    /// Set the titles shown above the texts
    pub fn with_names(mut self, base_name: impl Into<String>, new_name: impl Into<String>) -> Self {
        self.base_name = base_name.into();
        self.new_name = new_name.into();
        self
    }

    /// Render the report
    pub fn render(&self, report: &Report) -> String {
        match self.layout {
            Layout::SideBySide => self.side_by_side(report),
            Layout::Inline => self.inline(report),
        }
    }

    fn side_by_side(&self, report: &Report) -> String {
        let mut columns = [String::new(), String::new(), String::new(), String::new()];
        for row in &report.rows {
            match row {
                Row::Line(line) => {
                    let [base_count, base_data, new_count, new_data] = &mut columns;
                    push_side(base_count, base_data, line.kind, line.base.as_ref());
                    push_side(new_count, new_data, line.kind, line.new.as_ref());
                }
                Row::Fold(fold) => {
                    for (index, column) in columns.iter_mut().enumerate() {
                        if index % 2 == 0 {
                            column.push_str("<li class='fold'>...</li>");
                        } else {
                            push_fold_data(column, fold);
                        }
                    }
                }
            }
        }

        let [base_count, base_data, new_count, new_data] = columns;
        format!(
            "<div class='diff'>\
             <div class='diff-left'><h3 class='texttitle'>{}</h3>\
             <ol class='count'>{}</ol><ol class='data'>{}</ol></div>\
             <div class='diff-right'><h3 class='texttitle'>{}</h3>\
             <ol class='count'>{}</ol><ol class='data'>{}</ol></div>\
             </div>",
            escape_html(&self.base_name),
            base_count,
            base_data,
            escape_html(&self.new_name),
            new_count,
            new_data
        )
    }

    fn inline(&self, report: &Report) -> String {
        let mut columns = InlineColumns::default();
        for row in &report.rows {
            match row {
                Row::Line(LineRow {
                    kind: OpKind::Replace,
                    base,
                    new,
                }) => {
                    if let Some(cell) = base {
                        columns.push("delete", Some(cell.number), None, &cell.text);
                    }
                    if let Some(cell) = new {
                        columns.push("insert", None, Some(cell.number), &cell.text);
                    }
                }
                Row::Line(line) => {
                    let Some(cell) = line.base.as_ref().or(line.new.as_ref()) else {
                        continue;
                    };
                    columns.push(
                        line.kind.as_str(),
                        line.base.as_ref().map(|c| c.number),
                        line.new.as_ref().map(|c| c.number),
                        &cell.text,
                    );
                }
                Row::Fold(fold) => columns.push_fold(fold),
            }
        }

        format!(
            "<div class='diff'><h3 class='texttitle'>{} vs. {}</h3>\
             <ol class='count'>{}</ol><ol class='count'>{}</ol><ol class='data'>{}</ol></div>",
            escape_html(&self.base_name),
            escape_html(&self.new_name),
            columns.base_count,
            columns.new_count,
            columns.data
        )
    }
}

/// Number lists of both texts plus the shared content list
#[derive(Default)]
struct InlineColumns {
    base_count: String,
    new_count: String,
    data: String,
}

impl InlineColumns {
    fn push(&mut self, kind: &str, base: Option<usize>, new: Option<usize>, text: &MarkedLine) {
        push_number(&mut self.base_count, base);
        push_number(&mut self.new_count, new);
        let _ = write!(self.data, "<li class='{}'>{}&#10;</li>", kind, marked_html(text));
    }

    fn push_fold(&mut self, fold: &Fold) {
        self.base_count.push_str("<li class='fold'>...</li>");
        self.new_count.push_str("<li class='fold'>...</li>");
        push_fold_data(&mut self.data, fold);
    }
}

fn push_side(count: &mut String, data: &mut String, kind: OpKind, cell: Option<&Cell>) {
    match cell {
        Some(cell) => {
            let _ = write!(count, "<li>{}</li>", cell.number);
            let _ = write!(data, "<li class='{}'>{}&#10;</li>", kind, marked_html(&cell.text));
        }
        None => {
            count.push_str(EMPTY_ITEM);
            data.push_str(EMPTY_ITEM);
        }
    }
}

fn push_number(count: &mut String, number: Option<usize>) {
    match number {
        Some(number) => {
            let _ = write!(count, "<li>{}</li>", number);
        }
        None => count.push_str(EMPTY_ITEM),
    }
}

fn push_fold_data(data: &mut String, fold: &Fold) {
    let _ = write!(data, "<li class='fold'>{} lines hidden</li>", fold.lines);
}

fn marked_html(line: &MarkedLine) -> String {
    let mut out = String::with_capacity(line.text.len());
    for segment in line.segments() {
        if segment.changed {
            out.push_str("<em>");
            out.push_str(&escape_html(segment.text));
            out.push_str("</em>");
        } else {
            out.push_str(&escape_html(segment.text));
        }
    }
    out
}
