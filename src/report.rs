//! Turning operations into displayable rows
//!
//! The reporter walks an operation list and produces one row per displayed
//! line pair. Replaced lines are paired positionally and refined at the
//! character level. Long runs of unchanged lines can be folded away when a
//! context size is configured.

use crate::chardiff::{CharDiffiner, MarkedLine};
use crate::types::{ContextSize, DiffOptions, OpKind, Operation};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One side of a displayed line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// 1-based line number
    pub number: usize,
    /// Line content with changed spans marked
    pub text: MarkedLine,
}

/// A displayed line pair; a missing side is `None`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRow {
    /// How the two sides relate
    pub kind: OpKind,
    /// Line from the base text
    pub base: Option<Cell>,
    /// Line from the new text
    pub new: Option<Cell>,
}

/// A run of unchanged lines hidden from the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fold {
    /// 1-based number of the first hidden base line
    pub base_start: usize,
    /// 1-based number of the first hidden new line
    pub new_start: usize,
    /// Number of hidden lines
    pub lines: usize,
}

/// A report row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Row {
    /// A visible line pair
    Line(LineRow),
    /// Hidden unchanged lines
    Fold(Fold),
}

/// Counters collected while building a report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStats {
    /// Lines present only in the new text
    pub lines_added: usize,
    /// Lines present only in the base text
    pub lines_deleted: usize,
    /// Line pairs shown as replaced
    pub lines_modified: usize,
    /// Changed character regions across all refined pairs
    pub char_spans: usize,
    /// Unchanged lines hidden by folds
    pub lines_hidden: usize,
    /// Number of folds
    pub folds: usize,
}

impl DiffStats {
    /// Whether anything differs between the two texts
    pub fn has_changes(&self) -> bool {
        self.lines_added + self.lines_deleted + self.lines_modified > 0
    }
}

/// A complete diff report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Rows in display order
    pub rows: Vec<Row>,
    /// Summary counters
    pub stats: DiffStats,
}

impl Report {
    /// Whether anything differs between the two texts
    pub fn has_changes(&self) -> bool {
        self.stats.has_changes()
    }

    /// Iterate over the visible line pairs only
    pub fn lines(&self) -> impl Iterator<Item = &LineRow> {
        self.rows.iter().filter_map(|row| match row {
            Row::Line(line) => Some(line),
            Row::Fold(_) => None,
        })
    }
}

/// Builds reports from operation lists
#[derive(Debug, Clone)]
pub struct Reporter {
    context: ContextSize,
    fuzzy: bool,
    diffiner: CharDiffiner,
}

impl Reporter {
    /// Create a reporter for the given options
    pub fn new(options: &DiffOptions) -> Self {
        Self {
            context: options.context_size,
            fuzzy: options.fuzzy_char_diff,
            diffiner: CharDiffiner::from_options(options),
        }
    }

    /// Build the report for `operations` computed over `base` and `new`
    ///
    /// Operations referring to lines outside the given slices produce rows
    /// with the missing side left empty.
    pub fn build<S: AsRef<str>>(&self, base: &[S], new: &[S], operations: &[Operation]) -> Report {
        let mut report = Report::default();
        let folding = operations.len() > 1;
        let last = operations.len().saturating_sub(1);

        for (index, op) in operations.iter().enumerate() {
            match op.kind {
                OpKind::Equal => {
                    let context = if folding { self.context } else { ContextSize::Unbounded };
                    push_equal(&mut report, base, new, op, context, index == 0, index == last);
                }
                OpKind::Delete => {
                    for a in op.a_range() {
                        report.stats.lines_deleted += 1;
                        push_line(&mut report, OpKind::Delete, cell(base, a), None);
                    }
                }
                OpKind::Insert => {
                    for b in op.b_range() {
                        report.stats.lines_added += 1;
                        push_line(&mut report, OpKind::Insert, None, cell(new, b));
                    }
                }
                OpKind::Replace => self.push_replace(&mut report, base, new, op),
            }
        }

        debug!(
            "Built report with {} rows ({} folds hiding {} lines)",
            report.rows.len(),
            report.stats.folds,
            report.stats.lines_hidden
        );
        report
    }

    fn push_replace<S: AsRef<str>>(&self, report: &mut Report, base: &[S], new: &[S], op: &Operation) {
        for offset in 0..op.a_len().max(op.b_len()) {
            let base_cell = (offset < op.a_len()).then(|| cell(base, op.a_start + offset)).flatten();
            let new_cell = (offset < op.b_len()).then(|| cell(new, op.b_start + offset)).flatten();

            match (base_cell, new_cell) {
                (Some(mut base_cell), Some(mut new_cell)) => {
                    report.stats.lines_modified += 1;
                    if self.fuzzy && !base_cell.text.text.is_empty() && !new_cell.text.text.is_empty() {
                        let diff = self.diffiner.refine(&base_cell.text.text, &new_cell.text.text);
                        report.stats.char_spans += diff.span_count();
                        base_cell.text = diff.a;
                        new_cell.text = diff.b;
                    }
                    push_line(report, OpKind::Replace, Some(base_cell), Some(new_cell));
                }
                (Some(base_cell), None) => {
                    report.stats.lines_deleted += 1;
                    push_line(report, OpKind::Delete, Some(base_cell), None);
                }
                (None, Some(new_cell)) => {
                    report.stats.lines_added += 1;
                    push_line(report, OpKind::Insert, None, Some(new_cell));
                }
                (None, None) => {}
            }
        }
    }
}

fn cell<S: AsRef<str>>(lines: &[S], index: usize) -> Option<Cell> {
    lines.get(index).map(|line| Cell {
        number: index + 1,
        text: MarkedLine::unmarked(line.as_ref()),
    })
}

fn push_line(report: &mut Report, kind: OpKind, base: Option<Cell>, new: Option<Cell>) {
    report.rows.push(Row::Line(LineRow { kind, base, new }));
}

fn push_equal<S: AsRef<str>>(
    report: &mut Report,
    base: &[S],
    new: &[S],
    op: &Operation,
    context: ContextSize,
    is_first: bool,
    is_last: bool,
) {
    let len = op.a_len();
    let (lead, trail) = match context {
        ContextSize::Unbounded => (len, 0),
        ContextSize::Lines(n) => (if is_first { 0 } else { n }, if is_last { 0 } else { n }),
    };
    let hidden = len.saturating_sub(lead.saturating_add(trail));

    let push_range = |report: &mut Report, offsets: std::ops::Range<usize>| {
        for offset in offsets {
            push_line(
                report,
                OpKind::Equal,
                cell(base, op.a_start + offset),
                cell(new, op.b_start + offset),
            );
        }
    };

    if hidden > 1 {
        push_range(report, 0..lead);
        report.rows.push(Row::Fold(Fold {
            base_start: op.a_start + lead + 1,
            new_start: op.b_start + lead + 1,
            lines: hidden,
        }));
        report.stats.lines_hidden += hidden;
        report.stats.folds += 1;
        push_range(report, lead + hidden..len);
    } else {
        push_range(report, 0..len);
    }
}
