//! Character-level refinement of replaced line pairs
//!
//! Given two lines that the matcher paired up as a replacement, this module
//! marks the characters that actually changed so a report can highlight
//! them.
//!
//! ## Overview
//!
//! The common prefix and common suffix of both lines are never marked. The
//! region in between (the *bracket*) is refined with a fuzzy
//! resynchronization walk: on every mismatch the walk looks for the closest
//! point where both lines agree again, marks what was skipped on each side
//! and carries on from there. The walk is deliberately not an optimal LCS;
//! it trades minimality for speed and for highlights that read well.
//!
//! Pure re-indentation gets special treatment when an indentation unit is
//! configured: only the surplus indentation is marked.
//!
//! ## Examples
//!
//! ```rust
//! use diffview::chardiff::refine;
//!
//! let diff = refine("let x = 1;", "let y = 1;");
//! assert_eq!(diff.a.render("[", "]"), "let [x] = 1;");
//! assert_eq!(diff.b.render("[", "]"), "let [y] = 1;");
//! ```

use crate::types::DiffOptions;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use tracing::trace;

/// Default bound on the combined offset searched when resynchronizing
pub const DEFAULT_RESYNC_WINDOW: usize = 256;

/// A line of text with the byte ranges that are marked as changed
///
/// Spans are sorted, do not overlap and lie on character boundaries. An
/// empty span is a zero-width marker showing where the other line has
/// content this one lacks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkedLine {
    /// The full line text
    pub text: String,
    /// Changed byte ranges of `text`
    pub spans: Vec<Range<usize>>,
}

/// A run of a marked line that is either entirely changed or entirely kept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    /// Text of the run (empty for zero-width markers)
    pub text: &'a str,
    /// Whether the run is marked as changed
    pub changed: bool,
}

impl MarkedLine {
    /// A line with marked spans
    pub fn new(text: impl Into<String>, spans: Vec<Range<usize>>) -> Self {
        Self {
            text: text.into(),
            spans,
        }
    }

    /// A line without any marks
    pub fn unmarked(text: impl Into<String>) -> Self {
        Self::new(text, Vec::new())
    }

    /// Whether any span is marked
    pub fn is_marked(&self) -> bool {
        !self.spans.is_empty()
    }

    /// Smallest range covering every marked span
    pub fn bracket(&self) -> Option<Range<usize>> {
        match (self.spans.first(), self.spans.last()) {
            (Some(first), Some(last)) => Some(first.start..last.end),
            _ => None,
        }
    }

    /// The line with its bracket cut out
    pub fn without_bracket(&self) -> String {
        match self.bracket() {
            Some(range) => format!("{}{}", &self.text[..range.start], &self.text[range.end..]),
            None => self.text.clone(),
        }
    }

    /// Split the line into alternating kept and changed runs
    pub fn segments(&self) -> Vec<Segment<'_>> {
        let mut segments = Vec::with_capacity(self.spans.len() * 2 + 1);
        let mut at = 0;
        for span in &self.spans {
            if span.start > at {
                segments.push(Segment {
                    text: &self.text[at..span.start],
                    changed: false,
                });
            }
            segments.push(Segment {
                text: &self.text[span.clone()],
                changed: true,
            });
            at = span.end;
        }
        if at < self.text.len() {
            segments.push(Segment {
                text: &self.text[at..],
                changed: false,
            });
        }
        segments
    }

    /// The line with every span wrapped in `open` / `close` markers
    pub fn render(&self, open: &str, close: &str) -> String {
        let mut out = String::with_capacity(self.text.len() + self.spans.len() * (open.len() + close.len()));
        for segment in self.segments() {
            if segment.changed {
                out.push_str(open);
                out.push_str(segment.text);
                out.push_str(close);
            } else {
                out.push_str(segment.text);
            }
        }
        out
    }
}

/// Character-level difference between two lines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharDiff {
    /// The base line
    pub a: MarkedLine,
    /// The new line
    pub b: MarkedLine,
}

impl CharDiff {
    fn unchanged(a: &str, b: &str) -> Self {
        Self {
            a: MarkedLine::unmarked(a),
            b: MarkedLine::unmarked(b),
        }
    }

    /// Whether either side carries a mark
    pub fn is_changed(&self) -> bool {
        self.a.is_marked() || self.b.is_marked()
    }

    /// Number of changed regions found
    pub fn span_count(&self) -> usize {
        self.a.spans.len().max(self.b.spans.len())
    }
}

/// Refines replaced line pairs into marked lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharDiffiner {
    indent_unit: Option<String>,
    resync_window: usize,
}

impl Default for CharDiffiner {
    fn default() -> Self {
        Self {
            indent_unit: None,
            resync_window: DEFAULT_RESYNC_WINDOW,
        }
    }
}

impl CharDiffiner {
    /// A diffiner without the indentation check
    pub fn new() -> Self {
        Self::default()
    }

    /// A diffiner configured from validated diff options
    pub fn from_options(options: &DiffOptions) -> Self {
        Self {
            indent_unit: options.indent_unit.clone().filter(|unit| !unit.is_empty()),
            resync_window: options.resync_window.max(1),
        }
    }

    /// Recognise pure re-indentation using `unit` as one indentation level
    pub fn with_indent_unit(mut self, unit: impl Into<String>) -> Self {
        let unit = unit.into();
        self.indent_unit = (!unit.is_empty()).then_some(unit);
        self
    }

    /// Bound the resynchronization search to `window` combined characters
    pub fn with_resync_window(mut self, window: usize) -> Self {
        self.resync_window = window.max(1);
        self
    }

    /// Mark the characters that differ between `a` and `b`
    ///
    /// Equal lines come back unmarked. Otherwise the bracket of each side
    /// spans exactly the text between the common prefix and the common
    /// suffix, so cutting both brackets out leaves identical strings.
    pub fn refine(&self, a: &str, b: &str) -> CharDiff {
        if a == b {
            return CharDiff::unchanged(a, b);
        }

        if let Some(diff) = self.indentation_only(a, b) {
            trace!("Lines differ only in indentation");
            return diff;
        }

        let a_chars: Vec<(usize, char)> = a.char_indices().collect();
        let b_chars: Vec<(usize, char)> = b.char_indices().collect();

        let prefix = a_chars
            .iter()
            .zip(&b_chars)
            .take_while(|((_, x), (_, y))| x == y)
            .count();
        let suffix = a_chars[prefix..]
            .iter()
            .rev()
            .zip(b_chars[prefix..].iter().rev())
            .take_while(|((_, x), (_, y))| x == y)
            .count();

        let a_region: Vec<char> = a_chars[prefix..a_chars.len() - suffix].iter().map(|&(_, c)| c).collect();
        let b_region: Vec<char> = b_chars[prefix..b_chars.len() - suffix].iter().map(|&(_, c)| c).collect();

        let spans = resynchronize(&a_region, &b_region, self.resync_window);
        trace!("Refined line pair into {} spans", spans.len());

        let byte_at = |chars: &[(usize, char)], len: usize, index: usize| {
            chars.get(index).map_or(len, |&(offset, _)| offset)
        };
        let (a_spans, b_spans) = spans
            .into_iter()
            .map(|(ra, rb)| {
                (
                    byte_at(&a_chars, a.len(), prefix + ra.start)..byte_at(&a_chars, a.len(), prefix + ra.end),
                    byte_at(&b_chars, b.len(), prefix + rb.start)..byte_at(&b_chars, b.len(), prefix + rb.end),
                )
            })
            .unzip();

        CharDiff {
            a: MarkedLine::new(a, a_spans),
            b: MarkedLine::new(b, b_spans),
        }
    }

    /// Short-circuit for lines that only differ by whole indentation levels
    fn indentation_only(&self, a: &str, b: &str) -> Option<CharDiff> {
        let unit = self.indent_unit.as_deref()?;
        let indent_a = indentation_len(a, unit);
        let indent_b = indentation_len(b, unit);
        if indent_a == 0 || indent_b == 0 || indent_a == indent_b || a[indent_a..] != b[indent_b..] {
            return None;
        }

        let shared = indent_a.min(indent_b);
        Some(CharDiff {
            a: MarkedLine::new(a, vec![shared..indent_a]),
            b: MarkedLine::new(b, vec![shared..indent_b]),
        })
    }
}

/// Byte length of the leading run of whole `unit` repetitions
fn indentation_len(line: &str, unit: &str) -> usize {
    if unit.is_empty() {
        return 0;
    }
    let mut rest = line;
    while let Some(stripped) = rest.strip_prefix(unit) {
        rest = stripped;
    }
    line.len() - rest.len()
}

/// Walk two regions and collect the paired spans where they disagree
///
/// Span indices are character offsets into the regions.
fn resynchronize(a: &[char], b: &[char], window: usize) -> Vec<(Range<usize>, Range<usize>)> {
    let mut spans = Vec::new();
    let mut i = 0;
    let mut j = 0;

    while i < a.len() && j < b.len() {
        if a[i] == b[j] {
            i += 1;
            j += 1;
            continue;
        }
        match reconverge(&a[i..], &b[j..], window) {
            Some((dx, dy)) => {
                spans.push((i..i + dx, j..j + dy));
                i += dx;
                j += dy;
            }
            None => break,
        }
    }

    if i < a.len() || j < b.len() {
        spans.push((i..a.len(), j..b.len()));
    }
    spans
}

/// Closest offsets `(dx, dy)` at which `a[dx] == b[dy]`
///
/// Candidates are ranked by `dx + dy`, then by `|dx - dy|`, then by `dx`.
/// The pair `(0, 0)` is never considered since the walk only calls this on
/// a mismatch.
fn reconverge(a: &[char], b: &[char], window: usize) -> Option<(usize, usize)> {
    if a.is_empty() || b.is_empty() {
        return None;
    }
    let (last_a, last_b) = (a.len() - 1, b.len() - 1);
    let limit = (last_a + last_b).min(window);

    for total in 1..=limit {
        let lo = total.saturating_sub(last_b);
        let hi = total.min(last_a);
        let mut best: Option<(usize, usize)> = None;
        for dx in lo..=hi {
            let dy = total - dx;
            if a[dx] == b[dy] && best.map_or(true, |(bx, by)| dx.abs_diff(dy) < bx.abs_diff(by)) {
                best = Some((dx, dy));
            }
        }
        if best.is_some() {
            return best;
        }
    }
    None
}

/// Refine a replaced line pair with the default diffiner
pub fn refine(a: &str, b: &str) -> CharDiff {
    CharDiffiner::default().refine(a, b)
}
