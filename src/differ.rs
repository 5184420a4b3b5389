//! High-level diffing entry points
//!
//! [`Differ`] ties the pieces together: it validates options once, aligns
//! lines with the [`SequenceMatcher`], refines single-line replacements with
//! the [`CharDiffiner`] and builds [`Report`]s.
//!
//! ## Examples
//!
//! ```rust
//! use diffview::{ContextSize, Differ, OpKind};
//!
//! let differ = Differ::builder()
//!     .context_size(ContextSize::Lines(1))
//!     .build()
//!     .unwrap();
//!
//! let diff = differ.diff_text("a\nb\nc\n", "a\nB\nc\n");
//! assert_eq!(diff.operations[1].kind, OpKind::Replace);
//! assert_eq!(diff.refinements.len(), 1);
//! ```

use crate::chardiff::{CharDiff, CharDiffiner};
use crate::error::Result;
use crate::matcher::{SequenceMatcher, Token};
use crate::report::{Report, Reporter};
use crate::tokenize::split_lines;
use crate::types::{ContextSize, DiffOptions, Heuristics, OpKind, Operation};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Character-level detail for one operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Refinement {
    /// Index of the operation in [`Diff::operations`]
    pub op_index: usize,
    /// Marked base and new line
    pub char_diff: CharDiff,
}

/// Line operations plus character refinements of single-line replacements
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diff {
    /// Alignment of the two line sequences
    pub operations: Vec<Operation>,
    /// Refinements, ordered by operation index
    pub refinements: Vec<Refinement>,
}

impl Diff {
    /// Whether any operation is not `Equal`
    pub fn has_changes(&self) -> bool {
        self.operations.iter().any(|op| op.kind != OpKind::Equal)
    }

    /// Refinement for the operation at `op_index`, if any
    pub fn refinement(&self, op_index: usize) -> Option<&CharDiff> {
        self.refinements
            .binary_search_by_key(&op_index, |refinement| refinement.op_index)
            .ok()
            .map(|found| &self.refinements[found].char_diff)
    }
}

/// Diff engine with validated options
///
/// A `Differ` holds no per-diff state, so one instance can be shared across
/// threads and reused for any number of inputs.
#[derive(Debug, Clone)]
pub struct Differ {
    options: DiffOptions,
    diffiner: CharDiffiner,
}

impl Differ {
    /// Create a differ after validating `options`
    ///
    /// # Errors
    ///
    /// Returns [`DiffError::InvalidConfiguration`](crate::DiffError::InvalidConfiguration)
    /// when the options fail [`DiffOptions::validate`].
    pub fn new(options: DiffOptions) -> Result<Self> {
        options.validate()?;
        debug!("Creating differ with context {}", options.context_size);
        let diffiner = CharDiffiner::from_options(&options);
        Ok(Self { options, diffiner })
    }

    /// Start configuring a differ
    pub fn builder() -> DifferBuilder {
        DifferBuilder::new()
    }

    /// Options in effect
    pub fn options(&self) -> &DiffOptions {
        &self.options
    }

    /// A matcher over `a` and `b` using the configured heuristics
    pub fn matcher<'a, T: Token>(&self, a: &'a [T], b: &'a [T]) -> SequenceMatcher<'a, T> {
        SequenceMatcher::new(a, b, &self.options.heuristics)
    }

    /// Align two arbitrary token sequences
    pub fn operations<T: Token>(&self, a: &[T], b: &[T]) -> Vec<Operation> {
        self.matcher(a, b).operations()
    }

    /// Mark the differing characters of two lines
    pub fn refine(&self, a: &str, b: &str) -> CharDiff {
        self.diffiner.refine(a, b)
    }

    /// Diff two already split texts
    pub fn diff_lines<S: AsRef<str>>(&self, a: &[S], b: &[S]) -> Diff {
        let a: Vec<&str> = a.iter().map(AsRef::as_ref).collect();
        let b: Vec<&str> = b.iter().map(AsRef::as_ref).collect();
        let operations = self.operations(&a, &b);

        let refinements = if self.options.fuzzy_char_diff {
            operations
                .iter()
                .enumerate()
                .filter(|(_, op)| op.is_single_line_pair())
                .map(|(op_index, op)| Refinement {
                    op_index,
                    char_diff: self.diffiner.refine(a[op.a_start], b[op.b_start]),
                })
                .collect()
        } else {
            Vec::new()
        };

        debug!(
            "Diffed {} against {} lines: {} operations, {} refinements",
            a.len(),
            b.len(),
            operations.len(),
            refinements.len()
        );
        Diff {
            operations,
            refinements,
        }
    }

    /// Split both texts into lines and diff them
    pub fn diff_text(&self, a: &str, b: &str) -> Diff {
        self.diff_lines(&split_lines(a), &split_lines(b))
    }

    /// Build a report for two already split texts
    pub fn report_lines<S: AsRef<str>>(&self, a: &[S], b: &[S]) -> Report {
        let a: Vec<&str> = a.iter().map(AsRef::as_ref).collect();
        let b: Vec<&str> = b.iter().map(AsRef::as_ref).collect();
        let operations = self.operations(&a, &b);
        Reporter::new(&self.options).build(&a, &b, &operations)
    }

    /// Split both texts into lines and build a report
    pub fn report(&self, a: &str, b: &str) -> Report {
        self.report_lines(&split_lines(a), &split_lines(b))
    }

    /// Build reports for many text pairs in parallel
    ///
    /// Reports are returned in the order of `pairs`.
    pub fn report_many<S: AsRef<str> + Sync>(&self, pairs: &[(S, S)]) -> Vec<Report> {
        info!("Building {} reports in parallel", pairs.len());
        pairs
            .par_iter()
            .map(|(a, b)| self.report(a.as_ref(), b.as_ref()))
            .collect()
    }
}

/// Builder for [`Differ`] with a fluent interface
///
/// # Examples
///
/// ```rust
/// use diffview::{DifferBuilder, ContextSize};
///
/// let differ = DifferBuilder::new()
///     .context_size(ContextSize::Lines(3))
///     .indent_unit(Some("\t".to_string()))
///     .fuzzy_char_diff(true)
///     .build()
///     .unwrap();
/// assert_eq!(differ.options().context_size, ContextSize::Lines(3));
/// ```
#[derive(Debug, Clone, Default)]
pub struct DifferBuilder {
    options: DiffOptions,
}

impl DifferBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a complete set of options, e.g. loaded from a file
    pub fn options(mut self, options: DiffOptions) -> Self {
        self.options = options;
        self
    }

    /// Set how many unchanged lines reports keep around changes
    pub fn context_size(mut self, context_size: ContextSize) -> Self {
        self.options.context_size = context_size;
        self
    }

    /// Set the indentation unit used to recognise pure re-indentation
    ///
    /// `None` disables the check. The unit must be non-empty whitespace.
    pub fn indent_unit(mut self, unit: Option<String>) -> Self {
        self.options.indent_unit = unit;
        self
    }

    /// Enable or disable character-level refinement
    pub fn fuzzy_char_diff(mut self, enabled: bool) -> Self {
        self.options.fuzzy_char_diff = enabled;
        self
    }

    /// Replace the matcher heuristics
    pub fn heuristics(mut self, heuristics: Heuristics) -> Self {
        self.options.heuristics = heuristics;
        self
    }

    /// Bound the character resynchronization search
    pub fn resync_window(mut self, window: usize) -> Self {
        self.options.resync_window = window;
        self
    }

    /// Validate the options and create the differ
    ///
    /// # Errors
    ///
    /// Returns an error if the options are invalid.
    pub fn build(self) -> Result<Differ> {
        Differ::new(self.options)
    }
}
