//! # diffview - Line and character level text diffing
//!
//! A text comparison library that aligns two texts line by line and then
//! highlights what changed inside each replaced line.
//!
//! ## Overview
//!
//! diffview answers two questions about a pair of texts:
//! - Which lines are equal, inserted, deleted or replaced?
//! - For a replaced line pair, which characters actually differ?
//!
//! The answers can be consumed as plain data, as a display-ready report
//! with optional context folding, or as rendered HTML.
//!
//! ## Architecture
//!
//! - **Sequence matcher**: a longest-matching-block aligner in the style of
//!   Ratcliff/Obershelp. Over-represented lines in long inputs are treated
//!   as junk so they cannot anchor the alignment, and a boundary tie-break
//!   keeps re-indented lines paired with their counterparts
//! - **Character diffiner**: trims the common prefix and suffix of a line
//!   pair and resynchronizes fuzzily in between. Pure re-indentation is
//!   recognised and marked as such
//! - **Reporter**: pairs lines into rows, refines replacements and folds
//!   long unchanged runs
//! - **Renderer**: turns reports into side-by-side or inline HTML
//!
//! ## Quick Start
//!
//! ```rust
//! use diffview::{Differ, OpKind};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let differ = Differ::builder().build()?;
//!
//! let diff = differ.diff_text(
//!     "fn main() {\n    run(1);\n}\n",
//!     "fn main() {\n    run(2);\n}\n",
//! );
//! assert_eq!(diff.operations.len(), 3);
//! assert_eq!(diff.operations[1].kind, OpKind::Replace);
//!
//! let marked = &diff.refinements[0].char_diff;
//! assert_eq!(marked.b.render("[", "]"), "    run([2]);");
//! # Ok(())
//! # }
//! ```
//!
//! ## Reports and HTML
//!
//! ```rust
//! use diffview::{ContextSize, Differ, HtmlRenderer, Layout};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let differ = Differ::builder()
//!     .context_size(ContextSize::Lines(2))
//!     .build()?;
//!
//! let report = differ.report("a\nb\nc\n", "a\nb\nC\n");
//! assert_eq!(report.stats.lines_modified, 1);
//!
//! let html = HtmlRenderer::new(Layout::Inline).render(&report);
//! assert!(html.starts_with("<div class='diff'>"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Lower-level access
//!
//! The matcher is generic over any [`Token`], not just lines:
//!
//! ```rust
//! use diffview::{operations, OpKind};
//!
//! let a: Vec<char> = "abxcd".chars().collect();
//! let b: Vec<char> = "abcd".chars().collect();
//! let ops = operations(&a, &b);
//! assert_eq!(ops[1].kind, OpKind::Delete);
//! ```
//!
//! ## Error Handling
//!
//! Diffing itself never fails. Options are validated when a [`Differ`] is
//! built and rejected with [`DiffError::InvalidConfiguration`]; I/O and
//! JSON errors only occur in callers that load inputs or configuration.
//!
//! ## Module Organization
//!
//! - [`matcher`]: Line alignment and junk detection
//! - [`chardiff`]: Character-level refinement of replaced lines
//! - [`report`]: Display rows, context folding and statistics
//! - [`render`]: HTML output
//! - [`differ`]: High-level entry points and builder
//! - [`tokenize`]: Line splitting
//! - [`types`]: Common types and options
//! - [`error`]: Error types and handling

// Public API modules
pub mod chardiff;
pub mod differ;
pub mod error;
pub mod matcher;
pub mod render;
pub mod report;
pub mod tokenize;
pub mod types;

// Internal modules (not part of public API)
mod collections;

// Re-export main types for convenience
pub use chardiff::{refine, CharDiff, CharDiffiner, MarkedLine, Segment};
pub use differ::{Diff, Differ, DifferBuilder, Refinement};
pub use error::{DiffError, Result};
pub use matcher::{operations, JunkIndex, SequenceMatcher, Token};
pub use render::{escape_html, HtmlRenderer, Layout};
pub use report::{Cell, DiffStats, Fold, LineRow, Report, Reporter, Row};
pub use tokenize::split_lines;
pub use types::*;
