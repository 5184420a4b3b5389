//! Core data types used throughout the diffview library
//!
//! ## Overview
//!
//! The types in this module represent:
//! - **Alignment results**: `OpKind`, `Operation`, `MatchingBlock` - the plain
//!   data produced by the sequence matcher
//! - **Configuration**: `DiffOptions`, `ContextSize`, `Heuristics` - operation
//!   parameters, validated before any matching work begins
//!
//! ## Examples
//!
//! ```rust
//! use diffview::types::{ContextSize, DiffOptions};
//!
//! let options = DiffOptions {
//!     context_size: "3".parse().unwrap(),
//!     indent_unit: None,
//!     ..Default::default()
//! };
//! assert_eq!(options.context_size, ContextSize::Lines(3));
//! assert!(options.validate().is_ok());
//! ```

use crate::error::{DiffError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// How a range of the base sequence relates to a range of the new one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpKind {
    /// Both ranges hold identical elements
    Equal,
    /// Elements present only in the new sequence
    Insert,
    /// Elements present only in the base sequence
    Delete,
    /// Elements of the base range were replaced by the new range
    Replace,
}

impl OpKind {
    /// Lowercase name, as used in reports and markup classes
    pub fn as_str(&self) -> &'static str {
        match self {
            OpKind::Equal => "equal",
            OpKind::Insert => "insert",
            OpKind::Delete => "delete",
            OpKind::Replace => "replace",
        }
    }

    /// The same relation seen with base and new swapped
    pub fn reversed(self) -> Self {
        match self {
            OpKind::Insert => OpKind::Delete,
            OpKind::Delete => OpKind::Insert,
            other => other,
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One alignment operation over half-open ranges of both sequences
///
/// A full operation list partitions `[0, len(A))` and `[0, len(B))`:
/// consecutive operations are contiguous in both sequences.
///
/// # Examples
///
/// ```rust
/// # use diffview::types::{Operation, OpKind};
/// let op = Operation::new(OpKind::Replace, 1, 2, 1, 3);
/// assert_eq!(op.a_range(), 1..2);
/// assert_eq!(op.b_len(), 2);
/// assert!(!op.is_single_line_pair());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Operation {
    /// Relation between the two ranges
    pub kind: OpKind,
    /// Start of the range in the base sequence
    pub a_start: usize,
    /// End (exclusive) of the range in the base sequence
    pub a_end: usize,
    /// Start of the range in the new sequence
    pub b_start: usize,
    /// End (exclusive) of the range in the new sequence
    pub b_end: usize,
}

impl Operation {
    /// Create an operation from its kind and bounds
    pub fn new(kind: OpKind, a_start: usize, a_end: usize, b_start: usize, b_end: usize) -> Self {
        Self {
            kind,
            a_start,
            a_end,
            b_start,
            b_end,
        }
    }

    /// Range covered in the base sequence
    pub fn a_range(&self) -> Range<usize> {
        self.a_start..self.a_end
    }

    /// Range covered in the new sequence
    pub fn b_range(&self) -> Range<usize> {
        self.b_start..self.b_end
    }

    /// Number of base elements covered
    pub fn a_len(&self) -> usize {
        self.a_end - self.a_start
    }

    /// Number of new elements covered
    pub fn b_len(&self) -> usize {
        self.b_end - self.b_start
    }

    /// Whether this is a replacement of exactly one line by exactly one line
    pub fn is_single_line_pair(&self) -> bool {
        self.kind == OpKind::Replace && self.a_len() == 1 && self.b_len() == 1
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({},{},{},{})",
            self.kind, self.a_start, self.a_end, self.b_start, self.b_end
        )
    }
}

/// A run of identical elements: `A[a_start..a_start+size] == B[b_start..b_start+size]`
///
/// The derived ordering compares `(a_start, b_start, size)` lexicographically,
/// which is the order blocks are sorted in before merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MatchingBlock {
    /// Start in the base sequence
    pub a_start: usize,
    /// Start in the new sequence
    pub b_start: usize,
    /// Number of matching elements
    pub size: usize,
}

impl MatchingBlock {
    /// Create a block
    pub fn new(a_start: usize, b_start: usize, size: usize) -> Self {
        Self {
            a_start,
            b_start,
            size,
        }
    }

    /// End (exclusive) in the base sequence
    pub fn a_end(&self) -> usize {
        self.a_start + self.size
    }

    /// End (exclusive) in the new sequence
    pub fn b_end(&self) -> usize {
        self.b_start + self.size
    }

    /// The same block with the roles of both sequences exchanged
    pub fn transposed(self) -> Self {
        Self::new(self.b_start, self.a_start, self.size)
    }
}

/// Number of unchanged lines kept around each change in a report
///
/// Only the reporter looks at this value; the matcher ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContextSize {
    /// Show every line
    #[default]
    Unbounded,
    /// Keep this many lines of context, fold the rest
    Lines(usize),
}

impl FromStr for ContextSize {
    type Err = DiffError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("unbounded") || trimmed.eq_ignore_ascii_case("all") {
            return Ok(ContextSize::Unbounded);
        }
        if trimmed.starts_with('-') {
            return Err(DiffError::invalid_configuration(format!(
                "context size '{}' is negative",
                trimmed
            )));
        }
        trimmed.parse::<usize>().map(ContextSize::Lines).map_err(|_| {
            DiffError::invalid_configuration(format!(
                "context size '{}' is not a number",
                trimmed
            ))
        })
    }
}

impl fmt::Display for ContextSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextSize::Unbounded => f.write_str("unbounded"),
            ContextSize::Lines(n) => write!(f, "{}", n),
        }
    }
}

/// Wire form of a context size: a JSON number or a string
#[derive(Deserialize)]
#[serde(untagged)]
enum RawContextSize {
    Count(i64),
    Text(String),
}

impl<'de> Deserialize<'de> for ContextSize {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match RawContextSize::deserialize(deserializer)? {
            RawContextSize::Count(n) if n < 0 => Err(serde::de::Error::custom(format!(
                "context size {} is negative",
                n
            ))),
            RawContextSize::Count(n) => usize::try_from(n)
                .map(ContextSize::Lines)
                .map_err(|_| serde::de::Error::custom(format!("context size {} is out of range", n))),
            RawContextSize::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}

impl Serialize for ContextSize {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            ContextSize::Unbounded => serializer.serialize_str("unbounded"),
            ContextSize::Lines(n) => serializer.serialize_u64(*n as u64),
        }
    }
}

/// Tuning constants of the line matcher
///
/// These values change visible output on edge cases, so they are kept
/// configurable rather than hard-coded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Heuristics {
    /// Whether over-represented lines are treated as junk at all
    pub autojunk: bool,
    /// Inputs shorter than this never contain junk
    pub junk_min_len: usize,
    /// A line is junk when it occurs more than `len / junk_density + 1` times
    pub junk_density: usize,
    /// Boundary tie-break applies when two gap sizes differ by less than this
    pub near_balance_threshold: usize,
}

impl Default for Heuristics {
    fn default() -> Self {
        Self {
            autojunk: true,
            junk_min_len: 200,
            junk_density: 100,
            near_balance_threshold: 3,
        }
    }
}

/// Options controlling diff generation and reporting
///
/// # Examples
///
/// ```rust
/// use diffview::types::{ContextSize, DiffOptions};
///
/// let options: DiffOptions = serde_json::from_str(
///     r#"{ "context_size": 2, "indent_unit": "\t" }"#,
/// ).unwrap();
/// assert_eq!(options.context_size, ContextSize::Lines(2));
/// assert!(options.fuzzy_char_diff);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffOptions {
    /// Context kept around changes when reporting
    pub context_size: ContextSize,
    /// One level of indentation, used to recognise pure re-indentation
    pub indent_unit: Option<String>,
    /// Whether replaced line pairs get character-level highlighting
    pub fuzzy_char_diff: bool,
    /// Matcher tuning constants
    pub heuristics: Heuristics,
    /// Largest combined offset the character resynchronization searches
    pub resync_window: usize,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            context_size: ContextSize::Unbounded,
            indent_unit: Some("    ".to_string()),
            fuzzy_char_diff: true,
            heuristics: Heuristics::default(),
            resync_window: 256,
        }
    }
}

impl DiffOptions {
    /// Build an indentation unit from a character repeated `size` times
    ///
    /// Returns `None` for a size of zero, which disables the indentation check.
    pub fn indent_unit_from(ch: char, size: usize) -> Option<String> {
        if size == 0 {
            None
        } else {
            Some(std::iter::repeat(ch).take(size).collect())
        }
    }

    /// Check the options for values the algorithms cannot work with
    pub fn validate(&self) -> Result<()> {
        if let Some(unit) = &self.indent_unit {
            if unit.is_empty() {
                return Err(DiffError::invalid_configuration(
                    "indentation unit is empty; use no unit to disable the check",
                ));
            }
            if !unit.chars().all(char::is_whitespace) {
                return Err(DiffError::invalid_configuration(format!(
                    "indentation unit {:?} contains non-whitespace characters",
                    unit
                )));
            }
        }
        if self.heuristics.junk_density == 0 {
            return Err(DiffError::invalid_configuration("junk density must be positive"));
        }
        if self.resync_window == 0 {
            return Err(DiffError::invalid_configuration("resync window must be positive"));
        }
        Ok(())
    }
}
