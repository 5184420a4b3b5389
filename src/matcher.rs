//! Line-level alignment of two sequences
//!
//! This module computes the matching blocks shared by two sequences and turns
//! them into a list of [`Operation`]s (`equal`, `insert`, `delete`,
//! `replace`) that jointly partition both sequences.
//!
//! ## Overview
//!
//! The alignment is a longest-common-substring recursion:
//!
//! 1. The shorter sequence becomes the "needle" side so that the inner scan
//!    runs over the smaller input. Results are mapped back afterwards.
//! 2. The longer sequence is indexed once (value to ascending positions).
//!    Values that are over-represented in large inputs are junk: they only
//!    start a match when an interval has no other candidate, and a match
//!    may always be extended through them.
//! 3. The longest match inside an interval is recorded, and the intervals
//!    before and after it are processed the same way using an explicit
//!    stack, so arbitrarily long inputs cannot overflow the call stack.
//! 4. Blocks are sorted, adjacent ones are coalesced, and a zero-size
//!    sentinel block closes the list.
//! 5. Gaps between consecutive blocks become operations. A small tie-break
//!    may peel one line off a replaced region when that produces a sharper
//!    visual alignment.
//!
//! The result is deterministic and greedy-optimal per block, not a minimal
//! edit script.
//!
//! ## Examples
//!
//! ```rust
//! use diffview::matcher::operations;
//! use diffview::types::{Operation, OpKind};
//!
//! let base = ["a", "b", "c"];
//! let new = ["a", "x", "c"];
//!
//! assert_eq!(
//!     operations(&base, &new),
//!     vec![
//!         Operation::new(OpKind::Equal, 0, 1, 0, 1),
//!         Operation::new(OpKind::Replace, 1, 2, 1, 2),
//!         Operation::new(OpKind::Equal, 2, 3, 2, 3),
//!     ]
//! );
//! ```

#[cfg(feature = "gxhash")]
use crate::collections::HashMapExt;
use crate::collections::HashMap;
use crate::types::{Heuristics, MatchingBlock, OpKind, Operation};
use std::hash::Hash;
use std::ops::Range;
use tracing::{debug, trace};

/// Elements the matcher can align
///
/// Tokens are compared by value. Text tokens additionally report how similar
/// two of them are, which feeds the boundary tie-break; other tokens keep the
/// default, which turns the tie-break off.
pub trait Token: Eq + Hash {
    /// Number of leading characters shared with `other` once leading
    /// whitespace has been stripped from both
    fn shared_prefix(&self, _other: &Self) -> usize {
        0
    }
}

impl Token for str {
    fn shared_prefix(&self, other: &Self) -> usize {
        self.trim_start()
            .chars()
            .zip(other.trim_start().chars())
            .take_while(|(a, b)| a == b)
            .count()
    }
}

impl Token for String {
    fn shared_prefix(&self, other: &Self) -> usize {
        self.as_str().shared_prefix(other.as_str())
    }
}

impl<T: Token + ?Sized> Token for &T {
    fn shared_prefix(&self, other: &Self) -> usize {
        (**self).shared_prefix(*other)
    }
}

macro_rules! opaque_tokens {
    ($($ty:ty),*) => {
        $(impl Token for $ty {})*
    };
}

opaque_tokens!(char, u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

/// Values of the indexed sequence that are too frequent to anchor a match
///
/// Their positions are kept apart from the main index so that an interval
/// made only of junk can still be aligned.
#[derive(Debug)]
pub struct JunkIndex<'a, T> {
    junk: HashMap<&'a T, Vec<usize>>,
}

impl<'a, T: Token> JunkIndex<'a, T> {
    /// Whether `value` was classified as junk
    pub fn contains(&self, value: &T) -> bool {
        self.junk.contains_key(value)
    }

    /// Number of distinct junk values
    pub fn len(&self) -> usize {
        self.junk.len()
    }

    /// Whether no value was classified as junk
    pub fn is_empty(&self) -> bool {
        self.junk.is_empty()
    }
}

/// Aligns a base sequence `A` against a new sequence `B`
///
/// All state is owned by one matcher and derived from its two inputs, so
/// independent matchers can run in parallel without coordination.
pub struct SequenceMatcher<'a, T> {
    /// The shorter input; scanned element by element
    first: &'a [T],
    /// The longer input; looked up through `positions`
    second: &'a [T],
    /// `first` is `B` and `second` is `A`
    reversed: bool,
    positions: HashMap<&'a T, Vec<usize>>,
    junk: JunkIndex<'a, T>,
    heuristics: Heuristics,
}

impl<'a, T: Token> SequenceMatcher<'a, T> {
    /// Prepare a matcher for `a` (base) and `b` (new)
    pub fn new(a: &'a [T], b: &'a [T], heuristics: &Heuristics) -> Self {
        let reversed = a.len() > b.len();
        let (first, second) = if reversed { (b, a) } else { (a, b) };
        let (positions, junk) = index_positions(second, heuristics);

        debug!(
            "Prepared matcher: {} x {} elements, reversed: {}, junk values: {}",
            a.len(),
            b.len(),
            reversed,
            junk.len()
        );

        Self {
            first,
            second,
            reversed,
            positions,
            junk,
            heuristics: heuristics.clone(),
        }
    }

    /// Whether the matcher swapped the inputs internally
    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    /// The junk classification of the longer input
    pub fn junk(&self) -> &JunkIndex<'a, T> {
        &self.junk
    }

    /// Find the longest matching block in `A[a_lo..a_hi] x B[b_lo..b_hi]`
    ///
    /// Bounds are clamped to the sequence lengths. A block of size 0 means
    /// the interval has no match.
    pub fn find_longest_match(&self, a_lo: usize, a_hi: usize, b_lo: usize, b_hi: usize) -> MatchingBlock {
        let (a, b) = if self.reversed {
            (self.second, self.first)
        } else {
            (self.first, self.second)
        };
        let a_hi = a_hi.min(a.len());
        let b_hi = b_hi.min(b.len());
        let a_lo = a_lo.min(a_hi);
        let b_lo = b_lo.min(b_hi);

        if self.reversed {
            self.longest_match(b_lo, b_hi, a_lo, a_hi).transposed()
        } else {
            self.longest_match(a_lo, a_hi, b_lo, b_hi)
        }
    }

    /// Sorted, merged matching blocks terminated by the `(len A, len B, 0)` sentinel
    pub fn matching_blocks(&self) -> Vec<MatchingBlock> {
        let blocks = self.merged_blocks();
        if self.reversed {
            blocks.into_iter().map(MatchingBlock::transposed).collect()
        } else {
            blocks
        }
    }

    /// Operations that transform `A` into `B`, in order
    pub fn operations(&self) -> Vec<Operation> {
        let blocks = self.merged_blocks();
        let mut ops = Vec::with_capacity(blocks.len() * 2);
        let mut first_at = 0;
        let mut second_at = 0;

        for block in &blocks {
            let first_gap = first_at..block.a_start;
            let second_gap = second_at..block.b_start;

            match (first_gap.is_empty(), second_gap.is_empty()) {
                (false, false) => {
                    if self.prefers_shifted_boundary(&first_gap, &second_gap) {
                        let split = second_gap.start + 1;
                        self.push(&mut ops, OpKind::Insert, first_gap.start..first_gap.start, second_gap.start..split);
                        self.push(&mut ops, OpKind::Replace, first_gap, split..second_gap.end);
                    } else {
                        self.push(&mut ops, OpKind::Replace, first_gap, second_gap);
                    }
                }
                (false, true) => self.push(&mut ops, OpKind::Delete, first_gap, second_gap),
                (true, false) => self.push(&mut ops, OpKind::Insert, first_gap, second_gap),
                (true, true) => {}
            }

            first_at = block.a_end();
            second_at = block.b_end();
            if block.size > 0 {
                self.push(&mut ops, OpKind::Equal, block.a_start..first_at, block.b_start..second_at);
            }
        }

        debug!("Derived {} operations from {} matching blocks", ops.len(), blocks.len());
        ops
    }

    /// Record an operation given in internal orientation
    fn push(&self, ops: &mut Vec<Operation>, kind: OpKind, first: Range<usize>, second: Range<usize>) {
        let op = if self.reversed {
            Operation::new(kind.reversed(), second.start, second.end, first.start, first.end)
        } else {
            Operation::new(kind, first.start, first.end, second.start, second.end)
        };
        ops.push(op);
    }

    /// Boundary tie-break for a pair of nearly balanced gaps
    ///
    /// When the gap in the longer input exceeds the other by fewer than
    /// `near_balance_threshold` lines and its second line resembles the
    /// first line of the shorter gap better than its first line does, that
    /// first line is reported on its own as inserted (or deleted).
    fn prefers_shifted_boundary(&self, first_gap: &Range<usize>, second_gap: &Range<usize>) -> bool {
        let (first_len, second_len) = (first_gap.len(), second_gap.len());
        if second_len <= first_len || second_len - first_len >= self.heuristics.near_balance_threshold {
            return false;
        }

        let Some(anchor) = self.first.get(first_gap.start) else {
            return false;
        };
        let current = self.second.get(second_gap.start);
        let next = self.second.get(second_gap.start + 1).filter(|_| second_gap.start + 1 < second_gap.end);

        match (current, next) {
            (Some(current), Some(next)) => next.shared_prefix(anchor) > current.shared_prefix(anchor),
            _ => false,
        }
    }

    /// Longest run of equal elements seeded from `index`, earliest on ties
    fn longest_run(
        &self,
        index: &HashMap<&'a T, Vec<usize>>,
        first_lo: usize,
        first_hi: usize,
        second_lo: usize,
        second_hi: usize,
    ) -> MatchingBlock {
        let mut best_first = first_lo;
        let mut best_second = second_lo;
        let mut best_size = 0;

        // Length of the run ending at each `second` position for the previous `first` element
        let mut run_lengths: HashMap<usize, usize> = HashMap::new();

        for i in first_lo..first_hi {
            let mut next_runs: HashMap<usize, usize> = HashMap::new();
            if let Some(indices) = index.get(&self.first[i]) {
                let start = indices.partition_point(|&j| j < second_lo);
                for &j in &indices[start..] {
                    if j >= second_hi {
                        break;
                    }
                    let run = j
                        .checked_sub(1)
                        .and_then(|prev| run_lengths.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    next_runs.insert(j, run);
                    if run > best_size {
                        best_first = i + 1 - run;
                        best_second = j + 1 - run;
                        best_size = run;
                    }
                }
            }
            run_lengths = next_runs;
        }

        MatchingBlock::new(best_first, best_second, best_size)
    }

    /// Longest match in internal orientation (`first` window x `second` window)
    fn longest_match(&self, first_lo: usize, first_hi: usize, second_lo: usize, second_hi: usize) -> MatchingBlock {
        let mut best = self.longest_run(&self.positions, first_lo, first_hi, second_lo, second_hi);
        if best.size == 0 && !self.junk.is_empty() {
            best = self.longest_run(&self.junk.junk, first_lo, first_hi, second_lo, second_hi);
            if best.size > 0 {
                trace!("Interval anchored on junk only: {:?}", best);
            }
        }
        let MatchingBlock {
            a_start: mut best_first,
            b_start: mut best_second,
            size: mut best_size,
        } = best;

        let is_junk = |j: usize| self.junk.contains(&self.second[j]);

        // Extend through equal non-junk neighbours, then through equal junk
        for junk_pass in [false, true] {
            while best_first > first_lo
                && best_second > second_lo
                && is_junk(best_second - 1) == junk_pass
                && self.first[best_first - 1] == self.second[best_second - 1]
            {
                best_first -= 1;
                best_second -= 1;
                best_size += 1;
            }
            while best_first + best_size < first_hi
                && best_second + best_size < second_hi
                && is_junk(best_second + best_size) == junk_pass
                && self.first[best_first + best_size] == self.second[best_second + best_size]
            {
                best_size += 1;
            }
        }

        MatchingBlock::new(best_first, best_second, best_size)
    }

    /// Matching blocks in internal orientation, merged and with the sentinel
    fn merged_blocks(&self) -> Vec<MatchingBlock> {
        let first_len = self.first.len();
        let second_len = self.second.len();

        let mut pending = vec![(0, first_len, 0, second_len)];
        let mut blocks = Vec::new();

        while let Some((first_lo, first_hi, second_lo, second_hi)) = pending.pop() {
            let block = self.longest_match(first_lo, first_hi, second_lo, second_hi);
            if block.size == 0 {
                continue;
            }
            trace!(
                "Block {:?} in [{}, {}) x [{}, {})",
                block,
                first_lo,
                first_hi,
                second_lo,
                second_hi
            );
            blocks.push(block);

            if first_lo < block.a_start && second_lo < block.b_start {
                pending.push((first_lo, block.a_start, second_lo, block.b_start));
            }
            if block.a_end() < first_hi && block.b_end() < second_hi {
                pending.push((block.a_end(), first_hi, block.b_end(), second_hi));
            }
        }

        blocks.sort();

        let mut merged = Vec::with_capacity(blocks.len() + 1);
        let mut current = MatchingBlock::new(0, 0, 0);
        for block in blocks {
            if current.a_end() == block.a_start && current.b_end() == block.b_start {
                current.size += block.size;
            } else {
                if current.size > 0 {
                    merged.push(current);
                }
                current = block;
            }
        }
        if current.size > 0 {
            merged.push(current);
        }
        merged.push(MatchingBlock::new(first_len, second_len, 0));

        debug!("Computed {} matching blocks", merged.len() - 1);
        merged
    }
}

/// Build the position index of `second` and classify its junk values
fn index_positions<'a, T: Token>(
    second: &'a [T],
    heuristics: &Heuristics,
) -> (HashMap<&'a T, Vec<usize>>, JunkIndex<'a, T>) {
    let mut positions: HashMap<&'a T, Vec<usize>> = HashMap::new();
    for (index, value) in second.iter().enumerate() {
        positions.entry(value).or_default().push(index);
    }

    let mut junk: HashMap<&'a T, Vec<usize>> = HashMap::new();
    let len = second.len();
    if heuristics.autojunk && len >= heuristics.junk_min_len {
        let limit = len / heuristics.junk_density.max(1) + 1;
        let frequent: Vec<&'a T> = positions
            .iter()
            .filter(|(_, indices)| indices.len() > limit)
            .map(|(value, _)| *value)
            .collect();
        for value in frequent {
            if let Some(indices) = positions.remove(value) {
                junk.insert(value, indices);
            }
        }
    }

    (positions, JunkIndex { junk })
}

/// Align `a` against `b` with the default heuristics
pub fn operations<T: Token>(a: &[T], b: &[T]) -> Vec<Operation> {
    SequenceMatcher::new(a, b, &Heuristics::default()).operations()
}
