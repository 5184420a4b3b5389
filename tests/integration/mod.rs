//! Comprehensive integration tests for diffview
//!
//! Tests realistic documents: randomly edited texts, source code with
//! re-indentation, repetitive inputs that trigger junk detection, and the
//! full report and rendering pipeline.

use ::diffview::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

/// Edit applied to a generated document
#[derive(Debug, Clone)]
pub enum Edit {
    Insert { at: usize, line: String },
    Delete { at: usize },
    Modify { at: usize, line: String },
}

/// Test harness producing documents and randomly edited copies of them
pub struct DiffHarness {
    rng: StdRng,
    pub edit_log: Vec<Edit>,
}

impl DiffHarness {
    /// Create a harness with a fixed seed
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            edit_log: Vec::new(),
        }
    }

    /// Generate a document of `lines` lines resembling source code
    pub fn document(&mut self, lines: usize) -> Vec<String> {
        (0..lines)
            .map(|i| match self.rng.random_range(0..6) {
                0 => String::new(),
                1 => "}".to_string(),
                2 => format!("fn item_{}() {{", i),
                _ => format!("    let value_{} = {};", i, self.rng.random_range(0..1000)),
            })
            .collect()
    }

    /// Apply `count` random edits to a copy of `lines`
    pub fn edit(&mut self, lines: &[String], count: usize) -> Vec<String> {
        let mut edited = lines.to_vec();
        for n in 0..count {
            let edit = if edited.is_empty() {
                Edit::Insert {
                    at: 0,
                    line: format!("inserted {}", n),
                }
            } else {
                match self.rng.random_range(0..3) {
                    0 => Edit::Insert {
                        at: self.rng.random_range(0..=edited.len()),
                        line: format!("inserted {}", n),
                    },
                    1 => Edit::Delete {
                        at: self.rng.random_range(0..edited.len()),
                    },
                    _ => Edit::Modify {
                        at: self.rng.random_range(0..edited.len()),
                        line: format!("    modified {};", n),
                    },
                }
            };
            match &edit {
                Edit::Insert { at, line } => edited.insert(*at, line.clone()),
                Edit::Delete { at } => {
                    edited.remove(*at);
                }
                Edit::Modify { at, line } => edited[*at] = line.clone(),
            }
            self.edit_log.push(edit);
        }
        edited
    }
}

/// Rebuild `b` from `a` and the operations, checking every range on the way
pub fn apply<S: AsRef<str>>(a: &[S], b: &[S], ops: &[Operation]) -> Vec<String> {
    let mut rebuilt = Vec::new();
    let (mut a_at, mut b_at) = (0, 0);
    for op in ops {
        assert_eq!(op.a_start, a_at, "gap or overlap in base at {}", op);
        assert_eq!(op.b_start, b_at, "gap or overlap in new at {}", op);
        match op.kind {
            OpKind::Equal => {
                assert_eq!(op.a_len(), op.b_len());
                for (x, y) in a[op.a_range()].iter().zip(&b[op.b_range()]) {
                    assert_eq!(x.as_ref(), y.as_ref());
                }
                rebuilt.extend(a[op.a_range()].iter().map(|s| s.as_ref().to_string()));
            }
            OpKind::Insert => {
                assert_eq!(op.a_len(), 0);
                rebuilt.extend(b[op.b_range()].iter().map(|s| s.as_ref().to_string()));
            }
            OpKind::Delete => assert_eq!(op.b_len(), 0),
            OpKind::Replace => {
                assert!(op.a_len() > 0 && op.b_len() > 0);
                rebuilt.extend(b[op.b_range()].iter().map(|s| s.as_ref().to_string()));
            }
        }
        a_at = op.a_end;
        b_at = op.b_end;
    }
    assert_eq!(a_at, a.len());
    assert_eq!(b_at, b.len());
    rebuilt
}

#[test]
fn test_random_edits_rebuild_new_text() {
    let mut harness = DiffHarness::new(42);
    for round in 0..20 {
        let base = harness.document(50 + round * 10);
        let new = harness.edit(&base, 1 + round % 7);
        let ops = operations(&base, &new);
        assert_eq!(apply(&base, &new, &ops), new);
    }
    info!("Applied {} random edits", harness.edit_log.len());
}

#[test]
fn test_large_documents_with_junk() {
    let mut harness = DiffHarness::new(7);
    let base = harness.document(1500);
    let new = harness.edit(&base, 40);

    let matcher = SequenceMatcher::new(&base, &new, &Heuristics::default());
    assert!(!matcher.junk().is_empty());
    assert!(matcher.junk().contains(&String::new()));

    let ops = matcher.operations();
    assert_eq!(apply(&base, &new, &ops), new);

    let without_junk = Heuristics {
        autojunk: false,
        ..Default::default()
    };
    let ops = SequenceMatcher::new(&base, &new, &without_junk).operations();
    assert_eq!(apply(&base, &new, &ops), new);
}

#[test]
fn test_matching_blocks_are_valid() {
    let mut harness = DiffHarness::new(1234);
    let base = harness.document(300);
    let new = harness.edit(&base, 25);
    let blocks = SequenceMatcher::new(&base, &new, &Heuristics::default()).matching_blocks();

    let sentinel = blocks.last().unwrap();
    assert_eq!((sentinel.a_start, sentinel.b_start, sentinel.size), (base.len(), new.len(), 0));
    for pair in blocks.windows(2) {
        assert!(pair[0].a_end() <= pair[1].a_start);
        assert!(pair[0].b_end() <= pair[1].b_start);
    }
    for block in &blocks {
        assert_eq!(base[block.a_start..block.a_end()], new[block.b_start..block.b_end()]);
    }
}

#[test]
fn test_reindented_block_keeps_lines_paired() {
    let base = "fn run() {\n    step_one();\n    step_two();\n}\n";
    let new = "fn run() {\n    if ready {\n        step_one();\n        step_two();\n    }\n}\n";

    let differ = Differ::builder().build().unwrap();
    let report = differ.report(base, new);

    let replaced: Vec<&LineRow> = report.lines().filter(|line| line.kind == OpKind::Replace).collect();
    assert!(!replaced.is_empty());
    for line in &replaced {
        let base_cell = line.base.as_ref().unwrap();
        let new_cell = line.new.as_ref().unwrap();
        assert_eq!(base_cell.text.without_bracket(), new_cell.text.without_bracket());
    }
    assert_eq!(report.stats.lines_added + report.stats.lines_modified, 4);
}

#[test]
fn test_word_level_alignment() {
    let base: Vec<&str> = "the quick brown fox jumps".split(' ').collect();
    let new: Vec<&str> = "the slow brown fox leaps high".split(' ').collect();
    let ops = operations(&base, &new);

    assert_eq!(
        ops,
        vec![
            Operation::new(OpKind::Equal, 0, 1, 0, 1),
            Operation::new(OpKind::Replace, 1, 2, 1, 2),
            Operation::new(OpKind::Equal, 2, 4, 2, 4),
            Operation::new(OpKind::Replace, 4, 5, 4, 6),
        ]
    );
}

#[test]
fn test_reversed_inputs_mirror_each_other() {
    let mut harness = DiffHarness::new(99);
    let base = harness.document(120);
    let new = harness.edit(&base, 12);

    let forward = operations(&base, &new);
    let backward = operations(&new, &base);
    let changed = |ops: &[Operation]| ops.iter().filter(|op| op.kind != OpKind::Equal).count() > 0;
    assert_eq!(changed(&forward), changed(&backward));
    assert_eq!(apply(&new, &base, &backward), base);
}

#[test]
fn test_report_pipeline_with_folding() {
    let base: String = (1..=40).map(|i| format!("line {}\n", i)).collect();
    let new = base.replace("line 10\n", "line ten\n").replace("line 30\n", "");

    let differ = Differ::builder().context_size(ContextSize::Lines(3)).build().unwrap();
    let report = differ.report(&base, &new);

    assert_eq!(report.stats.lines_modified, 1);
    assert_eq!(report.stats.lines_deleted, 1);
    assert_eq!(report.stats.folds, 3);
    assert_eq!(report.stats.lines_hidden, 6 + 13 + 7);

    let folds: Vec<Fold> = report
        .rows
        .iter()
        .filter_map(|row| match row {
            Row::Fold(fold) => Some(*fold),
            Row::Line(_) => None,
        })
        .collect();
    assert_eq!(folds[0].base_start, 1);
    assert_eq!(folds[1].base_start, 14);
    assert_eq!(folds[1].new_start, 14);
    assert_eq!(folds[2].base_start, 34);
    assert_eq!(folds[2].new_start, 33);

    let html = HtmlRenderer::new(Layout::SideBySide).render(&report);
    assert_eq!(html.matches("<li class='fold'>...</li>").count(), 6);
    assert!(html.contains("line <em>10</em>"));
    assert!(html.contains("line <em>ten</em>"));
}

#[test]
fn test_parallel_reports_match_sequential() {
    let mut harness = DiffHarness::new(5);
    let pairs: Vec<(String, String)> = (0..16)
        .map(|_| {
            let base = harness.document(80);
            let new = harness.edit(&base, 6);
            (base.join("\n"), new.join("\n"))
        })
        .collect();

    let differ = Differ::builder().context_size(ContextSize::Lines(2)).build().unwrap();
    let parallel = differ.report_many(&pairs);
    for ((base, new), report) in pairs.iter().zip(&parallel) {
        assert_eq!(&differ.report(base, new), report);
    }
}
