//! Property-based testing for diffview
//!
//! Uses proptest to verify the alignment and refinement invariants across
//! randomly generated inputs.

use ::diffview::*;
use proptest::prelude::*;

/// Lines drawn from a small alphabet so that matches are frequent
fn line_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("}".to_string()),
        "[a-c]{1,3}",
        " {0,4}[a-d]{1,4}\\(\\)",
    ]
}

fn lines_strategy(max: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(line_strategy(), 0..max)
}

/// Check that operations partition both index spaces in order
fn assert_partition(ops: &[Operation], a_len: usize, b_len: usize) -> std::result::Result<(), TestCaseError> {
    let (mut a_at, mut b_at) = (0, 0);
    for op in ops {
        prop_assert_eq!(op.a_start, a_at);
        prop_assert_eq!(op.b_start, b_at);
        prop_assert!(op.a_start <= op.a_end && op.b_start <= op.b_end);
        match op.kind {
            OpKind::Equal => prop_assert_eq!(op.a_len(), op.b_len()),
            OpKind::Insert => prop_assert!(op.a_len() == 0 && op.b_len() > 0),
            OpKind::Delete => prop_assert!(op.a_len() > 0 && op.b_len() == 0),
            OpKind::Replace => prop_assert!(op.a_len() > 0 && op.b_len() > 0),
        }
        a_at = op.a_end;
        b_at = op.b_end;
    }
    prop_assert_eq!(a_at, a_len);
    prop_assert_eq!(b_at, b_len);
    Ok(())
}

fn common_prefix_suffix(a: &str, b: &str) -> String {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let prefix = a.iter().zip(&b).take_while(|(x, y)| x == y).count();
    let suffix = a[prefix..]
        .iter()
        .rev()
        .zip(b[prefix..].iter().rev())
        .take_while(|(x, y)| x == y)
        .count();
    a[..prefix].iter().chain(&a[a.len() - suffix..]).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_operations_cover_both_sequences(a in lines_strategy(40), b in lines_strategy(40)) {
        let ops = operations(&a, &b);
        assert_partition(&ops, a.len(), b.len())?;

        for op in ops.iter().filter(|op| op.kind == OpKind::Equal) {
            prop_assert_eq!(&a[op.a_range()], &b[op.b_range()]);
        }
    }

    #[test]
    fn prop_identical_sequences_are_one_equal(a in lines_strategy(40)) {
        let ops = operations(&a, &a);
        if a.is_empty() {
            prop_assert!(ops.is_empty());
        } else {
            prop_assert_eq!(ops, vec![Operation::new(OpKind::Equal, 0, a.len(), 0, a.len())]);
        }
    }

    #[test]
    fn prop_one_empty_side(b in prop::collection::vec(line_strategy(), 1..30)) {
        let empty: Vec<String> = Vec::new();
        prop_assert_eq!(
            operations(&empty, &b),
            vec![Operation::new(OpKind::Insert, 0, 0, 0, b.len())]
        );
        prop_assert_eq!(
            operations(&b, &empty),
            vec![Operation::new(OpKind::Delete, 0, b.len(), 0, 0)]
        );
    }

    #[test]
    fn prop_matching_blocks_are_valid(a in lines_strategy(40), b in lines_strategy(40)) {
        let blocks = SequenceMatcher::new(&a, &b, &Heuristics::default()).matching_blocks();

        prop_assert_eq!(blocks.last().copied(), Some(MatchingBlock::new(a.len(), b.len(), 0)));
        for block in &blocks {
            prop_assert_eq!(&a[block.a_start..block.a_end()], &b[block.b_start..block.b_end()]);
        }
        for pair in blocks.windows(2) {
            prop_assert!(pair[0].a_end() <= pair[1].a_start);
            prop_assert!(pair[0].b_end() <= pair[1].b_start);
        }
    }

    #[test]
    fn prop_large_inputs_with_junk_still_cover(
        a in prop::collection::vec(line_strategy(), 200..260),
        b in prop::collection::vec(line_strategy(), 200..260),
    ) {
        assert_partition(&operations(&a, &b), a.len(), b.len())?;
    }

    #[test]
    fn prop_bracket_removal_leaves_common_text(a in "[a-c ]{0,12}", b in "[a-c ]{0,12}") {
        let diff = refine(&a, &b);
        if a == b {
            prop_assert!(!diff.is_changed());
        } else {
            let expected = common_prefix_suffix(&a, &b);
            prop_assert_eq!(diff.a.without_bracket(), expected.clone());
            prop_assert_eq!(diff.b.without_bracket(), expected);
        }
    }

    #[test]
    fn prop_spans_are_sorted_and_rebuild_text(a in "\\PC{0,16}", b in "\\PC{0,16}") {
        let diff = refine(&a, &b);
        for line in [&diff.a, &diff.b] {
            for pair in line.spans.windows(2) {
                prop_assert!(pair[0].end <= pair[1].start);
            }
            let rebuilt: String = line.segments().iter().map(|s| s.text).collect();
            prop_assert_eq!(&rebuilt, &line.text);
        }
        prop_assert_eq!(diff.a.spans.len(), diff.b.spans.len());
    }

    #[test]
    fn prop_refine_is_reflexive(s in "\\PC{0,24}") {
        let diff = CharDiffiner::new().with_indent_unit("  ").refine(&s, &s);
        prop_assert!(!diff.a.is_marked());
        prop_assert!(!diff.b.is_marked());
        prop_assert_eq!(diff.a.text, s.clone());
        prop_assert_eq!(diff.b.text, s);
    }

    #[test]
    fn prop_split_lines_round_trips(lines in prop::collection::vec("[a-z ]{0,6}", 1..10)) {
        let text = format!("{}\n", lines.join("\n"));
        prop_assert_eq!(split_lines(&text), lines);
    }
}
