//! Main test module for diffview
//!
//! This module includes all test suites:
//! - Integration tests for realistic documents and reports
//! - Property-based tests for invariants

pub mod integration;
pub mod property;

#[cfg(test)]
mod edge_cases {
    use ::diffview::*;

    fn op(kind: OpKind, a_start: usize, a_end: usize, b_start: usize, b_end: usize) -> Operation {
        Operation::new(kind, a_start, a_end, b_start, b_end)
    }

    #[test]
    fn test_single_replaced_line() {
        let ops = operations(&["a", "b", "c"], &["a", "x", "c"]);
        assert_eq!(
            ops,
            vec![
                op(OpKind::Equal, 0, 1, 0, 1),
                op(OpKind::Replace, 1, 2, 1, 2),
                op(OpKind::Equal, 2, 3, 2, 3),
            ]
        );
    }

    #[test]
    fn test_appended_line() {
        let ops = operations(&["a", "b"], &["a", "b", "c"]);
        assert_eq!(ops, vec![op(OpKind::Equal, 0, 2, 0, 2), op(OpKind::Insert, 2, 2, 2, 3)]);
    }

    #[test]
    fn test_completely_different_line() {
        let ops = operations(&["foo"], &["bar"]);
        assert_eq!(ops, vec![op(OpKind::Replace, 0, 1, 0, 1)]);

        let diff = refine("foo", "bar");
        assert_eq!(diff.a.bracket(), Some(0..3));
        assert_eq!(diff.b.bracket(), Some(0..3));
    }

    #[test]
    fn test_reindented_line() {
        let ops = operations(&["  foo"], &["    foo"]);
        assert_eq!(ops, vec![op(OpKind::Replace, 0, 1, 0, 1)]);

        let diff = CharDiffiner::new().with_indent_unit(" ").refine("  foo", "    foo");
        for line in [&diff.a, &diff.b] {
            assert!(line.segments().iter().any(|s| !s.changed && s.text == "foo"));
            assert!(line.spans.iter().all(|span| span.end <= 4));
        }
    }

    #[test]
    fn test_empty_sequences() {
        let empty: [&str; 0] = [];
        assert!(operations(&empty, &empty).is_empty());
        assert_eq!(operations(&empty, &["x", "y"]), vec![op(OpKind::Insert, 0, 0, 0, 2)]);
        assert_eq!(operations(&["x", "y"], &empty), vec![op(OpKind::Delete, 0, 2, 0, 0)]);
    }

    #[test]
    fn test_empty_texts() {
        let differ = Differ::builder().build().unwrap();
        let diff = differ.diff_text("", "");
        assert!(diff.operations.is_empty());

        let report = differ.report("", "one\ntwo\n");
        assert_eq!(report.stats.lines_added, 2);
    }

    #[test]
    fn test_empty_lines_are_elements() {
        let ops = operations(&["", "", "a"], &["", "a"]);
        assert_eq!(ops, vec![op(OpKind::Delete, 0, 1, 0, 0), op(OpKind::Equal, 1, 3, 0, 2)]);
    }

    #[test]
    fn test_unicode_lines() {
        let differ = Differ::builder().build().unwrap();
        let diff = differ.diff_text("héllo wörld\n日本語\n", "hello wörld\n日本語\n");
        let refined = diff.refinement(0).unwrap();
        assert_eq!(refined.a.render("[", "]"), "h[é]llo wörld");
        assert_eq!(refined.b.render("[", "]"), "h[e]llo wörld");
    }

    #[test]
    fn test_refine_equal_strings() {
        for s in ["", "x", "  indented", "ünïcödé"] {
            let diff = refine(s, s);
            assert!(!diff.is_changed());
            assert_eq!(diff.a.text, s);
            assert_eq!(diff.b.text, s);
        }
    }

    #[test]
    fn test_refine_against_empty_line() {
        let diff = refine("", "abc");
        assert_eq!(diff.a.spans, vec![0..0]);
        assert_eq!(diff.b.spans, vec![0..3]);
    }

    #[test]
    fn test_invalid_configuration() {
        assert!("-5".parse::<ContextSize>().unwrap_err().is_configuration());
        assert!("lots".parse::<ContextSize>().is_err());
        assert!(Differ::builder()
            .indent_unit(Some("x".to_string()))
            .build()
            .is_err());
    }
}
