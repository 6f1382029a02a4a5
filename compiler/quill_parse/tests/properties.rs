//! Property tests over the public entry points.

use proptest::prelude::*;
use quill_ir::{NodeKind, TraversalAction};
use quill_parse::{parse_chunk, parse_expression, ParserOptions};

/// A small pool of valid sources used as a base for mutation-style
/// properties.
const VALID_SOURCES: [&str; 12] = [
    "a = 1",
    "a = (1 + 2)",
    "var x = \"abc\"",
    "if x { a = 1 } else { a = 2 }",
    "for x in [1, 2, 3] { print x }",
    "fn add(a, b){ return (a + b) }",
    "pattern p = | 1 | 2",
    "f(1, /a/b, https://example.com/x)",
    "h<div class=\"a\">{x}</div>",
    "switch v { 1 { } defaultcase { } }",
    "go nil do f()",
    "synchronized $a { x = 1 }",
];

proptest! {
    /// Spans stay within bounds and nest monotonically for arbitrary
    /// inputs.
    #[test]
    fn spans_in_bounds_and_monotone(source in "[ -~\n]{0,60}") {
        let len = source.chars().count() as u32;
        let (chunk, _) = parse_chunk(&source, &ParserOptions::default());
        let mut violation: Option<String> = None;
        quill_ir::walk(&chunk, &mut |node, parent, _| {
            let span = node.span();
            if span.start > span.end {
                violation = Some(format!("reversed span on {}", node.kind_name()));
                return TraversalAction::Stop;
            }
            // missing-expression markers may point one rune past the end
            if span.end > len + 1 {
                violation = Some(format!("span out of bounds on {}", node.kind_name()));
                return TraversalAction::Stop;
            }
            if let Some(parent) = parent {
                if parent.span().start > span.start || span.end > parent.span().end {
                    violation = Some(format!(
                        "child {} {} escapes parent {} {}",
                        node.kind_name(),
                        span,
                        parent.kind_name(),
                        parent.span(),
                    ));
                    return TraversalAction::Stop;
                }
            }
            TraversalAction::Continue
        });
        prop_assert!(violation.is_none(), "{}", violation.unwrap_or_default());
    }

    /// Arbitrary input never panics and always yields a chunk.
    #[test]
    fn arbitrary_input_yields_a_chunk(source in "\\PC{0,80}") {
        let (chunk, _) = parse_chunk(&source, &ParserOptions::default());
        prop_assert!(matches!(chunk.kind, NodeKind::Chunk { .. }), "expected a chunk node");
    }

    /// Truncating a valid source at any offset still yields a complete
    /// chunk; the result is either valid or carries an error somewhere.
    #[test]
    fn truncation_recovers(index in 0usize..12, cut in 0usize..60) {
        let source = VALID_SOURCES[index];
        let runes: Vec<char> = source.chars().collect();
        let cut = cut.min(runes.len());
        let truncated: String = runes[..cut].iter().collect();
        let (chunk, _) = parse_chunk(&truncated, &ParserOptions::default());
        prop_assert!(matches!(chunk.kind, NodeKind::Chunk { .. }), "expected a chunk node");
    }

    /// Wrapping a non-parenthesized expression in parentheses preserves
    /// its structure and sets the flag.
    #[test]
    fn parenthesization_round_trip(value in -1000i64..1000) {
        let plain_source = format!("{value}");
        let wrapped_source = format!("({value})");

        let (plain, ok) = parse_expression(&plain_source);
        prop_assert!(ok);
        let (wrapped, ok) = parse_expression(&wrapped_source);
        prop_assert!(ok);

        prop_assert!(!plain.base.parenthesized);
        prop_assert!(wrapped.base.parenthesized);
        match (&plain.kind, &wrapped.kind) {
            (
                NodeKind::IntLiteral { value: a, .. },
                NodeKind::IntLiteral { value: b, .. },
            ) => prop_assert_eq!(a, b),
            (
                NodeKind::UnaryExpression { operand: a, .. },
                NodeKind::UnaryExpression { operand: b, .. },
            ) => {
                // negative values parse as negation inside parentheses
                prop_assert_eq!(&a.kind, &b.kind);
            }
            (a, b) => prop_assert_eq!(
                std::mem::discriminant(a),
                std::mem::discriminant(b)
            ),
        }
    }

    /// Inserting a line comment at the end of a statement line does not
    /// change the statement structure.
    #[test]
    fn trivia_is_idempotent(index in 0usize..12) {
        let source = VALID_SOURCES[index];
        let commented = format!("{source} # trailing note");

        let (chunk_a, _) = parse_chunk(source, &ParserOptions::default());
        let (chunk_b, _) = parse_chunk(&commented, &ParserOptions::default());

        let mut kinds_a = Vec::new();
        quill_ir::walk(&chunk_a, &mut |node, _, _| {
            kinds_a.push(node.kind_name());
            TraversalAction::Continue
        });
        let mut kinds_b = Vec::new();
        quill_ir::walk(&chunk_b, &mut |node, _, _| {
            kinds_b.push(node.kind_name());
            TraversalAction::Continue
        });
        prop_assert_eq!(kinds_a, kinds_b);
    }

    /// Integer literals outside i64 and ports above 65535 surface errors.
    #[test]
    fn number_bounds(big in 1u64..1000) {
        let overflowing = format!("{}{big}", i64::MAX);
        let (node, ok) = parse_expression(&overflowing);
        prop_assert!(!ok);
        prop_assert!(node.base.err.is_some());
    }

    /// `%` before an expression-shaped pattern produces a pattern node.
    #[test]
    fn percent_switches_to_pattern_context(name in "[a-eg-rt-z][a-z]{0,7}") {
        let (node, ok) = parse_expression(&format!("%{name}"));
        prop_assert!(ok);
        prop_assert!(
            matches!(node.kind, NodeKind::PatternIdentifierLiteral { .. }),
            "expected a pattern identifier literal"
        );
    }
}

#[test]
fn port_bounds() {
    let (node, ok) = parse_expression(":70000");
    assert!(!ok);
    assert!(node.base.err.is_some());

    let (node, ok) = parse_expression(":8080");
    assert!(ok, "unexpected error: {node:?}");
}
