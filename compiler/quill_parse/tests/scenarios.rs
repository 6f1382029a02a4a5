//! End-to-end parsing scenarios over the public entry points.

use pretty_assertions::assert_eq;
use quill_ir::{BinaryOperator, Node, NodeKind, Span};
use quill_parse::{parse_chunk, parse_expression, ParserOptions};

fn first_statement(source: &str) -> Node {
    let (chunk, _) = parse_chunk(source, &ParserOptions::default());
    match chunk.kind {
        NodeKind::Chunk { mut statements, .. } => {
            assert!(!statements.is_empty(), "no statements in {source:?}");
            statements.remove(0)
        }
        other => panic!("expected chunk, got {other:?}"),
    }
}

#[test]
fn int_literal() {
    let (node, ok) = parse_expression("1");
    assert!(ok);
    assert!(matches!(node.kind, NodeKind::IntLiteral { value: 1, .. }));
    assert_eq!(node.span(), Span::new(0, 1));
    assert!(node.base.err.is_none());
}

#[test]
fn parenthesized_addition() {
    let (node, ok) = parse_expression("(1 + 2)");
    assert!(ok);
    match &node.kind {
        NodeKind::BinaryExpression {
            operator,
            left,
            right,
        } => {
            assert_eq!(*operator, BinaryOperator::Add);
            assert!(matches!(left.kind, NodeKind::IntLiteral { value: 1, .. }));
            assert!(matches!(right.kind, NodeKind::IntLiteral { value: 2, .. }));
        }
        other => panic!("expected binary expression, got {other:?}"),
    }
    assert!(node.base.parenthesized);
}

#[test]
fn quoted_string_with_escape() {
    let (node, ok) = parse_expression(r#""a\nb""#);
    assert!(ok);
    match &node.kind {
        NodeKind::QuotedStringLiteral { value, raw } => {
            assert_eq!(&**value, "a\nb");
            assert_eq!(&**raw, r#""a\nb""#);
        }
        other => panic!("expected quoted string, got {other:?}"),
    }
}

#[test]
fn lone_quote_is_unterminated() {
    let (node, ok) = parse_expression("\"");
    assert!(!ok);
    assert!(matches!(node.kind, NodeKind::QuotedStringLiteral { .. }));
    assert!(node
        .base
        .err
        .as_ref()
        .is_some_and(|e| e.message.contains("unterminated")));
}

#[test]
fn else_if_chain_nests_in_alternate() {
    let stmt = first_statement("if x { 1 } else if y { 2 } else { 3 }");
    let NodeKind::IfStatement { alternate, .. } = &stmt.kind else {
        panic!("expected if statement, got {:?}", stmt.kind);
    };
    let alternate = alternate.as_deref().expect("missing alternate");
    let NodeKind::IfStatement {
        alternate: nested_alternate,
        ..
    } = &alternate.kind
    else {
        panic!("expected nested if, got {:?}", alternate.kind);
    };
    assert!(matches!(
        nested_alternate.as_deref().map(|a| &a.kind),
        Some(NodeKind::Block { .. })
    ));
    assert!(!stmt.error_at_any_depth());
}

#[test]
fn markup_with_attribute_and_interpolation() {
    let (node, ok) = parse_expression("h<div class=\"a\">{x}</div>");
    assert!(ok, "parse failed: {node:?}");
    let NodeKind::MarkupExpression { element, .. } = &node.kind else {
        panic!("expected markup expression, got {:?}", node.kind);
    };
    let NodeKind::MarkupElement {
        opening, children, ..
    } = &element.kind
    else {
        panic!("expected markup element");
    };
    let NodeKind::MarkupOpeningTag {
        name, attributes, ..
    } = &opening.kind
    else {
        panic!("expected opening tag");
    };
    assert!(matches!(
        name.as_deref().map(|n| &n.kind),
        Some(NodeKind::IdentifierLiteral { name }) if &**name == "div"
    ));
    assert_eq!(attributes.len(), 1);
    let interpolation = children
        .iter()
        .find(|c| matches!(c.kind, NodeKind::MarkupInterpolation { .. }))
        .expect("missing interpolation");
    let NodeKind::MarkupInterpolation { expr: Some(expr) } = &interpolation.kind else {
        panic!("interpolation has no expression");
    };
    assert!(matches!(
        &expr.kind,
        NodeKind::IdentifierLiteral { name } if &**name == "x"
    ));
}

#[test]
fn pattern_definition_with_union() {
    let stmt = first_statement("pattern p = | 1 | 2");
    let NodeKind::PatternDefinition { left, right, .. } = &stmt.kind else {
        panic!("expected pattern definition, got {:?}", stmt.kind);
    };
    assert!(matches!(
        left.as_deref().map(|l| &l.kind),
        Some(NodeKind::PatternIdentifierLiteral { .. })
    ));
    let NodeKind::PatternUnion { cases } = &right.as_deref().expect("missing rhs").kind else {
        panic!("expected union");
    };
    assert_eq!(cases.len(), 2);
    assert!(matches!(cases[0].kind, NodeKind::IntLiteral { value: 1, .. }));
    assert!(matches!(cases[1].kind, NodeKind::IntLiteral { value: 2, .. }));
}

#[test]
fn absolute_path_expression_with_interpolation() {
    let (node, ok) = parse_expression("/a/{x}");
    assert!(ok);
    let NodeKind::AbsolutePathExpression { slices } = &node.kind else {
        panic!("expected absolute path expression, got {:?}", node.kind);
    };
    assert_eq!(slices.len(), 2);
    assert!(matches!(
        &slices[0].kind,
        NodeKind::PathSlice { value } if &**value == "/a/"
    ));
    assert!(matches!(slices[1].kind, NodeKind::IdentifierLiteral { .. }));
}

#[test]
fn chunk_span_covers_whole_source() {
    let source = "a = 1\nb = 2\n";
    let (chunk, _) = parse_chunk(source, &ParserOptions::default());
    assert_eq!(chunk.span(), Span::new(0, source.chars().count() as u32));
}

#[test]
fn token_buffer_reconstructs_trivia() {
    let source = "a = 1 # note\nb = 2";
    let (_, tokens) = parse_chunk(source, &ParserOptions::default());
    let comment = tokens
        .iter()
        .find(|t| t.kind == quill_ir::TokenKind::Comment)
        .expect("missing comment token");
    assert_eq!(comment.text(), "# note");
    assert!(tokens
        .iter()
        .any(|t| t.kind == quill_ir::TokenKind::Newline));
}

#[test]
fn error_aggregation_collects_positions() {
    let source = "a = \nb = 2";
    let (chunk, _) = parse_chunk(source, &ParserOptions::default());
    let code = quill_diagnostic::SourceCode::new("main.ql", source);
    let aggregation = quill_parse::aggregate_errors(&chunk, &code);
    let aggregation = aggregation.expect("expected at least one error");
    assert!(!aggregation.errors.is_empty());
    assert_eq!(aggregation.errors.len(), aggregation.error_positions.len());
    assert!(aggregation.message.contains("main.ql"));
}

#[test]
fn unterminated_constructs_recover() {
    for source in [
        "{a: 1",
        "[1, 2",
        "(1 + 2",
        "\"abc",
        "`abc",
        "h<div>",
        "if x {",
        "fn(a",
        "%str('a'",
        "switch x {",
    ] {
        let (chunk, _) = parse_chunk(source, &ParserOptions::default());
        assert!(
            chunk.error_at_any_depth(),
            "expected an error for source {source:?}"
        );
        // the subtree is still complete
        assert!(matches!(chunk.kind, NodeKind::Chunk { .. }));
    }
}

#[test]
fn spans_are_monotone() {
    let source = "manifest {}\nfn f(a, b){ return (a + b) }\nfor x in [1, 2] { print x }";
    let (chunk, _) = parse_chunk(source, &ParserOptions::default());
    quill_ir::walk(&chunk, &mut |node, parent, _| {
        if let Some(parent) = parent {
            assert!(
                parent.span().contains_span(node.span())
                    || parent.span() == node.span(),
                "span of {} {} escapes parent {} {}",
                node.kind_name(),
                node.span(),
                parent.kind_name(),
                parent.span(),
            );
        }
        quill_ir::TraversalAction::Continue
    });
}

#[test]
fn targeted_entry_points() {
    let (node, ok) = quill_parse::parse_path("/a/b");
    assert!(ok);
    assert!(matches!(node.kind, NodeKind::AbsolutePathLiteral { .. }));

    let (node, ok) = quill_parse::parse_path_pattern("%/a/...");
    assert!(ok);
    assert!(matches!(node.kind, NodeKind::AbsolutePathPatternLiteral { .. }));

    let (node, ok) = quill_parse::parse_url("https://example.com/index.html");
    assert!(ok);
    assert!(matches!(node.kind, NodeKind::UrlLiteral { .. }));

    let (_, ok) = quill_parse::parse_url("https://example .com");
    assert!(!ok);
}
