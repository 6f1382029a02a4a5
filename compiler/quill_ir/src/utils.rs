//! Incidental AST utilities: indentation estimation, interior spans,
//! active call parameter lookup.

use crate::{walk, Node, NodeKind, Span, TraversalAction};
use rustc_hash::FxHashMap;

/// Candidate indentation units, most common first for tie-breaking.
const INDENT_UNITS: [&str; 4] = ["\t", "    ", "  ", "   "];

/// Estimate the indentation unit of a parsed source.
///
/// Inspects the first statement of top-level containers — chunk, function
/// bodies, if/for/walk/switch/match blocks — and returns the most frequent
/// unit among a tab and 2/3/4 spaces. Defaults to four spaces when nothing
/// is indented.
pub fn estimate_indentation_unit(runes: &[char], chunk: &Node) -> &'static str {
    let mut occurrences: FxHashMap<&'static str, u32> = FxHashMap::default();

    walk(chunk, &mut |node, _, _| {
        let statements = match &node.kind {
            NodeKind::Block { statements }
            | NodeKind::EmbeddedModule { statements, .. }
            | NodeKind::QuotedStatements { statements } => statements,
            NodeKind::Chunk { statements, .. } => statements,
            _ => return TraversalAction::Continue,
        };
        for stmt in statements {
            if let Some(unit) = leading_indent_unit(runes, stmt.span()) {
                *occurrences.entry(unit).or_insert(0) += 1;
            }
        }
        TraversalAction::Continue
    });

    let mut best = "    ";
    let mut best_count = 0u32;
    for unit in INDENT_UNITS {
        let count = occurrences.get(unit).copied().unwrap_or(0);
        if count > best_count {
            best = unit;
            best_count = count;
        }
    }
    best
}

/// The indentation unit of the line a span starts on, if the line starts
/// with one.
fn leading_indent_unit(runes: &[char], span: Span) -> Option<&'static str> {
    let mut line_start = span.start as usize;
    while line_start > 0 && runes.get(line_start - 1).copied() != Some('\n') {
        line_start -= 1;
    }
    if line_start == span.start as usize {
        // Statement at column one: not indented.
        return None;
    }
    let leading: &[char] = &runes[line_start..span.start as usize];
    if leading[0] == '\t' {
        return Some("\t");
    }
    let space_count = leading.iter().take_while(|r| **r == ' ').count();
    match space_count {
        0 | 1 => None,
        2 => Some("  "),
        3 => Some("   "),
        _ => Some("    "),
    }
}

/// Span from just after the opening delimiter of an object-like node to
/// just before its closing delimiter.
///
/// Returns `None` for non-object-like nodes and for unterminated ones
/// (the closing delimiter is not part of the span then).
pub fn interior_span(node: &Node, runes: &[char]) -> Option<Span> {
    let opening_len: u32 = match &node.kind {
        // `{` and `:{`-family two-rune openers
        NodeKind::ObjectLiteral { .. } | NodeKind::ObjectPatternLiteral { .. } => {
            if runes.get(node.span().start as usize).copied() == Some('%') {
                2
            } else {
                1
            }
        }
        NodeKind::RecordLiteral { .. }
        | NodeKind::RecordPatternLiteral { .. }
        | NodeKind::DictionaryLiteral { .. } => 2,
        _ => return None,
    };
    let span = node.span();
    let last = runes.get(span.end.checked_sub(1)? as usize).copied();
    if last != Some('}') {
        return None;
    }
    let start = span.start + opening_len;
    let end = span.end - 1;
    (start <= end).then_some(Span::new(start, end))
}

/// Which argument of a call the cursor is on.
///
/// `span` is the cursor (usually empty). Returns the index of the argument
/// containing the cursor, or the index the next argument would have when
/// the cursor sits after a trailing comma, or `None` when the cursor is
/// outside the argument list.
pub fn active_parameter_index(call: &Node, runes: &[char], span: Span) -> Option<usize> {
    let NodeKind::CallExpression {
        callee, arguments, ..
    } = &call.kind
    else {
        return None;
    };
    if span.start <= callee.span().end || span.start > call.span().end {
        return None;
    }
    for (index, arg) in arguments.iter().enumerate() {
        if span.start <= arg.span().end {
            return Some(index);
        }
    }
    // After the last argument: on it, or past a trailing comma.
    let last_end = arguments.last().map_or(callee.span().end + 1, |a| a.span().end);
    let trailing = &runes[last_end as usize..(span.start as usize).min(runes.len())];
    if trailing.iter().any(|r| *r == ',') {
        Some(arguments.len())
    } else if arguments.is_empty() {
        Some(0)
    } else {
        Some(arguments.len() - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn runes(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn int(start: u32, end: u32) -> Node {
        Node::new(
            Span::new(start, end),
            NodeKind::IntLiteral {
                value: 1,
                raw: "1".into(),
            },
        )
    }

    #[test]
    fn indentation_estimation_prefers_most_frequent() {
        let src = "if x {\n  a = 1\n  b = 2\n}";
        let block = Node::new(
            Span::new(5, 24),
            NodeKind::Block {
                statements: vec![int(9, 14), int(18, 23)],
            },
        );
        let chunk = Node::new(
            Span::new(0, 24),
            NodeKind::Chunk {
                global_constant_declarations: None,
                includable_chunk_desc: None,
                preinit: None,
                manifest: None,
                statements: vec![Node::new(
                    Span::new(0, 24),
                    NodeKind::IfStatement {
                        test: Box::new(int(3, 4)),
                        consequent: Some(Box::new(block)),
                        alternate: None,
                    },
                )],
            },
        );
        assert_eq!(estimate_indentation_unit(&runes(src), &chunk), "  ");
    }

    #[test]
    fn interior_span_of_object() {
        let src = "{a: 1}";
        let node = Node::new(Span::new(0, 6), NodeKind::ObjectLiteral { properties: vec![] });
        assert_eq!(interior_span(&node, &runes(src)), Some(Span::new(1, 5)));
    }

    #[test]
    fn interior_span_of_unterminated_object_is_none() {
        let src = "{a: 1";
        let node = Node::new(Span::new(0, 5), NodeKind::ObjectLiteral { properties: vec![] });
        assert_eq!(interior_span(&node, &runes(src)), None);
    }

    #[test]
    fn active_parameter_in_call() {
        // f(1, 2)
        let src = "f(1, 2)";
        let call = Node::new(
            Span::new(0, 7),
            NodeKind::CallExpression {
                callee: Box::new(Node::new(
                    Span::new(0, 1),
                    NodeKind::IdentifierLiteral { name: "f".into() },
                )),
                arguments: vec![int(2, 3), int(5, 6)],
                must: false,
                command_like: false,
            },
        );
        let runes = runes(src);
        assert_eq!(active_parameter_index(&call, &runes, Span::point(3)), Some(0));
        assert_eq!(active_parameter_index(&call, &runes, Span::point(6)), Some(1));
        assert_eq!(active_parameter_index(&call, &runes, Span::point(0)), None);
    }
}
