//! AST traversal.
//!
//! A closure-based pre/post-order walk. Handlers receive the node, its
//! parent, and the full ancestor chain (outermost first); the nearest scope
//! container is found by scanning the chain with
//! [`Node::is_scope_container`]. There are no parent pointers in the tree —
//! the chain argument is the only way back up, which keeps nodes acyclic
//! and owner-only.

use crate::{Node, Span};
use smallvec::SmallVec;

/// What the walk should do after a visit.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum TraversalAction {
    /// Descend into children.
    Continue,
    /// Skip the node's subtree.
    Prune,
    /// Abort the whole walk.
    Stop,
}

enum WalkState {
    Running,
    Stopped,
}

/// Pre-order walk. `enter` is called before a node's children.
pub fn walk<'a, F>(node: &'a Node, enter: &mut F)
where
    F: FnMut(&'a Node, Option<&'a Node>, &[&'a Node]) -> TraversalAction,
{
    let mut chain: SmallVec<[&Node; 16]> = SmallVec::new();
    walk_rec(node, &mut chain, enter, &mut no_exit());
}

/// Pre- and post-order walk. `exit` is called after a node's children,
/// unless the subtree was pruned.
pub fn walk_with_exit<'a, F, G>(node: &'a Node, enter: &mut F, exit: &mut G)
where
    F: FnMut(&'a Node, Option<&'a Node>, &[&'a Node]) -> TraversalAction,
    G: FnMut(&'a Node, Option<&'a Node>, &[&'a Node]) -> TraversalAction,
{
    let mut chain: SmallVec<[&Node; 16]> = SmallVec::new();
    walk_rec(node, &mut chain, enter, &mut Some(exit));
}

fn no_exit<'a>() -> Option<fn(&'a Node, Option<&'a Node>, &[&'a Node]) -> TraversalAction> {
    None
}

fn walk_rec<'a, F, G>(
    node: &'a Node,
    chain: &mut SmallVec<[&'a Node; 16]>,
    enter: &mut F,
    exit: &mut Option<G>,
) -> WalkState
where
    F: FnMut(&'a Node, Option<&'a Node>, &[&'a Node]) -> TraversalAction,
    G: FnMut(&'a Node, Option<&'a Node>, &[&'a Node]) -> TraversalAction,
{
    let parent = chain.last().copied();
    match enter(node, parent, chain) {
        TraversalAction::Stop => return WalkState::Stopped,
        TraversalAction::Prune => return WalkState::Running,
        TraversalAction::Continue => {}
    }

    chain.push(node);
    for child in node.children() {
        if let WalkState::Stopped = walk_rec(child, chain, enter, exit) {
            chain.pop();
            return WalkState::Stopped;
        }
    }
    chain.pop();

    if let Some(exit) = exit {
        if exit(node, parent, chain) == TraversalAction::Stop {
            return WalkState::Stopped;
        }
    }
    WalkState::Running
}

/// Nearest ancestor (innermost first) that opens a scope.
pub fn closest_scope_container<'a>(chain: &[&'a Node]) -> Option<&'a Node> {
    chain.iter().rev().find(|n| n.is_scope_container()).copied()
}

/// Number of nodes in the subtree, the root included.
pub fn count_nodes(node: &Node) -> usize {
    let mut count = 0;
    walk(node, &mut |_, _, _| {
        count += 1;
        TraversalAction::Continue
    });
    count
}

/// First node (pre-order) matching the predicate.
pub fn find_first_node<'a>(root: &'a Node, pred: impl Fn(&Node) -> bool) -> Option<&'a Node> {
    let mut found = None;
    walk(root, &mut |node, _, _| {
        if pred(node) {
            found = Some(node);
            return TraversalAction::Stop;
        }
        TraversalAction::Continue
    });
    found
}

/// First node whose span equals `span` exactly.
pub fn find_node_at_span<'a>(root: &'a Node, span: Span) -> Option<&'a Node> {
    let mut found = None;
    walk(root, &mut |node, _, _| {
        if node.span() == span {
            found = Some(node);
            return TraversalAction::Stop;
        }
        // No descendant of a disjoint node can match.
        if !node.span().contains_span(span) {
            return TraversalAction::Prune;
        }
        TraversalAction::Continue
    });
    found
}

/// Innermost ancestor matching the predicate, optionally at most
/// `max_distance` levels above the visited node (0 = direct parent).
pub fn find_closest_ancestor<'a>(
    chain: &[&'a Node],
    pred: impl Fn(&Node) -> bool,
    max_distance: Option<usize>,
) -> Option<&'a Node> {
    for (distance, ancestor) in chain.iter().rev().enumerate() {
        if let Some(max) = max_distance {
            if distance > max {
                return None;
            }
        }
        if pred(ancestor) {
            return Some(ancestor);
        }
    }
    None
}

/// The chunk-level statement whose span contains `offset`.
pub fn find_closest_top_level_statement<'a>(chunk: &'a Node, offset: u32) -> Option<&'a Node> {
    let crate::NodeKind::Chunk { statements, .. } = &chunk.kind else {
        return None;
    };
    statements.iter().find(|stmt| stmt.span().contains(offset))
}

/// The statement preceding `span` in the innermost enclosing block, chunk
/// or embedded module of the ancestor chain.
pub fn find_previous_statement<'a>(chain: &[&'a Node], span: Span) -> Option<&'a Node> {
    for ancestor in chain.iter().rev() {
        let statements = match &ancestor.kind {
            crate::NodeKind::Block { statements }
            | crate::NodeKind::Chunk { statements, .. }
            | crate::NodeKind::EmbeddedModule { statements, .. } => statements,
            _ => continue,
        };
        let mut previous = None;
        for stmt in statements {
            if stmt.span().end <= span.start {
                previous = Some(stmt);
            } else {
                break;
            }
        }
        return previous;
    }
    None
}

/// Shift every span in the subtree by a constant rune delta.
///
/// The only sanctioned in-place mutation of a parsed tree; used when a
/// sub-expression parsed from an extracted string is re-embedded at an
/// offset of the outer source.
pub fn shift_spans(node: &mut Node, delta: i64) {
    node.base.span = node.base.span.shifted(delta);
    for child in node.children_mut() {
        shift_spans(child, delta);
    }
}

/// Render the subtree as an indented kind/span listing, for debugging.
pub fn fmt_tree(root: &Node) -> String {
    use std::fmt::Write;
    let mut out = String::new();
    walk(root, &mut |node, _, chain| {
        for _ in 0..chain.len() {
            out.push_str("  ");
        }
        let _ = writeln!(out, "{} {}", node.kind_name(), node.span());
        TraversalAction::Continue
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NodeKind, Span};
    use pretty_assertions::assert_eq;

    fn int(start: u32, value: i64) -> Node {
        Node::new(
            Span::new(start, start + 1),
            NodeKind::IntLiteral {
                value,
                raw: value.to_string().into(),
            },
        )
    }

    fn list(span: Span, elements: Vec<Node>) -> Node {
        Node::new(span, NodeKind::ListLiteral { elements })
    }

    #[test]
    fn walk_visits_pre_order() {
        let tree = list(
            Span::new(0, 10),
            vec![int(1, 1), list(Span::new(3, 8), vec![int(4, 2)])],
        );
        let mut names = Vec::new();
        walk(&tree, &mut |node, _, _| {
            names.push(node.kind_name());
            TraversalAction::Continue
        });
        assert_eq!(
            names,
            vec!["ListLiteral", "IntLiteral", "ListLiteral", "IntLiteral"]
        );
    }

    #[test]
    fn prune_skips_subtree() {
        let tree = list(
            Span::new(0, 10),
            vec![list(Span::new(1, 8), vec![int(2, 1)]), int(9, 2)],
        );
        let mut count = 0;
        walk(&tree, &mut |node, parent, _| {
            count += 1;
            if parent.is_some() && matches!(node.kind, NodeKind::ListLiteral { .. }) {
                return TraversalAction::Prune;
            }
            TraversalAction::Continue
        });
        // root + inner list (pruned) + trailing int
        assert_eq!(count, 3);
    }

    #[test]
    fn stop_aborts() {
        let tree = list(Span::new(0, 10), vec![int(1, 1), int(3, 2), int(5, 3)]);
        let mut count = 0;
        walk(&tree, &mut |_, _, _| {
            count += 1;
            if count == 2 {
                return TraversalAction::Stop;
            }
            TraversalAction::Continue
        });
        assert_eq!(count, 2);
    }

    #[test]
    fn exit_handler_runs_after_children() {
        let tree = list(Span::new(0, 4), vec![int(1, 1)]);
        let events = std::cell::RefCell::new(Vec::new());
        walk_with_exit(
            &tree,
            &mut |node, _, _| {
                events.borrow_mut().push(format!("enter {}", node.kind_name()));
                TraversalAction::Continue
            },
            &mut |node, _, _| {
                events.borrow_mut().push(format!("exit {}", node.kind_name()));
                TraversalAction::Continue
            },
        );
        assert_eq!(
            events.into_inner(),
            vec![
                "enter ListLiteral",
                "enter IntLiteral",
                "exit IntLiteral",
                "exit ListLiteral"
            ]
        );
    }

    #[test]
    fn find_at_span_and_count() {
        let tree = list(Span::new(0, 10), vec![int(1, 1), int(3, 2)]);
        assert_eq!(count_nodes(&tree), 3);
        let found = find_node_at_span(&tree, Span::new(3, 4)).map(|n| n.kind_name());
        assert_eq!(found, Some("IntLiteral"));
        assert!(find_node_at_span(&tree, Span::new(7, 9)).is_none());
    }

    #[test]
    fn previous_statement() {
        let block = Node::new(
            Span::new(0, 10),
            NodeKind::Block {
                statements: vec![int(1, 1), int(5, 2)],
            },
        );
        let chain = [&block];
        let prev = find_previous_statement(&chain, Span::new(5, 6));
        assert_eq!(prev.map(|n| n.span()), Some(Span::new(1, 2)));
        assert!(find_previous_statement(&chain, Span::new(1, 2)).is_none());
    }

    #[test]
    fn shift_spans_moves_all() {
        let mut tree = list(Span::new(0, 4), vec![int(1, 1)]);
        shift_spans(&mut tree, 10);
        assert_eq!(tree.span(), Span::new(10, 14));
        assert_eq!(tree.children()[0].span(), Span::new(11, 12));
    }
}
