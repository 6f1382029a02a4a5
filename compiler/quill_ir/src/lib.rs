//! Quill IR — spans, tokens, the AST node model and traversal utilities.
//!
//! The parser crate (`quill_parse`) produces the types defined here:
//! a [`Node`] tree whose every node carries a [`Span`], an optional
//! [`quill_diagnostic::ParsingError`], and a parenthesization flag, plus a
//! flat [`Token`] buffer. Downstream consumers walk the tree with
//! [`walk`] / [`walk_with_exit`]; [`shift_spans`] is the only sanctioned
//! mutation after parse.

pub mod ast;
mod span;
mod token;
mod utils;
mod walk;

pub use ast::{
    kind_name, AssignmentOperator, BinaryOperator, ByteSliceBase, HyperscriptParsingResult,
    MarkupPatternQuantifier, Node, NodeBase, NodeKind, Quantifier, UnaryOperator,
};
pub use span::{Span, SpanError};
pub use token::{sort_tokens_by_span, Token, TokenKind, TokenSubKind};
pub use utils::{active_parameter_index, estimate_indentation_unit, interior_span};
pub use walk::{
    closest_scope_container, count_nodes, find_closest_ancestor,
    find_closest_top_level_statement, find_first_node, find_node_at_span,
    find_previous_statement, fmt_tree, shift_spans, walk, walk_with_exit, TraversalAction,
};
