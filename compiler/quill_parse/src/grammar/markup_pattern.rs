//! Markup patterns: the pattern counterpart of markup expressions.
//!
//! Differences from markup expressions: attribute values are patterns,
//! opening tags may carry a quantifier (`?`, `+`, `*`) right after the
//! name, and a `*` in content position is a wildcard matching any
//! subtree.

use crate::chars::{is_alpha, is_ident_char};
use crate::Parser;
use quill_diagnostic::ParsingError;
use quill_ir::{MarkupPatternQuantifier, Node, NodeKind, Span, Token, TokenKind};

const UNTERMINATED_MARKUP_PATTERN_MISSING_TOP_ELEM_NAME: &str =
    "unterminated markup pattern: missing element name after '<'";
const UNTERMINATED_OPENING_TAG_MISSING_CLOSING: &str =
    "unterminated opening markup pattern tag: missing '>'";
const UNTERMINATED_CLOSING_TAG_MISSING_DELIM: &str =
    "unterminated closing markup pattern tag: missing '>'";
const ATTRIBUTE_NAME_SHOULD_BE_IDENT: &str =
    "a markup pattern attribute name should be an identifier";

impl Parser {
    /// `%<tag …>` markup pattern; `start` is the index of the `%`, the
    /// cursor is on `<`.
    pub(crate) fn parse_markup_pattern_expression(&mut self, start: u32) -> Node {
        self.check_cancellation();

        if !self.peek(1).is_some_and(is_alpha) && !self.peek(1).is_some_and(|r| r == '*') {
            self.push_token(TokenKind::LessThan, Span::new(self.pos(), self.pos() + 1));
            self.i += 1;
            return Node::with_error(
                self.span_from(start),
                NodeKind::MarkupPatternExpression {
                    element: Box::new(Node::new(Span::point(self.pos()), NodeKind::UnknownNode)),
                },
                ParsingError::unspecified(UNTERMINATED_MARKUP_PATTERN_MISSING_TOP_ELEM_NAME),
            );
        }

        let element = self.parse_markup_pattern_element();
        Node::new(
            self.span_from(start),
            NodeKind::MarkupPatternExpression {
                element: Box::new(element),
            },
        )
    }

    fn parse_markup_pattern_element(&mut self) -> Node {
        self.check_cancellation();

        let start = self.pos();
        self.push_token(TokenKind::LessThan, Span::new(start, start + 1));
        self.i += 1;

        // tag name
        let name_start = self.pos();
        while self.cur().is_some_and(is_ident_char) {
            self.i += 1;
        }
        let tag_name = self.slice_str(name_start, self.pos());
        let opening_ident = Node::new(
            self.span_from(name_start),
            NodeKind::IdentifierLiteral {
                name: tag_name.clone().into(),
            },
        );

        // quantifier directly after the name
        let mut quantifier = MarkupPatternQuantifier::One;
        if let Some(modifier @ ('?' | '+' | '*')) = self.cur() {
            quantifier = match modifier {
                '?' => MarkupPatternQuantifier::Optional,
                '+' => MarkupPatternQuantifier::OneOrMore,
                _ => MarkupPatternQuantifier::ZeroOrMore,
            };
            self.tokens.push(Token::with_raw(
                TokenKind::OccurrenceModifier,
                Span::new(self.pos(), self.pos() + 1),
                modifier.to_string(),
            ));
            self.i += 1;
        }

        self.eat_space_newline_comment();

        // attributes (values are patterns)
        let mut attributes = Vec::new();
        let in_pattern_save = self.in_pattern;

        while let Some(r) = self.cur() {
            if r == '>' || r == '/' || r == '<' {
                break;
            }

            self.in_pattern = false;
            let (name, is_missing) = self.parse_expression_inner(false);
            self.in_pattern = in_pattern_save;
            if is_missing {
                attributes.push(Node::new(
                    name.span(),
                    NodeKind::MarkupPatternAttribute {
                        name: Box::new(name),
                        value: None,
                    },
                ));
                break;
            }

            let mut name = name;
            if !matches!(name.kind, NodeKind::IdentifierLiteral { .. }) {
                name.set_error_if_none(ParsingError::unspecified(ATTRIBUTE_NAME_SHOULD_BE_IDENT));
            }

            if self.cur_is('=') {
                self.push_token(TokenKind::Equal, Span::new(self.pos(), self.pos() + 1));
                self.i += 1;
                self.in_pattern = true;
                let (value, value_missing) = self.parse_expression_inner(false);
                self.in_pattern = in_pattern_save;
                attributes.push(Node::new(
                    Span::new(name.span().start, self.pos()),
                    NodeKind::MarkupPatternAttribute {
                        name: Box::new(name),
                        value: Some(Box::new(value)),
                    },
                ));
                if value_missing {
                    break;
                }
            } else {
                attributes.push(Node::new(
                    Span::new(name.span().start, self.pos()),
                    NodeKind::MarkupPatternAttribute {
                        name: Box::new(name),
                        value: None,
                    },
                ));
            }
            self.eat_space_newline_comment();
        }

        // unterminated opening tag
        if !matches!(self.cur(), Some('>' | '/')) {
            let mut opening = Node::new(
                Span::new(start, self.pos()),
                NodeKind::MarkupPatternOpeningTag {
                    name: Some(Box::new(opening_ident)),
                    attributes,
                    quantifier,
                    self_closing: false,
                },
            );
            opening.base.err = Some(ParsingError::unspecified(
                UNTERMINATED_OPENING_TAG_MISSING_CLOSING,
            ));
            return Node::new(
                self.span_from(start),
                NodeKind::MarkupPatternElement {
                    opening: Box::new(opening),
                    children: vec![],
                    closing: None,
                },
            );
        }

        // self-closing
        if self.cur_is('/') && self.peek_is(1, '>') {
            self.push_token(
                TokenKind::SelfClosingTagTerminator,
                Span::new(self.pos(), self.pos() + 2),
            );
            self.i += 2;
            let opening = Node::new(
                Span::new(start, self.pos()),
                NodeKind::MarkupPatternOpeningTag {
                    name: Some(Box::new(opening_ident)),
                    attributes,
                    quantifier,
                    self_closing: true,
                },
            );
            return Node::new(
                self.span_from(start),
                NodeKind::MarkupPatternElement {
                    opening: Box::new(opening),
                    children: vec![],
                    closing: None,
                },
            );
        }

        self.push_token(TokenKind::GreaterThan, Span::new(self.pos(), self.pos() + 1));
        self.i += 1;
        let opening = Node::new(
            Span::new(start, self.pos()),
            NodeKind::MarkupPatternOpeningTag {
                name: Some(Box::new(opening_ident)),
                attributes,
                quantifier,
                self_closing: false,
            },
        );

        // children: text, nested elements, interpolations, wildcards
        let mut children = Vec::new();
        let mut child_start = self.pos();

        loop {
            let Some(r) = self.cur() else { break };
            if r == '<' && self.peek_is(1, '/') {
                break;
            }
            match r {
                '*' => {
                    children.push(self.markup_pattern_text(child_start, self.pos()));
                    self.tokens.push(Token::with_raw(
                        TokenKind::OccurrenceModifier,
                        Span::new(self.pos(), self.pos() + 1),
                        "*",
                    ));
                    children.push(Node::new(
                        Span::new(self.pos(), self.pos() + 1),
                        NodeKind::MarkupPatternWildcard,
                    ));
                    self.i += 1;
                    child_start = self.pos();
                }
                '<' => {
                    children.push(self.markup_pattern_text(child_start, self.pos()));
                    children.push(self.parse_markup_pattern_element());
                    child_start = self.pos();
                }
                _ => self.i += 1,
            }
        }

        children.push(self.markup_pattern_text(child_start, self.pos()));

        if !self.cur_is('<') {
            return Node::with_error(
                self.span_from(start),
                NodeKind::MarkupPatternElement {
                    opening: Box::new(opening),
                    children,
                    closing: None,
                },
                ParsingError::unspecified(crate::errors::fmt_expected_closing_tag(&tag_name)),
            );
        }

        // closing tag
        let closing_start = self.pos();
        self.push_token(
            TokenKind::EndTagOpenDelimiter,
            Span::new(self.pos(), self.pos() + 2),
        );
        self.i += 2;

        let closing_name_start = self.pos();
        while self.cur().is_some_and(is_ident_char) {
            self.i += 1;
        }
        let closing_name = self.slice_str(closing_name_start, self.pos());
        let mut closing_err = None;
        if closing_name != tag_name {
            closing_err = Some(ParsingError::unspecified(
                crate::errors::fmt_expected_closing_tag(&tag_name),
            ));
        }

        let name_node = Node::new(
            self.span_from(closing_name_start),
            NodeKind::IdentifierLiteral {
                name: closing_name.into(),
            },
        );

        if !self.cur_is('>') {
            closing_err.get_or_insert_with(|| {
                ParsingError::unspecified(UNTERMINATED_CLOSING_TAG_MISSING_DELIM)
            });
        } else {
            self.push_token(TokenKind::GreaterThan, Span::new(self.pos(), self.pos() + 1));
            self.i += 1;
        }

        let mut closing = Node::new(
            self.span_from(closing_start),
            NodeKind::MarkupPatternClosingTag {
                name: Some(Box::new(name_node)),
            },
        );
        closing.base.err = closing_err;

        Node::new(
            self.span_from(start),
            NodeKind::MarkupPatternElement {
                opening: Box::new(opening),
                children,
                closing: Some(Box::new(closing)),
            },
        )
    }

    fn markup_pattern_text(&mut self, start: u32, end: u32) -> Node {
        let raw = self.slice_str(start, end);
        self.tokens.push(Token::with_raw(
            TokenKind::MarkupTextSlice,
            Span::new(start, end),
            raw.clone(),
        ));
        Node::new(
            Span::new(start, end),
            NodeKind::MarkupText {
                value: raw.clone().into(),
                raw: raw.into(),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParserOptions;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> Node {
        let mut p = Parser::new(source, &ParserOptions::default());
        p.parse_expression_inner(false).0
    }

    #[test]
    fn simple_pattern() {
        let node = parse("%<div class=\"a\"></div>");
        match &node.kind {
            NodeKind::MarkupPatternExpression { element } => match &element.kind {
                NodeKind::MarkupPatternElement { opening, .. } => {
                    assert!(matches!(
                        opening.kind,
                        NodeKind::MarkupPatternOpeningTag {
                            quantifier: MarkupPatternQuantifier::One,
                            ..
                        }
                    ));
                }
                other => panic!("expected pattern element, got {other:?}"),
            },
            other => panic!("expected markup pattern, got {other:?}"),
        }
        assert!(!node.error_at_any_depth());
    }

    #[test]
    fn quantifier_after_name() {
        let node = parse("%<li*></li>");
        match &node.kind {
            NodeKind::MarkupPatternExpression { element } => match &element.kind {
                NodeKind::MarkupPatternElement { opening, .. } => {
                    assert!(matches!(
                        opening.kind,
                        NodeKind::MarkupPatternOpeningTag {
                            quantifier: MarkupPatternQuantifier::ZeroOrMore,
                            ..
                        }
                    ));
                }
                other => panic!("expected pattern element, got {other:?}"),
            },
            other => panic!("expected markup pattern, got {other:?}"),
        }
    }

    #[test]
    fn wildcard_child() {
        let node = parse("%<div>*</div>");
        match &node.kind {
            NodeKind::MarkupPatternExpression { element } => match &element.kind {
                NodeKind::MarkupPatternElement { children, .. } => {
                    assert!(children
                        .iter()
                        .any(|c| matches!(c.kind, NodeKind::MarkupPatternWildcard)));
                }
                other => panic!("expected pattern element, got {other:?}"),
            },
            other => panic!("expected markup pattern, got {other:?}"),
        }
        assert!(!node.error_at_any_depth());
    }

    #[test]
    fn mismatched_closing_tag() {
        let node = parse("%<div></span>");
        assert!(node.error_at_any_depth());
    }

    #[test]
    fn attribute_value_is_a_pattern() {
        let node = parse("%<div class=str></div>");
        let mut found_pattern_value = false;
        quill_ir::walk(&node, &mut |n, _, _| {
            if matches!(n.kind, NodeKind::PatternIdentifierLiteral { .. }) {
                found_pattern_value = true;
            }
            quill_ir::TraversalAction::Continue
        });
        assert!(found_pattern_value);
        assert_eq!(node.error_at_any_depth(), false);
    }
}
