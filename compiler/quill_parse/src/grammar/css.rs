//! CSS selector expressions: `s!div.cls > #id:hover::before[attr=val]`.
//!
//! The selector runs to the end of the line; elements are combinators,
//! type/class/id selectors, pseudo classes/elements and attribute
//! selectors.

use crate::chars::{is_ident_char, is_ident_first_char, is_non_space_css_combinator};
use crate::Parser;
use quill_diagnostic::ParsingError;
use quill_ir::{Node, NodeKind, Span, TokenKind};

const INVALID_CSS_SELECTOR: &str = "invalid CSS selector";
const UNTERMINATED_ATTRIBUTE_SELECTOR: &str =
    "unterminated CSS attribute selector: missing closing bracket ']'";
const EMPTY_CSS_SELECTOR: &str = "a CSS selector should contain at least one element";

impl Parser {
    /// Top-level selector; `start` is the index of the `s` of `s!`, the
    /// cursor is just after `!`.
    pub(crate) fn parse_top_css_selector(&mut self, start: u32) -> Node {
        self.check_cancellation();

        self.push_token(TokenKind::CssSelectorPrefix, Span::new(start, start + 2));

        let mut elements = Vec::new();
        let mut pending_space = false;

        loop {
            let Some(r) = self.cur() else { break };
            if r == '\n' {
                break;
            }
            if r == ' ' || r == '\t' {
                pending_space = true;
                self.i += 1;
                continue;
            }

            if is_non_space_css_combinator(r) {
                elements.push(Node::new(
                    Span::new(self.pos(), self.pos() + 1),
                    NodeKind::CssCombinator {
                        name: r.to_string().into(),
                    },
                ));
                pending_space = false;
                self.i += 1;
                continue;
            }

            // a space between two simple selectors is the descendant
            // combinator
            if pending_space && !elements.is_empty() {
                elements.push(Node::new(
                    Span::point(self.pos()),
                    NodeKind::CssCombinator { name: " ".into() },
                ));
            }
            pending_space = false;

            let Some(element) = self.parse_css_selector_element() else {
                break;
            };
            elements.push(element);
        }

        let mut node = Node::new(
            self.span_from(start),
            NodeKind::CssSelectorExpression { elements },
        );
        if matches!(&node.kind, NodeKind::CssSelectorExpression { elements } if elements.is_empty())
        {
            node.base.err = Some(ParsingError::unspecified(EMPTY_CSS_SELECTOR));
        }
        node
    }

    /// One simple selector; `None` ends the selector expression.
    fn parse_css_selector_element(&mut self) -> Option<Node> {
        let start = self.pos();
        let r = self.cur()?;

        match r {
            '.' if self.peek(1).is_some_and(is_ident_first_char) => {
                self.i += 1;
                let name = self.eat_css_name();
                Some(Node::new(
                    self.span_from(start),
                    NodeKind::CssClassSelector { name: name.into() },
                ))
            }
            '#' if self.peek(1).is_some_and(is_ident_first_char) => {
                self.i += 1;
                let name = self.eat_css_name();
                Some(Node::new(
                    self.span_from(start),
                    NodeKind::CssIdSelector { name: name.into() },
                ))
            }
            ':' => {
                let double = self.peek_is(1, ':');
                self.i += if double { 2 } else { 1 };
                let name = self.eat_css_name();
                let mut node = Node::new(
                    self.span_from(start),
                    if double {
                        NodeKind::CssPseudoElementSelector { name: name.clone().into() }
                    } else {
                        NodeKind::CssPseudoClassSelector { name: name.clone().into() }
                    },
                );
                if name.is_empty() {
                    node.base.err = Some(ParsingError::unspecified(INVALID_CSS_SELECTOR));
                }
                Some(node)
            }
            '[' => Some(self.parse_css_attribute_selector(start)),
            '*' => {
                self.i += 1;
                Some(Node::new(
                    self.span_from(start),
                    NodeKind::CssTypeSelector { name: "*".into() },
                ))
            }
            r if is_ident_first_char(r) => {
                let name = self.eat_css_name();
                Some(Node::new(
                    self.span_from(start),
                    NodeKind::CssTypeSelector { name: name.into() },
                ))
            }
            _ => None,
        }
    }

    fn eat_css_name(&mut self) -> String {
        let start = self.pos();
        while self.cur().is_some_and(is_ident_char) {
            self.i += 1;
        }
        self.slice_str(start, self.pos())
    }

    /// `[attr]`, `[attr=value]`, `[attr~=value]`, …
    fn parse_css_attribute_selector(&mut self, start: u32) -> Node {
        self.i += 1; // '['
        let name_start = self.pos();
        while self.cur().is_some_and(is_ident_char) {
            self.i += 1;
        }
        let attribute_name = Node::new(
            self.span_from(name_start),
            NodeKind::IdentifierLiteral {
                name: self.slice_str(name_start, self.pos()).into(),
            },
        );

        let mut matcher = String::new();
        while self
            .cur()
            .is_some_and(|r| matches!(r, '=' | '~' | '|' | '^' | '$' | '*'))
        {
            #[allow(clippy::unwrap_used)] // guarded by the loop condition
            matcher.push(self.cur().unwrap());
            self.i += 1;
        }

        let mut value = None;
        if !matcher.is_empty() && !self.cur_is(']') && !self.eof() {
            let (parsed, _) = self.parse_expression_inner(false);
            value = Some(Box::new(parsed));
        }

        let mut err = None;
        if self.cur_is(']') {
            self.i += 1;
        } else {
            err = Some(ParsingError::unspecified(UNTERMINATED_ATTRIBUTE_SELECTOR));
        }

        let mut node = Node::new(
            self.span_from(start),
            NodeKind::CssAttributeSelector {
                attribute_name: Box::new(attribute_name),
                matcher: matcher.into(),
                value,
            },
        );
        if let Some(err) = err {
            node.base.err = Some(err);
        }
        node
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
    fn compound_selector() {
        let node = parse("s!div.red > #main:hover::before");
        match &node.kind {
            NodeKind::CssSelectorExpression { elements } => {
                let kinds: Vec<&str> = elements.iter().map(|e| e.kind_name()).collect();
                assert_eq!(
                    kinds,
                    vec![
                        "CssTypeSelector",
                        "CssClassSelector",
                        "CssCombinator",
                        "CssIdSelector",
                        "CssPseudoClassSelector",
                        "CssPseudoElementSelector",
                    ]
                );
            }
            other => panic!("expected selector expression, got {other:?}"),
        }
        assert!(!node.error_at_any_depth());
    }

    #[test]
    fn attribute_selector() {
        let node = parse("s!input[type=\"text\"]");
        let mut found = false;
        quill_ir::walk(&node, &mut |n, _, _| {
            if let NodeKind::CssAttributeSelector { matcher, value, .. } = &n.kind {
                assert_eq!(&**matcher, "=");
                assert!(value.is_some());
                found = true;
            }
            quill_ir::TraversalAction::Continue
        });
        assert!(found);
    }

    #[test]
    fn descendant_combinator() {
        let node = parse("s!ul li");
        match &node.kind {
            NodeKind::CssSelectorExpression { elements } => {
                assert!(elements
                    .iter()
                    .any(|e| matches!(&e.kind, NodeKind::CssCombinator { name } if &**name == " ")));
            }
            other => panic!("expected selector expression, got {other:?}"),
        }
    }

    #[test]
    fn empty_selector_is_an_error() {
        let node = parse("s!");
        assert!(node.base.err.is_some());
    }
}
