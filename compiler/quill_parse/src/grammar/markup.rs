//! Markup expressions (JSX-like): elements, attributes, text slices,
//! interpolations, raw-text elements, and the hyperscript attribute
//! shorthand.

use crate::chars::{is_alpha, is_ident_char};
use crate::Parser;
use quill_diagnostic::ParsingError;
use quill_ir::{Node, NodeKind, Span, Token, TokenKind, TokenSubKind};

const SCRIPT_TAG_NAME: &str = "script";
const STYLE_TAG_NAME: &str = "style";

const UNTERMINATED_MARKUP_MISSING_TOP_ELEM_NAME: &str =
    "unterminated markup expression: missing element name after '<'";
const UNTERMINATED_OPENING_TAG_MISSING_CLOSING: &str =
    "unterminated opening markup tag: missing '>'";
const UNTERMINATED_SELF_CLOSING_TAG: &str =
    "unterminated self-closing markup tag: missing '>' after '/'";
const UNTERMINATED_CLOSING_TAG_MISSING_DELIM: &str =
    "unterminated closing markup tag: missing '>'";
const INVALID_TAG_NAME: &str = "invalid tag name";
const ATTRIBUTE_NAME_SHOULD_BE_IDENT: &str =
    "a markup attribute name should be an identifier";
const EMPTY_MARKUP_INTERP: &str = "markup interpolation should not be empty";
const MARKUP_INTERP_SINGLE_EXPR: &str =
    "a markup interpolation should contain a single expression";
const UNTERMINATED_MARKUP_INTERP: &str = "unterminated markup interpolation";
const UNTERMINATED_HYPERSCRIPT_ATTRIBUTE: &str =
    "unterminated hyperscript attribute: missing closing brace '}'";

impl Parser {
    /// `ident<…>` markup expression; `namespace` is the leading identifier,
    /// the cursor is on `<`.
    pub(crate) fn parse_markup_expression(&mut self, namespace: Node) -> Node {
        self.check_cancellation();

        let start = namespace.span().start;

        if !self.peek(1).is_some_and(is_alpha) {
            self.push_token(TokenKind::LessThan, Span::new(self.pos(), self.pos() + 1));
            return Node::with_error(
                self.span_from(start),
                NodeKind::MarkupExpression {
                    namespace: Some(Box::new(namespace)),
                    element: Box::new(Node::new(Span::point(self.pos()), NodeKind::UnknownNode)),
                },
                ParsingError::unspecified(UNTERMINATED_MARKUP_MISSING_TOP_ELEM_NAME),
            );
        }

        let (element, _) = self.parse_markup_element();
        Node::new(
            self.span_from(start),
            NodeKind::MarkupExpression {
                namespace: Some(Box::new(namespace)),
                element: Box::new(element),
            },
        )
    }

    /// One markup element; the cursor is on `<`. The second return value
    /// is false when a descendant closed the wrong tag (the mismatch
    /// bubbles up so ancestors do not also report it).
    pub(crate) fn parse_markup_element(&mut self) -> (Node, bool) {
        self.check_cancellation();

        let start = self.pos();
        let mut matching_closing = true;

        self.push_token(TokenKind::LessThan, Span::new(start, start + 1));
        self.i += 1;

        // opening tag name
        let name_start = self.pos();
        self.i += 1;
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

        self.eat_space_newline_comment();

        let mut attributes: Vec<Node> = Vec::new();
        let mut opening_err: Option<ParsingError> = None;
        let raw_text_element = tag_name == SCRIPT_TAG_NAME || tag_name == STYLE_TAG_NAME;

        // attributes
        while let Some(r) = self.cur() {
            if r == '>' || r == '/' || (r == '<' && !self.peek_is(1, '{')) {
                break;
            }

            if r == '{' {
                attributes.push(self.parse_hyperscript_attribute_shorthand());
                self.eat_space_newline_comment();
                continue;
            }

            let (name, is_missing) = self.parse_expression_inner(false);
            if is_missing {
                attributes.push(Node::new(
                    name.span(),
                    NodeKind::MarkupAttribute {
                        name: Box::new(name),
                        value: None,
                    },
                ));
                break;
            }

            let mut name = name;
            if !matches!(
                name.kind,
                NodeKind::IdentifierLiteral { .. } | NodeKind::UnquotedRegion { .. }
            ) {
                name.set_error_if_none(ParsingError::unspecified(ATTRIBUTE_NAME_SHOULD_BE_IDENT));
            }
            if let Some(token) = self.tokens.iter_mut().rev().find(|t| t.span == name.span()) {
                token.sub_kind = Some(TokenSubKind::MarkupAttributeName);
            }

            if self.cur_is('=') {
                self.push_token(TokenKind::Equal, Span::new(self.pos(), self.pos() + 1));
                self.i += 1;
                let (value, value_missing) = self.parse_expression_inner(false);
                attributes.push(Node::new(
                    Span::new(name.span().start, self.pos()),
                    NodeKind::MarkupAttribute {
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
                    NodeKind::MarkupAttribute {
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
                NodeKind::MarkupOpeningTag {
                    name: Some(Box::new(opening_ident)),
                    attributes,
                    self_closing: false,
                },
            );
            opening.base.err = Some(ParsingError::unspecified(
                UNTERMINATED_OPENING_TAG_MISSING_CLOSING,
            ));
            return (
                Node::new(
                    self.span_from(start),
                    NodeKind::MarkupElement {
                        opening: Box::new(opening),
                        children: vec![],
                        closing: None,
                        raw_element_content: None,
                    },
                ),
                matching_closing,
            );
        }

        // self-closing tag
        if self.cur_is('/') {
            if !self.peek_is(1, '>') {
                self.push_token(TokenKind::Slash, Span::new(self.pos(), self.pos() + 1));
                self.i += 1;
                let mut opening = Node::new(
                    Span::new(start, self.pos()),
                    NodeKind::MarkupOpeningTag {
                        name: Some(Box::new(opening_ident)),
                        attributes,
                        self_closing: true,
                    },
                );
                opening.base.err =
                    Some(ParsingError::unspecified(UNTERMINATED_SELF_CLOSING_TAG));
                return (
                    Node::new(
                        self.span_from(start),
                        NodeKind::MarkupElement {
                            opening: Box::new(opening),
                            children: vec![],
                            closing: None,
                            raw_element_content: None,
                        },
                    ),
                    matching_closing,
                );
            }
            self.push_token(
                TokenKind::SelfClosingTagTerminator,
                Span::new(self.pos(), self.pos() + 2),
            );
            self.i += 2;
            let opening = Node::new(
                Span::new(start, self.pos()),
                NodeKind::MarkupOpeningTag {
                    name: Some(Box::new(opening_ident)),
                    attributes,
                    self_closing: true,
                },
            );
            return (
                Node::new(
                    self.span_from(start),
                    NodeKind::MarkupElement {
                        opening: Box::new(opening),
                        children: vec![],
                        closing: None,
                        raw_element_content: None,
                    },
                ),
                matching_closing,
            );
        }

        self.push_token(TokenKind::GreaterThan, Span::new(self.pos(), self.pos() + 1));
        self.i += 1;
        let opening = Node::new(
            Span::new(start, self.pos()),
            NodeKind::MarkupOpeningTag {
                name: Some(Box::new(opening_ident)),
                attributes,
                self_closing: false,
            },
        );

        // children
        let mut children = Vec::new();
        let mut raw_element_content: Option<Box<str>> = None;
        let mut element_err: Option<ParsingError> = None;

        if raw_text_element {
            // raw-text elements have a single verbatim slice ending at `</`
            let raw_start = self.pos();
            while !self.eof() && !(self.cur_is('<') && self.peek_is(1, '/')) {
                self.i += 1;
            }
            let raw = self.slice_str(raw_start, self.pos());
            self.tokens.push(Token::with_raw(
                TokenKind::MarkupTextSlice,
                self.span_from(raw_start),
                raw.clone(),
            ));
            raw_element_content = Some(raw.into());
        } else {
            let (parsed_children, all_matching) = self.parse_markup_children();
            children = parsed_children;
            matching_closing = all_matching;
        }

        if !self.cur_is('<') {
            if matching_closing {
                element_err = Some(ParsingError::unspecified(
                    crate::errors::fmt_expected_closing_tag(&tag_name),
                ));
            }
            let mut node = Node::new(
                self.span_from(start),
                NodeKind::MarkupElement {
                    opening: Box::new(opening),
                    children,
                    closing: None,
                    raw_element_content,
                },
            );
            node.base.err = element_err;
            return (node, matching_closing);
        }

        // closing tag
        let closing_start = self.pos();
        self.push_token(
            TokenKind::EndTagOpenDelimiter,
            Span::new(self.pos(), self.pos() + 2),
        );
        self.i += 2;

        let (closing_name, _) = self.parse_expression_inner(false);
        let mut closing_err = None;
        match &closing_name.kind {
            NodeKind::IdentifierLiteral { name } => {
                if **name != *tag_name {
                    closing_err = Some(ParsingError::unspecified(
                        crate::errors::fmt_expected_closing_tag(&tag_name),
                    ));
                    matching_closing = false;
                }
            }
            _ => {
                closing_err = Some(ParsingError::unspecified(INVALID_TAG_NAME));
            }
        }

        let mut closing = Node::new(
            Span::new(closing_start, self.pos()),
            NodeKind::MarkupClosingTag {
                name: Some(Box::new(closing_name)),
            },
        );

        if !self.cur_is('>') {
            closing.base.err = closing_err.or_else(|| {
                Some(ParsingError::unspecified(UNTERMINATED_CLOSING_TAG_MISSING_DELIM))
            });
            let node = Node::new(
                self.span_from(start),
                NodeKind::MarkupElement {
                    opening: Box::new(opening),
                    children,
                    closing: Some(Box::new(closing)),
                    raw_element_content,
                },
            );
            return (node, matching_closing);
        }

        self.push_token(TokenKind::GreaterThan, Span::new(self.pos(), self.pos() + 1));
        self.i += 1;
        closing.base.span.end = self.pos();
        closing.base.err = closing_err;

        (
            Node::new(
                self.span_from(start),
                NodeKind::MarkupElement {
                    opening: Box::new(opening),
                    children,
                    closing: Some(Box::new(closing)),
                    raw_element_content,
                },
            ),
            matching_closing,
        )
    }

    /// Children until `</`: text slices, `{…}` interpolations, nested
    /// elements, unquoted regions, annotated region headers.
    fn parse_markup_children(&mut self) -> (Vec<Node>, bool) {
        let mut children = Vec::new();
        let mut all_matching = true;
        let mut child_start = self.pos();

        loop {
            let Some(r) = self.cur() else { break };
            if r == '<' && self.peek_is(1, '/') {
                break;
            }

            match r {
                '{' => {
                    self.push_token(
                        TokenKind::MarkupInterpOpeningBracket,
                        Span::new(self.pos(), self.pos() + 1),
                    );
                    children.push(self.markup_text(child_start, self.pos()));
                    self.i += 1;
                    children.push(self.parse_markup_interpolation());
                    child_start = self.pos();
                }
                '<' if self.peek_is(1, '{') => {
                    children.push(self.markup_text(child_start, self.pos()));
                    children.push(self.parse_unquoted_region());
                    child_start = self.pos();
                }
                '<' => {
                    children.push(self.markup_text(child_start, self.pos()));
                    let (child, matching) = self.parse_markup_element();
                    children.push(child);
                    child_start = self.pos();
                    if !matching {
                        all_matching = false;
                    }
                }
                '@' if self.peek_is(1, '\'')
                    && self
                        .at(self.i.wrapping_sub(1))
                        .is_some_and(|prev| prev.is_whitespace()) =>
                {
                    children.push(self.markup_text(child_start, self.pos()));
                    children.push(self.parse_annotated_region_header());
                    child_start = self.pos();
                }
                _ => self.i += 1,
            }
        }

        children.push(self.markup_text(child_start, self.pos()));
        (children, all_matching)
    }

    fn markup_text(&mut self, start: u32, end: u32) -> Node {
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

    /// `{ expr }` interpolation; the opening brace was consumed. Supports
    /// nested `{}` pairs and the unparenthesized if/for expression forms.
    fn parse_markup_interpolation(&mut self) -> Node {
        let interpolation_start = self.pos();
        let mut depth = 0usize;

        while let Some(r) = self.cur() {
            match r {
                '{' => {
                    depth += 1;
                    self.i += 1;
                }
                '}' if depth > 0 => {
                    depth -= 1;
                    self.i += 1;
                }
                '}' => break,
                _ => self.i += 1,
            }
        }

        if self.eof() {
            let raw = self.slice_str(interpolation_start, self.pos());
            let mut node = Node::new(
                self.span_from(interpolation_start),
                NodeKind::MarkupText {
                    value: raw.clone().into(),
                    raw: raw.into(),
                },
            );
            node.base.err = Some(ParsingError::unspecified(UNTERMINATED_MARKUP_INTERP));
            return node;
        }

        let interpolation_excl_end = self.pos();
        self.push_token(
            TokenKind::MarkupInterpClosingBracket,
            Span::new(self.pos(), self.pos() + 1),
        );
        self.i += 1;

        let content = self.slice_str(interpolation_start, interpolation_excl_end);
        let span = Span::new(interpolation_start, interpolation_excl_end);

        if content.trim().is_empty() {
            return Node::with_error(
                span,
                NodeKind::MarkupInterpolation { expr: None },
                ParsingError::unspecified(EMPTY_MARKUP_INTERP),
            );
        }

        // parse the interpolation in place, with the buffer truncated to
        // its end
        let index_save = self.i;
        let len_save = self.len;
        self.len = interpolation_excl_end as usize;
        self.i = interpolation_start as usize;
        self.eat_space_newline();

        let expr = if self.keyword_ahead("if") {
            let keyword_start = self.pos();
            self.i += 2;
            self.eat_space();
            self.parse_if_expression(None, keyword_start)
        } else if self.keyword_ahead("for") {
            let keyword_start = self.pos();
            self.i += 3;
            self.eat_space();
            self.parse_for_expression(None, keyword_start)
        } else {
            self.parse_expression_inner(false).0
        };

        self.eat_space_newline_comment();
        let unexpected_rest_start = (self.i != self.len).then_some(self.pos());

        self.len = len_save;
        self.i = index_save;

        let mut err = None;
        if let Some(rest_start) = unexpected_rest_start {
            self.tokens.push(Token::with_raw(
                TokenKind::InvalidInterpSlice,
                Span::new(rest_start, interpolation_excl_end),
                self.slice_str(rest_start, interpolation_excl_end),
            ));
            err = Some(ParsingError::unspecified(MARKUP_INTERP_SINGLE_EXPR));
        }

        let mut node = Node::new(
            span,
            NodeKind::MarkupInterpolation {
                expr: Some(Box::new(expr)),
            },
        );
        if let Some(err) = err {
            node.base.err = Some(err);
        }
        node
    }

    /// `{…}` hyperscript attribute shorthand: minimal balance scan, then
    /// the optional external hyperscript parser.
    fn parse_hyperscript_attribute_shorthand(&mut self) -> Node {
        let start = self.pos();
        self.push_token(
            TokenKind::OpeningCurlyBracket,
            Span::new(self.pos(), self.pos() + 1),
        );
        self.i += 1;
        let content_start = self.pos();

        let mut depth = 0usize;
        while let Some(r) = self.cur() {
            match r {
                '{' => {
                    depth += 1;
                    self.i += 1;
                }
                '}' if depth > 0 => {
                    depth -= 1;
                    self.i += 1;
                }
                '}' => break,
                _ => self.i += 1,
            }
        }

        let content_end = self.pos();
        let mut err = None;
        if self.cur_is('}') {
            self.push_token(
                TokenKind::ClosingCurlyBracket,
                Span::new(self.pos(), self.pos() + 1),
            );
            self.i += 1;
        } else {
            err = Some(ParsingError::unspecified(UNTERMINATED_HYPERSCRIPT_ATTRIBUTE));
        }

        let value = self.slice_str(content_start, content_end);
        let mut result = None;
        if err.is_none() {
            if let Some(hyperscript) = self.hyperscript.clone() {
                match hyperscript.parse(&value) {
                    Ok(parsed) => result = Some(Box::new(parsed)),
                    Err(parse_err) => err = Some(parse_err),
                }
            }
        }

        let mut node = Node::new(
            self.span_from(start),
            NodeKind::HyperscriptAttributeShorthand {
                value: value.into(),
                result,
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

    fn top_element(node: &Node) -> &Node {
        match &node.kind {
            NodeKind::MarkupExpression { element, .. } => element,
            other => panic!("expected markup expression, got {other:?}"),
        }
    }

    #[test]
    fn element_with_attribute_and_interpolation() {
        let node = parse("h<div class=\"a\">{x}</div>");
        let element = top_element(&node);
        match &element.kind {
            NodeKind::MarkupElement {
                opening,
                children,
                closing,
                ..
            } => {
                match &opening.kind {
                    NodeKind::MarkupOpeningTag {
                        name, attributes, ..
                    } => {
                        assert!(matches!(
                            name.as_deref().map(|n| &n.kind),
                            Some(NodeKind::IdentifierLiteral { name }) if &**name == "div"
                        ));
                        assert_eq!(attributes.len(), 1);
                    }
                    other => panic!("expected opening tag, got {other:?}"),
                }
                assert!(children
                    .iter()
                    .any(|c| matches!(c.kind, NodeKind::MarkupInterpolation { .. })));
                assert!(closing.is_some());
            }
            other => panic!("expected markup element, got {other:?}"),
        }
        assert!(!node.error_at_any_depth());
    }

    #[test]
    fn self_closing_element() {
        let node = parse("h<br/>");
        let element = top_element(&node);
        match &element.kind {
            NodeKind::MarkupElement { opening, .. } => {
                assert!(matches!(
                    opening.kind,
                    NodeKind::MarkupOpeningTag {
                        self_closing: true,
                        ..
                    }
                ));
            }
            other => panic!("expected element, got {other:?}"),
        }
        assert!(!node.error_at_any_depth());
    }

    #[test]
    fn mismatched_closing_tag() {
        let node = parse("h<div></span>");
        assert!(node.error_at_any_depth());
    }

    #[test]
    fn script_is_raw_text() {
        let node = parse("h<script>let x = {a: 1}</script>");
        let element = top_element(&node);
        match &element.kind {
            NodeKind::MarkupElement {
                raw_element_content,
                children,
                ..
            } => {
                assert_eq!(raw_element_content.as_deref(), Some("let x = {a: 1}"));
                assert!(children.is_empty());
            }
            other => panic!("expected element, got {other:?}"),
        }
        assert!(!node.error_at_any_depth());
    }

    #[test]
    fn nested_braces_in_interpolation() {
        let node = parse("h<div>{ {a: 1} }</div>");
        assert!(!node.error_at_any_depth());
    }

    #[test]
    fn empty_interpolation_is_an_error() {
        let node = parse("h<div>{}</div>");
        assert!(node.error_at_any_depth());
    }

    #[test]
    fn hyperscript_shorthand_without_hook_keeps_text() {
        let node = parse("h<div {on click toggle .red}></div>");
        let element = top_element(&node);
        match &element.kind {
            NodeKind::MarkupElement { opening, .. } => match &opening.kind {
                NodeKind::MarkupOpeningTag { attributes, .. } => {
                    assert!(matches!(
                        &attributes[0].kind,
                        NodeKind::HyperscriptAttributeShorthand { value, result: None }
                            if value.contains("on click")
                    ));
                }
                other => panic!("expected opening tag, got {other:?}"),
            },
            other => panic!("expected element, got {other:?}"),
        }
        assert!(!node.error_at_any_depth());
    }

    #[test]
    fn unterminated_element() {
        let node = parse("h<div>");
        assert!(node.error_at_any_depth());
    }
}
