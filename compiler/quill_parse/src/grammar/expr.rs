//! Expression parsing: first-char dispatch and the member/index/call
//! suffix chain.
//!
//! `parse_expression_inner` recognises any expression. The term is broad:
//! it covers every standalone node that is not a statement. On failure it
//! returns a `MissingExpression` with an error; it never aborts.

use crate::chars::{
    is_alpha, is_byte_slice_base, is_dec_digit, is_ident_char, is_ident_first_char,
    is_unpaired_or_closing_delim, is_unquoted_string_char,
};
use crate::errors;
use crate::Parser;
use quill_diagnostic::{ParsingError, ParsingErrorKind};
use quill_ir::{Node, NodeKind, Span, Token, TokenKind, TokenSubKind, UnaryOperator};
use tracing::trace;

/// Keywords that can never be callees or plain identifiers in expressions.
pub(crate) const KEYWORDS: [&str; 46] = [
    "if", "else", "preinit", "manifest", "includable-chunk", "readonly", "const", "var",
    "globalvar", "for", "walk", "in", "go", "import", "fn", "switch", "match", "defaultcase",
    "return", "yield", "coyield", "break", "continue", "prune", "assert", "self", "Mapping",
    "comp", "treedata", "concat", "testsuite", "testcase", "synchronized", "on", "received",
    "do", "chunked", "sendval", "pattern", "pnamespace", "extend", "to", "and", "or", "new",
    "struct",
];

pub(crate) fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name)
}

const UNTERMINATED_IDENT_MEMB_EXPR: &str = "unterminated identifier member expression";
const UNTERMINATED_DYN_MEMB_EXPR: &str = "unterminated dynamic member expression";
const DOT_SHOULD_BE_FOLLOWED_BY: &str =
    "'.' should be followed by (another) '.', '/', '{' or a property name";
const KEY_LIST_CAN_ONLY_CONTAIN_IDENTS: &str = "a key list can only contain identifiers";
const UNTERMINATED_KEY_LIST_MISSING_BRACE: &str =
    "unterminated key list, missing closing brace '}'";
const OPTION_NAME_CAN_ONLY_CONTAIN_ALPHANUM_CHARS: &str =
    "the name of an option can only contain alphanumeric characters";
const UNTERMINATED_OPTION_EXPR_EQUAL_SHOULD_BE_FOLLOWED_BY_EXPR: &str =
    "unterminated option expression: '=' should be followed by an expression";

impl Parser {
    /// Parse any expression. The second return value is true when the
    /// result is a `MissingExpression`.
    pub(crate) fn parse_expression_inner(
        &mut self,
        preceded_by_opening_paren: bool,
    ) -> (Node, bool) {
        self.check_cancellation();

        let outer_start = self.pos();
        trace!(i = self.i, "parse_expression");

        if self.eof() {
            return (self.missing_expression(true), true);
        }

        // first-char dispatch; productions that cannot be the left side of
        // a suffix chain return directly, the others flow into the chain
        // loop below through `lhs`.
        #[allow(clippy::unwrap_used)] // non-eof checked above
        let r = self.cur().unwrap();
        let mut lhs: Option<Node> = None;

        match r {
            '$' => {
                let start = self.pos();
                let is_global = self.peek_is(1, '$');
                self.i += if is_global { 2 } else { 1 };
                while self.cur().is_some_and(is_ident_char) {
                    self.i += 1;
                }
                let name_start = start + if is_global { 2 } else { 1 };
                let name = self.slice_str(name_start, self.pos());
                self.push_raw_token(TokenKind::Variable, self.span_from(start));
                let variable = Node::new(
                    self.span_from(start),
                    if is_global {
                        NodeKind::GlobalVariable { name: name.into() }
                    } else {
                        NodeKind::Variable { name: name.into() }
                    },
                );
                // `$host/…`: URL expression with a variable host part
                if self.cur_is('/') && !is_global {
                    return (
                        self.parse_url_expression_from_host_variable(variable),
                        false,
                    );
                }
                lhs = Some(variable);
            }
            '!' => {
                self.push_token(
                    TokenKind::ExclamationMark,
                    Span::new(outer_start, outer_start + 1),
                );
                self.i += 1;
                let (operand, _) = self.parse_expression_inner(false);
                let span = Span::new(outer_start, operand.span().end);
                return (
                    Node::new(
                        span,
                        NodeKind::UnaryExpression {
                            operator: UnaryOperator::BoolNegate,
                            operand: Box::new(operand),
                        },
                    ),
                    false,
                );
            }
            '~' => {
                self.push_token(TokenKind::Tilde, Span::new(outer_start, outer_start + 1));
                self.i += 1;
                let (expr, _) = self.parse_expression_inner(false);
                let span = Span::new(outer_start, expr.span().end);
                return (
                    Node::new(
                        span,
                        NodeKind::RuntimeTypeCheckExpression {
                            expr: Box::new(expr),
                        },
                    ),
                    false,
                );
            }
            ':' => match self.peek(1) {
                Some('/') if self.peek_is(2, '/') => {
                    return (self.parse_url_like(self.pos()), false);
                }
                Some(d) if is_dec_digit(d) => return (self.parse_port_literal(), false),
                Some('{') => return (self.parse_dictionary_literal(), false),
                _ => {}
            },
            r if is_ident_first_char(r) => {
                match self.parse_ident_starting_dispatch(preceded_by_opening_paren) {
                    IdentDispatch::Done(node) => return (node, false),
                    IdentDispatch::Chain(node) => lhs = Some(node),
                }
            }
            '0' if self.peek(1).is_some_and(is_byte_slice_base) && self.peek_is(2, '[') => {
                return (self.parse_byte_slices(), false);
            }
            r if is_dec_digit(r) => return (self.parse_number_and_range_and_rate(), false),
            '{' => {
                if self.in_pattern {
                    return (self.parse_object_record_pattern_literal(false), false);
                }
                return (self.parse_object_or_record_literal(false), false);
            }
            '[' => {
                if self.in_pattern {
                    return (self.parse_list_tuple_pattern_literal(false), false);
                }
                return (self.parse_list_or_tuple_literal(false), false);
            }
            '|' if self.in_pattern => {
                return (self.parse_pattern_union(self.pos(), true), false);
            }
            '\'' => return (self.parse_rune_rune_range(), false),
            '"' => return (self.parse_quoted_string_literal(), false),
            '`' => {
                if self.in_pattern {
                    return (self.parse_regex_literal(self.pos()), false);
                }
                return (self.parse_string_template_or_multiline(None), false);
            }
            '+' if !self.peek(1).is_some_and(is_dec_digit) => {
                let start = self.pos();
                return (self.parse_unquoted_string_literal(start), false);
            }
            '/' => return (self.parse_path_like_expression(false), false),
            '.' => return (self.parse_dot_starting_expression(), false),
            '-' => {
                return (
                    self.parse_dash_starting_expression(preceded_by_opening_paren),
                    false,
                );
            }
            '#' => match self.peek(1) {
                Some('{') => {
                    if self.in_pattern {
                        return (self.parse_object_record_pattern_literal(true), false);
                    }
                    return (self.parse_object_or_record_literal(true), false);
                }
                Some('[') => {
                    if self.in_pattern {
                        return (self.parse_list_tuple_pattern_literal(true), false);
                    }
                    return (self.parse_list_or_tuple_literal(true), false);
                }
                _ => {
                    self.i += 1;
                    while self.cur().is_some_and(is_ident_char) {
                        self.i += 1;
                    }
                    let mut node = Node::new(
                        self.span_from(outer_start),
                        NodeKind::UnambiguousIdentifierLiteral {
                            name: self.slice_str(outer_start + 1, self.pos()).into(),
                        },
                    );
                    self.push_raw_token(TokenKind::UnambiguousIdentifier, node.span());
                    if self.pos() == outer_start + 1 {
                        node.base.err = Some(ParsingError::unspecified(
                            errors::UNTERMINATED_IDENTIFIER_LIT,
                        ));
                    }
                    return (node, false);
                }
            },
            '@' => return (self.parse_at_starting_expression(), false),
            '*' => {
                let start = self.pos();
                self.push_token(TokenKind::Asterisk, Span::new(start, start + 1));
                self.i += 1;
                if self.in_pattern {
                    let (value_type, _) = self.parse_expression_inner(false);
                    let span = Span::new(start, value_type.span().end);
                    return (
                        Node::new(
                            span,
                            NodeKind::PointerType {
                                value_type: Box::new(value_type),
                            },
                        ),
                        false,
                    );
                }
                let (pointer, _) = self.parse_expression_inner(false);
                let span = Span::new(start, pointer.span().end);
                return (
                    Node::new(
                        span,
                        NodeKind::DereferenceExpression {
                            pointer: Box::new(pointer),
                        },
                    ),
                    false,
                );
            }
            '%' => {
                let patt = self.parse_percent_prefixed_pattern(preceded_by_opening_paren);
                // a pattern directly before a backtick types the template
                if matches!(
                    patt.kind,
                    NodeKind::PatternIdentifierLiteral { .. }
                        | NodeKind::PatternNamespaceMemberExpression { .. }
                ) && self.cur_is('`')
                {
                    return (self.parse_string_template_or_multiline(Some(patt)), false);
                }
                return (patt, false);
            }
            '(' => {
                let opening_paren_index = self.pos();
                self.push_token(
                    TokenKind::OpeningParenthesis,
                    Span::new(opening_paren_index, opening_paren_index + 1),
                );
                self.i += 1;
                let node = self.parse_unary_binary_parenthesized(opening_paren_index);
                if self.eof() {
                    return (node, false);
                }
                lhs = Some(node);
            }
            _ => {}
        }

        let Some(mut lhs) = lhs else {
            return (self.missing_expression(false), true);
        };
        let first_span = lhs.span();

        // suffix chain: member, index/slice, double-colon, call, `?`
        loop {
            let Some(r) = self.cur() else { break };
            let is_double_colon = r == ':' && self.peek_is(1, ':');
            if is_unpaired_or_closing_delim(r) && !is_double_colon {
                break;
            }

            match r {
                '[' | '.' | ':' => {
                    let (node, done) =
                        self.parse_member_like_suffix(lhs, outer_start, first_span, is_double_colon);
                    if done {
                        return (node, false);
                    }
                    lhs = node;
                }
                '(' => {
                    lhs = self.parse_call_suffix(lhs, outer_start, first_span, false);
                }
                '!' if self.peek_is(1, '(') => {
                    lhs = self.parse_call_suffix(lhs, outer_start, first_span, true);
                }
                '?' => {
                    self.i += 1;
                    lhs = Node::new(
                        self.span_from(outer_start),
                        NodeKind::BooleanConversionExpression { expr: Box::new(lhs) },
                    );
                }
                _ => break,
            }
        }

        (lhs, false)
    }

    /// One member-like suffix: `.name`, `?.name`, `.<name`, `.(expr)`,
    /// `.{keys}`, `[index]`, `[start:end]`, `::element`. The bool is true
    /// when the returned node terminates the chain.
    fn parse_member_like_suffix(
        &mut self,
        lhs: Node,
        outer_start: u32,
        first_span: Span,
        is_double_colon: bool,
    ) -> (Node, bool) {
        let is_dot = self.cur_is('.');
        let is_bracket = self.cur_is('[');
        let token_start = self.pos();

        if is_double_colon {
            self.i += 1;
        }
        self.i += 1;
        let mut start = self.pos();
        let mut is_optional = false;

        if is_dot && self.cur_is('?') {
            is_optional = true;
            self.i += 1;
            start = self.pos();
        }

        let unterminated = self.eof()
            || (self.cur().is_some_and(is_unpaired_or_closing_delim)
                && (is_dot || (!self.cur_is(':') && !self.cur_is(']'))));
        if unterminated {
            let span = Span::new(first_span.start.min(outer_start), self.pos());
            if is_dot {
                return (
                    Node::with_error(
                        span,
                        NodeKind::InvalidMemberLike { left: Box::new(lhs) },
                        ParsingError::new(
                            ParsingErrorKind::UnterminatedMemberExpr,
                            errors::UNTERMINATED_MEMB_OR_INDEX_EXPR,
                        ),
                    ),
                    true,
                );
            }
            if is_double_colon {
                self.push_token(TokenKind::DoubleColon, Span::new(token_start, token_start + 2));
                return (
                    Node::with_error(
                        span,
                        NodeKind::DoubleColonExpression {
                            left: Box::new(lhs),
                            element: None,
                        },
                        ParsingError::new(
                            ParsingErrorKind::UnterminatedDoubleColonExpr,
                            errors::UNTERMINATED_DOUBLE_COLON_EXPR,
                        ),
                    ),
                    true,
                );
            }
            return (
                Node::with_error(
                    span,
                    NodeKind::InvalidMemberLike { left: Box::new(lhs) },
                    ParsingError::unspecified(errors::UNTERMINATED_MEMB_OR_INDEX_EXPR),
                ),
                true,
            );
        }

        if is_bracket {
            return self.parse_index_or_slice_suffix(lhs, outer_start, first_span);
        }

        if is_double_colon {
            self.push_token(TokenKind::DoubleColon, Span::new(token_start, token_start + 2));
            let element_start = self.pos();
            let mut err = None;
            if !self.cur().is_some_and(is_ident_first_char) {
                err = self.cur().map(|r| {
                    ParsingError::unspecified(
                        errors::fmt_double_colon_element_should_start_with_letter(r),
                    )
                });
            }
            while self.cur().is_some_and(is_ident_char) {
                self.i += 1;
            }
            let element = Node::new(
                self.span_from(element_start),
                NodeKind::IdentifierLiteral {
                    name: self.slice_str(element_start, self.pos()).into(),
                },
            );
            let span_start = if lhs.span() == first_span {
                outer_start
            } else {
                lhs.span().start
            };
            let mut node = Node::new(
                self.span_from(span_start),
                NodeKind::DoubleColonExpression {
                    left: Box::new(lhs),
                    element: Some(Box::new(element)),
                },
            );
            if let Some(err) = err {
                node.base.err = Some(err);
            }
            return (node, false);
        }

        // extraction: obj.{a, b}
        if !is_optional && self.cur_is('{') {
            self.i -= 1;
            let keys = self.parse_key_list();
            let span = Span::new(lhs.span().start, keys.span().end);
            return (
                Node::new(
                    span,
                    NodeKind::ExtractionExpression {
                        object: Box::new(lhs),
                        keys: Box::new(keys),
                    },
                ),
                false,
            );
        }

        let mut is_dynamic = false;
        let mut computed_property: Option<Node> = None;
        let span_start = if lhs.span() == first_span {
            outer_start
        } else {
            lhs.span().start
        };
        let mut prop_name_start = start;

        if !is_optional {
            match self.cur() {
                Some('<') => {
                    is_dynamic = true;
                    self.i += 1;
                    prop_name_start += 1;
                }
                Some('(') => {
                    let paren_index = self.pos();
                    self.push_token(
                        TokenKind::OpeningParenthesis,
                        Span::new(paren_index, paren_index + 1),
                    );
                    self.i += 1;
                    computed_property =
                        Some(self.parse_unary_binary_parenthesized(paren_index));
                }
                _ => {}
            }
        }

        if let Some(property) = computed_property {
            let node = Node::new(
                self.span_from(span_start),
                NodeKind::ComputedMemberExpression {
                    object: Box::new(lhs),
                    property: Box::new(property),
                    optional: is_optional,
                },
            );
            return (node, false);
        }

        if is_dynamic && self.eof() {
            return (
                Node::with_error(
                    self.span_from(span_start),
                    NodeKind::DynamicMemberExpression {
                        object: Box::new(lhs),
                        property_name: Box::new(Node::new(
                            Span::point(self.pos()),
                            NodeKind::IdentifierLiteral { name: "".into() },
                        )),
                    },
                    ParsingError::unspecified(UNTERMINATED_DYN_MEMB_EXPR),
                ),
                true,
            );
        }

        if !self.cur().is_some_and(is_ident_first_char) {
            let err = self.cur().map_or_else(
                || ParsingError::unspecified(errors::UNTERMINATED_MEMB_OR_INDEX_EXPR),
                |r| ParsingError::unspecified(errors::fmt_prop_name_should_start_with_letter(r)),
            );
            return (
                Node::with_error(
                    self.span_from(span_start),
                    NodeKind::MemberExpression {
                        object: Box::new(lhs),
                        property_name: Box::new(Node::new(
                            Span::point(self.pos()),
                            NodeKind::IdentifierLiteral { name: "".into() },
                        )),
                        optional: is_optional,
                    },
                    err,
                ),
                true,
            );
        }

        while self.cur().is_some_and(is_ident_char) {
            self.i += 1;
        }
        let property_name = Node::new(
            Span::new(prop_name_start, self.pos()),
            NodeKind::IdentifierLiteral {
                name: self.slice_str(prop_name_start, self.pos()).into(),
            },
        );

        let kind = if is_dynamic {
            NodeKind::DynamicMemberExpression {
                object: Box::new(lhs),
                property_name: Box::new(property_name),
            }
        } else {
            NodeKind::MemberExpression {
                object: Box::new(lhs),
                property_name: Box::new(property_name),
                optional: is_optional,
            }
        };
        (Node::new(self.span_from(span_start), kind), false)
    }

    fn parse_index_or_slice_suffix(
        &mut self,
        lhs: Node,
        outer_start: u32,
        first_span: Span,
    ) -> (Node, bool) {
        self.eat_space();

        let invalid = |p: &Parser, lhs: Node, message: &str| {
            Node::with_error(
                Span::new(first_span.start.min(outer_start), p.pos()),
                NodeKind::InvalidMemberLike { left: Box::new(lhs) },
                ParsingError::unspecified(message),
            )
        };

        if self.eof() {
            let node = invalid(self, lhs, errors::UNTERMINATED_INDEX_OR_SLICE_EXPR);
            return (node, true);
        }

        let mut start_index = None;
        let mut end_index = None;
        let mut is_slice = self.cur_is(':');

        if is_slice {
            self.i += 1;
        } else {
            let (index, _) = self.parse_expression_inner(false);
            start_index = Some(index);
        }

        self.eat_space();
        if self.eof() {
            let node = invalid(self, lhs, errors::UNTERMINATED_INDEX_OR_SLICE_EXPR);
            return (node, true);
        }

        if self.cur_is(':') {
            if is_slice {
                let node = Node::with_error(
                    Span::new(first_span.start.min(outer_start), self.pos()),
                    NodeKind::SliceExpression {
                        indexed: Box::new(lhs),
                        start_index: start_index.map(Box::new),
                        end_index: None,
                    },
                    ParsingError::unspecified(errors::INVALID_SLICE_EXPR_SINGLE_COLON),
                );
                return (node, true);
            }
            is_slice = true;
            self.i += 1;
        }

        self.eat_space();

        if is_slice && start_index.is_none() && (self.eof() || self.cur_is(']')) {
            let node = Node::with_error(
                Span::new(first_span.start.min(outer_start), self.pos()),
                NodeKind::SliceExpression {
                    indexed: Box::new(lhs),
                    start_index: None,
                    end_index: None,
                },
                ParsingError::unspecified(errors::UNTERMINATED_SLICE_EXPR_MISSING_END_INDEX),
            );
            return (node, true);
        }

        if is_slice && !self.cur_is(']') && !self.eof() {
            let (index, _) = self.parse_expression_inner(false);
            end_index = Some(index);
        }

        self.eat_space();

        if !self.cur_is(']') {
            let node = invalid(
                self,
                lhs,
                "unterminated index/slice expression: missing closing bracket ']'",
            );
            return (node, true);
        }
        self.push_token(
            TokenKind::ClosingBracket,
            Span::new(self.pos(), self.pos() + 1),
        );
        self.i += 1;

        let span_start = if lhs.span() == first_span {
            outer_start
        } else {
            lhs.span().start
        };

        let kind = if is_slice {
            NodeKind::SliceExpression {
                indexed: Box::new(lhs),
                start_index: start_index.map(Box::new),
                end_index: end_index.map(Box::new),
            }
        } else {
            NodeKind::IndexExpression {
                indexed: Box::new(lhs),
                #[allow(clippy::unwrap_used)] // non-slice always parsed a start index
                index: Box::new(start_index.unwrap()),
            }
        };
        (Node::new(self.span_from(span_start), kind), false)
    }

    fn parse_call_suffix(
        &mut self,
        lhs: Node,
        outer_start: u32,
        first_span: Span,
        must: bool,
    ) -> Node {
        if must {
            self.push_token(
                TokenKind::ExclamationMark,
                Span::new(self.pos(), self.pos() + 1),
            );
            self.i += 1;
        }
        self.push_token(
            TokenKind::OpeningParenthesis,
            Span::new(self.pos(), self.pos() + 1),
        );
        self.i += 1;

        let span_start = if lhs.span() == first_span {
            outer_start
        } else {
            lhs.span().start
        };

        self.parse_parenthesized_call_args(span_start, lhs, must)
    }

    /// Identifier-starting expression with the keyword special cases.
    fn parse_ident_starting_dispatch(
        &mut self,
        preceded_by_opening_paren: bool,
    ) -> IdentDispatch {
        let in_pattern = self.in_pattern;
        let ident_starting = self.parse_ident_starting_expression(in_pattern);

        let name = match &ident_starting.kind {
            NodeKind::IdentifierLiteral { name } => {
                let name = name.to_string();
                let start = ident_starting.span().start;
                match name.as_str() {
                    "go" => return IdentDispatch::Done(self.parse_spawn_expression(ident_starting)),
                    "fn" => {
                        if in_pattern {
                            return IdentDispatch::Done(self.parse_function_pattern(start));
                        }
                        return IdentDispatch::Done(self.parse_function(start));
                    }
                    "s" if self.cur_is('!') => {
                        self.i += 1;
                        return IdentDispatch::Done(self.parse_top_css_selector(self.pos() - 2));
                    }
                    "Mapping" => {
                        return IdentDispatch::Done(self.parse_mapping_expression(ident_starting));
                    }
                    "comp" => {
                        return IdentDispatch::Done(self.parse_compute_expression(ident_starting));
                    }
                    "treedata" => {
                        return IdentDispatch::Done(self.parse_treedata_literal(ident_starting));
                    }
                    "concat" => {
                        return IdentDispatch::Done(
                            self.parse_concatenation_expression(
                                ident_starting,
                                preceded_by_opening_paren,
                            ),
                        );
                    }
                    "testsuite" => {
                        return IdentDispatch::Done(
                            self.parse_test_suite_expression(ident_starting, false),
                        );
                    }
                    "testcase" => {
                        return IdentDispatch::Done(
                            self.parse_test_case_expression(ident_starting, false),
                        );
                    }
                    "on" => {
                        return IdentDispatch::Done(
                            self.parse_reception_handler_expression(ident_starting),
                        );
                    }
                    "sendval" => {
                        return IdentDispatch::Done(
                            self.parse_send_value_expression(ident_starting),
                        );
                    }
                    "readonly" if in_pattern => {
                        return IdentDispatch::Done(
                            self.parse_readonly_pattern_expression(ident_starting),
                        );
                    }
                    "new" => {
                        return IdentDispatch::Done(self.parse_new_expression(ident_starting));
                    }
                    "switch" | "match" => {
                        // handled by the parenthesized form; as a bare
                        // expression the keyword is returned as-is
                        return IdentDispatch::Done(ident_starting);
                    }
                    _ => {}
                }
                if is_keyword(&name) {
                    return IdentDispatch::Done(ident_starting);
                }
                if in_pattern {
                    return IdentDispatch::Done(
                        self.unprefixed_pattern_from_ident(&ident_starting, &name),
                    );
                }
                name
            }
            NodeKind::IdentifierMemberExpression {
                left,
                property_names,
            } => {
                if in_pattern && property_names.len() == 1 {
                    let node =
                        self.unprefixed_pattern_namespace_member(&ident_starting, left, property_names);
                    return IdentDispatch::Done(node);
                }
                match &left.kind {
                    NodeKind::IdentifierLiteral { name } => name.to_string(),
                    _ => String::new(),
                }
            }
            NodeKind::SelfExpression | NodeKind::MemberExpression { .. } => {
                return IdentDispatch::Chain(ident_starting);
            }
            _ => return IdentDispatch::Done(ident_starting),
        };

        if self.eof()
            || (self.cur().is_some_and(is_unpaired_or_closing_delim)
                && !(self.cur_is(':') && self.peek_is(1, ':')))
        {
            return IdentDispatch::Done(ident_starting);
        }

        // markup: a plain identifier immediately followed by `<letter`
        if self.cur_is('<')
            && matches!(ident_starting.kind, NodeKind::IdentifierLiteral { .. })
            && self.peek(1).is_some_and(is_alpha)
        {
            return IdentDispatch::Done(self.parse_markup_expression(ident_starting));
        }

        match self.try_parse_call(ident_starting, &name) {
            Ok(call) => IdentDispatch::Chain(call),
            Err(not_a_call) => IdentDispatch::Chain(not_a_call),
        }
    }

    /// Plain identifier, `self`, boolean/nil literal, identifier member
    /// chain (`a.b.c`), URL-like, or unquoted string fallback.
    pub(crate) fn parse_ident_starting_expression(&mut self, _in_pattern: bool) -> Node {
        let start = self.pos();
        self.i += 1;
        while self.cur().is_some_and(is_ident_char) {
            self.i += 1;
        }

        let name = self.slice_str(start, self.pos());
        let mut ident_err = None;
        if name.ends_with('-') {
            ident_err = Some(ParsingError::unspecified(
                errors::IDENTIFIER_MUST_NOT_END_WITH_HYPHEN,
            ));
        }
        let ident_span = self.span_from(start);

        if name == "self" {
            self.push_token(TokenKind::SelfKeyword, ident_span);
            return Node::new(ident_span, NodeKind::SelfExpression);
        }

        // identifier member chain
        if self.cur_is('.') && !self.peek_is(1, '.') && !self.peek_is(1, '/') {
            return self.parse_identifier_member_chain(start, ident_span, &name);
        }

        let is_protocol = crate::grammar::urls::is_scheme_colon_slash_slash(&self.s, self.i);

        if !is_protocol
            && self
                .cur()
                .is_some_and(|r| r == '\\' || (is_unquoted_string_char(r) && r != ':'))
        {
            return self.parse_unquoted_string_literal(start);
        }

        match name.as_str() {
            "true" | "false" => {
                self.push_raw_token(TokenKind::BooleanLiteral, ident_span);
                return Node::new(
                    ident_span,
                    NodeKind::BooleanLiteral {
                        value: name == "true",
                    },
                );
            }
            "nil" => {
                self.push_token(TokenKind::NilLiteral, ident_span);
                return Node::new(ident_span, NodeKind::NilLiteral);
            }
            _ => {}
        }

        if is_protocol {
            if crate::grammar::urls::SCHEMES.contains(&name.as_str()) {
                return self.parse_url_like(start);
            }
            self.i += 3;
            return Node::with_error(
                self.span_from(start),
                NodeKind::InvalidUrl { value: name.into() },
                ParsingError::unspecified("invalid URL: unsupported protocol"),
            );
        }

        self.push_raw_token(TokenKind::Identifier, ident_span);
        let mut node = Node::new(ident_span, NodeKind::IdentifierLiteral { name: name.into() });
        if let Some(err) = ident_err {
            node.base.err = Some(err);
        }
        node
    }

    /// `a.b.c` and `a.<b` chains after the first identifier.
    fn parse_identifier_member_chain(&mut self, start: u32, ident_span: Span, name: &str) -> Node {
        self.push_raw_token(TokenKind::Identifier, ident_span);
        let ident = Node::new(
            ident_span,
            NodeKind::IdentifierLiteral { name: name.into() },
        );
        self.i += 1; // '.'

        let mut property_names: Vec<Node> = Vec::new();
        let mut member_expr: Option<Node> = None; // set once the chain goes dynamic

        loop {
            let mut name_start = self.pos();

            if self.eof() || self.cur().is_some_and(is_unpaired_or_closing_delim) {
                self.push_token(TokenKind::Dot, Span::new(self.pos() - 1, self.pos()));
                let node = member_expr.unwrap_or(Node::new(
                    self.span_from(start),
                    NodeKind::IdentifierMemberExpression {
                        left: Box::new(ident),
                        property_names,
                    },
                ));
                let mut node = node;
                node.base.span.end = self.pos();
                node.base.err = Some(ParsingError::new(
                    ParsingErrorKind::UnterminatedMemberExpr,
                    UNTERMINATED_IDENT_MEMB_EXPR,
                ));
                return node;
            }

            let mut is_dynamic = false;
            if self.cur_is('<') {
                is_dynamic = true;
                self.i += 1;
                name_start = self.pos();
            } else if !self.cur().is_some_and(is_ident_first_char) {
                return self.parse_unquoted_string_literal(start);
            }

            while self.cur().is_some_and(is_ident_char) {
                self.i += 1;
            }
            let prop_name_node = Node::new(
                Span::new(name_start, self.pos()),
                NodeKind::IdentifierLiteral {
                    name: self.slice_str(name_start, self.pos()).into(),
                },
            );

            if is_dynamic {
                let object = match member_expr.take() {
                    Some(previous) => previous,
                    None if property_names.is_empty() => ident.clone(),
                    None => Node::new(
                        self.span_from(start),
                        NodeKind::IdentifierMemberExpression {
                            left: Box::new(ident.clone()),
                            property_names: std::mem::take(&mut property_names),
                        },
                    ),
                };
                member_expr = Some(Node::new(
                    self.span_from(start),
                    NodeKind::DynamicMemberExpression {
                        object: Box::new(object),
                        property_name: Box::new(prop_name_node),
                    },
                ));
            } else if let Some(previous) = member_expr.take() {
                member_expr = Some(Node::new(
                    self.span_from(start),
                    NodeKind::MemberExpression {
                        object: Box::new(previous),
                        property_name: Box::new(prop_name_node),
                        optional: false,
                    },
                ));
            } else {
                property_names.push(prop_name_node);
            }

            if !self.cur_is('.') {
                break;
            }
            self.i += 1;
        }

        if self
            .cur()
            .is_some_and(|r| r == '\\' || (is_unquoted_string_char(r) && r != ':' && r != '<'))
        {
            return self.parse_unquoted_string_literal(start);
        }

        member_expr.unwrap_or_else(|| {
            Node::new(
                self.span_from(start),
                NodeKind::IdentifierMemberExpression {
                    left: Box::new(ident),
                    property_names,
                },
            )
        })
    }

    /// `.{` key list, `./`-style paths, `..5` upper bound ranges, `.name`
    /// property names and `.a.b` value paths.
    pub(crate) fn parse_dot_starting_expression(&mut self) -> Node {
        if crate::chars::has_path_like_start(&self.s[self.i..]) {
            return self.parse_path_like_expression(false);
        }
        match self.peek(1) {
            Some('{') => return self.parse_key_list(),
            Some('.') => {
                let start = self.pos();
                self.push_token(TokenKind::TwoDots, Span::new(start, start + 2));
                self.i += 2;
                let (upper_bound, _) = self.parse_expression_inner(false);
                return Node::new(
                    self.span_from(start),
                    NodeKind::UpperBoundRangeExpression {
                        upper_bound: Box::new(upper_bound),
                    },
                );
            }
            Some(r) if is_ident_char(r) && !is_dec_digit(r) => {
                let start = self.pos();
                self.i += 1;
                while self.cur().is_some_and(is_ident_char) {
                    self.i += 1;
                }
                let first = Node::new(
                    self.span_from(start),
                    NodeKind::PropertyNameLiteral {
                        name: self.slice_str(start + 1, self.pos()).into(),
                    },
                );
                self.push_raw_token(TokenKind::PropNameLiteral, first.span());

                // `.a.b` long value path
                if !self.cur_is('.') || !self.peek(1).is_some_and(is_ident_first_char) {
                    return first;
                }
                let mut segments = vec![first];
                while self.cur_is('.') && self.peek(1).is_some_and(is_ident_first_char) {
                    let seg_start = self.pos();
                    self.i += 1;
                    while self.cur().is_some_and(is_ident_char) {
                        self.i += 1;
                    }
                    let segment = Node::new(
                        self.span_from(seg_start),
                        NodeKind::PropertyNameLiteral {
                            name: self.slice_str(seg_start + 1, self.pos()).into(),
                        },
                    );
                    self.push_raw_token(TokenKind::PropNameLiteral, segment.span());
                    segments.push(segment);
                }
                return Node::new(
                    self.span_from(start),
                    NodeKind::LongValuePathLiteral { segments },
                );
            }
            _ => {}
        }

        self.i += 1;
        let span = Span::new(self.pos() - 1, self.pos());
        self.tokens
            .push(Token::with_raw(TokenKind::UnexpectedChar, span, "."));
        Node::with_error(
            span,
            NodeKind::UnknownNode,
            ParsingError::unspecified(DOT_SHOULD_BE_FOLLOWED_BY),
        )
    }

    /// Dash-starting: `-` / `--` unquoted strings, negative numbers, flags
    /// `-f` / `--flag`, options `-name=value` (option patterns in pattern
    /// context), and `(- expr)` unary negation.
    pub(crate) fn parse_dash_starting_expression(
        &mut self,
        preceded_by_opening_paren: bool,
    ) -> Node {
        let start = self.pos();
        self.i += 1;

        if self.eof() || self.cur().is_some_and(char::is_whitespace) {
            if preceded_by_opening_paren && !self.eof() {
                // `(- expr)`: unary number negation
                self.eat_space();
                let (operand, missing) = self.parse_expression_inner(false);
                if !missing {
                    self.push_token(
                        TokenKind::Minus,
                        Span::new(start, start + 1),
                    );
                    return Node::new(
                        Span::new(start, operand.span().end),
                        NodeKind::UnaryExpression {
                            operator: UnaryOperator::NumberNegate,
                            operand: Box::new(operand),
                        },
                    );
                }
            }
            let raw = self.slice_str(start, self.pos());
            return Node::new(
                self.span_from(start),
                NodeKind::UnquotedStringLiteral {
                    value: raw.clone().into(),
                    raw: raw.into(),
                },
            );
        }

        if self.cur().is_some_and(is_dec_digit) {
            self.i -= 1;
            return self.parse_number_and_range_and_rate();
        }

        let mut single_dash = true;
        if self.cur_is('-') {
            single_dash = false;
            self.i += 1;
        }

        if self.eof() || self.cur().is_some_and(char::is_whitespace) {
            let raw = self.slice_str(start, self.pos());
            return Node::new(
                self.span_from(start),
                NodeKind::UnquotedStringLiteral {
                    value: raw.clone().into(),
                    raw: raw.into(),
                },
            );
        }

        let name_start = self.pos();

        if self.cur().is_some_and(crate::chars::is_delim) {
            let raw = self.slice_str(start, self.pos());
            return Node::new(
                self.span_from(start),
                NodeKind::UnquotedStringLiteral {
                    value: raw.clone().into(),
                    raw: raw.into(),
                },
            );
        }

        if !self.cur().is_some_and(|r| is_alpha(r) || is_dec_digit(r)) {
            if self.cur().is_some_and(is_unquoted_string_char) {
                return self.parse_unquoted_string_literal(start);
            }
            return Node::with_error(
                self.span_from(start),
                NodeKind::FlagLiteral {
                    name: "".into(),
                    single_dash,
                    raw: self.slice_str(start, self.pos()).into(),
                },
                ParsingError::unspecified(OPTION_NAME_CAN_ONLY_CONTAIN_ALPHANUM_CHARS),
            );
        }

        while self
            .cur()
            .is_some_and(|r| is_alpha(r) || is_dec_digit(r) || r == '-')
        {
            self.i += 1;
        }
        let name = self.slice_str(name_start, self.pos());

        if !self.cur_is('=') {
            self.push_raw_token(TokenKind::FlagLiteral, self.span_from(start));
            return Node::new(
                self.span_from(start),
                NodeKind::FlagLiteral {
                    name: name.into(),
                    single_dash,
                    raw: self.slice_str(start, self.pos()).into(),
                },
            );
        }

        self.push_token(TokenKind::Equal, Span::new(self.pos(), self.pos() + 1));
        self.i += 1;

        let make = |name: Box<str>, value: Option<Box<Node>>, in_pattern: bool| {
            if in_pattern {
                NodeKind::OptionPatternLiteral {
                    name,
                    value,
                    single_dash,
                }
            } else {
                NodeKind::OptionExpression {
                    name,
                    value,
                    single_dash,
                }
            }
        };

        if self.eof() {
            return Node::with_error(
                self.span_from(start),
                make(name.into(), None, self.in_pattern),
                ParsingError::new(
                    ParsingErrorKind::UnterminatedOptionExpr,
                    UNTERMINATED_OPTION_EXPR_EQUAL_SHOULD_BE_FOLLOWED_BY_EXPR,
                ),
            );
        }

        let (value, _) = self.parse_expression_inner(false);
        Node::new(
            self.span_from(start),
            make(name.into(), Some(Box::new(value)), self.in_pattern),
        )
    }

    /// `.{a, b}` key list; the cursor is on the dot.
    pub(crate) fn parse_key_list(&mut self) -> Node {
        let start = self.pos();
        self.push_token(
            TokenKind::OpeningKeylistBracket,
            Span::new(start, start + 2),
        );
        self.i += 2;

        let mut keys = Vec::new();
        let mut err = None;

        while !self.eof() && !self.cur_is('}') {
            self.eat_space_comma();
            if self.eof() || self.cur_is('}') {
                break;
            }

            let (expr, missing) = self.parse_expression_inner(false);
            if missing {
                #[allow(clippy::unwrap_used)] // missing-expr only when not at eof here
                let r = self.cur().unwrap();
                let span = Span::new(self.pos(), self.pos() + 1);
                self.i += 1;
                self.tokens.push(Token::with_raw(
                    TokenKind::UnexpectedChar,
                    span,
                    r.to_string(),
                ));
                keys.push(Node::with_error(
                    span,
                    NodeKind::UnknownNode,
                    ParsingError::unspecified(errors::fmt_unexpected_char_in(r, "key list")),
                ));
                continue;
            }

            if !matches!(
                expr.kind,
                NodeKind::IdentifierLiteral { .. } | NodeKind::IdentifierMemberExpression { .. }
            ) {
                err = Some(ParsingError::unspecified(KEY_LIST_CAN_ONLY_CONTAIN_IDENTS));
            }
            keys.push(expr);
            self.eat_space_comma();
        }

        if self.eof() {
            err = Some(ParsingError::unspecified(UNTERMINATED_KEY_LIST_MISSING_BRACE));
        } else {
            self.push_token(
                TokenKind::ClosingCurlyBracket,
                Span::new(self.pos(), self.pos() + 1),
            );
            self.i += 1;
        }

        let mut node = Node::new(self.span_from(start), NodeKind::KeyListExpression { keys });
        if let Some(err) = err {
            node.base.err = Some(err);
        }
        node
    }

    /// `name(…)`, `name!(…)`, `name"…"`, `name{…}` call forms.
    /// Returns the callee back untouched when no call starts here.
    pub(crate) fn try_parse_call(&mut self, callee: Node, first_name: &str) -> Result<Node, Node> {
        match self.cur() {
            // func_name"string" and func_name{…}: single-argument must-call
            Some('"' | '{') => {
                if let Some(token) = self
                    .tokens
                    .iter_mut()
                    .rev()
                    .find(|t| t.span == callee.span())
                {
                    token.sub_kind = Some(TokenSubKind::Callee);
                }
                let (arg, _) = self.parse_expression_inner(false);
                let span = Span::new(callee.span().start, arg.span().end);
                Ok(Node::new(
                    span,
                    NodeKind::CallExpression {
                        callee: Box::new(callee),
                        arguments: vec![arg],
                        must: true,
                        command_like: false,
                    },
                ))
            }
            Some('(') if !is_keyword(first_name) => {
                self.push_token(
                    TokenKind::OpeningParenthesis,
                    Span::new(self.pos(), self.pos() + 1),
                );
                self.i += 1;
                self.eat_space();
                let span_start = callee.span().start;
                Ok(self.parse_parenthesized_call_args(span_start, callee, false))
            }
            Some('!') if self.peek_is(1, '(') && !is_keyword(first_name) => {
                self.push_token(
                    TokenKind::ExclamationMark,
                    Span::new(self.pos(), self.pos() + 1),
                );
                self.i += 1;
                self.push_token(
                    TokenKind::OpeningParenthesis,
                    Span::new(self.pos(), self.pos() + 1),
                );
                self.i += 1;
                self.eat_space();
                let span_start = callee.span().start;
                Ok(self.parse_parenthesized_call_args(span_start, callee, true))
            }
            _ => Err(callee),
        }
    }
}

pub(crate) enum IdentDispatch {
    /// The production is complete; return as-is.
    Done(Node),
    /// The node may carry member/index/call suffixes.
    Chain(Node),
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
    fn variables() {
        assert!(matches!(
            parse("$x").kind,
            NodeKind::Variable { .. }
        ));
        assert!(matches!(
            parse("$$x").kind,
            NodeKind::GlobalVariable { .. }
        ));
    }

    #[test]
    fn unary_prefixes() {
        let node = parse("!x");
        assert!(matches!(
            node.kind,
            NodeKind::UnaryExpression {
                operator: UnaryOperator::BoolNegate,
                ..
            }
        ));

        let node = parse("~x");
        assert!(matches!(node.kind, NodeKind::RuntimeTypeCheckExpression { .. }));
    }

    #[test]
    fn member_chains() {
        let node = parse("a.b.c");
        match &node.kind {
            NodeKind::IdentifierMemberExpression {
                left,
                property_names,
            } => {
                assert!(matches!(&left.kind, NodeKind::IdentifierLiteral { name } if &**name == "a"));
                assert_eq!(property_names.len(), 2);
            }
            other => panic!("expected identifier member chain, got {other:?}"),
        }
        assert_eq!(node.span(), Span::new(0, 5));
    }

    #[test]
    fn member_on_variable() {
        let node = parse("$a.b");
        assert!(matches!(node.kind, NodeKind::MemberExpression { .. }));
    }

    #[test]
    fn optional_member() {
        let node = parse("$a.?b");
        match node.kind {
            NodeKind::MemberExpression { optional, .. } => assert!(optional),
            other => panic!("expected member expression, got {other:?}"),
        }
    }

    #[test]
    fn index_and_slice() {
        assert!(matches!(parse("$a[0]").kind, NodeKind::IndexExpression { .. }));
        match parse("$a[1:2]").kind {
            NodeKind::SliceExpression {
                start_index,
                end_index,
                ..
            } => {
                assert!(start_index.is_some());
                assert!(end_index.is_some());
            }
            other => panic!("expected slice, got {other:?}"),
        }
        match parse("$a[:2]").kind {
            NodeKind::SliceExpression { start_index, .. } => assert!(start_index.is_none()),
            other => panic!("expected slice, got {other:?}"),
        }
    }

    #[test]
    fn double_colon() {
        let node = parse("$a::b");
        assert!(matches!(node.kind, NodeKind::DoubleColonExpression { .. }));
        assert!(node.base.err.is_none());
    }

    #[test]
    fn extraction() {
        let node = parse("$a.{b, c}");
        match &node.kind {
            NodeKind::ExtractionExpression { keys, .. } => {
                assert!(matches!(&keys.kind, NodeKind::KeyListExpression { keys } if keys.len() == 2));
            }
            other => panic!("expected extraction, got {other:?}"),
        }
    }

    #[test]
    fn calls() {
        let node = parse("f(1, 2)");
        match &node.kind {
            NodeKind::CallExpression {
                arguments, must, ..
            } => {
                assert_eq!(arguments.len(), 2);
                assert!(!must);
            }
            other => panic!("expected call, got {other:?}"),
        }

        let node = parse("f!(1)");
        assert!(matches!(
            node.kind,
            NodeKind::CallExpression { must: true, .. }
        ));
    }

    #[test]
    fn boolean_conversion_suffix() {
        let node = parse("$a.b?");
        assert!(matches!(
            node.kind,
            NodeKind::BooleanConversionExpression { .. }
        ));
    }

    #[test]
    fn unterminated_member() {
        let node = parse("$a.");
        assert!(node
            .base
            .err
            .as_ref()
            .is_some_and(|e| e.kind == ParsingErrorKind::UnterminatedMemberExpr));
    }

    #[test]
    fn keyword_is_not_a_callee() {
        let node = parse("if");
        assert!(matches!(node.kind, NodeKind::IdentifierLiteral { .. }));
    }

    #[test]
    fn missing_expression() {
        let node = parse("");
        assert!(matches!(node.kind, NodeKind::MissingExpression));
        assert!(node
            .base
            .err
            .as_ref()
            .is_some_and(|e| e.kind == ParsingErrorKind::MissingExpr));
    }

    #[test]
    fn dot_starting() {
        assert!(matches!(
            parse(".name").kind,
            NodeKind::PropertyNameLiteral { .. }
        ));
        assert!(matches!(
            parse(".a.b").kind,
            NodeKind::LongValuePathLiteral { .. }
        ));
        assert!(matches!(
            parse("..10").kind,
            NodeKind::UpperBoundRangeExpression { .. }
        ));
        assert!(matches!(parse(".{a}").kind, NodeKind::KeyListExpression { .. }));
    }

    #[test]
    fn dash_starting() {
        assert!(matches!(parse("-5").kind, NodeKind::IntLiteral { value: -5, .. }));
        match parse("--verbose").kind {
            NodeKind::FlagLiteral {
                single_dash, ..
            } => assert!(!single_dash),
            other => panic!("expected flag, got {other:?}"),
        }
        match parse("-out=./file").kind {
            NodeKind::OptionExpression { name, value, .. } => {
                assert_eq!(&*name, "out");
                assert!(value.is_some());
            }
            other => panic!("expected option, got {other:?}"),
        }
        assert!(matches!(
            parse("-").kind,
            NodeKind::UnquotedStringLiteral { .. }
        ));
    }

    #[test]
    fn unambiguous_identifier() {
        let node = parse("#name");
        assert!(matches!(
            node.kind,
            NodeKind::UnambiguousIdentifierLiteral { .. }
        ));
        assert!(parse("#").base.err.is_some());
    }
}
