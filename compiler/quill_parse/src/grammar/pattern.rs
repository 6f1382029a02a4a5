//! Pattern sub-parser: percent-prefixed constructs, unions, pattern
//! calls, option patterns, regex literals, readonly patterns, and the
//! pattern/pnamespace definitions.
//!
//! Pattern context is the `in_pattern` flag on the parser; a leading `%`
//! switches into it for the duration of one construct.

use crate::chars::{
    is_alpha, is_dec_digit, is_delim, is_ident_char, is_ident_first_char, is_space_not_lf,
    is_unpaired_or_closing_delim,
};
use crate::eaters::Trivia;
use crate::errors;
use crate::Parser;
use quill_diagnostic::{ParsingError, ParsingErrorKind};
use quill_ir::{Node, NodeKind, Span, TokenKind};

const UNTERMINATED_REGEX_LIT: &str = "unterminated regex literal";
const INVALID_PATT_UNION_ELEMENT_SEPARATOR: &str =
    "invalid pattern union: elements should be separated by '|'";
const UNTERMINATED_PATTERN_CALL_MISSING_CLOSING_PAREN: &str =
    "unterminated pattern call: missing closing parenthesis ')'";
const DASH_SHOULD_BE_FOLLOWED_BY_OPTION_NAME: &str =
    "'-' should be followed by an option name";
const OPTION_NAME_CAN_ONLY_CONTAIN_ALPHANUM_CHARS: &str =
    "the name of an option can only contain alphanumeric characters";
const UNTERMINATED_OPTION_PATT_MISSING_EQUAL_SIGN: &str =
    "unterminated option pattern: a value is expected after '='";
const PATTERN_DEF_LHS_MUST_BE_PATTERN_IDENT: &str =
    "the left side of a pattern definition must be a pattern identifier, example: pattern user = {name: str}";
const PNAMESPACE_DEF_LHS_MUST_BE_PATTERN_NAMESPACE_IDENT: &str =
    "the left side of a pattern namespace definition must be a pattern namespace identifier";

impl Parser {
    /// `%…` pattern construct; the cursor is on the `%`.
    pub(crate) fn parse_percent_prefixed_pattern(
        &mut self,
        preceded_by_opening_paren: bool,
    ) -> Node {
        self.check_cancellation();

        let start = self.pos();
        self.i += 1;

        if self.eof() {
            self.tokens.push(quill_ir::Token::with_raw(
                TokenKind::UnexpectedChar,
                Span::new(start, start + 1),
                "%",
            ));
            return Node::with_error(
                self.span_from(start),
                NodeKind::UnknownNode,
                ParsingError::unspecified(errors::UNTERMINATED_PATT),
            );
        }

        #[allow(clippy::unwrap_used)] // non-eof checked above
        let r = self.cur().unwrap();
        match r {
            '|' => {
                let in_pattern_save = self.in_pattern;
                self.in_pattern = true;
                let union = self.parse_pattern_union_inner(
                    start,
                    true,
                    None,
                    preceded_by_opening_paren,
                );
                self.in_pattern = in_pattern_save;
                self.eat_space();
                union
            }
            '.' | '/' => {
                self.i -= 1;
                self.parse_path_like_expression(true)
            }
            ':' => {
                self.i += 1;
                self.parse_url_like_pattern(start)
            }
            '{' => {
                self.i -= 1;
                let in_pattern_save = self.in_pattern;
                self.in_pattern = true;
                let node = self.parse_object_record_pattern_literal(false);
                self.in_pattern = in_pattern_save;
                node
            }
            '[' => {
                self.i -= 1;
                let in_pattern_save = self.in_pattern;
                self.in_pattern = true;
                let node = self.parse_list_tuple_pattern_literal(false);
                self.in_pattern = in_pattern_save;
                node
            }
            '(' => {
                // pattern conversion: %(expr)
                let in_pattern_save = self.in_pattern;
                self.in_pattern = false;
                let (expr, _) = self.parse_expression_inner(false);
                self.in_pattern = in_pattern_save;
                Node::new(
                    Span::new(start, expr.span().end),
                    NodeKind::PatternConversionExpression {
                        expr: Box::new(expr),
                    },
                )
            }
            '<' => self.parse_markup_pattern_expression(start),
            '`' => self.parse_regex_literal(start),
            '-' => self.parse_option_pattern_literal(start, None),
            r if is_alpha(r) => {
                self.i -= 1;
                self.parse_percent_alpha_starting_expr()
            }
            _ => Node::with_error(
                self.span_from(start),
                NodeKind::UnknownNode,
                ParsingError::unspecified(errors::UNTERMINATED_PATT),
            ),
        }
    }

    /// `%name`, `%ns.member`, `%str(…)`, `%fn(…)`, pattern calls and the
    /// trailing `?` optional marker.
    pub(crate) fn parse_percent_alpha_starting_expr(&mut self) -> Node {
        let start = self.pos();
        self.i += 1; // '%'

        let name_start = self.pos();
        while self.cur().is_some_and(is_ident_char) {
            self.i += 1;
        }
        let name = self.slice_str(name_start, self.pos());
        self.push_raw_token(TokenKind::PatternIdentifier, self.span_from(start));

        let ident = Node::new(
            self.span_from(start),
            NodeKind::PatternIdentifierLiteral {
                name: name.clone().into(),
                unprefixed: false,
            },
        );

        let mut left = ident;
        let mut is_plain_ident = true;

        // pattern namespace member: %ns.member
        if self.cur_is('.') {
            self.i += 1;
            let namespace = Node::new(
                self.span_from(start),
                NodeKind::PatternNamespaceIdentifierLiteral {
                    name: name.clone().into(),
                    unprefixed: false,
                },
            );

            if self.eof()
                || self.cur().is_some_and(is_delim)
                || self.cur().is_some_and(is_space_not_lf)
            {
                return namespace;
            }

            let member_start = self.pos();
            if !self.cur().is_some_and(is_ident_first_char) {
                #[allow(clippy::unwrap_used)] // non-eof checked above
                let r = self.cur().unwrap();
                return Node::with_error(
                    self.span_from(start),
                    NodeKind::PatternNamespaceMemberExpression {
                        namespace: Box::new(namespace),
                        member_name: Box::new(Node::new(
                            Span::point(self.pos()),
                            NodeKind::IdentifierLiteral { name: "".into() },
                        )),
                    },
                    ParsingError::unspecified(format!(
                        "pattern namespace member should start with a letter, not '{r}'"
                    )),
                );
            }
            while self.cur().is_some_and(is_ident_char) {
                self.i += 1;
            }
            left = Node::new(
                self.span_from(start),
                NodeKind::PatternNamespaceMemberExpression {
                    namespace: Box::new(namespace),
                    member_name: Box::new(Node::new(
                        self.span_from(member_start),
                        NodeKind::IdentifierLiteral {
                            name: self.slice_str(member_start, self.pos()).into(),
                        },
                    )),
                },
            );
            is_plain_ident = false;
        }

        if !self.eof() {
            if is_plain_ident && name == "fn" {
                return self.parse_function_pattern(start);
            }
            match self.cur() {
                Some('(') if is_plain_ident && name == "str" => {
                    self.i += 1;
                    return self.parse_complex_string_pattern_piece(start, Some(left));
                }
                Some('(' | '{') => return self.parse_pattern_call(left),
                Some('?') => {
                    self.i += 1;
                    return Node::new(
                        self.span_from(start),
                        NodeKind::OptionalPatternExpression {
                            pattern: Box::new(left),
                        },
                    );
                }
                Some(':')
                    if is_plain_ident
                        && crate::grammar::urls::SCHEMES.contains(&name.as_str()) =>
                {
                    self.i += 1;
                    return self.parse_url_like_pattern(start);
                }
                _ => {}
            }
        }

        left
    }

    /// Pattern construct from an identifier parsed in pattern context.
    pub(crate) fn unprefixed_pattern_from_ident(&mut self, ident: &Node, name: &str) -> Node {
        let mut result = Node::new(
            ident.span(),
            NodeKind::PatternIdentifierLiteral {
                name: name.into(),
                unprefixed: true,
            },
        );
        result.base.err = ident.base.err.clone();

        if name == "str" && self.cur_is('(') {
            self.i += 1;
            return self.parse_complex_string_pattern_piece(ident.span().start, Some(result));
        }

        match self.cur() {
            Some('(' | '{') => self.parse_pattern_call(result),
            Some('?') => {
                self.i += 1;
                Node::new(
                    Span::new(result.span().start, self.pos()),
                    NodeKind::OptionalPatternExpression {
                        pattern: Box::new(result),
                    },
                )
            }
            _ => result,
        }
    }

    /// Pattern namespace member from `ns.member` parsed in pattern
    /// context.
    pub(crate) fn unprefixed_pattern_namespace_member(
        &mut self,
        whole: &Node,
        left: &Node,
        property_names: &[Node],
    ) -> Node {
        let namespace = Node::new(
            // one extra rune for the dot
            Span::new(left.span().start, left.span().end + 1),
            NodeKind::PatternNamespaceIdentifierLiteral {
                name: match &left.kind {
                    NodeKind::IdentifierLiteral { name } => name.clone(),
                    _ => "".into(),
                },
                unprefixed: true,
            },
        );
        let result = Node::new(
            whole.span(),
            NodeKind::PatternNamespaceMemberExpression {
                namespace: Box::new(namespace),
                member_name: Box::new(property_names[0].clone()),
            },
        );

        match self.cur() {
            Some('(' | '{') => self.parse_pattern_call(result),
            Some('?') => {
                self.i += 1;
                Node::new(
                    Span::new(result.span().start, self.pos()),
                    NodeKind::OptionalPatternExpression {
                        pattern: Box::new(result),
                    },
                )
            }
            _ => result,
        }
    }

    /// Union with a leading pipe: `%| a | b` or `| a | b` (pattern
    /// context). The cursor is on the first `|` (or on `%`).
    pub(crate) fn parse_pattern_union(&mut self, start: u32, leading_pipe: bool) -> Node {
        let _ = leading_pipe;
        self.parse_pattern_union_inner(start, false, None, false)
    }

    /// Union without a leading pipe, first case already parsed.
    pub(crate) fn parse_pattern_union_with_first_case(
        &mut self,
        start: u32,
        first_case: Node,
        preceded_by_opening_paren: bool,
    ) -> Node {
        let mut union = self.parse_pattern_union_inner(
            start,
            false,
            Some(first_case),
            preceded_by_opening_paren,
        );
        if preceded_by_opening_paren {
            self.eat_space_newline();
            if self.cur_is(')') {
                self.push_token(
                    TokenKind::ClosingParenthesis,
                    Span::new(self.pos(), self.pos() + 1),
                );
                self.i += 1;
                union.base.span.end = self.pos();
                union.base.parenthesized = true;
            } else {
                union.set_error_if_none(ParsingError::new(
                    ParsingErrorKind::UnterminatedPatternUnion,
                    "unterminated pattern union: missing closing parenthesis",
                ));
            }
        }
        union
    }

    /// Relaxed form used in statement position: `pattern p = | 1 | 2`
    /// without parentheses. Returns `Err(first_case)` when no pipe
    /// follows.
    pub(crate) fn try_parse_pattern_union_without_leading_pipe(
        &mut self,
        first_case: Node,
        preceded_by_opening_paren: bool,
    ) -> Result<Node, Node> {
        let start_index = first_case.span().start;

        if preceded_by_opening_paren {
            if !self.trivia_followed_by(Trivia::NEWLINE | Trivia::COMMENT, '|') {
                return Err(first_case);
            }
            self.eat_space_newline_comment();
        } else {
            let mut temp_index = self.i;
            while temp_index < self.len && self.at(temp_index).is_some_and(is_space_not_lf) {
                temp_index += 1;
            }
            if self.at(temp_index) != Some('|') {
                return Err(first_case);
            }
            self.eat_space_newline();
        }

        Ok(self.parse_pattern_union_inner(
            start_index,
            false,
            Some(first_case),
            preceded_by_opening_paren,
        ))
    }

    fn parse_pattern_union_inner(
        &mut self,
        start: u32,
        is_percent_prefixed: bool,
        case_before_first_pipe: Option<Node>,
        preceded_by_opening_paren: bool,
    ) -> Node {
        self.check_cancellation();

        let mut cases = Vec::new();
        if let Some(case) = case_before_first_pipe {
            cases.push(case);
        }

        if is_percent_prefixed {
            self.push_token(
                TokenKind::PatternUnionOpeningPipe,
                Span::new(self.pos() - 1, self.pos() + 1),
            );
        } else {
            self.push_token(
                TokenKind::PatternUnionPipe,
                Span::new(self.pos(), self.pos() + 1),
            );
        }
        self.i += 1;

        let eat_non_significant = |p: &mut Parser| {
            if preceded_by_opening_paren {
                p.eat_space_newline_comma_comment();
            } else {
                p.eat_space();
            }
        };

        eat_non_significant(self);

        let in_pattern_save = self.in_pattern;
        self.in_pattern = true;

        let (case, _) = self.parse_expression_inner(false);
        cases.push(case);
        eat_non_significant(self);

        let mut err = None;
        while let Some(r) = self.cur() {
            if !(r == '|'
                || (preceded_by_opening_paren && r == '\n')
                || !is_unpaired_or_closing_delim(r))
            {
                break;
            }
            eat_non_significant(self);

            if !self.cur_is('|') {
                err = Some(ParsingError::unspecified(
                    INVALID_PATT_UNION_ELEMENT_SEPARATOR,
                ));
                break;
            }
            self.push_token(
                TokenKind::PatternUnionPipe,
                Span::new(self.pos(), self.pos() + 1),
            );
            self.i += 1;
            eat_non_significant(self);

            let (case, _) = self.parse_expression_inner(false);
            cases.push(case);
            eat_non_significant(self);
        }

        self.in_pattern = in_pattern_save;

        let mut node = Node::new(self.span_from(start), NodeKind::PatternUnion { cases });
        if let Some(err) = err {
            node.base.err = Some(err);
        }
        node
    }

    /// `name(…)` / `name{…}` pattern call; the cursor is on the opener.
    pub(crate) fn parse_pattern_call(&mut self, callee: Node) -> Node {
        self.check_cancellation();

        let mut arguments = Vec::new();
        let mut err = None;
        let callee_start = callee.span().start;

        let in_pattern_save = self.in_pattern;
        self.in_pattern = true;

        match self.cur() {
            Some('(') => {
                self.push_token(
                    TokenKind::OpeningParenthesis,
                    Span::new(self.pos(), self.pos() + 1),
                );
                self.i += 1;
                self.eat_space_comma();

                while !self.eof() && !self.cur_is(')') {
                    let (arg, is_missing) = self.parse_expression_inner(false);
                    if is_missing {
                        #[allow(clippy::unwrap_used)] // missing-expr only before eof here
                        let r = self.cur().unwrap();
                        let span = Span::new(self.pos(), self.pos() + 1);
                        self.tokens.push(quill_ir::Token::with_raw(
                            TokenKind::UnexpectedChar,
                            span,
                            r.to_string(),
                        ));
                        self.i += 1;
                        arguments.push(Node::with_error(
                            span,
                            NodeKind::UnknownNode,
                            ParsingError::unspecified(errors::fmt_unexpected_char_in(
                                r,
                                "pattern call arguments",
                            )),
                        ));
                    } else {
                        arguments.push(arg);
                    }
                    self.eat_space_comma();
                }

                if !self.cur_is(')') {
                    err = Some(ParsingError::unspecified(
                        UNTERMINATED_PATTERN_CALL_MISSING_CLOSING_PAREN,
                    ));
                } else {
                    self.push_token(
                        TokenKind::ClosingParenthesis,
                        Span::new(self.pos(), self.pos() + 1),
                    );
                    self.i += 1;
                }
            }
            _ => {
                // `name{…}`: single object pattern argument
                let (arg, _) = self.parse_expression_inner(false);
                arguments.push(arg);
            }
        }

        self.in_pattern = in_pattern_save;

        let mut node = Node::new(
            self.span_from(callee_start),
            NodeKind::PatternCallExpression {
                callee: Box::new(callee),
                arguments,
            },
        );
        if let Some(err) = err {
            node.base.err = Some(err);
        }
        node
    }

    /// Regex literal `` `…` ``; `start` is the node start (`%` or the
    /// backtick), the cursor is on the backtick.
    pub(crate) fn parse_regex_literal(&mut self, start: u32) -> Node {
        self.i += 1;
        while !self.eof()
            && (!self.cur_is('`')
                || crate::chars::count_prev_backslashes(&self.s, self.i) % 2 == 1)
        {
            self.i += 1;
        }

        let mut err = None;
        let raw;
        let value;
        let prefix_len = (self.at(start as usize) == Some('%')) as usize + 1;

        if self.eof() {
            raw = self.slice_str(start, self.pos());
            value = raw.chars().skip(prefix_len).collect::<String>();
            err = Some(ParsingError::unspecified(UNTERMINATED_REGEX_LIT));
        } else {
            self.i += 1;
            raw = self.slice_str(start, self.pos());
            value = raw
                .chars()
                .skip(prefix_len)
                .take(raw.chars().count() - prefix_len - 1)
                .collect::<String>();
            if let Err(compile_err) = regex::Regex::new(&value) {
                err = Some(ParsingError::unspecified(format!(
                    "invalid regex literal: {compile_err}"
                )));
            }
        }

        self.push_raw_token(TokenKind::RegexLiteral, self.span_from(start));
        let mut node = Node::new(
            self.span_from(start),
            NodeKind::RegexLiteral {
                value: value.into(),
                raw: raw.into(),
            },
        );
        if let Some(err) = err {
            node.base.err = Some(err);
        }
        node
    }

    /// `%-name=value` option pattern. When `unprefixed` is set the name
    /// was already consumed by the dash-starting parser.
    pub(crate) fn parse_option_pattern_literal(
        &mut self,
        start: u32,
        unprefixed: Option<(String, bool)>,
    ) -> Node {
        let in_pattern_save = self.in_pattern;
        self.in_pattern = true;

        let (name, single_dash) = match unprefixed {
            Some((name, single_dash)) => (name, single_dash),
            None => {
                self.i += 1; // '-'
                if self.eof() {
                    self.in_pattern = in_pattern_save;
                    return Node::with_error(
                        self.span_from(start),
                        NodeKind::OptionPatternLiteral {
                            name: "".into(),
                            value: None,
                            single_dash: true,
                        },
                        ParsingError::unspecified(DASH_SHOULD_BE_FOLLOWED_BY_OPTION_NAME),
                    );
                }
                let mut single_dash = true;
                if self.cur_is('-') {
                    single_dash = false;
                    self.i += 1;
                }
                let name_start = self.pos();
                if !self.cur().is_some_and(|r| is_alpha(r) || is_dec_digit(r)) {
                    self.in_pattern = in_pattern_save;
                    return Node::with_error(
                        self.span_from(start),
                        NodeKind::OptionPatternLiteral {
                            name: "".into(),
                            value: None,
                            single_dash,
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
                (self.slice_str(name_start, self.pos()), single_dash)
            }
        };

        if !self.cur_is('=') {
            self.in_pattern = in_pattern_save;
            return Node::with_error(
                self.span_from(start),
                NodeKind::OptionPatternLiteral {
                    name: name.into(),
                    value: None,
                    single_dash,
                },
                ParsingError::unspecified(UNTERMINATED_OPTION_PATT_MISSING_EQUAL_SIGN),
            );
        }
        self.push_token(TokenKind::Equal, Span::new(self.pos(), self.pos() + 1));
        self.i += 1;

        if self.eof() {
            self.in_pattern = in_pattern_save;
            return Node::with_error(
                self.span_from(start),
                NodeKind::OptionPatternLiteral {
                    name: name.into(),
                    value: None,
                    single_dash,
                },
                ParsingError::new(
                    ParsingErrorKind::UnterminatedOptionExpr,
                    UNTERMINATED_OPTION_PATT_MISSING_EQUAL_SIGN,
                ),
            );
        }

        let (value, _) = self.parse_expression_inner(false);
        self.in_pattern = in_pattern_save;

        Node::new(
            self.span_from(start),
            NodeKind::OptionPatternLiteral {
                name: name.into(),
                value: Some(Box::new(value)),
                single_dash,
            },
        )
    }

    /// `readonly <pattern>`.
    pub(crate) fn parse_readonly_pattern_expression(&mut self, readonly_ident: Node) -> Node {
        let start = readonly_ident.span().start;
        self.push_token(TokenKind::Readonly, readonly_ident.span());
        self.eat_space();

        let (pattern, _) = self.parse_expression_inner(false);
        Node::new(
            self.span_from(start),
            NodeKind::ReadonlyPatternExpression {
                pattern: Box::new(pattern),
            },
        )
    }

    /// `pattern <name> = [@] <pattern>` definition; the `pattern` keyword
    /// was already parsed.
    pub(crate) fn parse_pattern_definition(&mut self, keyword: Node) -> Node {
        let start = keyword.span().start;
        self.push_token(TokenKind::Pattern, keyword.span());
        self.eat_space();

        if self.eof() {
            return Node::with_error(
                self.span_from(start),
                NodeKind::PatternDefinition {
                    left: None,
                    right: None,
                    lazy: false,
                },
                ParsingError::new(
                    ParsingErrorKind::UnterminatedPatternDefinition,
                    "unterminated pattern definition: missing pattern name",
                ),
            );
        }

        let left = if self.cur().is_some_and(is_ident_first_char) {
            let name_start = self.pos();
            while self.cur().is_some_and(is_ident_char) {
                self.i += 1;
            }
            let span = self.span_from(name_start);
            self.push_raw_token(TokenKind::UnprefixedPatternIdentifier, span);
            Node::new(
                span,
                NodeKind::PatternIdentifierLiteral {
                    name: self.slice_str(name_start, self.pos()).into(),
                    unprefixed: true,
                },
            )
        } else {
            let (bad, _) = self.parse_expression_inner(false);
            let mut bad = bad;
            bad.set_error_if_none(ParsingError::unspecified(
                PATTERN_DEF_LHS_MUST_BE_PATTERN_IDENT,
            ));
            bad
        };

        self.eat_space();

        if !self.cur_is('=') {
            return Node::with_error(
                self.span_from(start),
                NodeKind::PatternDefinition {
                    left: Some(Box::new(left)),
                    right: None,
                    lazy: false,
                },
                ParsingError::new(
                    ParsingErrorKind::UnterminatedPatternDefinition,
                    "unterminated pattern definition: missing '=' after the pattern name",
                ),
            );
        }
        self.push_token(TokenKind::Equal, Span::new(self.pos(), self.pos() + 1));
        self.i += 1;
        self.eat_space();

        // lazy marker
        let mut lazy = false;
        if self.cur_is('@') && self.peek(1).is_some_and(|r| r == ' ' || r == '%') {
            lazy = true;
            self.push_token(TokenKind::AtSign, Span::new(self.pos(), self.pos() + 1));
            self.i += 1;
            self.eat_space();
        }

        if self.eof() {
            return Node::with_error(
                self.span_from(start),
                NodeKind::PatternDefinition {
                    left: Some(Box::new(left)),
                    right: None,
                    lazy,
                },
                ParsingError::new(
                    ParsingErrorKind::UnterminatedPatternDefinition,
                    "unterminated pattern definition: missing the pattern after '='",
                ),
            );
        }

        let in_pattern_save = self.in_pattern;
        self.in_pattern = true;
        let (parsed, _) = self.parse_expression_inner(false);
        let right = match self.try_parse_pattern_union_without_leading_pipe(parsed, false) {
            Ok(union) => union,
            Err(original) => original,
        };
        self.in_pattern = in_pattern_save;

        Node::new(
            self.span_from(start),
            NodeKind::PatternDefinition {
                left: Some(Box::new(left)),
                right: Some(Box::new(right)),
                lazy,
            },
        )
    }

    /// `pnamespace <name>. = <object>` definition.
    pub(crate) fn parse_pattern_namespace_definition(&mut self, keyword: Node) -> Node {
        let start = keyword.span().start;
        self.push_token(TokenKind::PNamespace, keyword.span());
        self.eat_space();

        let left = if self.cur().is_some_and(is_ident_first_char) {
            let name_start = self.pos();
            while self.cur().is_some_and(is_ident_char) {
                self.i += 1;
            }
            // trailing '.' of the namespace name
            if self.cur_is('.') {
                self.i += 1;
            }
            let span = self.span_from(name_start);
            self.push_raw_token(TokenKind::UnprefixedPatternNamespaceIdentifier, span);
            Node::new(
                span,
                NodeKind::PatternNamespaceIdentifierLiteral {
                    name: self
                        .slice_str(name_start, self.pos())
                        .trim_end_matches('.')
                        .into(),
                    unprefixed: true,
                },
            )
        } else {
            let (mut bad, _) = self.parse_expression_inner(false);
            bad.set_error_if_none(ParsingError::unspecified(
                PNAMESPACE_DEF_LHS_MUST_BE_PATTERN_NAMESPACE_IDENT,
            ));
            bad
        };

        self.eat_space();

        if !self.cur_is('=') {
            return Node::with_error(
                self.span_from(start),
                NodeKind::PatternNamespaceDefinition {
                    left: Some(Box::new(left)),
                    right: None,
                },
                ParsingError::new(
                    ParsingErrorKind::UnterminatedPatternNamespaceDefinition,
                    "unterminated pattern namespace definition: missing '=' after the name",
                ),
            );
        }
        self.push_token(TokenKind::Equal, Span::new(self.pos(), self.pos() + 1));
        self.i += 1;
        self.eat_space();

        if self.eof() {
            return Node::with_error(
                self.span_from(start),
                NodeKind::PatternNamespaceDefinition {
                    left: Some(Box::new(left)),
                    right: None,
                },
                ParsingError::new(
                    ParsingErrorKind::UnterminatedPatternNamespaceDefinition,
                    "unterminated pattern namespace definition: missing the value after '='",
                ),
            );
        }

        let (right, _) = self.parse_expression_inner(false);
        Node::new(
            self.span_from(start),
            NodeKind::PatternNamespaceDefinition {
                left: Some(Box::new(left)),
                right: Some(Box::new(right)),
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
    fn pattern_identifier() {
        let node = parse("%int");
        assert!(matches!(
            &node.kind,
            NodeKind::PatternIdentifierLiteral { name, unprefixed: false } if &**name == "int"
        ));
    }

    #[test]
    fn pattern_namespace_member() {
        let node = parse("%ns.member");
        match &node.kind {
            NodeKind::PatternNamespaceMemberExpression {
                namespace,
                member_name,
            } => {
                assert!(matches!(
                    &namespace.kind,
                    NodeKind::PatternNamespaceIdentifierLiteral { name, .. } if &**name == "ns"
                ));
                assert!(matches!(
                    &member_name.kind,
                    NodeKind::IdentifierLiteral { name } if &**name == "member"
                ));
            }
            other => panic!("expected namespace member, got {other:?}"),
        }
    }

    #[test]
    fn optional_pattern() {
        let node = parse("%int?");
        assert!(matches!(node.kind, NodeKind::OptionalPatternExpression { .. }));
    }

    #[test]
    fn pattern_union_with_leading_pipe() {
        let node = parse("%| 1 | 2");
        match &node.kind {
            NodeKind::PatternUnion { cases } => assert_eq!(cases.len(), 2),
            other => panic!("expected union, got {other:?}"),
        }
        assert!(node.base.err.is_none());
    }

    #[test]
    fn pattern_call() {
        let node = parse("%int(0..10)");
        match &node.kind {
            NodeKind::PatternCallExpression { arguments, .. } => {
                assert_eq!(arguments.len(), 1);
                assert!(matches!(
                    arguments[0].kind,
                    NodeKind::IntegerRangeLiteral { .. }
                ));
            }
            other => panic!("expected pattern call, got {other:?}"),
        }
    }

    #[test]
    fn pattern_conversion() {
        let node = parse("%(1)");
        assert!(matches!(node.kind, NodeKind::PatternConversionExpression { .. }));
    }

    #[test]
    fn regex_literal() {
        let node = parse("%`a+b`");
        match &node.kind {
            NodeKind::RegexLiteral { value, .. } => assert_eq!(&**value, "a+b"),
            other => panic!("expected regex, got {other:?}"),
        }
        assert!(node.base.err.is_none());

        let node = parse("%`a(`");
        assert!(node.base.err.is_some());

        let node = parse("%`abc");
        assert!(node
            .base
            .err
            .as_ref()
            .is_some_and(|e| e.message.contains("unterminated")));
    }

    #[test]
    fn option_pattern() {
        let node = parse("%-name=1");
        match &node.kind {
            NodeKind::OptionPatternLiteral {
                name, single_dash, ..
            } => {
                assert_eq!(&**name, "name");
                assert!(single_dash);
            }
            other => panic!("expected option pattern, got {other:?}"),
        }
    }

    #[test]
    fn lone_percent_is_an_error() {
        let node = parse("%");
        assert!(node
            .base
            .err
            .as_ref()
            .is_some_and(|e| e.message.contains("unterminated pattern")));
    }
}
