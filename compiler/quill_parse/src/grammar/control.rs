//! Control flow: if/for/walk/switch/match, statement and expression
//! forms.
//!
//! The expression forms are parenthesized (`(if cond a else b)`); inside
//! markup interpolations the unparenthesized form is accepted and the
//! caller passes no opening parenthesis index.

use crate::errors;
use crate::Parser;
use quill_diagnostic::{ParsingError, ParsingErrorKind};
use quill_ir::{Node, NodeKind, Span, Token, TokenKind};

const UNTERMINATED_IF_STMT_MISSING_BLOCK: &str = "unterminated if statement, missing block";
const UNTERMINATED_IF_EXPR_MISSING_VALUE: &str =
    "unterminated if expression, missing value after the test";
const UNTERMINATED_IF_EXPR_MISSING_CLOSING_PAREN: &str =
    "unterminated if expression, missing closing parenthesis";
const UNTERMINATED_FOR_STMT_MISSING_BLOCK: &str = "unterminated for statement, missing block";
const INVALID_FOR_STMT_MISSING_IN_KEYWORD: &str =
    "invalid for statement, missing 'in' keyword";
const UNTERMINATED_WALK_STMT_MISSING_ENTRY_VAR: &str =
    "unterminated walk statement, missing the entry variable";
const UNTERMINATED_WALK_STMT_MISSING_BLOCK: &str = "unterminated walk statement, missing block";
const UNTERMINATED_SWITCH_STMT_MISSING_VALUE: &str =
    "unterminated switch statement, missing value";
const UNTERMINATED_MATCH_STMT_MISSING_VALUE: &str =
    "unterminated match statement, missing value";
const UNTERMINATED_SWITCH_STMT_MISSING_BODY: &str =
    "unterminated switch statement, missing body";
const UNTERMINATED_MATCH_STMT_MISSING_BODY: &str = "unterminated match statement, missing body";
const UNTERMINATED_SWITCH_STMT_MISSING_CLOSING_BRACE: &str =
    "unterminated switch statement, missing closing brace '}'";
const UNTERMINATED_MATCH_STMT_MISSING_CLOSING_BRACE: &str =
    "unterminated match statement, missing closing brace '}'";
const INVALID_SWITCH_CASE_VALUE: &str =
    "invalid switch case: only simple value literals are supported";
const DEFAULTCASE_KEYWORD: &str = "defaultcase";

impl Parser {
    // ===== if =====

    /// `if <test> { … } [else if … | else { … }]`; the `if` identifier was
    /// parsed.
    pub(crate) fn parse_if_statement(&mut self, if_ident: Node) -> Node {
        let start = if_ident.span().start;
        self.push_token(TokenKind::If, if_ident.span());

        self.eat_space();
        let (test, _) = self.parse_expression_inner(false);
        self.eat_space();

        let mut err = None;
        let mut consequent = None;
        let mut alternate = None;

        if self.eof() {
            err = Some(ParsingError::new(
                ParsingErrorKind::MissingBlock,
                UNTERMINATED_IF_STMT_MISSING_BLOCK,
            ));
        } else if !self.cur_is('{') {
            #[allow(clippy::unwrap_used)] // non-eof checked above
            let r = self.cur().unwrap();
            err = Some(ParsingError::new(
                ParsingErrorKind::MissingBlock,
                format!(
                    "invalid if statement, test expression should be followed by a block, not '{r}'"
                ),
            ));
        } else {
            consequent = Some(Box::new(self.parse_block()));
            self.eat_space();

            if self.keyword_ahead("else") {
                self.push_token(TokenKind::Else, Span::new(self.pos(), self.pos() + 4));
                self.i += 4;
                self.eat_space();

                if self.keyword_ahead("if") {
                    // else-if chain: the alternate is a nested if statement
                    let nested_if_start = self.pos();
                    self.i += 2;
                    let nested_ident = Node::new(
                        Span::new(nested_if_start, nested_if_start + 2),
                        NodeKind::IdentifierLiteral { name: "if".into() },
                    );
                    alternate = Some(Box::new(self.parse_if_statement(nested_ident)));
                } else if self.cur_is('{') {
                    alternate = Some(Box::new(self.parse_block()));
                } else if self.eof() {
                    err = Some(ParsingError::new(
                        ParsingErrorKind::MissingBlock,
                        "unterminated if statement, missing block after 'else'",
                    ));
                } else {
                    #[allow(clippy::unwrap_used)] // non-eof checked above
                    let r = self.cur().unwrap();
                    err = Some(ParsingError::new(
                        ParsingErrorKind::MissingBlock,
                        format!(
                            "invalid if statement, 'else' should be followed by a block or 'if', not '{r}'"
                        ),
                    ));
                }
            }
        }

        let mut node = Node::new(
            self.span_from(start),
            NodeKind::IfStatement {
                test: Box::new(test),
                consequent,
                alternate,
            },
        );
        if let Some(err) = err {
            node.base.err = Some(err);
        }
        node
    }

    /// `(if <test> <consequent> [else <alternate>])`. `opening_paren` is
    /// `None` in markup interpolations where no closing parenthesis is
    /// required.
    pub(crate) fn parse_if_expression(
        &mut self,
        opening_paren: Option<u32>,
        keyword_start: u32,
    ) -> Node {
        let start = opening_paren.unwrap_or(keyword_start);
        self.push_token(TokenKind::If, Span::new(keyword_start, keyword_start + 2));

        self.eat_space_newline_comment();
        let (test, _) = self.parse_expression_inner(false);
        self.eat_space_newline_comment();

        let mut err = None;
        let mut consequent = None;
        let mut alternate = None;

        if self.eof() || self.cur_is(')') {
            err = Some(ParsingError::unspecified(UNTERMINATED_IF_EXPR_MISSING_VALUE));
        } else {
            let (value, _) = self.parse_expression_inner(false);
            consequent = Some(Box::new(value));
            self.eat_space_newline_comment();

            if self.keyword_ahead("else") {
                self.push_token(TokenKind::Else, Span::new(self.pos(), self.pos() + 4));
                self.i += 4;
                self.eat_space_newline_comment();
                let (other, missing) = self.parse_expression_inner(false);
                if missing {
                    err = Some(ParsingError::unspecified(UNTERMINATED_IF_EXPR_MISSING_VALUE));
                }
                alternate = Some(Box::new(other));
                self.eat_space_newline_comment();
            }
        }

        let mut node = Node::new(
            self.span_from(start),
            NodeKind::IfExpression {
                test: Box::new(test),
                consequent,
                alternate,
            },
        );
        node.base.parenthesized = opening_paren.is_some();

        if opening_paren.is_some() {
            if self.cur_is(')') {
                self.push_token(
                    TokenKind::ClosingParenthesis,
                    Span::new(self.pos(), self.pos() + 1),
                );
                self.i += 1;
                node.base.span.end = self.pos();
            } else if err.is_none() {
                err = Some(ParsingError::unspecified(
                    UNTERMINATED_IF_EXPR_MISSING_CLOSING_PAREN,
                ));
            }
        }
        if let Some(err) = err {
            node.set_error_if_none(err);
        }
        node
    }

    // ===== for =====

    /// Head shared by the for statement and expression:
    /// `[chunked] [%keypatt] k, [%valpatt] v in <iterated>` or a plain
    /// `<iterated>`.
    fn parse_for_head(
        &mut self,
        err: &mut Option<ParsingError>,
    ) -> (
        Option<Box<Node>>,
        Option<Box<Node>>,
        Option<Box<Node>>,
        Option<Box<Node>>,
        Option<Box<Node>>,
        bool,
    ) {
        let mut key_pattern = None;
        let mut key_index_var = None;
        let mut value_pattern = None;
        let mut value_elem_var = None;
        let iterated_value;
        let mut chunked = false;

        if self.keyword_ahead("chunked") {
            chunked = true;
            self.push_token(TokenKind::Chunked, Span::new(self.pos(), self.pos() + 7));
            self.i += 7;
            self.eat_space();
        }

        let mut first_pattern = None;
        if self.cur_is('%') {
            first_pattern = Some(self.parse_percent_prefixed_pattern(false));
            self.eat_space();
            if self.cur_is('{') {
                // variable-less: the pattern is the iterated value
                return (
                    None,
                    None,
                    None,
                    None,
                    first_pattern.map(Box::new),
                    chunked,
                );
            }
        }

        let (first, _) = self.parse_expression_inner(false);
        self.eat_space();

        let first_is_var = matches!(
            first.kind,
            NodeKind::IdentifierLiteral { .. } | NodeKind::Variable { .. }
        );

        if first_is_var && self.cur_is(',') {
            // key, value form
            key_pattern = first_pattern.map(Box::new);
            key_index_var = Some(Box::new(first));
            self.push_token(TokenKind::Comma, Span::new(self.pos(), self.pos() + 1));
            self.i += 1;
            self.eat_space();

            if self.cur_is('%') {
                value_pattern = Some(Box::new(self.parse_percent_prefixed_pattern(false)));
                self.eat_space();
            }
            let (value_var, _) = self.parse_expression_inner(false);
            value_elem_var = Some(Box::new(value_var));
            self.eat_space();

            if self.keyword_ahead("in") {
                self.push_token(TokenKind::In, Span::new(self.pos(), self.pos() + 2));
                self.i += 2;
                self.eat_space();
                let (iterated, _) = self.parse_expression_inner(false);
                iterated_value = Some(Box::new(iterated));
            } else {
                err.get_or_insert_with(|| {
                    ParsingError::unspecified(INVALID_FOR_STMT_MISSING_IN_KEYWORD)
                });
                iterated_value = None;
            }
        } else if first_is_var && self.keyword_ahead("in") {
            // value form
            value_pattern = first_pattern.map(Box::new);
            value_elem_var = Some(Box::new(first));
            self.push_token(TokenKind::In, Span::new(self.pos(), self.pos() + 2));
            self.i += 2;
            self.eat_space();
            let (iterated, _) = self.parse_expression_inner(false);
            iterated_value = Some(Box::new(iterated));
        } else {
            // variable-less
            iterated_value = Some(Box::new(first));
        }

        (
            key_pattern,
            key_index_var,
            value_pattern,
            value_elem_var,
            iterated_value,
            chunked,
        )
    }

    pub(crate) fn parse_for_statement(&mut self, for_ident: Node) -> Node {
        let start = for_ident.span().start;
        self.push_token(TokenKind::For, for_ident.span());
        self.eat_space();

        let mut err = None;
        let (key_pattern, key_index_var, value_pattern, value_elem_var, iterated_value, chunked) =
            self.parse_for_head(&mut err);

        self.eat_space();
        let mut body = None;
        if !self.cur_is('{') {
            err.get_or_insert_with(|| {
                ParsingError::new(
                    ParsingErrorKind::MissingBlock,
                    UNTERMINATED_FOR_STMT_MISSING_BLOCK,
                )
            });
        } else {
            body = Some(Box::new(self.parse_block()));
        }

        let mut node = Node::new(
            self.span_from(start),
            NodeKind::ForStatement {
                key_pattern,
                key_index_var,
                value_pattern,
                value_elem_var,
                iterated_value,
                chunked,
                body,
            },
        );
        if let Some(err) = err {
            node.base.err = Some(err);
        }
        node
    }

    /// `(for <vars> in <iterated>: <result>)`.
    pub(crate) fn parse_for_expression(
        &mut self,
        opening_paren: Option<u32>,
        keyword_start: u32,
    ) -> Node {
        let start = opening_paren.unwrap_or(keyword_start);
        self.push_token(TokenKind::For, Span::new(keyword_start, keyword_start + 3));
        self.eat_space();

        let mut err = None;
        let (key_pattern, key_index_var, value_pattern, value_elem_var, iterated_value, chunked) =
            self.parse_for_head(&mut err);

        self.eat_space();
        let mut body = None;
        if self.cur_is(':') {
            self.push_token(TokenKind::Colon, Span::new(self.pos(), self.pos() + 1));
            self.i += 1;
            self.eat_space_newline_comment();
            let (result, _) = self.parse_expression_inner(false);
            body = Some(Box::new(result));
            self.eat_space_newline_comment();
        } else {
            err.get_or_insert_with(|| {
                ParsingError::new(
                    ParsingErrorKind::UnterminatedForExpr,
                    "unterminated for expression, missing ':' and the result expression",
                )
            });
        }

        let mut node = Node::new(
            self.span_from(start),
            NodeKind::ForExpression {
                key_pattern,
                key_index_var,
                value_pattern,
                value_elem_var,
                iterated_value,
                chunked,
                body,
            },
        );
        node.base.parenthesized = opening_paren.is_some();

        if opening_paren.is_some() {
            if self.cur_is(')') {
                self.push_token(
                    TokenKind::ClosingParenthesis,
                    Span::new(self.pos(), self.pos() + 1),
                );
                self.i += 1;
                node.base.span.end = self.pos();
            } else {
                node.set_error_if_none(ParsingError::new(
                    ParsingErrorKind::UnterminatedForExpr,
                    "unterminated for expression, missing closing parenthesis",
                ));
            }
        }
        if let Some(err) = err {
            node.set_error_if_none(err);
        }
        node
    }

    // ===== walk =====

    /// `walk <walked> [meta,] entry { … }`.
    pub(crate) fn parse_walk_statement(&mut self, walk_ident: Node) -> Node {
        let start = walk_ident.span().start;
        self.push_token(TokenKind::Walk, walk_ident.span());
        self.eat_space();

        let mut err = None;
        let (walked, _) = self.parse_expression_inner(false);
        self.eat_space();

        let mut meta_variable = None;
        let mut entry_variable = None;

        if self.cur_is('{') {
            err = Some(ParsingError::new(
                ParsingErrorKind::UnterminatedWalkStmt,
                UNTERMINATED_WALK_STMT_MISSING_ENTRY_VAR,
            ));
        } else {
            let (first_var, missing) = self.parse_expression_inner(false);
            if missing {
                err = Some(ParsingError::new(
                    ParsingErrorKind::UnterminatedWalkStmt,
                    UNTERMINATED_WALK_STMT_MISSING_ENTRY_VAR,
                ));
            } else if self.cur_is(',') {
                self.push_token(TokenKind::Comma, Span::new(self.pos(), self.pos() + 1));
                self.i += 1;
                self.eat_space();
                meta_variable = Some(Box::new(first_var));
                let (entry, _) = self.parse_expression_inner(false);
                entry_variable = Some(Box::new(entry));
            } else {
                entry_variable = Some(Box::new(first_var));
            }
            self.eat_space();
        }

        let mut body = None;
        if self.cur_is('{') {
            body = Some(Box::new(self.parse_block()));
        } else {
            err.get_or_insert_with(|| {
                ParsingError::new(
                    ParsingErrorKind::UnterminatedWalkStmt,
                    UNTERMINATED_WALK_STMT_MISSING_BLOCK,
                )
            });
        }

        let mut node = Node::new(
            self.span_from(start),
            NodeKind::WalkStatement {
                walked: Some(Box::new(walked)),
                meta_variable,
                entry_variable,
                body,
            },
        );
        if let Some(err) = err {
            node.base.err = Some(err);
        }
        node
    }

    /// `(walk <walked> entry: <result>)`.
    pub(crate) fn parse_walk_expression(
        &mut self,
        opening_paren: Option<u32>,
        keyword_start: u32,
    ) -> Node {
        let start = opening_paren.unwrap_or(keyword_start);
        self.push_token(TokenKind::Walk, Span::new(keyword_start, keyword_start + 4));
        self.eat_space();

        let mut err = None;
        let (walked, _) = self.parse_expression_inner(false);
        self.eat_space();

        let mut meta_variable = None;
        let mut entry_variable = None;

        if !self.cur_is(':') {
            let (first_var, missing) = self.parse_expression_inner(false);
            if !missing {
                if self.cur_is(',') {
                    self.i += 1;
                    self.eat_space();
                    meta_variable = Some(Box::new(first_var));
                    let (entry, _) = self.parse_expression_inner(false);
                    entry_variable = Some(Box::new(entry));
                } else {
                    entry_variable = Some(Box::new(first_var));
                }
            }
            self.eat_space();
        }

        let mut body = None;
        if self.cur_is(':') {
            self.push_token(TokenKind::Colon, Span::new(self.pos(), self.pos() + 1));
            self.i += 1;
            self.eat_space_newline_comment();
            let (result, _) = self.parse_expression_inner(false);
            body = Some(Box::new(result));
            self.eat_space_newline_comment();
        } else {
            err = Some(ParsingError::new(
                ParsingErrorKind::UnterminatedWalkExpr,
                "unterminated walk expression, missing ':' and the result expression",
            ));
        }

        let mut node = Node::new(
            self.span_from(start),
            NodeKind::WalkExpression {
                walked: Some(Box::new(walked)),
                meta_variable,
                entry_variable,
                body,
            },
        );
        node.base.parenthesized = opening_paren.is_some();

        if opening_paren.is_some() {
            if self.cur_is(')') {
                self.push_token(
                    TokenKind::ClosingParenthesis,
                    Span::new(self.pos(), self.pos() + 1),
                );
                self.i += 1;
                node.base.span.end = self.pos();
            } else {
                node.set_error_if_none(ParsingError::new(
                    ParsingErrorKind::UnterminatedWalkExpr,
                    "unterminated walk expression, missing closing parenthesis",
                ));
            }
        }
        if let Some(err) = err {
            node.set_error_if_none(err);
        }
        node
    }

    // ===== switch / match =====

    /// `switch <value> { case… { } defaultcase { } }` and the `match`
    /// variant whose cases are patterns with optional group-matching
    /// variables.
    pub(crate) fn parse_switch_match_statement(&mut self, keyword: Node, is_match: bool) -> Node {
        let start = keyword.span().start;
        self.push_token(
            if is_match {
                TokenKind::Match
            } else {
                TokenKind::Switch
            },
            keyword.span(),
        );
        self.eat_space();

        let make = |discriminant: Option<Box<Node>>,
                    cases: Vec<Node>,
                    default_cases: Vec<Node>| {
            if is_match {
                NodeKind::MatchStatement {
                    discriminant,
                    cases,
                    default_cases,
                }
            } else {
                NodeKind::SwitchStatement {
                    discriminant,
                    cases,
                    default_cases,
                }
            }
        };

        if self.eof() {
            return Node::with_error(
                self.span_from(start),
                make(None, vec![], vec![]),
                ParsingError::new(
                    if is_match {
                        ParsingErrorKind::UnterminatedMatchStmt
                    } else {
                        ParsingErrorKind::UnterminatedSwitchStmt
                    },
                    if is_match {
                        UNTERMINATED_MATCH_STMT_MISSING_VALUE
                    } else {
                        UNTERMINATED_SWITCH_STMT_MISSING_VALUE
                    },
                ),
            );
        }

        let (discriminant, _) = self.parse_expression_inner(false);
        self.eat_space();

        if !self.cur_is('{') {
            return Node::with_error(
                self.span_from(start),
                make(Some(Box::new(discriminant)), vec![], vec![]),
                ParsingError::new(
                    if is_match {
                        ParsingErrorKind::UnterminatedMatchStmt
                    } else {
                        ParsingErrorKind::UnterminatedSwitchStmt
                    },
                    if is_match {
                        UNTERMINATED_MATCH_STMT_MISSING_BODY
                    } else {
                        UNTERMINATED_SWITCH_STMT_MISSING_BODY
                    },
                ),
            );
        }
        self.push_token(
            TokenKind::OpeningCurlyBracket,
            Span::new(self.pos(), self.pos() + 1),
        );
        self.i += 1;

        let mut cases = Vec::new();
        let mut default_cases = Vec::new();

        while !self.eof() && !self.cur_is('}') {
            self.eat_space_newline_semicolon_comment();
            if self.eof() || self.cur_is('}') {
                break;
            }
            self.parse_switch_match_case(is_match, false, &mut cases, &mut default_cases);
        }

        let mut err = None;
        if self.cur_is('}') {
            self.push_token(
                TokenKind::ClosingCurlyBracket,
                Span::new(self.pos(), self.pos() + 1),
            );
            self.i += 1;
        } else {
            err = Some(ParsingError::new(
                if is_match {
                    ParsingErrorKind::UnterminatedMatchStmt
                } else {
                    ParsingErrorKind::UnterminatedSwitchStmt
                },
                if is_match {
                    UNTERMINATED_MATCH_STMT_MISSING_CLOSING_BRACE
                } else {
                    UNTERMINATED_SWITCH_STMT_MISSING_CLOSING_BRACE
                },
            ));
        }

        let mut node = Node::new(
            self.span_from(start),
            make(Some(Box::new(discriminant)), cases, default_cases),
        );
        if let Some(err) = err {
            node.base.err = Some(err);
        }
        node
    }

    /// `(switch <value> { case => result … })` / `(match …)`.
    pub(crate) fn parse_switch_match_expression(
        &mut self,
        opening_paren: Option<u32>,
        keyword_start: u32,
        is_match: bool,
    ) -> Node {
        let start = opening_paren.unwrap_or(keyword_start);
        self.eat_space();

        let make = |discriminant: Option<Box<Node>>,
                    cases: Vec<Node>,
                    default_cases: Vec<Node>| {
            if is_match {
                NodeKind::MatchExpression {
                    discriminant,
                    cases,
                    default_cases,
                }
            } else {
                NodeKind::SwitchExpression {
                    discriminant,
                    cases,
                    default_cases,
                }
            }
        };
        let unterminated_kind = if is_match {
            ParsingErrorKind::UnterminatedMatchExpr
        } else {
            ParsingErrorKind::UnterminatedSwitchExpr
        };

        let (discriminant, _) = self.parse_expression_inner(false);
        self.eat_space();

        let mut err = None;
        let mut cases = Vec::new();
        let mut default_cases = Vec::new();

        if !self.cur_is('{') {
            err = Some(ParsingError::new(
                unterminated_kind,
                "unterminated switch/match expression, missing body",
            ));
        } else {
            self.push_token(
                TokenKind::OpeningCurlyBracket,
                Span::new(self.pos(), self.pos() + 1),
            );
            self.i += 1;

            while !self.eof() && !self.cur_is('}') {
                self.eat_space_newline_semicolon_comment();
                if self.eof() || self.cur_is('}') {
                    break;
                }
                self.parse_switch_match_case(is_match, true, &mut cases, &mut default_cases);
            }

            if self.cur_is('}') {
                self.push_token(
                    TokenKind::ClosingCurlyBracket,
                    Span::new(self.pos(), self.pos() + 1),
                );
                self.i += 1;
            } else {
                err = Some(ParsingError::new(
                    unterminated_kind,
                    "unterminated switch/match expression, missing closing brace '}'",
                ));
            }
        }

        let mut node = Node::new(
            self.span_from(start),
            make(Some(Box::new(discriminant)), cases, default_cases),
        );
        node.base.parenthesized = opening_paren.is_some();

        self.eat_space_newline_comment();
        if opening_paren.is_some() {
            if self.cur_is(')') {
                self.push_token(
                    TokenKind::ClosingParenthesis,
                    Span::new(self.pos(), self.pos() + 1),
                );
                self.i += 1;
                node.base.span.end = self.pos();
            } else if err.is_none() {
                err = Some(ParsingError::new(
                    unterminated_kind,
                    "unterminated switch/match expression, missing closing parenthesis",
                ));
            }
        }
        if let Some(err) = err {
            node.set_error_if_none(err);
        }
        node
    }

    /// One case of a switch/match statement (`values { block }`) or
    /// expression (`values => result`).
    fn parse_switch_match_case(
        &mut self,
        is_match: bool,
        expression_form: bool,
        cases: &mut Vec<Node>,
        default_cases: &mut Vec<Node>,
    ) {
        let case_start = self.pos();
        let mut case_err: Option<ParsingError> = None;
        let mut values = Vec::new();
        let mut group_matching_variable = None;
        let mut is_default = false;

        // case values
        loop {
            self.eat_space();
            match self.cur() {
                None | Some('{' | '}') => break,
                Some('=') if expression_form && self.peek_is(1, '>') => break,
                _ => {}
            }

            if self.keyword_ahead(DEFAULTCASE_KEYWORD) {
                self.push_token(
                    TokenKind::DefaultCase,
                    Span::new(self.pos(), self.pos() + DEFAULTCASE_KEYWORD.len() as u32),
                );
                self.i += DEFAULTCASE_KEYWORD.len();
                is_default = true;
                self.eat_space();
                break;
            }

            let in_pattern_save = self.in_pattern;
            if is_match {
                self.in_pattern = true;
            }
            let (value, is_missing) = self.parse_expression_inner(false);
            self.in_pattern = in_pattern_save;

            if is_missing {
                if let Some(r) = self.cur() {
                    let span = Span::new(self.pos(), self.pos() + 1);
                    self.tokens.push(Token::with_raw(
                        TokenKind::UnexpectedChar,
                        span,
                        r.to_string(),
                    ));
                    self.i += 1;
                    values.push(Node::with_error(
                        span,
                        NodeKind::UnknownNode,
                        ParsingError::unspecified(errors::fmt_unexpected_char_in(
                            r,
                            "switch or match statement",
                        )),
                    ));
                }
                break;
            }

            if !is_match && !is_simple_case_value(&value) {
                case_err
                    .get_or_insert_with(|| ParsingError::unspecified(INVALID_SWITCH_CASE_VALUE));
            }
            values.push(value);
            self.eat_space();

            // match cases may bind the matched value
            if is_match && !expression_form && self.keyword_ahead("as") {
                self.push_token(TokenKind::As, Span::new(self.pos(), self.pos() + 2));
                self.i += 2;
                self.eat_space();
                let (variable, _) = self.parse_expression_inner(false);
                group_matching_variable = Some(Box::new(variable));
                self.eat_space();
            }

            if self.cur_is(',') {
                self.push_token(TokenKind::Comma, Span::new(self.pos(), self.pos() + 1));
                self.i += 1;
                continue;
            }
            break;
        }

        if values.is_empty() && !is_default && self.cur_is('{') {
            values.push(Node::with_error(
                Span::new(self.pos(), self.pos() + 1),
                NodeKind::MissingExpression,
                ParsingError::unspecified(errors::fmt_case_value_expected_here(&self.s, self.i)),
            ));
        }

        // case body
        if expression_form {
            let mut result = None;
            if self.cur_is('=') && self.peek_is(1, '>') {
                self.push_token(TokenKind::Arrow, Span::new(self.pos(), self.pos() + 2));
                self.i += 2;
                self.eat_space_newline_comment();
                let (value, _) = self.parse_expression_inner(false);
                result = Some(Box::new(value));
            } else {
                case_err.get_or_insert_with(|| {
                    ParsingError::new(
                        ParsingErrorKind::UnterminatedArrow,
                        "unterminated case, missing '=>' and the result",
                    )
                });
            }

            let kind = if is_default {
                NodeKind::DefaultCaseWithResult { result }
            } else if is_match {
                NodeKind::MatchExpressionCase {
                    values,
                    group_matching_variable,
                    result,
                }
            } else {
                NodeKind::SwitchExpressionCase { values, result }
            };
            let mut case = Node::new(self.span_from(case_start), kind);
            if is_default {
                Parser::note_default_case(default_cases, &mut case);
            }
            if let Some(err) = case_err {
                case.set_error_if_none(err);
            }
            if is_default {
                default_cases.push(case);
            } else {
                cases.push(case);
            }
        } else {
            let mut block = None;
            if self.cur_is('{') {
                block = Some(Box::new(self.parse_block()));
            } else {
                case_err.get_or_insert_with(|| {
                    ParsingError::new(
                        ParsingErrorKind::MissingBlock,
                        "a case should be followed by a block",
                    )
                });
            }

            let kind = if is_default {
                NodeKind::DefaultCaseWithBlock { block }
            } else if is_match {
                NodeKind::MatchStatementCase {
                    values,
                    group_matching_variable,
                    block,
                }
            } else {
                NodeKind::SwitchStatementCase { values, block }
            };
            let mut case = Node::new(self.span_from(case_start), kind);
            if is_default {
                Parser::note_default_case(default_cases, &mut case);
            }
            if let Some(err) = case_err {
                case.set_error_if_none(err);
            }
            if is_default {
                default_cases.push(case);
            } else {
                cases.push(case);
            }
        }
    }
}

/// Only simple value literals are valid switch case values.
fn is_simple_case_value(node: &Node) -> bool {
    matches!(
        node.kind,
        NodeKind::QuotedStringLiteral { .. }
            | NodeKind::UnquotedStringLiteral { .. }
            | NodeKind::IntLiteral { .. }
            | NodeKind::FloatLiteral { .. }
            | NodeKind::BooleanLiteral { .. }
            | NodeKind::NilLiteral
            | NodeKind::RuneLiteral { .. }
            | NodeKind::AbsolutePathLiteral { .. }
            | NodeKind::RelativePathLiteral { .. }
            | NodeKind::UrlLiteral { .. }
            | NodeKind::HostLiteral { .. }
            | NodeKind::PortLiteral { .. }
            | NodeKind::QuantityLiteral { .. }
            | NodeKind::MissingExpression
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse_chunk, ParserOptions};
    use pretty_assertions::assert_eq;

    fn first_statement(source: &str) -> Node {
        let (chunk, _) = parse_chunk(source, &ParserOptions::default());
        match chunk.kind {
            NodeKind::Chunk { mut statements, .. } => {
                assert!(!statements.is_empty(), "no statements parsed");
                statements.remove(0)
            }
            other => panic!("expected chunk, got {other:?}"),
        }
    }

    fn parse_expr(source: &str) -> Node {
        let mut p = Parser::new(source, &ParserOptions::default());
        p.parse_expression_inner(false).0
    }

    #[test]
    fn if_else_if_chain() {
        let stmt = first_statement("if x { 1 } else if y { 2 } else { 3 }");
        match &stmt.kind {
            NodeKind::IfStatement { alternate, .. } => {
                let alt = alternate.as_deref().unwrap_or_else(|| panic!("no alternate"));
                match &alt.kind {
                    NodeKind::IfStatement { alternate, .. } => {
                        assert!(matches!(
                            alternate.as_deref().map(|a| &a.kind),
                            Some(NodeKind::Block { .. })
                        ));
                    }
                    other => panic!("expected nested if, got {other:?}"),
                }
            }
            other => panic!("expected if statement, got {other:?}"),
        }
        assert!(!stmt.error_at_any_depth());
    }

    #[test]
    fn if_without_block() {
        let stmt = first_statement("if x 1");
        assert!(stmt
            .base
            .err
            .as_ref()
            .is_some_and(|e| e.kind == ParsingErrorKind::MissingBlock));
    }

    #[test]
    fn if_expression() {
        let node = parse_expr("(if cond 1 else 2)");
        match &node.kind {
            NodeKind::IfExpression {
                consequent,
                alternate,
                ..
            } => {
                assert!(consequent.is_some());
                assert!(alternate.is_some());
            }
            other => panic!("expected if expression, got {other:?}"),
        }
        assert!(node.base.parenthesized);
        assert!(!node.error_at_any_depth());
    }

    #[test]
    fn for_statement_forms() {
        let stmt = first_statement("for x in list { }");
        match &stmt.kind {
            NodeKind::ForStatement {
                value_elem_var,
                iterated_value,
                ..
            } => {
                assert!(value_elem_var.is_some());
                assert!(iterated_value.is_some());
            }
            other => panic!("expected for statement, got {other:?}"),
        }

        let stmt = first_statement("for i, x in list { }");
        assert!(matches!(
            stmt.kind,
            NodeKind::ForStatement {
                key_index_var: Some(_),
                value_elem_var: Some(_),
                ..
            }
        ));

        let stmt = first_statement("for chunked c in list { }");
        assert!(matches!(
            stmt.kind,
            NodeKind::ForStatement { chunked: true, .. }
        ));

        let stmt = first_statement("for %p x in list { }");
        assert!(matches!(
            stmt.kind,
            NodeKind::ForStatement {
                value_pattern: Some(_),
                ..
            }
        ));
    }

    #[test]
    fn for_expression() {
        let node = parse_expr("(for x in list: x)");
        assert!(matches!(node.kind, NodeKind::ForExpression { body: Some(_), .. }));
        assert!(!node.error_at_any_depth());

        let node = parse_expr("(for x in list)");
        assert!(node
            .base
            .err
            .as_ref()
            .is_some_and(|e| e.kind == ParsingErrorKind::UnterminatedForExpr));
    }

    #[test]
    fn walk_statement() {
        let stmt = first_statement("walk ./dir entry { }");
        match &stmt.kind {
            NodeKind::WalkStatement {
                walked,
                entry_variable,
                body,
                ..
            } => {
                assert!(walked.is_some());
                assert!(entry_variable.is_some());
                assert!(body.is_some());
            }
            other => panic!("expected walk statement, got {other:?}"),
        }
        assert!(!stmt.error_at_any_depth());
    }

    #[test]
    fn walk_statement_missing_block() {
        let stmt = first_statement("walk ./dir entry");
        assert!(stmt
            .base
            .err
            .as_ref()
            .is_some_and(|e| e.kind == ParsingErrorKind::UnterminatedWalkStmt));
    }

    #[test]
    fn switch_statement() {
        let stmt = first_statement("switch v { 1 { } 2, 3 { } defaultcase { } }");
        match &stmt.kind {
            NodeKind::SwitchStatement {
                cases,
                default_cases,
                ..
            } => {
                assert_eq!(cases.len(), 2);
                assert_eq!(default_cases.len(), 1);
            }
            other => panic!("expected switch, got {other:?}"),
        }
        assert!(!stmt.error_at_any_depth());
    }

    #[test]
    fn duplicate_default_case() {
        let stmt = first_statement("switch v { defaultcase { } defaultcase { } }");
        assert!(stmt.error_at_any_depth());
    }

    #[test]
    fn match_statement_with_patterns() {
        let stmt = first_statement("match v { %int { } %| 1 | 2 { } }");
        match &stmt.kind {
            NodeKind::MatchStatement { cases, .. } => assert_eq!(cases.len(), 2),
            other => panic!("expected match, got {other:?}"),
        }
    }

    #[test]
    fn switch_expression_with_arrows() {
        let node = parse_expr("(switch v { 1 => \"one\" defaultcase => \"other\" })");
        match &node.kind {
            NodeKind::SwitchExpression {
                cases,
                default_cases,
                ..
            } => {
                assert_eq!(cases.len(), 1);
                assert_eq!(default_cases.len(), 1);
            }
            other => panic!("expected switch expression, got {other:?}"),
        }
        assert!(!node.error_at_any_depth());
    }

    #[test]
    fn switch_expression_missing_arrow() {
        let node = parse_expr("(switch v { 1 })");
        let mut has_arrow_err = false;
        quill_ir::walk(&node, &mut |n, _, _| {
            if n.base
                .err
                .as_ref()
                .is_some_and(|e| e.kind == ParsingErrorKind::UnterminatedArrow)
            {
                has_arrow_err = true;
            }
            quill_ir::TraversalAction::Continue
        });
        assert!(has_arrow_err);
    }

    #[test]
    fn switch_case_value_must_be_simple() {
        let stmt = first_statement("switch v { $x { } }");
        assert!(stmt.error_at_any_depth());
    }
}
