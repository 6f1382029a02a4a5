//! Statements: blocks, control flow, declarations, assignments,
//! command-like calls and pipelines.

use crate::chars::{
    is_closing_delim, is_comment_first_space, is_forbidden_space_char, is_ident_char,
    is_ident_first_char, is_unpaired_or_closing_delim,
};
use crate::errors;
use crate::Parser;
use quill_diagnostic::{ParsingError, ParsingErrorKind};
use quill_ir::{
    AssignmentOperator, Node, NodeKind, Span, Token, TokenKind, TokenSubKind,
};
use tracing::trace;

const UNTERMINATED_BLOCK_MISSING_BRACE: &str = "unterminated block, missing closing brace '}'";
const UNTERMINATED_ASSIGNMENT_MISSING_TERMINATOR: &str =
    "unterminated assignment: the value should be followed by a newline, ';', '}' or a comment";
const UNTERMINATED_ASSIGNMENT_MISSING_VALUE: &str =
    "unterminated assignment: missing value after '='";
const INVALID_ASSIGNMENT_PIPELINE_EXPECTED: &str =
    "invalid assignment: a pipeline was expected after '|'";
const UNTERMINATED_PIPE_STMT_LAST_STAGE_EMPTY: &str =
    "unterminated pipeline statement: last stage is empty";
const INVALID_PIPE_STAGES_SHOULD_BE_CALLS: &str =
    "invalid pipeline statement: all stages should be calls";
const UNTERMINATED_MULTI_ASSIGN_MISSING_EQL: &str =
    "unterminated multi assignment: missing '=' after the variables";
const UNTERMINATED_SYNCHRONIZED_MISSING_BLOCK: &str =
    "unterminated synchronized statement: missing block";
const UNTERMINATED_EXTEND_MISSING_PATTERN: &str =
    "unterminated extend statement: missing the extended pattern";
const UNTERMINATED_EXTEND_MISSING_OBJECT: &str =
    "unterminated extend statement: missing the extension object";
const DEFAULT_CASE_MUST_BE_UNIQUE: &str =
    "only one default case is allowed in a switch or match";

impl Parser {
    /// `{ … }` statement block.
    pub(crate) fn parse_block(&mut self) -> Node {
        self.check_cancellation();

        let start = self.pos();
        self.push_token(TokenKind::OpeningCurlyBracket, Span::new(start, start + 1));
        self.i += 1;

        let mut statements = Vec::new();
        let mut prev_stmt_end: Option<u32> = None;

        self.eat_space_newline_semicolon_comment();

        while !self.eof() && !self.cur().is_some_and(is_closing_delim) {
            #[allow(clippy::unwrap_used)] // non-eof checked above
            let r = self.cur().unwrap();
            if is_forbidden_space_char(r) {
                self.tokens.push(Token::with_raw(
                    TokenKind::UnexpectedChar,
                    Span::new(self.pos(), self.pos() + 1),
                    r.to_string(),
                ));
                statements.push(Node::with_error(
                    Span::new(self.pos(), self.pos() + 1),
                    NodeKind::UnknownNode,
                    ParsingError::unspecified(errors::fmt_unexpected_char_in(
                        r,
                        "block or module",
                    )),
                ));
                self.i += 1;
                self.eat_space_newline_semicolon_comment();
                continue;
            }

            let missing_separation = prev_stmt_end == Some(self.pos())
                && self
                    .at(self.i.wrapping_sub(1))
                    .is_some_and(|prev| !prev.is_whitespace());

            let annotations = self.parse_metadata_annotations();
            let mut stmt = self.parse_statement();
            prev_stmt_end = Some(self.pos());

            if let Some(missing_stmt) = self.attach_annotations(annotations, &mut stmt) {
                statements.push(missing_stmt);
            }

            let is_missing = matches!(stmt.kind, NodeKind::MissingExpression);
            if missing_separation {
                stmt.set_error_if_none(ParsingError::unspecified(
                    errors::STMTS_SHOULD_BE_SEPARATED_BY,
                ));
            }
            statements.push(stmt);
            if is_missing {
                break;
            }

            self.eat_space_newline_semicolon_comment();
        }

        let mut err = None;
        if !self.cur_is('}') {
            err = Some(ParsingError::unspecified(UNTERMINATED_BLOCK_MISSING_BRACE));
        } else {
            self.push_token(
                TokenKind::ClosingCurlyBracket,
                Span::new(self.pos(), self.pos() + 1),
            );
            self.i += 1;
        }

        let mut node = Node::new(self.span_from(start), NodeKind::Block { statements });
        if let Some(err) = err {
            node.base.err = Some(err);
        }
        node
    }

    /// One statement.
    pub(crate) fn parse_statement(&mut self) -> Node {
        self.check_cancellation();
        trace!(i = self.i, "parse_statement");

        let (expr, is_missing) = self.parse_expression_inner(false);

        if is_missing {
            if self.eof() {
                return expr;
            }
            #[allow(clippy::unwrap_used)] // non-eof checked above
            let r = self.cur().unwrap();
            self.i += 1;
            self.tokens.push(Token::with_raw(
                TokenKind::UnexpectedChar,
                Span::new(self.pos() - 1, self.pos()),
                r.to_string(),
            ));
            return Node::with_error(
                Span::new(expr.span().start, self.pos()),
                NodeKind::UnknownNode,
                ParsingError::unspecified(errors::fmt_unexpected_char_in(r, "block or module")),
            );
        }

        // keyword statements
        if let NodeKind::IdentifierLiteral { name } = &expr.kind {
            if !expr.base.parenthesized {
                let name = name.to_string();
                match name.as_str() {
                    "assert" => {
                        self.push_token(TokenKind::Assert, expr.span());
                        self.eat_space();
                        let (asserted, _) = self.parse_expression_inner(false);
                        return Node::new(
                            Span::new(expr.span().start, asserted.span().end),
                            NodeKind::AssertionStatement {
                                expr: Box::new(asserted),
                            },
                        );
                    }
                    "if" => return self.parse_if_statement(expr),
                    "for" => return self.parse_for_statement(expr),
                    "walk" => return self.parse_walk_statement(expr),
                    "switch" => return self.parse_switch_match_statement(expr, false),
                    "match" => return self.parse_switch_match_statement(expr, true),
                    "import" => return self.parse_import_statement(expr),
                    "return" => return self.parse_return_like(expr, ReturnLike::Return),
                    "yield" => return self.parse_return_like(expr, ReturnLike::Yield),
                    "coyield" => return self.parse_return_like(expr, ReturnLike::Coyield),
                    "break" => {
                        self.push_token(TokenKind::Break, expr.span());
                        return Node::new(expr.span(), NodeKind::BreakStatement);
                    }
                    "continue" => {
                        self.push_token(TokenKind::Continue, expr.span());
                        return Node::new(expr.span(), NodeKind::ContinueStatement);
                    }
                    "prune" => {
                        self.push_token(TokenKind::Prune, expr.span());
                        return Node::new(expr.span(), NodeKind::PruneStatement);
                    }
                    "assign" => return self.parse_multi_assignment(expr),
                    "var" => return self.parse_variable_declarations(expr, false),
                    "globalvar" => return self.parse_variable_declarations(expr, true),
                    "synchronized" => return self.parse_synchronized_block(expr),
                    "pattern" => return self.parse_pattern_definition(expr),
                    "pnamespace" => return self.parse_pattern_namespace_definition(expr),
                    "extend" => return self.parse_extend_statement(expr),
                    "struct" => return self.parse_struct_definition(expr),
                    "preinit" => return self.parse_preinit_statement(expr),
                    _ => {}
                }

                // command-like call with no arguments: `funcname;`
                let prev_i = self.i;
                self.eat_space();
                if self.cur_is(';') && !crate::grammar::expr::is_keyword(&name) {
                    self.i += 1;
                    return Node::new(
                        Span::new(expr.span().start, self.pos()),
                        NodeKind::CallExpression {
                            callee: Box::new(expr),
                            arguments: vec![],
                            must: true,
                            command_like: true,
                        },
                    );
                }
                self.i = prev_i;
            }
        }

        // test suites/cases used as statements
        let expr = match expr {
            Node {
                base,
                kind:
                    NodeKind::TestSuiteExpression {
                        meta,
                        module,
                        is_statement: _,
                    },
            } if !base.parenthesized => Node {
                base,
                kind: NodeKind::TestSuiteExpression {
                    meta,
                    module,
                    is_statement: true,
                },
            },
            Node {
                base,
                kind:
                    NodeKind::TestCaseExpression {
                        meta,
                        module,
                        is_statement: _,
                    },
            } if !base.parenthesized => Node {
                base,
                kind: NodeKind::TestCaseExpression {
                    meta,
                    module,
                    is_statement: true,
                },
            },
            other => other,
        };

        if matches!(expr.kind, NodeKind::CallExpression { .. }) {
            return expr;
        }

        let followed_by_space = self.cur_is(' ');
        self.eat_space();

        if self.eof() {
            return expr;
        }

        #[allow(clippy::unwrap_used)] // non-eof checked above
        match self.cur().unwrap() {
            '=' if !self.peek_is(1, '=') && !self.peek_is(1, '>') => {
                return self.parse_assignment(expr);
            }
            ';' => return expr,
            '+' | '-' | '*' | '/' => {
                if self.peek_is(1, '=') {
                    return self.parse_assignment(expr);
                }
                if followed_by_space && !expr.base.parenthesized {
                    return self.parse_command_like_statement(expr);
                }
            }
            _ => {
                if !expr.base.parenthesized {
                    if matches!(
                        expr.kind,
                        NodeKind::IdentifierLiteral { .. }
                            | NodeKind::IdentifierMemberExpression { .. }
                    ) {
                        let r = self.cur().unwrap_or(' ');
                        let stops_command = is_unpaired_or_closing_delim(r)
                            && r != '('
                            && r != '|'
                            && r != '\n'
                            && r != ':';
                        if followed_by_space && !stops_command {
                            return self.parse_command_like_statement(expr);
                        }
                    } else {
                        // relaxed binary / pipeline forms on other operands
                        match self.try_parse_unparenthesized_binary_expr(expr) {
                            Ok(node) => return node,
                            Err(original) => {
                                if self.cur_is('|') {
                                    return self
                                        .parse_pipeline_statement_from_first_stage(original);
                                }
                                return original;
                            }
                        }
                    }
                }
            }
        }

        expr
    }

    /// `left = value`, `left += value`, …; also routes the pipeline form
    /// `left = | a | b`.
    fn parse_assignment(&mut self, left: Node) -> Node {
        let operator = match self.cur() {
            Some('+') => {
                self.push_token(TokenKind::PlusEqual, Span::new(self.pos(), self.pos() + 2));
                self.i += 2;
                AssignmentOperator::PlusAssign
            }
            Some('-') => {
                self.push_token(TokenKind::MinusEqual, Span::new(self.pos(), self.pos() + 2));
                self.i += 2;
                AssignmentOperator::MinusAssign
            }
            Some('*') => {
                self.push_token(TokenKind::MulEqual, Span::new(self.pos(), self.pos() + 2));
                self.i += 2;
                AssignmentOperator::MulAssign
            }
            Some('/') => {
                self.push_token(TokenKind::DivEqual, Span::new(self.pos(), self.pos() + 2));
                self.i += 2;
                AssignmentOperator::DivAssign
            }
            _ => {
                self.tokens.push(
                    Token::new(TokenKind::Equal, Span::new(self.pos(), self.pos() + 1))
                        .with_sub_kind(TokenSubKind::AssignmentOperator),
                );
                self.i += 1;
                AssignmentOperator::Assign
            }
        };
        self.eat_space();

        let left_start = left.span().start;

        // valid LHS check
        let valid_lhs = matches!(
            left.kind,
            NodeKind::Variable { .. }
                | NodeKind::GlobalVariable { .. }
                | NodeKind::IdentifierLiteral { .. }
                | NodeKind::MemberExpression { .. }
                | NodeKind::IndexExpression { .. }
                | NodeKind::SliceExpression { .. }
                | NodeKind::IdentifierMemberExpression { .. }
                | NodeKind::UnquotedRegion { .. }
        );
        if !valid_lhs {
            let kind_name = left.kind_name();
            return Node::with_error(
                self.span_from(left_start),
                NodeKind::Assignment {
                    operator,
                    left: Box::new(left),
                    right: None,
                },
                ParsingError::unspecified(format!(
                    "invalid assignment: cannot assign to a(n) {kind_name}"
                )),
            );
        }

        if self.eof() {
            return Node::with_error(
                self.span_from(left_start),
                NodeKind::Assignment {
                    operator,
                    left: Box::new(left),
                    right: None,
                },
                ParsingError::unspecified(UNTERMINATED_ASSIGNMENT_MISSING_VALUE),
            );
        }

        let mut err = None;
        let right = if self.cur_is('|') {
            self.push_token(TokenKind::Pipe, Span::new(self.pos(), self.pos() + 1));
            self.i += 1;
            self.eat_space();
            let stage_stmt = self.parse_statement();
            match stage_stmt.kind {
                NodeKind::PipelineStatement { stages } => Node {
                    base: stage_stmt.base,
                    kind: NodeKind::PipelineExpression { stages },
                },
                _ => {
                    err = Some(ParsingError::unspecified(INVALID_ASSIGNMENT_PIPELINE_EXPECTED));
                    stage_stmt
                }
            }
        } else {
            self.parse_expression_inner(false).0
        };

        let mut node = Node::new(
            Span::new(left_start, right.span().end),
            NodeKind::Assignment {
                operator,
                left: Box::new(left),
                right: Some(Box::new(right)),
            },
        );
        if let Some(err) = err {
            node.base.err = Some(err);
        }

        // terminator check
        self.eat_space();
        match self.cur() {
            None | Some(';' | '\r' | '\n' | '}') => {}
            Some('#') if self.peek(1).is_some_and(is_comment_first_space) => {}
            Some(_) => {
                node.set_error_if_none(ParsingError::new(
                    ParsingErrorKind::InvalidNext,
                    UNTERMINATED_ASSIGNMENT_MISSING_TERMINATOR,
                ));
            }
        }
        node
    }

    /// `assign a b = value` multi assignment.
    fn parse_multi_assignment(&mut self, keyword: Node) -> Node {
        let start = keyword.span().start;
        self.eat_space();

        let mut variables = Vec::new();
        let mut nillable = false;
        let mut err = None;

        while !self.eof() && !self.cur_is('=') {
            let (variable, is_missing) = self.parse_expression_inner(false);
            if is_missing {
                break;
            }
            if !matches!(variable.kind, NodeKind::IdentifierLiteral { .. }) {
                err.get_or_insert_with(|| {
                    ParsingError::unspecified(
                        "invalid multi assignment: only identifiers can be assigned",
                    )
                });
            }
            variables.push(variable);
            self.eat_space();
        }

        if !self.cur_is('=') {
            return Node::with_error(
                self.span_from(start),
                NodeKind::MultiAssignment {
                    variables,
                    right: None,
                    nillable,
                },
                err.unwrap_or_else(|| {
                    ParsingError::unspecified(UNTERMINATED_MULTI_ASSIGN_MISSING_EQL)
                }),
            );
        }
        self.push_token(TokenKind::Equal, Span::new(self.pos(), self.pos() + 1));
        self.i += 1;

        // `=?` marks the right side as possibly shorter than the variables
        if self.cur_is('?') {
            nillable = true;
            self.i += 1;
        }
        self.eat_space();

        let (right, _) = self.parse_expression_inner(false);
        let mut node = Node::new(
            Span::new(start, right.span().end),
            NodeKind::MultiAssignment {
                variables,
                right: Some(Box::new(right)),
                nillable,
            },
        );
        if let Some(err) = err {
            node.base.err = Some(err);
        }
        node
    }

    /// Command-like call: `funcname arg1 arg2` possibly followed by
    /// pipeline stages.
    pub(crate) fn parse_command_like_statement(&mut self, expr: Node) -> Node {
        let start = expr.span().start;
        let call = {
            let mut call = Node::new(
                Span::new(start, 0),
                NodeKind::CallExpression {
                    callee: Box::new(expr),
                    arguments: vec![],
                    must: true,
                    command_like: true,
                },
            );
            self.parse_call_args_no_parenthesis(&mut call);
            call.base.span.end = self.pos();
            call
        };

        self.eat_space();

        if !self.cur_is('|') {
            return call;
        }

        self.parse_pipeline_statement_from_first_stage(call)
    }

    /// Pipeline statement, first stage already parsed; the cursor is on
    /// `|`.
    pub(crate) fn parse_pipeline_statement_from_first_stage(&mut self, first: Node) -> Node {
        let start = first.span().start;
        let mut stages = vec![first];
        let mut err = None;

        self.push_token(TokenKind::Pipe, Span::new(self.pos(), self.pos() + 1));
        self.i += 1;
        self.eat_space();

        if self.eof() {
            return Node::with_error(
                self.span_from(start),
                NodeKind::PipelineStatement { stages },
                ParsingError::unspecified(UNTERMINATED_PIPE_STMT_LAST_STAGE_EMPTY),
            );
        }

        'stages: while !self.eof() && !self.cur_is('\n') {
            self.eat_space();
            if self.eof() {
                err = Some(ParsingError::unspecified(UNTERMINATED_PIPE_STMT_LAST_STAGE_EMPTY));
                break;
            }

            let (callee, _) = self.parse_expression_inner(false);
            let callable = matches!(
                callee.kind,
                NodeKind::IdentifierLiteral { .. } | NodeKind::IdentifierMemberExpression { .. }
            );
            let already_call = matches!(callee.kind, NodeKind::CallExpression { .. });

            if callable {
                let callee_end = callee.span().end;
                let mut stage = Node::new(
                    Span::new(callee.span().start, callee_end),
                    NodeKind::CallExpression {
                        callee: Box::new(callee),
                        arguments: vec![],
                        must: true,
                        command_like: true,
                    },
                );
                self.parse_call_args_no_parenthesis(&mut stage);
                stage.base.span.end = self.pos().max(callee_end);
                stages.push(stage);
            } else if already_call {
                stages.push(callee);
            } else {
                stages.push(callee);
                err = Some(ParsingError::unspecified(INVALID_PIPE_STAGES_SHOULD_BE_CALLS));
                break;
            }

            self.eat_space();
            match self.cur() {
                Some('|') => {
                    self.push_token(TokenKind::Pipe, Span::new(self.pos(), self.pos() + 1));
                    self.i += 1;
                }
                Some('\n' | ';') | None => break 'stages,
                Some(r) => {
                    err = Some(ParsingError::unspecified(format!(
                        "invalid pipeline stage, unexpected char '{r}'"
                    )));
                    break;
                }
            }
        }

        let mut node = Node::new(self.span_from(start), NodeKind::PipelineStatement { stages });
        if let Some(err) = err {
            node.base.err = Some(err);
        }
        node
    }

    /// Pipeline expression inside parentheses: `(a | b | c)`. The first
    /// stage is already parsed; the cursor is on `|`.
    pub(crate) fn parse_parenthesized_pipeline_tail(
        &mut self,
        start_index: u32,
        first: Node,
        has_previous_operator: bool,
    ) -> Node {
        let mut stages = vec![first];
        let mut err: Option<ParsingError> = None;

        while self.cur_is('|') {
            self.push_token(TokenKind::Pipe, Span::new(self.pos(), self.pos() + 1));
            self.i += 1;
            self.eat_space_newline_comment();

            if self.eof() || self.cur_is(')') {
                err = Some(ParsingError::new(
                    ParsingErrorKind::UnterminatedParenthesizedPipeExpr,
                    UNTERMINATED_PIPE_STMT_LAST_STAGE_EMPTY,
                ));
                break;
            }

            let (stage, _) = self.parse_expression_inner(false);
            // a bare callable stage becomes a zero-argument call
            let stage = match stage.kind {
                NodeKind::IdentifierLiteral { .. }
                | NodeKind::IdentifierMemberExpression { .. } => {
                    let span = stage.base.span;
                    Node::new(
                        span,
                        NodeKind::CallExpression {
                            callee: Box::new(stage),
                            arguments: vec![],
                            must: true,
                            command_like: false,
                        },
                    )
                }
                NodeKind::CallExpression { .. } => stage,
                _ => {
                    let mut stage = stage;
                    stage.set_error_if_none(ParsingError::unspecified(
                        INVALID_PIPE_STAGES_SHOULD_BE_CALLS,
                    ));
                    stage
                }
            };
            stages.push(stage);
            self.eat_space_newline_comment();
        }

        let mut node = Node::new(
            self.span_from(start_index),
            NodeKind::PipelineExpression { stages },
        );
        node.base.parenthesized = !has_previous_operator;

        if !has_previous_operator {
            if self.cur_is(')') {
                self.push_token(
                    TokenKind::ClosingParenthesis,
                    Span::new(self.pos(), self.pos() + 1),
                );
                self.i += 1;
                node.base.span.end = self.pos();
            } else {
                node.set_error_if_none(ParsingError::new(
                    ParsingErrorKind::UnterminatedParenthesizedPipeExpr,
                    "unterminated pipeline expression: missing closing parenthesis",
                ));
            }
        }
        if let Some(err) = err {
            node.set_error_if_none(err);
        }
        node
    }

    /// `synchronized value… { block }`.
    fn parse_synchronized_block(&mut self, keyword: Node) -> Node {
        let start = keyword.span().start;
        self.push_token(TokenKind::Synchronized, keyword.span());
        self.eat_space();

        let mut synchronized_values = Vec::new();
        while !self.eof() && !self.cur_is('{') && !self.cur_is('\n') {
            let (value, is_missing) = self.parse_expression_inner(false);
            if is_missing {
                #[allow(clippy::unwrap_used)] // missing-expr only before eof
                let r = self.cur().unwrap();
                let span = Span::new(self.pos(), self.pos() + 1);
                self.tokens.push(Token::with_raw(
                    TokenKind::UnexpectedChar,
                    span,
                    r.to_string(),
                ));
                self.i += 1;
                synchronized_values.push(Node::with_error(
                    span,
                    NodeKind::UnknownNode,
                    ParsingError::unspecified(errors::fmt_unexpected_char_in(
                        r,
                        "synchronized value list",
                    )),
                ));
                continue;
            }
            synchronized_values.push(value);
            self.eat_space();
        }

        if !self.cur_is('{') {
            return Node::with_error(
                self.span_from(start),
                NodeKind::SynchronizedBlockStatement {
                    synchronized_values,
                    block: None,
                },
                ParsingError::new(
                    ParsingErrorKind::MissingBlock,
                    UNTERMINATED_SYNCHRONIZED_MISSING_BLOCK,
                ),
            );
        }

        let block = self.parse_block();
        Node::new(
            self.span_from(start),
            NodeKind::SynchronizedBlockStatement {
                synchronized_values,
                block: Some(Box::new(block)),
            },
        )
    }

    /// `extend <pattern> <object literal>`.
    fn parse_extend_statement(&mut self, keyword: Node) -> Node {
        let start = keyword.span().start;
        self.push_token(TokenKind::Extend, keyword.span());
        self.eat_space();

        if self.eof() {
            return Node::with_error(
                self.span_from(start),
                NodeKind::ExtendStatement {
                    extended_pattern: None,
                    extension: None,
                },
                ParsingError::new(
                    ParsingErrorKind::UnterminatedExtendStmt,
                    UNTERMINATED_EXTEND_MISSING_PATTERN,
                ),
            );
        }

        let in_pattern_save = self.in_pattern;
        self.in_pattern = true;
        let (pattern, _) = self.parse_expression_inner(false);
        self.in_pattern = in_pattern_save;

        self.eat_space();

        if !self.cur_is('{') {
            return Node::with_error(
                self.span_from(start),
                NodeKind::ExtendStatement {
                    extended_pattern: Some(Box::new(pattern)),
                    extension: None,
                },
                ParsingError::new(
                    ParsingErrorKind::UnterminatedExtendStmt,
                    UNTERMINATED_EXTEND_MISSING_OBJECT,
                ),
            );
        }

        let extension = self.parse_object_or_record_literal(false);
        Node::new(
            self.span_from(start),
            NodeKind::ExtendStatement {
                extended_pattern: Some(Box::new(pattern)),
                extension: Some(Box::new(extension)),
            },
        )
    }

    fn parse_return_like(&mut self, keyword: Node, kind: ReturnLike) -> Node {
        let start = keyword.span().start;
        let token_kind = match kind {
            ReturnLike::Return => TokenKind::Return,
            ReturnLike::Yield => TokenKind::Yield,
            ReturnLike::Coyield => TokenKind::Coyield,
        };
        self.push_token(token_kind, keyword.span());
        self.eat_space();

        let value = match self.cur() {
            None | Some('\n' | ';' | '}' | ')' | ']') => None,
            Some('#') if self.peek(1).is_some_and(is_comment_first_space) => None,
            _ => Some(Box::new(self.parse_expression_inner(false).0)),
        };

        let span = Span::new(
            start,
            value.as_ref().map_or(keyword.span().end, |v| v.span().end),
        );
        let node_kind = match kind {
            ReturnLike::Return => NodeKind::ReturnStatement { expr: value },
            ReturnLike::Yield => NodeKind::YieldStatement { expr: value },
            ReturnLike::Coyield => NodeKind::CoyieldStatement { expr: value },
        };
        Node::new(span, node_kind)
    }

    /// `var`/`globalvar` declarations, single or parenthesized group,
    /// object destructuring included.
    fn parse_variable_declarations(&mut self, keyword: Node, global: bool) -> Node {
        let start = keyword.span().start;
        self.push_token(
            if global {
                TokenKind::GlobalVar
            } else {
                TokenKind::Var
            },
            keyword.span(),
        );
        self.eat_space();

        let mut declarations = Vec::new();

        if self.cur_is('(') {
            // declaration group
            self.push_token(
                TokenKind::OpeningParenthesis,
                Span::new(self.pos(), self.pos() + 1),
            );
            self.i += 1;
            self.eat_space_newline_comment();
            while !self.eof() && !self.cur_is(')') {
                declarations.push(self.parse_single_variable_declaration(global));
                self.eat_space_newline_comment();
            }
            if self.cur_is(')') {
                self.push_token(
                    TokenKind::ClosingParenthesis,
                    Span::new(self.pos(), self.pos() + 1),
                );
                self.i += 1;
            }
        } else {
            declarations.push(self.parse_single_variable_declaration(global));
        }

        let kind = if global {
            NodeKind::GlobalVariableDeclarations { declarations }
        } else {
            NodeKind::LocalVariableDeclarations { declarations }
        };
        Node::new(self.span_from(start), kind)
    }

    fn parse_single_variable_declaration(&mut self, global: bool) -> Node {
        let decl_start = self.pos();
        let mut err: Option<ParsingError> = None;

        // object destructuring
        let left = if self.cur_is('{') {
            self.parse_object_destructuration()
        } else {
            let (left, is_missing) = self.parse_expression_inner(false);
            if is_missing && !self.eof() {
                // consume the offending rune so declaration groups progress
                self.i += 1;
            }
            if !matches!(left.kind, NodeKind::IdentifierLiteral { .. }) {
                err = Some(ParsingError::unspecified(
                    "the left side of a variable declaration should be an identifier",
                ));
            }
            left
        };
        let destructuring = matches!(left.kind, NodeKind::ObjectDestructuration { .. });

        self.eat_space();

        // optional type annotation
        let mut type_annotation = None;
        if self.cur_is('%') || (!self.cur_is('=') && self.cur().is_some_and(is_ident_first_char))
        {
            let in_pattern_save = self.in_pattern;
            self.in_pattern = true;
            let (annotation, _) = self.parse_expression_inner(false);
            self.in_pattern = in_pattern_save;
            if destructuring {
                err.get_or_insert_with(|| {
                    ParsingError::unspecified(
                        "type annotations are not allowed when destructuring an object",
                    )
                });
            }
            type_annotation = Some(Box::new(annotation));
            self.eat_space();
        }

        if !self.cur_is('=') {
            let decl_name = if global {
                "global variable declaration"
            } else {
                "local variable declaration"
            };
            let kind = if global {
                NodeKind::GlobalVariableDeclaration {
                    left: Box::new(left),
                    type_annotation,
                    right: None,
                }
            } else {
                NodeKind::LocalVariableDeclaration {
                    left: Box::new(left),
                    type_annotation,
                    right: None,
                }
            };
            return Node::with_error(
                self.span_from(decl_start),
                kind,
                err.unwrap_or_else(|| {
                    ParsingError::new(
                        ParsingErrorKind::MissingEqualsSignInDeclaration,
                        format!("invalid {decl_name}, missing '=' sign"),
                    )
                }),
            );
        }
        self.push_token(TokenKind::Equal, Span::new(self.pos(), self.pos() + 1));
        self.i += 1;
        self.eat_space();

        let (right, _) = self.parse_expression_inner(false);
        let kind = if global {
            NodeKind::GlobalVariableDeclaration {
                left: Box::new(left),
                type_annotation,
                right: Some(Box::new(right)),
            }
        } else {
            NodeKind::LocalVariableDeclaration {
                left: Box::new(left),
                type_annotation,
                right: Some(Box::new(right)),
            }
        };
        let mut node = Node::new(self.span_from(decl_start), kind);
        if let Some(err) = err {
            node.base.err = Some(err);
        }
        node
    }

    /// `{name, other as rename, maybe?}` destructuring left side.
    fn parse_object_destructuration(&mut self) -> Node {
        let start = self.pos();
        self.push_token(TokenKind::OpeningCurlyBracket, Span::new(start, start + 1));
        self.i += 1;
        self.eat_space_newline_comma_comment();

        let mut properties = Vec::new();
        while !self.eof() && !self.cur_is('}') {
            let prop_start = self.pos();
            if !self.cur().is_some_and(is_ident_first_char) {
                #[allow(clippy::unwrap_used)] // non-eof checked by loop condition
                let r = self.cur().unwrap();
                self.i += 1;
                properties.push(Node::with_error(
                    Span::new(prop_start, self.pos()),
                    NodeKind::UnknownNode,
                    ParsingError::unspecified(errors::fmt_unexpected_char_in(
                        r,
                        "object destructuration",
                    )),
                ));
                self.eat_space_newline_comma_comment();
                continue;
            }
            while self.cur().is_some_and(is_ident_char) {
                self.i += 1;
            }
            let property_name = Node::new(
                self.span_from(prop_start),
                NodeKind::IdentifierLiteral {
                    name: self.slice_str(prop_start, self.pos()).into(),
                },
            );

            let mut nillable = false;
            if self.cur_is('?') {
                nillable = true;
                self.i += 1;
            }

            self.eat_space();
            let mut new_name = None;
            if self.keyword_ahead("as") {
                self.push_token(TokenKind::As, Span::new(self.pos(), self.pos() + 2));
                self.i += 2;
                self.eat_space();
                let rename_start = self.pos();
                while self.cur().is_some_and(is_ident_char) {
                    self.i += 1;
                }
                new_name = Some(Box::new(Node::new(
                    self.span_from(rename_start),
                    NodeKind::IdentifierLiteral {
                        name: self.slice_str(rename_start, self.pos()).into(),
                    },
                )));
            }

            properties.push(Node::new(
                self.span_from(prop_start),
                NodeKind::ObjectDestructurationProperty {
                    property_name: Box::new(property_name),
                    new_name,
                    nillable,
                },
            ));
            self.eat_space_newline_comma_comment();
        }

        let mut err = None;
        if self.cur_is('}') {
            self.push_token(
                TokenKind::ClosingCurlyBracket,
                Span::new(self.pos(), self.pos() + 1),
            );
            self.i += 1;
        } else {
            err = Some(ParsingError::unspecified(
                "unterminated object destructuration: missing closing brace '}'",
            ));
        }

        let mut node = Node::new(
            self.span_from(start),
            NodeKind::ObjectDestructuration { properties },
        );
        if let Some(err) = err {
            node.base.err = Some(err);
        }
        node
    }

    /// Unique-default-case bookkeeping shared by switch and match.
    pub(crate) fn note_default_case(
        default_cases: &[Node],
        case: &mut Node,
    ) {
        if !default_cases.is_empty() {
            case.set_error_if_none(ParsingError::unspecified(DEFAULT_CASE_MUST_BE_UNIQUE));
        }
    }
}

enum ReturnLike {
    Return,
    Yield,
    Coyield,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse_chunk, ParserOptions};
    use pretty_assertions::assert_eq;

    fn statements(source: &str) -> Vec<Node> {
        let (chunk, _) = parse_chunk(source, &ParserOptions::default());
        match chunk.kind {
            NodeKind::Chunk { statements, .. } => statements,
            other => panic!("expected chunk, got {other:?}"),
        }
    }

    fn first_statement(source: &str) -> Node {
        let mut statements = statements(source);
        assert!(!statements.is_empty(), "no statements parsed");
        statements.remove(0)
    }

    #[test]
    fn assignment() {
        let stmt = first_statement("a = 1");
        match &stmt.kind {
            NodeKind::Assignment {
                operator,
                left,
                right,
            } => {
                assert_eq!(*operator, AssignmentOperator::Assign);
                assert!(matches!(left.kind, NodeKind::IdentifierLiteral { .. }));
                assert!(right.is_some());
            }
            other => panic!("expected assignment, got {other:?}"),
        }
        assert!(stmt.base.err.is_none());
    }

    #[test]
    fn compound_assignment() {
        let stmt = first_statement("$a += 1\n");
        assert!(matches!(
            stmt.kind,
            NodeKind::Assignment {
                operator: AssignmentOperator::PlusAssign,
                ..
            }
        ));
    }

    #[test]
    fn assignment_requires_terminator() {
        let stmt = first_statement("a = 1 2");
        assert!(stmt
            .base
            .err
            .as_ref()
            .is_some_and(|e| e.kind == ParsingErrorKind::InvalidNext));
    }

    #[test]
    fn invalid_assignment_lhs() {
        let stmt = first_statement("1 = 2");
        assert!(stmt
            .base
            .err
            .as_ref()
            .is_some_and(|e| e.message.contains("cannot assign")));
    }

    #[test]
    fn multi_assignment() {
        let stmt = first_statement("assign a b = c");
        match &stmt.kind {
            NodeKind::MultiAssignment {
                variables,
                right,
                nillable,
            } => {
                assert_eq!(variables.len(), 2);
                assert!(right.is_some());
                assert!(!nillable);
            }
            other => panic!("expected multi assignment, got {other:?}"),
        }
    }

    #[test]
    fn command_like_call() {
        let stmt = first_statement("print a b");
        match &stmt.kind {
            NodeKind::CallExpression {
                arguments,
                command_like,
                must,
                ..
            } => {
                assert_eq!(arguments.len(), 2);
                assert!(command_like);
                assert!(must);
            }
            other => panic!("expected command-like call, got {other:?}"),
        }
    }

    #[test]
    fn pipeline_statement() {
        let stmt = first_statement("ls | map f | print");
        match &stmt.kind {
            NodeKind::PipelineStatement { stages } => {
                assert_eq!(stages.len(), 3);
                assert!(stages
                    .iter()
                    .all(|s| matches!(s.kind, NodeKind::CallExpression { .. })));
            }
            other => panic!("expected pipeline, got {other:?}"),
        }
        assert!(stmt.base.err.is_none());
    }

    #[test]
    fn local_variable_declaration() {
        let stmt = first_statement("var x = 1");
        match &stmt.kind {
            NodeKind::LocalVariableDeclarations { declarations } => {
                assert_eq!(declarations.len(), 1);
                assert!(matches!(
                    declarations[0].kind,
                    NodeKind::LocalVariableDeclaration { right: Some(_), .. }
                ));
            }
            other => panic!("expected declarations, got {other:?}"),
        }
    }

    #[test]
    fn variable_declaration_with_annotation() {
        let stmt = first_statement("var x %int = 1");
        match &stmt.kind {
            NodeKind::LocalVariableDeclarations { declarations } => {
                assert!(matches!(
                    declarations[0].kind,
                    NodeKind::LocalVariableDeclaration {
                        type_annotation: Some(_),
                        ..
                    }
                ));
            }
            other => panic!("expected declarations, got {other:?}"),
        }
    }

    #[test]
    fn missing_equals_in_declaration() {
        let stmt = first_statement("var x");
        let mut found = false;
        quill_ir::walk(&stmt, &mut |n, _, _| {
            if n.base
                .err
                .as_ref()
                .is_some_and(|e| e.kind == ParsingErrorKind::MissingEqualsSignInDeclaration)
            {
                found = true;
            }
            quill_ir::TraversalAction::Continue
        });
        assert!(found);
    }

    #[test]
    fn destructuring_declaration() {
        let stmt = first_statement("var {a, b as c, d?} = obj");
        let mut renames = 0;
        let mut nillable = 0;
        quill_ir::walk(&stmt, &mut |n, _, _| {
            if let NodeKind::ObjectDestructurationProperty {
                new_name,
                nillable: n_flag,
                ..
            } = &n.kind
            {
                if new_name.is_some() {
                    renames += 1;
                }
                if *n_flag {
                    nillable += 1;
                }
            }
            quill_ir::TraversalAction::Continue
        });
        assert_eq!((renames, nillable), (1, 1));
    }

    #[test]
    fn globalvar_declaration() {
        let stmt = first_statement("globalvar x = 1");
        assert!(matches!(
            stmt.kind,
            NodeKind::GlobalVariableDeclarations { .. }
        ));
    }

    #[test]
    fn return_statements() {
        assert!(matches!(
            first_statement("return 1").kind,
            NodeKind::ReturnStatement { expr: Some(_) }
        ));
        assert!(matches!(
            first_statement("return").kind,
            NodeKind::ReturnStatement { expr: None }
        ));
        assert!(matches!(
            first_statement("yield 1").kind,
            NodeKind::YieldStatement { expr: Some(_) }
        ));
        assert!(matches!(
            first_statement("coyield").kind,
            NodeKind::CoyieldStatement { expr: None }
        ));
        assert!(matches!(first_statement("break").kind, NodeKind::BreakStatement));
        assert!(matches!(
            first_statement("continue").kind,
            NodeKind::ContinueStatement
        ));
        assert!(matches!(first_statement("prune").kind, NodeKind::PruneStatement));
    }

    #[test]
    fn assert_statement() {
        let stmt = first_statement("assert (a < b)");
        assert!(matches!(stmt.kind, NodeKind::AssertionStatement { .. }));
    }

    #[test]
    fn synchronized_block() {
        let stmt = first_statement("synchronized $a { x = 1 }");
        match &stmt.kind {
            NodeKind::SynchronizedBlockStatement {
                synchronized_values,
                block,
            } => {
                assert_eq!(synchronized_values.len(), 1);
                assert!(block.is_some());
            }
            other => panic!("expected synchronized block, got {other:?}"),
        }
    }

    #[test]
    fn synchronized_without_block() {
        let stmt = first_statement("synchronized $a");
        assert!(stmt
            .base
            .err
            .as_ref()
            .is_some_and(|e| e.kind == ParsingErrorKind::MissingBlock));
    }

    #[test]
    fn extend_statement() {
        let stmt = first_statement("extend user {greet: fn(){}}");
        match &stmt.kind {
            NodeKind::ExtendStatement {
                extended_pattern,
                extension,
            } => {
                assert!(extended_pattern.is_some());
                assert!(extension.is_some());
            }
            other => panic!("expected extend statement, got {other:?}"),
        }
    }

    #[test]
    fn pattern_definition_statement() {
        let stmt = first_statement("pattern p = | 1 | 2");
        match &stmt.kind {
            NodeKind::PatternDefinition { left, right, lazy } => {
                assert!(matches!(
                    left.as_deref().map(|l| &l.kind),
                    Some(NodeKind::PatternIdentifierLiteral { .. })
                ));
                assert!(matches!(
                    right.as_deref().map(|r| &r.kind),
                    Some(NodeKind::PatternUnion { cases }) if cases.len() == 2
                ));
                assert!(!lazy);
            }
            other => panic!("expected pattern definition, got {other:?}"),
        }
        assert!(!stmt.error_at_any_depth());
    }

    #[test]
    fn lazy_pattern_definition() {
        let stmt = first_statement("pattern p = @ %str");
        assert!(matches!(
            stmt.kind,
            NodeKind::PatternDefinition { lazy: true, .. }
        ));
    }

    #[test]
    fn statements_must_be_separated() {
        let statements = statements("a = 1;b = 2");
        assert_eq!(statements.len(), 2);
        assert!(statements.iter().all(|s| s.base.err.is_none()));
    }
}
