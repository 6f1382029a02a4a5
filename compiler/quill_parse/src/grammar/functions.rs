//! Function expressions, declarations and patterns, plus call argument
//! parsing (parenthesized and command-like).

use crate::chars::{is_alpha, is_comment_first_space, is_unpaired_or_closing_delim};
use crate::errors;
use crate::Parser;
use quill_diagnostic::{ParsingError, ParsingErrorKind};
use quill_ir::{Node, NodeKind, Span, Token, TokenKind};

const CAPTURE_LIST_SHOULD_ONLY_CONTAIN_IDENTIFIERS: &str =
    "capture lists should only contain identifiers";
const UNTERMINATED_CAPTURE_LIST: &str =
    "unterminated capture list: missing closing bracket ']'";
const FN_SHOULD_BE_FOLLOWED_BY_PARAMS: &str =
    "the 'fn' keyword or the function name should be followed by a parameter list";
const UNTERMINATED_PARAM_LIST_MISSING_CLOSING_PAREN: &str =
    "unterminated parameter list: missing closing parenthesis";
const PARAM_LIST_SHOULD_BE_FOLLOWED_BY_BLOCK_OR_ARROW: &str =
    "the parameter list should be followed by a block or '=>'";
const PARAMS_SHOULD_BE_SEP_BY_COMMAS: &str =
    "parameters should be identifiers separated by commas";
const VARIADIC_PARAM_IS_UNIQUE_AND_LAST: &str =
    "there can only be one variadic parameter and it should be the last one";
const UNTERMINATED_CALL_MISSING_CLOSING_PAREN: &str =
    "unterminated call: missing closing parenthesis ')'";

impl Parser {
    /// `fn [captures] [name](params) [%return-type] { … }` or
    /// `fn(params) => expr`. Returns a declaration when a name is present.
    pub(crate) fn parse_function(&mut self, start: u32) -> Node {
        self.check_cancellation();

        self.push_token(TokenKind::Fn, Span::new(start, start + 2));
        self.eat_space();

        let mut err: Option<ParsingError> = None;
        let mut capture_list = Vec::new();
        let mut has_capture_list = false;
        let mut name: Option<Node> = None;

        // capture list
        if self.cur_is('[') {
            has_capture_list = true;
            self.push_token(TokenKind::OpeningBracket, Span::new(self.pos(), self.pos() + 1));
            self.i += 1;
            self.eat_space();

            while !self.eof() && !self.cur_is(']') {
                let (captured, is_missing) = self.parse_expression_inner(false);
                if is_missing {
                    if self.eof() {
                        break;
                    }
                    #[allow(clippy::unwrap_used)] // non-eof checked above
                    let r = self.cur().unwrap();
                    self.i += 1;
                    capture_list.push(Node::with_error(
                        captured.span(),
                        NodeKind::UnknownNode,
                        ParsingError::unspecified(errors::fmt_unexpected_char_in(
                            r,
                            "capture list",
                        )),
                    ));
                } else {
                    let mut captured = captured;
                    if !matches!(captured.kind, NodeKind::IdentifierLiteral { .. }) {
                        captured.set_error_if_none(ParsingError::unspecified(
                            CAPTURE_LIST_SHOULD_ONLY_CONTAIN_IDENTIFIERS,
                        ));
                    }
                    capture_list.push(captured);
                }
                self.eat_space_comma();
            }

            if self.cur_is(']') {
                self.push_token(TokenKind::ClosingBracket, Span::new(self.pos(), self.pos() + 1));
                self.i += 1;
            } else {
                return self.function_with_error(
                    start,
                    name,
                    capture_list,
                    ParsingError::new(
                        ParsingErrorKind::InvalidNext,
                        UNTERMINATED_CAPTURE_LIST,
                    ),
                );
            }
            self.eat_space();
        }

        // function name (declaration)
        if self.cur().is_some_and(is_alpha) {
            let ident_like = self.parse_ident_starting_expression(false);
            if matches!(ident_like.kind, NodeKind::IdentifierLiteral { .. }) {
                name = Some(ident_like);
            } else {
                let kind_name = ident_like.kind_name();
                return Node::with_error(
                    self.span_from(start),
                    NodeKind::FunctionDeclaration {
                        annotations: None,
                        function: Box::new(Node::new(
                            self.span_from(start),
                            empty_function(capture_list),
                        )),
                        name: Box::new(ident_like),
                    },
                    ParsingError::unspecified(format!(
                        "a function name should be an identifier, not a(n) {kind_name}"
                    )),
                );
            }
        }

        if !self.cur_is('(') {
            let message = if has_capture_list && name.is_none() {
                "a capture list should be followed by a parameter list"
            } else {
                FN_SHOULD_BE_FOLLOWED_BY_PARAMS
            };
            return self.function_with_error(
                start,
                name,
                capture_list,
                ParsingError::new(ParsingErrorKind::InvalidNext, message),
            );
        }

        self.push_token(
            TokenKind::OpeningParenthesis,
            Span::new(self.pos(), self.pos() + 1),
        );
        self.i += 1;

        let (parameters, is_variadic) = self.parse_function_parameters(false);

        let mut return_type = None;
        let mut body = None;
        let mut is_body_expression = false;

        if self.eof() {
            err = Some(ParsingError::unspecified(
                UNTERMINATED_PARAM_LIST_MISSING_CLOSING_PAREN,
            ));
        } else if !self.cur_is(')') {
            err = Some(ParsingError::unspecified("invalid function syntax"));
        } else {
            self.push_token(
                TokenKind::ClosingParenthesis,
                Span::new(self.pos(), self.pos() + 1),
            );
            self.i += 1;
            self.eat_space();

            if self.cur_is('%') {
                return_type = Some(Box::new(self.parse_percent_prefixed_pattern(false)));
            }
            self.eat_space();

            match self.cur() {
                Some('{') => {
                    body = Some(Box::new(self.parse_block()));
                }
                Some('=') if self.peek_is(1, '>') => {
                    self.push_token(TokenKind::Arrow, Span::new(self.pos(), self.pos() + 2));
                    self.i += 2;
                    self.eat_space();
                    let (expr, _) = self.parse_expression_inner(false);
                    body = Some(Box::new(expr));
                    is_body_expression = true;
                }
                _ => {
                    err = Some(ParsingError::new(
                        ParsingErrorKind::MissingFnBody,
                        PARAM_LIST_SHOULD_BE_FOLLOWED_BY_BLOCK_OR_ARROW,
                    ));
                }
            }
        }

        let function = Node::new(
            self.span_from(start),
            NodeKind::FunctionExpression {
                capture_list,
                parameters,
                is_variadic,
                return_type,
                is_body_expression,
                body,
            },
        );

        let mut node = match name {
            Some(name) => Node::new(
                function.span(),
                NodeKind::FunctionDeclaration {
                    annotations: None,
                    function: Box::new(function),
                    name: Box::new(name),
                },
            ),
            None => function,
        };
        if let Some(err) = err {
            node.set_error_if_none(err);
        }
        node
    }

    fn function_with_error(
        &mut self,
        start: u32,
        name: Option<Node>,
        capture_list: Vec<Node>,
        err: ParsingError,
    ) -> Node {
        let function = Node::new(self.span_from(start), empty_function(capture_list));
        match name {
            Some(name) => Node::with_error(
                self.span_from(start),
                NodeKind::FunctionDeclaration {
                    annotations: None,
                    function: Box::new(function),
                    name: Box::new(name),
                },
                err,
            ),
            None => {
                let mut function = function;
                function.base.err = Some(err);
                function
            }
        }
    }

    /// `%fn(params) %return-type` function pattern; no body.
    pub(crate) fn parse_function_pattern(&mut self, start: u32) -> Node {
        self.check_cancellation();

        self.push_token(TokenKind::PercentFn, Span::new(start, self.pos()));
        self.eat_space();

        if !self.cur_is('(') {
            return Node::with_error(
                self.span_from(start),
                NodeKind::FunctionPatternExpression {
                    parameters: vec![],
                    is_variadic: false,
                    return_type: None,
                },
                ParsingError::new(
                    ParsingErrorKind::InvalidNext,
                    FN_SHOULD_BE_FOLLOWED_BY_PARAMS,
                ),
            );
        }
        self.push_token(
            TokenKind::OpeningParenthesis,
            Span::new(self.pos(), self.pos() + 1),
        );
        self.i += 1;

        let (parameters, is_variadic) = self.parse_function_parameters(true);

        let mut err = None;
        let mut return_type = None;

        if !self.cur_is(')') {
            err = Some(ParsingError::unspecified(
                UNTERMINATED_PARAM_LIST_MISSING_CLOSING_PAREN,
            ));
        } else {
            self.push_token(
                TokenKind::ClosingParenthesis,
                Span::new(self.pos(), self.pos() + 1),
            );
            self.i += 1;
            self.eat_space();

            if self.cur_is('%') || self.cur().is_some_and(is_alpha) {
                let in_pattern_save = self.in_pattern;
                self.in_pattern = true;
                let (annotation, _) = self.parse_expression_inner(false);
                self.in_pattern = in_pattern_save;
                return_type = Some(Box::new(annotation));
            }
        }

        let mut node = Node::new(
            self.span_from(start),
            NodeKind::FunctionPatternExpression {
                parameters,
                is_variadic,
                return_type,
            },
        );
        if let Some(err) = err {
            node.base.err = Some(err);
        }
        node
    }

    /// Parameter list after `(`. In pattern form parameters may be types
    /// only.
    fn parse_function_parameters(&mut self, pattern_form: bool) -> (Vec<Node>, bool) {
        let mut parameters = Vec::new();
        let mut is_variadic = false;

        while !self.eof() && !self.cur_is(')') {
            self.eat_space_newline_comma();
            if self.eof() || self.cur_is(')') {
                break;
            }

            let mut param_err = None;
            if is_variadic {
                param_err = Some(ParsingError::unspecified(VARIADIC_PARAM_IS_UNIQUE_AND_LAST));
            }

            if self.cur_is('.') && self.peek_is(1, '.') && self.peek_is(2, '.') {
                is_variadic = true;
                self.push_token(TokenKind::ThreeDots, Span::new(self.pos(), self.pos() + 3));
                self.i += 3;
            }

            let in_pattern_save = self.in_pattern;
            self.in_pattern = pattern_form;
            let (var_node, is_missing) = self.parse_expression_inner(false);
            self.in_pattern = in_pattern_save;

            if is_missing {
                if self.eof() {
                    break;
                }
                #[allow(clippy::unwrap_used)] // non-eof checked above
                let r = self.cur().unwrap();
                self.i += 1;
                parameters.push(Node::with_error(
                    Span::new(self.pos() - 1, self.pos()),
                    NodeKind::UnknownNode,
                    ParsingError::unspecified(errors::fmt_unexpected_char_in(r, "parameters")),
                ));
                continue;
            }

            if pattern_form {
                // type-only parameter
                let mut node = Node::new(
                    var_node.span(),
                    NodeKind::FunctionParameter {
                        var: None,
                        type_annotation: Some(Box::new(var_node)),
                        is_variadic,
                    },
                );
                if let Some(err) = param_err {
                    node.base.err = Some(err);
                }
                parameters.push(node);
            } else {
                self.eat_space();

                let mut type_annotation = None;
                if !self.cur_is(')') && !self.cur_is(',') && !self.cur_is('\n') && !self.eof() {
                    let in_pattern_save = self.in_pattern;
                    self.in_pattern = true;
                    let (annotation, type_missing) = self.parse_expression_inner(false);
                    self.in_pattern = in_pattern_save;
                    if !type_missing {
                        type_annotation = Some(Box::new(annotation));
                    }
                }

                if matches!(var_node.kind, NodeKind::IdentifierLiteral { .. }) {
                    let mut node = Node::new(
                        var_node.span(),
                        NodeKind::FunctionParameter {
                            var: Some(Box::new(var_node)),
                            type_annotation,
                            is_variadic,
                        },
                    );
                    if let Some(err) = param_err {
                        node.base.err = Some(err);
                    }
                    parameters.push(node);
                } else {
                    let mut var_node = var_node;
                    var_node.set_error_if_none(ParsingError::unspecified(
                        PARAMS_SHOULD_BE_SEP_BY_COMMAS,
                    ));
                    parameters.push(var_node);
                }
            }

            self.eat_space_newline_comma();
        }

        (parameters, is_variadic)
    }

    /// Arguments of `callee(…)`; the opening parenthesis was consumed.
    pub(crate) fn parse_parenthesized_call_args(
        &mut self,
        span_start: u32,
        callee: Node,
        must: bool,
    ) -> Node {
        self.check_cancellation();

        let mut arguments = Vec::new();
        let mut err = None;

        self.eat_space_newline_comma_comment();

        while !self.eof() && !self.cur_is(')') {
            if self.cur_is('.') && self.peek_is(1, '.') && self.peek_is(2, '.') {
                let spread_start = self.pos();
                self.push_token(TokenKind::ThreeDots, Span::new(spread_start, spread_start + 3));
                self.i += 3;
                self.eat_space();
                let (expr, _) = self.parse_expression_inner(false);
                arguments.push(Node::new(
                    Span::new(spread_start, expr.span().end),
                    NodeKind::SpreadArgument {
                        expr: Box::new(expr),
                    },
                ));
            } else {
                let (arg, is_missing) = self.parse_expression_inner(false);
                if is_missing {
                    #[allow(clippy::unwrap_used)] // missing-expr only before eof here
                    let r = self.cur().unwrap();
                    let span = Span::new(self.pos(), self.pos() + 1);
                    self.tokens.push(Token::with_raw(
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
                            "call arguments",
                        )),
                    ));
                } else {
                    arguments.push(arg);
                }
            }
            self.eat_space_newline_comma_comment();
        }

        if self.cur_is(')') {
            self.push_token(
                TokenKind::ClosingParenthesis,
                Span::new(self.pos(), self.pos() + 1),
            );
            self.i += 1;
        } else {
            err = Some(ParsingError::unspecified(UNTERMINATED_CALL_MISSING_CLOSING_PAREN));
        }

        let mut node = Node::new(
            self.span_from(span_start),
            NodeKind::CallExpression {
                callee: Box::new(callee),
                arguments,
                must,
                command_like: false,
            },
        );
        if let Some(err) = err {
            node.base.err = Some(err);
        }
        node
    }

    /// Arguments of a command-like call; stops at a newline, `|`, `;`, a
    /// closing delimiter or a comment.
    pub(crate) fn parse_call_args_no_parenthesis(&mut self, call: &mut Node) {
        loop {
            self.eat_space();
            let Some(r) = self.cur() else { break };
            if r == '\n'
                || r == '|'
                || r == ';'
                || (r == '#' && self.peek(1).is_some_and(is_comment_first_space))
                || (is_unpaired_or_closing_delim(r) && r != ':')
            {
                break;
            }

            let argument = if r == '.' && self.peek_is(1, '.') && self.peek_is(2, '.') {
                let spread_start = self.pos();
                self.push_token(TokenKind::ThreeDots, Span::new(spread_start, spread_start + 3));
                self.i += 3;
                let (expr, _) = self.parse_expression_inner(false);
                Node::new(
                    Span::new(spread_start, expr.span().end),
                    NodeKind::SpreadArgument {
                        expr: Box::new(expr),
                    },
                )
            } else {
                let (arg, is_missing) = self.parse_expression_inner(false);
                if is_missing {
                    break;
                }
                arg
            };

            if let NodeKind::CallExpression { arguments, .. } = &mut call.kind {
                arguments.push(argument);
            }
        }
    }
}

fn empty_function(capture_list: Vec<Node>) -> NodeKind {
    NodeKind::FunctionExpression {
        capture_list,
        parameters: vec![],
        is_variadic: false,
        return_type: None,
        is_body_expression: false,
        body: None,
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
    fn function_expression_with_block() {
        let node = parse("fn(a, b){ return a }");
        match &node.kind {
            NodeKind::FunctionExpression {
                parameters,
                body,
                is_body_expression,
                ..
            } => {
                assert_eq!(parameters.len(), 2);
                assert!(body.is_some());
                assert!(!is_body_expression);
            }
            other => panic!("expected function expression, got {other:?}"),
        }
        assert!(!node.error_at_any_depth());
    }

    #[test]
    fn function_with_arrow_body() {
        let node = parse("fn(x) => x");
        assert!(matches!(
            node.kind,
            NodeKind::FunctionExpression {
                is_body_expression: true,
                ..
            }
        ));
    }

    #[test]
    fn function_declaration() {
        let node = parse("fn add(a, b){ }");
        match &node.kind {
            NodeKind::FunctionDeclaration { name, function, .. } => {
                assert!(matches!(
                    &name.kind,
                    NodeKind::IdentifierLiteral { name } if &**name == "add"
                ));
                assert!(matches!(function.kind, NodeKind::FunctionExpression { .. }));
            }
            other => panic!("expected function declaration, got {other:?}"),
        }
    }

    #[test]
    fn function_with_capture_list() {
        let node = parse("fn[a, b](x){ }");
        match &node.kind {
            NodeKind::FunctionExpression { capture_list, .. } => {
                assert_eq!(capture_list.len(), 2);
            }
            other => panic!("expected function expression, got {other:?}"),
        }
        assert!(!node.error_at_any_depth());
    }

    #[test]
    fn variadic_parameter() {
        let node = parse("fn(a, ...rest){ }");
        assert!(matches!(
            node.kind,
            NodeKind::FunctionExpression {
                is_variadic: true,
                ..
            }
        ));
    }

    #[test]
    fn parameter_with_type() {
        let node = parse("fn(a int){ }");
        match &node.kind {
            NodeKind::FunctionExpression { parameters, .. } => {
                assert!(matches!(
                    parameters[0].kind,
                    NodeKind::FunctionParameter {
                        type_annotation: Some(_),
                        ..
                    }
                ));
            }
            other => panic!("expected function expression, got {other:?}"),
        }
    }

    #[test]
    fn missing_body_is_an_error() {
        let node = parse("fn(a)");
        assert!(node
            .base
            .err
            .as_ref()
            .is_some_and(|e| e.kind == ParsingErrorKind::MissingFnBody));
    }

    #[test]
    fn function_pattern() {
        let mut p = Parser::new("%fn(int, str) bool", &ParserOptions::default());
        let node = p.parse_expression_inner(false).0;
        match &node.kind {
            NodeKind::FunctionPatternExpression {
                parameters,
                return_type,
                ..
            } => {
                assert_eq!(parameters.len(), 2);
                assert!(return_type.is_some());
            }
            other => panic!("expected function pattern, got {other:?}"),
        }
    }

    #[test]
    fn call_with_spread_argument() {
        let node = parse("f(...args)");
        match &node.kind {
            NodeKind::CallExpression { arguments, .. } => {
                assert!(matches!(arguments[0].kind, NodeKind::SpreadArgument { .. }));
            }
            other => panic!("expected call, got {other:?}"),
        }
    }

    #[test]
    fn unterminated_call() {
        let node = parse("f(1, 2");
        assert!(node
            .base
            .err
            .as_ref()
            .is_some_and(|e| e.message.contains("unterminated call")));
    }
}
