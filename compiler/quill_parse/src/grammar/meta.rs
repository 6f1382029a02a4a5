//! Quoted regions, unquoted regions, metadata annotations and annotated
//! region headers.
//!
//! `@(expr)` quotes an expression, `@{stmts}` quotes statements; inside a
//! quoted region `<{ expr }>` escapes back to the outer context. Quoted
//! regions cannot nest, unquoted regions cannot nest, and an unquoted
//! region outside a quoted one is an error.

use crate::chars::{is_closing_delim, is_forbidden_space_char, is_ident_char, is_ident_first_char};
use crate::errors;
use crate::Parser;
use quill_diagnostic::{ParsingError, ParsingErrorKind};
use quill_ir::{Node, NodeKind, Span, Token, TokenKind};

const AT_SYMBOL_SHOULD_BE_FOLLOWED_BY: &str =
    "'@' should be followed by '(', '{' or an identifier";
const META_IDENT_MUST_NOT_END_WITH_HYPHEN: &str =
    "a meta identifier must not end with '-'";
const NESTED_QUOTED_REGIONS_NOT_ALLOWED: &str = "quoted regions cannot be nested";
const NESTED_UNQUOTED_REGIONS_NOT_ALLOWED: &str = "unquoted regions cannot be nested";
const UNQUOTED_REGIONS_ONLY_INSIDE_QUOTED_REGIONS: &str =
    "unquoted regions are only allowed inside quoted regions";
const UNTERMINATED_QUOTED_STMTS_MISSING_CLOSING_DELIM: &str =
    "unterminated quoted statements region: missing closing '}'";
const UNTERMINATED_UNQUOTED_REGION_MISSING_CLOSING_DELIM: &str =
    "unterminated unquoted region: missing closing '}>'";
const UNQUOTED_REGION_SHOULD_CONTAIN_A_SINGLE_EXPR: &str =
    "an unquoted region should contain a single expression";
const ANNOTATIONS_SHOULD_BE_FOLLOWED_BY_STMT: &str =
    "metadata annotations should be followed by a statement supporting them (a function declaration)";
const UNTERMINATED_REGION_HEADER_MISSING_TEXT: &str =
    "unterminated annotated region header: missing text after \"@'\"";
const REGION_HEADER_SHOULD_BE_FOLLOWED_BY_LINEFEED: &str =
    "an annotated region header should be followed by a linefeed";

impl Parser {
    /// `@`-starting expression: quoted expression, quoted statements or a
    /// meta identifier.
    pub(crate) fn parse_at_starting_expression(&mut self) -> Node {
        self.check_cancellation();

        let start = self.pos();
        self.i += 1;

        match self.cur() {
            Some('(') => self.parse_quoted_expression(start),
            Some('{') => self.parse_quoted_statements(start),
            Some(r) if is_ident_first_char(r) => {
                while self.cur().is_some_and(is_ident_char) {
                    self.i += 1;
                }
                let name = self.slice_str(start + 1, self.pos());
                let span = self.span_from(start);
                self.push_raw_token(TokenKind::MetaIdentifier, span);
                let mut node = Node::new(span, NodeKind::MetaIdentifier { name: name.clone().into() });
                if name.ends_with('-') {
                    node.base.err = Some(ParsingError::unspecified(
                        META_IDENT_MUST_NOT_END_WITH_HYPHEN,
                    ));
                }
                node
            }
            _ => {
                self.tokens.push(Token::with_raw(
                    TokenKind::UnexpectedChar,
                    Span::new(start, self.pos()),
                    "@",
                ));
                Node::with_error(
                    self.span_from(start),
                    NodeKind::UnknownNode,
                    ParsingError::unspecified(AT_SYMBOL_SHOULD_BE_FOLLOWED_BY),
                )
            }
        }
    }

    /// `@(expr)`; the cursor is on `(`.
    fn parse_quoted_expression(&mut self, start: u32) -> Node {
        self.push_token(TokenKind::AtSign, Span::new(start, start + 1));

        let mut err = None;
        let was_quoted = self.in_quoted_region;
        if was_quoted {
            err = Some(ParsingError::unspecified(NESTED_QUOTED_REGIONS_NOT_ALLOWED));
        } else {
            self.in_quoted_region = true;
        }
        let in_pattern_save = self.in_pattern;
        self.in_pattern = false;

        // parsed as a parenthesized expression
        let (expr, _) = self.parse_expression_inner(false);

        self.in_pattern = in_pattern_save;
        if !was_quoted {
            self.in_quoted_region = false;
        }

        let mut node = Node::new(
            self.span_from(start),
            NodeKind::QuotedExpression {
                expr: Box::new(expr),
            },
        );
        if let Some(err) = err {
            node.base.err = Some(err);
        }
        node
    }

    /// `@{statements}`; the cursor is on `{`.
    fn parse_quoted_statements(&mut self, start: u32) -> Node {
        self.push_token(TokenKind::AtSign, Span::new(start, start + 1));
        self.push_token(
            TokenKind::OpeningCurlyBracket,
            Span::new(self.pos(), self.pos() + 1),
        );
        self.i += 1;

        let mut err = None;
        let was_quoted = self.in_quoted_region;
        if was_quoted {
            err = Some(ParsingError::unspecified(NESTED_QUOTED_REGIONS_NOT_ALLOWED));
        } else {
            self.in_quoted_region = true;
        }
        let in_pattern_save = self.in_pattern;
        self.in_pattern = false;

        let mut statements = Vec::new();
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
                        "quoted statements",
                    )),
                ));
                self.i += 1;
                self.eat_space_newline_semicolon_comment();
                continue;
            }

            let stmt = self.parse_statement();
            let is_missing = matches!(stmt.kind, NodeKind::MissingExpression);
            statements.push(stmt);
            if is_missing {
                break;
            }
            self.eat_space_newline_semicolon_comment();
        }

        if self.cur_is('}') {
            self.push_token(
                TokenKind::ClosingCurlyBracket,
                Span::new(self.pos(), self.pos() + 1),
            );
            self.i += 1;
        } else {
            err = err.or_else(|| {
                Some(ParsingError::unspecified(
                    UNTERMINATED_QUOTED_STMTS_MISSING_CLOSING_DELIM,
                ))
            });
        }

        self.in_pattern = in_pattern_save;
        if !was_quoted {
            self.in_quoted_region = false;
        }

        let mut node = Node::new(
            self.span_from(start),
            NodeKind::QuotedStatements { statements },
        );
        if let Some(err) = err {
            node.base.err = Some(err);
        }
        node
    }

    /// `<{ [...]expr }>`; the cursor is on `<`.
    pub(crate) fn parse_unquoted_region(&mut self) -> Node {
        self.check_cancellation();

        let start = self.pos();
        self.push_token(
            TokenKind::UnquotedRegionOpeningDelim,
            Span::new(start, start + 2),
        );
        self.i += 2;

        // spread marker
        let spread = self.cur_is('.') && self.peek_is(1, '.') && self.peek_is(2, '.');
        if spread {
            self.push_token(TokenKind::ThreeDots, Span::new(self.pos(), self.pos() + 3));
            self.i += 3;
        }

        let mut err = None;
        let mut entered = false;
        if self.in_quoted_region {
            if self.in_unquoted_region {
                err = Some(ParsingError::unspecified(NESTED_UNQUOTED_REGIONS_NOT_ALLOWED));
            } else {
                self.in_unquoted_region = true;
                entered = true;
            }
        } else {
            err = Some(ParsingError::unspecified(
                UNQUOTED_REGIONS_ONLY_INSIDE_QUOTED_REGIONS,
            ));
        }

        let in_pattern_save = self.in_pattern;
        self.in_pattern = false;

        self.eat_space_newline_comment();
        let (expr, _) = self.parse_expression_inner(false);
        self.eat_space_newline_comment();

        if self.cur_is('}') && self.peek_is(1, '>') {
            self.push_token(
                TokenKind::UnquotedRegionClosingDelim,
                Span::new(self.pos(), self.pos() + 2),
            );
            self.i += 2;
        } else if self.eof() {
            err = err.or_else(|| {
                Some(ParsingError::new(
                    ParsingErrorKind::UnterminatedUnquotedRegion,
                    UNTERMINATED_UNQUOTED_REGION_MISSING_CLOSING_DELIM,
                ))
            });
        } else {
            err = err.or_else(|| {
                Some(ParsingError::unspecified(
                    UNQUOTED_REGION_SHOULD_CONTAIN_A_SINGLE_EXPR,
                ))
            });
            // eat until EOF or '}>'
            while !self.eof() && !(self.cur_is('}') && self.peek_is(1, '>')) {
                self.i += 1;
            }
            if self.cur_is('}') {
                self.push_token(
                    TokenKind::UnquotedRegionClosingDelim,
                    Span::new(self.pos(), self.pos() + 2),
                );
                self.i += 2;
            }
        }

        self.in_pattern = in_pattern_save;
        if entered {
            self.in_unquoted_region = false;
        }

        let mut node = Node::new(
            self.span_from(start),
            NodeKind::UnquotedRegion {
                expr: Some(Box::new(expr)),
                spread,
            },
        );
        if let Some(err) = err {
            node.base.err = Some(err);
        }
        node
    }

    /// A run of `@ident` / `@ident(args)` annotations before a statement.
    /// Returns `None` when the cursor is not on an annotation.
    pub(crate) fn parse_metadata_annotations(&mut self) -> Option<Node> {
        if !self.cur_is('@') || !self.peek(1).is_some_and(is_ident_first_char) {
            return None;
        }

        let start = self.pos();
        let mut expressions = Vec::new();

        while self.cur_is('@') && self.peek(1).is_some_and(is_ident_first_char) {
            let meta = self.parse_at_starting_expression();
            let expression = if self.cur_is('(') {
                self.push_token(
                    TokenKind::OpeningParenthesis,
                    Span::new(self.pos(), self.pos() + 1),
                );
                self.i += 1;
                self.eat_space();
                let span_start = meta.span().start;
                self.parse_parenthesized_call_args(span_start, meta, false)
            } else {
                meta
            };
            expressions.push(expression);
            self.eat_space_newline_comment();
        }

        Some(Node::new(
            self.span_from(start),
            NodeKind::MetadataAnnotations { expressions },
        ))
    }

    /// Attach annotations to a statement when the statement supports them
    /// (function declarations); otherwise return a `MissingStatement`
    /// carrying them, to be inserted before the statement.
    pub(crate) fn attach_annotations(
        &mut self,
        annotations: Option<Node>,
        stmt: &mut Node,
    ) -> Option<Node> {
        let annotations = annotations?;
        if let NodeKind::FunctionDeclaration {
            annotations: slot, ..
        } = &mut stmt.kind
        {
            stmt.base.span.start = stmt.base.span.start.min(annotations.span().start);
            *slot = Some(Box::new(annotations));
            return None;
        }
        Some(Node::with_error(
            annotations.span(),
            NodeKind::MissingStatement {
                annotations: Some(Box::new(annotations)),
            },
            ParsingError::unspecified(ANNOTATIONS_SHOULD_BE_FOLLOWED_BY_STMT),
        ))
    }

    /// `@'text'` region header (markup regions and statement regions),
    /// optionally followed by annotations on the same line.
    pub(crate) fn parse_annotated_region_header(&mut self) -> Node {
        let start = self.pos();
        self.push_token(TokenKind::AtSign, Span::new(start, start + 1));
        self.i += 2; // @'

        let text_start = self.pos() - 1;
        while !self.eof() && !self.cur_is('\'') && !self.cur_is('\n') {
            self.i += 1;
        }

        let mut err = None;
        let text_node = if self.cur_is('\'') {
            self.i += 1;
            let raw = self.slice_str(text_start, self.pos());
            let value = self.slice_str(text_start + 1, self.pos() - 1);
            self.tokens.push(Token::with_raw(
                TokenKind::AnnotatedRegionHeaderText,
                Span::new(text_start, self.pos()),
                raw.clone(),
            ));
            Node::new(
                Span::new(text_start, self.pos()),
                NodeKind::AnnotatedRegionHeaderText {
                    value: value.into(),
                    raw: raw.into(),
                },
            )
        } else {
            err = Some(ParsingError::unspecified(
                UNTERMINATED_REGION_HEADER_MISSING_TEXT,
            ));
            let raw = self.slice_str(text_start, self.pos());
            Node::new(
                Span::new(text_start, self.pos()),
                NodeKind::AnnotatedRegionHeaderText {
                    value: raw.clone().into(),
                    raw: raw.into(),
                },
            )
        };

        self.eat_space();

        let mut annotations = Vec::new();
        while self.cur_is('@') && self.peek(1).is_some_and(is_ident_first_char) {
            let meta = self.parse_at_starting_expression();
            let expression = if self.cur_is('(') {
                self.push_token(
                    TokenKind::OpeningParenthesis,
                    Span::new(self.pos(), self.pos() + 1),
                );
                self.i += 1;
                self.eat_space();
                let span_start = meta.span().start;
                self.parse_parenthesized_call_args(span_start, meta, false)
            } else {
                meta
            };
            annotations.push(expression);
            self.eat_space();
        }

        if !self.eof() && !self.cur_is('\n') && err.is_none() {
            err = Some(ParsingError::unspecified(
                REGION_HEADER_SHOULD_BE_FOLLOWED_BY_LINEFEED,
            ));
        }

        let mut node = Node::new(
            self.span_from(start),
            NodeKind::AnnotatedRegionHeader {
                text: Box::new(text_node),
                annotations,
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
    fn quoted_expression() {
        let node = parse("@(1 + 2)");
        match &node.kind {
            NodeKind::QuotedExpression { expr } => {
                assert!(matches!(expr.kind, NodeKind::BinaryExpression { .. }));
            }
            other => panic!("expected quoted expression, got {other:?}"),
        }
        assert!(!node.error_at_any_depth());
    }

    #[test]
    fn quoted_statements() {
        let node = parse("@{a = 1; b = 2}");
        match &node.kind {
            NodeKind::QuotedStatements { statements } => assert_eq!(statements.len(), 2),
            other => panic!("expected quoted statements, got {other:?}"),
        }
        assert!(!node.error_at_any_depth());
    }

    #[test]
    fn nested_quoted_regions_are_an_error() {
        let node = parse("@(@(1))");
        assert!(node.error_at_any_depth());
    }

    #[test]
    fn unquoted_region_inside_quoted() {
        let node = parse("@(<{ x }>)");
        assert!(!node.error_at_any_depth());

        let mut found = false;
        quill_ir::walk(&node, &mut |n, _, _| {
            if matches!(n.kind, NodeKind::UnquotedRegion { spread: false, .. }) {
                found = true;
            }
            quill_ir::TraversalAction::Continue
        });
        assert!(found);
    }

    #[test]
    fn unquoted_region_outside_quoted_is_an_error() {
        let mut p = Parser::new("<{ x }>", &ParserOptions::default());
        let node = p.parse_unquoted_region();
        assert!(node
            .base
            .err
            .as_ref()
            .is_some_and(|e| e.message.contains("only allowed inside")));
    }

    #[test]
    fn unquoted_region_spread() {
        let node = parse("@(<{ ...xs }>)");
        let mut spread = false;
        quill_ir::walk(&node, &mut |n, _, _| {
            if matches!(n.kind, NodeKind::UnquotedRegion { spread: true, .. }) {
                spread = true;
            }
            quill_ir::TraversalAction::Continue
        });
        assert!(spread);
    }

    #[test]
    fn meta_identifier() {
        let node = parse("@tag");
        assert!(matches!(
            &node.kind,
            NodeKind::MetaIdentifier { name } if &**name == "tag"
        ));
    }

    #[test]
    fn lone_at_is_an_error() {
        let node = parse("@");
        assert!(node.base.err.is_some());
    }
}
