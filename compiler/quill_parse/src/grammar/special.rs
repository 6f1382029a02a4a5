//! Special identifier-starting forms: mappings, compute expressions,
//! treedata literals, concatenations, test suites/cases, reception
//! handlers, sendval, `new` expressions and struct definitions.

use crate::chars::{is_ident_char, is_ident_first_char, is_unpaired_or_closing_delim};
use crate::errors;
use crate::Parser;
use quill_diagnostic::{ParsingError, ParsingErrorKind};
use quill_ir::{Node, NodeKind, Span, Token, TokenKind};

const UNTERMINATED_MAPPING_MISSING_BODY: &str = "unterminated mapping expression: missing body";
const UNTERMINATED_MAPPING_MISSING_CLOSING_BRACE: &str =
    "unterminated mapping expression: missing closing brace '}'";
const MAPPING_ENTRY_MISSING_ARROW: &str =
    "invalid mapping entry: the key should be followed by '=>' and a value";
const UNTERMINATED_TREEDATA_MISSING_BRACE: &str =
    "unterminated treedata literal: missing closing brace '}'";
const UNTERMINATED_TESTSUITE_MISSING_MODULE: &str =
    "unterminated testsuite expression: missing module block";
const UNTERMINATED_TESTCASE_MISSING_MODULE: &str =
    "unterminated testcase expression: missing module block";
const RECEPTION_HANDLER_MISSING_RECEIVED: &str =
    "invalid reception handler: 'on' should be followed by 'received'";
const SENDVAL_MISSING_TO: &str =
    "invalid sendval expression: missing 'to' keyword after the value";
const UNTERMINATED_STRUCT_MISSING_BODY: &str =
    "unterminated struct definition: missing body";
const NEW_EXPR_MISSING_TYPE: &str = "invalid new expression: missing type after 'new'";

impl Parser {
    /// `Mapping { key => value … }`.
    pub(crate) fn parse_mapping_expression(&mut self, keyword: Node) -> Node {
        let start = keyword.span().start;
        self.push_token(TokenKind::Mapping, keyword.span());
        self.eat_space();

        if !self.cur_is('{') {
            return Node::with_error(
                self.span_from(start),
                NodeKind::MappingExpression { entries: vec![] },
                ParsingError::new(
                    ParsingErrorKind::MissingBlock,
                    UNTERMINATED_MAPPING_MISSING_BODY,
                ),
            );
        }
        self.push_token(
            TokenKind::OpeningCurlyBracket,
            Span::new(self.pos(), self.pos() + 1),
        );
        self.i += 1;
        self.eat_space_newline_comma_comment();

        let mut entries = Vec::new();
        while !self.eof() && !self.cur_is('}') {
            entries.push(self.parse_mapping_entry());
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
                UNTERMINATED_MAPPING_MISSING_CLOSING_BRACE,
            ));
        }

        let mut node = Node::new(
            self.span_from(start),
            NodeKind::MappingExpression { entries },
        );
        if let Some(err) = err {
            node.base.err = Some(err);
        }
        node
    }

    /// `key => value` (static) or `%patt var => value` (dynamic).
    fn parse_mapping_entry(&mut self) -> Node {
        let entry_start = self.pos();

        let key_is_pattern = self.cur_is('%');
        let (key, is_missing) = self.parse_expression_inner(false);
        if is_missing {
            #[allow(clippy::unwrap_used)] // missing-expr only before eof
            let r = self.cur().unwrap();
            self.i += 1;
            self.tokens.push(Token::with_raw(
                TokenKind::UnexpectedChar,
                Span::new(self.pos() - 1, self.pos()),
                r.to_string(),
            ));
            return Node::with_error(
                Span::new(self.pos() - 1, self.pos()),
                NodeKind::UnknownNode,
                ParsingError::unspecified(errors::fmt_unexpected_char_in(
                    r,
                    "mapping expression",
                )),
            );
        }
        self.eat_space();

        // key variable of a dynamic entry
        let mut key_var = None;
        let mut group_matching_variable = None;
        if self.cur().is_some_and(is_ident_first_char) && !self.keyword_ahead("defaultcase") {
            let (variable, _) = self.parse_expression_inner(false);
            if key_is_pattern {
                group_matching_variable = Some(Box::new(variable));
            } else {
                key_var = Some(Box::new(variable));
            }
            self.eat_space();
        }

        let dynamic = key_is_pattern || key_var.is_some() || group_matching_variable.is_some();

        if !(self.cur_is('=') && self.peek_is(1, '>')) {
            let kind = if dynamic {
                NodeKind::DynamicMappingEntry {
                    key: Some(Box::new(key)),
                    key_var,
                    group_matching_variable,
                    value: None,
                }
            } else {
                NodeKind::StaticMappingEntry {
                    key: Some(Box::new(key)),
                    value: None,
                }
            };
            return Node::with_error(
                self.span_from(entry_start),
                kind,
                ParsingError::unspecified(MAPPING_ENTRY_MISSING_ARROW),
            );
        }
        self.push_token(TokenKind::Arrow, Span::new(self.pos(), self.pos() + 2));
        self.i += 2;
        self.eat_space();

        let (value, _) = self.parse_expression_inner(false);
        let kind = if dynamic {
            NodeKind::DynamicMappingEntry {
                key: Some(Box::new(key)),
                key_var,
                group_matching_variable,
                value: Some(Box::new(value)),
            }
        } else {
            NodeKind::StaticMappingEntry {
                key: Some(Box::new(key)),
                value: Some(Box::new(value)),
            }
        };
        Node::new(self.span_from(entry_start), kind)
    }

    /// `comp <arg>`.
    pub(crate) fn parse_compute_expression(&mut self, keyword: Node) -> Node {
        let start = keyword.span().start;
        self.push_token(TokenKind::Comp, keyword.span());
        self.eat_space();

        let (arg, _) = self.parse_expression_inner(false);
        Node::new(
            Span::new(start, arg.span().end),
            NodeKind::ComputeExpression {
                arg: Some(Box::new(arg)),
            },
        )
    }

    /// `treedata <root> { entries… }`; entries may have `{ children }`
    /// and `key: value` pairs.
    pub(crate) fn parse_treedata_literal(&mut self, keyword: Node) -> Node {
        let start = keyword.span().start;
        self.push_token(TokenKind::Treedata, keyword.span());
        self.eat_space();

        let mut root = None;
        if !self.cur_is('{') && !self.eof() {
            let (value, _) = self.parse_expression_inner(false);
            root = Some(Box::new(value));
            self.eat_space();
        }

        let mut children = Vec::new();
        let mut err = None;
        if self.cur_is('{') {
            self.push_token(
                TokenKind::OpeningCurlyBracket,
                Span::new(self.pos(), self.pos() + 1),
            );
            self.i += 1;
            self.eat_space_newline_comma_comment();

            while !self.eof() && !self.cur_is('}') {
                let (entry, cont) = self.parse_treedata_entry();
                children.push(entry);
                if !cont {
                    break;
                }
                self.eat_space_newline_comma_comment();
            }

            if self.cur_is('}') {
                self.push_token(
                    TokenKind::ClosingCurlyBracket,
                    Span::new(self.pos(), self.pos() + 1),
                );
                self.i += 1;
            } else {
                err = Some(ParsingError::unspecified(UNTERMINATED_TREEDATA_MISSING_BRACE));
            }
        }

        let mut node = Node::new(
            self.span_from(start),
            NodeKind::TreedataLiteral { root, children },
        );
        if let Some(err) = err {
            node.base.err = Some(err);
        }
        node
    }

    fn parse_treedata_entry(&mut self) -> (Node, bool) {
        let entry_start = self.pos();
        let (value, is_missing) = self.parse_expression_inner(false);
        if is_missing {
            #[allow(clippy::unwrap_used)] // missing-expr only before eof
            let r = self.cur().unwrap();
            self.i += 1;
            return (
                Node::with_error(
                    Span::new(self.pos() - 1, self.pos()),
                    NodeKind::UnknownNode,
                    ParsingError::unspecified(errors::fmt_unexpected_char_in(
                        r,
                        "treedata literal",
                    )),
                ),
                true,
            );
        }
        self.eat_space();

        // `key: value` pair entry
        if self.cur_is(':') && !self.peek_is(1, ':') {
            self.push_token(TokenKind::Colon, Span::new(self.pos(), self.pos() + 1));
            self.i += 1;
            self.eat_space();
            let (pair_value, _) = self.parse_expression_inner(false);
            let pair = Node::new(
                self.span_from(entry_start),
                NodeKind::TreedataPair {
                    key: Box::new(value),
                    value: Some(Box::new(pair_value)),
                },
            );
            return (
                Node::new(
                    pair.span(),
                    NodeKind::TreedataEntry {
                        value: Some(Box::new(pair)),
                        children: vec![],
                    },
                ),
                true,
            );
        }

        // children
        let mut children = Vec::new();
        let mut err = None;
        if self.cur_is('{') {
            self.push_token(
                TokenKind::OpeningCurlyBracket,
                Span::new(self.pos(), self.pos() + 1),
            );
            self.i += 1;
            self.eat_space_newline_comma_comment();
            while !self.eof() && !self.cur_is('}') {
                let (entry, cont) = self.parse_treedata_entry();
                children.push(entry);
                if !cont {
                    break;
                }
                self.eat_space_newline_comma_comment();
            }
            if self.cur_is('}') {
                self.push_token(
                    TokenKind::ClosingCurlyBracket,
                    Span::new(self.pos(), self.pos() + 1),
                );
                self.i += 1;
            } else {
                err = Some(ParsingError::unspecified(UNTERMINATED_TREEDATA_MISSING_BRACE));
            }
        }

        let mut node = Node::new(
            self.span_from(entry_start),
            NodeKind::TreedataEntry {
                value: Some(Box::new(value)),
                children,
            },
        );
        if let Some(err) = err {
            node.base.err = Some(err);
        }
        (node, true)
    }

    /// `concat elem elem …`; inside parentheses the elements may span
    /// several lines.
    pub(crate) fn parse_concatenation_expression(
        &mut self,
        keyword: Node,
        preceded_by_opening_paren: bool,
    ) -> Node {
        let start = keyword.span().start;
        self.push_token(TokenKind::Concat, keyword.span());

        let mut elements = Vec::new();
        loop {
            if preceded_by_opening_paren {
                self.eat_space_newline_comment();
            } else {
                self.eat_space();
            }

            let Some(r) = self.cur() else { break };
            if r == '\n' || (is_unpaired_or_closing_delim(r) && r != ':') {
                break;
            }

            if r == '.' && self.peek_is(1, '.') && self.peek_is(2, '.') {
                let spread_start = self.pos();
                self.push_token(TokenKind::ThreeDots, Span::new(spread_start, spread_start + 3));
                self.i += 3;
                let (expr, _) = self.parse_expression_inner(false);
                elements.push(Node::new(
                    Span::new(spread_start, expr.span().end),
                    NodeKind::ElementSpreadElement {
                        expr: Box::new(expr),
                    },
                ));
            } else {
                let (element, is_missing) = self.parse_expression_inner(false);
                if is_missing {
                    break;
                }
                elements.push(element);
            }
        }

        let mut node = Node::new(
            self.span_from(start),
            NodeKind::ConcatenationExpression { elements },
        );
        if elements_is_empty(&node) {
            node.base.err = Some(ParsingError::unspecified(
                "a concatenation expression needs at least one element",
            ));
        }
        node
    }

    /// `testsuite [meta] { module }`.
    pub(crate) fn parse_test_suite_expression(&mut self, keyword: Node, is_statement: bool) -> Node {
        let start = keyword.span().start;
        self.push_token(TokenKind::TestSuite, keyword.span());
        self.eat_space();

        let mut meta = None;
        if !self.cur_is('{') && !self.eof() && !self.cur_is('\n') {
            let (meta_value, _) = self.parse_expression_inner(false);
            meta = Some(Box::new(meta_value));
            self.eat_space();
        }

        if !self.cur_is('{') {
            return Node::with_error(
                self.span_from(start),
                NodeKind::TestSuiteExpression {
                    meta,
                    module: None,
                    is_statement,
                },
                ParsingError::new(
                    ParsingErrorKind::MissingBlock,
                    UNTERMINATED_TESTSUITE_MISSING_MODULE,
                ),
            );
        }

        let module = self.parse_embedded_module();
        Node::new(
            self.span_from(start),
            NodeKind::TestSuiteExpression {
                meta,
                module: Some(Box::new(module)),
                is_statement,
            },
        )
    }

    /// `testcase [meta] { module }`.
    pub(crate) fn parse_test_case_expression(&mut self, keyword: Node, is_statement: bool) -> Node {
        let start = keyword.span().start;
        self.push_token(TokenKind::TestCase, keyword.span());
        self.eat_space();

        let mut meta = None;
        if !self.cur_is('{') && !self.eof() && !self.cur_is('\n') {
            let (meta_value, _) = self.parse_expression_inner(false);
            meta = Some(Box::new(meta_value));
            self.eat_space();
        }

        if !self.cur_is('{') {
            return Node::with_error(
                self.span_from(start),
                NodeKind::TestCaseExpression {
                    meta,
                    module: None,
                    is_statement,
                },
                ParsingError::new(
                    ParsingErrorKind::MissingBlock,
                    UNTERMINATED_TESTCASE_MISSING_MODULE,
                ),
            );
        }

        let module = self.parse_embedded_module();
        Node::new(
            self.span_from(start),
            NodeKind::TestCaseExpression {
                meta,
                module: Some(Box::new(module)),
                is_statement,
            },
        )
    }

    /// `on received %pattern <handler>`.
    pub(crate) fn parse_reception_handler_expression(&mut self, keyword: Node) -> Node {
        let start = keyword.span().start;
        self.push_token(TokenKind::On, keyword.span());
        self.eat_space();

        if !self.keyword_ahead("received") {
            return Node::with_error(
                self.span_from(start),
                NodeKind::ReceptionHandlerExpression {
                    pattern: None,
                    handler: None,
                },
                ParsingError::unspecified(RECEPTION_HANDLER_MISSING_RECEIVED),
            );
        }
        self.push_token(TokenKind::Received, Span::new(self.pos(), self.pos() + 8));
        self.i += 8;
        self.eat_space();

        let in_pattern_save = self.in_pattern;
        self.in_pattern = true;
        let (pattern, _) = self.parse_expression_inner(false);
        self.in_pattern = in_pattern_save;
        self.eat_space();

        let (handler, _) = self.parse_expression_inner(false);
        Node::new(
            self.span_from(start),
            NodeKind::ReceptionHandlerExpression {
                pattern: Some(Box::new(pattern)),
                handler: Some(Box::new(handler)),
            },
        )
    }

    /// `sendval <value> to <receiver>`.
    pub(crate) fn parse_send_value_expression(&mut self, keyword: Node) -> Node {
        let start = keyword.span().start;
        self.push_token(TokenKind::SendVal, keyword.span());
        self.eat_space();

        let (value, _) = self.parse_expression_inner(false);
        self.eat_space();

        if !self.keyword_ahead("to") {
            return Node::with_error(
                self.span_from(start),
                NodeKind::SendValueExpression {
                    value: Some(Box::new(value)),
                    receiver: None,
                },
                ParsingError::unspecified(SENDVAL_MISSING_TO),
            );
        }
        self.push_token(TokenKind::To, Span::new(self.pos(), self.pos() + 2));
        self.i += 2;
        self.eat_space();

        let (receiver, _) = self.parse_expression_inner(false);
        Node::new(
            self.span_from(start),
            NodeKind::SendValueExpression {
                value: Some(Box::new(value)),
                receiver: Some(Box::new(receiver)),
            },
        )
    }

    /// `new Type [{ field: value, … }]`.
    pub(crate) fn parse_new_expression(&mut self, keyword: Node) -> Node {
        let start = keyword.span().start;
        self.push_token(TokenKind::New, keyword.span());
        self.eat_space();

        if self.eof() || self.cur_is('\n') {
            return Node::with_error(
                self.span_from(start),
                NodeKind::NewExpression {
                    type_node: None,
                    initialization: None,
                },
                ParsingError::unspecified(NEW_EXPR_MISSING_TYPE),
            );
        }

        let in_pattern_save = self.in_pattern;
        self.in_pattern = true;
        let (type_node, _) = self.parse_expression_inner(false);
        self.in_pattern = in_pattern_save;
        self.eat_space();

        let mut initialization = None;
        if self.cur_is('{') {
            initialization = Some(Box::new(self.parse_struct_initialization_literal()));
        }

        Node::new(
            self.span_from(start),
            NodeKind::NewExpression {
                type_node: Some(Box::new(type_node)),
                initialization,
            },
        )
    }

    fn parse_struct_initialization_literal(&mut self) -> Node {
        let start = self.pos();
        self.push_token(TokenKind::OpeningCurlyBracket, Span::new(start, start + 1));
        self.i += 1;
        self.eat_space_newline_comma_comment();

        let mut fields = Vec::new();
        while !self.eof() && !self.cur_is('}') {
            let field_start = self.pos();
            if !self.cur().is_some_and(is_ident_first_char) {
                #[allow(clippy::unwrap_used)] // non-eof checked by loop condition
                let r = self.cur().unwrap();
                self.i += 1;
                fields.push(Node::with_error(
                    Span::new(field_start, self.pos()),
                    NodeKind::UnknownNode,
                    ParsingError::unspecified(errors::fmt_unexpected_char_in(
                        r,
                        "struct initialization literal",
                    )),
                ));
                self.eat_space_newline_comma_comment();
                continue;
            }
            while self.cur().is_some_and(is_ident_char) {
                self.i += 1;
            }
            let name = Node::new(
                self.span_from(field_start),
                NodeKind::IdentifierLiteral {
                    name: self.slice_str(field_start, self.pos()).into(),
                },
            );
            self.eat_space();

            let mut value = None;
            let mut field_err = None;
            if self.cur_is(':') {
                self.i += 1;
                self.eat_space();
                let (field_value, _) = self.parse_expression_inner(false);
                value = Some(Box::new(field_value));
            } else {
                field_err = Some(ParsingError::unspecified(
                    "invalid struct field initialization: missing ':' after the field name",
                ));
            }

            let mut field = Node::new(
                self.span_from(field_start),
                NodeKind::StructFieldInitialization {
                    name: Box::new(name),
                    value,
                },
            );
            if let Some(err) = field_err {
                field.base.err = Some(err);
            }
            fields.push(field);
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
                "unterminated struct initialization literal: missing closing brace '}'",
            ));
        }

        let mut node = Node::new(
            self.span_from(start),
            NodeKind::StructInitializationLiteral { fields },
        );
        if let Some(err) = err {
            node.base.err = Some(err);
        }
        node
    }

    /// `struct Name { field type … fn method(){} }`.
    pub(crate) fn parse_struct_definition(&mut self, keyword: Node) -> Node {
        let start = keyword.span().start;
        self.push_token(TokenKind::Struct, keyword.span());
        self.eat_space();

        let mut name = None;
        if self.cur().is_some_and(is_ident_first_char) {
            let name_start = self.pos();
            while self.cur().is_some_and(is_ident_char) {
                self.i += 1;
            }
            name = Some(Box::new(Node::new(
                self.span_from(name_start),
                NodeKind::IdentifierLiteral {
                    name: self.slice_str(name_start, self.pos()).into(),
                },
            )));
            self.eat_space();
        }

        if !self.cur_is('{') {
            return Node::with_error(
                self.span_from(start),
                NodeKind::StructDefinition { name, body: None },
                ParsingError::new(
                    ParsingErrorKind::UnterminatedStructDefinition,
                    UNTERMINATED_STRUCT_MISSING_BODY,
                ),
            );
        }

        let body_start = self.pos();
        self.push_token(
            TokenKind::OpeningCurlyBracket,
            Span::new(self.pos(), self.pos() + 1),
        );
        self.i += 1;
        self.eat_space_newline_semicolon_comment();

        let mut definitions = Vec::new();
        while !self.eof() && !self.cur_is('}') {
            if self.keyword_ahead("fn") {
                let fn_start = self.pos();
                self.i += 2;
                definitions.push(self.parse_function(fn_start));
            } else if self.cur().is_some_and(is_ident_first_char) {
                let field_start = self.pos();
                while self.cur().is_some_and(is_ident_char) {
                    self.i += 1;
                }
                let field_name = Node::new(
                    self.span_from(field_start),
                    NodeKind::IdentifierLiteral {
                        name: self.slice_str(field_start, self.pos()).into(),
                    },
                );
                self.eat_space();

                let in_pattern_save = self.in_pattern;
                self.in_pattern = true;
                let (type_annotation, _) = self.parse_expression_inner(false);
                self.in_pattern = in_pattern_save;

                definitions.push(Node::new(
                    self.span_from(field_start),
                    NodeKind::StructFieldDefinition {
                        name: Box::new(field_name),
                        type_annotation: Box::new(type_annotation),
                    },
                ));
            } else {
                #[allow(clippy::unwrap_used)] // non-eof checked by loop condition
                let r = self.cur().unwrap();
                self.i += 1;
                definitions.push(Node::with_error(
                    Span::new(self.pos() - 1, self.pos()),
                    NodeKind::UnknownNode,
                    ParsingError::unspecified(errors::fmt_unexpected_char_in(
                        r,
                        "struct body",
                    )),
                ));
            }
            self.eat_space_newline_semicolon_comment();
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
                ParsingErrorKind::UnterminatedStructDefinition,
                "unterminated struct body: missing closing brace '}'",
            ));
        }

        let body = Node::new(
            self.span_from(body_start),
            NodeKind::StructBody { definitions },
        );

        let mut node = Node::new(
            self.span_from(start),
            NodeKind::StructDefinition {
                name,
                body: Some(Box::new(body)),
            },
        );
        if let Some(err) = err {
            node.base.err = Some(err);
        }
        node
    }
}

fn elements_is_empty(node: &Node) -> bool {
    matches!(&node.kind, NodeKind::ConcatenationExpression { elements } if elements.is_empty())
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
    fn mapping_with_static_and_dynamic_entries() {
        let node = parse("Mapping { 0 => 1\n %int n => n }");
        match &node.kind {
            NodeKind::MappingExpression { entries } => {
                assert_eq!(entries.len(), 2);
                assert!(matches!(entries[0].kind, NodeKind::StaticMappingEntry { .. }));
                assert!(matches!(
                    entries[1].kind,
                    NodeKind::DynamicMappingEntry {
                        group_matching_variable: Some(_),
                        ..
                    }
                ));
            }
            other => panic!("expected mapping, got {other:?}"),
        }
        assert!(!node.error_at_any_depth());
    }

    #[test]
    fn mapping_entry_missing_arrow() {
        let node = parse("Mapping { 0 }");
        assert!(node.error_at_any_depth());
    }

    #[test]
    fn compute_expression() {
        let node = parse("comp $x");
        assert!(matches!(node.kind, NodeKind::ComputeExpression { arg: Some(_) }));
    }

    #[test]
    fn treedata_literal() {
        let node = parse("treedata $root { \"a\" { \"b\" } \"k\": 1 }");
        match &node.kind {
            NodeKind::TreedataLiteral { root, children } => {
                assert!(root.is_some());
                assert_eq!(children.len(), 2);
            }
            other => panic!("expected treedata, got {other:?}"),
        }
        assert!(!node.error_at_any_depth());
    }

    #[test]
    fn concatenation() {
        let node = parse("concat \"a\" \"b\"");
        match &node.kind {
            NodeKind::ConcatenationExpression { elements } => assert_eq!(elements.len(), 2),
            other => panic!("expected concatenation, got {other:?}"),
        }
    }

    #[test]
    fn testsuite_and_testcase() {
        let node = parse("testsuite \"name\" { a = 1 }");
        assert!(matches!(
            node.kind,
            NodeKind::TestSuiteExpression {
                meta: Some(_),
                module: Some(_),
                is_statement: false,
            }
        ));

        let node = parse("testcase { a = 1 }");
        assert!(matches!(
            node.kind,
            NodeKind::TestCaseExpression {
                meta: None,
                module: Some(_),
                ..
            }
        ));
    }

    #[test]
    fn reception_handler() {
        let node = parse("on received %msg fn(m){ }");
        assert!(matches!(
            node.kind,
            NodeKind::ReceptionHandlerExpression {
                pattern: Some(_),
                handler: Some(_),
            }
        ));
    }

    #[test]
    fn sendval() {
        let node = parse("sendval 1 to $target");
        assert!(matches!(
            node.kind,
            NodeKind::SendValueExpression {
                value: Some(_),
                receiver: Some(_),
            }
        ));
        assert!(!node.error_at_any_depth());
    }

    #[test]
    fn sendval_missing_to() {
        let node = parse("sendval 1");
        assert!(node.error_at_any_depth());
    }

    #[test]
    fn new_expression() {
        let node = parse("new Lexer {index: 0}");
        match &node.kind {
            NodeKind::NewExpression {
                type_node,
                initialization,
            } => {
                assert!(type_node.is_some());
                assert!(initialization.is_some());
            }
            other => panic!("expected new expression, got {other:?}"),
        }
        assert!(!node.error_at_any_depth());
    }

    #[test]
    fn struct_definition() {
        let mut p = Parser::new(
            "struct Lexer { index int\n fn next(){ } }",
            &ParserOptions::default(),
        );
        let stmt = p.parse_statement();
        match &stmt.kind {
            NodeKind::StructDefinition { name, body } => {
                assert!(name.is_some());
                match body.as_deref().map(|b| &b.kind) {
                    Some(NodeKind::StructBody { definitions }) => {
                        assert_eq!(definitions.len(), 2);
                    }
                    other => panic!("expected struct body, got {other:?}"),
                }
            }
            other => panic!("expected struct definition, got {other:?}"),
        }
        assert!(!stmt.error_at_any_depth());
    }
}
