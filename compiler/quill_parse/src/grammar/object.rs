//! Object-like literals: objects, records, lists, tuples, dictionaries,
//! and their pattern counterparts.

use crate::chars::is_closing_delim;
use crate::errors;
use crate::Parser;
use quill_diagnostic::{ParsingError, ParsingErrorKind};
use quill_ir::{Node, NodeKind, Span, Token, TokenKind};

const UNTERMINATED_OBJ_MISSING_CLOSING_BRACE: &str =
    "unterminated object literal, missing closing brace '}'";
const UNTERMINATED_REC_MISSING_CLOSING_BRACE: &str =
    "unterminated record literal, missing closing brace '}'";
const UNTERMINATED_OBJ_PATT_MISSING_CLOSING_BRACE: &str =
    "unterminated object pattern literal, missing closing brace '}'";
const UNTERMINATED_LIST_LIT_MISSING_CLOSING_BRACKET: &str =
    "unterminated list literal, missing closing bracket ']'";
const UNTERMINATED_LIST_PATT_MISSING_CLOSING_BRACKET: &str =
    "unterminated list pattern literal, missing closing bracket ']'";
const UNTERMINATED_DICT_MISSING_CLOSING_BRACE: &str =
    "unterminated dictionary literal, missing closing brace '}'";
const INVALID_DICT_KEY_ONLY_SIMPLE_VALUE_LITS: &str =
    "invalid key for dictionary literal, only simple value literals are allowed";
const INVALID_DICT_ENTRY_MISSING_COLON_AFTER_KEY: &str =
    "invalid dictionary entry: missing colon ':' after key";
const ONLY_IDENTS_AND_STRINGS_VALID_OBJ_KEYS: &str =
    "only identifiers and strings are valid object keys";
const ONLY_KEYS_CAN_HAVE_A_TYPE_ANNOT: &str =
    "only object keys can have a type annotation";
const METAPROP_KEY_SHOULD_BE_FOLLOWED_BY_A_BLOCK: &str =
    "a meta property key should be followed by a block";
const SPREAD_SHOULD_BE_FOLLOWED_BY_EXTRACTION_EXPR: &str =
    "a spread in an object literal should be an extraction expression, example: {...obj.{a, b}}";
const INVALID_OBJ_ENTRY_SEPARATION: &str =
    "invalid object/record entry: entries should be separated by a comma, newline or comment";

/// Maximum object key length, in bytes.
const MAX_OBJECT_KEY_BYTE_LEN: usize = crate::MAX_OBJECT_KEY_BYTE_LEN;

/// Is the rune at `i` a valid end for an object entry (`\n`, `,`, `}` or a
/// comment start)?
fn is_valid_entry_end(p: &Parser) -> bool {
    match p.cur() {
        Some('\n' | ',' | '}') | None => true,
        Some('#') => p.peek(1).is_some_and(crate::chars::is_comment_first_space),
        _ => false,
    }
}

impl Parser {
    /// `{…}` object or `#{…}` record literal; the cursor is on `{` or `#`.
    pub(crate) fn parse_object_or_record_literal(&mut self, is_record: bool) -> Node {
        self.check_cancellation();

        let start = self.pos();
        if is_record {
            self.push_token(TokenKind::OpeningRecordBracket, Span::new(start, start + 2));
            self.i += 2;
        } else {
            self.push_token(TokenKind::OpeningCurlyBracket, Span::new(start, start + 1));
            self.i += 1;
        }

        let mut properties: Vec<Node> = Vec::new();
        let mut element_count = 0usize;

        self.eat_space_newline_comma_comment();

        while !self.eof() && !self.cur_is('}') && !self.cur().is_some_and(is_closing_delim) {
            // spread element
            if self.cur_is('.') && self.peek_is(1, '.') && self.peek_is(2, '.') {
                properties.push(self.parse_property_spread_element());
                self.eat_space_newline_comma_comment();
                continue;
            }

            let next_token_index = self.tokens.len();
            let (key_or_value, is_missing) = self.parse_expression_inner(false);

            if is_missing {
                #[allow(clippy::unwrap_used)] // missing-expr only reported before eof here
                let r = self.cur().unwrap();
                let span = Span::new(self.pos(), self.pos() + 1);
                self.tokens.push(Token::with_raw(
                    TokenKind::UnexpectedChar,
                    span,
                    r.to_string(),
                ));
                self.i += 1;
                properties.push(Node::with_error(
                    span,
                    NodeKind::ObjectProperty {
                        key: None,
                        type_annotation: None,
                        value: None,
                    },
                    ParsingError::unspecified(errors::fmt_unexpected_char_in(
                        r,
                        "object or record",
                    )),
                ));
                self.eat_space_newline_comma_comment();
                continue;
            }

            properties.push(self.parse_object_entry_tail(
                key_or_value,
                next_token_index,
                is_record,
                &mut element_count,
            ));
            self.eat_space_newline_comma_comment();
        }

        let mut err = None;
        if !self.cur_is('}') {
            err = Some(ParsingError::unspecified(if is_record {
                UNTERMINATED_REC_MISSING_CLOSING_BRACE
            } else {
                UNTERMINATED_OBJ_MISSING_CLOSING_BRACE
            }));
        } else {
            self.push_token(
                TokenKind::ClosingCurlyBracket,
                Span::new(self.pos(), self.pos() + 1),
            );
            self.i += 1;
        }

        let kind = if is_record {
            NodeKind::RecordLiteral { properties }
        } else {
            NodeKind::ObjectLiteral { properties }
        };
        let mut node = Node::new(self.span_from(start), kind);
        if let Some(err) = err {
            node.base.err = Some(err);
        }
        node
    }

    fn parse_property_spread_element(&mut self) -> Node {
        let spread_start = self.pos();
        self.push_token(TokenKind::ThreeDots, Span::new(spread_start, spread_start + 3));
        self.i += 3;
        self.eat_space();

        let (expr, _) = self.parse_expression_inner(false);
        let mut err = None;
        if !matches!(expr.kind, NodeKind::ExtractionExpression { .. }) {
            err = Some(ParsingError::new(
                ParsingErrorKind::ExtractionExpressionExpected,
                SPREAD_SHOULD_BE_FOLLOWED_BY_EXTRACTION_EXPR,
            ));
        }
        self.eat_space();
        if !self.eof() && !is_valid_entry_end(self) && err.is_none() {
            err = Some(ParsingError::unspecified(INVALID_OBJ_ENTRY_SEPARATION));
        }

        let mut node = Node::new(
            Span::new(spread_start, expr.span().end),
            NodeKind::PropertySpreadElement {
                expr: Box::new(expr),
            },
        );
        if let Some(err) = err {
            node.base.err = Some(err);
        }
        node
    }

    /// The part of an object entry after its first expression: decide
    /// whether it is a key, parse an optional type annotation, `:` and
    /// the value, or keep it as a value-only element.
    fn parse_object_entry_tail(
        &mut self,
        key_or_value: Node,
        next_token_index: usize,
        is_record: bool,
        element_count: &mut usize,
    ) -> Node {
        let prop_start = key_or_value.span().start;
        let mut err: Option<ParsingError> = None;

        // parenthesized expressions are always value-only elements
        let parenthesized_first = self
            .tokens
            .get(next_token_index)
            .is_some_and(|t| t.kind == TokenKind::OpeningParenthesis);

        let (mut key, key_name): (Option<Node>, Option<String>) = if parenthesized_first {
            (None, None)
        } else {
            match &key_or_value.kind {
                NodeKind::IdentifierLiteral { name } => {
                    (Some(key_or_value.clone()), Some(name.to_string()))
                }
                NodeKind::QuotedStringLiteral { value, .. } => {
                    (Some(key_or_value.clone()), Some(value.to_string()))
                }
                NodeKind::UnquotedRegion { .. } => {
                    if self.trivia_followed_by(crate::eaters::Trivia::empty(), ':')
                        || self.trivia_followed_by(crate::eaters::Trivia::empty(), '%')
                    {
                        (Some(key_or_value.clone()), None)
                    } else {
                        (None, None)
                    }
                }
                _ => (None, None),
            }
        };
        *element_count += 1;

        if let Some(name) = &key_name {
            if name.len() > MAX_OBJECT_KEY_BYTE_LEN {
                err = Some(ParsingError::unspecified(format!(
                    "object key is too long ({} bytes)",
                    name.len()
                )));
            }
        }

        // meta property: `_name_ { … }`
        if let Some(name) = &key_name {
            if name.len() > 2 && name.starts_with('_') && name.ends_with('_') && !is_record {
                self.eat_space();
                return self.parse_object_meta_property(prop_start, key_or_value);
            }
        }

        self.eat_space();

        if self.eof() || is_valid_entry_end(self) {
            // value-only element
            let mut node = Node::new(
                Span::new(prop_start, key_or_value.span().end),
                NodeKind::ObjectProperty {
                    key: None,
                    type_annotation: None,
                    value: Some(Box::new(key_or_value)),
                },
            );
            if let Some(err) = err {
                node.base.err = Some(err);
            }
            return node;
        }

        // type annotation: `key %patt: value` (objects only)
        let mut type_annotation: Option<Node> = None;
        if self.cur_is('%') {
            if key.is_none() {
                err = Some(ParsingError::unspecified(ONLY_KEYS_CAN_HAVE_A_TYPE_ANNOT));
            } else if is_record {
                err = Some(ParsingError::unspecified(
                    "record keys cannot have type annotations",
                ));
            }
            type_annotation = Some(self.parse_percent_prefixed_pattern(false));
            self.eat_space();
        }

        if !self.cur_is(':') {
            let mut node = Node::new(
                self.span_from(prop_start),
                NodeKind::ObjectProperty {
                    key: None,
                    type_annotation: None,
                    value: Some(Box::new(key_or_value)),
                },
            );
            node.base.err = Some(err.unwrap_or_else(|| {
                ParsingError::unspecified(INVALID_OBJ_ENTRY_SEPARATION)
            }));
            return node;
        }

        self.push_token(TokenKind::Colon, Span::new(self.pos(), self.pos() + 1));
        self.i += 1;

        if key.is_none() && err.is_none() {
            err = Some(ParsingError::unspecified(ONLY_IDENTS_AND_STRINGS_VALID_OBJ_KEYS));
            key = Some(key_or_value.clone());
        }

        self.eat_space();

        if self.eof() || is_valid_entry_end(self) {
            let mut node = Node::new(
                self.span_from(prop_start),
                NodeKind::ObjectProperty {
                    key: key.map(Box::new),
                    type_annotation: type_annotation.map(Box::new),
                    value: None,
                },
            );
            node.base.err = Some(err.unwrap_or_else(|| {
                ParsingError::new(
                    ParsingErrorKind::MissingObjectPropertyValue,
                    "missing value of object property",
                )
            }));
            return node;
        }

        let (value, _) = self.parse_expression_inner(false);
        self.eat_space();
        if !self.eof() && !is_valid_entry_end(self) && err.is_none() {
            err = Some(ParsingError::unspecified(INVALID_OBJ_ENTRY_SEPARATION));
        }

        let value_end = value.span().end;
        let mut node = Node::new(
            Span::new(prop_start, value_end),
            NodeKind::ObjectProperty {
                key: key.map(Box::new),
                type_annotation: type_annotation.map(Box::new),
                value: Some(Box::new(value)),
            },
        );
        if let Some(err) = err {
            node.base.err = Some(err);
        }
        node
    }

    fn parse_object_meta_property(&mut self, prop_start: u32, key: Node) -> Node {
        if !self.cur_is('{') {
            return Node::with_error(
                self.span_from(prop_start),
                NodeKind::ObjectMetaProperty {
                    key: Box::new(key),
                    initialization: Box::new(Node::new(
                        Span::point(self.pos()),
                        NodeKind::InitializationBlock { statements: vec![] },
                    )),
                },
                ParsingError::unspecified(METAPROP_KEY_SHOULD_BE_FOLLOWED_BY_A_BLOCK),
            );
        }
        let block = self.parse_block();
        let statements = match block.kind {
            NodeKind::Block { statements } => statements,
            _ => vec![],
        };
        let initialization = Node::new(
            block.base.span,
            NodeKind::InitializationBlock { statements },
        );
        Node::new(
            Span::new(prop_start, initialization.span().end),
            NodeKind::ObjectMetaProperty {
                key: Box::new(key),
                initialization: Box::new(initialization),
            },
        )
    }

    /// `{…}` / `#{…}` pattern forms (also used for `%{…}`); the cursor is
    /// on the first rune of the opener.
    pub(crate) fn parse_object_record_pattern_literal(&mut self, is_record: bool) -> Node {
        self.check_cancellation();

        let start = self.pos();
        if is_record {
            self.push_token(TokenKind::OpeningRecordBracket, Span::new(start, start + 2));
            self.i += 2;
        } else if self.cur_is('%') {
            self.push_token(
                TokenKind::OpeningObjectPatternBracket,
                Span::new(start, start + 2),
            );
            self.i += 2;
        } else {
            self.push_token(TokenKind::OpeningCurlyBracket, Span::new(start, start + 1));
            self.i += 1;
        }

        let in_pattern_save = self.in_pattern;
        self.in_pattern = true;

        let mut properties: Vec<Node> = Vec::new();
        let mut exact = false;

        self.eat_space_newline_comma_comment();

        while !self.eof() && !self.cur_is('}') && !self.cur().is_some_and(is_closing_delim) {
            // spread: `...%patt` or `...otherprops`
            if self.cur_is('.') && self.peek_is(1, '.') && self.peek_is(2, '.') {
                let spread_start = self.pos();
                self.push_token(TokenKind::ThreeDots, Span::new(spread_start, spread_start + 3));
                self.i += 3;
                self.eat_space();
                let (expr, _) = self.parse_expression_inner(false);
                properties.push(Node::new(
                    Span::new(spread_start, expr.span().end),
                    NodeKind::PatternPropertySpreadElement {
                        expr: Box::new(expr),
                    },
                ));
                self.eat_space_newline_comma_comment();
                continue;
            }

            // `otherprops(…)`
            if self.keyword_ahead("otherprops") && {
                let mut k = self.i + "otherprops".len();
                while self.at(k).is_some_and(crate::chars::is_space_not_lf) {
                    k += 1;
                }
                self.at(k) == Some('(')
            } {
                let other_start = self.pos();
                self.i += "otherprops".len();
                self.eat_space();
                self.i += 1; // '('
                self.eat_space();
                let (pattern, _) = self.parse_expression_inner(false);
                self.eat_space();
                let mut err = None;
                if self.cur_is(')') {
                    self.i += 1;
                } else {
                    err = Some(ParsingError::unspecified(
                        "unterminated otherprops: missing closing parenthesis",
                    ));
                }
                if matches!(&pattern.kind, NodeKind::PatternIdentifierLiteral { name, .. } if &**name == "no")
                {
                    exact = true;
                }
                let mut node = Node::new(
                    self.span_from(other_start),
                    NodeKind::OtherPropsExpr {
                        pattern: Box::new(pattern),
                    },
                );
                if let Some(err) = err {
                    node.base.err = Some(err);
                }
                properties.push(node);
                self.eat_space_newline_comma_comment();
                continue;
            }

            properties.push(self.parse_object_pattern_property());
            self.eat_space_newline_comma_comment();
        }

        let mut err = None;
        if !self.cur_is('}') {
            err = Some(ParsingError::unspecified(
                UNTERMINATED_OBJ_PATT_MISSING_CLOSING_BRACE,
            ));
        } else {
            self.push_token(
                TokenKind::ClosingCurlyBracket,
                Span::new(self.pos(), self.pos() + 1),
            );
            self.i += 1;
        }

        self.in_pattern = in_pattern_save;

        let kind = if is_record {
            NodeKind::RecordPatternLiteral { properties, exact }
        } else {
            NodeKind::ObjectPatternLiteral { properties, exact }
        };
        let mut node = Node::new(self.span_from(start), kind);
        if let Some(err) = err {
            node.base.err = Some(err);
        }
        node
    }

    fn parse_object_pattern_property(&mut self) -> Node {
        let (key, is_missing) = self.parse_expression_inner(false);
        let prop_start = key.span().start;

        if is_missing {
            #[allow(clippy::unwrap_used)] // missing-expr only reported before eof here
            let r = self.cur().unwrap();
            let span = Span::new(self.pos(), self.pos() + 1);
            self.tokens.push(Token::with_raw(
                TokenKind::UnexpectedChar,
                span,
                r.to_string(),
            ));
            self.i += 1;
            return Node::with_error(
                span,
                NodeKind::ObjectPatternProperty {
                    key: None,
                    value: None,
                    optional: false,
                },
                ParsingError::unspecified(errors::fmt_unexpected_char_in(r, "object pattern")),
            );
        }

        let mut err = None;
        let valid_key = matches!(
            key.kind,
            NodeKind::PatternIdentifierLiteral { .. } | NodeKind::QuotedStringLiteral { .. }
        );
        if !valid_key {
            err = Some(ParsingError::unspecified(
                "only identifiers and strings are valid object pattern keys",
            ));
        }

        // `key?:` optional property
        let mut optional = false;
        if self.cur_is('?') {
            optional = true;
            self.push_token(
                TokenKind::QuestionMark,
                Span::new(self.pos(), self.pos() + 1),
            );
            self.i += 1;
        }

        self.eat_space();

        if !self.cur_is(':') {
            let mut node = Node::new(
                self.span_from(prop_start),
                NodeKind::ObjectPatternProperty {
                    key: None,
                    value: Some(Box::new(key)),
                    optional,
                },
            );
            node.base.err = Some(err.unwrap_or_else(|| {
                ParsingError::new(
                    ParsingErrorKind::MissingObjectPatternProperty,
                    "missing ':' after object pattern key",
                )
            }));
            return node;
        }
        self.push_token(TokenKind::Colon, Span::new(self.pos(), self.pos() + 1));
        self.i += 1;
        self.eat_space();

        if self.eof() || is_valid_entry_end(self) {
            return Node::with_error(
                self.span_from(prop_start),
                NodeKind::ObjectPatternProperty {
                    key: Some(Box::new(key)),
                    value: None,
                    optional,
                },
                err.unwrap_or_else(|| {
                    ParsingError::new(
                        ParsingErrorKind::MissingObjectPatternProperty,
                        "missing value of object pattern property",
                    )
                }),
            );
        }

        let (value, _) = self.parse_expression_inner(false);
        let mut node = Node::new(
            Span::new(prop_start, value.span().end),
            NodeKind::ObjectPatternProperty {
                key: Some(Box::new(key)),
                value: Some(Box::new(value)),
                optional,
            },
        );
        if let Some(err) = err {
            node.base.err = Some(err);
        }
        node
    }

    /// `[…]` list or `#[…]` tuple literal.
    pub(crate) fn parse_list_or_tuple_literal(&mut self, is_tuple: bool) -> Node {
        self.check_cancellation();

        let start = self.pos();
        if is_tuple {
            self.push_token(TokenKind::OpeningTupleBracket, Span::new(start, start + 2));
            self.i += 2;
        } else {
            self.push_token(TokenKind::OpeningBracket, Span::new(start, start + 1));
            self.i += 1;
        }

        let mut elements = Vec::new();
        self.eat_space_newline_comma_comment();

        while !self.eof() && !self.cur_is(']') {
            if self.cur_is('.') && self.peek_is(1, '.') && self.peek_is(2, '.') {
                let spread_start = self.pos();
                self.push_token(TokenKind::ThreeDots, Span::new(spread_start, spread_start + 3));
                self.i += 3;
                self.eat_space();
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
                    #[allow(clippy::unwrap_used)] // missing-expr only reported before eof
                    let r = self.cur().unwrap();
                    let span = Span::new(self.pos(), self.pos() + 1);
                    self.tokens.push(Token::with_raw(
                        TokenKind::UnexpectedChar,
                        span,
                        r.to_string(),
                    ));
                    self.i += 1;
                    elements.push(Node::with_error(
                        span,
                        NodeKind::UnknownNode,
                        ParsingError::unspecified(errors::fmt_unexpected_char_in(
                            r,
                            "list or tuple literal",
                        )),
                    ));
                } else {
                    elements.push(element);
                }
            }
            self.eat_space_newline_comma_comment();
        }

        let mut err = None;
        if !self.cur_is(']') {
            err = Some(ParsingError::unspecified(
                UNTERMINATED_LIST_LIT_MISSING_CLOSING_BRACKET,
            ));
        } else {
            self.push_token(
                TokenKind::ClosingBracket,
                Span::new(self.pos(), self.pos() + 1),
            );
            self.i += 1;
        }

        let kind = if is_tuple {
            NodeKind::TupleLiteral { elements }
        } else {
            NodeKind::ListLiteral { elements }
        };
        let mut node = Node::new(self.span_from(start), kind);
        if let Some(err) = err {
            node.base.err = Some(err);
        }
        node
    }

    /// `[…]` / `#[…]` pattern forms; a general element pattern may follow
    /// the empty bracket pair: `[]%int`.
    pub(crate) fn parse_list_tuple_pattern_literal(&mut self, is_tuple: bool) -> Node {
        self.check_cancellation();

        let start = self.pos();
        if is_tuple {
            self.push_token(TokenKind::OpeningTupleBracket, Span::new(start, start + 2));
            self.i += 2;
        } else if self.cur_is('%') {
            self.push_token(
                TokenKind::OpeningListPatternBracket,
                Span::new(start, start + 2),
            );
            self.i += 2;
        } else {
            self.push_token(TokenKind::OpeningBracket, Span::new(start, start + 1));
            self.i += 1;
        }

        let in_pattern_save = self.in_pattern;
        self.in_pattern = true;

        let mut elements = Vec::new();
        self.eat_space_newline_comma_comment();

        while !self.eof() && !self.cur_is(']') {
            let (element, is_missing) = self.parse_expression_inner(false);
            if is_missing {
                break;
            }
            elements.push(element);
            self.eat_space_newline_comma_comment();
        }

        let mut err = None;
        if !self.cur_is(']') {
            err = Some(ParsingError::unspecified(
                UNTERMINATED_LIST_PATT_MISSING_CLOSING_BRACKET,
            ));
        } else {
            self.push_token(
                TokenKind::ClosingBracket,
                Span::new(self.pos(), self.pos() + 1),
            );
            self.i += 1;
        }

        // general element: `[]%int`
        let mut general_element = None;
        if elements.is_empty()
            && err.is_none()
            && self
                .cur()
                .is_some_and(|r| r == '%' || crate::chars::is_ident_first_char(r))
        {
            let (element, _) = self.parse_expression_inner(false);
            general_element = Some(Box::new(element));
        }

        self.in_pattern = in_pattern_save;

        let kind = if is_tuple {
            NodeKind::TuplePatternLiteral {
                elements,
                general_element,
            }
        } else {
            NodeKind::ListPatternLiteral {
                elements,
                general_element,
            }
        };
        let mut node = Node::new(self.span_from(start), kind);
        if let Some(err) = err {
            node.base.err = Some(err);
        }
        node
    }

    /// `:{ key: value, … }` dictionary literal; the cursor is on `:`.
    pub(crate) fn parse_dictionary_literal(&mut self) -> Node {
        self.check_cancellation();

        let start = self.pos();
        self.push_token(TokenKind::OpeningDictionaryBracket, Span::new(start, start + 2));
        self.i += 2;

        let mut entries = Vec::new();
        self.eat_space_newline_comma_comment();

        while !self.eof() && !self.cur_is('}') {
            let (key, is_missing) = self.parse_expression_inner(false);
            if is_missing {
                #[allow(clippy::unwrap_used)] // missing-expr only reported before eof
                let r = self.cur().unwrap();
                let span = Span::new(self.pos(), self.pos() + 1);
                self.tokens.push(Token::with_raw(
                    TokenKind::UnexpectedChar,
                    span,
                    r.to_string(),
                ));
                self.i += 1;
                entries.push(Node::with_error(
                    span,
                    NodeKind::UnknownNode,
                    ParsingError::unspecified(errors::fmt_unexpected_char_in(r, "dictionary")),
                ));
                self.eat_space_newline_comma_comment();
                continue;
            }

            let mut entry_err = None;
            if !is_simple_value_literal(&key) {
                entry_err = Some(ParsingError::unspecified(
                    INVALID_DICT_KEY_ONLY_SIMPLE_VALUE_LITS,
                ));
            }

            self.eat_space();
            let key_start = key.span().start;

            if !self.cur_is(':') {
                entries.push(Node::with_error(
                    self.span_from(key_start),
                    NodeKind::DictionaryEntry {
                        key: Box::new(key),
                        value: None,
                    },
                    entry_err.unwrap_or_else(|| {
                        ParsingError::unspecified(INVALID_DICT_ENTRY_MISSING_COLON_AFTER_KEY)
                    }),
                ));
                self.eat_space_newline_comma_comment();
                continue;
            }
            self.push_token(TokenKind::Colon, Span::new(self.pos(), self.pos() + 1));
            self.i += 1;
            self.eat_space();

            let (value, _) = self.parse_expression_inner(false);
            let mut entry = Node::new(
                Span::new(key_start, value.span().end),
                NodeKind::DictionaryEntry {
                    key: Box::new(key),
                    value: Some(Box::new(value)),
                },
            );
            if let Some(err) = entry_err {
                entry.base.err = Some(err);
            }
            entries.push(entry);
            self.eat_space_newline_comma_comment();
        }

        let mut err = None;
        if !self.cur_is('}') {
            err = Some(ParsingError::unspecified(UNTERMINATED_DICT_MISSING_CLOSING_BRACE));
        } else {
            self.push_token(
                TokenKind::ClosingCurlyBracket,
                Span::new(self.pos(), self.pos() + 1),
            );
            self.i += 1;
        }

        let mut node = Node::new(self.span_from(start), NodeKind::DictionaryLiteral { entries });
        if let Some(err) = err {
            node.base.err = Some(err);
        }
        node
    }
}

/// Simple value literals are the only valid dictionary keys.
fn is_simple_value_literal(node: &Node) -> bool {
    matches!(
        node.kind,
        NodeKind::QuotedStringLiteral { .. }
            | NodeKind::IntLiteral { .. }
            | NodeKind::FloatLiteral { .. }
            | NodeKind::BooleanLiteral { .. }
            | NodeKind::NilLiteral
            | NodeKind::RuneLiteral { .. }
            | NodeKind::AbsolutePathLiteral { .. }
            | NodeKind::RelativePathLiteral { .. }
            | NodeKind::UnquotedStringLiteral { .. }
            | NodeKind::UrlLiteral { .. }
            | NodeKind::HostLiteral { .. }
            | NodeKind::SchemeLiteral { .. }
    )
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
    fn empty_object() {
        let node = parse("{}");
        assert!(matches!(
            &node.kind,
            NodeKind::ObjectLiteral { properties } if properties.is_empty()
        ));
        assert!(node.base.err.is_none());
    }

    #[test]
    fn object_with_entries() {
        let node = parse("{a: 1, b: 2}");
        match &node.kind {
            NodeKind::ObjectLiteral { properties } => {
                assert_eq!(properties.len(), 2);
                assert!(matches!(
                    &properties[0].kind,
                    NodeKind::ObjectProperty { key: Some(_), value: Some(_), .. }
                ));
            }
            other => panic!("expected object, got {other:?}"),
        }
        assert!(node.base.err.is_none());
    }

    #[test]
    fn object_missing_property_value() {
        let node = parse("{a:}");
        assert!(node.error_at_any_depth());
    }

    #[test]
    fn unterminated_object() {
        let node = parse("{a: 1");
        assert!(node
            .base
            .err
            .as_ref()
            .is_some_and(|e| e.message.contains("unterminated")));
    }

    #[test]
    fn record_literal() {
        let node = parse("#{a: 1}");
        assert!(matches!(node.kind, NodeKind::RecordLiteral { .. }));
    }

    #[test]
    fn object_spread_requires_extraction() {
        let node = parse("{...$o.{a}}");
        assert!(!node.error_at_any_depth());

        let node = parse("{...$o}");
        assert!(node.error_at_any_depth());
    }

    #[test]
    fn list_and_tuple() {
        let node = parse("[1, 2, 3]");
        assert!(matches!(
            &node.kind,
            NodeKind::ListLiteral { elements } if elements.len() == 3
        ));

        let node = parse("#[1, 2]");
        assert!(matches!(
            &node.kind,
            NodeKind::TupleLiteral { elements } if elements.len() == 2
        ));

        let node = parse("[...$xs]");
        match &node.kind {
            NodeKind::ListLiteral { elements } => {
                assert!(matches!(elements[0].kind, NodeKind::ElementSpreadElement { .. }));
            }
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn dictionary() {
        let node = parse(":{\"a\": 1, ./b: 2}");
        match &node.kind {
            NodeKind::DictionaryLiteral { entries } => assert_eq!(entries.len(), 2),
            other => panic!("expected dictionary, got {other:?}"),
        }
        assert!(!node.error_at_any_depth());
    }

    #[test]
    fn dictionary_key_must_be_simple() {
        let node = parse(":{$x: 1}");
        assert!(node.error_at_any_depth());
    }

    #[test]
    fn object_pattern() {
        let mut p = Parser::new("{a: int, b?: str}", &ParserOptions::default());
        p.in_pattern = true;
        let node = p.parse_expression_inner(false).0;
        match &node.kind {
            NodeKind::ObjectPatternLiteral { properties, exact } => {
                assert_eq!(properties.len(), 2);
                assert!(!exact);
                assert!(matches!(
                    &properties[1].kind,
                    NodeKind::ObjectPatternProperty { optional: true, .. }
                ));
            }
            other => panic!("expected object pattern, got {other:?}"),
        }
    }

    #[test]
    fn list_pattern_general_element() {
        let mut p = Parser::new("[]int", &ParserOptions::default());
        p.in_pattern = true;
        let node = p.parse_expression_inner(false).0;
        match &node.kind {
            NodeKind::ListPatternLiteral {
                general_element, ..
            } => assert!(general_element.is_some()),
            other => panic!("expected list pattern, got {other:?}"),
        }
    }

    #[test]
    fn long_object_key_is_an_error() {
        let key = "k".repeat(65);
        let node = parse(&format!("{{{key}: 1}}"));
        assert!(node.error_at_any_depth());
    }
}
