//! String literals: quoted, unquoted, multiline, and string templates.
//!
//! Quoted and multiline values are decoded with the JSON string decoder;
//! decode failures surface the decoder's message on the node.

use crate::chars::{
    count_prev_backslashes, is_ident_char, is_interpolation_allowed_char,
    is_unquoted_string_char,
};
use crate::errors;
use crate::Parser;
use quill_diagnostic::ParsingError;
use quill_ir::{shift_spans, Node, NodeKind, Span, TokenKind};

const UNTERMINATED_QUOTED_STRING_LIT: &str = "unterminated quoted string literal";
const UNTERMINATED_MULTILINE_STRING_LIT: &str = "unterminated multiline string literal";
const STRING_INTERP_SHOULD_NOT_BE_EMPTY: &str = "string interpolation should not be empty";
const STRING_INTERP_SHOULD_START_WITH_A_NAME: &str =
    "string interpolation should start with a name";
const NAME_IN_STR_INTERP_SHOULD_BE_FOLLOWED_BY_COLON_AND_EXPR: &str =
    "name in string interpolation should be followed by a colon and an expression";
const INVALID_STR_INTERP: &str = "invalid string interpolation";

/// Decode a JSON string literal (quotes included).
fn decode_json_string(raw: &str) -> Result<String, String> {
    serde_json::from_str::<String>(raw).map_err(|err| err.to_string())
}

impl Parser {
    /// Double-quoted string; the cursor is on the opening quote. A raw
    /// newline terminates the literal with an error.
    pub(crate) fn parse_quoted_string_literal(&mut self) -> Node {
        let start = self.pos();
        self.i += 1;

        while !self.eof()
            && !self.cur_is('\n')
            && (!self.cur_is('"') || count_prev_backslashes(&self.s, self.i) % 2 == 1)
        {
            self.i += 1;
        }

        let mut err = None;
        let raw;
        let mut value = String::new();

        if !self.cur_is('"') {
            raw = self.slice_str(start, self.pos());
            err = Some(ParsingError::unspecified(UNTERMINATED_QUOTED_STRING_LIT));
        } else {
            self.i += 1;
            raw = self.slice_str(start, self.pos());
            match decode_json_string(&raw) {
                Ok(decoded) => value = decoded,
                Err(json_err) => {
                    err = Some(ParsingError::unspecified(errors::fmt_invalid_string_lit_json(
                        &json_err,
                    )));
                }
            }
        }

        self.push_raw_token(TokenKind::QuotedStringLiteral, self.span_from(start));
        let mut node = Node::new(
            self.span_from(start),
            NodeKind::QuotedStringLiteral {
                value: value.into(),
                raw: raw.into(),
            },
        );
        if let Some(err) = err {
            node.base.err = Some(err);
        }
        node
    }

    /// Unquoted string: a limited char class with `\:` as the only escape.
    /// `start` may precede the cursor (dash-starting forms).
    pub(crate) fn parse_unquoted_string_literal(&mut self, start: u32) -> Node {
        self.i += 1;

        while !self.eof()
            && (self.cur().is_some_and(is_unquoted_string_char)
                || (self.cur_is('\\') && self.peek_is(1, ':')))
        {
            if self.cur_is('\\') {
                self.i += 1;
            }
            // `/>` must stay available for markup
            if self.cur_is('/') && self.peek_is(1, '>') {
                break;
            }
            self.i += 1;
        }

        let raw = self.slice_str(start, self.pos());
        let value: String = raw.chars().filter(|r| *r != '\\').collect();
        self.push_raw_token(TokenKind::UnquotedStringLiteral, self.span_from(start));

        Node::new(
            self.span_from(start),
            NodeKind::UnquotedStringLiteral {
                value: value.into(),
                raw: raw.into(),
            },
        )
    }

    /// Backtick-delimited string: a multiline literal when no `${`
    /// interpolation is present and no pattern precedes, otherwise a
    /// string template. The cursor is on the backtick.
    pub(crate) fn parse_string_template_or_multiline(&mut self, pattern: Option<Node>) -> Node {
        if pattern.is_none() && !self.lookahead_contains_interpolation() {
            return self.parse_multiline_string_literal();
        }
        self.parse_string_template_literal(pattern)
    }

    /// Does the backtick literal under the cursor contain an unescaped
    /// `${` before its closing backtick?
    fn lookahead_contains_interpolation(&self) -> bool {
        let mut i = self.i + 1;
        while i < self.len {
            match self.at(i) {
                Some('`') if count_prev_backslashes(&self.s, i) % 2 == 0 => return false,
                Some('$')
                    if self.at(i + 1) == Some('{')
                        && count_prev_backslashes(&self.s, i) % 2 == 0 =>
                {
                    return true;
                }
                _ => i += 1,
            }
        }
        false
    }

    fn parse_multiline_string_literal(&mut self) -> Node {
        let start = self.pos();
        self.i += 1;

        while !self.eof()
            && (!self.cur_is('`') || count_prev_backslashes(&self.s, self.i) % 2 == 1)
        {
            self.i += 1;
        }

        let mut err = None;
        let mut value = String::new();
        let raw;

        if self.eof() {
            raw = self.slice_str(start, self.pos());
            err = Some(ParsingError::unspecified(UNTERMINATED_MULTILINE_STRING_LIT));
        } else {
            self.i += 1;
            raw = self.slice_str(start, self.pos());

            // decode through the JSON scheme, newlines escaped
            let mut json = String::with_capacity(raw.len());
            json.push('"');
            for r in raw[1..raw.len() - 1].chars() {
                match r {
                    '\n' => json.push_str("\\n"),
                    '\r' => json.push_str("\\r"),
                    '\t' => json.push_str("\\t"),
                    '"' => json.push_str("\\\""),
                    _ => json.push(r),
                }
            }
            json.push('"');

            match decode_json_string(&json) {
                Ok(decoded) => value = decoded,
                Err(json_err) => {
                    err = Some(ParsingError::unspecified(errors::fmt_invalid_string_lit_json(
                        &json_err,
                    )));
                }
            }
        }

        self.push_raw_token(TokenKind::MultilineStringLiteral, self.span_from(start));
        let mut node = Node::new(
            self.span_from(start),
            NodeKind::MultilineStringLiteral {
                value: value.into(),
                raw: raw.into(),
            },
        );
        if let Some(err) = err {
            node.base.err = Some(err);
        }
        node
    }

    fn parse_string_template_literal(&mut self, pattern: Option<Node>) -> Node {
        let node_start = pattern.as_ref().map_or(self.pos(), |p| p.span().start);
        let typed = pattern.is_some();

        self.push_token(TokenKind::Backquote, Span::new(self.pos(), self.pos() + 1));
        self.i += 1;

        let mut slices: Vec<Node> = Vec::new();
        let mut slice_start = self.pos();
        let mut in_interpolation = false;
        let mut interpolation_start = self.pos();
        let mut err = None;

        while !self.eof()
            && (!self.cur_is('`') || count_prev_backslashes(&self.s, self.i) % 2 == 1)
        {
            if !in_interpolation
                && self.cur_is('$')
                && self.peek_is(1, '{')
                && count_prev_backslashes(&self.s, self.i) % 2 == 0
            {
                self.push_token(
                    TokenKind::StrInterpOpeningBrackets,
                    Span::new(self.pos(), self.pos() + 2),
                );
                slices.push(self.template_slice(slice_start, self.pos()));
                self.i += 2;
                in_interpolation = true;
                interpolation_start = self.pos();
            } else if in_interpolation && self.cur_is('}') {
                self.push_token(
                    TokenKind::StrInterpClosingBracket,
                    Span::new(self.pos(), self.pos() + 1),
                );
                let interpolation_end = self.pos();
                self.i += 1;
                slice_start = self.pos();
                in_interpolation = false;

                slices.push(self.parse_template_interpolation(
                    interpolation_start,
                    interpolation_end,
                    typed,
                ));
            } else {
                self.i += 1;
            }
        }

        if in_interpolation {
            let mut slice = self.template_slice(interpolation_start, self.pos());
            slice.base.err = Some(ParsingError::unspecified(errors::UNTERMINATED_STRING_INTERP));
            slices.push(slice);
        } else {
            slices.push(self.template_slice(slice_start, self.pos()));
        }

        if self.eof() {
            if !in_interpolation {
                err = Some(ParsingError::unspecified(
                    errors::UNTERMINATED_STRING_TEMPL_LIT,
                ));
            }
        } else {
            self.push_token(TokenKind::Backquote, Span::new(self.pos(), self.pos() + 1));
            self.i += 1;
        }

        let mut node = Node::new(
            self.span_from(node_start),
            NodeKind::StringTemplateLiteral {
                pattern: pattern.map(Box::new),
                slices,
            },
        );
        if let Some(err) = err {
            node.base.err = Some(err);
        }
        node
    }

    fn template_slice(&mut self, start: u32, end: u32) -> Node {
        let raw = self.slice_str(start, end);
        self.tokens.push(quill_ir::Token::with_raw(
            TokenKind::StrTemplateSlice,
            Span::new(start, end),
            raw.clone(),
        ));
        Node::new(
            Span::new(start, end),
            NodeKind::StringTemplateSlice {
                value: raw.clone().into(),
                raw: raw.into(),
            },
        )
    }

    /// One `${…}` interpolation. In typed templates the content must be
    /// `<typename>[.<method>]:` followed by an expression.
    fn parse_template_interpolation(&mut self, start: u32, end: u32, typed: bool) -> Node {
        let content: Vec<char> = self.s[start as usize..end as usize].to_vec();
        let span = Span::new(start, end);

        for r in &content {
            if !is_interpolation_allowed_char(*r) {
                return Node::with_error(
                    span,
                    NodeKind::StringTemplateInterpolation {
                        type_name: None,
                        expr: None,
                    },
                    ParsingError::unspecified(errors::STR_INTERP_LIMITED_CHARSET),
                );
            }
        }

        if content.is_empty() {
            return Node::with_error(
                span,
                NodeKind::StringTemplateInterpolation {
                    type_name: None,
                    expr: None,
                },
                ParsingError::unspecified(STRING_INTERP_SHOULD_NOT_BE_EMPTY),
            );
        }

        let mut type_name: Option<Box<str>> = None;
        let mut expr_offset = 0usize;

        if typed {
            if !is_ident_char(content[0]) {
                return Node::with_error(
                    span,
                    NodeKind::StringTemplateInterpolation {
                        type_name: None,
                        expr: None,
                    },
                    ParsingError::unspecified(STRING_INTERP_SHOULD_START_WITH_A_NAME),
                );
            }
            let mut j = 1;
            while j < content.len() && (is_ident_char(content[j]) || content[j] == '.') {
                j += 1;
            }
            if j >= content.len() || content[j] != ':' || j + 1 >= content.len() {
                return Node::with_error(
                    span,
                    NodeKind::StringTemplateInterpolation {
                        type_name: None,
                        expr: None,
                    },
                    ParsingError::unspecified(
                        NAME_IN_STR_INTERP_SHOULD_BE_FOLLOWED_BY_COLON_AND_EXPR,
                    ),
                );
            }
            let name: String = content[..j].iter().collect();
            self.tokens.push(quill_ir::Token::with_raw(
                TokenKind::StrTemplateInterpType,
                Span::new(start, start + j as u32 + 1),
                format!("{name}:"),
            ));
            type_name = Some(name.into());
            expr_offset = j + 1;
        }

        let expr_source: String = content[expr_offset..].iter().collect();
        let (mut expr, ok) = crate::parse_expression(&expr_source);
        let mut err = None;
        if ok {
            shift_spans(&mut expr, i64::from(start) + expr_offset as i64);
        } else {
            err = Some(ParsingError::unspecified(INVALID_STR_INTERP));
        }

        let mut node = Node::new(
            span,
            NodeKind::StringTemplateInterpolation {
                type_name,
                expr: ok.then(|| Box::new(expr)),
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

    fn quoted(source: &str) -> Node {
        let mut p = Parser::new(source, &ParserOptions::default());
        p.parse_quoted_string_literal()
    }

    #[test]
    fn quoted_string_decodes_escapes() {
        let node = quoted(r#""a\nb""#);
        match &node.kind {
            NodeKind::QuotedStringLiteral { value, raw } => {
                assert_eq!(&**value, "a\nb");
                assert_eq!(&**raw, r#""a\nb""#);
            }
            other => panic!("expected quoted string, got {other:?}"),
        }
        assert!(node.base.err.is_none());
    }

    #[test]
    fn lone_quote_is_unterminated() {
        let node = quoted("\"");
        assert!(node.base.err.is_some());
        assert_eq!(node.span(), Span::new(0, 1));
    }

    #[test]
    fn newline_terminates_quoted_string() {
        let node = quoted("\"ab\ncd\"");
        assert!(node
            .base
            .err
            .as_ref()
            .is_some_and(|e| e.message.contains("unterminated")));
        assert_eq!(node.span(), Span::new(0, 3));
    }

    #[test]
    fn unquoted_string_with_colon_escape() {
        let mut p = Parser::new("ab\\:cd", &ParserOptions::default());
        let node = p.parse_unquoted_string_literal(0);
        match &node.kind {
            NodeKind::UnquotedStringLiteral { value, .. } => assert_eq!(&**value, "ab:cd"),
            other => panic!("expected unquoted string, got {other:?}"),
        }
    }

    #[test]
    fn multiline_string_keeps_newlines() {
        let mut p = Parser::new("`a\nb`", &ParserOptions::default());
        let node = p.parse_string_template_or_multiline(None);
        match &node.kind {
            NodeKind::MultilineStringLiteral { value, .. } => assert_eq!(&**value, "a\nb"),
            other => panic!("expected multiline string, got {other:?}"),
        }
    }

    #[test]
    fn template_with_interpolation() {
        let mut p = Parser::new("`a${name}b`", &ParserOptions::default());
        let node = p.parse_string_template_or_multiline(None);
        match &node.kind {
            NodeKind::StringTemplateLiteral { pattern, slices } => {
                assert!(pattern.is_none());
                assert_eq!(slices.len(), 3);
                assert!(matches!(
                    slices[1].kind,
                    NodeKind::StringTemplateInterpolation { .. }
                ));
            }
            other => panic!("expected template, got {other:?}"),
        }
        assert!(node.base.err.is_none());
    }

    #[test]
    fn interpolation_spans_are_shifted_into_outer_source() {
        let mut p = Parser::new("`a${name}b`", &ParserOptions::default());
        let node = p.parse_string_template_or_multiline(None);
        let NodeKind::StringTemplateLiteral { slices, .. } = &node.kind else {
            panic!("expected template");
        };
        let NodeKind::StringTemplateInterpolation { expr: Some(expr), .. } = &slices[1].kind
        else {
            panic!("expected interpolation with expr");
        };
        assert_eq!(expr.span(), Span::new(4, 8));
    }

    #[test]
    fn unterminated_template() {
        let mut p = Parser::new("`a${x}", &ParserOptions::default());
        let node = p.parse_string_template_or_multiline(None);
        assert!(node.base.err.is_some());
    }
}
