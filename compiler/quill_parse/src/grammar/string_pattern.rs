//! Complex string patterns: `%str( elem elem … )` sequences with
//! quantifiers, named groups, parenthesized sub-pieces and unions.

use crate::chars::{is_alpha, is_dec_digit, is_delim, is_ident_char};
use crate::errors;
use crate::Parser;
use quill_diagnostic::ParsingError;
use quill_ir::{Node, NodeKind, Quantifier, Span, Token, TokenKind};

const UNTERMINATED_COMPLEX_STRING_PATT_MISSING_CLOSING_PAREN: &str =
    "unterminated complex string pattern: missing closing parenthesis ')'";
const UNTERMINATED_EXACT_OCCURRENCE_COUNT: &str =
    "unterminated pattern: unterminated exact occurrence count: missing count after '='";
const INVALID_OCCURRENCE_COUNT: &str = "invalid pattern: invalid exact occurrence count";
const INVALID_GROUP_NAME_SHOULD_NOT_END_WITH_DASH: &str =
    "invalid group name: name should not end with '-'";
const INVALID_COMPLEX_PATTERN_ELEMENT: &str = "invalid complex pattern element";
const UNTERMINATED_STRING_PATTERN_ELEMENT: &str = "unterminated string pattern element";
const UNTERMINATED_UNION_MISSING_CLOSING_PAREN: &str =
    "unterminated pattern union: missing closing parenthesis ')'";

/// Which production a sequence piece is parsed for.
#[derive(Copy, Clone, Eq, PartialEq)]
enum PieceKind {
    Root,
    Parenthesized,
    UnionCase,
}

impl Parser {
    /// `str(…)` sequence pattern. `ident` is the `str` pattern identifier
    /// (prefixed or not); the opening parenthesis was consumed.
    pub(crate) fn parse_complex_string_pattern_piece(
        &mut self,
        start: u32,
        ident: Option<Node>,
    ) -> Node {
        if let Some(ident) = &ident {
            self.push_token(TokenKind::PercentStr, ident.span());
            self.push_token(
                TokenKind::OpeningParenthesis,
                Span::new(ident.span().end, ident.span().end + 1),
            );
        }
        self.parse_piece(start, PieceKind::Root)
    }

    fn parse_piece(&mut self, start: u32, kind: PieceKind) -> Node {
        self.check_cancellation();

        if kind == PieceKind::Parenthesized {
            self.push_token(TokenKind::OpeningParenthesis, Span::new(start, start + 1));
        }

        let mut elements: Vec<Node> = Vec::new();
        let mut err = None;

        while !self.eof()
            && !self.cur_is(')')
            && (kind != PieceKind::UnionCase || !self.cur_is('|'))
        {
            self.eat_space_newline_comment();
            if self.eof()
                || self.cur_is(')')
                || (kind == PieceKind::UnionCase && self.cur_is('|'))
            {
                break;
            }

            // sub-union in element position: `| a | b`
            if self.cur_is('|') {
                let union = self.parse_string_pattern_union(self.pos(), true);
                let span = union.span();
                elements.push(Node::new(
                    span,
                    NodeKind::PatternPieceElement {
                        quantifier: Quantifier::ExactlyOne,
                        exact_count: None,
                        group_name: None,
                        expr: Box::new(union),
                    },
                ));
                break;
            }

            elements.push(self.parse_piece_element());
        }

        if kind != PieceKind::UnionCase {
            if !self.cur_is(')') {
                err = Some(ParsingError::unspecified(
                    UNTERMINATED_COMPLEX_STRING_PATT_MISSING_CLOSING_PAREN,
                ));
            } else {
                self.push_token(
                    TokenKind::ClosingParenthesis,
                    Span::new(self.pos(), self.pos() + 1),
                );
                self.i += 1;
            }
        }

        let mut node = Node::new(
            self.span_from(start),
            NodeKind::ComplexStringPatternPiece { elements },
        );
        if let Some(err) = err {
            node.base.err = Some(err);
        }
        node
    }

    /// One element: optional `name:` group, the element pattern, optional
    /// `+ * ? =N` quantifier.
    fn parse_piece_element(&mut self) -> Node {
        let element_start = self.pos();
        let mut group_name: Option<Node> = None;
        let mut elem_err: Option<ParsingError> = None;

        // group name: runs of ident chars directly followed by ':'
        if self.cur().is_some_and(is_alpha) {
            let mut j = self.i + 1;
            let mut is_group_name = false;
            while let Some(r) = self.at(j) {
                if is_ident_char(r) {
                    j += 1;
                    continue;
                }
                is_group_name = r == ':';
                break;
            }
            if is_group_name {
                self.i = j;
                let name = self.slice_str(element_start, self.pos());
                let mut node = Node::new(
                    self.span_from(element_start),
                    NodeKind::PatternGroupName {
                        name: name.clone().into(),
                    },
                );
                self.tokens.push(Token::with_raw(
                    TokenKind::PatternGroupName,
                    node.span(),
                    name.clone(),
                ));
                if name.ends_with('-') {
                    node.base.err = Some(ParsingError::unspecified(
                        INVALID_GROUP_NAME_SHOULD_NOT_END_WITH_DASH,
                    ));
                }
                group_name = Some(node);
                self.push_token(TokenKind::Colon, Span::new(self.pos(), self.pos() + 1));
                self.i += 1;
                self.eat_space();
            }
        }

        let element = self.parse_complex_string_pattern_element();
        let mut element_end = self.pos();

        let mut quantifier = Quantifier::ExactlyOne;
        let mut exact_count = None;

        match self.cur() {
            Some(modifier @ ('+' | '*' | '?')) => {
                quantifier = match modifier {
                    '+' => Quantifier::AtLeastOne,
                    '*' => Quantifier::ZeroOrMore,
                    _ => Quantifier::Optional,
                };
                self.i += 1;
                element_end = self.pos();
                self.tokens.push(Token::with_raw(
                    TokenKind::OccurrenceModifier,
                    Span::new(self.pos() - 1, self.pos()),
                    modifier.to_string(),
                ));
            }
            Some('=') => {
                self.i += 1;
                let number_start = self.pos();
                if !self.cur().is_some_and(is_dec_digit) {
                    elem_err = Some(ParsingError::unspecified(
                        UNTERMINATED_EXACT_OCCURRENCE_COUNT,
                    ));
                    element_end = self.pos();
                } else {
                    while self.cur().is_some_and(is_dec_digit) {
                        self.i += 1;
                    }
                    let digits = self.slice_str(number_start, self.pos());
                    match digits.parse::<u32>() {
                        Ok(count) => exact_count = Some(count),
                        Err(_) => {
                            elem_err =
                                Some(ParsingError::unspecified(INVALID_OCCURRENCE_COUNT));
                        }
                    }
                    quantifier = Quantifier::Exact;
                    element_end = self.pos();
                    self.tokens.push(Token::with_raw(
                        TokenKind::OccurrenceModifier,
                        Span::new(number_start - 1, self.pos()),
                        self.slice_str(number_start - 1, self.pos()),
                    ));
                }
            }
            _ => {}
        }

        let mut node = Node::new(
            Span::new(element_start, element_end),
            NodeKind::PatternPieceElement {
                quantifier,
                exact_count,
                group_name: group_name.map(Box::new),
                expr: Box::new(element),
            },
        );
        if let Some(err) = elem_err {
            node.base.err = Some(err);
        }
        node
    }

    /// The element pattern itself: parenthesized piece or union, string
    /// and rune literals, integer ranges, pattern identifiers, regexes.
    pub(crate) fn parse_complex_string_pattern_element(&mut self) -> Node {
        self.check_cancellation();

        let start = self.pos();

        if self.eof() || self.cur_is(')') || self.cur_is('|') {
            return Node::with_error(
                self.span_from(start),
                NodeKind::InvalidComplexStringPatternElement,
                ParsingError::unspecified(errors::fmt_a_pattern_was_expected_here(
                    &self.s, self.i,
                )),
            );
        }

        #[allow(clippy::unwrap_used)] // non-eof checked above
        let r = self.cur().unwrap();
        match r {
            '(' => {
                let elem_start = self.pos();
                self.i += 1;
                if self.eof() || self.cur_is(')') {
                    return Node::with_error(
                        self.span_from(start),
                        NodeKind::InvalidComplexStringPatternElement,
                        ParsingError::unspecified(UNTERMINATED_STRING_PATTERN_ELEMENT),
                    );
                }
                if self.cur_is('|') {
                    return self.parse_string_pattern_union(elem_start, false);
                }
                self.parse_piece(elem_start, PieceKind::Parenthesized)
            }
            '"' => self.parse_quoted_string_literal(),
            '`' => self.parse_regex_literal(start),
            '\'' => self.parse_rune_rune_range(),
            '-' | '0'..='9' => {
                let number = self.parse_number_and_range_and_rate();
                if matches!(number.kind, NodeKind::IntegerRangeLiteral { .. }) {
                    number
                } else {
                    Node::with_error(
                        number.span(),
                        NodeKind::InvalidComplexStringPatternElement,
                        ParsingError::unspecified(INVALID_COMPLEX_PATTERN_ELEMENT),
                    )
                }
            }
            '%' if self.peek_is(1, '`') => {
                let regex_start = self.pos();
                self.i += 1;
                self.parse_regex_literal(regex_start)
            }
            r if is_alpha(r) => {
                while self.cur().is_some_and(is_ident_char) {
                    self.i += 1;
                }
                let span = self.span_from(start);
                self.push_raw_token(TokenKind::UnprefixedPatternIdentifier, span);
                Node::new(
                    span,
                    NodeKind::PatternIdentifierLiteral {
                        name: self.slice_str(start, self.pos()).into(),
                        unprefixed: true,
                    },
                )
            }
            _ => {
                let mut err = None;
                while let Some(r) = self.cur() {
                    if is_delim(r) || r == '"' || r == '\'' {
                        break;
                    }
                    err.get_or_insert_with(|| {
                        ParsingError::unspecified(INVALID_COMPLEX_PATTERN_ELEMENT)
                    });
                    self.i += 1;
                }
                if err.is_none() && self.pos() == start {
                    err = Some(ParsingError::unspecified(
                        errors::fmt_a_pattern_was_expected_here(&self.s, self.i),
                    ));
                    if !self.cur_is(')') {
                        self.i += 1;
                    }
                }
                let mut node = Node::new(
                    self.span_from(start),
                    NodeKind::InvalidComplexStringPatternElement,
                );
                node.base.err = err;
                node
            }
        }
    }

    /// Union of sequence cases: `(| a | b)` or the shorthand form inside
    /// a piece.
    fn parse_string_pattern_union(&mut self, start: u32, shorthand: bool) -> Node {
        let mut cases = Vec::new();

        if !shorthand {
            self.push_token(TokenKind::OpeningParenthesis, Span::new(start, start + 1));
        }

        while !self.eof() && !self.cur_is(')') {
            self.eat_space_newline_comment();
            if self.eof() || self.cur_is(')') {
                break;
            }

            if !self.cur_is('|') {
                while !self.eof() && !self.cur_is(')') {
                    self.i += 1;
                }
                let mut node = Node::new(
                    self.span_from(start),
                    NodeKind::PatternUnion { cases },
                );
                node.base.err = Some(ParsingError::unspecified(
                    "invalid pattern union: elements should be separated by '|'",
                ));
                return node;
            }
            self.push_token(
                TokenKind::PatternUnionPipe,
                Span::new(self.pos(), self.pos() + 1),
            );
            self.i += 1;
            self.eat_space_newline_comment();

            if self.eof() || self.cur_is(')') || self.cur_is('|') {
                cases.push(Node::with_error(
                    Span::point(self.pos()),
                    NodeKind::InvalidComplexStringPatternElement,
                    ParsingError::unspecified(errors::fmt_a_pattern_was_expected_here(
                        &self.s, self.i,
                    )),
                ));
            } else {
                let piece_start = self.pos();
                let piece = self.parse_piece(piece_start, PieceKind::UnionCase);

                // a single plain element collapses to its pattern
                let case = match piece.kind {
                    NodeKind::ComplexStringPatternPiece { mut elements }
                        if elements.len() == 1
                            && matches!(
                                &elements[0].kind,
                                NodeKind::PatternPieceElement {
                                    quantifier: Quantifier::ExactlyOne,
                                    group_name: None,
                                    ..
                                }
                            )
                            && !elements[0].base.parenthesized
                            && !piece.base.parenthesized =>
                    {
                        #[allow(clippy::unwrap_used)] // len checked above
                        let element = elements.pop().unwrap();
                        match element.kind {
                            NodeKind::PatternPieceElement { expr, .. } => *expr,
                            _ => element,
                        }
                    }
                    kind => Node {
                        base: piece.base,
                        kind,
                    },
                };
                cases.push(case);
            }
        }

        if shorthand {
            return Node::new(self.span_from(start), NodeKind::PatternUnion { cases });
        }

        let mut err = None;
        if !self.cur_is(')') {
            err = Some(ParsingError::unspecified(UNTERMINATED_UNION_MISSING_CLOSING_PAREN));
        } else {
            self.push_token(
                TokenKind::ClosingParenthesis,
                Span::new(self.pos(), self.pos() + 1),
            );
            self.i += 1;
        }

        let mut node = Node::new(self.span_from(start), NodeKind::PatternUnion { cases });
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
    fn sequence_with_quantifiers() {
        let node = parse("%str('a'+ 'b'* 'c'?)");
        match &node.kind {
            NodeKind::ComplexStringPatternPiece { elements } => {
                assert_eq!(elements.len(), 3);
                let quantifiers: Vec<Quantifier> = elements
                    .iter()
                    .map(|e| match &e.kind {
                        NodeKind::PatternPieceElement { quantifier, .. } => *quantifier,
                        other => panic!("expected element, got {other:?}"),
                    })
                    .collect();
                assert_eq!(
                    quantifiers,
                    vec![
                        Quantifier::AtLeastOne,
                        Quantifier::ZeroOrMore,
                        Quantifier::Optional
                    ]
                );
            }
            other => panic!("expected sequence piece, got {other:?}"),
        }
        assert!(!node.error_at_any_depth());
    }

    #[test]
    fn exact_count_quantifier() {
        let node = parse("%str('a'=3)");
        match &node.kind {
            NodeKind::ComplexStringPatternPiece { elements } => {
                assert!(matches!(
                    &elements[0].kind,
                    NodeKind::PatternPieceElement {
                        quantifier: Quantifier::Exact,
                        exact_count: Some(3),
                        ..
                    }
                ));
            }
            other => panic!("expected sequence piece, got {other:?}"),
        }
    }

    #[test]
    fn missing_exact_count() {
        let node = parse("%str('a'=)");
        assert!(node.error_at_any_depth());
    }

    #[test]
    fn group_names() {
        let node = parse("%str(digits:'0'..'9')");
        match &node.kind {
            NodeKind::ComplexStringPatternPiece { elements } => {
                assert!(matches!(
                    &elements[0].kind,
                    NodeKind::PatternPieceElement {
                        group_name: Some(_),
                        ..
                    }
                ));
            }
            other => panic!("expected sequence piece, got {other:?}"),
        }
    }

    #[test]
    fn parenthesized_union_element() {
        let node = parse("%str((| \"a\" | \"b\"))");
        match &node.kind {
            NodeKind::ComplexStringPatternPiece { elements } => {
                assert!(matches!(
                    &elements[0].kind,
                    NodeKind::PatternPieceElement { expr, .. }
                        if matches!(&expr.kind, NodeKind::PatternUnion { cases } if cases.len() == 2)
                ));
            }
            other => panic!("expected sequence piece, got {other:?}"),
        }
        assert!(!node.error_at_any_depth());
    }

    #[test]
    fn unterminated_sequence() {
        let node = parse("%str('a'");
        assert!(node
            .base
            .err
            .as_ref()
            .is_some_and(|e| e.message.contains("unterminated")));
    }
}
