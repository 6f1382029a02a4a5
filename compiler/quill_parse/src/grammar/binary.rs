//! Parenthesized, unary and binary expressions.
//!
//! Binary expressions must be parenthesized in source, with two
//! exceptions: `and`/`or` chains share a single pair of parentheses, and a
//! relaxed unparenthesized form is still parsed but carries a
//! `complex operands must be parenthesized` error where appropriate.

use crate::chars::{
    is_alpha, is_ident_char, is_ident_first_char, is_space_not_lf,
    is_unpaired_or_closing_delim,
};
use crate::errors;
use crate::Parser;
use quill_diagnostic::ParsingError;
use quill_ir::{BinaryOperator, Node, NodeKind, Span, Token, TokenKind, TokenSubKind, UnaryOperator};

pub(crate) const UNTERMINATED_PARENTHESIZED_EXPR: &str =
    "unterminated parenthesized expression: missing closing parenthesis";
const UNTERMINATED_BIN_EXPR_MISSING_RIGHT_OPERAND: &str =
    "unterminated binary expression: missing right operand";
const UNTERMINATED_BIN_EXPR_MISSING_PAREN: &str =
    "unterminated binary expression: missing closing parenthesis";
const INVALID_BIN_EXPR_NON_EXISTING_OPERATOR: &str =
    "invalid binary expression: non-existing operator";
pub(crate) const COMPLEX_OPERANDS_MUST_BE_PARENTHESIZED: &str =
    "complex operands of binary expressions must be parenthesized";
const BIN_EXPR_CHAIN_OPERATORS_SHOULD_BE_THE_SAME: &str =
    "chains of 'and'/'or' operations should not mix the two operators without parentheses";

/// Keyword binary operators, used to decide whether an identifier after an
/// operand is an operator or unrelated code.
const BINARY_OPERATOR_KEYWORDS: [&str; 12] = [
    "and", "or", "in", "not-in", "is", "is-not", "keyof", "substrof", "urlof", "match",
    "not-match", "as",
];

fn is_non_ident_binary_operator_char(r: char) -> bool {
    matches!(
        r,
        '+' | '-' | '*' | '/' | '\\' | '<' | '>' | '=' | '!' | '?' | '.' | ','
    )
}

impl Parser {
    /// Parse the contents of `(…)`: a parenthesized expression, a unary
    /// negation, a binary expression or an `and`/`or` chain. The opening
    /// parenthesis was consumed by the caller (its token included).
    pub(crate) fn parse_unary_binary_parenthesized(&mut self, opening_paren_index: u32) -> Node {
        self.parse_unary_binary_inner(opening_paren_index, None)
    }

    fn parse_unary_binary_inner(
        &mut self,
        opening_paren_index: u32,
        previous_operator_end: Option<u32>,
    ) -> Node {
        self.check_cancellation();

        let has_previous_operator = previous_operator_end.is_some();
        let start_index = previous_operator_end.unwrap_or(opening_paren_index);

        self.eat_space_newline_comment();

        // markup without a namespace: `(<div>…</div>)`
        let (mut left, is_missing) = if !has_previous_operator
            && self.cur_is('<')
            && self.peek(1).is_some_and(is_alpha)
        {
            let (element, _) = self.parse_markup_element();
            let span = element.span();
            (
                Node::new(
                    span,
                    NodeKind::MarkupExpression {
                        namespace: None,
                        element: Box::new(element),
                    },
                ),
                false,
            )
        } else {
            self.parse_expression_inner(true)
        };

        // if/for/walk/switch/match expression forms
        if !has_previous_operator {
            if let NodeKind::IdentifierLiteral { name } = &left.kind {
                let keyword_start = left.span().start;
                match &**name {
                    "if" => return self.parse_if_expression(Some(opening_paren_index), keyword_start),
                    "for" => {
                        return self.parse_for_expression(Some(opening_paren_index), keyword_start)
                    }
                    "walk" => {
                        return self.parse_walk_expression(Some(opening_paren_index), keyword_start)
                    }
                    "switch" | "match" => {
                        let is_match = &**name == "match";
                        return self.parse_switch_match_expression(
                            Some(opening_paren_index),
                            keyword_start,
                            is_match,
                        );
                    }
                    _ => {}
                }
            }
        }

        self.eat_space_newline_comment();

        if is_missing {
            return self.missing_in_parenthesized(start_index, left, has_previous_operator);
        }

        // `(- expr)`: unary number negation
        if let NodeKind::UnquotedStringLiteral { value, .. } = &left.kind {
            if &**value == "-" && !self.eof() && !self.cur_is(')') {
                self.tokens.push(
                    Token::new(TokenKind::Minus, left.span())
                        .with_sub_kind(TokenSubKind::UnaryOperator),
                );
                let (operand, _) = self.parse_expression_inner(false);
                let mut unary = Node::new(
                    Span::new(left.span().start, operand.span().end),
                    NodeKind::UnaryExpression {
                        operator: UnaryOperator::NumberNegate,
                        operand: Box::new(operand),
                    },
                );
                self.eat_space();
                if !has_previous_operator && self.cur_is(')') {
                    self.push_token(
                        TokenKind::ClosingParenthesis,
                        Span::new(self.pos(), self.pos() + 1),
                    );
                    self.i += 1;
                    unary.base.span = Span::new(start_index, self.pos());
                    unary.base.parenthesized = true;
                    return unary;
                }
                left = unary;
            }
        }

        // pattern union: `(%int | %str)`
        if self.in_pattern && self.cur_is('|') {
            return self.parse_pattern_union_with_first_case(start_index, left, !has_previous_operator);
        }

        // pipeline expression: `(a | b | c)`
        if !self.in_pattern && self.cur_is('|') {
            return self.parse_parenthesized_pipeline_tail(start_index, left, has_previous_operator);
        }

        if self.cur_is(')') {
            // parenthesized expression
            if !has_previous_operator {
                self.push_token(
                    TokenKind::ClosingParenthesis,
                    Span::new(self.pos(), self.pos() + 1),
                );
                self.i += 1;
                left.base.span = Span::new(start_index, self.pos());
                left.base.parenthesized = true;
            }
            return left;
        }

        if self.eof() {
            if !has_previous_operator {
                left.base.parenthesized = true;
                left.set_error_if_none(ParsingError::unspecified(UNTERMINATED_PARENTHESIZED_EXPR));
            }
            return left;
        }

        // binary expression
        let mut parsing_err: Option<ParsingError> = None;
        let operator = match self.get_binary_operator() {
            Ok(operator) => operator,
            Err(err) => {
                return Node::with_error(
                    self.span_from(start_index),
                    NodeKind::BinaryExpression {
                        operator: BinaryOperator::Add,
                        left: Box::new(left),
                        right: Box::new(self.missing_expression(false)),
                    },
                    err,
                );
            }
        };

        self.eat_space();
        if self.eof() {
            parsing_err = Some(ParsingError::unspecified(
                UNTERMINATED_BIN_EXPR_MISSING_RIGHT_OPERAND,
            ));
        }

        let in_pattern_save = self.in_pattern;
        if matches!(operator, BinaryOperator::Match | BinaryOperator::NotMatch) {
            self.in_pattern = true;
        }
        let (right, right_missing) = self.parse_expression_inner(false);
        self.in_pattern = in_pattern_save;

        self.eat_space();
        if right_missing {
            parsing_err = Some(ParsingError::unspecified(
                UNTERMINATED_BIN_EXPR_MISSING_RIGHT_OPERAND,
            ));
        } else if self.eof() && !has_previous_operator {
            parsing_err = Some(ParsingError::unspecified(UNTERMINATED_BIN_EXPR_MISSING_PAREN));
        }

        // chain detection
        let mut chain_with: Option<(BinaryOperator, Span)> = None;
        let mut move_right_operand = false;
        let mut chain_element_end = self.pos();

        match self.cur() {
            Some('a') if self.keyword_ahead("and") => {
                chain_with = Some((BinaryOperator::And, Span::new(self.pos(), self.pos() + 3)));
                self.push_token(TokenKind::And, Span::new(self.pos(), self.pos() + 3));
                self.i += 3;
            }
            Some('o') if self.keyword_ahead("or") => {
                chain_with = Some((BinaryOperator::Or, Span::new(self.pos(), self.pos() + 2)));
                self.push_token(TokenKind::Or, Span::new(self.pos(), self.pos() + 2));
                self.i += 2;
            }
            Some(')') => {
                if !has_previous_operator {
                    self.push_token(
                        TokenKind::ClosingParenthesis,
                        Span::new(self.pos(), self.pos() + 1),
                    );
                    self.i += 1;
                    chain_element_end = self.pos();
                }
            }
            Some(r) => {
                if matches!(operator, BinaryOperator::And | BinaryOperator::Or)
                    || is_ident_first_char(r)
                {
                    chain_with = Some((operator, Span::DUMMY));
                    move_right_operand = true;
                } else if is_non_ident_binary_operator_char(r) {
                    if has_previous_operator {
                        chain_with = Some((operator, Span::DUMMY));
                        move_right_operand = true;
                    } else {
                        parsing_err = Some(ParsingError::unspecified(
                            COMPLEX_OPERANDS_MUST_BE_PARENTHESIZED,
                        ));
                    }
                } else if !has_previous_operator {
                    parsing_err =
                        Some(ParsingError::unspecified(UNTERMINATED_BIN_EXPR_MISSING_PAREN));
                }
            }
            None => {}
        }

        if let Some((chain_operator, _)) = chain_with {
            return self.parse_and_or_chain(
                start_index,
                opening_paren_index,
                has_previous_operator,
                left,
                right,
                operator,
                chain_operator,
                move_right_operand,
                parsing_err,
            );
        }

        let mut node = Node::new(
            Span::new(start_index, chain_element_end),
            NodeKind::BinaryExpression {
                operator,
                left: Box::new(left),
                right: Box::new(right),
            },
        );
        node.base.parenthesized = !has_previous_operator;
        if let Some(err) = parsing_err {
            node.set_error_if_none(err);
        }
        node
    }

    #[allow(clippy::too_many_arguments)]
    fn parse_and_or_chain(
        &mut self,
        start_index: u32,
        opening_paren_index: u32,
        has_previous_operator: bool,
        left: Node,
        right: Node,
        operator: BinaryOperator,
        chain_operator: BinaryOperator,
        move_right_operand: bool,
        parsing_err: Option<ParsingError>,
    ) -> Node {
        // `(a or b or c)` re-parses b as part of the recursive right side;
        // `(a < b and c)` folds `a < b` into the new left operand
        let new_left = if move_right_operand {
            self.i = right.span().start as usize;
            left
        } else {
            let mut folded = Node::new(
                Span::new(start_index, right.span().end),
                NodeKind::BinaryExpression {
                    operator,
                    left: Box::new(left),
                    right: Box::new(right),
                },
            );
            if let Some(err) = parsing_err {
                folded.set_error_if_none(err);
            }
            folded
        };

        let logical_operator = chain_operator;
        let complement = if logical_operator == BinaryOperator::And {
            BinaryOperator::Or
        } else {
            BinaryOperator::And
        };

        // mixing operators in one chain: `(a and b or c)`
        let mixed_fold = matches!(
            new_left.kind,
            NodeKind::BinaryExpression { operator, .. }
                if matches!(operator, BinaryOperator::And | BinaryOperator::Or)
                    && operator != logical_operator
        ) && !new_left.base.parenthesized;

        self.eat_space();
        let new_right =
            self.parse_unary_binary_inner(opening_paren_index, Some(self.pos()));
        self.eat_space();

        let mut node = Node::new(
            Span::new(start_index, new_right.span().end),
            NodeKind::BinaryExpression {
                operator: logical_operator,
                left: Box::new(new_left),
                right: Box::new(new_right),
            },
        );
        node.base.parenthesized = !has_previous_operator;
        if mixed_fold {
            node.set_error_if_none(ParsingError::unspecified(
                BIN_EXPR_CHAIN_OPERATORS_SHOULD_BE_THE_SAME,
            ));
        }

        if !has_previous_operator {
            if self.cur_is(')') {
                self.push_token(
                    TokenKind::ClosingParenthesis,
                    Span::new(self.pos(), self.pos() + 1),
                );
                self.i += 1;
                node.base.span.end = self.pos();
            } else {
                let right_missing = matches!(
                    node.kind,
                    NodeKind::BinaryExpression { ref right, .. }
                        if matches!(right.kind, NodeKind::MissingExpression)
                );
                if !right_missing {
                    node.set_error_if_none(ParsingError::unspecified(
                        UNTERMINATED_BIN_EXPR_MISSING_PAREN,
                    ));
                }
            }

            // mixing and/or without parentheses is an error
            if node.base.err.is_none() {
                if let NodeKind::BinaryExpression { right, .. } = &node.kind {
                    if let NodeKind::BinaryExpression {
                        operator: right_op, ..
                    } = &right.kind
                    {
                        if !right.base.parenthesized && *right_op == complement {
                            node.set_error_if_none(ParsingError::unspecified(
                                BIN_EXPR_CHAIN_OPERATORS_SHOULD_BE_THE_SAME,
                            ));
                        }
                    }
                }
            }
        }
        node
    }

    fn missing_in_parenthesized(
        &mut self,
        start_index: u32,
        left: Node,
        has_previous_operator: bool,
    ) -> Node {
        if self.eof() {
            if has_previous_operator {
                return self.missing_expression(true);
            }
            let mut node = Node::new(self.span_from(start_index), NodeKind::UnknownNode);
            node.base.err = left.base.err;
            return node;
        }

        if self.cur_is(')') {
            if !has_previous_operator {
                self.push_token(
                    TokenKind::ClosingParenthesis,
                    Span::new(self.pos(), self.pos() + 1),
                );
                self.i += 1;
                let mut node = Node::new(self.span_from(start_index), NodeKind::UnknownNode);
                node.base.err = left.base.err;
                node.base.parenthesized = true;
                return node;
            }
            return self.missing_expression(true);
        }

        #[allow(clippy::unwrap_used)] // non-eof checked above
        let r = self.cur().unwrap();
        self.i += 1;
        self.tokens.push(Token::with_raw(
            TokenKind::UnexpectedChar,
            Span::new(self.pos() - 1, self.pos()),
            r.to_string(),
        ));
        Node::with_error(
            self.span_from(start_index),
            NodeKind::UnknownNode,
            ParsingError::unspecified(errors::fmt_unexpected_char_in(
                r,
                "parenthesized expression",
            )),
        )
    }

    /// Is `keyword` at the cursor, not followed by an identifier char?
    pub(crate) fn keyword_ahead(&self, keyword: &str) -> bool {
        let len = keyword.chars().count();
        if self.i + len > self.len {
            return false;
        }
        if !self.s[self.i..self.i + len]
            .iter()
            .zip(keyword.chars())
            .all(|(a, b)| *a == b)
        {
            return false;
        }
        !self.at(self.i + len).is_some_and(is_ident_char)
    }

    /// Recognise a binary operator at the cursor and push its token. On
    /// an unknown operator the invalid runes are consumed and an
    /// `InvalidOperator` token is emitted.
    pub(crate) fn get_binary_operator(&mut self) -> Result<BinaryOperator, ParsingError> {
        use BinaryOperator::*;

        let operator_start = self.pos();

        let dot_suffixed = |p: &mut Parser, base: BinaryOperator, dotted: BinaryOperator| {
            if p.cur_is('.') {
                p.i += 1;
                dotted
            } else {
                base
            }
        };

        #[allow(clippy::unwrap_used)] // callers ensure non-eof
        let r = self.cur().unwrap();
        let (operator, token_kind) = match r {
            '+' => {
                self.i += 1;
                let op = dot_suffixed(self, Add, AddDot);
                (op, if op == Add { TokenKind::Plus } else { TokenKind::PlusDot })
            }
            '-' => {
                self.i += 1;
                let op = dot_suffixed(self, Sub, SubDot);
                (op, if op == Sub { TokenKind::Minus } else { TokenKind::MinusDot })
            }
            '*' => {
                self.i += 1;
                let op = dot_suffixed(self, Mul, MulDot);
                (
                    op,
                    if op == Mul {
                        TokenKind::Asterisk
                    } else {
                        TokenKind::AsteriskDot
                    },
                )
            }
            '/' => {
                self.i += 1;
                let op = dot_suffixed(self, Div, DivDot);
                (op, if op == Div { TokenKind::Slash } else { TokenKind::SlashDot })
            }
            '\\' => {
                self.i += 1;
                (SetDifference, TokenKind::Antislash)
            }
            '<' => {
                self.i += 1;
                if self.cur_is('=') {
                    self.i += 1;
                    let op = dot_suffixed(self, LessOrEqual, LessOrEqualDot);
                    (
                        op,
                        if op == LessOrEqual {
                            TokenKind::LessOrEqual
                        } else {
                            TokenKind::LessOrEqualDot
                        },
                    )
                } else {
                    let op = dot_suffixed(self, LessThan, LessThanDot);
                    (
                        op,
                        if op == LessThan {
                            TokenKind::LessThan
                        } else {
                            TokenKind::LessThanDot
                        },
                    )
                }
            }
            '>' => {
                self.i += 1;
                if self.cur_is('=') {
                    self.i += 1;
                    let op = dot_suffixed(self, GreaterOrEqual, GreaterOrEqualDot);
                    (
                        op,
                        if op == GreaterOrEqual {
                            TokenKind::GreaterOrEqual
                        } else {
                            TokenKind::GreaterOrEqualDot
                        },
                    )
                } else {
                    let op = dot_suffixed(self, GreaterThan, GreaterThanDot);
                    (
                        op,
                        if op == GreaterThan {
                            TokenKind::GreaterThan
                        } else {
                            TokenKind::GreaterThanDot
                        },
                    )
                }
            }
            '=' => {
                if self.peek_is(1, '=') {
                    self.i += 2;
                    (Equal, TokenKind::EqualEqual)
                } else {
                    return Err(self.invalid_operator(operator_start));
                }
            }
            '!' => {
                if self.peek_is(1, '=') {
                    self.i += 2;
                    (NotEqual, TokenKind::ExclamationMarkEqual)
                } else {
                    return Err(self.invalid_operator(operator_start));
                }
            }
            '?' => {
                if self.peek_is(1, '?') {
                    self.i += 2;
                    (NilCoalescing, TokenKind::DoubleQuestionMark)
                } else {
                    return Err(self.invalid_operator(operator_start));
                }
            }
            '.' => {
                if self.peek_is(1, '.') {
                    if self.peek_is(2, '<') {
                        self.i += 3;
                        (ExclEndRange, TokenKind::DotDotLessThan)
                    } else {
                        self.i += 2;
                        (Range, TokenKind::TwoDots)
                    }
                } else {
                    return Err(self.invalid_operator(operator_start));
                }
            }
            ',' => {
                self.i += 1;
                (PairComma, TokenKind::Comma)
            }
            r if is_ident_first_char(r) => {
                let name_start = self.pos();
                while self.cur().is_some_and(is_ident_char) {
                    self.i += 1;
                }
                let name = self.slice_str(name_start, self.pos());
                let (operator, kind) = match name.as_str() {
                    "and" => (And, TokenKind::And),
                    "or" => (Or, TokenKind::Or),
                    "in" => (In, TokenKind::In),
                    "not-in" => (NotIn, TokenKind::NotIn),
                    "is" => (Is, TokenKind::Is),
                    "is-not" => (IsNot, TokenKind::IsNot),
                    "keyof" => (Keyof, TokenKind::Keyof),
                    "substrof" => (Substrof, TokenKind::Substrof),
                    "urlof" => (Urlof, TokenKind::Urlof),
                    "match" => (Match, TokenKind::Match),
                    "not-match" => (NotMatch, TokenKind::NotMatch),
                    "as" => (As, TokenKind::As),
                    _ => return Err(self.invalid_operator(operator_start)),
                };
                (operator, kind)
            }
            _ => return Err(self.invalid_operator(operator_start)),
        };

        self.tokens.push(
            Token::new(token_kind, Span::new(operator_start, self.pos()))
                .with_sub_kind(TokenSubKind::BinaryOperator),
        );
        Ok(operator)
    }

    fn invalid_operator(&mut self, operator_start: u32) -> ParsingError {
        // consume the whole run of operator-ish runes
        if self.cur().is_some_and(is_non_ident_binary_operator_char) {
            while self.cur().is_some_and(is_non_ident_binary_operator_char) {
                self.i += 1;
            }
        } else if self.cur().is_some_and(is_ident_first_char) {
            while self.cur().is_some_and(is_ident_char) {
                self.i += 1;
            }
        } else {
            self.i += 1;
        }
        self.push_raw_token(TokenKind::InvalidOperator, self.span_from(operator_start));
        ParsingError::unspecified(INVALID_BIN_EXPR_NON_EXISTING_OPERATOR)
    }

    /// Relaxed unparenthesized binary form used in statement position.
    /// Returns `Err(left)` unchanged when no binary operator follows.
    pub(crate) fn try_parse_unparenthesized_binary_expr(
        &mut self,
        left: Node,
    ) -> Result<Node, Node> {
        let start_index = left.span().start;

        let mut temp_index = self.i;
        while temp_index < self.len && self.at(temp_index).is_some_and(is_space_not_lf) {
            temp_index += 1;
        }
        let space_present = temp_index > self.i;

        let Some(r) = self.at(temp_index) else {
            return Err(left);
        };

        match r {
            '.' => {
                // member access, paths and spreads are not operators
                if !space_present
                    || self.at(temp_index + 1) == Some('/')
                    || (self.at(temp_index + 1) == Some('.')
                        && matches!(self.at(temp_index + 2), Some('/' | '.')))
                {
                    return Err(left);
                }
            }
            ':' => return Err(left),
            '*' | '<' | '>' | '!' => {}
            '=' => {
                if self.at(temp_index + 1) != Some('=') {
                    return Err(left);
                }
            }
            '+' | '/' | '-' => {
                if self
                    .at(temp_index + 1)
                    .is_some_and(|next| !next.is_whitespace())
                {
                    return Err(left);
                }
            }
            '?' => {
                if !space_present {
                    return Err(left);
                }
            }
            r if is_alpha(r) => {
                let mut name_end = temp_index;
                while name_end < self.len && self.at(name_end).is_some_and(is_ident_char) {
                    name_end += 1;
                }
                let name: String = self.s[temp_index..name_end].iter().collect();
                if !BINARY_OPERATOR_KEYWORDS.contains(&name.as_str()) {
                    return Err(left);
                }
            }
            _ => return Err(left),
        }

        self.eat_space();

        let mut parsing_err = None;
        let operator = match self.get_binary_operator() {
            Ok(operator) => operator,
            Err(err) => {
                return Ok(Node::with_error(
                    self.span_from(start_index),
                    NodeKind::BinaryExpression {
                        operator: BinaryOperator::Add,
                        left: Box::new(left),
                        right: Box::new(self.missing_expression(false)),
                    },
                    err,
                ));
            }
        };

        self.eat_space();
        if self.eof() || self.cur().is_some_and(is_unpaired_or_closing_delim) {
            parsing_err = Some(ParsingError::unspecified(
                UNTERMINATED_BIN_EXPR_MISSING_RIGHT_OPERAND,
            ));
        }

        let in_pattern_save = self.in_pattern;
        if matches!(operator, BinaryOperator::Match | BinaryOperator::NotMatch) {
            self.in_pattern = true;
        }
        let (right, right_missing) = self.parse_expression_inner(false);
        self.in_pattern = in_pattern_save;

        if right_missing {
            parsing_err = Some(ParsingError::unspecified(
                UNTERMINATED_BIN_EXPR_MISSING_RIGHT_OPERAND,
            ));
        } else {
            // a further operation without parentheses is the error case
            let mut index = self.i;
            while index < self.len && self.at(index).is_some_and(is_space_not_lf) {
                index += 1;
            }
            if let Some(next) = self.at(index) {
                if !is_unpaired_or_closing_delim(next)
                    && (matches!(next, '+' | '-' | '*' | '/' | '?' | '<' | '!' | '=')
                        || is_ident_first_char(next))
                {
                    parsing_err = Some(ParsingError::unspecified(
                        COMPLEX_OPERANDS_MUST_BE_PARENTHESIZED,
                    ));
                }
            }
        }

        let mut node = Node::new(
            self.span_from(start_index),
            NodeKind::BinaryExpression {
                operator,
                left: Box::new(left),
                right: Box::new(right),
            },
        );
        if let Some(err) = parsing_err {
            node.set_error_if_none(err);
        }
        Ok(node)
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
    fn parenthesized_int() {
        let node = parse("(1)");
        assert!(matches!(node.kind, NodeKind::IntLiteral { value: 1, .. }));
        assert!(node.base.parenthesized);
        assert_eq!(node.span(), Span::new(0, 3));
    }

    #[test]
    fn binary_add() {
        let node = parse("(1 + 2)");
        match &node.kind {
            NodeKind::BinaryExpression {
                operator,
                left,
                right,
            } => {
                assert_eq!(*operator, BinaryOperator::Add);
                assert!(matches!(left.kind, NodeKind::IntLiteral { value: 1, .. }));
                assert!(matches!(right.kind, NodeKind::IntLiteral { value: 2, .. }));
            }
            other => panic!("expected binary expression, got {other:?}"),
        }
        assert!(node.base.parenthesized);
        assert!(node.base.err.is_none());
    }

    #[test]
    fn keyword_operators() {
        for (source, operator) in [
            ("(a in b)", BinaryOperator::In),
            ("(a not-in b)", BinaryOperator::NotIn),
            ("(a is-not b)", BinaryOperator::IsNot),
            ("(a keyof b)", BinaryOperator::Keyof),
            ("(a ?? b)", BinaryOperator::NilCoalescing),
            ("(a .. b)", BinaryOperator::Range),
            ("(a ..< b)", BinaryOperator::ExclEndRange),
            ("(a \\ b)", BinaryOperator::SetDifference),
        ] {
            match parse(source).kind {
                NodeKind::BinaryExpression { operator: op, .. } => {
                    assert_eq!(op, operator, "source: {source}");
                }
                other => panic!("expected binary expression for {source}, got {other:?}"),
            }
        }
    }

    #[test]
    fn match_operator_switches_to_pattern_context() {
        let node = parse("(a match %p)");
        match &node.kind {
            NodeKind::BinaryExpression { right, .. } => {
                assert!(matches!(
                    right.kind,
                    NodeKind::PatternIdentifierLiteral { .. }
                ));
            }
            other => panic!("expected binary expression, got {other:?}"),
        }
    }

    #[test]
    fn unary_negation_in_parens() {
        let node = parse("(- 2)");
        assert!(matches!(
            node.kind,
            NodeKind::UnaryExpression {
                operator: UnaryOperator::NumberNegate,
                ..
            }
        ));
        assert!(node.base.parenthesized);
    }

    #[test]
    fn and_chain() {
        let node = parse("(a and b and c)");
        match &node.kind {
            NodeKind::BinaryExpression { operator, .. } => {
                assert_eq!(*operator, BinaryOperator::And);
            }
            other => panic!("expected chain, got {other:?}"),
        }
        assert!(node.base.err.is_none());
        assert!(node.base.parenthesized);
    }

    #[test]
    fn comparison_folded_into_chain() {
        let node = parse("((a < b) and c)");
        assert!(node.base.err.is_none());
        match &node.kind {
            NodeKind::BinaryExpression { operator, left, .. } => {
                assert_eq!(*operator, BinaryOperator::And);
                assert!(matches!(
                    left.kind,
                    NodeKind::BinaryExpression {
                        operator: BinaryOperator::LessThan,
                        ..
                    }
                ));
            }
            other => panic!("expected chain, got {other:?}"),
        }
    }

    #[test]
    fn mixed_and_or_without_parens_is_an_error() {
        let node = parse("(a and b or c)");
        assert!(node.error_at_any_depth());
    }

    #[test]
    fn invalid_operator_is_reported() {
        let node = parse("(1 ; 2)");
        assert!(node.error_at_any_depth());
    }

    #[test]
    fn missing_closing_paren() {
        let node = parse("(1 + 2");
        assert!(node.error_at_any_depth());
    }

    #[test]
    fn unparenthesized_form_attaches_error_on_chain() {
        let mut p = Parser::new("a + b + c", &ParserOptions::default());
        let (left, _) = p.parse_expression_inner(false);
        let node = match p.try_parse_unparenthesized_binary_expr(left) {
            Ok(node) => node,
            Err(_) => panic!("expected a binary expression"),
        };
        assert!(node
            .base
            .err
            .as_ref()
            .is_some_and(|e| e.message.contains("parenthesized")));
    }
}
