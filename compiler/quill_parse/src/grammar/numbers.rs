//! Number-family literals: integers (base 10/16/8), floats, ranges,
//! quantities, rates, ports, byte slices and runes.

use crate::chars::{
    is_alpha, is_dec_digit, is_hex_digit, is_ident_char, is_octal_digit, is_space_not_lf,
};
use crate::Parser;
use quill_diagnostic::{ParsingError, ParsingErrorKind};
use quill_ir::{ByteSliceBase, Node, NodeKind, Span, TokenKind};

const INVALID_INT_LIT: &str = "invalid integer literal";
const INVALID_FLOAT_LIT: &str = "invalid float literal";
const INVALID_QUANTITY_LIT: &str = "invalid quantity literal";
const INVALID_RATE_LIT: &str = "invalid rate literal";
const QUANTITY_LIT_BASE10_ONLY: &str =
    "quantity literals are only supported in base 10";
const UNTERMINATED_INT_RANGE_LIT: &str =
    "unterminated integer range literal: missing upper bound";
const RANGE_BOUND_TYPE_MISMATCH: &str =
    "the upper bound of a range literal should have the same type as the lower bound";
const INVALID_PORT_LITERAL_INVALID_PORT_NUMBER: &str =
    "invalid port literal: port number should be between 0 and 65535";
const UNTERMINATED_PORT_LITERAL_MISSING_SCHEME_NAME: &str =
    "unterminated port literal: missing scheme name after '/'";
const UNKNOWN_BYTE_SLICE_BASE: &str = "unknown byte slice base";
const UNTERMINATED_BYTE_SLICE_MISSING_BRACKETS: &str =
    "unterminated byte slice literal: missing brackets after base";
const UNTERMINATED_BYTE_SLICE_MISSING_CLOSING_BRACKET: &str =
    "unterminated byte slice literal: missing closing bracket ']'";
const HEX_BYTE_SLICE_LENGTH_SHOULD_BE_EVEN: &str =
    "invalid hexadecimal byte slice literal: length should be even";
const UNTERMINATED_RUNE_LIT: &str = "unterminated rune literal";
const INVALID_RUNE_LIT_NO_CHAR: &str = "invalid rune literal: no character";
const INVALID_RUNE_LIT_INVALID_SINGLE_CHAR: &str =
    "invalid rune literal: invalid single character";
const INVALID_RUNE_LIT_MUST_BE_FOLLOWED_BY_QUOTE: &str =
    "invalid rune literal: should be terminated by a single quote";
const INVALID_RUNE_RANGE_INVALID_DOT_COUNT: &str =
    "invalid rune range expression: a single '.' is not a valid range operator, use '..'";
const UNTERMINATED_RUNE_RANGE_EXPR: &str = "unterminated rune range expression";

/// What base an integer literal used, for quantity restrictions.
#[derive(Copy, Clone, Eq, PartialEq)]
enum IntBase {
    Decimal,
    Hex,
    Octal,
}

impl Parser {
    fn parse_integer_literal(&mut self, raw: String, start: u32, end: u32) -> (Node, i64) {
        let cleaned: String = raw.chars().filter(|r| *r != '_').collect();
        let parsed = if let Some(hex) = cleaned.strip_prefix("0x") {
            i64::from_str_radix(hex, 16)
        } else if let Some(neg_hex) = cleaned.strip_prefix("-0x") {
            i64::from_str_radix(&format!("-{neg_hex}"), 16)
        } else if let Some(oct) = cleaned.strip_prefix("0o") {
            i64::from_str_radix(oct, 8)
        } else if let Some(neg_oct) = cleaned.strip_prefix("-0o") {
            i64::from_str_radix(&format!("-{neg_oct}"), 8)
        } else {
            cleaned.parse::<i64>()
        };

        let mut node = Node::new(
            Span::new(start, end),
            NodeKind::IntLiteral {
                value: parsed.clone().unwrap_or(0),
                raw: raw.into(),
            },
        );
        self.push_raw_token(TokenKind::IntLiteral, Span::new(start, end));
        if parsed.is_err() {
            node.set_error_if_none(ParsingError::unspecified(INVALID_INT_LIT));
        }
        let value = match &node.kind {
            NodeKind::IntLiteral { value, .. } => *value,
            _ => 0,
        };
        (node, value)
    }

    /// Parse an integer or float, or an integer range (`A..B` / `A..<B`).
    /// The cursor is on the first digit or a leading `-`.
    pub(crate) fn parse_number_and_number_range(&mut self) -> Node {
        let start = self.pos();
        let mut base = IntBase::Decimal;

        if self.cur_is('-') {
            self.i += 1;
        }

        if self.cur_is('0') && self.peek_is(1, 'x') && self.peek(2).is_some_and(is_hex_digit) {
            base = IntBase::Hex;
            self.i += 2;
            while self.cur().is_some_and(|r| is_hex_digit(r) || r == '_') {
                self.i += 1;
            }
        } else if self.cur_is('0')
            && self.peek_is(1, 'o')
            && self.peek(2).is_some_and(is_octal_digit)
        {
            base = IntBase::Octal;
            self.i += 2;
            while self.cur().is_some_and(|r| is_octal_digit(r) || r == '_') {
                self.i += 1;
            }
        } else {
            while self.cur().is_some_and(|r| is_dec_digit(r) || r == '_') {
                self.i += 1;
            }
        }

        if base != IntBase::Decimal {
            let raw = self.slice_str(start, self.pos());
            return self.parse_integer_literal(raw, start, self.pos()).0;
        }

        if self.cur_is('.') {
            self.i += 1;

            if self.cur_is('.') {
                // integer range literal
                let lower_raw = self.slice_str(start, self.pos() - 1);
                let (lower, _) = self.parse_integer_literal(lower_raw, start, self.pos() - 1);
                self.push_token(
                    TokenKind::TwoDots,
                    Span::new(self.pos() - 1, self.pos() + 1),
                );
                self.i += 1;

                if !self.cur().is_some_and(is_dec_digit) {
                    return Node::with_error(
                        self.span_from(start),
                        NodeKind::IntegerRangeLiteral {
                            lower_bound: Box::new(lower),
                            upper_bound: None,
                        },
                        ParsingError::unspecified(UNTERMINATED_INT_RANGE_LIT),
                    );
                }

                let upper_start = self.pos();
                while self
                    .cur()
                    .is_some_and(|r| is_dec_digit(r) || r == '-' || r == '_')
                {
                    self.i += 1;
                }
                let upper_raw = self.slice_str(upper_start, self.pos());
                let (upper, _) = self.parse_integer_literal(upper_raw, upper_start, self.pos());
                return Node::new(
                    self.span_from(start),
                    NodeKind::IntegerRangeLiteral {
                        lower_bound: Box::new(lower),
                        upper_bound: Some(Box::new(upper)),
                    },
                );
            }

            // float fraction digits
            while self.cur().is_some_and(|r| is_dec_digit(r) || r == '-') {
                self.i += 1;
            }
        }

        let mut raw = self.slice_str(start, self.pos());

        if raw.contains('.') {
            // scientific notation
            if self.cur_is('e') {
                self.i += 1;
                if self.cur_is('-') {
                    self.i += 1;
                }
                while self.cur().is_some_and(is_dec_digit) {
                    self.i += 1;
                }
                raw = self.slice_str(start, self.pos());
            }

            let parsed: Result<f64, _> = raw.parse();
            let mut node = Node::new(
                self.span_from(start),
                NodeKind::FloatLiteral {
                    value: parsed.clone().unwrap_or(0.0),
                    raw: raw.into(),
                },
            );
            self.push_raw_token(TokenKind::FloatLiteral, node.span());
            if parsed.is_err() {
                node.set_error_if_none(ParsingError::unspecified(INVALID_FLOAT_LIT));
            }
            return node;
        }

        self.parse_integer_literal(raw, start, self.pos()).0
    }

    /// Entry for digit-starting expressions: a number, a range, a quantity
    /// (`1h30m`), a rate (`1MB/s`), or a date-like (`2020y-…`).
    pub(crate) fn parse_number_and_range_and_rate(&mut self) -> Node {
        let start = self.pos();
        let was_hex_or_octal = self.cur_is('0')
            && self
                .peek(1)
                .is_some_and(|r| (r == 'x' || r == 'o') && !self.peek_is(2, '['));

        let number = self.parse_number_and_number_range();

        let (value, is_float) = match &number.kind {
            NodeKind::IntLiteral { value, .. } => (*value as f64, false),
            NodeKind::FloatLiteral { value, .. } => (*value, true),
            _ => return number,
        };

        if self.cur().is_some_and(|r| is_alpha(r) || r == '%') {
            if was_hex_or_octal {
                let mut node = number;
                // consume the unit runes to avoid a cascade
                while self.cur().is_some_and(is_alpha) {
                    self.i += 1;
                }
                node.base.span = self.span_from(start);
                node.set_error_if_none(ParsingError::unspecified(QUANTITY_LIT_BASE10_ONLY));
                return node;
            }
            return self.parse_quantity_or_rate_literal(start, value, is_float);
        }

        number
    }

    /// Quantity (`1h30m`), rate (`1MB/s`), quantity range (`1kB..2kB`), or
    /// a date-like when the unit is `y` followed by `-`.
    pub(crate) fn parse_quantity_or_rate_literal(
        &mut self,
        start: u32,
        first_value: f64,
        is_float: bool,
    ) -> Node {
        let unit_start = self.pos();
        let mut parsing_err: Option<ParsingError> = None;

        // date-like literal: `2020y-…`
        if !is_float && self.cur_is('y') && self.peek_is(1, '-') {
            return self.parse_date_like_literal(start);
        }

        self.i += 1;
        while self.cur().is_some_and(is_alpha) {
            self.i += 1;
        }

        let mut values = vec![first_value];
        let mut units = vec![self.slice_str(unit_start, self.pos()).into_boxed_str()];

        // multi-part quantities: 1h30m
        while self.cur().is_some_and(is_dec_digit) {
            let part = self.parse_number_and_number_range();
            match &part.kind {
                NodeKind::IntLiteral { value, .. } => values.push(*value as f64),
                NodeKind::FloatLiteral { value, .. } => values.push(*value),
                _ => {
                    parsing_err = Some(ParsingError::unspecified(INVALID_QUANTITY_LIT));
                    break;
                }
            }

            if self.cur().is_some_and(is_alpha) {
                let unit_start = self.pos();
                while self.cur().is_some_and(is_alpha) {
                    self.i += 1;
                }
                units.push(self.slice_str(unit_start, self.pos()).into_boxed_str());
            } else {
                parsing_err = Some(ParsingError::unspecified(INVALID_QUANTITY_LIT));
                break;
            }
        }

        let raw = self.slice_str(start, self.pos());
        self.push_raw_token(TokenKind::QuantityLiteral, self.span_from(start));
        let mut quantity = Node::new(
            self.span_from(start),
            NodeKind::QuantityLiteral {
                values: values.clone(),
                units: units.clone(),
                raw: raw.clone().into(),
            },
        );
        if let Some(err) = parsing_err.take() {
            quantity.set_error_if_none(err);
        }

        // rate literal: quantity '/' unit
        if self.cur_is('/') {
            self.i += 1;
            let rate_unit_start = self.pos();
            let mut err = None;
            if !self.cur().is_some_and(is_alpha) {
                err = Some(ParsingError::unspecified(INVALID_RATE_LIT));
            } else {
                while self.cur().is_some_and(is_alpha) {
                    self.i += 1;
                }
                if self.cur().is_some_and(is_ident_char) {
                    err = Some(ParsingError::unspecified(INVALID_RATE_LIT));
                }
            }
            let div_unit = self.slice_str(rate_unit_start, self.pos());
            self.push_raw_token(TokenKind::RateLiteral, self.span_from(start));
            let mut node = Node::new(
                self.span_from(start),
                NodeKind::RateLiteral {
                    values,
                    units,
                    div_unit: div_unit.clone().into(),
                    raw: format!("{raw}/{div_unit}").into(),
                },
            );
            if let Some(err) = err {
                node.set_error_if_none(err);
            }
            return node;
        }

        // quantity range literal: 1kB..2kB
        if self.cur_is('.') && self.peek_is(1, '.') {
            self.push_token(TokenKind::TwoDots, Span::new(self.pos(), self.pos() + 2));
            self.i += 2;
            let upper = self.parse_number_and_range_and_rate();
            let upper_is_quantity = matches!(upper.kind, NodeKind::QuantityLiteral { .. });
            let mut node = Node::new(
                self.span_from(start),
                NodeKind::QuantityRangeLiteral {
                    lower_bound: Box::new(quantity),
                    upper_bound: Some(Box::new(upper)),
                },
            );
            if !upper_is_quantity {
                node.set_error_if_none(ParsingError::unspecified(RANGE_BOUND_TYPE_MISMATCH));
            }
            return node;
        }

        quantity
    }

    /// Port literal `:<digits>[/scheme-name]`; the cursor is on `:`.
    pub(crate) fn parse_port_literal(&mut self) -> Node {
        let start = self.pos();
        self.i += 1;

        let mut port_number: u32 = 0;
        let mut overflow = false;
        while let Some(r) = self.cur().filter(|r| is_dec_digit(*r)) {
            port_number = port_number
                .saturating_mul(10)
                .saturating_add(r as u32 - '0' as u32);
            overflow = overflow || port_number > u32::from(u16::MAX);
            self.i += 1;
        }

        let mut err = overflow
            .then(|| ParsingError::unspecified(INVALID_PORT_LITERAL_INVALID_PORT_NUMBER));

        let mut scheme_name = None;
        if self.cur_is('/') {
            self.i += 1;
            let scheme_start = self.pos();
            while self.cur().is_some_and(|r| is_alpha(r) || r == '-') {
                self.i += 1;
            }
            let name = self.slice_str(scheme_start, self.pos());
            if name.is_empty() && err.is_none() {
                err = Some(ParsingError::unspecified(
                    UNTERMINATED_PORT_LITERAL_MISSING_SCHEME_NAME,
                ));
            }
            scheme_name = Some(name.into_boxed_str());
        }

        let raw = self.slice_str(start, self.pos());
        let mut node = Node::new(
            self.span_from(start),
            NodeKind::PortLiteral {
                port_number: port_number.min(u32::from(u16::MAX)) as u16,
                scheme_name,
                raw: raw.into(),
            },
        );
        self.push_raw_token(TokenKind::PortLiteral, node.span());
        if let Some(err) = err {
            node.set_error_if_none(err);
        }
        node
    }

    /// Byte slice literal `0x[…]`, `0b[…]`, `0d[…]`; cursor on `0`.
    pub(crate) fn parse_byte_slices(&mut self) -> Node {
        let start = self.pos();
        self.i += 1;

        let base = match self.cur() {
            Some('x') => ByteSliceBase::Hex,
            Some('b') => ByteSliceBase::Binary,
            Some('d') => ByteSliceBase::Decimal,
            _ => {
                self.i += 1;
                return Node::with_error(
                    self.span_from(start),
                    NodeKind::ByteSliceLiteral {
                        base: ByteSliceBase::Hex,
                        bytes: vec![],
                        raw: self.slice_str(start, self.pos()).into(),
                    },
                    ParsingError::unspecified(UNKNOWN_BYTE_SLICE_BASE),
                );
            }
        };
        self.i += 1;

        if !self.cur_is('[') {
            return Node::with_error(
                self.span_from(start),
                NodeKind::ByteSliceLiteral {
                    base,
                    bytes: vec![],
                    raw: self.slice_str(start, self.pos()).into(),
                },
                ParsingError::unspecified(UNTERMINATED_BYTE_SLICE_MISSING_BRACKETS),
            );
        }
        self.i += 1;

        let mut err: Option<ParsingError> = None;
        let mut append_err = |err: &mut Option<ParsingError>, message: String| match err {
            Some(prev) => {
                prev.message.push('\n');
                prev.message.push_str(&message);
            }
            None => *err = Some(ParsingError::unspecified(message)),
        };

        let mut bytes = Vec::new();
        match base {
            ByteSliceBase::Hex => {
                let mut digits = Vec::new();
                while !self.eof() && !self.cur_is(']') {
                    let r = self.cur().unwrap_or(' ');
                    if is_hex_digit(r) && !r.is_ascii_uppercase() {
                        digits.push(r);
                    } else if !is_space_not_lf(r) && r != '\n' {
                        append_err(
                            &mut err,
                            crate::errors::fmt_unexpected_char_in(
                                r,
                                "hexadecimal byte slice literal",
                            ),
                        );
                    }
                    self.i += 1;
                }
                if err.is_none() {
                    if digits.len() % 2 != 0 {
                        err = Some(ParsingError::unspecified(
                            HEX_BYTE_SLICE_LENGTH_SHOULD_BE_EVEN,
                        ));
                    } else {
                        for pair in digits.chunks_exact(2) {
                            let hi = pair[0].to_digit(16).unwrap_or(0) as u8;
                            let lo = pair[1].to_digit(16).unwrap_or(0) as u8;
                            bytes.push(hi << 4 | lo);
                        }
                    }
                }
            }
            ByteSliceBase::Binary => {
                let mut current = 0u8;
                let mut bit_index = 0u8;
                while !self.eof() && !self.cur_is(']') {
                    match self.cur().unwrap_or(' ') {
                        bit @ ('0' | '1') => {
                            current = (current << 1) + (bit as u8 - b'0');
                            if bit_index == 7 {
                                bytes.push(current);
                                current = 0;
                                bit_index = 0;
                            } else {
                                bit_index += 1;
                            }
                        }
                        r if is_space_not_lf(r) || r == '\n' => {}
                        r => append_err(
                            &mut err,
                            crate::errors::fmt_unexpected_char_in(r, "binary byte slice literal"),
                        ),
                    }
                    self.i += 1;
                }
                if bit_index != 0 {
                    bytes.push(current);
                }
            }
            ByteSliceBase::Decimal => {
                let mut current: u32 = 0;
                let mut digit_count = 0u32;
                let mut flush =
                    |current: &mut u32, digit_count: &mut u32, err: &mut Option<ParsingError>,
                     bytes: &mut Vec<u8>| {
                        if *digit_count == 0 {
                            return;
                        }
                        if *digit_count > 3 || *current > 255 {
                            append_err(
                                err,
                                format!(
                                    "invalid byte {current} in decimal byte slice literal"
                                ),
                            );
                        } else {
                            bytes.push(*current as u8);
                        }
                        *current = 0;
                        *digit_count = 0;
                    };
                while !self.eof() && !self.cur_is(']') {
                    match self.cur().unwrap_or(' ') {
                        r if is_dec_digit(r) => {
                            current = current.saturating_mul(10) + (r as u32 - '0' as u32);
                            digit_count += 1;
                        }
                        r if is_space_not_lf(r) || r == '\n' => {
                            flush(&mut current, &mut digit_count, &mut err, &mut bytes);
                        }
                        r => append_err(
                            &mut err,
                            crate::errors::fmt_unexpected_char_in(r, "decimal byte slice literal"),
                        ),
                    }
                    self.i += 1;
                }
                flush(&mut current, &mut digit_count, &mut err, &mut bytes);
            }
        }

        if self.eof() {
            append_err(&mut err, UNTERMINATED_BYTE_SLICE_MISSING_CLOSING_BRACKET.to_string());
        } else {
            self.i += 1; // ']'
        }

        let raw = self.slice_str(start, self.pos());
        let mut node = Node::new(
            self.span_from(start),
            NodeKind::ByteSliceLiteral {
                base,
                bytes,
                raw: raw.into(),
            },
        );
        self.push_raw_token(TokenKind::ByteSliceLiteral, node.span());
        if let Some(err) = err {
            node.set_error_if_none(err);
        }
        node
    }

    /// Rune literal `'c'` or rune range `'a'..'z'`; cursor on the quote.
    pub(crate) fn parse_rune_rune_range(&mut self) -> Node {
        let start = self.pos();

        let lower = self.parse_rune_literal();
        if lower.base.err.is_some() {
            return lower;
        }

        if !self.cur_is('.') {
            return lower;
        }

        // `'a'.` must be followed by another dot
        if !self.peek_is(1, '.') {
            self.i += 1;
            return Node::with_error(
                self.span_from(start),
                NodeKind::RuneRangeExpression {
                    lower: Box::new(lower),
                    upper: None,
                },
                ParsingError::unspecified(INVALID_RUNE_RANGE_INVALID_DOT_COUNT),
            );
        }

        self.push_token(TokenKind::TwoDots, Span::new(self.pos(), self.pos() + 2));
        self.i += 2;

        if !self.cur_is('\'') {
            return Node::with_error(
                self.span_from(start),
                NodeKind::RuneRangeExpression {
                    lower: Box::new(lower),
                    upper: None,
                },
                ParsingError::unspecified(UNTERMINATED_RUNE_RANGE_EXPR),
            );
        }

        let upper = self.parse_rune_literal();
        Node::new(
            self.span_from(start),
            NodeKind::RuneRangeExpression {
                lower: Box::new(lower),
                upper: Some(Box::new(upper)),
            },
        )
    }

    fn parse_rune_literal(&mut self) -> Node {
        let start = self.pos();
        self.i += 1; // opening quote

        let Some(r) = self.cur() else {
            return Node::with_error(
                self.span_from(start),
                NodeKind::RuneLiteral { value: '\0' },
                ParsingError::unspecified(UNTERMINATED_RUNE_LIT),
            );
        };

        if r == '\'' {
            self.i += 1;
            return Node::with_error(
                self.span_from(start),
                NodeKind::RuneLiteral { value: '\0' },
                ParsingError::unspecified(INVALID_RUNE_LIT_NO_CHAR),
            );
        }

        let (value, err) = if r == '\\' {
            self.i += 1;
            match self.cur() {
                Some('a') => ('\u{7}', None),
                Some('b') => ('\u{8}', None),
                Some('f') => ('\u{c}', None),
                Some('n') => ('\n', None),
                Some('r') => ('\r', None),
                Some('t') => ('\t', None),
                Some('v') => ('\u{b}', None),
                Some('\\') => ('\\', None),
                Some('\'') => ('\'', None),
                _ => (
                    '\0',
                    Some(ParsingError::unspecified(
                        INVALID_RUNE_LIT_INVALID_SINGLE_CHAR,
                    )),
                ),
            }
        } else {
            (r, None)
        };
        if !self.eof() {
            self.i += 1;
        }

        let mut node = if self.cur_is('\'') {
            self.i += 1;
            Node::new(self.span_from(start), NodeKind::RuneLiteral { value })
        } else {
            Node::with_error(
                self.span_from(start),
                NodeKind::RuneLiteral { value },
                ParsingError::new(
                    ParsingErrorKind::Unspecified,
                    INVALID_RUNE_LIT_MUST_BE_FOLLOWED_BY_QUOTE,
                ),
            )
        };
        if let Some(err) = err {
            node.base.err = Some(err);
        }
        self.push_raw_token(TokenKind::RuneLiteral, node.span());
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
        p.parse_number_and_range_and_rate()
    }

    #[test]
    fn base10_int() {
        let node = parse("1_000");
        assert!(matches!(node.kind, NodeKind::IntLiteral { value: 1000, .. }));
        assert!(node.base.err.is_none());
    }

    #[test]
    fn hex_and_octal_ints() {
        assert!(matches!(
            parse("0xff").kind,
            NodeKind::IntLiteral { value: 255, .. }
        ));
        assert!(matches!(
            parse("0o10").kind,
            NodeKind::IntLiteral { value: 8, .. }
        ));
    }

    #[test]
    fn overflowing_int_has_error() {
        let node = parse("92233720368547758080");
        assert!(node.base.err.is_some());
    }

    #[test]
    fn float_with_exponent() {
        let node = parse("1.5e-3");
        match node.kind {
            NodeKind::FloatLiteral { value, .. } => assert!((value - 0.0015).abs() < 1e-12),
            other => panic!("expected float, got {other:?}"),
        }
    }

    #[test]
    fn integer_range() {
        let node = parse("1..5");
        match &node.kind {
            NodeKind::IntegerRangeLiteral {
                lower_bound,
                upper_bound,
            } => {
                assert!(matches!(
                    lower_bound.kind,
                    NodeKind::IntLiteral { value: 1, .. }
                ));
                assert!(matches!(
                    upper_bound.as_ref().map(|u| &u.kind),
                    Some(NodeKind::IntLiteral { value: 5, .. })
                ));
            }
            other => panic!("expected integer range, got {other:?}"),
        }
        assert!(node.base.err.is_none());
    }

    #[test]
    fn unterminated_integer_range() {
        let node = parse("1..");
        assert!(node.base.err.is_some());
    }

    #[test]
    fn multi_unit_quantity() {
        let node = parse("1h30m");
        match &node.kind {
            NodeKind::QuantityLiteral { values, units, raw } => {
                assert_eq!(values, &[1.0, 30.0]);
                assert_eq!(units.len(), 2);
                assert_eq!(&**raw, "1h30m");
            }
            other => panic!("expected quantity, got {other:?}"),
        }
    }

    #[test]
    fn rate_literal() {
        let node = parse("1MB/s");
        match &node.kind {
            NodeKind::RateLiteral { div_unit, raw, .. } => {
                assert_eq!(&**div_unit, "s");
                assert_eq!(&**raw, "1MB/s");
            }
            other => panic!("expected rate, got {other:?}"),
        }
        assert!(node.base.err.is_none());
    }

    #[test]
    fn hex_quantity_is_an_error() {
        let node = parse("0x1h");
        assert!(node.base.err.is_some());
    }

    #[test]
    fn port_literals() {
        let mut p = Parser::new(":8080/http", &ParserOptions::default());
        let node = p.parse_port_literal();
        match &node.kind {
            NodeKind::PortLiteral {
                port_number,
                scheme_name,
                ..
            } => {
                assert_eq!(*port_number, 8080);
                assert_eq!(scheme_name.as_deref(), Some("http"));
            }
            other => panic!("expected port, got {other:?}"),
        }

        let mut p = Parser::new(":99999", &ParserOptions::default());
        let node = p.parse_port_literal();
        assert!(node.base.err.is_some());
    }

    #[test]
    fn hex_byte_slice() {
        let mut p = Parser::new("0x[01 ff]", &ParserOptions::default());
        let node = p.parse_byte_slices();
        match &node.kind {
            NodeKind::ByteSliceLiteral { base, bytes, .. } => {
                assert_eq!(*base, ByteSliceBase::Hex);
                assert_eq!(bytes, &[0x01, 0xff]);
            }
            other => panic!("expected byte slice, got {other:?}"),
        }
        assert!(node.base.err.is_none());
    }

    #[test]
    fn odd_hex_byte_slice_is_an_error() {
        let mut p = Parser::new("0x[012]", &ParserOptions::default());
        assert!(p.parse_byte_slices().base.err.is_some());
    }

    #[test]
    fn decimal_byte_slice_bounds() {
        let mut p = Parser::new("0d[1 256]", &ParserOptions::default());
        assert!(p.parse_byte_slices().base.err.is_some());

        let mut p = Parser::new("0d[1 255]", &ParserOptions::default());
        let node = p.parse_byte_slices();
        assert!(node.base.err.is_none());
        assert!(matches!(
            &node.kind,
            NodeKind::ByteSliceLiteral { bytes, .. } if bytes == &[1, 255]
        ));
    }

    #[test]
    fn rune_literals_and_ranges() {
        let mut p = Parser::new("'a'", &ParserOptions::default());
        let node = p.parse_rune_rune_range();
        assert!(matches!(node.kind, NodeKind::RuneLiteral { value: 'a' }));

        let mut p = Parser::new("'\\n'", &ParserOptions::default());
        let node = p.parse_rune_rune_range();
        assert!(matches!(node.kind, NodeKind::RuneLiteral { value: '\n' }));

        let mut p = Parser::new("'a'..'z'", &ParserOptions::default());
        let node = p.parse_rune_rune_range();
        assert!(matches!(node.kind, NodeKind::RuneRangeExpression { .. }));
        assert!(node.base.err.is_none());

        let mut p = Parser::new("'a'.'z'", &ParserOptions::default());
        let node = p.parse_rune_rune_range();
        assert!(node.base.err.is_some());
    }
}
