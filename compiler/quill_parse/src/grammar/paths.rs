//! Paths: literals, expressions with interpolations, path patterns, and
//! named-segment path patterns.
//!
//! A path starts with `/`, `./` or `../`; a leading `%` switches to the
//! pattern form. The body is scanned into slices: string fragments,
//! `{ expr }` interpolations and `{:name}` named segments. Classification
//! into literal/expression/pattern happens after slicing.

use crate::chars::{count_prev_backslashes, is_delim, is_ident_char, is_interpolation_allowed_char};
use crate::errors;
use crate::Parser;
use quill_diagnostic::ParsingError;
use quill_ir::{shift_spans, Node, NodeKind, Span, Token, TokenKind};

const INVALID_NAMED_SEGMENT_COLON_SHOULD_BE_FOLLOWED_BY_A_NAME: &str =
    "invalid named-segment path pattern: colon should be followed by a name";
const INVALID_PATH_PATT_NAMED_SEGMENTS: &str =
    "invalid path pattern literal with named segments";
const INVALID_PATH_INTERP: &str = "invalid path interpolation";
const UNTERMINATED_PATH_INTERP_MISSING_CLOSING_BRACE: &str =
    "unterminated path interpolation; missing closing brace";
const QUOTED_PATH_PATTERN_EXPRS_ARE_NOT_SUPPORTED: &str =
    "quoted path patterns with interpolations are not supported";

impl Parser {
    /// Parse any path-like under the cursor. `is_pattern` is true when the
    /// cursor is on the `%` of a path pattern.
    pub(crate) fn parse_path_like_expression(&mut self, is_pattern: bool) -> Node {
        let start = self.pos();
        if is_pattern {
            self.i += 1;
        }

        let path_start = self.pos();
        let is_absolute = self.cur_is('/');
        self.i += 1;

        if !is_absolute {
            while self.cur_is('.') {
                self.i += 1;
            }
            while self.cur_is('/') {
                self.i += 1;
            }
        }

        let is_quoted = self.cur_is('`');
        if is_quoted {
            self.i += 1;
            while !self.eof() && !self.cur_is('`') {
                self.i += 1;
            }
            if self.cur_is('`') {
                self.i += 1;
            }
        } else {
            while let Some(r) = self.cur() {
                if r == '\n' || r.is_whitespace() || (is_delim(r) && r != '{') {
                    break;
                }
                if r == '{' {
                    self.i += 1;
                    while !self.eof() && !self.cur_is('\n') && !self.cur_is('}') {
                        self.i += 1;
                    }
                    if self.cur_is('}') {
                        self.i += 1;
                    }
                } else {
                    self.i += 1;
                }
            }
        }

        let raw = self.slice_str(start, self.pos());
        let value: String = self.s[path_start as usize..self.i]
            .iter()
            .filter(|r| **r != '`')
            .collect();

        let mut err: Option<ParsingError> = None;
        let slices = self.parse_path_expression_slices(path_start, self.pos());
        let has_interpolations_or_named_segments = slices.len() > 1
            || slices
                .iter()
                .any(|s| !matches!(s.kind, NodeKind::PathSlice { .. }));

        let has_globbing = slices.iter().any(|slice| {
            if let NodeKind::PathSlice { value } = &slice.kind {
                value.char_indices().any(|(j, r)| {
                    matches!(r, '[' | '*' | '?')
                        && count_prev_backslashes(&self.s, slice.span().start as usize + j) % 2
                            == 0
                })
            } else {
                false
            }
        });

        let is_prefix_pattern = is_pattern && value.contains("/...");
        if is_prefix_pattern
            && (!value.ends_with("/...")
                || value.trim_end_matches("/...").contains("/..."))
        {
            err = Some(ParsingError::unspecified(
                errors::PREFIX_PATT_DOTDOTDOT_ONLY_AT_THE_END,
            ));
        }
        if is_prefix_pattern && has_globbing {
            return Node::with_error(
                self.span_from(start),
                NodeKind::InvalidPathPattern {
                    value: value.into(),
                },
                ParsingError::unspecified(errors::PREFIX_PATT_CANNOT_CONTAIN_GLOBBING),
            );
        }

        if is_pattern {
            return self.classify_path_pattern(
                start,
                raw,
                value,
                slices,
                is_absolute,
                is_quoted,
                has_interpolations_or_named_segments,
                err,
            );
        }

        // named segments are only allowed in patterns
        if err.is_none()
            && slices
                .iter()
                .any(|s| matches!(s.kind, NodeKind::NamedPathSegment { .. }))
        {
            err = Some(ParsingError::unspecified(
                errors::ONLY_PATH_PATTERNS_CAN_CONTAIN_NAMED_SEGMENTS,
            ));
        }

        let mut node = if has_interpolations_or_named_segments {
            let kind = if is_absolute {
                NodeKind::AbsolutePathExpression { slices }
            } else {
                NodeKind::RelativePathExpression { slices }
            };
            Node::new(self.span_from(start), kind)
        } else {
            let token_kind = if is_absolute {
                TokenKind::AbsolutePathLiteral
            } else {
                TokenKind::RelativePathLiteral
            };
            self.push_raw_token(token_kind, self.span_from(start));
            let kind = if is_absolute {
                NodeKind::AbsolutePathLiteral {
                    value: value.into(),
                    raw: raw.into(),
                }
            } else {
                NodeKind::RelativePathLiteral {
                    value: value.into(),
                    raw: raw.into(),
                }
            };
            Node::new(self.span_from(start), kind)
        };
        if let Some(err) = err {
            node.set_error_if_none(err);
        }
        node
    }

    #[allow(clippy::too_many_arguments)]
    fn classify_path_pattern(
        &mut self,
        start: u32,
        raw: String,
        value: String,
        mut slices: Vec<Node>,
        is_absolute: bool,
        is_quoted: bool,
        has_interpolations_or_named_segments: bool,
        mut err: Option<ParsingError>,
    ) -> Node {
        if !has_interpolations_or_named_segments {
            let token_kind = if is_absolute {
                TokenKind::AbsolutePathPatternLiteral
            } else {
                TokenKind::RelativePathPatternLiteral
            };
            self.push_raw_token(token_kind, self.span_from(start));
            let kind = if is_absolute {
                NodeKind::AbsolutePathPatternLiteral {
                    value: value.into(),
                    raw: raw.into(),
                }
            } else {
                NodeKind::RelativePathPatternLiteral {
                    value: value.into(),
                    raw: raw.into(),
                }
            };
            let mut node = Node::new(self.span_from(start), kind);
            if let Some(err) = err {
                node.set_error_if_none(err);
            }
            return node;
        }

        if is_quoted && err.is_none() {
            err = Some(ParsingError::unspecified(
                QUOTED_PATH_PATTERN_EXPRS_ARE_NOT_SUPPORTED,
            ));
        }

        let contains_named_segments = slices
            .iter()
            .any(|s| matches!(s.kind, NodeKind::NamedPathSegment { .. }));
        let contains_interpolations = slices.iter().any(|s| {
            !matches!(
                s.kind,
                NodeKind::PathSlice { .. } | NodeKind::NamedPathSegment { .. }
            )
        });

        // turn path slices into path pattern slices
        for slice in &mut slices {
            if let NodeKind::PathSlice { value } = &slice.kind {
                slice.kind = NodeKind::PathPatternSlice {
                    value: value.clone(),
                };
            }
        }

        if contains_named_segments && contains_interpolations {
            return Node::with_error(
                self.span_from(start),
                NodeKind::NamedSegmentPathPatternLiteral {
                    slices,
                    raw: raw.into(),
                },
                err.unwrap_or_else(|| {
                    ParsingError::unspecified(errors::CANNOT_MIX_PATH_INTER_PATH_NAMED_SEGMENT)
                }),
            );
        }

        if contains_named_segments {
            // named segments must sit between '/' separators
            for j in 0..slices.len() {
                if !matches!(slices[j].kind, NodeKind::NamedPathSegment { .. }) {
                    continue;
                }
                let prev_ends_with_slash = j > 0
                    && matches!(&slices[j - 1].kind, NodeKind::PathPatternSlice { value }
                        if value.ends_with('/'));
                let next_starts_with_slash = j + 1 >= slices.len()
                    || matches!(&slices[j + 1].kind, NodeKind::PathPatternSlice { value }
                        if value.starts_with('/'));
                if !prev_ends_with_slash || !next_starts_with_slash {
                    err = err.or_else(|| {
                        Some(ParsingError::unspecified(INVALID_PATH_PATT_NAMED_SEGMENTS))
                    });
                    break;
                }
            }
            let mut node = Node::new(
                self.span_from(start),
                NodeKind::NamedSegmentPathPatternLiteral {
                    slices,
                    raw: raw.into(),
                },
            );
            if let Some(err) = err {
                node.set_error_if_none(err);
            }
            return node;
        }

        let mut node = Node::new(
            self.span_from(start),
            NodeKind::PathPatternExpression { slices },
        );
        if let Some(err) = err {
            node.set_error_if_none(err);
        }
        node
    }

    /// Scan `[start, excl_end)` into path slices, interpolations and named
    /// segments.
    pub(crate) fn parse_path_expression_slices(&mut self, start: u32, excl_end: u32) -> Vec<Node> {
        let mut slices: Vec<Node> = Vec::new();
        let mut index = start as usize;
        let excl_end = excl_end as usize;
        let mut slice_start = start as usize;
        let mut in_interpolation = false;

        while index < excl_end {
            let r = self.s[index];

            if in_interpolation {
                if r == '}' || index == excl_end - 1 {
                    let missing_closing_brace = index == excl_end - 1 && r != '}';
                    if missing_closing_brace {
                        index += 1;
                    } else {
                        self.push_token(
                            TokenKind::SingleInterpClosingBrace,
                            Span::new(index as u32, index as u32 + 1),
                        );
                    }

                    let interpolation: String =
                        self.s[slice_start..index].iter().collect();

                    if interpolation.starts_with(':') {
                        slices.push(self.named_path_segment(slice_start, index, &interpolation));
                    } else {
                        self.path_interpolation_expr(
                            &mut slices,
                            slice_start,
                            index,
                            &interpolation,
                            missing_closing_brace,
                        );
                    }
                    in_interpolation = false;
                    slice_start = index + 1;
                } else if !is_interpolation_allowed_char(r) {
                    // out-of-charset: consume the whole interpolation
                    let mut j = index;
                    while j < excl_end && self.s[j] != '}' {
                        j += 1;
                    }
                    let span = Span::new(slice_start as u32, j as u32);
                    self.tokens.push(Token::with_raw(
                        TokenKind::InvalidInterpSlice,
                        span,
                        self.slice_str(span.start, span.end),
                    ));
                    slices.push(Node::with_error(
                        span,
                        NodeKind::UnknownNode,
                        ParsingError::unspecified(errors::PATH_INTERP_LIMITED_CHARSET),
                    ));
                    if j < excl_end {
                        self.push_token(
                            TokenKind::SingleInterpClosingBrace,
                            Span::new(j as u32, j as u32 + 1),
                        );
                        j += 1;
                    }
                    in_interpolation = false;
                    slice_start = j;
                    index = j;
                    continue;
                }
            } else if r == '{' {
                self.push_token(
                    TokenKind::SingleInterpOpeningBrace,
                    Span::new(index as u32, index as u32 + 1),
                );
                let value: String = self.s[slice_start..index].iter().collect();
                slices.push(Node::new(
                    Span::new(slice_start as u32, index as u32),
                    NodeKind::PathSlice {
                        value: value.into(),
                    },
                ));
                slice_start = index + 1;
                in_interpolation = true;

                if index == self.len - 1 {
                    slices.push(Node::with_error(
                        Span::new(slice_start as u32, slice_start as u32),
                        NodeKind::PathSlice { value: "".into() },
                        ParsingError::unspecified(errors::UNTERMINATED_PATH_INTERP),
                    ));
                    return slices;
                }
            }
            index += 1;
        }

        if in_interpolation {
            slices.push(Node::with_error(
                Span::new(slice_start as u32, index as u32),
                NodeKind::PathSlice { value: "".into() },
                ParsingError::unspecified(errors::UNTERMINATED_PATH_INTERP),
            ));
        } else if slice_start != index {
            let value: String = self.s[slice_start..index].iter().collect();
            slices.push(Node::new(
                Span::new(slice_start as u32, index as u32),
                NodeKind::PathSlice {
                    value: value.into(),
                },
            ));
        }
        slices
    }

    fn named_path_segment(&mut self, slice_start: usize, end: usize, interpolation: &str) -> Node {
        let name = &interpolation[1..];
        if name.chars().any(|r| !is_ident_char(r)) {
            return Node::with_error(
                Span::new(slice_start as u32, end as u32),
                NodeKind::UnknownNode,
                ParsingError::unspecified(INVALID_NAMED_SEGMENT_COLON_SHOULD_BE_FOLLOWED_BY_A_NAME),
            );
        }
        let span = Span::new(slice_start as u32, end as u32);
        self.tokens.push(Token::with_raw(
            TokenKind::NamedPathSegment,
            span,
            interpolation,
        ));
        let mut node = Node::new(
            span,
            NodeKind::NamedPathSegment { name: name.into() },
        );
        if name.is_empty() {
            node.base.err = Some(ParsingError::unspecified(
                INVALID_NAMED_SEGMENT_COLON_SHOULD_BE_FOLLOWED_BY_A_NAME,
            ));
        }
        node
    }

    fn path_interpolation_expr(
        &mut self,
        slices: &mut Vec<Node>,
        slice_start: usize,
        end: usize,
        interpolation: &str,
        missing_closing_brace: bool,
    ) {
        let span = Span::new(slice_start as u32, end as u32);
        let (mut expr, ok) = crate::parse_expression(interpolation);
        if !ok {
            let message = if interpolation.is_empty() {
                errors::EMPTY_PATH_INTERP
            } else {
                INVALID_PATH_INTERP
            };
            self.tokens.push(Token::with_raw(
                TokenKind::InvalidInterpSlice,
                span,
                interpolation,
            ));
            slices.push(Node::with_error(
                span,
                NodeKind::UnknownNode,
                ParsingError::unspecified(message),
            ));
            return;
        }
        shift_spans(&mut expr, slice_start as i64);
        slices.push(expr);
        if missing_closing_brace {
            slices.push(Node::with_error(
                Span::new(end as u32, end as u32),
                NodeKind::PathSlice { value: "".into() },
                ParsingError::unspecified(UNTERMINATED_PATH_INTERP_MISSING_CLOSING_BRACE),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParserOptions;
    use pretty_assertions::assert_eq;

    fn parse(source: &str, is_pattern: bool) -> Node {
        let mut p = Parser::new(source, &ParserOptions::default());
        p.parse_path_like_expression(is_pattern)
    }

    #[test]
    fn absolute_and_relative_literals() {
        let node = parse("/a/b", false);
        assert!(matches!(node.kind, NodeKind::AbsolutePathLiteral { .. }));
        assert_eq!(node.span(), Span::new(0, 4));

        let node = parse("./a", false);
        assert!(matches!(node.kind, NodeKind::RelativePathLiteral { .. }));

        let node = parse("../a", false);
        assert!(matches!(node.kind, NodeKind::RelativePathLiteral { .. }));
    }

    #[test]
    fn path_expression_with_interpolation() {
        let node = parse("/a/{x}", false);
        match &node.kind {
            NodeKind::AbsolutePathExpression { slices } => {
                assert_eq!(slices.len(), 2);
                assert!(matches!(&slices[0].kind, NodeKind::PathSlice { value } if &**value == "/a/"));
                assert!(matches!(slices[1].kind, NodeKind::IdentifierLiteral { .. }));
                // interpolation spans are rebased into the outer source
                assert_eq!(slices[1].span(), Span::new(4, 5));
            }
            other => panic!("expected absolute path expression, got {other:?}"),
        }
        assert!(node.base.err.is_none());
    }

    #[test]
    fn named_segment_pattern() {
        let node = parse("%/users/{:id}", true);
        match &node.kind {
            NodeKind::NamedSegmentPathPatternLiteral { slices, .. } => {
                assert!(slices
                    .iter()
                    .any(|s| matches!(&s.kind, NodeKind::NamedPathSegment { name } if &**name == "id")));
            }
            other => panic!("expected named segment pattern, got {other:?}"),
        }
        assert!(node.base.err.is_none());
    }

    #[test]
    fn mixing_named_segments_and_interpolations_is_an_error() {
        let node = parse("%/users/{:id}/{x}", true);
        assert!(matches!(
            node.kind,
            NodeKind::NamedSegmentPathPatternLiteral { .. }
        ));
        assert!(node
            .base
            .err
            .as_ref()
            .is_some_and(|e| e.message.contains("cannot mix")));
    }

    #[test]
    fn named_segments_outside_patterns_are_an_error() {
        let node = parse("/users/{:id}", false);
        assert!(node
            .base
            .err
            .as_ref()
            .is_some_and(|e| e.message.contains("only path patterns")));
    }

    #[test]
    fn prefix_pattern_rules() {
        let node = parse("%/a/...", true);
        assert!(matches!(
            node.kind,
            NodeKind::AbsolutePathPatternLiteral { .. }
        ));
        assert!(node.base.err.is_none());

        // /... must be at the end
        let node = parse("%/a/.../b", true);
        assert!(node.base.err.is_some());

        // globbing cannot be combined with /...
        let node = parse("%/a*/...", true);
        assert!(matches!(node.kind, NodeKind::InvalidPathPattern { .. }));
    }

    #[test]
    fn unterminated_interpolation() {
        let node = parse("/a/{x", false);
        assert!(node.error_at_any_depth());
    }

    #[test]
    fn out_of_charset_interpolation() {
        let node = parse("/a/{x y}", false);
        assert!(node.error_at_any_depth());
    }
}
