//! Date-like literals: `2020y-UTC`, `2020y-6mt-12d-Europe/Paris`,
//! `2020y-6mt-12d-18h-4m-Europe/Paris`, …
//!
//! A literal is validated against a closed shape, then split into
//! components. Calendar validity is checked with `chrono`; the timezone
//! location is validated lexically and kept as a string — resolution
//! against a timezone database is the host's concern.

use crate::chars::{is_alpha, is_dec_digit};
use crate::Parser;
use chrono::NaiveDate;
use quill_diagnostic::ParsingError;
use quill_ir::{Node, NodeKind, TokenKind};
use regex::Regex;
use std::sync::LazyLock;

static DATE_LIKE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(
        r"^(\d+y)(-\d{1,2}mt)?(-\d{1,2}d)?(-\d{1,2}h)?(-\d{1,2}m)?(-\d{1,2}s)?(-\d{1,3}ms)?(-\d{1,3}us)?(-[a-zA-Z_/]+[a-zA-Z_])$",
    )
    .unwrap()
});

const UNTERMINATED_DATE_LIKE_LITERAL: &str = "unterminated date-like literal";
const INVALID_DATE_LIKE_LITERAL: &str = "invalid date-like literal";
const MISSING_LOCATION: &str = "invalid date-like literal: missing location, example: 2020y-UTC";
const MISSING_MONTH: &str = "invalid date literal: missing month component";
const MISSING_DAY: &str = "invalid date literal: missing day component";
const MISSING_MONTH_AND_DAY: &str = "invalid datetime literal: missing month and day components";
const INVALID_MONTH_OR_DAY: &str = "invalid date-like literal: invalid month or day value";

#[derive(Default)]
struct DateComponents {
    year: i32,
    month: Option<u32>,
    day: Option<u32>,
    hour: Option<u32>,
    minute: Option<u32>,
    second: Option<u32>,
    millisecond: Option<u32>,
    microsecond: Option<u32>,
    location: String,
}

fn split_components(raw: &str) -> DateComponents {
    let mut c = DateComponents::default();
    let parts: Vec<&str> = raw.split('-').collect();
    c.year = parts[0]
        .trim_end_matches('y')
        .parse()
        .unwrap_or_default();
    c.location = (*parts.last().unwrap_or(&"")).to_string();
    for part in &parts[1..parts.len().saturating_sub(1)] {
        let digits = |suffix_len: usize| part[..part.len() - suffix_len].parse::<u32>().ok();
        if part.ends_with("mt") {
            c.month = digits(2);
        } else if part.ends_with("ms") {
            c.millisecond = digits(2);
        } else if part.ends_with("us") {
            c.microsecond = digits(2);
        } else if part.ends_with('d') {
            c.day = digits(1);
        } else if part.ends_with('h') {
            c.hour = digits(1);
        } else if part.ends_with('m') {
            c.minute = digits(1);
        } else if part.ends_with('s') {
            c.second = digits(1);
        }
    }
    c
}

impl Parser {
    /// Parse a date-like literal. `start` is the index of the first digit;
    /// the cursor sits on the `y` unit.
    pub(crate) fn parse_date_like_literal(&mut self, start: u32) -> Node {
        self.i += 1; // 'y'

        if self.eof() {
            return self.date_like_error_node(start, UNTERMINATED_DATE_LIKE_LITERAL);
        }
        if self.cur_is('-') {
            self.i += 1;
            if self.eof() {
                return self.date_like_error_node(start, UNTERMINATED_DATE_LIKE_LITERAL);
            }
        }

        while self
            .cur()
            .is_some_and(|r| is_alpha(r) || is_dec_digit(r) || matches!(r, '-' | '/' | '_'))
        {
            self.i += 1;
        }

        let raw = self.slice_str(start, self.pos());
        self.push_raw_token(TokenKind::DateLikeLiteral, self.span_from(start));

        if !DATE_LIKE_REGEX.is_match(&raw) {
            // estimate what was intended and pick the most helpful error
            let message = if !raw.contains('-')
                || raw
                    .rsplit('-')
                    .next()
                    .is_some_and(|last| last.chars().all(|r| is_dec_digit(r) || is_alpha(r))
                        && last.chars().next().is_some_and(is_dec_digit))
            {
                MISSING_LOCATION
            } else {
                INVALID_DATE_LIKE_LITERAL
            };
            return self.date_like_error_node(start, message);
        }

        let c = split_components(&raw);
        let has_time = c.hour.is_some()
            || c.minute.is_some()
            || c.second.is_some()
            || c.millisecond.is_some()
            || c.microsecond.is_some();

        // year-only literal: 2020y-UTC
        if c.month.is_none() && c.day.is_none() && !has_time {
            return Node::new(
                self.span_from(start),
                NodeKind::YearLiteral {
                    year: c.year,
                    location: c.location.into(),
                    raw: raw.into(),
                },
            );
        }

        let message = match (c.month, c.day) {
            (None, None) => Some(MISSING_MONTH_AND_DAY),
            (None, Some(_)) => Some(MISSING_MONTH),
            (Some(_), None) => Some(MISSING_DAY),
            (Some(month), Some(day)) => {
                NaiveDate::from_ymd_opt(c.year, month, day)
                    .is_none()
                    .then_some(INVALID_MONTH_OR_DAY)
            }
        };
        if let Some(message) = message {
            return self.date_like_error_node(start, message);
        }

        let (month, day) = (c.month.unwrap_or(1), c.day.unwrap_or(1));
        if !has_time {
            return Node::new(
                self.span_from(start),
                NodeKind::DateLiteral {
                    year: c.year,
                    month,
                    day,
                    location: c.location.into(),
                    raw: raw.into(),
                },
            );
        }

        Node::new(
            self.span_from(start),
            NodeKind::DateTimeLiteral {
                year: c.year,
                month,
                day,
                hour: c.hour.unwrap_or(0),
                minute: c.minute.unwrap_or(0),
                second: c.second.unwrap_or(0),
                millisecond: c.millisecond.unwrap_or(0),
                microsecond: c.microsecond.unwrap_or(0),
                location: c.location.into(),
                raw: raw.into(),
            },
        )
    }

    fn date_like_error_node(&self, start: u32, message: &str) -> Node {
        let raw = self.slice_str(start, self.pos());
        Node::with_error(
            self.span_from(start),
            NodeKind::DateLiteral {
                year: 0,
                month: 1,
                day: 1,
                location: "".into(),
                raw: raw.into(),
            },
            ParsingError::unspecified(message),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParserOptions;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> Node {
        let mut p = Parser::new(source, &ParserOptions::default());
        // position the cursor on the 'y' like the quantity parser does
        while p.cur().is_some_and(is_dec_digit) {
            p.i += 1;
        }
        let node = p.parse_date_like_literal(0);
        assert!(p.eof(), "date parser should consume the whole literal");
        node
    }

    #[test]
    fn year_literal() {
        let node = parse("2020y-UTC");
        match &node.kind {
            NodeKind::YearLiteral { year, location, .. } => {
                assert_eq!(*year, 2020);
                assert_eq!(&**location, "UTC");
            }
            other => panic!("expected year literal, got {other:?}"),
        }
    }

    #[test]
    fn date_literal() {
        let node = parse("2020y-6mt-12d-Europe/Paris");
        match &node.kind {
            NodeKind::DateLiteral {
                year,
                month,
                day,
                location,
                ..
            } => {
                assert_eq!((*year, *month, *day), (2020, 6, 12));
                assert_eq!(&**location, "Europe/Paris");
            }
            other => panic!("expected date literal, got {other:?}"),
        }
        assert!(node.base.err.is_none());
    }

    #[test]
    fn datetime_literal() {
        let node = parse("2020y-6mt-12d-18h-4m-30s-5ms-Europe/Paris");
        match &node.kind {
            NodeKind::DateTimeLiteral {
                hour,
                minute,
                second,
                millisecond,
                ..
            } => {
                assert_eq!((*hour, *minute, *second, *millisecond), (18, 4, 30, 5));
            }
            other => panic!("expected datetime literal, got {other:?}"),
        }
        assert!(node.base.err.is_none());
    }

    #[test]
    fn missing_location() {
        let node = parse("2020y-6mt-12d");
        assert!(node
            .base
            .err
            .as_ref()
            .is_some_and(|e| e.message.contains("missing location")));
    }

    #[test]
    fn missing_month() {
        let node = parse("2020y-12d-UTC");
        assert!(node
            .base
            .err
            .as_ref()
            .is_some_and(|e| e.message.contains("missing month")));
    }

    #[test]
    fn missing_month_and_day_in_datetime() {
        let node = parse("2020y-18h-5m-UTC");
        assert!(node
            .base
            .err
            .as_ref()
            .is_some_and(|e| e.message.contains("missing month and day")));
    }

    #[test]
    fn invalid_day() {
        let node = parse("2020y-2mt-31d-UTC");
        assert!(node
            .base
            .err
            .as_ref()
            .is_some_and(|e| e.message.contains("invalid month or day")));
    }
}
