//! Span → line/column projection and per-chunk error aggregation.

use crate::ParsingError;
use std::fmt;

/// A (line, column) projection of a span. Lines and columns are 1-based,
/// measured in runes.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct SourcePositionRange {
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
    pub span_start: u32,
    pub span_end: u32,
}

impl fmt::Display for SourcePositionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start_line, self.start_column)
    }
}

/// A named source buffer with a lazily built line table.
///
/// The parser works on rune offsets; this type is how consumers map spans
/// back to editor positions.
pub struct SourceCode {
    name: String,
    runes: Vec<char>,
    /// Rune offset of the first character of each line.
    line_starts: Vec<u32>,
}

impl SourceCode {
    pub fn new(name: impl Into<String>, source: &str) -> Self {
        let runes: Vec<char> = source.chars().collect();
        let mut line_starts = vec![0u32];
        for (idx, r) in runes.iter().enumerate() {
            if *r == '\n' {
                line_starts.push(idx as u32 + 1);
            }
        }
        SourceCode {
            name: name.into(),
            runes,
            line_starts,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn runes(&self) -> &[char] {
        &self.runes
    }

    pub fn len(&self) -> u32 {
        self.runes.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.runes.is_empty()
    }

    /// 1-based (line, column) of a rune offset. Offsets past the end clamp
    /// to the position just after the last rune.
    pub fn position(&self, offset: u32) -> (u32, u32) {
        let offset = offset.min(self.len());
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        let column = offset - self.line_starts[line_idx] + 1;
        (line_idx as u32 + 1, column)
    }

    pub fn position_range(&self, span_start: u32, span_end: u32) -> SourcePositionRange {
        let (start_line, start_column) = self.position(span_start);
        let (end_line, end_column) = self.position(span_end);
        SourcePositionRange {
            start_line,
            start_column,
            end_line,
            end_column,
            span_start,
            span_end,
        }
    }
}

/// All parsing errors of one chunk, with their positions, plus a combined
/// message for display.
#[derive(Clone, Eq, PartialEq, Debug, Default, thiserror::Error)]
#[error("{message}")]
pub struct ParsingErrorAggregation {
    pub message: String,
    pub errors: Vec<ParsingError>,
    pub error_positions: Vec<SourcePositionRange>,
}

impl ParsingErrorAggregation {
    /// Collect `(error, span)` pairs into an aggregation against a source.
    pub fn new(source: &SourceCode, errors: Vec<(ParsingError, u32, u32)>) -> Self {
        let mut aggregation = ParsingErrorAggregation::default();
        for (err, start, end) in errors {
            let pos = source.position_range(start, end);
            if !aggregation.message.is_empty() {
                aggregation.message.push('\n');
            }
            aggregation
                .message
                .push_str(&format!("{}:{}: {}", source.name(), pos, err.message));
            aggregation.errors.push(err);
            aggregation.error_positions.push(pos);
        }
        aggregation
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn positions_are_one_based() {
        let src = SourceCode::new("test.ql", "ab\ncd\n");
        assert_eq!(src.position(0), (1, 1));
        assert_eq!(src.position(1), (1, 2));
        assert_eq!(src.position(3), (2, 1));
        assert_eq!(src.position(4), (2, 2));
        // offset just after the trailing newline
        assert_eq!(src.position(6), (3, 1));
    }

    #[test]
    fn position_of_newline_is_end_of_line() {
        let src = SourceCode::new("test.ql", "ab\ncd");
        assert_eq!(src.position(2), (1, 3));
    }

    #[test]
    fn aggregation_message_lists_positions() {
        let src = SourceCode::new("mod.ql", "x =\ny");
        let agg = ParsingErrorAggregation::new(
            &src,
            vec![(ParsingError::unspecified("unexpected char"), 4, 5)],
        );
        assert_eq!(agg.errors.len(), 1);
        assert_eq!(agg.error_positions[0].start_line, 2);
        assert!(agg.message.contains("mod.ql:2:1"));
    }
}
