//! Diagnostic types for the Quill parser.
//!
//! Parsing errors are *values*: the parser attaches them to AST nodes and
//! keeps going. This crate holds the closed kind enum, the error record,
//! the per-chunk aggregation, and the span → line/column projection.

mod error;
mod source;

pub use error::{ParsingError, ParsingErrorKind};
pub use source::{ParsingErrorAggregation, SourceCode, SourcePositionRange};
