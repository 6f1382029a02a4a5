//! Parsing error record and its closed kind enum.

use std::fmt;

/// Closed set of parsing error kinds.
///
/// `Unspecified` is the catch-all; the other kinds exist because a consumer
/// (formatter, language server) needs to react to them specifically.
/// A node's error is never replaced by a less specific one.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum ParsingErrorKind {
    #[default]
    Unspecified,
    UnterminatedMemberExpr,
    UnterminatedDoubleColonExpr,
    MissingBlock,
    MissingFnBody,
    MissingEqualsSignInDeclaration,
    InvalidNext,
    MissingExpr,
    ExtractionExpressionExpected,
    UnterminatedOptionExpr,
    UnterminatedParenthesizedPipeExpr,
    UnterminatedPatternUnion,
    MissingObjectPropertyValue,
    MissingObjectPatternProperty,
    UnterminatedPatternDefinition,
    UnterminatedPatternNamespaceDefinition,
    UnterminatedExtendStmt,
    UnterminatedStructDefinition,
    UnterminatedWalkStmt,
    UnterminatedWalkExpr,
    UnterminatedForExpr,
    UnterminatedSwitchStmt,
    UnterminatedMatchStmt,
    UnterminatedSwitchExpr,
    UnterminatedMatchExpr,
    UnterminatedArrow,
    UnterminatedUnquotedRegion,
}

impl ParsingErrorKind {
    /// Stable name, usable as a machine-readable tag.
    pub fn as_str(self) -> &'static str {
        match self {
            ParsingErrorKind::Unspecified => "unspecified",
            ParsingErrorKind::UnterminatedMemberExpr => "unterminated-member-expr",
            ParsingErrorKind::UnterminatedDoubleColonExpr => "unterminated-double-colon-expr",
            ParsingErrorKind::MissingBlock => "missing-block",
            ParsingErrorKind::MissingFnBody => "missing-fn-body",
            ParsingErrorKind::MissingEqualsSignInDeclaration => "missing-equals-sign-in-decl",
            ParsingErrorKind::InvalidNext => "invalid-next",
            ParsingErrorKind::MissingExpr => "missing-expr",
            ParsingErrorKind::ExtractionExpressionExpected => "extraction-expression-expected",
            ParsingErrorKind::UnterminatedOptionExpr => "unterminated-option-expr",
            ParsingErrorKind::UnterminatedParenthesizedPipeExpr => {
                "unterminated-parenthesized-pipe-expr"
            }
            ParsingErrorKind::UnterminatedPatternUnion => "unterminated-pattern-union",
            ParsingErrorKind::MissingObjectPropertyValue => "missing-object-property-value",
            ParsingErrorKind::MissingObjectPatternProperty => "missing-object-pattern-property",
            ParsingErrorKind::UnterminatedPatternDefinition => "unterminated-pattern-definition",
            ParsingErrorKind::UnterminatedPatternNamespaceDefinition => {
                "unterminated-pattern-namespace-definition"
            }
            ParsingErrorKind::UnterminatedExtendStmt => "unterminated-extend-stmt",
            ParsingErrorKind::UnterminatedStructDefinition => "unterminated-struct-definition",
            ParsingErrorKind::UnterminatedWalkStmt => "unterminated-walk-stmt",
            ParsingErrorKind::UnterminatedWalkExpr => "unterminated-walk-expr",
            ParsingErrorKind::UnterminatedForExpr => "unterminated-for-expr",
            ParsingErrorKind::UnterminatedSwitchStmt => "unterminated-switch-stmt",
            ParsingErrorKind::UnterminatedMatchStmt => "unterminated-match-stmt",
            ParsingErrorKind::UnterminatedSwitchExpr => "unterminated-switch-expr",
            ParsingErrorKind::UnterminatedMatchExpr => "unterminated-match-expr",
            ParsingErrorKind::UnterminatedArrow => "unterminated-arrow",
            ParsingErrorKind::UnterminatedUnquotedRegion => "unterminated-unquoted-region",
        }
    }
}

impl fmt::Display for ParsingErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error attached to an AST node.
///
/// At most one per node; the parser keeps the first concrete error unless a
/// more specific kind is known.
#[derive(Clone, Eq, PartialEq, Hash, Debug, thiserror::Error)]
#[error("{message}")]
pub struct ParsingError {
    pub kind: ParsingErrorKind,
    pub message: String,
}

impl ParsingError {
    pub fn new(kind: ParsingErrorKind, message: impl Into<String>) -> Self {
        ParsingError {
            kind,
            message: message.into(),
        }
    }

    /// Shorthand for an `Unspecified` error.
    pub fn unspecified(message: impl Into<String>) -> Self {
        Self::new(ParsingErrorKind::Unspecified, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn display_uses_message() {
        let err = ParsingError::new(ParsingErrorKind::MissingBlock, "missing block after if");
        assert_eq!(err.to_string(), "missing block after if");
        assert_eq!(err.kind.as_str(), "missing-block");
    }
}
