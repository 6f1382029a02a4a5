//! Error-recovering recursive descent parser for Quill.
//!
//! The parser holds the whole source as a rune buffer and descends over it
//! directly — tokenisation is a side effect of parsing, because most Quill
//! tokens (paths, URLs, quantities, markup text) are context dependent.
//!
//! Every parsing routine returns a node; on failure it returns a
//! best-effort node with an error attached and the parse continues. The
//! only fatal path is cancellation/timeout, which unwinds with a typed
//! panic caught at the public entry points.

mod chars;
mod eaters;
mod errors;
mod grammar;

use quill_diagnostic::{ParsingError, ParsingErrorAggregation, SourceCode};
use quill_ir::{walk, Node, NodeKind, Span, Token, TraversalAction};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Maximum source size in bytes.
pub const MAX_SOURCE_BYTE_LEN: usize = 1 << 24;
/// Maximum object key length in bytes.
pub const MAX_OBJECT_KEY_BYTE_LEN: usize = 64;
/// Default number of consumed runes between cancellation checks.
pub const DEFAULT_NO_CHECK_FUEL: u32 = 10;
/// Default parse timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(20);

/// Cheap cloneable cancellation handle.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Optional hyperscript sub-parser, invoked on `{ … }` attribute
/// shorthands in markup.
pub trait HyperscriptParser: Send + Sync {
    fn parse(&self, source: &str)
        -> Result<quill_ir::HyperscriptParsingResult, ParsingError>;
}

/// Parser options.
#[derive(Clone)]
pub struct ParserOptions {
    /// Number of consumed runes between cancellation checks.
    pub no_check_fuel: u32,
    /// Upper bound on the whole parse.
    pub timeout: Duration,
    /// External cancellation; non-cancellable by default.
    pub token: CancellationToken,
    /// Stop after the chunk start (includable-chunk description, manifest
    /// or global constant declarations).
    pub start: bool,
    pub hyperscript: Option<Arc<dyn HyperscriptParser>>,
}

impl Default for ParserOptions {
    fn default() -> Self {
        ParserOptions {
            no_check_fuel: DEFAULT_NO_CHECK_FUEL,
            timeout: DEFAULT_TIMEOUT,
            token: CancellationToken::new(),
            start: false,
            hyperscript: None,
        }
    }
}

impl std::fmt::Debug for ParserOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParserOptions")
            .field("no_check_fuel", &self.no_check_fuel)
            .field("timeout", &self.timeout)
            .field("start", &self.start)
            .field("hyperscript", &self.hyperscript.is_some())
            .finish()
    }
}

/// Typed payload used to unwind on cancellation or timeout.
struct CancellationPanic {
    message: &'static str,
}

/// Parser state.
///
/// `s` is the rune buffer, `i` the cursor. All grammar routines live in
/// `impl Parser` blocks spread over the `grammar` modules.
pub struct Parser {
    pub(crate) s: Vec<char>,
    pub(crate) i: usize,
    pub(crate) len: usize,
    pub(crate) tokens: Vec<Token>,
    /// Pattern context: identifiers, calls and literals are interpreted
    /// as pattern constructs.
    pub(crate) in_pattern: bool,
    /// Inside `@(…)` / `@{…}`.
    pub(crate) in_quoted_region: bool,
    /// Inside `<{…}>`.
    pub(crate) in_unquoted_region: bool,
    pub(crate) only_chunk_start: bool,
    pub(crate) hyperscript: Option<Arc<dyn HyperscriptParser>>,
    no_check_fuel: u32,
    fuel: u32,
    deadline: Instant,
    token: CancellationToken,
}

impl Parser {
    fn new(source: &str, options: &ParserOptions) -> Self {
        let s: Vec<char> = source.chars().collect();
        let len = s.len();
        let no_check_fuel = options.no_check_fuel.max(1);
        Parser {
            s,
            i: 0,
            len,
            tokens: Vec::new(),
            in_pattern: false,
            in_quoted_region: false,
            in_unquoted_region: false,
            only_chunk_start: options.start,
            hyperscript: options.hyperscript.clone(),
            no_check_fuel,
            fuel: no_check_fuel,
            deadline: Instant::now() + options.timeout,
            token: options.token.clone(),
        }
    }

    /// Cancellation check; called by every parsing routine. Burns one fuel
    /// unit, and every `no_check_fuel` units checks the token and the
    /// deadline, unwinding with a typed panic when either fired.
    pub(crate) fn check_cancellation(&mut self) {
        self.fuel -= 1;
        if self.fuel > 0 {
            return;
        }
        self.fuel = self.no_check_fuel;
        if self.token.is_cancelled() {
            panic::panic_any(CancellationPanic {
                message: "parsing cancelled",
            });
        }
        if Instant::now() >= self.deadline {
            panic::panic_any(CancellationPanic {
                message: "parsing timed out",
            });
        }
    }

    // ----- low-level rune access -----

    #[inline]
    pub(crate) fn at(&self, i: usize) -> Option<char> {
        self.s.get(i).copied()
    }

    #[inline]
    pub(crate) fn cur(&self) -> Option<char> {
        self.at(self.i)
    }

    /// Rune at `i + offset`.
    #[inline]
    pub(crate) fn peek(&self, offset: usize) -> Option<char> {
        self.at(self.i + offset)
    }

    #[inline]
    pub(crate) fn cur_is(&self, r: char) -> bool {
        self.cur() == Some(r)
    }

    #[inline]
    pub(crate) fn peek_is(&self, offset: usize, r: char) -> bool {
        self.peek(offset) == Some(r)
    }

    #[inline]
    pub(crate) fn eof(&self) -> bool {
        self.i >= self.len
    }

    #[inline]
    pub(crate) fn pos(&self) -> u32 {
        self.i as u32
    }

    pub(crate) fn slice_str(&self, start: u32, end: u32) -> String {
        self.s[start as usize..(end as usize).min(self.len)]
            .iter()
            .collect()
    }

    /// Span from `start` to the cursor.
    #[inline]
    pub(crate) fn span_from(&self, start: u32) -> Span {
        Span::new(start, self.pos())
    }

    // ----- token buffer -----

    pub(crate) fn push_token(&mut self, kind: quill_ir::TokenKind, span: Span) {
        self.tokens.push(Token::new(kind, span));
    }

    pub(crate) fn push_raw_token(&mut self, kind: quill_ir::TokenKind, span: Span) {
        let raw = self.slice_str(span.start, span.end);
        self.tokens.push(Token::with_raw(kind, span, raw));
    }

    // ----- common nodes -----

    pub(crate) fn missing_expression(&mut self, two_spaces_behind: bool) -> Node {
        let start = if two_spaces_behind && self.i > 0 {
            self.pos() - 1
        } else {
            self.pos()
        };
        Node::with_error(
            Span::new(start, start + 1),
            NodeKind::MissingExpression,
            ParsingError::new(
                quill_diagnostic::ParsingErrorKind::MissingExpr,
                errors::fmt_expr_expected_here(&self.s, self.i),
            ),
        )
    }
}

fn catch_cancellation<T>(
    f: impl FnOnce() -> T,
    on_cancel: impl FnOnce(&'static str) -> T,
) -> T {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => value,
        Err(payload) => match payload.downcast::<CancellationPanic>() {
            Ok(cancel) => on_cancel(cancel.message),
            Err(other) => panic::resume_unwind(other),
        },
    }
}

fn empty_chunk(span: Span, err: ParsingError) -> Node {
    Node::with_error(
        span,
        NodeKind::Chunk {
            global_constant_declarations: None,
            includable_chunk_desc: None,
            preinit: None,
            manifest: None,
            statements: vec![],
        },
        err,
    )
}

/// Full parse of one source file.
///
/// The returned chunk's `err` may be set (oversized source, cancellation)
/// but its subtree is always complete: syntax errors live on inner nodes,
/// never abort the parse. The token buffer is returned alongside.
pub fn parse_chunk(source: &str, options: &ParserOptions) -> (Node, Vec<Token>) {
    let span_end = source.chars().count() as u32;
    if source.len() > MAX_SOURCE_BYTE_LEN || source.chars().count() > i32::MAX as usize {
        return (
            empty_chunk(
                Span::new(0, 0),
                ParsingError::unspecified(format!(
                    "source code is too long ({} bytes)",
                    source.len()
                )),
            ),
            vec![],
        );
    }
    if options.token.is_cancelled() {
        return (
            empty_chunk(Span::new(0, span_end), ParsingError::unspecified("parsing cancelled")),
            vec![],
        );
    }

    catch_cancellation(
        || {
            let mut p = Parser::new(source, options);
            let chunk = p.parse_chunk_inner();
            let mut tokens = p.tokens;
            quill_ir::sort_tokens_by_span(&mut tokens);
            (chunk, tokens)
        },
        |message| {
            (
                empty_chunk(Span::new(0, span_end), ParsingError::unspecified(message)),
                vec![],
            )
        },
    )
}

/// Collect all node errors of a parsed chunk against its source.
pub fn aggregate_errors(chunk: &Node, source: &SourceCode) -> Option<ParsingErrorAggregation> {
    let mut collected = Vec::new();
    walk(chunk, &mut |node, _, _| {
        if let Some(err) = &node.base.err {
            collected.push((err.clone(), node.span().start, node.span().end));
        }
        TraversalAction::Continue
    });
    if collected.is_empty() {
        return None;
    }
    Some(ParsingErrorAggregation::new(source, collected))
}

fn parse_single(
    source: &str,
    f: impl FnOnce(&mut Parser) -> Node,
) -> (Node, bool) {
    let options = ParserOptions::default();
    catch_cancellation(
        || {
            let mut p = Parser::new(source, &options);
            let node = f(&mut p);
            let consumed_all = p.eof();
            let ok = consumed_all && !node.error_at_any_depth();
            (node, ok)
        },
        |message| {
            (
                empty_chunk(Span::new(0, 0), ParsingError::unspecified(message)),
                false,
            )
        },
    )
}

/// Parse a single expression. `ok` iff the whole input was consumed and no
/// error exists anywhere in the result.
pub fn parse_expression(source: &str) -> (Node, bool) {
    parse_single(source, |p| p.parse_expression_inner(false).0)
}

/// Parse the first expression of the input; trailing input is allowed.
pub fn parse_first_expression(source: &str) -> (Node, bool) {
    let options = ParserOptions::default();
    catch_cancellation(
        || {
            let mut p = Parser::new(source, &options);
            let node = p.parse_expression_inner(false).0;
            let ok = !node.error_at_any_depth();
            (node, ok)
        },
        |message| {
            (
                empty_chunk(Span::new(0, 0), ParsingError::unspecified(message)),
                false,
            )
        },
    )
}

/// Parse a path literal or expression with the consume-all contract.
pub fn parse_path(source: &str) -> (Node, bool) {
    parse_single(source, |p| p.parse_path_like_expression(false))
}

/// Parse a path pattern with the consume-all contract.
pub fn parse_path_pattern(source: &str) -> (Node, bool) {
    parse_single(source, |p| p.parse_path_like_expression(true))
}

/// Parse a URL-like (scheme, host, URL, or their expression forms) with
/// the consume-all contract.
pub fn parse_url(source: &str) -> (Node, bool) {
    parse_single(source, |p| {
        let start = p.pos();
        // skip the scheme name, parse_url_like expects the cursor on `:`
        while !p.eof() && p.cur().is_some_and(chars::is_ident_char) {
            p.i += 1;
        }
        p.parse_url_like(start)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_ir::NodeKind;

    fn chunk_statements(source: &str) -> Node {
        let (chunk, _) = parse_chunk(source, &ParserOptions::default());
        chunk
    }

    #[test]
    fn empty_source_gives_empty_chunk() {
        let chunk = chunk_statements("");
        assert!(matches!(chunk.kind, NodeKind::Chunk { .. }));
        assert_eq!(chunk.span(), Span::new(0, 0));
        assert!(chunk.base.err.is_none());
    }

    #[test]
    fn oversized_source_is_rejected() {
        let big = "a".repeat(MAX_SOURCE_BYTE_LEN + 1);
        let (chunk, tokens) = parse_chunk(&big, &ParserOptions::default());
        assert!(chunk.base.err.is_some());
        assert!(tokens.is_empty());
    }

    #[test]
    fn cancelled_token_short_circuits() {
        let token = CancellationToken::new();
        token.cancel();
        let options = ParserOptions {
            token,
            ..ParserOptions::default()
        };
        let (chunk, _) = parse_chunk("a = 1", &options);
        assert!(chunk.base.err.is_some());
    }

    #[test]
    fn parse_expression_consume_all_contract() {
        let (node, ok) = parse_expression("1");
        assert!(ok);
        assert!(matches!(node.kind, NodeKind::IntLiteral { value: 1, .. }));

        let (_, ok) = parse_expression("1 2");
        assert!(!ok, "trailing input must not be ok");

        let (node, ok) = parse_first_expression("1 2");
        assert!(ok);
        assert!(matches!(node.kind, NodeKind::IntLiteral { value: 1, .. }));
    }

    #[test]
    fn tokens_are_sorted_by_span() {
        let (_, tokens) = parse_chunk("a = (1 + 2)\n", &ParserOptions::default());
        let mut sorted = tokens.clone();
        quill_ir::sort_tokens_by_span(&mut sorted);
        assert_eq!(tokens, sorted);
        assert!(!tokens.is_empty());
    }
}
