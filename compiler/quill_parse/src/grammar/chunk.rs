//! Top-level chunks and modules: global constants, includable-chunk
//! descriptions, preinit, manifest, embedded modules, imports and spawn
//! expressions.

use crate::chars::{is_closing_delim, is_forbidden_space_char};
use crate::errors;
use crate::Parser;
use quill_diagnostic::{ParsingError, ParsingErrorKind};
use quill_ir::{Node, NodeKind, Span, Token, TokenKind};

/// Extension of importable source files.
pub const SOURCE_FILE_EXTENSION: &str = ".ql";

const PREINIT_SHOULD_BE_FOLLOWED_BY_A_BLOCK: &str =
    "the 'preinit' keyword should be followed by a block";
const INVALID_MANIFEST_DESC_VALUE: &str =
    "invalid manifest description value, an object is expected";
const UNTERMINATED_EMBEDDED_MODULE: &str =
    "unterminated embedded module: missing closing brace '}'";
const SPAWN_EXPR_MISSING_DO: &str =
    "invalid spawn expression: 'go' should be followed by 'do'";
const SPAWN_EXPR_INVALID_EMBEDDED: &str =
    "invalid spawn expression: 'do' should be followed by an embedded module or a simple call";
const IMPORT_MISSING_SOURCE: &str = "invalid import statement: missing source";
const IMPORT_MISSING_CONFIG: &str =
    "invalid import statement: missing configuration object";
const CONST_DECL_LHS_MUST_BE_IDENT: &str =
    "the left side of a global constant declaration must be an identifier";

impl Parser {
    /// Full chunk parse; never fails structurally.
    pub(crate) fn parse_chunk_inner(&mut self) -> Node {
        self.check_cancellation();

        let chunk_span = Span::new(0, self.len as u32);

        // shebang
        if self.cur_is('#') && self.peek_is(1, '!') {
            while !self.eof() && !self.cur_is('\n') {
                self.i += 1;
            }
        }

        self.eat_space_newline_semicolon_comment();
        let includable_chunk_desc = self.parse_includable_chunk_desc_if_present();

        // with the `start` option the parse stops after the first of:
        // includable-chunk description, global constants, manifest
        let stop_early = |p: &Parser, found: bool| p.only_chunk_start && found;

        let mut global_constant_declarations = None;
        let mut preinit = None;
        let mut manifest = None;

        if !stop_early(self, includable_chunk_desc.is_some()) {
            self.eat_space_newline_semicolon_comment();
            global_constant_declarations = self.parse_global_constant_declarations();

            if includable_chunk_desc.is_none()
                && !stop_early(self, global_constant_declarations.is_some())
            {
                self.eat_space_newline_semicolon_comment();
                preinit = self.parse_preinit_if_present();

                self.eat_space_newline_semicolon_comment();
                manifest = self.parse_manifest_if_present();
            }
        }

        let mut statements = Vec::new();

        if !self.only_chunk_start {
            self.eat_space_newline_semicolon_comment();

            let mut prev_stmt_end: Option<u32> = None;
            let mut prev_stmt_err_invalid_next = false;

            while !self.eof() {
                #[allow(clippy::unwrap_used)] // non-eof checked by loop condition
                let r = self.cur().unwrap();
                if is_forbidden_space_char(r) {
                    self.tokens.push(Token::with_raw(
                        TokenKind::UnexpectedChar,
                        Span::new(self.pos(), self.pos() + 1),
                        r.to_string(),
                    ));
                    statements.push(Node::with_error(
                        Span::new(self.pos(), self.pos() + 1),
                        NodeKind::UnknownNode,
                        ParsingError::unspecified(errors::fmt_unexpected_char_in(
                            r,
                            "block or module",
                        )),
                    ));
                    self.i += 1;
                    self.eat_space_newline_semicolon_comment();
                    continue;
                }

                // region header on its own line
                if self.cur_is('@') && self.peek_is(1, '\'') {
                    statements.push(self.parse_annotated_region_header());
                    self.eat_space_newline_semicolon_comment();
                    continue;
                }

                let missing_separation = prev_stmt_end == Some(self.pos())
                    && !prev_stmt_err_invalid_next
                    && self
                        .at(self.i.wrapping_sub(1))
                        .is_some_and(|prev| !prev.is_whitespace());

                let annotations = self.parse_metadata_annotations();
                let mut stmt = self.parse_statement();
                prev_stmt_end = Some(self.pos());
                prev_stmt_err_invalid_next = stmt
                    .base
                    .err
                    .as_ref()
                    .is_some_and(|e| e.kind == ParsingErrorKind::InvalidNext);

                if let Some(missing_stmt) = self.attach_annotations(annotations, &mut stmt) {
                    statements.push(missing_stmt);
                }

                let is_missing = matches!(stmt.kind, NodeKind::MissingExpression);
                if missing_separation {
                    stmt.set_error_if_none(ParsingError::unspecified(
                        errors::STMTS_SHOULD_BE_SEPARATED_BY,
                    ));
                }
                statements.push(stmt);
                if is_missing {
                    break;
                }

                self.eat_space_newline_semicolon_comment();
            }
        }

        Node::new(
            chunk_span,
            NodeKind::Chunk {
                global_constant_declarations: global_constant_declarations.map(Box::new),
                includable_chunk_desc: includable_chunk_desc.map(Box::new),
                preinit: preinit.map(Box::new),
                manifest: manifest.map(Box::new),
                statements,
            },
        )
    }

    /// `includable-chunk` marker of includable files.
    fn parse_includable_chunk_desc_if_present(&mut self) -> Option<Node> {
        if !self.keyword_ahead("includable-chunk") {
            return None;
        }
        let start = self.pos();
        self.push_token(
            TokenKind::IncludableChunk,
            Span::new(start, start + "includable-chunk".len() as u32),
        );
        self.i += "includable-chunk".len();
        Some(Node::new(
            self.span_from(start),
            NodeKind::IncludableChunkDescription,
        ))
    }

    /// `preinit { … }`.
    fn parse_preinit_if_present(&mut self) -> Option<Node> {
        if !self.keyword_ahead("preinit") {
            return None;
        }
        let start = self.pos();
        let keyword = Node::new(
            Span::new(start, start + "preinit".len() as u32),
            NodeKind::IdentifierLiteral {
                name: "preinit".into(),
            },
        );
        self.i += "preinit".len();
        Some(self.parse_preinit_statement(keyword))
    }

    pub(crate) fn parse_preinit_statement(&mut self, keyword: Node) -> Node {
        let start = keyword.span().start;
        self.push_token(TokenKind::Preinit, keyword.span());
        self.eat_space();

        if !self.cur_is('{') {
            return Node::with_error(
                self.span_from(start),
                NodeKind::PreinitStatement { block: None },
                ParsingError::new(
                    ParsingErrorKind::MissingBlock,
                    PREINIT_SHOULD_BE_FOLLOWED_BY_A_BLOCK,
                ),
            );
        }
        let block = self.parse_block();
        Node::new(
            self.span_from(start),
            NodeKind::PreinitStatement {
                block: Some(Box::new(block)),
            },
        )
    }

    /// `manifest { … }`.
    pub(crate) fn parse_manifest_if_present(&mut self) -> Option<Node> {
        if !self.keyword_ahead("manifest") {
            return None;
        }
        let start = self.pos();
        self.push_token(
            TokenKind::Manifest,
            Span::new(start, start + "manifest".len() as u32),
        );
        self.i += "manifest".len();
        self.eat_space();

        if !self.cur_is('{') {
            return Some(Node::with_error(
                self.span_from(start),
                NodeKind::Manifest { object: None },
                ParsingError::unspecified(INVALID_MANIFEST_DESC_VALUE),
            ));
        }

        let object = self.parse_object_or_record_literal(false);
        Some(Node::new(
            self.span_from(start),
            NodeKind::Manifest {
                object: Some(Box::new(object)),
            },
        ))
    }

    /// `const name = value` or `const ( … )` group.
    pub(crate) fn parse_global_constant_declarations(&mut self) -> Option<Node> {
        if !self.keyword_ahead("const") {
            return None;
        }
        let start = self.pos();
        self.push_token(TokenKind::Const, Span::new(start, start + 5));
        self.i += 5;
        self.eat_space();

        let mut declarations = Vec::new();
        let mut err = None;

        if self.cur_is('(') {
            self.push_token(
                TokenKind::OpeningParenthesis,
                Span::new(self.pos(), self.pos() + 1),
            );
            self.i += 1;
            self.eat_space_newline_comment();

            while !self.eof() && !self.cur_is(')') {
                declarations.push(self.parse_single_global_constant_declaration());
                self.eat_space_newline_comment();
            }

            if self.cur_is(')') {
                self.push_token(
                    TokenKind::ClosingParenthesis,
                    Span::new(self.pos(), self.pos() + 1),
                );
                self.i += 1;
            } else {
                err = Some(ParsingError::unspecified(
                    "unterminated global constant declarations: missing closing parenthesis",
                ));
            }
        } else {
            declarations.push(self.parse_single_global_constant_declaration());
        }

        let mut node = Node::new(
            self.span_from(start),
            NodeKind::GlobalConstantDeclarations { declarations },
        );
        if let Some(err) = err {
            node.base.err = Some(err);
        }
        Some(node)
    }

    fn parse_single_global_constant_declaration(&mut self) -> Node {
        let decl_start = self.pos();
        let (left, is_missing) = self.parse_expression_inner(false);
        if is_missing && !self.eof() {
            // consume the offending rune so declaration groups progress
            self.i += 1;
        }

        let mut err = None;
        if !matches!(left.kind, NodeKind::IdentifierLiteral { .. }) {
            err = Some(ParsingError::unspecified(CONST_DECL_LHS_MUST_BE_IDENT));
        }
        self.eat_space();

        if !self.cur_is('=') {
            let name = match &left.kind {
                NodeKind::IdentifierLiteral { name } => name.to_string(),
                _ => "?".to_string(),
            };
            return Node::with_error(
                self.span_from(decl_start),
                NodeKind::GlobalConstantDeclaration {
                    left: Box::new(left),
                    right: None,
                },
                err.unwrap_or_else(|| {
                    ParsingError::new(
                        ParsingErrorKind::MissingEqualsSignInDeclaration,
                        format!(
                            "invalid global const declaration, missing '=' sign after name {name}"
                        ),
                    )
                }),
            );
        }
        self.push_token(TokenKind::Equal, Span::new(self.pos(), self.pos() + 1));
        self.i += 1;
        self.eat_space();

        let (right, _) = self.parse_expression_inner(false);
        let mut node = Node::new(
            self.span_from(decl_start),
            NodeKind::GlobalConstantDeclaration {
                left: Box::new(left),
                right: Some(Box::new(right)),
            },
        );
        if let Some(err) = err {
            node.base.err = Some(err);
        }
        node
    }

    /// `{ [manifest …] statements… }` nested module, used by spawn and
    /// test expressions.
    pub(crate) fn parse_embedded_module(&mut self) -> Node {
        self.check_cancellation();

        let start = self.pos();
        self.push_token(TokenKind::OpeningCurlyBracket, Span::new(start, start + 1));
        self.i += 1;

        self.eat_space_newline_semicolon_comment();
        let manifest = self.parse_manifest_if_present();

        let mut statements = Vec::new();
        self.eat_space_newline_semicolon_comment();

        while !self.eof() && !self.cur().is_some_and(is_closing_delim) {
            let stmt = self.parse_statement();
            let is_missing = matches!(stmt.kind, NodeKind::MissingExpression);
            statements.push(stmt);
            if is_missing {
                break;
            }
            self.eat_space_newline_semicolon_comment();
        }

        let mut err = None;
        if self.cur_is('}') {
            self.push_token(
                TokenKind::ClosingCurlyBracket,
                Span::new(self.pos(), self.pos() + 1),
            );
            self.i += 1;
        } else {
            err = Some(ParsingError::unspecified(UNTERMINATED_EMBEDDED_MODULE));
        }

        let mut node = Node::new(
            self.span_from(start),
            NodeKind::EmbeddedModule {
                manifest: manifest.map(Box::new),
                statements,
                single_call_expr: false,
            },
        );
        if let Some(err) = err {
            node.base.err = Some(err);
        }
        node
    }

    /// `go [meta] do { … }` / `go [meta] do f()`.
    pub(crate) fn parse_spawn_expression(&mut self, go_ident: Node) -> Node {
        let start = go_ident.span().start;
        self.push_token(TokenKind::Go, go_ident.span());
        self.eat_space();

        // optional meta value before 'do'
        let mut meta = None;
        if !self.keyword_ahead("do") && !self.eof() {
            let (meta_value, is_missing) = self.parse_expression_inner(false);
            if !is_missing {
                meta = Some(Box::new(meta_value));
            }
            self.eat_space();
        }

        if !self.keyword_ahead("do") {
            return Node::with_error(
                self.span_from(start),
                NodeKind::SpawnExpression { meta, module: None },
                ParsingError::unspecified(SPAWN_EXPR_MISSING_DO),
            );
        }
        self.push_token(TokenKind::Do, Span::new(self.pos(), self.pos() + 2));
        self.i += 2;
        self.eat_space();

        let module = if self.cur_is('{') {
            self.parse_embedded_module()
        } else {
            // single call: wrapped in an embedded module
            let (expr, _) = self.parse_expression_inner(false);
            let span = expr.span();
            let mut module = Node::new(
                span,
                NodeKind::EmbeddedModule {
                    manifest: None,
                    statements: vec![expr],
                    single_call_expr: true,
                },
            );
            let is_call = matches!(
                module.kind,
                NodeKind::EmbeddedModule { ref statements, .. }
                    if matches!(statements[0].kind, NodeKind::CallExpression { .. })
            );
            if !is_call {
                module.set_error_if_none(ParsingError::unspecified(SPAWN_EXPR_INVALID_EMBEDDED));
            }
            module
        };

        Node::new(
            self.span_from(start),
            NodeKind::SpawnExpression {
                meta,
                module: Some(Box::new(module)),
            },
        )
    }

    /// `import ident source config` (module import) or `import ./file.ql`
    /// (inclusion import).
    pub(crate) fn parse_import_statement(&mut self, import_ident: Node) -> Node {
        let start = import_ident.span().start;
        self.push_token(TokenKind::Import, import_ident.span());
        self.eat_space();

        // inclusion import: the source comes right after the keyword
        if matches!(self.cur(), Some('.' | '/')) {
            let source = self.parse_path_like_expression(false);
            let err = check_import_source(&source);
            let mut node = Node::new(
                self.span_from(start),
                NodeKind::InclusionImportStatement {
                    source: Some(Box::new(source)),
                },
            );
            if let Some(err) = err {
                node.base.err = Some(err);
            }
            return node;
        }

        if self.eof() {
            return Node::with_error(
                self.span_from(start),
                NodeKind::ImportStatement {
                    identifier: None,
                    source: None,
                    configuration: None,
                },
                ParsingError::unspecified(IMPORT_MISSING_SOURCE),
            );
        }

        let (identifier, _) = self.parse_expression_inner(false);
        self.eat_space();

        if self.eof() {
            return Node::with_error(
                self.span_from(start),
                NodeKind::ImportStatement {
                    identifier: Some(Box::new(identifier)),
                    source: None,
                    configuration: None,
                },
                ParsingError::unspecified(IMPORT_MISSING_SOURCE),
            );
        }

        let (source, _) = self.parse_expression_inner(false);
        let source_err = check_import_source(&source);
        self.eat_space();

        if self.eof() {
            let mut node = Node::new(
                self.span_from(start),
                NodeKind::ImportStatement {
                    identifier: Some(Box::new(identifier)),
                    source: Some(Box::new(source)),
                    configuration: None,
                },
            );
            node.base.err =
                source_err.or_else(|| Some(ParsingError::unspecified(IMPORT_MISSING_CONFIG)));
            return node;
        }

        let (configuration, _) = self.parse_expression_inner(false);
        let mut node = Node::new(
            self.span_from(start),
            NodeKind::ImportStatement {
                identifier: Some(Box::new(identifier)),
                source: Some(Box::new(source)),
                configuration: Some(Box::new(configuration)),
            },
        );
        if let Some(err) = source_err {
            node.base.err = Some(err);
        }
        node
    }
}

/// Import sources must end with the source extension and must not
/// contain `//`, `/./` or `/../`.
fn check_import_source(source: &Node) -> Option<ParsingError> {
    let value: &str = match &source.kind {
        NodeKind::AbsolutePathLiteral { value, .. }
        | NodeKind::RelativePathLiteral { value, .. } => value,
        NodeKind::UrlLiteral { value } => value,
        _ => return None,
    };

    if !value.ends_with(SOURCE_FILE_EXTENSION) {
        return Some(ParsingError::unspecified(format!(
            "invalid import source: the path should end with '{SOURCE_FILE_EXTENSION}'"
        )));
    }
    let path_part = value.split_once("://").map_or(value, |(_, rest)| rest);
    if path_part.contains("//") || path_part.contains("/./") || path_part.contains("/../") {
        return Some(ParsingError::unspecified(
            "invalid import source: the path should not contain '//', '/./' or '/../'",
        ));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse_chunk, ParserOptions};
    use pretty_assertions::assert_eq;

    fn chunk(source: &str) -> Node {
        let (chunk, _) = parse_chunk(source, &ParserOptions::default());
        chunk
    }

    #[test]
    fn chunk_with_const_manifest_and_statements() {
        let node = chunk("const x = 1\nmanifest {}\na = 2");
        match &node.kind {
            NodeKind::Chunk {
                global_constant_declarations,
                manifest,
                statements,
                ..
            } => {
                assert!(global_constant_declarations.is_some());
                assert!(manifest.is_some());
                assert_eq!(statements.len(), 1);
            }
            other => panic!("expected chunk, got {other:?}"),
        }
        assert!(!node.error_at_any_depth());
    }

    #[test]
    fn const_group() {
        let node = chunk("const (\n  a = 1\n  b = 2\n)");
        match &node.kind {
            NodeKind::Chunk {
                global_constant_declarations: Some(decls),
                ..
            } => match &decls.kind {
                NodeKind::GlobalConstantDeclarations { declarations } => {
                    assert_eq!(declarations.len(), 2);
                }
                other => panic!("expected declarations, got {other:?}"),
            },
            other => panic!("expected chunk with constants, got {other:?}"),
        }
    }

    #[test]
    fn shebang_is_skipped() {
        let node = chunk("#!/usr/bin/env quill\na = 1");
        assert!(!node.error_at_any_depth());
    }

    #[test]
    fn includable_chunk_desc() {
        let node = chunk("includable-chunk\nconst a = 1");
        match &node.kind {
            NodeKind::Chunk {
                includable_chunk_desc,
                ..
            } => assert!(includable_chunk_desc.is_some()),
            other => panic!("expected chunk, got {other:?}"),
        }
    }

    #[test]
    fn start_option_stops_after_chunk_start() {
        let options = ParserOptions {
            start: true,
            ..ParserOptions::default()
        };
        let (node, _) = parse_chunk("manifest {}\na = 1", &options);
        match &node.kind {
            NodeKind::Chunk {
                manifest,
                statements,
                ..
            } => {
                assert!(manifest.is_some());
                assert!(statements.is_empty());
            }
            other => panic!("expected chunk, got {other:?}"),
        }
    }

    #[test]
    fn preinit_statement() {
        let node = chunk("preinit { a = 1 }\nmanifest {}");
        match &node.kind {
            NodeKind::Chunk { preinit, .. } => assert!(preinit.is_some()),
            other => panic!("expected chunk, got {other:?}"),
        }
    }

    #[test]
    fn spawn_with_embedded_module() {
        let node = chunk("go {} do { a = 1 }");
        let mut found = false;
        quill_ir::walk(&node, &mut |n, _, _| {
            if matches!(n.kind, NodeKind::SpawnExpression { module: Some(_), .. }) {
                found = true;
            }
            quill_ir::TraversalAction::Continue
        });
        assert!(found);
    }

    #[test]
    fn spawn_with_simple_call() {
        let node = chunk("go nil do f()");
        let mut single_call = false;
        quill_ir::walk(&node, &mut |n, _, _| {
            if matches!(
                n.kind,
                NodeKind::EmbeddedModule {
                    single_call_expr: true,
                    ..
                }
            ) {
                single_call = true;
            }
            quill_ir::TraversalAction::Continue
        });
        assert!(single_call);
        assert!(!node.error_at_any_depth());
    }

    #[test]
    fn inclusion_import() {
        let node = chunk("import ./lib.ql");
        let mut found = false;
        quill_ir::walk(&node, &mut |n, _, _| {
            if matches!(n.kind, NodeKind::InclusionImportStatement { .. }) {
                found = true;
            }
            quill_ir::TraversalAction::Continue
        });
        assert!(found);
        assert!(!node.error_at_any_depth());
    }

    #[test]
    fn import_source_must_have_extension() {
        let node = chunk("import ./lib.txt");
        assert!(node.error_at_any_depth());
    }

    #[test]
    fn import_source_must_be_normalized() {
        let node = chunk("import ./a/../lib.ql");
        assert!(node.error_at_any_depth());
    }

    #[test]
    fn module_import() {
        let node = chunk("import lib https://example.com/lib.ql {}");
        let mut found = false;
        quill_ir::walk(&node, &mut |n, _, _| {
            if matches!(
                n.kind,
                NodeKind::ImportStatement {
                    identifier: Some(_),
                    source: Some(_),
                    configuration: Some(_),
                }
            ) {
                found = true;
            }
            quill_ir::TraversalAction::Continue
        });
        assert!(found);
        assert!(!node.error_at_any_depth());
    }
}
