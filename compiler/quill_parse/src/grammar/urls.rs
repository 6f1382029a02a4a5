//! URL-likes: scheme literals, hosts, URLs, URL expressions with
//! interpolations and query parameters, and the host/URL pattern forms.
//!
//! Shapes are pre-filtered with loose regexes, then validated with the
//! `url` crate. The scheme set is closed.

use crate::chars::{is_delim, is_interpolation_allowed_char};
use crate::Parser;
use quill_diagnostic::ParsingError;
use quill_ir::{shift_spans, Node, NodeKind, Span, Token, TokenKind};
use regex::Regex;
use std::sync::LazyLock;

/// Closed set of supported schemes.
pub const SCHEMES: [&str; 9] = [
    "http", "https", "ws", "wss", "ldb", "odb", "file", "mem", "s3",
];

/// Placeholder scheme used to validate scheme-less hosts (`://example.com`).
const NO_SCHEME_SCHEME: &str = "https";

const URL_CREDENTIALS_PATTERN: &str = "([-a-zA-Z0-9@:%._+~#=]*@)?";

static LOOSE_HOST_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(&format!(
        "^([a-z][a-z0-9+]*)?://{URL_CREDENTIALS_PATTERN}([-\\w]+|[-a-zA-Z0-9.]{{1,64}}\\.[a-zA-Z0-9]{{1,6}})(:[0-9]+)?$"
    ))
    .unwrap()
});

static LOOSE_HOST_PATTERN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(&format!(
        "^([a-z][a-z0-9+]*)?://{URL_CREDENTIALS_PATTERN}([-\\w]+|[*]+|[-a-zA-Z0-9.*]{{1,64}}\\.[a-zA-Z0-9*]{{1,6}})(:[0-9]+)?$"
    ))
    .unwrap()
});

static LOOSE_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(
        "^([a-z][a-z0-9+]*)://([-\\w]+|[-a-zA-Z0-9@:%._+~#=]{1,64}\\.[a-zA-Z0-9]{1,6})\\b(:[0-9]+)?([?#/][-a-zA-Z0-9@:%_*+.~#?&//=]*)$",
    )
    .unwrap()
});

static LOOSE_URL_EXPR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(&format!(
        "^([$][a-zA-Z0-9_-]+|([a-z][a-z0-9+]*://{URL_CREDENTIALS_PATTERN}([-\\w]+|[-a-zA-Z0-9.]{{1,64}}\\.[a-zA-Z0-9]{{1,6}}\\b|\\{{[$]{{0,1}}[-\\w]+\\}})))(:[0-9]+)?([{{?#/][-a-zA-Z0-9@:%_+.~#?&//=${{}}]*)$"
    ))
    .unwrap()
});

const INVALID_URL: &str = "invalid URL";
const INVALID_URL_OR_HOST: &str = "invalid URL or host";
const INVALID_HOST_LIT: &str = "invalid host literal";
const INVALID_HOST_PATT: &str = "invalid host pattern";
const INVALID_URL_PATT: &str = "invalid URL pattern";
const INVALID_QUERY: &str = "invalid query";
const INVALID_QUERY_PARAM_INTERP: &str = "invalid query parameter interpolation";
const EMPTY_QUERY_PARAM_INTERP: &str = "empty query parameter interpolation";
const QUERY_PARAM_INTERP_EXPLANATION: &str =
    "a query parameter interpolation should contain an identifier without spaces, example: $name, name";
const UNTERMINATED_QUERY_PARAM_INTERP_MISSING_CLOSING_BRACE: &str =
    "unterminated query parameter interpolation: missing closing brace '}'";
const INVALID_HOST_INTERPOLATION: &str = "invalid host interpolation";
const INVALID_SCHEME_LIT_MISSING_SCHEME: &str = "invalid scheme literal: missing scheme name";
const INVALID_SCHEME_HOST_OR_URL_SLASH_EXPECTED: &str =
    "invalid scheme, host or URL: '://' is expected after the scheme";
const UNSUPPORTED_PROTOCOL: &str = "invalid URL: unsupported protocol";
const UNTERMINATED_HOST_PATT_MISSING_HOSTNAME: &str =
    "unterminated host pattern: missing hostname after '://'";
const INVALID_URL_OR_HOST_PATT_SCHEME_SHOULD_BE_FOLLOWED_BY: &str =
    "invalid URL or host pattern: scheme should be followed by '://'";
const HOST_PATT_SUGGEST_DOUBLE_STAR: &str =
    "invalid host pattern: use '**' to match any sequence of subdomains";
const HOST_PATT_AT_MOST_ONE_DOUBLE_STAR: &str =
    "invalid host pattern: at most one '**' is allowed";
const HOST_PATT_ONLY_SINGLE_OR_DOUBLE_STAR: &str =
    "invalid host pattern: only '*' and '**' are allowed";
const URL_PATTERN_SUBSEQUENT_DOT_EXPLANATION: &str =
    "URL patterns cannot contain more than 2 subsequent dots except /... at the end";
const URL_PATTERNS_CANNOT_END_WITH_MORE_THAN_4_DOTS: &str =
    "URL patterns cannot end with more than 3 subsequent dots preceded by a slash";

/// Effective port of a scheme/port pair.
///
/// Returns the scheme default when no port is given, rejects pseudo
/// protocols that do not use network ports, and bounds the port to 16
/// bits.
pub fn check_effective_port(scheme: &str, port: &str) -> Result<u16, String> {
    let default = match scheme {
        "http" | "ws" => Some(80u16),
        "https" | "wss" => Some(443),
        _ => None,
    };
    if port.is_empty() {
        return default.ok_or_else(|| format!("scheme '{scheme}' does not use network ports"));
    }
    if default.is_none() {
        return Err(format!("scheme '{scheme}' does not use network ports"));
    }
    port.parse::<u16>()
        .map_err(|_| "port number should be between 0 and 65535".to_string())
}

/// Validate a host literal (`https://example.com`, `://example.com:80`).
fn check_host(u: &str) -> Option<ParsingError> {
    let has_scheme = !u.starts_with(':');
    let (scheme, host_part) = match u.split_once("://") {
        Some((scheme, host)) => (scheme, host),
        None => return Some(ParsingError::unspecified(INVALID_HOST_LIT)),
    };

    let tested = if has_scheme {
        u.to_string()
    } else {
        format!("{NO_SCHEME_SCHEME}{u}")
    };

    let Ok(parsed) = url::Url::parse(&tested) else {
        return Some(ParsingError::unspecified(INVALID_HOST_LIT));
    };
    if !parsed.username().is_empty()
        || !matches!(parsed.path(), "" | "/")
        || parsed.query().is_some()
        || parsed.fragment().is_some()
    {
        return Some(ParsingError::unspecified(INVALID_HOST_LIT));
    }
    if parsed.host_str().is_some_and(|h| h.contains("..")) {
        return Some(ParsingError::unspecified(INVALID_HOST_LIT));
    }
    if u.ends_with(':') {
        return Some(ParsingError::unspecified(
            "invalid host literal: missing port number after ':'",
        ));
    }
    if has_scheme {
        let port = host_part
            .rsplit_once(':')
            .map(|(_, p)| p)
            .filter(|p| p.chars().all(|r| r.is_ascii_digit()))
            .unwrap_or("");
        if let Err(err) = check_effective_port(scheme, port) {
            return Some(ParsingError::unspecified(format!(
                "{INVALID_HOST_LIT}: {err}"
            )));
        }
    }
    None
}

/// Validate a host pattern (`https://**.example.com`).
fn check_host_pattern(u: &str) -> Option<ParsingError> {
    let after_scheme = u.split_once("://").map(|(_, rest)| rest).unwrap_or(u);
    let hostname = after_scheme.split(':').next().unwrap_or("");
    let parts: Vec<&str> = hostname.split('.').collect();

    if parts.len() == 1 {
        if parts[0] == "*" {
            return Some(ParsingError::unspecified(HOST_PATT_SUGGEST_DOUBLE_STAR));
        }
        if parts[0] != "**" && !parts[0].chars().all(|r| r.is_alphanumeric() || r == '-') {
            return Some(ParsingError::unspecified(INVALID_HOST_PATT));
        }
        return None;
    }
    if u.matches("**").count() > 1 {
        return Some(ParsingError::unspecified(HOST_PATT_AT_MOST_ONE_DOUBLE_STAR));
    }
    if u.contains("***") {
        return Some(ParsingError::unspecified(
            HOST_PATT_ONLY_SINGLE_OR_DOUBLE_STAR,
        ));
    }
    if parts.iter().all(|p| *p == "*" || *p == "**") {
        return Some(ParsingError::unspecified(INVALID_HOST_PATT));
    }

    let has_scheme = !u.starts_with(':');
    let tested = if has_scheme {
        u.replace('*', "com")
    } else {
        format!("{NO_SCHEME_SCHEME}{}", u.replace('*', "com"))
    };
    if url::Url::parse(&tested).is_err() {
        return Some(ParsingError::unspecified(INVALID_HOST_PATT));
    }
    if hostname.contains("..") {
        return Some(ParsingError::unspecified(INVALID_HOST_PATT));
    }
    None
}

/// Validate a URL pattern, including prefix-pattern dot rules.
fn check_url_pattern(u: &str) -> Option<ParsingError> {
    let is_prefix_pattern = u.ends_with("/...");
    if u.contains("...") && (!is_prefix_pattern || u.matches("...").count() != 1) {
        let tail = u.rsplit('/').next().unwrap_or("");
        let dot_count = tail.chars().filter(|r| *r == '.').count();
        if dot_count > 3 {
            return Some(ParsingError::unspecified(
                URL_PATTERNS_CANNOT_END_WITH_MORE_THAN_4_DOTS,
            ));
        }
        return Some(ParsingError::unspecified(
            URL_PATTERN_SUBSEQUENT_DOT_EXPLANATION,
        ));
    }

    let replaced = u.replace('*', "com").replace("/...", "/");
    match url::Url::parse(&replaced) {
        Err(_) => Some(ParsingError::unspecified(INVALID_URL_PATT)),
        Ok(parsed) => {
            let port = parsed.port().map(|p| p.to_string()).unwrap_or_default();
            if let Err(err) = check_effective_port(parsed.scheme(), &port) {
                return Some(ParsingError::unspecified(format!(
                    "{INVALID_URL_PATT}: {err}"
                )));
            }
            if parsed.host_str().is_some_and(|h| h.contains("..")) {
                return Some(ParsingError::unspecified(INVALID_URL_PATT));
            }
            None
        }
    }
}

impl Parser {
    /// Parse a URL-like: scheme literal, host literal, URL literal, or URL
    /// expression. `start` is the index of the scheme's first rune; the
    /// cursor is on the `:` of `://`.
    pub(crate) fn parse_url_like(&mut self, start: u32) -> Node {
        let missing_slash = !(self.peek_is(1, '/') && self.peek_is(2, '/'));
        if missing_slash {
            self.i = (self.i + 2).min(self.len);
        } else {
            self.i += 3;
        }
        let after_scheme_index = self.pos();

        self.eat_url_like_body();

        let u = self.slice_str(start, self.pos());
        let span = self.span_from(start);

        if missing_slash {
            self.push_raw_token(TokenKind::InvalidUrlLit, span);
            return Node::with_error(
                span,
                NodeKind::InvalidUrl { value: u.into() },
                ParsingError::unspecified(INVALID_SCHEME_HOST_OR_URL_SLASH_EXPECTED),
            );
        }

        // scheme literal: `https://` with nothing after
        if self.pos() == after_scheme_index {
            let scheme = &u[..u.len() - 3];
            self.push_raw_token(TokenKind::SchemeLiteral, span);
            let mut node = Node::new(
                span,
                NodeKind::SchemeLiteral {
                    name: scheme.into(),
                },
            );
            if scheme.is_empty() {
                node.base.err = Some(ParsingError::unspecified(INVALID_SCHEME_LIT_MISSING_SCHEME));
            } else if !SCHEMES.contains(&scheme) {
                node.base.err = Some(ParsingError::unspecified(UNSUPPORTED_PROTOCOL));
            }
            return node;
        }

        let scheme = u.split_once("://").map(|(s, _)| s).unwrap_or("");
        if !scheme.is_empty() && !SCHEMES.contains(&scheme) {
            self.push_raw_token(TokenKind::InvalidUrlLit, span);
            return Node::with_error(
                span,
                NodeKind::InvalidUrl { value: u.into() },
                ParsingError::unspecified(UNSUPPORTED_PROTOCOL),
            );
        }

        if LOOSE_HOST_REGEX.is_match(&u) {
            self.push_raw_token(TokenKind::HostLiteral, span);
            let mut node = Node::new(span, NodeKind::HostLiteral { value: u.into() });
            if let Some(err) = check_host(&self.slice_str(start, span.end)) {
                node.base.err = Some(err);
            }
            return node;
        }

        if LOOSE_URL_EXPR_REGEX.is_match(&u) && u.contains('{') {
            return self.parse_url_expression(start, after_scheme_index, &u);
        }

        if LOOSE_URL_REGEX.is_match(&u) {
            let mut err = None;
            match url::Url::parse(&u) {
                Err(_) => {
                    err = Some(ParsingError::unspecified(INVALID_URL));
                }
                Ok(parsed) => {
                    let port = parsed.port().map(|p| p.to_string()).unwrap_or_default();
                    if let Err(port_err) = check_effective_port(parsed.scheme(), &port) {
                        err = Some(ParsingError::unspecified(format!(
                            "{INVALID_URL}: {port_err}"
                        )));
                    }
                    if parsed.host_str().is_some_and(|h| h.contains("..")) {
                        err = Some(ParsingError::unspecified(INVALID_URL));
                    }
                }
            }
            self.push_raw_token(TokenKind::UrlLiteral, span);
            let mut node = Node::new(span, NodeKind::UrlLiteral { value: u.into() });
            if let Some(err) = err {
                node.base.err = Some(err);
            }
            return node;
        }

        self.push_raw_token(TokenKind::InvalidUrlLit, span);
        Node::with_error(
            span,
            NodeKind::InvalidUrl { value: u.into() },
            ParsingError::unspecified(INVALID_URL_OR_HOST),
        )
    }

    /// Eat the URL body: until a space or a delimiter other than `:`/`{`;
    /// `{…}` interpolations are skipped as opaque regions.
    fn eat_url_like_body(&mut self) {
        while let Some(r) = self.cur() {
            if r == '\n' || r.is_whitespace() || (is_delim(r) && r != ':' && r != '{') {
                break;
            }
            match r {
                '{' => {
                    self.i += 1;
                    while !self.eof() && !self.cur_is('\n') && !self.cur_is('}') {
                        self.i += 1;
                    }
                    if self.cur_is('}') {
                        self.i += 1;
                    }
                }
                ':' => {
                    let Some(next) = self.peek(1) else { break };
                    if next.is_whitespace() || (is_delim(next) && next != '{') {
                        break;
                    }
                    self.i += 1;
                }
                _ => self.i += 1,
            }
        }
    }

    /// URL expression: URL-shaped with `{…}` interpolations in the host,
    /// path or query value positions.
    fn parse_url_expression(&mut self, start: u32, after_scheme_index: u32, u: &str) -> Node {
        let span = Span::new(start, self.pos());
        let mut err: Option<ParsingError> = None;

        let has_query = u.contains('?');
        let mut path_excl_end = self.pos();
        if has_query {
            path_excl_end = after_scheme_index;
            while self.at(path_excl_end as usize) != Some('?') {
                path_excl_end += 1;
            }
        }

        let mut path_start = after_scheme_index;
        let mut host_interpolation_start = None;

        if self.at(after_scheme_index as usize) == Some('{') {
            // host interpolation
            host_interpolation_start = Some(path_start);
            path_start += 1;
            while path_start < path_excl_end && self.at(path_start as usize) != Some('}') {
                path_start += 1;
            }
            path_start += 1; // '}' guaranteed by the regex
        } else {
            while path_start < path_excl_end
                && !matches!(self.at(path_start as usize), Some('/' | '{'))
            {
                path_start += 1;
            }
        }
        if path_start == after_scheme_index {
            path_start = path_excl_end;
        }

        let slices = self.parse_path_expression_slices(path_start, path_excl_end);

        let mut query_params = Vec::new();
        if has_query {
            query_params = self.parse_url_query(path_excl_end + 1, span.end, &mut err);
        }

        // host part
        let host_part_raw = self.slice_str(span.start, path_start);
        let host_part_span = Span::new(span.start, path_start);
        let host_part = if let Some(interp_start) = host_interpolation_start {
            let interp_source = self.slice_str(interp_start + 1, path_start - 1);
            let (mut host, ok) = crate::parse_expression(&interp_source);
            shift_spans(&mut host, i64::from(interp_start) + 1);
            if !ok && err.is_none() {
                err = Some(ParsingError::unspecified(INVALID_HOST_INTERPOLATION));
            }
            let scheme_node = Node::new(
                Span::new(span.start, after_scheme_index),
                NodeKind::SchemeLiteral {
                    name: self.slice_str(span.start, after_scheme_index - 3).into(),
                },
            );
            Node::new(
                host_part_span,
                NodeKind::HostExpression {
                    scheme: Box::new(scheme_node),
                    host: Box::new(host),
                    raw: host_part_raw.into(),
                },
            )
        } else {
            let mut node = Node::new(
                host_part_span,
                NodeKind::HostLiteral {
                    value: host_part_raw.clone().into(),
                },
            );
            if host_part_raw.contains("://") {
                if let Some(host_err) = check_host(&host_part_raw) {
                    node.base.err = Some(host_err);
                }
            }
            node
        };

        let mut node = Node::new(
            span,
            NodeKind::UrlExpression {
                raw: u.into(),
                host_part: Box::new(host_part),
                path: slices,
                query_params,
            },
        );
        if let Some(err) = err {
            node.set_error_if_none(err);
        }
        node
    }

    /// Parse `key=value&key=value` query parameters within `[start, end)`.
    fn parse_url_query(
        &mut self,
        start: u32,
        end: u32,
        err: &mut Option<ParsingError>,
    ) -> Vec<Node> {
        let mut query_params = Vec::new();
        let mut j = start as usize;
        let query_end = end as usize;

        while j < query_end {
            let key_start = j;
            while j < query_end && self.s[j] != '=' {
                j += 1;
            }
            if j >= query_end {
                let key = self.slice_str(key_start as u32, j as u32);
                err.get_or_insert_with(|| {
                    ParsingError::unspecified(format!(
                        "{INVALID_QUERY}: missing '=' after key '{key}'"
                    ))
                });
            }
            let key = self.slice_str(key_start as u32, j as u32);
            if key.contains('{') || key.contains('$') {
                err.get_or_insert_with(|| {
                    ParsingError::unspecified(format!(
                        "{INVALID_QUERY}: keys cannot contain '$' or '{{' characters: key '{key}'"
                    ))
                });
            }
            if j < query_end {
                j += 1; // '='
            }

            let value_start = j;
            let mut slices = Vec::new();
            if j < query_end && self.s[j] != '&' {
                while j < query_end && self.s[j] != '&' {
                    j += 1;
                }
                slices = self.parse_query_parameter_value_slices(value_start as u32, j as u32);
            }

            self.tokens.push(Token::with_raw(
                TokenKind::QueryParamKey,
                Span::new(key_start as u32, (key_start + key.chars().count()) as u32),
                key.clone(),
            ));
            query_params.push(Node::new(
                Span::new(key_start as u32, j as u32),
                NodeKind::UrlQueryParameter {
                    name: key.into(),
                    value: slices,
                },
            ));

            while j < query_end && self.s[j] == '&' {
                self.push_token(
                    TokenKind::QueryParamSep,
                    Span::new(j as u32, j as u32 + 1),
                );
                j += 1;
            }
        }
        query_params
    }

    /// Scan a query parameter value into slices and interpolations.
    pub(crate) fn parse_query_parameter_value_slices(
        &mut self,
        start: u32,
        excl_end: u32,
    ) -> Vec<Node> {
        let mut slices = Vec::new();
        let mut index = start as usize;
        let excl_end = excl_end as usize;
        let mut slice_start = start as usize;
        let mut in_interpolation = false;

        while index < excl_end {
            let r = self.s[index];
            if !in_interpolation && r == '{' {
                let value = self.slice_str(slice_start as u32, index as u32);
                slices.push(Node::new(
                    Span::new(slice_start as u32, index as u32),
                    NodeKind::UrlQueryParameterValueSlice {
                        value: value.into(),
                    },
                ));
                slice_start = index + 1;
                in_interpolation = true;

                if index == self.len - 1 {
                    slices.push(Node::with_error(
                        Span::new(slice_start as u32, slice_start as u32),
                        NodeKind::UrlQueryParameterValueSlice { value: "".into() },
                        ParsingError::unspecified(
                            "unterminated query parameter interpolation",
                        ),
                    ));
                    return slices;
                }
            } else if in_interpolation && (r == '}' || index == excl_end - 1) {
                let missing_closing_brace = index == excl_end - 1 && r != '}';
                if missing_closing_brace {
                    index += 1;
                }
                let interpolation = self.slice_str(slice_start as u32, index as u32);
                let (mut expr, ok) = crate::parse_expression(&interpolation);
                if ok {
                    shift_spans(&mut expr, slice_start as i64);
                    slices.push(expr);
                    if missing_closing_brace {
                        slices.push(Node::with_error(
                            Span::new(index as u32, index as u32),
                            NodeKind::UrlQueryParameterValueSlice { value: "".into() },
                            ParsingError::unspecified(
                                UNTERMINATED_QUERY_PARAM_INTERP_MISSING_CLOSING_BRACE,
                            ),
                        ));
                    }
                } else {
                    let message = if interpolation.is_empty() {
                        EMPTY_QUERY_PARAM_INTERP
                    } else {
                        INVALID_QUERY_PARAM_INTERP
                    };
                    let span = Span::new(slice_start as u32, index as u32);
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
                }
                in_interpolation = false;
                slice_start = index + 1;
            } else if in_interpolation && !is_interpolation_allowed_char(r) {
                let mut k = index;
                while k < excl_end && self.s[k] != '}' {
                    k += 1;
                }
                slices.push(Node::with_error(
                    Span::new(slice_start as u32, k as u32),
                    NodeKind::UrlQueryParameterValueSlice {
                        value: self.slice_str(slice_start as u32, k as u32).into(),
                    },
                    ParsingError::unspecified(QUERY_PARAM_INTERP_EXPLANATION),
                ));
                if k < excl_end {
                    k += 1;
                }
                in_interpolation = false;
                slice_start = k;
                index = k;
                continue;
            }
            index += 1;
        }

        if slice_start != index {
            slices.push(Node::new(
                Span::new(slice_start as u32, index as u32),
                NodeKind::UrlQueryParameterValueSlice {
                    value: self.slice_str(slice_start as u32, index as u32).into(),
                },
            ));
        }
        slices
    }

    /// URL expression whose host part is a variable: `$host/index.html`.
    /// The variable was parsed; the cursor is on `/`.
    pub(crate) fn parse_url_expression_from_host_variable(&mut self, host_variable: Node) -> Node {
        let start = host_variable.span().start;
        let after_host = self.pos();
        self.eat_url_like_body();

        let u = self.slice_str(start, self.pos());
        let span = self.span_from(start);
        let mut err = None;

        let has_query = u.contains('?');
        let mut path_excl_end = self.pos();
        if has_query {
            path_excl_end = after_host;
            while self.at(path_excl_end as usize) != Some('?') {
                path_excl_end += 1;
            }
        }

        let path = self.parse_path_expression_slices(after_host, path_excl_end);
        let query_params = if has_query {
            self.parse_url_query(path_excl_end + 1, span.end, &mut err)
        } else {
            vec![]
        };

        let mut node = Node::new(
            span,
            NodeKind::UrlExpression {
                raw: u.into(),
                host_part: Box::new(host_variable),
                path,
                query_params,
            },
        );
        if let Some(err) = err {
            node.set_error_if_none(err);
        }
        node
    }

    /// URL pattern or host pattern; `start` is the index of the `%`, the
    /// cursor is on the first `/` of `://`.
    pub(crate) fn parse_url_like_pattern(&mut self, start: u32) -> Node {
        let mut leading_slash_count = 0;
        while self.cur_is('/') {
            self.i += 1;
            leading_slash_count += 1;
        }

        self.eat_url_like_body();

        let raw = self.slice_str(start, self.pos());
        let u = raw.strip_prefix('%').unwrap_or(&raw).to_string();
        let span = self.span_from(start);

        if leading_slash_count != 2 {
            return Node::with_error(
                span,
                NodeKind::InvalidUrlPattern { value: u.into() },
                ParsingError::unspecified(INVALID_URL_OR_HOST_PATT_SCHEME_SHOULD_BE_FOLLOWED_BY),
            );
        }

        if LOOSE_HOST_PATTERN_REGEX.is_match(&u) {
            self.push_raw_token(TokenKind::HostPatternLiteral, span);
            let mut node = Node::new(
                span,
                NodeKind::HostPatternLiteral {
                    value: u.clone().into(),
                    raw: raw.into(),
                },
            );
            if let Some(err) = check_host_pattern(&u) {
                node.base.err = Some(err);
            }
            return node;
        }

        if raw.ends_with("://") {
            return Node::with_error(
                span,
                NodeKind::HostPatternLiteral {
                    value: u.into(),
                    raw: raw.into(),
                },
                ParsingError::unspecified(UNTERMINATED_HOST_PATT_MISSING_HOSTNAME),
            );
        }

        let err = if LOOSE_URL_REGEX.is_match(&u) {
            check_url_pattern(&u)
        } else {
            Some(ParsingError::unspecified(INVALID_URL_PATT))
        };

        self.push_raw_token(TokenKind::UrlPatternLiteral, span);
        let mut node = Node::new(
            span,
            NodeKind::UrlPatternLiteral {
                value: u.into(),
                raw: raw.into(),
            },
        );
        if let Some(err) = err {
            node.base.err = Some(err);
        }
        node
    }
}

/// Has the source the shape `scheme://...` at `i`? Used by the expression
/// dispatcher after reading an identifier.
pub(crate) fn is_scheme_colon_slash_slash(s: &[char], i: usize) -> bool {
    s.get(i) == Some(&':') && s.get(i + 1) == Some(&'/') && s.get(i + 2) == Some(&'/')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParserOptions;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> Node {
        let mut p = Parser::new(source, &ParserOptions::default());
        while p.cur().is_some_and(crate::chars::is_ident_char) {
            p.i += 1;
        }
        p.parse_url_like(0)
    }

    #[test]
    fn scheme_literal() {
        let node = parse("https://");
        assert!(matches!(
            &node.kind,
            NodeKind::SchemeLiteral { name } if &**name == "https"
        ));
        assert!(node.base.err.is_none());
    }

    #[test]
    fn unsupported_scheme() {
        let node = parse("gopher://example.com");
        assert!(node
            .base
            .err
            .as_ref()
            .is_some_and(|e| e.message.contains("unsupported protocol")));
    }

    #[test]
    fn host_literal() {
        let node = parse("https://example.com");
        assert!(matches!(node.kind, NodeKind::HostLiteral { .. }));
        assert!(node.base.err.is_none());
    }

    #[test]
    fn url_literal_with_path() {
        let node = parse("https://example.com/index.html");
        assert!(matches!(node.kind, NodeKind::UrlLiteral { .. }));
        assert!(node.base.err.is_none());
    }

    #[test]
    fn url_expression_with_path_interpolation() {
        let node = parse("https://example.com/users/{id}");
        match &node.kind {
            NodeKind::UrlExpression { path, .. } => {
                assert!(path
                    .iter()
                    .any(|s| matches!(s.kind, NodeKind::IdentifierLiteral { .. })));
            }
            other => panic!("expected URL expression, got {other:?}"),
        }
        assert!(node.base.err.is_none());
    }

    #[test]
    fn url_expression_with_query_interpolation() {
        let node = parse("https://example.com/search?q={x}&page=1");
        match &node.kind {
            NodeKind::UrlExpression { query_params, .. } => {
                assert_eq!(query_params.len(), 2);
                assert!(matches!(
                    &query_params[0].kind,
                    NodeKind::UrlQueryParameter { name, .. } if &**name == "q"
                ));
            }
            other => panic!("expected URL expression, got {other:?}"),
        }
    }

    #[test]
    fn url_expression_with_host_variable() {
        let mut p = Parser::new("$api/users/{id}", &ParserOptions::default());
        let node = p.parse_expression_inner(false).0;
        match &node.kind {
            NodeKind::UrlExpression {
                host_part, path, ..
            } => {
                assert!(matches!(host_part.kind, NodeKind::Variable { .. }));
                assert!(path
                    .iter()
                    .any(|s| matches!(s.kind, NodeKind::IdentifierLiteral { .. })));
            }
            other => panic!("expected URL expression, got {other:?}"),
        }
        assert!(!node.error_at_any_depth());
    }

    #[test]
    fn missing_slash_after_scheme() {
        let node = parse("https:/example.com");
        assert!(matches!(node.kind, NodeKind::InvalidUrl { .. }));
    }

    #[test]
    fn effective_ports() {
        assert_eq!(check_effective_port("http", ""), Ok(80));
        assert_eq!(check_effective_port("https", ""), Ok(443));
        assert_eq!(check_effective_port("wss", "8443"), Ok(8443));
        assert!(check_effective_port("mem", "80").is_err());
        assert!(check_effective_port("http", "70000").is_err());
    }

    #[test]
    fn host_pattern_rules() {
        let check = |s: &str| {
            let mut p = Parser::new(s, &ParserOptions::default());
            p.i = 1; // '%'
            while p.cur().is_some_and(crate::chars::is_ident_char) {
                p.i += 1;
            }
            p.i += 1; // ':'
            p.parse_url_like_pattern(0)
        };

        let node = check("%https://**.example.com");
        assert!(matches!(node.kind, NodeKind::HostPatternLiteral { .. }));
        assert!(node.base.err.is_none());

        let node = check("%https://*");
        assert!(node
            .base
            .err
            .as_ref()
            .is_some_and(|e| e.message.contains("'**'")));

        let node = check("%https://**.**.com");
        assert!(node.base.err.is_some());
    }

    #[test]
    fn url_pattern_prefix_rules() {
        let check = |s: &str| {
            let mut p = Parser::new(s, &ParserOptions::default());
            p.i = 1;
            while p.cur().is_some_and(crate::chars::is_ident_char) {
                p.i += 1;
            }
            p.i += 1;
            p.parse_url_like_pattern(0)
        };

        let node = check("%https://example.com/a/...");
        assert!(matches!(node.kind, NodeKind::UrlPatternLiteral { .. }));
        assert!(node.base.err.is_none());

        let node = check("%https://example.com/a/..../b");
        assert!(node.base.err.is_some());
    }
}
