//! Parsing error message constants and formatters.
//!
//! Messages are user facing; kinds live in `quill_diagnostic`. Only the
//! messages used from several modules are centralized here, single-use
//! messages stay at the call site.

use crate::chars::is_space_not_lf;

pub(crate) const UNTERMINATED_MEMB_OR_INDEX_EXPR: &str =
    "unterminated member/index expression";
pub(crate) const UNTERMINATED_DOUBLE_COLON_EXPR: &str = "unterminated double-colon expression";
pub(crate) const UNTERMINATED_INDEX_OR_SLICE_EXPR: &str = "unterminated index/slice expression";
pub(crate) const UNTERMINATED_IDENTIFIER_LIT: &str = "unterminated identifier literal";
pub(crate) const IDENTIFIER_MUST_NOT_END_WITH_HYPHEN: &str =
    "identifier literal must not end with '-'";
pub(crate) const STMTS_SHOULD_BE_SEPARATED_BY: &str =
    "statements should be separated by a space, newline or ';'";
pub(crate) const INVALID_SLICE_EXPR_SINGLE_COLON: &str =
    "invalid slice expression: a single colon should be present";
pub(crate) const UNTERMINATED_SLICE_EXPR_MISSING_END_INDEX: &str =
    "unterminated slice expression: missing end index";
pub(crate) const CANNOT_MIX_PATH_INTER_PATH_NAMED_SEGMENT: &str =
    "cannot mix interpolation and named path segments";
pub(crate) const ONLY_PATH_PATTERNS_CAN_CONTAIN_NAMED_SEGMENTS: &str =
    "only path patterns can contain named segments";
pub(crate) const PATH_INTERP_LIMITED_CHARSET: &str =
    "a path interpolation can only contain a limited set of characters";
pub(crate) const UNTERMINATED_PATH_INTERP: &str = "unterminated path interpolation";
pub(crate) const EMPTY_PATH_INTERP: &str = "empty path interpolation";
pub(crate) const PREFIX_PATT_DOTDOTDOT_ONLY_AT_THE_END: &str =
    "'...' is only allowed at the end of a prefix path pattern";
pub(crate) const PREFIX_PATT_CANNOT_CONTAIN_GLOBBING: &str =
    "a prefix path pattern cannot contain globbing characters '*', '?' or '['";
pub(crate) const UNTERMINATED_PATT: &str = "unterminated pattern: '%'";
pub(crate) const UNTERMINATED_STRING_INTERP: &str = "unterminated string interpolation";
pub(crate) const UNTERMINATED_STRING_TEMPL_LIT: &str = "unterminated string template literal";
pub(crate) const STR_INTERP_LIMITED_CHARSET: &str =
    "a string interpolation can only contain a limited set of characters";

/// Printable description of a rune, flagging irregular spaces.
pub(crate) fn fmt_rune_info(r: char) -> String {
    let repr = match r {
        '\t' => "'\\t'".to_string(),
        '\r' => "'\\r'".to_string(),
        '\n' => "'\\n'".to_string(),
        _ => format!("'{r}'"),
    };
    if r.is_whitespace() && r != ' ' && !is_space_not_lf(r) && r != '\n' {
        format!("{repr} (non regular space, code: {})", r as u32)
    } else {
        format!("{repr} (code: {})", r as u32)
    }
}

pub(crate) fn fmt_unexpected_char_in(r: char, place: &str) -> String {
    format!("unexpected char {} in {place}", fmt_rune_info(r))
}

pub(crate) fn fmt_expr_expected_here(s: &[char], i: usize) -> String {
    let left: String = s[i.saturating_sub(5)..i.min(s.len())].iter().collect();
    let right: String = s[i.min(s.len())..(i + 5).min(s.len())].iter().collect();
    format!("an expression was expected: ...{left}<<here>>{right}...")
}

pub(crate) fn fmt_a_pattern_was_expected_here(s: &[char], i: usize) -> String {
    let left: String = s[i.saturating_sub(5)..i.min(s.len())].iter().collect();
    let right: String = s[i.min(s.len())..(i + 5).min(s.len())].iter().collect();
    format!("a pattern was expected: ...{left}<<here>>{right}...")
}

pub(crate) fn fmt_case_value_expected_here(s: &[char], i: usize) -> String {
    let left: String = s[i.saturating_sub(5)..i.min(s.len())].iter().collect();
    format!(
        "a value was expected: ...{left}<<here>>..., object literals should be surrounded by parentheses"
    )
}

pub(crate) fn fmt_prop_name_should_start_with_letter(r: char) -> String {
    format!("property name should start with a letter, not '{r}'")
}

pub(crate) fn fmt_double_colon_element_should_start_with_letter(r: char) -> String {
    format!("element of double-colon expression should start with a letter, not '{r}'")
}

pub(crate) fn fmt_expected_closing_tag(name: &str) -> String {
    format!("expected closing '{name}' tag")
}

pub(crate) fn fmt_invalid_string_lit_json(json_err: &str) -> String {
    format!("invalid string literal: json string: {json_err}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rune_info_marks_irregular_spaces() {
        assert!(fmt_rune_info('\u{a0}').contains("non regular space"));
        assert!(!fmt_rune_info(' ').contains("non regular space"));
    }

    #[test]
    fn expected_here_shows_context() {
        let runes: Vec<char> = "abcdefgh".chars().collect();
        let msg = fmt_expr_expected_here(&runes, 6);
        assert!(msg.contains("bcdef<<here>>gh"));
    }
}
