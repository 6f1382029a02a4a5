//! Rune classifiers.
//!
//! Pure predicates over single runes; the closed classifier set of the
//! grammar. Identifiers are ASCII letters/digits/`_`/`-` and must not end
//! with `-` (enforced by callers).

pub(crate) fn is_alpha(r: char) -> bool {
    r.is_ascii_alphabetic()
}

pub(crate) fn is_dec_digit(r: char) -> bool {
    r.is_ascii_digit()
}

pub(crate) fn is_hex_digit(r: char) -> bool {
    r.is_ascii_hexdigit()
}

pub(crate) fn is_octal_digit(r: char) -> bool {
    ('0'..='7').contains(&r)
}

pub(crate) fn is_ident_char(r: char) -> bool {
    is_alpha(r) || is_dec_digit(r) || r == '-' || r == '_'
}

pub(crate) fn is_ident_first_char(r: char) -> bool {
    is_alpha(r) || r == '_'
}

/// Characters allowed inside path/string interpolations.
pub(crate) fn is_interpolation_allowed_char(r: char) -> bool {
    is_ident_char(r) || r == '[' || r == ']' || r == '.' || r == '$' || r == ':'
}

pub(crate) fn is_unquoted_string_char(r: char) -> bool {
    is_ident_char(r) || matches!(r, '+' | '~' | '/' | '^' | '@' | '.' | '%')
}

/// Space, tab and CR: whitespace that does not produce a newline token.
pub(crate) fn is_space_not_lf(r: char) -> bool {
    r == ' ' || r == '\t' || r == '\r'
}

/// `#` starts a comment only when followed by one of these.
pub(crate) fn is_comment_first_space(r: char) -> bool {
    is_space_not_lf(r)
}

pub(crate) fn is_delim(r: char) -> bool {
    matches!(r, '{' | '}' | '[' | ']' | '(' | ')' | '\n' | ',' | ';' | ':' | '|')
}

pub(crate) fn is_closing_delim(r: char) -> bool {
    matches!(r, '}' | ')' | ']')
}

/// Delimiters that end the expression suffix chain.
pub(crate) fn is_unpaired_or_closing_delim(r: char) -> bool {
    matches!(r, '\n' | ',' | ';' | ':' | '=' | ')' | ']' | '}' | '|')
}

pub(crate) fn is_non_space_css_combinator(r: char) -> bool {
    matches!(r, '>' | '~' | '+')
}

pub(crate) fn is_byte_slice_base(r: char) -> bool {
    matches!(r, 'x' | 'd' | 'b')
}

/// Unicode spaces other than space/tab/CR/LF are forbidden in block
/// context and produce unexpected-char errors.
pub(crate) fn is_forbidden_space_char(r: char) -> bool {
    r.is_whitespace() && r != '\n' && !is_space_not_lf(r)
}

pub(crate) fn has_path_like_start(s: &[char]) -> bool {
    match s {
        [] => false,
        ['/', ..] => true,
        ['.', '/', ..] => true,
        ['.', '.', '/', ..] => true,
        _ => false,
    }
}

/// Number of consecutive backslashes immediately before `i`.
pub(crate) fn count_prev_backslashes(s: &[char], i: usize) -> usize {
    s[..i].iter().rev().take_while(|r| **r == '\\').count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ident_chars() {
        assert!(is_ident_first_char('_'));
        assert!(is_ident_first_char('a'));
        assert!(!is_ident_first_char('1'));
        assert!(!is_ident_first_char('-'));
        assert!(is_ident_char('-'));
        assert!(is_ident_char('9'));
        assert!(!is_ident_char('é'));
    }

    #[test]
    fn forbidden_spaces() {
        assert!(is_forbidden_space_char('\u{a0}'));
        assert!(is_forbidden_space_char('\u{2028}'));
        assert!(!is_forbidden_space_char(' '));
        assert!(!is_forbidden_space_char('\n'));
        assert!(!is_forbidden_space_char('\t'));
    }

    #[test]
    fn path_like_starts() {
        let to_runes = |s: &str| s.chars().collect::<Vec<_>>();
        assert!(has_path_like_start(&to_runes("/a")));
        assert!(has_path_like_start(&to_runes("./a")));
        assert!(has_path_like_start(&to_runes("../a")));
        assert!(!has_path_like_start(&to_runes(".a")));
        assert!(!has_path_like_start(&to_runes("a/")));
    }

    #[test]
    fn backslash_counting() {
        let runes: Vec<char> = "a\\\\{".chars().collect();
        assert_eq!(count_prev_backslashes(&runes, 3), 2);
        assert_eq!(count_prev_backslashes(&runes, 1), 0);
    }
}
