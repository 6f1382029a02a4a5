//! Trivia eaters.
//!
//! Each variant advances the cursor over a specific mix of spaces,
//! newlines, commas, semicolons and comments, appending the corresponding
//! trivia tokens as it goes. Newlines are token-producing; plain spaces are
//! not.

use crate::chars::{is_comment_first_space, is_space_not_lf};
use crate::Parser;
use bitflags::bitflags;
use quill_ir::{Span, TokenKind};

bitflags! {
    /// What a given eater is allowed to consume besides plain spaces.
    #[derive(Copy, Clone, Eq, PartialEq, Debug)]
    pub(crate) struct Trivia: u8 {
        const NEWLINE = 1;
        const COMMA = 2;
        const SEMICOLON = 4;
        const COMMENT = 8;
    }
}

impl Parser {
    /// Consume one comment if the cursor is on `#` followed by a space.
    /// Comments run to the end of the line.
    pub(crate) fn eat_comment(&mut self) -> bool {
        let start = self.pos();
        if self.cur_is('#')
            && self.peek(1).is_some_and(is_comment_first_space)
        {
            while !self.eof() && !self.cur_is('\n') {
                self.i += 1;
            }
            self.push_raw_token(TokenKind::Comment, self.span_from(start));
            true
        } else {
            false
        }
    }

    /// Core eater; counts consumed newlines.
    pub(crate) fn eat_trivia(&mut self, trivia: Trivia) -> u32 {
        let mut newline_count = 0;
        loop {
            let Some(r) = self.cur() else { break };
            if is_space_not_lf(r) {
                self.i += 1;
            } else if r == '\n' && trivia.contains(Trivia::NEWLINE) {
                self.push_token(TokenKind::Newline, Span::new(self.pos(), self.pos() + 1));
                self.i += 1;
                newline_count += 1;
            } else if r == ',' && trivia.contains(Trivia::COMMA) {
                self.push_token(TokenKind::Comma, Span::new(self.pos(), self.pos() + 1));
                self.i += 1;
            } else if r == ';' && trivia.contains(Trivia::SEMICOLON) {
                self.push_token(TokenKind::Semicolon, Span::new(self.pos(), self.pos() + 1));
                self.i += 1;
            } else if r == '#' && trivia.contains(Trivia::COMMENT) {
                if !self.eat_comment() {
                    break;
                }
            } else {
                break;
            }
        }
        newline_count
    }

    pub(crate) fn eat_space(&mut self) {
        self.eat_trivia(Trivia::empty());
    }

    pub(crate) fn eat_space_newline(&mut self) -> u32 {
        self.eat_trivia(Trivia::NEWLINE)
    }

    pub(crate) fn eat_space_comments(&mut self) {
        self.eat_trivia(Trivia::COMMENT);
    }

    pub(crate) fn eat_space_newline_comment(&mut self) -> u32 {
        self.eat_trivia(Trivia::NEWLINE | Trivia::COMMENT)
    }

    pub(crate) fn eat_space_newline_comma(&mut self) -> u32 {
        self.eat_trivia(Trivia::NEWLINE | Trivia::COMMA)
    }

    pub(crate) fn eat_space_newline_comma_comment(&mut self) -> u32 {
        self.eat_trivia(Trivia::NEWLINE | Trivia::COMMA | Trivia::COMMENT)
    }

    pub(crate) fn eat_space_newline_semicolon_comment(&mut self) -> u32 {
        self.eat_trivia(Trivia::NEWLINE | Trivia::SEMICOLON | Trivia::COMMENT)
    }

    pub(crate) fn eat_space_comma(&mut self) {
        self.eat_trivia(Trivia::COMMA);
    }

    /// Lookahead: is the next run of the given trivia followed by `r`?
    /// Consumes nothing and emits no tokens.
    pub(crate) fn trivia_followed_by(&self, trivia: Trivia, r: char) -> bool {
        let mut i = self.i;
        loop {
            let Some(c) = self.at(i) else { return false };
            if is_space_not_lf(c)
                || (c == '\n' && trivia.contains(Trivia::NEWLINE))
                || (c == ',' && trivia.contains(Trivia::COMMA))
                || (c == ';' && trivia.contains(Trivia::SEMICOLON))
            {
                i += 1;
            } else if c == '#'
                && trivia.contains(Trivia::COMMENT)
                && self.at(i + 1).is_some_and(is_comment_first_space)
            {
                while i < self.len && self.at(i) != Some('\n') {
                    i += 1;
                }
            } else {
                return c == r;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParserOptions;

    fn parser(source: &str) -> Parser {
        Parser::new(source, &ParserOptions::default())
    }

    #[test]
    fn eat_space_stops_at_newline() {
        let mut p = parser("  \t\nx");
        p.eat_space();
        assert_eq!(p.cur(), Some('\n'));
    }

    #[test]
    fn eat_space_newline_counts_and_tokenizes() {
        let mut p = parser(" \n\n x");
        let count = p.eat_space_newline();
        assert_eq!(count, 2);
        assert_eq!(p.cur(), Some('x'));
        assert_eq!(
            p.tokens.iter().filter(|t| t.kind == TokenKind::Newline).count(),
            2
        );
    }

    #[test]
    fn comments_need_a_space_after_hash() {
        let mut p = parser("# comment\nx");
        assert!(p.eat_comment());
        assert_eq!(p.cur(), Some('\n'));

        // `#[` is a tuple opener, not a comment
        let mut p = parser("#[1]");
        assert!(!p.eat_comment());
        assert_eq!(p.i, 0);
    }

    #[test]
    fn lookahead_does_not_consume() {
        let p = parser("  ,\n ) x");
        assert!(p.trivia_followed_by(Trivia::NEWLINE | Trivia::COMMA, ')'));
        assert!(!p.trivia_followed_by(Trivia::empty(), ')'));
        assert_eq!(p.i, 0);
    }
}
