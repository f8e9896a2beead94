// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The frametalk lexer.
//!
//! Converts source text into a flat [`Token`] stream. The language is
//! line-oriented only in spirit: statements are recognised by their leading
//! keyword, so the lexer treats newlines as ordinary whitespace and emits no
//! newline tokens. `#` starts a comment that runs to the end of the line.
//!
//! The lexer is fail-fast: the first invalid character or unterminated
//! string aborts tokenization with a [`LexError`]. A single [`TokenKind::Eof`]
//! token always terminates a successful stream.
//!
//! ```
//! use frametalk_core::source_analysis::{tokenize, TokenKind, Keyword};
//!
//! let tokens = tokenize("select sales columns {price} as subset").unwrap();
//! assert_eq!(tokens[0].kind, TokenKind::Keyword(Keyword::Select));
//! assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
//! ```

use std::iter::Peekable;
use std::str::CharIndices;

use ecow::EcoString;

use super::error::LexError;
use super::token::{Keyword, Token, TokenKind};
use super::Span;

/// Tokenizes frametalk source text.
///
/// Returns the token stream (terminated by [`TokenKind::Eof`]) or the first
/// lexical error encountered.
///
/// # Errors
///
/// Returns a [`LexError`] for a character outside the language's alphabet or
/// for a string literal left open at the end of its line.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token()? {
        tokens.push(token);
    }
    let end = lexer.current_position();
    tokens.push(Token::new(TokenKind::Eof, Span::point(end)));
    Ok(tokens)
}

/// A lexer over frametalk source text.
struct Lexer<'src> {
    /// The source text being lexed.
    source: &'src str,
    /// Character iterator with byte positions.
    chars: Peekable<CharIndices<'src>>,
    /// Current byte position in source.
    position: usize,
}

impl<'src> Lexer<'src> {
    fn new(source: &'src str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            position: 0,
        }
    }

    /// Peeks at the next character without consuming it.
    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    /// Peeks at the character after the next one.
    fn peek_char_second(&self) -> Option<char> {
        let mut iter = self.chars.clone();
        iter.next();
        iter.next().map(|(_, c)| c)
    }

    /// Consumes the next character and returns it.
    fn advance(&mut self) -> Option<char> {
        let (pos, c) = self.chars.next()?;
        self.position = pos + c.len_utf8();
        Some(c)
    }

    /// Consumes characters while the predicate is true.
    fn advance_while(&mut self, predicate: impl Fn(char) -> bool) {
        while self.peek_char().is_some_and(&predicate) {
            self.advance();
        }
    }

    /// Returns the current byte position.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "source files over 4GB are not supported"
    )]
    fn current_position(&self) -> u32 {
        self.position as u32
    }

    /// Creates a span from start to current position.
    fn span_from(&self, start: u32) -> Span {
        Span::new(start, self.current_position())
    }

    /// Extracts source text for a span.
    fn text_for(&self, span: Span) -> &'src str {
        &self.source[span.as_range()]
    }

    /// Skips whitespace (including newlines) and `#` comments.
    fn skip_trivia(&mut self) {
        loop {
            match self.peek_char() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('#') => {
                    self.advance_while(|c| c != '\n');
                }
                _ => break,
            }
        }
    }

    /// Lexes the next token, or `None` at end of input.
    fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        self.skip_trivia();
        let start = self.current_position();
        let Some(c) = self.advance() else {
            return Ok(None);
        };
        let kind = self.lex_token_kind(c, start)?;
        Ok(Some(Token::new(kind, self.span_from(start))))
    }

    fn lex_token_kind(&mut self, c: char, start: u32) -> Result<TokenKind, LexError> {
        match c {
            '"' => self.lex_string(start),
            c if c.is_ascii_digit() => Ok(self.lex_number(start)),
            c if c.is_alphabetic() || c == '_' => Ok(self.lex_identifier_or_keyword(start)),
            '=' => Ok(self.two_char('=', TokenKind::EqEq, TokenKind::Assign)),
            '<' => Ok(self.two_char('=', TokenKind::LtEq, TokenKind::Lt)),
            '>' => Ok(self.two_char('=', TokenKind::GtEq, TokenKind::Gt)),
            '*' => Ok(self.two_char('*', TokenKind::StarStar, TokenKind::Star)),
            '!' => {
                if self.peek_char() == Some('=') {
                    self.advance();
                    Ok(TokenKind::BangEq)
                } else {
                    Err(LexError::unexpected_char('!', self.span_from(start)))
                }
            }
            '+' => Ok(TokenKind::Plus),
            '-' => Ok(TokenKind::Minus),
            '/' => Ok(TokenKind::Slash),
            '%' => Ok(TokenKind::Percent),
            '.' => Ok(TokenKind::Dot),
            '(' => Ok(TokenKind::LParen),
            ')' => Ok(TokenKind::RParen),
            '{' => Ok(TokenKind::LBrace),
            '}' => Ok(TokenKind::RBrace),
            '[' => Ok(TokenKind::LBracket),
            ']' => Ok(TokenKind::RBracket),
            ':' => Ok(TokenKind::Colon),
            ',' => Ok(TokenKind::Comma),
            other => Err(LexError::unexpected_char(other, self.span_from(start))),
        }
    }

    /// Consumes `next` if it follows, producing `paired`; otherwise `single`.
    fn two_char(&mut self, next: char, paired: TokenKind, single: TokenKind) -> TokenKind {
        if self.peek_char() == Some(next) {
            self.advance();
            paired
        } else {
            single
        }
    }

    /// Lexes an identifier, keyword, or boolean literal.
    ///
    /// Keyword lookup is case-insensitive; `true`/`false` (any case) lex as
    /// boolean literals before the keyword table is consulted.
    fn lex_identifier_or_keyword(&mut self, start: u32) -> TokenKind {
        self.advance_while(|c| c.is_alphanumeric() || c == '_');
        let text = self.text_for(self.span_from(start));
        if text.eq_ignore_ascii_case("true") {
            return TokenKind::Bool(true);
        }
        if text.eq_ignore_ascii_case("false") {
            return TokenKind::Bool(false);
        }
        match Keyword::from_ident(text) {
            Some(kw) => TokenKind::Keyword(kw),
            None => TokenKind::Ident(EcoString::from(text)),
        }
    }

    /// Lexes a numeric literal.
    ///
    /// A `.` is consumed into the literal only when a digit follows and no
    /// decimal point has been seen yet, so `1.2.3` lexes as `1.2` `.` `3`
    /// rather than one malformed literal.
    fn lex_number(&mut self, start: u32) -> TokenKind {
        self.advance_while(|c| c.is_ascii_digit());
        let mut is_float = false;
        if self.peek_char() == Some('.') && self.peek_char_second().is_some_and(|c| c.is_ascii_digit())
        {
            is_float = true;
            self.advance();
            self.advance_while(|c| c.is_ascii_digit());
        }
        let text = EcoString::from(self.text_for(self.span_from(start)));
        if is_float {
            TokenKind::Float(text)
        } else {
            TokenKind::Int(text)
        }
    }

    /// Lexes a double-quoted string literal.
    ///
    /// `\"` escapes a quote; any other backslash is kept literally. The
    /// literal must close before the end of its line.
    fn lex_string(&mut self, start: u32) -> Result<TokenKind, LexError> {
        let mut value = String::new();
        loop {
            match self.peek_char() {
                None | Some('\n') => {
                    return Err(LexError::unterminated_string(self.span_from(start)));
                }
                Some('\\') if self.peek_char_second() == Some('"') => {
                    self.advance();
                    self.advance();
                    value.push('"');
                }
                Some('"') => {
                    self.advance();
                    return Ok(TokenKind::Str(EcoString::from(value)));
                }
                Some(c) => {
                    self.advance();
                    value.push(c);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source)
            .expect("lexing failed")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn lex_empty() {
        assert_eq!(lex_kinds(""), vec![TokenKind::Eof]);
        assert_eq!(lex_kinds("   \n\t  "), vec![TokenKind::Eof]);
    }

    #[test]
    fn lex_keywords_case_insensitively() {
        assert_eq!(
            lex_kinds("select SELECT Select"),
            vec![
                TokenKind::Keyword(Keyword::Select),
                TokenKind::Keyword(Keyword::Select),
                TokenKind::Keyword(Keyword::Select),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_identifiers() {
        assert_eq!(
            lex_kinds("sales _tmp col_2"),
            vec![
                TokenKind::Ident("sales".into()),
                TokenKind::Ident("_tmp".into()),
                TokenKind::Ident("col_2".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_booleans_before_keywords() {
        assert_eq!(
            lex_kinds("true FALSE True"),
            vec![
                TokenKind::Bool(true),
                TokenKind::Bool(false),
                TokenKind::Bool(true),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_numbers() {
        assert_eq!(
            lex_kinds("42 3.14 0.5"),
            vec![
                TokenKind::Int("42".into()),
                TokenKind::Float("3.14".into()),
                TokenKind::Float("0.5".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_number_second_dot_terminates_literal() {
        assert_eq!(
            lex_kinds("1.2.3"),
            vec![
                TokenKind::Float("1.2".into()),
                TokenKind::Dot,
                TokenKind::Int("3".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_trailing_dot_is_not_part_of_number() {
        assert_eq!(
            lex_kinds("5."),
            vec![TokenKind::Int("5".into()), TokenKind::Dot, TokenKind::Eof]
        );
    }

    #[test]
    fn lex_strings() {
        assert_eq!(
            lex_kinds(r#"load "data/sales.csv""#),
            vec![
                TokenKind::Keyword(Keyword::Load),
                TokenKind::Str("data/sales.csv".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_string_with_escaped_quote() {
        assert_eq!(
            lex_kinds(r#""say \"hi\"""#),
            vec![TokenKind::Str(r#"say "hi""#.into()), TokenKind::Eof]
        );
    }

    #[test]
    fn lex_unterminated_string_errors() {
        let err = tokenize(r#"load "sales.csv"#).unwrap_err();
        assert_eq!(err.to_string(), "Unterminated string literal");
        assert_eq!(err.span.start(), 5);
    }

    #[test]
    fn lex_unterminated_string_stops_at_newline() {
        let err = tokenize("filter x where name == \"oops\nselect y").unwrap_err();
        assert_eq!(err.to_string(), "Unterminated string literal");
    }

    #[test]
    fn lex_comments_are_skipped() {
        assert_eq!(
            lex_kinds("# load everything\nload \"a.csv\" as a # trailing"),
            vec![
                TokenKind::Keyword(Keyword::Load),
                TokenKind::Str("a.csv".into()),
                TokenKind::Keyword(Keyword::As),
                TokenKind::Ident("a".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_operators_longest_match_first() {
        assert_eq!(
            lex_kinds("== != <= >= ** = < > * + - / %"),
            vec![
                TokenKind::EqEq,
                TokenKind::BangEq,
                TokenKind::LtEq,
                TokenKind::GtEq,
                TokenKind::StarStar,
                TokenKind::Assign,
                TokenKind::Lt,
                TokenKind::Gt,
                TokenKind::Star,
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Slash,
                TokenKind::Percent,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_delimiters() {
        assert_eq!(
            lex_kinds("( ) { } [ ] : , ."),
            vec![
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::LBracket,
                TokenKind::RBracket,
                TokenKind::Colon,
                TokenKind::Comma,
                TokenKind::Dot,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_unexpected_character_errors() {
        let err = tokenize("select @sales").unwrap_err();
        assert_eq!(err.to_string(), "Unexpected character '@'");
        assert_eq!(err.span.start(), 7);
    }

    #[test]
    fn lex_bare_bang_errors() {
        let err = tokenize("filter x where a ! b").unwrap_err();
        assert_eq!(err.to_string(), "Unexpected character '!'");
    }

    #[test]
    fn lex_spans_cover_lexemes() {
        let tokens = tokenize("select sales").unwrap();
        assert_eq!(tokens[0].span, Span::new(0, 6));
        assert_eq!(tokens[1].span, Span::new(7, 12));
        assert_eq!(tokens[2].span, Span::point(12));
    }

    #[test]
    fn lex_full_statement() {
        assert_eq!(
            lex_kinds("select sales columns {price, quantity} as subset"),
            vec![
                TokenKind::Keyword(Keyword::Select),
                TokenKind::Ident("sales".into()),
                TokenKind::Keyword(Keyword::Columns),
                TokenKind::LBrace,
                TokenKind::Ident("price".into()),
                TokenKind::Comma,
                TokenKind::Ident("quantity".into()),
                TokenKind::RBrace,
                TokenKind::Keyword(Keyword::As),
                TokenKind::Ident("subset".into()),
                TokenKind::Eof,
            ]
        );
    }
}
