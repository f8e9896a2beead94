// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Error types for source analysis.
//!
//! Errors carry source locations ([`Span`]) for precise diagnostics.
//! They integrate with [`miette`] for rendering outside the built-in
//! reporter.
//!
//! Both the lexer and the parser stop at the first error: a broken token
//! stream makes every later token suspect, so recovery would only produce
//! cascading noise. Batching happens later, in semantic analysis.

// Spurious warnings from miette derive macro expansion
#![allow(unused_assignments)]

use ecow::EcoString;
use miette::Diagnostic;
use thiserror::Error;

use super::{Span, TokenKind};

/// A lexical error encountered during tokenization.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("{kind}")]
#[diagnostic()]
pub struct LexError {
    /// The kind of lexical error.
    #[source]
    pub kind: LexErrorKind,
    /// The source location of the error.
    #[label("here")]
    pub span: Span,
}

impl LexError {
    /// Creates a new lexical error.
    #[must_use]
    pub fn new(kind: LexErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Creates an "unexpected character" error.
    #[must_use]
    pub fn unexpected_char(c: char, span: Span) -> Self {
        Self::new(LexErrorKind::UnexpectedCharacter(c), span)
    }

    /// Creates an "unterminated string" error.
    #[must_use]
    pub fn unterminated_string(span: Span) -> Self {
        Self::new(LexErrorKind::UnterminatedString, span)
    }

    /// A usage hint for this error, if one exists.
    #[must_use]
    pub fn hint(&self) -> Option<&'static str> {
        match self.kind {
            LexErrorKind::UnexpectedCharacter(_) => {
                Some("This character is not valid in frametalk syntax")
            }
            LexErrorKind::UnterminatedString => {
                Some("Add a closing '\"' before the end of the line")
            }
        }
    }
}

/// The kind of lexical error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LexErrorKind {
    /// An unexpected character was encountered.
    #[error("Unexpected character '{0}'")]
    UnexpectedCharacter(char),

    /// A string literal was not terminated before end of line or input.
    #[error("Unterminated string literal")]
    UnterminatedString,
}

/// A syntax error encountered while parsing the token stream.
///
/// Parse errors are free-form: the grammar has one clause shape per
/// operation, so the message names exactly what was expected there.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic()]
pub struct ParseError {
    /// What went wrong, phrased for the report.
    pub message: EcoString,
    /// The source location of the offending token.
    #[label("here")]
    pub span: Span,
    /// An optional usage hint shown below the message.
    #[help]
    pub hint: Option<EcoString>,
}

impl ParseError {
    /// Creates a new syntax error.
    #[must_use]
    pub fn new(message: impl Into<EcoString>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            hint: None,
        }
    }

    /// Creates an "expected X, found Y" error from the current token.
    #[must_use]
    pub fn expected(what: &str, found: &TokenKind, span: Span) -> Self {
        Self::new(format!("Expected {what}, found {}", found.describe()), span)
    }

    /// Attaches a usage hint.
    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<EcoString>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lex_error_display() {
        let err = LexError::unexpected_char('@', Span::new(0, 1));
        assert_eq!(err.to_string(), "Unexpected character '@'");

        let err = LexError::unterminated_string(Span::new(0, 10));
        assert_eq!(err.to_string(), "Unterminated string literal");
    }

    #[test]
    fn lex_error_hints() {
        let err = LexError::unexpected_char('@', Span::new(0, 1));
        assert_eq!(
            err.hint(),
            Some("This character is not valid in frametalk syntax")
        );
    }

    #[test]
    fn parse_error_expected_names_the_found_token() {
        let err = ParseError::expected(
            "dataset name",
            &TokenKind::Str("sales.csv".into()),
            Span::new(7, 18),
        );
        assert_eq!(err.to_string(), "Expected dataset name, found string literal");
        assert_eq!(err.span, Span::new(7, 18));
    }

    #[test]
    fn parse_error_hint_is_carried() {
        let err = ParseError::new("Expected 'as' before alias", Span::new(0, 2))
            .with_hint("Write: load \"file.csv\" as name");
        assert_eq!(err.hint.as_deref(), Some("Write: load \"file.csv\" as name"));
    }
}
