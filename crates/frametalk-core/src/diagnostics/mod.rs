// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Compilation diagnostics.
//!
//! Every stage of the pipeline reports problems as [`Diagnostic`] values:
//! the lexer and parser convert their first (and only) error, semantic
//! analysis batches as many as it finds. The [`reporter`] module renders a
//! diagnostic list against the source text.
//!
//! A diagnostic's `suggestion` holds the bare candidate name (`"sales"`,
//! not a formatted question); the reporter owns the `Did you mean '...'?`
//! phrasing so it appears exactly once.

use ecow::EcoString;

use crate::source_analysis::{LexError, ParseError, Span};

pub mod reporter;

/// The compilation stage a diagnostic originated from.
///
/// Declaration order is the fixed grouping order of the multi-error report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Tokenization failures.
    Lexical,
    /// Parse failures.
    Syntax,
    /// Failed reference and schema checks.
    Semantic,
    /// Column type mismatches.
    Type,
    /// Failures while running generated code (reported by embedders).
    Runtime,
}

impl ErrorCategory {
    /// All categories, in report order.
    pub const ALL: [Self; 5] = [
        Self::Lexical,
        Self::Syntax,
        Self::Semantic,
        Self::Type,
        Self::Runtime,
    ];

    /// The display name, e.g. `"Semantic Error"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lexical => "Lexical Error",
            Self::Syntax => "Syntax Error",
            Self::Semantic => "Semantic Error",
            Self::Type => "Type Error",
            Self::Runtime => "Runtime Error",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single problem found during compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// The stage that produced the diagnostic.
    pub category: ErrorCategory,
    /// What went wrong, phrased for the report.
    pub message: EcoString,
    /// The offending source range.
    pub span: Span,
    /// An optional usage hint shown below the message.
    pub hint: Option<EcoString>,
    /// The bare name of the closest known candidate, if one is close enough.
    pub suggestion: Option<EcoString>,
}

impl Diagnostic {
    /// Creates a diagnostic with no hint or suggestion.
    #[must_use]
    pub fn new(category: ErrorCategory, message: impl Into<EcoString>, span: Span) -> Self {
        Self {
            category,
            message: message.into(),
            span,
            hint: None,
            suggestion: None,
        }
    }

    /// Creates a semantic diagnostic.
    #[must_use]
    pub fn semantic(message: impl Into<EcoString>, span: Span) -> Self {
        Self::new(ErrorCategory::Semantic, message, span)
    }

    /// Attaches a usage hint.
    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<EcoString>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Attaches the name of the closest known candidate.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<EcoString>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl From<&LexError> for Diagnostic {
    fn from(error: &LexError) -> Self {
        let mut diagnostic =
            Self::new(ErrorCategory::Lexical, error.kind.to_string(), error.span);
        if let Some(hint) = error.hint() {
            diagnostic = diagnostic.with_hint(hint);
        }
        diagnostic
    }
}

impl From<&ParseError> for Diagnostic {
    fn from(error: &ParseError) -> Self {
        let mut diagnostic =
            Self::new(ErrorCategory::Syntax, error.message.clone(), error.span);
        if let Some(hint) = &error.hint {
            diagnostic = diagnostic.with_hint(hint.clone());
        }
        diagnostic
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_analysis::LexErrorKind;

    #[test]
    fn category_display_matches_report_headers() {
        assert_eq!(ErrorCategory::Lexical.to_string(), "Lexical Error");
        assert_eq!(ErrorCategory::Semantic.to_string(), "Semantic Error");
    }

    #[test]
    fn categories_group_in_declaration_order() {
        assert_eq!(ErrorCategory::ALL[0], ErrorCategory::Lexical);
        assert_eq!(ErrorCategory::ALL[4], ErrorCategory::Runtime);
    }

    #[test]
    fn builder_attaches_hint_and_suggestion() {
        let diagnostic = Diagnostic::semantic("Dataset 'sals' has not been loaded", Span::new(5, 9))
            .with_hint("Available datasets: sales")
            .with_suggestion("sales");
        assert_eq!(diagnostic.hint.as_deref(), Some("Available datasets: sales"));
        assert_eq!(diagnostic.suggestion.as_deref(), Some("sales"));
    }

    #[test]
    fn lex_error_converts_with_hint() {
        let error = LexError::new(LexErrorKind::UnexpectedCharacter('@'), Span::new(3, 4));
        let diagnostic = Diagnostic::from(&error);
        assert_eq!(diagnostic.category, ErrorCategory::Lexical);
        assert_eq!(diagnostic.message, "Unexpected character '@'");
        assert!(diagnostic.hint.is_some());
        assert!(diagnostic.suggestion.is_none());
    }

    #[test]
    fn parse_error_converts_to_syntax() {
        let error = ParseError::new("Expected 'as' before alias", Span::new(10, 12));
        let diagnostic = Diagnostic::from(&error);
        assert_eq!(diagnostic.category, ErrorCategory::Syntax);
        assert_eq!(diagnostic.span, Span::new(10, 12));
    }
}
