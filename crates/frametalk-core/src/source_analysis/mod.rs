// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Parsing infrastructure for Frametalk source code.
//!
//! This module contains the lexer, the statement parser, and their error
//! types.
//!
//! # Lexical Analysis
//!
//! [`tokenize`] converts source text into a stream of [`Token`]s. Each token
//! carries its source location via [`Span`]. Keywords are recognised
//! case-insensitively; everything else (operators, literals, identifiers)
//! is matched exactly.
//!
//! ```
//! use frametalk_core::source_analysis::tokenize;
//!
//! let tokens = tokenize("show sales").unwrap();
//! assert_eq!(tokens.len(), 3); // show, sales, end of input
//! ```
//!
//! # Parsing
//!
//! The [`parse`] function converts tokens into a `Vec<Statement>` AST. Each
//! statement form has a dedicated recursive-descent method; parsing stops at
//! the first error, carrying the offending span.
//!
//! # Error Handling
//!
//! Lexing fails with [`LexError`] and parsing with [`ParseError`]. Both
//! implement `miette::Diagnostic`, so they render with source labels when
//! wrapped in a report; the compilation pipeline instead folds them into its
//! own stage-grouped report.

mod error;
mod lexer;
mod parser;
mod span;
mod token;

// Property-based tests for the lexer
#[cfg(test)]
mod lexer_property_tests;

pub use error::{LexError, LexErrorKind, ParseError};
pub use lexer::tokenize;
pub use parser::parse;
pub use span::{LineIndex, Span};
pub use token::{Keyword, Token, TokenKind};
