// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Property-based tests for the frametalk lexer.
//!
//! These tests use `proptest` to verify lexer invariants over generated inputs:
//!
//! 1. **Lexer never panics** — arbitrary string input lexes or errors cleanly
//! 2. **Token spans within input** — all token spans satisfy `end <= input.len()`
//! 3. **Token spans are non-overlapping** — successive spans never overlap
//! 4. **EOF is always last** — a successful stream ends with exactly one EOF
//! 5. **Lexer is deterministic** — same input always produces same result
//! 6. **Valid fragments lex cleanly** — known-valid inputs produce no errors
//! 7. **Keywords are case-insensitive** — case changes never change token kinds

use proptest::prelude::*;

use super::lexer::tokenize;
use super::token::TokenKind;

// ============================================================================
// Generators
// ============================================================================

/// Known-valid single-token fragments that should lex without errors.
const VALID_SINGLE_TOKENS: &[&str] = &[
    "42",
    "3.14",
    "\"hello\"",
    "true",
    "false",
    "sales",
    "select",
    "groupby",
    "rolling_mean",
    "fill_value",
    "==",
    "!=",
    "<=",
    ">=",
    "**",
    "+",
    "-",
    "{",
    "}",
    "[",
    "]",
    ":",
    ",",
];

/// Multi-token valid statements that should lex cleanly.
const VALID_STATEMENTS: &[&str] = &[
    "load \"sales.csv\" as sales",
    "select sales columns {price, quantity} as subset",
    "filter sales where price > 100 as expensive",
    "sort sales by {price: desc} as ranked",
    "groupby sales by {category} compute {sum: quantity} as summary",
    "mutate sales with total = price * quantity as enriched",
    "head sales with n = 10",
    "merge a with b on = \"id\" how = \"left\" as joined",
    "describe sales",
    "# just a comment",
];

fn valid_single_token() -> impl Strategy<Value = String> {
    prop::sample::select(VALID_SINGLE_TOKENS).prop_map(std::string::ToString::to_string)
}

fn valid_statement() -> impl Strategy<Value = String> {
    prop::sample::select(VALID_STATEMENTS).prop_map(std::string::ToString::to_string)
}

// ============================================================================
// Property tests
// ============================================================================

/// Default is 512 cases; override via `PROPTEST_CASES` env var for nightly runs.
fn proptest_config() -> ProptestConfig {
    let default = ProptestConfig::default();
    ProptestConfig {
        cases: default.cases.max(512),
        ..default
    }
}

proptest! {
    #![proptest_config(proptest_config())]

    /// Property 1: Lexer never panics on arbitrary string input.
    #[test]
    fn lexer_never_panics(input in "\\PC{0,500}") {
        let _result = tokenize(&input);
    }

    /// Property 2: All token spans are within input bounds.
    #[test]
    fn token_spans_within_input(input in "\\PC{0,500}") {
        let Ok(tokens) = tokenize(&input) else { return Ok(()) };
        let input_len = u32::try_from(input.len()).unwrap_or(u32::MAX);
        for token in &tokens {
            prop_assert!(
                token.span.end() <= input_len,
                "Token {:?} span end {} exceeds input length {} for input {:?}",
                token.kind,
                token.span.end(),
                input_len,
                input,
            );
            prop_assert!(
                token.span.start() <= token.span.end(),
                "Token {:?} span start {} > end {} for input {:?}",
                token.kind,
                token.span.start(),
                token.span.end(),
                input,
            );
        }
    }

    /// Property 3: Token spans are non-overlapping and ordered.
    #[test]
    fn token_spans_non_overlapping(input in "\\PC{0,500}") {
        let Ok(tokens) = tokenize(&input) else { return Ok(()) };
        for window in tokens.windows(2) {
            let prev = &window[0];
            let next = &window[1];
            prop_assert!(
                next.span.start() >= prev.span.end(),
                "Overlapping spans: {:?} at {:?} and {:?} at {:?} for input {:?}",
                prev.kind,
                prev.span,
                next.kind,
                next.span,
                input,
            );
        }
    }

    /// Property 4: A successful stream ends with exactly one EOF token.
    #[test]
    fn eof_always_last(input in "\\PC{0,500}") {
        let Ok(tokens) = tokenize(&input) else { return Ok(()) };
        prop_assert!(!tokens.is_empty(), "tokenize should never return empty");
        let eof_count = tokens.iter().filter(|t| t.kind.is_eof()).count();
        prop_assert_eq!(eof_count, 1, "Expected exactly one EOF for input {:?}", input);
        prop_assert!(
            tokens.last().unwrap().kind.is_eof(),
            "Last token should be EOF, got {:?} for input {:?}",
            tokens.last().unwrap().kind,
            input,
        );
    }

    /// Property 5: Lexer is deterministic — same input, same result.
    #[test]
    fn lexer_deterministic(input in "\\PC{0,200}") {
        let first = tokenize(&input);
        let second = tokenize(&input);
        prop_assert_eq!(first, second, "Different results for same input {:?}", input);
    }

    /// Property 6: Known-valid single tokens lex without errors.
    #[test]
    fn valid_tokens_lex_cleanly(input in valid_single_token()) {
        prop_assert!(
            tokenize(&input).is_ok(),
            "Valid input {:?} failed to lex",
            input,
        );
    }

    /// Property 6b: Known-valid statements lex without errors.
    #[test]
    fn valid_statements_lex_cleanly(input in valid_statement()) {
        prop_assert!(
            tokenize(&input).is_ok(),
            "Valid statement {:?} failed to lex",
            input,
        );
    }

    /// Property 7: Changing the case of a bare-word input never changes the
    /// token kinds (keywords and booleans are case-insensitive; identifiers
    /// differ only in their text).
    #[test]
    fn keyword_case_is_insignificant(input in "[a-z_]{1,20}") {
        let lower = tokenize(&input).expect("bare word failed to lex");
        let upper = tokenize(&input.to_ascii_uppercase()).expect("bare word failed to lex");
        prop_assert_eq!(lower.len(), upper.len());
        for (a, b) in lower.iter().zip(upper.iter()) {
            let same_shape = match (&a.kind, &b.kind) {
                (TokenKind::Ident(x), TokenKind::Ident(y)) => {
                    x.eq_ignore_ascii_case(y)
                }
                (x, y) => x == y,
            };
            prop_assert!(
                same_shape,
                "Case change altered token kind: {:?} vs {:?} for input {:?}",
                a.kind,
                b.kind,
                input,
            );
        }
    }
}
