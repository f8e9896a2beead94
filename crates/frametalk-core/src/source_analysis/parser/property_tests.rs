// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Property-based tests for the Frametalk parser.
//!
//! These tests use `proptest` to verify parser invariants over generated inputs:
//!
//! 1. **Parser never panics** — arbitrary string input always returns a result
//! 2. **Error spans within input** — a `ParseError` span has `end <= input.len()`
//! 3. **One statement per source statement** — joining N valid statements
//!    parses to exactly N AST nodes
//! 4. **Parsing is deterministic** — the same tokens always produce the same
//!    result, success or failure
//! 5. **Error messages are user-facing** — no internal type names in errors

use proptest::prelude::*;

use crate::source_analysis::{parse, tokenize};

// ============================================================================
// Near-valid Frametalk generators
// ============================================================================

/// Complete, valid Frametalk statements covering every statement family.
///
/// Each entry parses on its own; the mutation generators below corrupt them
/// to exercise the failure paths.
const FRAGMENTS: &[&str] = &[
    r#"load csv "data/sales.csv" as sales"#,
    r#"load "events.parquet" as events"#,
    r#"load sql "select * from t" from "sqlite:///db.sqlite" as t"#,
    r#"save sales to "out.json""#,
    "select sales {name, price} as cut",
    "select sales with name, price as cut",
    "filter sales where price > 100 and qty < 5 as costly",
    r#"filter sales where region in ["north", "south"] as regional"#,
    "sort sales by price desc, name asc",
    "join orders with customers on customer_id as enriched",
    "groupby sales by {category} compute {sum: quantity, mean: price} as stats",
    "sample sales with n=100 random as subset",
    "mutate sales with total = price * qty + 1.5 as enriched",
    "map sales column price with transform price * 2 as doubled",
    "drop sales columns {temp} as slim",
    "head sales with n=10 as top",
    "dropna sales columns {price, qty} as clean",
    "fillna sales column qty with value=0 as filled",
    "value_counts sales column city normalize ascending",
    "describe sales columns {price, qty}",
    "show sales with n=20",
    "round sales column price decimals=2 as rounded",
    "upper sales column name as shouty",
    "cumsum sales column revenue as running",
    r#"resample sales rule="W" column revenue aggfunc="sum" as weekly"#,
    "rolling_mean sales column price window=7 as smoothed",
    r#"merge orders with customers on="id" how="left" as joined"#,
    r#"pivot sales index="date" columns="region" values="revenue" as wide"#,
    "concat_vertical [jan, feb, mar] as q1",
    "union jan with feb as both",
    "set_index sales column id as indexed",
    "assert_range sales column price min=0 max=1000",
    "boxplot sales with price by region",
    "timeseries sales x : date y : revenue",
];

/// Generates a Frametalk statement from the seed corpus.
fn valid_statement() -> impl Strategy<Value = String> {
    prop::sample::select(FRAGMENTS).prop_map(std::string::ToString::to_string)
}

/// Generates a truncated statement (cut at a random char boundary).
fn truncated_statement() -> impl Strategy<Value = String> {
    valid_statement().prop_flat_map(|s| {
        let boundaries: Vec<usize> = s.char_indices().map(|(i, _)| i).skip(1).collect();
        if boundaries.is_empty() {
            Just(s).boxed()
        } else {
            (0..boundaries.len())
                .prop_map(move |i| s[..boundaries[i]].to_string())
                .boxed()
        }
    })
}

/// Generates input with mismatched delimiters via single-pass char mapping.
fn mismatched_delimiters() -> impl Strategy<Value = String> {
    valid_statement().prop_map(|s| {
        let mut result = String::with_capacity(s.len());
        for ch in s.chars() {
            let mapped = match ch {
                '{' => '(',
                '}' => ']',
                '[' => '{',
                _ => ch,
            };
            result.push(mapped);
        }
        result
    })
}

/// Generates input with every string literal unquoted.
fn dropped_quotes() -> impl Strategy<Value = String> {
    valid_statement().prop_map(|s| s.replace('"', ""))
}

/// Generates input with duplicated operators.
fn duplicated_operators() -> impl Strategy<Value = String> {
    valid_statement().prop_map(|s| s.replace('+', "+ +").replace('*', "* *"))
}

/// Generates a near-valid Frametalk input using one of several mutation
/// strategies.
fn near_valid_frametalk() -> impl Strategy<Value = String> {
    prop_oneof![
        valid_statement(),
        truncated_statement(),
        mismatched_delimiters(),
        dropped_quotes(),
        duplicated_operators(),
    ]
}

/// A program of `1..=8` valid statements joined by newlines, with the
/// expected statement count.
fn valid_program() -> impl Strategy<Value = (String, usize)> {
    prop::collection::vec(valid_statement(), 1..=8)
        .prop_map(|statements| (statements.join("\n"), statements.len()))
}

/// Internal type names that should never appear in user-facing errors.
const INTERNAL_NAMES: &[&str] = &[
    "TokenKind",
    "unwrap()",
    "panic!",
    "unreachable!",
    "Statement::",
    "Value::",
    "ParseError::",
    "internal error",
];

// ============================================================================
// Property tests
// ============================================================================

/// Default is 512 cases for standard CI; override via `PROPTEST_CASES` env var
/// for nightly extended runs (e.g., `PROPTEST_CASES=10000`).
fn proptest_config() -> ProptestConfig {
    let default = ProptestConfig::default();
    ProptestConfig {
        // Use at least 512 cases, but allow PROPTEST_CASES to increase beyond that
        cases: default.cases.max(512),
        ..default
    }
}

proptest! {
    #![proptest_config(proptest_config())]

    /// Property 1: The parser never panics on arbitrary string input.
    ///
    /// Lexing may reject the input; when it lexes, parsing must always
    /// return a `Result`, never unwind.
    #[test]
    fn parser_never_panics(input in "\\PC{0,500}") {
        if let Ok(tokens) = tokenize(&input) {
            let _result = parse(tokens);
        }
    }

    /// Property 1b: The parser never panics on near-valid structured input.
    ///
    /// Uses near-valid generators that reach deeper into statement parsers
    /// than arbitrary strings do.
    #[test]
    fn parser_never_panics_near_valid(input in near_valid_frametalk()) {
        if let Ok(tokens) = tokenize(&input) {
            let _result = parse(tokens);
        }
    }

    /// Property 2: A parse error's span lies within the input bounds.
    #[test]
    fn error_spans_within_input(input in near_valid_frametalk()) {
        if let Ok(tokens) = tokenize(&input) {
            if let Err(error) = parse(tokens) {
                let input_len = u32::try_from(input.len()).unwrap_or(u32::MAX);
                prop_assert!(
                    error.span.end() <= input_len,
                    "Error span end {} exceeds input length {} for input {:?}: {}",
                    error.span.end(),
                    input_len,
                    input,
                    error.message,
                );
                prop_assert!(
                    error.span.start() <= error.span.end(),
                    "Error span start {} > end {} for input {:?}: {}",
                    error.span.start(),
                    error.span.end(),
                    input,
                    error.message,
                );
            }
        }
    }

    /// Property 3: N valid statements parse to exactly N AST nodes.
    #[test]
    fn statement_count_matches_program((source, expected) in valid_program()) {
        let tokens = tokenize(&source).map_err(|e| {
            TestCaseError::fail(format!("valid program failed to lex: {e:?}"))
        })?;
        let program = parse(tokens).map_err(|e| {
            TestCaseError::fail(format!(
                "valid program failed to parse: {} (source: {source:?})",
                e.message,
            ))
        })?;
        prop_assert_eq!(program.len(), expected);
    }

    /// Property 4: Parsing the same tokens twice gives identical results.
    #[test]
    fn parse_is_deterministic(input in near_valid_frametalk()) {
        if let Ok(tokens) = tokenize(&input) {
            let first = parse(tokens.clone());
            let second = parse(tokens);
            prop_assert_eq!(first, second);
        }
    }

    /// Property 5: Error messages are user-facing (no internal type names).
    #[test]
    fn error_messages_are_user_facing(input in near_valid_frametalk()) {
        if let Ok(tokens) = tokenize(&input) {
            if let Err(error) = parse(tokens) {
                for internal in INTERNAL_NAMES {
                    prop_assert!(
                        !error.message.contains(internal),
                        "Error message contains internal name {:?}: {:?} (input: {:?})",
                        internal,
                        error.message,
                        input,
                    );
                }
            }
        }
    }
}
