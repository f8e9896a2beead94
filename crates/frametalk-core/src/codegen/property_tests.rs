// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Property-based tests for the code generator.
//!
//! These tests use `proptest` to verify generator invariants over generated
//! programs:
//!
//! 1. **Generation never panics** — any parsed program either generates a
//!    script or returns `UnknownAlias`
//! 2. **Generation is deterministic** — the same program always produces a
//!    byte-identical script
//! 3. **Pandas leads the imports** — every script starts with the pandas
//!    import, and no import line repeats
//! 4. **Scripts are newline-terminated** with no trailing blank run
//! 5. **Loaded programs always generate** — programs whose statements only
//!    reference loaded aliases never hit `UnknownAlias`

use proptest::prelude::*;

use crate::ast::Statement;
use crate::codegen::generate;
use crate::semantic_analysis::SymbolTable;
use crate::source_analysis::{parse, tokenize};

// ============================================================================
// Program generators
// ============================================================================

/// Statements that reference only the `sales` and `orders` aliases, so a
/// program prefixed with the two loads below always generates.
const FOLLOWERS: &[&str] = &[
    "select sales {name, price} as cut",
    "filter sales where price > 100 as costly",
    "filter sales where region in [\"north\", \"south\"]",
    "sort sales by price desc, name asc",
    "groupby sales by {region} compute {sum: quantity, avg: price} as stats",
    "sample sales with n=50 random as subset",
    "mutate sales with total = price * qty as enriched",
    "apply sales column price with transform x * 2 as doubled",
    "head sales with n=10",
    "dropna sales as clean",
    "fillna sales column qty with value=0 as filled",
    "drop_duplicates sales as deduped",
    "describe sales columns {price, qty}",
    "summary sales",
    "show sales with n=20",
    "value_counts sales column region",
    "corr sales",
    "round sales column price decimals=2 as rounded",
    "sqrt sales column price as rooted",
    "upper sales column name as shouty",
    "length sales column name as measured",
    "extract_year sales column order_date as dated",
    "standard_scale sales column price as scaled",
    "cumsum sales column revenue as running",
    "rolling_mean sales column price window=7 as smoothed",
    "window_lag sales column price periods=1 by [region] as lagged",
    "pivot_table sales index=\"region\" columns=\"month\" values=\"price\" as wide",
    "transpose sales as flipped",
    "merge sales with orders on=\"id\" how=\"left\" as joined",
    "union sales with orders as both",
    "difference sales with orders as only_sales",
    "set_index sales column id as indexed",
    "assert_range sales column price min=0 max=1000",
    "boxplot sales with price by region",
    "heatmap sales columns {price, qty}",
    "timeseries sales x : order_date y : revenue",
];

/// A program that loads its aliases first and then runs statements against
/// them.
fn loaded_program() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(FOLLOWERS), 1..=8).prop_map(|statements| {
        let mut program = String::from(
            "load \"data/sales.csv\" as sales\nload \"data/orders.csv\" as orders\n",
        );
        program.push_str(&statements.join("\n"));
        program
    })
}

/// A program with no leading loads; statements may reference unbound
/// aliases and exercise the `UnknownAlias` path.
fn unprefixed_program() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(FOLLOWERS), 1..=4)
        .prop_map(|statements| statements.join("\n"))
}

fn any_program() -> impl Strategy<Value = String> {
    prop_oneof![loaded_program(), unprefixed_program()]
}

fn parsed(source: &str) -> Vec<Statement> {
    parse(tokenize(source).expect("corpus lexes")).expect("corpus parses")
}

/// Default is 256 cases for standard CI; override via `PROPTEST_CASES` env
/// var for nightly extended runs.
fn proptest_config() -> ProptestConfig {
    let default = ProptestConfig::default();
    ProptestConfig {
        cases: default.cases.max(256),
        ..default
    }
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    #![proptest_config(proptest_config())]

    /// Property 1: Generation never panics; it returns a script or an
    /// `UnknownAlias` error.
    #[test]
    fn generate_never_panics(source in any_program()) {
        let statements = parsed(&source);
        let _result = generate(&statements, &SymbolTable::new());
    }

    /// Property 2: Generating the same program twice gives byte-identical
    /// scripts.
    #[test]
    fn generate_is_deterministic(source in any_program()) {
        let statements = parsed(&source);
        let first = generate(&statements, &SymbolTable::new());
        let second = generate(&statements, &SymbolTable::new());
        prop_assert_eq!(first, second);
    }

    /// Property 3: Pandas leads the imports and no import line repeats.
    #[test]
    fn imports_lead_and_never_repeat(source in loaded_program()) {
        let statements = parsed(&source);
        let script = generate(&statements, &SymbolTable::new())
            .expect("loaded program generates");
        prop_assert!(script.starts_with("import pandas as pd\n"));

        let imports: Vec<&str> = script
            .lines()
            .filter(|line| line.starts_with("import ") || line.starts_with("from "))
            .collect();
        for (i, import) in imports.iter().enumerate() {
            prop_assert!(
                !imports[..i].contains(import),
                "duplicate import line {import:?} in script:\n{script}"
            );
        }
    }

    /// Property 4: Scripts end with exactly one newline and never contain a
    /// run of three blank lines.
    #[test]
    fn scripts_are_tidy(source in loaded_program()) {
        let statements = parsed(&source);
        let script = generate(&statements, &SymbolTable::new())
            .expect("loaded program generates");
        prop_assert!(script.ends_with('\n'));
        prop_assert!(!script.ends_with("\n\n"));
        prop_assert!(!script.contains("\n\n\n\n"));
    }

    /// Property 5: A program that loads every alias it references never
    /// fails to generate.
    #[test]
    fn loaded_programs_always_generate(source in loaded_program()) {
        let statements = parsed(&source);
        prop_assert!(generate(&statements, &SymbolTable::new()).is_ok());
    }
}
