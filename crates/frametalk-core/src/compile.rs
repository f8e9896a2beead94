// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The staged compile pipeline.
//!
//! `tokenize -> parse -> analyze -> generate`, failing before it runs: a lex
//! or parse error stops the pipeline at that stage with a single diagnostic,
//! semantic analysis reports every problem it finds in one batch, and code
//! generation only runs for a program with no diagnostics at all. The parse
//! stage is fail-fast while the semantic stage is fail-batched; the two are
//! deliberately different and must stay that way.

use tracing::debug;

use crate::codegen::generate;
use crate::diagnostics::{reporter, Diagnostic, ErrorCategory};
use crate::semantic_analysis::{analyze, AnalyzeOptions, SchemaIntrospector, SymbolTable};
use crate::source_analysis::{parse, tokenize, Span};

/// Knobs for [`compile`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CompileOptions {
    /// Check referenced columns against known schemas. Forwarded to
    /// [`AnalyzeOptions::check_columns`].
    pub check_columns: bool,
}

/// What a compile produced.
///
/// `python` is `Some` only when every stage passed; `diagnostics` carries
/// whatever the failing stage reported, and `symbols` holds the dataset
/// aliases analysis managed to register before or between failures.
#[derive(Debug, Clone)]
pub struct CompileOutput {
    pub python: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
    pub symbols: SymbolTable,
}

impl CompileOutput {
    /// Whether the compile produced a script.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.python.is_some()
    }

    /// Renders this compile's diagnostics against the source text.
    #[must_use]
    pub fn report(&self, source: &str) -> String {
        reporter::report(source, &self.diagnostics)
    }

    fn failed(diagnostic: Diagnostic) -> Self {
        Self {
            python: None,
            diagnostics: vec![diagnostic],
            symbols: SymbolTable::new(),
        }
    }
}

/// Compiles a Frametalk program to a Python script.
///
/// `introspector` supplies column layouts for load statements; pass `None`
/// to track every loaded dataset with an unknown schema (which also mutes
/// column checks, since they only fire against known schemas).
pub fn compile(
    source: &str,
    options: &CompileOptions,
    introspector: Option<&dyn SchemaIntrospector>,
) -> CompileOutput {
    let tokens = match tokenize(source) {
        Ok(tokens) => tokens,
        Err(error) => {
            debug!(stage = "lex", "compile stopped");
            return CompileOutput::failed(Diagnostic::from(&error));
        }
    };

    let statements = match parse(tokens) {
        Ok(statements) => statements,
        Err(error) => {
            debug!(stage = "parse", "compile stopped");
            return CompileOutput::failed(Diagnostic::from(&error));
        }
    };

    let analyze_options = AnalyzeOptions {
        check_columns: options.check_columns,
    };
    let analysis = analyze(&statements, &analyze_options, introspector);
    if !analysis.is_valid() {
        debug!(
            stage = "analyze",
            errors = analysis.diagnostics.len(),
            "compile stopped"
        );
        return CompileOutput {
            python: None,
            diagnostics: analysis.diagnostics,
            symbols: analysis.symbols,
        };
    }

    // Analysis guarantees every referenced alias is defined, so generation
    // cannot fail here; the arm keeps the embedder-facing contract honest
    // if the two stages ever drift.
    match generate(&statements, &SymbolTable::new()) {
        Ok(python) => {
            debug!(bytes = python.len(), "compile finished");
            CompileOutput {
                python: Some(python),
                diagnostics: Vec::new(),
                symbols: analysis.symbols,
            }
        }
        Err(error) => CompileOutput {
            python: None,
            diagnostics: vec![Diagnostic::semantic(error.to_string(), Span::point(0))],
            symbols: analysis.symbols,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile_default(source: &str) -> CompileOutput {
        compile(source, &CompileOptions::default(), None)
    }

    #[test]
    fn clean_program_produces_a_script() {
        let output = compile_default(
            "load \"data/sales.csv\" as sales\nfilter sales where price > 100 as expensive",
        );
        assert!(output.succeeded());
        assert!(output.diagnostics.is_empty());
        let python = output.python.unwrap();
        assert!(python.starts_with("import pandas as pd\n"));
        assert!(python.contains("expensive = sales[sales['price'] > 100]"));
        assert!(output.symbols.contains("sales"));
        assert!(output.symbols.contains("expensive"));
    }

    #[test]
    fn lex_error_stops_before_parse() {
        let output = compile_default("load \"unterminated");
        assert!(!output.succeeded());
        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(output.diagnostics[0].category, ErrorCategory::Lexical);
    }

    #[test]
    fn parse_error_stops_before_analysis() {
        let output = compile_default("filter sales where");
        assert!(!output.succeeded());
        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(output.diagnostics[0].category, ErrorCategory::Syntax);
    }

    #[test]
    fn misspelled_alias_gets_a_suggestion() {
        let source = "load \"data/sales.csv\" as sales\nshow sale";
        let output = compile_default(source);
        assert!(!output.succeeded());
        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(output.diagnostics[0].suggestion.as_deref(), Some("sales"));
        assert!(output.report(source).contains("Did you mean 'sales'?"));
    }

    #[test]
    fn semantic_errors_are_batched_into_one_report() {
        let source = "show alpha\nshow beta";
        let output = compile_default(source);
        assert!(!output.succeeded());
        assert_eq!(output.diagnostics.len(), 2);
        let report = output.report(source);
        assert!(report.starts_with("Found 2 errors in compilation:"));
        assert!(report.contains("Total: 2 errors found"));
    }

    #[test]
    fn column_checks_stay_quiet_without_schemas() {
        // check_columns is on, but with no introspector every load tracks an
        // unknown schema and column checks never fire.
        let options = CompileOptions {
            check_columns: true,
        };
        let output = compile(
            "load \"data/sales.csv\" as sales\nselect sales {no_such_column} as cut",
            &options,
            None,
        );
        assert!(output.succeeded());
    }

    #[test]
    fn compiling_twice_is_byte_identical() {
        let source = "load \"data/sales.csv\" as sales\n\
                      groupby sales by {region} compute {sum: price} as totals\n\
                      show totals";
        let first = compile_default(source).python.unwrap();
        let second = compile_default(source).python.unwrap();
        assert_eq!(first, second);
    }
}
