// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Plain-text rendering of diagnostic lists.
//!
//! The reporter is pure formatting over `(source, diagnostics)`: one
//! diagnostic renders as a detailed block with the offending source line and
//! a caret run; two or more render as a numbered report grouped by stage in
//! [`ErrorCategory::ALL`] order with a `Total:` footer. Line and column
//! numbers are derived here, at the last moment, via [`LineIndex`].

use crate::source_analysis::LineIndex;

use super::{Diagnostic, ErrorCategory};

const RULE_WIDTH: usize = 60;

/// Renders `diagnostics` against the source text they refer to.
#[must_use]
pub fn report(source: &str, diagnostics: &[Diagnostic]) -> String {
    match diagnostics {
        [] => "No errors to display".to_string(),
        [single] => render_single(source, single),
        many => render_grouped(source, many),
    }
}

/// One diagnostic: category header with position, source context, message,
/// then optional hint and suggestion lines.
fn render_single(source: &str, diagnostic: &Diagnostic) -> String {
    let index = LineIndex::new(source);
    let (line, column) = index.position(diagnostic.span.start());

    let mut lines = Vec::new();
    lines.push(format!(
        "{} at line {line}, column {column}:",
        diagnostic.category
    ));
    push_source_context(&mut lines, source, &index, diagnostic, line, column);
    lines.push(format!("    {}", diagnostic.message));
    if let Some(hint) = &diagnostic.hint {
        lines.push(String::new());
        lines.push(format!("Hint: {hint}"));
    }
    if let Some(suggestion) = &diagnostic.suggestion {
        lines.push(format!("Did you mean '{suggestion}'?"));
    }
    lines.join("\n")
}

/// Two or more diagnostics: grouped by category in fixed stage order,
/// numbered globally across groups.
fn render_grouped(source: &str, diagnostics: &[Diagnostic]) -> String {
    let index = LineIndex::new(source);

    let mut lines = Vec::new();
    lines.push(format!(
        "Found {} errors in compilation:",
        diagnostics.len()
    ));

    let mut number = 1usize;
    for category in ErrorCategory::ALL {
        let group: Vec<&Diagnostic> = diagnostics
            .iter()
            .filter(|d| d.category == category)
            .collect();
        if group.is_empty() {
            continue;
        }

        lines.push(String::new());
        lines.push(format!("{category}s ({}):", group.len()));
        lines.push("-".repeat(RULE_WIDTH));

        for diagnostic in group {
            let (line, column) = index.position(diagnostic.span.start());
            lines.push(String::new());
            lines.push(format!("[Error {number}]"));
            lines.push(format!("  Line {line}, column {column}:"));
            push_source_context(&mut lines, source, &index, diagnostic, line, column);
            lines.push(format!("    {}", diagnostic.message));
            if let Some(hint) = &diagnostic.hint {
                lines.push(format!("  Hint: {hint}"));
            }
            if let Some(suggestion) = &diagnostic.suggestion {
                lines.push(format!("  Did you mean '{suggestion}'?"));
            }
            number += 1;
        }
    }

    lines.push(String::new());
    lines.push("=".repeat(RULE_WIDTH));
    let noun = if diagnostics.len() == 1 {
        "error"
    } else {
        "errors"
    };
    lines.push(format!("Total: {} {noun} found", diagnostics.len()));
    lines.join("\n")
}

/// The `   N | source text` line plus a caret run under the span.
fn push_source_context(
    lines: &mut Vec<String>,
    source: &str,
    index: &LineIndex,
    diagnostic: &Diagnostic,
    line: u32,
    column: u32,
) {
    let text = index.line_text(source, line);
    if text.is_empty() {
        return;
    }

    let number = format!("{line:>4}");
    lines.push(format!("    {number} | {text}"));

    let offset = column as usize - 1;
    // Carets never spill past the line end.
    let width = (diagnostic.span.len().max(1) as usize)
        .min(text.len().saturating_sub(offset))
        .max(1);
    let pad = 4 + number.len() + 3 + offset;
    lines.push(format!("{}{}", " ".repeat(pad), "^".repeat(width)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_analysis::Span;

    #[test]
    fn empty_list_has_nothing_to_say() {
        assert_eq!(report("show sales", &[]), "No errors to display");
    }

    #[test]
    fn single_diagnostic_renders_a_detailed_block() {
        let source = "select sails {price} as cut";
        let diagnostic =
            Diagnostic::semantic("Dataset 'sails' has not been loaded or created", Span::new(7, 12))
                .with_hint("Available datasets: sales")
                .with_suggestion("sales");

        let expected = "\
Semantic Error at line 1, column 8:
       1 | select sails {price} as cut
                  ^^^^^
    Dataset 'sails' has not been loaded or created

Hint: Available datasets: sales
Did you mean 'sales'?";
        assert_eq!(report(source, &[diagnostic]), expected);
    }

    #[test]
    fn suggestion_wrapper_is_added_exactly_once() {
        let source = "show sals";
        let diagnostic = Diagnostic::semantic("Dataset 'sals' has not been loaded or created", Span::new(5, 9))
            .with_suggestion("sales");
        let rendered = report(source, &[diagnostic]);
        assert_eq!(rendered.matches("Did you mean").count(), 1);
        assert!(rendered.contains("Did you mean 'sales'?"));
    }

    #[test]
    fn grouped_report_numbers_globally_and_totals() {
        let source = "show alpha\nshow beta";
        let diagnostics = vec![
            Diagnostic::semantic("Dataset 'alpha' has not been loaded or created", Span::new(5, 10))
                .with_hint("No datasets have been loaded yet"),
            Diagnostic::semantic("Dataset 'beta' has not been loaded or created", Span::new(16, 20))
                .with_hint("No datasets have been loaded yet"),
        ];

        let expected = format!(
            "\
Found 2 errors in compilation:

Semantic Errors (2):
{dashes}

[Error 1]
  Line 1, column 6:
       1 | show alpha
                ^^^^^
    Dataset 'alpha' has not been loaded or created
  Hint: No datasets have been loaded yet

[Error 2]
  Line 2, column 6:
       2 | show beta
                ^^^^
    Dataset 'beta' has not been loaded or created
  Hint: No datasets have been loaded yet

{equals}
Total: 2 errors found",
            dashes = "-".repeat(60),
            equals = "=".repeat(60),
        );
        assert_eq!(report(source, &diagnostics), expected);
    }

    #[test]
    fn groups_follow_stage_order_not_input_order() {
        let source = "load x as y";
        let diagnostics = vec![
            Diagnostic::semantic("second in input, second in report", Span::new(0, 4)),
            Diagnostic::new(ErrorCategory::Syntax, "first in report", Span::new(5, 6)),
        ];
        let rendered = report(source, &diagnostics);
        let syntax_at = rendered.find("Syntax Errors (1):").unwrap();
        let semantic_at = rendered.find("Semantic Errors (1):").unwrap();
        assert!(syntax_at < semantic_at);
        assert!(rendered.contains("Total: 2 errors found"));
    }

    #[test]
    fn carets_are_clamped_to_the_line() {
        let source = "show x";
        // Span end past the line; the caret run must stop at the line end.
        let diagnostic = Diagnostic::semantic("message", Span::new(5, 40));
        let rendered = report(source, &[diagnostic]);
        let caret_line = rendered
            .lines()
            .find(|l| l.trim_start().starts_with('^'))
            .unwrap();
        assert_eq!(caret_line.matches('^').count(), 1);
    }
}
